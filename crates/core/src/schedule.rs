//! Schedule file selection and storage naming.
//!
//! Schedule files are never parsed. They are accepted or rejected purely by
//! file-name extension and stored verbatim.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Timestamp;

/// Extensions accepted for schedule uploads (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["xer", "mpp", "pdf", "xls", "xlsx"];

/// Storage prefix for uploaded schedules.
pub const SCHEDULE_PREFIX: &str = "schedules";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex is valid"));

/// A schedule file that passed selection.
#[derive(Debug, Clone)]
pub struct ScheduleFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ScheduleFile {
    /// Accept a file only if its extension is in [`ALLOWED_EXTENSIONS`].
    ///
    /// Returns `None` for anything else, leaving the selection unset.
    pub fn select(file_name: impl Into<String>, bytes: Vec<u8>) -> Option<Self> {
        let file_name = file_name.into();
        if is_allowed_schedule(&file_name) {
            Some(Self { file_name, bytes })
        } else {
            None
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Lower-cased extension after the last `.`, if any.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_allowed_schedule(file_name: &str) -> bool {
    extension_of(file_name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Object path for an uploaded schedule: `schedules/{unix_millis}-{name}`.
///
/// Directory components are dropped and characters outside
/// `[A-Za-z0-9._-]` collapse to `_`.
pub fn storage_path(file_name: &str, uploaded_at: Timestamp) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned = if cleaned.is_empty() { "schedule" } else { cleaned };
    format!(
        "{SCHEDULE_PREFIX}/{}-{cleaned}",
        uploaded_at.timestamp_millis()
    )
}
