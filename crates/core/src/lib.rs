//! Domain logic shared by every SitePulse crate.
//!
//! Everything here is pure: prompt construction, transcript windowing,
//! schedule-file selection, project validation and dashboard filtering.
//! Anything that talks to a collaborator lives in `sitepulse-tracker`.

pub mod error;
pub mod project;
pub mod prompt;
pub mod schedule;
pub mod transcript;
pub mod types;
