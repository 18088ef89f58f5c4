pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod project;

use serde::Deserialize;

/// `?search=` filter shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}
