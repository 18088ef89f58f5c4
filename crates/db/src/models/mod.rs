//! Row types and creation DTOs, one module per table.

pub mod project;
pub mod project_analysis;
pub mod status_update;
