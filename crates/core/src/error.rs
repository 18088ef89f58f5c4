use crate::types::DbId;

/// Failures shared by the tracker flows and the HTTP edge.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A project or chat session id that resolves to nothing.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// A project draft or chat message failed input rules.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The target exists but is not in a state that accepts the request.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No signed-in user, or a revoked token.
    #[error("Not signed in: {0}")]
    Unauthorized(String),

    /// Signed in, but the resource belongs to someone else.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// Collapse field errors into one message naming the offending fields,
/// sorted so the text is stable.
impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort_unstable();
        CoreError::Validation(format!("Missing or empty fields: {}", fields.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_entity_and_id() {
        let id = uuid::Uuid::nil();
        let err = CoreError::NotFound {
            entity: "Project",
            id,
        };
        assert_eq!(err.to_string(), format!("Project {id} not found"));
    }
}
