#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `key` is whatever the caller looked the entity up by: a numeric id,
    /// a UUID, a prefix path, or a full event code.
    #[error("{entity} '{key}' is not found.")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] keyed by anything displayable.
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        CoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
