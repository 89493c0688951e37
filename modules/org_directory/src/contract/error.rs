use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone)]
pub enum DirectoryError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Internal error")]
    Internal,
}

impl DirectoryError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}
