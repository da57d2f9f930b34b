//! Client domain errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    #[error("Duplicate client: {0}")]
    DuplicateClient(String),

    /// One or more fields failed validation
    #[error("Client validation failed: {0}")]
    ValidationFailed(String),

    #[error("Cannot modify inactive client")]
    InactiveClient,
}

impl ClientError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        ClientError::ClientNotFound(id.to_string())
    }

    pub fn validation_failed(errors: Vec<String>) -> Self {
        ClientError::ValidationFailed(errors.join("; "))
    }
}
