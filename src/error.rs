use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation failure, reported back to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("already exists")]
    AlreadyExists,

    #[error("token lookup collision")]
    TokenLookupCollision,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("invalid token format")]
    InvalidTokenFormat,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input")]
    Validation(Vec<FieldError>),
}

pub type Result<T> = std::result::Result<T, Error>;
