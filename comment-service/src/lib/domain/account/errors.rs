use thiserror::Error;

use auth::CredentialError;
use auth::TokenError;

use crate::domain::errors::WireError;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Errors surfaced by AccountDirectory implementations.
///
/// Uniqueness is the directory's concern (a storage-level constraint); the
/// dispatcher propagates conflicts without special-casing them.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Errors surfaced by EventSink implementations.
#[derive(Debug, Clone, Error)]
pub enum EventSinkError {
    #[error("Failed to serialize event: {0}")]
    SerializationFailed(String),

    #[error("Failed to consume event: {0}")]
    ConsumeFailed(String),
}

/// Top-level error for command dispatch.
///
/// Nothing here is retried; every failure is returned to the immediate
/// caller. Error messages never carry raw passwords.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    // Domain-level errors
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unsupported command type: {0}")]
    UnsupportedCommand(String),

    // Collaborator errors (automatically converted via #[from])
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Event sink error: {0}")]
    Sink(#[from] EventSinkError),

    #[error("Wire error: {0}")]
    Wire(WireError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        DispatchError::Unknown(err.to_string())
    }
}
