use thiserror::Error;

/// Error type for token operations.
///
/// Callers treat every validation variant as "unauthenticated"; the
/// distinctions exist for diagnostics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token window: issuedAt {issued_at} is not before expiresAt {expires_at}")]
    InvalidWindow { issued_at: i64, expires_at: i64 },

    #[error("Unexpected signing algorithm")]
    UnexpectedAlgorithm,

    #[error("Token signature does not verify")]
    BadSignature,

    #[error("Token is expired or not yet valid")]
    ExpiredOrNotYetValid,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Invalid subject claim: {0}")]
    InvalidSubject(String),
}
