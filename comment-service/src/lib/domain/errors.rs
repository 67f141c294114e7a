use thiserror::Error;

/// Error type for the command and event wire codecs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Unknown type tag: {0}")]
    UnknownTypeTag(String),

    #[error("Malformed envelope: {0}")]
    Malformed(String),
}
