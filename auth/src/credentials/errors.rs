use thiserror::Error;

/// Error type for credential operations.
///
/// Signals failures of the crypto machinery only. A password that merely
/// does not match is reported through `verify`'s `Ok(false)`, never through
/// an error.
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    #[error("Crypto source unavailable: {0}")]
    CryptoSource(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),
}
