use rand::rngs::OsRng;
use rand::RngCore;
use scrypt::Params;
use subtle::ConstantTimeEq;

use super::errors::CredentialError;

/// Tunable scrypt work factors.
///
/// Defaults match the historical deployment: cost 16384 (2^14), block size
/// 8, parallelism 1, 32-byte keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// log2 of the CPU/memory cost parameter N
    pub log_n: u8,
    /// Block size parameter r
    pub block_size: u32,
    /// Parallelism parameter p
    pub parallelism: u32,
    /// Width of the derived key in bytes
    pub key_length: usize,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            log_n: 14,
            block_size: 8,
            parallelism: 1,
            key_length: 32,
        }
    }
}

/// Derives and verifies password keys from a password and salt.
///
/// Pure over its inputs: identical `(password, salt)` pairs always produce
/// identical keys, which is what makes later verification possible. No I/O
/// beyond the OS random source used for salt generation.
pub struct CredentialCodec {
    params: KdfParams,
    salt_length: usize,
}

impl CredentialCodec {
    /// Default salt width in bytes.
    ///
    /// Kept at the historical value for compatibility with existing
    /// accounts; 16 bytes or more is recommended for new deployments.
    pub const DEFAULT_SALT_LENGTH: usize = 10;

    /// Create a codec with the default work factors and salt width.
    pub fn new() -> Self {
        Self::with_config(KdfParams::default(), Self::DEFAULT_SALT_LENGTH)
    }

    /// Create a codec with explicit work factors and salt width.
    ///
    /// # Arguments
    /// * `params` - scrypt work factors and key width
    /// * `salt_length` - salt width in bytes for `generate_salt`
    pub fn with_config(params: KdfParams, salt_length: usize) -> Self {
        Self {
            params,
            salt_length,
        }
    }

    /// Generate a fresh salt from the OS cryptographic random source.
    ///
    /// # Returns
    /// A salt of the configured width
    ///
    /// # Errors
    /// * `CryptoSource` - The random source failed or is unavailable
    pub fn generate_salt(&self) -> Result<Vec<u8>, CredentialError> {
        let mut salt = vec![0u8; self.salt_length];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| CredentialError::CryptoSource(e.to_string()))?;
        Ok(salt)
    }

    /// Derive a fixed-width key from a password and salt.
    ///
    /// Deterministic: the same inputs always yield the same key.
    ///
    /// # Errors
    /// * `DerivationFailed` - The configured work factors are invalid or the
    ///   KDF itself failed
    pub fn derive_key(&self, password: &[u8], salt: &[u8]) -> Result<Vec<u8>, CredentialError> {
        let params = Params::new(
            self.params.log_n,
            self.params.block_size,
            self.params.parallelism,
            self.params.key_length,
        )
        .map_err(|e| CredentialError::DerivationFailed(e.to_string()))?;

        let mut key = vec![0u8; self.params.key_length];
        scrypt::scrypt(password, salt, &params, &mut key)
            .map_err(|e| CredentialError::DerivationFailed(e.to_string()))?;
        Ok(key)
    }

    /// Verify a password against a previously derived key.
    ///
    /// The comparison is constant-time in the position of the first
    /// differing byte. A key-width mismatch is an ordinary `Ok(false)`, not
    /// a distinguishable error.
    ///
    /// # Errors
    /// * `DerivationFailed` - Only on KDF failure, never to signal mismatch
    pub fn verify(
        &self,
        password: &[u8],
        salt: &[u8],
        expected_key: &[u8],
    ) -> Result<bool, CredentialError> {
        let derived = self.derive_key(password, salt)?;
        Ok(derived.as_slice().ct_eq(expected_key).into())
    }
}

impl Default for CredentialCodec {
    fn default() -> Self {
        Self::new()
    }
}
