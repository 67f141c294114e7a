//! Credential and token primitives for the comment server.
//!
//! Provides the security-sensitive building blocks consumed by the command
//! dispatcher:
//! - Password key derivation and verification (scrypt, explicit salt)
//! - Signed bearer token issuance and validation (HMAC-SHA-256)
//!
//! Both are pure over their inputs and safe to share across concurrent
//! requests; neither touches storage or transport. Work factors, salt width,
//! session length, and issuance clock-skew tolerance are all explicit
//! configuration rather than ambient state.
//!
//! # Examples
//!
//! ## Password keys
//! ```
//! use auth::CredentialCodec;
//!
//! let codec = CredentialCodec::new();
//! let salt = codec.generate_salt().unwrap();
//! let key = codec.derive_key(b"my_password", &salt).unwrap();
//! assert!(codec.verify(b"my_password", &salt, &key).unwrap());
//! assert!(!codec.verify(b"wrong_password", &salt, &key).unwrap());
//! ```
//!
//! ## Bearer tokens
//! ```
//! use auth::TokenService;
//! use chrono::{Duration, Utc};
//! use uuid::Uuid;
//!
//! let tokens = TokenService::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     Duration::hours(24),
//!     Duration::seconds(1),
//! );
//! let account_id = Uuid::new_v4();
//! let token = tokens.issue_for_login(account_id, Utc::now()).unwrap();
//! assert_eq!(tokens.validate(&token, Utc::now()).unwrap(), account_id);
//! ```

pub mod credentials;
pub mod token;

// Re-export commonly used items
pub use credentials::CredentialCodec;
pub use credentials::CredentialError;
pub use credentials::KdfParams;
pub use token::Claims;
pub use token::TokenError;
pub use token::TokenService;
