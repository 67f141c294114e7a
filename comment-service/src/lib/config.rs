use std::env;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use auth::CredentialCodec;
use auth::KdfParams;
use auth::TokenService;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub credentials: CredentialConfig,
}

/// Token issuance settings.
///
/// The HMAC secret should be a 512-bit random value supplied through the
/// environment, never committed to a config file.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub hmac_secret: String,
    #[serde(default = "default_session_length_hours")]
    pub session_length_hours: i64,
    #[serde(default = "default_issuance_skew_seconds")]
    pub issuance_skew_seconds: i64,
}

impl AuthConfig {
    /// Build the token service this configuration describes.
    pub fn token_service(&self) -> TokenService {
        TokenService::new(
            self.hmac_secret.as_bytes(),
            Duration::hours(self.session_length_hours),
            Duration::seconds(self.issuance_skew_seconds),
        )
    }
}

/// Key-derivation settings.
///
/// Defaults reproduce the historical deployment (scrypt 2^14/8/1, 32-byte
/// keys, 10-byte salts).
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialConfig {
    #[serde(default = "default_salt_length")]
    pub salt_length: usize,
    #[serde(default = "default_log_n")]
    pub log_n: u8,
    #[serde(default = "default_block_size")]
    pub block_size: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    #[serde(default = "default_key_length")]
    pub key_length: usize,
}

impl CredentialConfig {
    /// Build the credential codec this configuration describes.
    pub fn codec(&self) -> CredentialCodec {
        CredentialCodec::with_config(
            KdfParams {
                log_n: self.log_n,
                block_size: self.block_size,
                parallelism: self.parallelism,
                key_length: self.key_length,
            },
            self.salt_length,
        )
    }
}

fn default_session_length_hours() -> i64 {
    24
}

fn default_issuance_skew_seconds() -> i64 {
    1
}

fn default_salt_length() -> usize {
    CredentialCodec::DEFAULT_SALT_LENGTH
}

fn default_log_n() -> u8 {
    14
}

fn default_block_size() -> u32 {
    8
}

fn default_parallelism() -> u32 {
    1
}

fn default_key_length() -> usize {
    32
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__HMAC_SECRET, CREDENTIALS__SALT_LENGTH, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: AUTH__HMAC_SECRET=... overrides auth.hmac_secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
