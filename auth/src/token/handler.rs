use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use uuid::Uuid;

use super::claims::Claims;
use super::errors::TokenError;

/// Issues and validates signed bearer tokens.
///
/// Tokens are compact JWTs signed with HS256 over the configured secret.
/// Only that algorithm is accepted on validation; tokens claiming any other
/// signing method are rejected before signature checking. Validation takes
/// the evaluation instant as an argument, so the whole service is a pure
/// function of its inputs and safe for concurrent use.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    session_length: Duration,
    issuance_skew: Duration,
}

impl TokenService {
    /// Create a new token service.
    ///
    /// # Arguments
    /// * `secret` - HMAC secret key (should be at least 256 bits)
    /// * `session_length` - Validity window for tokens issued via
    ///   `issue_for_login`
    /// * `issuance_skew` - How far `issue_for_login` back-dates `issuedAt`
    ///   to tolerate clock skew at the validating side
    pub fn new(secret: &[u8], session_length: Duration, issuance_skew: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            session_length,
            issuance_skew,
        }
    }

    /// Issue a token for a subject with an explicit validity window.
    ///
    /// # Errors
    /// * `InvalidWindow` - `issued_at` is not strictly before `expires_at`
    /// * `EncodingFailed` - Signing failed
    pub fn issue(
        &self,
        subject: Uuid,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if issued_at >= expires_at {
            return Err(TokenError::InvalidWindow {
                issued_at: issued_at.timestamp(),
                expires_at: expires_at.timestamp(),
            });
        }

        let claims = Claims::new(subject, issued_at, expires_at);
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Validate a token at the given instant and return its subject.
    ///
    /// A token is valid iff its algorithm is the configured one, its
    /// signature verifies, and `issuedAt <= now < expiresAt`.
    ///
    /// # Errors
    /// * `UnexpectedAlgorithm` - Token claims a different signing method
    /// * `BadSignature` - Signature does not verify under the secret
    /// * `ExpiredOrNotYetValid` - `now` falls outside the validity window
    /// * `DecodingFailed` - Token is malformed
    /// * `InvalidSubject` - The `aid` claim is not a valid id
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // The validity window is checked below against the caller's instant,
        // not the system clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidAlgorithm => TokenError::UnexpectedAlgorithm,
                    ErrorKind::InvalidSignature => TokenError::BadSignature,
                    _ => TokenError::DecodingFailed(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        let now = now.timestamp();
        if now < claims.iat || now >= claims.exp {
            return Err(TokenError::ExpiredOrNotYetValid);
        }

        Uuid::parse_str(&claims.aid).map_err(|e| TokenError::InvalidSubject(e.to_string()))
    }

    /// Issue a session token for a subject that just verified its login.
    ///
    /// `issuedAt` is `now` truncated to whole seconds and back-dated by the
    /// configured skew; expiry is `issuedAt` plus the session length.
    ///
    /// # Errors
    /// * `InvalidWindow` - The configured session length is not positive
    /// * `EncodingFailed` - Signing failed
    pub fn issue_for_login(&self, subject: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let issued_at = now.trunc_subsecs(0) - self.issuance_skew;
        self.issue(subject, issued_at, issued_at + self.session_length)
    }
}
