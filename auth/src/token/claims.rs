use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claims carried by a bearer token.
///
/// Field names are the wire names: `aid` is the subject account id, `iat`
/// and `exp` are epoch seconds bounding the validity window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub aid: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Build claims for a subject and validity window.
    pub fn new(subject: Uuid, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            aid: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_new_claims() {
        let subject = Uuid::new_v4();
        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::hours(24);

        let claims = Claims::new(subject, issued_at, expires_at);

        assert_eq!(claims.aid, subject.to_string());
        assert_eq!(claims.iat, issued_at.timestamp());
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }
}
