use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of a session token.
///
/// `iat` and `exp` are encoded as Unix timestamps in milliseconds so that
/// short validity windows are honoured exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject identifier (the user id).
    pub sub: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub iat: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub exp: DateTime<Utc>,
}

impl SessionClaims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_timestamps_serialize_as_millis() {
        let iat = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let claims = SessionClaims {
            sub: "subject".to_string(),
            iat,
            exp: iat + TimeDelta::milliseconds(1500),
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["iat"], 1_700_000_000_123_i64);
        assert_eq!(json["exp"], 1_700_000_001_623_i64);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let iat = DateTime::from_timestamp_millis(1_000).unwrap();
        let claims = SessionClaims {
            sub: "s".to_string(),
            iat,
            exp: iat + TimeDelta::seconds(1),
        };

        assert!(!claims.is_expired_at(claims.exp - TimeDelta::nanoseconds(1)));
        assert!(claims.is_expired_at(claims.exp));
    }
}
