//! Issue and verify session tokens.
//!
//! Verification order matters: the integrity tag is checked over the raw
//! `header.payload` bytes before anything inside them is parsed, so a token
//! altered anywhere after issuance is reported as [`TokenError::InvalidSignature`].

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, crypto, decode_header, encode};

use edusys_config::JwtConfig;
use edusys_config::jwt::clamp_expires_in;

use crate::claims::SessionClaims;
use crate::error::TokenError;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: TimeDelta,
}

impl TokenCodec {
    pub fn new(secret: &[u8], validity: TimeDelta) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            config.secret.as_bytes(),
            TimeDelta::seconds(clamp_expires_in(config.expires_in)),
        )
    }

    /// How long an issued token stays valid.
    pub fn validity(&self) -> TimeDelta {
        self.validity
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        // Claims travel with millisecond precision; align `iat` so that
        // `exp - iat` is exactly the validity window.
        let iat = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat,
            exp: iat
                .checked_add_signed(self.validity)
                .ok_or_else(|| TokenError::Encoding("expiry out of range".to_string()))?,
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let (message, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;

        // Constant-time comparison of the recomputed tag.
        let authentic = crypto::verify(signature, message.as_bytes(), &self.decoding_key, ALGORITHM)
            .map_err(|_| TokenError::InvalidSignature)?;
        if !authentic {
            return Err(TokenError::InvalidSignature);
        }

        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Malformed);
        }

        let (_, payload) = message.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &[u8] = b"test-secret-key-for-unit-tests";

    fn codec(validity: TimeDelta) -> TokenCodec {
        TokenCodec::new(SECRET, validity)
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_750_000_000_000).unwrap()
    }

    #[test]
    fn test_issue_then_verify_returns_subject() {
        let codec = codec(TimeDelta::hours(1));
        let token = codec.issue("user-123").unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.exp - claims.iat, TimeDelta::hours(1));
    }

    #[test]
    fn test_token_is_three_segments() {
        let token = codec(TimeDelta::hours(1)).issue("u").unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_sub_second_validity_window() {
        let codec = codec(TimeDelta::seconds(1));
        let issued = epoch();
        let token = codec.issue_at("u1", issued).unwrap();

        let at_half = issued + TimeDelta::milliseconds(500);
        assert_eq!(codec.verify_at(&token, at_half).unwrap().sub, "u1");

        let at_one_and_half = issued + TimeDelta::milliseconds(1500);
        assert_eq!(
            codec.verify_at(&token, at_one_and_half),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let validity = TimeDelta::seconds(30);
        let codec = codec(validity);
        let issued = epoch();
        let token = codec.issue_at("u", issued).unwrap();
        let deadline = issued + validity;

        assert!(codec.verify_at(&token, deadline - TimeDelta::nanoseconds(1)).is_ok());
        assert_eq!(codec.verify_at(&token, deadline), Err(TokenError::Expired));
        assert_eq!(
            codec.verify_at(&token, deadline + TimeDelta::days(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_sub_millisecond_issue_time_keeps_full_window() {
        let validity = TimeDelta::seconds(1);
        let codec = codec(validity);
        let issued = epoch() + TimeDelta::microseconds(999);
        let token = codec.issue_at("u", issued).unwrap();

        let claims = codec.verify_at(&token, issued).unwrap();
        assert_eq!(claims.iat, epoch());
        assert_eq!(claims.exp, epoch() + validity);
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let issuer = TokenCodec::new(b"issuer-secret", TimeDelta::hours(1));
        let verifier = TokenCodec::new(b"verifier-secret", TimeDelta::hours(1));
        let token = issuer.issue("u").unwrap();

        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_signature_check_precedes_expiry() {
        let issuer = TokenCodec::new(b"other", TimeDelta::seconds(1));
        let token = issuer.issue_at("u", epoch()).unwrap();
        let later = epoch() + TimeDelta::days(1);

        assert_eq!(
            codec(TimeDelta::seconds(1)).verify_at(&token, later),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_inputs() {
        let codec = codec(TimeDelta::hours(1));
        for input in ["", "garbage", "no-dots-at-all", "   "] {
            assert_eq!(codec.verify(input), Err(TokenError::Malformed), "{input:?}");
        }
    }

    #[test]
    fn test_forged_claims_with_valid_structure_are_rejected() {
        let codec = codec(TimeDelta::hours(1));
        let token = codec.issue("alice").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();

        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&SessionClaims {
                sub: "mallory".to_string(),
                iat: epoch(),
                exp: epoch() + TimeDelta::days(3650),
            })
            .unwrap(),
        );
        parts[1] = &forged_payload;

        assert_eq!(
            codec.verify(&parts.join(".")),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_alg_none_is_rejected() {
        let codec = codec(TimeDelta::hours(1));
        let token = codec.issue("alice").unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);

        let unsigned = format!("{header}.{payload}.");
        assert_eq!(codec.verify(&unsigned), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_every_single_byte_mutation_is_invalid_signature() {
        let codec = codec(TimeDelta::hours(1));
        let token = codec.issue("user-42").unwrap();
        let bytes = token.as_bytes();

        for i in 0..bytes.len() {
            let mut mutated = bytes.to_vec();
            mutated[i] = if mutated[i] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(mutated).unwrap();

            assert_eq!(
                codec.verify(&mutated),
                Err(TokenError::InvalidSignature),
                "mutation at byte {i} was not detected"
            );
        }
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let kinds = [
            TokenError::Malformed.kind(),
            TokenError::InvalidSignature.kind(),
            TokenError::Expired.kind(),
        ];
        assert_ne!(kinds[0], kinds[1]);
        assert_ne!(kinds[1], kinds[2]);
        assert_ne!(kinds[0], kinds[2]);
    }

    #[test]
    fn test_expiry_past_calendar_range_is_an_error() {
        let codec = codec(TimeDelta::MAX);
        assert!(matches!(
            codec.issue_at("user-123", epoch()),
            Err(TokenError::Encoding(_))
        ));
    }

    #[test]
    fn test_from_config_bounds_validity() {
        let codec = TokenCodec::from_config(&JwtConfig {
            secret: "config-secret".to_string(),
            expires_in: i64::MAX,
        });
        assert_eq!(
            codec.validity(),
            TimeDelta::seconds(edusys_config::jwt::MAX_EXPIRES_IN)
        );
        assert!(codec.issue("user-123").is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let debug = format!("{:?}", codec(TimeDelta::hours(1)));
        assert!(debug.contains("TokenCodec"));
        assert!(!debug.contains("test-secret"));
    }

    proptest! {
        #[test]
        fn prop_any_mutation_is_rejected(
            subject in "[a-zA-Z0-9-]{1,40}",
            position in any::<prop::sample::Index>(),
            replacement in prop::char::range('!', '~'),
        ) {
            let codec = codec(TimeDelta::hours(1));
            let token = codec.issue(&subject).unwrap();
            let index = position.index(token.len());
            let original = token.as_bytes()[index] as char;
            prop_assume!(original != replacement);

            let mut mutated = token.clone();
            mutated.replace_range(index..index + 1, &replacement.to_string());

            prop_assert_eq!(codec.verify(&mutated), Err(TokenError::InvalidSignature));
        }

        #[test]
        fn prop_valid_strictly_before_deadline(
            validity_ms in 1i64..86_400_000,
            elapsed_ms in 0i64..86_400_000,
        ) {
            let codec = codec(TimeDelta::milliseconds(validity_ms));
            let token = codec.issue_at("subject", epoch()).unwrap();
            let now = epoch() + TimeDelta::milliseconds(elapsed_ms);

            let result = codec.verify_at(&token, now);
            if elapsed_ms < validity_ms {
                prop_assert_eq!(result.map(|c| c.sub), Ok("subject".to_string()));
            } else {
                prop_assert_eq!(result, Err(TokenError::Expired));
            }
        }
    }
}
