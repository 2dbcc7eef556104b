// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token issuance and validation (HS256 JWT).
//!
//! Tokens are stateless: nothing is persisted and there is no revocation
//! list. A token stays valid until `exp` even if the license it names is
//! suspended afterwards; readers re-resolve license state from the store.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::SessionClaims;
use crate::config::TokenConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token issuer or audience is invalid")]
    InvalidIssuerOrAudience,

    #[error("token is malformed")]
    Malformed,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// A freshly minted token with its validity window.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies session tokens with one symmetric key.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.signing_key),
            decoding_key: DecodingKey::from_secret(&config.signing_key),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: config.ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for a successful authorization.
    ///
    /// The validity window is `[now, now + ttl)` at millisecond precision and
    /// is carried in the private `expMs` claim. The registered `iat`/`exp`
    /// claims hold whole seconds, with `exp` rounded up.
    pub fn issue(
        &self,
        username: &str,
        level: &str,
        license_key: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let issued_ms = now.timestamp_millis();
        let exp_ms = issued_ms
            .checked_add(self.ttl.num_milliseconds())
            .filter(|ms| millis_to_utc(*ms).is_some())
            .ok_or_else(|| TokenError::Signing("token expiry out of range".to_string()))?;

        let claims = SessionClaims {
            sub: username.to_string(),
            level: level.to_string(),
            license_key: license_key.to_string(),
            iat: issued_ms.div_euclid(1000),
            exp: exp_ms.div_euclid(1000) + i64::from(exp_ms.rem_euclid(1000) != 0),
            exp_ms,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: millis_to_utc(issued_ms).unwrap_or(now),
            expires_at: millis_to_utc(exp_ms).unwrap_or(DateTime::<Utc>::MAX_UTC),
        })
    }

    /// Verify signature, issuer, audience and expiry against `now`.
    ///
    /// Zero leeway: a token whose `expMs` is at or before `now` (compared in
    /// milliseconds) is expired.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked below against the caller's clock.
        validation.validate_exp = false;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    TokenError::InvalidIssuerOrAudience
                }
                _ => TokenError::Malformed,
            })?;

        let claims = token_data.claims;
        if claims.exp_ms <= now.timestamp_millis() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

pub(crate) fn timestamp_to_utc(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub(crate) fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const KEY: &str = "ThisIsASecretKeyForTestingPurposesOnly123456789";

    fn config() -> TokenConfig {
        TokenConfig {
            signing_key: KEY.as_bytes().to_vec(),
            issuer: "TestAuthLicensingAPI".to_string(),
            audience: "TestAuthLicensingClient".to_string(),
            ttl: Duration::minutes(15),
        }
    }

    fn t0() -> DateTime<Utc> {
        timestamp_to_utc(1_700_000_000)
    }

    #[test]
    fn round_trip_within_ttl() {
        let issuer = TokenIssuer::new(&config());
        let issued = issuer.issue("testuser", "premium", "TEST-KEY-123", t0()).unwrap();

        assert_eq!(issued.issued_at, t0());
        assert_eq!(issued.expires_at, t0() + Duration::minutes(15));
        assert_eq!(issued.token.matches('.').count(), 2);

        for delta in [Duration::zero(), Duration::minutes(1), Duration::minutes(15) - Duration::seconds(1)] {
            let claims = issuer.validate(&issued.token, t0() + delta).unwrap();
            assert_eq!(claims.sub, "testuser");
            assert_eq!(claims.level, "premium");
            assert_eq!(claims.license_key, "TEST-KEY-123");
            assert_eq!(claims.iat, t0().timestamp());
        }
    }

    #[test]
    fn sub_second_issue_time_keeps_full_ttl() {
        let issuer = TokenIssuer::new(&config());
        let issued_at = t0() + Duration::milliseconds(900);
        let issued = issuer.issue("testuser", "premium", "K", issued_at).unwrap();
        let ttl = Duration::minutes(15);

        assert_eq!(issued.issued_at, issued_at);
        assert_eq!(issued.expires_at, issued_at + ttl);

        for delta in [ttl - Duration::milliseconds(500), ttl - Duration::milliseconds(1)] {
            assert!(issuer.validate(&issued.token, issued_at + delta).is_ok());
        }
        assert_eq!(
            issuer.validate(&issued.token, issued_at + ttl),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn registered_exp_claim_rounds_up() {
        let issuer = TokenIssuer::new(&config());
        let issued = issuer
            .issue("u", "l", "k", t0() + Duration::milliseconds(900))
            .unwrap();

        let claims = issuer.validate(&issued.token, t0()).unwrap();
        assert_eq!(claims.iat, t0().timestamp());
        assert_eq!(claims.exp, t0().timestamp() + 15 * 60 + 1);
        assert_eq!(claims.exp_ms, issued.expires_at.timestamp_millis());
    }

    #[test]
    fn expired_at_and_after_ttl() {
        let issuer = TokenIssuer::new(&config());
        let issued = issuer.issue("testuser", "premium", "K", t0()).unwrap();

        assert_eq!(
            issuer.validate(&issued.token, t0() + Duration::minutes(15)),
            Err(TokenError::Expired)
        );
        assert_eq!(
            issuer.validate(&issued.token, t0() + Duration::hours(2)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn wrong_key_is_invalid_signature() {
        let issued = TokenIssuer::new(&config()).issue("u", "l", "k", t0()).unwrap();

        let mut other = config();
        other.signing_key = b"AnotherSecretKeyThatIsAlsoLongEnough!!".to_vec();
        let result = TokenIssuer::new(&other).validate(&issued.token, t0());
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_is_invalid_signature() {
        let issuer = TokenIssuer::new(&config());
        let issued = issuer.issue("u", "basic", "k", t0()).unwrap();

        let parts: Vec<&str> = issued.token.split('.').collect();
        let payload = String::from_utf8(URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        let forged = payload.replace("\"basic\"", "\"premium\"");
        let token = format!("{}.{}.{}", parts[0], URL_SAFE_NO_PAD.encode(forged), parts[2]);

        assert_eq!(issuer.validate(&token, t0()), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn wrong_audience_or_issuer_rejected() {
        let issued = TokenIssuer::new(&config()).issue("u", "l", "k", t0()).unwrap();

        let mut other_aud = config();
        other_aud.audience = "SomeoneElse".to_string();
        assert_eq!(
            TokenIssuer::new(&other_aud).validate(&issued.token, t0()),
            Err(TokenError::InvalidIssuerOrAudience)
        );

        let mut other_iss = config();
        other_iss.issuer = "SomeoneElse".to_string();
        assert_eq!(
            TokenIssuer::new(&other_iss).validate(&issued.token, t0()),
            Err(TokenError::InvalidIssuerOrAudience)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let issuer = TokenIssuer::new(&config());
        assert_eq!(issuer.validate("not-a-jwt", t0()), Err(TokenError::Malformed));
    }
}
