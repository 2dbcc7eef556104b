// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated session representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::{millis_to_utc, timestamp_to_utc};

/// Claims carried inside a session token.
///
/// This is a snapshot taken at issuance. The level and license key may go
/// stale if the license changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the username
    pub sub: String,
    /// Subscription level at issuance
    pub level: String,
    /// License key the token was issued for
    #[serde(rename = "licenseKey")]
    pub license_key: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds, rounded up)
    pub exp: i64,
    /// Expiration (Unix milliseconds); authoritative for validation
    #[serde(rename = "expMs")]
    pub exp_ms: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// The caller behind a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub level: String,
    pub license_key: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthenticatedUser {
    /// Create from validated claims.
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            username: claims.sub,
            level: claims.level,
            license_key: claims.license_key,
            issued_at: timestamp_to_utc(claims.iat),
            expires_at: millis_to_utc(claims.exp_ms).unwrap_or_else(|| timestamp_to_utc(claims.exp)),
        }
    }
}
