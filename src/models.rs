// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive
//! `ToSchema` for the OpenAPI document and use camelCase field names on
//! the wire.
//!
//! ## Model Categories
//!
//! - **Registration**: account creation with an optional license key
//! - **Authentication**: credential + license exchange for a bearer token
//! - **Profile**: the caller's account and license as currently stored

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::IssuedToken;
use crate::licensing::{ClaimOutcome, Grant, Profile};
use crate::storage::LicenseStatus;

// =============================================================================
// Registration
// =============================================================================

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Login name (must not be blank)
    #[serde(default)]
    pub username: String,
    /// Plaintext password (must not be blank)
    #[serde(default)]
    pub password: String,
    /// License key to claim for the new account
    #[serde(default)]
    pub license_key: Option<String>,
}

/// Account created. The license claim result is reported separately and
/// a failed claim does not undo the account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub created: bool,
    pub username: String,
    /// Absent when no license key was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_outcome: Option<ClaimOutcome>,
}

// =============================================================================
// Authentication
// =============================================================================

/// Request to exchange credentials and a license key for a token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// License key owned by the user
    #[serde(default)]
    pub key: String,
}

/// Successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub username: String,
    /// Subscription level of the license
    pub level: String,
    pub license_key: String,
    pub subscription_expires_at: DateTime<Utc>,
    /// HS256 bearer token
    pub token: String,
    pub token_issued_at: DateTime<Utc>,
    pub token_expires_at: DateTime<Utc>,
}

impl AuthResponse {
    pub fn new(grant: Grant, issued: IssuedToken) -> Self {
        Self {
            username: grant.username,
            level: grant.level,
            license_key: grant.license_key,
            subscription_expires_at: grant.expires_at,
            token: issued.token,
            token_issued_at: issued.issued_at,
            token_expires_at: issued.expires_at,
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub username: String,
    pub level: String,
    pub license_key: String,
    pub license_status: LicenseStatus,
    pub subscription_expires_at: DateTime<Utc>,
    pub account_created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            username: profile.username,
            level: profile.level,
            license_key: profile.license_key,
            license_status: profile.license_status,
            subscription_expires_at: profile.subscription_expires_at,
            account_created_at: profile.account_created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn register_request_accepts_missing_license_key() {
        let req: RegisterRequest =
            serde_json::from_value(json!({"username": "alice", "password": "pw"})).unwrap();
        assert_eq!(req.username, "alice");
        assert_eq!(req.license_key, None);

        let req: RegisterRequest = serde_json::from_value(
            json!({"username": "alice", "password": "pw", "licenseKey": "K1"}),
        )
        .unwrap();
        assert_eq!(req.license_key.as_deref(), Some("K1"));
    }

    #[test]
    fn register_response_uses_snake_case_outcomes() {
        let body = serde_json::to_value(RegisterResponse {
            created: true,
            username: "alice".into(),
            claim_outcome: Some(ClaimOutcome::AlreadyClaimed),
        })
        .unwrap();
        assert_eq!(body["claimOutcome"], "already_claimed");

        let body = serde_json::to_value(RegisterResponse {
            created: true,
            username: "alice".into(),
            claim_outcome: None,
        })
        .unwrap();
        assert!(body.get("claimOutcome").is_none());
    }

    #[test]
    fn auth_response_is_camel_case() {
        let now = Utc::now();
        let response = AuthResponse::new(
            Grant {
                username: "alice".into(),
                level: "premium".into(),
                license_key: "K1".into(),
                expires_at: now + Duration::days(30),
            },
            IssuedToken {
                token: "t".into(),
                issued_at: now,
                expires_at: now + Duration::minutes(15),
            },
        );
        let body = serde_json::to_value(response).unwrap();
        for field in [
            "username",
            "level",
            "licenseKey",
            "subscriptionExpiresAt",
            "token",
            "tokenIssuedAt",
            "tokenExpiresAt",
        ] {
            assert!(body.get(field).is_some(), "missing {field}");
        }
    }
}
