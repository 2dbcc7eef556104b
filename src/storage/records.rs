// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Records persisted in the credential database.
//!
//! Users are written once at registration and never mutated. Licenses are
//! provisioned unclaimed and mutated exactly once by the claim transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Login name, matched case-sensitively
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// Create a new user record with a fresh id.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: now,
        }
    }
}

/// License lifecycle status.
///
/// Only `Active` licenses can authorize token issuance. Expiry is checked
/// separately and is not reflected here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// Usable for authentication
    Active,
    /// Provisioned but not yet activated by a claim
    Pending,
    /// Temporarily disabled by an operator
    Suspended,
    /// Permanently withdrawn
    Revoked,
    /// Any status this service does not recognize. Never active.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseStatus::Active => write!(f, "active"),
            LicenseStatus::Pending => write!(f, "pending"),
            LicenseStatus::Suspended => write!(f, "suspended"),
            LicenseStatus::Revoked => write!(f, "revoked"),
            LicenseStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Subscription tier attached to a license.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    /// Tier name (e.g. "standard", "premium")
    pub level: String,
    /// Absolute expiry instant
    pub expires_at: DateTime<Utc>,
}

/// A license key record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredLicense {
    /// Unique license identifier (UUID)
    pub id: String,
    /// Owning user id. `None` or empty means unclaimed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// License key (user-facing, unique)
    pub key: String,
    /// Current status
    pub status: LicenseStatus,
    /// Subscription tier and expiry
    pub subscription: Subscription,
    /// When the license was provisioned
    pub issued_at: DateTime<Utc>,
}

impl StoredLicense {
    /// Create an unclaimed license in the `Pending` state.
    pub fn unclaimed(
        key: impl Into<String>,
        level: impl Into<String>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: None,
            key: key.into(),
            status: LicenseStatus::Pending,
            subscription: Subscription {
                level: level.into(),
                expires_at,
            },
            issued_at: now,
        }
    }

    /// Whether no user owns this license yet.
    ///
    /// An empty owner id is the "unset" sentinel and counts as unclaimed.
    pub fn is_unclaimed(&self) -> bool {
        self.owner_id.as_deref().map_or(true, str::is_empty)
    }

    /// Whether the license belongs to the given user.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.owner_id.as_deref() == Some(user_id)
    }

    /// Whether the subscription is still running at `now` (strictly before expiry).
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.subscription.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn empty_owner_counts_as_unclaimed() {
        let now = Utc::now();
        let mut license = StoredLicense::unclaimed("K1", "standard", now + Duration::days(1), now);
        assert!(license.is_unclaimed());

        license.owner_id = Some(String::new());
        assert!(license.is_unclaimed());

        license.owner_id = Some("user-1".to_string());
        assert!(!license.is_unclaimed());
        assert!(license.is_owned_by("user-1"));
        assert!(!license.is_owned_by("user-2"));
    }

    #[test]
    fn expiry_is_strict() {
        let now = Utc::now();
        let license = StoredLicense::unclaimed("K1", "standard", now, now);
        assert!(!license.is_current(now));
        assert!(license.is_current(now - Duration::seconds(1)));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&LicenseStatus::Suspended).unwrap();
        assert_eq!(json, r#""suspended""#);
        assert_eq!(LicenseStatus::Active.to_string(), "active");
    }

    #[test]
    fn unrecognized_status_reads_as_unknown() {
        let status: LicenseStatus = serde_json::from_str(r#""expired""#).unwrap();
        assert_eq!(status, LicenseStatus::Unknown);
        assert_ne!(status, LicenseStatus::Active);
    }

    #[test]
    fn missing_owner_field_deserializes_as_unclaimed() {
        let json = r#"{
            "id": "lic-1",
            "key": "K1",
            "status": "pending",
            "subscription": {"level": "standard", "expires_at": "2030-01-01T00:00:00Z"},
            "issued_at": "2026-01-01T00:00:00Z"
        }"#;
        let license: StoredLicense = serde_json::from_str(json).unwrap();
        assert!(license.is_unclaimed());
    }
}
