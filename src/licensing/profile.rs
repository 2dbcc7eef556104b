// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile read for an authenticated caller.

use chrono::{DateTime, Utc};

use crate::auth::AuthenticatedUser;
use crate::storage::{CredentialDb, LicenseStatus, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub level: String,
    pub license_key: String,
    pub license_status: LicenseStatus,
    pub subscription_expires_at: DateTime<Utc>,
    pub account_created_at: DateTime<Utc>,
}

/// Look up the user and license named by a validated token.
///
/// Token claims only say which records to load; status, level and expiry
/// come from the store as of now. Returns `None` when the user is gone or
/// no longer owns the license.
pub fn load_profile(db: &CredentialDb, caller: &AuthenticatedUser) -> StoreResult<Option<Profile>> {
    let Some(user) = db.user_by_username(&caller.username)? else {
        return Ok(None);
    };
    let Some(license) = db.owned_license(&user.id, &caller.license_key)? else {
        return Ok(None);
    };

    Ok(Some(Profile {
        username: user.username,
        level: license.subscription.level,
        license_key: license.key,
        license_status: license.status,
        subscription_expires_at: license.subscription.expires_at,
        account_created_at: user.created_at,
    }))
}
