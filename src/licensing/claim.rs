// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! License claim: bind an unclaimed license to a user exactly once.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{CredentialDb, LicenseStatus, StoreResult, StoredLicense};

/// Result of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// The license now belongs to the caller and is active
    Claimed,
    /// Another user owns the license
    AlreadyClaimed,
    /// No license with that key exists
    NotFound,
}

/// Claims licenses through the store's conditional update.
pub struct LicenseClaimer<'a> {
    db: &'a CredentialDb,
}

impl<'a> LicenseClaimer<'a> {
    pub fn new(db: &'a CredentialDb) -> Self {
        Self { db }
    }

    /// Try to claim `key` for `user_id`.
    ///
    /// The unclaimed check and the owner/status write happen in one store
    /// transaction, so of any number of concurrent callers at most one gets
    /// [`ClaimOutcome::Claimed`]. The follow-up lookup only picks between
    /// `AlreadyClaimed` and `NotFound` for reporting.
    pub fn try_claim(&self, key: &str, user_id: &str) -> StoreResult<ClaimOutcome> {
        if key.is_empty() {
            return Ok(ClaimOutcome::NotFound);
        }

        let claimed = self
            .db
            .find_and_update_license(key, StoredLicense::is_unclaimed, |license| {
                license.owner_id = Some(user_id.to_string());
                license.status = LicenseStatus::Active;
            })?;

        let outcome = match claimed {
            Some(_) => ClaimOutcome::Claimed,
            None if self.db.license_by_key(key)?.is_some() => ClaimOutcome::AlreadyClaimed,
            None => ClaimOutcome::NotFound,
        };

        tracing::info!(
            license_key = %key,
            user_id = %user_id,
            outcome = ?outcome,
            "License claim attempted"
        );

        Ok(outcome)
    }
}
