// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration with an optional license claim.

use chrono::{DateTime, Utc};

use super::{ClaimOutcome, LicenseClaimer, LicensingResult};
use crate::auth::PasswordHasher;
use crate::storage::{CredentialDb, StoreError, StoredUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Username is required")]
    MissingUsername,
    #[error("Password is required")]
    MissingPassword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The account exists. `claim` is `None` when no key was supplied.
    ///
    /// A failed claim does not undo the account.
    Created {
        user: StoredUser,
        claim: Option<ClaimOutcome>,
    },
    DuplicateUsername,
    Invalid(ValidationError),
}

pub struct Registrar<'a> {
    db: &'a CredentialDb,
    passwords: &'a PasswordHasher,
}

impl<'a> Registrar<'a> {
    pub fn new(db: &'a CredentialDb, passwords: &'a PasswordHasher) -> Self {
        Self { db, passwords }
    }

    /// Create an account and, if `license_key` is non-blank, claim it.
    ///
    /// The existence pre-check only avoids hashing for obvious duplicates.
    /// The store's unique index decides concurrent registrations.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        license_key: Option<&str>,
        now: DateTime<Utc>,
    ) -> LicensingResult<RegisterOutcome> {
        if username.trim().is_empty() {
            return Ok(RegisterOutcome::Invalid(ValidationError::MissingUsername));
        }
        if password.trim().is_empty() {
            return Ok(RegisterOutcome::Invalid(ValidationError::MissingPassword));
        }

        if self.db.user_by_username(username)?.is_some() {
            return Ok(RegisterOutcome::DuplicateUsername);
        }

        let hash = self.passwords.hash(password)?;
        let user = StoredUser::new(username, hash, now);
        match self.db.insert_user(&user) {
            Ok(()) => {}
            Err(StoreError::UniqueViolation(_)) => return Ok(RegisterOutcome::DuplicateUsername),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(username = %user.username, user_id = %user.id, "User registered");

        let claim = match license_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => {
                let outcome = LicenseClaimer::new(self.db)
                    .try_claim(key, &user.id)
                    .inspect_err(|e| {
                        tracing::error!(
                            username = %user.username,
                            error = %e,
                            "Account created but license claim failed"
                        );
                    })?;
                Some(outcome)
            }
            None => None,
        };

        Ok(RegisterOutcome::Created { user, claim })
    }
}
