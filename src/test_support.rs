// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::config::{HashingConfig, TokenConfig};
use crate::state::AppState;
use crate::storage::{CredentialDb, StoredLicense, StoredUser, DATABASE_FILE};

pub(crate) const TEST_SIGNING_KEY: &str = "ThisIsASecretKeyForTestingPurposesOnly123456789";
pub(crate) const TEST_ISSUER: &str = "TestAuthLicensingAPI";
pub(crate) const TEST_AUDIENCE: &str = "TestAuthLicensingClient";

pub(crate) fn test_token_config() -> TokenConfig {
    TokenConfig {
        signing_key: TEST_SIGNING_KEY.as_bytes().to_vec(),
        issuer: TEST_ISSUER.to_string(),
        audience: TEST_AUDIENCE.to_string(),
        ttl: Duration::minutes(15),
    }
}

/// Argon2 parameters small enough to keep tests fast.
pub(crate) fn cheap_hashing() -> HashingConfig {
    HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

/// A fresh database in a temp directory plus the services around it.
pub(crate) struct TestContext {
    pub state: AppState,
    _dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = CredentialDb::open(&dir.path().join(DATABASE_FILE)).unwrap();
        let passwords = PasswordHasher::new(&cheap_hashing()).unwrap();
        let tokens = TokenIssuer::new(&test_token_config());
        Self {
            state: AppState::new(db, passwords, tokens),
            _dir: dir,
        }
    }

    /// Insert a user with a real password hash and return the record.
    pub fn seed_user(&self, username: &str, password: &str) -> StoredUser {
        let hash = self.state.passwords.hash(password).unwrap();
        let user = StoredUser::new(username, hash, Utc::now());
        self.state.db.insert_user(&user).unwrap();
        user
    }

    /// Insert a license. An owned license is stored as `Active`.
    pub fn seed_license(
        &self,
        key: &str,
        level: &str,
        expires_at: DateTime<Utc>,
        owner_id: Option<&str>,
    ) -> StoredLicense {
        let mut license = StoredLicense::unclaimed(key, level, expires_at, Utc::now());
        if let Some(owner) = owner_id {
            license.owner_id = Some(owner.to_string());
            if !owner.is_empty() {
                license.status = crate::storage::LicenseStatus::Active;
            }
        }
        self.state.db.insert_license(&license).unwrap();
        license
    }
}
