// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded credential database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: username → serialized StoredUser (primary key is the unique index)
//! - `licenses`: license key → serialized StoredLicense
//! - `license_owner_index`: composite key (user_id|license_key) → license_key
//!
//! redb serializes write transactions, so any check-and-mutate performed
//! inside a single write transaction is atomic with respect to every other
//! writer. [`CredentialDb::find_and_update_license`] is built on that.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::records::{StoredLicense, StoredUser};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: username → serialized StoredUser (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Primary table: license key → serialized StoredLicense (JSON bytes).
const LICENSES: TableDefinition<&str, &[u8]> = TableDefinition::new("licenses");

/// Index: `user_id|license_key` → license_key, for lookups by owner.
const LICENSE_OWNER_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("license_owner_index");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("immutable field changed: {0}")]
    ImmutableField(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the license_owner_index table.
fn owner_index_key(user_id: &str, license_key: &str) -> String {
    format!("{user_id}|{license_key}")
}

/// Range bounds covering every index entry of one owner.
///
/// `}` is the byte after `|`, so the half-open range ends right past the prefix.
#[cfg(test)]
fn owner_prefix_range(user_id: &str) -> (String, String) {
    (format!("{user_id}|"), format!("{user_id}}}"))
}

// =============================================================================
// CredentialDb
// =============================================================================

/// Users and licenses in one embedded ACID database.
pub struct CredentialDb {
    db: Database,
}

impl CredentialDb {
    /// Open (or create) the database at the given path.
    ///
    /// All tables are created up front; this is idempotent.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(LICENSES)?;
            let _ = write_txn.open_table(LICENSE_OWNER_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Verify that every table can be opened for reading.
    pub fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        let _ = read_txn.open_table(LICENSES)?;
        let _ = read_txn.open_table(LICENSE_OWNER_INDEX)?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user.
    ///
    /// Fails with [`StoreError::UniqueViolation`] if the username is taken.
    /// The check and the insert share one write transaction.
    pub fn insert_user(&self, user: &StoredUser) -> StoreResult<()> {
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            if users.get(user.username.as_str())?.is_some() {
                return Err(StoreError::UniqueViolation(format!(
                    "username {}",
                    user.username
                )));
            }
            users.insert(user.username.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a user by exact (case-sensitive) username.
    pub fn user_by_username(&self, username: &str) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let user = match table.get(username)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(user)
    }

    // =========================================================================
    // Licenses
    // =========================================================================

    /// Provision a license.
    ///
    /// Fails with [`StoreError::UniqueViolation`] if the key already exists.
    pub fn insert_license(&self, license: &StoredLicense) -> StoreResult<()> {
        let json = serde_json::to_vec(license)?;
        let key = license.key.as_str();

        let write_txn = self.db.begin_write()?;
        {
            let mut licenses = write_txn.open_table(LICENSES)?;
            if licenses.get(key)?.is_some() {
                return Err(StoreError::UniqueViolation(format!("license key {key}")));
            }
            licenses.insert(key, json.as_slice())?;

            if let Some(owner) = license.owner_id.as_deref().filter(|o| !o.is_empty()) {
                let mut owners = write_txn.open_table(LICENSE_OWNER_INDEX)?;
                owners.insert(owner_index_key(owner, key).as_str(), key)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a license by key.
    pub fn license_by_key(&self, key: &str) -> StoreResult<Option<StoredLicense>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LICENSES)?;
        let license = match table.get(key)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(license)
    }

    /// Look up the license with the given key only if `user_id` owns it.
    pub fn owned_license(&self, user_id: &str, key: &str) -> StoreResult<Option<StoredLicense>> {
        let read_txn = self.db.begin_read()?;
        let owners = read_txn.open_table(LICENSE_OWNER_INDEX)?;
        if owners.get(owner_index_key(user_id, key).as_str())?.is_none() {
            return Ok(None);
        }

        let licenses = read_txn.open_table(LICENSES)?;
        let license: Option<StoredLicense> = match licenses.get(key)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };

        // The index is maintained in the same transactions as the records,
        // but the record stays the source of truth.
        Ok(license.filter(|l| l.is_owned_by(user_id)))
    }

    /// All licenses owned by a user, ordered by key.
    #[cfg(test)]
    pub(crate) fn licenses_by_owner(&self, user_id: &str) -> StoreResult<Vec<StoredLicense>> {
        let read_txn = self.db.begin_read()?;
        let owners = read_txn.open_table(LICENSE_OWNER_INDEX)?;
        let licenses = read_txn.open_table(LICENSES)?;

        let (start, end) = owner_prefix_range(user_id);
        let mut results = Vec::new();
        for entry in owners.range(start.as_str()..end.as_str())? {
            let entry = entry?;
            let key = entry.1.value();
            let Some(value) = licenses.get(key)? else {
                continue;
            };
            let license: StoredLicense = serde_json::from_slice(value.value())?;
            if license.is_owned_by(user_id) {
                results.push(license);
            }
        }

        Ok(results)
    }

    /// Atomic find-matching-and-update on a single license.
    ///
    /// Loads the license with `key`, and if `predicate` holds, applies
    /// `mutate` and writes it back, all inside one write transaction.
    /// Returns the updated record, or `None` when no license matched
    /// (missing key or predicate false).
    ///
    /// The key is immutable and an owner, once set, cannot be replaced;
    /// a mutation that attempts either is rejected and nothing is written.
    pub fn find_and_update_license<P, M>(
        &self,
        key: &str,
        predicate: P,
        mutate: M,
    ) -> StoreResult<Option<StoredLicense>>
    where
        P: FnOnce(&StoredLicense) -> bool,
        M: FnOnce(&mut StoredLicense),
    {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut licenses = write_txn.open_table(LICENSES)?;
            let current: Option<StoredLicense> = match licenses.get(key)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };

            match current {
                Some(mut license) if predicate(&license) => {
                    let previous_owner = license.owner_id.clone();
                    mutate(&mut license);

                    if license.key != key {
                        return Err(StoreError::ImmutableField("key"));
                    }
                    let had_owner = previous_owner.as_deref().is_some_and(|o| !o.is_empty());
                    if had_owner && license.owner_id != previous_owner {
                        return Err(StoreError::ImmutableField("owner_id"));
                    }

                    let json = serde_json::to_vec(&license)?;
                    licenses.insert(key, json.as_slice())?;

                    if !had_owner {
                        if let Some(owner) = license.owner_id.as_deref().filter(|o| !o.is_empty()) {
                            let mut owners = write_txn.open_table(LICENSE_OWNER_INDEX)?;
                            owners.insert(owner_index_key(owner, key).as_str(), key)?;
                        }
                    }
                    Some(license)
                }
                _ => None,
            }
        };
        write_txn.commit()?;
        Ok(updated)
    }
}

// =============================================================================
// Tests
// =============================================================================
