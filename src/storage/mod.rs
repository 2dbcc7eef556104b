// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Storage Module
//!
//! Users and licenses live in one embedded redb database file under
//! `DATA_DIR`. The database gives us the two properties the licensing
//! engines depend on:
//!
//! - unique constraints on username and license key, checked inside the
//!   same write transaction as the insert
//! - an atomic find-matching-and-update primitive for licenses
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   credentials.redb
//!     users                 username → StoredUser
//!     licenses              key → StoredLicense
//!     license_owner_index   user_id|key → key
//! ```
//!
//! Licenses are provisioned out-of-band with [`CredentialDb::insert_license`].

pub mod credential_db;
pub mod records;

pub use credential_db::{CredentialDb, StoreError, StoreResult};
pub use records::{LicenseStatus, StoredLicense, StoredUser, Subscription};

/// File name of the credential database inside the data directory.
pub const DATABASE_FILE: &str = "credentials.redb";
