// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Licensing Engines
//!
//! The decision logic of the service, independent of HTTP:
//!
//! - [`LicenseClaimer`] - atomic one-time binding of a license to a user
//! - [`Authenticator`] - username/password/license-key authorization
//! - [`Registrar`] - account creation with an optional license claim
//! - [`profile::load_profile`] - re-resolves token claims against the store
//!
//! Domain outcomes (rejections, claim results) are enum variants, never
//! errors. `Err` is reserved for infrastructure faults such as an
//! unreadable database.
//!
//! Every engine borrows the store per call and keeps no state of its own,
//! so all of them are safe to run concurrently against one database.

pub mod authorize;
pub mod claim;
pub mod profile;
pub mod register;

pub use authorize::{AuthDecision, Authenticator, Grant};
pub use claim::{ClaimOutcome, LicenseClaimer};
pub use profile::{load_profile, Profile};
pub use register::{RegisterOutcome, Registrar, ValidationError};

use crate::auth::PasswordError;
use crate::storage::StoreError;

/// Infrastructure failure inside a licensing engine.
#[derive(Debug, thiserror::Error)]
pub enum LicensingError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

pub type LicensingResult<T> = Result<T, LicensingError>;
