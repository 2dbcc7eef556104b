// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Password hashing, bearer token minting/validation, and the axum
//! extractor that guards token-protected endpoints.
//!
//! ## Auth Flow
//!
//! 1. Client posts username, password and license key to `/v1/auth`
//! 2. The licensing engine authorizes the triple
//! 3. On success the service returns an HS256 JWT carrying
//!    `sub` (username), `level`, `licenseKey`, `iat`, `exp`, `iss`, `aud`
//! 4. Client sends `Authorization: Bearer <token>` on later requests
//!
//! ## Security
//!
//! - Passwords are stored as Argon2id PHC strings
//! - Tokens are verified with zero clock skew tolerance
//! - Issuer and audience are always checked
//! - Tokens are stateless and not revocable before `exp`

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod token;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use password::{PasswordError, PasswordHasher};
pub use token::{IssuedToken, TokenError, TokenIssuer};
