// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! License Auth Server - credential and license verification service
//!
//! Clients register an account (optionally claiming a license key), then
//! exchange username, password and license key for a short-lived bearer
//! token.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, token issue/validation, bearer extractor
//! - `licensing` - Claim, authorization, registration and profile engines
//! - `storage` - Credential database (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod licensing;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
