// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::storage::CredentialDb;

/// Shared handles for every request. Built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<CredentialDb>,
    pub passwords: Arc<PasswordHasher>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(db: CredentialDb, passwords: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            db: Arc::new(db),
            passwords: Arc::new(passwords),
            tokens: Arc::new(tokens),
        }
    }
}
