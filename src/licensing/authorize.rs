// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Username/password/license-key authorization.

use chrono::{DateTime, Utc};

use crate::auth::PasswordHasher;
use crate::storage::{CredentialDb, LicenseStatus, StoreResult};

/// What a successful authorization grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub username: String,
    pub level: String,
    pub license_key: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Granted(Grant),
    /// Unknown username or wrong password
    InvalidCredentials,
    /// License missing, owned by someone else, not active, or expired
    LicenseInvalid,
}

pub struct Authenticator<'a> {
    db: &'a CredentialDb,
    passwords: &'a PasswordHasher,
}

impl<'a> Authenticator<'a> {
    pub fn new(db: &'a CredentialDb, passwords: &'a PasswordHasher) -> Self {
        Self { db, passwords }
    }

    /// Decide whether `username`/`password` may use license `key` at `now`.
    ///
    /// Credentials are checked before the license, so a bad password
    /// always reports `InvalidCredentials` whatever the key. License
    /// failures all collapse into `LicenseInvalid`.
    pub fn authorize(
        &self,
        username: &str,
        password: &str,
        key: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<AuthDecision> {
        let Some(user) = self.db.user_by_username(username)? else {
            return Ok(AuthDecision::InvalidCredentials);
        };

        match self.passwords.verify(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => return Ok(AuthDecision::InvalidCredentials),
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "Stored password hash is unusable");
                return Ok(AuthDecision::InvalidCredentials);
            }
        }

        let license = self
            .db
            .owned_license(&user.id, key)?
            .filter(|license| license.status == LicenseStatus::Active);

        let Some(license) = license else {
            tracing::debug!(username = %username, "License not owned or not active");
            return Ok(AuthDecision::LicenseInvalid);
        };

        if !license.is_current(now) {
            tracing::debug!(
                username = %username,
                expires_at = %license.subscription.expires_at,
                "Subscription expired"
            );
            return Ok(AuthDecision::LicenseInvalid);
        }

        Ok(AuthDecision::Granted(Grant {
            username: user.username,
            level: license.subscription.level,
            license_key: license.key,
            expires_at: license.subscription.expires_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StoredLicense, StoredUser};
    use crate::test_support::TestContext;
    use chrono::Duration;

    fn authorize(ctx: &TestContext, username: &str, password: &str, key: &str) -> AuthDecision {
        Authenticator::new(&ctx.state.db, &ctx.state.passwords)
            .authorize(username, password, key, Utc::now())
            .unwrap()
    }

    #[test]
    fn grants_owner_with_active_license() {
        let ctx = TestContext::new();
        let user = ctx.seed_user("alice", "pw");
        let expires_at = Utc::now() + Duration::days(30);
        ctx.seed_license("K1", "premium", expires_at, Some(&user.id));

        let decision = authorize(&ctx, "alice", "pw", "K1");
        assert_eq!(
            decision,
            AuthDecision::Granted(Grant {
                username: "alice".into(),
                level: "premium".into(),
                license_key: "K1".into(),
                expires_at,
            })
        );
    }

    #[test]
    fn unknown_user_and_wrong_password_are_indistinguishable() {
        let ctx = TestContext::new();
        let user = ctx.seed_user("alice", "pw");
        ctx.seed_license("K1", "premium", Utc::now() + Duration::days(30), Some(&user.id));

        assert_eq!(authorize(&ctx, "nobody", "pw", "K1"), AuthDecision::InvalidCredentials);
        assert_eq!(authorize(&ctx, "alice", "wrong", "K1"), AuthDecision::InvalidCredentials);
    }

    #[test]
    fn bad_password_wins_over_bad_license() {
        let ctx = TestContext::new();
        ctx.seed_user("alice", "pw");

        assert_eq!(authorize(&ctx, "alice", "wrong", "NO-SUCH-KEY"), AuthDecision::InvalidCredentials);
    }

    #[test]
    fn license_of_another_user_is_invalid() {
        let ctx = TestContext::new();
        ctx.seed_user("alice", "pw");
        let bob = ctx.seed_user("bob", "pw");
        ctx.seed_license("K1", "premium", Utc::now() + Duration::days(30), Some(&bob.id));

        assert_eq!(authorize(&ctx, "alice", "pw", "K1"), AuthDecision::LicenseInvalid);
    }

    #[test]
    fn missing_unclaimed_or_expired_license_is_invalid() {
        let ctx = TestContext::new();
        let user = ctx.seed_user("alice", "pw");
        ctx.seed_license("UNCLAIMED", "premium", Utc::now() + Duration::days(30), None);
        ctx.seed_license("EXPIRED", "premium", Utc::now() - Duration::days(1), Some(&user.id));

        assert_eq!(authorize(&ctx, "alice", "pw", "NO-SUCH-KEY"), AuthDecision::LicenseInvalid);
        assert_eq!(authorize(&ctx, "alice", "pw", "UNCLAIMED"), AuthDecision::LicenseInvalid);
        assert_eq!(authorize(&ctx, "alice", "pw", "EXPIRED"), AuthDecision::LicenseInvalid);
    }

    #[test]
    fn inactive_license_is_invalid() {
        let ctx = TestContext::new();
        let user = ctx.seed_user("alice", "pw");
        ctx.seed_license("K1", "premium", Utc::now() + Duration::days(30), Some(&user.id));
        ctx.state
            .db
            .find_and_update_license("K1", |_| true, |stored| stored.status = LicenseStatus::Suspended)
            .unwrap();

        assert_eq!(authorize(&ctx, "alice", "pw", "K1"), AuthDecision::LicenseInvalid);
    }

    #[test]
    fn unrecognized_status_is_invalid() {
        let ctx = TestContext::new();
        let user = ctx.seed_user("alice", "pw");
        let mut record = serde_json::to_value(StoredLicense::unclaimed(
            "K1",
            "premium",
            Utc::now() + Duration::days(30),
            Utc::now(),
        ))
        .unwrap();
        record["owner_id"] = serde_json::json!(user.id);
        record["status"] = serde_json::json!("grace_period");
        let license: StoredLicense = serde_json::from_value(record).unwrap();
        assert_eq!(license.status, LicenseStatus::Unknown);
        ctx.state.db.insert_license(&license).unwrap();

        assert_eq!(authorize(&ctx, "alice", "pw", "K1"), AuthDecision::LicenseInvalid);
    }

    #[test]
    fn expiry_is_strict_at_boundary() {
        let ctx = TestContext::new();
        let user = ctx.seed_user("alice", "pw");
        let expires_at = Utc::now() + Duration::days(1);
        ctx.seed_license("K1", "premium", expires_at, Some(&user.id));

        let engine = Authenticator::new(&ctx.state.db, &ctx.state.passwords);
        assert_eq!(
            engine.authorize("alice", "pw", "K1", expires_at).unwrap(),
            AuthDecision::LicenseInvalid
        );
        assert!(matches!(
            engine
                .authorize("alice", "pw", "K1", expires_at - Duration::seconds(1))
                .unwrap(),
            AuthDecision::Granted(_)
        ));
    }

    #[test]
    fn malformed_stored_hash_reads_as_invalid_credentials() {
        let ctx = TestContext::new();
        let user = StoredUser::new("legacy", "not-a-phc-string", Utc::now());
        ctx.state.db.insert_user(&user).unwrap();
        ctx.seed_license("K1", "premium", Utc::now() + Duration::days(30), Some(&user.id));

        assert_eq!(authorize(&ctx, "legacy", "pw", "K1"), AuthDecision::InvalidCredentials);
    }
}
