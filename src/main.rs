// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;

use license_auth_server::{
    api::router,
    auth::{PasswordHasher, TokenIssuer},
    config::{AppConfig, ConfigError, LogFormat, SeedLicense, DEFAULT_LOG_FILTER, SEED_LICENSE_DAYS_ENV},
    state::AppState,
    storage::{CredentialDb, StoreError, StoredLicense, DATABASE_FILE},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());

    let config = config.map_err(|e| {
        tracing::error!("Configuration error: {e}");
        e
    })?;

    std::fs::create_dir_all(&config.data_dir)?;
    let db_path = config.data_dir.join(DATABASE_FILE);
    let db = CredentialDb::open(&db_path).map_err(|e| {
        tracing::error!(path = %db_path.display(), "Failed to open credential database: {e}");
        e
    })?;
    tracing::info!(path = %db_path.display(), "Credential database opened");

    if let Some(seed) = &config.seed_license {
        let now = Utc::now();
        let expires_at = seed.expires_at(now).ok_or_else(|| ConfigError::Invalid {
            name: SEED_LICENSE_DAYS_ENV,
            reason: "expiry out of range".to_string(),
        })?;
        seed_license(&db, seed, expires_at, now)?;
    }

    let passwords = PasswordHasher::new(&config.hashing)?;
    let tokens = TokenIssuer::new(&config.token);
    let app = router(AppState::new(db, passwords, tokens));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("License auth server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Provision one unclaimed license. An existing key is left untouched.
fn seed_license(
    db: &CredentialDb,
    seed: &SeedLicense,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let license = StoredLicense::unclaimed(seed.key.as_str(), seed.level.as_str(), expires_at, now);
    match db.insert_license(&license) {
        Ok(()) => {
            tracing::info!(license_key = %seed.key, level = %seed.level, "Seeded license");
            Ok(())
        }
        Err(StoreError::UniqueViolation(_)) => {
            tracing::info!(license_key = %seed.key, "Seed license already present");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
