// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AppConfig`] struct built from them once at startup. Any error here is
//! fatal: the service refuses to start rather than failing per request.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the credential database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_KEY` | HMAC signing key (at least 32 bytes) | Required |
//! | `JWT_ISSUER` | Token issuer claim | Required |
//! | `JWT_AUDIENCE` | Token audience claim | Required |
//! | `TOKEN_TTL_MINUTES` | Bearer token lifetime | `15` |
//! | `ARGON2_MEMORY_KIB` | Argon2 memory cost | `19456` |
//! | `ARGON2_ITERATIONS` | Argon2 time cost | `2` |
//! | `ARGON2_PARALLELISM` | Argon2 lanes | `1` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `SEED_LICENSE_KEY` | Provision one unclaimed license at startup | Unset |
//! | `SEED_LICENSE_LEVEL` | Tier of the seeded license | `standard` |
//! | `SEED_LICENSE_DAYS` | Days until the seeded license expires | `30` |

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_KEY_ENV: &str = "JWT_KEY";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const JWT_AUDIENCE_ENV: &str = "JWT_AUDIENCE";
pub const TOKEN_TTL_MINUTES_ENV: &str = "TOKEN_TTL_MINUTES";
pub const ARGON2_MEMORY_KIB_ENV: &str = "ARGON2_MEMORY_KIB";
pub const ARGON2_ITERATIONS_ENV: &str = "ARGON2_ITERATIONS";
pub const ARGON2_PARALLELISM_ENV: &str = "ARGON2_PARALLELISM";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const SEED_LICENSE_KEY_ENV: &str = "SEED_LICENSE_KEY";
pub const SEED_LICENSE_LEVEL_ENV: &str = "SEED_LICENSE_LEVEL";
pub const SEED_LICENSE_DAYS_ENV: &str = "SEED_LICENSE_DAYS";

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// HMAC-SHA256 keys shorter than the digest size are rejected.
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Argon2id work factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    /// OWASP baseline for Argon2id.
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Token signing configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub signing_key: Vec<u8>,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("signing_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// A license provisioned at startup (development convenience).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedLicense {
    pub key: String,
    pub level: String,
    pub valid_for: Duration,
}

impl SeedLicense {
    /// Expiry of a license seeded at `now`, or `None` if it is not representable.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_signed(self.valid_for)
    }
}

/// Process-wide configuration, built once in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
    pub token: TokenConfig,
    pub hashing: HashingConfig,
    pub seed_license: Option<SeedLicense>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let signing_key = var(JWT_KEY_ENV).ok_or(ConfigError::Missing(JWT_KEY_ENV))?;
        if signing_key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(ConfigError::Invalid {
                name: JWT_KEY_ENV,
                reason: format!("must be at least {MIN_SIGNING_KEY_BYTES} bytes"),
            });
        }
        let issuer = var(JWT_ISSUER_ENV).ok_or(ConfigError::Missing(JWT_ISSUER_ENV))?;
        let audience = var(JWT_AUDIENCE_ENV).ok_or(ConfigError::Missing(JWT_AUDIENCE_ENV))?;

        let ttl_minutes: i64 = parse_or(&var, TOKEN_TTL_MINUTES_ENV, DEFAULT_TOKEN_TTL_MINUTES)?;
        let ttl = positive_duration(TOKEN_TTL_MINUTES_ENV, ttl_minutes, Duration::try_minutes)?;

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: parse_or(&var, ARGON2_MEMORY_KIB_ENV, defaults.memory_kib)?,
            iterations: parse_or(&var, ARGON2_ITERATIONS_ENV, defaults.iterations)?,
            parallelism: parse_or(&var, ARGON2_PARALLELISM_ENV, defaults.parallelism)?,
        };

        let log_format = match var(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        let seed_license = match var(SEED_LICENSE_KEY_ENV) {
            Some(key) => {
                let days: i64 = parse_or(&var, SEED_LICENSE_DAYS_ENV, 30)?;
                Some(SeedLicense {
                    key,
                    level: var(SEED_LICENSE_LEVEL_ENV).unwrap_or_else(|| "standard".to_string()),
                    valid_for: positive_duration(SEED_LICENSE_DAYS_ENV, days, Duration::try_days)?,
                })
            }
            None => None,
        };

        Ok(Self {
            host: var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&var, PORT_ENV, DEFAULT_PORT)?,
            data_dir: PathBuf::from(var(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
            log_format,
            token: TokenConfig {
                signing_key: signing_key.into_bytes(),
                issuer,
                audience,
                ttl,
            },
            hashing,
            seed_license,
        })
    }
}

/// Build a strictly positive duration, rejecting values chrono cannot represent.
fn positive_duration(
    name: &'static str,
    amount: i64,
    build: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    if amount <= 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be positive".to_string(),
        });
    }
    build(amount).ok_or_else(|| ConfigError::Invalid {
        name,
        reason: "out of range".to_string(),
    })
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
