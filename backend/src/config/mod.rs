//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the listen port, which menu backend to talk to and its credentials, the
//! table count, the notice language, and the category display table.

pub mod display;

use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr, time::Duration};

use menu_adapters::{SupabaseConfig, TableNames};
use thiserror::Error;
use tracing::{info, warn};

pub use display::{DisplayTables, PriorityBadge, FALLBACK_ICON};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is required")]
    Missing { key: &'static str },

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

#[derive(Debug, Clone)]
pub enum BackendConfig {
    Supabase(SupabaseConfig),
    Memory { seed_file: Option<PathBuf> },
}

/// Language of user-facing notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Bn,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bn" => Ok(Locale::Bn),
            "en" => Ok(Locale::En),
            other => Err(format!("unsupported locale {other:?}, expected bn or en")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: BackendConfig,
    pub max_tables: u32,
    pub locale: Locale,
    pub notice_duration: Duration,
    pub session_idle: Duration,
    pub category_table: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so it can be
    /// exercised without touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match var(&lookup, "MENU_BACKEND")
            .unwrap_or_else(|| "supabase".to_string())
            .trim()
            .to_lowercase()
            .as_str()
        {
            "supabase" => BackendConfig::Supabase(SupabaseConfig {
                url: var(&lookup, "SUPABASE_URL").ok_or(ConfigError::Missing {
                    key: "SUPABASE_URL",
                })?,
                anon_key: read_secret(&lookup, "SUPABASE_ANON_KEY")?,
                tables: TableNames {
                    products: try_load(&lookup, "MENU_TABLE_PRODUCTS", "products")?,
                    orders: try_load(&lookup, "MENU_TABLE_ORDERS", "orders")?,
                    categories: try_load(&lookup, "MENU_TABLE_CATEGORIES", "categories")?,
                },
            }),
            "memory" => BackendConfig::Memory {
                seed_file: var(&lookup, "MENU_SEED_FILE").map(PathBuf::from),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "MENU_BACKEND",
                    value: other.to_string(),
                    reason: "expected supabase or memory".to_string(),
                })
            }
        };

        let max_tables: u32 = try_load(&lookup, "MENU_MAX_TABLES", "20")?;
        if max_tables == 0 {
            return Err(ConfigError::Invalid {
                key: "MENU_MAX_TABLES",
                value: max_tables.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            port: try_load(&lookup, "RUST_PORT", "3000")?,
            backend,
            max_tables,
            locale: try_load(&lookup, "MENU_LOCALE", "bn")?,
            notice_duration: Duration::from_secs(try_load(&lookup, "MENU_NOTICE_SECS", "5")?),
            session_idle: Duration::from_secs(try_load(
                &lookup,
                "MENU_SESSION_IDLE_SECS",
                "3600",
            )?),
            category_table: var(&lookup, "MENU_CATEGORY_TABLE").map(PathBuf::from),
        })
    }
}

fn var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = var(lookup, key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}

/// Reads a secret from the environment, falling back to a Docker secret file.
fn read_secret(
    lookup: &impl Fn(&str) -> Option<String>,
    secret_name: &'static str,
) -> Result<String, ConfigError> {
    if let Some(value) = var(lookup, secret_name) {
        return Ok(value.trim().to_string());
    }

    let path = format!("/run/secrets/{secret_name}");
    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
            ConfigError::Missing { key: secret_name }
        })
}
