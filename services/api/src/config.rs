//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono::Duration;
use medtrack_core::{IdScheme, ReminderSettings};
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Without a database the service keeps doses in memory.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub allowed_origin: String,
    pub doses_collection: String,
    pub id_scheme: IdScheme,
    pub snooze_minutes: i64,
    pub small_icon: Option<String>,
    pub sound: Option<String>,
    pub diagnostics_capacity: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server and Database Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "127.0.0.1:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:3000");

        // --- Reminder Settings ---
        let doses_collection = var_or("DOSES_COLLECTION", "doses");
        if doses_collection.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "DOSES_COLLECTION".to_string(),
                "collection name must not be empty".to_string(),
            ));
        }

        let id_scheme = var_or("NOTIFICATION_ID_SCHEME", "legacy")
            .parse::<IdScheme>()
            .map_err(|e| {
                ConfigError::InvalidValue("NOTIFICATION_ID_SCHEME".to_string(), e.to_string())
            })?;

        let snooze_str = var_or("SNOOZE_MINUTES", "5");
        let snooze_minutes = match snooze_str.parse::<i64>() {
            Ok(minutes) if (1..=24 * 60).contains(&minutes) => minutes,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "SNOOZE_MINUTES".to_string(),
                    format!("'{}' is not a number of minutes between 1 and 1440", snooze_str),
                ))
            }
        };

        let small_icon = Some(var_or("NOTIFICATION_SMALL_ICON", "ic_stat_icon_name"))
            .filter(|icon| !icon.is_empty());
        let sound = Some(var_or("NOTIFICATION_SOUND", "default")).filter(|s| !s.is_empty());

        let capacity_str = var_or("DIAGNOSTICS_CAPACITY", "50");
        let diagnostics_capacity = capacity_str.parse::<usize>().map_err(|e| {
            ConfigError::InvalidValue("DIAGNOSTICS_CAPACITY".to_string(), e.to_string())
        })?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            allowed_origin,
            doses_collection,
            id_scheme,
            snooze_minutes,
            small_icon,
            sound,
            diagnostics_capacity,
        })
    }

    pub fn reminder_settings(&self) -> ReminderSettings {
        ReminderSettings {
            id_scheme: self.id_scheme,
            snooze: Duration::minutes(self.snooze_minutes),
            small_icon: self.small_icon.clone(),
            sound: self.sound.clone(),
            doses_collection: self.doses_collection.clone(),
        }
    }
}
