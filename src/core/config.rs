//! Environment-driven bot configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use std::time::Duration;

/// Default period of the delivery scheduler
pub const DEFAULT_TICK_SECONDS: u64 = 30;
/// Default upper bound on a single transport send
pub const DEFAULT_DELIVERY_TIMEOUT_SECONDS: u64 = 15;
/// One week in minutes
pub const DEFAULT_MAX_CUSTOM_INTERVAL_MINUTES: u32 = 7 * 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub discord_guild_id: Option<String>,
    pub database_path: String,
    pub log_level: String,
    pub reminders_config_path: String,
    pub scheduler_tick_seconds: u64,
    pub delivery_timeout_seconds: u64,
    pub max_custom_interval_minutes: u32,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token =
            get("DISCORD_TOKEN").ok_or_else(|| anyhow::anyhow!("DISCORD_TOKEN must be set"))?;

        let scheduler_tick_seconds = parse_or(
            get("SCHEDULER_TICK_SECONDS"),
            "SCHEDULER_TICK_SECONDS",
            DEFAULT_TICK_SECONDS,
        )?;
        // Intervals have minute granularity, the tick has to stay below that
        if !(1..=60).contains(&scheduler_tick_seconds) {
            return Err(anyhow::anyhow!(
                "SCHEDULER_TICK_SECONDS must be between 1 and 60, got {}",
                scheduler_tick_seconds
            ));
        }

        let delivery_timeout_seconds = parse_or(
            get("DELIVERY_TIMEOUT_SECONDS"),
            "DELIVERY_TIMEOUT_SECONDS",
            DEFAULT_DELIVERY_TIMEOUT_SECONDS,
        )?;
        if delivery_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("DELIVERY_TIMEOUT_SECONDS must be at least 1"));
        }

        let max_custom_interval_minutes = parse_or(
            get("MAX_CUSTOM_INTERVAL_MINUTES"),
            "MAX_CUSTOM_INTERVAL_MINUTES",
            DEFAULT_MAX_CUSTOM_INTERVAL_MINUTES,
        )?;
        if max_custom_interval_minutes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CUSTOM_INTERVAL_MINUTES must be at least 1"
            ));
        }

        Ok(Config {
            discord_token,
            discord_guild_id: get("DISCORD_GUILD_ID"),
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "reminders.db".to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            reminders_config_path: get("REMINDERS_CONFIG_PATH")
                .unwrap_or_else(|| "reminders.yaml".to_string()),
            scheduler_tick_seconds,
            delivery_timeout_seconds,
            max_custom_interval_minutes,
        })
    }

    pub fn scheduler_tick(&self) -> Duration {
        Duration::from_secs(self.scheduler_tick_seconds)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_seconds)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)),
        None => Ok(default),
    }
}
