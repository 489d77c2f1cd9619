//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use market_core::{AlertDefaults, MinuteOfDay, MAX_LEAD_DAYS};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub reactions: ReactionConfig,
    pub alerts: AlertConfig,
    pub jobs: JobConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Reaction cycle and transaction settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionConfig {
    /// Days between counter resets
    #[serde(default = "default_cycle_days")]
    pub cycle_days: u32,
    /// Attempts per optimistic transaction before giving up
    #[serde(default = "default_tx_max_attempts")]
    pub tx_max_attempts: u32,
    /// Mutations per cleanup commit
    #[serde(default = "default_reset_batch_size")]
    pub reset_batch_size: usize,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            cycle_days: default_cycle_days(),
            tx_max_attempts: default_tx_max_attempts(),
            reset_batch_size: default_reset_batch_size(),
        }
    }
}

/// Defaults for newly saved markets
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_time_of_day")]
    pub default_time_of_day: MinuteOfDay,
    #[serde(default = "default_lead_days")]
    pub default_lead_days: u8,
}

impl AlertConfig {
    #[must_use]
    pub fn defaults(&self) -> AlertDefaults {
        AlertDefaults {
            time_of_day: self.default_time_of_day,
            lead_days: self.default_lead_days,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            default_time_of_day: default_time_of_day(),
            default_lead_days: default_lead_days(),
        }
    }
}

/// Background job settings
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    #[serde(default = "default_reset_interval_secs")]
    pub reset_interval_secs: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            reset_interval_secs: default_reset_interval_secs(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "market-engine".to_string()
}

fn default_cycle_days() -> u32 {
    4
}

fn default_tx_max_attempts() -> u32 {
    5
}

fn default_reset_batch_size() -> usize {
    500
}

fn default_time_of_day() -> MinuteOfDay {
    AlertDefaults::default().time_of_day
}

fn default_lead_days() -> u8 {
    1
}

fn default_reset_interval_secs() -> u64 {
    86_400 // daily
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::default(),
            },
            reactions: ReactionConfig::default(),
            alerts: AlertConfig::default(),
            jobs: JobConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unusable value
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup; unset or blank keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            app: AppSettings {
                name: get("APP_NAME").unwrap_or_else(default_app_name),
                env: parse_var(&get, "APP_ENV", Environment::default())?,
            },
            reactions: ReactionConfig {
                cycle_days: parse_var(&get, "REACTION_CYCLE_DAYS", default_cycle_days())?,
                tx_max_attempts: parse_var(
                    &get,
                    "REACTION_TX_MAX_ATTEMPTS",
                    default_tx_max_attempts(),
                )?,
                reset_batch_size: parse_var(
                    &get,
                    "REACTION_RESET_BATCH_SIZE",
                    default_reset_batch_size(),
                )?,
            },
            alerts: AlertConfig {
                default_time_of_day: match get("ALERT_DEFAULT_TIME_OF_DAY") {
                    None => default_time_of_day(),
                    Some(raw) => MinuteOfDay::parse_hh_mm(raw.trim())
                        .ok_or(ConfigError::InvalidValue("ALERT_DEFAULT_TIME_OF_DAY", raw))?,
                },
                default_lead_days: parse_var(&get, "ALERT_DEFAULT_LEAD_DAYS", default_lead_days())?,
            },
            jobs: JobConfig {
                reset_interval_secs: parse_var(
                    &get,
                    "RESET_JOB_INTERVAL_SECS",
                    default_reset_interval_secs(),
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Range checks that a plain parse cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reactions.cycle_days == 0 {
            return Err(invalid("REACTION_CYCLE_DAYS", self.reactions.cycle_days));
        }
        if self.reactions.tx_max_attempts == 0 {
            return Err(invalid(
                "REACTION_TX_MAX_ATTEMPTS",
                self.reactions.tx_max_attempts,
            ));
        }
        // Cleanup deletes a venue-indexed and a user-indexed record per user.
        if self.reactions.reset_batch_size < 2 {
            return Err(invalid(
                "REACTION_RESET_BATCH_SIZE",
                self.reactions.reset_batch_size,
            ));
        }
        if self.alerts.default_lead_days > MAX_LEAD_DAYS {
            return Err(invalid(
                "ALERT_DEFAULT_LEAD_DAYS",
                self.alerts.default_lead_days,
            ));
        }
        if self.jobs.reset_interval_secs == 0 {
            return Err(invalid(
                "RESET_JOB_INTERVAL_SECS",
                self.jobs.reset_interval_secs,
            ));
        }
        Ok(())
    }
}

fn parse_var<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
    }
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue(key, value.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
