//! Configuration structs

mod app_config;

pub use app_config::{
    AlertConfig, AppConfig, AppSettings, ConfigError, Environment, JobConfig, ReactionConfig,
};
