pub mod account;
pub mod app_config;
pub mod config;
pub mod display;

pub use account::{
    format_timestamp, now_local, parse_timestamp, AccountRecord, ClassificationResult, Label,
    Provenance, CREATED_AT_UNKNOWN, TIMESTAMP_FORMAT,
};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use display::{format_count, format_created_at};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
