use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let twitter_bearer_tokens = collect_bearer_tokens(&lookup)?;

    let env = parse_environment(&or_default("FAKESCAN_ENV", "development"));

    let bind_addr = parse("FAKESCAN_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("FAKESCAN_LOG_LEVEL", "info");
    let genuine_dataset_path =
        PathBuf::from(or_default("FAKESCAN_GENUINE_DATASET", "./data/users.csv"));
    let fake_dataset_path = PathBuf::from(or_default("FAKESCAN_FAKE_DATASET", "./data/fusers.csv"));
    let model_seed = parse_u64("FAKESCAN_MODEL_SEED", "42")?;
    let staleness_window_secs = parse_u64("FAKESCAN_STALENESS_WINDOW_SECS", "10800")?;

    let twitter_api_base_url = or_default("TWITTER_API_BASE_URL", "https://api.twitter.com/2/");
    let twitter_timeout_secs = parse_u64("FAKESCAN_TWITTER_TIMEOUT_SECS", "10")?;
    if twitter_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FAKESCAN_TWITTER_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let db_max_connections = parse_u32("FAKESCAN_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("FAKESCAN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("FAKESCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        genuine_dataset_path,
        fake_dataset_path,
        model_seed,
        staleness_window_secs,
        twitter_bearer_tokens,
        twitter_api_base_url,
        twitter_timeout_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Assemble the credential pool in rotation order.
///
/// `TWITTER_BEARER_TOKENS` (comma-separated) comes first, followed by
/// `BEARER_TOKEN_1`, `BEARER_TOKEN_2`, ... up to the first missing index.
fn collect_bearer_tokens<F>(lookup: &F) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let mut tokens: Vec<String> = lookup("TWITTER_BEARER_TOKENS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    for index in 1.. {
        match lookup(&format!("BEARER_TOKEN_{index}")) {
            Ok(token) if !token.trim().is_empty() => tokens.push(token.trim().to_string()),
            _ => break,
        }
    }

    if tokens.is_empty() {
        return Err(ConfigError::MissingEnvVar(
            "TWITTER_BEARER_TOKENS".to_string(),
        ));
    }
    Ok(tokens)
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
