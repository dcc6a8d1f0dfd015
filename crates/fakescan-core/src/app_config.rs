use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub genuine_dataset_path: PathBuf,
    pub fake_dataset_path: PathBuf,
    pub model_seed: u64,
    pub staleness_window_secs: u64,
    pub twitter_bearer_tokens: Vec<String>,
    pub twitter_api_base_url: String,
    pub twitter_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("genuine_dataset_path", &self.genuine_dataset_path)
            .field("fake_dataset_path", &self.fake_dataset_path)
            .field("model_seed", &self.model_seed)
            .field("staleness_window_secs", &self.staleness_window_secs)
            .field("database_url", &"[redacted]")
            .field(
                "twitter_bearer_tokens",
                &format!("[{} redacted]", self.twitter_bearer_tokens.len()),
            )
            .field("twitter_api_base_url", &self.twitter_api_base_url)
            .field("twitter_timeout_secs", &self.twitter_timeout_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
