use std::net::SocketAddr;

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
    pub enrich_url: String,
    pub enrich_model: String,
    pub enrich_api_key: Option<String>,
    pub enrich_timeout_secs: u64,
    pub enrich_interval_secs: u64,
    pub enrich_batch_size: i64,
    pub cache_ttl_secs: u64,
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
            .field("database_url", &"[redacted]")
            .field("enrich_url", &self.enrich_url)
            .field("enrich_model", &self.enrich_model)
            .field(
                "enrich_api_key",
                &self.enrich_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("enrich_timeout_secs", &self.enrich_timeout_secs)
            .field("enrich_interval_secs", &self.enrich_interval_secs)
            .field("enrich_batch_size", &self.enrich_batch_size)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
