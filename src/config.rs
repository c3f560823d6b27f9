use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub sprint: SprintConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// Lifetime of a login session cookie, in hours.
    pub session_ttl_hours: i64,
    /// Lifetime of a magic-link token, in minutes. Tokens are single use.
    pub magic_link_ttl_minutes: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    /// Base URL the emailed magic link points at, e.g. https://ripl.app/auth/verify
    pub magic_link_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SprintConfig {
    /// Default length of a focus sprint started without an explicit duration.
    pub default_duration_minutes: i32,
    /// Cadence of the auto-completion sweeper. The original client recomputed
    /// remaining time once per second, so 1 keeps completion latency at the
    /// same granularity.
    pub sweep_interval_seconds: u64,
    /// Read notifications older than this many days are purged by the sweeper.
    pub notification_retention_days: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/ripl_db".to_string(),
            max_connections: 16,
            min_connections: 4,
            connection_timeout: 5,
            acquire_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24 * 30,
            magic_link_ttl_minutes: 15,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "Ripl <no-reply@ripl.app>".to_string(),
            magic_link_url: "http://localhost:5173/auth/verify".to_string(),
        }
    }
}

impl Default for SprintConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: 25,
            sweep_interval_seconds: 1,
            notification_retention_days: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            sprint: SprintConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Ripl.toml (base configuration file)
    /// 2. Environment variables (prefixed with RIPL_)
    /// 3. DATABASE_URL environment variable (for backwards compatibility)
    pub fn load() -> Result<Self, figment::Error> {
        let figment = Figment::new()
            .merge(Toml::string(&toml::to_string(&Config::default()).unwrap()).nested())
            .merge(Toml::file("Ripl.toml").nested())
            .merge(Env::prefixed("RIPL_").split("_"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()));

        figment.extract()
    }
}
