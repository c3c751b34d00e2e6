use std::{fmt, path::PathBuf, time::Duration};

use anyhow::Context;
use serde::{
    Deserialize, Deserializer,
    de::{self, DeserializeOwned},
};
use sqlx::{Connection, MySqlConnection, mysql::MySqlConnectOptions};

use crate::readiness::RetryPolicy;

pub const CRAWLER_DB_USER: &str = "crawler";
pub const LOADER_DB_USER: &str = "dataloader";

const DEFAULT_HOST: &str = "mariadb";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_PASSWORD: &str = "a-insights";
const DEFAULT_DATABASE: &str = "crawler_dev";

/// The `MARIADB_*` env vars, all optional.
#[derive(Debug, Default, Deserialize)]
pub struct MariaDbEnv {
    host: Option<String>,
    #[serde(default, deserialize_with = "port_or_service_link")]
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
}

// Docker links and Kubernetes service env vars set `MARIADB_PORT` to
// `tcp://<ip>:<port>` for a service named `mariadb`.
fn port_or_service_link<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u16>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(de)? else {
        return Ok(None);
    };
    let port = match raw.trim().strip_prefix("tcp://") {
        Some(link) => link.rsplit_once(':').map(|(_, port)| port).unwrap_or(""),
        None => raw.trim(),
    };
    port.parse()
        .map(Some)
        .map_err(|e| de::Error::custom(format!("invalid port {raw:?}: {e}")))
}

/// Where and as whom a pipeline connects.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    /// Reads `MARIADB_*`. Only the user default differs between the pipelines.
    pub fn from_env(default_user: &str) -> anyhow::Result<Self> {
        let env = MariaDbEnv::load_from_env_prefixed("MARIADB_")?;
        Ok(Self::from_parts(env, default_user))
    }

    pub fn from_parts(env: MariaDbEnv, default_user: &str) -> Self {
        Self {
            host: env.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: env.port.unwrap_or(DEFAULT_PORT),
            user: env.user.unwrap_or_else(|| default_user.to_string()),
            password: env.password.unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            database: env.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        }
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    /// Opens one dedicated connection. There is no pool on purpose: each run
    /// owns exactly one connection from start to finish.
    pub async fn connect(&self) -> Result<MySqlConnection, sqlx::Error> {
        MySqlConnection::connect_with(&self.connect_options()).await
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// The `CRAWLER_*` env vars.
#[derive(Debug, Deserialize)]
pub struct CrawlerConfig {
    #[serde(default = "default_startup_delay_secs")]
    startup_delay_secs: u64,
    #[serde(default = "default_connect_attempts")]
    connect_attempts: u32,
    #[serde(default = "default_connect_backoff_ms")]
    connect_backoff_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_startup_delay_secs() -> u64 {
    10
}

fn default_connect_attempts() -> u32 {
    5
}

fn default_connect_backoff_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl CrawlerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load_from_env_prefixed("CRAWLER_")
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }

    pub fn connect_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.connect_attempts,
            Duration::from_millis(self.connect_backoff_ms),
        )
    }
}

/// The `DATA_LOADER_*` env vars.
#[derive(Debug, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_loader_file")]
    pub file: PathBuf,
}

fn default_loader_file() -> PathBuf {
    PathBuf::from("./data_loader/example-data.xlsx")
}

impl LoaderConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load_from_env_prefixed("DATA_LOADER_")
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env_prefixed(prefix: &str) -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config = envy::prefixed(prefix)
            .from_env::<Self>()
            .with_context(|| format!("failed to load {prefix}* env variables into config struct"))?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
