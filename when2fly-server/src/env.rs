use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use when2fly_common::store::StorageBackend;
use zeroize::Zeroizing;

#[cfg(not(test))]
pub static CONF: Lazy<Config> = Lazy::new(|| Config::from_env().expect("Failed to load config"));

#[cfg(test)]
pub static CONF: Lazy<Config> = Lazy::new(testing::config);

const DB_USERNAME_VAR: &str = "WHEN2FLY_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "WHEN2FLY_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "WHEN2FLY_DB_HOSTNAME";
const DB_PORT_VAR: &str = "WHEN2FLY_DB_PORT";
const DB_NAME_VAR: &str = "WHEN2FLY_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "WHEN2FLY_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "WHEN2FLY_DB_IDLE_TIMEOUT_SECS";

const STORAGE_VAR: &str = "WHEN2FLY_STORAGE";
const TOKEN_SIGNING_KEY_VAR: &str = "WHEN2FLY_TOKEN_SIGNING_KEY_B64";
const ALLOWED_EMAIL_DOMAIN_VAR: &str = "WHEN2FLY_ALLOWED_EMAIL_DOMAIN";
const CORS_ALLOWED_ORIGINS_VAR: &str = "WHEN2FLY_CORS_ALLOWED_ORIGINS";
const HEALTH_ENDPOINT_KEY_VAR: &str = "WHEN2FLY_HEALTH_ENDPOINT_KEY";

const ACTIX_WORKER_COUNT_VAR: &str = "WHEN2FLY_ACTIX_WORKER_COUNT";
const LOG_LEVEL_VAR: &str = "WHEN2FLY_LOG_LEVEL";
const BIND_HOST_VAR: &str = "WHEN2FLY_BIND_HOST";

const MIN_TOKEN_SIGNING_KEY_SIZE: usize = 32;

const DEFAULT_ALLOWED_EMAIL_DOMAIN: &str = "g.ucla.edu";
const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:5173,https://when2-fly.vercel.app";

pub struct DbConfig {
    pub username: String,
    pub password: Zeroizing<String>,
    pub hostname: String,
    pub port: u16,
    pub name: String,
}

impl DbConfig {
    pub fn database_uri(&self) -> Zeroizing<String> {
        Zeroizing::new(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, *self.password, self.hostname, self.port, self.name,
        ))
    }
}

pub struct Config {
    pub storage: StorageBackend,
    /// Only present for the postgres backend.
    pub db: Option<DbConfig>,
    pub db_max_connections: u32,
    pub db_idle_timeout: Duration,

    pub token_signing_key: Zeroizing<Vec<u8>>,
    pub allowed_email_domain: String,
    pub cors_allowed_origins: Vec<String>,
    pub health_endpoint_key: Zeroizing<String>,

    pub actix_worker_count: usize,
    pub log_level: String,
    pub bind_host: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let storage = match std::env::var(STORAGE_VAR) {
            Ok(s) => s
                .parse::<StorageBackend>()
                .map_err(|_| ConfigError::invalid(STORAGE_VAR))?,
            Err(_) => StorageBackend::Postgres,
        };

        let db = match storage {
            StorageBackend::Postgres => Some(DbConfig {
                username: env_var(DB_USERNAME_VAR)?,
                password: Zeroizing::new(env_var(DB_PASSWORD_VAR)?),
                hostname: env_var(DB_HOSTNAME_VAR)?,
                port: env_var(DB_PORT_VAR)?,
                name: env_var(DB_NAME_VAR)?,
            }),
            StorageBackend::Memory => None,
        };

        let token_signing_key = Zeroizing::new(
            b64.decode(env_var::<String>(TOKEN_SIGNING_KEY_VAR)?.as_bytes())
                .map_err(|_| ConfigError::invalid(TOKEN_SIGNING_KEY_VAR))?,
        );

        if token_signing_key.len() < MIN_TOKEN_SIGNING_KEY_SIZE {
            return Err(ConfigError::invalid(TOKEN_SIGNING_KEY_VAR));
        }

        let allowed_email_domain = match std::env::var(ALLOWED_EMAIL_DOMAIN_VAR) {
            Ok(domain) => domain.trim().to_lowercase(),
            Err(_) => String::from(DEFAULT_ALLOWED_EMAIL_DOMAIN),
        };

        let cors_allowed_origins = parse_origins(&env_var_or(
            CORS_ALLOWED_ORIGINS_VAR,
            String::from(DEFAULT_CORS_ALLOWED_ORIGINS),
        ));

        Ok(Config {
            storage,
            db,
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 48),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),

            token_signing_key,
            allowed_email_domain,
            cors_allowed_origins,
            health_endpoint_key: Zeroizing::new(env_var(HEALTH_ENDPOINT_KEY_VAR)?),

            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),
            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
            bind_host: env_var_or(BIND_HOST_VAR, String::from("127.0.0.1")),
        })
    }
}

fn parse_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}
