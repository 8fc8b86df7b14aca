use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use zeroize::Zeroizing;

pub static CONF: Lazy<Config> = Lazy::new(|| Config::from_env().expect("Failed to load config"));

const DB_USERNAME_VAR: &str = "WHEN2FLY_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "WHEN2FLY_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "WHEN2FLY_DB_HOSTNAME";
const DB_PORT_VAR: &str = "WHEN2FLY_DB_PORT";
const DB_NAME_VAR: &str = "WHEN2FLY_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "WHEN2FLY_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "WHEN2FLY_DB_IDLE_TIMEOUT_SECS";

const UPDATE_FREQUENCY_SECS_VAR: &str = "WHEN2FLY_UPDATE_FREQUENCY_SECS";
const WORKER_THREADS_VAR: &str = "WHEN2FLY_WORKER_THREADS";
const MAX_BLOCKING_THREADS_VAR: &str = "WHEN2FLY_MAX_BLOCKING_THREADS";
const LOG_LEVEL_VAR: &str = "WHEN2FLY_LOG_LEVEL";

const CLEAR_OLD_NOTIFICATIONS_JOB_FREQUENCY_SECS_VAR: &str =
    "WHEN2FLY_CLEAR_OLD_NOTIFICATIONS_JOB_FREQUENCY_SECS";
const READ_NOTIFICATION_RETENTION_DAYS_VAR: &str = "WHEN2FLY_READ_NOTIFICATION_RETENTION_DAYS";

pub struct Config {
    pub db_username: String,
    pub db_password: Zeroizing<String>,
    pub db_hostname: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_max_connections: u32,
    pub db_idle_timeout: Duration,

    pub update_frequency: Duration,
    pub worker_threads: usize,
    pub max_blocking_threads: usize,
    pub log_level: String,

    pub clear_old_notifications_job_frequency: Duration,
    pub read_notification_retention_days: u64,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let cpu_count = num_cpus::get();

        Ok(Config {
            db_username: env_var(DB_USERNAME_VAR)?,
            db_password: Zeroizing::new(env_var(DB_PASSWORD_VAR)?),
            db_hostname: env_var(DB_HOSTNAME_VAR)?,
            db_port: env_var(DB_PORT_VAR)?,
            db_name: env_var(DB_NAME_VAR)?,
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 8),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),

            update_frequency: Duration::from_secs(env_var_or(UPDATE_FREQUENCY_SECS_VAR, 60)),
            worker_threads: env_var_or(WORKER_THREADS_VAR, cpu_count),
            max_blocking_threads: env_var_or(MAX_BLOCKING_THREADS_VAR, cpu_count * 4),
            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),

            clear_old_notifications_job_frequency: Duration::from_secs(env_var_or(
                CLEAR_OLD_NOTIFICATIONS_JOB_FREQUENCY_SECS_VAR,
                86400,
            )),
            read_notification_retention_days: env_var_or(READ_NOTIFICATION_RETENTION_DAYS_VAR, 30),
        })
    }

    pub fn database_uri(&self) -> Zeroizing<String> {
        Zeroizing::new(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_username, *self.db_password, self.db_hostname, self.db_port, self.db_name,
        ))
    }
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
