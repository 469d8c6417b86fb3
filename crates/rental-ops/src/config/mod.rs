use crate::workflows::turnover::{ClockTime, CleaningPolicy};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scheduling: SchedulingConfig,
    pub snapshot: SnapshotConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            scheduling: SchedulingConfig::from_env()?,
            snapshot: SnapshotConfig::from_env(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// House rules for turnover scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingConfig {
    pub policy: CleaningPolicy,
}

impl SchedulingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = CleaningPolicy::default();

        let checkout_default = clock_var("TURNOVER_CHECKOUT_DEFAULT", defaults.checkout_default)?;
        let checkin_default = clock_var("TURNOVER_CHECKIN_DEFAULT", defaults.checkin_default)?;
        let critical_threshold_minutes = match env::var("TURNOVER_CRITICAL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|minutes| *minutes >= 0)
                .ok_or(ConfigError::InvalidCriticalThreshold(raw))?,
            Err(_) => defaults.critical_threshold_minutes,
        };

        Ok(Self {
            policy: CleaningPolicy {
                checkout_default,
                checkin_default,
                critical_threshold_minutes,
            },
        })
    }
}

fn clock_var(name: &'static str, fallback: ClockTime) -> Result<ClockTime, ConfigError> {
    match env::var(name) {
        Ok(raw) => ClockTime::parse(&raw).map_err(|_| ConfigError::InvalidClockTime {
            variable: name,
            value: raw,
        }),
        Err(_) => Ok(fallback),
    }
}

/// Optional CSV exports the server seeds its in-memory snapshot from.
#[derive(Debug, Clone, Default)]
pub struct SnapshotConfig {
    pub apartments_csv: Option<PathBuf>,
    pub reservations_csv: Option<PathBuf>,
    pub cleanings_csv: Option<PathBuf>,
}

impl SnapshotConfig {
    fn from_env() -> Self {
        let path = |name: &str| {
            env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };

        Self {
            apartments_csv: path("TURNOVER_APARTMENTS_CSV"),
            reservations_csv: path("TURNOVER_RESERVATIONS_CSV"),
            cleanings_csv: path("TURNOVER_CLEANINGS_CSV"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidClockTime { variable: &'static str, value: String },
    InvalidCriticalThreshold(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', got '{value}'")
            }
            ConfigError::InvalidClockTime { variable, value } => {
                write!(f, "{variable} must be a HH:MM time, got '{value}'")
            }
            ConfigError::InvalidCriticalThreshold(value) => write!(
                f,
                "TURNOVER_CRITICAL_MINUTES must be a non-negative integer, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "TURNOVER_CHECKOUT_DEFAULT",
            "TURNOVER_CHECKIN_DEFAULT",
            "TURNOVER_CRITICAL_MINUTES",
            "TURNOVER_APARTMENTS_CSV",
            "TURNOVER_RESERVATIONS_CSV",
            "TURNOVER_CLEANINGS_CSV",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.scheduling.policy, CleaningPolicy::default());
        assert!(config.snapshot.reservations_csv.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn scheduling_policy_is_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("TURNOVER_CHECKOUT_DEFAULT", "10:30");
        env::set_var("TURNOVER_CHECKIN_DEFAULT", "15:00");
        env::set_var("TURNOVER_CRITICAL_MINUTES", "90");
        let config = AppConfig::load().expect("config loads");
        let policy = config.scheduling.policy;
        assert_eq!(policy.checkout_default, ClockTime::from_hm(10, 30).unwrap());
        assert_eq!(policy.checkin_default, ClockTime::from_hm(15, 0).unwrap());
        assert_eq!(policy.critical_threshold_minutes, 90);
        reset_env();
    }

    #[test]
    fn rejects_malformed_policy_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("TURNOVER_CHECKIN_DEFAULT", "2pm");
        let err = AppConfig::load().expect_err("bad time rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidClockTime {
                variable: "TURNOVER_CHECKIN_DEFAULT",
                ..
            }
        ));

        reset_env();
        env::set_var("TURNOVER_CRITICAL_MINUTES", "-5");
        let err = AppConfig::load().expect_err("negative threshold rejected");
        assert!(matches!(err, ConfigError::InvalidCriticalThreshold(_)));
        reset_env();
    }
}
