use crate::workflows::assessment::{AssessmentPolicy, Score};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub policy: AssessmentPolicy,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            policy: load_policy()?,
        })
    }
}

fn load_policy() -> Result<AssessmentPolicy, ConfigError> {
    let mut policy = AssessmentPolicy::default();

    if let Ok(raw) = env::var("COMPETENCY_GROWTH_MIN_GAP") {
        policy.growth_min_gap = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|gap| gap.is_finite() && *gap >= 0.0)
            .ok_or_else(|| ConfigError::invalid_policy("COMPETENCY_GROWTH_MIN_GAP", &raw))?;
    }

    if let Ok(raw) = env::var("COMPETENCY_GROWTH_LIMIT") {
        policy.growth_limit = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::invalid_policy("COMPETENCY_GROWTH_LIMIT", &raw))?;
    }

    if let Ok(raw) = env::var("COMPETENCY_DEFAULT_TARGET") {
        policy.default_target = Score::parse(&raw)
            .map_err(|_| ConfigError::invalid_policy("COMPETENCY_DEFAULT_TARGET", &raw))?;
    }

    Ok(policy)
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPolicy { key: &'static str, value: String },
}

impl ConfigError {
    fn invalid_policy(key: &'static str, value: &str) -> Self {
        Self::InvalidPolicy {
            key,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPolicy { key, value } => {
                write!(f, "{key} has an invalid value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPolicy { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "COMPETENCY_GROWTH_MIN_GAP",
            "COMPETENCY_GROWTH_LIMIT",
            "COMPETENCY_DEFAULT_TARGET",
        ] {
            env::remove_var(key);
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
        assert_eq!(config.policy, AssessmentPolicy::default());
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
    fn policy_overrides_are_validated() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("COMPETENCY_GROWTH_MIN_GAP", "1.5");
        env::set_var("COMPETENCY_GROWTH_LIMIT", "5");
        env::set_var("COMPETENCY_DEFAULT_TARGET", "4");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.policy.growth_min_gap, 1.5);
        assert_eq!(config.policy.growth_limit, 5);
        assert_eq!(config.policy.default_target, Score::Four);

        env::set_var("COMPETENCY_DEFAULT_TARGET", "9");
        let err = AppConfig::load().expect_err("out of range target rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidPolicy {
                key: "COMPETENCY_DEFAULT_TARGET",
                ..
            }
        ));
        reset_env();
    }
}
