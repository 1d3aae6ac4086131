use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::{DateTime, NaiveDate, Utc};

use crate::search::builders::DEFAULT_RELEVANCE_CANDIDATE_CAP;

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
    pub search: SearchConfig,
    pub analytics: AnalyticsConfig,
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

        let search = SearchConfig {
            relevance_weight: weight_var("APP_SEARCH_RELEVANCE_WEIGHT", 0.7)?,
            score_weight: weight_var("APP_SEARCH_SCORE_WEIGHT", 0.3)?,
            relevance_candidate_cap: match env::var("APP_SEARCH_CANDIDATE_CAP") {
                Ok(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|cap| *cap > 0)
                    .ok_or(ConfigError::InvalidCandidateCap)?,
                Err(_) => DEFAULT_RELEVANCE_CANDIDATE_CAP,
            },
        };

        let analytics = match env::var("APP_PLATFORM_LAUNCH") {
            Ok(raw) => AnalyticsConfig {
                platform_launch: parse_launch(&raw)?,
            },
            Err(_) => AnalyticsConfig::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            search,
            analytics,
        })
    }
}

fn weight_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|weight| weight.is_finite() && *weight >= 0.0)
            .ok_or(ConfigError::InvalidWeight { variable: name }),
        Err(_) => Ok(default),
    }
}

fn parse_launch(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| ConfigError::InvalidPlatformLaunch { source })
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

/// Fusion weights and the relevance candidate cap.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub relevance_weight: f64,
    pub score_weight: f64,
    pub relevance_candidate_cap: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            relevance_weight: 0.7,
            score_weight: 0.3,
            relevance_candidate_cap: DEFAULT_RELEVANCE_CANDIDATE_CAP,
        }
    }
}

/// Earliest instant `period=all` reaches back to.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    pub platform_launch: DateTime<Utc>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            platform_launch: DateTime::<Utc>::from_timestamp(1_577_836_800, 0)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWeight { variable: &'static str },
    InvalidCandidateCap,
    InvalidPlatformLaunch { source: chrono::ParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWeight { variable } => {
                write!(f, "{variable} must be a non-negative number")
            }
            ConfigError::InvalidCandidateCap => {
                write!(f, "APP_SEARCH_CANDIDATE_CAP must be a positive integer")
            }
            ConfigError::InvalidPlatformLaunch { .. } => {
                write!(f, "APP_PLATFORM_LAUNCH must be YYYY-MM-DD or RFC 3339")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidWeight { .. }
            | ConfigError::InvalidCandidateCap => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPlatformLaunch { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
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
            "APP_SEARCH_RELEVANCE_WEIGHT",
            "APP_SEARCH_SCORE_WEIGHT",
            "APP_SEARCH_CANDIDATE_CAP",
            "APP_PLATFORM_LAUNCH",
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
        assert_eq!(config.search, SearchConfig::default());
        assert_eq!(
            config.analytics.platform_launch,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        );
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
    fn reads_search_and_analytics_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SEARCH_RELEVANCE_WEIGHT", "0.5");
        env::set_var("APP_SEARCH_SCORE_WEIGHT", "0.5");
        env::set_var("APP_SEARCH_CANDIDATE_CAP", "250");
        env::set_var("APP_PLATFORM_LAUNCH", "2022-06-01");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.search.relevance_weight, 0.5);
        assert_eq!(config.search.score_weight, 0.5);
        assert_eq!(config.search.relevance_candidate_cap, 250);
        assert_eq!(
            config.analytics.platform_launch,
            Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap()
        );
        reset_env();
    }

    #[test]
    fn rejects_negative_weight_and_zero_cap() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SEARCH_SCORE_WEIGHT", "-1");
        let error = AppConfig::load().expect_err("negative weight rejected");
        assert!(error.to_string().contains("APP_SEARCH_SCORE_WEIGHT"));

        reset_env();
        env::set_var("APP_SEARCH_CANDIDATE_CAP", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidCandidateCap)
        ));
        reset_env();
    }

    #[test]
    fn rejects_unparseable_platform_launch() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PLATFORM_LAUNCH", "last tuesday");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPlatformLaunch { .. })
        ));
        reset_env();
    }
}
