//! Configuration loaded from environment variables.

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use gemini_ai::GeminiConfig;

/// Deployment mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    pub environment: Environment,
    /// sqlx database URL.
    pub database_url: String,
    /// Auth provider base URL.
    pub supabase_url: String,
    /// Credential sent as `apikey` to the auth provider.
    pub supabase_service_key: String,
    /// `None` when no Gemini API key is configured.
    pub gemini: Option<GeminiConfig>,
    /// Per-model generation timeout.
    pub ai_timeout: Duration,
    /// Requests allowed on `/api/ai/*` per window.
    pub ai_rate_limit: u32,
    pub ai_rate_window: Duration,
    /// Allowed CORS origin, `*` for any.
    pub cors_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 5000)),
            environment: Environment::Development,
            database_url: "sqlite:doccraft.db?mode=rwc".to_string(),
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            gemini: None,
            ai_timeout: Duration::from_secs(60),
            ai_rate_limit: 10,
            ai_rate_window: Duration::from_secs(60),
            cors_origin: "*".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `PORT` | Listen port on `0.0.0.0` | `5000` |
    /// | `APP_ENV` / `NODE_ENV` | `development` or `production` | `development` |
    /// | `DATABASE_URL` | sqlx database URL | `sqlite:doccraft.db?mode=rwc` |
    /// | `SUPABASE_URL` | Auth provider URL | (required) |
    /// | `SUPABASE_SERVICE_KEY` | Auth provider key | (required) |
    /// | `GEMINI_API_KEY` | Gemini key; AI disabled when unset | (none) |
    /// | `AI_TIMEOUT_SECS` | Per-model timeout | `60` |
    /// | `AI_RATE_LIMIT` | AI requests per window | `10` |
    /// | `AI_RATE_WINDOW_SECS` | AI rate window | `60` |
    /// | `CORS_ORIGIN` | Allowed origin | `*` |
    ///
    /// Gemini model selection is read by [`GeminiConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port: u16 = match env::var("PORT") {
            Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidPort(value))?,
            Err(_) => defaults.addr.port(),
        };

        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .map(|v| Environment::parse(&v))
            .unwrap_or_default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let supabase_url = required("SUPABASE_URL")?;
        let supabase_service_key = required("SUPABASE_SERVICE_KEY")?;

        let gemini = GeminiConfig::from_env().ok();

        Ok(Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            environment,
            database_url,
            supabase_url,
            supabase_service_key,
            gemini,
            ai_timeout: secs("AI_TIMEOUT_SECS")?.unwrap_or(defaults.ai_timeout),
            ai_rate_limit: number("AI_RATE_LIMIT")?.unwrap_or(defaults.ai_rate_limit),
            ai_rate_window: secs("AI_RATE_WINDOW_SECS")?.unwrap_or(defaults.ai_rate_window),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        })
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.environment.is_production() {
            "info,sqlx=warn"
        } else {
            "debug,sqlx=warn,hyper=info,reqwest=info"
        }
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn number(key: &'static str) -> Result<Option<u32>, ConfigError> {
    match env::var(key) {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ConfigError::InvalidNumber { key, value }),
        },
        Err(_) => Ok(None),
    }
}

fn secs(key: &'static str) -> Result<Option<Duration>, ConfigError> {
    Ok(number(key)?.map(|n| Duration::from_secs(u64::from(n))))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid PORT: {0}")]
    InvalidPort(String),

    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse(" PRODUCTION "), Environment::Production);
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse("staging"), Environment::Development);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.addr.port(), 5000);
        assert_eq!(config.ai_rate_limit, 10);
        assert_eq!(config.ai_rate_window, Duration::from_secs(60));
        assert!(!config.environment.is_production());
    }
}
