//! Service configuration from the environment

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use super::rate_limit::RateLimitConfig;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Base URL used to build `gameUrl` links
    pub public_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub session_ttl: Duration,
    pub max_sessions: usize,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
        Self {
            addr,
            public_url: format!("http://{addr}"),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            session_ttl: Duration::from_secs(60 * 60),
            max_sessions: 1000,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable lookup (environment, tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let addr: SocketAddr = parse_var(&lookup, "QUIZ_RUSH_ADDR")?.unwrap_or(defaults.addr);
        let public_url = lookup("QUIZ_RUSH_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://{addr}"));
        let api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        let model = lookup("GEMINI_MODEL").unwrap_or(defaults.model);
        let session_ttl = parse_var::<u64, _>(&lookup, "SESSION_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_ttl);
        let max_sessions = parse_var(&lookup, "MAX_SESSIONS")?.unwrap_or(defaults.max_sessions);
        let rate_limit = RateLimitConfig {
            max_requests: parse_var(&lookup, "RATE_LIMIT_MAX")?
                .unwrap_or(defaults.rate_limit.max_requests),
            window: parse_var::<u64, _>(&lookup, "RATE_LIMIT_WINDOW_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit.window),
        };

        Ok(Self {
            addr,
            public_url,
            api_key,
            model,
            session_ttl,
            max_sessions,
            rate_limit,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
