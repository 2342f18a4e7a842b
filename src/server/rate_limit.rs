//! Fixed-window request limiter keyed by client id

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

/// Verdict for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: Instant,
}

impl RateDecision {
    /// Whole seconds until the window resets (rounded up)
    pub fn retry_after_secs(&self, now: Instant) -> u64 {
        let wait = self.reset_at.saturating_duration_since(now);
        wait.as_millis().div_ceil(1000) as u64
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: HashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
        }
    }

    /// Count a request from `client` and decide whether it may proceed
    pub fn check(&mut self, client: &str, now: Instant) -> RateDecision {
        let max = self.config.max_requests;
        match self.windows.get_mut(client) {
            Some(window) if window.reset_at >= now => {
                if window.count >= max {
                    return RateDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at: window.reset_at,
                    };
                }
                window.count += 1;
                RateDecision {
                    allowed: true,
                    remaining: max - window.count,
                    reset_at: window.reset_at,
                }
            }
            _ => {
                let reset_at = now + self.config.window;
                self.windows
                    .insert(client.to_string(), Window { count: 1, reset_at });
                RateDecision {
                    allowed: max >= 1,
                    remaining: max.saturating_sub(1),
                    reset_at,
                }
            }
        }
    }

    /// Forget windows that already reset
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, w| w.reset_at >= now);
        before - self.windows.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Client id from proxy headers, falling back to the peer address
pub fn client_identifier(headers: &HeaderMap, peer: Option<std::net::SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    if let Some(ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return ip.trim().to_string();
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
