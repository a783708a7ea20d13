// src/config/env.rs
// Environment-based configuration overrides

use std::time::Duration;
use tracing::{debug, warn};

/// Overrides read from EXPENSE_GATEWAY_* variables
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// Backend base URL (EXPENSE_GATEWAY_URL)
    pub base_url: Option<String>,
    /// Per-call timeout (EXPENSE_GATEWAY_TIMEOUT_MS)
    pub timeout: Option<Duration>,
    /// CSRF cookie name (EXPENSE_GATEWAY_CSRF_COOKIE)
    pub csrf_cookie: Option<String>,
}

impl EnvConfig {
    /// Load overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load overrides through an arbitrary lookup (tests pass a closure)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout = read("EXPENSE_GATEWAY_TIMEOUT_MS").and_then(|raw| {
            match raw.trim().parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(_) => {
                    warn!(value = %raw, "Invalid EXPENSE_GATEWAY_TIMEOUT_MS, ignoring");
                    None
                }
            }
        });

        let config = Self {
            base_url: read("EXPENSE_GATEWAY_URL"),
            timeout,
            csrf_cookie: read("EXPENSE_GATEWAY_CSRF_COOKIE"),
        };
        if let Some(url) = &config.base_url {
            debug!(base_url = %url, "Base URL overridden from environment");
        }
        config
    }
}
