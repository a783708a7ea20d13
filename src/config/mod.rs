// src/config/mod.rs
// Configuration and shared constants

pub mod env;
pub mod file;
pub mod validation;

pub use env::EnvConfig;
pub use file::FileConfig;
pub use validation::{ConfigIssue, ConfigValidation};

use crate::error::{GatewayError, Result};
use crate::messages::MessageCatalog;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Backend origin used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Per-call timeout applied when a request does not set its own
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Cookie the backend stores the CSRF token in
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

/// Header mutating requests carry the CSRF token in
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Resolved gateway configuration (defaults < file < environment)
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub csrf_cookie: String,
    pub messages: MessageCatalog,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            csrf_cookie: DEFAULT_CSRF_COOKIE.to_string(),
            messages: MessageCatalog::default(),
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load the full layered configuration.
    ///
    /// `path` overrides the default `~/.expense-gateway/config.toml`.
    pub fn load(path: Option<&Path>) -> Self {
        let file = match path {
            Some(p) => FileConfig::load_from(p),
            None => FileConfig::load(),
        };
        let env = EnvConfig::from_env();
        Self::default().merge_file(file).merge_env(env)
    }

    pub fn merge_file(mut self, file: FileConfig) -> Self {
        if let Some(url) = file.api.base_url {
            self.base_url = url;
        }
        if let Some(ms) = file.api.timeout_ms {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(cookie) = file.api.csrf_cookie {
            self.csrf_cookie = cookie;
        }
        if !file.messages.is_empty() {
            debug!(count = file.messages.len(), "Extra message translations loaded");
            self.messages = self.messages.with_overrides(file.messages);
        }
        self
    }

    pub fn merge_env(mut self, env: EnvConfig) -> Self {
        if let Some(url) = env.base_url {
            self.base_url = url;
        }
        if let Some(timeout) = env.timeout {
            self.timeout = timeout;
        }
        if let Some(cookie) = env.csrf_cookie {
            self.csrf_cookie = cookie;
        }
        self
    }

    /// Base URL without a trailing slash, parsed
    pub fn origin(&self) -> Result<Url> {
        Url::parse(self.base_url.trim_end_matches('/')).map_err(|e| {
            GatewayError::Config(format!("invalid base URL {:?}: {}", self.base_url, e))
        })
    }

    /// Validate and report problems without failing fast
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::default();

        match self.origin() {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    validation.reject(
                        "api.base_url",
                        format!("must be http(s), got {}", url.scheme()),
                    );
                } else if url.scheme() == "http" && !is_local(&url) {
                    validation.caution(
                        "api.base_url",
                        format!(
                            "{} uses plain http; session cookies travel unencrypted",
                            self.base_url
                        ),
                    );
                }
            }
            Err(e) => validation.reject("api.base_url", e.to_string()),
        }

        if self.timeout.is_zero() {
            validation.reject("api.timeout_ms", "must be greater than zero");
        }
        if self.csrf_cookie.trim().is_empty() {
            validation.reject("api.csrf_cookie", "must not be empty");
        }

        validation
    }
}

fn is_local(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("[::1]"))
}
