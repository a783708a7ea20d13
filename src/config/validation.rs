// src/config/validation.rs
// Findings from checking a resolved GatewayConfig

use std::fmt;

/// One problem with a resolved setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Config file key the issue is about (`api.base_url`, ...)
    pub key: &'static str,
    pub message: String,
    /// Fatal issues stop every command except `config`
    pub fatal: bool,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = if self.fatal { "error" } else { "warning" };
        write!(f, "{}: {}: {}", level, self.key, self.message)
    }
}

/// Every issue found by `GatewayConfig::validate`, in check order
#[derive(Debug, Default)]
pub struct ConfigValidation {
    issues: Vec<ConfigIssue>,
}

impl ConfigValidation {
    pub(crate) fn reject(&mut self, key: &'static str, message: impl Into<String>) {
        self.push(key, message.into(), true);
    }

    pub(crate) fn caution(&mut self, key: &'static str, message: impl Into<String>) {
        self.push(key, message.into(), false);
    }

    fn push(&mut self, key: &'static str, message: String, fatal: bool) {
        self.issues.push(ConfigIssue { key, message, fatal });
    }

    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|issue| issue.fatal)
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|issue| !issue.fatal)
    }

    /// One line per issue, or `Configuration OK`
    pub fn report(&self) -> String {
        if self.issues.is_empty() {
            return "Configuration OK".to_string();
        }
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
