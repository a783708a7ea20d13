// src/error.rs
// Standardized error types for the expense gateway

use crate::messages::MessageCatalog;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Shown for 5xx responses instead of whatever the server sent
const SERVER_ERROR_MESSAGE: &str = "server error, please try again later";

/// Classification of a non-2xx backend response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 401 that survived the refresh-and-retry
    Unauthorized,
    /// 4xx carrying field-keyed validation messages
    Validation,
    /// Any other 4xx
    Client,
    /// 5xx
    Server,
}

/// A non-2xx response converted into something a caller can show
#[derive(Debug, Clone, Error)]
#[error("{operation} failed ({status}): {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    /// What the caller was trying to do, e.g. "fetch categories"
    pub operation: &'static str,
    /// Display message (translated where the catalog knows it)
    pub message: String,
    /// Follow-up action suggested by the backend, e.g. "resend_activation"
    pub action: Option<String>,
    /// Translated messages per field, only for `Validation`
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    pub fn new(
        kind: ApiErrorKind,
        status: u16,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            status,
            operation,
            message: message.into(),
            action: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, Vec<String>>) -> Self {
        self.fields = fields;
        self
    }

    /// Read and classify a non-2xx response
    pub async fn from_response(
        response: reqwest::Response,
        operation: &'static str,
        catalog: &MessageCatalog,
    ) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::from_body(status, operation, &body, catalog)
    }

    /// Classify a status + raw body.
    ///
    /// Recognizes `{"error": ..}` / `{"detail": ..}` messages, an optional
    /// `action` hint, and field-keyed validation objects.
    pub fn from_body(
        status: u16,
        operation: &'static str,
        body: &str,
        catalog: &MessageCatalog,
    ) -> Self {
        if status >= 500 {
            return Self::new(ApiErrorKind::Server, status, operation, SERVER_ERROR_MESSAGE);
        }

        let json: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let object = json.as_ref().and_then(|v| v.as_object());

        let message = object
            .and_then(|o| o.get("error").or_else(|| o.get("detail")))
            .and_then(|v| v.as_str())
            .map(|s| catalog.translate(s).to_string());
        let action = object
            .and_then(|o| o.get("action"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let mut err = if status == 401 {
            Self::new(
                ApiErrorKind::Unauthorized,
                status,
                operation,
                message.unwrap_or_else(|| "authentication required".to_string()),
            )
        } else if let Some(message) = message {
            Self::new(ApiErrorKind::Client, status, operation, message)
        } else if let Some(fields) = object.filter(|o| !o.is_empty()) {
            let (fields, line) = catalog.translate_fields(fields);
            Self::new(ApiErrorKind::Validation, status, operation, line).with_fields(fields)
        } else {
            let text = body.trim();
            let text = if text.is_empty() {
                format!("HTTP {}", status)
            } else {
                text.to_string()
            };
            Self::new(ApiErrorKind::Client, status, operation, text)
        };

        err.action = action;
        err
    }

    /// Whether the backend asked the user to request a new activation link
    pub fn needs_activation(&self) -> bool {
        self.action.as_deref() == Some("resend_activation")
    }
}

/// Main error type for the gateway and the API wrappers
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {endpoint} timed out after {}ms", .timeout.as_millis())]
    Timeout { endpoint: String, timeout: Duration },

    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// True for the abort fired by the per-call timer
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout { .. })
    }

    /// The classified backend error, if this is one
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            GatewayError::Api(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn network(endpoint: &str, source: reqwest::Error) -> Self {
        GatewayError::Network {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}
