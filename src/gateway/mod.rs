// src/gateway/mod.rs
// Session gateway: common request envelope + one-shot session refresh on 401

pub mod endpoints;
pub mod session;

pub use endpoints::paths;
pub use session::Session;

use crate::config::{CSRF_HEADER, GatewayConfig};
use crate::error::{ApiError, GatewayError, Result};
use crate::http;
use crate::messages::MessageCatalog;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

/// Everything about one call except the endpoint.
///
/// Cloneable so the retry after a session refresh sends exactly the same
/// request again.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    /// Falls back to the gateway's configured timeout
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach the CSRF token mutating requests must carry
    pub fn csrf_token(self, token: &str) -> Result<Self> {
        let value = HeaderValue::from_str(token)
            .map_err(|_| GatewayError::Decode("CSRF token is not a valid header value".into()))?;
        Ok(self.header(HeaderName::from_static("x-csrftoken"), value))
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON request body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Deserialize)]
struct CsrfTokenBody {
    csrftoken: String,
}

/// Performs every backend call for one session.
///
/// Clones are cheap and share the HTTP connection pool and the session's
/// cookie jar. Concurrent calls are independent: each caller that hits a 401
/// runs its own refresh.
#[derive(Debug, Clone)]
pub struct SessionGateway {
    config: Arc<GatewayConfig>,
    origin: Url,
    session: Session,
    client: reqwest::Client,
}

impl SessionGateway {
    pub fn new(config: GatewayConfig, session: Session) -> Result<Self> {
        let origin = config.origin()?;
        let client = http::create_client(&session)?;
        Ok(Self {
            config: Arc::new(config),
            origin,
            session,
            client,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn messages(&self) -> &MessageCatalog {
        &self.config.messages
    }

    /// Absolute URL for a relative endpoint
    pub fn url_for(&self, endpoint: &str) -> Result<Url> {
        let joined = format!("{}{}", self.origin.as_str().trim_end_matches('/'), endpoint);
        Url::parse(&joined)
            .map_err(|e| GatewayError::Config(format!("invalid URL {}: {}", joined, e)))
    }

    /// Return the CSRF token, fetching it only if the cookie is missing.
    ///
    /// The backend's response sets the cookie; nothing is cached here.
    pub async fn ensure_token(&self) -> Result<String> {
        if let Some(token) = self.session.cookie(&self.origin, &self.config.csrf_cookie) {
            return Ok(token);
        }

        let request_id = Uuid::new_v4().to_string();
        debug!(request_id = %request_id, "CSRF cookie missing, fetching token");

        let response = self
            .send_once(&request_id, paths::CSRF_TOKEN, &RequestOptions::get())
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response, "fetch CSRF token", self.messages())
                .await
                .into());
        }

        let body: CsrfTokenBody = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("CSRF token body: {}", e)))?;
        Ok(body.csrftoken)
    }

    /// Perform a call with the common envelope.
    ///
    /// A 401 from anything but the session probe triggers one refresh; if it
    /// succeeds the call is re-issued once with the same options and that
    /// result is returned, otherwise the original 401 comes back untouched.
    /// Non-2xx responses are returned, not turned into errors.
    pub async fn call(&self, endpoint: &str, options: RequestOptions) -> Result<Response> {
        if !endpoints::is_known(endpoint) {
            return Err(GatewayError::UnknownEndpoint(endpoint.to_string()));
        }

        let request_id = Uuid::new_v4().to_string();
        let response = self.send_once(&request_id, endpoint, &options).await?;

        if response.status() != StatusCode::UNAUTHORIZED || endpoints::is_session_probe(endpoint) {
            return Ok(response);
        }

        warn!(
            request_id = %request_id,
            endpoint = %endpoint,
            "Got 401, attempting session refresh"
        );
        if !self.refresh_session().await {
            return Ok(response);
        }

        debug!(
            request_id = %request_id,
            endpoint = %endpoint,
            "Session refreshed, re-issuing request"
        );
        self.send_once(&request_id, endpoint, &options).await
    }

    /// POST the refresh endpoint with a fresh CSRF token.
    ///
    /// Never fails: any problem is logged and reported as `false`.
    pub async fn refresh_session(&self) -> bool {
        let token = match self.ensure_token().await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "Could not obtain CSRF token for session refresh");
                return false;
            }
        };

        let options = match RequestOptions::post().csrf_token(&token) {
            Ok(options) => options,
            Err(e) => {
                error!(error = %e, "Could not build session refresh request");
                return false;
            }
        };

        let request_id = Uuid::new_v4().to_string();
        match self.send_once(&request_id, paths::REFRESH, &options).await {
            Ok(response) if response.status().is_success() => {
                info!(request_id = %request_id, "Session refreshed");
                true
            }
            Ok(response) => {
                warn!(
                    request_id = %request_id,
                    status = %response.status(),
                    "Session refresh rejected"
                );
                false
            }
            Err(e) => {
                error!(request_id = %request_id, error = %e, "Session refresh failed");
                false
            }
        }
    }

    /// One network round trip, no retry
    async fn send_once(
        &self,
        request_id: &str,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Response> {
        let url = self.url_for(endpoint)?;
        let timeout = options.timeout.unwrap_or(self.config.timeout);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers.clone());

        let mut builder = self.client.request(options.method.clone(), url).headers(headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.body(body.clone());
        }

        debug!(
            request_id = %request_id,
            method = %options.method,
            endpoint = %endpoint,
            has_csrf = options.headers.contains_key(CSRF_HEADER),
            timeout_ms = timeout.as_millis() as u64,
            "Sending request"
        );

        match tokio::time::timeout(timeout, builder.send()).await {
            Err(_) => {
                warn!(
                    request_id = %request_id,
                    endpoint = %endpoint,
                    "Request aborted after timeout"
                );
                Err(GatewayError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout,
                })
            }
            Ok(Err(e)) => {
                error!(
                    request_id = %request_id,
                    endpoint = %endpoint,
                    error = %e,
                    "Request failed"
                );
                Err(GatewayError::network(endpoint, e))
            }
            Ok(Ok(response)) => {
                debug!(request_id = %request_id, status = %response.status(), "Response received");
                Ok(response)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> SessionGateway {
        SessionGateway::new(GatewayConfig::new(base), Session::new()).unwrap()
    }

    // ========================================================================
    // RequestOptions
    // ========================================================================

    #[test]
    fn test_default_options_are_get() {
        let options = RequestOptions::default();
        assert_eq!(options.method, Method::GET);
        assert!(options.headers.is_empty());
        assert!(options.body.is_none());
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_csrf_token_header() {
        let options = RequestOptions::post().csrf_token("abc123").unwrap();
        assert_eq!(options.headers.get(CSRF_HEADER).unwrap(), "abc123");
    }

    #[test]
    fn test_csrf_token_rejects_invalid_header_value() {
        assert!(RequestOptions::post().csrf_token("bad\nvalue").is_err());
    }

    #[test]
    fn test_json_body() {
        let options = RequestOptions::post()
            .json(&serde_json::json!({"username": "anna"}))
            .unwrap();
        assert_eq!(options.body.as_deref(), Some(r#"{"username":"anna"}"#));
    }

    // ========================================================================
    // URL building
    // ========================================================================

    #[test]
    fn test_url_for_keeps_base_path() {
        let gw = gateway("http://localhost:8000/api");
        assert_eq!(
            gw.url_for("/expenses/").unwrap().as_str(),
            "http://localhost:8000/api/expenses/"
        );
    }

    #[test]
    fn test_url_for_bare_host() {
        let gw = gateway("http://localhost:8000/");
        assert_eq!(
            gw.url_for("/categories/").unwrap().as_str(),
            "http://localhost:8000/categories/"
        );
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let result = SessionGateway::new(GatewayConfig::new("::nope::"), Session::new());
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    // ========================================================================
    // Endpoint validation and token cache
    // ========================================================================

    #[tokio::test]
    async fn test_unknown_endpoint_rejected_before_network() {
        // Port 1 is never listening; an attempted send would be a Network error
        let gw = gateway("http://127.0.0.1:1/api");
        let result = gw.call("/not-a-route/", RequestOptions::get()).await;
        assert!(matches!(result, Err(GatewayError::UnknownEndpoint(_))));
    }

    #[tokio::test]
    async fn test_ensure_token_uses_cookie_without_network() {
        let gw = gateway("http://127.0.0.1:1/api");
        let origin = Url::parse("http://127.0.0.1:1/api").unwrap();
        gw.session().add_cookie("csrftoken=cached; Path=/", &origin);

        assert_eq!(gw.ensure_token().await.unwrap(), "cached");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let gw = gateway("http://127.0.0.1:1/api");
        let result = gw.call(paths::CATEGORIES, RequestOptions::get()).await;
        assert!(matches!(result, Err(GatewayError::Network { .. })));
    }
}
