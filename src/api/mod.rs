// src/api/mod.rs
// Typed wrappers over the session gateway, one module per backend area

pub mod auth;
pub mod expenses;
pub mod moderator;
pub mod summary;

use crate::error::{ApiError, GatewayError, Result};
use crate::gateway::{RequestOptions, SessionGateway};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Generic `{message}` / `{status}` acknowledgement body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub message: Option<String>,
    pub status: Option<String>,
}

/// Add the CSRF header a state-mutating call must carry
pub(crate) async fn mutating(
    gateway: &SessionGateway,
    options: RequestOptions,
) -> Result<RequestOptions> {
    let token = gateway.ensure_token().await?;
    options.csrf_token(&token)
}

/// Pass 2xx responses through, classify everything else as `ApiError`
pub(crate) async fn ensure_success(
    gateway: &SessionGateway,
    response: Response,
    operation: &'static str,
) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(ApiError::from_response(response, operation, gateway.messages()).await.into())
}

/// `ensure_success` followed by JSON decoding
pub(crate) async fn read_json<T: DeserializeOwned>(
    gateway: &SessionGateway,
    response: Response,
    operation: &'static str,
) -> Result<T> {
    let response = ensure_success(gateway, response, operation).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::Decode(format!("{}: {}", operation, e)))
}

/// Like `read_json` for endpoints whose body is optional (204 or empty)
pub(crate) async fn read_ack(
    gateway: &SessionGateway,
    response: Response,
    operation: &'static str,
) -> Result<Ack> {
    let response = ensure_success(gateway, response, operation).await?;
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::Decode(format!("{}: {}", operation, e)))?;
    if body.trim().is_empty() {
        return Ok(Ack::default());
    }
    Ok(serde_json::from_str(&body)?)
}
