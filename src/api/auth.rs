// src/api/auth.rs
// Registration, activation, login/logout and password reset

use super::{Ack, mutating, read_ack, read_json};
use crate::error::Result;
use crate::gateway::{RequestOptions, SessionGateway, paths};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// New account form
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    /// Confirmation; the backend rejects a mismatch
    pub password2: String,
}

/// Returned by `/register/`; the account starts inactive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
}

/// Login body. The tokens are also set as httpOnly cookies, which is what
/// later calls actually use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginTokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

/// Answer of the session probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_logged_in: bool,
    #[serde(default)]
    pub is_moderator: bool,
}

/// Current CSRF token (fetched only if the cookie is missing)
pub async fn csrf_token(gateway: &SessionGateway) -> Result<String> {
    gateway.ensure_token().await
}

pub async fn register(
    gateway: &SessionGateway,
    request: &RegisterRequest,
) -> Result<RegisteredUser> {
    let options = mutating(gateway, RequestOptions::post()).await?.json(request)?;
    let response = gateway.call(paths::REGISTER, options).await?;
    let user: RegisteredUser = read_json(gateway, response, "register").await?;
    info!(username = %user.username, "Account registered, awaiting activation");
    Ok(user)
}

/// Log in; an inactive account fails with `ApiError::needs_activation()`
pub async fn login(
    gateway: &SessionGateway,
    username: &str,
    password: &str,
) -> Result<LoginTokens> {
    let options = mutating(gateway, RequestOptions::post())
        .await?
        .json(&json!({ "username": username, "password": password }))?;
    let response = gateway.call(paths::LOGIN, options).await?;
    let tokens = read_json(gateway, response, "login").await?;
    info!(username = %username, "Logged in");
    Ok(tokens)
}

pub async fn logout(gateway: &SessionGateway) -> Result<Ack> {
    let options = mutating(gateway, RequestOptions::post()).await?;
    let response = gateway.call(paths::LOGOUT, options).await?;
    read_ack(gateway, response, "logout").await
}

/// Ask for a password reset e-mail
pub async fn reset_password(gateway: &SessionGateway, email: &str) -> Result<Ack> {
    let options = mutating(gateway, RequestOptions::post())
        .await?
        .json(&json!({ "email": email }))?;
    let response = gateway.call(paths::PASSWORD_RESET, options).await?;
    read_ack(gateway, response, "request password reset").await
}

/// Set a new password using the token from the reset e-mail
pub async fn confirm_reset_password(
    gateway: &SessionGateway,
    token: &str,
    new_password: &str,
) -> Result<Ack> {
    let options = mutating(gateway, RequestOptions::post())
        .await?
        .json(&json!({ "token": token, "password": new_password }))?;
    let response = gateway.call(paths::PASSWORD_RESET_CONFIRM, options).await?;
    read_ack(gateway, response, "confirm password reset").await
}

/// Probe the session. No session (401) reads as logged out, never as an error.
pub async fn is_logged_in(gateway: &SessionGateway) -> Result<SessionStatus> {
    let response = gateway.call(paths::IS_LOGGED_IN, RequestOptions::get()).await?;
    if response.status() == StatusCode::UNAUTHORIZED {
        return Ok(SessionStatus::default());
    }
    read_json(gateway, response, "check session").await
}

pub async fn resend_activation(gateway: &SessionGateway, username: &str) -> Result<Ack> {
    let options = mutating(gateway, RequestOptions::post())
        .await?
        .json(&json!({ "username": username }))?;
    let response = gateway.call(paths::RESEND_ACTIVATION, options).await?;
    read_ack(gateway, response, "resend activation").await
}

/// Activate an account with the `uid` and `token` from the activation link
pub async fn activate(gateway: &SessionGateway, uid: &str, token: &str) -> Result<Ack> {
    let options = RequestOptions::get().query("uid", uid).query("token", token);
    let response = gateway.call(paths::ACTIVATE, options).await?;
    read_ack(gateway, response, "activate account").await
}
