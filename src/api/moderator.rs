// src/api/moderator.rs
// User management, only available to the Moderator group

use super::{mutating, read_ack, read_json};
use crate::error::Result;
use crate::gateway::{RequestOptions, SessionGateway, endpoints, paths};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Row of the user list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratorUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratorUserDetail {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
}

/// All users, ordered by last then first name
pub async fn users(gateway: &SessionGateway) -> Result<Vec<ModeratorUser>> {
    let response = gateway.call(paths::MODERATOR_USERS, RequestOptions::get()).await?;
    read_json(gateway, response, "fetch users").await
}

pub async fn user(gateway: &SessionGateway, id: i64) -> Result<ModeratorUserDetail> {
    let response = gateway
        .call(&endpoints::moderator_user_detail(id), RequestOptions::get())
        .await?;
    read_json(gateway, response, "fetch user").await
}

pub async fn delete_user(gateway: &SessionGateway, id: i64) -> Result<()> {
    let options = mutating(gateway, RequestOptions::delete()).await?;
    let response = gateway
        .call(&endpoints::moderator_user_detail(id), options)
        .await?;
    read_ack(gateway, response, "delete user").await?;
    info!(user_id = id, "User deleted");
    Ok(())
}
