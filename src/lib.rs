// src/lib.rs
// expense-gateway - session gateway and typed client for the expense tracker API

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod messages;

pub use config::GatewayConfig;
pub use error::{ApiError, ApiErrorKind, GatewayError, Result};
pub use gateway::{RequestOptions, Session, SessionGateway};
pub use messages::MessageCatalog;
