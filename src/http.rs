// src/http.rs
// Shared HTTP client bound to a session's cookie jar

use crate::error::{GatewayError, Result};
use crate::gateway::Session;

/// Create the HTTP client used by one gateway.
///
/// Every request made through it sends and stores cookies in the session's
/// jar, which is how credentials are attached to each call. No client-level
/// timeouts are set: the gateway's per-call timer covers connecting too.
pub fn create_client(session: &Session) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .cookie_provider(session.jar())
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let session = Session::new();
        let client = create_client(&session);
        assert!(client.is_ok());
    }
}
