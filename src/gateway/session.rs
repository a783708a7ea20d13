// src/gateway/session.rs
// Explicit session context: the cookie jar shared by every call

use cookie::Cookie;
use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use url::Url;

/// Cookie-backed session state.
///
/// Holds the CSRF cookie and the httpOnly access/refresh cookies the backend
/// sets. Clones share the same jar, so a gateway and the code that created it
/// see the same session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    jar: Arc<Jar>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Store a raw `Set-Cookie` style string for `url`
    pub fn add_cookie(&self, cookie: &str, url: &Url) {
        self.jar.add_cookie_str(cookie, url);
    }

    /// Value of cookie `name` that would be sent to `url`
    pub fn cookie(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.jar.cookies(url)?;
        let header = header.to_str().ok()?;
        let value = Cookie::split_parse(header)
            .filter_map(|parsed| parsed.ok())
            .find(|c| c.name() == name)
            .map(|c| c.value().to_string());
        value.filter(|value| !value.is_empty())
    }
}
