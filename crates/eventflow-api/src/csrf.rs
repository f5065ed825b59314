//! CSRF token sourcing and rotation.
//!
//! Mutating requests carry an `X-CSRF-Token` header. The token is sourced
//! from an in-memory cache first, then from the `XSRF-TOKEN` cookie in the
//! shared jar, then from the token endpoint. Rotation is handled by the
//! request loop in [`crate::ApiClient`]: a CSRF-rejected 403 purges the
//! cache and the request is retried once with a fresh token. The replay
//! skips the cookie source, since the jar may still hold the token the
//! server just rejected.

use std::sync::Mutex;

use reqwest::cookie::{CookieStore, Jar};
use serde::Deserialize;
use url::Url;

use crate::{Error, Result};

/// Header carrying the token on mutating requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Cookie the server mirrors the token into.
const CSRF_COOKIE: &str = "XSRF-TOKEN";

/// Token endpoint, used when neither cache nor cookie has a token.
const TOKEN_PATH: &str = "/api/csrf-token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "csrfToken")]
    csrf_token: String,
}

/// In-memory CSRF token cache with cookie and endpoint fallbacks.
#[derive(Debug, Default)]
pub(crate) struct CsrfTokens {
    cached: Mutex<Option<String>>,
}

impl CsrfTokens {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Drops the cached token so the next request fetches a fresh one.
    pub(crate) fn invalidate(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
    }

    /// Returns a token, consulting cache, cookie jar, then the endpoint.
    ///
    /// `skip_cookie` bypasses the jar; set after a CSRF rejection, when
    /// the cookie may still carry the rejected token.
    pub(crate) async fn token(
        &self,
        http: &reqwest::Client,
        jar: &Jar,
        base_url: &Url,
        skip_cookie: bool,
    ) -> Result<String> {
        if let Ok(cached) = self.cached.lock()
            && let Some(token) = cached.clone()
        {
            return Ok(token);
        }

        if !skip_cookie
            && let Some(token) = cookie_token(jar, base_url)
        {
            self.store(&token);
            return Ok(token);
        }

        let url = base_url.join(TOKEN_PATH)?;
        let response = http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Csrf(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }
        let body: TokenResponse = response.json().await?;
        self.store(&body.csrf_token);
        Ok(body.csrf_token)
    }

    fn store(&self, token: &str) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(token.to_string());
        }
    }
}

/// Reads the CSRF cookie out of the shared jar, if the server set one.
fn cookie_token(jar: &Jar, base_url: &Url) -> Option<String> {
    let header = jar.cookies(base_url)?;
    let header = header.to_str().ok()?;
    parse_cookie_header(header)
}

/// Extracts the `XSRF-TOKEN` value from a `name=value; name=value` header.
fn parse_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == CSRF_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}
