//! Authenticated HTTP client with CSRF and retry handling.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::csrf::{CSRF_HEADER, CsrfTokens};
use crate::retry::RetryPolicy;
use crate::{Error, Result};

/// Response header that forbids retrying, regardless of status.
const NO_RETRY_HEADER: &str = "x-no-retry";

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the marketplace API.
///
/// Wraps `reqwest` with the cross-cutting concerns every caller shares:
/// cookie-based credentials, a CSRF token on mutating verbs with
/// transparent rotation handling, and retry with exponential backoff and
/// jitter for transient failures.
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    retry: RetryPolicy,
    csrf: CsrfTokens,
}

impl ApiClient {
    /// Creates a client for the given API origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: Url) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            jar,
            base_url,
            retry: RetryPolicy::default(),
            csrf: CsrfTokens::new(),
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The API origin this client talks to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issues a GET and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error when retries are exhausted or the body cannot be
    /// decoded.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        Ok(response.json().await?)
    }

    /// Issues a POST with a JSON body and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error when retries are exhausted or the body cannot be
    /// decoded.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// Issues a POST with a JSON body, discarding the response body.
    ///
    /// # Errors
    ///
    /// Returns an error when retries are exhausted.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, Some(body)).await.map(drop)
    }

    /// Issues a DELETE, discarding the response body.
    ///
    /// # Errors
    ///
    /// Returns an error when retries are exhausted.
    pub async fn delete_unit(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None::<&()>).await.map(drop)
    }

    /// Core request loop: CSRF attachment, CSRF-rotation retry, backoff.
    ///
    /// The CSRF retry is separate from the backoff budget: a 403 whose
    /// body mentions "csrf" purges the token cache and replays the request
    /// exactly once with a fresh token, without sleeping.
    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base_url.join(path)?;
        let mutating = matches!(
            method,
            Method::POST | Method::PUT | Method::DELETE | Method::PATCH
        );

        let mut attempt: u32 = 0;
        let mut csrf_retried = false;

        loop {
            let mut request = self.http.request(method.clone(), url.clone());
            if mutating {
                let token = self
                    .csrf
                    .token(&self.http, &self.jar, &self.base_url, csrf_retried)
                    .await?;
                request = request.header(CSRF_HEADER, token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let failure = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let no_retry = response.headers().contains_key(NO_RETRY_HEADER);
                    let body_text = response.text().await.unwrap_or_default();

                    if mutating
                        && !csrf_retried
                        && status == StatusCode::FORBIDDEN
                        && body_text.to_ascii_lowercase().contains("csrf")
                    {
                        tracing::debug!(path, "CSRF token rejected, refreshing and replaying");
                        self.csrf.invalidate();
                        csrf_retried = true;
                        continue;
                    }

                    let err = Error::Status {
                        status: status.as_u16(),
                        body: body_text,
                    };
                    if no_retry {
                        return Err(err);
                    }
                    err
                }
                Err(e) => Error::Http(e),
            };

            if !failure.is_retriable() || attempt + 1 >= self.retry.max_attempts {
                return Err(failure);
            }

            let delay = self.retry.delay_for(attempt);
            tracing::warn!(path, ?delay, error = %failure, "request failed, backing off");
            attempt += 1;
            tokio::time::sleep(delay).await;
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
