//! HTTP core shared by every gateway call
//!
//! Builds URLs from the configured base, applies headers and credentials,
//! retries transient failures with exponential backoff and decodes error
//! bodies. Callers only ever see the final outcome.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::{GatewayConfig, RetryPolicy};
use crate::error::{GatewayError, GatewayResult};
use crate::traits::Authenticator;

/// Thin reqwest wrapper for the Capella v4 API
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    auth: Option<Arc<dyn Authenticator>>,
    user_agent: String,
    retry: RetryPolicy,
}

/// Outcome of a single attempt
enum Attempt {
    Done(Response),
    Retry { reason: String, delay: Option<Duration> },
    Fail(GatewayError),
}

impl ApiClient {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url,
            http,
            auth: config.auth,
            user_agent: config.user_agent,
            retry: config.retry,
        })
    }

    /// Absolute URL for the given path segments; each segment is percent-encoded
    pub fn endpoint<I, S>(&self, segments: I) -> GatewayResult<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| GatewayError::config(format!("base URL {} cannot carry a path", self.base_url)))?
            .clear()
            .extend(segments);
        Ok(url)
    }

    /// GET and decode a JSON body
    pub async fn get<T>(&self, url: Url, query: &[(&str, &str)]) -> GatewayResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.execute::<()>(Method::GET, url, query, None).await?;
        decode_body(response).await
    }

    /// POST a JSON body and decode the JSON response, if any
    pub async fn post<B, T>(&self, url: Url, body: &B) -> GatewayResult<Option<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::POST, url, &[], Some(body)).await?;
        decode_body(response).await
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> GatewayResult<Response>
    where
        B: Serialize + Sync,
    {
        let operation = format!("{method} {}", url.path());
        let idempotent = method == Method::GET;
        let mut attempt = 0;

        loop {
            let request = self.build_request(method.clone(), url.clone(), query, body);
            debug!(operation = %operation, attempt, "Sending request");

            let outcome = match request.send().await {
                Ok(response) => self.classify_response(response, idempotent).await,
                Err(e) => classify_send_error(&operation, e, idempotent),
            };

            match outcome {
                Attempt::Done(response) => return Ok(response),
                Attempt::Fail(error) => return Err(error),
                Attempt::Retry { reason, delay } => {
                    if attempt >= self.retry.max_retries {
                        return Err(GatewayError::transport(
                            operation,
                            format!("giving up after {} attempt(s): {reason}", attempt + 1),
                        ));
                    }
                    let delay = delay
                        .map(|d| d.min(self.retry.max_wait))
                        .unwrap_or_else(|| self.retry.backoff(attempt));
                    warn!(
                        operation = %operation,
                        "⏳ {} (attempt {}), retrying in {}ms",
                        reason,
                        attempt + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn build_request<B>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> reqwest::RequestBuilder
    where
        B: Serialize,
    {
        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if !self.user_agent.is_empty() {
            request = request.header(USER_AGENT, self.user_agent.as_str());
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").json(body);
        }
        match &self.auth {
            Some(auth) => auth.apply(request),
            None => request,
        }
    }

    async fn classify_response(&self, response: Response, idempotent: bool) -> Attempt {
        let status = response.status();
        if status.is_success() {
            return Attempt::Done(response);
        }

        if idempotent && is_retryable_status(status) {
            return Attempt::Retry {
                reason: format!("server responded {status}"),
                delay: retry_after(&response),
            };
        }

        let body = response.text().await.unwrap_or_default();
        Attempt::Fail(GatewayError::from_status(status.as_u16(), &body))
    }
}

fn classify_send_error(operation: &str, error: reqwest::Error, idempotent: bool) -> Attempt {
    // A refused connection never reached the server, so even writes are safe to repeat
    if error.is_connect() || (idempotent && error.is_timeout()) {
        return Attempt::Retry {
            reason: format!("network error: {error}"),
            delay: None,
        };
    }
    Attempt::Fail(GatewayError::transport(operation, error))
}

/// 429 and 5xx except 501 are worth another try
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
}

fn retry_after(response: &Response) -> Option<Duration> {
    if response.status() != StatusCode::TOO_MANY_REQUESTS
        && response.status() != StatusCode::SERVICE_UNAVAILABLE
    {
        return None;
    }
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

async fn decode_body<T>(response: Response) -> GatewayResult<Option<T>>
where
    T: DeserializeOwned,
{
    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::transport("read response body", e))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&bytes).map(Some).map_err(GatewayError::decode)
}
