//! Authentication strategies for the Capella API

use reqwest::RequestBuilder;
use reqwest::header::AUTHORIZATION;

use crate::traits::Authenticator;

const DEFAULT_KEY_HEADER: &str = "X-Client-Id";
const DEFAULT_SECRET_HEADER: &str = "X-Client-Secret";

/// Sends `Authorization: Bearer <token>`
#[derive(Clone)]
pub struct BearerTokenAuth {
    token: String,
}

impl BearerTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for BearerTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuth")
            .field("token", &redact(&self.token))
            .finish()
    }
}

impl Authenticator for BearerTokenAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            return request;
        }
        request.header(AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

/// Sends an API key and secret as separate headers
///
/// Header names vary between environments; they default to `X-Client-Id`
/// and `X-Client-Secret`.
#[derive(Clone)]
pub struct ApiKeySecretAuth {
    key: String,
    secret: String,
    key_header: String,
    secret_header: String,
}

impl ApiKeySecretAuth {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            key_header: DEFAULT_KEY_HEADER.to_string(),
            secret_header: DEFAULT_SECRET_HEADER.to_string(),
        }
    }

    pub fn with_header_names(mut self, key_header: impl Into<String>, secret_header: impl Into<String>) -> Self {
        let key_header = key_header.into();
        let secret_header = secret_header.into();
        if !key_header.is_empty() {
            self.key_header = key_header;
        }
        if !secret_header.is_empty() {
            self.secret_header = secret_header;
        }
        self
    }
}

impl std::fmt::Debug for ApiKeySecretAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeySecretAuth")
            .field("key", &self.key)
            .field("secret", &redact(&self.secret))
            .field("key_header", &self.key_header)
            .field("secret_header", &self.secret_header)
            .finish()
    }
}

impl Authenticator for ApiKeySecretAuth {
    fn apply(&self, mut request: RequestBuilder) -> RequestBuilder {
        if !self.key.is_empty() {
            request = request.header(self.key_header.as_str(), self.key.as_str());
        }
        if !self.secret.is_empty() {
            request = request.header(self.secret_header.as_str(), self.secret.as_str());
        }
        request
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<empty>" } else { "<redacted>" }
}
