//! Gateway configuration and environment loading

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::auth::BearerTokenAuth;
use crate::error::{GatewayError, GatewayResult};
use crate::traits::Authenticator;

/// Default Capella public API endpoint
pub const DEFAULT_BASE_URL: &str = "https://cloudapi.cloud.couchbase.com";

/// Environment variable holding the API host
pub const HOST_ENV: &str = "CAPELLA_HOST";

/// Environment variable holding the bearer token
pub const TOKEN_ENV: &str = "CAPELLA_AUTHENTICATION_TOKEN";

const DEFAULT_USER_AGENT: &str = concat!("capella-index-builder/", env!("CARGO_PKG_VERSION"));

/// Retry and backoff policy for transient failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            min_wait: Duration::from_millis(500),
            max_wait: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Exponential delay before retry number `attempt` (zero based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.min_wait.saturating_mul(factor).min(self.max_wait)
    }
}

/// Immutable client configuration handed to the gateway constructor
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: Url,
    pub auth: Option<Arc<dyn Authenticator>>,
    pub user_agent: String,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Configuration pointing at the public Capella endpoint
    pub fn new() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            auth: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Set the API base URL; `https://` is assumed when no scheme is given
    pub fn with_base_url(mut self, raw: &str) -> GatewayResult<Self> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }

    pub fn with_authenticator(mut self, auth: impl Authenticator + 'static) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_authenticator(BearerTokenAuth::new(token))
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_base_url(raw: &str) -> GatewayResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(GatewayError::config("base URL must not be empty"));
    }
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&with_scheme)
        .map_err(|e| GatewayError::config(format!("invalid base URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(GatewayError::config(format!("base URL '{raw}' cannot carry a path")));
    }
    Ok(url)
}

/// Host and credentials resolved from the environment
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub token: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first if present
    pub fn from_env() -> GatewayResult<Self> {
        // A missing .env file is normal
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from a specific env file without touching the process environment
    pub fn from_env_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let path = path.as_ref();
        // from_path would load into the process environment; only the iterator reads in isolation
        #[allow(deprecated)]
        let entries = dotenv::from_path_iter(path)
            .map_err(|e| GatewayError::config(format!("cannot read {}: {e}", path.display())))?
            .collect::<Result<Vec<(String, String)>, _>>()
            .map_err(|e| GatewayError::config(format!("cannot parse {}: {e}", path.display())))?;

        Self::from_lookup(|key| {
            entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        })
    }

    /// Resolve settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> GatewayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let token = lookup(TOKEN_ENV).unwrap_or_default();
        if token.trim().is_empty() {
            return Err(GatewayError::config(format!(
                "missing or empty authentication token; set {TOKEN_ENV}"
            )));
        }

        Ok(Self { host, token })
    }

    /// Build the gateway configuration these settings describe
    pub fn into_config(self) -> GatewayResult<GatewayConfig> {
        Ok(GatewayConfig::new()
            .with_base_url(&self.host)?
            .with_bearer_token(self.token))
    }
}
