//! Tests for gateway configuration and environment loading

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use crate::config::{DEFAULT_BASE_URL, GatewayConfig, HOST_ENV, RetryPolicy, Settings, TOKEN_ENV};
use crate::error::GatewayError;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_backoff_grows_and_caps() {
    let policy = RetryPolicy::default();

    assert_eq!(policy.backoff(0), Duration::from_millis(500));
    assert_eq!(policy.backoff(1), Duration::from_secs(1));
    assert_eq!(policy.backoff(2), Duration::from_secs(2));
    assert_eq!(policy.backoff(3), Duration::from_secs(4));
    assert_eq!(policy.backoff(10), Duration::from_secs(4));
    assert_eq!(policy.backoff(40), Duration::from_secs(4));
}

#[test]
fn test_base_url_gets_https_scheme() {
    let config = GatewayConfig::new().with_base_url("cloudapi.example.com").unwrap();
    assert_eq!(config.base_url.as_str(), "https://cloudapi.example.com/");

    let config = GatewayConfig::new().with_base_url("http://127.0.0.1:8080").unwrap();
    assert_eq!(config.base_url.scheme(), "http");
}

#[test]
fn test_empty_base_url_rejected() {
    let result = GatewayConfig::new().with_base_url("  ");
    assert!(matches!(result, Err(GatewayError::Configuration { .. })));
}

#[test]
fn test_settings_default_host() {
    let settings = Settings::from_lookup(lookup(&[(TOKEN_ENV, "tok")])).unwrap();

    assert_eq!(settings.host, DEFAULT_BASE_URL);
    assert_eq!(settings.token, "tok");
}

#[test]
fn test_settings_require_token() {
    let result = Settings::from_lookup(lookup(&[(HOST_ENV, "https://example.com")]));
    assert!(matches!(result, Err(GatewayError::Configuration { .. })));

    let result = Settings::from_lookup(lookup(&[(TOKEN_ENV, "   ")]));
    assert!(matches!(result, Err(GatewayError::Configuration { .. })));
}

#[test]
fn test_settings_into_config() {
    let settings = Settings::from_lookup(lookup(&[
        (HOST_ENV, "api.example.com"),
        (TOKEN_ENV, "secret-token"),
    ]))
    .unwrap();

    assert!(!format!("{settings:?}").contains("secret-token"));

    let config = settings.into_config().unwrap();
    assert_eq!(config.base_url.host_str(), Some("api.example.com"));
    assert!(config.auth.is_some());
}

#[test]
fn test_settings_from_env_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{HOST_ENV}=https://capella.test").unwrap();
    writeln!(file, "{TOKEN_ENV}=from-file").unwrap();

    let settings = Settings::from_env_file(file.path()).unwrap();

    assert_eq!(settings.host, "https://capella.test");
    assert_eq!(settings.token, "from-file");
}

#[test]
fn test_settings_from_missing_env_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Settings::from_env_file(dir.path().join("absent.env"));

    assert!(matches!(result, Err(GatewayError::Configuration { .. })));
}
