//! OpenAI-compatible client construction with sensible defaults.

use crate::error::{MinneError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create a client for an OpenAI-compatible endpoint.
///
/// The API key is read from the named environment variable; a missing key is
/// a configuration error so callers can fall back to another capability.
pub fn create_client(api_key_env: &str, api_base: Option<&str>) -> Result<Client<OpenAIConfig>> {
    let api_key = std::env::var(api_key_env)
        .map_err(|_| MinneError::Config(format!("{} is not set", api_key_env)))?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| MinneError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
