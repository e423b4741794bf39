//! HTTP clients for the third-party services the pipeline depends on.
//!
//! Both clients take their base URL at construction so tests can point them
//! at a local mock server.

pub mod nominatim;
pub mod osrm;
pub mod polyline;

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}{}", describe_detail(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("malformed response: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// The provider answered but reported a failure of its own.
    #[error("{0}")]
    Api(String),
}

fn describe_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

pub(crate) fn normalise_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
