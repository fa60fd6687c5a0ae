//! HTTP fetcher shared by the source adapters
//!
//! Every page is fetched once with a plain GET. There is no retry: a
//! transport failure or a non-2xx status aborts the whole run.

use crate::config::HttpConfig;
use crate::SyncError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed for a single page
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body as text
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Connection refused, timeout, TLS failure | `SyncError::Http` |
/// | Any non-2xx status | `SyncError::Status` |
/// | Body could not be decoded | `SyncError::Http` |
pub async fn fetch_html(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, SyncError> {
    tracing::debug!(url, ?query, "GET");

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| SyncError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| SyncError::Http {
        url: url.to_string(),
        source,
    })
}

/// Joins a configured base URL and a site path without doubling slashes
pub fn join_path(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
