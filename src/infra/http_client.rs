use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::time::Duration;

use crate::error::Result;

/// Shared reqwest client setup for the external lookups. Every request made
/// through the returned client is bounded by `timeout`.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .default_headers(headers)
        .build()?;
    Ok(client)
}
