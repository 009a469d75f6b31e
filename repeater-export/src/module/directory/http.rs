//! HTTP transport shared by the directory backends
use std::time::Duration;

use reqwest::Client;

use super::error::DirectoryError;
use crate::config::QueryParams;

/// Owns the reqwest client used for every zone request of a run.
pub struct DirectoryHttp {
    client: Client,
}

impl DirectoryHttp {
    pub fn new(params: &QueryParams) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(params.timeout_seconds))
            .user_agent(params.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and return the body of a successful response.
    pub async fn get_text(&self, url: &str) -> Result<String, DirectoryError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DirectoryError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

/// Append an already-encoded query string to an endpoint.
pub fn with_query(endpoint: &str, query: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}{}", endpoint, separator, query)
}
