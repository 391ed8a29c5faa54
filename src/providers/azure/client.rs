use std::time::Duration;

use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use url::Url;

use crate::config::PipelineConfig;
use crate::error::{PulseError, Result};

use super::types::ResultSet;

/// Thin client over the Azure DevOps build and deployment listings.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct AzureClient {
    client: Client,
}

impl AzureClient {
    /// Creates a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pipeline-pulse/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| PulseError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Helper to build authenticated requests
    fn auth_request(
        &self,
        request: reqwest::RequestBuilder,
        pipeline: &PipelineConfig,
    ) -> reqwest::RequestBuilder {
        request.header(AUTHORIZATION, pipeline.token.basic_auth_header())
    }

    /// Fetches up to `count` most recent builds or deployments of one pipeline.
    ///
    /// Issues exactly one request; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or timeout, on a non-success
    /// status, or when the body is not a JSON object with a `value` array.
    pub async fn fetch(&self, pipeline: &PipelineConfig, count: u32) -> Result<ResultSet> {
        let url = request_url(pipeline, count)?;
        debug!("GET {url}");

        let response = self
            .auth_request(self.client.get(url), pipeline)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(PulseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Builds `{base}/{project}/{api path}?{param}={id}&$top={count}&maxBuildsPerDefinition={count}`.
pub(super) fn request_url(pipeline: &PipelineConfig, count: u32) -> Result<Url> {
    let mut url = pipeline.base_url.clone();
    url.path_segments_mut()
        .map_err(|()| PulseError::Config(format!("Invalid base URL: {}", pipeline.base_url)))?
        .pop_if_empty()
        .push(&pipeline.project)
        .extend(pipeline.mode.api_path());

    url.set_query(Some(&format!(
        "{}={}&$top={count}&maxBuildsPerDefinition={count}",
        pipeline.mode.definition_param(),
        pipeline.definition_id,
    )));

    Ok(url)
}
