use log::debug;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::status::StatusReport;

use super::client::AzureClient;
use super::normalize::normalize;

/// Status source for one Azure DevOps pipeline definition.
///
/// Combines a single fetch of the most recent builds (or deployments) with
/// normalization into the dashboard vocabulary.
pub struct AzureProvider {
    client: AzureClient,
    pipeline: PipelineConfig,
}

impl AzureProvider {
    pub fn new(client: AzureClient, pipeline: PipelineConfig) -> Self {
        Self { client, pipeline }
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    /// Fetches and normalizes the `count` most recent results of this pipeline.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP status and parse errors from the fetch.
    /// Unrecognized statuses are not errors; they surface as `ERROR` states.
    pub async fn latest_states(&self) -> Result<StatusReport> {
        let result_set = self
            .client
            .fetch(&self.pipeline, self.pipeline.count)
            .await?;

        debug!(
            "Fetched {} results for {}.{}",
            result_set.value.len(),
            self.pipeline.project,
            self.pipeline.definition_id
        );

        Ok(normalize(result_set.value, &self.pipeline))
    }
}
