use std::time::Duration;

use log::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::providers::azure::AzureClient;
use crate::providers::AzureProvider;
use crate::status::{FeedEntry, StatusReport};

/// The set of monitored pipelines behind the dashboard endpoint.
///
/// Immutable once built; every call to [`StatusFeed::collect`] queries all
/// pipelines afresh.
pub struct StatusFeed {
    providers: Vec<AzureProvider>,
}

impl StatusFeed {
    /// Builds one provider per pipeline, all sharing a single HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(pipelines: Vec<PipelineConfig>, timeout: Duration) -> Result<Self> {
        let client = AzureClient::new(timeout)?;
        let providers = pipelines
            .into_iter()
            .map(|pipeline| AzureProvider::new(client.clone(), pipeline))
            .collect();

        Ok(Self { providers })
    }

    pub fn pipeline_count(&self) -> usize {
        self.providers.len()
    }

    /// Queries every pipeline concurrently and returns one report per pipeline,
    /// in configuration order.
    ///
    /// A pipeline whose fetch fails is reported as a single `ERROR` state;
    /// the others are unaffected.
    pub async fn reports(&self) -> Vec<StatusReport> {
        let futures = self.providers.iter().map(|provider| async move {
            match provider.latest_states().await {
                Ok(report) => report,
                Err(e) => {
                    let label = provider.pipeline().label();
                    warn!("Failed to fetch statuses for {label}: {e}");
                    StatusReport::failed(label)
                }
            }
        });

        futures::future::join_all(futures).await
    }

    /// Flattened dashboard payload: one entry per state per pipeline.
    pub async fn collect(&self) -> Vec<FeedEntry> {
        let entries: Vec<FeedEntry> = self
            .reports()
            .await
            .into_iter()
            .flat_map(StatusReport::into_entries)
            .collect();

        debug!(
            "Collected {} entries from {} pipelines",
            entries.len(),
            self.providers.len()
        );

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;
    use crate::providers::azure::Mode;
    use crate::status::CanonicalState;
    use mockito::Matcher;
    use url::Url;

    fn pipeline(base_url: &str, project: &str, mode: Mode, count: u32) -> PipelineConfig {
        PipelineConfig {
            base_url: Url::parse(base_url).unwrap(),
            project: project.to_string(),
            definition_id: 42,
            token: Token::from("pat"),
            mode,
            name: None,
            count,
        }
    }

    #[tokio::test]
    async fn test_collect_flattens_in_configuration_order() {
        let mut server = mockito::Server::new_async().await;
        let _builds = server
            .mock("GET", "/alpha/_apis/build/builds")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"value": [
                    {"id": 11, "status": "inProgress", "definition": {"name": "Alpha CI"}},
                    {"id": 10, "status": "completed", "result": "partiallySucceeded", "definition": {"name": "Alpha CI"}}
                ]}"#,
            )
            .create_async()
            .await;
        let _deployments = server
            .mock("GET", "/beta/_apis/release/deployments")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"value": [{"id": 3, "deploymentStatus": "succeeded", "releaseDefinition": {"name": "Beta"}}]}"#,
            )
            .create_async()
            .await;

        let feed = StatusFeed::new(
            vec![
                pipeline(&server.url(), "alpha", Mode::Build, 2),
                pipeline(&server.url(), "beta", Mode::Release, 1),
            ],
            Duration::from_secs(5),
        )
        .unwrap();

        let entries = feed.collect().await;
        assert_eq!(
            entries,
            vec![
                FeedEntry {
                    d: "Alpha CI".to_string(),
                    s: CanonicalState::Partial
                },
                FeedEntry {
                    d: "Alpha CI".to_string(),
                    s: CanonicalState::Building
                },
                FeedEntry {
                    d: "Beta".to_string(),
                    s: CanonicalState::Success
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_pipeline_is_isolated() {
        let mut server = mockito::Server::new_async().await;
        let _builds = server
            .mock("GET", "/healthy/_apis/build/builds")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"value": [{"id": 5, "status": "completed", "result": "succeeded", "definition": {"name": "CI"}}]}"#,
            )
            .create_async()
            .await;

        let feed = StatusFeed::new(
            vec![
                pipeline("http://127.0.0.1:1", "broken", Mode::Build, 3),
                pipeline(&server.url(), "healthy", Mode::Build, 1),
            ],
            Duration::from_secs(5),
        )
        .unwrap();

        let entries = feed.collect().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].d, "broken.42");
        assert_eq!(entries[0].s, CanonicalState::Error);
        assert_eq!(entries[1].d, "CI");
        assert_eq!(entries[1].s, CanonicalState::Success);
    }

    #[tokio::test]
    async fn test_all_pipelines_failing_still_yields_entries() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let feed = StatusFeed::new(
            vec![
                pipeline(&server.url(), "one", Mode::Build, 1),
                pipeline(&server.url(), "two", Mode::Release, 1),
            ],
            Duration::from_secs(5),
        )
        .unwrap();

        let reports = feed.reports().await;
        assert_eq!(reports.len(), 2);
        assert!(reports
            .iter()
            .all(|report| report.states == vec![CanonicalState::Error]));
    }

    #[tokio::test]
    async fn test_empty_pipeline_contributes_no_entries() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/myproj/_apis/build/builds")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"value": []}"#)
            .create_async()
            .await;

        let feed = StatusFeed::new(
            vec![pipeline(&server.url(), "myproj", Mode::Build, 1)],
            Duration::from_secs(5),
        )
        .unwrap();

        let reports = feed.reports().await;
        assert_eq!(reports[0].pipeline, "No recent builds for myproj.42");
        assert!(feed.collect().await.is_empty());
    }

    #[tokio::test]
    async fn test_slow_pipelines_time_out_concurrently() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let feed = StatusFeed::new(
            vec![
                pipeline(&base_url, "a", Mode::Build, 1),
                pipeline(&base_url, "b", Mode::Release, 1),
                pipeline(&base_url, "c", Mode::Build, 2),
            ],
            Duration::from_secs(1),
        )
        .unwrap();

        let started = std::time::Instant::now();
        let entries = feed.collect().await;
        let elapsed = started.elapsed();

        assert_eq!(entries.len(), 3);
        assert!(entries
            .iter()
            .all(|entry| entry.s == CanonicalState::Error));
        assert_eq!(entries[2].d, "c.42");
        assert!(
            elapsed < Duration::from_millis(2500),
            "pipelines were not fetched concurrently: {elapsed:?}"
        );
    }
}
