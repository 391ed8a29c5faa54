use serde::Deserialize;

/// Which Azure DevOps listing a pipeline is read from.
///
/// Build mode lists CI builds and is keyed by `status`/`result`; release
/// mode lists deployments and is keyed by `deploymentStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Build,
    Release,
}

impl Mode {
    pub fn api_path(self) -> &'static [&'static str] {
        match self {
            Self::Build => &["_apis", "build", "builds"],
            Self::Release => &["_apis", "release", "deployments"],
        }
    }

    /// Query parameter selecting the definition id.
    pub fn definition_param(self) -> &'static str {
        match self {
            Self::Build => "definitions",
            Self::Release => "definitionId",
        }
    }
}

/// Top-level envelope of an Azure DevOps list response.
#[derive(Debug, Deserialize)]
pub struct ResultSet {
    pub value: Vec<RawResultItem>,
}

/// A single build or deployment as returned by the provider.
///
/// Only the fields the feed needs are kept; everything is optional except
/// the id because the two listings share this shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResultItem {
    pub id: u64,
    /// Build lifecycle (e.g., "completed", "inProgress")
    pub status: Option<String>,
    /// Build outcome once completed (e.g., "succeeded", "partiallySucceeded")
    pub result: Option<String>,
    /// Deployment state (e.g., "failed", "inProgress")
    pub deployment_status: Option<String>,
    pub definition: Option<DefinitionRef>,
    pub release_definition: Option<DefinitionRef>,
}

impl RawResultItem {
    pub fn definition_name(&self) -> Option<&str> {
        self.definition
            .as_ref()
            .and_then(|definition| definition.name.as_deref())
            .or_else(|| {
                self.release_definition
                    .as_ref()
                    .and_then(|definition| definition.name.as_deref())
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefinitionRef {
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_build_item() {
        let item: RawResultItem = serde_json::from_str(
            r#"{"id": 5, "status": "completed", "result": "succeeded", "definition": {"id": 42, "name": "CI"}, "buildNumber": "20240101.1"}"#,
        )
        .unwrap();

        assert_eq!(item.id, 5);
        assert_eq!(item.status.as_deref(), Some("completed"));
        assert_eq!(item.result.as_deref(), Some("succeeded"));
        assert_eq!(item.definition_name(), Some("CI"));
    }

    #[test]
    fn test_deserialize_release_item() {
        let item: RawResultItem = serde_json::from_str(
            r#"{"id": 9, "deploymentStatus": "inProgress", "releaseDefinition": {"id": 7, "name": "Deploy"}}"#,
        )
        .unwrap();

        assert_eq!(item.deployment_status.as_deref(), Some("inProgress"));
        assert_eq!(item.definition_name(), Some("Deploy"));
    }

    #[test]
    fn test_definition_name_falls_through_unnamed_definition() {
        let item: RawResultItem = serde_json::from_str(
            r#"{"id": 4, "deploymentStatus": "succeeded", "definition": {"id": 1}, "releaseDefinition": {"name": "Deploy"}}"#,
        )
        .unwrap();
        assert_eq!(item.definition_name(), Some("Deploy"));

        let unnamed: RawResultItem =
            serde_json::from_str(r#"{"id": 4, "definition": {"id": 1}}"#).unwrap();
        assert_eq!(unnamed.definition_name(), None);
    }

    #[test]
    fn test_result_set_requires_value() {
        assert!(serde_json::from_str::<ResultSet>(r#"{"count": 0}"#).is_err());
        let empty: ResultSet = serde_json::from_str(r#"{"count": 0, "value": []}"#).unwrap();
        assert!(empty.value.is_empty());
    }

    #[test]
    fn test_mode_request_shape() {
        assert_eq!(Mode::Build.definition_param(), "definitions");
        assert_eq!(Mode::Release.definition_param(), "definitionId");
        assert_eq!(Mode::Release.api_path().join("/"), "_apis/release/deployments");
    }
}
