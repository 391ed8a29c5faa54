use crate::config::PipelineConfig;
use crate::status::{CanonicalState, StatusReport};

use super::types::{Mode, RawResultItem};

impl Mode {
    /// Maps one provider item onto the dashboard vocabulary.
    ///
    /// Matching is case-sensitive; anything unrecognized becomes `Error`.
    pub fn canonical_state(self, item: &RawResultItem) -> CanonicalState {
        match self {
            Self::Build => build_state(item.status.as_deref(), item.result.as_deref()),
            Self::Release => release_state(item.deployment_status.as_deref()),
        }
    }
}

fn build_state(status: Option<&str>, result: Option<&str>) -> CanonicalState {
    match (status, result) {
        (Some("completed"), Some("failed")) => CanonicalState::Failure,
        (Some("completed"), Some("succeeded")) => CanonicalState::Success,
        (Some("completed"), Some("partiallySucceeded")) => CanonicalState::Partial,
        (Some("completed"), Some("canceled")) => CanonicalState::Canceled,
        (Some("inProgress"), _) => CanonicalState::Building,
        (Some("notStarted"), _) => CanonicalState::NotStarted,
        _ => CanonicalState::Error,
    }
}

fn release_state(deployment_status: Option<&str>) -> CanonicalState {
    match deployment_status {
        Some("failed") => CanonicalState::Failure,
        Some("succeeded") => CanonicalState::Success,
        Some("canceled") => CanonicalState::Canceled,
        Some("inProgress") => CanonicalState::Building,
        _ => CanonicalState::Error,
    }
}

/// Turns a raw result set into a [`StatusReport`].
///
/// Items are ordered by id, oldest first, and only the `pipeline.count`
/// most recent ones are kept. The display name comes from the configured
/// override, else the first retained item's definition; an empty set is
/// reported under a "No recent builds" placeholder.
pub fn normalize(mut items: Vec<RawResultItem>, pipeline: &PipelineConfig) -> StatusReport {
    items.sort_by_key(|item| item.id);

    let keep = usize::try_from(pipeline.count).unwrap_or(usize::MAX);
    let excess = items.len().saturating_sub(keep);
    items.drain(..excess);

    let name = match items.first() {
        None => pipeline.empty_placeholder(),
        Some(first) => pipeline
            .name
            .clone()
            .or_else(|| first.definition_name().map(str::to_owned))
            .unwrap_or_else(|| pipeline.label()),
    };

    let states = items
        .iter()
        .map(|item| pipeline.mode.canonical_state(item))
        .collect();

    StatusReport {
        pipeline: name,
        states,
    }
}
