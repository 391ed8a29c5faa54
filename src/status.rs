use std::fmt;

use serde::Serialize;

/// Provider-independent state exposed to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CanonicalState {
    Success,
    Failure,
    Partial,
    Canceled,
    Building,
    NotStarted,
    Error,
}

impl CanonicalState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Partial => "PARTIAL",
            Self::Canceled => "CANCELED",
            Self::Building => "BUILDING",
            Self::NotStarted => "NOTSTARTED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for CanonicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized view of one pipeline, oldest result first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub pipeline: String,
    pub states: Vec<CanonicalState>,
}

impl StatusReport {
    /// Report standing in for a pipeline whose fetch failed.
    pub fn failed(pipeline: String) -> Self {
        Self {
            pipeline,
            states: vec![CanonicalState::Error],
        }
    }

    pub fn into_entries(self) -> impl Iterator<Item = FeedEntry> {
        let pipeline = self.pipeline;
        self.states.into_iter().map(move |state| FeedEntry {
            d: pipeline.clone(),
            s: state,
        })
    }
}

/// One tile of the dashboard feed: display name and state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub d: String,
    pub s: CanonicalState,
}
