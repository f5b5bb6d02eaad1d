//! Detection runs and their output artifacts

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const REDACTED_PREFIX: &str = "redacted_";
const ENTITIES_TYPE: &str = "entities";

/// Remote status of a detection run. Anything that is not a terminal
/// value collapses into `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum RunStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl From<Option<String>> for RunStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("SUCCESS") => RunStatus::Success,
            Some("FAILED") => RunStatus::Failed,
            _ => RunStatus::Pending,
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Pending => "PENDING",
            RunStatus::Success => "SUCCESS",
            RunStatus::Failed => "FAILED",
        }
        .to_string()
    }
}

/// Body returned by the run-status endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub status: RunStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<OutputArtifact>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RunResponse {
    pub fn outputs(&self) -> &[OutputArtifact] {
        self.output.as_deref().unwrap_or_default()
    }

    /// Remote error payload rendered as compact JSON, `{}` when absent.
    pub fn error_detail(&self) -> String {
        match &self.error {
            Some(value) if !value.is_null() => value.to_string(),
            _ => "{}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputArtifact {
    #[serde(default)]
    pub processed_file_type: Option<String>,

    /// Base64 payload
    #[serde(default)]
    pub processed_file: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Redacted copy of the input (`redacted_<ext>`).
    Redacted,
    Entities,
    Other,
}

impl OutputArtifact {
    pub fn new(file_type: &str, payload: &str) -> Self {
        Self {
            processed_file_type: Some(file_type.to_string()),
            processed_file: Some(payload.to_string()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self.processed_file_type.as_deref() {
            Some(t) if t.starts_with(REDACTED_PREFIX) => ArtifactKind::Redacted,
            Some(ENTITIES_TYPE) => ArtifactKind::Entities,
            _ => ArtifactKind::Other,
        }
    }

    fn payload(&self) -> Option<&str> {
        self.processed_file.as_deref().filter(|p| !p.is_empty())
    }
}

/// Outputs of a finished run split by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedOutput {
    pub redacted_file: String,
    pub entities: Option<String>,
}

/// Pick the redacted file and the entities blob out of a run's outputs.
///
/// The first artifact of each role wins; later candidates of the same
/// role are ignored.
pub fn classify_outputs(outputs: &[OutputArtifact]) -> Result<ClassifiedOutput> {
    let mut redacted: Option<&OutputArtifact> = None;
    let mut entities: Option<&OutputArtifact> = None;

    for artifact in outputs {
        match artifact.kind() {
            ArtifactKind::Redacted if redacted.is_none() => redacted = Some(artifact),
            ArtifactKind::Entities if entities.is_none() => entities = Some(artifact),
            _ => {}
        }
    }

    let redacted_file = redacted
        .and_then(|a| a.payload())
        .ok_or(Error::MissingRedactedOutput)?;

    Ok(ClassifiedOutput {
        redacted_file: redacted_file.to_string(),
        entities: entities.and_then(|a| a.payload()).map(str::to_string),
    })
}
