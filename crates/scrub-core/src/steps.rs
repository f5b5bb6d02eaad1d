//! Step tracking and the result object returned to the invoker

use serde::{Deserialize, Serialize};

/// Pipeline stages whose completion is reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FileRead,
    FileDeidentified,
    FileWrite,
    DataTokenize,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::FileRead,
        Step::FileDeidentified,
        Step::FileWrite,
        Step::DataTokenize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::FileRead => "fileRead",
            Step::FileDeidentified => "fileDeidentified",
            Step::FileWrite => "fileWrite",
            Step::DataTokenize => "dataTokenize",
        }
    }
}

/// Per-invocation completion flags. Flags only ever go from false to true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTracker {
    pub file_read: bool,
    pub file_deidentified: bool,
    pub file_write: bool,
    pub data_tokenize: bool,
}

impl StepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete(&mut self, step: Step) {
        *self.flag_mut(step) = true;
    }

    pub fn is_complete(&self, step: Step) -> bool {
        match step {
            Step::FileRead => self.file_read,
            Step::FileDeidentified => self.file_deidentified,
            Step::FileWrite => self.file_write,
            Step::DataTokenize => self.data_tokenize,
        }
    }

    /// Last step that completed, if any.
    pub fn last_completed(&self) -> Option<Step> {
        Step::ALL.iter().rev().copied().find(|s| self.is_complete(*s))
    }

    fn flag_mut(&mut self, step: Step) -> &mut bool {
        match step {
            Step::FileRead => &mut self.file_read,
            Step::FileDeidentified => &mut self.file_deidentified,
            Step::FileWrite => &mut self.file_write,
            Step::DataTokenize => &mut self.data_tokenize,
        }
    }
}

/// Result object of one invocation, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub success: bool,
    pub steps: StepTracker,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_entity_count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvocationResult {
    pub fn completed(
        steps: StepTracker,
        detected_entity_count: usize,
        tokens: serde_json::Value,
    ) -> Self {
        Self {
            success: true,
            steps,
            detected_entity_count: Some(detected_entity_count),
            tokens: Some(tokens),
            error: None,
        }
    }

    pub fn failed(steps: StepTracker, error: impl Into<String>) -> Self {
        Self {
            success: false,
            steps,
            detected_entity_count: None,
            tokens: None,
            error: Some(error.into()),
        }
    }
}
