//! The redaction pipeline: fetch, submit, poll, classify, write back, tokenize

use base64::Engine as _;
use scrub_config::Config;
use scrub_core::{
    ClassifiedOutput, Error, Invocation, InvocationEnvelope, InvocationResult, Result, Step,
    StepTracker, classify_outputs, decode_base64, decode_entities, extract_credit_card,
    infer_data_format,
};
use scrub_services::{
    AuthContext, DeidentifyRequest, DetectApi, FilePayload, HttpDetect, HttpVault, RedactedUpload,
    VaultApi,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::poller::RunPoller;

/// Original file pulled from the vault.
struct FetchedFile {
    base64: String,
    data_format: Option<String>,
}

struct Completed {
    detected_entity_count: usize,
    tokens: serde_json::Value,
}

pub struct Pipeline {
    config: Config,
    vault: Arc<dyn VaultApi>,
    detect: Arc<dyn DetectApi>,
    poller: RunPoller,
}

impl Pipeline {
    pub fn new(
        config: Config,
        vault: Arc<dyn VaultApi>,
        detect: Arc<dyn DetectApi>,
        poller: RunPoller,
    ) -> Self {
        Self {
            config,
            vault,
            detect,
            poller,
        }
    }

    /// Wire the pipeline to the real HTTP services.
    pub fn from_config(config: Config) -> reqwest::Result<Self> {
        let client = scrub_services::build_client(&config.http)?;
        let vault = Arc::new(HttpVault::with_client(client.clone(), &config));
        let detect = Arc::new(HttpDetect::with_client(client, &config));
        let poller = RunPoller::from_config(&config.poll);
        Ok(Self::new(config, vault, detect, poller))
    }

    /// Entry point for a raw serverless envelope. Never fails: decoding
    /// errors come back as a failed result with no steps completed.
    pub async fn handle(&self, envelope: &InvocationEnvelope) -> InvocationResult {
        match envelope.decode() {
            Ok(invocation) => self.run(&invocation).await,
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Rejected invocation");
                InvocationResult::failed(StepTracker::new(), e.to_string())
            }
        }
    }

    pub async fn run(&self, invocation: &Invocation) -> InvocationResult {
        let mut steps = StepTracker::new();

        match self.execute(invocation, &mut steps).await {
            Ok(done) => {
                info!(
                    record = invocation.request.skyflow_id.as_deref().unwrap_or_default(),
                    entities = done.detected_entity_count,
                    "Invocation completed"
                );
                InvocationResult::completed(steps, done.detected_entity_count, done.tokens)
            }
            Err(e) => {
                warn!(
                    record = invocation.request.skyflow_id.as_deref().unwrap_or_default(),
                    error = %e,
                    kind = ?e.kind(),
                    last_step = steps.last_completed().map(|s| s.name()),
                    "Invocation failed"
                );
                InvocationResult::failed(steps, e.to_string())
            }
        }
    }

    async fn execute(&self, invocation: &Invocation, steps: &mut StepTracker) -> Result<Completed> {
        let auth = AuthContext::new(self.config.account_id.clone(), invocation.auth_token.clone());
        let record_id = invocation
            .request
            .skyflow_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingRecord)?;

        let file = self.fetch_file(&auth, record_id).await?;
        steps.complete(Step::FileRead);

        let data_format = file.data_format.clone();
        let classified = self.deidentify(&auth, file).await?;
        steps.complete(Step::FileDeidentified);

        self.write_back(&auth, record_id, &classified, data_format).await?;
        steps.complete(Step::FileWrite);

        let completed = self.tokenize(&auth, record_id, &classified).await?;
        steps.complete(Step::DataTokenize);

        Ok(completed)
    }

    async fn fetch_file(&self, auth: &AuthContext, record_id: &str) -> Result<FetchedFile> {
        let url = self.vault.download_url(auth, record_id).await?;
        let bytes = self.vault.download_file(&url).await?;
        let data_format = infer_data_format(&url);

        info!(record = record_id, size = bytes.len(), format = ?data_format, "Fetched file");
        Ok(FetchedFile {
            base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            data_format,
        })
    }

    /// Submit, poll until the run finishes, then split its outputs.
    async fn deidentify(&self, auth: &AuthContext, file: FetchedFile) -> Result<ClassifiedOutput> {
        let request = DeidentifyRequest {
            file: FilePayload {
                base64: file.base64,
                data_format: file.data_format,
            },
            vault_id: self.config.vault_id.clone(),
        };

        let submitted = self.detect.deidentify_file(auth, &request).await?;
        let run_id = submitted
            .run_id
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingRunId)?;
        info!(run_id = %run_id, "Submitted file for de-identification");

        let run = self
            .poller
            .poll(|| self.detect.run_status(auth, &run_id))
            .await?;
        debug!(run_id = %run_id, outputs = run.outputs().len(), "Run finished");

        classify_outputs(run.outputs())
    }

    async fn write_back(
        &self,
        auth: &AuthContext,
        record_id: &str,
        classified: &ClassifiedOutput,
        data_format: Option<String>,
    ) -> Result<()> {
        let data_format = data_format.ok_or(Error::MissingDataFormat)?;
        let bytes = decode_base64(&classified.redacted_file)
            .map_err(|e| Error::InvalidRedactedOutput(e.to_string()))?;

        let upload = RedactedUpload { bytes, data_format };
        info!(record = record_id, file = %upload.file_name(), "Writing redacted file");
        self.vault.upload_file(auth, record_id, upload).await?;
        Ok(())
    }

    async fn tokenize(
        &self,
        auth: &AuthContext,
        record_id: &str,
        classified: &ClassifiedOutput,
    ) -> Result<Completed> {
        let entities = match classified.entities.as_deref() {
            Some(payload) => decode_entities(payload)?,
            None => Vec::new(),
        };

        let card = extract_credit_card(&entities);
        if card.is_none() {
            // The vault decides what an empty insert means.
            debug!(record = record_id, "No credit card entity detected");
        }

        let tokens = self.vault.tokenize(auth, record_id, card.as_ref()).await?;
        Ok(Completed {
            detected_entity_count: entities.len(),
            tokens,
        })
    }
}
