//! Detection API: file de-identification and run status

use async_trait::async_trait;
use scrub_config::Config;
use scrub_core::{Error, Result, RunResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthContext;
use crate::http;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePayload {
    pub base64: String,
    pub data_format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeidentifyRequest {
    pub file: FilePayload,
    pub vault_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeidentifyResponse {
    #[serde(default)]
    pub run_id: Option<String>,
}

#[async_trait]
pub trait DetectApi: Send + Sync {
    /// Submit a file for de-identification; starts an asynchronous run.
    async fn deidentify_file(
        &self,
        auth: &AuthContext,
        request: &DeidentifyRequest,
    ) -> Result<DeidentifyResponse>;

    /// Read the current state of a run.
    async fn run_status(&self, auth: &AuthContext, run_id: &str) -> Result<RunResponse>;
}

pub struct HttpDetect {
    client: reqwest::Client,
    account_url: String,
    vault_id: String,
}

impl HttpDetect {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        Ok(Self::with_client(http::build_client(&config.http)?, config))
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            account_url: config.account_url.clone(),
            vault_id: config.vault_id.clone(),
        }
    }

    fn auth_headers(
        &self,
        auth: &AuthContext,
        stage: &'static str,
    ) -> Result<reqwest::header::HeaderMap> {
        auth.headers()
            .map_err(|e| Error::detect(stage, format!("invalid auth header: {}", e)))
    }
}

#[async_trait]
impl DetectApi for HttpDetect {
    async fn deidentify_file(
        &self,
        auth: &AuthContext,
        request: &DeidentifyRequest,
    ) -> Result<DeidentifyResponse> {
        let builder = self
            .client
            .post(format!("{}/v1/detect/deidentify/file", self.account_url))
            .headers(self.auth_headers(auth, "submit")?)
            .json(request);

        let body = http::send_json(builder)
            .await
            .map_err(|e| Error::detect("submit", e))?;
        serde_json::from_value(body).map_err(|e| Error::detect("submit", e.to_string()))
    }

    async fn run_status(&self, auth: &AuthContext, run_id: &str) -> Result<RunResponse> {
        let builder = self
            .client
            .get(format!("{}/v1/detect/runs/{}", self.account_url, run_id))
            .query(&[("vault_id", self.vault_id.as_str())])
            .headers(self.auth_headers(auth, "status")?);

        let body = http::send_json(builder)
            .await
            .map_err(|e| Error::detect("status", e))?;
        serde_json::from_value(body).map_err(|e| Error::detect("status", e.to_string()))
    }
}
