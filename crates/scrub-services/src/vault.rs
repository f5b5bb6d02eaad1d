//! Vault API: record lookup, file download/upload, tokenized insert

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use scrub_config::Config;
use scrub_core::{CardData, Error, Result};
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::http;

/// Redacted file ready to be attached to a vault record.
#[derive(Debug, Clone)]
pub struct RedactedUpload {
    pub bytes: Vec<u8>,
    pub data_format: String,
}

impl RedactedUpload {
    pub fn file_name(&self) -> String {
        format!("redacted.{}", self.data_format.to_lowercase())
    }

    pub fn content_type(&self) -> String {
        format!("application/{}", self.data_format.to_lowercase())
    }
}

#[async_trait]
pub trait VaultApi: Send + Sync {
    /// Resolve the signed download URL of the record's file column.
    async fn download_url(&self, auth: &AuthContext, record_id: &str) -> Result<String>;

    /// Fetch raw bytes from a signed download URL.
    async fn download_file(&self, url: &str) -> Result<Vec<u8>>;

    /// Attach a file to the record.
    async fn upload_file(
        &self,
        auth: &AuthContext,
        record_id: &str,
        file: RedactedUpload,
    ) -> Result<serde_json::Value>;

    /// Write `fields` into the record with tokenization and return the tokens.
    async fn tokenize(
        &self,
        auth: &AuthContext,
        record_id: &str,
        fields: Option<&CardData>,
    ) -> Result<serde_json::Value>;
}

pub struct HttpVault {
    client: reqwest::Client,
    account_url: String,
    vault_id: String,
    table: String,
    file_column: String,
    upload_field: String,
}

impl HttpVault {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        Ok(Self::with_client(http::build_client(&config.http)?, config))
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            account_url: config.account_url.clone(),
            vault_id: config.vault_id.clone(),
            table: config.vault.table.clone(),
            file_column: config.vault.file_column.clone(),
            upload_field: config.vault.upload_field.clone(),
        }
    }

    fn record_url(&self, record_id: &str) -> String {
        format!(
            "{}/v1/vaults/{}/{}/{}",
            self.account_url, self.vault_id, self.table, record_id
        )
    }

    fn auth_headers(
        &self,
        auth: &AuthContext,
        stage: &'static str,
    ) -> Result<reqwest::header::HeaderMap> {
        auth.headers()
            .map_err(|e| Error::vault(stage, format!("invalid auth header: {}", e)))
    }
}

#[async_trait]
impl VaultApi for HttpVault {
    async fn download_url(&self, auth: &AuthContext, record_id: &str) -> Result<String> {
        let request = self
            .client
            .get(self.record_url(record_id))
            .query(&[("downloadURL", "true")])
            .headers(self.auth_headers(auth, "record")?);

        let body = http::send_json(request)
            .await
            .map_err(|e| Error::vault("record", e))?;

        body["fields"][self.file_column.as_str()]
            .as_str()
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or(Error::MissingDownloadUrl)
    }

    async fn download_file(&self, url: &str) -> Result<Vec<u8>> {
        let response = http::send(self.client.get(url))
            .await
            .map_err(|e| Error::vault("download", e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::vault("download", e.without_url().to_string()))?;
        debug!(size = bytes.len(), "Downloaded original file");
        Ok(bytes.to_vec())
    }

    async fn upload_file(
        &self,
        auth: &AuthContext,
        record_id: &str,
        file: RedactedUpload,
    ) -> Result<serde_json::Value> {
        let file_name = file.file_name();
        let content_type = file.content_type();
        let part = Part::bytes(file.bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| Error::vault("upload", format!("invalid content type: {}", e)))?;
        let form = Form::new().part(self.upload_field.clone(), part);

        let request = self
            .client
            .post(format!("{}/files", self.record_url(record_id)))
            .headers(self.auth_headers(auth, "upload")?)
            .multipart(form);

        let response = http::send(request)
            .await
            .map_err(|e| Error::vault("upload", e))?;

        // The ack body is opaque; tolerate an empty or non-JSON one.
        let text = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::Null))
    }

    async fn tokenize(
        &self,
        auth: &AuthContext,
        record_id: &str,
        fields: Option<&CardData>,
    ) -> Result<serde_json::Value> {
        let payload = json!({
            "record": { "fields": fields },
            "tokenization": true
        });

        let headers = self.auth_headers(auth, "tokenize")?;
        let request = self
            .client
            .put(self.record_url(record_id))
            .headers(headers)
            .json(&payload);

        match http::send_json(request).await {
            Ok(mut body) => Ok(body
                .get_mut("tokens")
                .map(serde_json::Value::take)
                .unwrap_or(serde_json::Value::Null)),
            Err(e) => {
                warn!(record = record_id, error = %e, "Vault insert failed");
                Err(Error::InsertFailed)
            }
        }
    }
}
