//! Serverless invocation envelope

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Error, Result, decode_base64};

/// Header carrying the caller's vault bearer token.
pub const AUTH_HEADER: &str = "X-Skyflow-Authorization";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationEnvelope {
    /// Base64-encoded JSON request body
    #[serde(rename = "BodyContent", default)]
    pub body_content: Option<String>,

    #[serde(rename = "Headers", default)]
    pub headers: HashMap<String, HeaderValue>,
}

/// Connection headers arrive either as a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    One(String),
    Many(Vec<String>),
}

impl HeaderValue {
    fn first(&self) -> Option<&str> {
        match self {
            HeaderValue::One(v) => Some(v.as_str()),
            HeaderValue::Many(vs) => vs.first().map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationRequest {
    #[serde(default)]
    pub skyflow_id: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Decoded invocation, ready for the pipeline.
#[derive(Clone)]
pub struct Invocation {
    pub request: InvocationRequest,
    pub auth_token: String,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("request", &self.request)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl InvocationEnvelope {
    /// Build an envelope the way the serverless runtime would.
    pub fn new(request: &InvocationRequest, auth_token: &str) -> Result<Self> {
        let body = serde_json::to_vec(request).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let mut headers = HashMap::new();
        headers.insert(
            AUTH_HEADER.to_string(),
            HeaderValue::Many(vec![auth_token.to_string()]),
        );

        Ok(Self {
            body_content: Some(base64::engine::general_purpose::STANDARD.encode(body)),
            headers,
        })
    }

    pub fn decode(&self) -> Result<Invocation> {
        let body = self
            .body_content
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or(Error::MissingBody)?;

        let bytes = decode_base64(body)
            .map_err(|e| Error::InvalidInput(format!("BodyContent is not base64: {}", e)))?;
        let request: InvocationRequest = serde_json::from_slice(&bytes)
            .map_err(|e| Error::InvalidInput(format!("BodyContent is not JSON: {}", e)))?;

        let auth_token = self
            .header(AUTH_HEADER)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::MissingAuthHeader(AUTH_HEADER.to_string()))?;

        Ok(Invocation {
            request,
            auth_token: auth_token.to_string(),
        })
    }

    /// Case-insensitive header lookup returning the first value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.first())
    }
}
