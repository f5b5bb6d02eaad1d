//! Shared reqwest plumbing

use scrub_config::HttpConfig;

const MAX_ERROR_BODY: usize = 200;

pub fn build_client(config: &HttpConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .build()
}

/// Send a request and turn transport errors and non-2xx statuses into a
/// short message.
pub(crate) async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, String> {
    let response = request
        .send()
        .await
        .map_err(|e| format!("request failed: {}", e.without_url()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
    Err(format!("HTTP {}: {}", status.as_u16(), snippet.trim()))
}

pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, String> {
    let response = send(request).await?;
    response
        .json()
        .await
        .map_err(|e| format!("invalid JSON response: {}", e))
}
