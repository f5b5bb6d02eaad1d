//! Auth context and request headers

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};

pub const ACCOUNT_ID_HEADER: &str = "x-skyflow-account-id";

/// Credentials for one invocation. The token comes from the caller, the
/// account id from process configuration.
#[derive(Clone)]
pub struct AuthContext {
    pub account_id: String,
    token: String,
}

impl AuthContext {
    pub fn new(account_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            token: token.into(),
        }
    }

    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCOUNT_ID_HEADER, HeaderValue::from_str(&self.account_id)?);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        Ok(headers)
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("account_id", &self.account_id)
            .field("token", &"<redacted>")
            .finish()
    }
}
