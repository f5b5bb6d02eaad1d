//! Detected entities and credit-card extraction

use serde::{Deserialize, Serialize};

use crate::{Error, Result, decode_base64};

pub const CREDIT_CARD_LABEL: &str = "CREDIT_CARD";
const CARD_NUMBER_DIGITS: usize = 16;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectedEntity {
    #[serde(default)]
    pub best_label: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DetectedEntity {
    pub fn new(label: &str, text: &str) -> Self {
        Self {
            best_label: Some(label.to_string()),
            text: Some(text.to_string()),
            extra: serde_json::Map::new(),
        }
    }
}

/// Field object written to the vault for tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    pub card_number: String,
}

/// Decode an entities artifact: base64, then UTF-8, then a JSON array.
pub fn decode_entities(payload: &str) -> Result<Vec<DetectedEntity>> {
    let bytes = decode_base64(payload)
        .map_err(|e| Error::InvalidEntities(format!("base64: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| Error::InvalidEntities(format!("utf-8: {}", e)))?;
    serde_json::from_str(&text).map_err(|e| Error::InvalidEntities(format!("json: {}", e)))
}

/// Find the first credit-card entity and normalize its number.
///
/// Only the first `CREDIT_CARD` entry is considered. Its text keeps ASCII
/// digits only, truncated to 16 characters. Returns `None` when no such
/// entry exists or its text is empty.
pub fn extract_credit_card(entities: &[DetectedEntity]) -> Option<CardData> {
    let item = entities
        .iter()
        .find(|e| e.best_label.as_deref() == Some(CREDIT_CARD_LABEL))?;

    let text = item.text.as_deref().filter(|t| !t.is_empty())?;
    let card_number: String = text
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(CARD_NUMBER_DIGITS)
        .collect();

    Some(CardData { card_number })
}
