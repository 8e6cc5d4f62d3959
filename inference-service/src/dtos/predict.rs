use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON body accepted by the predict endpoint.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "photoBase64")]
    pub photo_base64: Option<String>,
}

/// Classification result returned to the caller.
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub predicted_class: String,
    pub confidence: f32,
    pub probabilities: BTreeMap<String, f32>,
    pub risk_score: i32,
    pub saved_path: Option<String>,
}

/// Splits a `data:image/<ext>;base64,<payload>` URI into extension and
/// payload. Returns `None` when the value does not have that shape.
pub fn parse_photo_data_uri(value: &str) -> Option<(&str, &str)> {
    let rest = value.strip_prefix("data:image/")?;
    let (ext, payload) = rest.split_once(";base64,")?;
    if ext.is_empty() || payload.is_empty() {
        return None;
    }
    Some((ext, payload))
}
