use log::{debug, info};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;

use crate::{expectations::Expectations, response::VerificationResult};

pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn value_to_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|s| s.is_finite())
}

/// Text field that falls back to an empty string for missing, null or non-scalar values.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

pub(crate) fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_score(&value))
}

/// Only the JSON literal `true` counts.
pub(crate) fn literal_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

pub(crate) fn code_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let codes = match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    };
    Ok(codes)
}

pub fn load_response(path: &Path) -> Result<VerificationResult, anyhow::Error> {
    debug!("Loading response body from {}", path.display());
    let body = std::fs::read_to_string(path)?;
    Ok(VerificationResult::from_json(&body))
}

pub fn save_mapping(result: &VerificationResult, path: &Path) -> Result<(), anyhow::Error> {
    debug!("Saving response mapping to {}", path.display());
    let json = serde_json::to_string_pretty(&result.to_mapping())?;
    std::fs::write(path, json)?;
    info!("Response mapping saved to {}", path.display());
    Ok(())
}

pub fn load_expectations(path: &Path) -> Result<Expectations, anyhow::Error> {
    debug!("Loading expectations from {}", path.display());
    let json = std::fs::read_to_string(path)?;
    let expectations: Expectations = serde_json::from_str(&json)?;
    Ok(expectations)
}
