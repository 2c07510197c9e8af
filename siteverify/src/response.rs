use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{convert::Infallible, str::FromStr};

use crate::{
    error_codes::{ErrorCode, E_INVALID_JSON, E_UNKNOWN_ERROR},
    utils::{code_list, lenient_score, lenient_string, literal_true},
};

/// Body of the verify endpoint as it appears on the wire.
#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default, deserialize_with = "literal_true")]
    success: bool,
    #[serde(rename = "error-codes", default, deserialize_with = "code_list")]
    error_codes: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    hostname: String,
    #[serde(default, deserialize_with = "lenient_string")]
    challenge_ts: String,
    #[serde(default, deserialize_with = "lenient_string")]
    apk_package_name: String,
    #[serde(default, deserialize_with = "lenient_score")]
    score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    action: String,
}

/// Decodes a body that must be a non-empty JSON object.
fn decode_wire(json: &str) -> Result<WireResponse, serde_json::Error> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(fields) if !fields.is_empty() => serde_json::from_value(Value::Object(fields)),
        other => Err(serde::de::Error::custom(format!(
            "expected a non-empty object, got {}",
            other
        ))),
    }
}

/// Outcome of a verification as reported by the service.
///
/// A successful result never carries error codes and a failed one always
/// carries at least one. Serializes to the same shape as [`to_mapping`].
///
/// [`to_mapping`]: VerificationResult::to_mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    success: bool,
    hostname: String,
    challenge_ts: String,
    apk_package_name: String,
    score: Option<f64>,
    action: String,
    #[serde(rename = "error-codes")]
    error_codes: Vec<String>,
}

impl VerificationResult {
    /// Classifies a raw response body. Never fails: undecodable input becomes
    /// a failed result carrying `invalid-input-response`.
    pub fn from_json(json: &str) -> Self {
        let wire = match decode_wire(json) {
            Ok(wire) => wire,
            Err(e) => {
                debug!("Response body is unusable: {}", e);
                return Self::invalid_input();
            }
        };

        let error_codes = if wire.success {
            Vec::new()
        } else {
            match wire.error_codes {
                Some(codes) if !codes.is_empty() => codes,
                _ => {
                    debug!("Failed response carries no error codes");
                    vec![E_UNKNOWN_ERROR.to_string()]
                }
            }
        };
        debug!(
            "Parsed response: success={}, error_codes={:?}",
            wire.success, error_codes
        );

        Self {
            success: wire.success,
            hostname: wire.hostname,
            challenge_ts: wire.challenge_ts,
            apk_package_name: wire.apk_package_name,
            score: wire.score,
            action: wire.action,
            error_codes,
        }
    }

    fn invalid_input() -> Self {
        Self {
            success: false,
            hostname: String::new(),
            challenge_ts: String::new(),
            apk_package_name: String::new(),
            score: None,
            action: String::new(),
            error_codes: vec![E_INVALID_JSON.to_string()],
        }
    }

    /// Same optional fields, marked failed with `error_codes` appended.
    pub(crate) fn into_failure(self, error_codes: Vec<String>) -> Self {
        let mut codes = self.error_codes;
        codes.extend(error_codes);
        Self {
            success: false,
            error_codes: codes,
            ..self
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error_codes(&self) -> &[String] {
        &self.error_codes
    }

    pub fn error_code_kinds(&self) -> Vec<ErrorCode> {
        self.error_codes
            .iter()
            .map(|code| ErrorCode::from(code.as_str()))
            .collect()
    }

    /// Hostname of the site where the challenge was solved.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Challenge load time, ISO-8601 text as sent by the service.
    pub fn challenge_ts(&self) -> &str {
        &self.challenge_ts
    }

    pub fn apk_package_name(&self) -> &str {
        &self.apk_package_name
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Wire-named mapping of every field, `score` as `null` when absent.
    pub fn to_mapping(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("success".to_string(), Value::Bool(self.success));
        map.insert("hostname".to_string(), Value::from(self.hostname.as_str()));
        map.insert(
            "challenge_ts".to_string(),
            Value::from(self.challenge_ts.as_str()),
        );
        map.insert(
            "apk_package_name".to_string(),
            Value::from(self.apk_package_name.as_str()),
        );
        map.insert(
            "score".to_string(),
            self.score.map_or(Value::Null, Value::from),
        );
        map.insert("action".to_string(), Value::from(self.action.as_str()));
        map.insert(
            "error-codes".to_string(),
            Value::from(self.error_codes.clone()),
        );
        map
    }
}

impl FromStr for VerificationResult {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_json(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_clears_error_codes() {
        let result = VerificationResult::from_json(
            r#"{"success": true, "error-codes": ["ignored"], "hostname": "example.com"}"#,
        );
        assert!(result.is_success());
        assert!(result.error_codes().is_empty());
        assert_eq!(result.hostname(), "example.com");
    }

    #[test]
    fn non_boolean_success_is_not_success() {
        for body in [r#"{"success": 1}"#, r#"{"success": "true"}"#] {
            let result = VerificationResult::from_json(body);
            assert!(!result.is_success());
            assert_eq!(result.error_codes(), [E_UNKNOWN_ERROR]);
        }
    }

    #[test]
    fn falsy_bodies_are_invalid_input() {
        for body in ["", "null", "false", "0", "[]", "{}", "\"\""] {
            let result = VerificationResult::from_json(body);
            assert!(!result.is_success(), "{body}");
            assert_eq!(result.error_codes(), [E_INVALID_JSON], "{body}");
        }
    }

    #[test]
    fn decode_wire_rejects_only_unusable_bodies() {
        assert!(decode_wire("{}").is_err());
        assert!(decode_wire("[1, 2]").is_err());
        assert!(decode_wire("not json").is_err());
        let wire = decode_wire(r#"{"success": [], "hostname": {}, "score": [], "error-codes": 3}"#)
            .unwrap();
        assert!(!wire.success);
        assert_eq!(wire.hostname, "");
        assert_eq!(wire.score, None);
        assert_eq!(wire.error_codes, None);
    }

    #[test]
    fn empty_error_code_list_becomes_unknown() {
        let result = VerificationResult::from_json(r#"{"success": false, "error-codes": []}"#);
        assert_eq!(result.error_codes(), [E_UNKNOWN_ERROR]);
    }

    #[test]
    fn error_codes_object_is_not_a_list() {
        let result =
            VerificationResult::from_json(r#"{"success": false, "error-codes": {"a": "b"}}"#);
        assert_eq!(result.error_codes(), [E_UNKNOWN_ERROR]);
    }

    #[test]
    fn non_string_codes_keep_their_json_text() {
        let result = VerificationResult::from_json(r#"{"error-codes": ["bad-request", 7]}"#);
        assert_eq!(result.error_codes(), ["bad-request", "7"]);
    }

    #[test]
    fn null_fields_default() {
        let result = VerificationResult::from_json(
            r#"{"success": true, "hostname": null, "score": null, "action": null}"#,
        );
        assert_eq!(result.hostname(), "");
        assert_eq!(result.action(), "");
        assert_eq!(result.score(), None);
    }

    #[test]
    fn from_str_matches_from_json() {
        let body = r#"{"success": false, "error-codes": ["timeout-or-duplicate"]}"#;
        let parsed: VerificationResult = body.parse().unwrap();
        assert_eq!(parsed, VerificationResult::from_json(body));
        assert_eq!(parsed.error_code_kinds(), [ErrorCode::TimeoutOrDuplicate]);
    }

    #[test]
    fn into_failure_appends_codes() {
        let result = VerificationResult::from_json(r#"{"success": true, "action": "login"}"#)
            .into_failure(vec!["action-mismatch".to_string()]);
        assert!(!result.is_success());
        assert_eq!(result.error_codes(), ["action-mismatch"]);
        assert_eq!(result.action(), "login");
    }
}
