use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error_codes::{
        E_ACTION_MISMATCH, E_APK_PACKAGE_NAME_MISMATCH, E_CHALLENGE_TIMEOUT, E_HOSTNAME_MISMATCH,
        E_SCORE_THRESHOLD_NOT_MET,
    },
    response::VerificationResult,
};

/// Values a successful result must also match before it is accepted.
///
/// Every field is optional; unset fields are not checked. Hostname, APK package
/// name and action compare ASCII case-insensitively. Loadable from JSON:
///
/// ```json
/// {"hostname": "example.com", "action": "login", "score_threshold": 0.5, "challenge_timeout_secs": 120}
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectations {
    pub hostname: Option<String>,
    pub apk_package_name: Option<String>,
    pub action: Option<String>,
    pub score_threshold: Option<f64>,
    pub challenge_timeout_secs: Option<u64>,
}

impl Expectations {
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_apk_package_name(mut self, apk_package_name: impl Into<String>) -> Self {
        self.apk_package_name = Some(apk_package_name.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    pub fn with_challenge_timeout_secs(mut self, seconds: u64) -> Self {
        self.challenge_timeout_secs = Some(seconds);
        self
    }

    fn violations(&self, result: &VerificationResult, now: DateTime<Utc>) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(hostname) = &self.hostname {
            if !hostname.eq_ignore_ascii_case(result.hostname()) {
                errors.push(E_HOSTNAME_MISMATCH.to_string());
            }
        }

        if let Some(apk_package_name) = &self.apk_package_name {
            if !apk_package_name.eq_ignore_ascii_case(result.apk_package_name()) {
                errors.push(E_APK_PACKAGE_NAME_MISMATCH.to_string());
            }
        }

        if let Some(action) = &self.action {
            if !action.eq_ignore_ascii_case(result.action()) {
                errors.push(E_ACTION_MISMATCH.to_string());
            }
        }

        if let Some(threshold) = self.score_threshold {
            let met = result.score().is_some_and(|score| score >= threshold);
            if !met {
                errors.push(E_SCORE_THRESHOLD_NOT_MET.to_string());
            }
        }

        if let Some(timeout) = self.challenge_timeout_secs {
            match DateTime::parse_from_rfc3339(result.challenge_ts()) {
                Ok(challenge_ts) => {
                    let age = now.signed_duration_since(challenge_ts.with_timezone(&Utc));
                    if age.num_seconds() > i64::try_from(timeout).unwrap_or(i64::MAX) {
                        errors.push(E_CHALLENGE_TIMEOUT.to_string());
                    }
                }
                Err(e) => debug!(
                    "Skipping challenge timeout, timestamp {:?} unreadable: {}",
                    result.challenge_ts(),
                    e
                ),
            }
        }

        errors
    }
}

impl VerificationResult {
    /// Applies `expectations` to a successful result.
    ///
    /// Failed results come back unchanged. A successful result that violates any
    /// expectation comes back failed, carrying one code per violation in the order
    /// hostname, APK package name, action, score, challenge age.
    pub fn check(&self, expectations: &Expectations, now: DateTime<Utc>) -> VerificationResult {
        if !self.is_success() {
            return self.clone();
        }

        let errors = expectations.violations(self, now);
        if errors.is_empty() {
            return self.clone();
        }

        warn!("Response rejected by expectations: {:?}", errors);
        self.clone().into_failure(errors)
    }
}
