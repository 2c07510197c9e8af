use serde::{Deserialize, Serialize};
use std::fmt;

/// Reported when the service body could not be decoded into a usable object.
pub const E_INVALID_JSON: &str = "invalid-input-response";
/// Reported when the service signalled failure without listing any codes.
pub const E_UNKNOWN_ERROR: &str = "unknown-error";

pub const E_MISSING_INPUT_SECRET: &str = "missing-input-secret";
pub const E_INVALID_INPUT_SECRET: &str = "invalid-input-secret";
pub const E_MISSING_INPUT_RESPONSE: &str = "missing-input-response";
pub const E_BAD_REQUEST: &str = "bad-request";
pub const E_TIMEOUT_OR_DUPLICATE: &str = "timeout-or-duplicate";

// Produced locally by `VerificationResult::check`.
pub const E_HOSTNAME_MISMATCH: &str = "hostname-mismatch";
pub const E_APK_PACKAGE_NAME_MISMATCH: &str = "apk_package_name-mismatch";
pub const E_ACTION_MISMATCH: &str = "action-mismatch";
pub const E_SCORE_THRESHOLD_NOT_MET: &str = "score-threshold-not-met";
pub const E_CHALLENGE_TIMEOUT: &str = "challenge-timeout";

/// Typed view over an error-code token.
///
/// Conversion from text never fails: tokens this crate does not know about are
/// kept in [`ErrorCode::Other`] so `as_str` always gives back the original text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    MissingInputSecret,
    InvalidInputSecret,
    MissingInputResponse,
    InvalidInputResponse,
    BadRequest,
    TimeoutOrDuplicate,
    UnknownError,
    HostnameMismatch,
    ApkPackageNameMismatch,
    ActionMismatch,
    ScoreThresholdNotMet,
    ChallengeTimeout,
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::MissingInputSecret => E_MISSING_INPUT_SECRET,
            ErrorCode::InvalidInputSecret => E_INVALID_INPUT_SECRET,
            ErrorCode::MissingInputResponse => E_MISSING_INPUT_RESPONSE,
            ErrorCode::InvalidInputResponse => E_INVALID_JSON,
            ErrorCode::BadRequest => E_BAD_REQUEST,
            ErrorCode::TimeoutOrDuplicate => E_TIMEOUT_OR_DUPLICATE,
            ErrorCode::UnknownError => E_UNKNOWN_ERROR,
            ErrorCode::HostnameMismatch => E_HOSTNAME_MISMATCH,
            ErrorCode::ApkPackageNameMismatch => E_APK_PACKAGE_NAME_MISMATCH,
            ErrorCode::ActionMismatch => E_ACTION_MISMATCH,
            ErrorCode::ScoreThresholdNotMet => E_SCORE_THRESHOLD_NOT_MET,
            ErrorCode::ChallengeTimeout => E_CHALLENGE_TIMEOUT,
            ErrorCode::Other(code) => code,
        }
    }

    /// True for codes that point at the caller's own setup (secret or request shape)
    /// rather than at the end user's answer.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::MissingInputSecret | ErrorCode::InvalidInputSecret | ErrorCode::BadRequest
        )
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            E_MISSING_INPUT_SECRET => ErrorCode::MissingInputSecret,
            E_INVALID_INPUT_SECRET => ErrorCode::InvalidInputSecret,
            E_MISSING_INPUT_RESPONSE => ErrorCode::MissingInputResponse,
            E_INVALID_JSON => ErrorCode::InvalidInputResponse,
            E_BAD_REQUEST => ErrorCode::BadRequest,
            E_TIMEOUT_OR_DUPLICATE => ErrorCode::TimeoutOrDuplicate,
            E_UNKNOWN_ERROR => ErrorCode::UnknownError,
            E_HOSTNAME_MISMATCH => ErrorCode::HostnameMismatch,
            E_APK_PACKAGE_NAME_MISMATCH => ErrorCode::ApkPackageNameMismatch,
            E_ACTION_MISMATCH => ErrorCode::ActionMismatch,
            E_SCORE_THRESHOLD_NOT_MET => ErrorCode::ScoreThresholdNotMet,
            E_CHALLENGE_TIMEOUT => ErrorCode::ChallengeTimeout,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        match ErrorCode::from(code.as_str()) {
            ErrorCode::Other(_) => ErrorCode::Other(code),
            known => known,
        }
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
