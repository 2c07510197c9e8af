//! # siteverify - typed captcha verification responses
//!
//! Parses the JSON body returned by a human-verification service's verify endpoint
//! into a read-only [`VerificationResult`]. Fetching that body (secret handling,
//! HTTP, retries) is left to the caller.
//!
//! ## Basic Usage
//!
//! ```rust
//! use siteverify::VerificationResult;
//!
//! let body = r#"{"success": true, "hostname": "example.com", "score": 0.9, "action": "login"}"#;
//! let result = VerificationResult::from_json(body);
//!
//! assert!(result.is_success());
//! assert_eq!(result.score(), Some(0.9));
//! ```
//!
//! Bodies that cannot be used are classified rather than rejected:
//!
//! ```rust
//! let result = siteverify::parse("not json");
//! assert!(!result.is_success());
//! assert_eq!(result.error_codes(), ["invalid-input-response"]);
//!
//! let result = siteverify::parse(r#"{"success": false}"#);
//! assert_eq!(result.error_codes(), ["unknown-error"]);
//! ```
//!
//! ## Expectations
//!
//! A successful response can be held to further expectations:
//!
//! ```rust
//! use siteverify::{Expectations, VerificationResult};
//!
//! let result = VerificationResult::from_json(r#"{"success": true, "action": "login", "score": 0.3}"#);
//! let expectations = Expectations::default()
//!     .with_action("login")
//!     .with_score_threshold(0.5);
//!
//! let checked = result.check(&expectations, chrono::Utc::now());
//! assert_eq!(checked.error_codes(), ["score-threshold-not-met"]);
//! ```

pub mod error_codes;
pub mod expectations;
pub mod response;
pub mod utils;

pub use error_codes::ErrorCode;
pub use expectations::Expectations;
pub use response::VerificationResult;

pub fn parse(json: &str) -> VerificationResult {
    VerificationResult::from_json(json)
}
