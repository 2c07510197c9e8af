use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use log::{debug, info, warn, LevelFilter};
use serde_json::Value;
use siteverify::{utils, VerificationResult};

/// Classify a captured verify-endpoint response body and print it as a mapping.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File holding the response body; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// JSON file of expectations to hold a successful response to
    #[arg(short, long)]
    expectations: Option<PathBuf>,
    /// Write the mapping here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(default_level);

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    debug!("Logging initialized with level: {}", log_level);
}

fn read_result(input: Option<&PathBuf>) -> Result<VerificationResult, anyhow::Error> {
    match input {
        Some(path) => utils::load_response(path),
        None => {
            debug!("Reading response body from stdin");
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(VerificationResult::from_json(&body))
        }
    }
}

fn run(cli: &Cli) -> Result<VerificationResult, anyhow::Error> {
    let mut result = read_result(cli.input.as_ref())?;

    if let Some(path) = &cli.expectations {
        let expectations = utils::load_expectations(path)?;
        result = result.check(&expectations, Utc::now());
    }

    match &cli.output {
        Some(path) => utils::save_mapping(&result, path)?,
        None => println!(
            "{}",
            serde_json::to_string_pretty(&Value::Object(result.to_mapping()))?
        ),
    }

    Ok(result)
}

fn main() -> Result<ExitCode, anyhow::Error> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(&cli)?;
    if result.is_success() {
        info!("Verification succeeded");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("Verification failed: {}", result.error_codes().join(", "));
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn read_mapping(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn writes_mapping_for_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(
            dir.path(),
            "body.json",
            r#"{"success": true, "hostname": "example.com", "score": 0.9, "action": "login"}"#,
        );
        let output = dir.path().join("mapping.json");
        let cli = Cli {
            input: Some(input),
            expectations: None,
            output: Some(output.clone()),
            verbose: false,
        };

        let result = run(&cli).unwrap();
        assert!(result.is_success());

        let mapping = read_mapping(&output);
        assert_eq!(mapping["success"], Value::Bool(true));
        assert_eq!(mapping["hostname"], "example.com");
        assert_eq!(mapping["score"], 0.9);
        assert_eq!(mapping["error-codes"], serde_json::json!([]));
    }

    #[test]
    fn expectations_can_fail_a_successful_body() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(
            dir.path(),
            "body.json",
            r#"{"success": true, "hostname": "Example.COM", "action": "login"}"#,
        );
        let expectations = write(
            dir.path(),
            "expectations.json",
            r#"{"hostname": "example.com", "action": "signup"}"#,
        );
        let output = dir.path().join("mapping.json");
        let cli = Cli {
            input: Some(input),
            expectations: Some(expectations),
            output: Some(output.clone()),
            verbose: false,
        };

        let result = run(&cli).unwrap();
        assert!(!result.is_success());
        assert_eq!(result.error_codes(), ["action-mismatch"]);
        assert_eq!(
            read_mapping(&output)["error-codes"],
            serde_json::json!(["action-mismatch"])
        );
    }

    #[test]
    fn malformed_body_is_classified_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(dir.path(), "body.json", "<html>502</html>");
        let output = dir.path().join("mapping.json");
        let cli = Cli {
            input: Some(input),
            expectations: None,
            output: Some(output.clone()),
            verbose: false,
        };

        let result = run(&cli).unwrap();
        assert!(!result.is_success());
        assert_eq!(
            read_mapping(&output)["error-codes"],
            serde_json::json!(["invalid-input-response"])
        );
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            input: Some(dir.path().join("absent.json")),
            expectations: None,
            output: None,
            verbose: false,
        };
        assert!(run(&cli).is_err());
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from(["inspect", "-i", "body.json", "--expectations", "e.json", "-v"])
            .unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("body.json")));
        assert_eq!(cli.expectations, Some(PathBuf::from("e.json")));
        assert_eq!(cli.output, None);
        assert!(cli.verbose);
    }
}
