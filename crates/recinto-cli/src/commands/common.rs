//! Shared CLI helpers used across multiple commands.

use indicatif::{ProgressBar, ProgressStyle};
use recinto_analysis::{DrIntegrationLimit, ParameterOutcome};

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        )),
    }
}

/// Resolve the DR window bound from `--dr-limit` / `--no-dr-limit`.
pub fn dr_limit(
    seconds: Option<f64>,
    unbounded: bool,
    default: DrIntegrationLimit,
) -> anyhow::Result<DrIntegrationLimit> {
    if unbounded {
        return Ok(DrIntegrationLimit::Unbounded);
    }
    match seconds {
        Some(s) if !(s.is_finite() && s > 0.0) => {
            anyhow::bail!("--dr-limit must be a positive number of seconds, got {s}")
        }
        Some(s) => Ok(DrIntegrationLimit::Seconds(s)),
        None => Ok(default),
    }
}

/// Format a parameter outcome for terminal output.
pub fn format_db(outcome: &ParameterOutcome) -> String {
    match outcome {
        Ok(value) => format!("{value:4.2} dB"),
        Err(e) => format!("undefined ({e})"),
    }
}

/// Progress bar over `len` items.
pub fn progress_bar(len: usize) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recinto_analysis::{AnalysisError, Parameter};

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("front_left_up=a b.wav"),
            Ok(("front_left_up".to_string(), "a b.wav".to_string()))
        );
        assert_eq!(
            parse_key_val("k=v=w"),
            Ok(("k".to_string(), "v=w".to_string()))
        );
        assert!(parse_key_val("novalue").is_err());
    }

    #[test]
    fn test_dr_limit_flags() {
        let default = DrIntegrationLimit::default();
        assert_eq!(dr_limit(None, false, default).unwrap(), default);
        assert_eq!(
            dr_limit(Some(1.5), false, default).unwrap(),
            DrIntegrationLimit::Seconds(1.5)
        );
        assert_eq!(
            dr_limit(Some(1.5), true, default).unwrap(),
            DrIntegrationLimit::Unbounded
        );
        assert!(dr_limit(Some(0.0), false, default).is_err());
        assert!(dr_limit(Some(f64::NAN), false, default).is_err());
    }

    #[test]
    fn test_format_db() {
        assert_eq!(format_db(&Ok(-3.14159)), "-3.14 dB");
        assert_eq!(format_db(&Ok(f64::NEG_INFINITY)), "-inf dB");
        let degenerate = AnalysisError::Degenerate {
            parameter: Parameter::DrRatio,
            numerator: 0.25,
            denominator: 0.0,
        };
        let text = format_db(&Err(degenerate.clone()));
        assert_eq!(text, format!("undefined ({degenerate})"));
        assert!(text.contains("2.5e-1"), "energies missing: {text}");
    }
}
