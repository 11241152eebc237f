//! Error types for parameter extraction.

use std::fmt;
use thiserror::Error;

/// Acoustical parameter identifiers, used to tag degenerate-signal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Early lateral energy fraction (5-80 ms).
    LfEarly,
    /// Late lateral energy fraction (80 ms onward).
    LfLate,
    /// Direct-to-reverberant energy ratio.
    DrRatio,
}

impl Parameter {
    /// Column-style name of the parameter.
    pub fn name(self) -> &'static str {
        match self {
            Parameter::LfEarly => "lf_early",
            Parameter::LfLate => "lf_late",
            Parameter::DrRatio => "dr_ratio",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced by the analysis core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The channel layout does not match what the operation needs.
    #[error("invalid input shape: {0}")]
    InputShape(String),

    /// Peak detection found no local maximum in the signal.
    #[error("no peak found in a signal of {len} samples")]
    NoPeakFound {
        /// Length of the searched signal.
        len: usize,
    },

    /// The denominator energy of a ratio is numerically zero.
    #[error(
        "{parameter}: denominator energy {denominator:e} is too close to 0.0 (numerator {numerator:e})"
    )]
    Degenerate {
        /// Parameter that could not be computed.
        parameter: Parameter,
        /// Energy in the numerator window.
        numerator: f64,
        /// Energy in the denominator window.
        denominator: f64,
    },
}

/// Convenience result type for the analysis core.
pub type Result<T> = std::result::Result<T, AnalysisError>;
