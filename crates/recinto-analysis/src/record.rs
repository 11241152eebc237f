//! Per-recording parameter sets.
//!
//! A recording is either a single omnidirectional response or an A-format
//! capture. Locating the direct sound is shared by every parameter, so a
//! missing peak fails the whole recording; a degenerate energy window only
//! fails the parameter that needed it.

use serde::{Deserialize, Serialize};

use crate::ambisonics::{AFormatCapture, BFormat};
use crate::arrival::direct_sound_arrival;
use crate::error::{AnalysisError, Parameter, Result};
use crate::params::{
    DrIntegrationLimit, direct_reverberant_ratio_at, lateral_fraction_early_at,
    lateral_fraction_late_at,
};
use crate::units::samples_to_ms;

/// How a recording was captured and processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingType {
    /// Single omnidirectional microphone.
    Omni,
    /// Tetrahedral Ambisonics microphone.
    Ambi,
}

impl ProcessingType {
    /// Lowercase label used in result tables.
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingType::Omni => "omni",
            ProcessingType::Ambi => "ambi",
        }
    }
}

impl std::fmt::Display for ProcessingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one parameter: a dB value or the reason it is undefined.
pub type ParameterOutcome = std::result::Result<f64, AnalysisError>;

/// Parameters extracted from one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    /// Kind of recording.
    pub processing_type: ProcessingType,
    /// Sample index of the direct-sound arrival.
    pub direct_sound_arrival: usize,
    /// Direct-sound arrival in milliseconds.
    pub direct_sound_arrival_ms: f64,
    /// LF_early, absent for omnidirectional recordings.
    pub lf_early: Option<ParameterOutcome>,
    /// LF_late, absent for omnidirectional recordings.
    pub lf_late: Option<ParameterOutcome>,
    /// Direct-to-reverberant ratio.
    pub dr_ratio: ParameterOutcome,
}

impl ParameterSet {
    /// Value of `parameter` if it was computed successfully.
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        let outcome = match parameter {
            Parameter::LfEarly => self.lf_early.as_ref()?,
            Parameter::LfLate => self.lf_late.as_ref()?,
            Parameter::DrRatio => &self.dr_ratio,
        };
        outcome.as_ref().ok().copied()
    }

    /// Parameters that were attempted and failed.
    pub fn failures(&self) -> Vec<(Parameter, &AnalysisError)> {
        [
            (Parameter::LfEarly, self.lf_early.as_ref()),
            (Parameter::LfLate, self.lf_late.as_ref()),
            (Parameter::DrRatio, Some(&self.dr_ratio)),
        ]
        .into_iter()
        .filter_map(|(p, outcome)| match outcome {
            Some(Err(e)) => Some((p, e)),
            _ => None,
        })
        .collect()
    }
}

/// Extract DR and the arrival time from an omnidirectional response.
pub fn analyze_omni(
    rir: &[f64],
    sample_rate: u32,
    limit: DrIntegrationLimit,
) -> Result<ParameterSet> {
    let arrival = direct_sound_arrival(rir, sample_rate)?;
    Ok(ParameterSet {
        processing_type: ProcessingType::Omni,
        direct_sound_arrival: arrival,
        direct_sound_arrival_ms: samples_to_ms(arrival, sample_rate),
        lf_early: None,
        lf_late: None,
        dr_ratio: direct_reverberant_ratio_at(rir, sample_rate, limit, arrival),
    })
}

/// Extract LF_early, LF_late, DR and the arrival time from a B-format response.
///
/// DR and the arrival are computed on the W channel.
pub fn analyze_b_format(
    rir: &BFormat,
    sample_rate: u32,
    limit: DrIntegrationLimit,
) -> Result<ParameterSet> {
    let arrival = direct_sound_arrival(rir.w(), sample_rate)?;
    Ok(ParameterSet {
        processing_type: ProcessingType::Ambi,
        direct_sound_arrival: arrival,
        direct_sound_arrival_ms: samples_to_ms(arrival, sample_rate),
        lf_early: Some(lateral_fraction_early_at(rir, sample_rate, arrival)),
        lf_late: Some(lateral_fraction_late_at(rir, sample_rate, arrival)),
        dr_ratio: direct_reverberant_ratio_at(rir.w(), sample_rate, limit, arrival),
    })
}

/// Convert an A-format capture to B-format and extract its parameters.
pub fn analyze_a_format(capture: &AFormatCapture, limit: DrIntegrationLimit) -> Result<ParameterSet> {
    analyze_b_format(&capture.to_b_format(), capture.sample_rate(), limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(len: usize, at: usize) -> Vec<f64> {
        let mut s = vec![0.0; len];
        s[at] = 1.0;
        s
    }

    #[test]
    fn test_omni_has_no_lateral_fractions() {
        let mut rir = impulse(48000, 4800);
        for (i, v) in rir.iter_mut().enumerate().skip(4801) {
            *v = 0.01 * ((i % 7) as f64 - 3.0);
        }
        let set = analyze_omni(&rir, 48000, DrIntegrationLimit::default()).unwrap();
        assert_eq!(set.processing_type, ProcessingType::Omni);
        assert_eq!(set.direct_sound_arrival, 4752);
        assert_eq!(set.direct_sound_arrival_ms, 99.0);
        assert!(set.lf_early.is_none());
        assert!(set.lf_late.is_none());
        assert!(set.value(Parameter::DrRatio).is_some());
        assert!(set.failures().is_empty());
    }

    #[test]
    fn test_degenerate_dr_does_not_hide_lateral_fractions() {
        // Impulse followed by silence on W, lateral energy only inside the
        // first 2 ms so the DR reverberant window is empty.
        let w = impulse(4800, 1000);
        let mut y = vec![0.0; 4800];
        y[1000] = 0.5;
        let zeros = vec![0.0; 4800];
        let b = BFormat::from_channels(w, zeros.clone(), y, zeros).unwrap();

        let set = analyze_b_format(&b, 48000, DrIntegrationLimit::default()).unwrap();
        assert!(set.value(Parameter::DrRatio).is_none());
        assert_eq!(set.value(Parameter::LfEarly), Some(f64::NEG_INFINITY));
        assert!(set.value(Parameter::LfLate).is_some());

        let failures = set.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, Parameter::DrRatio);
    }

    #[test]
    fn test_missing_peak_fails_recording() {
        let silent = vec![0.0; 1024];
        let err = analyze_omni(&silent, 48000, DrIntegrationLimit::default()).unwrap_err();
        assert_eq!(err, AnalysisError::NoPeakFound { len: 1024 });
    }

    #[test]
    fn test_processing_type_labels() {
        assert_eq!(ProcessingType::Omni.to_string(), "omni");
        assert_eq!(
            serde_json::to_string(&ProcessingType::Ambi).unwrap(),
            "\"ambi\""
        );
    }
}
