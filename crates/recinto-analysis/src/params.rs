//! Energy-ratio room-acoustics parameters.
//!
//! Every parameter follows the same shape: trim the response at the
//! direct-sound arrival, integrate squared amplitude over two windows
//! measured from that point, and express the ratio in decibels.
//!
//! | Parameter | Numerator | Denominator |
//! |-----------|-----------|-------------|
//! | LF_early  | Y², 5-80 ms | W², 0-80 ms |
//! | LF_late   | Y², 80 ms-end | W², 0-end |
//! | DR        | omni², 0-2 ms | omni², 2 ms-limit |

use crate::ambisonics::BFormat;
use crate::arrival::direct_sound_arrival;
use crate::error::{AnalysisError, Parameter, Result};
use crate::units::{ms_to_samples, seconds_to_samples};

/// End of the direct-sound window for DR.
pub const DIRECT_WINDOW_MS: f64 = 2.0;

/// Start of the lateral window for LF_early.
pub const LATERAL_ONSET_MS: f64 = 5.0;

/// Boundary between early and late energy.
pub const EARLY_LIMIT_MS: f64 = 80.0;

/// Default upper bound of the DR reverberant window.
pub const DEFAULT_DR_LIMIT_SECONDS: f64 = 2.0;

/// Absolute tolerance under which an energy or ratio counts as zero.
pub const ENERGY_TOLERANCE: f64 = 1e-7;

/// Upper bound of the reverberant integration window used by DR.
///
/// The bound is measured from the direct-sound arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrIntegrationLimit {
    /// Integrate up to this many seconds after the arrival, or to the end
    /// of the signal if it is shorter.
    Seconds(f64),
    /// Integrate to the end of the signal.
    Unbounded,
}

impl Default for DrIntegrationLimit {
    fn default() -> Self {
        DrIntegrationLimit::Seconds(DEFAULT_DR_LIMIT_SECONDS)
    }
}

impl DrIntegrationLimit {
    fn end_sample(self, sample_rate: u32) -> Option<usize> {
        match self {
            DrIntegrationLimit::Seconds(seconds) => Some(seconds_to_samples(seconds, sample_rate)),
            DrIntegrationLimit::Unbounded => None,
        }
    }
}

/// Sum of squared samples in `signal[start..end]`.
///
/// Bounds past the end of the signal are clamped, so windows that fall
/// entirely outside yield zero energy. `end = None` means to the end.
pub fn window_energy(signal: &[f64], start: usize, end: Option<usize>) -> f64 {
    let end = end.map_or(signal.len(), |e| e.min(signal.len()));
    let start = start.min(end);
    signal[start..end].iter().map(|&x| x * x).sum()
}

/// LF_early of a B-format response, in dB.
pub fn lateral_fraction_early(rir: &BFormat, sample_rate: u32) -> Result<f64> {
    let arrival = direct_sound_arrival(rir.w(), sample_rate)?;
    lateral_fraction_early_at(rir, sample_rate, arrival)
}

/// LF_late of a B-format response, in dB.
pub fn lateral_fraction_late(rir: &BFormat, sample_rate: u32) -> Result<f64> {
    let arrival = direct_sound_arrival(rir.w(), sample_rate)?;
    lateral_fraction_late_at(rir, sample_rate, arrival)
}

/// DR of an omnidirectional response, in dB.
pub fn direct_reverberant_ratio(
    rir: &[f64],
    sample_rate: u32,
    limit: DrIntegrationLimit,
) -> Result<f64> {
    let arrival = direct_sound_arrival(rir, sample_rate)?;
    direct_reverberant_ratio_at(rir, sample_rate, limit, arrival)
}

pub(crate) fn lateral_fraction_early_at(
    rir: &BFormat,
    sample_rate: u32,
    arrival: usize,
) -> Result<f64> {
    let w = &rir.w()[arrival..];
    let y = &rir.y()[arrival..];
    let onset = ms_to_samples(LATERAL_ONSET_MS, sample_rate);
    let early = ms_to_samples(EARLY_LIMIT_MS, sample_rate);

    let lateral = window_energy(y, onset, Some(early));
    let omni = window_energy(w, 0, Some(early));
    ratio_db(Parameter::LfEarly, lateral, omni)
}

pub(crate) fn lateral_fraction_late_at(
    rir: &BFormat,
    sample_rate: u32,
    arrival: usize,
) -> Result<f64> {
    let w = &rir.w()[arrival..];
    let y = &rir.y()[arrival..];
    let early = ms_to_samples(EARLY_LIMIT_MS, sample_rate);

    let lateral = window_energy(y, early, None);
    let omni = window_energy(w, 0, None);
    ratio_db(Parameter::LfLate, lateral, omni)
}

pub(crate) fn direct_reverberant_ratio_at(
    rir: &[f64],
    sample_rate: u32,
    limit: DrIntegrationLimit,
    arrival: usize,
) -> Result<f64> {
    let signal = &rir[arrival..];
    let direct_end = ms_to_samples(DIRECT_WINDOW_MS, sample_rate);

    let direct = window_energy(signal, 0, Some(direct_end));
    let reverberant = window_energy(signal, direct_end, limit.end_sample(sample_rate));
    ratio_db(Parameter::DrRatio, direct, reverberant)
}

/// `10 log10(numerator / denominator)` with the zero guards shared by all
/// parameters.
///
/// A zero denominator is an error; a zero ratio is negative infinity.
fn ratio_db(parameter: Parameter, numerator: f64, denominator: f64) -> Result<f64> {
    tracing::debug!(%parameter, numerator, denominator, "integrated energy");

    if denominator.abs() <= ENERGY_TOLERANCE {
        return Err(AnalysisError::Degenerate {
            parameter,
            numerator,
            denominator,
        });
    }

    let ratio = numerator / denominator;
    if ratio.abs() <= ENERGY_TOLERANCE {
        if parameter == Parameter::DrRatio {
            tracing::warn!(
                ratio,
                direct = numerator,
                reverberant = denominator,
                "DR ratio is close to 0.0, reporting -inf dB"
            );
        }
        return Ok(f64::NEG_INFINITY);
    }

    Ok(10.0 * ratio.log10())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 48000;

    /// Impulse at `at` followed by a constant tail of `tail` amplitude.
    fn impulse_with_tail(len: usize, at: usize, tail: f64) -> Vec<f64> {
        let mut s = vec![0.0; len];
        s[at] = 1.0;
        for v in s.iter_mut().skip(at + 1) {
            *v = tail;
        }
        s
    }

    #[test]
    fn test_window_energy_clamps() {
        let s = [1.0, 2.0, 3.0];
        assert_eq!(window_energy(&s, 0, None), 14.0);
        assert_eq!(window_energy(&s, 1, Some(2)), 4.0);
        assert_eq!(window_energy(&s, 1, Some(100)), 13.0);
        assert_eq!(window_energy(&s, 5, Some(10)), 0.0);
        assert_eq!(window_energy(&s, 2, Some(1)), 0.0);
    }

    #[test]
    fn test_ratio_db_values() {
        assert!((ratio_db(Parameter::LfEarly, 1.0, 10.0).unwrap() + 10.0).abs() < 1e-12);
        assert_eq!(ratio_db(Parameter::LfLate, 0.0, 1.0).unwrap(), f64::NEG_INFINITY);
        assert!(matches!(
            ratio_db(Parameter::DrRatio, 1.0, 0.0),
            Err(AnalysisError::Degenerate {
                parameter: Parameter::DrRatio,
                ..
            })
        ));
    }

    #[test]
    fn test_dr_known_ratio() {
        // Peak at 1000, arrival at 952. Direct window [952, 1048) holds the
        // impulse plus 47 tail samples.
        let tail = 0.01;
        let s = impulse_with_tail(48000, 1000, tail);
        let dr = direct_reverberant_ratio(&s, SR, DrIntegrationLimit::Unbounded).unwrap();

        let direct = 1.0 + 47.0 * tail * tail;
        let reverberant = (48000 - 1048) as f64 * tail * tail;
        let expected = 10.0 * (direct / reverberant).log10();
        assert!((dr - expected).abs() < 1e-9, "dr={dr}, expected={expected}");
    }

    #[test]
    fn test_dr_limit_shortens_reverberant_window() {
        let s = impulse_with_tail(4 * 48000, 1000, 0.01);
        let bounded = direct_reverberant_ratio(&s, SR, DrIntegrationLimit::default()).unwrap();
        let unbounded = direct_reverberant_ratio(&s, SR, DrIntegrationLimit::Unbounded).unwrap();
        // Less reverberant energy means a larger ratio
        assert!(bounded > unbounded);
    }

    #[test]
    fn test_dr_limit_inside_direct_window_is_degenerate() {
        let s = impulse_with_tail(48000, 1000, 0.01);
        let err = direct_reverberant_ratio(&s, SR, DrIntegrationLimit::Seconds(0.001)).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Degenerate {
                parameter: Parameter::DrRatio,
                ..
            }
        ));
    }

    #[test]
    fn test_dr_impulse_at_start_is_degenerate() {
        let mut s = vec![0.0; 4800];
        s[0] = 1.0;
        let err = direct_reverberant_ratio(&s, SR, DrIntegrationLimit::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Degenerate {
                parameter: Parameter::DrRatio,
                ..
            }
        ));
    }

    /// Writer sharing one buffer between the test and the subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_dr_negligible_direct_energy_is_neg_inf_and_warns() {
        // Faint peak at 1000, strong tail from 1100: direct/reverberant ~ 1e-14
        let mut s = vec![0.0; 48000];
        s[1000] = 1e-5;
        for v in s.iter_mut().skip(1100) {
            *v = 0.5;
        }

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let dr = tracing::subscriber::with_default(subscriber, || {
            direct_reverberant_ratio(&s, SR, DrIntegrationLimit::default())
        });
        assert_eq!(dr, Ok(f64::NEG_INFINITY));

        let output = logs.contents();
        assert!(output.contains("DR ratio is close to 0.0"), "logs: {output}");
        assert!(output.contains("direct="), "logs: {output}");
        assert!(output.contains("reverberant="), "logs: {output}");
        assert!(output.contains("ratio="), "logs: {output}");
    }

    #[test]
    fn test_lf_early_known_ratio() {
        // W = impulse at 1000 with constant tail, Y = half of W
        let w = impulse_with_tail(48000, 1000, 0.1);
        let y: Vec<f64> = w.iter().map(|v| v * 0.5).collect();
        let zeros = vec![0.0; w.len()];
        let b = BFormat::from_channels(w, zeros.clone(), y, zeros).unwrap();

        let lf = lateral_fraction_early(&b, SR).unwrap();
        // Arrival 952: omni window [952, 4792) covers impulse + 3791 tail samples,
        // lateral window [1192, 4792) is 3600 tail samples.
        let omni: f64 = 1.0 + 3791.0 * 0.01;
        let lateral: f64 = 0.25 * 3600.0 * 0.01;
        let expected = 10.0 * (lateral / omni).log10();
        assert!((lf - expected).abs() < 1e-9, "lf={lf}, expected={expected}");
    }

    #[test]
    fn test_lf_late_known_ratio() {
        let w = impulse_with_tail(48000, 1000, 0.1);
        let y: Vec<f64> = w.iter().map(|v| v * 0.5).collect();
        let zeros = vec![0.0; w.len()];
        let b = BFormat::from_channels(w, zeros.clone(), y, zeros).unwrap();

        let lf = lateral_fraction_late(&b, SR).unwrap();
        // Trimmed length 47048; lateral from sample 3840 on is all tail.
        let omni: f64 = 1.0 + (47048.0 - 48.0 - 1.0) * 0.01;
        let lateral: f64 = 0.25 * (47048.0 - 3840.0) * 0.01;
        let expected = 10.0 * (lateral / omni).log10();
        assert!((lf - expected).abs() < 1e-9, "lf={lf}, expected={expected}");
    }

    #[test]
    fn test_lf_without_lateral_energy_is_neg_inf() {
        let w = impulse_with_tail(48000, 1000, 0.1);
        let zeros = vec![0.0; w.len()];
        let b = BFormat::from_channels(w, zeros.clone(), zeros.clone(), zeros).unwrap();
        assert_eq!(lateral_fraction_early(&b, SR).unwrap(), f64::NEG_INFINITY);
        assert_eq!(lateral_fraction_late(&b, SR).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_lf_propagates_no_peak() {
        let zeros = vec![0.0; 1000];
        let b =
            BFormat::from_channels(zeros.clone(), zeros.clone(), zeros.clone(), zeros).unwrap();
        assert!(matches!(
            lateral_fraction_early(&b, SR),
            Err(AnalysisError::NoPeakFound { .. })
        ));
    }
}
