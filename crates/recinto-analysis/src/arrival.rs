//! Direct-sound arrival detection.
//!
//! The arrival is the first local maximum of the signal moved back by
//! [`ARRIVAL_BACKOFF_MS`] so the trimmed response keeps the rising edge of
//! the direct wavefront.
//!
//! A response whose only maximum is its very first sample (an impulse at
//! sample 0 followed by decay or silence) has no interior peak. In that case
//! the first sample is taken as the peak when it is strictly greater than
//! the second.

use crate::error::{AnalysisError, Result};
use crate::units::{ms_to_samples, samples_to_ms};

/// Distance in milliseconds between the detected peak and the reported arrival.
pub const ARRIVAL_BACKOFF_MS: f64 = 1.0;

/// Find the indices of all local maxima in `signal`, in ascending order.
///
/// A sample is a peak when it is strictly greater than both neighbours.
/// A flat-topped maximum counts once, at the middle of the plateau
/// (rounded down). The first and last samples are never peaks.
pub fn find_peaks(signal: &[f64]) -> Vec<usize> {
    Peaks::new(signal).collect()
}

/// Lazy scan over the local maxima of a signal.
struct Peaks<'a> {
    signal: &'a [f64],
    i: usize,
}

impl<'a> Peaks<'a> {
    fn new(signal: &'a [f64]) -> Self {
        Self { signal, i: 1 }
    }
}

impl Iterator for Peaks<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let x = self.signal;
        let last = x.len().checked_sub(1)?;
        while self.i < last {
            let i = self.i;
            self.i += 1;
            if x[i - 1] < x[i] {
                // Walk to the end of a possible plateau
                let mut ahead = i + 1;
                while ahead < last && x[ahead] == x[i] {
                    ahead += 1;
                }
                if x[ahead] < x[i] {
                    self.i = ahead + 1;
                    return Some((i + ahead - 1) / 2);
                }
            }
        }
        None
    }
}

/// Sample index of the direct-sound arrival in `rir`.
///
/// Returns the first peak index minus one millisecond of samples, clamped
/// at zero. Fails with [`AnalysisError::NoPeakFound`] for signals without
/// any maximum (silence, rising ramps, empty input).
pub fn direct_sound_arrival(rir: &[f64], sample_rate: u32) -> Result<usize> {
    let first_peak = Peaks::new(rir)
        .next()
        .or_else(|| leading_maximum(rir))
        .ok_or(AnalysisError::NoPeakFound { len: rir.len() })?;
    let arrival = first_peak.saturating_sub(ms_to_samples(ARRIVAL_BACKOFF_MS, sample_rate));
    tracing::debug!(first_peak, arrival, sample_rate, "direct sound arrival");
    Ok(arrival)
}

fn leading_maximum(signal: &[f64]) -> Option<usize> {
    match signal {
        [first, second, ..] if first > second => Some(0),
        _ => None,
    }
}

/// Direct-sound arrival of `rir` in milliseconds.
pub fn direct_sound_arrival_ms(rir: &[f64], sample_rate: u32) -> Result<f64> {
    direct_sound_arrival(rir, sample_rate).map(|index| samples_to_ms(index, sample_rate))
}
