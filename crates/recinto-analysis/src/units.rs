//! Time and sample-count conversions.
//!
//! All window constants used by the extractor are expressed in milliseconds
//! and pass through these functions before indexing. Rounding is
//! round-half-away-from-zero ([`f64::round`]); negative or non-finite
//! products saturate to zero.

/// Number of samples in `seconds` at `sample_rate`, rounded to nearest.
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> usize {
    (seconds * f64::from(sample_rate)).round() as usize
}

/// Milliseconds spanned by `samples` at `sample_rate`.
pub fn samples_to_ms(samples: usize, sample_rate: u32) -> f64 {
    1000.0 * samples as f64 / f64::from(sample_rate)
}

/// Number of samples in `ms` milliseconds at `sample_rate`, rounded to nearest.
pub fn ms_to_samples(ms: f64, sample_rate: u32) -> usize {
    (ms * f64::from(sample_rate) / 1000.0).round() as usize
}
