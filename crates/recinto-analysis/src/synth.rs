//! Synthetic impulse responses for tests, demos and benchmarks.

use crate::ambisonics::AFormatCapture;
use crate::error::Result;

/// Relative capsule gains of the synthetic capture, in canonical order.
pub const CAPSULE_GAINS: [f64; 4] = [1.0, 0.8, 0.6, 0.9];

/// Deterministic xorshift64 noise source.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    state: u64,
}

impl NoiseSource {
    /// Seeded source; a zero seed is remapped since xorshift cannot leave zero.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    /// Next sample, uniform in [-1, 1).
    pub fn next_sample(&mut self) -> f64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    }
}

/// Impulse of `amplitude` at `at`, then noise of `noise_amplitude` after it.
pub fn impulse_with_noise(
    len: usize,
    at: usize,
    amplitude: f64,
    noise_amplitude: f64,
    seed: u64,
) -> Vec<f64> {
    let mut noise = NoiseSource::new(seed);
    let mut signal = vec![0.0; len];
    if at < len {
        signal[at] = amplitude;
        for v in &mut signal[at + 1..] {
            *v = noise.next_sample() * noise_amplitude;
        }
    }
    signal
}

/// Four-capsule capture: a scaled impulse per capsule at `arrival` followed by
/// independent low-level noise.
pub fn synthetic_capture(
    sample_rate: u32,
    seconds: f64,
    arrival: usize,
    noise_amplitude: f64,
) -> Result<AFormatCapture> {
    let len = crate::units::seconds_to_samples(seconds, sample_rate);
    let channels = [0u64, 1, 2, 3].map(|i| {
        impulse_with_noise(
            len,
            arrival,
            CAPSULE_GAINS[i as usize],
            noise_amplitude,
            0xA5A5_0000 + i,
        )
    });
    AFormatCapture::new(channels, sample_rate)
}
