//! Recinto Analysis - room-acoustics parameters from impulse responses
//!
//! This crate holds the numeric core of recinto:
//!
//! - [`units`] - Seconds / milliseconds / sample-count conversions
//! - [`ambisonics`] - Tetrahedral A-format to B-format (W, X, Y, Z) conversion
//! - [`arrival`] - Peak detection and direct-sound arrival
//! - [`params`] - LF_early, LF_late and DR by windowed energy integration
//! - [`record`] - Per-recording parameter sets with per-parameter failures
//! - [`synth`] - Deterministic synthetic captures for tests and demos
//!
//! All functions are pure: the same arrays and sample rate always produce
//! bit-identical results.
//!
//! ## Example
//!
//! ```rust,ignore
//! use recinto_analysis::{AFormatCapture, DrIntegrationLimit, analyze_a_format};
//!
//! let capture = AFormatCapture::new([flu, frd, bld, bru], 48000)?;
//! let params = analyze_a_format(&capture, DrIntegrationLimit::default())?;
//! println!("Arrival: {:.2} ms", params.direct_sound_arrival_ms);
//! ```

pub mod ambisonics;
pub mod arrival;
pub mod error;
pub mod params;
pub mod record;
pub mod synth;
pub mod units;

pub use ambisonics::{AFormatCapture, BChannel, BFormat, Capsule, convert_a_to_b, convert_a_to_b_channels};
pub use arrival::{ARRIVAL_BACKOFF_MS, direct_sound_arrival, direct_sound_arrival_ms, find_peaks};
pub use error::{AnalysisError, Parameter, Result};
pub use params::{
    DEFAULT_DR_LIMIT_SECONDS, DrIntegrationLimit, ENERGY_TOLERANCE, direct_reverberant_ratio,
    lateral_fraction_early, lateral_fraction_late, window_energy,
};
pub use record::{
    ParameterOutcome, ParameterSet, ProcessingType, analyze_a_format, analyze_b_format,
    analyze_omni,
};
pub use units::{ms_to_samples, samples_to_ms, seconds_to_samples};
