//! Audio loading layer for recinto.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`], [`read_wav_info`] and the writers used to
//!   produce fixtures and synthetic captures
//! - **A-format loading**: [`AFormatSource`] resolves a single four-channel file,
//!   an ordered list of four capsule files, or a capsule-name map into an
//!   [`AFormatCapture`](recinto_analysis::AFormatCapture)
//! - **Omnidirectional loading**: [`read_omni`]
//!
//! Every file of one recording must share a sample rate; a disagreement is
//! reported as [`Error::SampleRateMismatch`]. Unreadable files fail fast with
//! [`Error::FileRead`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use recinto_io::{AFormatSource, read_aformat};
//!
//! let source = AFormatSource::Ordered([flu, frd, bld, bru]);
//! let capture = read_aformat(&source)?;
//! ```

mod aformat;
mod wav;

pub use aformat::{AFormatSource, read_aformat, read_omni};
pub use wav::{
    Multichannel, WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav,
    write_wav_multichannel,
};

use std::path::PathBuf;

/// Error types for audio loading.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV encoding error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// A file of a recording could not be opened or decoded.
    #[error("failed to read '{path}': {source}")]
    FileRead {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: hound::Error,
    },

    /// Wrong channel count or layout for the requested recording kind.
    #[error("invalid input shape: {0}")]
    InputShape(String),

    /// Files grouped into one recording disagree on sample rate.
    #[error("sample rate mismatch: expected {expected} Hz, '{path}' has {found} Hz")]
    SampleRateMismatch {
        /// Sample rate of the first file of the recording.
        expected: u32,
        /// Sample rate of the offending file.
        found: u32,
        /// Offending file.
        path: PathBuf,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: hound::Error) -> Self {
        Error::FileRead {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for audio loading.
pub type Result<T> = std::result::Result<T, Error>;
