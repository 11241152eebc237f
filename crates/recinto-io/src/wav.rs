//! WAV file reading and writing.
//!
//! Samples are decoded to `f32` by hound, normalized to [-1, 1) for integer
//! formats, and widened to `f64` for analysis.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let path = path.as_ref();
    let reader = WavReader::open(path).map_err(|e| Error::file_read(path, e))?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len()); // total across all channels
    let num_frames = total_samples / u64::from(spec.channels);
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32; 32 is written as float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Deinterleaved multichannel audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Multichannel {
    /// One sample vector per channel, all of equal length.
    pub channels: Vec<Vec<f64>>,
    /// Format of the source file.
    pub spec: WavSpec,
}

impl Multichannel {
    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn num_frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Take the single channel of a mono file.
    pub fn into_mono(mut self) -> Result<Vec<f64>> {
        if self.channels.len() != 1 {
            return Err(Error::InputShape(format!(
                "expected a mono file, found {} channels",
                self.channels.len()
            )));
        }
        Ok(self.channels.swap_remove(0))
    }
}

/// Read a WAV file and return its channels deinterleaved.
///
/// Open and decode failures are reported as [`Error::FileRead`] carrying
/// the offending path.
///
/// # Example
/// ```ignore
/// let audio = read_wav("soundfield.wav")?;
/// println!("{} channels at {} Hz", audio.num_channels(), audio.spec.sample_rate);
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<Multichannel> {
    let path = path.as_ref();
    let reader = WavReader::open(path).map_err(|e| Error::file_read(path, e))?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels);
    if channels == 0 {
        return Err(Error::InputShape(format!(
            "'{}' declares zero channels",
            path.display()
        )));
    }

    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::file_read(path, e))?,
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            let max_val = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::file_read(path, e))?
        }
    };

    let frames = samples.len() / channels;
    let mut deinterleaved = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, &sample) in deinterleaved.iter_mut().zip(frame) {
            channel.push(f64::from(sample));
        }
    }

    tracing::debug!(
        path = %path.display(),
        channels,
        frames,
        sample_rate = spec.sample_rate,
        "read wav"
    );

    Ok(Multichannel {
        channels: deinterleaved,
        spec,
    })
}

/// Write mono samples to a WAV file. `spec.channels` is forced to 1.
///
/// # Example
/// ```ignore
/// let rir = vec![0.0f64; 48000];
/// write_wav("omni.wav", &rir, WavSpec::default())?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f64], spec: WavSpec) -> Result<()> {
    write_wav_multichannel(path, &[samples], WavSpec { channels: 1, ..spec })
}

/// Write equal-length channels to one interleaved WAV file.
///
/// `spec.channels` is taken from `channels.len()`.
pub fn write_wav_multichannel<P: AsRef<Path>, C: AsRef<[f64]>>(
    path: P,
    channels: &[C],
    spec: WavSpec,
) -> Result<()> {
    let frames = channels.first().map_or(0, |c| c.as_ref().len());
    if channels.is_empty() || channels.iter().any(|c| c.as_ref().len() != frames) {
        return Err(Error::InputShape(
            "channels must be non-empty and of equal length".to_string(),
        ));
    }

    let spec = WavSpec {
        channels: channels.len() as u16,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for i in 0..frames {
            for channel in channels {
                writer.write_sample(channel.as_ref()[i] as f32)?;
            }
        }
    } else {
        let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
        for i in 0..frames {
            for channel in channels {
                let sample = channel.as_ref()[i];
                let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
