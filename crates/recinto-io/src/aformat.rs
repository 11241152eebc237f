//! Loading recordings from disk.

use crate::wav::read_wav;
use crate::{Error, Result};
use recinto_analysis::{AFormatCapture, Capsule};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where the four capsule signals of an A-format capture live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AFormatSource {
    /// One four-channel file with capsules in canonical order.
    SingleFile(PathBuf),
    /// Four mono files in canonical order (FLU, FRD, BLD, BRU).
    Ordered([PathBuf; 4]),
    /// Four mono files keyed by capsule.
    Named(BTreeMap<Capsule, PathBuf>),
}

impl AFormatSource {
    /// Build a [`AFormatSource::Named`] from capsule names such as
    /// `front_left_up`.
    ///
    /// Fails with [`Error::InputShape`] on an unknown name.
    pub fn from_names<I, S, P>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, P)>,
        S: AsRef<str>,
        P: Into<PathBuf>,
    {
        let mut map = BTreeMap::new();
        for (name, path) in entries {
            let capsule: Capsule = name
                .as_ref()
                .parse()
                .map_err(|e: recinto_analysis::AnalysisError| Error::InputShape(e.to_string()))?;
            map.insert(capsule, path.into());
        }
        Ok(AFormatSource::Named(map))
    }

    /// Files making up the source, in canonical capsule order when known.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            AFormatSource::SingleFile(path) => vec![path.as_path()],
            AFormatSource::Ordered(paths) => paths.iter().map(PathBuf::as_path).collect(),
            AFormatSource::Named(map) => map.values().map(PathBuf::as_path).collect(),
        }
    }

    fn ordered_paths(&self) -> Result<[&Path; 4]> {
        match self {
            AFormatSource::SingleFile(path) => Err(Error::InputShape(format!(
                "'{}' is a single four-channel file, not per-capsule files",
                path.display()
            ))),
            AFormatSource::Ordered([a, b, c, d]) => Ok([a, b, c, d].map(PathBuf::as_path)),
            AFormatSource::Named(map) => {
                let missing: Vec<&str> = Capsule::ORDER
                    .iter()
                    .filter(|c| !map.contains_key(c))
                    .map(|c| c.name())
                    .collect();
                if !missing.is_empty() {
                    return Err(Error::InputShape(format!(
                        "A-format capture is missing capsules: {}",
                        missing.join(", ")
                    )));
                }
                Ok(Capsule::ORDER.map(|c| map[&c].as_path()))
            }
        }
    }
}

/// Load an A-format capture.
///
/// All files must share one sample rate and length. Single-file sources
/// must hold exactly four channels; per-capsule files must be mono.
pub fn read_aformat(source: &AFormatSource) -> Result<AFormatCapture> {
    let (channels, sample_rate) = match source {
        AFormatSource::SingleFile(path) => read_four_channel_file(path)?,
        AFormatSource::Ordered(_) | AFormatSource::Named(_) => {
            read_capsule_files(source.ordered_paths()?)?
        }
    };

    AFormatCapture::new(channels, sample_rate).map_err(|e| Error::InputShape(e.to_string()))
}

fn read_four_channel_file(path: &Path) -> Result<([Vec<f64>; 4], u32)> {
    let audio = read_wav(path)?;
    let sample_rate = audio.spec.sample_rate;
    let found = audio.num_channels();
    let frames = audio.num_frames();
    let channels: [Vec<f64>; 4] = audio.channels.try_into().map_err(|_| {
        Error::InputShape(format!(
            "'{}' has {found} channels, A-format needs 4",
            path.display()
        ))
    })?;
    tracing::info!(path = %path.display(), sample_rate, frames, "read A-format file");
    Ok((channels, sample_rate))
}

fn read_capsule_files(paths: [&Path; 4]) -> Result<([Vec<f64>; 4], u32)> {
    let mut sample_rate = None;
    let mut channels: [Vec<f64>; 4] = Default::default();

    for (slot, (path, capsule)) in channels.iter_mut().zip(paths.into_iter().zip(Capsule::ORDER)) {
        let (samples, rate) = read_omni(path)?;
        match sample_rate {
            None => sample_rate = Some(rate),
            Some(expected) if expected != rate => {
                return Err(Error::SampleRateMismatch {
                    expected,
                    found: rate,
                    path: path.to_path_buf(),
                });
            }
            Some(_) => {}
        }
        tracing::debug!(%capsule, path = %path.display(), "read capsule");
        *slot = samples;
    }

    let sample_rate = sample_rate.unwrap_or_default();
    tracing::info!(files = paths.len(), sample_rate, "read A-format capsules");
    Ok((channels, sample_rate))
}

/// Load a mono omnidirectional response and its sample rate.
pub fn read_omni(path: impl AsRef<Path>) -> Result<(Vec<f64>, u32)> {
    let path = path.as_ref();
    let audio = read_wav(path)?;
    let sample_rate = audio.spec.sample_rate;
    let samples = audio
        .into_mono()
        .map_err(|e| Error::InputShape(format!("'{}': {e}", path.display())))?;
    Ok((samples, sample_rate))
}
