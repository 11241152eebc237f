//! Finding recordings in a measurement directory tree.
//!
//! Each directory that directly contains WAV files is one measurement.
//! Omnidirectional recordings are single files whose name contains the
//! omni marker. Tetrahedral recordings are four files named
//! `<mic type> <capsule 1-4>-<position>[suffix].wav`, grouped per directory
//! and position.

use recinto_analysis::Capsule;
use recinto_io::AFormatSource;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// How a recording's audio is laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingSource {
    /// One mono omnidirectional file.
    Omni(PathBuf),
    /// Tetrahedral capsule files.
    Ambi(AFormatSource),
}

/// One unit of batch work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    /// Measurement the recording belongs to.
    pub measurement: String,
    /// Microphone position, when the file name carries one.
    pub position: Option<String>,
    /// Audio location.
    pub source: RecordingSource,
    /// File names making up the recording, sorted.
    pub files: Vec<String>,
}

impl Recording {
    /// Human-readable identifier used in logs and failure reports.
    pub fn id(&self) -> String {
        format!("{}/{}", self.measurement, self.files.join(","))
    }

    /// Full paths of the recording's files, capsules in canonical order.
    pub fn file_paths(&self) -> Vec<&Path> {
        match &self.source {
            RecordingSource::Omni(path) => vec![path.as_path()],
            RecordingSource::Ambi(source) => source.paths(),
        }
    }
}

/// Filename patterns used to classify recordings.
pub struct Classifier {
    omni_marker: String,
    omni_position: Regex,
    ambisonic_marker: String,
    capsule_file: Regex,
    measurement: Regex,
}

impl Classifier {
    /// Build a classifier for the given microphone markers.
    pub fn new(omni_marker: &str, ambisonic_marker: &str) -> anyhow::Result<Self> {
        Ok(Self {
            omni_marker: omni_marker.to_string(),
            omni_position: Regex::new(&format!(r"^{}\s([0-9]+)-", regex::escape(omni_marker)))?,
            ambisonic_marker: ambisonic_marker.to_lowercase(),
            capsule_file: Regex::new(
                r"^(?P<mic_type>[a-zA-Z]+)\s(?P<capsule>[1-4])-(?P<position>[0-9]{1,2})[a-zA-Z0-9_-]*\.(?i:wav)$",
            )?,
            measurement: Regex::new(r".*medicion([0-9]+)")?,
        })
    }

    /// Measurement id of a directory: the digits after `medicion`, or the
    /// directory name.
    pub fn measurement_id(&self, directory: &Path) -> String {
        let text = directory.to_string_lossy();
        if let Some(caps) = self.measurement.captures(&text) {
            return caps[1].to_string();
        }
        let fallback = directory
            .file_name()
            .map_or_else(|| text.to_string(), |n| n.to_string_lossy().into_owned());
        tracing::warn!(directory = %text, measurement = %fallback, "no measurement number in directory name");
        fallback
    }

    /// Position id of an omnidirectional file, if its name carries one.
    pub fn omni_position(&self, file_name: &str) -> Option<String> {
        self.omni_position
            .captures(file_name)
            .map(|caps| caps[1].to_string())
    }

    /// Classify the files of one directory into recordings.
    pub fn classify(&self, directory: &Path, file_names: &[String]) -> Vec<Recording> {
        let measurement = self.measurement_id(directory);
        let mut recordings = Vec::new();
        let mut groups: BTreeMap<String, BTreeMap<Capsule, String>> = BTreeMap::new();

        for name in file_names {
            if let Some(caps) = self.capsule_file.captures(name)
                && caps["mic_type"].to_lowercase() == self.ambisonic_marker
            {
                let number: u8 = caps["capsule"].parse().unwrap_or(0);
                if let Some(capsule) = Capsule::from_number(number) {
                    let group = groups.entry(caps["position"].to_string()).or_default();
                    if let Some(previous) = group.insert(capsule, name.clone()) {
                        tracing::warn!(%capsule, kept = %name, dropped = %previous, "duplicate capsule file");
                    }
                }
                continue;
            }

            if name.contains(&self.omni_marker) && is_wav(name) {
                recordings.push(Recording {
                    measurement: measurement.clone(),
                    position: self.omni_position(name),
                    source: RecordingSource::Omni(directory.join(name)),
                    files: vec![name.clone()],
                });
            }
        }

        for (position, capsules) in groups {
            let mut files: Vec<String> = capsules.values().cloned().collect();
            files.sort();
            let map = capsules
                .into_iter()
                .map(|(capsule, name)| (capsule, directory.join(name)))
                .collect();
            recordings.push(Recording {
                measurement: measurement.clone(),
                position: Some(position),
                source: RecordingSource::Ambi(AFormatSource::Named(map)),
                files,
            });
        }

        recordings
    }
}

fn is_wav(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Walk `root` recursively and classify the files of every directory.
///
/// Directories are visited in sorted order so runs are reproducible.
pub fn discover(root: &Path, classifier: &Classifier) -> std::io::Result<Vec<Recording>> {
    let mut recordings = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(directory) = pending.pop() {
        let mut subdirs = Vec::new();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&directory)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                subdirs.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        subdirs.sort();

        if !files.is_empty() {
            let found = classifier.classify(&directory, &files);
            tracing::debug!(directory = %directory.display(), recordings = found.len(), "scanned");
            recordings.extend(found);
        }
        // Reverse so the stack pops in ascending order
        pending.extend(subdirs.into_iter().rev());
    }

    Ok(recordings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new("Earthworks", "soundfield").unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_measurement_id_from_directory() {
        let c = classifier();
        assert_eq!(c.measurement_id(Path::new("/data/medicion12")), "12");
        assert_eq!(c.measurement_id(Path::new("/data/medicion3/extra")), "3");
        assert_eq!(c.measurement_id(Path::new("/data/hall")), "hall");
    }

    #[test]
    fn test_omni_position() {
        let c = classifier();
        assert_eq!(c.omni_position("Earthworks 3-take_1.wav").as_deref(), Some("3"));
        assert_eq!(c.omni_position("Earthworks 12-a.wav").as_deref(), Some("12"));
        assert_eq!(c.omni_position("Earthworks.wav"), None);
    }

    #[test]
    fn test_classify_groups_capsules_by_position() {
        let c = classifier();
        let files = names(&[
            "Soundfield 1-1.wav",
            "Soundfield 2-1.wav",
            "Soundfield 3-1.wav",
            "Soundfield 4-1.wav",
            "Soundfield 1-2_350ms.wav",
            "Earthworks 1-a.wav",
            "notes.txt",
            "Other 1-1.wav",
        ]);
        let recordings = c.classify(Path::new("/m/medicion1"), &files);
        assert_eq!(recordings.len(), 3);

        let omni = &recordings[0];
        assert_eq!(omni.measurement, "1");
        assert_eq!(omni.position.as_deref(), Some("1"));
        assert!(matches!(omni.source, RecordingSource::Omni(_)));

        let full = &recordings[1];
        assert_eq!(full.position.as_deref(), Some("1"));
        let RecordingSource::Ambi(AFormatSource::Named(map)) = &full.source else {
            panic!("expected named A-format source");
        };
        assert_eq!(map.len(), 4);
        assert_eq!(
            map[&Capsule::BackLeftDown],
            PathBuf::from("/m/medicion1/Soundfield 3-1.wav")
        );

        assert_eq!(
            full.file_paths(),
            vec![
                Path::new("/m/medicion1/Soundfield 1-1.wav"),
                Path::new("/m/medicion1/Soundfield 2-1.wav"),
                Path::new("/m/medicion1/Soundfield 3-1.wav"),
                Path::new("/m/medicion1/Soundfield 4-1.wav"),
            ]
        );
        assert_eq!(
            omni.file_paths(),
            vec![Path::new("/m/medicion1/Earthworks 1-a.wav")]
        );

        // Incomplete groups are kept and fail at load time
        let partial = &recordings[2];
        assert_eq!(partial.files, vec!["Soundfield 1-2_350ms.wav".to_string()]);
    }

    #[test]
    fn test_non_wav_marker_files_ignored() {
        let c = classifier();
        let files = names(&["Earthworks 1-a.txt", "Earthworks 1-a.WAV"]);
        let recordings = c.classify(Path::new("/m"), &files);
        assert_eq!(recordings.len(), 1);
        assert_eq!(recordings[0].files, vec!["Earthworks 1-a.WAV".to_string()]);
    }

    #[test]
    fn test_recording_id() {
        let c = classifier();
        let files = names(&["Earthworks 2-x.wav"]);
        let recordings = c.classify(Path::new("/m/medicion7"), &files);
        assert_eq!(recordings[0].id(), "7/Earthworks 2-x.wav");
    }

    #[test]
    fn test_discover_walks_sorted() {
        let dir = tempfile::TempDir::new().unwrap();
        for sub in ["medicion2", "medicion1"] {
            let path = dir.path().join(sub);
            std::fs::create_dir(&path).unwrap();
            std::fs::write(path.join("Earthworks 1-a.wav"), b"").unwrap();
        }
        let recordings = discover(dir.path(), &classifier()).unwrap();
        let measurements: Vec<&str> = recordings.iter().map(|r| r.measurement.as_str()).collect();
        assert_eq!(measurements, vec!["1", "2"]);
    }
}
