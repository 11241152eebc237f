//! Batch run configuration file format.

use recinto_analysis::{DEFAULT_DR_LIMIT_SECONDS, DrIntegrationLimit};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Format of the batch results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated values, one row per recording.
    #[default]
    Tsv,
    /// JSON array of records.
    Json,
}

/// Settings for a batch extraction run.
///
/// Missing keys take their default values.
///
/// # TOML Format
///
/// ```toml
/// dr_integration_limit_seconds = 2.0
/// dr_unbounded = false
/// workers = 0
/// timeout_seconds = 60
/// output_format = "tsv"
/// omni_marker = "Earthworks"
/// ambisonic_marker = "soundfield"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Upper bound of the DR reverberant window, in seconds after the arrival.
    pub dr_integration_limit_seconds: f64,

    /// Integrate DR reverberant energy to the end of the signal instead.
    pub dr_unbounded: bool,

    /// Worker threads; 0 picks the available parallelism minus two (at least one).
    pub workers: usize,

    /// Maximum time to wait for one recording before reporting it as timed out.
    pub timeout_seconds: u64,

    /// Results table format.
    pub output_format: OutputFormat,

    /// Substring identifying omnidirectional recordings.
    pub omni_marker: String,

    /// Microphone type identifying tetrahedral capsule recordings.
    pub ambisonic_marker: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            dr_integration_limit_seconds: DEFAULT_DR_LIMIT_SECONDS,
            dr_unbounded: false,
            workers: 0,
            timeout_seconds: 60,
            output_format: OutputFormat::Tsv,
            omni_marker: "Earthworks".to_string(),
            ambisonic_marker: "soundfield".to_string(),
        }
    }
}

impl BatchConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dr_unbounded
            && !(self.dr_integration_limit_seconds.is_finite()
                && self.dr_integration_limit_seconds > 0.0)
        {
            return Err(ConfigError::invalid(
                "dr_integration_limit_seconds",
                format!(
                    "must be a positive number of seconds, got {}",
                    self.dr_integration_limit_seconds
                ),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::invalid("timeout_seconds", "must be positive"));
        }
        if self.omni_marker.is_empty() {
            return Err(ConfigError::invalid("omni_marker", "must not be empty"));
        }
        if self.ambisonic_marker.is_empty() {
            return Err(ConfigError::invalid("ambisonic_marker", "must not be empty"));
        }
        Ok(())
    }

    /// DR reverberant window bound.
    pub fn dr_limit(&self) -> DrIntegrationLimit {
        if self.dr_unbounded {
            DrIntegrationLimit::Unbounded
        } else {
            DrIntegrationLimit::Seconds(self.dr_integration_limit_seconds)
        }
    }

    /// Per-recording timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Number of worker threads to spawn.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(2))
            .unwrap_or(1)
            .max(1)
    }
}
