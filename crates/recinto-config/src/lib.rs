//! Configuration for recinto batch extraction.
//!
//! The only analysis tunable is the upper bound of the DR reverberant
//! window; the 2, 5 and 80 ms windows are fixed constants of
//! [`recinto_analysis::params`]. Everything else configures the batch
//! runner: worker count, per-recording timeout, output format and the
//! filename markers that classify recordings.
//!
//! # Example
//!
//! ```rust,no_run
//! use recinto_config::{BatchConfig, OutputFormat};
//!
//! let config = BatchConfig::load("batch.toml").unwrap();
//! assert!(config.validate().is_ok());
//!
//! let config = BatchConfig {
//!     output_format: OutputFormat::Json,
//!     ..BatchConfig::default()
//! };
//! println!("{}", config.to_toml().unwrap());
//! ```

mod batch;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

pub use batch::{BatchConfig, OutputFormat};
pub use error::ConfigError;
pub use paths::{default_config_path, ensure_user_config_dir, find_config, user_config_dir};
