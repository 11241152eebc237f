//! CLI command implementations.

pub mod batch;
pub mod common;
pub mod extract;
pub mod generate;
pub mod info;
pub mod split;
pub mod summarize;
