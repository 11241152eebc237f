//! Split a results table into one file per measurement.

use crate::report::{self, ResultRow};
use anyhow::Context;
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args)]
pub struct SplitArgs {
    /// Results table written by `recinto batch`
    pub results: PathBuf,

    /// Directory for the per-measurement files (default: next to RESULTS)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Group rows by measurement id, keeping their order within each group.
pub fn by_measurement(rows: Vec<ResultRow>) -> BTreeMap<String, Vec<ResultRow>> {
    let mut groups: BTreeMap<String, Vec<ResultRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.measurement.clone()).or_default().push(row);
    }
    groups
}

/// File name of one measurement's table.
pub fn measurement_file_name(measurement: &str) -> String {
    format!("results_measurement{measurement}.tsv")
}

pub fn run(args: SplitArgs) -> anyhow::Result<()> {
    let rows = report::read_tsv(&args.results)?;
    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => args
            .results
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default(),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let groups = by_measurement(rows);
    if groups.is_empty() {
        println!("No rows in {}", args.results.display());
        return Ok(());
    }

    for (measurement, rows) in &groups {
        let path = output_dir.join(measurement_file_name(measurement));
        std::fs::write(&path, report::to_tsv(rows))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote {} rows to {}", rows.len(), path.display());
    }

    Ok(())
}
