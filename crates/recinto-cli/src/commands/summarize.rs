//! Descriptive statistics over a results table.

use crate::report::{self, ResultRow};
use clap::Args;
use recinto_analysis::{Parameter, ProcessingType};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args)]
pub struct SummarizeArgs {
    /// Results table written by `recinto batch`
    pub results: PathBuf,

    /// Group by the integration time in the file name (10ms, 100ms, 350ms)
    #[arg(long)]
    pub by_integration_time: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

const PARAMETERS: [Parameter; 3] = [Parameter::LfEarly, Parameter::LfLate, Parameter::DrRatio];

/// Statistics of one parameter within one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Processing type shared by every row in the group.
    pub processing_type: ProcessingType,
    /// `<N>ms` tag taken from the file name; `None` when not grouping by it.
    pub integration_time: Option<String>,
    /// Parameter the statistics describe.
    pub parameter: Parameter,
    /// Finite values included in the statistics.
    pub count: usize,
    /// Non-finite values left out.
    pub excluded: usize,
    /// Arithmetic mean of the finite values; `None` when there are none.
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std: Option<f64>,
}

/// Mean and sample standard deviation; `None` when undefined.
pub fn mean_std(values: &[f64]) -> (Option<f64>, Option<f64>) {
    if values.is_empty() {
        return (None, None);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (Some(mean), None);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (Some(mean), Some(var.sqrt()))
}

/// Compute per-group statistics of every parameter.
///
/// Groups are keyed by processing type and, with `by_integration_time`,
/// the `<N>ms` tag in the file name. Parameters that never appear in a group
/// (LF for omni recordings) are skipped.
pub fn summarize(rows: &[ResultRow], by_integration_time: bool) -> anyhow::Result<Vec<SummaryRow>> {
    let time_tag = Regex::new(r"(350|100|10)ms")?;
    let mut groups: BTreeMap<(ProcessingType, Option<String>), Vec<&ResultRow>> = BTreeMap::new();
    for row in rows {
        let time = if by_integration_time {
            time_tag
                .captures(&row.filename)
                .map(|caps| format!("{}ms", &caps[1]))
        } else {
            None
        };
        groups.entry((row.processing_type, time)).or_default().push(row);
    }

    let mut summary = Vec::new();
    for ((processing_type, integration_time), members) in groups {
        for parameter in PARAMETERS {
            let present: Vec<f64> = members.iter().filter_map(|r| r.parameter(parameter)).collect();
            if present.is_empty() {
                continue;
            }
            let finite: Vec<f64> = present.iter().copied().filter(|v| v.is_finite()).collect();
            let (mean, std) = mean_std(&finite);
            summary.push(SummaryRow {
                processing_type,
                integration_time: integration_time.clone(),
                parameter,
                count: finite.len(),
                excluded: present.len() - finite.len(),
                mean,
                std,
            });
        }
    }
    Ok(summary)
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub fn run(args: SummarizeArgs) -> anyhow::Result<()> {
    let rows = report::read_tsv(&args.results)?;
    let summary = summarize(&rows, args.by_integration_time)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{:<6} {:<8} {:<10} {:>5} {:>10} {:>10}",
        "type", "time", "parameter", "n", "mean", "std"
    );
    for s in &summary {
        println!(
            "{:<6} {:<8} {:<10} {:>5} {:>10} {:>10}{}",
            s.processing_type,
            s.integration_time.as_deref().unwrap_or("all"),
            s.parameter.name(),
            s.count,
            fmt_stat(s.mean),
            fmt_stat(s.std),
            if s.excluded > 0 {
                format!("  ({} non-finite excluded)", s.excluded)
            } else {
                String::new()
            }
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: ProcessingType, file: &str, lf: Option<f64>, dr: f64) -> ResultRow {
        ResultRow {
            measurement: "1".to_string(),
            processing_type: kind,
            filename: file.to_string(),
            filepath: String::new(),
            direct_sound_arrival_ms: Some(1.0),
            lf_early: lf,
            lf_late: lf,
            dr_ratio: Some(dr),
        }
    }

    #[test]
    fn test_mean_std() {
        assert_eq!(mean_std(&[]), (None, None));
        assert_eq!(mean_std(&[3.0]), (Some(3.0), None));
        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(mean, Some(5.0));
        // Sample variance 32 / 7
        assert!((std.unwrap() - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_groups_by_processing_type() {
        let rows = vec![
            row(ProcessingType::Omni, "Earthworks 1-a.wav", None, 2.0),
            row(ProcessingType::Omni, "Earthworks 2-a.wav", None, 4.0),
            row(ProcessingType::Ambi, "s 1-1.wav", Some(-10.0), 1.0),
        ];
        let summary = summarize(&rows, false).unwrap();
        // Omni has DR only, ambi has all three
        assert_eq!(summary.len(), 4);
        let omni_dr = &summary[0];
        assert_eq!(omni_dr.processing_type, ProcessingType::Omni);
        assert_eq!(omni_dr.parameter, Parameter::DrRatio);
        assert_eq!(omni_dr.mean, Some(3.0));
        assert_eq!(omni_dr.count, 2);
    }

    #[test]
    fn test_non_finite_excluded() {
        let rows = vec![
            row(ProcessingType::Ambi, "a", Some(f64::NEG_INFINITY), 1.0),
            row(ProcessingType::Ambi, "b", Some(-4.0), 3.0),
        ];
        let summary = summarize(&rows, false).unwrap();
        let lf_early = summary
            .iter()
            .find(|s| s.parameter == Parameter::LfEarly)
            .unwrap();
        assert_eq!(lf_early.count, 1);
        assert_eq!(lf_early.excluded, 1);
        assert_eq!(lf_early.mean, Some(-4.0));
    }

    #[test]
    fn test_by_integration_time() {
        let rows = vec![
            row(ProcessingType::Ambi, "s 1-1_350ms.wav", Some(-1.0), 1.0),
            row(ProcessingType::Ambi, "s 1-1_10ms.wav", Some(-2.0), 2.0),
            row(ProcessingType::Ambi, "s 1-1_100ms.wav", Some(-3.0), 3.0),
        ];
        let summary = summarize(&rows, true).unwrap();
        let times: Vec<Option<&str>> = summary
            .iter()
            .filter(|s| s.parameter == Parameter::DrRatio)
            .map(|s| s.integration_time.as_deref())
            .collect();
        assert_eq!(times, vec![Some("100ms"), Some("10ms"), Some("350ms")]);
    }
}
