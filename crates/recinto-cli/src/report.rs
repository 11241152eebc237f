//! Result tables: one row per recording, written as TSV or JSON.

use anyhow::Context;
use recinto_analysis::{Parameter, ParameterSet, ProcessingType};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Column order of the TSV results table.
pub const COLUMNS: [&str; 8] = [
    "measurement",
    "processing_type",
    "filename",
    "filepath",
    "direct_sound_arrival_ms",
    "lf_early",
    "lf_late",
    "dr_ratio",
];

/// One analysed recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Measurement directory number (`medicion<N>`).
    pub measurement: String,
    /// Whether the row came from an omni or an ambisonic recording.
    pub processing_type: ProcessingType,
    /// Comma-separated file names of the recording.
    pub filename: String,
    /// Comma-separated full paths of the recording's files.
    pub filepath: String,
    /// Direct sound arrival in milliseconds; empty when the search failed.
    #[serde(with = "db_value")]
    pub direct_sound_arrival_ms: Option<f64>,
    /// Early lateral energy fraction in dB; empty for omni recordings.
    #[serde(with = "db_value")]
    pub lf_early: Option<f64>,
    /// Late lateral energy fraction in dB; empty for omni recordings.
    #[serde(with = "db_value")]
    pub lf_late: Option<f64>,
    /// Direct to reverberant ratio in dB.
    #[serde(with = "db_value")]
    pub dr_ratio: Option<f64>,
}

impl ResultRow {
    /// Build a row from an extracted parameter set; failed parameters are empty.
    pub fn new(
        measurement: &str,
        filename: String,
        filepath: String,
        params: &ParameterSet,
    ) -> Self {
        Self {
            measurement: measurement.to_string(),
            processing_type: params.processing_type,
            filename,
            filepath,
            direct_sound_arrival_ms: Some(params.direct_sound_arrival_ms),
            lf_early: params.value(Parameter::LfEarly),
            lf_late: params.value(Parameter::LfLate),
            dr_ratio: params.value(Parameter::DrRatio),
        }
    }

    /// Value of a parameter column.
    pub fn parameter(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::LfEarly => self.lf_early,
            Parameter::LfLate => self.lf_late,
            Parameter::DrRatio => self.dr_ratio,
        }
    }

    fn sort_key(&self) -> (&str, ProcessingType, &str) {
        (&self.measurement, self.processing_type, &self.filename)
    }
}

/// Sort rows by measurement, processing type and file name.
pub fn sort_rows(rows: &mut [ResultRow]) {
    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// A recording, or one of its parameters, that could not be analysed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingFailure {
    /// Recording identifier.
    pub recording: String,
    /// Where it failed: `load`, `arrival`, `timeout` or a parameter name.
    pub stage: String,
    /// Error message.
    pub message: String,
}

impl RecordingFailure {
    pub fn new(recording: impl Into<String>, stage: impl Into<String>, message: impl ToString) -> Self {
        Self {
            recording: recording.into(),
            stage: stage.into(),
            message: message.to_string(),
        }
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn sanitize(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

/// Render rows as a tab-separated table with a header line.
pub fn to_tsv(rows: &[ResultRow]) -> String {
    let mut out = COLUMNS.join("\t");
    out.push('\n');
    for row in rows {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            sanitize(&row.measurement),
            row.processing_type,
            sanitize(&row.filename),
            sanitize(&row.filepath),
            cell(row.direct_sound_arrival_ms),
            cell(row.lf_early),
            cell(row.lf_late),
            cell(row.dr_ratio),
        );
    }
    out
}

/// Render failures as a tab-separated table.
pub fn failures_to_tsv(failures: &[RecordingFailure]) -> String {
    let mut out = String::from("recording\tstage\tmessage\n");
    for f in failures {
        let _ = writeln!(
            out,
            "{}\t{}\t{}",
            sanitize(&f.recording),
            sanitize(&f.stage),
            sanitize(&f.message)
        );
    }
    out
}

fn parse_cell(text: &str, column: &str, line: usize) -> anyhow::Result<Option<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .with_context(|| format!("line {line}: invalid number '{text}' in column {column}"))
}

fn field<'a>(fields: &[&'a str], at: usize, column: &str, line: usize) -> anyhow::Result<&'a str> {
    fields
        .get(at)
        .copied()
        .with_context(|| format!("line {line}: missing column {column}"))
}

/// Parse a results table previously written by [`to_tsv`].
///
/// Columns are located by header name, so extra or reordered columns are
/// accepted.
pub fn parse_tsv(content: &str) -> anyhow::Result<Vec<ResultRow>> {
    let mut lines = content.lines();
    let header: Vec<&str> = lines
        .next()
        .context("results table is empty")?
        .split('\t')
        .map(str::trim)
        .collect();

    let mut index = [0usize; COLUMNS.len()];
    for (slot, name) in index.iter_mut().zip(COLUMNS) {
        *slot = header
            .iter()
            .position(|h| *h == name)
            .with_context(|| format!("results table has no '{name}' column"))?;
    }

    let mut rows = Vec::new();
    for (n, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = n + 2;
        let fields: Vec<&str> = line.split('\t').collect();
        let get = |column: usize| field(&fields, index[column], COLUMNS[column], line_no);

        let processing_type = match get(1)?.trim() {
            "omni" => ProcessingType::Omni,
            "ambi" => ProcessingType::Ambi,
            other => anyhow::bail!("line {line_no}: unknown processing type '{other}'"),
        };

        rows.push(ResultRow {
            measurement: get(0)?.to_string(),
            processing_type,
            filename: get(2)?.to_string(),
            filepath: get(3)?.to_string(),
            direct_sound_arrival_ms: parse_cell(get(4)?, COLUMNS[4], line_no)?,
            lf_early: parse_cell(get(5)?, COLUMNS[5], line_no)?,
            lf_late: parse_cell(get(6)?, COLUMNS[6], line_no)?,
            dr_ratio: parse_cell(get(7)?, COLUMNS[7], line_no)?,
        });
    }
    Ok(rows)
}

/// Read a TSV results table from disk.
pub fn read_tsv(path: &Path) -> anyhow::Result<Vec<ResultRow>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_tsv(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// JSON encoding of optional dB values.
///
/// JSON has no infinities, so non-finite values are written as the strings
/// `"-inf"`, `"inf"` and `"nan"`.
pub(crate) mod db_value {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            None => serializer.serialize_none(),
            Some(v) if v.is_finite() => serializer.serialize_f64(*v),
            Some(v) => serializer.serialize_str(&v.to_string()),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(v)) => Ok(Some(v)),
            Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
