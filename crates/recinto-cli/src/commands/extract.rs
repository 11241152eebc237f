//! Parameter extraction for a single recording.

use super::common::{dr_limit, format_db, parse_key_val};
use crate::report::db_value;
use clap::Args;
use recinto_analysis::{
    DrIntegrationLimit, ParameterSet, ProcessingType, analyze_a_format, analyze_omni,
};
use recinto_io::{AFormatSource, read_aformat, read_omni};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ExtractArgs {
    /// One omni file, one 4-channel file with --aformat, or four capsule
    /// files in FLU FRD BLD BRU order
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Capsule file by name (e.g. -c front_left_up=flu.wav), repeat for all four
    #[arg(short = 'c', long = "capsule", value_parser = parse_key_val, conflicts_with = "files")]
    pub capsules: Vec<(String, String)>,

    /// Treat a single input file as a 4-channel A-format recording
    #[arg(long)]
    pub aformat: bool,

    /// DR reverberant window length in seconds after the arrival
    #[arg(long, conflicts_with = "no_dr_limit")]
    pub dr_limit: Option<f64>,

    /// Integrate DR reverberant energy to the end of the signal
    #[arg(long)]
    pub no_dr_limit: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct FailureReport {
    parameter: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ExtractReport {
    processing_type: ProcessingType,
    sample_rate: u32,
    direct_sound_arrival: usize,
    direct_sound_arrival_ms: f64,
    #[serde(with = "db_value")]
    lf_early: Option<f64>,
    #[serde(with = "db_value")]
    lf_late: Option<f64>,
    #[serde(with = "db_value")]
    dr_ratio: Option<f64>,
    failures: Vec<FailureReport>,
}

impl ExtractReport {
    fn new(params: &ParameterSet, sample_rate: u32) -> Self {
        use recinto_analysis::Parameter;
        Self {
            processing_type: params.processing_type,
            sample_rate,
            direct_sound_arrival: params.direct_sound_arrival,
            direct_sound_arrival_ms: params.direct_sound_arrival_ms,
            lf_early: params.value(Parameter::LfEarly),
            lf_late: params.value(Parameter::LfLate),
            dr_ratio: params.value(Parameter::DrRatio),
            failures: params
                .failures()
                .into_iter()
                .map(|(p, e)| FailureReport {
                    parameter: p.name(),
                    message: e.to_string(),
                })
                .collect(),
        }
    }
}

enum Input {
    Omni(PathBuf),
    AFormat(AFormatSource),
}

fn resolve_input(args: &ExtractArgs) -> anyhow::Result<Input> {
    if !args.capsules.is_empty() {
        return Ok(Input::AFormat(AFormatSource::from_names(
            args.capsules.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )?));
    }
    match (args.files.as_slice(), args.aformat) {
        ([single], false) => Ok(Input::Omni(single.clone())),
        ([single], true) => Ok(Input::AFormat(AFormatSource::SingleFile(single.clone()))),
        ([flu, frd, bld, bru], _) => Ok(Input::AFormat(AFormatSource::Ordered([
            flu.clone(),
            frd.clone(),
            bld.clone(),
            bru.clone(),
        ]))),
        ([], _) => anyhow::bail!("no input files given"),
        (files, _) => anyhow::bail!(
            "expected 1 omni file, 1 file with --aformat, or 4 capsule files; got {}",
            files.len()
        ),
    }
}

fn extract(input: &Input, limit: DrIntegrationLimit) -> anyhow::Result<(ParameterSet, u32)> {
    match input {
        Input::Omni(path) => {
            let (rir, sample_rate) = read_omni(path)?;
            Ok((analyze_omni(&rir, sample_rate, limit)?, sample_rate))
        }
        Input::AFormat(source) => {
            let capture = read_aformat(source)?;
            Ok((analyze_a_format(&capture, limit)?, capture.sample_rate()))
        }
    }
}

/// Run the extract command.
pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let limit = dr_limit(args.dr_limit, args.no_dr_limit, DrIntegrationLimit::default())?;
    let input = resolve_input(&args)?;
    let (params, sample_rate) = extract(&input, limit)?;

    if args.json {
        let report = ExtractReport::new(&params, sample_rate);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Type:        {}", params.processing_type);
    println!("Sample Rate: {sample_rate} Hz");
    println!(
        "Arrival:     {:.3} ms (sample {})",
        params.direct_sound_arrival_ms, params.direct_sound_arrival
    );
    println!();
    if let Some(lf_early) = &params.lf_early {
        println!("LF_early = {}", format_db(lf_early));
    }
    if let Some(lf_late) = &params.lf_late {
        println!("LF_late = {}", format_db(lf_late));
    }
    println!("DR = {}", format_db(&params.dr_ratio));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(files: &[&str]) -> ExtractArgs {
        ExtractArgs {
            files: files.iter().map(PathBuf::from).collect(),
            capsules: Vec::new(),
            aformat: false,
            dr_limit: None,
            no_dr_limit: false,
            json: false,
        }
    }

    #[test]
    fn test_one_file_is_omni() {
        assert!(matches!(resolve_input(&args(&["a.wav"])), Ok(Input::Omni(_))));
    }

    #[test]
    fn test_one_file_with_aformat_flag() {
        let mut a = args(&["a.wav"]);
        a.aformat = true;
        assert!(matches!(
            resolve_input(&a),
            Ok(Input::AFormat(AFormatSource::SingleFile(_)))
        ));
    }

    #[test]
    fn test_four_files_are_ordered_capsules() {
        let Ok(Input::AFormat(AFormatSource::Ordered(paths))) =
            resolve_input(&args(&["1.wav", "2.wav", "3.wav", "4.wav"]))
        else {
            panic!("expected ordered capsules");
        };
        assert_eq!(paths[2], PathBuf::from("3.wav"));
    }

    #[test]
    fn test_other_counts_rejected() {
        assert!(resolve_input(&args(&[])).is_err());
        assert!(resolve_input(&args(&["1.wav", "2.wav"])).is_err());
    }

    #[test]
    fn test_named_capsules() {
        let mut a = args(&[]);
        a.capsules = vec![("front_left_up".to_string(), "x.wav".to_string())];
        assert!(matches!(
            resolve_input(&a),
            Ok(Input::AFormat(AFormatSource::Named(_)))
        ));
        a.capsules = vec![("middle".to_string(), "x.wav".to_string())];
        assert!(resolve_input(&a).is_err());
    }
}
