//! Synthetic impulse response generation.

use clap::{Args, Subcommand};
use recinto_analysis::synth::{impulse_with_noise, synthetic_capture};
use recinto_analysis::{Capsule, seconds_to_samples};
use recinto_io::{WavSpec, write_wav, write_wav_multichannel};
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    command: GenerateCommand,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate a four-capsule A-format impulse response
    Aformat {
        /// Output directory
        #[arg(value_name = "DIR")]
        output: PathBuf,

        /// Duration in seconds
        #[arg(long, default_value = "1.0")]
        duration: f64,

        /// Sample rate
        #[arg(long, default_value = "48000")]
        sample_rate: u32,

        /// Sample index of the impulse
        #[arg(long, default_value = "4800")]
        arrival: usize,

        /// Amplitude of the noise tail
        #[arg(long, default_value = "0.001")]
        noise: f64,

        /// Position id used in the file names
        #[arg(long, default_value = "1")]
        position: u32,

        /// Microphone type used in the file names
        #[arg(long, default_value = "soundfield")]
        marker: String,

        /// Bit depth (16, 24 or 32 float)
        #[arg(long, default_value = "32")]
        bits: u16,

        /// Write one 4-channel file instead of one file per capsule
        #[arg(long)]
        single_file: bool,
    },

    /// Generate a mono omnidirectional impulse response
    Omni {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Duration in seconds
        #[arg(long, default_value = "1.0")]
        duration: f64,

        /// Sample rate
        #[arg(long, default_value = "48000")]
        sample_rate: u32,

        /// Sample index of the impulse
        #[arg(long, default_value = "4800")]
        arrival: usize,

        /// Impulse amplitude
        #[arg(long, default_value = "1.0")]
        amplitude: f64,

        /// Amplitude of the noise tail
        #[arg(long, default_value = "0.001")]
        noise: f64,

        /// Noise seed
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Bit depth (16, 24 or 32 float)
        #[arg(long, default_value = "32")]
        bits: u16,
    },
}

fn check_bits(bits: u16) -> anyhow::Result<()> {
    if !matches!(bits, 16 | 24 | 32) {
        anyhow::bail!("unsupported bit depth {bits} (use 16, 24 or 32)");
    }
    Ok(())
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    match args.command {
        GenerateCommand::Aformat {
            output,
            duration,
            sample_rate,
            arrival,
            noise,
            position,
            marker,
            bits,
            single_file,
        } => {
            check_bits(bits)?;
            let capture = synthetic_capture(sample_rate, duration, arrival, noise)?;
            std::fs::create_dir_all(&output)?;

            if single_file {
                let path = output.join(format!("{marker} aformat-{position}.wav"));
                let channels: Vec<&[f64]> = Capsule::ORDER.iter().map(|c| capture.capsule(*c)).collect();
                let spec = WavSpec {
                    channels: 4,
                    sample_rate,
                    bits_per_sample: bits,
                };
                write_wav_multichannel(&path, &channels, spec)?;
                println!("Wrote {}", path.display());
            } else {
                let spec = WavSpec {
                    channels: 1,
                    sample_rate,
                    bits_per_sample: bits,
                };
                for (n, capsule) in Capsule::ORDER.iter().enumerate() {
                    let path = output.join(format!("{marker} {}-{position}.wav", n + 1));
                    write_wav(&path, capture.capsule(*capsule), spec)?;
                    println!("Wrote {} ({capsule})", path.display());
                }
            }
            println!(
                "{} samples at {} Hz, impulse at sample {}",
                capture.len(),
                sample_rate,
                arrival
            );
        }

        GenerateCommand::Omni {
            output,
            duration,
            sample_rate,
            arrival,
            amplitude,
            noise,
            seed,
            bits,
        } => {
            check_bits(bits)?;
            let len = seconds_to_samples(duration, sample_rate);
            let rir = impulse_with_noise(len, arrival, amplitude, noise, seed);
            let spec = WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: bits,
            };
            write_wav(&output, &rir, spec)?;
            println!(
                "Wrote {} ({} samples at {} Hz, impulse at sample {})",
                output.display(),
                len,
                sample_rate,
                arrival
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bits() {
        assert!(check_bits(16).is_ok());
        assert!(check_bits(24).is_ok());
        assert!(check_bits(32).is_ok());
        assert!(check_bits(8).is_err());
    }
}
