use std::fs;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vocalyzer::audio::decoder;
use vocalyzer::types::AudioData;
use vocalyzer::{AnalysisConfig, FeatureExtractor};

/// Vocalyzer - vocal performance feature extraction
///
/// Decodes an audio file, resamples it to the nominal analysis rate, and
/// prints the extracted feature report as JSON.
#[derive(Parser, Debug)]
#[command(name = "vocalyzer")]
#[command(version = "0.1.0")]
#[command(about = "Vocal performance feature extraction", long_about = None)]
struct Args {
    /// Input audio file path (supports MP3, OGG, FLAC, WAV, etc.)
    #[arg(value_name = "INPUT")]
    input_file: PathBuf,

    /// Write the JSON report here instead of stdout
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Include raw per-frame contours (waveform, pitch, loudness, centroid,
    /// zero-crossing rate) in the report
    #[arg(long)]
    time_series: bool,

    /// Optional trim start time (seconds or HH:MM:SS.mmm)
    #[arg(long, value_name = "TIME")]
    start: Option<String>,

    /// Optional trim end time (seconds or HH:MM:SS.mmm)
    #[arg(long, value_name = "TIME")]
    end: Option<String>,
}

impl Args {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.input_file.exists(),
            "input file does not exist: {:?}",
            self.input_file
        );
        ensure!(
            self.input_file.is_file(),
            "input path is not a file: {:?}",
            self.input_file
        );
        Ok(())
    }

    fn trim_range(&self) -> Result<(Option<f64>, Option<f64>)> {
        let start = parse_optional_time(self.start.as_deref(), "start")?;
        let end = parse_optional_time(self.end.as_deref(), "end")?;
        if let (Some(s), Some(e)) = (start, end) {
            ensure!(e > s, "end time must be greater than start time");
        }
        Ok((start, end))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    args.validate()
        .context("failed to validate command-line arguments")?;
    let (trim_start, trim_end) = args.trim_range()?;

    let config = AnalysisConfig::default();
    let decoded = decoder::decode_at_rate(&args.input_file, config.analysis_sample_rate)
        .context("failed to decode input audio")?;
    info!(
        input = %args.input_file.display(),
        samples = decoded.samples.len(),
        sample_rate = decoded.sample_rate,
        "decoded input audio"
    );

    let audio = apply_trim(decoded, trim_start, trim_end)?;

    let extractor = FeatureExtractor::with_config(config);
    let report = extractor.extract(&audio, args.time_series);
    info!(
        duration_seconds = report.duration_seconds,
        tempo_bpm = report.tempo_bpm,
        "analysis complete"
    );

    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    match &args.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("failed to write report to {:?}", path))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn apply_trim(audio: AudioData, start: Option<f64>, end: Option<f64>) -> Result<AudioData> {
    let total_duration = audio.duration_seconds();
    let requested_start = start.unwrap_or(0.0);
    let requested_end = end.unwrap_or(total_duration);
    if start.is_none() && end.is_none() {
        return Ok(audio);
    }
    ensure!(
        requested_start < total_duration,
        "trim start ({:.3}) must be less than audio duration ({:.3})",
        requested_start,
        total_duration
    );
    let effective_end = requested_end.min(total_duration);
    ensure!(
        effective_end > requested_start,
        "trim end ({:.3}) must be greater than start ({:.3})",
        effective_end,
        requested_start
    );
    Ok(trim_segment(&audio, requested_start, effective_end))
}

fn trim_segment(audio: &AudioData, start_seconds: f64, end_seconds: f64) -> AudioData {
    let sr = audio.sample_rate as f64;
    let total = audio.samples.len();
    let start_index = ((start_seconds * sr).floor().max(0.0) as usize).min(total);
    let end_index = ((end_seconds * sr).ceil().max(start_index as f64) as usize).min(total);
    AudioData {
        samples: audio.samples[start_index..end_index].to_vec(),
        sample_rate: audio.sample_rate,
    }
}

fn parse_optional_time(value: Option<&str>, label: &str) -> Result<Option<f64>> {
    match value {
        Some(raw) => {
            let seconds = parse_time_to_seconds(raw)
                .with_context(|| format!("invalid {} time '{}'", label, raw))?;
            Ok(Some(seconds))
        }
        None => Ok(None),
    }
}

fn parse_time_to_seconds(raw: &str) -> Result<f64> {
    if raw.contains(':') {
        return parse_hms_time(raw);
    }
    let seconds: f64 = raw
        .parse()
        .with_context(|| format!("failed to parse seconds value '{}'", raw))?;
    ensure!(seconds >= 0.0, "time values must be non-negative");
    Ok(seconds)
}

fn parse_hms_time(raw: &str) -> Result<f64> {
    let parts: Vec<&str> = raw.split(':').collect();
    ensure!(
        (2..=3).contains(&parts.len()),
        "time format must be MM:SS or HH:MM:SS"
    );

    let seconds = parts
        .last()
        .unwrap()
        .parse::<f64>()
        .with_context(|| format!("invalid seconds component '{}'", parts.last().unwrap()))?;
    let minutes = parts[parts.len() - 2]
        .parse::<f64>()
        .with_context(|| format!("invalid minutes component '{}'", parts[parts.len() - 2]))?;
    ensure!(minutes >= 0.0, "minutes must be non-negative");
    ensure!(seconds >= 0.0, "seconds must be non-negative");

    let hours = if parts.len() == 3 {
        let value = parts[0]
            .parse::<f64>()
            .with_context(|| format!("invalid hours component '{}'", parts[0]))?;
        ensure!(value >= 0.0, "hours must be non-negative");
        value
    } else {
        0.0
    };

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}
