//! lagsync CLI — headless harness for the live audio lag-detection engine.
//!
//! Usage:
//!     lagsync run "Artist - Track Title" --json
//!     lagsync correlate source.f64le sample.f64le
//!     lagsync status

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lagsync_core::{CorrelationResult, LagSyncError, RunConfig};

#[derive(Parser)]
#[command(
    name = "lagsync",
    version,
    about = "lagsync — temporal lag detection between a local capture and a remote reference stream",
    long_about = "Detects the lag, in milliseconds, between a locally captured audio stream \
                  and a remotely fetched reference stream using incremental FFT \
                  cross-correlation over growing analysis windows."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a track title, capture local audio, and detect the lag between them
    Run {
        /// Track title to resolve against the remote source
        title: String,

        /// Path to the ffmpeg binary
        #[arg(long, default_value = "ffmpeg")]
        ffmpeg_path: String,

        /// External command used to resolve a title to a media URL
        #[arg(long, default_value = "yt-dlp")]
        resolver_cmd: String,

        /// Override the capture input device (e.g. a virtual sink's monitor)
        #[arg(long)]
        device: Option<String>,

        /// Decision threshold on the absolute Pearson coefficient
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Maximum recording duration, in seconds, per producer
        #[arg(long)]
        max_seconds: Option<usize>,

        /// Output the result as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// One-shot probe of the process-wide control status
    Status {
        /// Output the result as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Run the cross-correlation engine directly against two raw f64le files
    Correlate {
        /// Source (reference) stream: raw little-endian f64 samples, length 2n
        source: PathBuf,

        /// Sample (query) stream: raw little-endian f64 samples, length n
        sample: PathBuf,

        /// Output the result as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Run { verbose: true, .. });
    let level = if verbose { "debug" } else { "info" };
    // SAFETY: called before any threads are spawned, at program start.
    unsafe {
        std::env::set_var("RUST_LOG", format!("lagsync={level}"));
    }
    env_logger::init();

    match cli.command {
        Commands::Run {
            title,
            ffmpeg_path,
            resolver_cmd,
            device,
            min_confidence,
            max_seconds,
            json,
            ..
        } => cmd_run(title, ffmpeg_path, resolver_cmd, device, min_confidence, max_seconds, json),

        Commands::Status { json } => cmd_status(json),

        Commands::Correlate { source, sample, json } => cmd_correlate(source, sample, json),
    }
}

fn cmd_run(
    title: String,
    ffmpeg_path: String,
    resolver_cmd: String,
    device: Option<String>,
    min_confidence: Option<f64>,
    max_seconds: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(device) = device {
        lagsync_core::set_capture_device(device);
    }

    let config = RunConfig {
        ffmpeg_path,
        resolver_cmd,
        min_confidence: min_confidence.unwrap_or(lagsync_core::MIN_CONFIDENCE),
        max_seconds: max_seconds.unwrap_or(lagsync_core::MAX_SECONDS),
    };

    ctrlc::set_handler(|| {
        eprintln!("received interrupt, aborting run...");
        lagsync_core::abort();
    })
    .expect("error installing Ctrl-C handler");

    match lagsync_core::run_with_config(&title, &config) {
        Ok(lag_ms) => {
            if json {
                let output = serde_json::json!({
                    "ok": true,
                    "lag_ms": lag_ms,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{lag_ms} ms of lag");
            }
            Ok(())
        }
        Err(e) => report_run_error(e, json),
    }
}

fn report_run_error(e: LagSyncError, json: bool) -> anyhow::Result<()> {
    if json {
        let output = serde_json::json!({
            "ok": false,
            "error": e.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    } else {
        Err(e.into())
    }
}

fn cmd_status(json: bool) -> anyhow::Result<()> {
    let status = lagsync_core::status();
    if json {
        let output = serde_json::json!({ "status": status.as_str() });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", status.as_str());
    }
    Ok(())
}

fn cmd_correlate(source: PathBuf, sample: PathBuf, json: bool) -> anyhow::Result<()> {
    let source = read_f64le(&source)?;
    let sample = read_f64le(&sample)?;

    let CorrelationResult { lag_frames, confidence } = lagsync_core::cross_correlation(&source, &sample)?;
    let lag_ms = (lag_frames as f64 * lagsync_core::FRAMES_TO_MS).round() as i64;

    if json {
        let output = serde_json::json!({
            "lag_frames": lag_frames,
            "lag_ms": lag_ms,
            "confidence": confidence,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{lag_ms} ms of delay with a confidence of {confidence}");
    }
    Ok(())
}

fn read_f64le(path: &PathBuf) -> anyhow::Result<Vec<f64>> {
    use byteorder::{LittleEndian, ReadBytesExt};

    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let mut cursor = std::io::Cursor::new(bytes);
    let mut samples = Vec::new();
    loop {
        match cursor.read_f64::<LittleEndian>() {
            Ok(sample) => samples.push(sample),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(samples)
}
