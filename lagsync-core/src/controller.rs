//! Run Controller (C6): allocate buffers, start producers, wait for matching
//! intervals, call the cross-correlation engine, decide to stop or continue,
//! and clean up. Cleanup runs through an RAII guard rather than a scattered
//! set of early returns.

use std::sync::Arc;
use std::thread;

use log::{info, warn};

use crate::buffer::SignalBuffer;
use crate::capture;
use crate::control::{self, Control, ControlState};
use crate::correlation::cross_correlation;
use crate::download;
use crate::error::LagSyncError;
use crate::producer;
use crate::{sample_intervals, source_intervals, FRAMES_TO_MS, INTERVALS_SECONDS, MAX_SECONDS, MIN_CONFIDENCE};

/// A lag result in milliseconds, per the Run Outcome entity's `Success` case.
pub type LagMs = i64;

/// Runtime overrides of the compile-time defaults, set by the CLI harness.
pub struct RunConfig {
    pub ffmpeg_path: String,
    pub resolver_cmd: String,
    pub min_confidence: f64,
    pub max_seconds: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            ffmpeg_path: "ffmpeg".to_string(),
            resolver_cmd: "yt-dlp".to_string(),
            min_confidence: MIN_CONFIDENCE,
            max_seconds: MAX_SECONDS,
        }
    }
}

/// Run one lag-detection pass against `title` using the compile-time
/// defaults. Non-reentrant: a concurrent second call returns
/// `LagSyncError::Busy`.
pub fn run(title: &str) -> Result<LagMs, LagSyncError> {
    run_with_config(title, &RunConfig::default())
}

/// RAII guard resetting the shared `Control` to `Idle` on every exit path.
struct RunGuard {
    control: Arc<Control>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.control.finish();
    }
}

/// Run one lag-detection pass against `title` with explicit overrides.
pub fn run_with_config(title: &str, config: &RunConfig) -> Result<LagMs, LagSyncError> {
    let control = control::global();
    if !control.try_start() {
        return Err(LagSyncError::Busy);
    }
    let _guard = RunGuard {
        control: Arc::clone(&control),
    };

    info!("run started for '{title}'");

    let sample_ivals = sample_intervals();
    let source_ivals = source_intervals();
    let sample_cap = *sample_ivals.last().expect("intervals non-empty");
    let source_cap = *source_ivals.last().expect("intervals non-empty");

    let sample_buffer = SignalBuffer::new(sample_cap, sample_ivals.to_vec());
    let source_buffer = SignalBuffer::new(source_cap, source_ivals.to_vec());

    let url = match download::resolve_url(&config.resolver_cmd, title) {
        Ok(url) => url,
        Err(e) => {
            control.abort();
            return Err(e);
        }
    };

    let capture_cmd = capture::build_command(&config.ffmpeg_path, config.max_seconds);
    let download_cmd = download::build_command(&config.ffmpeg_path, &url, config.max_seconds);

    let capture_handle = {
        let buffer = sample_buffer.clone();
        let control = Arc::clone(&control);
        thread::spawn(move || producer::run_producer(capture_cmd, buffer, control, "capture"))
    };
    let download_handle = {
        let buffer = source_buffer.clone();
        let control = Arc::clone(&control);
        thread::spawn(move || producer::run_producer(download_cmd, buffer, control, "download"))
    };

    let mut outcome = Err(LagSyncError::NoMatch);

    for i in 0..sample_ivals.len() {
        let sample_target = sample_ivals[i];
        let source_target = source_ivals[i];

        let state = control.wait_for_intervals(|| {
            sample_buffer.reached_len(sample_target) && source_buffer.reached_len(source_target)
        });
        if state == ControlState::Aborting {
            outcome = Err(LagSyncError::Aborted);
            break;
        }

        let source_window = source_buffer.prefix(source_target);
        let sample_window = sample_buffer.prefix(sample_target);

        match cross_correlation(&source_window, &sample_window) {
            Ok(result) => {
                info!(
                    "interval {}s: lag={} confidence={:.4}",
                    INTERVALS_SECONDS[i], result.lag_frames, result.confidence
                );
                if result.confidence.abs() >= config.min_confidence {
                    let lag_ms = (result.lag_frames as f64 * FRAMES_TO_MS).round() as i64;
                    control.abort();
                    outcome = Ok(lag_ms);
                    break;
                }
            }
            Err(LagSyncError::Degenerate) => {
                warn!("interval {}s degenerate, continuing", INTERVALS_SECONDS[i]);
            }
            Err(e) => {
                control.abort();
                outcome = Err(e);
                break;
            }
        }
    }

    if control.status() != ControlState::Aborting {
        control.abort();
    }

    let capture_result = capture_handle.join().expect("capture producer thread panicked");
    let download_result = download_handle.join().expect("download producer thread panicked");

    // A producer-side spawn/IO failure is a more specific diagnosis than the
    // generic `Aborted` the interval loop falls back to when it merely
    // observes `Aborting`, so prefer it when present.
    if matches!(outcome, Err(LagSyncError::Aborted)) {
        if let Err(e) = capture_result {
            outcome = Err(e);
        } else if let Err(e) = download_result {
            outcome = Err(e);
        }
    }

    info!("run finished for '{title}': {outcome:?}");
    outcome
}
