//! lagsync-core — incremental FFT cross-correlation engine and
//! producer/consumer coordination layer for detecting the lag between a
//! locally captured audio stream and a remotely fetched reference stream.
//!
//! This crate provides:
//! - **correlation**: FFT cross-correlation and Pearson confidence (C1).
//! - **fft**: thread-safe FFT planning/execution wrapper (C2).
//! - **buffer**: the growing, fixed-capacity Signal Buffer shared with a producer.
//! - **producer**: the generic byte-producer streaming loop (C3).
//! - **capture**: local-audio producer command (C4).
//! - **download**: remote-audio producer command plus URL resolution (C5).
//! - **controller**: the run loop that drives both producers to a lag decision (C6).
//! - **control**: process-wide status, pause/resume/abort (C7).
//! - **error**: the `LagSyncError` taxonomy every fallible operation returns.

pub mod buffer;
pub mod capture;
pub mod control;
pub mod controller;
pub mod correlation;
pub mod download;
pub mod error;
pub mod fft;
pub mod producer;

pub use capture::set_capture_device;
pub use control::ControlState;
pub use controller::{run, run_with_config, LagMs, RunConfig};
pub use correlation::{cross_correlation, pearson, CorrelationResult};
pub use error::LagSyncError;

/// Sample rate the entire pipeline operates at, mono, frames/second.
pub const SAMPLE_RATE: usize = 48_000;

/// Conversion factor from audio frames to milliseconds.
pub const FRAMES_TO_MS: f64 = 1000.0 / SAMPLE_RATE as f64;

/// Decision threshold on the absolute Pearson coefficient.
pub const MIN_CONFIDENCE: f64 = 0.95;

/// Growing analysis windows, in seconds, the controller walks through in order.
pub const INTERVALS_SECONDS: [usize; 6] = [3, 6, 10, 15, 20, 30];

/// The largest sample interval; also the default ffmpeg recording cap.
pub const MAX_SECONDS: usize = 30;

/// `INTERVALS_SECONDS` converted to sample-buffer checkpoint lengths.
pub fn sample_intervals() -> [usize; 6] {
    INTERVALS_SECONDS.map(|s| s * SAMPLE_RATE)
}

/// Source-buffer checkpoint lengths: twice the sample intervals, since the
/// source is never zero-padded and is always pre-sized to `2n`.
pub fn source_intervals() -> [usize; 6] {
    INTERVALS_SECONDS.map(|s| 2 * s * SAMPLE_RATE)
}

/// Process-wide status: one of `Idle`, `Running`, `Paused`, `Aborting`.
pub fn status() -> ControlState {
    control::global().status()
}

/// Pause the active run. A no-op outside `Running`.
pub fn pause() {
    control::global().pause();
}

/// Resume a paused run. A no-op outside `Paused`.
pub fn resume() {
    control::global().resume();
}

/// Abort the active run. A no-op outside `Running`/`Paused`.
pub fn abort() {
    control::global().abort();
}

/// Enable or disable verbose diagnostic logging.
pub fn set_debug(on: bool) {
    control::global().set_debug(on);
}

/// Whether verbose diagnostic logging is currently enabled.
pub fn get_debug() -> bool {
    control::global().get_debug()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_intervals_are_double_sample_intervals() {
        for (s, src) in sample_intervals().iter().zip(source_intervals().iter()) {
            assert_eq!(*src, 2 * s);
        }
    }

    #[test]
    fn intervals_end_at_max_seconds() {
        assert_eq!(*sample_intervals().last().unwrap(), MAX_SECONDS * SAMPLE_RATE);
    }
}
