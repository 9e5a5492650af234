//! Capture Producer (C4): configure the producer-pipe arguments to record
//! local audio.

use std::process::Command;
use std::sync::{Mutex, OnceLock};

use crate::SAMPLE_RATE;

static CAPTURE_DEVICE: OnceLock<Mutex<String>> = OnceLock::new();

fn device_slot() -> &'static Mutex<String> {
    CAPTURE_DEVICE.get_or_init(|| Mutex::new("default".to_string()))
}

/// Override the capture input device. The external virtual-sink setup
/// collaborator (out of scope here) calls this with the monitor source of a
/// sink it created; the engine itself stays device-agnostic.
pub fn set_capture_device(device: impl Into<String>) {
    *device_slot().lock().expect("capture device lock poisoned") = device.into();
}

fn capture_device() -> String {
    device_slot().lock().expect("capture device lock poisoned").clone()
}

/// Build the ffmpeg invocation that streams local audio as raw little-endian
/// f64 mono at `SAMPLE_RATE`, capped at `max_seconds`.
pub fn build_command(ffmpeg_path: &str, max_seconds: usize) -> Command {
    let device = capture_device();
    let mut cmd = Command::new(ffmpeg_path);
    cmd.arg("-y")
        .arg("-to")
        .arg(max_seconds.to_string())
        .arg("-f")
        .arg("pulse")
        .arg("-i")
        .arg(device)
        .arg("-ac")
        .arg("1")
        .arg("-r")
        .arg(SAMPLE_RATE.to_string())
        .arg("-f")
        .arg("f64le")
        .arg("pipe:1");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_device_is_used_until_overridden() {
        // Other tests in this process may have already set the device; only
        // assert the override round-trips.
        set_capture_device("my-sink.monitor");
        assert_eq!(capture_device(), "my-sink.monitor");
    }
}
