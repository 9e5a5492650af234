//! Download Producer (C5): resolve a track title to a media URL, then
//! configure the producer-pipe arguments to fetch the remote stream.

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

use log::{debug, warn};

use crate::error::LagSyncError;
use crate::SAMPLE_RATE;

/// Resolve `title` to a direct media URL by invoking an external search tool
/// and reading one line of its standard output. Transitions to
/// `ResolveFailed` without ever spawning ffmpeg on failure.
pub fn resolve_url(resolver_cmd: &str, title: &str) -> Result<String, LagSyncError> {
    let mut cmd = Command::new(resolver_cmd);
    cmd.arg("-f")
        .arg("bestaudio")
        .arg("-g")
        .arg(title)
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = cmd
        .spawn()
        .map_err(|e| LagSyncError::ProducerLaunch(format!("resolver: {e}")))?;

    let stdout = child.stdout.take().expect("piped stdout missing");
    let mut line = String::new();
    BufReader::new(stdout)
        .read_line(&mut line)
        .map_err(LagSyncError::ProducerIo)?;

    let status = child.wait().map_err(LagSyncError::ProducerIo)?;
    let url = line.trim().to_string();

    if !status.success() || url.is_empty() {
        warn!("resolver failed to produce a URL for '{title}'");
        return Err(LagSyncError::ResolveFailed);
    }

    debug!("resolved '{title}' -> {url}");
    Ok(url)
}

/// Build the ffmpeg invocation that transcodes `url` to raw little-endian
/// f64 mono at `SAMPLE_RATE`, capped at `max_seconds`.
pub fn build_command(ffmpeg_path: &str, url: &str, max_seconds: usize) -> Command {
    let mut cmd = Command::new(ffmpeg_path);
    cmd.arg("-y")
        .arg("-to")
        .arg(max_seconds.to_string())
        .arg("-i")
        .arg(url)
        .arg("-ac")
        .arg("1")
        .arg("-r")
        .arg(SAMPLE_RATE.to_string())
        .arg("-f")
        .arg("f64le")
        .arg("pipe:1");
    cmd
}
