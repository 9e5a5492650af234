//! Producer Pipe (C3): spawn a child byte-producer, stream little-endian
//! float64 samples into a caller-owned buffer, honor pause/abort, and signal
//! interval completions.

use std::io::ErrorKind;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info, warn};

use crate::buffer::SignalBuffer;
use crate::control::{Control, ControlState};
use crate::error::LagSyncError;

const BUFSIZE: usize = 4096;

/// Run one producer to completion: spawn `command`, stream samples into
/// `buffer`, and honor `control`'s pause/abort signals.
pub fn run_producer(
    mut command: Command,
    buffer: SignalBuffer,
    control: Arc<Control>,
    label: &str,
) -> Result<(), LagSyncError> {
    let mut child = match command.stdout(Stdio::piped()).stderr(Stdio::null()).spawn() {
        Ok(child) => child,
        Err(e) => {
            control.abort();
            return Err(LagSyncError::ProducerLaunch(format!("{label}: {e}")));
        }
    };

    let mut stdout = child.stdout.take().expect("piped stdout missing");
    let result = read_loop(&mut stdout, &buffer, &control, label);
    let result = reap(&mut child, &control, label, result);

    if result.is_err() {
        control.abort();
    }
    result
}

fn reap(
    child: &mut Child,
    control: &Arc<Control>,
    label: &str,
    result: Result<(), LagSyncError>,
) -> Result<(), LagSyncError> {
    if control.status() == ControlState::Aborting {
        let _ = child.kill();
    }

    match child.wait() {
        Ok(status) if !status.success() && result.is_ok() => {
            warn!("{label}: producer process exited with {status}");
            Err(LagSyncError::ProducerLaunch(format!("{label} exited with {status}")))
        }
        Ok(_) => result,
        Err(e) => result.and(Err(LagSyncError::ProducerIo(e))),
    }
}

fn read_loop(
    stdout: &mut ChildStdout,
    buffer: &SignalBuffer,
    control: &Arc<Control>,
    label: &str,
) -> Result<(), LagSyncError> {
    let mut chunk = vec![0.0f64; BUFSIZE];

    loop {
        match control.status() {
            ControlState::Aborting => {
                info!("{label}: aborting, stopping read loop");
                return Err(LagSyncError::Aborted);
            }
            ControlState::Paused => {
                debug!("{label}: paused, waiting for resume");
                if control.wait_while_paused() == ControlState::Aborting {
                    return Err(LagSyncError::Aborted);
                }
            }
            ControlState::Running | ControlState::Idle => {}
        }

        let remaining = buffer.remaining();
        if remaining == 0 {
            break;
        }
        let want = remaining.min(BUFSIZE);

        let mut read_count = 0;
        let mut eof = false;
        for slot in chunk.iter_mut().take(want) {
            match stdout.read_f64::<LittleEndian>() {
                Ok(sample) => {
                    *slot = sample;
                    read_count += 1;
                }
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    eof = true;
                    break;
                }
                Err(e) => return Err(LagSyncError::ProducerIo(e)),
            }
        }

        if read_count > 0 {
            let crossed = buffer.append(&chunk[..read_count]);
            if crossed {
                control.signal_interval_done();
            }
            debug!("{label}: read {read_count} samples ({} total)", buffer.len());
        }

        if eof {
            info!("{label}: producer EOF at {} samples", buffer.len());
            break;
        }
    }

    if buffer.len() < buffer.capacity() {
        buffer.zero_fill_tail();
        control.signal_interval_done();
    }
    Ok(())
}
