//! Newline-delimited control stream.
//!
//! Each line is one JSON [`ControlMessage`]. Lines that fail to parse are
//! logged and skipped so a typo in an interactive session does not end the run.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use boid_shared::ControlMessage;
use tokio::sync::mpsc;

/// Forward every well-formed message from `reader` into `tx`.
///
/// Returns the number of messages forwarded once the reader hits end of
/// input or the receiving side has gone away.
pub fn read_control_stream<R: BufRead>(
    reader: R,
    tx: &mpsc::UnboundedSender<ControlMessage>,
) -> Result<usize> {
    let mut forwarded = 0;

    for line in reader.lines() {
        let line = line.context("Failed to read control input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match ControlMessage::from_json(line) {
            Ok(message) => {
                log::debug!("Control message: {:?}", message);
                if tx.send(message).is_err() {
                    log::debug!("Control receiver dropped, stopping reader");
                    break;
                }
                forwarded += 1;
            }
            Err(e) => {
                log::warn!("Ignoring malformed control message: {}", e);
            }
        }
    }

    Ok(forwarded)
}

/// Read control messages from stdin on a background thread.
///
/// A plain thread rather than a runtime task: a blocked stdin read must not
/// hold up runtime shutdown once the frame loop ends.
pub fn spawn_stdin_reader(tx: mpsc::UnboundedSender<ControlMessage>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("control-input".into())
        .spawn(move || {
            let stdin = io::stdin();
            match read_control_stream(stdin.lock(), &tx) {
                Ok(count) => log::info!("Control input closed after {} messages", count),
                Err(e) => log::warn!("Control input failed: {:#}", e),
            }
        })
        .context("Failed to spawn control input thread")
}
