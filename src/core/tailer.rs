//! # Log Tailer
//!
//! Background task that follows the log file and forwards each newly
//! completed line to the UI over a bounded channel.
//!
//! ```text
//! chat.log ──read_until('\n')──▶ pending ──complete line──▶ mpsc ──▶ UI loop
//!                 │
//!                 └─ no data: sleep one poll interval (or wake on stop)
//! ```
//!
//! The tailer is the only producer and the UI loop the only consumer. A line
//! is forwarded only once its `\n` has been written, so a torn write from an
//! agent never shows up half-finished.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Capacity of the line channel between tailer and UI.
pub const CHANNEL_CAPACITY: usize = 1024;

/// Cooperative cancellation token shared between the UI loop and the tailer.
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Ask every listener to stop. Safe to call more than once.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Where and how fast to tail.
#[derive(Debug, Clone)]
pub struct TailOptions {
    pub path: PathBuf,
    /// Byte offset to start reading from (end of the startup snapshot).
    pub start_offset: u64,
    pub poll_interval: Duration,
}

/// Spawn the tailer on the current tokio runtime.
///
/// Returns the receiving end of the line channel and the task handle. The task
/// ends when `stop` fires, when the receiver is dropped, or on a read error.
pub fn spawn(options: TailOptions, stop: StopSignal) -> (mpsc::Receiver<String>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::spawn(async move {
        match tail(options, tx, stop).await {
            Ok(()) => info!("Log tailer stopped"),
            // Read failures end the tailer without disturbing the UI.
            Err(e) => warn!("Log tailer ended: {}", e),
        }
    });
    (rx, handle)
}

async fn open_at(path: &Path, offset: u64) -> io::Result<BufReader<File>> {
    // Opening with create lets us start before anyone has written the log.
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .await?;
    file.seek(SeekFrom::Start(offset)).await?;
    Ok(BufReader::new(file))
}

async fn tail(options: TailOptions, tx: mpsc::Sender<String>, stop: StopSignal) -> io::Result<()> {
    let TailOptions {
        path,
        start_offset,
        poll_interval,
    } = options;
    let mut stop_rx = stop.subscribe();

    let mut reader = open_at(&path, start_offset).await?;
    let mut offset = start_offset;
    let mut pending: Vec<u8> = Vec::new();
    info!("Tailing {} from offset {}", path.display(), offset);

    loop {
        if *stop_rx.borrow() {
            return Ok(());
        }

        let read = reader.read_until(b'\n', &mut pending).await?;
        offset += read as u64;

        if pending.last() == Some(&b'\n') {
            let line = decode_line(&pending);
            pending.clear();
            if tx.send(line).await.is_err() {
                debug!("Line receiver dropped, tailer exiting");
                return Ok(());
            }
            continue;
        }

        if read > 0 {
            // Partial line: keep it and read again, the rest may already be there.
            continue;
        }

        // No new data. A file shorter than our offset was truncated or rotated.
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() < offset => {
                info!(
                    "Log {} shrank ({} < {}), rewinding to start",
                    path.display(),
                    meta.len(),
                    offset
                );
                reader = open_at(&path, 0).await?;
                offset = 0;
                pending.clear();
                continue;
            }
            Ok(_) => {}
            Err(e) => debug!("Log {} unavailable this poll: {}", path.display(), e),
        }

        tokio::select! {
            _ = tokio::time::sleep(poll_interval) => {}
            _ = stop_rx.changed() => {}
        }
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_terminators() {
        assert_eq!(decode_line(b"hello\n"), "hello");
        assert_eq!(decode_line(b"hello\r\n"), "hello");
        assert_eq!(decode_line(b"\n"), "");
        assert_eq!(decode_line(b"caf\xc3\xa9\n"), "café");
    }

    #[test]
    fn decode_tolerates_invalid_utf8() {
        let line = decode_line(b"bad \xff byte\n");
        assert!(line.starts_with("bad "));
        assert!(line.ends_with(" byte"));
    }

    #[test]
    fn stop_signal_is_shared_between_clones() {
        let stop = StopSignal::new();
        let clone = stop.clone();
        assert!(!clone.is_stopped());
        stop.stop();
        stop.stop();
        assert!(clone.is_stopped());
    }
}
