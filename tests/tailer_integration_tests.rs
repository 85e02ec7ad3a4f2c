use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use huddle::core::log_store::LogStore;
use huddle::core::message::{LogEntry, Message};
use huddle::core::tailer::{self, StopSignal, TailOptions};
use tokio::sync::mpsc;
use tokio::time::timeout;

// ============================================================================
// Helper Functions
// ============================================================================

const POLL: Duration = Duration::from_millis(10);
const WAIT: Duration = Duration::from_secs(5);

fn options(path: &Path, start_offset: u64) -> TailOptions {
    TailOptions {
        path: path.to_path_buf(),
        start_offset,
        poll_interval: POLL,
    }
}

fn append_raw(path: &Path, bytes: &str) {
    let mut file = OpenOptions::new().append(true).create(true).open(path).unwrap();
    file.write_all(bytes.as_bytes()).unwrap();
}

async fn next_line(rx: &mut mpsc::Receiver<String>) -> String {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for a tailed line")
        .expect("tailer channel closed")
}

/// True if nothing arrives within a few poll intervals.
async fn stays_quiet(rx: &mut mpsc::Receiver<String>) -> bool {
    timeout(POLL * 10, rx.recv()).await.is_err()
}

// ============================================================================
// Tailer + Log Store
// ============================================================================

#[tokio::test]
async fn tailer_delivers_lines_appended_after_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = LogStore::new(dir.path().join("chat.log"));
    store.append(&Message::new("12:00:00", "human", "old")).unwrap();

    let snapshot = store.load_recent(100).unwrap();
    assert_eq!(snapshot.lines.len(), 1);

    let stop = StopSignal::new();
    let (mut rx, handle) = tailer::spawn(options(store.path(), snapshot.end_offset), stop.clone());

    store.append(&Message::new("12:00:01", "agent1", "new one")).unwrap();
    store.append(&Message::new("12:00:02", "agent2", "and another")).unwrap();

    let first = next_line(&mut rx).await;
    let second = next_line(&mut rx).await;
    assert_eq!(first, "[12:00:01] [agent1] new one");
    assert_eq!(second, "[12:00:02] [agent2] and another");
    assert!(matches!(LogEntry::parse(&first), LogEntry::Message(m) if m.sender == "agent1"));

    stop.stop();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn torn_line_is_held_until_complete() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.log");
    fs::write(&path, "").unwrap();

    let stop = StopSignal::new();
    let (mut rx, _handle) = tailer::spawn(options(&path, 0), stop.clone());

    append_raw(&path, "[12:00:00] [agent1] half");
    assert!(stays_quiet(&mut rx).await);

    append_raw(&path, " done\n");
    assert_eq!(next_line(&mut rx).await, "[12:00:00] [agent1] half done");
    stop.stop();
}

#[tokio::test]
async fn snapshot_leaves_partial_tail_for_tailer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.log");
    fs::write(&path, "[12:00:00] [human] whole\n[12:00:01] [agent1] wri").unwrap();

    let store = LogStore::new(&path);
    let snapshot = store.load_recent(100).unwrap();
    assert_eq!(snapshot.lines, vec!["[12:00:00] [human] whole".to_string()]);

    let stop = StopSignal::new();
    let (mut rx, _handle) = tailer::spawn(options(&path, snapshot.end_offset), stop.clone());
    append_raw(&path, "ting\n");

    assert_eq!(next_line(&mut rx).await, "[12:00:01] [agent1] writing");
    stop.stop();
}

#[tokio::test]
async fn stop_signal_ends_the_task() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.log");

    let stop = StopSignal::new();
    let (mut rx, handle) = tailer::spawn(options(&path, 0), stop.clone());
    stop.stop();

    timeout(WAIT, handle).await.unwrap().unwrap();
    // The sender is gone with the task.
    assert_eq!(timeout(WAIT, rx.recv()).await.unwrap(), None);
}

#[tokio::test]
async fn dropping_receiver_ends_the_task() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.log");
    fs::write(&path, "").unwrap();

    let (rx, handle) = tailer::spawn(options(&path, 0), StopSignal::new());
    drop(rx);
    append_raw(&path, "[12:00:00] [human] nobody listening\n");

    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn truncated_log_is_read_from_the_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.log");
    fs::write(&path, "[12:00:00] [human] first line of the old log\n").unwrap();
    let old_len = fs::metadata(&path).unwrap().len();

    let stop = StopSignal::new();
    let (mut rx, _handle) = tailer::spawn(options(&path, old_len), stop.clone());
    assert!(stays_quiet(&mut rx).await);

    fs::write(&path, "[13:00:00] [system] fresh\n").unwrap();
    assert_eq!(next_line(&mut rx).await, "[13:00:00] [system] fresh");
    stop.stop();
}

#[tokio::test]
async fn tailer_waits_for_missing_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.log");

    let stop = StopSignal::new();
    let (mut rx, _handle) = tailer::spawn(options(&path, 0), stop.clone());

    LogStore::new(&path)
        .append(&Message::new("12:00:00", "agent3", "first!"))
        .unwrap();
    assert_eq!(next_line(&mut rx).await, "[12:00:00] [agent3] first!");
    stop.stop();
}
