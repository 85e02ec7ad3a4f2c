//! # Log Store
//!
//! The shared chat log: a plain text file that every participant only ever
//! appends to. It is the single source of truth for the conversation.
//!
//! Writers are not coordinated. Each append is one `write_all` on a file
//! opened with `O_APPEND`, which keeps whole lines together for the short
//! lines chat produces, but nothing here locks the file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::core::message::Message;

/// History read at startup, plus the offset the tailer should continue from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The most recent complete lines, oldest first, without terminators.
    pub lines: Vec<String>,
    /// Byte offset just past the last complete line.
    pub end_offset: u64,
}

#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log file (and its parent directories) if missing.
    pub fn ensure(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        debug!("Log store ready at {}", self.path.display());
        Ok(())
    }

    /// Append one message as a single line.
    pub fn append(&self, message: &Message) -> io::Result<()> {
        let mut line = message.to_line();
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        debug!("Appended {} bytes from [{}]", line.len(), message.sender);
        Ok(())
    }

    /// Read the last `max_lines` complete lines.
    ///
    /// A trailing line without its newline is a write still in progress: it is
    /// left out, and `end_offset` points at its start so the tailer will pick
    /// it up once it is finished. A missing file yields an empty snapshot.
    ///
    /// The file is read backwards from the end in fixed-size chunks, so the
    /// cost depends on how much history is asked for, not on the log's size.
    pub fn load_recent(&self, max_lines: usize) -> io::Result<Snapshot> {
        self.load_recent_in_chunks(max_lines, TAIL_CHUNK)
    }

    fn load_recent_in_chunks(&self, max_lines: usize, chunk: u64) -> io::Result<Snapshot> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Snapshot::default()),
            Err(e) => return Err(e),
        };

        let len = file.metadata()?.len();
        let (start, tail) = read_tail(&mut file, len, max_lines, chunk.max(1))?;

        let complete_len = tail
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let mut complete = &tail[..complete_len];
        if start > 0 {
            // The chunk began mid-line; that line is older than what we keep.
            let first_newline = complete.iter().position(|&b| b == b'\n').map_or(0, |i| i + 1);
            complete = &complete[first_newline..];
        }

        let text = String::from_utf8_lossy(complete);
        let all: Vec<&str> = text.lines().collect();
        let skip = all.len().saturating_sub(max_lines);
        let lines = all[skip..].iter().map(|l| l.to_string()).collect::<Vec<_>>();
        let end_offset = start + complete_len as u64;

        info!(
            "Loaded {} history lines from {} (offset {})",
            lines.len(),
            self.path.display(),
            end_offset
        );

        Ok(Snapshot { lines, end_offset })
    }
}

/// Bytes read backwards from the end per step of `load_recent`.
const TAIL_CHUNK: u64 = 64 * 1024;

/// Read the end of the file until it holds more than `max_lines` newlines or
/// the whole file has been read. Returns the offset the bytes start at.
fn read_tail(file: &mut File, len: u64, max_lines: usize, chunk: u64) -> io::Result<(u64, Vec<u8>)> {
    let mut start = len;
    let mut tail: Vec<u8> = Vec::new();
    let mut newlines = 0;

    while start > 0 && newlines <= max_lines {
        let from = start.saturating_sub(chunk);
        let mut block = vec![0u8; (start - from) as usize];
        file.seek(SeekFrom::Start(from))?;
        file.read_exact(&mut block)?;

        newlines += block.iter().filter(|&&b| b == b'\n').count();
        block.extend_from_slice(&tail);
        tail = block;
        start = from;
    }

    debug!("Read {} of {} bytes for history", tail.len(), len);
    Ok((start, tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("nested").join("chat.log"));
        store.ensure().unwrap();
        assert!(store.path().exists());
        // Idempotent and non-destructive
        fs::write(store.path(), "keep\n").unwrap();
        store.ensure().unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "keep\n");
    }

    #[test]
    fn append_writes_one_line_per_message() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("chat.log"));
        store.append(&Message::new("12:00:00", "human", "hello")).unwrap();
        store
            .append(&Message::new("12:00:01", "agent1", "multi\nline"))
            .unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            contents,
            "[12:00:00] [human] hello\n[12:00:01] [agent1] multi line\n"
        );
    }

    #[test]
    fn load_recent_keeps_tail_and_skips_torn_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("chat.log"));
        fs::write(store.path(), "one\ntwo\nthree\npart").unwrap();

        let snapshot = store.load_recent(2).unwrap();
        assert_eq!(snapshot.lines, vec!["two", "three"]);
        assert_eq!(snapshot.end_offset, "one\ntwo\nthree\n".len() as u64);
    }

    #[test]
    fn small_chunks_match_whole_file_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("chat.log"));
        let mut contents: String = (0..50)
            .map(|i| format!("[12:00:{:02}] [agent{}] line number {i}\n", i % 60, i % 3))
            .collect();
        contents.push_str("[12:01:00] [human] still typ");
        fs::write(store.path(), &contents).unwrap();

        let whole = store.load_recent_in_chunks(5, u64::MAX).unwrap();
        for chunk in [1, 3, 7, 16, 64, 1000] {
            assert_eq!(store.load_recent_in_chunks(5, chunk).unwrap(), whole, "chunk {chunk}");
        }
        assert_eq!(whole.lines.len(), 5);
        assert!(whole.lines[4].ends_with("line number 49"));
        assert_eq!(
            whole.end_offset,
            (contents.len() - "[12:01:00] [human] still typ".len()) as u64
        );
    }

    #[test]
    fn load_recent_reads_only_the_tail() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("chat.log"));
        let contents: String = (0..1000).map(|i| format!("line {i}\n")).collect();
        fs::write(store.path(), &contents).unwrap();

        let mut file = File::open(store.path()).unwrap();
        let (start, tail) = read_tail(&mut file, contents.len() as u64, 3, 16).unwrap();
        assert!(start > 0);
        assert!(tail.len() < 64);

        let snapshot = store.load_recent_in_chunks(3, 16).unwrap();
        assert_eq!(snapshot.lines, vec!["line 997", "line 998", "line 999"]);
        assert_eq!(snapshot.end_offset, contents.len() as u64);
    }

    #[test]
    fn load_recent_without_any_newline() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("chat.log"));
        fs::write(store.path(), "only a partial line").unwrap();
        let snapshot = store.load_recent_in_chunks(10, 4).unwrap();
        assert!(snapshot.lines.is_empty());
        assert_eq!(snapshot.end_offset, 0);
    }

    #[test]
    fn load_recent_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("absent.log"));
        assert_eq!(store.load_recent(100).unwrap(), Snapshot::default());
    }
}
