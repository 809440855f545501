//! Log tailing: discovery, seek-to-end polling reads, rotation recovery.
//!
//! The tailer is cooperative: `poll` drains whatever complete lines are
//! available and returns; the caller owns the sleep between polls. Between
//! polls the file's length (and inode on Unix) is checked so a rotated or
//! truncated log is reopened instead of going silent.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::core::errors::{Result, WardenError};

/// One raw line read from the tailed file.
#[derive(Debug, Clone)]
pub struct LogLine {
    /// Line text without the trailing newline.
    pub text: String,
    /// Arrival time (when the tailer read it, not when it was written).
    pub observed_at: DateTime<Utc>,
    /// File the line came from.
    pub source: PathBuf,
}

/// Polling tailer for a single log file.
///
/// An I/O error from `poll` is fatal to this instance; the caller decides
/// whether to surface it as a top-level failure.
#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    reader: BufReader<File>,
    /// Bytes of the file consumed so far; compared against the on-disk
    /// length to detect truncation.
    consumed: u64,
    inode: Option<u64>,
    partial: String,
}

impl LogTailer {
    /// Open `path` and seek to its end; only lines appended afterwards are
    /// observed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| WardenError::io(&path, source))?;
        let metadata = file
            .metadata()
            .map_err(|source| WardenError::io(&path, source))?;
        let len = metadata.len();
        let inode = inode_of(&metadata);
        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::End(0))
            .map_err(|source| WardenError::io(&path, source))?;
        info!(path = %path.display(), offset = len, "tailing log file");
        Ok(Self {
            path,
            reader,
            consumed: len,
            inode,
            partial: String::new(),
        })
    }

    /// Path of the tailed file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain all complete lines currently available.
    ///
    /// Returns an empty vector when no new data has arrived. Incomplete
    /// trailing data is buffered until its newline shows up.
    pub fn poll(&mut self) -> Result<Vec<LogLine>> {
        self.check_rotation()?;

        let mut lines = Vec::new();
        loop {
            let mut chunk = String::new();
            let read = self
                .reader
                .read_line(&mut chunk)
                .map_err(|source| WardenError::io(&self.path, source))?;
            if read == 0 {
                break;
            }
            self.consumed += read as u64;
            if chunk.ends_with('\n') {
                let mut text = std::mem::take(&mut self.partial);
                text.push_str(chunk.trim_end_matches(['\n', '\r']));
                lines.push(LogLine {
                    text,
                    observed_at: Utc::now(),
                    source: self.path.clone(),
                });
            } else {
                // Writer mid-line; keep the fragment for the next poll.
                self.partial.push_str(&chunk);
                break;
            }
        }
        Ok(lines)
    }

    /// Reopen the file from the start when it was rotated or truncated
    /// underneath us.
    fn check_rotation(&mut self) -> Result<()> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            // The file may be mid-rotation; the open handle still reads the
            // original inode, so keep going and check again next poll.
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "log file missing, keeping old handle");
                return Ok(());
            }
            Err(source) => return Err(WardenError::io(&self.path, source)),
        };

        let inode = inode_of(&metadata);
        let rotated = inode != self.inode;
        let truncated = metadata.len() < self.consumed;
        if !rotated && !truncated {
            return Ok(());
        }

        warn!(
            path = %self.path.display(),
            rotated,
            truncated,
            "log file replaced, reopening from start"
        );
        let file = File::open(&self.path).map_err(|source| WardenError::io(&self.path, source))?;
        self.inode = inode_of(
            &file
                .metadata()
                .map_err(|source| WardenError::io(&self.path, source))?,
        );
        self.reader = BufReader::new(file);
        self.consumed = 0;
        self.partial.clear();
        Ok(())
    }
}

#[cfg(unix)]
fn inode_of(metadata: &std::fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.ino())
}

#[cfg(not(unix))]
fn inode_of(_metadata: &std::fs::Metadata) -> Option<u64> {
    None
}

/// List candidate log files under `path`.
///
/// A file path is returned as-is. For a directory, every `*.log` entry is
/// collected in name order, with `primary` moved to the front when present.
/// Finding nothing is an error: a monitor with no file to watch cannot run.
pub fn discover_log_files(path: &Path, primary: &str) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let entries = std::fs::read_dir(path).map_err(|source| WardenError::io(path, source))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|candidate| {
            candidate.is_file() && candidate.extension().is_some_and(|ext| ext == "log")
        })
        .collect();
    files.sort();
    if let Some(index) = files
        .iter()
        .position(|candidate| candidate.file_name().is_some_and(|name| name == primary))
        && index > 0
    {
        let main = files.remove(index);
        files.insert(0, main);
    }
    if files.is_empty() {
        return Err(WardenError::NoLogFiles {
            path: path.to_path_buf(),
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::{LogTailer, discover_log_files};
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::path::Path;

    fn append(path: &Path, text: &str) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(path)
            .expect("open for append");
        file.write_all(text.as_bytes()).expect("append");
        file.flush().expect("flush");
    }

    #[test]
    fn history_before_open_is_not_replayed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("server.log");
        std::fs::write(&log, "old line one\nold line two\n").expect("seed file");

        let mut tailer = LogTailer::open(&log).expect("open tailer");
        assert!(tailer.poll().expect("poll").is_empty());

        append(&log, "fresh line\n");
        let lines = tailer.poll().expect("poll");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "fresh line");
    }

    #[test]
    fn incomplete_line_waits_for_its_newline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("server.log");
        std::fs::write(&log, "").expect("seed file");

        let mut tailer = LogTailer::open(&log).expect("open tailer");
        append(&log, "ERROR: datab");
        assert!(tailer.poll().expect("poll").is_empty());

        append(&log, "ase corruption\n");
        let lines = tailer.poll().expect("poll");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "ERROR: database corruption");
    }

    #[test]
    fn truncated_file_is_reopened_and_still_observed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("server.log");
        std::fs::write(&log, "line before truncation\n").expect("seed file");

        let mut tailer = LogTailer::open(&log).expect("open tailer");
        std::fs::write(&log, "").expect("truncate");
        assert!(tailer.poll().expect("poll after truncate").is_empty());

        append(&log, "line after truncation\n");
        let lines = tailer.poll().expect("poll");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "line after truncation");
    }

    #[test]
    fn rotated_file_is_reopened_from_start() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("server.log");
        std::fs::write(&log, "pre-rotation content\n").expect("seed file");

        let mut tailer = LogTailer::open(&log).expect("open tailer");
        let rotated = dir.path().join("server.log.1");
        std::fs::rename(&log, &rotated).expect("rotate away");
        std::fs::write(&log, "first line of new file\n").expect("new file");

        let lines = tailer.poll().expect("poll after rotation");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "first line of new file");
    }

    #[test]
    fn discovery_puts_the_primary_log_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Transcoder.log"), "").expect("write");
        std::fs::write(dir.path().join("Media Server.log"), "").expect("write");
        std::fs::write(dir.path().join("notes.txt"), "").expect("write");

        let files =
            discover_log_files(dir.path(), "Media Server.log").expect("discovery succeeds");
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("Media Server.log"));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = discover_log_files(dir.path(), "Media Server.log")
            .expect_err("no logs must be an error");
        assert_eq!(err.code(), "MLW-2001");
    }
}
