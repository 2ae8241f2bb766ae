//! Durable ordinal counter record (`counter.dat`).
//!
//! The record holds the decimal ASCII text of the last allocated ordinal,
//! with no trailing newline. A missing or empty record reads as 0.

use crate::error::AppError;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Open handle on the counter record. Callers serialize access.
#[derive(Debug)]
pub(super) struct CounterRecord {
    path: PathBuf,
    file: File,
}

impl CounterRecord {
    pub(super) fn open(path: &Path) -> Result<Self, AppError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Current ordinal without changing it.
    pub(super) fn read(&mut self) -> Result<u64, AppError> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut raw = String::new();
        self.file.read_to_string(&mut raw)?;
        parse_counter(&raw).ok_or_else(|| {
            AppError::StorageMessage(format!(
                "Counter record '{}' is corrupt: {:?}",
                self.path.display(),
                raw
            ))
        })
    }

    /// Increment the counter and make the new value durable.
    ///
    /// # Returns
    /// The newly allocated ordinal. It is on disk before this returns, so a
    /// crash afterwards burns the ordinal instead of reusing it.
    pub(super) fn advance(&mut self) -> Result<u64, AppError> {
        let next = self.read()?.checked_add(1).ok_or_else(|| {
            AppError::StorageMessage("Counter record overflowed".to_string())
        })?;
        self.write(next)?;
        Ok(next)
    }

    fn write(&mut self, value: u64) -> Result<(), AppError> {
        let text = value.to_string();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(text.as_bytes())?;
        self.file.set_len(text.len() as u64)?;
        self.file.sync_data()?;
        Ok(())
    }
}

fn parse_counter(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_counter, CounterRecord};
    use tempfile::TempDir;

    #[test]
    fn parse_counter_handles_empty_and_whitespace() {
        assert_eq!(parse_counter(""), Some(0));
        assert_eq!(parse_counter("17"), Some(17));
        assert_eq!(parse_counter(" 17\n"), Some(17));
        assert_eq!(parse_counter("seventeen"), None);
        assert_eq!(parse_counter("-3"), None);
    }

    #[test]
    fn advance_writes_plain_decimal_text() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("counter.dat");
        let mut counter = CounterRecord::open(&path).expect("open");

        assert_eq!(counter.read().expect("read"), 0);
        for expected in 1..=10 {
            assert_eq!(counter.advance().expect("advance"), expected);
        }
        assert_eq!(std::fs::read(&path).expect("raw"), b"10");
    }

    #[test]
    fn existing_counter_is_continued() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("counter.dat");
        std::fs::write(&path, "999").expect("seed");

        let mut counter = CounterRecord::open(&path).expect("open");
        assert_eq!(counter.advance().expect("advance"), 1000);
        assert_eq!(std::fs::read_to_string(&path).expect("raw"), "1000");
    }

    #[test]
    fn corrupt_counter_is_a_storage_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("counter.dat");
        std::fs::write(&path, "garbage").expect("seed");

        let mut counter = CounterRecord::open(&path).expect("open");
        let err = counter.advance().expect_err("corrupt counter must not reset");
        assert!(err.to_string().contains("corrupt"), "{err}");
        assert_eq!(std::fs::read_to_string(&path).expect("raw"), "garbage");
    }
}
