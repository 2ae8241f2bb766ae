//! Offline consistency check of the on-disk layout.

use super::PasteStore;
use crate::error::AppError;
use crate::models::RecordKey;
use serde::Serialize;
use std::fs;

/// Result of [`PasteStore::verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Value of the counter record.
    pub counter: u64,
    /// Files that parse as record keys.
    pub records: usize,
    /// Highest ordinal among parsed records.
    pub highest_ordinal: u64,
    /// Entries in the pastes directory that are not record files.
    pub unrecognized_files: Vec<String>,
    /// Records whose identifier does not decode to their ordinal, usually
    /// because `ID_SALT` changed after they were written.
    pub undecodable_records: Vec<String>,
    /// The counter is below `highest_ordinal`; new allocations would collide.
    pub counter_behind_records: bool,
}

impl VerifyReport {
    /// Whether the store passed every check.
    pub fn is_clean(&self) -> bool {
        self.unrecognized_files.is_empty()
            && self.undecodable_records.is_empty()
            && !self.counter_behind_records
    }
}

impl PasteStore {
    /// Scan every record and check it against the counter and codec.
    ///
    /// # Errors
    /// Returns a storage error when the pastes directory or counter cannot be
    /// read. Inconsistencies are reported, not raised.
    pub fn verify(&self) -> Result<VerifyReport, AppError> {
        let mut report = VerifyReport {
            counter: self.current_ordinal()?,
            ..VerifyReport::default()
        };

        for entry in fs::read_dir(&self.pastes_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = match RecordKey::parse_file_name(&name) {
                Some(key) if entry.file_type()?.is_file() => key,
                _ => {
                    report.unrecognized_files.push(name);
                    continue;
                }
            };

            report.records += 1;
            report.highest_ordinal = report.highest_ordinal.max(key.ordinal);
            if self.codec.decode(&key.identifier) != Some(key.ordinal) {
                report.undecodable_records.push(name);
            }
        }

        report.counter_behind_records = report.counter < report.highest_ordinal;
        report.unrecognized_files.sort();
        report.undecodable_records.sort();

        if !report.is_clean() {
            tracing::warn!(
                unrecognized = report.unrecognized_files.len(),
                undecodable = report.undecodable_records.len(),
                counter_behind = report.counter_behind_records,
                "store verification found problems"
            );
        }
        Ok(report)
    }
}
