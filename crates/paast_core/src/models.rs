//! Paste record keys and records.

use crate::constants::ORDINAL_WIDTH;
use std::fmt;

/// Storage key binding an ordinal to its identifier.
///
/// Rendered as the record file name `{ordinal:09}_{identifier}`, which lets a
/// record be found by either half without a secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub ordinal: u64,
    pub identifier: String,
}

impl RecordKey {
    /// Construct a key from its parts.
    pub fn new(ordinal: u64, identifier: impl Into<String>) -> Self {
        Self {
            ordinal,
            identifier: identifier.into(),
        }
    }

    /// Record file name for this key.
    pub fn file_name(&self) -> String {
        format!(
            "{:0width$}_{}",
            self.ordinal,
            self.identifier,
            width = ORDINAL_WIDTH
        )
    }

    /// Parse a record file name back into a key.
    ///
    /// # Returns
    /// `None` when the name is not `<digits>_<identifier>` with at least
    /// the zero-padded ordinal width and a non-empty identifier.
    pub fn parse_file_name(name: &str) -> Option<Self> {
        let (digits, identifier) = name.split_once('_')?;
        if digits.len() < ORDINAL_WIDTH
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || identifier.is_empty()
        {
            return None;
        }
        let ordinal = digits.parse().ok()?;
        Some(Self::new(ordinal, identifier))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// An immutable stored paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteRecord {
    pub key: RecordKey,
    pub content: Vec<u8>,
}
