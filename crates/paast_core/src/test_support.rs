//! Shared test-only helpers for paast_core.

use crate::{IdCodec, PasteStore, DEFAULT_MAX_PASTE_SIZE, ID_ALPHABET, ID_MIN_LENGTH};
use std::path::Path;
use tempfile::TempDir;

/// Salt used by store tests.
pub(crate) const TEST_SALT: &str = "paast-test-salt";

/// Codec matching the production alphabet with [`TEST_SALT`].
pub(crate) fn test_codec() -> IdCodec {
    IdCodec::new(TEST_SALT, ID_ALPHABET, ID_MIN_LENGTH).expect("test codec")
}

/// Opens a store at `dir` with the test codec and default size limit.
pub(crate) fn open_store(dir: &Path) -> PasteStore {
    PasteStore::open_with_codec(dir, test_codec(), DEFAULT_MAX_PASTE_SIZE).expect("open store")
}

/// Creates an isolated store in a fresh temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
pub(crate) fn setup_temp_store() -> (PasteStore, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let store = open_store(temp_dir.path());
    (store, temp_dir)
}
