//! Shared constants used across paast crates.

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default maximum paste size (and request body size) in bytes.
pub const DEFAULT_MAX_PASTE_SIZE: usize = 1 << 20;

/// Default cooldown between accepted submissions from one client address.
pub const DEFAULT_PASTE_COOLDOWN_SECS: u64 = 5;

/// Default on-disk data directory.
pub const DEFAULT_DATA_DIR: &str = "/var/lib/paast";

/// Alphabet public identifiers are drawn from.
pub const ID_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz1234567890";

/// Minimum identifier length.
pub const ID_MIN_LENGTH: usize = 3;

/// Counter record file name inside the data directory.
pub const COUNTER_FILE_NAME: &str = "counter.dat";

/// Subdirectory holding paste records.
pub const PASTES_DIR_NAME: &str = "pastes";

/// Owner lock file held for the lifetime of an open store.
pub const OWNER_LOCK_FILE_NAME: &str = "paast.owner.lock";

/// Width of the zero-padded ordinal prefix in record file names.
pub const ORDINAL_WIDTH: usize = 9;
