//! Core domain library for paast (config, identifier codec, storage, throttling).

/// Reversible ordinal <-> identifier codec.
pub mod codec;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Process-global environment helpers.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Record keys and paste records.
pub mod models;
/// Durable paste storage: counter, records, ownership lock.
pub mod store;
/// Per-client submission cooldown.
pub mod throttle;

#[cfg(test)]
pub(crate) mod test_support;

pub use codec::{CodecError, IdCodec};
pub use config::Config;
pub use constants::{
    DEFAULT_DATA_DIR, DEFAULT_MAX_PASTE_SIZE, DEFAULT_PASTE_COOLDOWN_SECS, DEFAULT_PORT,
    ID_ALPHABET, ID_MIN_LENGTH,
};
pub use error::AppError;
pub use models::{PasteRecord, RecordKey};
pub use store::{PasteStore, VerifyReport};
pub use throttle::{client_key, ip_key, SubmissionThrottle, ThrottleDecision};
