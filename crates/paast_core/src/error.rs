//! Application error types for core storage and domain logic.
use crate::codec::CodecError;
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Paste is empty")]
    EmptyPaste,

    #[error("Paste size exceeds maximum of {limit} bytes")]
    PasteTooLarge { limit: usize },

    #[error("Paste with id \"{0}\" was not found")]
    NotFound(String),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0} lock is poisoned")]
    LockPoisoned(&'static str),
}

impl AppError {
    /// Whether this error is caused by the client rather than the server.
    ///
    /// # Returns
    /// `true` for input, lookup, and throttling errors.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyPaste
                | Self::PasteTooLarge { .. }
                | Self::NotFound(_)
                | Self::RateLimited { .. }
                | Self::BadRequest(_)
        )
    }
}
