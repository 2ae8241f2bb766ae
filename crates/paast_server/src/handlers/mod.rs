//! HTTP request handlers.

/// Usage page.
pub mod manpage;
/// Paste creation and retrieval.
pub mod paste;
