//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_MAX_PASTE_SIZE, DEFAULT_PASTE_COOLDOWN_SECS, DEFAULT_PORT,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for paast.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data_dir: String,
    /// Secret salt for the identifier codec, used verbatim.
    ///
    /// Changing it after pastes exist makes every previously issued
    /// identifier unresolvable. Run the store verification after any change.
    pub id_salt: String,
    pub port: u16,
    pub max_paste_size: usize,
    pub paste_cooldown_secs: u64,
    pub trust_proxy_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            id_salt: String::new(),
            port: DEFAULT_PORT,
            max_paste_size: DEFAULT_MAX_PASTE_SIZE,
            paste_cooldown_secs: DEFAULT_PASTE_COOLDOWN_SECS,
            trust_proxy_headers: false,
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}='{}', using default", name, raw);
            None
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env::var("DATA_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(expand_tilde)
                .unwrap_or(defaults.data_dir),
            id_salt: env::var("ID_SALT").unwrap_or(defaults.id_salt),
            port: env_parsed("PORT").unwrap_or(defaults.port),
            max_paste_size: env_parsed("MAX_PASTE_SIZE").unwrap_or(defaults.max_paste_size),
            paste_cooldown_secs: env_parsed("PASTE_COOLDOWN_SECS")
                .unwrap_or(defaults.paste_cooldown_secs),
            trust_proxy_headers: env_flag_enabled("TRUST_PROXY_HEADERS"),
        }
    }

    /// Cooldown between accepted submissions from one client address.
    pub fn paste_cooldown(&self) -> Duration {
        Duration::from_secs(self.paste_cooldown_secs)
    }
}
