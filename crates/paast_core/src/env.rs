//! Environment mutation helpers shared by configuration tests.
//!
//! `Config::from_env` reads process-global state, so every test that edits
//! the environment serializes on [`env_lock`] and restores values through
//! [`EnvGuard`].

use std::sync::{Mutex, OnceLock};

/// Process-wide mutex serializing environment mutation.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock()` while tests run in parallel.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Overrides one environment variable and restores the previous value on drop.
pub struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    fn replace(key: &str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        write_var(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }

    /// Set `key=value` until the guard drops.
    pub fn set(key: &str, value: &str) -> Self {
        Self::replace(key, Some(value))
    }

    /// Unset `key` until the guard drops.
    pub fn remove(key: &str) -> Self {
        Self::replace(key, None)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_var(&self.key, self.previous.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::{env_lock, EnvGuard};

    #[test]
    fn nested_guards_unwind_to_the_original_salt() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "PAAST_TEST_SALT_OVERRIDE";
        let _outer = EnvGuard::set(key, "first");
        {
            let _inner = EnvGuard::set(key, "second");
            assert_eq!(std::env::var(key).ok().as_deref(), Some("second"));
        }
        assert_eq!(std::env::var(key).ok().as_deref(), Some("first"));
    }

    #[test]
    fn removed_variable_stays_absent_after_drop() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "PAAST_TEST_UNSET_DATA_DIR";
        {
            let _removed = EnvGuard::remove(key);
            assert!(std::env::var(key).is_err());
        }
        assert!(std::env::var(key).is_err());
    }
}
