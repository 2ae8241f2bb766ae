//! Single-process ownership of a data directory.

use crate::constants::OWNER_LOCK_FILE_NAME;
use crate::error::AppError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Holds an exclusive OS lock on `<data_dir>/paast.owner.lock` until dropped.
///
/// The counter record is only safe with one writer process, so a second
/// process opening the same data directory is refused instead of racing.
pub struct OwnerLockGuard {
    file: File,
    lock_path: PathBuf,
}

impl std::fmt::Debug for OwnerLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerLockGuard")
            .field("lock_path", &self.lock_path)
            .finish()
    }
}

impl Drop for OwnerLockGuard {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            tracing::warn!(
                "Failed to release owner lock {:?} during drop: {}",
                self.lock_path,
                err
            );
        }
    }
}

/// Acquire the owner lock for `data_dir`.
///
/// # Returns
/// [`OwnerLockGuard`] that keeps the lock held until dropped.
///
/// # Errors
/// Returns [`AppError::StorageMessage`] when the lock file cannot be opened or
/// another process already holds it.
pub fn acquire_owner_lock(data_dir: &Path) -> Result<OwnerLockGuard, AppError> {
    let lock_path = data_dir.join(OWNER_LOCK_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to open owner lock '{}': {}",
                lock_path.display(),
                err
            ))
        })?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(OwnerLockGuard { file, lock_path }),
        Err(err)
            if matches!(
                err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::PermissionDenied
            ) =>
        {
            Err(AppError::StorageMessage(format!(
                "Data directory '{}' is already owned by another paast process",
                data_dir.display()
            )))
        }
        Err(err) => Err(AppError::StorageMessage(format!(
            "Failed to acquire owner lock '{}': {}",
            lock_path.display(),
            err
        ))),
    }
}
