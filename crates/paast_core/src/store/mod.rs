//! Durable paste storage.
//!
//! Layout under the data directory:
//! - `counter.dat`: decimal text of the last allocated ordinal.
//! - `pastes/<ordinal:09>_<identifier>`: raw payload bytes of one paste.
//! - `paast.owner.lock`: held by the owning process.

mod counter;
pub mod lock;
mod verify;

pub use verify::VerifyReport;

use crate::codec::IdCodec;
use crate::config::Config;
use crate::constants::{COUNTER_FILE_NAME, ID_ALPHABET, ID_MIN_LENGTH, PASTES_DIR_NAME};
use crate::error::AppError;
use crate::models::{PasteRecord, RecordKey};
use counter::CounterRecord;
use lock::{acquire_owner_lock, OwnerLockGuard};
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Allocates ordinals and persists paste records.
///
/// One instance owns a data directory for its lifetime. Allocation is a
/// single critical section (counter advance plus record write), so ordinals
/// are unique and each is durable before any later one is handed out.
/// Reads take no lock.
#[derive(Debug)]
pub struct PasteStore {
    data_dir: PathBuf,
    pastes_dir: PathBuf,
    codec: IdCodec,
    max_paste_size: usize,
    counter: Mutex<CounterRecord>,
    _owner_lock: OwnerLockGuard,
}

impl PasteStore {
    /// Open the store described by `config`.
    ///
    /// # Errors
    /// Returns [`AppError::Codec`] for an invalid codec configuration and a
    /// storage error when the data directory cannot be prepared or is owned
    /// by another process.
    pub fn open(config: &Config) -> Result<Self, AppError> {
        let codec = IdCodec::new(&config.id_salt, ID_ALPHABET, ID_MIN_LENGTH)?;
        Self::open_with_codec(&config.data_dir, codec, config.max_paste_size)
    }

    /// Open a store rooted at `data_dir` with an explicit codec.
    ///
    /// Creates the data directory, the pastes directory, and an empty counter
    /// record when missing.
    ///
    /// # Arguments
    /// - `data_dir`: Root directory of the store.
    /// - `codec`: Identifier codec used for every record.
    /// - `max_paste_size`: Largest accepted payload in bytes.
    ///
    /// # Errors
    /// Returns a storage error if the layout cannot be created or another
    /// process owns `data_dir`.
    pub fn open_with_codec(
        data_dir: impl AsRef<Path>,
        codec: IdCodec,
        max_paste_size: usize,
    ) -> Result<Self, AppError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let pastes_dir = data_dir.join(PASTES_DIR_NAME);
        fs::create_dir_all(&pastes_dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to prepare pastes directory '{}': {}",
                pastes_dir.display(),
                err
            ))
        })?;

        let owner_lock = acquire_owner_lock(&data_dir)?;
        let counter = CounterRecord::open(&data_dir.join(COUNTER_FILE_NAME))?;

        Ok(Self {
            data_dir,
            pastes_dir,
            codec,
            max_paste_size,
            counter: Mutex::new(counter),
            _owner_lock: owner_lock,
        })
    }

    /// Root directory of this store.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Codec used to derive identifiers.
    pub fn codec(&self) -> &IdCodec {
        &self.codec
    }

    /// Largest accepted payload in bytes.
    pub fn max_paste_size(&self) -> usize {
        self.max_paste_size
    }

    /// Path of the record file for `key`.
    pub fn record_path(&self, key: &RecordKey) -> PathBuf {
        self.pastes_dir.join(key.file_name())
    }

    /// Allocate an ordinal for `payload` and persist it.
    ///
    /// # Returns
    /// The public identifier of the new paste.
    ///
    /// # Errors
    /// - [`AppError::EmptyPaste`] / [`AppError::PasteTooLarge`] before any
    ///   ordinal is consumed.
    /// - A storage error if the counter or record cannot be written. When the
    ///   counter advanced but the record write failed, that ordinal is lost.
    pub fn allocate(&self, payload: &[u8]) -> Result<String, AppError> {
        if payload.is_empty() {
            return Err(AppError::EmptyPaste);
        }
        if payload.len() > self.max_paste_size {
            return Err(AppError::PasteTooLarge {
                limit: self.max_paste_size,
            });
        }

        let mut counter = self
            .counter
            .lock()
            .map_err(|_| AppError::LockPoisoned("counter"))?;
        let ordinal = counter.advance()?;
        let key = RecordKey::new(ordinal, self.codec.encode(ordinal));
        self.write_record(&key, payload)?;
        drop(counter);

        tracing::debug!(
            ordinal,
            identifier = %key.identifier,
            bytes = payload.len(),
            "paste stored"
        );
        Ok(key.identifier)
    }

    /// Read the payload stored under `identifier`.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when the identifier does not decode under the
    /// current salt or no record exists for it; a storage error for any other
    /// read failure.
    pub fn resolve(&self, identifier: &str) -> Result<Vec<u8>, AppError> {
        let Some(ordinal) = self.codec.decode(identifier) else {
            return Err(AppError::NotFound(identifier.to_string()));
        };
        let key = RecordKey::new(ordinal, identifier);
        self.read_record(&key)
    }

    /// Locate a record by ordinal alone.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when no record exists for `ordinal`.
    pub fn resolve_ordinal(&self, ordinal: u64) -> Result<PasteRecord, AppError> {
        let key = RecordKey::new(ordinal, self.codec.encode(ordinal));
        let content = self.read_record(&key)?;
        Ok(PasteRecord { key, content })
    }

    /// Last allocated ordinal (0 before the first paste).
    pub fn current_ordinal(&self) -> Result<u64, AppError> {
        self.counter
            .lock()
            .map_err(|_| AppError::LockPoisoned("counter"))?
            .read()
    }

    fn read_record(&self, key: &RecordKey) -> Result<Vec<u8>, AppError> {
        match fs::read(self.record_path(key)) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound(key.identifier.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write_record(&self, key: &RecordKey, payload: &[u8]) -> Result<(), AppError> {
        let path = self.record_path(key);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| {
                AppError::StorageMessage(format!(
                    "Failed to create record '{}': {}",
                    path.display(),
                    err
                ))
            })?;

        let written = file
            .write_all(payload)
            .and_then(|()| file.sync_data())
            .and_then(|()| sync_dir(&self.pastes_dir));
        if let Err(err) = written {
            drop(file);
            if let Err(remove_err) = fs::remove_file(&path) {
                tracing::warn!(
                    "Failed to remove partial record {:?}: {}",
                    path,
                    remove_err
                );
            }
            return Err(err.into());
        }
        Ok(())
    }
}

/// Flush a directory so entries created in it survive a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
