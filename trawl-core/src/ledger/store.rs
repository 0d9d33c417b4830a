//! Persistence backends for usage records.

use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;

use super::{LedgerError, UsageRecord};

/// Storage for a single usage record.
///
/// Keeps ledger logic independent of the storage medium; the ledger
/// persists through this trait after every mutation.
pub trait UsageStore: Send + Sync + std::fmt::Debug {
    /// Loads the persisted record, if any.
    ///
    /// # Errors
    /// - `LedgerError::Io` - Storage could not be read
    /// - `LedgerError::Corrupt` - Stored document did not parse
    fn load(&self) -> Result<Option<UsageRecord>, LedgerError>;

    /// Persists the record, replacing any previous one.
    ///
    /// # Errors
    /// - `LedgerError::Io` - Storage could not be written
    fn save(&self, record: &UsageRecord) -> Result<(), LedgerError>;
}

/// Flat JSON file store, one small document per ledger.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl UsageStore for JsonFileStore {
    fn load(&self) -> Result<Option<UsageRecord>, LedgerError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let record = serde_json::from_str(&contents).map_err(|e| LedgerError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(record))
    }

    fn save(&self, record: &UsageRecord) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(record).map_err(|e| LedgerError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory store for tests; no durability.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    record: Mutex<Option<UsageRecord>>,
}

impl InMemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a record, as if previously persisted.
    pub fn seeded(record: UsageRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl UsageStore for InMemoryStore {
    fn load(&self) -> Result<Option<UsageRecord>, LedgerError> {
        Ok(self.record.lock().clone())
    }

    fn save(&self, record: &UsageRecord) -> Result<(), LedgerError> {
        *self.record.lock() = Some(record.clone());
        Ok(())
    }
}
