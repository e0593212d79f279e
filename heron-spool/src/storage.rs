//! redb-based storage for the printer pool
//!
//! The whole pool is serialized as one JSON list under a well-known key
//! and rewritten in full on every mutation. Pools are small (a handful of
//! printers per store), so read-modify-write of the whole list keeps the
//! on-disk shape trivial.

use crate::types::PrinterTarget;
use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Printer pool table: key = pool key, value = JSON list
const PRINTER_POOL_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("printer_pool");

/// Well-known key the configured printer list lives under
const POOL_KEY: &str = "printers";

#[derive(Debug, Error)]
pub enum PoolStorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PoolStorageResult<T> = Result<T, PoolStorageError>;

/// Durable printer pool storage
#[derive(Clone)]
pub struct PoolStorage {
    db: Arc<Database>,
}

impl PoolStorage {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> PoolStorageResult<Self> {
        let db = Database::create(path)?;

        // Initialize table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PRINTER_POOL_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> PoolStorageResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PRINTER_POOL_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Read the persisted printer list; an absent key is an empty pool
    pub fn load_targets(&self) -> PoolStorageResult<Vec<PrinterTarget>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRINTER_POOL_TABLE)?;

        match table.get(POOL_KEY)? {
            Some(guard) => {
                let targets: Vec<PrinterTarget> = serde_json::from_slice(guard.value())?;
                Ok(targets)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Persist the full printer list, replacing the previous value
    pub fn save_targets(&self, targets: &[PrinterTarget]) -> PoolStorageResult<()> {
        let value = serde_json::to_vec(targets)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PRINTER_POOL_TABLE)?;
            table.insert(POOL_KEY, value.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Store arbitrary bytes under the pool key, bypassing serialization
    /// (for exercising corrupt-data handling in tests)
    #[cfg(test)]
    pub(crate) fn save_raw(&self, value: &[u8]) -> PoolStorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PRINTER_POOL_TABLE)?;
            table.insert(POOL_KEY, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str) -> PrinterTarget {
        PrinterTarget {
            id: id.to_string(),
            name: format!("Printer {}", id),
            address: "10.0.0.10".to_string(),
            port: 9100,
            class: "ethernet".to_string(),
            enabled: true,
        }
    }

    #[test]
    fn test_empty_pool_loads_empty() {
        let storage = PoolStorage::open_in_memory().unwrap();
        assert!(storage.load_targets().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let storage = PoolStorage::open_in_memory().unwrap();

        let targets = vec![target("p1"), target("p2")];
        storage.save_targets(&targets).unwrap();

        let loaded = storage.load_targets().unwrap();
        assert_eq!(loaded, targets);
    }

    #[test]
    fn test_save_replaces_whole_list() {
        let storage = PoolStorage::open_in_memory().unwrap();

        storage.save_targets(&[target("p1"), target("p2")]).unwrap();
        storage.save_targets(&[target("p3")]).unwrap();

        let loaded = storage.load_targets().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "p3");
    }

    #[test]
    fn test_corrupt_value_surfaces_as_error() {
        let storage = PoolStorage::open_in_memory().unwrap();
        storage.save_raw(b"not json").unwrap();

        assert!(matches!(
            storage.load_targets(),
            Err(PoolStorageError::Serialization(_))
        ));
    }
}
