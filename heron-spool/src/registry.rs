//! Printer pool registry
//!
//! Source of truth for configured printers. The persisted list is read
//! once per process into an in-memory cache; mutations write storage first
//! and only then the cache, under one lock, so the two never diverge.

use crate::storage::{PoolStorage, PoolStorageError};
use crate::types::PrinterTarget;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Printer id already exists: {0}")]
    DuplicateId(String),

    #[error("Printer id not found: {0}")]
    UnknownId(String),

    #[error(transparent)]
    Storage(#[from] PoolStorageError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry of configured printer targets
///
/// `None` in the cache means "not loaded yet"; `Some(vec![])` means loaded
/// with no printers configured. The lock is never held across I/O other
/// than the storage calls themselves, which are synchronous.
pub struct PrinterRegistry {
    storage: PoolStorage,
    cache: RwLock<Option<Vec<PrinterTarget>>>,
}

impl PrinterRegistry {
    pub fn new(storage: PoolStorage) -> Self {
        Self {
            storage,
            cache: RwLock::new(None),
        }
    }

    /// Populate the cache from storage, once
    ///
    /// Idempotent and safe to call from concurrent code paths; the write
    /// lock plus re-check means at most one caller reads storage. A read
    /// failure degrades to an empty pool instead of propagating, so
    /// callers see "no printers configured" rather than an error.
    pub fn load(&self) {
        if self.read_cache().is_some() {
            return;
        }

        let mut cache = self.write_cache();
        if cache.is_some() {
            return;
        }

        let targets = match self.storage.load_targets() {
            Ok(targets) => {
                info!(count = targets.len(), "Printer pool loaded");
                targets
            }
            Err(e) => {
                error!(error = %e, "Failed to load printer pool, starting empty");
                Vec::new()
            }
        };

        *cache = Some(targets);
    }

    /// Current in-memory set; no storage access
    pub fn list(&self) -> Vec<PrinterTarget> {
        self.read_cache().clone().unwrap_or_default()
    }

    /// Add a printer; rejects duplicate ids
    pub fn add(&self, target: PrinterTarget) -> RegistryResult<()> {
        self.load();

        let mut cache = self.write_cache();
        let current = cache.get_or_insert_with(Vec::new);

        if current.iter().any(|t| t.id == target.id) {
            return Err(RegistryError::DuplicateId(target.id));
        }

        let mut next = current.clone();
        next.push(target);

        self.storage.save_targets(&next)?;
        *current = next;
        Ok(())
    }

    /// Replace an existing printer's record, matched by id
    pub fn update(&self, target: PrinterTarget) -> RegistryResult<()> {
        self.load();

        let mut cache = self.write_cache();
        let current = cache.get_or_insert_with(Vec::new);

        let Some(pos) = current.iter().position(|t| t.id == target.id) else {
            return Err(RegistryError::UnknownId(target.id));
        };

        let mut next = current.clone();
        next[pos] = target;

        self.storage.save_targets(&next)?;
        *current = next;
        Ok(())
    }

    /// Remove a printer by id
    pub fn remove(&self, id: &str) -> RegistryResult<()> {
        self.load();

        let mut cache = self.write_cache();
        let current = cache.get_or_insert_with(Vec::new);

        if !current.iter().any(|t| t.id == id) {
            return Err(RegistryError::UnknownId(id.to_string()));
        }

        let next: Vec<PrinterTarget> = current.iter().filter(|t| t.id != id).cloned().collect();

        self.storage.save_targets(&next)?;
        *current = next;
        Ok(())
    }

    /// The authoritative target-selection query for the job queue:
    /// enabled, matching class, and a non-empty address
    pub fn enabled_targets_for(&self, class: &str) -> Vec<PrinterTarget> {
        self.read_cache()
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|t| t.enabled && t.class == class && !t.address.is_empty())
            .cloned()
            .collect()
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, Option<Vec<PrinterTarget>>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, Option<Vec<PrinterTarget>>> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }
}
