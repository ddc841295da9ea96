//! Dataset store
//!
//! Owns the one in-memory [`Table`] behind a single mutex. The table is
//! empty at startup, filled lazily from the default workbook on first access,
//! and wholly replaced by uploads. The row count is mirrored in an atomic so
//! health checks never wait on the lock.

use crate::error::Result;
use crate::policy::apply_allow_list;
use crate::sheet::read_table_from_path;
use crate::table::Table;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Shared, lock-guarded inventory table
#[derive(Debug)]
pub struct DatasetStore {
    table: Mutex<Table>,
    rows: AtomicUsize,
    default_path: PathBuf,
}

impl DatasetStore {
    /// Create an empty store that falls back to `default_path` when empty
    pub fn new(default_path: impl Into<PathBuf>) -> Self {
        Self {
            table: Mutex::new(Table::default()),
            rows: AtomicUsize::new(0),
            default_path: default_path.into(),
        }
    }

    /// Path of the workbook loaded while the store is empty
    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    /// Read, parse and filter the default workbook
    pub fn load_default(&self) -> Result<Table> {
        let table = read_table_from_path(&self.default_path)?;
        apply_allow_list(table)
    }

    /// Load the default workbook if the table is empty.
    ///
    /// Best effort: any failure leaves the table empty and is only logged.
    /// The check, the read and the swap happen under one lock acquisition.
    pub fn ensure_loaded(&self) {
        let mut table = self.lock();
        if !table.is_empty() {
            return;
        }

        if !self.default_path.exists() {
            tracing::debug!(path = %self.default_path.display(), "No default dataset on disk");
            return;
        }

        match self.load_default() {
            Ok(loaded) => {
                tracing::info!(
                    path = %self.default_path.display(),
                    rows = loaded.len(),
                    "Loaded default dataset"
                );
                self.rows.store(loaded.len(), Ordering::Release);
                *table = loaded;
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.default_path.display(),
                    error = %e,
                    "Default dataset could not be loaded; keeping empty table"
                );
            }
        }
    }

    /// Run `f` against the current table while holding the lock
    pub fn read<R>(&self, f: impl FnOnce(&Table) -> R) -> R {
        f(&*self.lock())
    }

    /// Swap in a new table, returning its row count
    pub fn replace(&self, table: Table) -> usize {
        let rows = table.len();
        let mut guard = self.lock();
        *guard = table;
        self.rows.store(rows, Ordering::Release);
        rows
    }

    /// Current number of rows, without taking the lock or triggering a load
    pub fn len(&self) -> usize {
        self.rows.load(Ordering::Acquire)
    }

    /// True when no rows are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        // The table is only ever swapped whole, so a poisoned guard still holds
        // a consistent value.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
