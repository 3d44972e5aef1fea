//! Warehouses: one transactional multi-graph store per tenant
//!
//! A [`Warehouse`] wraps an embedded oxigraph [`Store`] behind a reader/writer lock.
//! All access goes through a [`Transaction`]: readers share the lock, a writer holds
//! it exclusively until its staged operations are committed or discarded.

mod registry;
mod transaction;

pub use registry::WarehouseRegistry;
pub use transaction::{Transaction, TxMode};

use oxigraph::store::{StorageError, Store};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

/// Warehouse errors
#[derive(Error, Debug)]
pub enum WarehouseError {
    /// Warehouse not found
    #[error("Warehouse not found: {0}")]
    NotFound(String),

    /// Warehouse already exists
    #[error("Warehouse already exists: {0}")]
    AlreadyExists(String),

    /// Name not usable as a warehouse or store name
    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    /// Write attempted through a read transaction
    #[error("Transaction is read-only")]
    ReadOnly,

    /// Engine-level storage failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),

    /// Query evaluation failed inside the engine
    #[error("Query evaluation failed: {0}")]
    QueryEvaluation(String),

    /// IO error on the warehouse directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// A tenant-scoped dataset of named graphs plus a default graph
pub struct Warehouse {
    name: String,
    path: Option<PathBuf>,
    store: Store,
    lock: RwLock<()>,
}

impl Warehouse {
    /// Open a warehouse, on disk when `path` is given, in memory otherwise
    pub fn open(name: impl Into<String>, path: Option<&Path>) -> WarehouseResult<Self> {
        let name = name.into();
        let store = match path {
            Some(path) => Store::open(path)?,
            None => Store::new()?,
        };
        debug!("Opened warehouse '{}' at {:?}", name, path);
        Ok(Self {
            name,
            path: path.map(Path::to_path_buf),
            store,
            lock: RwLock::new(()),
        })
    }

    /// Warehouse name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store directory, if durable
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Begin a transaction, blocking until the lock is available
    pub fn begin(&self, mode: TxMode) -> Transaction<'_> {
        match mode {
            TxMode::Read => {
                let guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
                Transaction::read(self, guard)
            }
            TxMode::Write => {
                let guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
                Transaction::write(self, guard)
            }
        }
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }
}

impl std::fmt::Debug for Warehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warehouse")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}
