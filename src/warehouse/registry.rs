//! Warehouse registry
//!
//! Owns every open warehouse. In directory mode each subdirectory of the data root
//! is one warehouse, and all of them are opened at startup.

use super::{Warehouse, WarehouseError, WarehouseResult};
use crate::rdf::naming::is_valid_name;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Registry of warehouses by name
pub struct WarehouseRegistry {
    root: Option<PathBuf>,
    warehouses: RwLock<HashMap<String, Arc<Warehouse>>>,
}

impl WarehouseRegistry {
    /// Registry whose warehouses live in memory
    pub fn in_memory() -> Self {
        info!("Warehouse registry initialized in memory");
        Self {
            root: None,
            warehouses: RwLock::new(HashMap::new()),
        }
    }

    /// Registry rooted at a data directory, opening the warehouses found there
    pub fn open(root: impl AsRef<Path>) -> WarehouseResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let mut warehouses = HashMap::new();
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_valid_name(&name) {
                warn!("Skipping directory with invalid warehouse name: {:?}", entry.path());
                continue;
            }
            let warehouse = Warehouse::open(name.clone(), Some(&entry.path()))?;
            warehouses.insert(name, Arc::new(warehouse));
        }

        info!(
            "Warehouse registry opened at {:?} with {} warehouses",
            root,
            warehouses.len()
        );
        Ok(Self {
            root: Some(root),
            warehouses: RwLock::new(warehouses),
        })
    }

    /// Data root, if durable
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Create a new warehouse
    pub fn create(&self, name: &str) -> WarehouseResult<Arc<Warehouse>> {
        if !is_valid_name(name) {
            return Err(WarehouseError::InvalidName(name.to_string()));
        }
        let mut warehouses = self.warehouses.write().unwrap_or_else(PoisonError::into_inner);
        if warehouses.contains_key(name) {
            return Err(WarehouseError::AlreadyExists(name.to_string()));
        }

        let path = self.root.as_ref().map(|root| root.join(name));
        let warehouse = Arc::new(Warehouse::open(name, path.as_deref())?);
        warehouses.insert(name.to_string(), Arc::clone(&warehouse));

        info!("Created warehouse: {}", name);
        Ok(warehouse)
    }

    /// Get a warehouse
    pub fn get(&self, name: &str) -> WarehouseResult<Arc<Warehouse>> {
        self.warehouses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| WarehouseError::NotFound(name.to_string()))
    }

    /// Whether a warehouse exists
    pub fn contains(&self, name: &str) -> bool {
        self.warehouses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Warehouse names, sorted
    pub fn list(&self) -> Vec<String> {
        let warehouses = self.warehouses.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = warehouses.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove a warehouse and its directory
    pub fn remove(&self, name: &str) -> WarehouseResult<()> {
        let removed = self
            .warehouses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .ok_or_else(|| WarehouseError::NotFound(name.to_string()))?;

        if let Some(path) = removed.path() {
            let path = path.to_path_buf();
            drop(removed);
            if path.exists() {
                fs::remove_dir_all(&path)?;
                debug!("Removed warehouse directory {:?}", path);
            }
        }

        info!("Deleted warehouse: {}", name);
        Ok(())
    }
}

impl Default for WarehouseRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_get_list_remove() {
        let registry = WarehouseRegistry::in_memory();
        registry.create("beta").unwrap();
        registry.create("alpha").unwrap();

        assert_eq!(registry.list(), vec!["alpha", "beta"]);
        assert_eq!(registry.get("alpha").unwrap().name(), "alpha");
        assert!(matches!(
            registry.create("alpha"),
            Err(WarehouseError::AlreadyExists(_))
        ));

        registry.remove("alpha").unwrap();
        assert!(matches!(registry.get("alpha"), Err(WarehouseError::NotFound(_))));
        assert!(matches!(registry.remove("alpha"), Err(WarehouseError::NotFound(_))));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let registry = WarehouseRegistry::in_memory();
        assert!(matches!(
            registry.create("../escape"),
            Err(WarehouseError::InvalidName(_))
        ));
        assert!(matches!(registry.create(""), Err(WarehouseError::InvalidName(_))));
    }
}
