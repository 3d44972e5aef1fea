//! Wiring of the shared components

use crate::catalog::CatalogAdapter;
use crate::config::Config;
use crate::store::{ChangeBus, ChangeListener, StoreManager};
use crate::validation::ConstraintValidator;
use crate::warehouse::{WarehouseRegistry, WarehouseResult};
use std::sync::Arc;
use tracing::info;

/// Registry, validator, catalog and manager built once at startup
pub struct Shapehouse {
    config: Config,
    manager: StoreManager,
    catalog: Arc<CatalogAdapter>,
}

impl Shapehouse {
    /// Open warehouses and subscribe the caches to change notifications
    pub fn open(config: Config) -> WarehouseResult<Self> {
        let registry = Arc::new(match &config.data_dir {
            Some(dir) => WarehouseRegistry::open(dir)?,
            None => WarehouseRegistry::in_memory(),
        });
        let events = Arc::new(ChangeBus::new());
        let validator = Arc::new(ConstraintValidator::new(config.open_world));
        let catalog = Arc::new(CatalogAdapter::new(config.base_uri.clone(), Arc::clone(&registry)));
        events.subscribe(Arc::clone(&catalog) as Arc<dyn ChangeListener>);
        let manager = StoreManager::new(Arc::clone(&registry), validator, events);

        info!(
            "Shapehouse ready: {} warehouse(s), {} world",
            registry.list().len(),
            if config.open_world { "open" } else { "closed" }
        );
        Ok(Self {
            config,
            manager,
            catalog,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> &StoreManager {
        &self.manager
    }

    pub fn catalog(&self) -> &CatalogAdapter {
        &self.catalog
    }
}
