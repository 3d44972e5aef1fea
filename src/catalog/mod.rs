//! Catalog adapter: discovery documents derived from warehouse shapes
//!
//! Documents are built lazily on first access and cached per warehouse. Each slot
//! carries a generation: eviction bumps it, and a build that started under an older
//! generation is handed to its caller but never published. Removing a warehouse
//! drops its slot and bumps a removal counter that plays the same role for builds
//! that started before the slot disappeared. Readers always get an `Arc` to a
//! complete document.

pub mod document;

pub use document::{CatalogDocument, CatalogMetadata, PublishedShape};

use crate::rdf::naming::shapes_store_name;
use crate::rdf::vocab::{dcterms, oslc};
use crate::rdf::build_uri;
use crate::store::events::{ChangeEvent, ChangeKind, ChangeListener};
use crate::validation::{ShapeError, ShapeSet};
use crate::warehouse::{TxMode, WarehouseError, WarehouseRegistry};
use oxigraph::model::{Graph, NamedNode, NamedNodeRef, TermRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Subject of the catalog metadata in a warehouse default graph
pub const CATALOG_METADATA: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("urn:ServiceProviderCatalog");

/// Catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Warehouse missing or engine failure
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    /// Stored shape graph no longer compiles
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Property without a catalog descriptor
    #[error("Invalid shape {shape}: {message}")]
    InvalidShape { shape: String, message: String },

    /// Base URI and path segments do not form an IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Default)]
struct Slot {
    generation: u64,
    document: Option<Arc<CatalogDocument>>,
}

/// Shared, cached view of every warehouse's discovery document
pub struct CatalogAdapter {
    base_uri: String,
    registry: Arc<WarehouseRegistry>,
    cache: RwLock<HashMap<String, Slot>>,
    removals: AtomicU64,
}

impl CatalogAdapter {
    pub fn new(base_uri: impl Into<String>, registry: Arc<WarehouseRegistry>) -> Self {
        Self {
            base_uri: base_uri.into(),
            registry,
            cache: RwLock::new(HashMap::new()),
            removals: AtomicU64::new(0),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Discovery document of `warehouse`; the empty name selects the master catalog
    pub fn catalog(&self, warehouse: &str) -> CatalogResult<Arc<CatalogDocument>> {
        let (generation, removals) = {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            let removals = self.removals.load(Ordering::Acquire);
            let generation = match cache.get(warehouse) {
                Some(Slot {
                    document: Some(document),
                    ..
                }) => return Ok(Arc::clone(document)),
                Some(slot) => slot.generation,
                None => 0,
            };
            (generation, removals)
        };

        let document = Arc::new(self.build(warehouse)?);

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if self.removals.load(Ordering::Acquire) != removals {
            debug!("Warehouse removed while building catalog for '{}', not cached", warehouse);
            return Ok(document);
        }
        let slot = cache.entry(warehouse.to_string()).or_default();
        if slot.generation == generation {
            if let Some(current) = &slot.document {
                return Ok(Arc::clone(current));
            }
            slot.document = Some(Arc::clone(&document));
            debug!("Cached catalog for '{}'", warehouse);
        } else {
            debug!("Catalog for '{}' went stale while building, not cached", warehouse);
        }
        Ok(document)
    }

    /// Drop the cached document of `warehouse`
    pub fn evict(&self, warehouse: &str) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let slot = cache.entry(warehouse.to_string()).or_default();
        slot.generation += 1;
        if slot.document.take().is_some() {
            debug!("Evicted catalog for '{}'", warehouse);
        }
    }

    /// Drop every cached trace of a removed warehouse
    pub fn forget(&self, warehouse: &str) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        self.removals.fetch_add(1, Ordering::AcqRel);
        if cache.remove(warehouse).is_some() {
            debug!("Forgot catalog slot of '{}'", warehouse);
        }
    }

    /// Whether a document is currently cached
    pub fn is_cached(&self, warehouse: &str) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(warehouse)
            .is_some_and(|slot| slot.document.is_some())
    }

    /// Type IRI behind a shape alias
    pub fn resolve_type(&self, warehouse: &str, alias: &str) -> CatalogResult<Option<NamedNode>> {
        Ok(self.catalog(warehouse)?.resolve_type(alias).cloned())
    }

    /// Creation URI of the factory for `resource_type` under the provider titled `provider`
    pub fn resolve_creation_factory(
        &self,
        warehouse: &str,
        resource_type: NamedNodeRef<'_>,
        provider: &str,
    ) -> CatalogResult<Option<NamedNode>> {
        Ok(self.catalog(warehouse)?.creation_factory(resource_type, provider))
    }

    /// Description of the service provider of store `name`
    pub fn service_provider(&self, warehouse: &str, name: &str) -> CatalogResult<Graph> {
        self.describe(warehouse, &["oslc", warehouse, "serviceProvider", name])
    }

    /// Description of the resource shape published for `alias`
    pub fn resource_shape(&self, warehouse: &str, alias: &str) -> CatalogResult<Graph> {
        self.describe(warehouse, &["oslc", warehouse, "shape", alias])
    }

    /// Allowed values of property `property` in shape `alias`
    pub fn allowed_values(&self, warehouse: &str, alias: &str, property: &str) -> CatalogResult<Graph> {
        self.describe(warehouse, &["oslc", warehouse, "shape", alias, "values", property])
    }

    fn describe(&self, warehouse: &str, parts: &[&str]) -> CatalogResult<Graph> {
        let uri = build_uri(&self.base_uri, parts);
        let node = NamedNodeRef::new(&uri).map_err(|e| CatalogError::InvalidIri(format!("{}: {}", uri, e)))?;
        Ok(self.catalog(warehouse)?.describe(node))
    }

    fn build(&self, warehouse: &str) -> CatalogResult<CatalogDocument> {
        if warehouse.is_empty() {
            let warehouses = self.registry.list();
            info!("Building master catalog over {} warehouse(s)", warehouses.len());
            return document::master_document(&self.base_uri, &warehouses);
        }

        let wh = self.registry.get(warehouse)?;
        let tx = wh.begin(TxMode::Read);
        let metadata = read_metadata(&tx.default_graph()?);
        let mut stores = Vec::new();
        for urn in tx.list_graph_names()? {
            if let Some(store) = shapes_store_name(urn.as_str()) {
                let shapes = ShapeSet::from_graph(&tx.graph(urn.as_ref())?, true)?;
                stores.push((store.to_string(), shapes));
            }
        }
        drop(tx);

        info!("Building catalog for '{}' from {} shape graph(s)", warehouse, stores.len());
        document::warehouse_document(&self.base_uri, warehouse, &metadata, &stores)
    }
}

impl ChangeListener for CatalogAdapter {
    fn on_change(&self, event: &ChangeEvent) {
        if event.kind == ChangeKind::WarehouseRemoved {
            self.forget(&event.warehouse);
        } else {
            self.evict(&event.warehouse);
        }
        if matches!(
            event.kind,
            ChangeKind::WarehouseCreated | ChangeKind::WarehouseRemoved
        ) {
            self.evict("");
        }
    }
}

fn read_metadata(default_graph: &Graph) -> CatalogMetadata {
    let text = |predicate: NamedNodeRef<'static>| match default_graph.object_for_subject_predicate(CATALOG_METADATA, predicate) {
        Some(TermRef::Literal(l)) if !l.value().is_empty() => Some(l.value().to_string()),
        _ => None,
    };
    CatalogMetadata {
        title: text(dcterms::TITLE),
        description: text(dcterms::DESCRIPTION),
        domains: default_graph
            .objects_for_subject_predicate(CATALOG_METADATA, oslc::DOMAIN)
            .filter_map(|t| match t {
                TermRef::NamedNode(n) => Some(n.into_owned()),
                _ => None,
            })
            .collect(),
    }
}
