//! Shapehouse
//!
//! A multi-tenant RDF store. Each tenant owns a warehouse of named graphs; every
//! data graph `urn:X` is guarded by a SHACL shape graph `urn:X-shacl` that writes
//! must conform to. Warehouses publish an OSLC service provider catalog derived
//! from their shapes, and OSLC query parameters compile to SPARQL CONSTRUCT.
//!
//! # Architecture
//!
//! - [`rdf`]: vocabularies, namespaces, graph naming and serialization codecs
//! - [`warehouse`]: per-tenant storage with single-writer transactions
//! - [`query`]: OSLC query parsing, SPARQL compilation and graph filtering
//! - [`validation`]: shape compilation and constraint checking
//! - [`store`]: the store manager every read and write goes through
//! - [`catalog`]: cached OSLC catalogs derived from shapes
//! - [`config`] and [`context`]: startup configuration and wiring
//!
//! ## Example Usage
//!
//! ```rust
//! use shapehouse::{Config, Shapehouse, WriteMode};
//! use shapehouse::rdf::{GraphCodec, TurtleCodec};
//!
//! let house = Shapehouse::open(Config::default()).unwrap();
//! let manager = house.manager();
//! manager.create_warehouse("acme").unwrap();
//!
//! let shapes = TurtleCodec
//!     .parse(br#"
//!         @prefix sh: <http://www.w3.org/ns/shacl#> .
//!         @prefix ex: <http://example.org/> .
//!         ex:PersonShape a sh:NodeShape ; sh:targetClass ex:Person ;
//!             sh:property [ sh:path ex:name ; sh:minCount 1 ; sh:maxCount 1 ] .
//!     "#, None)
//!     .unwrap();
//! manager.replace_shape_graph("acme", "people", &shapes).unwrap();
//!
//! let data = TurtleCodec
//!     .parse(br#"<http://example.org/alice> a <http://example.org/Person> ;
//!         <http://example.org/name> "Alice" ."#, None)
//!     .unwrap();
//! manager.write_graph("acme", "people", &data, WriteMode::Replace).unwrap();
//! assert_eq!(manager.get_graph("acme", "people").unwrap().len(), 2);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod context;
pub mod query;
pub mod rdf;
pub mod store;
pub mod validation;
pub mod warehouse;

// Re-export main types for convenience
pub use catalog::{CatalogAdapter, CatalogDocument, CatalogError, CatalogResult};

pub use config::{Config, ConfigError, ConfigResult};

pub use context::Shapehouse;

pub use query::{
    compile, parse_criteria, CompiledQuery, GraphFilter, QueryCriteria, QueryError, QueryParams,
    QueryResult,
};

pub use store::{
    ChangeBus, ChangeEvent, ChangeKind, ChangeListener, SearchResponse, StoreError, StoreManager,
    StoreResult, WriteMode, WriteOutcome,
};

pub use validation::{
    ConstraintValidator, ShapeSet, ValidationError, ValidationResult, Violation, ViolationReport,
};

pub use warehouse::{Warehouse, WarehouseError, WarehouseRegistry, WarehouseResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
