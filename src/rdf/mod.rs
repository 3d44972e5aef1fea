//! RDF building blocks shared by every component
//!
//! - [`vocab`]: constant terms for RDF, RDFS, XSD, Dublin Core, SHACL and OSLC
//! - [`namespace`]: prefix management
//! - [`naming`]: graph URNs and catalog URIs
//! - [`codec`]: pluggable graph serialization

pub mod codec;
pub mod namespace;
pub mod naming;
pub mod vocab;

pub use codec::{CodecError, CodecResult, GraphCodec, NTriplesCodec, TurtleCodec};
pub use namespace::{NamespaceManager, PrefixError, PrefixResult, BUILTIN_PREFIXES};
pub use naming::{build_uri, graph_urn, shapes_urn, simple_id, SHAPES_SUFFIX};
pub use oxigraph::model::Graph;
