//! Discovery document construction
//!
//! A [`CatalogDocument`] is one immutable graph per warehouse: the service provider
//! catalog, one service provider per shape graph, creation factories and query
//! capabilities per shape, and the resource shapes they reference.

use super::{CatalogError, CatalogResult};
use crate::rdf::build_uri;
use crate::rdf::vocab::{dcterms, oslc, rdf, xsd};
use crate::validation::{NodeShape, ShapeSet};
use oxigraph::model::{
    BlankNode, Graph, Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef,
    Term, TermRef, Triple,
};
use std::collections::{HashMap, HashSet};
use tracing::warn;

const OSLC: &str = "oslc";

/// Catalog metadata stored in a warehouse default graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub domains: Vec<NamedNode>,
}

/// Resource shape published for one alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedShape {
    pub uri: NamedNode,
    pub describes: NamedNode,
}

/// Immutable discovery document of one warehouse, or the master catalog
#[derive(Debug, Clone)]
pub struct CatalogDocument {
    warehouse: String,
    catalog: NamedNode,
    graph: Graph,
    shapes: HashMap<String, PublishedShape>,
}

impl CatalogDocument {
    /// Warehouse name; empty for the master catalog
    pub fn warehouse(&self) -> &str {
        &self.warehouse
    }

    pub fn catalog_uri(&self) -> &NamedNode {
        &self.catalog
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Published resource shapes by alias
    pub fn shapes(&self) -> &HashMap<String, PublishedShape> {
        &self.shapes
    }

    /// Type IRI behind a shape alias
    pub fn resolve_type(&self, alias: &str) -> Option<&NamedNode> {
        self.shapes.get(alias).map(|s| &s.describes)
    }

    /// Creation URI of the factory for `resource_type` in the provider titled `provider`
    pub fn creation_factory(&self, resource_type: NamedNodeRef<'_>, provider: &str) -> Option<NamedNode> {
        let graph = &self.graph;
        let mut found = Vec::new();
        for sp in graph.subjects_for_predicate_object(rdf::TYPE, oslc::SERVICE_PROVIDER_TYPE) {
            if !has_title(graph, sp, provider) {
                continue;
            }
            for service in nodes(graph, sp, oslc::SERVICE) {
                for factory in nodes(graph, service, oslc::CREATION_FACTORY) {
                    let typed = graph
                        .objects_for_subject_predicate(factory, oslc::RESOURCE_TYPE)
                        .any(|t| t == TermRef::from(resource_type));
                    if !typed {
                        continue;
                    }
                    if let Some(TermRef::NamedNode(creation)) =
                        graph.object_for_subject_predicate(factory, oslc::CREATION)
                    {
                        found.push(creation.into_owned());
                    }
                }
            }
        }
        if found.len() > 1 {
            warn!(
                "More than one creation factory for <{}> in service provider '{}'",
                resource_type.as_str(),
                provider
            );
        }
        found.into_iter().next()
    }

    /// Concise bounded description: the node's triples plus everything reachable
    /// through blank nodes
    pub fn describe(&self, node: NamedNodeRef<'_>) -> Graph {
        let mut out = Graph::new();
        let mut pending = vec![NamedOrBlankNodeRef::from(node)];
        let mut seen = HashSet::new();
        while let Some(subject) = pending.pop() {
            if !seen.insert(subject) {
                continue;
            }
            for triple in self.graph.triples_for_subject(subject) {
                out.insert(triple);
                if let TermRef::BlankNode(b) = triple.object {
                    pending.push(b.into());
                }
            }
        }
        out
    }
}

fn has_title(graph: &Graph, node: NamedOrBlankNodeRef<'_>, title: &str) -> bool {
    graph
        .objects_for_subject_predicate(node, dcterms::TITLE)
        .any(|t| matches!(t, TermRef::Literal(l) if l.value() == title))
}

fn nodes<'a>(
    graph: &'a Graph,
    subject: NamedOrBlankNodeRef<'a>,
    predicate: NamedNodeRef<'a>,
) -> impl Iterator<Item = NamedOrBlankNodeRef<'a>> + 'a {
    graph
        .objects_for_subject_predicate(subject, predicate)
        .filter_map(|t| match t {
            TermRef::NamedNode(n) => Some(n.into()),
            TermRef::BlankNode(b) => Some(b.into()),
            _ => None,
        })
}

/// Accumulates the document graph
struct Builder<'a> {
    base: &'a str,
    graph: Graph,
}

impl<'a> Builder<'a> {
    fn new(base: &'a str) -> Self {
        Self {
            base,
            graph: Graph::new(),
        }
    }

    fn uri(&self, parts: &[&str]) -> CatalogResult<NamedNode> {
        let uri = build_uri(self.base, parts);
        NamedNode::new(uri.as_str()).map_err(|e| CatalogError::InvalidIri(format!("{}: {}", uri, e)))
    }

    fn add(&mut self, s: impl Into<NamedOrBlankNode>, p: NamedNodeRef<'_>, o: impl Into<Term>) {
        self.graph.insert(&Triple::new(s, p, o));
    }

    fn text(&mut self, s: impl Into<NamedOrBlankNode>, p: NamedNodeRef<'_>, value: &str) {
        self.add(s, p, Literal::new_simple_literal(value));
    }

    /// Typed, titled node; blank when `uri` is absent
    fn node(
        &mut self,
        uri: Option<NamedNode>,
        ty: NamedNodeRef<'_>,
        title: &str,
        description: Option<&str>,
    ) -> NamedOrBlankNode {
        let node: NamedOrBlankNode = match uri {
            Some(uri) => uri.into(),
            None => BlankNode::default().into(),
        };
        self.add(node.clone(), rdf::TYPE, ty);
        if !title.is_empty() {
            self.text(node.clone(), dcterms::TITLE, title);
        }
        if let Some(description) = description {
            self.text(node.clone(), dcterms::DESCRIPTION, description);
        }
        node
    }

    fn service(&mut self, provider: &NamedOrBlankNode) -> NamedOrBlankNode {
        let service: NamedOrBlankNode = BlankNode::default().into();
        self.add(service.clone(), rdf::TYPE, oslc::SERVICE_TYPE);
        self.add(provider.clone(), oslc::SERVICE, service.clone());
        service
    }

    #[allow(clippy::too_many_arguments)]
    fn capability(
        &mut self,
        service: &NamedOrBlankNode,
        link: NamedNodeRef<'_>,
        ty: NamedNodeRef<'_>,
        target: NamedNodeRef<'_>,
        endpoint: &NamedNode,
        title: &str,
        description: Option<&str>,
    ) -> NamedOrBlankNode {
        let node = self.node(None, ty, title, description);
        self.add(node.clone(), target, endpoint.clone());
        self.add(service.clone(), link, node.clone());
        node
    }

    fn resource_shape(&mut self, warehouse: &str, shape: &NodeShape) -> CatalogResult<PublishedShape> {
        let alias = shape.alias.as_str();
        let uri = self.uri(&[OSLC, warehouse, "shape", alias])?;
        self.add(uri.clone(), rdf::TYPE, oslc::RESOURCE_SHAPE_TYPE);
        self.add(uri.clone(), oslc::DESCRIBES, shape.target.clone());
        self.text(uri.clone(), dcterms::TITLE, &format!("{} resource shape", alias));

        for property in &shape.properties {
            let descriptor = property.descriptor().map_err(|message| CatalogError::InvalidShape {
                shape: alias.to_string(),
                message,
            })?;
            let node: NamedOrBlankNode = BlankNode::default().into();
            self.add(uri.clone(), oslc::PROPERTY, node.clone());
            self.add(node.clone(), rdf::TYPE, oslc::PROPERTY_TYPE);
            self.add(node.clone(), oslc::PROPERTY_DEFINITION, property.path.clone());
            self.text(node.clone(), oslc::NAME, &property.name);
            if let Some(description) = &property.description {
                self.text(node.clone(), dcterms::DESCRIPTION, description);
            }
            self.add(node.clone(), oslc::OCCURS, descriptor.occurs.iri());
            if let Some(value_type) = &descriptor.value_type {
                self.add(node.clone(), oslc::VALUE_TYPE, value_type.iri());
            }
            if let Some(max) = descriptor.max_size {
                self.add(
                    node.clone(),
                    oslc::MAX_SIZE,
                    Literal::new_typed_literal(max.to_string(), xsd::INTEGER),
                );
            }
            if let Some(allowed) = &property.allowed {
                let values = self.uri(&[OSLC, warehouse, "shape", alias, "values", &property.name])?;
                self.add(node.clone(), oslc::ALLOWED_VALUES, values.clone());
                self.add(values.clone(), rdf::TYPE, oslc::ALLOWED_VALUES_TYPE);
                for value in allowed {
                    self.add(values.clone(), oslc::ALLOWED_VALUE, value.clone());
                }
            }
        }

        Ok(PublishedShape {
            uri,
            describes: shape.target.clone(),
        })
    }
}

/// Document of one warehouse from its metadata and `(store, shapes)` pairs
pub fn warehouse_document(
    base: &str,
    warehouse: &str,
    metadata: &CatalogMetadata,
    stores: &[(String, ShapeSet)],
) -> CatalogResult<CatalogDocument> {
    let mut b = Builder::new(base);
    let catalog = b.uri(&[OSLC, warehouse, "catalog"])?;
    let catalog_node: NamedOrBlankNode = catalog.clone().into();
    b.add(catalog.clone(), rdf::TYPE, oslc::SERVICE_PROVIDER_CATALOG_TYPE);
    let title = metadata.title.as_deref().unwrap_or(warehouse);
    b.text(catalog.clone(), dcterms::TITLE, title);
    if let Some(description) = &metadata.description {
        b.text(catalog.clone(), dcterms::DESCRIPTION, description);
    }
    for domain in &metadata.domains {
        b.add(catalog.clone(), oslc::DOMAIN, domain.clone());
    }

    let mut shapes: HashMap<String, PublishedShape> = HashMap::new();
    for (store, set) in stores {
        let provider_uri = b.uri(&[OSLC, warehouse, "serviceProvider", store])?;
        let details = b.uri(&[OSLC, warehouse, "serviceProvider", store, "about"])?;
        let provider = b.node(Some(provider_uri), oslc::SERVICE_PROVIDER_TYPE, store, None);
        b.add(provider.clone(), oslc::DETAILS, details);
        b.add(catalog_node.clone(), oslc::SERVICE_PROVIDER, provider.clone());

        for shape in set.iter() {
            let alias = shape.alias.as_str();
            let endpoint = b.uri(&[OSLC, warehouse, store, alias])?;
            let published = match shapes.get(alias) {
                Some(existing) => {
                    if existing.describes != shape.target {
                        warn!(
                            "Alias '{}' in store '{}' already describes <{}>, keeping it",
                            alias,
                            store,
                            existing.describes.as_str()
                        );
                    }
                    existing.clone()
                }
                None => {
                    let published = b.resource_shape(warehouse, shape)?;
                    shapes.insert(alias.to_string(), published.clone());
                    published
                }
            };

            let service = b.service(&provider);
            let factory = b.capability(
                &service,
                oslc::CREATION_FACTORY,
                oslc::CREATION_FACTORY_TYPE,
                oslc::CREATION,
                &endpoint,
                &format!("Creation Factory for {} Resources.", alias),
                None,
            );
            b.add(factory.clone(), oslc::RESOURCE_TYPE, shape.target.clone());
            b.add(factory, oslc::RESOURCE_SHAPE, published.uri.clone());

            let query = b.capability(
                &service,
                oslc::QUERY_CAPABILITY,
                oslc::QUERY_CAPABILITY_TYPE,
                oslc::QUERY_BASE,
                &endpoint,
                &format!("Query Capability for {} Resources.", alias),
                None,
            );
            b.add(query, oslc::RESOURCE_TYPE, shape.target.clone());
        }

        let bulk = b.uri(&[OSLC, warehouse, store, "stores"])?;
        let service = b.service(&provider);
        b.capability(
            &service,
            oslc::CREATION_FACTORY,
            oslc::CREATION_FACTORY_TYPE,
            oslc::CREATION,
            &bulk,
            "Bulk Loader Creation Factory",
            None,
        );
    }

    let graphs_uri = b.uri(&[OSLC, warehouse, "stores"])?;
    let details = b.uri(&[OSLC, warehouse, "serviceProvider", warehouse, "about"])?;
    let creation = b.uri(&[OSLC, "stores", warehouse])?;
    let provider = b.node(Some(graphs_uri), oslc::SERVICE_PROVIDER_TYPE, warehouse, None);
    b.add(provider.clone(), oslc::DETAILS, details);
    b.add(catalog_node, oslc::SERVICE_PROVIDER, provider.clone());
    let service = b.service(&provider);
    b.capability(
        &service,
        oslc::CREATION_FACTORY,
        oslc::CREATION_FACTORY_TYPE,
        oslc::CREATION,
        &creation,
        &format!("Creation Factory for {} graphs.", warehouse),
        None,
    );

    Ok(CatalogDocument {
        warehouse: warehouse.to_string(),
        catalog,
        graph: b.graph,
        shapes,
    })
}

/// Master catalog listing every warehouse plus the warehouse-management provider
pub fn master_document(base: &str, warehouses: &[String]) -> CatalogResult<CatalogDocument> {
    let mut b = Builder::new(base);
    let catalog = b.uri(&[OSLC, "catalog"])?;
    let catalog_node = b.node(
        Some(catalog.clone()),
        oslc::SERVICE_PROVIDER_CATALOG_TYPE,
        "Master Service Provider Catalog.",
        Some("Encapsulates all ServiceProvider for all the RDF Stores."),
    );

    for warehouse in warehouses {
        let provider_uri = b.uri(&[OSLC, warehouse, "catalog"])?;
        let endpoint = b.uri(&[OSLC, "stores", warehouse])?;
        let provider = b.node(
            Some(provider_uri.clone()),
            oslc::SERVICE_PROVIDER_TYPE,
            &format!("Service Provider for {} store.", warehouse),
            Some(&format!("Service for managing the Graph for {} store.", warehouse)),
        );
        b.add(provider.clone(), oslc::DETAILS, provider_uri);
        b.add(catalog_node.clone(), oslc::SERVICE_PROVIDER, provider.clone());
        let service = b.service(&provider);
        b.capability(
            &service,
            oslc::CREATION_FACTORY,
            oslc::CREATION_FACTORY_TYPE,
            oslc::CREATION,
            &endpoint,
            &format!("Creation Factory for {} store.", warehouse),
            Some("Service for creating a new Graph for the RDF Store"),
        );
        b.capability(
            &service,
            oslc::QUERY_CAPABILITY,
            oslc::QUERY_CAPABILITY_TYPE,
            oslc::QUERY_BASE,
            &endpoint,
            &format!("Query Capability for {} store.", warehouse),
            Some("Service for listing all the Graphs of the RDF Store"),
        );
    }

    let stores = b.uri(&[OSLC, "rdfstores"])?;
    let provider = b.node(
        Some(stores.clone()),
        oslc::SERVICE_PROVIDER_TYPE,
        "RDFStore Service Provider",
        Some("Service for managing the RDF Store"),
    );
    b.add(provider.clone(), oslc::DETAILS, stores.clone());
    b.add(catalog_node, oslc::SERVICE_PROVIDER, provider.clone());
    let service = b.service(&provider);
    b.capability(
        &service,
        oslc::CREATION_FACTORY,
        oslc::CREATION_FACTORY_TYPE,
        oslc::CREATION,
        &stores,
        "RDFStore Creation Factory",
        Some("Service for creating a new RDF Store"),
    );
    b.capability(
        &service,
        oslc::QUERY_CAPABILITY,
        oslc::QUERY_CAPABILITY_TYPE,
        oslc::QUERY_BASE,
        &stores,
        "RDFStore Query Capability",
        Some("Service for listing all the RDF Stores"),
    );

    Ok(CatalogDocument {
        warehouse: String::new(),
        catalog,
        graph: b.graph,
        shapes: HashMap::new(),
    })
}
