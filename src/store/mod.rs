//! Store manager: the only path that reads or mutates warehouse graphs
//!
//! Every operation runs inside exactly one warehouse transaction. Writes to a data
//! graph `urn:X` are validated against its companion shape graph `urn:X-shacl` before
//! anything is staged; shape graphs themselves are checked for duplicate aliases and
//! target classes. Change notifications go out on the [`ChangeBus`] after commit.

pub mod events;

pub use events::{ChangeBus, ChangeEvent, ChangeKind, ChangeListener};

use crate::query::{compile, GraphFilter, QueryCriteria, QueryError};
use crate::rdf::naming::{is_valid_name, shapes_store_name, store_name};
use crate::rdf::vocab::{dcterms, oslc, rdf, rdfs};
use crate::rdf::{graph_urn, shapes_urn, NamespaceManager, SHAPES_SUFFIX};
use crate::validation::{ConstraintValidator, ShapeError, ValidationError, ViolationReport};
use crate::warehouse::{Transaction, TxMode, WarehouseError, WarehouseRegistry};
use oxigraph::model::{
    BlankNode, Graph, Literal, NamedNode, NamedOrBlankNode, NamedOrBlankNodeRef, TermRef, Triple,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Store manager errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Warehouse or engine failure, including `StoreUnavailable`
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    /// Malformed criteria or unknown prefix
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Shape violation, shape load failure or shapes being updated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Data graph has no companion shape graph
    #[error("Shape graph missing for store '{0}'")]
    ShapesMissing(String),

    /// Neither data nor shape graph exists
    #[error("Graph not found: {0}")]
    GraphNotFound(String),

    /// Store name not usable as a graph name
    #[error("Invalid store name: '{0}'")]
    InvalidName(String),

    /// Malformed IRI handed in by the caller
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Malformed graph name pattern
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl From<ShapeError> for StoreError {
    fn from(e: ShapeError) -> Self {
        StoreError::Validation(ValidationError::Shape(e))
    }
}

impl StoreError {
    /// Transient conditions a caller may retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Validation(ValidationError::ShapesUpdating(_)))
    }

    /// Structured violations, when the write failed validation
    pub fn violations(&self) -> Option<&ViolationReport> {
        match self {
            StoreError::Validation(ValidationError::ShapeViolation(report)) => Some(report),
            _ => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// How [`StoreManager::write_graph`] treats existing content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the whole data graph
    Replace,
    /// Add only resources that are not stored yet; existing resources win
    AddIfDisjoint,
}

/// Result of a graph write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Replaced {
        created: bool,
        triples: usize,
    },
    Added {
        created: bool,
        /// Typed resources added
        added: usize,
        triples: usize,
        /// Incoming resources dropped because they already exist
        skipped: Vec<NamedOrBlankNode>,
    },
    /// Nothing left to commit
    Unchanged { skipped: Vec<NamedOrBlankNode> },
}

impl WriteOutcome {
    pub fn skipped(&self) -> &[NamedOrBlankNode] {
        match self {
            WriteOutcome::Added { skipped, .. } | WriteOutcome::Unchanged { skipped } => skipped,
            WriteOutcome::Replaced { .. } => &[],
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, WriteOutcome::Unchanged { .. })
    }
}

/// Search results wrapped in an OSLC response container
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub graph: Graph,
    pub total: usize,
    /// Query text that produced the result
    pub sparql: String,
}

/// Orchestrates transactions, validation and notifications
pub struct StoreManager {
    registry: Arc<WarehouseRegistry>,
    validator: Arc<ConstraintValidator>,
    events: Arc<ChangeBus>,
}

impl StoreManager {
    /// Create a manager. The validator is subscribed to `events` so its compiled
    /// shapes follow committed changes.
    pub fn new(
        registry: Arc<WarehouseRegistry>,
        validator: Arc<ConstraintValidator>,
        events: Arc<ChangeBus>,
    ) -> Self {
        events.subscribe(Arc::clone(&validator) as Arc<dyn ChangeListener>);
        Self {
            registry,
            validator,
            events,
        }
    }

    pub fn registry(&self) -> &Arc<WarehouseRegistry> {
        &self.registry
    }

    pub fn validator(&self) -> &Arc<ConstraintValidator> {
        &self.validator
    }

    pub fn events(&self) -> &Arc<ChangeBus> {
        &self.events
    }

    fn publish(&self, warehouse: &str, store: Option<&str>, kind: ChangeKind) {
        self.events.publish(ChangeEvent::new(warehouse, store, kind));
    }

    // ---------------------------------------------------------------------
    // Warehouses
    // ---------------------------------------------------------------------

    pub fn create_warehouse(&self, name: &str) -> StoreResult<()> {
        self.registry.create(name)?;
        info!("Created warehouse: {}", name);
        self.publish(name, None, ChangeKind::WarehouseCreated);
        Ok(())
    }

    pub fn remove_warehouse(&self, name: &str) -> StoreResult<()> {
        self.registry.remove(name)?;
        info!("Removed warehouse: {}", name);
        self.publish(name, None, ChangeKind::WarehouseRemoved);
        Ok(())
    }

    pub fn list_warehouses(&self) -> Vec<String> {
        self.registry.list()
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Logical names of the shape-governed stores whose name fully matches `pattern`
    pub fn list_graphs(&self, warehouse: &str, pattern: Option<&str>) -> StoreResult<Vec<String>> {
        let matcher = match pattern.filter(|p| !p.is_empty()) {
            Some(p) => Some(Regex::new(&format!("^(?:{})$", p)).map_err(|e| {
                StoreError::InvalidPattern {
                    pattern: p.to_string(),
                    message: e.to_string(),
                }
            })?),
            None => None,
        };

        let wh = self.registry.get(warehouse)?;
        let tx = wh.begin(TxMode::Read);
        let names = tx
            .list_graph_names()?
            .iter()
            .filter_map(|urn| shapes_store_name(urn.as_str()).map(str::to_string))
            .filter(|name| matcher.as_ref().map_or(true, |m| m.is_match(name)))
            .collect();
        Ok(names)
    }

    /// Content of a data graph; empty when only its shapes are stored
    pub fn get_graph(&self, warehouse: &str, store: &str) -> StoreResult<Graph> {
        let (data, shapes) = urns(store)?;
        let wh = self.registry.get(warehouse)?;
        let tx = wh.begin(TxMode::Read);
        if tx.contains_graph(data.as_ref())? {
            Ok(tx.graph(data.as_ref())?)
        } else if tx.contains_graph(shapes.as_ref())? {
            Ok(Graph::new())
        } else {
            Err(StoreError::GraphNotFound(store.to_string()))
        }
    }

    /// Content of a store's shape graph
    pub fn get_shape_graph(&self, warehouse: &str, store: &str) -> StoreResult<Graph> {
        let (_, shapes) = urns(store)?;
        let wh = self.registry.get(warehouse)?;
        let tx = wh.begin(TxMode::Read);
        if !tx.contains_graph(shapes.as_ref())? {
            return Err(StoreError::ShapesMissing(store.to_string()));
        }
        Ok(tx.graph(shapes.as_ref())?)
    }

    /// Triples about one resource
    pub fn get_resource(&self, warehouse: &str, store: &str, iri: &str) -> StoreResult<Graph> {
        let (data, _) = urns(store)?;
        let subject = iri_node(iri)?;
        let wh = self.registry.get(warehouse)?;
        let tx = wh.begin(TxMode::Read);
        Ok(tx.triples_for_subject(data.as_ref(), subject.as_ref().into())?)
    }

    /// All `rdf:type` statements of a store
    pub fn list_resources(&self, warehouse: &str, store: &str) -> StoreResult<Graph> {
        let graph = self.get_graph(warehouse, store)?;
        let mut types = Graph::new();
        for triple in graph.triples_for_predicate(rdf::TYPE) {
            types.insert(triple);
        }
        Ok(types)
    }

    /// A store's content restricted by the graph filter language
    pub fn filter_graph(
        &self,
        warehouse: &str,
        store: &str,
        where_clause: Option<&str>,
        select: Option<&str>,
    ) -> StoreResult<Graph> {
        let filter = GraphFilter::parse(where_clause, select, &NamespaceManager::new())?;
        let graph = self.get_graph(warehouse, store)?;
        if filter.is_identity() {
            return Ok(graph);
        }
        Ok(filter.apply(&graph))
    }

    /// Warehouse default graph (catalog metadata)
    pub fn default_graph(&self, warehouse: &str) -> StoreResult<Graph> {
        let wh = self.registry.get(warehouse)?;
        let tx = wh.begin(TxMode::Read);
        Ok(tx.default_graph()?)
    }

    /// Run a compiled search over `stores`, or every data graph when none are named
    pub fn search(
        &self,
        warehouse: &str,
        criteria: &QueryCriteria,
        stores: &[&str],
        base: &str,
    ) -> StoreResult<SearchResponse> {
        let container = iri_node(base)?;
        let wh = self.registry.get(warehouse)?;
        let tx = wh.begin(TxMode::Read);

        let graphs: Vec<String> = if stores.is_empty() {
            data_graphs(&tx)?
        } else {
            stores
                .iter()
                .map(|store| urns(store).map(|(data, _)| data.into_string()))
                .collect::<StoreResult<_>>()?
        };
        let compiled = compile(criteria, base, &graphs)?;
        debug!("Search on '{}' over {} graph(s):\n{}", warehouse, graphs.len(), compiled.sparql);

        let mut graph = if graphs.is_empty() {
            Graph::new()
        } else {
            tx.construct(&compiled.sparql)?
        };
        let total = graph
            .objects_for_subject_predicate(container.as_ref(), rdfs::MEMBER)
            .count();
        graph.insert(&Triple::new(container.clone(), rdf::TYPE, oslc::RESPONSE_INFO_TYPE));
        graph.insert(&Triple::new(
            container,
            oslc::TOTAL_COUNT,
            Literal::from(total as i64),
        ));
        Ok(SearchResponse {
            graph,
            total,
            sparql: compiled.sparql,
        })
    }

    // ---------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------

    /// Replace the shape graph of `store`. Returns the number of node shapes.
    pub fn replace_shape_graph(&self, warehouse: &str, store: &str, shapes: &Graph) -> StoreResult<usize> {
        let (_, shapes_graph) = urns(store)?;
        let _updating = self.validator.begin_update(warehouse);
        let compiled = self.validator.compile(shapes)?;

        let wh = self.registry.get(warehouse)?;
        let mut tx = wh.begin(TxMode::Write);
        tx.replace_graph(shapes_graph.as_ref(), shapes)?;
        tx.commit()?;

        info!(
            "Replaced shape graph {} in '{}' ({} shapes)",
            shapes_graph,
            warehouse,
            compiled.len()
        );
        self.publish(warehouse, Some(store), ChangeKind::ShapesReplaced);
        Ok(compiled.len())
    }

    /// Write a data graph after validating it against the store's shapes
    pub fn write_graph(
        &self,
        warehouse: &str,
        store: &str,
        graph: &Graph,
        mode: WriteMode,
    ) -> StoreResult<WriteOutcome> {
        let (data, shapes_graph) = urns(store)?;
        let wh = self.registry.get(warehouse)?;
        self.validator.ensure_not_updating(warehouse)?;
        let mut tx = wh.begin(TxMode::Write);
        self.validator.ensure_not_updating(warehouse)?;

        if !tx.contains_graph(shapes_graph.as_ref())? {
            return Err(StoreError::ShapesMissing(store.to_string()));
        }
        let shapes = self.validator.shapes(warehouse, shapes_graph.as_str(), || {
            tx.graph(shapes_graph.as_ref()).map_err(StoreError::from)
        })?;
        let created = !tx.contains_graph(data.as_ref())?;

        let outcome = match mode {
            WriteMode::Replace => {
                self.validator.validate_graph(&shapes, graph, None)?;
                tx.replace_graph(data.as_ref(), graph)?;
                WriteOutcome::Replaced {
                    created,
                    triples: graph.len(),
                }
            }
            WriteMode::AddIfDisjoint => {
                let stored = tx.graph(data.as_ref())?;
                let existing: HashSet<NamedOrBlankNode> =
                    typed_subjects(&stored).into_iter().collect();
                let incoming = typed_subjects(graph);
                let added = incoming.iter().filter(|s| !existing.contains(*s)).count();
                let mut skipped: Vec<NamedOrBlankNode> = graph
                    .iter()
                    .map(|t| t.subject.into_owned())
                    .filter(|s| existing.contains(s))
                    .collect::<HashSet<_>>()
                    .into_iter()
                    .collect();
                skipped.sort_by_cached_key(ToString::to_string);

                let mut remainder = purge(graph, &skipped);
                for triple in stored.iter() {
                    remainder.remove(triple);
                }
                if remainder.is_empty() {
                    debug!("Nothing to add to {} in '{}'", data, warehouse);
                    tx.abort();
                    return Ok(WriteOutcome::Unchanged { skipped });
                }

                self.validator
                    .validate_graph(&shapes, &remainder, Some(&stored))?;
                tx.add_all(data.as_ref(), &remainder)?;
                WriteOutcome::Added {
                    created,
                    added,
                    triples: remainder.len(),
                    skipped,
                }
            }
        };

        tx.commit()?;
        info!("Wrote {} in '{}': {}", data, warehouse, outcome_summary(&outcome));
        if created {
            self.publish(warehouse, Some(store), ChangeKind::GraphCreated);
        }
        Ok(outcome)
    }

    /// Replace one resource's triples inside an existing data graph
    pub fn write_resource(
        &self,
        warehouse: &str,
        store: &str,
        iri: &str,
        description: &Graph,
    ) -> StoreResult<()> {
        let (data, shapes_graph) = urns(store)?;
        let subject = iri_node(iri)?;
        let wh = self.registry.get(warehouse)?;
        self.validator.ensure_not_updating(warehouse)?;
        let mut tx = wh.begin(TxMode::Write);
        self.validator.ensure_not_updating(warehouse)?;

        if !tx.contains_graph(data.as_ref())? {
            return Err(StoreError::GraphNotFound(store.to_string()));
        }
        if !tx.contains_graph(shapes_graph.as_ref())? {
            return Err(StoreError::ShapesMissing(store.to_string()));
        }
        let shapes = self.validator.shapes(warehouse, shapes_graph.as_str(), || {
            tx.graph(shapes_graph.as_ref()).map_err(StoreError::from)
        })?;

        let focus = NamedOrBlankNodeRef::from(subject.as_ref());
        let mut resource = Graph::new();
        for triple in description.triples_for_subject(focus) {
            resource.insert(triple);
        }
        if resource.len() != description.len() {
            debug!(
                "Ignoring {} triple(s) not about {}",
                description.len() - resource.len(),
                subject
            );
        }

        let mut context = tx.graph(data.as_ref())?;
        let previous: Vec<Triple> = context
            .triples_for_subject(focus)
            .map(|t| t.into_owned())
            .collect();
        for triple in &previous {
            context.remove(triple);
        }
        for triple in resource.iter() {
            context.insert(triple);
        }
        self.validator
            .validate_resource(&shapes, focus, &context, None)?;

        tx.remove_subject(data.as_ref(), focus)?;
        tx.add_all(data.as_ref(), &resource)?;
        tx.commit()?;
        debug!("Saved {} in {} ('{}')", subject, data, warehouse);
        Ok(())
    }

    /// Remove every triple in which the resource is subject or object
    pub fn remove_resource(&self, warehouse: &str, store: &str, iri: &str) -> StoreResult<()> {
        let (data, _) = urns(store)?;
        let subject = iri_node(iri)?;
        let wh = self.registry.get(warehouse)?;
        let mut tx = wh.begin(TxMode::Write);
        if !tx.contains_graph(data.as_ref())? {
            return Err(StoreError::GraphNotFound(store.to_string()));
        }
        tx.remove_subject(data.as_ref(), subject.as_ref().into())?;
        tx.remove_references(data.as_ref(), subject.as_ref().into())?;
        tx.commit()?;

        debug!("Removed {} from {} ('{}')", subject, data, warehouse);
        self.publish(warehouse, Some(store), ChangeKind::ResourceRemoved);
        Ok(())
    }

    /// Drop a data graph together with its shape graph
    pub fn remove_graph(&self, warehouse: &str, store: &str) -> StoreResult<()> {
        let (data, shapes_graph) = urns(store)?;
        let _updating = self.validator.begin_update(warehouse);
        let wh = self.registry.get(warehouse)?;
        let mut tx = wh.begin(TxMode::Write);
        let has_data = tx.contains_graph(data.as_ref())?;
        let has_shapes = tx.contains_graph(shapes_graph.as_ref())?;
        if !has_data && !has_shapes {
            return Err(StoreError::GraphNotFound(store.to_string()));
        }

        if has_data {
            tx.drop_graph(data.as_ref())?;
        }
        if has_shapes {
            tx.drop_graph(shapes_graph.as_ref())?;
        }
        tx.commit()?;

        info!("Removed store {} from '{}'", store, warehouse);
        self.publish(warehouse, Some(store), ChangeKind::GraphRemoved);
        Ok(())
    }

    /// Replace the warehouse default graph (catalog title, description, domains)
    pub fn replace_default_graph(&self, warehouse: &str, graph: &Graph) -> StoreResult<()> {
        let wh = self.registry.get(warehouse)?;
        let mut tx = wh.begin(TxMode::Write);
        tx.replace_default_graph(graph)?;
        tx.commit()?;

        info!("Replaced default graph of '{}' ({} triples)", warehouse, graph.len());
        self.publish(warehouse, None, ChangeKind::CatalogUpdated);
        Ok(())
    }

    /// Container describing the resources an `AddIfDisjoint` write skipped
    pub fn disjoint_report(skipped: &[NamedOrBlankNode]) -> Graph {
        let mut report = Graph::new();
        let container = BlankNode::default();
        report.insert(&Triple::new(container.clone(), rdf::TYPE, rdfs::CONTAINER));
        report.insert(&Triple::new(
            container.clone(),
            dcterms::TITLE,
            Literal::new_simple_literal("Resources"),
        ));
        report.insert(&Triple::new(
            container.clone(),
            dcterms::DESCRIPTION,
            Literal::new_simple_literal("Resources that already exist in the store"),
        ));
        for resource in skipped {
            report.insert(&Triple::new(container.clone(), rdfs::MEMBER, resource.clone()));
        }
        report
    }
}

/// Data and shape graph names of a logical store
fn urns(store: &str) -> StoreResult<(NamedNode, NamedNode)> {
    if !is_valid_name(store) || store.ends_with(SHAPES_SUFFIX) {
        return Err(StoreError::InvalidName(store.to_string()));
    }
    let data = NamedNode::new(graph_urn(store)).map_err(|_| StoreError::InvalidName(store.to_string()))?;
    let shapes = NamedNode::new(shapes_urn(store)).map_err(|_| StoreError::InvalidName(store.to_string()))?;
    Ok((data, shapes))
}

fn iri_node(iri: &str) -> StoreResult<NamedNode> {
    NamedNode::new(iri).map_err(|e| StoreError::InvalidIri(format!("{}: {}", iri, e)))
}

/// Every named data graph (shape graphs excluded)
fn data_graphs(tx: &Transaction<'_>) -> StoreResult<Vec<String>> {
    Ok(tx
        .list_graph_names()?
        .into_iter()
        .filter(|urn| store_name(urn.as_str()).is_some() && shapes_store_name(urn.as_str()).is_none())
        .map(NamedNode::into_string)
        .collect())
}

/// Subjects carrying an `rdf:type`, in a stable order
fn typed_subjects(graph: &Graph) -> Vec<NamedOrBlankNode> {
    let mut seen = HashSet::new();
    let mut subjects: Vec<NamedOrBlankNode> = graph
        .triples_for_predicate(rdf::TYPE)
        .map(|t| t.subject.into_owned())
        .filter(|s| seen.insert(s.clone()))
        .collect();
    subjects.sort_by_cached_key(ToString::to_string);
    subjects
}

/// `graph` without the triples in which a skipped resource is subject or object
fn purge(graph: &Graph, skipped: &[NamedOrBlankNode]) -> Graph {
    let skipped: HashSet<NamedOrBlankNodeRef<'_>> = skipped.iter().map(|s| s.as_ref()).collect();
    let mut remainder = Graph::new();
    for triple in graph.iter() {
        let object = match triple.object {
            TermRef::NamedNode(n) => Some(NamedOrBlankNodeRef::from(n)),
            TermRef::BlankNode(b) => Some(NamedOrBlankNodeRef::from(b)),
            _ => None,
        };
        let dangling = object.is_some_and(|o| skipped.contains(&o));
        if !skipped.contains(&triple.subject) && !dangling {
            remainder.insert(triple);
        }
    }
    remainder
}

fn outcome_summary(outcome: &WriteOutcome) -> String {
    match outcome {
        WriteOutcome::Replaced { triples, .. } => format!("replaced with {} triples", triples),
        WriteOutcome::Added {
            added,
            triples,
            skipped,
            ..
        } => format!("{} resources ({} triples) added, {} skipped", added, triples, skipped.len()),
        WriteOutcome::Unchanged { skipped } => format!("unchanged, {} skipped", skipped.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{GraphCodec, TurtleCodec};
    use oxigraph::model::NamedNodeRef;

    const SHAPES: &str = r#"
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
        @prefix ex: <http://example.org/> .
        ex:PersonShape a sh:NodeShape ; sh:targetClass ex:Person ;
            sh:property [ sh:path ex:name ; sh:minCount 1 ; sh:maxCount 1 ;
                          sh:nodeKind sh:Literal ; sh:datatype xsd:string ] ;
            sh:property [ sh:path ex:knows ; sh:nodeKind sh:IRI ] .
    "#;

    fn turtle(text: &str) -> Graph {
        let text = format!("@prefix ex: <http://example.org/> .\n{}", text);
        TurtleCodec.parse(text.as_bytes(), None).unwrap()
    }

    fn manager() -> StoreManager {
        let manager = StoreManager::new(
            Arc::new(WarehouseRegistry::in_memory()),
            Arc::new(ConstraintValidator::new(false)),
            Arc::new(ChangeBus::new()),
        );
        manager.create_warehouse("wh").unwrap();
        manager
            .replace_shape_graph("wh", "people", &TurtleCodec.parse(SHAPES.as_bytes(), None).unwrap())
            .unwrap();
        manager
    }

    #[test]
    fn test_write_requires_shapes() {
        let manager = manager();
        let err = manager
            .write_graph("wh", "unknown", &Graph::new(), WriteMode::Replace)
            .unwrap_err();
        assert!(matches!(err, StoreError::ShapesMissing(ref s) if s == "unknown"));
    }

    #[test]
    fn test_replace_and_read() {
        let manager = manager();
        let outcome = manager
            .write_graph("wh", "people", &turtle(r#"ex:a a ex:Person ; ex:name "A" ."#), WriteMode::Replace)
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Replaced { created: true, triples: 2 });
        assert_eq!(manager.get_graph("wh", "people").unwrap().len(), 2);
        assert_eq!(manager.list_graphs("wh", None).unwrap(), vec!["people".to_string()]);
        assert_eq!(manager.list_resources("wh", "people").unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_write_rejected() {
        let manager = manager();
        let err = manager
            .write_graph("wh", "people", &turtle("ex:a a ex:Person ."), WriteMode::Replace)
            .unwrap_err();
        assert_eq!(err.violations().map(ViolationReport::len), Some(1));
        assert!(!err.is_retryable());
        assert!(matches!(manager.get_graph("wh", "people"), Ok(g) if g.is_empty()));
    }

    #[test]
    fn test_add_if_disjoint_keeps_existing() {
        let manager = manager();
        manager
            .write_graph("wh", "people", &turtle(r#"ex:a a ex:Person ; ex:name "A" ."#), WriteMode::Replace)
            .unwrap();

        let batch = turtle(
            r#"ex:a a ex:Person ; ex:name "Other" .
               ex:b a ex:Person ; ex:name "B" ; ex:knows ex:a ."#,
        );
        let outcome = manager
            .write_graph("wh", "people", &batch, WriteMode::AddIfDisjoint)
            .unwrap();
        assert_eq!(outcome.skipped().len(), 1);
        assert!(matches!(outcome, WriteOutcome::Added { added: 1, triples: 2, .. }));

        let stored = manager.get_graph("wh", "people").unwrap();
        assert_eq!(stored.len(), 4);
        let a = NamedNodeRef::new("http://example.org/a").unwrap();
        let names: Vec<_> = stored
            .objects_for_subject_predicate(a, NamedNodeRef::new("http://example.org/name").unwrap())
            .collect();
        assert_eq!(names.len(), 1);

        let again = manager
            .write_graph("wh", "people", &batch, WriteMode::AddIfDisjoint)
            .unwrap();
        assert!(again.is_unchanged());
        assert_eq!(again.skipped().len(), 2);
        assert_eq!(manager.get_graph("wh", "people").unwrap().len(), 4);

        let report = StoreManager::disjoint_report(again.skipped());
        assert_eq!(report.triples_for_predicate(rdfs::MEMBER).count(), 2);
    }

    #[test]
    fn test_write_and_remove_resource() {
        let manager = manager();
        manager
            .write_graph(
                "wh",
                "people",
                &turtle(r#"ex:a a ex:Person ; ex:name "A" . ex:b a ex:Person ; ex:name "B" ; ex:knows ex:a ."#),
                WriteMode::Replace,
            )
            .unwrap();

        manager
            .write_resource("wh", "people", "http://example.org/a", &turtle(r#"ex:a a ex:Person ; ex:name "Renamed" ."#))
            .unwrap();
        let a = manager.get_resource("wh", "people", "http://example.org/a").unwrap();
        assert_eq!(a.len(), 2);
        assert!(a.iter().any(|t| matches!(t.object, TermRef::Literal(l) if l.value() == "Renamed")));

        let err = manager
            .write_resource("wh", "people", "http://example.org/a", &turtle("ex:a a ex:Person ."))
            .unwrap_err();
        assert!(err.violations().is_some());

        manager.remove_resource("wh", "people", "http://example.org/a").unwrap();
        let stored = manager.get_graph("wh", "people").unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|t| !t.object.to_string().contains("example.org/a>")));
    }

    #[test]
    fn test_remove_graph_drops_shapes() {
        let manager = manager();
        manager
            .write_graph("wh", "people", &turtle(r#"ex:a a ex:Person ; ex:name "A" ."#), WriteMode::Replace)
            .unwrap();
        manager.remove_graph("wh", "people").unwrap();
        assert!(manager.list_graphs("wh", None).unwrap().is_empty());
        assert!(matches!(
            manager.write_graph("wh", "people", &Graph::new(), WriteMode::Replace),
            Err(StoreError::ShapesMissing(_))
        ));
        assert!(matches!(
            manager.remove_graph("wh", "people"),
            Err(StoreError::GraphNotFound(_))
        ));
    }

    #[test]
    fn test_write_during_shape_update_is_retryable() {
        let manager = manager();
        let _guard = manager.validator().begin_update("wh");
        let err = manager
            .write_graph("wh", "people", &turtle(r#"ex:a a ex:Person ; ex:name "A" ."#), WriteMode::Replace)
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_list_graphs_pattern() {
        let manager = manager();
        let shapes = TurtleCodec.parse(SHAPES.as_bytes(), None).unwrap();
        manager.replace_shape_graph("wh", "projects", &shapes).unwrap();
        assert_eq!(manager.list_graphs("wh", Some("pro.*")).unwrap(), vec!["projects".to_string()]);
        assert_eq!(manager.list_graphs("wh", None).unwrap().len(), 2);
        assert!(matches!(
            manager.list_graphs("wh", Some("(")),
            Err(StoreError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_store_name() {
        let manager = manager();
        assert!(matches!(
            manager.get_graph("wh", "../etc"),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_shapes_suffix_is_reserved() {
        let manager = manager();
        let before = manager.get_shape_graph("wh", "people").unwrap();
        let other = turtle("ex:OtherShape a <http://www.w3.org/ns/shacl#NodeShape> .");

        assert!(matches!(
            manager.replace_shape_graph("wh", "people-shacl", &other),
            Err(StoreError::InvalidName(ref s)) if s == "people-shacl"
        ));
        assert!(matches!(
            manager.write_graph("wh", "people-shacl", &other, WriteMode::Replace),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            manager.remove_graph("wh", "people-shacl"),
            Err(StoreError::InvalidName(_))
        ));
        assert_eq!(manager.get_shape_graph("wh", "people").unwrap(), before);
        assert_eq!(manager.list_graphs("wh", None).unwrap(), vec!["people".to_string()]);
    }

    #[test]
    fn test_write_resource_ignores_other_subjects() {
        let manager = manager();
        manager
            .write_graph("wh", "people", &turtle(r#"ex:a a ex:Person ; ex:name "A" ."#), WriteMode::Replace)
            .unwrap();

        let description = turtle(
            r#"ex:a a ex:Person ; ex:name "Renamed" .
               ex:z a ex:Robot ; ex:serial 42 ."#,
        );
        manager
            .write_resource("wh", "people", "http://example.org/a", &description)
            .unwrap();

        let stored = manager.get_graph("wh", "people").unwrap();
        assert_eq!(stored.len(), 2);
        let z = NamedNodeRef::new("http://example.org/z").unwrap();
        assert_eq!(stored.triples_for_subject(z).count(), 0);
    }

    #[test]
    fn test_add_if_disjoint_keeps_untyped_triples() {
        let manager = manager();
        manager
            .write_graph("wh", "people", &turtle(r#"ex:a a ex:Person ; ex:name "A" ."#), WriteMode::Replace)
            .unwrap();

        let batch = turtle(
            r#"ex:a a ex:Person ; ex:name "Other" .
               ex:note ex:text "untyped" ."#,
        );
        let outcome = manager
            .write_graph("wh", "people", &batch, WriteMode::AddIfDisjoint)
            .unwrap();
        assert!(matches!(outcome, WriteOutcome::Added { added: 0, triples: 1, .. }));
        assert_eq!(outcome.skipped().len(), 1);
        assert_eq!(manager.get_graph("wh", "people").unwrap().len(), 3);

        let again = manager
            .write_graph("wh", "people", &batch, WriteMode::AddIfDisjoint)
            .unwrap();
        assert!(again.is_unchanged());
        assert_eq!(manager.get_graph("wh", "people").unwrap().len(), 3);
    }

    #[test]
    fn test_failed_shape_update_releases_guard() {
        let manager = manager();
        let broken = turtle(
            r#"ex:BadShape a <http://www.w3.org/ns/shacl#NodeShape> ;
                   <http://www.w3.org/ns/shacl#targetClass> ex:Person ;
                   <http://www.w3.org/ns/shacl#property> [
                       <http://www.w3.org/ns/shacl#path> ex:name ;
                       <http://www.w3.org/ns/shacl#datatype> <http://www.w3.org/2001/XMLSchema#string> ] ."#,
        );
        assert!(manager.replace_shape_graph("wh", "people", &broken).is_err());
        assert!(!manager.validator().is_updating("wh"));
        manager
            .write_graph("wh", "people", &turtle(r#"ex:a a ex:Person ; ex:name "A" ."#), WriteMode::Replace)
            .unwrap();
    }
}
