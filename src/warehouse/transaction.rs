//! Staged transactions over a warehouse store
//!
//! Reads go straight to the committed state. Writes are recorded as operations and
//! only touch the store on [`Transaction::commit`], which applies them in order inside
//! a single engine transaction.

use super::{Warehouse, WarehouseError, WarehouseResult};
use oxigraph::model::{
    Graph, GraphName, GraphNameRef, NamedNode, NamedNodeRef, NamedOrBlankNode,
    NamedOrBlankNodeRef, Quad, Term, TermRef, Triple, TripleRef,
};
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::{StorageError, Store, Transaction as StoreTransaction};
use std::sync::{RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Transaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Shared; concurrent with other readers
    Read,
    /// Exclusive; excludes readers and other writers
    Write,
}

enum Guard<'a> {
    Read(#[allow(dead_code)] RwLockReadGuard<'a, ()>),
    Write(#[allow(dead_code)] RwLockWriteGuard<'a, ()>),
}

#[derive(Debug, Clone)]
enum Op {
    Insert(Quad),
    Remove(Quad),
    CreateGraph(NamedNode),
    DropGraph(NamedNode),
    /// Remove every quad of `graph` matching the optional subject and object
    RemoveMatching {
        graph: GraphName,
        subject: Option<NamedOrBlankNode>,
        object: Option<Term>,
    },
}

/// A read or write transaction holding the warehouse lock
pub struct Transaction<'a> {
    warehouse: &'a Warehouse,
    guard: Guard<'a>,
    ops: Vec<Op>,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub(super) fn read(warehouse: &'a Warehouse, guard: RwLockReadGuard<'a, ()>) -> Self {
        Self::new(warehouse, Guard::Read(guard))
    }

    pub(super) fn write(warehouse: &'a Warehouse, guard: RwLockWriteGuard<'a, ()>) -> Self {
        Self::new(warehouse, Guard::Write(guard))
    }

    fn new(warehouse: &'a Warehouse, guard: Guard<'a>) -> Self {
        debug!("Begin transaction on '{}'", warehouse.name());
        Self {
            warehouse,
            guard,
            ops: Vec::new(),
            finished: false,
        }
    }

    /// Transaction mode
    pub fn mode(&self) -> TxMode {
        match self.guard {
            Guard::Read(_) => TxMode::Read,
            Guard::Write(_) => TxMode::Write,
        }
    }

    /// Warehouse this transaction runs against
    pub fn warehouse(&self) -> &'a Warehouse {
        self.warehouse
    }

    /// Number of staged write operations
    pub fn staged(&self) -> usize {
        self.ops.len()
    }

    fn store(&self) -> &Store {
        self.warehouse.store()
    }

    // ---------------------------------------------------------------------
    // Reads (committed state only)
    // ---------------------------------------------------------------------

    /// Names of all named graphs, sorted
    pub fn list_graph_names(&self) -> WarehouseResult<Vec<NamedNode>> {
        let mut names = Vec::new();
        for name in self.store().named_graphs() {
            if let NamedOrBlankNode::NamedNode(name) = name? {
                names.push(name);
            }
        }
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(names)
    }

    /// Whether a named graph exists
    pub fn contains_graph(&self, graph: NamedNodeRef<'_>) -> WarehouseResult<bool> {
        Ok(self.store().contains_named_graph(graph)?)
    }

    /// Snapshot of a named graph
    pub fn graph(&self, graph: NamedNodeRef<'_>) -> WarehouseResult<Graph> {
        self.snapshot(None, None, graph.into())
    }

    /// Snapshot of the default graph
    pub fn default_graph(&self) -> WarehouseResult<Graph> {
        self.snapshot(None, None, GraphNameRef::DefaultGraph)
    }

    /// Triples of `graph` whose subject is `subject`
    pub fn triples_for_subject(
        &self,
        graph: NamedNodeRef<'_>,
        subject: NamedOrBlankNodeRef<'_>,
    ) -> WarehouseResult<Graph> {
        self.snapshot(Some(subject), None, graph.into())
    }

    fn snapshot(
        &self,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        object: Option<TermRef<'_>>,
        graph: GraphNameRef<'_>,
    ) -> WarehouseResult<Graph> {
        let mut out = Graph::new();
        for quad in self.store().quads_for_pattern(subject, None, object, Some(graph)) {
            out.insert(&Triple::from(quad?));
        }
        Ok(out)
    }

    /// Evaluate a CONSTRUCT query against the committed state
    pub fn construct(&self, sparql: &str) -> WarehouseResult<Graph> {
        let query = SparqlEvaluator::new()
            .parse_query(sparql)
            .map_err(|e| WarehouseError::QueryEvaluation(e.to_string()))?;
        let results = query
            .on_store(self.store())
            .execute()
            .map_err(|e| WarehouseError::QueryEvaluation(e.to_string()))?;

        let QueryResults::Graph(triples) = results else {
            return Err(WarehouseError::QueryEvaluation(
                "expected a CONSTRUCT query".to_string(),
            ));
        };
        let mut out = Graph::new();
        for triple in triples {
            let triple = triple.map_err(|e| WarehouseError::QueryEvaluation(e.to_string()))?;
            out.insert(&triple);
        }
        Ok(out)
    }

    // ---------------------------------------------------------------------
    // Staged writes
    // ---------------------------------------------------------------------

    fn stage(&mut self, op: Op) -> WarehouseResult<()> {
        if self.mode() != TxMode::Write {
            return Err(WarehouseError::ReadOnly);
        }
        self.ops.push(op);
        Ok(())
    }

    /// Insert a triple into a named graph
    pub fn insert(&mut self, graph: NamedNodeRef<'_>, triple: TripleRef<'_>) -> WarehouseResult<()> {
        self.stage(Op::Insert(triple.in_graph(graph).into_owned()))
    }

    /// Remove a triple from a named graph
    pub fn remove(&mut self, graph: NamedNodeRef<'_>, triple: TripleRef<'_>) -> WarehouseResult<()> {
        self.stage(Op::Remove(triple.in_graph(graph).into_owned()))
    }

    /// Create an empty named graph if absent
    pub fn create_graph(&mut self, graph: NamedNodeRef<'_>) -> WarehouseResult<()> {
        self.stage(Op::CreateGraph(graph.into_owned()))
    }

    /// Remove every triple of a named graph, keeping the graph
    pub fn clear_graph(&mut self, graph: NamedNodeRef<'_>) -> WarehouseResult<()> {
        self.stage(Op::RemoveMatching {
            graph: graph.into_owned().into(),
            subject: None,
            object: None,
        })
    }

    /// Remove a named graph and its triples
    pub fn drop_graph(&mut self, graph: NamedNodeRef<'_>) -> WarehouseResult<()> {
        self.stage(Op::DropGraph(graph.into_owned()))
    }

    /// Replace the content of a named graph, creating it if absent
    pub fn replace_graph(&mut self, graph: NamedNodeRef<'_>, content: &Graph) -> WarehouseResult<()> {
        self.clear_graph(graph)?;
        self.add_all(graph, content)
    }

    /// Add every triple of `content` to a named graph, creating it if absent
    pub fn add_all(&mut self, graph: NamedNodeRef<'_>, content: &Graph) -> WarehouseResult<()> {
        self.create_graph(graph)?;
        for triple in content.iter() {
            self.insert(graph, triple)?;
        }
        Ok(())
    }

    /// Remove every triple of `graph` whose subject is `subject`
    pub fn remove_subject(
        &mut self,
        graph: NamedNodeRef<'_>,
        subject: NamedOrBlankNodeRef<'_>,
    ) -> WarehouseResult<()> {
        self.stage(Op::RemoveMatching {
            graph: graph.into_owned().into(),
            subject: Some(subject.into_owned()),
            object: None,
        })
    }

    /// Remove every triple of `graph` whose object is `object`
    pub fn remove_references(
        &mut self,
        graph: NamedNodeRef<'_>,
        object: TermRef<'_>,
    ) -> WarehouseResult<()> {
        self.stage(Op::RemoveMatching {
            graph: graph.into_owned().into(),
            subject: None,
            object: Some(object.into_owned()),
        })
    }

    /// Replace the content of the default graph
    pub fn replace_default_graph(&mut self, content: &Graph) -> WarehouseResult<()> {
        self.stage(Op::RemoveMatching {
            graph: GraphName::DefaultGraph,
            subject: None,
            object: None,
        })?;
        for triple in content.iter() {
            self.stage(Op::Insert(triple.in_graph(GraphNameRef::DefaultGraph).into_owned()))?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Completion
    // ---------------------------------------------------------------------

    /// Apply staged operations in one engine transaction. Either every operation
    /// lands or none does; the engine error is returned unmodified.
    pub fn commit(mut self) -> WarehouseResult<()> {
        self.finished = true;
        let ops = std::mem::take(&mut self.ops);
        let mut txn = self.warehouse.store().start_transaction()?;
        for op in &ops {
            apply(&mut txn, op)?;
        }
        txn.commit()?;
        debug!(
            "Committed {} operations on '{}'",
            ops.len(),
            self.warehouse.name()
        );
        Ok(())
    }

    /// Discard staged operations
    pub fn abort(mut self) {
        self.finished = true;
        debug!(
            "Aborted transaction on '{}' ({} staged operations)",
            self.warehouse.name(),
            self.ops.len()
        );
        self.ops.clear();
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished && !self.ops.is_empty() {
            debug!(
                "Discarding {} staged operations on '{}'",
                self.ops.len(),
                self.warehouse.name()
            );
        }
    }
}

fn apply(txn: &mut StoreTransaction<'_>, op: &Op) -> Result<(), StorageError> {
    match op {
        Op::Insert(quad) => txn.insert(quad.as_ref()),
        Op::Remove(quad) => txn.remove(quad.as_ref()),
        Op::CreateGraph(graph) => txn.insert_named_graph(graph.as_ref()),
        Op::DropGraph(graph) => txn.remove_named_graph(graph.as_ref())?,
        Op::RemoveMatching {
            graph,
            subject: None,
            object: None,
        } => txn.clear_graph(graph.as_ref())?,
        Op::RemoveMatching {
            graph,
            subject,
            object,
        } => {
            let quads = txn
                .quads_for_pattern(
                    subject.as_ref().map(NamedOrBlankNode::as_ref),
                    None,
                    object.as_ref().map(Term::as_ref),
                    Some(graph.as_ref()),
                )
                .collect::<Result<Vec<_>, _>>()?;
            for quad in &quads {
                txn.remove(quad.as_ref());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::Literal;

    fn node(iri: &str) -> NamedNode {
        NamedNode::new(iri).unwrap()
    }

    fn sample() -> (NamedNode, Triple) {
        let g = node("urn:people");
        let t = Triple::new(
            node("http://ex/alice"),
            node("http://xmlns.com/foaf/0.1/name"),
            Literal::new_simple_literal("Alice"),
        );
        (g, t)
    }

    #[test]
    fn test_staged_writes_are_invisible_until_commit() {
        let wh = Warehouse::open("wh", None).unwrap();
        let (g, t) = sample();

        let mut tx = wh.begin(TxMode::Write);
        tx.insert(g.as_ref(), t.as_ref()).unwrap();
        assert_eq!(tx.staged(), 1);
        assert!(tx.graph(g.as_ref()).unwrap().is_empty());
        tx.commit().unwrap();

        let tx = wh.begin(TxMode::Read);
        assert!(tx.graph(g.as_ref()).unwrap().contains(&t));
        assert!(tx.contains_graph(g.as_ref()).unwrap());
    }

    #[test]
    fn test_abort_and_drop_discard() {
        let wh = Warehouse::open("wh", None).unwrap();
        let (g, t) = sample();

        let mut tx = wh.begin(TxMode::Write);
        tx.insert(g.as_ref(), t.as_ref()).unwrap();
        tx.abort();

        {
            let mut tx = wh.begin(TxMode::Write);
            tx.create_graph(g.as_ref()).unwrap();
        }

        let tx = wh.begin(TxMode::Read);
        assert!(tx.list_graph_names().unwrap().is_empty());
    }

    #[test]
    fn test_read_transaction_rejects_writes() {
        let wh = Warehouse::open("wh", None).unwrap();
        let (g, _) = sample();
        let mut tx = wh.begin(TxMode::Read);
        assert!(matches!(
            tx.create_graph(g.as_ref()),
            Err(WarehouseError::ReadOnly)
        ));
    }

    #[test]
    fn test_replace_and_drop_graph() {
        let wh = Warehouse::open("wh", None).unwrap();
        let (g, t) = sample();
        let other = Triple::new(
            node("http://ex/bob"),
            node("http://xmlns.com/foaf/0.1/knows"),
            node("http://ex/alice"),
        );

        let mut tx = wh.begin(TxMode::Write);
        tx.insert(g.as_ref(), t.as_ref()).unwrap();
        tx.commit().unwrap();

        let mut replacement = Graph::new();
        replacement.insert(&other);
        let mut tx = wh.begin(TxMode::Write);
        tx.replace_graph(g.as_ref(), &replacement).unwrap();
        tx.commit().unwrap();

        let tx = wh.begin(TxMode::Read);
        let content = tx.graph(g.as_ref()).unwrap();
        assert_eq!(content.len(), 1);
        assert!(content.contains(&other));
        drop(tx);

        let mut tx = wh.begin(TxMode::Write);
        tx.drop_graph(g.as_ref()).unwrap();
        tx.commit().unwrap();
        let tx = wh.begin(TxMode::Read);
        assert!(!tx.contains_graph(g.as_ref()).unwrap());
    }

    #[test]
    fn test_remove_subject_and_references() {
        let wh = Warehouse::open("wh", None).unwrap();
        let (g, t) = sample();
        let link = Triple::new(
            node("http://ex/bob"),
            node("http://xmlns.com/foaf/0.1/knows"),
            node("http://ex/alice"),
        );

        let mut tx = wh.begin(TxMode::Write);
        tx.insert(g.as_ref(), t.as_ref()).unwrap();
        tx.insert(g.as_ref(), link.as_ref()).unwrap();
        tx.commit().unwrap();

        let alice = node("http://ex/alice");
        let mut tx = wh.begin(TxMode::Write);
        tx.remove_subject(g.as_ref(), alice.as_ref().into()).unwrap();
        tx.remove_references(g.as_ref(), alice.as_ref().into()).unwrap();
        tx.commit().unwrap();

        let tx = wh.begin(TxMode::Read);
        assert!(tx.graph(g.as_ref()).unwrap().is_empty());
        assert!(tx.contains_graph(g.as_ref()).unwrap());
    }

    #[test]
    fn test_commit_lands_every_operation_together() {
        let wh = Warehouse::open("wh", None).unwrap();
        let (g, t) = sample();
        let shapes = node("urn:people-shacl");
        let renamed = Triple::new(
            node("http://ex/alice"),
            node("http://xmlns.com/foaf/0.1/name"),
            Literal::new_simple_literal("Alicia"),
        );

        let mut tx = wh.begin(TxMode::Write);
        tx.insert(g.as_ref(), t.as_ref()).unwrap();
        tx.insert(shapes.as_ref(), t.as_ref()).unwrap();
        tx.commit().unwrap();

        let alice = node("http://ex/alice");
        let mut tx = wh.begin(TxMode::Write);
        tx.remove_subject(g.as_ref(), alice.as_ref().into()).unwrap();
        tx.insert(g.as_ref(), renamed.as_ref()).unwrap();
        tx.drop_graph(shapes.as_ref()).unwrap();
        tx.replace_default_graph(&Graph::new()).unwrap();
        assert_eq!(tx.staged(), 4);
        tx.commit().unwrap();

        let tx = wh.begin(TxMode::Read);
        let content = tx.graph(g.as_ref()).unwrap();
        assert_eq!(content.len(), 1);
        assert!(content.contains(&renamed));
        assert_eq!(tx.list_graph_names().unwrap(), vec![g]);
    }

    #[test]
    fn test_construct() {
        let wh = Warehouse::open("wh", None).unwrap();
        let (g, t) = sample();
        let mut tx = wh.begin(TxMode::Write);
        tx.insert(g.as_ref(), t.as_ref()).unwrap();
        tx.commit().unwrap();

        let tx = wh.begin(TxMode::Read);
        let result = tx
            .construct("CONSTRUCT { ?s ?p ?o } FROM <urn:people> WHERE { ?s ?p ?o }")
            .unwrap();
        assert_eq!(result.len(), 1);

        assert!(matches!(
            tx.construct("SELECT * WHERE { ?s ?p ?o }"),
            Err(WarehouseError::QueryEvaluation(_))
        ));
    }
}
