//! Constraint validation against warehouse shape graphs
//!
//! A [`ConstraintValidator`] compiles each shape graph once into a [`ShapeSet`] and
//! keeps it until a change notification for the warehouse evicts it. Resources are
//! checked against the shape of every type they declare.
//!
//! While a warehouse's shapes are being replaced the validator refuses to hand out
//! shape sets for that warehouse and reports [`ValidationError::ShapesUpdating`].

pub mod report;
pub mod shapes;

pub use report::{Violation, ViolationReport};
pub use shapes::{
    DuplicateShape, NodeKind, NodeShape, Occurs, PropertyDescriptor, PropertyShape, ShapeError,
    ShapeResult, ShapeSet, ValueType,
};

use crate::rdf::vocab::rdf;
use crate::store::events::{ChangeEvent, ChangeListener};
use oxigraph::model::{Graph, NamedOrBlankNodeRef, TermRef};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Shape graph replacement in progress for the warehouse; retry later
    #[error("SHACL Models are being updated, please try later. (warehouse '{0}')")]
    ShapesUpdating(String),

    /// Resource failed its shape constraints
    #[error("Shape violation: {0}")]
    ShapeViolation(ViolationReport),

    /// Shape graph could not be compiled
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

type ShapeKey = (String, String);

/// Shared validator for every warehouse
#[derive(Debug, Default)]
pub struct ConstraintValidator {
    open_world: bool,
    compiled: RwLock<HashMap<ShapeKey, Arc<ShapeSet>>>,
    updating: Mutex<HashMap<String, usize>>,
}

impl ConstraintValidator {
    /// Create a validator. `open_world` disables the closed-world rules.
    pub fn new(open_world: bool) -> Self {
        Self {
            open_world,
            ..Default::default()
        }
    }

    pub fn open_world(&self) -> bool {
        self.open_world
    }

    /// Compile a shape graph with this validator's world assumption
    pub fn compile(&self, graph: &Graph) -> ShapeResult<ShapeSet> {
        ShapeSet::from_graph(graph, self.open_world)
    }

    /// Compiled shapes of `shapes_urn` in `warehouse`, loading through `load` on a miss
    pub fn shapes<E>(
        &self,
        warehouse: &str,
        shapes_urn: &str,
        load: impl FnOnce() -> Result<Graph, E>,
    ) -> Result<Arc<ShapeSet>, E>
    where
        E: From<ValidationError>,
    {
        self.ensure_not_updating(warehouse)?;
        let key = (warehouse.to_string(), shapes_urn.to_string());
        if let Some(set) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(set));
        }

        let graph = load()?;
        let set = Arc::new(self.compile(&graph).map_err(ValidationError::from)?);
        debug!("Compiled {} shape(s) from {} in '{}'", set.len(), shapes_urn, warehouse);
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&set));
        Ok(set)
    }

    /// Mark the warehouse's shapes as being replaced until the guard drops
    pub fn begin_update(&self, warehouse: &str) -> ShapeUpdateGuard<'_> {
        *self
            .updating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(warehouse.to_string())
            .or_insert(0) += 1;
        ShapeUpdateGuard {
            validator: self,
            warehouse: warehouse.to_string(),
        }
    }

    pub fn is_updating(&self, warehouse: &str) -> bool {
        self.updating
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(warehouse)
    }

    pub fn ensure_not_updating(&self, warehouse: &str) -> ValidationResult<()> {
        if self.is_updating(warehouse) {
            return Err(ValidationError::ShapesUpdating(warehouse.to_string()));
        }
        Ok(())
    }

    /// Drop every compiled shape set of `warehouse`
    pub fn evict(&self, warehouse: &str) {
        let mut compiled = self.compiled.write().unwrap_or_else(PoisonError::into_inner);
        let before = compiled.len();
        compiled.retain(|(wh, _), _| wh != warehouse);
        if compiled.len() != before {
            debug!("Evicted {} shape set(s) of '{}'", before - compiled.len(), warehouse);
        }
    }

    /// Validate every subject of `data`. `context` holds already stored triples
    /// consulted for `sh:class`.
    pub fn validate_graph(
        &self,
        shapes: &ShapeSet,
        data: &Graph,
        context: Option<&Graph>,
    ) -> ValidationResult<()> {
        let mut subjects: Vec<NamedOrBlankNodeRef<'_>> = data.iter().map(|t| t.subject).collect();
        subjects.sort_by_cached_key(ToString::to_string);
        subjects.dedup();
        let mut violations = Vec::new();
        for subject in subjects {
            self.check_subject(shapes, subject, data, context, &mut violations);
        }
        finish(violations)
    }

    /// Validate a single resource
    pub fn validate_resource(
        &self,
        shapes: &ShapeSet,
        subject: NamedOrBlankNodeRef<'_>,
        data: &Graph,
        context: Option<&Graph>,
    ) -> ValidationResult<()> {
        let mut violations = Vec::new();
        self.check_subject(shapes, subject, data, context, &mut violations);
        finish(violations)
    }

    fn check_subject(
        &self,
        shapes: &ShapeSet,
        subject: NamedOrBlankNodeRef<'_>,
        data: &Graph,
        context: Option<&Graph>,
        violations: &mut Vec<Violation>,
    ) {
        for ty in data.objects_for_subject_predicate(subject, rdf::TYPE) {
            let TermRef::NamedNode(class) = ty else {
                continue;
            };
            match shapes.for_type(class) {
                Some(shape) => check_shape(shape, subject, data, context, violations),
                None if !self.open_world => violations.push(Violation {
                    focus_node: subject.to_string(),
                    path: Some(rdf::TYPE.to_string()),
                    constraint: "closed-world".to_string(),
                    value: Some(class.to_string()),
                    message: format!("Unknown resource type: {}", class),
                }),
                None => {}
            }
        }
    }
}

impl ChangeListener for ConstraintValidator {
    fn on_change(&self, event: &ChangeEvent) {
        self.evict(&event.warehouse);
    }
}

/// Keeps a warehouse in the "updating" state while alive
#[derive(Debug)]
pub struct ShapeUpdateGuard<'a> {
    validator: &'a ConstraintValidator,
    warehouse: String,
}

impl Drop for ShapeUpdateGuard<'_> {
    fn drop(&mut self) {
        let mut updating = self
            .validator
            .updating
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = updating.get_mut(&self.warehouse) {
            *count -= 1;
            if *count == 0 {
                updating.remove(&self.warehouse);
            }
        }
    }
}

fn finish(violations: Vec<Violation>) -> ValidationResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::ShapeViolation(ViolationReport::new(violations)))
    }
}

fn has_type(graph: &Graph, node: NamedOrBlankNodeRef<'_>, class: TermRef<'_>) -> bool {
    graph
        .objects_for_subject_predicate(node, rdf::TYPE)
        .any(|t| t == class)
}

fn check_shape(
    shape: &NodeShape,
    subject: NamedOrBlankNodeRef<'_>,
    data: &Graph,
    context: Option<&Graph>,
    violations: &mut Vec<Violation>,
) {
    let focus = subject.to_string();
    let mut report = |path: &str, constraint: &str, value: Option<String>, message: String| {
        violations.push(Violation {
            focus_node: focus.clone(),
            path: Some(path.to_string()),
            constraint: format!("sh:{}ConstraintComponent", constraint),
            value,
            message,
        })
    };

    for property in &shape.properties {
        let path = property.path.to_string();
        let values: Vec<TermRef<'_>> = data
            .objects_for_subject_predicate(subject, property.path.as_ref())
            .collect();

        if let Some(min) = property.min_count {
            if (values.len() as u64) < min {
                report(&path, "MinCount", None, format!("Less than {} values on {}", min, path));
            }
        }
        if let Some(max) = property.max_count {
            if values.len() as u64 > max {
                report(&path, "MaxCount", None, format!("More than {} values on {}", max, path));
            }
        }

        for &value in &values {
            if let Some(kind) = property.node_kind {
                if !kind.accepts(value) {
                    report(&path, "NodeKind", Some(value.to_string()), format!("Value does not have node kind {}", kind.iri()));
                }
            }
            if let Some(datatype) = &property.datatype {
                let matches = matches!(value, TermRef::Literal(l) if l.datatype() == datatype.as_ref());
                if !matches {
                    report(&path, "Datatype", Some(value.to_string()), format!("Value does not have datatype {}", datatype));
                }
            }
            if let Some(class) = &property.class {
                let node = match value {
                    TermRef::NamedNode(n) => Some(NamedOrBlankNodeRef::from(n)),
                    TermRef::BlankNode(b) => Some(NamedOrBlankNodeRef::from(b)),
                    _ => None,
                };
                let class_term = TermRef::from(class.as_ref());
                let typed = node.is_some_and(|n| {
                    has_type(data, n, class_term) || context.is_some_and(|c| has_type(c, n, class_term))
                });
                if !typed {
                    report(&path, "Class", Some(value.to_string()), format!("Value is not an instance of {}", class));
                }
            }
            if let Some(max) = property.max_length {
                let length = match value {
                    TermRef::Literal(l) => Some(l.value().chars().count()),
                    TermRef::NamedNode(n) => Some(n.as_str().chars().count()),
                    _ => None,
                };
                if length.map_or(true, |len| len as u64 > max) {
                    report(&path, "MaxLength", Some(value.to_string()), format!("Value has more than {} characters", max));
                }
            }
            if let Some(allowed) = &property.allowed {
                if !allowed.iter().any(|a| a.as_ref() == value) {
                    report(&path, "In", Some(value.to_string()), "Value is not in the list of allowed values".to_string());
                }
            }
        }
    }

    if shape.closed {
        for triple in data.triples_for_subject(subject) {
            if !shape.permits(triple.predicate) {
                let path = triple.predicate.to_string();
                report(
                    &path,
                    "Closed",
                    Some(triple.object.to_string()),
                    format!("Predicate {} is not allowed (closed shape)", path),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{GraphCodec, TurtleCodec};
    use oxigraph::model::NamedNodeRef;
    use std::collections::BTreeSet;

    const SHAPES: &str = r#"
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
        @prefix ex: <http://example.org/> .

        ex:PersonShape a sh:NodeShape ;
            sh:targetClass ex:Person ;
            sh:property [ sh:path ex:name ; sh:minCount 1 ; sh:maxCount 1 ;
                          sh:nodeKind sh:Literal ; sh:datatype xsd:string ; sh:maxLength 10 ] ;
            sh:property [ sh:path ex:status ; sh:in ( "active" "retired" ) ] ;
            sh:property [ sh:path ex:employer ; sh:class ex:Company ; sh:nodeKind sh:IRI ] .
        ex:CompanyShape a sh:NodeShape ; sh:targetClass ex:Company ; sh:closed false .
    "#;

    fn turtle(data: &str) -> Graph {
        let text = format!("@prefix ex: <http://example.org/> .\n{}", data);
        TurtleCodec.parse(text.as_bytes(), None).unwrap()
    }

    fn shape_set(validator: &ConstraintValidator) -> ShapeSet {
        validator
            .compile(&TurtleCodec.parse(SHAPES.as_bytes(), None).unwrap())
            .unwrap()
    }

    fn violations(result: ValidationResult<()>) -> Vec<Violation> {
        match result {
            Err(ValidationError::ShapeViolation(report)) => report.violations,
            other => panic!("expected violations, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_resource() {
        let validator = ConstraintValidator::new(false);
        let shapes = shape_set(&validator);
        let data = turtle(
            r#"ex:alice a ex:Person ; ex:name "Alice" ; ex:status "active" ; ex:employer ex:acme .
               ex:acme a ex:Company ; ex:anything 1 ."#,
        );
        validator.validate_graph(&shapes, &data, None).unwrap();
    }

    #[test]
    fn test_constraint_violations() {
        let validator = ConstraintValidator::new(false);
        let shapes = shape_set(&validator);
        let data = turtle(
            r#"ex:bob a ex:Person ; ex:status "unknown" ; ex:nickname "B" ; ex:employer ex:nowhere ."#,
        );
        let found = violations(validator.validate_graph(&shapes, &data, None));
        let constraints: BTreeSet<&str> = found.iter().map(|v| v.constraint.as_str()).collect();
        assert!(constraints.contains("sh:MinCountConstraintComponent"));
        assert!(constraints.contains("sh:InConstraintComponent"));
        assert!(constraints.contains("sh:ClosedConstraintComponent"));
        assert!(constraints.contains("sh:ClassConstraintComponent"));
        assert!(found.iter().all(|v| v.focus_node == "<http://example.org/bob>"));
    }

    #[test]
    fn test_datatype_and_length() {
        let validator = ConstraintValidator::new(false);
        let shapes = shape_set(&validator);
        let data = turtle(r#"ex:carol a ex:Person ; ex:name "A name far too long" ."#);
        let found = violations(validator.validate_graph(&shapes, &data, None));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].constraint, "sh:MaxLengthConstraintComponent");

        let data = turtle(r#"ex:carol a ex:Person ; ex:name 42 ."#);
        let found = violations(validator.validate_graph(&shapes, &data, None));
        assert_eq!(found[0].constraint, "sh:DatatypeConstraintComponent");
    }

    #[test]
    fn test_class_resolved_from_context() {
        let validator = ConstraintValidator::new(false);
        let shapes = shape_set(&validator);
        let data = turtle(r#"ex:dave a ex:Person ; ex:name "Dave" ; ex:employer ex:acme ."#);
        let stored = turtle("ex:acme a ex:Company .");
        validator.validate_graph(&shapes, &data, Some(&stored)).unwrap();
    }

    #[test]
    fn test_unknown_type_closed_world() {
        let data = turtle("ex:x a ex:Robot .");

        let closed = ConstraintValidator::new(false);
        let found = violations(closed.validate_graph(&shape_set(&closed), &data, None));
        assert!(found[0].message.contains("Unknown resource type"));

        let open = ConstraintValidator::new(true);
        open.validate_graph(&shape_set(&open), &data, None).unwrap();
    }

    #[test]
    fn test_updating_guard_blocks_shapes() {
        let validator = ConstraintValidator::new(false);
        let load = || Ok::<_, ValidationError>(Graph::new());
        {
            let _guard = validator.begin_update("wh");
            assert!(validator.is_updating("wh"));
            assert!(!validator.is_updating("other"));
            assert_eq!(
                validator.shapes("wh", "urn:s-shacl", load).unwrap_err(),
                ValidationError::ShapesUpdating("wh".to_string())
            );
        }
        assert!(!validator.is_updating("wh"));
        assert!(validator.shapes("wh", "urn:s-shacl", load).unwrap().is_empty());
    }

    #[test]
    fn test_cache_and_eviction() {
        let validator = ConstraintValidator::new(false);
        let shapes_graph = TurtleCodec.parse(SHAPES.as_bytes(), None).unwrap();
        let first = validator
            .shapes("wh", "urn:s-shacl", || Ok::<_, ValidationError>(shapes_graph.clone()))
            .unwrap();
        let cached = validator
            .shapes("wh", "urn:s-shacl", || -> Result<Graph, ValidationError> {
                panic!("should be cached")
            })
            .unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        validator.evict("wh");
        let reloaded = validator
            .shapes("wh", "urn:s-shacl", || Ok::<_, ValidationError>(Graph::new()))
            .unwrap();
        assert!(reloaded.is_empty());
        assert!(first
            .for_type(NamedNodeRef::new("http://example.org/Person").unwrap())
            .is_some());
    }
}
