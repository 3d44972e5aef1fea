//! Shape model compiled from a SHACL shapes graph
//!
//! Only the constraint subset the store enforces is read: target class, predicate
//! paths, cardinality, node kind, datatype, class, max length, enumerations and
//! closedness. Loading a shape graph also checks that every property maps onto a
//! catalog descriptor, so a graph that cannot be published is rejected up front.

use crate::rdf::naming::simple_id;
use crate::rdf::vocab::{oslc, rdf, rdfs, sh, xsd};
use oxigraph::model::{
    Graph, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Term, TermRef,
};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Shape-load invariant violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DuplicateShape {
    /// Two shapes share a simple identifier
    #[error("Simple shape name '{alias}' is repeated on SHACL models ({shape}), use rdfs:label to create an alias.")]
    Alias { alias: String, shape: String },

    /// Two shapes target the same class
    #[error("sh:targetClass '{0}' already defined, only one sh:NodeShape per sh:targetClass is allowed.")]
    TargetClass(String),
}

/// Shape errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Duplicate alias or target class
    #[error("{0}")]
    DuplicateShape(#[from] DuplicateShape),

    /// Constraint combination with no catalog counterpart, or unreadable shape
    #[error("Invalid shape {shape}: {message}")]
    InvalidShape { shape: String, message: String },
}

pub type ShapeResult<T> = Result<T, ShapeError>;

/// `sh:nodeKind` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Iri,
    BlankNode,
    Literal,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKind {
    fn from_iri(iri: NamedNodeRef<'_>) -> Option<Self> {
        Some(match iri {
            i if i == sh::IRI => NodeKind::Iri,
            i if i == sh::BLANK_NODE => NodeKind::BlankNode,
            i if i == sh::LITERAL => NodeKind::Literal,
            i if i == sh::BLANK_NODE_OR_IRI => NodeKind::BlankNodeOrIri,
            i if i == sh::BLANK_NODE_OR_LITERAL => NodeKind::BlankNodeOrLiteral,
            i if i == sh::IRI_OR_LITERAL => NodeKind::IriOrLiteral,
            _ => return None,
        })
    }

    /// SHACL IRI of the kind
    pub fn iri(&self) -> NamedNodeRef<'static> {
        match self {
            NodeKind::Iri => sh::IRI,
            NodeKind::BlankNode => sh::BLANK_NODE,
            NodeKind::Literal => sh::LITERAL,
            NodeKind::BlankNodeOrIri => sh::BLANK_NODE_OR_IRI,
            NodeKind::BlankNodeOrLiteral => sh::BLANK_NODE_OR_LITERAL,
            NodeKind::IriOrLiteral => sh::IRI_OR_LITERAL,
        }
    }

    /// Whether `term` is of this kind
    pub fn accepts(&self, term: TermRef<'_>) -> bool {
        let (iri, blank, literal) = match term {
            TermRef::NamedNode(_) => (true, false, false),
            TermRef::BlankNode(_) => (false, true, false),
            TermRef::Literal(_) => (false, false, true),
            #[allow(unreachable_patterns)]
            _ => (false, false, false),
        };
        match self {
            NodeKind::Iri => iri,
            NodeKind::BlankNode => blank,
            NodeKind::Literal => literal,
            NodeKind::BlankNodeOrIri => blank || iri,
            NodeKind::BlankNodeOrLiteral => blank || literal,
            NodeKind::IriOrLiteral => iri || literal,
        }
    }
}

/// `oslc:occurs` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    ExactlyOne,
    OneOrMany,
    ZeroOrMany,
    ZeroOrOne,
}

impl Occurs {
    pub fn iri(&self) -> NamedNodeRef<'static> {
        match self {
            Occurs::ExactlyOne => oslc::EXACTLY_ONE,
            Occurs::OneOrMany => oslc::ONE_OR_MANY,
            Occurs::ZeroOrMany => oslc::ZERO_OR_MANY,
            Occurs::ZeroOrOne => oslc::ZERO_OR_ONE,
        }
    }
}

/// `oslc:valueType` values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// One of the supported literal datatypes
    Literal(NamedNode),
    Resource,
    LocalResource,
    AnyResource,
}

impl ValueType {
    pub fn iri(&self) -> NamedNodeRef<'_> {
        match self {
            ValueType::Literal(datatype) => datatype.as_ref(),
            ValueType::Resource => oslc::RESOURCE,
            ValueType::LocalResource => oslc::LOCAL_RESOURCE,
            ValueType::AnyResource => oslc::ANY_RESOURCE,
        }
    }
}

/// Literal datatypes a property may declare
pub const SUPPORTED_DATATYPES: [NamedNodeRef<'static>; 8] = [
    xsd::BOOLEAN,
    xsd::DATE_TIME,
    xsd::DECIMAL,
    xsd::DOUBLE,
    xsd::FLOAT,
    xsd::INTEGER,
    xsd::STRING,
    rdf::XML_LITERAL,
];

/// Catalog view of one property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub occurs: Occurs,
    pub value_type: Option<ValueType>,
    pub max_size: Option<u64>,
}

/// One `sh:property` of a node shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyShape {
    pub path: NamedNode,
    /// `sh:name`, or the path's local name
    pub name: String,
    pub description: Option<String>,
    pub min_count: Option<u64>,
    pub max_count: Option<u64>,
    pub node_kind: Option<NodeKind>,
    pub datatype: Option<NamedNode>,
    pub class: Option<NamedNode>,
    pub max_length: Option<u64>,
    pub allowed: Option<Vec<Term>>,
}

impl PropertyShape {
    /// Map the constraints onto a catalog descriptor
    pub fn descriptor(&self) -> Result<PropertyDescriptor, String> {
        let path = self.path.as_str();
        let occurs = match (self.min_count.unwrap_or(0), self.max_count) {
            (0, None) => Occurs::ZeroOrMany,
            (0, Some(1)) => Occurs::ZeroOrOne,
            (1, Some(1)) => Occurs::ExactlyOne,
            (1, None) => Occurs::OneOrMany,
            (1, Some(max)) if max > 1 => Occurs::OneOrMany,
            (0, Some(max)) | (1, Some(max)) => {
                return Err(format!(
                    "oslc:occurs <{}> no matching value for sh:maxCount = {}",
                    path, max
                ))
            }
            (min, _) => {
                return Err(format!(
                    "oslc:occurs <{}> no matching value for sh:minCount = {}",
                    path, min
                ))
            }
        };

        let value_type = match (self.node_kind, &self.datatype) {
            (None, None) => None,
            (None, Some(_)) => {
                return Err(format!(
                    "sh:nodeKind property must be present and equal to sh:Literal on <{}> when property sh:datatype is used",
                    path
                ))
            }
            (Some(NodeKind::Literal), None) => {
                return Err(format!(
                    "sh:datatype property must be present on <{}> when property sh:nodeKind is used and equal to sh:Literal",
                    path
                ))
            }
            (Some(NodeKind::Literal), Some(datatype)) => {
                if !SUPPORTED_DATATYPES.contains(&datatype.as_ref()) {
                    return Err(format!(
                        "sh:datatype value <{}> on <{}> is not supported, it is not compatible with any value of oslc:valueType",
                        datatype.as_str(),
                        path
                    ));
                }
                Some(ValueType::Literal(datatype.clone()))
            }
            (Some(_), Some(_)) => {
                return Err(format!(
                    "sh:nodeKind property must be equal to sh:Literal on <{}> when property sh:datatype is used",
                    path
                ))
            }
            (Some(NodeKind::BlankNode), None) => Some(ValueType::LocalResource),
            (Some(NodeKind::Iri), None) => Some(ValueType::Resource),
            (Some(NodeKind::BlankNodeOrIri), None) => Some(ValueType::AnyResource),
            (Some(kind), None) => {
                return Err(format!(
                    "sh:nodeKind value <{}> on <{}> is not supported, it is not compatible with any value of oslc:valueType",
                    kind.iri().as_str(),
                    path
                ))
            }
        };

        if self.max_length.is_some()
            && value_type != Some(ValueType::Literal(xsd::STRING.into_owned()))
        {
            return Err(format!(
                "sh:maxLength is not allowed on <{}>, only allowed in combination with sh:datatype = xsd:string",
                path
            ));
        }

        Ok(PropertyDescriptor {
            occurs,
            value_type,
            max_size: self.max_length,
        })
    }
}

/// One `sh:NodeShape`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeShape {
    pub id: NamedOrBlankNode,
    /// `sh:targetClass`, or the shape itself
    pub target: NamedNode,
    /// `rdfs:label`, or the target's local name
    pub alias: String,
    pub closed: bool,
    /// Closed by normalization, which implicitly permits `rdf:type`
    pub implicit_type: bool,
    pub ignored: Vec<NamedNode>,
    pub properties: Vec<PropertyShape>,
}

impl NodeShape {
    /// Whether a closed shape permits `predicate`
    pub fn permits(&self, predicate: NamedNodeRef<'_>) -> bool {
        (self.implicit_type && predicate == rdf::TYPE)
            || self.properties.iter().any(|p| p.path.as_ref() == predicate)
            || self.ignored.iter().any(|i| i.as_ref() == predicate)
    }
}

/// All shapes of one shape graph, keyed by target class and alias
#[derive(Debug, Clone, Default)]
pub struct ShapeSet {
    shapes: Vec<NodeShape>,
    by_target: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl ShapeSet {
    /// Compile a shapes graph. Shapes without `sh:closed` are closed unless
    /// `open_world` is set.
    pub fn from_graph(graph: &Graph, open_world: bool) -> ShapeResult<Self> {
        let mut ids: Vec<NamedOrBlankNodeRef<'_>> = graph
            .subjects_for_predicate_object(rdf::TYPE, sh::NODE_SHAPE)
            .collect();
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();

        let mut set = ShapeSet::default();
        for id in ids {
            let shape = read_shape(graph, id, open_world)?;

            if set.by_alias.contains_key(&shape.alias) {
                return Err(DuplicateShape::Alias {
                    alias: shape.alias,
                    shape: id.to_string(),
                }
                .into());
            }
            if set.by_target.contains_key(shape.target.as_str()) {
                return Err(DuplicateShape::TargetClass(shape.target.into_string()).into());
            }
            for property in &shape.properties {
                property.descriptor().map_err(|message| ShapeError::InvalidShape {
                    shape: id.to_string(),
                    message,
                })?;
            }

            let index = set.shapes.len();
            set.by_alias.insert(shape.alias.clone(), index);
            set.by_target.insert(shape.target.as_str().to_string(), index);
            set.shapes.push(shape);
        }
        Ok(set)
    }

    /// Shape targeting `class`
    pub fn for_type(&self, class: NamedNodeRef<'_>) -> Option<&NodeShape> {
        self.by_target.get(class.as_str()).map(|&i| &self.shapes[i])
    }

    /// Shape with simple identifier `alias`
    pub fn by_alias(&self, alias: &str) -> Option<&NodeShape> {
        self.by_alias.get(alias).map(|&i| &self.shapes[i])
    }

    /// Shapes ordered by shape identifier
    pub fn iter(&self) -> impl Iterator<Item = &NodeShape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn invalid(shape: impl ToString, message: impl Into<String>) -> ShapeError {
    ShapeError::InvalidShape {
        shape: shape.to_string(),
        message: message.into(),
    }
}

fn read_shape(graph: &Graph, id: NamedOrBlankNodeRef<'_>, open_world: bool) -> ShapeResult<NodeShape> {
    let target = match graph.object_for_subject_predicate(id, sh::TARGET_CLASS) {
        Some(TermRef::NamedNode(class)) => class.into_owned(),
        Some(other) => return Err(invalid(id, format!("sh:targetClass {} is not an IRI", other))),
        None => match id {
            NamedOrBlankNodeRef::NamedNode(node) => node.into_owned(),
            _ => return Err(invalid(id, "a blank node shape needs sh:targetClass")),
        },
    };

    let alias = match graph.object_for_subject_predicate(id, rdfs::LABEL) {
        Some(TermRef::Literal(label)) => label.value().to_string(),
        _ => simple_id(target.as_str()).to_string(),
    };

    let (closed, implicit_type) = match graph.object_for_subject_predicate(id, sh::CLOSED) {
        Some(TermRef::Literal(flag)) => (matches!(flag.value(), "true" | "1"), false),
        Some(other) => return Err(invalid(id, format!("sh:closed {} is not a boolean", other))),
        None => (!open_world, !open_world),
    };

    let ignored = match graph.object_for_subject_predicate(id, sh::IGNORED_PROPERTIES) {
        Some(head) => read_list(graph, head)
            .map_err(|m| invalid(id, m))?
            .into_iter()
            .filter_map(|t| match t {
                Term::NamedNode(n) => Some(n),
                _ => None,
            })
            .collect(),
        None => Vec::new(),
    };

    let mut properties = Vec::new();
    for node in graph.objects_for_subject_predicate(id, sh::PROPERTY) {
        let node = match node {
            TermRef::NamedNode(n) => NamedOrBlankNodeRef::from(n),
            TermRef::BlankNode(b) => NamedOrBlankNodeRef::from(b),
            other => return Err(invalid(id, format!("sh:property {} is not a node", other))),
        };
        properties.push(read_property(graph, node).map_err(|m| invalid(id, m))?);
    }
    properties.sort_by(|a, b| a.path.as_str().cmp(b.path.as_str()));

    Ok(NodeShape {
        id: id.into_owned(),
        target,
        alias,
        closed,
        implicit_type,
        ignored,
        properties,
    })
}

fn read_property(graph: &Graph, node: NamedOrBlankNodeRef<'_>) -> Result<PropertyShape, String> {
    let path = match graph.object_for_subject_predicate(node, sh::PATH) {
        Some(TermRef::NamedNode(path)) => path.into_owned(),
        Some(_) => return Err(format!("only predicate paths are supported on sh:property {}", node)),
        None => return Err(format!("Missing sh:path property on sh:property: {}", node)),
    };
    let text = |predicate: NamedNodeRef<'_>| match graph.object_for_subject_predicate(node, predicate) {
        Some(TermRef::Literal(l)) => Some(l.value().to_string()),
        _ => None,
    };
    let count = |predicate: NamedNodeRef<'_>| -> Result<Option<u64>, String> {
        match graph.object_for_subject_predicate(node, predicate) {
            Some(TermRef::Literal(l)) => l.value().parse().map(Some).map_err(|_| {
                format!("{} on <{}> is not a non-negative integer", predicate, path.as_str())
            }),
            Some(other) => Err(format!("{} on <{}> is not a literal: {}", predicate, path.as_str(), other)),
            None => Ok(None),
        }
    };
    let iri = |predicate: NamedNodeRef<'_>| -> Result<Option<NamedNode>, String> {
        match graph.object_for_subject_predicate(node, predicate) {
            Some(TermRef::NamedNode(n)) => Ok(Some(n.into_owned())),
            Some(other) => Err(format!("{} on <{}> is not an IRI: {}", predicate, path.as_str(), other)),
            None => Ok(None),
        }
    };

    let node_kind = match iri(sh::NODE_KIND)? {
        Some(kind) => Some(NodeKind::from_iri(kind.as_ref()).ok_or_else(|| {
            format!("unknown sh:nodeKind <{}> on <{}>", kind.as_str(), path.as_str())
        })?),
        None => None,
    };
    let allowed = match graph.object_for_subject_predicate(node, sh::IN) {
        Some(head) => Some(read_list(graph, head)?),
        None => None,
    };

    Ok(PropertyShape {
        name: text(sh::NAME).unwrap_or_else(|| simple_id(path.as_str()).to_string()),
        description: text(sh::DESCRIPTION),
        min_count: count(sh::MIN_COUNT)?,
        max_count: count(sh::MAX_COUNT)?,
        node_kind,
        datatype: iri(sh::DATATYPE)?,
        class: iri(sh::CLASS)?,
        max_length: count(sh::MAX_LENGTH)?,
        allowed,
        path,
    })
}

/// Members of an RDF collection
fn read_list(graph: &Graph, head: TermRef<'_>) -> Result<Vec<Term>, String> {
    let mut items = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = head;
    loop {
        let node = match cursor {
            TermRef::NamedNode(n) if n == rdf::NIL => return Ok(items),
            TermRef::NamedNode(n) => NamedOrBlankNodeRef::from(n),
            TermRef::BlankNode(b) => NamedOrBlankNodeRef::from(b),
            other => return Err(format!("{} is not an RDF list", other)),
        };
        if !seen.insert(node) {
            return Err(format!("cyclic RDF list at {}", node));
        }
        match graph.object_for_subject_predicate(node, rdf::FIRST) {
            Some(first) => items.push(first.into_owned()),
            None => return Err(format!("RDF list node {} has no rdf:first", node)),
        }
        cursor = graph
            .object_for_subject_predicate(node, rdf::REST)
            .ok_or_else(|| format!("RDF list node {} has no rdf:rest", node))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{GraphCodec, TurtleCodec};

    const PREFIXES: &str = r#"
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        @prefix ex: <http://example.org/> .
    "#;

    fn load(body: &str) -> ShapeResult<ShapeSet> {
        let graph = TurtleCodec
            .parse(format!("{}{}", PREFIXES, body).as_bytes(), None)
            .unwrap();
        ShapeSet::from_graph(&graph, false)
    }

    fn property(min: Option<u64>, max: Option<u64>) -> PropertyShape {
        PropertyShape {
            path: NamedNode::new("http://example.org/p").unwrap(),
            name: "p".to_string(),
            description: None,
            min_count: min,
            max_count: max,
            node_kind: None,
            datatype: None,
            class: None,
            max_length: None,
            allowed: None,
        }
    }

    #[test]
    fn test_cardinality_mapping() {
        let occurs = |min, max| property(min, max).descriptor().map(|d| d.occurs);
        assert_eq!(occurs(Some(1), Some(1)), Ok(Occurs::ExactlyOne));
        assert_eq!(occurs(Some(0), None), Ok(Occurs::ZeroOrMany));
        assert_eq!(occurs(None, None), Ok(Occurs::ZeroOrMany));
        assert_eq!(occurs(Some(0), Some(1)), Ok(Occurs::ZeroOrOne));
        assert_eq!(occurs(Some(1), None), Ok(Occurs::OneOrMany));
        assert_eq!(occurs(Some(1), Some(5)), Ok(Occurs::OneOrMany));
        assert!(occurs(Some(2), None).is_err());
        assert!(occurs(Some(0), Some(3)).is_err());
    }

    #[test]
    fn test_value_type_mapping() {
        let mut p = property(None, None);
        assert_eq!(p.descriptor().unwrap().value_type, None);

        p.datatype = Some(xsd::STRING.into_owned());
        assert!(p.descriptor().is_err());

        p.node_kind = Some(NodeKind::Literal);
        assert_eq!(
            p.descriptor().unwrap().value_type,
            Some(ValueType::Literal(xsd::STRING.into_owned()))
        );

        p.datatype = Some(NamedNode::new("http://example.org/custom").unwrap());
        assert!(p.descriptor().is_err());

        p.datatype = None;
        assert!(p.descriptor().is_err());

        p.node_kind = Some(NodeKind::BlankNode);
        assert_eq!(p.descriptor().unwrap().value_type, Some(ValueType::LocalResource));
        p.node_kind = Some(NodeKind::Iri);
        assert_eq!(p.descriptor().unwrap().value_type, Some(ValueType::Resource));
        p.node_kind = Some(NodeKind::BlankNodeOrIri);
        assert_eq!(p.descriptor().unwrap().value_type, Some(ValueType::AnyResource));
        p.node_kind = Some(NodeKind::IriOrLiteral);
        assert!(p.descriptor().is_err());

        p.node_kind = Some(NodeKind::Iri);
        p.datatype = Some(xsd::STRING.into_owned());
        assert!(p.descriptor().is_err());
    }

    #[test]
    fn test_max_length_requires_string() {
        let mut p = property(None, None);
        p.max_length = Some(10);
        assert!(p.descriptor().is_err());
        p.node_kind = Some(NodeKind::Literal);
        p.datatype = Some(xsd::INTEGER.into_owned());
        assert!(p.descriptor().is_err());
        p.datatype = Some(xsd::STRING.into_owned());
        assert_eq!(p.descriptor().unwrap().max_size, Some(10));
    }

    #[test]
    fn test_load_shape_graph() {
        let set = load(
            r#"
            ex:PersonShape a sh:NodeShape ;
                sh:targetClass ex:Person ;
                sh:property [ sh:path ex:name ; sh:minCount 1 ; sh:maxCount 1 ;
                              sh:nodeKind sh:Literal ; sh:datatype xsd:string ; sh:maxLength 40 ] ;
                sh:property [ sh:path ex:status ; sh:in ( "open" "closed" ) ] .
            ex:Thing a sh:NodeShape ; rdfs:label "Item" ; sh:closed false .
            "#,
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        let person = set.by_alias("Person").unwrap();
        assert_eq!(person.target.as_str(), "http://example.org/Person");
        assert!(person.closed && person.implicit_type);
        assert!(person.permits(rdf::TYPE));
        assert_eq!(person.properties.len(), 2);
        assert_eq!(person.properties[1].allowed.as_ref().map(Vec::len), Some(2));

        let item = set.by_alias("Item").unwrap();
        assert_eq!(item.target.as_str(), "http://example.org/Thing");
        assert!(!item.closed);
        assert!(set
            .for_type(NamedNodeRef::new("http://example.org/Thing").unwrap())
            .is_some());
    }

    #[test]
    fn test_duplicate_target_class() {
        let err = load(
            r#"
            ex:A a sh:NodeShape ; sh:targetClass ex:Person ; rdfs:label "A" .
            ex:B a sh:NodeShape ; sh:targetClass ex:Person ; rdfs:label "B" .
            "#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ShapeError::DuplicateShape(DuplicateShape::TargetClass(
                "http://example.org/Person".to_string()
            ))
        );
    }

    #[test]
    fn test_duplicate_alias() {
        let err = load(
            r#"
            ex:A a sh:NodeShape ; sh:targetClass ex:Person .
            ex:B a sh:NodeShape ; sh:targetClass <http://other.org/Person> .
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ShapeError::DuplicateShape(DuplicateShape::Alias { ref alias, .. }) if alias == "Person"
        ));
        assert!(err.to_string().contains("use rdfs:label to create an alias"));
    }

    #[test]
    fn test_invalid_cardinality_rejected_at_load() {
        let err = load(
            r#"
            ex:A a sh:NodeShape ; sh:targetClass ex:Person ;
                sh:property [ sh:path ex:name ; sh:minCount 2 ] .
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ShapeError::InvalidShape { .. }));
    }

    #[test]
    fn test_open_world_leaves_shapes_open() {
        let graph = TurtleCodec
            .parse(
                format!("{}ex:A a sh:NodeShape ; sh:targetClass ex:Person .", PREFIXES).as_bytes(),
                None,
            )
            .unwrap();
        let set = ShapeSet::from_graph(&graph, true).unwrap();
        let shape = set.iter().next().unwrap();
        assert!(!shape.closed && !shape.implicit_type);
    }
}
