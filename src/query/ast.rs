//! Abstract syntax tree for query criteria
//!
//! Each mini-language parses into its own owned tree: conditions for `oslc.where`,
//! selections for `oslc.select`, sort keys for `oslc.orderBy`. A node is either a
//! leaf or a scoped node whose children apply to the property's object.

use crate::rdf::NamespaceManager;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw query parameters as received from a caller. Absent means "none".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// `oslc.prefix`
    #[serde(default, rename = "oslc.prefix", skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// `oslc.select`
    #[serde(default, rename = "oslc.select", skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    /// `oslc.where`
    #[serde(default, rename = "oslc.where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    /// `oslc.orderBy`
    #[serde(default, rename = "oslc.orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

/// Property reference: `*` or `prefix:local`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Any property
    Wildcard,
    /// Prefixed name
    Prefixed { prefix: String, local: String },
}

impl Identifier {
    /// Prefixed identifier
    pub fn prefixed(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Identifier::Prefixed {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    /// Expanded IRI, or `None` for the wildcard
    pub fn resolve(&self, namespaces: &NamespaceManager) -> Option<crate::rdf::PrefixResult<String>> {
        match self {
            Identifier::Wildcard => None,
            Identifier::Prefixed { prefix, local } => Some(namespaces.resolve(prefix, local)),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Wildcard => write!(f, "*"),
            Identifier::Prefixed { prefix, local } => write!(f, "{}:{}", prefix, local),
        }
    }
}

/// Language tag or datatype attached to a string literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralAnnotation {
    Language(String),
    Datatype { prefix: String, local: String },
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `<iri>`
    Iri(String),
    /// `true` / `false`
    Boolean(bool),
    /// Numeric literal, kept in its lexical form
    Number(String),
    /// Quoted string, unescaped
    Literal {
        lexical: String,
        annotation: Option<LiteralAnnotation>,
    },
}

impl Value {
    /// Plain string literal
    pub fn string(lexical: impl Into<String>) -> Self {
        Value::Literal {
            lexical: lexical.into(),
            annotation: None,
        }
    }

    /// Lexical form, used by text matching
    pub fn lexical(&self) -> &str {
        match self {
            Value::Iri(iri) => iri,
            Value::Boolean(true) => "true",
            Value::Boolean(false) => "false",
            Value::Number(n) => n,
            Value::Literal { lexical, .. } => lexical,
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    /// Case-insensitive substring match
    Matches,
}

impl ComparisonOp {
    /// Operator token as written in a where clause
    pub fn token(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Gt => ">",
            ComparisonOp::Le => "<=",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Matches => "~",
        }
    }

    pub(crate) fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => ComparisonOp::Eq,
            "!=" => ComparisonOp::Ne,
            "<" => ComparisonOp::Lt,
            ">" => ComparisonOp::Gt,
            "<=" => ComparisonOp::Le,
            ">=" => ComparisonOp::Ge,
            "~" => ComparisonOp::Matches,
            _ => return None,
        })
    }
}

/// One `oslc.where` term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `property op value`
    Compare {
        property: Identifier,
        op: ComparisonOp,
        value: Value,
    },
    /// `property in [v1,v2]`
    In {
        property: Identifier,
        values: Vec<Value>,
    },
    /// `property{nested and terms}`
    Scoped {
        property: Identifier,
        terms: Vec<Condition>,
    },
}

impl Condition {
    /// Property the term constrains
    pub fn property(&self) -> &Identifier {
        match self {
            Condition::Compare { property, .. }
            | Condition::In { property, .. }
            | Condition::Scoped { property, .. } => property,
        }
    }
}

/// One `oslc.select` term with its nested projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub property: Identifier,
    pub children: Vec<Selection>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One `oslc.orderBy` term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// `+prop` / `-prop`
    Leaf {
        property: Identifier,
        direction: SortDirection,
    },
    /// `prop{+nested}`
    Scoped {
        property: Identifier,
        keys: Vec<SortKey>,
    },
}

/// Parsed query criteria. Built once per request.
#[derive(Debug, Clone)]
pub struct QueryCriteria {
    /// Declared type the search is scoped to, as a full IRI
    pub resource_type: Option<String>,
    /// Built-in prefixes merged with the declared ones
    pub namespaces: NamespaceManager,
    pub select: Vec<Selection>,
    pub conditions: Vec<Condition>,
    pub order_by: Vec<SortKey>,
}

impl QueryCriteria {
    /// Criteria with no projection, filter, sort or extra prefixes
    pub fn new() -> Self {
        Self {
            resource_type: None,
            namespaces: NamespaceManager::new(),
            select: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Scope the search to one declared type
    pub fn with_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }
}

impl Default for QueryCriteria {
    fn default() -> Self {
        Self::new()
    }
}

/// One term of the plain graph filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTerm {
    pub predicate: FilterNode,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// An IRI written either in full or as a prefixed name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    Iri(String),
    Prefixed { prefix: String, local: String },
}

impl FilterNode {
    /// Expanded IRI
    pub fn resolve(&self, namespaces: &NamespaceManager) -> crate::rdf::PrefixResult<String> {
        match self {
            FilterNode::Iri(iri) => Ok(iri.clone()),
            FilterNode::Prefixed { prefix, local } => namespaces.resolve(prefix, local),
        }
    }
}

/// Graph filter operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact triple
    Equals,
    /// Case-insensitive regex on the lexical form
    Matches,
}

/// Graph filter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    String(String),
    Integer(String),
    Node(FilterNode),
}
