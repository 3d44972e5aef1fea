//! Plain graph filter, evaluated in process over a graph snapshot
//!
//! `where` keeps the subjects satisfying every term; `select` keeps only the listed
//! predicates of those subjects.

use super::ast::{FilterNode, FilterOp, FilterValue};
use super::parser::{parse_filter, parse_projection};
use super::{Clause, QueryError, QueryResult};
use crate::rdf::vocab::xsd;
use crate::rdf::NamespaceManager;
use oxigraph::model::{Graph, NamedNode, NamedOrBlankNodeRef, TermRef};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

enum Matcher {
    Iri(NamedNode),
    Text(String),
    Integer(String),
    Pattern(Regex),
}

impl Matcher {
    fn accepts(&self, object: TermRef<'_>) -> bool {
        match (self, object) {
            (Matcher::Iri(iri), TermRef::NamedNode(node)) => iri.as_ref() == node,
            (Matcher::Text(text), TermRef::Literal(literal)) => literal.value() == text,
            (Matcher::Integer(n), TermRef::Literal(literal)) => {
                literal.datatype() == xsd::INTEGER && literal.value() == n
            }
            (Matcher::Pattern(re), TermRef::Literal(literal)) => re.is_match(literal.value()),
            (Matcher::Pattern(re), TermRef::NamedNode(node)) => re.is_match(node.as_str()),
            _ => false,
        }
    }
}

struct Term {
    predicate: NamedNode,
    matcher: Matcher,
}

/// Compiled `where` / `select` pair
pub struct GraphFilter {
    terms: Vec<Term>,
    projection: Option<Vec<NamedNode>>,
}

impl GraphFilter {
    /// Parse and resolve both clauses; absent clauses keep everything
    pub fn parse(
        where_clause: Option<&str>,
        select: Option<&str>,
        namespaces: &NamespaceManager,
    ) -> QueryResult<Self> {
        let mut terms = Vec::new();
        if let Some(input) = where_clause.filter(|s| !s.trim().is_empty()) {
            for term in parse_filter(input)? {
                let predicate = node(&term.predicate, namespaces, Clause::Filter)?;
                let matcher = match (term.op, term.value) {
                    (FilterOp::Matches, value) => {
                        let source = match &value {
                            FilterValue::String(s) | FilterValue::Integer(s) => s.clone(),
                            FilterValue::Node(n) => node(n, namespaces, Clause::Filter)?.into_string(),
                        };
                        let re = RegexBuilder::new(&source)
                            .case_insensitive(true)
                            .build()
                            .map_err(|e| QueryError::MalformedQuery {
                                clause: Clause::Filter,
                                message: e.to_string(),
                            })?;
                        Matcher::Pattern(re)
                    }
                    (FilterOp::Equals, FilterValue::String(s)) => Matcher::Text(s),
                    (FilterOp::Equals, FilterValue::Integer(n)) => Matcher::Integer(n),
                    (FilterOp::Equals, FilterValue::Node(n)) => {
                        Matcher::Iri(node(&n, namespaces, Clause::Filter)?)
                    }
                };
                terms.push(Term { predicate, matcher });
            }
        }

        let projection = match select.filter(|s| !s.trim().is_empty()) {
            Some(input) => Some(
                parse_projection(input)?
                    .iter()
                    .map(|n| node(n, namespaces, Clause::Projection))
                    .collect::<QueryResult<Vec<_>>>()?,
            ),
            None => None,
        };

        Ok(Self { terms, projection })
    }

    /// Whether the filter keeps every triple
    pub fn is_identity(&self) -> bool {
        self.terms.is_empty() && self.projection.is_none()
    }

    /// Apply the filter to a graph
    pub fn apply(&self, graph: &Graph) -> Graph {
        let selected: Option<HashSet<NamedOrBlankNodeRef<'_>>> = if self.terms.is_empty() {
            None
        } else {
            let subjects: HashSet<_> = graph.iter().map(|t| t.subject).collect();
            Some(
                subjects
                    .into_iter()
                    .filter(|s| {
                        self.terms.iter().all(|term| {
                            graph
                                .objects_for_subject_predicate(*s, term.predicate.as_ref())
                                .any(|o| term.matcher.accepts(o))
                        })
                    })
                    .collect(),
            )
        };

        let mut out = Graph::new();
        for triple in graph.iter() {
            if let Some(selected) = &selected {
                if !selected.contains(&triple.subject) {
                    continue;
                }
            }
            if let Some(projection) = &self.projection {
                if !projection.iter().any(|p| p.as_ref() == triple.predicate) {
                    continue;
                }
            }
            out.insert(triple);
        }
        out
    }
}

fn node(node: &FilterNode, namespaces: &NamespaceManager, clause: Clause) -> QueryResult<NamedNode> {
    let iri = node.resolve(namespaces).map_err(|_| match node {
        FilterNode::Prefixed { prefix, .. } => QueryError::UnknownPrefix {
            clause,
            prefix: prefix.clone(),
        },
        FilterNode::Iri(iri) => QueryError::MalformedQuery {
            clause,
            message: format!("invalid IRI <{}>", iri),
        },
    })?;
    NamedNode::new(&iri).map_err(|e| QueryError::MalformedQuery {
        clause,
        message: e.to_string(),
    })
}
