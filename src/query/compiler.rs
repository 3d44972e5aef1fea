//! Criteria → SPARQL CONSTRUCT compiler
//!
//! The result resource is always `?match`. Every property edge gets a variable named
//! after its parent variable and local name, allocated once per (parent, property)
//! so a path mentioned twice is emitted once. Selections and sort keys hang off
//! their parent as nested `OPTIONAL` groups; where-terms are required patterns.

use super::ast::*;
use super::{Clause, QueryError, QueryResult};
use crate::rdf::vocab::{rdf, rdfs};
use crate::rdf::NamespaceManager;
use indexmap::IndexSet;
use oxigraph::model::NamedNode;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Variable bound to each result resource
pub const MATCH_VAR: &str = "match";

const ROOT: usize = 0;

/// A compiled search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// CONSTRUCT query text
    pub sparql: String,
    /// Container IRI the results are attached to with `rdfs:member`
    pub base: String,
}

/// Compile criteria into a CONSTRUCT over `graphs` (default graph when empty)
pub fn compile(criteria: &QueryCriteria, base: &str, graphs: &[String]) -> QueryResult<CompiledQuery> {
    let mut builder = Builder::new(&criteria.namespaces);

    match &criteria.resource_type {
        Some(resource_type) => {
            let resource_type =
                NamedNode::new(resource_type.as_str()).map_err(|e| QueryError::MalformedQuery {
                    clause: Clause::Where,
                    message: format!("invalid resource type <{}>: {}", resource_type, e),
                })?;
            let typed = format!("?{} <{}> {}", MATCH_VAR, rdf::TYPE.as_str(), resource_type);
            builder.template.insert(format!("{} .", typed));
            builder.groups[ROOT].push(Pattern::Triple(typed));
        }
        None if criteria.conditions.is_empty() => {
            let p = builder.fresh(&format!("{}_p", MATCH_VAR));
            let o = builder.fresh(&format!("{}_o", MATCH_VAR));
            builder.groups[ROOT].push(Pattern::Triple(format!("?{} ?{} ?{}", MATCH_VAR, p, o)));
        }
        None => {}
    }

    for condition in &criteria.conditions {
        builder.condition(MATCH_VAR, ROOT, condition)?;
    }

    if criteria.resource_type.is_none() && !builder.constrains_type(&criteria.conditions) {
        let t = builder.fresh(&format!("{}_anyType", MATCH_VAR));
        let group = builder.group(vec![Pattern::Triple(format!(
            "?{} <{}> ?{}",
            MATCH_VAR,
            rdf::TYPE.as_str(),
            t
        ))]);
        builder.groups[ROOT].push(Pattern::NotExists(group));
    }

    for selection in &criteria.select {
        builder.selection(MATCH_VAR, ROOT, selection)?;
    }
    for key in &criteria.order_by {
        builder.sort_key(MATCH_VAR, ROOT, key)?;
    }

    Ok(CompiledQuery {
        sparql: builder.render(base, graphs),
        base: base.to_string(),
    })
}

enum Pattern {
    Triple(String),
    Filter(String),
    Optional(usize),
    NotExists(usize),
}

struct Binding {
    var: String,
    predicate: String,
    /// Group the children of `var` are emitted into
    group: usize,
}

struct Builder<'a> {
    namespaces: &'a NamespaceManager,
    groups: Vec<Vec<Pattern>>,
    bindings: HashMap<(String, String), Binding>,
    used: HashSet<String>,
    template: IndexSet<String>,
    order: Vec<String>,
}

impl<'a> Builder<'a> {
    fn new(namespaces: &'a NamespaceManager) -> Self {
        Self {
            namespaces,
            groups: vec![Vec::new()],
            bindings: HashMap::new(),
            used: HashSet::from([MATCH_VAR.to_string()]),
            template: IndexSet::new(),
            order: Vec::new(),
        }
    }

    fn group(&mut self, patterns: Vec<Pattern>) -> usize {
        self.groups.push(patterns);
        self.groups.len() - 1
    }

    /// Unused variable name derived from `base`
    fn fresh(&mut self, base: &str) -> String {
        let base: String = base
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        let mut name = base.clone();
        let mut n = 2;
        while self.used.contains(&name) {
            name = format!("{}{}", base, n);
            n += 1;
        }
        self.used.insert(name.clone());
        name
    }

    fn resolve(&self, prefix: &str, local: &str, clause: Clause) -> QueryResult<String> {
        self.namespaces
            .resolve(prefix, local)
            .map_err(|_| QueryError::UnknownPrefix {
                clause,
                prefix: prefix.to_string(),
            })
    }

    /// Variable for the object of `parent property ?var`, allocated on first use
    fn bind(
        &mut self,
        parent: &str,
        group: usize,
        property: &Identifier,
        clause: Clause,
        optional: bool,
    ) -> QueryResult<(String, usize, String)> {
        let key = match property {
            Identifier::Wildcard => "*".to_string(),
            Identifier::Prefixed { prefix, local } => self.resolve(prefix, local, clause)?,
        };
        if let Some(b) = self.bindings.get(&(parent.to_string(), key.clone())) {
            return Ok((b.var.clone(), b.group, b.predicate.clone()));
        }

        let (var, predicate) = match property {
            Identifier::Wildcard => {
                let var = self.fresh(&format!("{}_all", parent));
                let predicate = self.fresh(&format!("{}Prop", var));
                (var, format!("?{}", predicate))
            }
            Identifier::Prefixed { local, .. } => {
                (self.fresh(&format!("{}_{}", parent, local)), format!("<{}>", key))
            }
        };
        let triple = Pattern::Triple(format!("?{} {} ?{}", parent, predicate, var));
        let child_group = if optional {
            let g = self.group(vec![triple]);
            self.groups[group].push(Pattern::Optional(g));
            g
        } else {
            self.groups[group].push(triple);
            group
        };

        self.bindings.insert(
            (parent.to_string(), key),
            Binding {
                var: var.clone(),
                predicate: predicate.clone(),
                group: child_group,
            },
        );
        Ok((var, child_group, predicate))
    }

    fn constrains_type(&self, conditions: &[Condition]) -> bool {
        conditions.iter().any(|c| match c.property() {
            Identifier::Prefixed { prefix, local } => self
                .namespaces
                .resolve(prefix, local)
                .map(|iri| iri == rdf::TYPE.as_str())
                .unwrap_or(false),
            Identifier::Wildcard => false,
        })
    }

    fn term(&self, value: &Value) -> QueryResult<String> {
        Ok(match value {
            Value::Iri(iri) => format!("<{}>", iri),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => n.clone(),
            Value::Literal {
                lexical,
                annotation,
            } => match annotation {
                None => sparql_string(lexical),
                Some(LiteralAnnotation::Language(tag)) => {
                    format!("{}@{}", sparql_string(lexical), tag)
                }
                Some(LiteralAnnotation::Datatype { prefix, local }) => format!(
                    "{}^^<{}>",
                    sparql_string(lexical),
                    self.resolve(prefix, local, Clause::Where)?
                ),
            },
        })
    }

    fn condition(&mut self, parent: &str, group: usize, condition: &Condition) -> QueryResult<()> {
        match condition {
            Condition::Compare {
                property,
                op: ComparisonOp::Eq,
                value,
            } => {
                let object = self.term(value)?;
                let predicate = match property {
                    Identifier::Wildcard => format!("?{}", self.fresh(&format!("{}_anyProp", parent))),
                    Identifier::Prefixed { prefix, local } => {
                        format!("<{}>", self.resolve(prefix, local, Clause::Where)?)
                    }
                };
                self.groups[group].push(Pattern::Triple(format!(
                    "?{} {} {}",
                    parent, predicate, object
                )));
            }
            Condition::Compare {
                property,
                op: ComparisonOp::Matches,
                value,
            } => {
                let (var, _, _) = self.bind(parent, group, property, Clause::Where, false)?;
                let pattern = sparql_string(&regex::escape(value.lexical()));
                self.groups[group].push(Pattern::Filter(format!(
                    "regex(str(?{}), {}, \"i\")",
                    var, pattern
                )));
            }
            Condition::Compare {
                property,
                op,
                value,
            } => {
                let (var, _, _) = self.bind(parent, group, property, Clause::Where, false)?;
                let object = self.term(value)?;
                self.groups[group].push(Pattern::Filter(format!(
                    "?{} {} {}",
                    var,
                    op.token(),
                    object
                )));
            }
            Condition::In { property, values } => {
                let (var, _, _) = self.bind(parent, group, property, Clause::Where, false)?;
                let list = values
                    .iter()
                    .map(|v| self.term(v))
                    .collect::<QueryResult<Vec<_>>>()?
                    .join(", ");
                self.groups[group].push(Pattern::Filter(format!("?{} IN ({})", var, list)));
            }
            Condition::Scoped { property, terms } => {
                let (var, child_group, _) =
                    self.bind(parent, group, property, Clause::Where, false)?;
                for term in terms {
                    self.condition(&var, child_group, term)?;
                }
            }
        }
        Ok(())
    }

    fn selection(&mut self, parent: &str, group: usize, selection: &Selection) -> QueryResult<()> {
        let (var, child_group, predicate) =
            self.bind(parent, group, &selection.property, Clause::Select, true)?;
        self.template
            .insert(format!("?{} {} ?{} .", parent, predicate, var));
        for child in &selection.children {
            self.selection(&var, child_group, child)?;
        }
        Ok(())
    }

    fn sort_key(&mut self, parent: &str, group: usize, key: &SortKey) -> QueryResult<()> {
        match key {
            SortKey::Leaf {
                property,
                direction,
            } => {
                let (var, _, _) = self.bind(parent, group, property, Clause::OrderBy, true)?;
                self.order.push(match direction {
                    SortDirection::Ascending => format!("?{}", var),
                    SortDirection::Descending => format!("DESC(?{})", var),
                });
            }
            SortKey::Scoped { property, keys } => {
                let (var, child_group, _) =
                    self.bind(parent, group, property, Clause::OrderBy, true)?;
                for key in keys {
                    self.sort_key(&var, child_group, key)?;
                }
            }
        }
        Ok(())
    }

    fn render(&self, base: &str, graphs: &[String]) -> String {
        let mut out = String::new();
        out.push_str("CONSTRUCT {\n");
        let _ = writeln!(out, "  <{}> <{}> ?{} .", base, rdfs::MEMBER.as_str(), MATCH_VAR);
        for line in &self.template {
            let _ = writeln!(out, "  {}", line);
        }
        out.push_str("}\n");
        for graph in graphs {
            let _ = writeln!(out, "FROM <{}>", graph);
        }
        out.push_str("WHERE {\n");
        self.render_group(ROOT, 1, &mut out);
        out.push('}');
        if !self.order.is_empty() {
            let _ = write!(out, "\nORDER BY {}", self.order.join(" "));
        }
        out
    }

    fn render_group(&self, group: usize, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        for pattern in &self.groups[group] {
            match pattern {
                Pattern::Triple(t) => {
                    let _ = writeln!(out, "{}{} .", indent, t);
                }
                Pattern::Filter(f) => {
                    let _ = writeln!(out, "{}FILTER ({})", indent, f);
                }
                Pattern::Optional(g) => {
                    let _ = writeln!(out, "{}OPTIONAL {{", indent);
                    self.render_group(*g, depth + 1, out);
                    let _ = writeln!(out, "{}}}", indent);
                }
                Pattern::NotExists(g) => {
                    let _ = writeln!(out, "{}FILTER NOT EXISTS {{", indent);
                    self.render_group(*g, depth + 1, out);
                    let _ = writeln!(out, "{}}}", indent);
                }
            }
        }
    }
}

/// Quoted SPARQL string literal
fn sparql_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
