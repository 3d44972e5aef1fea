//! Query criteria parser using Pest
//!
//! Every clause must match its grammar in full; the first mismatch is reported as
//! `MalformedQuery` naming the clause.

use super::ast::*;
use super::{Clause, QueryError, QueryResult};
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "query/criteria.pest"]
struct CriteriaParser;

/// Parse the four optional criteria parameters
pub fn parse_criteria(params: &QueryParams) -> QueryResult<QueryCriteria> {
    let mut criteria = QueryCriteria::new();

    if let Some(input) = present(&params.prefix) {
        for (prefix, iri) in parse_prefixes(input)? {
            criteria
                .namespaces
                .declare(prefix, iri)
                .map_err(|e| QueryError::MalformedQuery {
                    clause: Clause::Prefix,
                    message: e.to_string(),
                })?;
        }
    }
    if let Some(input) = present(&params.select) {
        criteria.select = parse_select(input)?;
    }
    if let Some(input) = present(&params.where_clause) {
        criteria.conditions = parse_where(input)?;
    }
    if let Some(input) = present(&params.order_by) {
        criteria.order_by = parse_order_by(input)?;
    }
    Ok(criteria)
}

fn present(param: &Option<String>) -> Option<&str> {
    param.as_deref().filter(|s| !s.trim().is_empty())
}

/// Parse `oslc.prefix`: `p=<iri>,q=<iri>`
pub fn parse_prefixes(input: &str) -> QueryResult<Vec<(String, String)>> {
    let clause = Clause::Prefix;
    top(Rule::prefix_clause, input, clause)?
        .filter(|p| p.as_rule() == Rule::prefix_def)
        .map(|def| {
            let mut inner = def.into_inner();
            let prefix = next(&mut inner, clause)?.as_str().to_string();
            let iri = iri_text(next(&mut inner, clause)?, clause)?;
            Ok((prefix, iri))
        })
        .collect()
}

/// Parse `oslc.select`
pub fn parse_select(input: &str) -> QueryResult<Vec<Selection>> {
    let clause = Clause::Select;
    let expr = next(&mut top(Rule::select_clause, input, clause)?, clause)?;
    select_expr(expr, clause)
}

/// Parse `oslc.where`
pub fn parse_where(input: &str) -> QueryResult<Vec<Condition>> {
    let clause = Clause::Where;
    let expr = next(&mut top(Rule::where_clause, input, clause)?, clause)?;
    where_expr(expr, clause)
}

/// Parse `oslc.orderBy`
pub fn parse_order_by(input: &str) -> QueryResult<Vec<SortKey>> {
    let clause = Clause::OrderBy;
    let expr = next(&mut top(Rule::order_by_clause, input, clause)?, clause)?;
    sort_expr(expr, clause)
}

/// Parse a graph filter `where`
pub fn parse_filter(input: &str) -> QueryResult<Vec<FilterTerm>> {
    let clause = Clause::Filter;
    top(Rule::filter_clause, input, clause)?
        .filter(|p| p.as_rule() == Rule::filter_term)
        .map(|term| {
            let mut inner = term.into_inner();
            let predicate = filter_node(next(&mut inner, clause)?, clause)?;
            let op = match next(&mut inner, clause)?.as_str() {
                "~" => FilterOp::Matches,
                _ => FilterOp::Equals,
            };
            let value_pair = first_inner(next(&mut inner, clause)?, clause)?;
            let value = match value_pair.as_rule() {
                Rule::string => FilterValue::String(string_text(value_pair, clause)?),
                Rule::integer => FilterValue::Integer(value_pair.as_str().to_string()),
                _ => FilterValue::Node(node_from(value_pair, clause)?),
            };
            Ok(FilterTerm {
                predicate,
                op,
                value,
            })
        })
        .collect()
}

/// Parse a graph filter `select`
pub fn parse_projection(input: &str) -> QueryResult<Vec<FilterNode>> {
    let clause = Clause::Projection;
    top(Rule::projection_clause, input, clause)?
        .filter(|p| p.as_rule() == Rule::filter_subject)
        .map(|subject| filter_node(subject, clause))
        .collect()
}

// ---------------------------------------------------------------------------
// Pair walking
// ---------------------------------------------------------------------------

fn top(rule: Rule, input: &str, clause: Clause) -> QueryResult<Pairs<'_, Rule>> {
    let mut pairs = CriteriaParser::parse(rule, input).map_err(|e| malformed(clause, e))?;
    Ok(next(&mut pairs, clause)?.into_inner())
}

fn malformed(clause: Clause, e: pest::error::Error<Rule>) -> QueryError {
    let column = match e.line_col {
        LineColLocation::Pos((_, col)) | LineColLocation::Span((_, col), _) => col,
    };
    QueryError::MalformedQuery {
        clause,
        message: format!("{} at column {}", e.variant.message(), column),
    }
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>, clause: Clause) -> QueryResult<Pair<'i, Rule>> {
    pairs.next().ok_or_else(|| QueryError::MalformedQuery {
        clause,
        message: "unexpected end of input".to_string(),
    })
}

fn first_inner(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<Pair<'_, Rule>> {
    next(&mut pair.into_inner(), clause)
}

fn identifier(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<Identifier> {
    let inner = first_inner(pair, clause)?;
    match inner.as_rule() {
        Rule::wildcard => Ok(Identifier::Wildcard),
        _ => {
            let (prefix, local) = prefixed_parts(inner, clause)?;
            Ok(Identifier::Prefixed { prefix, local })
        }
    }
}

fn prefixed_parts(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<(String, String)> {
    let mut inner = pair.into_inner();
    let prefix = next(&mut inner, clause)?.as_str().to_string();
    let local = next(&mut inner, clause)?.as_str().to_string();
    Ok((prefix, local))
}

fn iri_text(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<String> {
    Ok(first_inner(pair, clause)?.as_str().to_string())
}

fn string_text(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<String> {
    Ok(unescape(first_inner(pair, clause)?.as_str()))
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn value(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<Value> {
    let inner = first_inner(pair, clause)?;
    match inner.as_rule() {
        Rule::iri_ref => Ok(Value::Iri(iri_text(inner, clause)?)),
        Rule::boolean => Ok(Value::Boolean(inner.as_str() == "true")),
        Rule::number => Ok(Value::Number(inner.as_str().to_string())),
        _ => {
            let mut parts = inner.into_inner();
            let lexical = string_text(next(&mut parts, clause)?, clause)?;
            let annotation = match parts.next() {
                Some(tag) if tag.as_rule() == Rule::langtag => {
                    Some(LiteralAnnotation::Language(tag.as_str().to_string()))
                }
                Some(datatype) => {
                    let (prefix, local) = prefixed_parts(datatype, clause)?;
                    Some(LiteralAnnotation::Datatype { prefix, local })
                }
                None => None,
            };
            Ok(Value::Literal {
                lexical,
                annotation,
            })
        }
    }
}

fn where_expr(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<Vec<Condition>> {
    pair.into_inner()
        .map(|term| compare_term(term, clause))
        .collect()
}

fn compare_term(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<Condition> {
    let mut inner = pair.into_inner();
    let property = identifier(next(&mut inner, clause)?, clause)?;
    let rest = next(&mut inner, clause)?;
    match rest.as_rule() {
        Rule::in_list => {
            let values = rest
                .into_inner()
                .map(|v| value(v, clause))
                .collect::<QueryResult<Vec<_>>>()?;
            Ok(Condition::In { property, values })
        }
        Rule::scoped_where => {
            let terms = where_expr(first_inner(rest, clause)?, clause)?;
            Ok(Condition::Scoped { property, terms })
        }
        _ => {
            let op = ComparisonOp::from_token(rest.as_str()).ok_or_else(|| {
                QueryError::MalformedQuery {
                    clause,
                    message: format!("unknown operator '{}'", rest.as_str()),
                }
            })?;
            let value = value(next(&mut inner, clause)?, clause)?;
            Ok(Condition::Compare {
                property,
                op,
                value,
            })
        }
    }
}

fn select_expr(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<Vec<Selection>> {
    pair.into_inner()
        .map(|term| {
            let mut inner = term.into_inner();
            let property = identifier(next(&mut inner, clause)?, clause)?;
            let children = match inner.next() {
                Some(nested) => select_expr(nested, clause)?,
                None => Vec::new(),
            };
            Ok(Selection { property, children })
        })
        .collect()
}

fn sort_expr(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<Vec<SortKey>> {
    pair.into_inner()
        .map(|term| {
            let mut inner = term.into_inner();
            let head = next(&mut inner, clause)?;
            if head.as_rule() == Rule::sort_direction {
                let direction = match head.as_str() {
                    "-" => SortDirection::Descending,
                    _ => SortDirection::Ascending,
                };
                let property = identifier(next(&mut inner, clause)?, clause)?;
                Ok(SortKey::Leaf {
                    property,
                    direction,
                })
            } else {
                let property = identifier(head, clause)?;
                let keys = sort_expr(next(&mut inner, clause)?, clause)?;
                Ok(SortKey::Scoped { property, keys })
            }
        })
        .collect()
}

fn filter_node(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<FilterNode> {
    node_from(first_inner(pair, clause)?, clause)
}

fn node_from(pair: Pair<'_, Rule>, clause: Clause) -> QueryResult<FilterNode> {
    if pair.as_rule() == Rule::iri_ref {
        Ok(FilterNode::Iri(iri_text(pair, clause)?))
    } else {
        let (prefix, local) = prefixed_parts(pair, clause)?;
        Ok(FilterNode::Prefixed { prefix, local })
    }
}
