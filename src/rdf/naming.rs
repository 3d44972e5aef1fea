//! Deterministic names for graphs and catalog URIs.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::sync::LazyLock;

/// Suffix appended to a store name to address its shape graph.
pub const SHAPES_SUFFIX: &str = "-shacl";

const URN_SCHEME: &str = "urn:";

/// Characters escaped inside a single URI path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("static pattern"));

/// `urn:<name>` for a data graph.
pub fn graph_urn(name: &str) -> String {
    format!("{}{}", URN_SCHEME, name)
}

/// `urn:<name>-shacl` for the shape graph governing `name`.
pub fn shapes_urn(name: &str) -> String {
    format!("{}{}{}", URN_SCHEME, name, SHAPES_SUFFIX)
}

/// Logical store name of a graph URN, if it is one.
pub fn store_name(urn: &str) -> Option<&str> {
    urn.strip_prefix(URN_SCHEME)
}

/// Logical store name governed by a shape graph URN.
pub fn shapes_store_name(urn: &str) -> Option<&str> {
    store_name(urn)?.strip_suffix(SHAPES_SUFFIX)
}

/// Whether `name` is usable as a warehouse or store name.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name) && name != "." && name != ".."
}

/// Local part of an IRI: the text after the last `#`, `/` or `:`, cut at the
/// first `.` or `>`.
pub fn simple_id(iri: &str) -> &str {
    let start = iri
        .rfind('#')
        .or_else(|| iri.rfind('/'))
        .or_else(|| iri.rfind(':'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let local = &iri[start..];
    let end = local.find(['.', '>']).unwrap_or(local.len());
    &local[..end]
}

/// Join `base` with percent-encoded path segments, skipping empty ones.
pub fn build_uri(base: &str, parts: &[&str]) -> String {
    let mut uri = base.trim_end_matches('/').to_string();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        uri.push('/');
        uri.extend(utf8_percent_encode(part, SEGMENT));
    }
    uri
}
