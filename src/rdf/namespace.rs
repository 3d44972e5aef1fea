//! Namespace and prefix management
//!
//! Holds the built-in prefixes every query may use, plus any prefixes a caller
//! declares for a single request.

use indexmap::IndexMap;
use thiserror::Error;

/// Prefix errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Not a `prefix:local` name
    #[error("Invalid prefixed name: {0}")]
    InvalidPrefixedName(String),

    /// Attempt to rebind a built-in prefix to another namespace
    #[error("Prefix '{prefix}' is reserved for <{iri}>")]
    ReservedPrefix { prefix: String, iri: String },
}

pub type PrefixResult<T> = Result<T, PrefixError>;

/// Built-in prefixes, in declaration order.
pub const BUILTIN_PREFIXES: [(&str, &str); 8] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("oslc", "http://open-services.net/ns/core#"),
];

/// Namespace manager seeded with the built-in prefixes
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    /// Prefix → IRI mappings
    prefixes: IndexMap<String, String>,
}

impl NamespaceManager {
    /// Create a new namespace manager with the built-in prefixes
    pub fn new() -> Self {
        let prefixes = BUILTIN_PREFIXES
            .iter()
            .map(|(p, iri)| (p.to_string(), iri.to_string()))
            .collect();
        Self { prefixes }
    }

    /// Declare a prefix. Built-ins may be restated but not rebound.
    pub fn declare(&mut self, prefix: impl Into<String>, iri: impl Into<String>) -> PrefixResult<()> {
        let prefix = prefix.into();
        let iri = iri.into();
        if let Some((_, builtin)) = BUILTIN_PREFIXES.iter().find(|(p, _)| *p == prefix) {
            if *builtin != iri {
                return Err(PrefixError::ReservedPrefix {
                    prefix,
                    iri: builtin.to_string(),
                });
            }
            return Ok(());
        }
        self.prefixes.insert(prefix, iri);
        Ok(())
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Expand a `prefix:local` pair to a full IRI
    pub fn resolve(&self, prefix: &str, local: &str) -> PrefixResult<String> {
        Ok(format!("{}{}", self.get_iri(prefix)?, local))
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        match compact_iri.split_once(':') {
            Some((prefix, local)) => self.resolve(prefix, local),
            None => Err(PrefixError::InvalidPrefixedName(compact_iri.to_string())),
        }
    }

    /// Compact an IRI using the longest matching namespace
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(prefix, ns)| format!("{}:{}", prefix, &iri[ns.len()..]))
    }

    /// All registered prefixes in declaration order
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, iri)| (p.as_str(), iri.as_str()))
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefixes() {
        let mgr = NamespaceManager::new();

        assert_eq!(
            mgr.get_iri("rdf").unwrap(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#"
        );
        assert_eq!(mgr.get_iri("oslc").unwrap(), "http://open-services.net/ns/core#");
        assert!(matches!(
            mgr.get_iri("ex"),
            Err(PrefixError::UnknownPrefix(p)) if p == "ex"
        ));
    }

    #[test]
    fn test_expand() {
        let mgr = NamespaceManager::new();

        let expanded = mgr.expand("foaf:name").unwrap();
        assert_eq!(expanded, "http://xmlns.com/foaf/0.1/name");

        assert!(matches!(
            mgr.expand("name"),
            Err(PrefixError::InvalidPrefixedName(_))
        ));
    }

    #[test]
    fn test_compact_prefers_longest_namespace() {
        let mut mgr = NamespaceManager::new();
        mgr.declare("foafx", "http://xmlns.com/foaf/0.1/extra/").unwrap();

        assert_eq!(
            mgr.compact("http://xmlns.com/foaf/0.1/extra/thing"),
            Some("foafx:thing".to_string())
        );
        assert_eq!(
            mgr.compact("http://xmlns.com/foaf/0.1/name"),
            Some("foaf:name".to_string())
        );
        assert_eq!(mgr.compact("http://unknown.org/x"), None);
    }

    #[test]
    fn test_custom_prefix() {
        let mut mgr = NamespaceManager::new();
        mgr.declare("ex", "http://example.org/").unwrap();

        let expanded = mgr.expand("ex:alice").unwrap();
        assert_eq!(expanded, "http://example.org/alice");
    }

    #[test]
    fn test_builtin_prefixes_are_reserved() {
        let mut mgr = NamespaceManager::new();
        assert!(mgr.declare("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#").is_ok());
        assert!(matches!(
            mgr.declare("rdf", "http://example.org/"),
            Err(PrefixError::ReservedPrefix { .. })
        ));
        assert_eq!(
            mgr.expand("rdf:type").unwrap(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"
        );
    }
}
