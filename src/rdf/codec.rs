//! Pluggable graph serialization
//!
//! The store and catalog only ever hand [`Graph`] values around. Turning them into
//! bytes (and back) goes through a [`GraphCodec`], so callers pick the wire format.

use super::namespace::NamespaceManager;
use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::{Graph, Triple};
use thiserror::Error;

/// Codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Syntax error in the input document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Base or prefix IRI rejected
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Reads and writes whole graphs in one concrete syntax
pub trait GraphCodec: Send + Sync {
    /// Media type of the syntax
    fn media_type(&self) -> &'static str;

    /// Parse a document, resolving relative IRIs against `base`
    fn parse(&self, input: &[u8], base: Option<&str>) -> CodecResult<Graph>;

    /// Serialize a graph, abbreviating with the manager's prefixes where the syntax allows
    fn serialize(&self, graph: &Graph, namespaces: &NamespaceManager) -> CodecResult<Vec<u8>>;
}

/// Turtle codec
#[derive(Debug, Default, Clone, Copy)]
pub struct TurtleCodec;

/// N-Triples codec
#[derive(Debug, Default, Clone, Copy)]
pub struct NTriplesCodec;

impl GraphCodec for TurtleCodec {
    fn media_type(&self) -> &'static str {
        RdfFormat::Turtle.media_type()
    }

    fn parse(&self, input: &[u8], base: Option<&str>) -> CodecResult<Graph> {
        parse_with(RdfFormat::Turtle, input, base)
    }

    fn serialize(&self, graph: &Graph, namespaces: &NamespaceManager) -> CodecResult<Vec<u8>> {
        let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
        for (prefix, iri) in namespaces.prefixes() {
            serializer = serializer
                .with_prefix(prefix, iri)
                .map_err(|e| CodecError::InvalidIri(e.to_string()))?;
        }
        let mut writer = serializer.for_writer(Vec::new());
        for triple in graph.iter() {
            writer.serialize_triple(triple)?;
        }
        Ok(writer.finish()?)
    }
}

impl GraphCodec for NTriplesCodec {
    fn media_type(&self) -> &'static str {
        RdfFormat::NTriples.media_type()
    }

    fn parse(&self, input: &[u8], base: Option<&str>) -> CodecResult<Graph> {
        parse_with(RdfFormat::NTriples, input, base)
    }

    fn serialize(&self, graph: &Graph, _namespaces: &NamespaceManager) -> CodecResult<Vec<u8>> {
        let mut writer = RdfSerializer::from_format(RdfFormat::NTriples).for_writer(Vec::new());
        for triple in graph.iter() {
            writer.serialize_triple(triple)?;
        }
        Ok(writer.finish()?)
    }
}

fn parse_with(format: RdfFormat, input: &[u8], base: Option<&str>) -> CodecResult<Graph> {
    let mut parser = RdfParser::from_format(format);
    if let Some(base) = base {
        parser = parser
            .with_base_iri(base)
            .map_err(|e| CodecError::InvalidIri(e.to_string()))?;
    }
    let mut graph = Graph::new();
    for quad in parser.for_reader(input) {
        let quad = quad.map_err(|e| CodecError::Parse(e.to_string()))?;
        graph.insert(&Triple::from(quad));
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{NamedNodeRef, TripleRef};

    const DOC: &str = r#"
        @prefix foaf: <http://xmlns.com/foaf/0.1/> .
        <alice> a foaf:Person ; foaf:name "Alice" .
    "#;

    #[test]
    fn test_turtle_parse_resolves_base() {
        let graph = TurtleCodec
            .parse(DOC.as_bytes(), Some("http://example.org/"))
            .unwrap();
        assert_eq!(graph.len(), 2);
        let alice = NamedNodeRef::new("http://example.org/alice").unwrap();
        assert_eq!(graph.triples_for_subject(alice).count(), 2);
    }

    #[test]
    fn test_turtle_parse_error() {
        let err = TurtleCodec.parse(b"<a> <b> .", None).unwrap_err();
        assert!(matches!(err, CodecError::Parse(_)));
    }

    #[test]
    fn test_turtle_serialize_uses_prefixes() {
        let mut graph = Graph::new();
        graph.insert(TripleRef::new(
            NamedNodeRef::new("http://example.org/alice").unwrap(),
            NamedNodeRef::new("http://xmlns.com/foaf/0.1/knows").unwrap(),
            NamedNodeRef::new("http://example.org/bob").unwrap(),
        ));
        let bytes = TurtleCodec
            .serialize(&graph, &NamespaceManager::new())
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("@prefix foaf:"));
        assert!(text.contains("foaf:knows"));

        let reparsed = TurtleCodec.parse(text.as_bytes(), None).unwrap();
        assert_eq!(reparsed.len(), 1);
    }

    #[test]
    fn test_ntriples_media_type() {
        assert_eq!(NTriplesCodec.media_type(), "application/n-triples");
        assert_eq!(TurtleCodec.media_type(), "text/turtle");
    }
}
