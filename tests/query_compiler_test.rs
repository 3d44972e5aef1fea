//! Compiled OSLC queries evaluated against a warehouse

use oxigraph::model::{NamedNode, NamedNodeRef, TermRef};
use shapehouse::rdf::vocab::rdfs;
use shapehouse::rdf::{GraphCodec, TurtleCodec};
use shapehouse::{parse_criteria, Config, QueryParams, SearchResponse, Shapehouse, WriteMode};

const BASE: &str = "http://localhost:8080/oslc/acme/query";

const SHAPES: &str = r#"
    @prefix sh: <http://www.w3.org/ns/shacl#> .
    @prefix foaf: <http://xmlns.com/foaf/0.1/> .
    foaf:PersonShape a sh:NodeShape ; sh:targetClass foaf:Person ; sh:closed false .
"#;

const DATA: &str = r#"
    @prefix foaf: <http://xmlns.com/foaf/0.1/> .
    @prefix ex: <http://example.org/> .
    ex:joan a foaf:Person ; foaf:name "Joan" ; foaf:age 40 ; foaf:knows ex:bob .
    ex:john a foaf:Person ; foaf:name "JOHN" ; foaf:age 25 .
    ex:bob a foaf:Person ; foaf:name "Bob" ; foaf:age 31 .
"#;

fn house() -> Shapehouse {
    let house = Shapehouse::open(Config {
        open_world: true,
        ..Default::default()
    })
    .unwrap();
    let manager = house.manager();
    manager.create_warehouse("acme").unwrap();
    manager
        .replace_shape_graph("acme", "people", &TurtleCodec.parse(SHAPES.as_bytes(), None).unwrap())
        .unwrap();
    manager
        .write_graph(
            "acme",
            "people",
            &TurtleCodec.parse(DATA.as_bytes(), None).unwrap(),
            WriteMode::Replace,
        )
        .unwrap();
    house
}

fn search(house: &Shapehouse, params: QueryParams) -> SearchResponse {
    let criteria = parse_criteria(&params).unwrap();
    house.manager().search("acme", &criteria, &[], BASE).unwrap()
}

fn members(response: &SearchResponse) -> Vec<String> {
    let base = NamedNodeRef::new(BASE).unwrap();
    let mut members: Vec<String> = response
        .graph
        .objects_for_subject_predicate(base, rdfs::MEMBER)
        .map(|t| t.to_string())
        .collect();
    members.sort();
    members
}

#[test]
fn test_regex_is_case_insensitive() {
    let house = house();
    let response = search(
        &house,
        QueryParams {
            where_clause: Some(r#"rdf:type=<http://xmlns.com/foaf/0.1/Person> and foaf:name~"jo""#.to_string()),
            ..Default::default()
        },
    );
    assert_eq!(
        members(&response),
        vec!["<http://example.org/joan>", "<http://example.org/john>"]
    );
}

#[test]
fn test_numeric_range() {
    let house = house();
    let response = search(
        &house,
        QueryParams {
            where_clause: Some("rdf:type=<http://xmlns.com/foaf/0.1/Person> and foaf:age>30 and foaf:age<=40".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(response.total, 2);
}

#[test]
fn test_scoped_where_follows_link() {
    let house = house();
    let response = search(
        &house,
        QueryParams {
            where_clause: Some(r#"rdf:type=<http://xmlns.com/foaf/0.1/Person> and foaf:knows{foaf:name="Bob"}"#.to_string()),
            ..Default::default()
        },
    );
    assert_eq!(members(&response), vec!["<http://example.org/joan>"]);
}

#[test]
fn test_select_projects_requested_properties() {
    let house = house();
    let response = search(
        &house,
        QueryParams {
            where_clause: Some("rdf:type=<http://xmlns.com/foaf/0.1/Person>".to_string()),
            select: Some("foaf:name".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(response.total, 3);
    let age = NamedNode::new("http://xmlns.com/foaf/0.1/age").unwrap();
    assert_eq!(response.graph.triples_for_predicate(age.as_ref()).count(), 0);
    let name = NamedNodeRef::new("http://xmlns.com/foaf/0.1/name").unwrap();
    assert!(response
        .graph
        .triples_for_predicate(name)
        .any(|t| matches!(t.object, TermRef::Literal(l) if l.value() == "JOHN")));
}

#[test]
fn test_order_by_is_emitted() {
    let house = house();
    let response = search(
        &house,
        QueryParams {
            where_clause: Some("rdf:type=<http://xmlns.com/foaf/0.1/Person>".to_string()),
            order_by: Some("-foaf:age".to_string()),
            ..Default::default()
        },
    );
    assert!(response.sparql.contains("ORDER BY DESC(?match_age)"));
    assert_eq!(response.total, 3);
}
