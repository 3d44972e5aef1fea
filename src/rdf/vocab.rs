//! Constant terms for the vocabularies the store speaks.
//!
//! `rdf` and `xsd` come straight from oxigraph; RDFS, Dublin Core terms, SHACL and
//! OSLC core are declared here.

pub use oxigraph::model::vocab::{rdf, xsd};

pub mod rdfs {
    use oxigraph::model::NamedNodeRef;

    pub const NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";

    pub const LABEL: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#label");
    pub const MEMBER: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#member");
    pub const CONTAINER: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Container");
}

pub mod dcterms {
    use oxigraph::model::NamedNodeRef;

    pub const NAMESPACE: &str = "http://purl.org/dc/terms/";

    pub const TITLE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/title");
    pub const DESCRIPTION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/description");
}

pub mod sh {
    use oxigraph::model::NamedNodeRef;

    pub const NAMESPACE: &str = "http://www.w3.org/ns/shacl#";

    pub const NODE_SHAPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#NodeShape");
    pub const TARGET_CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#targetClass");
    pub const PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#property");
    pub const PATH: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#path");
    pub const NAME: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#name");
    pub const DESCRIPTION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#description");
    pub const MIN_COUNT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#minCount");
    pub const MAX_COUNT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxCount");
    pub const NODE_KIND: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#nodeKind");
    pub const DATATYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#datatype");
    pub const CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#class");
    pub const MAX_LENGTH: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxLength");
    pub const IN: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#in");
    pub const CLOSED: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#closed");
    pub const IGNORED_PROPERTIES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#ignoredProperties");

    // node kinds
    pub const IRI: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#IRI");
    pub const BLANK_NODE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#BlankNode");
    pub const LITERAL: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#Literal");
    pub const BLANK_NODE_OR_IRI: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#BlankNodeOrIRI");
    pub const BLANK_NODE_OR_LITERAL: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#BlankNodeOrLiteral");
    pub const IRI_OR_LITERAL: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#IRIOrLiteral");
}

pub mod oslc {
    use oxigraph::model::NamedNodeRef;

    pub const NAMESPACE: &str = "http://open-services.net/ns/core#";

    // classes
    pub const SERVICE_PROVIDER_CATALOG_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#ServiceProviderCatalog");
    pub const SERVICE_PROVIDER_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#ServiceProvider");
    pub const SERVICE_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#Service");
    pub const CREATION_FACTORY_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#CreationFactory");
    pub const QUERY_CAPABILITY_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#QueryCapability");
    pub const RESOURCE_SHAPE_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#ResourceShape");
    pub const PROPERTY_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#Property");
    pub const ALLOWED_VALUES_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#AllowedValues");
    pub const RESPONSE_INFO_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#ResponseInfo");

    // predicates
    pub const SERVICE_PROVIDER: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#serviceProvider");
    pub const SERVICE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#service");
    pub const CREATION_FACTORY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#creationFactory");
    pub const QUERY_CAPABILITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#queryCapability");
    pub const RESOURCE_SHAPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#resourceShape");
    pub const PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#property");
    pub const ALLOWED_VALUES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#allowedValues");
    pub const ALLOWED_VALUE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#allowedValue");
    pub const DOMAIN: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#domain");
    pub const PROPERTY_DEFINITION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#propertyDefinition");
    pub const NAME: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#name");
    pub const DESCRIBES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#describes");
    pub const CREATION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#creation");
    pub const RESOURCE_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#resourceType");
    pub const OCCURS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#occurs");
    pub const VALUE_TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#valueType");
    pub const MAX_SIZE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#maxSize");
    pub const QUERY_BASE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#queryBase");
    pub const TOTAL_COUNT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#totalCount");
    pub const DETAILS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#details");

    // occurs values
    pub const EXACTLY_ONE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#Exactly-one");
    pub const ONE_OR_MANY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#One-or-many");
    pub const ZERO_OR_MANY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#Zero-or-many");
    pub const ZERO_OR_ONE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#Zero-or-one");

    // value types
    pub const RESOURCE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#Resource");
    pub const LOCAL_RESOURCE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#LocalResource");
    pub const ANY_RESOURCE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/core#AnyResource");
}
