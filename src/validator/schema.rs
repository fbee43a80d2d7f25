//! Schema model for the catalog validator
//!
//! Covers the XSD subset gem catalog schemas are written in: global element
//! declarations, named and anonymous complex types with `sequence` or `all`
//! content, attributes (including `xs:ID`), and simple types restricting a
//! built-in type with `enumeration`, `minInclusive` and `maxInclusive` facets.
//! Anything else is rejected as unsupported rather than silently ignored.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use roxmltree::{Document, Node};
use bigdecimal::BigDecimal;

use super::document::parse_number;
use super::{ValidationCheck, ValidationError, ValidationReport};
use crate::parser::tree::parsing_options;

/// Namespace of XML Schema itself
pub(crate) const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Type references deeper than this are treated as recursive
const MAX_TYPE_DEPTH: usize = 32;

/// Lexical space of a simple value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Text,
    Decimal,
    Integer,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SimpleType {
    pub kind: ValueKind,
    pub enumeration: Vec<String>,
    pub min_inclusive: Option<BigDecimal>,
    pub max_inclusive: Option<BigDecimal>,
}

impl SimpleType {
    fn text() -> Self {
        Self::with_kind(ValueKind::Text, None)
    }

    fn with_kind(kind: ValueKind, min_inclusive: Option<BigDecimal>) -> Self {
        Self {
            kind,
            enumeration: Vec::new(),
            min_inclusive,
            max_inclusive: None,
        }
    }

    fn builtin(local: &str) -> Option<Self> {
        let simple = match local {
            "string" | "normalizedString" | "token" | "Name" | "NCName" | "ID" | "IDREF" | "anyURI"
            | "language" => Self::text(),
            "decimal" => Self::with_kind(ValueKind::Decimal, None),
            "integer" | "long" | "int" | "short" | "byte" => Self::with_kind(ValueKind::Integer, None),
            "nonNegativeInteger" | "unsignedLong" | "unsignedInt" | "unsignedShort" | "unsignedByte" => {
                Self::with_kind(ValueKind::Integer, Some(BigDecimal::from(0)))
            }
            "positiveInteger" => Self::with_kind(ValueKind::Integer, Some(BigDecimal::from(1))),
            _ => return None,
        };
        Some(simple)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AttributeDecl {
    pub name: String,
    pub required: bool,
    pub is_id: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ComplexType {
    /// `sequence` content; `all` content accepts any order
    pub ordered: bool,
    pub children: Vec<ElementDecl>,
    pub attributes: Vec<AttributeDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Content {
    Simple(SimpleType),
    Complex(ComplexType),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ElementDecl {
    pub name: String,
    pub min_occurs: u32,
    /// None for `unbounded`
    pub max_occurs: Option<u32>,
    pub content: Content,
}

/// Resolved schema: every type reference replaced by its definition
#[derive(Debug)]
pub(crate) struct SchemaModel {
    pub target_namespace: String,
    /// `elementFormDefault="qualified"`
    pub qualified: bool,
    pub roots: Vec<ElementDecl>,
}

impl SchemaModel {
    pub(crate) fn parse(xsd: &str) -> Result<Self, ValidationError> {
        let document = Document::parse_with_options(xsd, parsing_options())
            .map_err(|e| schema_error(format!("not well-formed XML: {e}")))?;
        let schema = document.root_element();
        if !schema.has_tag_name((XSD_NAMESPACE, "schema")) {
            return Err(schema_error(format!(
                "root element <{}> is not xs:schema",
                schema.tag_name().name()
            )));
        }

        let builder = SchemaBuilder::new(schema);
        let roots = xsd_children(schema, "element")
            .map(|decl| builder.element(decl, 0))
            .collect::<Result<Vec<_>, _>>()?;
        if roots.is_empty() {
            return Err(schema_error("no global element declarations"));
        }

        Ok(Self {
            target_namespace: builder.target_namespace.to_string(),
            qualified: schema.attribute("elementFormDefault") == Some("qualified"),
            roots,
        })
    }

    /// Global declaration for a root element name
    pub(crate) fn root(&self, name: &str) -> Option<&ElementDecl> {
        self.roots.iter().find(|decl| decl.name == name)
    }

    /// Namespace expected on locally declared elements
    pub(crate) fn local_namespace(&self) -> &str {
        if self.qualified {
            &self.target_namespace
        } else {
            ""
        }
    }
}

struct SchemaBuilder<'a, 'input> {
    target_namespace: &'a str,
    complex_types: HashMap<&'a str, Node<'a, 'input>>,
    simple_types: HashMap<&'a str, Node<'a, 'input>>,
}

impl<'a, 'input: 'a> SchemaBuilder<'a, 'input> {
    fn new(schema: Node<'a, 'input>) -> Self {
        Self {
            target_namespace: schema.attribute("targetNamespace").unwrap_or(""),
            complex_types: named_definitions(schema, "complexType"),
            simple_types: named_definitions(schema, "simpleType"),
        }
    }

    fn element(&self, decl: Node<'a, 'input>, depth: usize) -> Result<ElementDecl, ValidationError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(unsupported("recursive types"));
        }
        if decl.has_attribute("ref") {
            return Err(unsupported("element references"));
        }
        let name = decl
            .attribute("name")
            .ok_or_else(|| schema_error("element declaration without a name"))?;

        let content = match decl.attribute("type") {
            Some(reference) => self.resolve_type(decl, reference, depth)?,
            None => {
                if let Some(complex) = xsd_child(decl, "complexType") {
                    Content::Complex(self.complex_type(complex, depth)?)
                } else if let Some(simple) = xsd_child(decl, "simpleType") {
                    Content::Simple(self.simple_type(simple, depth)?)
                } else {
                    Content::Simple(SimpleType::text())
                }
            }
        };

        let min_occurs = decl.attribute("minOccurs").map(parse_occurs).transpose()?.unwrap_or(1);
        let max_occurs = match decl.attribute("maxOccurs") {
            Some("unbounded") => None,
            Some(value) => Some(parse_occurs(value)?),
            None => Some(1),
        };
        if max_occurs.is_some_and(|max| max < min_occurs) {
            return Err(schema_error(format!("element {name:?} has maxOccurs below minOccurs")));
        }

        Ok(ElementDecl {
            name: name.to_string(),
            min_occurs,
            max_occurs,
            content,
        })
    }

    fn resolve_type(
        &self,
        context: Node<'a, 'input>,
        reference: &str,
        depth: usize,
    ) -> Result<Content, ValidationError> {
        let (namespace, local) = qualify(context, reference)?;
        if namespace == XSD_NAMESPACE {
            return SimpleType::builtin(local)
                .map(Content::Simple)
                .ok_or_else(|| unsupported(format!("built-in type xs:{local}")));
        }
        if namespace != self.target_namespace {
            return Err(schema_error(format!(
                "type {reference:?} is outside the target namespace"
            )));
        }
        if let Some(node) = self.complex_types.get(local) {
            return Ok(Content::Complex(self.complex_type(*node, depth + 1)?));
        }
        if let Some(node) = self.simple_types.get(local) {
            return Ok(Content::Simple(self.simple_type(*node, depth + 1)?));
        }
        Err(schema_error(format!("undefined type {reference:?}")))
    }

    fn complex_type(&self, node: Node<'a, 'input>, depth: usize) -> Result<ComplexType, ValidationError> {
        let mut complex = ComplexType::default();
        for child in node.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                group @ ("sequence" | "all") => {
                    complex.ordered = group == "sequence";
                    for particle in child.children().filter(|n| n.is_element()) {
                        match particle.tag_name().name() {
                            "element" => complex.children.push(self.element(particle, depth + 1)?),
                            "annotation" => {}
                            other => return Err(unsupported(format!("xs:{other} inside xs:{group}"))),
                        }
                    }
                }
                "attribute" => complex.attributes.push(attribute(child)?),
                "annotation" => {}
                other => return Err(unsupported(format!("xs:{other} in a complex type"))),
            }
        }
        Ok(complex)
    }

    fn simple_type(&self, node: Node<'a, 'input>, depth: usize) -> Result<SimpleType, ValidationError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(unsupported("recursive types"));
        }
        let restriction = xsd_child(node, "restriction")
            .ok_or_else(|| unsupported("simple types other than restrictions"))?;
        let base = restriction
            .attribute("base")
            .ok_or_else(|| schema_error("restriction without a base"))?;

        let mut simple = match self.resolve_type(restriction, base, depth)? {
            Content::Simple(simple) => simple,
            Content::Complex(_) => {
                return Err(schema_error(format!("simple type restricts complex type {base:?}")))
            }
        };

        let mut enumeration = Vec::new();
        for facet in restriction.children().filter(|n| n.is_element()) {
            let name = facet.tag_name().name();
            if name == "annotation" {
                continue;
            }
            let value = facet
                .attribute("value")
                .ok_or_else(|| schema_error(format!("facet xs:{name} without a value")))?;
            match name {
                "enumeration" => enumeration.push(value.to_string()),
                "minInclusive" => simple.min_inclusive = Some(parse_bound(name, value)?),
                "maxInclusive" => simple.max_inclusive = Some(parse_bound(name, value)?),
                other => return Err(unsupported(format!("facet xs:{other}"))),
            }
        }
        if !enumeration.is_empty() {
            simple.enumeration = enumeration;
        }

        let bounded = simple.min_inclusive.is_some() || simple.max_inclusive.is_some();
        if bounded && simple.kind == ValueKind::Text {
            return Err(schema_error(format!("numeric bounds on non-numeric base {base:?}")));
        }
        Ok(simple)
    }
}

fn attribute(node: Node<'_, '_>) -> Result<AttributeDecl, ValidationError> {
    let name = node
        .attribute("name")
        .ok_or_else(|| schema_error("attribute declaration without a name"))?;
    let is_id = match node.attribute("type") {
        Some(reference) => qualify(node, reference)? == (XSD_NAMESPACE, "ID"),
        None => false,
    };
    Ok(AttributeDecl {
        name: name.to_string(),
        required: node.attribute("use") == Some("required"),
        is_id,
    })
}

/// Split a QName reference and resolve its prefix in scope of `context`
fn qualify<'a, 'r>(context: Node<'a, '_>, reference: &'r str) -> Result<(&'a str, &'r str), ValidationError> {
    let (prefix, local) = match reference.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, reference),
    };
    match (prefix, context.lookup_namespace_uri(prefix)) {
        (_, Some(namespace)) => Ok((namespace, local)),
        (None, None) => Ok(("", local)),
        (Some(prefix), None) => Err(schema_error(format!(
            "unbound prefix {prefix:?} in type reference {reference:?}"
        ))),
    }
}

fn named_definitions<'a, 'input: 'a>(
    schema: Node<'a, 'input>,
    local: &'static str,
) -> HashMap<&'a str, Node<'a, 'input>> {
    xsd_children(schema, local)
        .filter_map(|node| node.attribute("name").map(|name| (name, node)))
        .collect()
}

fn xsd_children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    local: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name((XSD_NAMESPACE, local)))
}

fn xsd_child<'a, 'input: 'a>(node: Node<'a, 'input>, local: &'static str) -> Option<Node<'a, 'input>> {
    xsd_children(node, local).next()
}

fn parse_occurs(value: &str) -> Result<u32, ValidationError> {
    value
        .parse()
        .map_err(|_| schema_error(format!("invalid occurrence bound {value:?}")))
}

fn parse_bound(facet: &str, value: &str) -> Result<BigDecimal, ValidationError> {
    parse_number(value.trim(), ValueKind::Decimal)
        .ok_or_else(|| schema_error(format!("facet xs:{facet} has non-numeric value {value:?}")))
}

fn schema_error(message: impl Into<String>) -> ValidationError {
    ValidationError::Schema(message.into())
}

fn unsupported(what: impl std::fmt::Display) -> ValidationError {
    ValidationError::Schema(format!("unsupported construct: {what}"))
}

/// Step 1: read and resolve the schema
///
/// Returns `None` (with a failed check recorded) when the schema is unusable.
pub(crate) fn check_schema(path: &Path, report: &mut ValidationReport) -> Result<Option<SchemaModel>> {
    let xsd = std::fs::read_to_string(path).map_err(|source| ValidationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let schema = match SchemaModel::parse(&xsd) {
        Ok(schema) => schema,
        Err(e) => {
            report.add_check(ValidationCheck::failed("Schema loaded", e.to_string()));
            return Ok(None);
        }
    };
    report.add_check(ValidationCheck::ok("Schema loaded"));

    if schema.target_namespace.is_empty() {
        report.add_check(ValidationCheck::warning(
            "Target namespace",
            "schema declares no targetNamespace; catalog elements are expected unqualified",
        ));
    } else {
        report.add_check(ValidationCheck::ok("Target namespace"));
    }

    log::debug!(
        "Loaded schema for namespace {:?} with {} global element(s)",
        schema.target_namespace,
        schema.roots.len()
    );
    Ok(Some(schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_XSD: &str = include_str!("../../tests/data/gems.xsd");

    fn complex(decl: &ElementDecl) -> &ComplexType {
        match &decl.content {
            Content::Complex(complex) => complex,
            Content::Simple(_) => panic!("{} has simple content", decl.name),
        }
    }

    fn simple(decl: &ElementDecl) -> &SimpleType {
        match &decl.content {
            Content::Simple(simple) => simple,
            Content::Complex(_) => panic!("{} has complex content", decl.name),
        }
    }

    fn child<'d>(decl: &'d ComplexType, name: &str) -> &'d ElementDecl {
        decl.children.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_resolves_catalog_schema() {
        let schema = SchemaModel::parse(CATALOG_XSD).unwrap();
        assert_eq!(schema.target_namespace, "http://www.example.com/gems");
        assert!(schema.qualified);
        assert_eq!(schema.local_namespace(), schema.target_namespace);

        let gems = complex(schema.root("gems").unwrap());
        let gem = child(gems, "gem");
        assert_eq!(gem.min_occurs, 1);
        assert_eq!(gem.max_occurs, None);

        let gem = complex(gem);
        assert!(gem.ordered);
        let names: Vec<&str> = gem.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["name", "preciousness", "origin", "visualParameters", "value"]);
        assert_eq!(gem.attributes.len(), 1);
        assert!(gem.attributes[0].is_id);
        assert!(!gem.attributes[0].required);

        let preciousness = simple(child(gem, "preciousness"));
        assert_eq!(preciousness.kind, ValueKind::Text);
        assert_eq!(preciousness.enumeration, ["precious", "semi-precious"]);

        let value = simple(child(gem, "value"));
        assert_eq!(value.kind, ValueKind::Decimal);
        assert_eq!(value.min_inclusive, Some(BigDecimal::from(0)));
        assert_eq!(value.max_inclusive, None);

        let params = complex(child(gem, "visualParameters"));
        let facets = simple(child(params, "facets"));
        assert_eq!(facets.kind, ValueKind::Integer);
        assert_eq!(facets.min_inclusive, Some(BigDecimal::from(4)));
        assert_eq!(facets.max_inclusive, Some(BigDecimal::from(100)));
        assert_eq!(simple(child(params, "color")).enumeration.len(), 9);
    }

    #[test]
    fn test_positive_integer_has_implicit_minimum() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="count" type="xs:positiveInteger"/>
        </xs:schema>"#;
        let schema = SchemaModel::parse(xsd).unwrap();
        assert_eq!(schema.target_namespace, "");
        let count = simple(schema.root("count").unwrap());
        assert_eq!(count.kind, ValueKind::Integer);
        assert_eq!(count.min_inclusive, Some(BigDecimal::from(1)));
    }

    #[test]
    fn test_rejects_unsupported_and_broken_schemas() {
        let cases = [
            ("<notASchema/>", "not xs:schema"),
            (
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#,
                "no global element",
            ),
            (
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                    <xs:element name="a" type="xs:dateTime"/></xs:schema>"#,
                "xs:dateTime",
            ),
            (
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                    <xs:element name="a" type="Missing"/></xs:schema>"#,
                "undefined type",
            ),
            (
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                    <xs:element name="a" type="q:T"/></xs:schema>"#,
                "unbound prefix",
            ),
            (
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                    <xs:element name="a"><xs:simpleType>
                      <xs:restriction base="xs:string"><xs:pattern value="[a-z]+"/></xs:restriction>
                    </xs:simpleType></xs:element></xs:schema>"#,
                "xs:pattern",
            ),
            (
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                    <xs:complexType name="Node"><xs:sequence>
                      <xs:element name="node" type="Node" minOccurs="0"/>
                    </xs:sequence></xs:complexType>
                    <xs:element name="node" type="Node"/></xs:schema>"#,
                "recursive",
            ),
            ("<xs:schema", "well-formed"),
        ];
        for (xsd, expected) in cases {
            let err = SchemaModel::parse(xsd).unwrap_err().to_string();
            assert!(err.contains(expected), "{err:?} should mention {expected:?}");
        }
    }
}
