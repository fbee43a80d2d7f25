use std::collections::HashSet;
use std::path::Path;

use std::str::FromStr;

use anyhow::Result;
use bigdecimal::BigDecimal;
use roxmltree::{Document, Node};

use super::schema::{ComplexType, Content, ElementDecl, SchemaModel, SimpleType, ValueKind};
use super::{ValidationCheck, ValidationError, ValidationReport};
use crate::parser::entities::check_declarations;
use crate::parser::tree::{decode_document, parsing_options, text_content};

/// Step 2: check the catalog document against the resolved schema
pub(crate) fn check_document(path: &Path, schema: &SchemaModel, report: &mut ValidationReport) -> Result<()> {
    let bytes = std::fs::read(path).map_err(|source| ValidationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match decode_document(&bytes) {
        Ok(xml) => check_source(&xml, schema, report),
        Err(e) => report.add_check(ValidationCheck::failed("Document well-formed", e.to_string())),
    }
    Ok(())
}

pub(crate) fn check_source(xml: &str, schema: &SchemaModel, report: &mut ValidationReport) {
    if let Err(e) = check_declarations(xml) {
        report.add_check(ValidationCheck::failed("Document well-formed", e.to_string()));
        return;
    }
    let document = match Document::parse_with_options(xml, parsing_options()) {
        Ok(document) => document,
        Err(e) => {
            report.add_check(ValidationCheck::failed("Document well-formed", e.to_string()));
            return;
        }
    };
    report.add_check(ValidationCheck::ok("Document well-formed"));

    let root = document.root_element();
    let namespace = root.tag_name().namespace().unwrap_or("");
    let declared = schema
        .root(root.tag_name().name())
        .filter(|_| namespace == schema.target_namespace);
    let Some(decl) = declared else {
        report.add_check(ValidationCheck::failed(
            "Root element",
            format!(
                "<{}> in namespace {:?} is not declared by the schema",
                root.tag_name().name(),
                namespace
            ),
        ));
        return;
    };
    report.add_check(ValidationCheck::ok("Root element"));

    let mut walker = DocumentWalker::new(&document, schema);
    walker.element(root, decl);
    let findings = walker.findings;

    report.add_check(ValidationCheck::from_problems("Content model", &findings.content));
    report.add_check(ValidationCheck::from_problems("Enumerations", &findings.enumerations));
    report.add_check(ValidationCheck::from_problems("Numeric values", &findings.numbers));
    report.add_check(ValidationCheck::from_problems("Unique ids", &findings.ids));
}

#[derive(Debug, Default)]
struct Findings {
    content: Vec<String>,
    enumerations: Vec<String>,
    numbers: Vec<String>,
    ids: Vec<String>,
}

struct DocumentWalker<'d, 'input, 's> {
    document: &'d Document<'input>,
    schema: &'s SchemaModel,
    seen_ids: HashSet<String>,
    findings: Findings,
}

impl<'d, 'input, 's> DocumentWalker<'d, 'input, 's> {
    fn new(document: &'d Document<'input>, schema: &'s SchemaModel) -> Self {
        Self {
            document,
            schema,
            seen_ids: HashSet::new(),
            findings: Findings::default(),
        }
    }

    fn element(&mut self, node: Node<'_, '_>, decl: &ElementDecl) {
        match &decl.content {
            Content::Simple(simple) => self.simple(node, simple),
            Content::Complex(complex) => self.complex(node, complex),
        }
    }

    fn complex(&mut self, node: Node<'_, '_>, complex: &ComplexType) {
        let location = self.describe(node);

        for attr in &complex.attributes {
            match node.attribute(attr.name.as_str()) {
                Some(value) if attr.is_id => {
                    if !self.seen_ids.insert(value.to_string()) {
                        self.findings
                            .ids
                            .push(format!("duplicate id {value:?} on {location}"));
                    }
                }
                None if attr.required => self.findings.content.push(format!(
                    "{location} is missing required attribute {:?}",
                    attr.name
                )),
                _ => {}
            }
        }
        for attr in node.attributes().filter(|a| a.namespace().is_none()) {
            if !complex.attributes.iter().any(|decl| decl.name == attr.name()) {
                self.findings
                    .content
                    .push(format!("undeclared attribute {:?} on {location}", attr.name()));
            }
        }

        let schema = self.schema;
        let namespace = schema.local_namespace();
        let mut counts = vec![0u32; complex.children.len()];
        let mut furthest = 0;
        for child in node.children() {
            if child.is_text() {
                if child.text().is_some_and(|text| !text.trim().is_empty()) {
                    self.findings
                        .content
                        .push(format!("{location} contains unexpected text"));
                }
                continue;
            }
            if !child.is_element() {
                continue;
            }

            let child_namespace = child.tag_name().namespace().unwrap_or("");
            let index = complex
                .children
                .iter()
                .position(|decl| child_namespace == namespace && decl.name == child.tag_name().name());
            let Some(index) = index else {
                let unexpected = self.describe(child);
                self.findings
                    .content
                    .push(format!("unexpected element {unexpected} in {location}"));
                continue;
            };

            if complex.ordered && index < furthest {
                let misplaced = self.describe(child);
                self.findings.content.push(format!(
                    "{misplaced} appears after <{}> in {location}",
                    complex.children[furthest].name
                ));
            }
            furthest = furthest.max(index);
            counts[index] += 1;
            self.element(child, &complex.children[index]);
        }

        for (decl, count) in complex.children.iter().zip(counts) {
            if count < decl.min_occurs {
                self.findings.content.push(format!(
                    "{location} has {count} <{}>, expected at least {}",
                    decl.name, decl.min_occurs
                ));
            }
            if let Some(max) = decl.max_occurs.filter(|max| count > *max) {
                self.findings.content.push(format!(
                    "{location} has {count} <{}>, expected at most {max}",
                    decl.name
                ));
            }
        }
    }

    fn simple(&mut self, node: Node<'_, '_>, simple: &SimpleType) {
        let location = self.describe(node);
        if let Some(child) = node.children().find(|c| c.is_element()) {
            let unexpected = self.describe(child);
            self.findings
                .content
                .push(format!("unexpected element {unexpected} in {location}"));
        }

        let text = text_content(node);
        match simple.kind {
            ValueKind::Text => {
                if !simple.enumeration.is_empty() && !simple.enumeration.contains(&text) {
                    self.findings.enumerations.push(format!(
                        "{text:?} in {location} is not one of: {}",
                        simple.enumeration.join(", ")
                    ));
                }
            }
            ValueKind::Decimal | ValueKind::Integer => self.number(text.trim(), &location, simple),
        }
    }

    fn number(&mut self, lexical: &str, location: &str, simple: &SimpleType) {
        let Some(number) = parse_number(lexical, simple.kind) else {
            let expected = match simple.kind {
                ValueKind::Integer => "integer",
                _ => "decimal",
            };
            self.findings
                .numbers
                .push(format!("{lexical:?} in {location} is not a valid {expected}"));
            return;
        };

        let enumerated = simple
            .enumeration
            .iter()
            .any(|allowed| parse_number(allowed.trim(), simple.kind).as_ref() == Some(&number));
        if !simple.enumeration.is_empty() && !enumerated {
            self.findings.enumerations.push(format!(
                "{lexical} in {location} is not one of: {}",
                simple.enumeration.join(", ")
            ));
        }
        if let Some(min) = simple.min_inclusive.as_ref().filter(|min| &number < *min) {
            self.findings
                .numbers
                .push(format!("{lexical} in {location} is below the minimum {min}"));
        }
        if let Some(max) = simple.max_inclusive.as_ref().filter(|max| &number > *max) {
            self.findings
                .numbers
                .push(format!("{lexical} in {location} is above the maximum {max}"));
        }
    }

    fn describe(&self, node: Node<'_, '_>) -> String {
        let line = self.document.text_pos_at(node.range().start).row;
        match node.attribute("id") {
            Some(id) => format!("<{} id={id:?}> (line {line})", node.tag_name().name()),
            None => format!("<{}> (line {line})", node.tag_name().name()),
        }
    }
}

/// Parse the `xs:decimal` / `xs:integer` lexical forms (no exponent, no separators)
pub(super) fn parse_number(lexical: &str, kind: ValueKind) -> Option<BigDecimal> {
    let unsigned = lexical.strip_prefix(|c| c == '+' || c == '-').unwrap_or(lexical);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let has_digits = !whole.is_empty() || fraction.is_some_and(|f| !f.is_empty());
    let well_formed = has_digits && all_digits(whole) && fraction.map_or(true, all_digits);
    if !well_formed || (kind == ValueKind::Integer && fraction.is_some()) {
        return None;
    }
    BigDecimal::from_str(lexical).ok()
}
