//! # Catalog Transformation
//!
//! Derives a regrouped document from a gem catalog. The input is read as a
//! tree (independently of the record parsers) and each `gem` element is copied,
//! attributes and descendants included, under a group element keyed by the
//! text of one of its children:
//!
//! ```text
//! gemsByPreciousness xmlns=<catalog namespace>
//! ├── category name="precious"
//! │   └── gem* (copied)
//! └── category name="semi-precious"
//!     └── gem* (copied)
//! ```
//!
//! Groups appear in the order their key is first seen. The output is written
//! to a temporary file next to the destination and renamed into place, so a
//! failed transform never leaves a partial file behind.

use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use log::{debug, info};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use roxmltree::{Document, Node};
use tempfile::NamedTempFile;

use crate::comparator::cmp_ignore_case;
use crate::parser::tree::{decode_document, parsing_options, text_content};

pub use sheet::{SortField, TransformSheet};

mod sheet;

/// Errors raised while deriving a document
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// An input file could not be read
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        /// The file that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The transform sheet is not valid TOML for a [`TransformSheet`]
    #[error("Malformed transform sheet: {0}")]
    Sheet(#[from] toml::de::Error),

    /// The transform sheet parsed but names something unusable
    #[error("Invalid transform sheet: {0}")]
    InvalidSheet(String),

    /// The input document is not well-formed
    #[error("Malformed document: {0}")]
    Document(#[from] roxmltree::Error),

    /// The output could not be created or moved into place
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        /// The destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error while streaming the output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML writer error
    #[error("XML writing error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Transform the catalog at `xml_path` with the sheet at `sheet_path` into `output_path`
pub fn transform(xml_path: &Path, sheet_path: &Path, output_path: &Path) -> Result<(), TransformError> {
    info!(
        "Starting transformation. Input: {}, sheet: {}, output: {}",
        xml_path.display(),
        sheet_path.display(),
        output_path.display()
    );

    let sheet = TransformSheet::from_file(sheet_path)?;
    let read_error = |source: std::io::Error| TransformError::Read {
        path: xml_path.to_path_buf(),
        source,
    };
    let bytes = std::fs::read(xml_path).map_err(read_error)?;
    let xml = decode_document(&bytes).map_err(read_error)?;

    transform_to_file(&xml, &sheet, output_path)?;
    info!("Transformation completed: {}", output_path.display());
    Ok(())
}

/// Transform an in-memory catalog and atomically write the result to `output_path`
pub fn transform_to_file(xml: &str, sheet: &TransformSheet, output_path: &Path) -> Result<(), TransformError> {
    let write_error = |source| TransformError::Write {
        path: output_path.to_path_buf(),
        source,
    };

    let directory = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(directory).map_err(write_error)?;
    {
        let mut buffered = BufWriter::new(temp.as_file_mut());
        transform_to_writer(xml, sheet, &mut buffered)?;
        buffered.flush()?;
    }
    temp.persist(output_path).map_err(|e| write_error(e.error))?;
    Ok(())
}

/// Transform an in-memory catalog into any writer
pub fn transform_to_writer<W: Write>(xml: &str, sheet: &TransformSheet, out: W) -> Result<(), TransformError> {
    let document = Document::parse_with_options(xml, parsing_options())?;
    let groups = group_gems(&document, sheet);
    debug!(
        "Grouped {} gem(s) into {} <{}> element(s)",
        groups.iter().map(|g| g.gems.len()).sum::<usize>(),
        groups.len(),
        sheet.group_element
    );

    let mut writer = if sheet.indent > 0 {
        Writer::new_with_indent(out, b' ', sheet.indent)
    } else {
        Writer::new(out)
    };
    let mut copier = ElementCopier {
        writer: &mut writer,
        namespace: &sheet.namespace,
    };
    copier.write_grouped(&groups, sheet)
}

struct Group<'a, 'input> {
    key: String,
    gems: Vec<Node<'a, 'input>>,
}

fn group_gems<'a, 'input>(document: &'a Document<'input>, sheet: &TransformSheet) -> Vec<Group<'a, 'input>> {
    let namespace = sheet.namespace.as_str();
    let mut groups: Vec<Group<'a, 'input>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for gem in document
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name((namespace, "gem")))
    {
        let key = child_text(gem, namespace, &sheet.group_by).unwrap_or_default();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                gems: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].gems.push(gem);
    }

    if let Some(field) = sheet.sort_by {
        for group in &mut groups {
            group
                .gems
                .sort_by(|a, b| compare_gems(*a, *b, field, namespace));
        }
    }
    groups
}

/// Trimmed text of the first `local` descendant of `gem` in the catalog namespace
fn child_text(gem: Node<'_, '_>, namespace: &str, local: &str) -> Option<String> {
    gem.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.has_tag_name((namespace, local)))
        .map(|n| text_content(n).trim().to_string())
}

fn compare_gems(a: Node<'_, '_>, b: Node<'_, '_>, field: SortField, namespace: &str) -> std::cmp::Ordering {
    let a_text = child_text(a, namespace, field.element()).unwrap_or_default();
    let b_text = child_text(b, namespace, field.element()).unwrap_or_default();
    match field {
        SortField::Value => {
            let numeric = |text: &str| BigDecimal::from_str(text.trim()).ok();
            numeric(&a_text).cmp(&numeric(&b_text))
        }
        SortField::Name | SortField::Origin => cmp_ignore_case(&a_text, &b_text),
    }
}

struct ElementCopier<'w, W: Write> {
    writer: &'w mut Writer<W>,
    namespace: &'w str,
}

impl<W: Write> ElementCopier<'_, W> {
    fn write_grouped(&mut self, groups: &[Group<'_, '_>], sheet: &TransformSheet) -> Result<(), TransformError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new(sheet.root.as_str());
        if !self.namespace.is_empty() {
            root.push_attribute(("xmlns", self.namespace));
        }
        if groups.is_empty() {
            self.writer.write_event(Event::Empty(root))?;
            return Ok(());
        }
        self.writer.write_event(Event::Start(root))?;

        for group in groups {
            let mut start = BytesStart::new(sheet.group_element.as_str());
            start.push_attribute((sheet.group_attribute.as_str(), group.key.as_str()));
            start.push_attribute(("count", group.gems.len().to_string().as_str()));
            self.writer.write_event(Event::Start(start))?;
            for gem in &group.gems {
                self.copy_element(*gem, self.namespace)?;
            }
            self.writer
                .write_event(Event::End(BytesEnd::new(sheet.group_element.as_str())))?;
        }

        self.writer
            .write_event(Event::End(BytesEnd::new(sheet.root.as_str())))?;
        Ok(())
    }

    /// Copy `node` and its subtree; `default_namespace` is the one in scope in the output
    fn copy_element(&mut self, node: Node<'_, '_>, default_namespace: &str) -> Result<(), TransformError> {
        let name = node.tag_name().name();
        let namespace = node.tag_name().namespace().unwrap_or("");

        let mut start = BytesStart::new(name);
        if namespace != default_namespace {
            start.push_attribute(("xmlns", namespace));
        }
        let mut prefixed = 0;
        for attr in node.attributes() {
            match attr.namespace() {
                None => start.push_attribute((attr.name(), attr.value())),
                Some(attr_namespace) => {
                    let prefix = format!("a{prefixed}");
                    prefixed += 1;
                    start.push_attribute((format!("xmlns:{prefix}").as_str(), attr_namespace));
                    start.push_attribute((format!("{prefix}:{}", attr.name()).as_str(), attr.value()));
                }
            }
        }

        let children: Vec<Node<'_, '_>> = node
            .children()
            .filter(|c| c.is_element() || (c.is_text() && c.text().is_some_and(|t| !t.trim().is_empty())))
            .collect();
        if children.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        self.writer.write_event(Event::Start(start))?;
        for child in children {
            if child.is_element() {
                self.copy_element(child, namespace)?;
            } else if let Some(text) = child.text() {
                self.writer.write_event(Event::Text(BytesText::new(text)))?;
            }
        }
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
