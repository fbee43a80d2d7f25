//! Push-style traversal over quick-xml
//!
//! quick-xml is a pull tokenizer; [`drive`] turns it into a push engine that
//! calls back into a [`ContentHandler`] for every element start, text chunk and
//! element end, with namespaces already resolved.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use super::entities::EntityTable;
use super::ParseError;

/// Attributes of a started element, in document order
#[derive(Debug, Default, Clone)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub(crate) fn from_start(
        start: &BytesStart<'_>,
        reader: &NsReader<impl BufRead>,
        entities: &EntityTable,
    ) -> Result<Self, ParseError> {
        let mut entries = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| ParseError::structure(format!("attribute name is not UTF-8: {}", e)))?
                .to_string();
            let value = attr
                .decode_and_unescape_value_with(reader.decoder(), |name| entities.resolve(name))
                .map_err(quick_xml::Error::from)?
                .into_owned();
            entries.push((key, value));
        }
        Ok(Self { entries })
    }

    /// Value of the attribute with the given qualified name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the element has no attributes
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Receiver of push events
///
/// `characters` may be called several times for one logical text node;
/// handlers must accumulate chunks rather than act on each one.
pub trait ContentHandler {
    /// An element was opened
    fn start_element(
        &mut self,
        namespace: Option<&str>,
        local_name: &[u8],
        attributes: &Attributes,
    ) -> Result<(), ParseError>;

    /// A chunk of character data inside the root element
    fn characters(&mut self, text: &str) -> Result<(), ParseError>;

    /// An element was closed
    fn end_element(&mut self, namespace: Option<&str>, local_name: &[u8]) -> Result<(), ParseError>;
}

/// Build a namespace-aware reader configured for catalog parsing
pub(crate) fn ns_reader<R: BufRead>(source: R) -> NsReader<R> {
    let mut reader = NsReader::from_reader(source);
    // `<color/>` arrives as Start + End, same as `<color></color>`
    reader.config_mut().expand_empty_elements = true;
    reader
}

/// Turn a resolved namespace into an owned URI
///
/// Elements with an undeclared prefix are rejected the same way the tree
/// builder rejects them.
pub(crate) fn owned_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>, ParseError> {
    match resolved {
        ResolveResult::Bound(ns) => std::str::from_utf8(ns.0)
            .map(|s| Some(s.to_string()))
            .map_err(|e| ParseError::structure(format!("namespace URI is not UTF-8: {}", e))),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(ParseError::structure(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// Tracks element nesting so truncated or empty documents are reported
#[derive(Debug, Default)]
pub(crate) struct NestingGuard {
    depth: usize,
    seen_root: bool,
}

impl NestingGuard {
    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth == 0 && self.seen_root {
            return Err(ParseError::structure("more than one root element"));
        }
        self.depth += 1;
        self.seen_root = true;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// True while inside the root element
    pub(crate) fn inside_root(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn finish(&self) -> Result<(), ParseError> {
        if !self.seen_root {
            return Err(ParseError::structure("document has no root element"));
        }
        if self.depth > 0 {
            return Err(ParseError::structure(format!(
                "unexpected end of document with {} unclosed element(s)",
                self.depth
            )));
        }
        Ok(())
    }
}

/// Read the whole document, pushing events into `handler`
pub fn drive<R: BufRead, H: ContentHandler>(source: R, handler: &mut H) -> Result<(), ParseError> {
    let mut reader = ns_reader(source);
    let mut guard = NestingGuard::default();
    let mut entities = EntityTable::default();
    let mut buf = Vec::new();

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = owned_namespace(resolved)?;
        match event {
            Event::Start(ref e) => {
                guard.enter()?;
                let attributes = Attributes::from_start(e, &reader, &entities)?;
                handler.start_element(namespace.as_deref(), e.local_name().as_ref(), &attributes)?;
            }
            Event::Text(ref t) => {
                if guard.inside_root() {
                    handler.characters(&t.unescape_with(|name| entities.resolve(name))?)?;
                }
            }
            Event::CData(ref c) => {
                if guard.inside_root() {
                    let text = reader.decoder().decode(c).map_err(quick_xml::Error::from)?;
                    handler.characters(&text)?;
                }
            }
            Event::DocType(ref d) => {
                let content = reader.decoder().decode(d).map_err(quick_xml::Error::from)?;
                entities = EntityTable::from_doctype(&content)?;
            }
            Event::End(ref e) => {
                handler.end_element(namespace.as_deref(), e.local_name().as_ref())?;
                guard.leave();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    guard.finish()
}
