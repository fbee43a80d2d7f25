//! Pull-cursor parser
//!
//! The caller advances a namespace-aware cursor one token at a time and routes
//! text to the element recorded as current when it started.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use log::info;
use quick_xml::events::Event;

use super::assembler::GemAssembler;
use super::elements::CatalogElement;
use super::entities::EntityTable;
use super::events::{ns_reader, owned_namespace, Attributes, NestingGuard};
use super::{GemParser, ParseError, ParserConfig, ParserKind};
use crate::model::Gem;

/// Pull (cursor-driven) gem catalog parser
#[derive(Debug, Clone, Default)]
pub struct PullParser {
    config: ParserConfig,
}

impl PullParser {
    /// Create a parser with the given settings
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a catalog from any buffered reader
    pub fn parse_reader<R: BufRead>(&self, source: R) -> Result<Vec<Gem>, ParseError> {
        let mut reader = ns_reader(source);
        let mut guard = NestingGuard::default();
        let mut assembler = GemAssembler::new(&self.config);
        let mut current_element: Option<CatalogElement> = None;
        let mut entities = EntityTable::default();
        let namespace = Some(self.config.namespace.as_str());
        let mut buf = Vec::new();

        loop {
            let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
            let event_namespace = owned_namespace(resolved)?;
            let in_catalog = event_namespace.as_deref() == namespace;

            match event {
                Event::Start(ref e) => {
                    guard.enter()?;
                    // Every attribute is unescaped so bad references fail here too
                    let attributes = Attributes::from_start(e, &reader, &entities)?;
                    if !in_catalog {
                        buf.clear();
                        continue;
                    }
                    let element = CatalogElement::from_local_name(e.local_name().as_ref());
                    current_element = element;
                    assembler.clear_text();

                    if let Some(element) = element {
                        let id = match element {
                            CatalogElement::Gem => attributes.get("id").map(str::to_string),
                            _ => None,
                        };
                        assembler.start_element(element, id);
                    }
                }
                Event::Text(ref t) => {
                    if guard.inside_root() {
                        let text = t.unescape_with(|name| entities.resolve(name))?;
                        if current_element.is_some() && assembler.in_gem() {
                            assembler.push_text(&text);
                        }
                    }
                }
                Event::CData(ref c) => {
                    if current_element.is_some() && assembler.in_gem() {
                        let text = reader.decoder().decode(c).map_err(quick_xml::Error::from)?;
                        assembler.push_text(&text);
                    }
                }
                Event::DocType(ref d) => {
                    let content = reader.decoder().decode(d).map_err(quick_xml::Error::from)?;
                    entities = EntityTable::from_doctype(&content)?;
                }
                Event::End(ref e) => {
                    guard.leave();
                    if !in_catalog {
                        buf.clear();
                        continue;
                    }
                    let ended = CatalogElement::from_local_name(e.local_name().as_ref());
                    if let Some(element) = current_element.take() {
                        let text = assembler.take_text();
                        // Whitespace-only text never reaches the assembler
                        if !text.is_empty() {
                            assembler.apply_text(element, &text)?;
                        }
                    }
                    assembler.clear_text();
                    if let Some(element) = ended {
                        assembler.end_element(element);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        guard.finish()?;
        Ok(assembler.finish())
    }
}

impl GemParser for PullParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Pull
    }

    fn parse_str(&self, xml: &str) -> Result<Vec<Gem>, ParseError> {
        self.parse_reader(Cursor::new(xml.as_bytes()))
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Gem>, ParseError> {
        info!("Starting pull parsing of file: {}", path.display());
        let file = File::open(path)?;
        let gems = self.parse_reader(BufReader::with_capacity(self.config.buffer_size, file))?;
        info!("Pull parsing completed. Found {} gems", gems.len());
        Ok(gems)
    }
}
