//! Event-push parser
//!
//! The tokenizer drives a [`ContentHandler`] that feeds the shared assembler.
//! Text is accumulated across chunks and only interpreted when the element
//! closes.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use log::info;

use super::assembler::GemAssembler;
use super::elements::CatalogElement;
use super::events::{drive, Attributes, ContentHandler};
use super::{GemParser, ParseError, ParserConfig, ParserKind};
use crate::model::Gem;

/// Push (callback-driven) gem catalog parser
#[derive(Debug, Clone, Default)]
pub struct PushParser {
    config: ParserConfig,
}

impl PushParser {
    /// Create a parser with the given settings
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a catalog from any buffered reader
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Vec<Gem>, ParseError> {
        let mut handler = GemHandler::new(&self.config);
        drive(reader, &mut handler)?;
        Ok(handler.assembler.finish())
    }
}

impl GemParser for PushParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Push
    }

    fn parse_str(&self, xml: &str) -> Result<Vec<Gem>, ParseError> {
        self.parse_reader(Cursor::new(xml.as_bytes()))
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Gem>, ParseError> {
        info!("Starting push parsing of file: {}", path.display());
        let file = File::open(path)?;
        let gems = self.parse_reader(BufReader::with_capacity(self.config.buffer_size, file))?;
        info!("Push parsing completed. Found {} gems", gems.len());
        Ok(gems)
    }
}

/// Callback receiver translating push events into assembler transitions
struct GemHandler<'c> {
    namespace: &'c str,
    assembler: GemAssembler<'c>,
}

impl<'c> GemHandler<'c> {
    fn new(config: &'c ParserConfig) -> Self {
        Self {
            namespace: &config.namespace,
            assembler: GemAssembler::new(config),
        }
    }

    fn catalog_element(&self, namespace: Option<&str>, local_name: &[u8]) -> Option<CatalogElement> {
        if namespace != Some(self.namespace) {
            return None;
        }
        CatalogElement::from_local_name(local_name)
    }
}

impl ContentHandler for GemHandler<'_> {
    fn start_element(
        &mut self,
        namespace: Option<&str>,
        local_name: &[u8],
        attributes: &Attributes,
    ) -> Result<(), ParseError> {
        // Text belongs to the innermost element, whatever its namespace
        self.assembler.clear_text();

        if let Some(element) = self.catalog_element(namespace, local_name) {
            let id = match element {
                CatalogElement::Gem => attributes.get("id").map(str::to_string),
                _ => None,
            };
            self.assembler.start_element(element, id);
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ParseError> {
        self.assembler.push_text(text);
        Ok(())
    }

    fn end_element(&mut self, namespace: Option<&str>, local_name: &[u8]) -> Result<(), ParseError> {
        let Some(element) = self.catalog_element(namespace, local_name) else {
            return Ok(());
        };
        let text = self.assembler.take_text();
        self.assembler.apply_text(element, &text)?;
        self.assembler.end_element(element);
        Ok(())
    }
}
