//! Tree-materialized parser
//!
//! Loads the whole document with roxmltree and answers structural queries;
//! parent/child relationships come from the tree, so no state machine is needed.

use std::borrow::Cow;
use std::io;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use log::info;
use quick_xml::events::Event;
use quick_xml::Reader;
use roxmltree::{Document, Node, ParsingOptions};

use super::elements::{decode_decimal, decode_integer, CatalogElement};
use super::entities::check_declarations;
use super::{GemParser, ParseError, ParserConfig, ParserKind};
use crate::model::{Color, Gem, GemBuilder, Preciousness, VisualParameters, VisualParametersBuilder};

/// Tree (fully materialized) gem catalog parser
#[derive(Debug, Clone, Default)]
pub struct TreeParser {
    config: ParserConfig,
}

impl TreeParser {
    /// Create a parser with the given settings
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Map an already-built document to gems
    pub fn parse_document(&self, document: &Document<'_>) -> Result<Vec<Gem>, ParseError> {
        document
            .descendants()
            .filter(|node| self.is_catalog(node, CatalogElement::Gem))
            .map(|node| self.parse_gem(node))
            .collect()
    }

    fn is_catalog(&self, node: &Node<'_, '_>, element: CatalogElement) -> bool {
        node.is_element() && node.has_tag_name((self.config.namespace.as_str(), element.as_str()))
    }

    /// Catalog descendants of `parent` (excluding `parent` itself) in document order
    fn descendants_named<'a, 'input: 'a>(
        &'a self,
        parent: Node<'a, 'input>,
        element: CatalogElement,
    ) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
        parent
            .descendants()
            .skip(1)
            .filter(move |node| self.is_catalog(node, element))
    }

    /// Trimmed text of the first matching descendant, or "" when there is none
    fn child_text(&self, parent: Node<'_, '_>, element: CatalogElement) -> String {
        self.descendants_named(parent, element)
            .next()
            .map(|node| text_content(node).trim().to_string())
            .unwrap_or_default()
    }

    fn parse_gem(&self, node: Node<'_, '_>) -> Result<Gem, ParseError> {
        let mut gem = GemBuilder::new(node.attribute("id").unwrap_or_default());

        gem.set_name(self.child_text(node, CatalogElement::Name));
        gem.set_preciousness(Preciousness::decode(
            &self.child_text(node, CatalogElement::Preciousness),
        )?);
        gem.set_origin(self.child_text(node, CatalogElement::Origin));
        gem.set_value(decode_decimal(
            CatalogElement::Value,
            &self.child_text(node, CatalogElement::Value),
        )?);

        for params in self.descendants_named(node, CatalogElement::VisualParameters) {
            gem.push_visual_parameters(self.parse_visual_parameters(params)?);
        }

        Ok(gem.build())
    }

    fn parse_visual_parameters(&self, node: Node<'_, '_>) -> Result<VisualParameters, ParseError> {
        let colors = self
            .descendants_named(node, CatalogElement::Color)
            .map(|color| Color::decode(text_content(color).trim()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut params = VisualParametersBuilder::new();
        params.set_colors(colors);
        params.set_transparency(decode_decimal(
            CatalogElement::Transparency,
            &self.child_text(node, CatalogElement::Transparency),
        )?);
        params.set_facets(decode_integer(
            CatalogElement::Facets,
            &self.child_text(node, CatalogElement::Facets),
        )?);
        Ok(params.build())
    }
}

impl GemParser for TreeParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Tree
    }

    fn parse_str(&self, xml: &str) -> Result<Vec<Gem>, ParseError> {
        check_declarations(xml)?;
        let document = Document::parse_with_options(xml, parsing_options())?;
        self.parse_document(&document)
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Gem>, ParseError> {
        info!("Starting tree parsing of file: {}", path.display());
        let bytes = std::fs::read(path)?;
        let gems = self.parse_str(&decode_document(&bytes)?)?;
        info!("Tree parsing completed. Found {} gems", gems.len());
        Ok(gems)
    }
}

/// Decode raw document bytes to text
///
/// The encoding is chosen the way quick-xml chooses it: a byte order mark
/// first, then the `encoding` named in the XML declaration, UTF-8 otherwise.
/// Bytes that are invalid in that encoding are an error, not replaced.
pub(crate) fn decode_document(bytes: &[u8]) -> io::Result<Cow<'_, str>> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| declared_encoding(bytes))
        .unwrap_or(UTF_8);
    let (text, used, malformed) = encoding.decode(bytes);
    if malformed {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("document is not valid {}", used.name()),
        ));
    }
    Ok(text)
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => {
            let label = decl.encoding()?.ok()?;
            Encoding::for_label(&label)
        }
        _ => None,
    }
}

/// DOCTYPE declarations are tolerated, as the tokenizer-based parsers skip them
pub(crate) fn parsing_options() -> ParsingOptions {
    ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    }
}

/// Concatenated text of every text node under `node`
pub(crate) fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
