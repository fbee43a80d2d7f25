//! Nested-element state machine shared by the push and pull parsers
//!
//! The adapters translate their traversal into three kinds of calls:
//! [`GemAssembler::start_element`], text accumulation, and
//! [`GemAssembler::end_element`] (preceded by [`GemAssembler::apply_text`]
//! once the element's text is complete). Only elements that already passed the
//! namespace filter reach the assembler.

use log::{debug, warn};

use super::elements::{decode_decimal, decode_integer, CatalogElement};
use super::{ParseError, ParserConfig};
use crate::model::{Color, Gem, GemBuilder, Preciousness, VisualParametersBuilder};

/// Builder state for one parse call
#[derive(Debug)]
pub(crate) struct GemAssembler<'c> {
    config: &'c ParserConfig,
    gems: Vec<Gem>,
    current_gem: Option<GemBuilder>,
    current_visual_params: Option<VisualParametersBuilder>,
    current_colors: Vec<Color>,
    in_visual_parameters: bool,
    pending_text: String,
}

impl<'c> GemAssembler<'c> {
    pub(crate) fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            gems: Vec::new(),
            current_gem: None,
            current_visual_params: None,
            current_colors: Vec::new(),
            in_visual_parameters: false,
            pending_text: String::new(),
        }
    }

    /// Entering a catalog element; `id` is the element's id attribute, if any
    pub(crate) fn start_element(&mut self, element: CatalogElement, id: Option<String>) {
        match element {
            CatalogElement::Gem => {
                self.current_gem = Some(GemBuilder::new(id.unwrap_or_default()));
            }
            CatalogElement::VisualParameters => {
                self.in_visual_parameters = true;
                self.current_visual_params = Some(VisualParametersBuilder::new());
                self.current_colors = Vec::new();
            }
            _ => {}
        }
    }

    /// Append a chunk of character data to the pending text
    pub(crate) fn push_text(&mut self, chunk: &str) {
        self.pending_text.push_str(chunk);
    }

    /// Discard any pending text
    pub(crate) fn clear_text(&mut self) {
        self.pending_text.clear();
    }

    /// Take the pending text, trimmed, leaving the buffer empty
    pub(crate) fn take_text(&mut self) -> String {
        let text = self.pending_text.trim().to_string();
        self.pending_text.clear();
        text
    }

    /// Assign the complete text of `element` to the record under construction
    pub(crate) fn apply_text(&mut self, element: CatalogElement, text: &str) -> Result<(), ParseError> {
        if element.is_group_field() {
            return self.apply_group_text(element, text);
        }

        let Some(gem) = self.current_gem.as_mut() else {
            return Ok(());
        };
        match element {
            CatalogElement::Name => gem.set_name(text.to_string()),
            CatalogElement::Origin => gem.set_origin(text.to_string()),
            CatalogElement::Preciousness => gem.set_preciousness(Preciousness::decode(text)?),
            CatalogElement::Value => gem.set_value(decode_decimal(element, text)?),
            _ => {}
        }
        Ok(())
    }

    fn apply_group_text(&mut self, element: CatalogElement, text: &str) -> Result<(), ParseError> {
        if !self.in_visual_parameters {
            return self.misplaced(element, text);
        }
        let Some(params) = self.current_visual_params.as_mut() else {
            return self.misplaced(element, text);
        };
        match element {
            CatalogElement::Color => self.current_colors.push(Color::decode(text)?),
            CatalogElement::Transparency => params.set_transparency(decode_decimal(element, text)?),
            CatalogElement::Facets => params.set_facets(decode_integer(element, text)?),
            _ => {}
        }
        Ok(())
    }

    fn misplaced(&self, element: CatalogElement, text: &str) -> Result<(), ParseError> {
        if self.config.strict_nesting {
            return Err(ParseError::MisplacedElement {
                element: element.as_str().to_string(),
            });
        }
        warn!(
            "Dropping <{}> value {:?} outside of <visualParameters>",
            element.as_str(),
            text
        );
        Ok(())
    }

    /// Leaving a catalog element
    pub(crate) fn end_element(&mut self, element: CatalogElement) {
        match element {
            CatalogElement::VisualParameters => {
                let params = self.current_visual_params.take();
                let colors = std::mem::take(&mut self.current_colors);
                self.in_visual_parameters = false;
                if let (Some(mut params), Some(gem)) = (params, self.current_gem.as_mut()) {
                    params.set_colors(colors);
                    gem.push_visual_parameters(params.build());
                }
            }
            CatalogElement::Gem => {
                if let Some(gem) = self.current_gem.take() {
                    let gem = gem.build();
                    debug!(
                        "Finished gem {:?} with {} visual parameter group(s)",
                        gem.id,
                        gem.visual_parameters.len()
                    );
                    self.gems.push(gem);
                }
            }
            _ => {}
        }
    }

    /// True while a gem element is open
    pub(crate) fn in_gem(&self) -> bool {
        self.current_gem.is_some()
    }

    /// Finished gems in document order
    pub(crate) fn finish(self) -> Vec<Gem> {
        self.gems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn feed(assembler: &mut GemAssembler<'_>, element: CatalogElement, text: &str) {
        assembler.start_element(element, None);
        assembler.push_text(text);
        let text = assembler.take_text();
        assembler.apply_text(element, &text).unwrap();
        assembler.end_element(element);
    }

    #[test]
    fn test_assembles_nested_groups() {
        let config = ParserConfig::default();
        let mut assembler = GemAssembler::new(&config);

        assembler.start_element(CatalogElement::Gem, Some("gem001".to_string()));
        feed(&mut assembler, CatalogElement::Name, "Diamond");
        feed(&mut assembler, CatalogElement::Preciousness, "precious");
        feed(&mut assembler, CatalogElement::Origin, "South Africa");
        assembler.start_element(CatalogElement::VisualParameters, None);
        feed(&mut assembler, CatalogElement::Color, "white");
        feed(&mut assembler, CatalogElement::Color, "white");
        feed(&mut assembler, CatalogElement::Transparency, "95.5");
        feed(&mut assembler, CatalogElement::Facets, "57");
        assembler.end_element(CatalogElement::VisualParameters);
        assembler.start_element(CatalogElement::VisualParameters, None);
        assembler.end_element(CatalogElement::VisualParameters);
        feed(&mut assembler, CatalogElement::Value, "2.50");
        assembler.end_element(CatalogElement::Gem);

        let gems = assembler.finish();
        assert_eq!(gems.len(), 1);
        let gem = &gems[0];
        assert_eq!(gem.id, "gem001");
        assert_eq!(gem.name, "Diamond");
        assert_eq!(gem.preciousness, Some(Preciousness::Precious));
        assert_eq!(gem.value, Some(BigDecimal::new(250.into(), 2)));
        assert_eq!(gem.visual_parameters.len(), 2);
        assert_eq!(gem.visual_parameters[0].colors, vec![Color::White, Color::White]);
        assert_eq!(gem.visual_parameters[0].facets, Some(57));
        assert!(gem.visual_parameters[1].colors.is_empty());
    }

    #[test]
    fn test_text_accumulates_across_chunks() {
        let config = ParserConfig::default();
        let mut assembler = GemAssembler::new(&config);
        assembler.start_element(CatalogElement::Gem, None);
        assembler.push_text("  Star ");
        assembler.push_text("Sapph");
        assembler.push_text("ire \n");
        let text = assembler.take_text();
        assembler.apply_text(CatalogElement::Name, &text).unwrap();
        assembler.end_element(CatalogElement::Gem);

        let gems = assembler.finish();
        assert_eq!(gems[0].name, "Star Sapphire");
        assert_eq!(gems[0].id, "");
    }

    #[test]
    fn test_misplaced_group_field_is_dropped() {
        let config = ParserConfig::default();
        let mut assembler = GemAssembler::new(&config);
        assembler.start_element(CatalogElement::Gem, None);
        feed(&mut assembler, CatalogElement::Color, "red");
        feed(&mut assembler, CatalogElement::Facets, "not a number");
        assembler.end_element(CatalogElement::Gem);

        let gems = assembler.finish();
        assert!(gems[0].visual_parameters.is_empty());
    }

    #[test]
    fn test_misplaced_group_field_fails_when_strict() {
        let config = ParserConfig::default().strict(true);
        let mut assembler = GemAssembler::new(&config);
        assembler.start_element(CatalogElement::Gem, None);
        let err = assembler.apply_text(CatalogElement::Transparency, "50").unwrap_err();
        assert!(matches!(err, ParseError::MisplacedElement { ref element } if element == "transparency"));
    }

    #[test]
    fn test_unknown_enum_propagates() {
        let config = ParserConfig::default();
        let mut assembler = GemAssembler::new(&config);
        assembler.start_element(CatalogElement::Gem, None);
        let err = assembler.apply_text(CatalogElement::Preciousness, "Precious").unwrap_err();
        assert!(matches!(err, ParseError::UnknownEnumValue(_)));
    }

    #[test]
    fn test_fields_outside_gem_are_ignored() {
        let config = ParserConfig::default();
        let mut assembler = GemAssembler::new(&config);
        assembler.apply_text(CatalogElement::Value, "oops").unwrap();
        assert!(!assembler.in_gem());
        assert!(assembler.finish().is_empty());
    }
}
