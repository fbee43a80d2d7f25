//! Internal DTD entities
//!
//! roxmltree expands general entities declared in a document's internal
//! subset. The tokenizer-based parsers collect the same declarations from the
//! DOCTYPE event and resolve references through an [`EntityTable`]. Entities
//! whose replacement text would introduce markup, refer back to themselves or
//! grow past 64 KiB are rejected up front by every parser.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ParseError;

/// Largest replacement text a single entity may expand to
const MAX_EXPANSION: usize = 64 * 1024;

/// General entities declared in the internal subset, fully expanded
#[derive(Debug, Default, Clone)]
pub(crate) struct EntityTable {
    entities: HashMap<String, String>,
}

impl EntityTable {
    /// Collect and expand the entities declared in DOCTYPE content
    pub(crate) fn from_doctype(doctype: &str) -> Result<Self, ParseError> {
        let declared = declarations(doctype)?;
        let mut entities = HashMap::with_capacity(declared.len());
        for name in declared.keys() {
            expand(name, &declared, &mut entities, &mut Vec::new())?;
        }
        Ok(Self { entities })
    }

    /// Replacement text for `&name;`, predefined entities included
    pub(crate) fn resolve(&self, name: &str) -> Option<&str> {
        predefined(name).or_else(|| self.entities.get(name).map(String::as_str))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }
}

/// Apply the entity rules to a document the tree parser is about to load
///
/// Tokenizer errors are left for the tree builder to report.
pub(crate) fn check_declarations(xml: &str) -> Result<(), ParseError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::DocType(doctype)) => {
                let content = reader.decoder().decode(&doctype).map_err(quick_xml::Error::from)?;
                EntityTable::from_doctype(&content)?;
                return Ok(());
            }
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) | Ok(Event::Eof) | Err(_) => return Ok(()),
            Ok(_) => {}
        }
    }
}

fn predefined(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}

fn entity_error(name: &str, reason: impl std::fmt::Display) -> ParseError {
    ParseError::structure(format!("entity '{name}' {reason}"))
}

/// Entity literals by name; the first declaration of a name wins
fn declarations(doctype: &str) -> Result<HashMap<String, String>, ParseError> {
    let mut declared = HashMap::new();
    let mut rest = doctype;

    while let Some(pos) = rest.find(|c: char| matches!(c, '<' | '"' | '\'')) {
        let tail = &rest[pos..];
        rest = if let Some(body) = tail.strip_prefix("<!--") {
            skip_past(body, "-->")?
        } else if let Some(body) = tail.strip_prefix("<?") {
            skip_past(body, "?>")?
        } else if let Some(body) = tail.strip_prefix("<!ENTITY") {
            entity_declaration(body, &mut declared)?
        } else if let Some(body) = tail.strip_prefix('"') {
            skip_past(body, "\"")?
        } else if let Some(body) = tail.strip_prefix('\'') {
            skip_past(body, "'")?
        } else {
            &tail[1..]
        };
    }

    Ok(declared)
}

fn skip_past<'a>(text: &'a str, terminator: &str) -> Result<&'a str, ParseError> {
    text.find(terminator)
        .map(|pos| &text[pos + terminator.len()..])
        .ok_or_else(|| ParseError::structure(format!("unterminated markup in DOCTYPE, expected {terminator:?}")))
}

/// Rest of the subset after the `>` closing a declaration, skipping quoted text
fn declaration_end(mut text: &str) -> Result<&str, ParseError> {
    loop {
        let pos = text
            .find(|c: char| matches!(c, '>' | '"' | '\''))
            .ok_or_else(|| ParseError::structure("unterminated entity declaration"))?;
        match &text[pos..pos + 1] {
            ">" => return Ok(&text[pos + 1..]),
            quote => text = skip_past(&text[pos + 1..], quote)?,
        }
    }
}

fn entity_declaration<'a>(body: &'a str, declared: &mut HashMap<String, String>) -> Result<&'a str, ParseError> {
    let body = body.trim_start();
    // Parameter entities only matter inside the DTD itself
    if body.starts_with('%') {
        return declaration_end(body);
    }

    let name_end = body
        .find(|c: char| c.is_whitespace())
        .ok_or_else(|| ParseError::structure("malformed entity declaration"))?;
    let name = &body[..name_end];
    let definition = body[name_end..].trim_start();

    let quote = match definition.chars().next() {
        Some(quote @ ('"' | '\'')) => quote,
        // External entities are never loaded, so references to them fail
        _ => return declaration_end(definition),
    };
    let literal = &definition[1..];
    let close = literal
        .find(quote)
        .ok_or_else(|| entity_error(name, "has an unterminated value"))?;
    let value = expand_char_refs(name, &literal[..close])?;
    declared.entry(name.to_string()).or_insert(value);
    declaration_end(&literal[close + 1..])
}

/// Character references are replaced when the entity is declared
fn expand_char_refs(name: &str, literal: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(literal.len());
    let mut rest = literal;
    while let Some(pos) = rest.find("&#") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        let end = after
            .find(';')
            .ok_or_else(|| entity_error(name, "has an unterminated character reference"))?;
        out.push(char_reference(&after[..end]).ok_or_else(|| entity_error(name, "has an invalid character reference"))?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn char_reference(digits: &str) -> Option<char> {
    let code = match digits.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code).filter(|c| *c != '\0')
}

/// Expand the general references in an entity's replacement text
fn expand(
    name: &str,
    declared: &HashMap<String, String>,
    done: &mut HashMap<String, String>,
    stack: &mut Vec<String>,
) -> Result<String, ParseError> {
    if let Some(text) = done.get(name) {
        return Ok(text.clone());
    }
    if stack.iter().any(|open| open == name) {
        return Err(entity_error(name, "refers to itself"));
    }
    let Some(replacement) = declared.get(name) else {
        return Err(entity_error(name, "is not declared"));
    };

    stack.push(name.to_string());
    let mut out = String::with_capacity(replacement.len());
    let mut rest = replacement.as_str();
    while let Some(pos) = rest.find(|c: char| c == '&' || c == '<') {
        out.push_str(&rest[..pos]);
        if rest[pos..].starts_with('<') {
            return Err(entity_error(name, "contains markup"));
        }
        let after = &rest[pos + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| entity_error(name, "has an unterminated reference"))?;
        let reference = &after[..end];

        if let Some(digits) = reference.strip_prefix('#') {
            out.push(char_reference(digits).ok_or_else(|| entity_error(name, "has an invalid character reference"))?);
        } else if let Some(text) = predefined(reference) {
            out.push_str(text);
        } else {
            out.push_str(&expand(reference, declared, done, stack)?);
        }

        if out.len() > MAX_EXPANSION {
            return Err(entity_error(name, format!("expands past {MAX_EXPANSION} bytes")));
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    if out.len() > MAX_EXPANSION {
        return Err(entity_error(name, format!("expands past {MAX_EXPANSION} bytes")));
    }
    stack.pop();

    done.insert(name.to_string(), out.clone());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_internal_entities() {
        let table = EntityTable::from_doctype(
            r#"gems [
                <!-- <!ENTITY hidden "no"> -->
                <!ENTITY r "Ruby">
                <!ENTITY full '&r; &amp; Sapphire'>
                <!ENTITY hex "&#x42;lue">
                <!ENTITY r "ignored redeclaration">
                <!ENTITY % param "skipped">
                <!ENTITY ext SYSTEM "ext.txt">
                <!ATTLIST gem note CDATA "<!ENTITY fake 'x'>">
            ]"#,
        )
        .unwrap();

        assert_eq!(table.resolve("r"), Some("Ruby"));
        assert_eq!(table.resolve("full"), Some("Ruby & Sapphire"));
        assert_eq!(table.resolve("hex"), Some("Blue"));
        assert_eq!(table.resolve("amp"), Some("&"));
        assert_eq!(table.resolve("hidden"), None);
        assert_eq!(table.resolve("param"), None);
        assert_eq!(table.resolve("ext"), None);
        assert_eq!(table.resolve("fake"), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_escaped_markup_stays_text() {
        let table = EntityTable::from_doctype(r#"x [<!ENTITY lt2 "&#38;#60;b&#38;#62;">]"#).unwrap();
        assert_eq!(table.resolve("lt2"), Some("<b>"));
    }

    #[test]
    fn test_rejects_unexpandable_entities() {
        for doctype in [
            r#"x [<!ENTITY tag "<b>bold</b>">]"#,
            r#"x [<!ENTITY tag "&#60;b/>">]"#,
            r#"x [<!ENTITY a "&b;"><!ENTITY b "&a;">]"#,
            r#"x [<!ENTITY a "&missing;">]"#,
            r#"x [<!ENTITY a "&#xFFFFFFFF;">]"#,
            r#"x [<!ENTITY a "unterminated>]"#,
        ] {
            let err = EntityTable::from_doctype(doctype).unwrap_err();
            assert!(err.is_malformed_document(), "{doctype}: {err:?}");
        }
    }

    #[test]
    fn test_rejects_entity_expansion_bombs() {
        let mut doctype = String::from(r#"x [<!ENTITY l0 "ha">"#);
        for level in 1..=10 {
            let previous = format!("&l{};", level - 1);
            doctype.push_str(&format!(r#"<!ENTITY l{level} "{}">"#, previous.repeat(10)));
        }
        doctype.push(']');
        let err = EntityTable::from_doctype(&doctype).unwrap_err();
        assert!(err.to_string().contains("expands past"), "{err}");
    }

    #[test]
    fn test_check_declarations_only_reads_prolog() {
        assert!(check_declarations(r#"<!DOCTYPE g [<!ENTITY r "Ruby">]><g>&r;</g>"#).is_ok());
        assert!(check_declarations(r#"<!DOCTYPE g [<!ENTITY t "<b/>">]><g/>"#).is_err());
        assert!(check_declarations("<g><!-- <!DOCTYPE --></g>").is_ok());
        assert!(check_declarations("not xml <").is_ok());
    }
}
