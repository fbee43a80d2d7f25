use crate::model::UnknownEnumValue;

/// Errors that can occur while mapping a gem catalog to records
///
/// Every variant is fatal to the parse call that raised it; no partial
/// collection is returned.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document could not be read or is not well-formed XML
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] DocumentError),

    /// Text did not match a canonical color or preciousness string
    #[error("Unknown enum value: {0}")]
    UnknownEnumValue(#[from] UnknownEnumValue),

    /// Non-numeric text where a decimal or integer was expected
    #[error("Malformed number in <{element}>: {text:?}")]
    MalformedNumber {
        /// Local name of the element holding the text
        element: String,
        /// The rejected text
        text: String,
    },

    /// A group-level element appeared outside any visualParameters group
    /// (only raised when strict nesting is enabled)
    #[error("Element <{element}> outside of <visualParameters>")]
    MisplacedElement {
        /// Local name of the misplaced element
        element: String,
    },
}

/// Underlying cause of a [`ParseError::MalformedDocument`]
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// I/O error while opening or reading the source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tokenizer error
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Tree construction error
    #[error("XML tree error: {0}")]
    Tree(#[from] roxmltree::Error),

    /// Structurally broken document (truncated, no root, unbound prefix, ...)
    #[error("Invalid document structure: {0}")]
    Structure(String),
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::MalformedDocument(DocumentError::Io(e))
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        ParseError::MalformedDocument(DocumentError::Xml(e))
    }
}

impl From<roxmltree::Error> for ParseError {
    fn from(e: roxmltree::Error) -> Self {
        ParseError::MalformedDocument(DocumentError::Tree(e))
    }
}

impl ParseError {
    pub(crate) fn structure(message: impl Into<String>) -> Self {
        ParseError::MalformedDocument(DocumentError::Structure(message.into()))
    }

    pub(crate) fn malformed_number(element: &str, text: &str) -> Self {
        ParseError::MalformedNumber {
            element: element.to_string(),
            text: text.to_string(),
        }
    }

    /// Returns true for [`ParseError::MalformedDocument`]
    pub fn is_malformed_document(&self) -> bool {
        matches!(self, ParseError::MalformedDocument(_))
    }
}
