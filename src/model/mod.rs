//! # Gem Catalog Record Model
//!
//! Plain data types produced by every parser in [`crate::parser`]:
//!
//! ```text
//! Gem (id, name, preciousness, origin, value)
//! └── VisualParameters* (transparency, facets)
//!     └── Color*
//! ```
//!
//! Decimal fields use [`bigdecimal::BigDecimal`] so values of any precision
//! round-trip exactly from their document text. Enumerations decode from their
//! canonical lowercase strings only (case-sensitive, no trimming).

mod builder;
mod color;
mod gem;
mod preciousness;


pub use builder::{GemBuilder, VisualParametersBuilder};
pub use color::Color;
pub use gem::{Gem, VisualParameters};
pub use preciousness::Preciousness;

/// Error returned when text does not match any canonical enumeration string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value:?}")]
pub struct UnknownEnumValue {
    /// Name of the enumeration that rejected the text ("color", "preciousness")
    pub kind: &'static str,
    /// The rejected text, verbatim
    pub value: String,
}

impl UnknownEnumValue {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
