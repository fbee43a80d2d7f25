//! # gemxml - Gem Catalog XML Processing
//!
//! `gemxml` maps a namespaced gem-catalog XML document to typed [`model::Gem`]
//! records with three independent parsing strategies, and checks that they
//! agree.
//!
//! ## Key Features
//!
//! - **Three parsers, one result**: push (callback), pull (cursor) and tree
//!   (materialized) strategies produce identical records for any valid document.
//!
//! - **Exact values**: carat values and transparency percentages are
//!   arbitrary-precision [`bigdecimal::BigDecimal`], never binary floating point.
//!
//! - **Namespace aware**: only elements in the catalog namespace are interpreted;
//!   foreign content is skipped wherever it appears.
//!
//! - **Schema validation**: documents are checked against their XSD before
//!   parsing ([`validator`]).
//!
//! - **Derived documents**: regroup a catalog into a new XML document described
//!   by a TOML sheet ([`transform`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemxml::prelude::*;
//! use std::path::Path;
//!
//! let path = Path::new("gems.xml");
//! if validate(path, Path::new("gems.xsd")) {
//!     let mut gems = ParserKind::Push.parser(ParserConfig::default()).parse_file(path)?;
//!     sort_gems(&mut gems, SortKey::CategoryThenValue);
//!     for gem in &gems {
//!         println!("{} ({}): {:?}", gem.name, gem.origin, gem.value);
//!     }
//! }
//! # Ok::<(), gemxml::parser::ParseError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`model`]: record types and their enumeration codecs
//! - [`parser`]: the three parsing strategies and cross-validation
//! - [`comparator`]: orderings over parsed records
//! - [`validator`]: XSD-subset validation with a per-check report
//! - [`transform`]: grouping transformation into a derived document

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod comparator;
pub mod model;
pub mod parser;
pub mod transform;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::comparator::{sort_gems, sorted, SortKey};
    pub use crate::model::{Color, Gem, GemBuilder, Preciousness, VisualParameters};
    pub use crate::parser::{
        cross_validate, GemParser, ParseError, ParserConfig, ParserKind, PullParser, PushParser,
        TreeParser, GEMS_NAMESPACE,
    };
    pub use crate::transform::{transform, TransformError, TransformSheet};
    pub use crate::validator::{validate, validate_catalog, ValidationReport};
}
