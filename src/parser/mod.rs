//! # Gem Catalog Parsers
//!
//! Three independent strategies map the namespaced gem catalog to
//! [`Gem`] records:
//!
//! - [`PushParser`]: the tokenizer calls back on element start, text chunk and
//!   element end ([`events::drive`]); text is interpreted when its element closes.
//! - [`PullParser`]: the caller advances a cursor and routes text to the element
//!   that is currently open.
//! - [`TreeParser`]: the document is materialized first and queried structurally.
//!
//! Push and pull share one nested-element state machine (the assembler), so the
//! rules for entering and leaving `gem` / `visualParameters` live in one place.
//! For any valid document all three produce structurally identical sequences in
//! document order; [`cross_validate`] checks exactly that.
//!
//! ## Document Shape
//!
//! ```text
//! gems (root, catalog namespace)
//! └── gem* [@id]
//!     ├── name
//!     ├── preciousness    precious | semi-precious
//!     ├── origin
//!     ├── visualParameters*
//!     │   ├── color*      green | red | yellow | ...
//!     │   ├── transparency
//!     │   └── facets
//!     └── value
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gemxml::parser::{GemParser, ParserConfig, ParserKind};
//! use std::path::Path;
//!
//! let parser = ParserKind::Pull.parser(ParserConfig::default());
//! let gems = parser.parse_file(Path::new("gems.xml"))?;
//! println!("{} gems", gems.len());
//! # Ok::<(), gemxml::parser::ParseError>(())
//! ```

use std::fmt;
use std::path::Path;

use log::warn;

use crate::model::Gem;

pub use config::{ParserConfig, DEFAULT_INPUT_BUFFER_SIZE, GEMS_NAMESPACE};
pub use error::{DocumentError, ParseError};
pub use events::{Attributes, ContentHandler};
pub use pull::PullParser;
pub use push::PushParser;
pub use tree::TreeParser;

mod assembler;
mod config;
mod elements;
pub(crate) mod entities;
mod error;
pub mod events;
mod pull;
mod push;
pub(crate) mod tree;


/// A strategy that maps a gem catalog document to records
///
/// Implementations hold no state between calls; every call builds fresh
/// records and releases its source handle on every exit path.
pub trait GemParser: Send + Sync {
    /// Which strategy this is
    fn kind(&self) -> ParserKind;

    /// Parse a document held in memory
    fn parse_str(&self, xml: &str) -> Result<Vec<Gem>, ParseError>;

    /// Parse the document at `path`
    fn parse_file(&self, path: &Path) -> Result<Vec<Gem>, ParseError>;
}

/// The three traversal strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    /// Callback-driven traversal
    Push,
    /// Cursor-driven traversal
    Pull,
    /// Materialized tree traversal
    Tree,
}

impl ParserKind {
    /// All strategies, in cross-validation order
    pub const ALL: [ParserKind; 3] = [ParserKind::Push, ParserKind::Pull, ParserKind::Tree];

    /// Instantiate the parser for this strategy
    pub fn parser(&self, config: ParserConfig) -> Box<dyn GemParser> {
        match self {
            ParserKind::Push => Box::new(PushParser::new(config)),
            ParserKind::Pull => Box::new(PullParser::new(config)),
            ParserKind::Tree => Box::new(TreeParser::new(config)),
        }
    }

    /// Short display name
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::Push => "push",
            ParserKind::Pull => "pull",
            ParserKind::Tree => "tree",
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `path` with one strategy
pub fn parse_file(kind: ParserKind, path: &Path, config: &ParserConfig) -> Result<Vec<Gem>, ParseError> {
    kind.parser(config.clone()).parse_file(path)
}

/// Where the outputs of two strategies first differ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// A strategy failed while the others may have succeeded
    Failed(ParserKind),
    /// Two strategies produced different numbers of gems
    Length {
        /// Reference strategy
        expected: ParserKind,
        /// Strategy that disagrees
        actual: ParserKind,
    },
    /// Two strategies disagree on the gem at `index`
    Record {
        /// Reference strategy
        expected: ParserKind,
        /// Strategy that disagrees
        actual: ParserKind,
        /// Position in document order
        index: usize,
    },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Divergence::Failed(kind) => write!(f, "{} parser failed", kind),
            Divergence::Length { expected, actual } => {
                write!(f, "{} and {} parsers found different gem counts", expected, actual)
            }
            Divergence::Record { expected, actual, index } => write!(
                f,
                "{} and {} parsers disagree on gem #{}",
                expected, actual, index
            ),
        }
    }
}

/// Outcome of running every strategy over the same document
///
/// Each result is independent: one strategy failing does not affect the others.
#[derive(Debug)]
pub struct CrossValidation {
    /// Result per strategy, in [`ParserKind::ALL`] order
    pub results: Vec<(ParserKind, Result<Vec<Gem>, ParseError>)>,
}

impl CrossValidation {
    /// Result of one strategy
    pub fn result(&self, kind: ParserKind) -> Option<&Result<Vec<Gem>, ParseError>> {
        self.results.iter().find(|(k, _)| *k == kind).map(|(_, r)| r)
    }

    /// First disagreement between the strategies, if any
    pub fn first_divergence(&self) -> Option<Divergence> {
        let mut reference: Option<(ParserKind, &Vec<Gem>)> = None;
        for (kind, result) in &self.results {
            let gems = match result {
                Ok(gems) => gems,
                Err(_) => return Some(Divergence::Failed(*kind)),
            };
            let Some((expected, expected_gems)) = reference else {
                reference = Some((*kind, gems));
                continue;
            };
            if expected_gems.len() != gems.len() {
                return Some(Divergence::Length {
                    expected,
                    actual: *kind,
                });
            }
            if let Some(index) = expected_gems
                .iter()
                .zip(gems)
                .position(|(a, b)| !a.same_content(b))
            {
                return Some(Divergence::Record {
                    expected,
                    actual: *kind,
                    index,
                });
            }
        }
        None
    }

    /// True when every strategy succeeded with structurally identical output
    pub fn is_consistent(&self) -> bool {
        self.first_divergence().is_none()
    }
}

/// Run all three strategies over `path` and compare their output
pub fn cross_validate(path: &Path, config: &ParserConfig) -> CrossValidation {
    let results = run_all(path, config);
    let validation = CrossValidation {
        results: ParserKind::ALL.into_iter().zip(results).collect(),
    };
    if let Some(divergence) = validation.first_divergence() {
        warn!("Cross-validation of {} failed: {}", path.display(), divergence);
    }
    validation
}

#[cfg(feature = "parallel")]
fn run_all(path: &Path, config: &ParserConfig) -> Vec<Result<Vec<Gem>, ParseError>> {
    let (push, (pull, tree)) = rayon::join(
        || parse_file(ParserKind::Push, path, config),
        || {
            rayon::join(
                || parse_file(ParserKind::Pull, path, config),
                || parse_file(ParserKind::Tree, path, config),
            )
        },
    );
    vec![push, pull, tree]
}

#[cfg(not(feature = "parallel"))]
fn run_all(path: &Path, config: &ParserConfig) -> Vec<Result<Vec<Gem>, ParseError>> {
    ParserKind::ALL
        .iter()
        .map(|kind| parse_file(*kind, path, config))
        .collect()
}
