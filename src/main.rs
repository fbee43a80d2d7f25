//! # gemxml
//!
//! Command line front end for the gem catalog library.
//!
//! ## Usage
//!
//! ```bash
//! # Check a catalog against its schema
//! gemxml validate gems.xml --schema gems.xsd
//!
//! # Validate, then parse with the pull parser and sort by value
//! gemxml parse gems.xml --schema gems.xsd --parser pull --sort value
//!
//! # Run all three parsers and compare their output
//! gemxml compare gems.xml
//!
//! # Regroup the catalog by preciousness
//! gemxml transform gems.xml by_preciousness.toml grouped.xml
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity
    cli::init_logging(cli.verbosity());

    cli::dispatch(cli)
}
