use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gemxml::comparator::SortKey;
use gemxml::parser::ParserKind;
use serde::Deserialize;
use std::path::PathBuf;

mod compare;
mod config;
mod parse;
mod transform;
mod validate;

pub use config::Config;

/// gemxml - Gem catalog XML parser, validator and transformer
#[derive(Parser)]
#[command(name = "gemxml")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Parsing strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserArg {
    /// Callback-driven (SAX style)
    #[default]
    Push,
    /// Cursor-driven (StAX style)
    Pull,
    /// Materialized tree (DOM style)
    Tree,
}

/// Output order for parsed gems.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortArg {
    /// Name, ignoring case
    Name,
    /// Ascending value
    Value,
    /// Origin, ignoring case
    Origin,
    /// Precious first, then ascending value
    Category,
}

impl From<ParserArg> for ParserKind {
    fn from(arg: ParserArg) -> Self {
        match arg {
            ParserArg::Push => ParserKind::Push,
            ParserArg::Pull => ParserKind::Pull,
            ParserArg::Tree => ParserKind::Tree,
        }
    }
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortKey::Name,
            SortArg::Value => SortKey::Value,
            SortArg::Origin => SortKey::Origin,
            SortArg::Category => SortKey::CategoryThenValue,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a catalog against its XML schema
    Validate {
        /// Catalog XML file
        #[arg(value_name = "XML")]
        file: PathBuf,

        /// XSD schema (falls back to [paths] schema in the config file)
        #[arg(short, long, value_name = "XSD")]
        schema: Option<PathBuf>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Parse a catalog and print its gems
    Parse {
        /// Catalog XML file
        #[arg(value_name = "XML")]
        file: PathBuf,

        /// Parsing strategy (defaults to push, or [parser] default_parser)
        #[arg(short, long, value_enum)]
        parser: Option<ParserArg>,

        /// Sort order of the printed gems (document order when omitted)
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Print gems as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Validate against this XSD first; parsing is skipped if validation fails
        #[arg(short, long, value_name = "XSD")]
        schema: Option<PathBuf>,

        /// Fail on color/transparency/facets outside visualParameters
        #[arg(long)]
        strict: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Run all three parsers over a catalog and compare their output
    Compare {
        /// Catalog XML file
        #[arg(value_name = "XML")]
        file: PathBuf,

        /// Fail on color/transparency/facets outside visualParameters
        #[arg(long)]
        strict: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Regroup a catalog into a derived XML document
    Transform {
        /// Catalog XML file
        #[arg(value_name = "XML")]
        input: PathBuf,

        /// TOML transform sheet
        #[arg(value_name = "SHEET")]
        sheet: PathBuf,

        /// Output XML file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate { file, schema, config } => validate::run(file, schema, config),
        Commands::Parse {
            file,
            parser,
            sort,
            json,
            schema,
            strict,
            config,
        } => parse::run(parse::ParseArgs {
            file,
            parser,
            sort: sort.map(SortKey::from),
            json,
            schema,
            strict,
            config,
        }),
        Commands::Compare { file, strict, config } => compare::run(file, strict, config),
        Commands::Transform { input, sheet, output } => transform::run(input, sheet, output),
    }
}
