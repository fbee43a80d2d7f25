use anyhow::{Context, Result};
use gemxml::comparator::{sort_gems, SortKey};
use gemxml::model::Gem;
use gemxml::parser::ParserKind;
use log::info;
use std::io::Write;
use std::path::PathBuf;

use super::{validate, Config, ParserArg};

pub struct ParseArgs {
    pub file: PathBuf,
    pub parser: Option<ParserArg>,
    pub sort: Option<SortKey>,
    pub json: bool,
    pub schema: Option<PathBuf>,
    pub strict: bool,
    pub config: Option<PathBuf>,
}

/// Parse a catalog with one strategy and print the gems
pub fn run(args: ParseArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let parser_config = config.parser_config(args.strict)?;
    let kind = ParserKind::from(
        args.parser
            .or(config.parser.default_parser)
            .unwrap_or_default(),
    );

    if let Some(schema) = validate::resolve_schema(args.schema, &config) {
        if !validate::gate(&args.file, &schema)? {
            eprintln!("{} is not valid; not parsing", args.file.display());
            std::process::exit(1);
        }
    }

    info!("Parsing {} with the {} parser", args.file.display(), kind);
    let mut gems = kind
        .parser(parser_config)
        .parse_file(&args.file)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    if let Some(key) = args.sort {
        sort_gems(&mut gems, key);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &gems).context("Failed to write JSON")?;
        writeln!(out)?;
    } else {
        print_gems(&mut out, &gems)?;
    }
    Ok(())
}

fn print_gems(out: &mut impl Write, gems: &[Gem]) -> Result<()> {
    writeln!(out, "{} gem(s)", gems.len())?;
    for gem in gems {
        let preciousness = gem.preciousness.map_or("-", |p| p.as_str());
        let value = gem.value.as_ref().map_or_else(|| "-".to_string(), |v| v.to_string());
        writeln!(
            out,
            "{:<8} {:<16} {:<14} {:<16} {:>8} ct",
            gem.id, gem.name, preciousness, gem.origin, value
        )?;
        for params in &gem.visual_parameters {
            let colors: Vec<&str> = params.colors.iter().map(|c| c.as_str()).collect();
            let transparency = params
                .transparency
                .as_ref()
                .map_or_else(|| "-".to_string(), |t| format!("{}%", t));
            let facets = params.facets.map_or_else(|| "-".to_string(), |f| f.to_string());
            writeln!(
                out,
                "         colors: [{}], transparency: {}, facets: {}",
                colors.join(", "),
                transparency,
                facets
            )?;
        }
    }
    Ok(())
}
