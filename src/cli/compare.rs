use anyhow::{bail, Result};
use gemxml::parser::cross_validate;
use std::path::PathBuf;

use super::Config;

/// Run all three strategies and report whether they agree
pub fn run(file: PathBuf, strict: bool, config: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let parser_config = config.parser_config(strict)?;

    let validation = cross_validate(&file, &parser_config);
    for (kind, result) in &validation.results {
        match result {
            Ok(gems) => println!("{:<5} {} gem(s)", kind.as_str(), gems.len()),
            Err(e) => println!("{:<5} error: {}", kind.as_str(), e),
        }
    }

    match validation.first_divergence() {
        None => {
            println!("All parsers agree");
            Ok(())
        }
        Some(divergence) => bail!("Parsers disagree on {}: {}", file.display(), divergence),
    }
}
