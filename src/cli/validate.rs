use anyhow::{Context, Result};
use gemxml::validator::{validate_catalog, ValidationReport};
use log::info;
use std::path::{Path, PathBuf};

use super::Config;

/// Validate a catalog document against its schema
pub fn run(file: PathBuf, schema: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let schema = resolve_schema(schema, &config)
        .context("No schema given: pass --schema or set [paths] schema in the config file")?;

    info!("Gem Catalog Validator");
    info!("Document: {}", file.display());
    info!("Schema: {}", schema.display());

    match validate_catalog(&file, &schema) {
        Ok(report) => {
            print_report(&report);

            // Exit with error code if validation failed
            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Validation error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Command line flag first, then the config file
pub fn resolve_schema(flag: Option<PathBuf>, config: &Config) -> Option<PathBuf> {
    flag.or_else(|| config.paths.schema.clone())
}

/// Print a report, colorized when available
pub fn print_report(report: &ValidationReport) {
    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }
}

/// Validation step of `parse --schema`; true when parsing may proceed
pub fn gate(file: &Path, schema: &Path) -> Result<bool> {
    let report = validate_catalog(file, schema)
        .with_context(|| format!("Failed to validate {}", file.display()))?;
    if report.passed() {
        info!("{} is valid against {}", file.display(), schema.display());
        return Ok(true);
    }
    print_report(&report);
    Ok(false)
}
