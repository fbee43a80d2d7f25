use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

/// Regroup a catalog with a transform sheet
pub fn run(input: PathBuf, sheet: PathBuf, output: PathBuf) -> Result<()> {
    gemxml::transform::transform(&input, &sheet, &output)
        .with_context(|| format!("Failed to transform {}", input.display()))?;
    info!("Wrote {}", output.display());
    println!("{}", output.display());
    Ok(())
}
