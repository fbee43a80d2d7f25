//! TOML configuration file support.
//!
//! Instead of repeating flags, settings can live in a config file:
//!
//! ```toml
//! # gemxml.toml
//! [parser]
//! default_parser = "pull"
//! strict_nesting = true
//! buffer_size = 16384
//!
//! [paths]
//! schema = "schemas/gems.xsd"
//! ```

use anyhow::{bail, Context, Result};
use gemxml::parser::ParserConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::ParserArg;

/// Root configuration structure for gemxml.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Parser settings.
    #[serde(default)]
    pub parser: ParserSettings,

    /// Default file locations.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Settings for the parse and compare commands.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserSettings {
    /// Catalog namespace to interpret.
    pub namespace: Option<String>,

    /// Fail on group fields outside visualParameters.
    pub strict_nesting: Option<bool>,

    /// Input buffer size in bytes.
    pub buffer_size: Option<usize>,

    /// Strategy used when --parser is not given.
    pub default_parser: Option<ParserArg>,
}

/// Default paths used when the matching flag is absent.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// XSD used to validate before parsing.
    pub schema: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Parser settings from the file with `strict` from the command line on top.
    pub fn parser_config(&self, strict: bool) -> Result<ParserConfig> {
        let mut config = ParserConfig::default();
        if let Some(namespace) = &self.parser.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(buffer_size) = self.parser.buffer_size {
            if buffer_size == 0 {
                bail!("parser.buffer_size must be greater than zero");
            }
            config.buffer_size = buffer_size;
        }
        config.strict_nesting = strict || self.parser.strict_nesting.unwrap_or(false);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [parser]
            namespace = "urn:gems"
            strict_nesting = true
            buffer_size = 4096
            default_parser = "tree"

            [paths]
            schema = "schemas/gems.xsd"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.parser.namespace.as_deref(), Some("urn:gems"));
        assert_eq!(config.parser.strict_nesting, Some(true));
        assert_eq!(config.parser.buffer_size, Some(4096));
        assert_eq!(config.parser.default_parser, Some(ParserArg::Tree));
        assert_eq!(config.paths.schema, Some(PathBuf::from("schemas/gems.xsd")));

        let parser = config.parser_config(false).unwrap();
        assert_eq!(parser.namespace, "urn:gems");
        assert!(parser.strict_nesting);
        assert_eq!(parser.buffer_size, 4096);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [parser]
            strict_nesting = false
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.parser.namespace, None);
        assert!(config.paths.schema.is_none());
        assert!(config.parser_config(true).unwrap().strict_nesting);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.parser_config(false).unwrap(), ParserConfig::default());
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(Config::from_str("[parser]\ndefault_parser = \"sax\"").is_err());
        assert!(Config::from_str("[parsers]\nstrict_nesting = true").is_err());
        let zero = Config::from_str("[parser]\nbuffer_size = 0").unwrap();
        assert!(zero.parser_config(false).is_err());
        assert!(Config::load(Some(Path::new("/nonexistent/gemxml.toml"))).is_err());
        assert!(Config::load(None).is_ok());
    }
}
