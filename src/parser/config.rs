use serde::Deserialize;

/// Namespace of the gem catalog schema
pub const GEMS_NAMESPACE: &str = "http://www.example.com/gems";

/// Default input buffer size for file parsing (64KB)
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// Settings shared by all three parsers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Only elements in this namespace are interpreted
    pub namespace: String,

    /// Fail on color/transparency/facets outside a visualParameters group
    /// instead of dropping the value
    pub strict_nesting: bool,

    /// Size of the input buffer in bytes when parsing files
    pub buffer_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            namespace: GEMS_NAMESPACE.to_string(),
            strict_nesting: false,
            buffer_size: DEFAULT_INPUT_BUFFER_SIZE,
        }
    }
}

impl ParserConfig {
    /// Use a different catalog namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Enable or disable strict nesting
    pub fn strict(mut self, strict_nesting: bool) -> Self {
        self.strict_nesting = strict_nesting;
        self
    }
}
