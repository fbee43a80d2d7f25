//! TOML transform sheets
//!
//! A sheet describes the derived document:
//!
//! ```toml
//! # by_preciousness.toml
//! root = "gemsByPreciousness"
//! group_element = "category"
//! group_by = "preciousness"
//! sort_by = "value"
//! indent = 2
//! ```

use std::path::Path;

use serde::Deserialize;

use super::TransformError;
use crate::parser::GEMS_NAMESPACE;

/// Field used to order gems inside each group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Case-insensitive name
    Name,
    /// Ascending numeric value; gems without a parseable value first
    Value,
    /// Case-insensitive origin
    Origin,
}

impl SortField {
    /// Local name of the gem child element holding the sort key
    pub fn element(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Value => "value",
            SortField::Origin => "origin",
        }
    }
}

/// Shape of the derived document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformSheet {
    /// Name of the output root element
    pub root: String,

    /// Gem child element whose text is the grouping key
    pub group_by: String,

    /// Name of the element wrapping each group
    pub group_element: String,

    /// Attribute of the group element carrying the key
    pub group_attribute: String,

    /// Order inside each group; document order when absent
    pub sort_by: Option<SortField>,

    /// Spaces per nesting level; 0 writes compact output
    pub indent: usize,

    /// Catalog namespace, read from the input and declared on the output root
    pub namespace: String,
}

impl Default for TransformSheet {
    fn default() -> Self {
        Self {
            root: "gemsByPreciousness".to_string(),
            group_by: "preciousness".to_string(),
            group_element: "group".to_string(),
            group_attribute: "name".to_string(),
            sort_by: None,
            indent: 2,
            namespace: GEMS_NAMESPACE.to_string(),
        }
    }
}

impl TransformSheet {
    /// Load a sheet from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, TransformError> {
        let content = std::fs::read_to_string(path).map_err(|source| TransformError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse a sheet from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, TransformError> {
        let sheet: Self = toml::from_str(content)?;
        sheet.check()?;
        Ok(sheet)
    }

    fn check(&self) -> Result<(), TransformError> {
        for (field, value) in [
            ("root", &self.root),
            ("group_by", &self.group_by),
            ("group_element", &self.group_element),
            ("group_attribute", &self.group_attribute),
        ] {
            if !is_xml_name(value) {
                return Err(TransformError::InvalidSheet(format!(
                    "{field} = {value:?} is not a valid XML name"
                )));
            }
        }
        if RESERVED_GROUP_ATTRIBUTES.contains(&self.group_attribute.as_str()) {
            return Err(TransformError::InvalidSheet(format!(
                "group_attribute = {:?} clashes with an attribute the transform writes",
                self.group_attribute
            )));
        }
        if self.indent > 16 {
            return Err(TransformError::InvalidSheet(format!(
                "indent = {} is larger than 16",
                self.indent
            )));
        }
        Ok(())
    }
}

/// `count` is written on every group; `xmlns` would rebind the output namespace
const RESERVED_GROUP_ATTRIBUTES: [&str; 2] = ["count", "xmlns"];

/// Unprefixed XML name: a letter or underscore followed by name characters
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sheet() {
        let sheet = TransformSheet::from_str(include_str!("../../tests/data/by_preciousness.toml")).unwrap();
        assert_eq!(sheet.root, "gemsByPreciousness");
        assert_eq!(sheet.group_element, "category");
        assert_eq!(sheet.group_by, "preciousness");
        assert_eq!(sheet.sort_by, Some(SortField::Value));
        assert_eq!(sheet.indent, 2);
        assert_eq!(sheet.group_attribute, "name");
        assert_eq!(sheet.namespace, GEMS_NAMESPACE);
    }

    #[test]
    fn test_empty_sheet_uses_defaults() {
        assert_eq!(TransformSheet::from_str("").unwrap(), TransformSheet::default());
    }

    #[test]
    fn test_rejects_bad_sheets() {
        assert!(matches!(
            TransformSheet::from_str("sort_by = \"colour\""),
            Err(TransformError::Sheet(_))
        ));
        assert!(matches!(
            TransformSheet::from_str("unknown_key = 1"),
            Err(TransformError::Sheet(_))
        ));
        assert!(matches!(
            TransformSheet::from_str("root = \"two words\""),
            Err(TransformError::InvalidSheet(_))
        ));
        assert!(matches!(
            TransformSheet::from_str("group_element = \"1st\""),
            Err(TransformError::InvalidSheet(_))
        ));
        assert!(matches!(
            TransformSheet::from_str("indent = 40"),
            Err(TransformError::InvalidSheet(_))
        ));
    }

    #[test]
    fn test_rejects_group_attributes_the_writer_owns() {
        for name in ["count", "xmlns", "xmlns:g"] {
            let sheet = format!("group_attribute = {name:?}");
            assert!(
                matches!(TransformSheet::from_str(&sheet), Err(TransformError::InvalidSheet(_))),
                "{name}"
            );
        }
        assert!(TransformSheet::from_str("group_attribute = \"total\"").is_ok());
    }

    #[test]
    fn test_xml_names() {
        assert!(is_xml_name("gemsByPreciousness"));
        assert!(is_xml_name("_x-1.2"));
        assert!(!is_xml_name(""));
        assert!(!is_xml_name("g:gem"));
        assert!(!is_xml_name("-gem"));
    }
}
