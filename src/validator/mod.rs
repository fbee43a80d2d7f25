//! # Gem Catalog Validation Module
//!
//! Checks a catalog document against its XML schema before it is handed to
//! the parsers. Parsers assume a valid document; validation is how a caller
//! earns that assumption.
//!
//! ## Validation Checklist
//!
//! 1. **Schema**: the schema is readable, is an XSD, and declares a target namespace
//! 2. **Well-formedness**: the document parses as XML
//! 3. **Root element**: the root is declared by the schema in its target namespace
//! 4. **Content model**: required children, occurrence bounds, order, attributes
//! 5. **Enumerations**: values drawn from the schema's enumeration facets
//! 6. **Numeric values**: `xs:decimal` / `xs:integer` lexical forms and inclusive bounds
//! 7. **Unique ids**: no two `xs:ID` attributes share a value
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gemxml::validator::validate_catalog;
//! use std::path::Path;
//!
//! let report = validate_catalog(Path::new("gems.xml"), Path::new("gems.xsd"))?;
//! println!("{}", report);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{error, info};

pub use report::{CheckStatus, ValidationCheck, ValidationReport};

mod document;
mod report;
mod schema;

/// Validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A document or schema file could not be read
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        /// The file that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The schema is malformed or uses constructs outside the supported subset
    #[error("Schema error: {0}")]
    Schema(String),
}

/// Run every check and collect the results
///
/// Unreadable files are errors; everything wrong with their content is a
/// failed check in the returned report.
pub fn validate_catalog(xml_path: &Path, schema_path: &Path) -> Result<ValidationReport> {
    let mut report = ValidationReport::new(xml_path.display().to_string(), schema_path.display().to_string());

    // 1. Schema
    let Some(schema) = schema::check_schema(schema_path, &mut report)? else {
        return Ok(report);
    };

    // 2-7. Document against schema
    document::check_document(xml_path, &schema, &mut report)?;

    info!(
        "Validated {}: {} passed, {} warnings, {} failed",
        xml_path.display(),
        report.success_count(),
        report.warning_count(),
        report.failure_count()
    );
    Ok(report)
}

/// True only when the document passes every check
///
/// Never panics and never returns an error: read failures and schema
/// problems are logged and yield `false`.
pub fn validate(xml_path: &Path, schema_path: &Path) -> bool {
    match validate_catalog(xml_path, schema_path) {
        Ok(report) => report.passed(),
        Err(e) => {
            error!("Validation of {} aborted: {:#}", xml_path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
    }

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validation_report_display() {
        let mut report = ValidationReport::new("test.xml", "test.xsd");
        report.add_check(ValidationCheck::ok("Schema loaded"));
        report.add_check(ValidationCheck::warning("Target namespace", "schema has no targetNamespace"));
        report.add_check(ValidationCheck::failed("Root element", "<note> is not declared"));

        let output = report.to_string();
        assert!(output.starts_with("Validating test.xml against test.xsd\n"), "{output}");
        assert!(output.contains("  ok    Schema loaded\n"), "{output}");
        assert!(output.contains("  warn  Target namespace: schema has no targetNamespace\n"), "{output}");
        assert!(output.contains("  FAIL  Root element: <note> is not declared\n"), "{output}");
        assert!(output.ends_with("3 checks: 1 ok, 1 warning(s), 1 failed; catalog is invalid\n"), "{output}");
    }

    #[test]
    fn test_problem_lists_are_truncated() {
        let problems: Vec<String> = (1..=25).map(|i| format!("problem {i}")).collect();
        let check = ValidationCheck::from_problems("Many", &problems);
        assert_eq!(
            check.status,
            CheckStatus::Failed("problem 1; problem 2; problem 3; and 22 more".to_string())
        );
        assert_eq!(check.problems.len(), 25);
        assert_eq!(ValidationCheck::from_problems("None", &[]).status, CheckStatus::Ok);

        let mut report = ValidationReport::new("gems.xml", "gems.xsd");
        report.add_check(check);
        let output = report.to_string();
        assert!(output.contains("  FAIL  Many (25 problems)\n"), "{output}");
        assert!(output.contains("          - problem 20\n"));
        assert!(!output.contains("- problem 21\n"));
        assert!(output.contains("          ... 5 more\n"));
    }

    #[test]
    fn test_fixture_catalog_is_valid() {
        let report = validate_catalog(&fixture("gems.xml"), &fixture("gems.xsd")).unwrap();
        assert!(report.passed(), "{report}");
        assert!(!report.has_warnings());
        assert_eq!(report.success_count(), 8);
        assert!(validate(&fixture("gems.xml"), &fixture("gems.xsd")));
    }

    #[test]
    fn test_invalid_catalog_fails() {
        let xml = std::fs::read_to_string(fixture("gems.xml")).unwrap();
        let broken = temp_file(&xml.replacen("<g:color>purple</g:color>", "<g:color>violet</g:color>", 1));

        let report = validate_catalog(broken.path(), &fixture("gems.xsd")).unwrap();
        assert!(!report.passed());
        assert_eq!(report.failure_count(), 1);
        assert!(!validate(broken.path(), &fixture("gems.xsd")));
    }

    #[test]
    fn test_missing_files_are_errors() {
        let missing = Path::new("/nonexistent/gems.xml");
        let err = validate_catalog(missing, &fixture("gems.xsd")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/gems.xml"));
        assert!(!validate(missing, &fixture("gems.xsd")));

        assert!(validate_catalog(&fixture("gems.xml"), Path::new("/nonexistent/gems.xsd")).is_err());
        assert!(!validate(&fixture("gems.xml"), Path::new("/nonexistent/gems.xsd")));
    }

    #[test]
    fn test_unusable_schema_stops_early() {
        let schema = temp_file("<not-a-schema/>");
        let report = validate_catalog(&fixture("gems.xml"), schema.path()).unwrap();
        assert!(!report.passed());
        assert_eq!(report.checks.len(), 1);
        assert!(!validate(&fixture("gems.xml"), schema.path()));
    }

    #[test]
    fn test_schema_without_target_namespace_warns() {
        let schema = temp_file(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="note" type="xs:string"/>
               </xs:schema>"#,
        );
        let xml = temp_file("<note>hello</note>");
        let report = validate_catalog(xml.path(), schema.path()).unwrap();
        assert!(report.passed(), "{report}");
        assert!(report.has_warnings());
    }
}
