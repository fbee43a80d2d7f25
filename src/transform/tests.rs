use super::*;
use crate::parser::{GemParser, ParserConfig, TreeParser, GEMS_NAMESPACE};
use tempfile::tempdir;

const CATALOG_XML: &str = include_str!("../../tests/data/gems.xml");
const BY_PRECIOUSNESS: &str = include_str!("../../tests/data/by_preciousness.toml");

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn render(xml: &str, sheet: &TransformSheet) -> String {
    let mut out = Vec::new();
    transform_to_writer(xml, sheet, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn group_keys(output: &str, sheet: &TransformSheet) -> Vec<String> {
    let document = Document::parse(output).unwrap();
    document
        .root_element()
        .children()
        .filter(|n| n.is_element())
        .map(|n| n.attribute(sheet.group_attribute.as_str()).unwrap().to_string())
        .collect()
}

fn ids_in_group(output: &str, key: &str) -> Vec<String> {
    let document = Document::parse(output).unwrap();
    let group = document
        .root_element()
        .children()
        .find(|n| n.attribute("name") == Some(key))
        .unwrap();
    group
        .children()
        .filter(|n| n.is_element())
        .map(|n| n.attribute("id").unwrap().to_string())
        .collect()
}

#[test]
fn test_groups_in_first_seen_order_sorted_by_value() {
    let sheet = TransformSheet::from_str(BY_PRECIOUSNESS).unwrap();
    let output = render(CATALOG_XML, &sheet);

    assert_eq!(group_keys(&output, &sheet), ["precious", "semi-precious"]);
    assert_eq!(
        ids_in_group(&output, "precious"),
        ["gem002", "gem001", "gem003", "gem006"]
    );
    assert_eq!(
        ids_in_group(&output, "semi-precious"),
        ["gem007", "gem005", "gem004"]
    );

    let document = Document::parse(&output).unwrap();
    let root = document.root_element();
    assert!(root.has_tag_name((GEMS_NAMESPACE, "gemsByPreciousness")));
    let first = root.first_element_child().unwrap();
    assert_eq!(first.tag_name().name(), "category");
    assert_eq!(first.attribute("count"), Some("4"));
}

#[test]
fn test_unsorted_keeps_document_order() {
    let sheet = TransformSheet::default();
    let output = render(CATALOG_XML, &sheet);
    assert_eq!(
        ids_in_group(&output, "precious"),
        ["gem001", "gem002", "gem003", "gem006"]
    );
}

#[test]
fn test_sort_by_name_ignores_case() {
    let sheet = TransformSheet {
        sort_by: Some(SortField::Name),
        ..TransformSheet::default()
    };
    let output = render(CATALOG_XML, &sheet);
    // Diamond, emerald, Ruby, Sapphire
    assert_eq!(
        ids_in_group(&output, "precious"),
        ["gem001", "gem003", "gem002", "gem006"]
    );
}

#[test]
fn test_copied_gems_parse_back_identically() {
    let sheet = TransformSheet::from_str(BY_PRECIOUSNESS).unwrap();
    let output = render(CATALOG_XML, &sheet);

    let parser = TreeParser::new(ParserConfig::default());
    let mut original = parser.parse_str(CATALOG_XML).unwrap();
    let mut derived = parser.parse_str(&output).unwrap();
    original.sort_by(|a, b| a.id.cmp(&b.id));
    derived.sort_by(|a, b| a.id.cmp(&b.id));

    assert_eq!(original.len(), derived.len());
    for (a, b) in original.iter().zip(&derived) {
        assert!(a.same_content(b), "{a:?} != {b:?}");
    }
}

#[test]
fn test_compact_output_without_indent() {
    let sheet = TransformSheet {
        indent: 0,
        ..TransformSheet::default()
    };
    let output = render(CATALOG_XML, &sheet);
    assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert_eq!(output.lines().count(), 1);
}

#[test]
fn test_foreign_elements_keep_their_namespace() {
    let xml = r#"<gems xmlns="http://www.example.com/gems" xmlns:x="urn:extra">
        <gem id="a"><name>A &amp; B</name><preciousness>precious</preciousness>
            <x:note x:lang="en">kept</x:note><plain xmlns=""/></gem>
    </gems>"#;
    let output = render(xml, &TransformSheet::default());

    let document = Document::parse(&output).unwrap();
    let note = document
        .descendants()
        .find(|n| n.has_tag_name(("urn:extra", "note")))
        .unwrap();
    assert_eq!(note.text(), Some("kept"));
    assert_eq!(note.attribute(("urn:extra", "lang")), Some("en"));
    let plain = document.descendants().find(|n| n.has_tag_name("plain")).unwrap();
    assert_eq!(plain.tag_name().namespace(), None);
    let name = document
        .descendants()
        .find(|n| n.has_tag_name((GEMS_NAMESPACE, "name")))
        .unwrap();
    assert_eq!(name.text(), Some("A & B"));
}

#[test]
fn test_gem_without_group_key_lands_in_empty_group() {
    let xml = r#"<gems xmlns="http://www.example.com/gems"><gem id="x"><name>X</name></gem></gems>"#;
    let output = render(xml, &TransformSheet::default());
    assert_eq!(ids_in_group(&output, ""), ["x"]);
}

#[test]
fn test_empty_catalog_writes_empty_root() {
    let output = render(
        r#"<gems xmlns="http://www.example.com/gems"/>"#,
        &TransformSheet::default(),
    );
    let document = Document::parse(&output).unwrap();
    assert_eq!(document.root_element().tag_name().name(), "gemsByPreciousness");
    assert!(!document.root_element().has_children());
}

#[test]
fn test_transform_files() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("by_preciousness.xml");

    transform(&fixture("gems.xml"), &fixture("by_preciousness.toml"), &output).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(!written.is_empty());
    assert!(written.contains("<category name=\"precious\" count=\"4\">"));
    // nothing but the output left in the directory
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_transform_missing_inputs() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.xml");

    let err = transform(Path::new("nonexistent.xml"), &fixture("by_preciousness.toml"), &output).unwrap_err();
    assert!(matches!(err, TransformError::Read { .. }));

    let err = transform(&fixture("gems.xml"), Path::new("nonexistent.toml"), &output).unwrap_err();
    assert!(matches!(err, TransformError::Read { .. }));

    assert!(!output.exists());
}

#[test]
fn test_transform_invalid_output_path() {
    let err = transform(
        &fixture("gems.xml"),
        &fixture("by_preciousness.toml"),
        Path::new("/invalid/path/out.xml"),
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::Write { .. }));
}

#[test]
fn test_malformed_input_leaves_no_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.xml");
    let err = transform_to_file("<gems><gem></gems>", &TransformSheet::default(), &output).unwrap_err();
    assert!(matches!(err, TransformError::Document(_)));
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
