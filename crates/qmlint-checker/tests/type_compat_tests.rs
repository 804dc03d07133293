//! Bindings checked against their target properties: existence, writability,
//! literal and object types, default properties and colors.

use qmlint_checker::{AnalysisConfig, PassRegistry, is_valid_color, lint_document};
use qmlint_common::{Category, Diagnostic, Severity, category};
use qmlint_resolver::ModuleCache;

fn lint(source: &str) -> Vec<Diagnostic> {
    let cache = ModuleCache::default();
    lint_document(source, None, &cache, &PassRegistry::builtin(), &AnalysisConfig::new())
}

fn of_category(source: &str, wanted: Category) -> Vec<Diagnostic> {
    lint(source).into_iter().filter(|d| d.category == wanted).collect()
}

fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}

// =============================================================================
// Property existence and writability
// =============================================================================

#[test]
fn test_missing_property_suggests_closest_name() {
    let found = of_category("import QtQuick\nItem {\n    widh: 10\n}\n", category::MISSING_PROPERTY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Could not find property \"widh\".");
    assert_eq!(found[0].fixes[0].replacement, "width");
    assert!(!found[0].fixes[0].auto_applicable);
}

#[test]
fn test_declared_properties_can_be_bound() {
    let source = r#"import QtQuick
Item {
    property int count
    count: 3
    Item {
        property string label
        label: "ok"
    }
}
"#;
    let diagnostics = lint(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

#[test]
fn test_read_only_property() {
    let found = of_category(
        "import QtQuick\nItem {\n    activeFocus: true\n}\n",
        category::READ_ONLY_PROPERTY,
    );
    assert_eq!(messages(&found), vec!["Cannot assign to read-only property activeFocus"]);
}

#[test]
fn test_read_only_list_accepts_objects() {
    let source = "import QtQuick\nItem {\n    data: [Item {}, Item {}]\n}\n";
    assert!(of_category(source, category::READ_ONLY_PROPERTY).is_empty());
}

// =============================================================================
// Literals
// =============================================================================

#[test]
fn test_literal_of_wrong_type() {
    let source = r#"import QtQuick
Item {
    property int count: "many"
    property int half: 1.5
    visible: 3
}
"#;
    let found = of_category(source, category::INCOMPATIBLE_TYPE);
    assert_eq!(
        messages(&found),
        vec![
            "Cannot assign literal of type string to int",
            "Cannot assign literal of type double to int",
            "Cannot assign literal of type double to bool",
        ]
    );
}

#[test]
fn test_numeric_string_is_converted() {
    let source = "import QtQuick\nItem {\n    property int count: \"5\"\n}\n";
    let diagnostics = lint(source);
    assert_eq!(diagnostics.len(), 1, "{:?}", messages(&diagnostics));
    assert_eq!(diagnostics[0].category, category::LITERAL_CONVERSION);
    assert_eq!(diagnostics[0].message, "Implicit conversion of string literal to int");
    assert_eq!(diagnostics[0].severity, Severity::Info);
}

#[test]
fn test_compatible_literals() {
    let source = r#"import QtQuick
Item {
    property real ratio: 2
    property string name: "x"
    property url source: "file.png"
    property var anything: true
    property Item other: null
    width: 1.5
    visible: false
}
"#;
    let diagnostics = lint(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

#[test]
fn test_array_elements_are_checked_against_the_list_type() {
    let source = r#"import QtQuick
Item {
    property list<Item> items: [1, null]
    property list<int> counts: [1, 2.5, "3", other]
    property list<int> single: "many"
    property int other: 0
}
"#;
    let found = of_category(source, category::INCOMPATIBLE_TYPE);
    assert_eq!(
        messages(&found),
        vec![
            "Cannot assign literal of type double to Item",
            "Cannot assign literal of type double to int",
            "Cannot assign literal of type string to int",
        ]
    );
    // Each diagnostic points at its element.
    assert_eq!(found[0].span.slice(source), "1");
    assert_eq!(found[1].span.slice(source), "2.5");

    let converted = of_category(source, category::LITERAL_CONVERSION);
    assert_eq!(messages(&converted), vec!["Implicit conversion of string literal to int"]);
}

#[test]
fn test_compatible_array_elements() {
    let source = r#"import QtQuick
Item {
    property list<int> counts: [1, 2, 3]
    property list<string> names: ["a", "b"]
    property var mixed: [1, "a", true]
}
"#;
    let diagnostics = lint(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn test_object_of_wrong_type() {
    let source = "import QtQuick\nItem {\n    property Rectangle frame: Item {}\n}\n";
    let found = of_category(source, category::INCOMPATIBLE_TYPE);
    assert_eq!(messages(&found), vec!["Cannot assign object of type Item to Rectangle"]);
}

#[test]
fn test_derived_object_is_accepted() {
    let source = "import QtQuick\nItem {\n    property Item frame: Rectangle {}\n}\n";
    assert!(of_category(source, category::INCOMPATIBLE_TYPE).is_empty());
}

#[test]
fn test_multiple_objects_on_non_list_property() {
    let source = "import QtQuick\nItem {\n    property Item frame: [Item {}, Item {}]\n}\n";
    let found = of_category(source, category::NON_LIST_PROPERTY);
    assert_eq!(
        messages(&found),
        vec!["Cannot assign multiple objects to non-list property \"frame\""]
    );
}

// =============================================================================
// Default properties
// =============================================================================

#[test]
fn test_non_existent_default_property() {
    let source = "import QtQuick\nItem {\n    Timer {\n        Item {}\n    }\n}\n";
    let found = of_category(source, category::MISSING_PROPERTY);
    assert_eq!(messages(&found), vec!["Cannot assign to non-existent default property"]);
}

#[test]
fn test_multiple_objects_on_default_non_list_property() {
    let source = "import QtQuick\nRepeater {\n    Item {}\n    Item {}\n}\n";
    let found = of_category(source, category::NON_LIST_PROPERTY);
    assert_eq!(
        messages(&found),
        vec!["Cannot assign multiple objects to a default non-list property"]
    );
}

#[test]
fn test_default_property_of_incompatible_type() {
    let source = "import QtQuick\nItem {\n    Gradient {\n        Item {}\n    }\n}\n";
    let found = of_category(source, category::INCOMPATIBLE_TYPE);
    assert_eq!(messages(&found), vec!["Cannot assign to default property of incompatible type"]);
}

#[test]
fn test_custom_parser_children_are_not_checked() {
    let source = "import QtQuick\nListModel {\n    ListElement { name: \"a\" }\n    ListElement { name: \"b\" }\n}\n";
    let diagnostics = lint(source);
    assert!(diagnostics.is_empty(), "{:?}", messages(&diagnostics));
}

// =============================================================================
// Colors
// =============================================================================

#[test]
fn test_invalid_color_suggests_closest_name() {
    let source = "import QtQuick\nItem {\n    property color myColor: \"lbue\"\n}\n";
    let diagnostics = lint(source);
    assert_eq!(diagnostics.len(), 1, "{:?}", messages(&diagnostics));
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.category, category::COLOR);
    assert_eq!(diagnostic.message, "Invalid color \"lbue\"");
    assert_eq!(diagnostic.location.line, 2);
    assert_eq!(diagnostic.location.column, 28);

    let fix = &diagnostic.fixes[0];
    assert_eq!(fix.replacement, "blue");
    assert_eq!(&source[fix.span.start as usize..fix.span.end as usize], "lbue");
}

#[test]
fn test_valid_colors() {
    for color in ["red", "Transparent", "#fff", "#80ff0000", "#123456"] {
        assert!(is_valid_color(color), "{color}");
    }
    for color in ["#ff00", "#ggg", "reed", ""] {
        assert!(!is_valid_color(color), "{color}");
    }
    let source = "import QtQuick\nRectangle {\n    color: \"#ff00\"\n}\n";
    assert_eq!(
        messages(&of_category(source, category::COLOR)),
        vec!["Invalid color \"#ff00\""]
    );
}
