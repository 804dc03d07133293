//! Member chains, enum access and namespaces read from JavaScript.

use qmlint_checker::{AnalysisConfig, PassRegistry, lint_document};
use qmlint_common::{Category, Diagnostic, category};
use qmlint_resolver::ModuleCache;

fn lint(source: &str) -> Vec<Diagnostic> {
    let cache = ModuleCache::default();
    lint_document(source, None, &cache, &PassRegistry::builtin(), &AnalysisConfig::new())
}

fn of_category(source: &str, wanted: Category) -> Vec<Diagnostic> {
    lint(source).into_iter().filter(|d| d.category == wanted).collect()
}

// =============================================================================
// Objects reached through ids
// =============================================================================

#[test]
fn test_missing_member_on_id() {
    let source = r#"import QtQuick
Item {
    id: root
    width: root.wdth
}
"#;
    let found = of_category(source, category::MISSING_PROPERTY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Member \"wdth\" not found on type \"Item\"");
    assert_eq!(found[0].location.line, 3);
}

#[test]
fn test_declared_members_are_found() {
    let source = r#"import QtQuick
Item {
    id: root
    property int count: 0
    signal activated()
    function reset() {}
    Item {
        width: root.count
        Component.onCompleted: {
            root.reset()
            root.activated()
            root.countChanged()
        }
    }
}
"#;
    assert!(of_category(source, category::MISSING_PROPERTY).is_empty());
}

#[test]
fn test_chain_follows_property_types() {
    let source = r#"import QtQuick
Item {
    id: root
    Item {
        id: child
        width: child.parent.missingThing
    }
}
"#;
    let found = of_category(source, category::MISSING_PROPERTY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Member \"missingThing\" not found on type \"Item\"");
}

#[test]
fn test_members_of_value_types_are_not_checked() {
    let source = r#"import QtQuick
Item {
    id: root
    width: root.width.anything
}
"#;
    assert!(of_category(source, category::MISSING_PROPERTY).is_empty());
}

#[test]
fn test_members_of_var_properties_are_not_checked() {
    let source = r#"import QtQuick
Item {
    id: root
    property var bag
    width: root.bag.anything
}
"#;
    assert!(of_category(source, category::MISSING_PROPERTY).is_empty());
}

// =============================================================================
// Types, enums and singletons
// =============================================================================

#[test]
fn test_enum_key_through_type_is_accepted() {
    let source = "import QtQuick\nItem {\n    transformOrigin: Item.TopLeft\n}\n";
    let diagnostics = lint(source);
    assert!(
        diagnostics
            .iter()
            .all(|d| d.category != category::MISSING_ENUM_ENTRY && d.category != category::MISSING_PROPERTY)
    );
}

#[test]
fn test_missing_enum_entry_suggests_key() {
    let source = "import QtQuick\nItem {\n    transformOrigin: Item.TransformOrigin.TopLef\n}\n";
    let found = of_category(source, category::MISSING_ENUM_ENTRY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "\"TopLef\" is not an entry of enum \"TransformOrigin\".");
    assert_eq!(found[0].fixes[0].replacement, "TopLeft");
}

#[test]
fn test_unscoped_enum_through_enum_name_is_reported() {
    let source = "import QtQuick\nItem {\n    transformOrigin: Item.TransformOrigin.Center\n}\n";
    let found = of_category(source, category::MISSING_ENUM_ENTRY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "You cannot access unscoped enum \"TransformOrigin\" from here.");
}

#[test]
fn test_missing_member_on_type() {
    let source = "import QtQuick\nItem {\n    transformOrigin: Item.Nowhere\n}\n";
    let found = of_category(source, category::MISSING_PROPERTY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Member \"Nowhere\" not found on type \"Item\"");
}

#[test]
fn test_singleton_members() {
    let ok = "import QtQuick\nRectangle {\n    color: Qt.rgba(1, 0, 0, 1)\n    width: Qt.AlignLeft\n}\n";
    assert!(of_category(ok, category::MISSING_PROPERTY).is_empty());

    let typo = "import QtQuick\nRectangle {\n    color: Qt.rbga(1, 0, 0, 1)\n}\n";
    let found = of_category(typo, category::MISSING_PROPERTY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Member \"rbga\" not found on type \"Qt\"");
}

#[test]
fn test_attached_members_through_type() {
    let source = r#"import QtQuick
ListView {
    model: 3
    delegate: Item {
        width: ListView.view.width
        height: ListView.view.heigth
    }
}
"#;
    let found = of_category(source, category::MISSING_PROPERTY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Member \"heigth\" not found on type \"ListView\"");
}

// =============================================================================
// Namespaces
// =============================================================================

#[test]
fn test_type_missing_from_namespace() {
    let source = r#"import QtQuick as Q
Q.Item {
    property var kind: Q.Itm
}
"#;
    let found = of_category(source, category::MISSING_PROPERTY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Type not found in namespace");
}

#[test]
fn test_namespaced_enum_access() {
    let source = r#"import QtQuick as Q
Q.Item {
    transformOrigin: Q.Item.TopLeft
    width: Q.Item.Missing
}
"#;
    let found = of_category(source, category::MISSING_PROPERTY);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Member \"Missing\" not found on type \"Item\"");
}
