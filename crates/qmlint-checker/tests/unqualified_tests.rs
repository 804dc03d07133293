//! Unqualified access to names of enclosing objects and components.

use qmlint_checker::{AnalysisConfig, PassRegistry, lint_document};
use qmlint_common::{Diagnostic, apply_fixes, category};
use qmlint_resolver::ModuleCache;

fn lint(source: &str) -> Vec<Diagnostic> {
    let cache = ModuleCache::default();
    lint_document(source, None, &cache, &PassRegistry::builtin(), &AnalysisConfig::new())
}

fn unqualified(source: &str) -> Vec<Diagnostic> {
    lint(source)
        .into_iter()
        .filter(|d| d.category == category::UNQUALIFIED)
        .collect()
}

// =============================================================================
// Members of enclosing objects
// =============================================================================

#[test]
fn test_parent_member_suggests_id_qualification() {
    let source = r#"import QtQuick
Item {
    id: root
    property int spacing: 4
    Item {
        width: spacing
    }
}
"#;
    let found = unqualified(source);
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].message,
        "spacing is a member of a parent element. You can qualify the access with its id to avoid this warning."
    );
    let fix = &found[0].fixes[0];
    assert!(fix.auto_applicable);
    assert_eq!(fix.replacement, "root.");

    let (fixed, applied) = apply_fixes(source, &found[0].fixes);
    assert_eq!(applied, 1);
    assert!(fixed.contains("width: root.spacing"));
    assert!(unqualified(&fixed).is_empty());
}

#[test]
fn test_parent_member_without_id_has_no_fix() {
    let source = r#"import QtQuick
Item {
    property int spacing: 4
    Item {
        width: spacing
    }
}
"#;
    let found = unqualified(source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Unqualified access");
    assert!(found[0].fixes.is_empty());
}

#[test]
fn test_own_members_and_locals_are_not_reported() {
    let source = r#"import QtQuick
Item {
    property int spacing: 4
    width: spacing * 2
    function area() {
        let side = width
        return side * height
    }
}
"#;
    assert!(unqualified(source).is_empty());
}

#[test]
fn test_ids_of_the_same_component_are_not_reported() {
    let source = r#"import QtQuick
Item {
    Item {
        id: other
    }
    width: other.width
}
"#;
    assert!(unqualified(source).is_empty());
}

#[test]
fn test_globals_and_types_are_not_reported() {
    let source = r#"import QtQuick
Item {
    width: Math.max(1, 2)
    height: Qt.AlignLeft
    Component.onCompleted: console.log(JSON.stringify({}))
}
"#;
    assert!(unqualified(source).is_empty());
}

// =============================================================================
// Unknown names
// =============================================================================

#[test]
fn test_unknown_name_is_reported() {
    let found = unqualified("import QtQuick\nItem {\n    width: nowhereToBeFound\n}\n");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Unqualified access");
}

#[test]
fn test_unknown_name_suggests_close_member() {
    let found = unqualified("import QtQuick\nItem {\n    width: heigth\n}\n");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].fixes.len(), 1);
    assert_eq!(found[0].fixes[0].replacement, "height");
    assert!(!found[0].fixes[0].auto_applicable);
}

#[test]
fn test_unknown_name_under_custom_parser_is_not_reported() {
    let source = r#"import QtQuick
ListModel {
    ListElement { name: anything }
}
"#;
    assert!(unqualified(source).is_empty());
}

// =============================================================================
// Outer components and delegates
// =============================================================================

#[test]
fn test_outer_component_id_suggests_bound_pragma() {
    let source = r#"import QtQuick
Item {
    id: root
    ListView {
        model: 3
        delegate: Text { text: root.objectName }
    }
}
"#;
    let found = unqualified(source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Unqualified access");
    let fix = &found[0].fixes[0];
    assert!(fix.auto_applicable);
    assert_eq!(fix.span.start, 0);
    assert_eq!(fix.replacement, "pragma ComponentBehavior: Bound\n");
}

#[test]
fn test_bound_pragma_fix_is_inserted_once() {
    let source = r#"import QtQuick
Item {
    id: root
    ListView {
        model: 3
        delegate: Text { text: root.objectName; width: root.width }
    }
}
"#;
    let found = unqualified(source);
    assert_eq!(found.len(), 2);
    let (fixed, applied) = apply_fixes(source, found.iter().flat_map(|d| &d.fixes));
    assert_eq!(applied, 1);
    assert!(fixed.starts_with("pragma ComponentBehavior: Bound\nimport QtQuick\n"));
    assert_eq!(fixed.matches("pragma ComponentBehavior").count(), 1);
    assert!(unqualified(&fixed).is_empty());
}

#[test]
fn test_bound_components_may_use_outer_ids() {
    let source = r#"pragma ComponentBehavior: Bound
import QtQuick
Item {
    id: root
    ListView {
        model: 3
        delegate: Text { text: root.objectName }
    }
}
"#;
    assert!(unqualified(source).is_empty());
}

#[test]
fn test_injected_delegate_names_are_reported() {
    let source = r#"import QtQuick
ListView {
    model: 3
    delegate: Text { text: modelData }
}
"#;
    let found = unqualified(source);
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].message,
        "modelData is implicitly injected into this delegate. Add a required property instead."
    );
}

#[test]
fn test_required_property_replaces_injection() {
    let source = r#"import QtQuick
ListView {
    model: 3
    delegate: Text {
        required property string modelData
        text: modelData
    }
}
"#;
    assert!(unqualified(source).is_empty());
}
