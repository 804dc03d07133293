//! Alias properties: cycles, unresolved targets and invalid expressions.

use qmlint_checker::{AnalysisConfig, PassRegistry, lint_document};
use qmlint_common::{Category, Diagnostic, category};
use qmlint_resolver::ModuleCache;

fn lint(source: &str) -> Vec<Diagnostic> {
    let cache = ModuleCache::default();
    lint_document(source, None, &cache, &PassRegistry::builtin(), &AnalysisConfig::new())
}

fn messages_of(source: &str, wanted: Category) -> Vec<String> {
    lint(source)
        .into_iter()
        .filter(|d| d.category == wanted)
        .map(|d| d.message)
        .collect()
}

#[test]
fn test_aliases_resolving_to_properties() {
    let source = r#"import QtQuick
Item {
    id: root
    property alias label: caption.text
    property alias box: caption
    property alias same: root.label
    Text { id: caption }
}
"#;
    let diagnostics = lint(source);
    assert!(
        diagnostics.is_empty(),
        "{:?}",
        diagnostics.iter().map(|d| &d.message).collect::<Vec<_>>()
    );
}

#[test]
fn test_sibling_aliases_form_one_cycle() {
    let source = r#"import QtQuick
Item {
    id: root
    property alias a: root.b
    property alias b: root.a
}
"#;
    assert_eq!(
        messages_of(source, category::ALIAS_CYCLE),
        vec![
            "Alias \"a\" is part of an alias cycle: a -> b -> a",
            "Alias \"b\" is part of an alias cycle: b -> a -> b",
        ]
    );
    assert!(messages_of(source, category::UNRESOLVED_ALIAS).is_empty());
}

#[test]
fn test_alias_leading_into_cycle_is_unresolved() {
    let source = r#"import QtQuick
Item {
    id: root
    property alias entry: root.a
    property alias a: root.b
    property alias b: root.a
}
"#;
    assert_eq!(messages_of(source, category::ALIAS_CYCLE).len(), 2);
    assert_eq!(
        messages_of(source, category::UNRESOLVED_ALIAS),
        vec!["Cannot resolve alias \"entry\""]
    );
}

#[test]
fn test_self_alias_is_a_cycle() {
    let source = "import QtQuick\nItem {\n    id: root\n    property alias me: root.me\n}\n";
    assert_eq!(
        messages_of(source, category::ALIAS_CYCLE),
        vec!["Alias \"me\" is part of an alias cycle: me -> me"]
    );
}

#[test]
fn test_unknown_id_and_member() {
    let source = r#"import QtQuick
Item {
    property alias ghost: nobody.text
    property alias typo: caption.txet
    Text { id: caption }
}
"#;
    assert_eq!(
        messages_of(source, category::UNRESOLVED_ALIAS),
        vec!["Cannot resolve alias \"ghost\"", "Cannot resolve alias \"typo\""]
    );
}

#[test]
fn test_alias_through_unresolved_alias_is_unresolved() {
    let source = r#"import QtQuick
Item {
    id: root
    property alias outer: root.inner
    property alias inner: nobody.text
}
"#;
    assert_eq!(
        messages_of(source, category::UNRESOLVED_ALIAS),
        vec!["Cannot resolve alias \"outer\"", "Cannot resolve alias \"inner\""]
    );
}

#[test]
fn test_invalid_alias_expression() {
    let source = "import QtQuick\nItem {\n    property alias sum: 1 + 2\n}\n";
    assert_eq!(
        messages_of(source, category::SYNTAX),
        vec!["Invalid alias expression. Only IDs and field member expressions can be aliased."]
    );
}
