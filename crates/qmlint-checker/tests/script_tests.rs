//! Script-level checks: `with` statements, declaration order, interceptors
//! and value sources, reuse of attached objects.

use qmlint_checker::{AnalysisConfig, PassRegistry, lint_document};
use qmlint_common::{Category, Diagnostic, Level, apply_fixes, category};
use qmlint_resolver::ModuleCache;

fn lint_with(source: &str, config: &AnalysisConfig) -> Vec<Diagnostic> {
    let cache = ModuleCache::default();
    lint_document(source, None, &cache, &PassRegistry::builtin(), config)
}

fn lint(source: &str) -> Vec<Diagnostic> {
    lint_with(source, &AnalysisConfig::new())
}

fn of_category(diagnostics: &[Diagnostic], wanted: Category) -> Vec<&Diagnostic> {
    diagnostics.iter().filter(|d| d.category == wanted).collect()
}

fn messages(diagnostics: &[&Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(|d| d.message.clone()).collect()
}

// =============================================================================
// with statements
// =============================================================================

#[test]
fn test_with_statement_is_discouraged() {
    let source = r#"import QtQuick
Item {
    property var options: ({ size: 3 })
    function area() {
        with (options) {
            return size * size
        }
    }
}
"#;
    let diagnostics = lint(source);
    let with = of_category(&diagnostics, category::WITH);
    assert_eq!(
        messages(&with),
        vec![
            "with statements are strongly discouraged in QML and might cause false positives when analysing unqualified identifiers"
        ]
    );
    assert_eq!(with[0].location.line, 4);
    assert_eq!(with[0].location.column, 8);
    // names inside the body may be members of the object
    assert!(of_category(&diagnostics, category::UNQUALIFIED).is_empty());
}

#[test]
fn test_with_statement_can_be_disabled() {
    let source = "import QtQuick\nItem {\n    function f(o) { with (o) { return 1 } }\n}\n";
    let config = AnalysisConfig::new().with_level("with", Level::Disable);
    assert!(of_category(&lint_with(source, &config), category::WITH).is_empty());
}

// =============================================================================
// Declaration order
// =============================================================================

#[test]
fn test_variables_used_before_declaration() {
    let source = r#"import QtQuick
Item {
    function compute() {
        total = 4
        let total = 1
        var later = early + 1
        var early = 2
        helper()
        function helper() {}
        return total + later
    }
}
"#;
    let diagnostics = lint(source);
    let found = of_category(&diagnostics, category::VAR_USED_BEFORE_DECLARATION);
    assert_eq!(
        messages(&found),
        vec![
            "Variable \"total\" is used here before its declaration. The declaration is at 5:13.",
            "Variable \"early\" is used here before its declaration. The declaration is at 7:13.",
        ]
    );
    assert_eq!(found[0].notes.len(), 1);
    assert_eq!(found[0].notes[0].location.line, 4);
}

#[test]
fn test_parameters_and_later_reads_are_in_order() {
    let source = r#"import QtQuick
Item {
    function scale(factor) {
        const base = 2
        for (let i = 0; i < 3; ++i) {
            factor = factor * base + i
        }
        return factor
    }
}
"#;
    let diagnostics = lint(source);
    assert!(of_category(&diagnostics, category::VAR_USED_BEFORE_DECLARATION).is_empty());
}

// =============================================================================
// Interceptors and value sources
// =============================================================================

#[test]
fn test_duplicate_interceptors_and_value_sources() {
    let source = r#"import QtQuick
Item {
    width: 10
    Behavior on x { NumberAnimation {} }
    Behavior on x { NumberAnimation {} }
    NumberAnimation on y { to: 5 }
    NumberAnimation on y { to: 6 }
    NumberAnimation on width { to: 5 }
    Behavior on y { NumberAnimation {} }
}
"#;
    let diagnostics = lint(source);
    let found = of_category(&diagnostics, category::DUPLICATE_PROPERTY_BINDING);
    assert_eq!(
        messages(&found),
        vec![
            "Duplicate interceptor on property \"x\"",
            "Duplicate value source on property \"y\"",
            "Cannot combine value source and binding on property \"width\"",
        ]
    );
    assert_eq!(found[0].location.line, 4);
    assert_eq!(found[0].location.column, 4);
}

#[test]
fn test_on_binding_needs_an_interceptor_or_value_source() {
    let source = "import QtQuick\nItem {\n    Timer on height {}\n}\n";
    let diagnostics = lint(source);
    let found = of_category(&diagnostics, category::INCOMPATIBLE_TYPE);
    assert_eq!(
        messages(&found),
        vec!["On-binding for property \"height\" has wrong type \"Timer\""]
    );
}

#[test]
fn test_one_interceptor_and_one_value_source_per_property() {
    let source = r#"import QtQuick
Item {
    Behavior on x { NumberAnimation {} }
    NumberAnimation on x { to: 5 }
    Item {
        Behavior on x { NumberAnimation {} }
    }
}
"#;
    let diagnostics = lint(source);
    assert!(of_category(&diagnostics, category::DUPLICATE_PROPERTY_BINDING).is_empty());
}

// =============================================================================
// Attached property reuse
// =============================================================================

const ATTACHED_REUSE_SOURCE: &str = r#"import QtQuick
Item {
    id: root
    Keys.enabled: true
    focus: Keys.enabled
    Item {
        focus: Keys.enabled
    }
}
"#;

#[test]
fn test_attached_property_reuse_is_off_by_default() {
    let diagnostics = lint(ATTACHED_REUSE_SOURCE);
    assert!(of_category(&diagnostics, category::ATTACHED_PROPERTY_REUSE).is_empty());
}

#[test]
fn test_attached_property_reuse_suggests_the_id() {
    let config = AnalysisConfig::new().with_level("attached-property-reuse", Level::Warning);
    let diagnostics = lint_with(ATTACHED_REUSE_SOURCE, &config);
    let found = of_category(&diagnostics, category::ATTACHED_PROPERTY_REUSE);
    assert_eq!(
        messages(&found),
        vec!["Using attached type Keys already initialized in a parent scope."]
    );
    assert_eq!(found[0].location.line, 6);
    let fix = &found[0].fixes[0];
    assert_eq!(fix.label, "Reference it by id instead:");
    assert_eq!(fix.replacement, "root.");
    assert!(fix.auto_applicable);

    let (fixed, applied) = apply_fixes(ATTACHED_REUSE_SOURCE, &found[0].fixes);
    assert_eq!(applied, 1);
    assert!(fixed.contains("        focus: root.Keys.enabled\n"));
    let again = lint_with(&fixed, &config);
    assert!(of_category(&again, category::ATTACHED_PROPERTY_REUSE).is_empty());
    assert!(of_category(&again, category::MISSING_PROPERTY).is_empty());
}
