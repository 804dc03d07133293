//! Import usage and type visibility.

use qmlint_checker::{AnalysisConfig, PassRegistry, lint_document};
use qmlint_common::{Category, Diagnostic, Severity, category};
use qmlint_resolver::{ModuleCache, ResolverOptions, SearchEntry};
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write fixture");
}

fn lint_with(cache: &ModuleCache, source: &str) -> Vec<Diagnostic> {
    lint_document(source, None, cache, &PassRegistry::builtin(), &AnalysisConfig::new())
}

fn of_category(diagnostics: &[Diagnostic], wanted: Category) -> Vec<&Diagnostic> {
    diagnostics.iter().filter(|d| d.category == wanted).collect()
}

/// A module whose only type is an uncreatable attaching type.
fn attach_module(dir: &Path) -> ModuleCache {
    write(dir, "Attach/qmldir", "module Attach\ntypeinfo attach.qmltypes\n");
    write(
        dir,
        "Attach/attach.qmltypes",
        r#"import QtQuick.tooling 1.2
Module {
    Component {
        name: "Marker"
        prototype: "QObject"
        exports: ["Attach/Marker 1.0"]
        isCreatable: false
        attachedType: "MarkerAttached"
    }
    Component {
        name: "MarkerAttached"
        prototype: "QObject"
        isCreatable: false
        Property { name: "active"; type: "bool" }
    }
}
"#,
    );
    ModuleCache::new(ResolverOptions {
        search_path: vec![SearchEntry::directory(dir)],
        ..ResolverOptions::default()
    })
}

// =============================================================================
// Unused imports
// =============================================================================

#[test]
fn test_import_used_only_through_attached_property() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = attach_module(dir.path());
    let source = "import QtQuick\nimport Attach\nItem {\n    Marker.active: true\n}\n";
    let diagnostics = lint_with(&cache, source);
    assert!(
        diagnostics.is_empty(),
        "{:?}",
        diagnostics.iter().map(|d| &d.message).collect::<Vec<_>>()
    );
}

#[test]
fn test_unused_module_import_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = attach_module(dir.path());
    let diagnostics = lint_with(&cache, "import QtQuick\nimport Attach\nItem {}\n");
    let unused = of_category(&diagnostics, category::UNUSED_IMPORTS);
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].message, "Unused import");
    assert_eq!(unused[0].location.line, 1);
    assert_eq!(unused[0].severity, Severity::Info);
}

#[test]
fn test_unused_namespace_import_is_reported() {
    let cache = ModuleCache::default();
    let diagnostics = lint_with(&cache, "import QtQuick as Q\nQtObject {}\n");
    let unused = of_category(&diagnostics, category::UNUSED_IMPORTS);
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].location.line, 0);

    let diagnostics = lint_with(&cache, "import QtQuick as Q\nQ.Item {}\n");
    assert!(of_category(&diagnostics, category::UNUSED_IMPORTS).is_empty());
}

#[test]
fn test_import_used_in_script_is_not_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache = attach_module(dir.path());
    let source = "import QtQuick\nimport Attach\nItem {\n    visible: Marker.active\n}\n";
    let diagnostics = lint_with(&cache, source);
    assert!(of_category(&diagnostics, category::UNUSED_IMPORTS).is_empty());
}

#[test]
fn test_implicit_imports_are_never_reported() {
    let cache = ModuleCache::default();
    let diagnostics = lint_with(&cache, "QtObject {}\n");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_failed_import_is_not_reported_as_unused() {
    let cache = ModuleCache::default();
    let diagnostics = lint_with(&cache, "import QtQuick\nimport Does.Not.Exist\nItem {}\n");
    assert!(of_category(&diagnostics, category::UNUSED_IMPORTS).is_empty());
    assert_eq!(of_category(&diagnostics, category::IMPORT).len(), 1);
}

// =============================================================================
// Visibility
// =============================================================================

#[test]
fn test_type_of_dependency_is_not_visible() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "Outer/qmldir", "module Outer\ndepends Inner\nFront 1.0 Front.qml\n");
    write(dir.path(), "Outer/Front.qml", "QtObject {}\n");
    write(dir.path(), "Inner/qmldir", "module Inner\nSecret 1.0 Secret.qml\n");
    write(dir.path(), "Inner/Secret.qml", "QtObject {}\n");
    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![SearchEntry::directory(dir.path())],
        ..ResolverOptions::default()
    });

    let diagnostics = lint_with(&cache, "import Outer\nSecret {}\n");
    let invisible = of_category(&diagnostics, category::INVISIBLE_TYPE);
    assert_eq!(invisible.len(), 1);
    assert_eq!(invisible[0].message, "Type \"Secret\" is not visible from this document");

    let diagnostics = lint_with(&cache, "import Outer\nFront {}\n");
    assert!(of_category(&diagnostics, category::INVISIBLE_TYPE).is_empty());
}
