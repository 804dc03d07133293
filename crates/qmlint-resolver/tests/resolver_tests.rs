//! Import resolution and type registry tests over built-in and on-disk
//! modules.

use crate::cache::{ModuleCache, ResolverOptions};
use crate::import_scope::ImportScope;
use crate::registry::SignalRef;
use crate::search_path::{ResourceOverlay, SearchEntry};
use qmlint_common::Severity;
use qmlint_parser::parse_document;
use std::fs;
use std::path::Path;

fn import(cache: &ModuleCache, source: &str, path: Option<&Path>) -> ImportScope {
    let doc = parse_document(source).expect("document should parse");
    cache.import_document(&doc, path)
}

fn messages(scope: &ImportScope) -> Vec<&str> {
    scope.diagnostics.iter().map(|d| d.message.as_str()).collect()
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write fixture");
}

// =============================================================================
// Built-in modules
// =============================================================================

#[test]
fn test_implicit_imports_provide_value_types_and_qtqml() {
    let cache = ModuleCache::default();
    let scope = import(&cache, "QtObject {}\n", None);
    assert!(scope.diagnostics.is_empty(), "{:?}", messages(&scope));
    assert!(scope.lookup_type("int").is_some());
    assert!(scope.lookup_type("real").is_some());
    assert!(scope.lookup_type("QtObject").is_some());
    assert!(scope.lookup_type("Item").is_none());
    assert!(scope.imports.iter().all(|i| i.implicit));
}

#[test]
fn test_qtquick_import_resolves_and_reexports_qtqml() {
    let cache = ModuleCache::new(ResolverOptions {
        bare: true,
        ..ResolverOptions::default()
    });
    // bare: QtQuick itself is not found
    let scope = import(&cache, "import QtQuick\nItem {}\n", None);
    assert_eq!(
        messages(&scope),
        vec!["Failed to import QtQuick. Are your import paths set up properly? Did you build your project?"]
    );
    assert!(scope.imports[1].failed);

    let cache = ModuleCache::default();
    let scope = import(&cache, "import QtQuick 2.15\nItem {}\n", None);
    assert!(scope.diagnostics.is_empty(), "{:?}", messages(&scope));
    let item = scope.lookup_type("Item").expect("Item exported by QtQuick");
    assert_eq!(scope.imports[item.import].display, "QtQuick 2.15");
    assert!(scope.lookup_type("Timer").is_some());
}

#[test]
fn test_qualified_import_and_lowercase_qualifier() {
    let cache = ModuleCache::default();
    let scope = import(&cache, "import QtQuick as test\ntest.Item {}\n", None);
    assert_eq!(
        messages(&scope),
        vec!["Import qualifier 'test' must start with a capital letter."]
    );
    assert!(scope.lookup_qualified("test", "Item").is_some());
    assert!(scope.lookup_dotted("test.Item").is_some());
    assert!(scope.lookup_type("Item").is_none());
}

#[test]
fn test_registry_members_through_base_chain() {
    let cache = ModuleCache::default();
    let scope = import(&cache, "import QtQuick\nItem {}\n", None);
    let registry = cache.registry();
    let rect = scope.lookup_type("Rectangle").expect("Rectangle").id;
    let item = scope.lookup_type("Item").expect("Item").id;
    assert!(registry.inherits(rect, item));
    assert!(!registry.inherits(item, rect));

    let (owner, width) = registry.find_property(rect, "width").expect("width");
    assert_eq!(owner, item);
    assert_eq!(width.type_name, "double");
    assert_eq!(registry.property_type(width).map(|t| registry.name(t)), Some("double"));

    let (_, data) = registry.default_property(rect).expect("default property");
    assert_eq!(data.name, "data");
    assert!(data.is_list);

    assert!(matches!(
        registry.find_signal(rect, "widthChanged"),
        Some(SignalRef::PropertyChange(_))
    ));
    assert!(registry.find_signal(rect, "bogusChanged").is_none());

    let list_view = scope.lookup_type("ListView").expect("ListView").id;
    let attached = registry.attached_type(list_view).expect("attached type");
    assert!(registry.find_property(attached, "isCurrentItem").is_some());
    assert!(registry.find_enum_key(list_view, "Horizontal").is_some());
    assert!(registry.find_enum(list_view, "PositionMode").is_some());

    let var = scope.lookup_type("var").expect("var").id;
    assert!(registry.can_assign(var, rect));
    assert!(registry.can_assign(item, rect));
    assert!(!registry.can_assign(rect, item));
}

// =============================================================================
// On-disk modules
// =============================================================================

#[test]
fn test_directory_composites_are_resolved() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "Card.qml",
        r#"import QtQuick
Rectangle {
    property int count
    property alias label: inner.text
    required property string title
    signal done(int code)
    function go(a) {}
    enum Mode { Small, Large }
    component Badge: Item {}
    Text { id: inner }
}
"#,
    );
    write(dir.path(), "Main.qml", "import QtQuick\nItem { Card {} }\n");
    write(dir.path(), "lower.qml", "Item {}\n");

    let cache = ModuleCache::default();
    let main = dir.path().join("Main.qml");
    let scope = import(&cache, "import QtQuick\nItem { Card {} }\n", Some(&main));
    assert!(scope.diagnostics.is_empty(), "{:?}", messages(&scope));
    assert!(scope.lookup_type("lower").is_none());

    let registry = cache.registry();
    let card = scope.lookup_type("Card").expect("Card").id;
    let descriptor = registry.get(card);
    assert!(descriptor.composite);
    assert_eq!(descriptor.base_name.as_deref(), Some("Rectangle"));
    let rect = scope.lookup_type("Rectangle").expect("Rectangle").id;
    assert!(registry.inherits(card, rect));

    let (_, count) = registry.find_property(card, "count").expect("count");
    assert_eq!(registry.property_type(count).map(|t| registry.name(t)), Some("int"));
    let (_, label) = registry.find_property(card, "label").expect("label");
    assert!(label.is_alias);
    assert_eq!(registry.required_properties(card).len(), 1);
    assert!(registry.find_signal(card, "done").is_some());
    assert!(registry.find_method(card, "go").is_some());
    assert!(registry.find_enum_key(card, "Large").is_some());
    assert!(descriptor.inline_components.contains_key("Badge"));
}

#[test]
fn test_inheritance_cycle_between_composites_terminates() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "A.qml", "B {}\n");
    write(dir.path(), "B.qml", "A {}\n");
    let cache = ModuleCache::default();
    let scope = import(&cache, "A {}\n", Some(&dir.path().join("Main.qml")));
    let registry = cache.registry();
    let a = scope.lookup_type("A").expect("A").id;
    let b = scope.lookup_type("B").expect("B").id;
    assert_eq!(registry.base_chain(a), vec![a, b]);
    assert_eq!(registry.base(b), Some(a));
}

#[test]
fn test_path_imports() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "parts/Widget.qml", "Item {}\n");
    write(dir.path(), "logic.js", "function f() {}\n");
    let main = dir.path().join("Main.qml");
    let cache = ModuleCache::default();
    let scope = import(
        &cache,
        "import \"parts\"\nimport \"logic.js\" as Logic\nimport \"nowhere\"\nWidget {}\n",
        Some(&main),
    );
    assert!(scope.lookup_type("Widget").is_some());
    assert!(scope.lookup_namespace("Logic").is_some_and(|ns| ns.dynamic));
    let nowhere = dir.path().join("nowhere");
    assert_eq!(
        messages(&scope),
        vec![format!(
            "File or directory you are trying to import does not exist: {}.",
            nowhere.display()
        )]
    );
}

#[test]
fn test_search_path_module_with_singleton_and_plugin() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "My/Mod/qmldir",
        "module My.Mod\nplugin myplugin\nsingleton Style 1.0 Style.qml\nButton 1.0 Button.qml\n",
    );
    write(dir.path(), "My/Mod/Style.qml", "import QtQml\nQtObject {}\n");
    write(dir.path(), "My/Mod/Button.qml", "pragma Singleton\nimport QtQml\nQtObject {}\n");

    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![SearchEntry::directory(dir.path())],
        ..ResolverOptions::default()
    });
    let scope = import(&cache, "import My.Mod\nQtObject {}\n", None);
    let qmldir = dir.path().join("My").join("Mod").join("qmldir");
    assert_eq!(
        messages(&scope),
        vec![format!("typeinfo not declared in qmldir file: {}", qmldir.display())]
    );
    assert_eq!(scope.diagnostics[0].severity, Severity::Info);
    assert!(scope.imports[2].has_warnings);
    let style = scope.lookup_type("Style").expect("Style").id;
    assert!(cache.registry().get(style).singleton);

    let style_scope = import(
        &cache,
        "import QtQml\nQtObject {}\n",
        Some(&dir.path().join("My/Mod/Style.qml")),
    );
    assert!(messages(&style_scope)
        .contains(&"Type Style declared as singleton in qmldir but missing pragma Singleton"));

    let button_scope = import(
        &cache,
        "pragma Singleton\nimport QtQml\nQtObject {}\n",
        Some(&dir.path().join("My/Mod/Button.qml")),
    );
    assert!(messages(&button_scope)
        .contains(&"Type Button not declared as singleton in qmldir but using pragma Singleton"));
}

#[test]
fn test_ambiguous_qmldir_types_are_replayed_at_imports() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "T/qmldir", "module T\nT 1.0 T.qml\nT 1.0 T2.qml\n");
    write(dir.path(), "T/T.qml", "QtObject {}\n");
    write(dir.path(), "T/T2.qml", "QtObject {}\n");
    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![SearchEntry::directory(dir.path())],
        ..ResolverOptions::default()
    });
    let scope = import(&cache, "import T\nT {}\n", None);
    assert_eq!(
        messages(&scope),
        vec!["Ambiguous type detected. T 1.0 is defined multiple times."]
    );
}

#[test]
fn test_module_ambiguity_across_search_path_entries() {
    let first = tempfile::tempdir().expect("temp dir");
    let second = tempfile::tempdir().expect("temp dir");
    write(first.path(), "Dup/qmldir", "module Dup\nA 1.0 A.qml\n");
    write(first.path(), "Dup/A.qml", "QtObject {}\n");
    write(second.path(), "Dup/qmldir", "module Dup\nB 1.0 B.qml\n");
    write(second.path(), "Dup/B.qml", "QtObject {}\n");
    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![
            SearchEntry::directory(first.path()),
            SearchEntry::directory(second.path()),
        ],
        ..ResolverOptions::default()
    });
    let scope = import(&cache, "import Dup\nA {}\n", None);
    assert_eq!(scope.diagnostics.len(), 1);
    assert!(scope.diagnostics[0].message.starts_with("Module \"Dup\" is ambiguous."));
    assert!(scope.lookup_type("A").is_some());
    assert!(scope.lookup_type("B").is_none());
}

#[test]
fn test_overlay_precedence_follows_search_path_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "Res/qmldir", "module Res\nFromDisk 1.0 FromDisk.qml\n");
    write(dir.path(), "Res/FromDisk.qml", "QtObject {}\n");
    let overlay = ResourceOverlay::new("app")
        .with_content("Res/qmldir", "module Res\nFromOverlay 1.0 FromOverlay.qml\n")
        .with_content("Res/FromOverlay.qml", "QtObject {}\n");

    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![
            SearchEntry::overlay(overlay.clone()),
            SearchEntry::directory(dir.path()),
        ],
        ..ResolverOptions::default()
    });
    let scope = import(&cache, "import Res\nFromOverlay {}\n", None);
    assert!(scope.lookup_type("FromOverlay").is_some());
    assert!(scope.lookup_type("FromDisk").is_none());

    cache.set_search_path(vec![
        SearchEntry::directory(dir.path()),
        SearchEntry::overlay(overlay),
    ]);
    assert_eq!(cache.module_count(), 0);
    let scope = import(&cache, "import Res\nFromDisk {}\n", None);
    assert!(scope.lookup_type("FromDisk").is_some());
}

#[test]
fn test_replacing_overlays_clears_the_cache() {
    let first = ResourceOverlay::new("v1")
        .with_content("Res/qmldir", "module Res\nOld 1.0 Old.qml\n")
        .with_content("Res/Old.qml", "QtObject {}\n");
    let second = ResourceOverlay::new("v2")
        .with_content("Res/qmldir", "module Res\nNew 1.0 New.qml\n")
        .with_content("Res/New.qml", "QtObject {}\n");
    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![SearchEntry::overlay(first)],
        ..ResolverOptions::default()
    });
    assert!(import(&cache, "import Res\nOld {}\n", None).lookup_type("Old").is_some());
    cache.replace_overlays(vec![second]);
    let scope = import(&cache, "import Res\nNew {}\n", None);
    assert!(scope.lookup_type("New").is_some());
    assert!(scope.lookup_type("Old").is_none());
}

#[test]
fn test_dependencies_are_hidden_not_visible() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "Outer/qmldir", "module Outer\ndepends Inner\nFront 1.0 Front.qml\n");
    write(dir.path(), "Outer/Front.qml", "QtObject {}\n");
    write(dir.path(), "Inner/qmldir", "module Inner\nSecret 1.0 Secret.qml\n");
    write(dir.path(), "Inner/Secret.qml", "QtObject {}\n");
    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![SearchEntry::directory(dir.path())],
        ..ResolverOptions::default()
    });
    let scope = import(&cache, "import Outer\nFront {}\n", None);
    assert!(scope.lookup_type("Front").is_some());
    assert!(scope.lookup_type("Secret").is_none());
    assert!(scope.lookup_hidden("Secret").is_some());
}

#[test]
fn test_explicit_qmltypes_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "extra.qmltypes",
        r#"import QtQuick.tooling 1.2
Module {
    dependencies: ["QtQuick 2.0"]
    Component {
        name: "MyGadget"
        prototype: "QObject"
        exports: ["Extra/Gadget 1.0"]
        Property { name: "level"; type: "int" }
    }
}
"#,
    );
    let missing = dir.path().join("missing.qmltypes");
    let cache = ModuleCache::new(ResolverOptions {
        qmltypes_files: vec![
            dir.path().join("extra.qmltypes"),
            dir.path().to_path_buf(),
            missing.clone(),
        ],
        ..ResolverOptions::default()
    });
    let scope = import(&cache, "Gadget {}\n", None);
    assert_eq!(
        messages(&scope),
        vec![
            format!("QML types file cannot be a directory: {}", dir.path().display()),
            format!("QML types file does not exist: {}", missing.display()),
        ]
    );
    let gadget = scope.lookup_type("Gadget").expect("Gadget from -i file").id;
    let registry = cache.registry();
    let object = registry.by_internal_name("QObject").expect("QObject");
    assert!(registry.inherits(gadget, object));
}

#[test]
fn test_dependencies_in_qmltypes_are_deprecated() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "Legacy/qmldir", "module Legacy\ntypeinfo dep.qmltypes\n");
    write(
        dir.path(),
        "Legacy/dep.qmltypes",
        r#"import QtQuick.tooling 1.2
Module {
    dependencies: ["QtQuick 2.0"]
    Component {
        name: "LegacyGadget"
        prototype: "QObject"
        exports: ["Legacy/Gadget 1.0"]
    }
}
"#,
    );
    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![SearchEntry::directory(dir.path())],
        ..ResolverOptions::default()
    });
    let scope = import(&cache, "import Legacy\nGadget {}\n", None);
    let found = messages(&scope);
    assert_eq!(found.len(), 1, "{found:?}");
    assert!(found[0].starts_with("Found deprecated dependency specifications in "));
    assert!(
        found[0].ends_with("dep.qmltypes. Specify dependencies in qmldir instead."),
        "{}",
        found[0]
    );
    assert_eq!(scope.diagnostics[0].category, qmlint_common::category::IMPORT);
    assert!(scope.lookup_type("Gadget").is_some());
}

// =============================================================================
// Cache locking
// =============================================================================

#[test]
fn test_loaded_imports_resolve_under_the_read_lock() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "Widgets/qmldir", "module Widgets\nButton 1.0 Button.qml\n");
    write(dir.path(), "Widgets/Button.qml", "QtObject {}\n");
    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![SearchEntry::directory(dir.path())],
        ..ResolverOptions::default()
    });
    let doc = parse_document("import Widgets\nButton {}\n").expect("document should parse");
    let path = dir.path().join("app/Main.qml");
    fs::create_dir_all(dir.path().join("app")).expect("mkdir");

    assert!(!cache.is_loaded(&doc, Some(&path)));
    cache.import_document(&doc, Some(&path));
    assert!(cache.is_loaded(&doc, Some(&path)));
    let modules = cache.module_count();

    // A live registry view holds the read lock; a second import of the
    // same document must not need the write lock.
    let registry = cache.registry();
    let scope = cache.import_document(&doc, Some(&path));
    let button = scope.lookup_type("Button").expect("Button").id;
    assert!(registry.get(button).composite);
    drop(registry);
    assert_eq!(cache.module_count(), modules);
}

#[test]
fn test_parallel_imports_load_each_module_once() {
    use rayon::prelude::*;

    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "Widgets/qmldir", "module Widgets\nButton 1.0 Button.qml\n");
    write(dir.path(), "Widgets/Button.qml", "QtObject {}\n");
    let cache = ModuleCache::new(ResolverOptions {
        search_path: vec![SearchEntry::directory(dir.path())],
        ..ResolverOptions::default()
    });
    let doc = parse_document("import Widgets\nButton {}\n").expect("document should parse");
    let scopes: Vec<ImportScope> = (0..16)
        .into_par_iter()
        .map(|_| cache.import_document(&doc, None))
        .collect();
    assert!(scopes.iter().all(|scope| scope.diagnostics.is_empty()));
    let ids: Vec<_> = scopes
        .iter()
        .map(|scope| scope.lookup_type("Button").expect("Button").id)
        .collect();
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}
