use crate::qmldir::Qmldir;

#[test]
fn test_parse_full_qmldir() {
    let qmldir = Qmldir::parse(
        "\
# comment
module My.Module
typeinfo plugins.qmltypes
depends QtQuick auto
import QtQml 2.0
optional plugin myplugin
classname MyPlugin
Button 1.0 Button.qml
singleton Style 1.0 Style.qml
internal Helper Helper.qml
Utils 1.0 utils.js
",
    );
    assert_eq!(qmldir.module.as_deref(), Some("My.Module"));
    assert_eq!(qmldir.typeinfos, vec!["plugins.qmltypes"]);
    assert_eq!(qmldir.depends[0].uri, "QtQuick");
    assert_eq!(qmldir.depends[0].version, None);
    assert_eq!(qmldir.imports[0].uri, "QtQml");
    assert_eq!(qmldir.imports[0].version.map(|v| v.major), Some(2));
    assert_eq!(qmldir.plugins, vec!["myplugin"]);
    assert_eq!(qmldir.components.len(), 3);
    assert!(qmldir.components[1].singleton);
    assert!(qmldir.components[2].internal);
    assert_eq!(qmldir.components[2].file, "Helper.qml");
    assert_eq!(qmldir.scripts, vec![("Utils".to_string(), "utils.js".to_string())]);
}

#[test]
fn test_ambiguous_components_need_same_version_and_different_file() {
    let qmldir = Qmldir::parse(
        "\
module T
T 1.0 T.qml
T 1.0 T2.qml
T 2.0 T3.qml
U 1.0 U.qml
U 1.0 U.qml
",
    );
    let ambiguous = qmldir.ambiguous_components();
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous[0].name, "T");
}

#[test]
fn test_plugin_without_typeinfo_is_recorded() {
    let qmldir = Qmldir::parse("module X\nplugin xplugin\n");
    assert!(qmldir.typeinfos.is_empty());
    assert_eq!(qmldir.plugins, vec!["xplugin"]);
}
