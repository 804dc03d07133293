use crate::search_path::{Location, ResourceOverlay, SearchEntry};

fn overlay() -> ResourceOverlay {
    ResourceOverlay::new("res")
        .with_content("My/Mod/qmldir", "module My.Mod\n")
        .with_content("My/Mod/Thing.qml", "Item {}\n")
        .with_content(":/My/Mod/sub/Other.qml", "Item {}\n")
}

#[test]
fn test_overlay_files_and_directories() {
    let overlay = overlay();
    assert!(overlay.is_file("My/Mod/qmldir"));
    assert!(overlay.is_file("/My/./Mod/qmldir"));
    assert!(overlay.is_dir("My"));
    assert!(overlay.is_dir("My/Mod/sub"));
    assert!(!overlay.is_dir("Other"));
    assert_eq!(overlay.list_files("My/Mod"), vec!["Thing.qml", "qmldir"]);
    assert!(overlay.read("missing").is_err());
}

#[test]
fn test_overlay_module_lookup_by_uri() {
    let entry = SearchEntry::overlay(overlay());
    let location = entry.find_module("My.Mod").expect("module in overlay");
    assert_eq!(location.to_string(), ":/res/My/Mod");
    assert_eq!(
        location.join("Thing.qml").read().expect("content"),
        "Item {}\n"
    );
    assert!(entry.find_module("My.Other").is_none());
}

#[test]
fn test_location_join_collapses_parent_components() {
    let entry = SearchEntry::overlay(overlay());
    let location = entry.find_module("My.Mod").expect("module in overlay");
    let sibling = location.join("sub/../Thing.qml");
    assert!(sibling.is_file());
    assert_eq!(
        sibling.parent().map(|p| p.to_string()).as_deref(),
        Some(":/res/My/Mod")
    );
    assert_eq!(sibling.file_name().as_deref(), Some("Thing.qml"));
}

#[test]
fn test_disk_module_lookup() {
    let dir = tempfile::tempdir().expect("temp dir");
    let module = dir.path().join("A").join("B");
    std::fs::create_dir_all(&module).expect("mkdir");
    std::fs::write(module.join("qmldir"), "module A.B\n").expect("write");
    let entry = SearchEntry::directory(dir.path());
    let location = entry.find_module("A.B").expect("module on disk");
    assert!(matches!(location, Location::Disk(_)));
    assert!(location.join("qmldir").is_file());
    assert!(entry.find_module("A.C").is_none());
}
