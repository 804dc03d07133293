use crate::settings::{
    INI_SETTINGS_FILE, ResolvedSettings, SETTINGS_FILE, SettingsError, find_settings,
    load_settings, parse_settings, settings_for,
};
use qmlint_checker::AnalysisConfig;
use qmlint_common::{Level, category};
use std::fs;
use std::path::{Path, PathBuf};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    fs::write(&path, contents).expect("failed to write fixture");
    path
}

#[test]
fn parses_all_fields() {
    let settings = parse_settings(
        r#"{
            "categories": { "unqualified": "error", "syntax": "disable" },
            "importPaths": ["imports"],
            "qmltypes": ["types/app.qmltypes"],
            "bare": true
        }"#,
    )
    .expect("settings should parse");

    assert_eq!(settings.categories.len(), 2);
    assert_eq!(settings.categories["unqualified"], "error");
    assert_eq!(settings.import_paths, vec!["imports".to_string()]);
    assert_eq!(settings.qmltypes, vec!["types/app.qmltypes".to_string()]);
    assert!(settings.bare);
}

#[test]
fn missing_fields_default() {
    let settings = parse_settings("{}").expect("empty object should parse");
    assert!(settings.categories.is_empty());
    assert!(settings.import_paths.is_empty());
    assert!(!settings.bare);
}

#[test]
fn paths_are_relative_to_settings_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_file(
        dir.path(),
        SETTINGS_FILE,
        r#"{ "importPaths": ["imports", "/opt/qml"], "qmltypes": ["app.qmltypes"] }"#,
    );

    let settings = load_settings(&path).expect("settings should load");
    assert_eq!(settings.path.as_deref(), Some(path.as_path()));
    assert_eq!(
        settings.import_paths,
        vec![dir.path().join("imports"), PathBuf::from("/opt/qml")]
    );
    assert_eq!(settings.qmltypes, vec![dir.path().join("app.qmltypes")]);
}

#[test]
fn nearest_ancestor_wins() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_file(dir.path(), SETTINGS_FILE, "{}");
    write_file(dir.path(), "app/views/.qmllint.json", "{}");
    let deep = write_file(dir.path(), "app/views/list/Main.qml", "Item {}\n");
    let shallow = write_file(dir.path(), "app/Other.qml", "Item {}\n");

    let found = find_settings(&deep).expect("settings above the file");
    assert!(found.ends_with("app/views/.qmllint.json"), "{}", found.display());

    let found = find_settings(&shallow).expect("settings above the file");
    assert_eq!(
        fs::canonicalize(&found).expect("canonical"),
        fs::canonicalize(dir.path().join(SETTINGS_FILE)).expect("canonical")
    );
}

#[test]
fn levels_are_parsed_and_applied() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_file(
        dir.path(),
        SETTINGS_FILE,
        r#"{ "categories": { "unqualified": "error", "syntax": "disable" } }"#,
    );
    let file = write_file(dir.path(), "Main.qml", "Item {}\n");

    let settings = settings_for(&file).expect("settings should load");
    assert!(
        settings
            .levels
            .contains(&("unqualified".to_string(), Level::Error))
    );

    let mut config = AnalysisConfig::new();
    settings.apply_levels(&mut config);
    assert_eq!(config.level(category::UNQUALIFIED), Level::Error);
    assert!(!config.is_enabled(category::DUPLICATE_IDS));
    assert!(config.is_enabled(category::COLOR));
}

#[test]
fn unknown_level_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_file(
        dir.path(),
        SETTINGS_FILE,
        r#"{ "categories": { "unqualified": "loud" } }"#,
    );
    match load_settings(&path) {
        Err(SettingsError::UnknownLevel {
            category, value, ..
        }) => {
            assert_eq!(category, "unqualified");
            assert_eq!(value, "loud");
        }
        other => panic!("expected an unknown level error, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_file(dir.path(), SETTINGS_FILE, "{ \"bare\": ");
    let err = load_settings(&path).expect_err("should fail");
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(err.to_string().contains("invalid settings file"));
}

#[test]
fn no_settings_file_gives_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = write_file(dir.path(), "Main.qml", "Item {}\n");
    // The temp dir may sit below a stray settings file; only check the
    // default when there is none.
    if find_settings(&file).is_none() {
        assert_eq!(settings_for(&file).expect("default"), ResolvedSettings::default());
    }
}

#[test]
fn ini_settings_are_skipped_in_favour_of_json() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_file(dir.path(), SETTINGS_FILE, r#"{ "categories": { "unqualified": "error" } }"#);
    write_file(dir.path(), &format!("app/{INI_SETTINGS_FILE}"), "[Warnings]\nUnqualified=disable\n");
    let file = write_file(dir.path(), "app/Main.qml", "Item {}\n");

    let found = find_settings(&file).expect("json settings above the ini file");
    assert!(found.ends_with(SETTINGS_FILE), "{}", found.display());
    let settings = settings_for(&file).expect("settings");
    assert_eq!(settings.levels, vec![("unqualified".to_string(), Level::Error)]);
}
