use clap::Parser;
use qmlint_checker::PassRegistry;
use qmlint_common::{Level, category};
use std::fs;
use std::path::{Path, PathBuf};

use super::args::CliArgs;
use super::driver::{
    EXIT_FAILURE, RunOutcome, analysis_config, category_listing, collect_files, resolver_options,
    run,
};
use crate::session::FileReport;
use crate::settings::{ResolvedSettings, SETTINGS_FILE};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    fs::write(&path, contents).expect("failed to write fixture");
    path
}

fn args(argv: &[&str]) -> CliArgs {
    let mut full = vec!["qmlint"];
    full.extend_from_slice(argv);
    CliArgs::try_parse_from(full).expect("args should parse")
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

const PARENT_MEMBER: &str = r#"import QtQuick
Item {
    id: root
    property int spacing: 4
    Item {
        width: spacing
    }
}
"#;

#[test]
fn collects_qml_files_from_directories() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_file(dir.path(), "b/Second.qml", "Item {}\n");
    write_file(dir.path(), "a/First.qml", "Item {}\n");
    write_file(dir.path(), "a/notes.txt", "");
    write_file(dir.path(), ".hidden/Skipped.qml", "Item {}\n");

    let files = collect_files(&[dir.path().to_path_buf()]).expect("collects");
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().expect("name").to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["First.qml", "Second.qml"]);
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = collect_files(&[dir.path().join("Nope.qml")]).expect_err("should fail");
    assert!(err.to_string().contains("file not found"));
}

#[test]
fn command_line_levels_override_settings() {
    let settings = ResolvedSettings {
        levels: vec![
            ("unqualified".to_string(), Level::Disable),
            ("color".to_string(), Level::Error),
        ],
        ..ResolvedSettings::default()
    };
    let cli = args(&["--level", "unqualified=critical", "Main.qml"]);
    let config = analysis_config(&PassRegistry::builtin(), &cli, &settings);
    assert_eq!(config.level(category::UNQUALIFIED), Level::Critical);
    assert_eq!(config.level(category::COLOR), Level::Error);
    assert_eq!(config.level(category::DEPRECATED), Level::Warning);
}

#[test]
fn import_paths_combine_in_order() {
    let settings = ResolvedSettings {
        import_paths: vec![PathBuf::from("/from/settings")],
        qmltypes: vec![PathBuf::from("/types/a.qmltypes")],
        bare: true,
        ..ResolvedSettings::default()
    };
    let cli = args(&["-I", "/from/cli", "Main.qml"]);
    let options = resolver_options(&cli, &settings);
    assert_eq!(options.search_path.len(), 2);
    assert_eq!(options.qmltypes_files, vec![PathBuf::from("/types/a.qmltypes")]);
    assert!(options.bare);
}

#[test]
fn exit_code_reflects_errors_and_warning_budget() {
    let clean = RunOutcome::default();
    assert_eq!(clean.exit_code(None), 0);

    let dir = tempfile::tempdir().expect("temp dir");
    let file = write_file(dir.path(), "Main.qml", PARENT_MEMBER);
    let outcome = run(&args(&["--ignore-settings", &path_arg(&file)])).expect("run");
    assert_eq!(outcome.error_count(), 0);
    assert_eq!(outcome.warning_count(), 1);
    assert_eq!(outcome.exit_code(None), 0);
    assert_eq!(outcome.exit_code(Some(1)), 0);
    assert_eq!(outcome.exit_code(Some(0)), EXIT_FAILURE);

    let outcome = run(&args(&[
        "--ignore-settings",
        "--level",
        "unqualified=error",
        &path_arg(&file),
    ]))
    .expect("run");
    assert_eq!(outcome.exit_code(None), EXIT_FAILURE);
}

#[test]
fn fix_rewrites_the_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = write_file(dir.path(), "Main.qml", PARENT_MEMBER);

    let outcome = run(&args(&["--ignore-settings", "--fix", &path_arg(&file)])).expect("run");
    assert_eq!(outcome.fixes_applied, 1);
    let report: &FileReport = &outcome.reports[0];
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);

    let written = fs::read_to_string(&file).expect("read back");
    assert!(written.contains("width: root.spacing"));

    let again = run(&args(&["--ignore-settings", "--fix", &path_arg(&file)])).expect("run");
    assert_eq!(again.fixes_applied, 0);
}

#[test]
fn settings_file_is_honored_unless_ignored() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_file(
        dir.path(),
        SETTINGS_FILE,
        r#"{ "categories": { "unqualified": "disable" } }"#,
    );
    let file = write_file(dir.path(), "Main.qml", PARENT_MEMBER);

    let outcome = run(&args(&[&path_arg(&file)])).expect("run");
    assert_eq!(outcome.warning_count(), 0);

    let outcome = run(&args(&["--ignore-settings", &path_arg(&file)])).expect("run");
    assert_eq!(outcome.warning_count(), 1);
}

#[test]
fn unknown_categories_are_collected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = write_file(dir.path(), "Main.qml", "import QtQuick\nItem {}\n");
    let outcome = run(&args(&[
        "--ignore-settings",
        "--level",
        "no-such-thing=error",
        &path_arg(&file),
    ]))
    .expect("run");
    assert_eq!(outcome.unknown_categories, vec!["no-such-thing".to_string()]);
}

#[test]
fn reports_keep_input_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let first = write_file(dir.path(), "z/Zed.qml", "import QtQuick\nItem {}\n");
    let second = write_file(dir.path(), "a/Aye.qml", "import QtQuick\nItem {}\n");
    let outcome = run(&args(&[
        "--ignore-settings",
        &path_arg(&first),
        &path_arg(&second),
    ]))
    .expect("run");
    assert_eq!(outcome.reports[0].path, first);
    assert_eq!(outcome.reports[1].path, second);
}

#[test]
fn lists_every_builtin_category() {
    let listing = category_listing(&PassRegistry::builtin());
    assert_eq!(
        listing.lines().count(),
        qmlint_common::category::BUILTIN_CATEGORIES.len()
    );
    let duplicate_ids = listing
        .lines()
        .find(|line| line.starts_with("syntax.duplicate-ids"))
        .expect("listed");
    assert!(duplicate_ids.contains("error"));
}
