use qmlint_common::{Diagnostic, FixSuggestion, LineMap, Severity, Span, category};
use serde_json::Value;
use std::path::PathBuf;

use super::json::{build_report, to_json_string};
use crate::session::FileReport;

const SOURCE: &str = "import QtQuick\nItem {\n    property color myColor: \"lbue\"\n}\n";

fn color_report() -> FileReport {
    let start = SOURCE.find("lbue").expect("fixture") as u32;
    let span = Span::new(start, start + 4);
    let mut diagnostic = Diagnostic::new(category::COLOR, span, "Invalid color \"lbue\"")
        .with_fix(FixSuggestion::new("Did you mean \"blue\"?", span, "blue"));
    diagnostic.locate(&LineMap::build(SOURCE), SOURCE);
    FileReport {
        path: PathBuf::from("Main.qml"),
        source: SOURCE.to_string(),
        diagnostics: vec![diagnostic],
    }
}

#[test]
fn positions_are_one_based() {
    let text = to_json_string(&[color_report()]).expect("serializes");
    let value: Value = serde_json::from_str(&text).expect("valid JSON");

    let file = &value["files"][0];
    assert_eq!(file["filename"], "Main.qml");
    assert_eq!(file["success"], true);

    let diagnostic = &file["diagnostics"][0];
    assert_eq!(diagnostic["message"], "Invalid color \"lbue\"");
    assert_eq!(diagnostic["severity"], "warning");
    assert_eq!(diagnostic["id"], "color");
    assert_eq!(diagnostic["line"], 3);
    assert_eq!(diagnostic["column"], 30);
    assert_eq!(diagnostic["length"], 4);

    let suggestion = &diagnostic["suggestions"][0];
    assert_eq!(suggestion["replacement"], "blue");
    assert_eq!(suggestion["line"], 3);
    assert_eq!(suggestion["column"], 30);
    assert_eq!(suggestion["length"], 4);
    assert_eq!(suggestion["autoApplicable"], false);
}

#[test]
fn errors_mark_the_file_unsuccessful() {
    let mut report = color_report();
    report.diagnostics[0].severity = Severity::Critical;
    let json = build_report(&[report]);
    assert!(!json.files[0].success);
    assert_eq!(json.files[0].diagnostics[0].severity, "critical");
}

#[test]
fn clean_file_has_empty_list() {
    let report = FileReport {
        path: PathBuf::from("Clean.qml"),
        source: "Item {}\n".to_string(),
        diagnostics: Vec::new(),
    };
    let value: Value =
        serde_json::from_str(&to_json_string(&[report]).expect("serializes")).expect("valid JSON");
    assert_eq!(value["files"][0]["diagnostics"], Value::Array(Vec::new()));
    assert_eq!(value["files"][0]["success"], true);
}
