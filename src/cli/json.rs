//! Machine-readable report. Lines and columns are 1-based.

use qmlint_common::{Diagnostic, FixSuggestion};
use serde::Serialize;

use crate::session::FileReport;

#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub files: Vec<JsonFile>,
}

#[derive(Debug, Serialize)]
pub struct JsonFile {
    pub filename: String,
    /// No error or critical diagnostic.
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDiagnostic {
    pub message: String,
    pub severity: &'static str,
    pub id: &'static str,
    pub line: u32,
    pub column: u32,
    pub char_offset: u32,
    pub length: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<JsonNote>,
    pub suggestions: Vec<JsonSuggestion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonNote {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSuggestion {
    pub label: String,
    pub line: u32,
    pub column: u32,
    pub char_offset: u32,
    pub length: u32,
    pub replacement: String,
    pub auto_applicable: bool,
}

impl From<&Diagnostic> for JsonDiagnostic {
    fn from(diagnostic: &Diagnostic) -> Self {
        JsonDiagnostic {
            message: diagnostic.message.clone(),
            severity: diagnostic.severity.name(),
            id: diagnostic.category.name(),
            line: diagnostic.location.line + 1,
            column: diagnostic.location.column + 1,
            char_offset: diagnostic.span.start,
            length: diagnostic.span.len(),
            notes: diagnostic
                .notes
                .iter()
                .map(|note| JsonNote {
                    message: note.message.clone(),
                    line: note.location.line + 1,
                    column: note.location.column + 1,
                })
                .collect(),
            suggestions: diagnostic.fixes.iter().map(JsonSuggestion::from).collect(),
        }
    }
}

impl From<&FixSuggestion> for JsonSuggestion {
    fn from(fix: &FixSuggestion) -> Self {
        JsonSuggestion {
            label: fix.label.clone(),
            line: fix.location.line + 1,
            column: fix.location.column + 1,
            char_offset: fix.span.start,
            length: fix.span.len(),
            replacement: fix.replacement.clone(),
            auto_applicable: fix.auto_applicable,
        }
    }
}

impl From<&FileReport> for JsonFile {
    fn from(report: &FileReport) -> Self {
        JsonFile {
            filename: report.path.display().to_string(),
            success: report.error_count() == 0,
            diagnostics: report.diagnostics.iter().map(JsonDiagnostic::from).collect(),
        }
    }
}

pub fn build_report(reports: &[FileReport]) -> JsonReport {
    JsonReport {
        files: reports.iter().map(JsonFile::from).collect(),
    }
}

pub fn to_json_string(reports: &[FileReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&build_report(reports))
}
