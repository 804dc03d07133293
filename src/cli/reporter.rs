use colored::Colorize;
use qmlint_common::{Diagnostic, LineMap, Severity};

use crate::session::FileReport;

/// Terminal output for diagnostics.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render(&self, report: &FileReport) -> String {
        let file = report.path.display().to_string();
        let line_map = LineMap::build(&report.source);
        let mut out = String::new();
        for (index, diagnostic) in report.diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(&file, &report.source, &line_map, diagnostic));
        }
        out
    }

    /// `file:line:column - severity: message [category]`, then the source
    /// line with the span underlined, then notes and fixes.
    pub fn format_diagnostic(
        &self,
        file: &str,
        source: &str,
        line_map: &LineMap,
        diagnostic: &Diagnostic,
    ) -> String {
        let mut output = String::new();
        if source.is_empty() {
            output.push_str(file);
        } else {
            output.push_str(&format!(
                "{}:{}:{}",
                file,
                diagnostic.location.line + 1,
                diagnostic.location.column + 1
            ));
        }
        output.push_str(" - ");
        output.push_str(&self.format_severity(diagnostic.severity));
        output.push_str(": ");
        output.push_str(&diagnostic.message);
        output.push(' ');
        output.push_str(&self.format_category(diagnostic.category.name()));

        if let Some(snippet) = self.format_snippet(source, line_map, diagnostic) {
            output.push_str(&snippet);
        }

        for note in &diagnostic.notes {
            output.push('\n');
            let prefix = self.dim("  Note");
            if source.is_empty() {
                output.push_str(&format!("{}: {}", prefix, note.message));
            } else {
                output.push_str(&format!(
                    "{}: {}:{}:{} - {}",
                    prefix,
                    file,
                    note.location.line + 1,
                    note.location.column + 1,
                    note.message
                ));
            }
        }

        for fix in &diagnostic.fixes {
            output.push('\n');
            let label = if fix.auto_applicable {
                format!("{} (applied by --fix)", fix.label)
            } else {
                fix.label.clone()
            };
            output.push_str(&format!("{}: {}", self.dim("  Fix"), label));
        }

        output
    }

    /// The 1-based line number, the line, and `~` under the span.
    fn format_snippet(&self, source: &str, line_map: &LineMap, diagnostic: &Diagnostic) -> Option<String> {
        if source.is_empty() {
            return None;
        }
        let line = diagnostic.location.line;
        let line_text = line_map.line_text(line, source);
        let line_start = line_map.line_start(line)?;
        let span_end = diagnostic.span.end.max(diagnostic.span.start + 1);

        let mut underline = String::new();
        for (index, ch) in line_text.char_indices() {
            let offset = line_start + index as u32;
            let width = if ch == '\t' { 4 } else { 1 };
            if offset < diagnostic.span.start {
                underline.push_str(&" ".repeat(width));
            } else if offset < span_end {
                underline.push_str(&"~".repeat(width));
            } else {
                break;
            }
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        let display_text = line_text.replace('\t', "    ");
        let underline = if self.color {
            underline.red().to_string()
        } else {
            underline
        };
        Some(format!(
            "\n  {:>3}   {}\n        {}",
            line + 1,
            display_text,
            underline
        ))
    }

    fn format_severity(&self, severity: Severity) -> String {
        let label = severity.name();
        if !self.color {
            return label.to_string();
        }
        match severity {
            Severity::Critical => label.magenta().bold().to_string(),
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Info => label.cyan().bold().to_string(),
        }
    }

    fn format_category(&self, name: &str) -> String {
        let label = format!("[{name}]");
        if self.color {
            label.dimmed().to_string()
        } else {
            label
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// `Found 2 errors, 1 warning.`; empty when nothing was found.
    pub fn summary(&self, errors: usize, warnings: usize) -> String {
        if errors == 0 && warnings == 0 {
            return String::new();
        }
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        let text = format!("Found {}, {}.", plural(errors, "error"), plural(warnings, "warning"));
        if self.color && errors > 0 {
            text.red().to_string()
        } else {
            text
        }
    }
}
