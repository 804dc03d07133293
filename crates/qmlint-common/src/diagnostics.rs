//! Diagnostic Infrastructure
//!
//! Analysis results are data: every problem the analyzer finds is a
//! [`Diagnostic`] with a category, a severity, a byte span and, once the
//! pipeline has finalized it, a 0-based line/column. Diagnostics may carry
//! related notes and fix-it suggestions.
//!
//! # Example
//!
//! ```ignore
//! let mut bag = DiagnosticBag::new();
//! bag.add(Diagnostic::new(category::UNQUALIFIED, span, "Unqualified access"));
//! ```

use crate::category::{Category, Severity};
use crate::position::{LineMap, Position};
use crate::span::Span;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;

// =============================================================================
// Related notes
// =============================================================================

/// A secondary location attached to a diagnostic, such as a previous
/// declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelatedNote {
    pub span: Span,
    pub location: Position,
    pub message: String,
}

impl RelatedNote {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        RelatedNote {
            span,
            location: Position::default(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Fix suggestions
// =============================================================================

/// A textual replacement of `span` by `replacement`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FixSuggestion {
    pub label: String,
    pub span: Span,
    pub location: Position,
    pub replacement: String,
    /// Whether `--fix` may apply this without asking.
    pub auto_applicable: bool,
}

impl FixSuggestion {
    pub fn new(label: impl Into<String>, span: Span, replacement: impl Into<String>) -> Self {
        FixSuggestion {
            label: label.into(),
            span,
            location: Position::default(),
            replacement: replacement.into(),
            auto_applicable: false,
        }
    }

    /// Insert `text` at `offset`.
    pub fn insertion(label: impl Into<String>, offset: u32, text: impl Into<String>) -> Self {
        Self::new(label, Span::at(offset), text)
    }

    pub fn auto_applicable(mut self) -> Self {
        self.auto_applicable = true;
        self
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A single analysis finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    /// 0-based position of `span.start`; filled in by [`Diagnostic::locate`].
    pub location: Position,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<RelatedNote>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<FixSuggestion>,
    /// Set by [`Diagnostic::with_severity`]; such a severity survives
    /// unless the user configured a level for the category.
    #[serde(skip)]
    pub explicit_severity: bool,
}

impl Diagnostic {
    /// Create a warning; the pipeline replaces the severity with the
    /// configured level of `category`.
    pub fn new(category: Category, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            category,
            severity: Severity::Warning,
            message: message.into(),
            span,
            location: Position::default(),
            notes: Vec::new(),
            fixes: Vec::new(),
            explicit_severity: false,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self.explicit_severity = true;
        self
    }

    pub fn with_note(mut self, span: Span, message: impl Into<String>) -> Self {
        self.notes.push(RelatedNote::new(span, message));
        self
    }

    pub fn with_fix(mut self, fix: FixSuggestion) -> Self {
        self.fixes.push(fix);
        self
    }

    /// Fill in line/column for the diagnostic, its notes and its fixes.
    pub fn locate(&mut self, line_map: &LineMap, source: &str) {
        self.location = line_map.offset_to_position(self.span.start, source);
        for note in &mut self.notes {
            note.location = line_map.offset_to_position(note.span.start, source);
        }
        for fix in &mut self.fixes {
            fix.location = line_map.offset_to_position(fix.span.start, source);
        }
    }

    /// Key used for deduplication.
    pub fn identity(&self) -> (Category, &str, Span) {
        (self.category, self.message.as_str(), self.span)
    }

    /// Format in the simple form `warning: message [category]`.
    pub fn format_simple(&self) -> String {
        format!("{}: {} [{}]", self.severity, self.message, self.category)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

// =============================================================================
// DiagnosticBag
// =============================================================================

/// An append-only collection of diagnostics for one analysis phase.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        DiagnosticBag {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Shorthand for `add(Diagnostic::new(..))`.
    pub fn report(&mut self, category: Category, span: Span, message: impl Into<String>) {
        self.add(Diagnostic::new(category, span, message));
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Stable sort by start offset, then drop duplicates on (category,
    /// severity, message, start offset), keeping the first occurrence.
    /// Diagnostics that differ only in where their span ends report the
    /// same line and column, so they count as one.
    pub fn sort_and_dedup(&mut self) {
        self.diagnostics.sort_by_key(|d| d.span.start);
        let mut seen: FxHashSet<(Category, Severity, String, u32)> = FxHashSet::default();
        self.diagnostics
            .retain(|d| seen.insert((d.category, d.severity, d.message.clone(), d.span.start)));
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}
