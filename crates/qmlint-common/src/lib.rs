//! Common types and utilities for the qmlint QML analyzer.
//!
//! This crate provides foundational types used across all qmlint crates:
//! - Source spans (`Span`) and line/column positions (`LineMap`, `Position`)
//! - Diagnostic records, categories and severities
//! - Fix-it suggestions and their application
//! - `// qmllint disable` suppression directives
//! - "Did you mean" suggestions

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Position types for line/column source locations
pub mod position;
pub use position::{LineMap, Position};

// Diagnostic categories and their default levels
pub mod category;
pub use category::{Category, CategoryInfo, Level, Severity};

// Diagnostics and related notes
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, FixSuggestion, RelatedNote};

// Fix-it application
pub mod fixes;
pub use fixes::apply_fixes;

// Suppression comments
pub mod suppression;
pub use suppression::Suppressions;

// Levenshtein based suggestions
pub mod did_you_mean;
pub use did_you_mean::did_you_mean;

#[cfg(test)]
#[path = "../tests/position_tests.rs"]
mod position_tests;

#[cfg(test)]
#[path = "../tests/suppression_tests.rs"]
mod suppression_tests;

#[cfg(test)]
#[path = "../tests/fixes_tests.rs"]
mod fixes_tests;

#[cfg(test)]
#[path = "../tests/did_you_mean_tests.rs"]
mod did_you_mean_tests;
