//! qmlint: a static semantic analyzer for QML.
//!
//! The engine lives in the workspace crates (`qmlint-parser`,
//! `qmlint-resolver`, `qmlint-binder`, `qmlint-checker`). This crate drives
//! it:
//!
//! - [`Session`] lints files in parallel over one shared module cache, and
//!   lints whole modules by URI
//! - [`LiveSession`] analyzes revisions of open documents in the background
//! - [`settings`] reads `.qmllint.json` files
//! - [`cli`] is the `qmlint` command line front end

pub mod cli;
pub mod live;
pub mod session;
pub mod settings;
pub mod tracing_config;

pub use live::{DiagnosticBatch, LiveSession};
pub use session::{FileReport, ModuleReport, Session, SessionError};
pub use settings::{ResolvedSettings, Settings, SettingsError};

pub use qmlint_checker::{AnalysisConfig, LintPlugin, PassEntry, PassRegistry};
pub use qmlint_common::{Category, Diagnostic, FixSuggestion, Level, Severity, apply_fixes};
pub use qmlint_resolver::{ModuleCache, ResolverOptions, ResourceOverlay, SearchEntry};

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod settings_tests;
