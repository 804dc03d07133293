//! Diagnostic passes and the analysis pipeline of the qmlint analyzer.
//!
//! The checker consumes the [`ScopeTree`] built by `qmlint-binder` and the
//! type registry of `qmlint-resolver`, runs the registered passes and
//! turns their findings into the final, ordered diagnostics of a document.
//!
//! - `config` - per-category levels ([`AnalysisConfig`])
//! - `context` - name and member resolution shared by the passes
//! - `registry` - pass registration and [`LintPlugin`]s
//! - `passes` - the built-in passes
//! - `pipeline` - parse, bind, run passes, finalize
//!
//! [`ScopeTree`]: qmlint_binder::ScopeTree

pub mod config;
pub mod context;
pub mod passes;
pub mod pipeline;
pub mod registry;

pub use config::AnalysisConfig;
pub use context::{PassContext, Resolution, Target};
pub use passes::literals::is_valid_color;
pub use pipeline::{finalize, lint_document, lint_parsed, run_passes};
pub use registry::{LintPlugin, PassEntry, PassFn, PassRegistry, PassScope};
