//! The per-document analysis pipeline.
//!
//! parse -> resolve imports -> bind -> passes -> finalize. Finalizing
//! applies the configured levels, drops suppressed diagnostics, fills in
//! line/column information and sorts and deduplicates the result.

use crate::config::AnalysisConfig;
use crate::context::PassContext;
use crate::registry::{PassEntry, PassRegistry, PassScope};
use qmlint_binder::{RegionId, ScopeTree, bind};
use qmlint_common::{Diagnostic, DiagnosticBag, LineMap, Severity, Suppressions, category};
use qmlint_parser::ast::Document;
use qmlint_parser::parse_document;
use qmlint_resolver::{ModuleCache, TypeRegistry};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use tracing::{debug, error};

/// Lint one document given as source text.
pub fn lint_document(
    source: &str,
    path: Option<&Path>,
    cache: &ModuleCache,
    passes: &PassRegistry,
    config: &AnalysisConfig,
) -> Vec<Diagnostic> {
    let _span = tracing::info_span!("lint_document", path = ?path).entered();
    match parse_document(source) {
        Ok(document) => lint_parsed(&document, source, path, cache, passes, config),
        Err(parse_error) => {
            debug!(message = %parse_error.message, "parse failed");
            let line_map = LineMap::build(source);
            let mut diagnostic = Diagnostic::new(category::SYNTAX, parse_error.span, parse_error.message)
                .with_severity(Severity::Critical);
            diagnostic.locate(&line_map, source);
            vec![diagnostic]
        }
    }
}

/// Lint an already parsed document. `source` must be the text `document`
/// was parsed from.
pub fn lint_parsed(
    document: &Document,
    source: &str,
    path: Option<&Path>,
    cache: &ModuleCache,
    passes: &PassRegistry,
    config: &AnalysisConfig,
) -> Vec<Diagnostic> {
    let line_map = LineMap::build(source);
    let imports = cache.import_document(document, path);
    let registry = cache.registry();
    let tree = bind(document, source, imports, &registry);

    let mut diagnostics = tree.imports.diagnostics.clone();
    diagnostics.extend(tree.diagnostics.iter().cloned());
    diagnostics.extend(run_passes(&tree, &registry, source, &line_map, passes, config));
    let diagnostics = finalize(diagnostics, config, source, &line_map);
    debug!(count = diagnostics.len(), "document linted");
    diagnostics
}

/// Run every enabled pass over `tree`. Component-scoped passes run once per
/// component region. A panicking pass yields one `internal` diagnostic and
/// the remaining passes still run.
pub fn run_passes(
    tree: &ScopeTree,
    registry: &TypeRegistry<'_>,
    source: &str,
    line_map: &LineMap,
    passes: &PassRegistry,
    config: &AnalysisConfig,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for entry in passes.passes() {
        if !entry.is_enabled(config) {
            continue;
        }
        let _span = tracing::debug_span!("pass", name = entry.name).entered();
        let regions: Vec<Option<RegionId>> = match entry.scope {
            PassScope::Document => vec![None],
            PassScope::Component => (0..tree.regions.len())
                .map(|i| Some(RegionId(i as u32)))
                .collect(),
        };
        for region in regions {
            let ctx = PassContext {
                tree,
                registry,
                config,
                source,
                line_map,
                region,
            };
            match run_pass(entry, &ctx) {
                Ok(found) => diagnostics.extend(found),
                Err(diagnostic) => {
                    diagnostics.push(diagnostic);
                    break;
                }
            }
        }
    }
    diagnostics
}

fn run_pass(entry: &PassEntry, ctx: &PassContext<'_>) -> Result<Vec<Diagnostic>, Diagnostic> {
    catch_unwind(AssertUnwindSafe(|| (entry.run)(ctx))).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        error!(pass = entry.name, %message, "pass crashed");
        Diagnostic::new(
            category::INTERNAL,
            ctx.tree.get(ctx.tree.root).span,
            format!("Pass \"{}\" crashed: {message}", entry.name),
        )
        .with_severity(Severity::Critical)
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Apply levels and suppressions, locate, then sort and deduplicate.
///
/// A level configured for the category wins; otherwise a severity set by
/// the reporter is kept; otherwise the category default applies.
pub fn finalize(
    diagnostics: Vec<Diagnostic>,
    config: &AnalysisConfig,
    source: &str,
    line_map: &LineMap,
) -> Vec<Diagnostic> {
    let suppressions = Suppressions::parse(source, line_map);
    let mut bag = DiagnosticBag::new();
    for mut diagnostic in diagnostics {
        let severity = match config.configured_level(diagnostic.category) {
            Some(level) => level.severity(),
            None if diagnostic.explicit_severity => Some(diagnostic.severity),
            None => config.default_level(diagnostic.category).severity(),
        };
        let Some(severity) = severity else {
            continue;
        };
        diagnostic.severity = severity;
        if !suppressions.is_empty()
            && suppressions.is_suppressed(diagnostic.category, line_map.line_of(diagnostic.span.start))
        {
            continue;
        }
        diagnostic.locate(line_map, source);
        bag.add(diagnostic);
    }
    bag.sort_and_dedup();
    bag.into_vec()
}
