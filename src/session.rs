//! Batch analysis over one shared module cache.
//!
//! A [`Session`] owns the cache, the pass registry and the analysis config.
//! Files are linted in parallel on the rayon pool; every worker reads the
//! same [`ModuleCache`], so a module is loaded once per session no matter
//! how many documents import it.

use qmlint_checker::{AnalysisConfig, PassRegistry, finalize, lint_document};
use qmlint_common::{Diagnostic, LineMap, Severity, Span, category};
use qmlint_resolver::{ModuleCache, ResolverOptions, TypeId, TypeRegistry};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info_span};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("module \"{0}\" was not found on the import path")]
    ModuleNotFound(String),
}

/// Diagnostics of one document together with the text they point into.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Result of linting a module by URI.
#[derive(Debug, Clone)]
pub struct ModuleReport {
    pub uri: String,
    /// Where the module was loaded from.
    pub location: String,
    /// Problems with the exported type descriptors themselves.
    pub diagnostics: Vec<Diagnostic>,
    /// The module's composite files.
    pub files: Vec<FileReport>,
}

impl ModuleReport {
    /// The type findings as a report without source text, followed by the
    /// file reports.
    pub fn into_file_reports(self) -> Vec<FileReport> {
        let mut reports = Vec::with_capacity(self.files.len() + 1);
        if !self.diagnostics.is_empty() {
            reports.push(FileReport {
                path: PathBuf::from(self.location),
                source: String::new(),
                diagnostics: self.diagnostics,
            });
        }
        reports.extend(self.files);
        reports
    }
}

#[derive(Clone)]
pub struct Session {
    cache: Arc<ModuleCache>,
    passes: Arc<PassRegistry>,
    config: Arc<AnalysisConfig>,
}

impl Session {
    /// A session running the built-in passes.
    pub fn new(options: ResolverOptions, config: AnalysisConfig) -> Self {
        Self::with_passes(options, PassRegistry::builtin(), config)
    }

    pub fn with_passes(options: ResolverOptions, passes: PassRegistry, config: AnalysisConfig) -> Self {
        Session {
            cache: Arc::new(ModuleCache::new(options)),
            passes: Arc::new(passes),
            config: Arc::new(config),
        }
    }

    pub fn cache(&self) -> &Arc<ModuleCache> {
        &self.cache
    }

    pub fn passes(&self) -> &Arc<PassRegistry> {
        &self.passes
    }

    pub fn config(&self) -> &Arc<AnalysisConfig> {
        &self.config
    }

    /// Lint text that may not exist on disk. `path` decides the document's
    /// directory for implicit imports.
    pub fn lint_source(&self, source: &str, path: Option<&Path>) -> Vec<Diagnostic> {
        lint_document(source, path, &self.cache, &self.passes, &self.config)
    }

    pub fn lint_file(&self, path: &Path) -> Result<FileReport, SessionError> {
        let source = std::fs::read_to_string(path).map_err(|source| SessionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let diagnostics = self.lint_source(&source, Some(path));
        Ok(FileReport {
            path: path.to_path_buf(),
            source,
            diagnostics,
        })
    }

    /// Lint `paths` in parallel. Results come back in input order.
    pub fn lint_files(&self, paths: &[PathBuf]) -> Vec<Result<FileReport, SessionError>> {
        let _span = info_span!("lint_files", count = paths.len()).entered();
        paths.par_iter().map(|path| self.lint_file(path)).collect()
    }

    /// Check that the types `uri` exports are fully resolvable, then lint
    /// each of its composite files.
    pub fn lint_module(&self, uri: &str) -> Result<ModuleReport, SessionError> {
        let _span = info_span!("lint_module", uri).entered();
        let module = self
            .cache
            .resolve_module(uri)
            .ok_or_else(|| SessionError::ModuleNotFound(uri.to_string()))?;

        // The registry holds the cache's read lock; release it before the
        // composite files are linted.
        let (location, diagnostics, composite_files) = {
            let registry = self.cache.registry();
            let descriptor = registry.module(module);
            let mut diagnostics = Vec::new();
            for message in &descriptor.messages {
                let mut diagnostic = Diagnostic::new(message.category, Span::default(), message.message.clone());
                if let Some(severity) = message.severity {
                    diagnostic = diagnostic.with_severity(severity);
                }
                diagnostics.push(diagnostic);
            }

            let mut files: Vec<PathBuf> = Vec::new();
            for (name, type_id) in registry.module_exports(module) {
                check_exported_type(&registry, name, type_id, &mut diagnostics);
                let exported = registry.get(type_id);
                if exported.composite
                    && let Some(file) = &exported.file
                    && !files.contains(file)
                {
                    files.push(file.clone());
                }
            }
            (descriptor.location.clone(), diagnostics, files)
        };
        debug!(
            findings = diagnostics.len(),
            files = composite_files.len(),
            "module types checked"
        );

        let diagnostics = finalize(diagnostics, &self.config, "", &LineMap::build(""));
        let files = self
            .lint_files(&composite_files)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ModuleReport {
            uri: uri.to_string(),
            location,
            diagnostics,
            files,
        })
    }
}

fn check_exported_type(registry: &TypeRegistry<'_>, name: &str, id: TypeId, out: &mut Vec<Diagnostic>) {
    let descriptor = registry.get(id);
    if let Some(base_name) = &descriptor.base_name
        && descriptor.base.is_none()
    {
        out.push(unresolved_type(base_name, &format!("base type of {name}")));
    }

    for property in descriptor.properties.values() {
        if property.is_alias {
            continue;
        }
        let used_in = format!("{name}.{}", property.name);
        match registry.property_type(property) {
            None => out.push(unresolved_type(&property.type_name, &used_in)),
            Some(type_id) if !registry.is_complete(type_id) => out.push(Diagnostic::new(
                category::UNRESOLVED_TYPE,
                Span::default(),
                format!(
                    "Type \"{}\" is not fully resolved. Used in {used_in}",
                    property.type_name
                ),
            )),
            Some(_) => {}
        }
    }

    for method in &descriptor.methods {
        let used_in = format!("{name}.{}", method.name);
        let type_names = method
            .parameters
            .iter()
            .filter_map(|p| p.type_name.as_deref())
            .chain(method.return_type.as_deref());
        for type_name in type_names {
            if resolve_type_name(registry, type_name).is_none() {
                out.push(unresolved_type(type_name, &used_in));
            }
        }
    }
}

fn unresolved_type(type_name: &str, used_in: &str) -> Diagnostic {
    Diagnostic::new(
        category::UNRESOLVED_TYPE,
        Span::default(),
        format!("Type \"{type_name}\" not found. Used in {used_in}"),
    )
}

/// Method signatures name C++ types by internal name and QML functions by
/// exported name; either resolves.
fn resolve_type_name(registry: &TypeRegistry<'_>, name: &str) -> Option<TypeId> {
    let name = name
        .strip_prefix("list<")
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(name);
    registry.by_internal_name(name).or_else(|| {
        registry
            .modules()
            .iter()
            .find_map(|module| module.exports.get(name).copied())
    })
}
