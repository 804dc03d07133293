//! One `qmlint` run: collect inputs, group them by settings file, lint,
//! optionally fix.

use anyhow::{Context, Result, bail};
use qmlint_checker::{AnalysisConfig, PassRegistry};
use qmlint_common::{Level, apply_fixes};
use qmlint_resolver::{ResolverOptions, SearchEntry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::args::CliArgs;
use crate::session::{FileReport, Session};
use crate::settings::{ResolvedSettings, find_settings, load_settings, settings_for};

/// Exit status of a failed run.
pub const EXIT_FAILURE: i32 = 255;

#[derive(Debug, Default)]
pub struct RunOutcome {
    /// In input order.
    pub reports: Vec<FileReport>,
    pub fixes_applied: usize,
    /// Category names in settings or `--level` that match no category.
    pub unknown_categories: Vec<String>,
}

impl RunOutcome {
    pub fn error_count(&self) -> usize {
        self.reports.iter().map(FileReport::error_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.reports.iter().map(FileReport::warning_count).sum()
    }

    /// 255 on any error or critical diagnostic, or when warnings exceed
    /// `max_warnings`; 0 otherwise.
    pub fn exit_code(&self, max_warnings: Option<usize>) -> i32 {
        let too_many_warnings = max_warnings.is_some_and(|max| self.warning_count() > max);
        if self.error_count() > 0 || too_many_warnings {
            EXIT_FAILURE
        } else {
            0
        }
    }
}

/// Expand directories into the `.qml` files below them, skipping hidden
/// directories. Files are kept as given.
pub fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let walker = WalkDir::new(input)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
                });
            for entry in walker.filter_map(|e| e.ok()) {
                let path = entry.path();
                if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "qml") {
                    files.push(path.to_path_buf());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("file not found: {}", input.display());
        }
    }
    Ok(files)
}

/// Command line import paths come before those of the settings file.
pub fn resolver_options(args: &CliArgs, settings: &ResolvedSettings) -> ResolverOptions {
    ResolverOptions {
        search_path: args
            .import_paths
            .iter()
            .chain(&settings.import_paths)
            .map(SearchEntry::directory)
            .collect(),
        qmltypes_files: args
            .qmltypes
            .iter()
            .chain(&settings.qmltypes)
            .cloned()
            .collect(),
        bare: args.bare || settings.bare,
    }
}

/// Category defaults, then the settings file, then `--level`.
pub fn analysis_config(passes: &PassRegistry, args: &CliArgs, settings: &ResolvedSettings) -> AnalysisConfig {
    let mut config = passes.default_config();
    settings.apply_levels(&mut config);
    for (name, level) in &args.levels {
        config.set_level(name.clone(), *level);
    }
    config
}

pub fn run(args: &CliArgs) -> Result<RunOutcome> {
    let passes = PassRegistry::builtin();
    let mut outcome = RunOutcome::default();

    if let Some(uri) = &args.module {
        let settings = if args.ignore_settings {
            ResolvedSettings::default()
        } else {
            settings_for(Path::new(".")).context("failed to load settings")?
        };
        let session = make_session(&passes, args, &settings, &mut outcome);
        let report = session
            .lint_module(uri)
            .with_context(|| format!("failed to lint module {uri}"))?;
        info!(uri = %uri, files = report.files.len(), "module linted");
        for file in report.into_file_reports() {
            let file = finish_report(&session, args, file, &mut outcome)?;
            outcome.reports.push(file);
        }
        return Ok(outcome);
    }

    let files = collect_files(&args.files)?;
    if files.is_empty() {
        bail!("no QML files to lint");
    }

    let mut groups: BTreeMap<Option<PathBuf>, Vec<(usize, PathBuf)>> = BTreeMap::new();
    for (index, file) in files.into_iter().enumerate() {
        let key = if args.ignore_settings {
            None
        } else {
            find_settings(&file)
        };
        groups.entry(key).or_default().push((index, file));
    }

    let mut ordered: Vec<(usize, FileReport)> = Vec::new();
    for (settings_path, members) in groups {
        let settings = match &settings_path {
            Some(path) => load_settings(path)?,
            None => ResolvedSettings::default(),
        };
        debug!(settings = ?settings_path, files = members.len(), "linting group");
        let session = make_session(&passes, args, &settings, &mut outcome);
        let paths: Vec<PathBuf> = members.iter().map(|(_, path)| path.clone()).collect();
        for ((index, _), result) in members.iter().zip(session.lint_files(&paths)) {
            let report = result.context("failed to lint file")?;
            let report = finish_report(&session, args, report, &mut outcome)?;
            ordered.push((*index, report));
        }
    }
    ordered.sort_by_key(|(index, _)| *index);
    outcome.reports = ordered.into_iter().map(|(_, report)| report).collect();
    outcome.unknown_categories.sort();
    outcome.unknown_categories.dedup();
    Ok(outcome)
}

fn make_session(
    passes: &PassRegistry,
    args: &CliArgs,
    settings: &ResolvedSettings,
    outcome: &mut RunOutcome,
) -> Session {
    let config = analysis_config(passes, args, settings);
    outcome
        .unknown_categories
        .extend(config.unknown_categories().into_iter().map(str::to_string));
    Session::with_passes(resolver_options(args, settings), passes.clone(), config)
}

fn finish_report(
    session: &Session,
    args: &CliArgs,
    report: FileReport,
    outcome: &mut RunOutcome,
) -> Result<FileReport> {
    if !args.fix || report.source.is_empty() {
        return Ok(report);
    }
    let (report, applied) = fix_file(session, report)?;
    outcome.fixes_applied += applied;
    Ok(report)
}

/// Apply the auto-applicable fixes of `report`, write the file back and
/// lint the new text.
pub fn fix_file(session: &Session, report: FileReport) -> Result<(FileReport, usize)> {
    let (fixed, applied) = apply_fixes(
        &report.source,
        report.diagnostics.iter().flat_map(|d| &d.fixes),
    );
    if applied == 0 {
        return Ok((report, 0));
    }
    std::fs::write(&report.path, &fixed)
        .with_context(|| format!("failed to write {}", report.path.display()))?;
    info!(path = %report.path.display(), applied, "fixes applied");
    let diagnostics = session.lint_source(&fixed, Some(&report.path));
    Ok((
        FileReport {
            path: report.path,
            source: fixed,
            diagnostics,
        },
        applied,
    ))
}

pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::Disable => "disable",
        Level::Info => "info",
        Level::Warning => "warning",
        Level::Error => "error",
        Level::Critical => "critical",
    }
}

/// One line per category: id, default level, description.
pub fn category_listing(passes: &PassRegistry) -> String {
    let width = passes
        .categories()
        .iter()
        .map(|info| info.category.name().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for info in passes.categories() {
        out.push_str(&format!(
            "{:<width$}  {:<8}  {}\n",
            info.category.name(),
            level_name(info.default_level),
            info.description
        ));
    }
    out
}
