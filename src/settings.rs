//! `.qmllint.json` settings files.
//!
//! A linted file uses the settings file in its own directory or the nearest
//! ancestor directory. Paths inside a settings file are relative to the
//! directory holding it.

use qmlint_checker::AnalysisConfig;
use qmlint_common::Level;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const SETTINGS_FILE: &str = ".qmllint.json";
/// Settings name used by Qt's own qmllint; not read.
pub const INI_SETTINGS_FILE: &str = ".qmllint.ini";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: unknown level \"{value}\" for category \"{category}\"", .path.display())]
    UnknownLevel {
        path: PathBuf,
        category: String,
        value: String,
    },
}

/// The file as written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
    #[serde(default)]
    pub import_paths: Vec<String>,
    #[serde(default)]
    pub qmltypes: Vec<String>,
    #[serde(default)]
    pub bare: bool,
}

/// A settings file with levels parsed and paths made absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// The settings file itself; `None` for the empty default.
    pub path: Option<PathBuf>,
    pub levels: Vec<(String, Level)>,
    pub import_paths: Vec<PathBuf>,
    pub qmltypes: Vec<PathBuf>,
    pub bare: bool,
}

impl ResolvedSettings {
    /// Layer the category levels on top of `config`.
    pub fn apply_levels(&self, config: &mut AnalysisConfig) {
        for (name, level) in &self.levels {
            config.set_level(name.clone(), *level);
        }
    }
}

pub fn parse_settings(source: &str) -> Result<Settings, serde_json::Error> {
    serde_json::from_str(source)
}

/// The settings file governing `file`: `.qmllint.json` in the directory of
/// `file` or in the closest ancestor that has one.
pub fn find_settings(file: &Path) -> Option<PathBuf> {
    let start = if file.is_dir() {
        Some(file)
    } else {
        file.parent()
    };
    let start = start.map(|dir| {
        if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        }
    })?;
    let start = std::fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    for dir in start.ancestors() {
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        let ini = dir.join(INI_SETTINGS_FILE);
        if ini.is_file() {
            warn!(path = %ini.display(), "ignoring INI settings file; convert it to {SETTINGS_FILE}");
        }
    }
    None
}

pub fn load_settings(path: &Path) -> Result<ResolvedSettings, SettingsError> {
    let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = parse_settings(&source).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), categories = settings.categories.len(), "settings loaded");
    resolve_settings(settings, path)
}

/// Check levels and anchor paths at the directory of `path`.
pub fn resolve_settings(settings: Settings, path: &Path) -> Result<ResolvedSettings, SettingsError> {
    let base = path.parent().unwrap_or(Path::new("."));
    let anchor = |entry: &String| {
        let entry = Path::new(entry);
        if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            base.join(entry)
        }
    };

    let mut levels = Vec::with_capacity(settings.categories.len());
    for (category, value) in settings.categories {
        let level = value.parse::<Level>().map_err(|_| SettingsError::UnknownLevel {
            path: path.to_path_buf(),
            category: category.clone(),
            value: value.clone(),
        })?;
        levels.push((category, level));
    }

    Ok(ResolvedSettings {
        path: Some(path.to_path_buf()),
        levels,
        import_paths: settings.import_paths.iter().map(anchor).collect(),
        qmltypes: settings.qmltypes.iter().map(anchor).collect(),
        bare: settings.bare,
    })
}

/// Find and load the settings governing `file`; the empty default when
/// there is none.
pub fn settings_for(file: &Path) -> Result<ResolvedSettings, SettingsError> {
    match find_settings(file) {
        Some(path) => load_settings(&path),
        None => Ok(ResolvedSettings::default()),
    }
}
