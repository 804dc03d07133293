//! Per-category levels for one analysis.
//!
//! An [`AnalysisConfig`] is built once (defaults, then settings files, then
//! command line overrides) and shared read-only between all documents of a
//! run, usually behind an `Arc`.

use qmlint_common::category::BUILTIN_CATEGORIES;
use qmlint_common::{Category, CategoryInfo, Level};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Default level of every known category.
    defaults: FxHashMap<&'static str, Level>,
    /// Levels set by the user, by category name. A name may be a prefix
    /// group such as `syntax`, which also covers `syntax.duplicate-ids`.
    levels: FxHashMap<String, Level>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisConfig {
    /// Built-in categories at their default levels.
    pub fn new() -> Self {
        let mut config = AnalysisConfig {
            defaults: FxHashMap::default(),
            levels: FxHashMap::default(),
        };
        for info in BUILTIN_CATEGORIES {
            config.register_category(info);
        }
        config
    }

    /// Make a category known, e.g. one contributed by a plugin. An already
    /// known category keeps its default.
    pub fn register_category(&mut self, info: &CategoryInfo) {
        self.defaults
            .entry(info.category.name())
            .or_insert(info.default_level);
    }

    pub fn set_level(&mut self, name: impl Into<String>, level: Level) {
        self.levels.insert(name.into(), level);
    }

    pub fn with_level(mut self, name: impl Into<String>, level: Level) -> Self {
        self.set_level(name, level);
        self
    }

    /// Apply `overrides` on top of the current levels; later layers win.
    pub fn merge_levels<'a>(&mut self, overrides: impl IntoIterator<Item = (&'a String, &'a Level)>) {
        for (name, level) in overrides {
            self.levels.insert(name.clone(), *level);
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.defaults.contains_key(name)
            || self
                .defaults
                .keys()
                .any(|known| known.strip_prefix(name).is_some_and(|rest| rest.starts_with('.')))
    }

    /// Names in the user levels that match no known category.
    pub fn unknown_categories(&self) -> Vec<&str> {
        let mut unknown: Vec<&str> = self
            .levels
            .keys()
            .map(String::as_str)
            .filter(|name| !self.is_known(name))
            .collect();
        unknown.sort_unstable();
        unknown
    }

    /// The level the user set for `category`, directly or through one of
    /// its prefix groups.
    pub fn configured_level(&self, category: Category) -> Option<Level> {
        let mut name = category.name();
        loop {
            if let Some(level) = self.levels.get(name) {
                return Some(*level);
            }
            match name.rsplit_once('.') {
                Some((group, _)) => name = group,
                None => return None,
            }
        }
    }

    pub fn default_level(&self, category: Category) -> Level {
        self.defaults
            .get(category.name())
            .copied()
            .unwrap_or(Level::Warning)
    }

    pub fn level(&self, category: Category) -> Level {
        self.configured_level(category)
            .unwrap_or_else(|| self.default_level(category))
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        self.level(category) != Level::Disable
    }
}
