//! The pass registry.
//!
//! Built once per session from the built-in passes plus any registered
//! [`LintPlugin`]s, then shared by every analysis.

use crate::config::AnalysisConfig;
use crate::context::PassContext;
use crate::passes;
use qmlint_common::category::BUILTIN_CATEGORIES;
use qmlint_common::{Category, CategoryInfo, Diagnostic};
use std::fmt;
use std::sync::Arc;

pub type PassFn = dyn Fn(&PassContext<'_>) -> Vec<Diagnostic> + Send + Sync;

/// Whether a pass sees the whole document or one component region at a
/// time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassScope {
    Document,
    Component,
}

#[derive(Clone)]
pub struct PassEntry {
    pub name: &'static str,
    /// Categories the pass reports; it is skipped when all are disabled.
    pub categories: Vec<Category>,
    pub scope: PassScope,
    pub run: Arc<PassFn>,
}

impl PassEntry {
    pub fn new(
        name: &'static str,
        categories: &[Category],
        run: impl Fn(&PassContext<'_>) -> Vec<Diagnostic> + Send + Sync + 'static,
    ) -> Self {
        PassEntry {
            name,
            categories: categories.to_vec(),
            scope: PassScope::Document,
            run: Arc::new(run),
        }
    }

    pub fn per_component(mut self) -> Self {
        self.scope = PassScope::Component;
        self
    }

    pub fn is_enabled(&self, config: &AnalysisConfig) -> bool {
        self.categories.iter().any(|c| config.is_enabled(*c))
    }
}

impl fmt::Debug for PassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassEntry")
            .field("name", &self.name)
            .field("categories", &self.categories)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Extra passes and categories supplied from outside the crate.
pub trait LintPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Categories the plugin reports, with their default levels.
    fn categories(&self) -> Vec<CategoryInfo>;

    fn passes(&self) -> Vec<PassEntry>;
}

#[derive(Clone, Debug)]
pub struct PassRegistry {
    passes: Vec<PassEntry>,
    categories: Vec<CategoryInfo>,
}

impl Default for PassRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PassRegistry {
    /// The built-in passes, in the order they run.
    pub fn builtin() -> Self {
        PassRegistry {
            passes: passes::builtin_passes(),
            categories: BUILTIN_CATEGORIES.to_vec(),
        }
    }

    /// A registry without passes; categories are still known.
    pub fn empty() -> Self {
        PassRegistry {
            passes: Vec::new(),
            categories: BUILTIN_CATEGORIES.to_vec(),
        }
    }

    pub fn register(&mut self, pass: PassEntry) {
        self.passes.push(pass);
    }

    pub fn register_plugin(&mut self, plugin: &dyn LintPlugin) {
        for info in plugin.categories() {
            if !self.categories.iter().any(|c| c.category == info.category) {
                self.categories.push(info);
            }
        }
        let passes = plugin.passes();
        tracing::debug!(plugin = plugin.name(), passes = passes.len(), "registered lint plugin");
        self.passes.extend(passes);
    }

    pub fn with_plugin(mut self, plugin: &dyn LintPlugin) -> Self {
        self.register_plugin(plugin);
        self
    }

    pub fn passes(&self) -> &[PassEntry] {
        &self.passes
    }

    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    /// A configuration that knows every category of this registry.
    pub fn default_config(&self) -> AnalysisConfig {
        let mut config = AnalysisConfig::new();
        for info in &self.categories {
            config.register_category(info);
        }
        config
    }
}
