//! The names a document can see through its imports.

use crate::types::{ModuleId, TypeId};
use qmlint_common::{Diagnostic, Span};
use rustc_hash::FxHashMap;

/// One import of a document, implicit or written.
#[derive(Clone, Debug)]
pub struct ResolvedImport {
    /// Position in [`ImportScope::imports`].
    pub index: usize,
    /// Span of the import statement; empty for implicit imports.
    pub span: Span,
    /// `QtQuick 2.15`, `"dir"`, ...
    pub display: String,
    pub qualifier: Option<String>,
    pub module: Option<ModuleId>,
    pub failed: bool,
    pub implicit: bool,
    /// Loading or resolving this import produced diagnostics.
    pub has_warnings: bool,
    /// A JavaScript file imported under a namespace.
    pub is_script: bool,
}

impl ResolvedImport {
    /// Whether unused-import reporting applies.
    pub fn is_reportable(&self) -> bool {
        !self.implicit && !self.failed && !self.has_warnings
    }
}

/// A type visible under some name, with the import that provides it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeRef {
    pub id: TypeId,
    pub import: usize,
}

/// Types reachable through a qualifier (`import QtQuick as Q`).
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    pub types: FxHashMap<String, TypeRef>,
    /// Indices of the imports sharing this qualifier.
    pub imports: Vec<usize>,
    /// Members are only known at runtime (`import "x.js" as X`).
    pub dynamic: bool,
}

/// Result of resolving the imports of one document.
#[derive(Clone, Debug, Default)]
pub struct ImportScope {
    pub imports: Vec<ResolvedImport>,
    /// Unqualified names; later imports shadow earlier ones.
    pub types: FxHashMap<String, TypeRef>,
    pub namespaces: FxHashMap<String, Namespace>,
    /// Types loaded as dependencies of an import but not exported by it.
    pub hidden: FxHashMap<String, TypeId>,
    /// Import problems, already located at the offending import.
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportScope {
    pub fn lookup_type(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).copied()
    }

    pub fn lookup_namespace(&self, qualifier: &str) -> Option<&Namespace> {
        self.namespaces.get(qualifier)
    }

    pub fn lookup_qualified(&self, qualifier: &str, name: &str) -> Option<TypeRef> {
        self.namespaces
            .get(qualifier)
            .and_then(|ns| ns.types.get(name).copied())
    }

    /// Resolve `Name` or `Qualifier.Name`.
    pub fn lookup_dotted(&self, name: &str) -> Option<TypeRef> {
        match name.split_once('.') {
            Some((qualifier, rest)) if self.namespaces.contains_key(qualifier) => {
                self.lookup_qualified(qualifier, rest)
            }
            _ => self.lookup_type(name),
        }
    }

    /// A type that exists in the loaded modules but is not exported to this
    /// document.
    pub fn lookup_hidden(&self, name: &str) -> Option<TypeId> {
        self.hidden.get(name).copied()
    }

    /// Every unqualified type name and qualifier, for suggestions.
    pub fn visible_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .keys()
            .chain(self.namespaces.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn import(&self, index: usize) -> Option<&ResolvedImport> {
        self.imports.get(index)
    }
}
