//! Module, import and type resolution for the qmlint analyzer.
//!
//! - `search_path` - import directories and resource overlays
//! - `qmldir` / `qmltypes` - module and type descriptor files
//! - `cache` - the session-wide [`ModuleCache`] and import resolution
//! - `registry` - read access to type descriptors during analysis
//!
//! Built-in modules (`QML`, `QtQml`, `QtQuick`) are embedded and resolved
//! through in-memory overlays placed after the configured search path.

pub mod builtins;
pub mod cache;
pub mod error;
pub mod import_scope;
pub mod qmldir;
pub mod qmltypes;
pub mod registry;
pub mod search_path;
pub mod types;

pub use cache::{ModuleCache, ResolverOptions};
pub use error::ResolveError;
pub use import_scope::{ImportScope, Namespace, ResolvedImport, TypeRef};
pub use registry::{SignalRef, TypeRegistry};
pub use search_path::{Location, ResourceOverlay, SearchEntry};
pub use types::{
    AccessSemantics, Deprecation, EnumDescriptor, Export, MethodDescriptor, MethodKind, Module,
    ModuleId, ModuleKind, Parameter, PropertyDescriptor, TypeDescriptor, TypeId,
};

#[cfg(test)]
#[path = "../tests/qmldir_tests.rs"]
mod qmldir_tests;

#[cfg(test)]
#[path = "../tests/search_path_tests.rs"]
mod search_path_tests;

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod resolver_tests;
