//! Scope building for QML documents.
//!
//! The binder walks a parsed document once and produces a [`ScopeTree`]:
//! one node per object, grouped/attached property scope and JavaScript
//! scope, the id table of every component region, and records of the
//! bindings, aliases, enums, identifier references and type references
//! the diagnostic passes inspect. Binding never fails; problems found on
//! the way are collected in [`ScopeTree::diagnostics`].
//!
//! The work is split across the `state_*` modules:
//! - `state_objects` - objects, regions, ids, groups and declarations
//! - `state_script` - JavaScript scopes and references
//! - `state_handlers` - signal handler matching

pub mod scope_tree;
mod state;
mod state_handlers;
mod state_objects;
mod state_script;

pub use scope_tree::{
    AliasRecord, AliasTarget, BindingKind, BindingRecord, ComponentRegion, DeclKind,
    DeclaredMethod, DeclaredProperty, DeclaredSignal, EnumRecord, IdEntry, JsDeclaration,
    JsReference, Literal, RegionId, ScopeFlags, ScopeId, ScopeKind, ScopeNode, ScopeTree,
    StaticType, TypeReference, TypeUse,
};
pub use state_objects::handler_signal_name;

use qmlint_parser::ast::Document;
use qmlint_resolver::{ImportScope, TypeRegistry};
use state::BinderState;

/// Build the scope tree of `document`. `source` is the text the document
/// was parsed from; `imports` is the result of resolving its imports.
pub fn bind(
    document: &Document,
    source: &str,
    imports: ImportScope,
    registry: &TypeRegistry<'_>,
) -> ScopeTree {
    let _span = tracing::debug_span!("bind", len = source.len()).entered();
    BinderState::new(source, imports, registry).bind_document(document)
}
