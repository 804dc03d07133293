//! Attached types read from a script when an enclosing object already
//! carries an attached object of the same type. Each object gets its own
//! attached instance, so the read creates a new one instead of sharing the
//! parent's.

use crate::context::{PassContext, Resolution};
use qmlint_binder::{ScopeId, ScopeKind};
use qmlint_common::{Diagnostic, FixSuggestion, category};
use qmlint_resolver::TypeId;
use rustc_hash::FxHashSet;

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let tree = ctx.tree;
    let registry = ctx.registry;

    // (object, attached type) pairs initialized by attached bindings.
    let initialized: FxHashSet<(ScopeId, TypeId)> = tree
        .iter()
        .filter(|(_, node)| node.kind == ScopeKind::AttachedProperty)
        .filter_map(|(id, node)| {
            let owner = tree.nearest_object(tree.parent(id)?);
            Some((owner, node.ty.known()?))
        })
        .collect();
    if initialized.is_empty() {
        return Vec::new();
    }

    let mut diagnostics = Vec::new();
    for reference in &tree.references {
        let Some((first, _)) = reference.members.first() else {
            continue;
        };
        let Resolution::Type(ty) = ctx.resolve_name(reference.scope, &reference.name) else {
            continue;
        };
        if registry.find_enum(ty, first).is_some()
            || registry.find_enum_key(ty, first).is_some()
            || registry.get(ty).singleton
        {
            continue;
        }
        let Some(attached) = registry.attached_type(ty) else {
            continue;
        };

        let start = tree.nearest_object(reference.scope);
        let owner = std::iter::successors(Some(start), |current| {
            let parent = tree.nearest_object(tree.parent(*current)?);
            (parent != *current).then_some(parent)
        })
        .skip(1)
        .find(|object| initialized.contains(&(*object, attached)));
        let Some(owner) = owner else {
            continue;
        };

        let mut diagnostic = Diagnostic::new(
            category::ATTACHED_PROPERTY_REUSE,
            reference.span,
            format!(
                "Using attached type {} already initialized in a parent scope.",
                ctx.type_name(ty)
            ),
        );
        let node = tree.get(owner);
        if let Some(id) = &node.id
            && node.region == tree.get(start).region
        {
            diagnostic = diagnostic.with_fix(
                FixSuggestion::insertion("Reference it by id instead:", reference.span.start, format!("{id}."))
                    .auto_applicable(),
            );
        }
        diagnostics.push(diagnostic);
    }
    diagnostics
}
