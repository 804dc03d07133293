//! Required properties left unbound where an object is instantiated.

use crate::context::PassContext;
use qmlint_binder::{ScopeFlags, ScopeId, ScopeKind, ScopeNode};
use qmlint_common::{Diagnostic, category};

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (id, node) in ctx.tree.iter() {
        if node.kind != ScopeKind::Object
            || !ctx.in_region(id)
            || node
                .flags
                .intersects(ScopeFlags::DOCUMENT_ROOT | ScopeFlags::WRAPPED | ScopeFlags::CUSTOM_PARSER)
        {
            continue;
        }
        for (name, origin) in required_of(ctx, node) {
            if ctx.tree.bindings_of(id).any(|b| b.name.as_deref() == Some(name)) {
                continue;
            }
            if is_set_through_alias(ctx, id, name) {
                continue;
            }
            diagnostics.push(Diagnostic::new(
                category::REQUIRED,
                node.type_span,
                format!("Component is missing required property {name} from {origin}"),
            ));
        }
    }
    diagnostics
}

/// Required property names of an object with where each is declared.
fn required_of<'a>(ctx: &PassContext<'a>, node: &'a ScopeNode) -> Vec<(&'a str, String)> {
    let tree = ctx.tree;
    let mut out: Vec<(&str, String)> = Vec::new();
    let mut push = |name: &'a str, origin: String| {
        if !out.iter().any(|(n, _)| *n == name) {
            out.push((name, origin));
        }
    };

    for property in node.properties.values().filter(|p| p.is_required) {
        push(property.name.as_str(), "here".to_string());
    }
    for name in &node.required {
        push(name.as_str(), "here".to_string());
    }
    if let Some(inline) = &node.inline_of
        && let Some(root) = tree.inline_components.get(inline)
    {
        let root = tree.get(*root);
        for property in root.properties.values().filter(|p| p.is_required) {
            push(property.name.as_str(), inline.clone());
        }
        for name in &root.required {
            push(name.as_str(), inline.clone());
        }
    }
    if let Some(ty) = node.ty.known() {
        for (owner, property) in ctx.registry.required_properties(ty) {
            push(property.name.as_str(), ctx.type_name(owner).to_string());
        }
    }
    out
}

/// Whether an alias of the document targets `name` on `scope`; the alias
/// then carries the requirement.
fn is_set_through_alias(ctx: &PassContext<'_>, scope: ScopeId, name: &str) -> bool {
    let tree = ctx.tree;
    let Some(id) = &tree.get(scope).id else {
        return false;
    };
    tree.aliases.iter().any(|alias| {
        alias.target.as_ref().is_some_and(|target| {
            &target.id == id && target.path.len() == 1 && target.path[0].0 == name
        })
    })
}
