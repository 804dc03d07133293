//! `Type on property { }` objects: interceptors such as `Behavior` and value
//! sources such as animations. A property takes at most one of each, and a
//! value source cannot be combined with an object or literal binding.

use crate::context::PassContext;
use qmlint_binder::{BindingKind, ScopeId};
use qmlint_common::{Diagnostic, Span, category};
use rustc_hash::FxHashSet;

const INTERCEPTOR: &str = "QQmlPropertyValueInterceptor";
const VALUE_SOURCE: &str = "QQmlPropertyValueSource";

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let registry = ctx.registry;
    let mut diagnostics = Vec::new();

    let literals: FxHashSet<(ScopeId, &str)> = ctx
        .tree
        .bindings
        .iter()
        .filter(|b| matches!(b.value, BindingKind::Literal(_)))
        .filter_map(|b| Some((b.scope, b.name.as_deref()?)))
        .collect();
    let mut interceptors = FxHashSet::default();
    let mut value_sources = FxHashSet::default();
    let mut objects = FxHashSet::default();

    for binding in &ctx.tree.bindings {
        let Some(name) = binding.name.as_deref() else {
            continue;
        };
        let key = (binding.scope, name);
        match binding.value {
            BindingKind::Interceptor(object) => {
                let node = ctx.tree.get(object);
                let Some(ty) = node.ty.known() else {
                    continue;
                };
                if registry.has_interface(ty, INTERCEPTOR) {
                    if !interceptors.insert(key) {
                        diagnostics.push(duplicate(
                            node.type_span,
                            format!("Duplicate interceptor on property \"{name}\""),
                        ));
                    }
                } else if registry.has_interface(ty, VALUE_SOURCE) {
                    if value_sources.contains(&key) {
                        diagnostics.push(duplicate(
                            node.type_span,
                            format!("Duplicate value source on property \"{name}\""),
                        ));
                    } else if objects.contains(&key) || literals.contains(&key) {
                        diagnostics.push(duplicate(
                            node.type_span,
                            format!("Cannot combine value source and binding on property \"{name}\""),
                        ));
                    } else {
                        value_sources.insert(key);
                    }
                } else if registry.is_complete(ty) {
                    diagnostics.push(Diagnostic::new(
                        category::INCOMPATIBLE_TYPE,
                        node.type_span,
                        format!(
                            "On-binding for property \"{name}\" has wrong type \"{}\"",
                            node.display_type()
                        ),
                    ));
                }
            }
            BindingKind::Object(object) => {
                if value_sources.contains(&key) {
                    diagnostics.push(duplicate(
                        ctx.tree.get(object).type_span,
                        format!("Cannot combine value source and binding on property \"{name}\""),
                    ));
                } else {
                    objects.insert(key);
                }
            }
            _ => {}
        }
    }
    diagnostics
}

fn duplicate(span: Span, message: String) -> Diagnostic {
    Diagnostic::new(category::DUPLICATE_PROPERTY_BINDING, span, message)
}
