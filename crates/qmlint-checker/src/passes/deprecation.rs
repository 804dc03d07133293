//! Uses of types and members marked `@Deprecated`.

use crate::context::{Member, PassContext, Resolution, Target};
use qmlint_binder::{BindingKind, JsReference, ScopeKind};
use qmlint_common::{Diagnostic, Span, category};

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let registry = ctx.registry;

    for (_, node) in ctx.tree.iter() {
        if !node.kind.is_object() {
            continue;
        }
        let Some(ty) = node.ty.known() else {
            continue;
        };
        let deprecated = registry
            .base_chain(ty)
            .into_iter()
            .find_map(|t| registry.get(t).deprecation.as_ref().map(|d| (t, d)));
        if let Some((t, deprecation)) = deprecated {
            diagnostics.push(Diagnostic::new(
                category::DEPRECATED,
                node.type_span,
                format!(
                    "Type \"{}\" is deprecated{}",
                    ctx.type_name(t),
                    deprecation.reason_suffix()
                ),
            ));
        }
    }

    for binding in &ctx.tree.bindings {
        if binding.is_declaration || matches!(binding.value, BindingKind::Handler) {
            continue;
        }
        let Some(name) = &binding.name else {
            continue;
        };
        if ctx.tree.get(binding.scope).kind == ScopeKind::Function {
            continue;
        }
        if let Some(deprecation) = ctx
            .binding_property(binding.scope, name)
            .and_then(|p| p.deprecation)
        {
            diagnostics.push(Diagnostic::new(
                category::DEPRECATED,
                binding.name_span,
                format!(
                    "Binding on deprecated property \"{name}\"{}",
                    deprecation.reason_suffix()
                ),
            ));
        }
    }

    for reference in &ctx.tree.references {
        check_reference(ctx, reference, &mut diagnostics);
    }
    diagnostics
}

fn check_reference(ctx: &PassContext<'_>, reference: &JsReference, out: &mut Vec<Diagnostic>) {
    let mut target = match ctx.resolve_name(reference.scope, &reference.name) {
        Resolution::Id { scope, .. } => Some(Target::Scope(scope)),
        Resolution::Member { object, .. } => {
            let Some(member) = ctx.member(Target::Scope(object), &reference.name) else {
                return;
            };
            report_member(&member, &reference.name, reference.span, out);
            ctx.member_target(&member)
        }
        _ => None,
    };
    for (name, span) in &reference.members {
        let Some(current) = target else {
            return;
        };
        let Some(member) = ctx.member(current, name) else {
            return;
        };
        report_member(&member, name, *span, out);
        target = ctx.member_target(&member);
    }
}

fn report_member(member: &Member<'_>, name: &str, span: Span, out: &mut Vec<Diagnostic>) {
    let Some(deprecation) = member.deprecation() else {
        return;
    };
    let kind = if member.is_property() {
        "Property"
    } else if member.is_method() {
        "Method"
    } else {
        return;
    };
    out.push(Diagnostic::new(
        category::DEPRECATED,
        span,
        format!("{kind} \"{name}\" is deprecated{}", deprecation.reason_suffix()),
    ));
}
