//! Member chains read from JavaScript: `id.prop.sub`, `Type.Enum.Key`,
//! `Namespace.Type`.

use crate::context::{PassContext, Resolution, Target};
use qmlint_binder::JsReference;
use qmlint_common::{Diagnostic, FixSuggestion, Span, category, did_you_mean};
use qmlint_resolver::TypeId;

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for reference in &ctx.tree.references {
        if reference.members.is_empty() {
            continue;
        }
        let members = &reference.members[..];
        match ctx.resolve_name(reference.scope, &reference.name) {
            Resolution::Id { scope, .. } => {
                walk(ctx, Target::Scope(scope), members, &mut diagnostics);
            }
            Resolution::Member { object, .. } => {
                let next = ctx
                    .member(Target::Scope(object), &reference.name)
                    .and_then(|m| ctx.member_target(&m));
                if let Some(next) = next {
                    walk(ctx, next, members, &mut diagnostics);
                }
            }
            Resolution::Type(ty) => type_head(ctx, ty, members, &mut diagnostics),
            Resolution::Namespace(qualifier) => {
                namespace_head(ctx, reference, &qualifier, &mut diagnostics);
            }
            _ => {}
        }
    }
    diagnostics
}

/// Follow `members` starting at `target`, reporting the first member that
/// does not exist.
fn walk(ctx: &PassContext<'_>, mut target: Target, members: &[(String, Span)], out: &mut Vec<Diagnostic>) {
    for (name, span) in members {
        match ctx.member(target, name) {
            Some(member) => match ctx.member_target(&member) {
                Some(next) => target = next,
                None => return,
            },
            None => {
                // `id.Keys.enabled` reads the attached object of `id`.
                if let Some(attached) = attached_type_named(ctx, name) {
                    target = Target::Type(attached);
                    continue;
                }
                if ctx.target_is_checkable(target) {
                    out.push(missing_member(ctx, target, name, *span));
                }
                return;
            }
        }
    }
}

fn attached_type_named(ctx: &PassContext<'_>, name: &str) -> Option<TypeId> {
    if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let found = ctx.imports().lookup_type(name)?;
    ctx.registry.attached_type(found.id)
}

fn missing_member(ctx: &PassContext<'_>, target: Target, name: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        category::MISSING_PROPERTY,
        span,
        format!(
            "Member \"{name}\" not found on type \"{}\"",
            ctx.target_name(target)
        ),
    )
}

/// `Type.member...`: enums, unscoped enum keys, singleton members and
/// attached properties.
fn type_head(ctx: &PassContext<'_>, ty: TypeId, members: &[(String, Span)], out: &mut Vec<Diagnostic>) {
    let registry = ctx.registry;
    let (first, first_span) = &members[0];

    if let Some(descriptor) = registry.find_enum(ty, first) {
        let Some((key, key_span)) = members.get(1) else {
            return;
        };
        if !descriptor.keys.iter().any(|k| k == key) {
            let mut diagnostic = Diagnostic::new(
                category::MISSING_ENUM_ENTRY,
                *key_span,
                format!("\"{key}\" is not an entry of enum \"{first}\"."),
            );
            if let Some(suggestion) = did_you_mean(key, descriptor.keys.iter().map(String::as_str)) {
                diagnostic = diagnostic.with_fix(FixSuggestion::new(
                    format!("Did you mean \"{suggestion}\"?"),
                    *key_span,
                    suggestion,
                ));
            }
            out.push(diagnostic);
        } else if !descriptor.scoped && !descriptor.from_qml {
            out.push(Diagnostic::new(
                category::MISSING_ENUM_ENTRY,
                first_span.merge(*key_span),
                format!("You cannot access unscoped enum \"{first}\" from here."),
            ));
        }
        return;
    }
    if registry.find_enum_key(ty, first).is_some() {
        return;
    }

    if registry.get(ty).singleton
        && let Some(member) = ctx.member(Target::Type(ty), first)
    {
        if let Some(next) = ctx.member_target(&member) {
            walk(ctx, next, &members[1..], out);
        }
        return;
    }

    if let Some(attached) = registry.attached_type(ty) {
        walk(ctx, Target::Type(attached), members, out);
        return;
    }

    if ctx.target_is_checkable(Target::Type(ty)) && ctx.member(Target::Type(ty), first).is_none() {
        out.push(missing_member(ctx, Target::Type(ty), first, *first_span));
    }
}

fn namespace_head(ctx: &PassContext<'_>, reference: &JsReference, qualifier: &str, out: &mut Vec<Diagnostic>) {
    let Some(namespace) = ctx.imports().lookup_namespace(qualifier) else {
        return;
    };
    if namespace.dynamic {
        return;
    }
    let (name, span) = &reference.members[0];
    match namespace.types.get(name) {
        Some(found) if reference.members.len() > 1 => {
            type_head(ctx, found.id, &reference.members[1..], out);
        }
        Some(_) => {}
        None => out.push(Diagnostic::new(category::MISSING_PROPERTY, *span, "Type not found in namespace")),
    }
}
