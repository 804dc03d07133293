use crate::context::{PassContext, Resolution};
use qmlint_binder::DeclKind;
use qmlint_common::{Diagnostic, category};

/// Variables read before the statement declaring them. Functions and
/// parameters are hoisted and never reported.
pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for reference in &ctx.tree.references {
        let Resolution::Local(scope) = ctx.resolve_name(reference.scope, &reference.name) else {
            continue;
        };
        let Some(declaration) = ctx.tree.get(scope).identifiers.get(&reference.name) else {
            continue;
        };
        if !matches!(declaration.kind, DeclKind::Var | DeclKind::Lexical)
            || declaration.span.start < reference.span.end
        {
            continue;
        }
        diagnostics.push(
            Diagnostic::new(
                category::VAR_USED_BEFORE_DECLARATION,
                reference.span,
                format!(
                    "Variable \"{}\" is used here before its declaration. The declaration is at {}.",
                    reference.name,
                    ctx.display_position(declaration.span.start)
                ),
            )
            .with_note(declaration.span, format!("Note: declaration of '{}' here", reference.name)),
        );
    }
    diagnostics
}
