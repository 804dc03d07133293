//! Unqualified access to names of outer scopes.

use crate::context::{PassContext, Resolution};
use qmlint_binder::{JsReference, ScopeId};
use qmlint_common::{Diagnostic, FixSuggestion, category, did_you_mean};

const BOUND_PRAGMA: &str = "pragma ComponentBehavior: Bound\n";

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for reference in &ctx.tree.references {
        let diagnostic = match ctx.resolve_name(reference.scope, &reference.name) {
            Resolution::Member {
                object,
                inherited: true,
            } => parent_member(ctx, reference, object),
            Resolution::Id { outer: true, .. } if !ctx.tree.bound_components => {
                Diagnostic::new(category::UNQUALIFIED, reference.span, "Unqualified access").with_fix(
                    FixSuggestion::insertion(
                        "Set \"pragma ComponentBehavior: Bound\" in order to use IDs from outer components in nested components.",
                        0,
                        BOUND_PRAGMA,
                    )
                    .auto_applicable(),
                )
            }
            Resolution::Injected => Diagnostic::new(
                category::UNQUALIFIED,
                reference.span,
                format!(
                    "{} is implicitly injected into this delegate. Add a required property instead.",
                    reference.name
                ),
            ),
            Resolution::Unknown { certain: true } => unknown_name(ctx, reference),
            _ => continue,
        };
        diagnostics.push(diagnostic);
    }
    diagnostics
}

/// A member of an enclosing object read without qualification.
fn parent_member(ctx: &PassContext<'_>, reference: &JsReference, object: ScopeId) -> Diagnostic {
    let Some(id) = &ctx.tree.get(object).id else {
        return Diagnostic::new(category::UNQUALIFIED, reference.span, "Unqualified access");
    };
    let message = format!(
        "{} is a member of a parent element. You can qualify the access with its id to avoid this warning.",
        reference.name
    );
    Diagnostic::new(category::UNQUALIFIED, reference.span, message.clone()).with_fix(
        FixSuggestion::insertion(message, reference.span.start, format!("{id}.")).auto_applicable(),
    )
}

fn unknown_name(ctx: &PassContext<'_>, reference: &JsReference) -> Diagnostic {
    let diagnostic = Diagnostic::new(category::UNQUALIFIED, reference.span, "Unqualified access");
    let mut candidates = ctx.visible_names(reference.scope);
    candidates.extend(ctx.imports().visible_names());
    match did_you_mean(&reference.name, candidates) {
        Some(suggestion) => diagnostic.with_fix(FixSuggestion::new(
            format!("Did you mean \"{suggestion}\"?"),
            reference.span,
            suggestion,
        )),
        None => diagnostic,
    }
}
