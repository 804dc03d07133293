//! Types named directly although only a dependency of an import provides
//! them.

use crate::context::PassContext;
use qmlint_common::{Diagnostic, category};

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    ctx.tree
        .type_references
        .iter()
        .filter(|reference| reference.invisible)
        .map(|reference| {
            Diagnostic::new(
                category::INVISIBLE_TYPE,
                reference.span,
                format!("Type \"{}\" is not visible from this document", reference.name),
            )
        })
        .collect()
}
