//! Imports none of whose types or namespace the document uses.

use crate::context::PassContext;
use qmlint_common::{Diagnostic, category};

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    ctx.imports()
        .imports
        .iter()
        .filter(|import| import.is_reportable() && !ctx.tree.used_imports.contains(&import.index))
        .map(|import| Diagnostic::new(category::UNUSED_IMPORTS, import.span, "Unused import"))
        .collect()
}
