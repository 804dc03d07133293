use crate::context::PassContext;
use qmlint_binder::{ScopeFlags, ScopeKind};
use qmlint_common::{Diagnostic, category};

const COMPONENT_TYPE: &str = "QQmlComponent";

/// Objects of types that cannot be instantiated from QML.
pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let registry = ctx.registry;
    let mut diagnostics = Vec::new();
    for (_, node) in ctx.tree.iter() {
        if node.kind != ScopeKind::Object {
            continue;
        }
        let Some(ty) = node.ty.known() else {
            continue;
        };
        let descriptor = registry.get(ty);
        let message = if node.flags.contains(ScopeFlags::DOCUMENT_ROOT)
            && descriptor.internal_name == COMPONENT_TYPE
        {
            "Qml top level type cannot be 'Component'.".to_string()
        } else if descriptor.singleton {
            format!("Singleton Type {} is not creatable.", node.display_type())
        } else if !descriptor.creatable {
            format!("Type {} is not creatable.", node.display_type())
        } else {
            continue;
        };
        diagnostics.push(Diagnostic::new(category::UNCREATABLE_TYPE, node.type_span, message));
    }
    diagnostics
}
