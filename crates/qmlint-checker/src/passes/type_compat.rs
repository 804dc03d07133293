//! Bindings checked against the properties they target: existence,
//! writability and the type of literal and object values.

use crate::context::{PassContext, PropertyInfo};
use indexmap::IndexMap;
use qmlint_binder::{BindingKind, BindingRecord, Literal, ScopeFlags, ScopeId, StaticType};
use qmlint_common::{Diagnostic, FixSuggestion, Span, category, did_you_mean};
use qmlint_resolver::{AccessSemantics, TypeId};

const COMPONENT_TYPE: &str = "QQmlComponent";
const INTEGRAL_TYPES: &[&str] = &["int", "uint"];
const NUMERIC_TYPES: &[&str] = &["int", "uint", "double", "float", "qreal"];
/// Value types that accept any string representation.
const STRING_TYPES: &[&str] = &["QString", "QUrl", "QColor", "QDateTime", "QByteArray"];

pub fn check(ctx: &PassContext<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut default_children: IndexMap<ScopeId, Vec<ScopeId>> = IndexMap::new();

    for binding in &ctx.tree.bindings {
        let Some(name) = &binding.name else {
            if let BindingKind::Object(child) = binding.value {
                default_children.entry(binding.scope).or_default().push(child);
            }
            continue;
        };
        if matches!(binding.value, BindingKind::Handler | BindingKind::Group(_)) {
            continue;
        }
        let Some(property) = ctx.binding_property(binding.scope, name) else {
            if ctx.scope_is_complete(binding.scope) {
                diagnostics.push(missing_property(ctx, binding, name));
            }
            continue;
        };
        check_binding(ctx, binding, &property, &mut diagnostics);
    }

    for (parent, children) in &default_children {
        check_default_property(ctx, *parent, children, &mut diagnostics);
    }
    diagnostics
}

fn missing_property(ctx: &PassContext<'_>, binding: &BindingRecord, name: &str) -> Diagnostic {
    let node = ctx.tree.get(binding.scope);
    let mut candidates: Vec<&str> = node.properties.keys().map(String::as_str).collect();
    if let StaticType::Known(ty) = node.ty {
        candidates.extend(ctx.registry.property_names(ty));
    }
    let diagnostic = Diagnostic::new(
        category::MISSING_PROPERTY,
        binding.name_span,
        format!("Could not find property \"{name}\"."),
    );
    match did_you_mean(name, candidates) {
        Some(suggestion) => diagnostic.with_fix(FixSuggestion::new(
            format!("Did you mean \"{suggestion}\"?"),
            binding.name_span,
            suggestion,
        )),
        None => diagnostic,
    }
}

fn check_binding(ctx: &PassContext<'_>, binding: &BindingRecord, property: &PropertyInfo, out: &mut Vec<Diagnostic>) {
    if property.is_readonly
        && !property.is_list
        && !binding.is_declaration
        && !matches!(binding.value, BindingKind::Interceptor(_))
    {
        out.push(Diagnostic::new(
            category::READ_ONLY_PROPERTY,
            binding.name_span,
            format!("Cannot assign to read-only property {}", property.name),
        ));
        return;
    }
    let Some(target) = property.ty else {
        return;
    };
    match &binding.value {
        // A single value bound to a list property is its only element.
        BindingKind::Literal(literal) => {
            if let Some(diagnostic) = check_literal(ctx, binding.value_span, literal, target) {
                out.push(diagnostic);
            }
        }
        BindingKind::Array(elements) if property.is_list => {
            out.extend(
                elements
                    .iter()
                    .filter_map(|(literal, span)| check_literal(ctx, *span, literal, target)),
            );
        }
        BindingKind::Object(child) => {
            if let Some(diagnostic) = check_object(ctx, *child, target) {
                out.push(diagnostic);
            }
        }
        BindingKind::ObjectList(children) => {
            if !property.is_list && children.len() > 1 {
                out.push(Diagnostic::new(
                    category::NON_LIST_PROPERTY,
                    binding.value_span,
                    format!("Cannot assign multiple objects to non-list property \"{}\"", property.name),
                ));
            }
            out.extend(children.iter().filter_map(|child| check_object(ctx, *child, target)));
        }
        _ => {}
    }
}

// =============================================================================
// Literals
// =============================================================================

enum LiteralFit {
    Ok,
    Converted,
    Incompatible,
}

fn check_literal(ctx: &PassContext<'_>, span: Span, literal: &Literal, target: TypeId) -> Option<Diagnostic> {
    let registry = ctx.registry;
    if registry.is_variant(target) {
        return None;
    }
    let descriptor = registry.get(target);
    let internal = descriptor.internal_name.as_str();
    let is_reference = descriptor.access == AccessSemantics::Reference;
    let known_value = NUMERIC_TYPES.contains(&internal) || STRING_TYPES.contains(&internal) || internal == "bool";

    let fit = match literal {
        Literal::Null | Literal::Undefined => {
            if is_reference || !known_value {
                LiteralFit::Ok
            } else {
                LiteralFit::Incompatible
            }
        }
        Literal::String { value, .. } => {
            if STRING_TYPES.contains(&internal) {
                LiteralFit::Ok
            } else if NUMERIC_TYPES.contains(&internal) {
                match value.trim().parse::<f64>() {
                    Ok(number) if !INTEGRAL_TYPES.contains(&internal) || number.fract() == 0.0 => LiteralFit::Converted,
                    _ => LiteralFit::Incompatible,
                }
            } else if internal == "bool" {
                if matches!(value.as_str(), "true" | "false") {
                    LiteralFit::Converted
                } else {
                    LiteralFit::Incompatible
                }
            } else if is_reference {
                LiteralFit::Incompatible
            } else {
                LiteralFit::Ok
            }
        }
        Literal::Number(number) => {
            if INTEGRAL_TYPES.contains(&internal) {
                if number.fract() == 0.0 {
                    LiteralFit::Ok
                } else {
                    LiteralFit::Incompatible
                }
            } else if NUMERIC_TYPES.contains(&internal) {
                LiteralFit::Ok
            } else if is_reference || known_value {
                LiteralFit::Incompatible
            } else {
                LiteralFit::Ok
            }
        }
        Literal::Bool(_) => {
            if internal == "bool" {
                LiteralFit::Ok
            } else if is_reference || known_value {
                LiteralFit::Incompatible
            } else {
                LiteralFit::Ok
            }
        }
    };

    let target_name = registry.name(target);
    match fit {
        LiteralFit::Ok => None,
        LiteralFit::Converted => Some(Diagnostic::new(
            category::LITERAL_CONVERSION,
            span,
            format!("Implicit conversion of string literal to {target_name}"),
        )),
        LiteralFit::Incompatible => Some(Diagnostic::new(
            category::INCOMPATIBLE_TYPE,
            span,
            format!(
                "Cannot assign literal of type {} to {target_name}",
                literal.type_name()
            ),
        )),
    }
}

// =============================================================================
// Objects
// =============================================================================

fn check_object(ctx: &PassContext<'_>, child: ScopeId, target: TypeId) -> Option<Diagnostic> {
    let registry = ctx.registry;
    let node = ctx.tree.get(child);
    let source = node.ty.known()?;
    if !registry.is_complete(source)
        || !registry.is_complete(target)
        || registry.inherits_internal(target, COMPONENT_TYPE)
        || registry.can_assign(target, source)
    {
        return None;
    }
    Some(Diagnostic::new(
        category::INCOMPATIBLE_TYPE,
        node.type_span,
        format!(
            "Cannot assign object of type {} to {}",
            node.display_type(),
            registry.name(target)
        ),
    ))
}

/// The default property objects without a property name are assigned to.
fn default_property(ctx: &PassContext<'_>, parent: ScopeId) -> Option<(Option<TypeId>, bool)> {
    let tree = ctx.tree;
    let node = tree.get(parent);
    if let Some(root) = node.inline_of.as_ref().and_then(|n| tree.inline_components.get(n))
        && let Some(declared) = tree.get(*root).properties.values().find(|p| p.is_default)
    {
        return Some((declared.ty, declared.is_list));
    }
    let ty = node.ty.known()?;
    let (_, property) = ctx.registry.default_property(ty)?;
    Some((ctx.registry.property_type(property), property.is_list))
}

fn check_default_property(ctx: &PassContext<'_>, parent: ScopeId, children: &[ScopeId], out: &mut Vec<Diagnostic>) {
    let registry = ctx.registry;
    let node = ctx.tree.get(parent);
    if node.flags.contains(ScopeFlags::CUSTOM_PARSER) || !ctx.scope_is_complete(parent) {
        return;
    }
    let Some(parent_type) = node.ty.known() else {
        return;
    };
    let Some(&first) = children.first() else {
        return;
    };
    let first_span = ctx.tree.get(first).type_span;

    let Some((element_type, is_list)) = default_property(ctx, parent) else {
        if !registry.inherits_internal(parent_type, COMPONENT_TYPE) {
            out.push(Diagnostic::new(
                category::MISSING_PROPERTY,
                first_span,
                "Cannot assign to non-existent default property",
            ));
        }
        return;
    };
    if children.len() > 1 && !is_list {
        out.push(Diagnostic::new(
            category::NON_LIST_PROPERTY,
            first_span,
            "Cannot assign multiple objects to a default non-list property",
        ));
    }
    let Some(element_type) = element_type else {
        return;
    };
    if !registry.is_complete(element_type) || registry.inherits_internal(element_type, COMPONENT_TYPE) {
        return;
    }
    for child in children {
        let child_node = ctx.tree.get(*child);
        let Some(source) = child_node.ty.known() else {
            continue;
        };
        if registry.is_complete(source) && !registry.can_assign(element_type, source) {
            out.push(Diagnostic::new(
                category::INCOMPATIBLE_TYPE,
                child_node.type_span,
                "Cannot assign to default property of incompatible type",
            ));
        }
    }
}
