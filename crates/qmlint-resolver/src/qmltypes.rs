//! Reader for `.qmltypes` type descriptor files.
//!
//! A descriptor file is a QML document whose root is `Module { }` holding
//! `Component { }` blocks:
//!
//! ```text
//! Module {
//!     Component {
//!         name: "QQuickItem"
//!         prototype: "QObject"
//!         exports: ["QtQuick/Item 2.0"]
//!         Property { name: "width"; type: "double" }
//!     }
//! }
//! ```

use crate::types::{
    AccessSemantics, EnumDescriptor, Export, MethodDescriptor, MethodKind, Parameter,
    PropertyDescriptor, TypeDescriptor,
};
use qmlint_parser::ast::{Binding, ObjectDefinition};
use qmlint_parser::js::{Expr, ExprKind, PropertyKey};

/// The contents of one descriptor file.
#[derive(Debug, Default)]
pub struct TypeFile {
    pub components: Vec<TypeDescriptor>,
    /// `dependencies:` entries, a deprecated way of declaring imports.
    pub dependencies: Vec<String>,
}

fn binding_expr<'a>(object: &'a ObjectDefinition, name: &str) -> Option<&'a Expr> {
    object.binding(name).and_then(|b: &Binding| b.value.as_expression())
}

fn string_of(expr: &Expr) -> Option<String> {
    match &expr.kind {
        ExprKind::String(s) => Some(s.value.clone()),
        _ => None,
    }
}

fn string_binding(object: &ObjectDefinition, name: &str) -> Option<String> {
    binding_expr(object, name).and_then(string_of)
}

fn bool_binding(object: &ObjectDefinition, name: &str) -> Option<bool> {
    binding_expr(object, name).and_then(|e| match e.kind {
        ExprKind::Bool(value) => Some(value),
        _ => None,
    })
}

fn string_list_binding(object: &ObjectDefinition, name: &str) -> Vec<String> {
    match binding_expr(object, name).map(|e| &e.kind) {
        Some(ExprKind::Array(items)) => items.iter().filter_map(string_of).collect(),
        Some(ExprKind::String(s)) => vec![s.value.clone()],
        _ => Vec::new(),
    }
}

/// Enum values are either `["A", "B"]` or the older `{ "A": 0, "B": 1 }`.
fn enum_values(object: &ObjectDefinition) -> Vec<String> {
    match binding_expr(object, "values").map(|e| &e.kind) {
        Some(ExprKind::Object(properties)) => properties
            .iter()
            .filter_map(|p| match &p.key {
                PropertyKey::String(key, _) => Some(key.clone()),
                PropertyKey::Identifier(ident) => Some(ident.name.clone()),
                _ => None,
            })
            .collect(),
        _ => string_list_binding(object, "values"),
    }
}

/// Read a parsed descriptor file. Unknown blocks and bindings are ignored.
pub fn read_type_file(root: &ObjectDefinition) -> TypeFile {
    let mut file = TypeFile {
        dependencies: string_list_binding(root, "dependencies"),
        ..TypeFile::default()
    };
    for object in root.child_objects() {
        if object.type_name.text() == "Component" {
            if let Some(component) = read_component(object) {
                file.components.push(component);
            }
        }
    }
    file
}

fn read_component(object: &ObjectDefinition) -> Option<TypeDescriptor> {
    let name = string_binding(object, "name")?;
    let mut descriptor = TypeDescriptor::new(name);
    descriptor.base_name = string_binding(object, "prototype");
    descriptor.exports = string_list_binding(object, "exports")
        .iter()
        .filter_map(|e| Export::parse(e))
        .collect();
    descriptor.attached_type_name = string_binding(object, "attachedType");
    descriptor.default_property = string_binding(object, "defaultProperty");
    descriptor.creatable = bool_binding(object, "isCreatable").unwrap_or(true);
    descriptor.singleton = bool_binding(object, "isSingleton").unwrap_or(false);
    descriptor.has_custom_parser = bool_binding(object, "hasCustomParser").unwrap_or(false);
    descriptor.interfaces = string_list_binding(object, "interfaces");
    if let Some(access) = string_binding(object, "accessSemantics").as_deref() {
        descriptor.access = AccessSemantics::parse(access).unwrap_or_default();
    }
    if descriptor.access == AccessSemantics::Value {
        descriptor.creatable = false;
    }

    for child in object.child_objects() {
        match child.type_name.text().as_str() {
            "Property" => {
                if let Some(property) = read_property(child) {
                    descriptor.properties.insert(property.name.clone(), property);
                }
            }
            "Signal" => descriptor.methods.extend(read_method(child, MethodKind::Signal)),
            "Method" => descriptor.methods.extend(read_method(child, MethodKind::Method)),
            "Enum" => {
                if let Some(name) = string_binding(child, "name") {
                    let scoped = bool_binding(child, "isScoped").unwrap_or(false);
                    descriptor.enums.insert(
                        name.clone(),
                        EnumDescriptor {
                            name,
                            keys: enum_values(child),
                            scoped,
                            from_qml: false,
                        },
                    );
                }
            }
            _ => {}
        }
    }
    Some(descriptor)
}

fn read_property(object: &ObjectDefinition) -> Option<PropertyDescriptor> {
    let name = string_binding(object, "name")?;
    let type_name = string_binding(object, "type").unwrap_or_else(|| "QVariant".to_string());
    let mut property = PropertyDescriptor::new(name, type_name);
    property.is_list = bool_binding(object, "isList").unwrap_or(false);
    property.is_readonly = bool_binding(object, "isReadonly").unwrap_or(false);
    property.is_required = bool_binding(object, "isRequired").unwrap_or(false);
    property.notify = string_binding(object, "notify");
    property.bindable = string_binding(object, "bindable");
    Some(property)
}

fn read_method(object: &ObjectDefinition, kind: MethodKind) -> Option<MethodDescriptor> {
    let name = string_binding(object, "name")?;
    let parameters = object
        .child_objects()
        .filter(|p| p.type_name.text() == "Parameter")
        .filter_map(|p| {
            Some(Parameter {
                name: string_binding(p, "name")?,
                type_name: string_binding(p, "type"),
            })
        })
        .collect();
    Some(MethodDescriptor {
        name,
        kind,
        parameters,
        return_type: string_binding(object, "type"),
        deprecation: None,
    })
}
