//! QML document AST.
//!
//! The tree is owned and span-annotated. JavaScript embedded in bindings
//! uses the types of [`crate::js`].

use crate::js::{Expr, ExprKind, Function, Stmt, StmtKind};
use qmlint_common::Span;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

/// A dotted name such as `QtQuick.Controls` or `anchors.fill`.
#[derive(Clone, Debug, PartialEq)]
pub struct QualifiedName {
    pub parts: Vec<Ident>,
    pub span: Span,
}

impl QualifiedName {
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&part.name);
        }
        out
    }

    pub fn first(&self) -> &Ident {
        &self.parts[0]
    }

    pub fn last(&self) -> &Ident {
        &self.parts[self.parts.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether the last part starts with an uppercase letter, which marks
    /// a type name rather than a property.
    pub fn names_type(&self) -> bool {
        self.parts
            .last()
            .and_then(|p| p.name.chars().next())
            .is_some_and(|c| c.is_uppercase())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: Option<u32>,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minor {
            Some(minor) => write!(f, "{}.{}", self.major, minor),
            None => write!(f, "{}", self.major),
        }
    }
}

impl Version {
    /// Parse `"2"`, `"2.15"`.
    pub fn parse(text: &str) -> Option<Version> {
        let mut parts = text.trim().splitn(2, '.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(m) if !m.is_empty() => Some(m.parse().ok()?),
            _ => None,
        };
        Some(Version { major, minor })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub pragmas: Vec<Pragma>,
    pub imports: Vec<Import>,
    pub root: ObjectDefinition,
    pub span: Span,
}

impl Document {
    pub fn pragma(&self, name: &str) -> Option<&Pragma> {
        self.pragmas.iter().find(|p| p.name.name == name)
    }
}

/// `pragma Singleton`, `pragma ComponentBehavior: Bound`
#[derive(Clone, Debug, PartialEq)]
pub struct Pragma {
    pub name: Ident,
    pub values: Vec<Ident>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImportTarget {
    Module(QualifiedName),
    Path { path: String, span: Span },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    pub target: ImportTarget,
    pub version: Option<Version>,
    pub qualifier: Option<Ident>,
    pub span: Span,
}

impl Import {
    /// Module URI or path, as written.
    pub fn target_text(&self) -> String {
        match &self.target {
            ImportTarget::Module(name) => name.text(),
            ImportTarget::Path { path, .. } => path.clone(),
        }
    }
}

/// `@Deprecated { reason: "..." }`
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub name: QualifiedName,
    pub bindings: Vec<Binding>,
    pub span: Span,
}

impl Annotation {
    /// String value of the binding `name`, if it is a string literal.
    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.name.text() == name)
            .and_then(|b| b.value.as_expression())
            .and_then(|e| match &e.kind {
                ExprKind::String(s) => Some(s.value.as_str()),
                _ => None,
            })
    }
}

/// Reason of a `@Deprecated` annotation: `None` when not deprecated,
/// `Some(None)` when deprecated without a reason.
pub fn deprecation(annotations: &[Annotation]) -> Option<Option<String>> {
    annotations
        .iter()
        .find(|a| a.name.text() == "Deprecated")
        .map(|a| a.string_value("reason").map(str::to_string))
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDefinition {
    pub type_name: QualifiedName,
    /// `Behavior on width { }`
    pub on_target: Option<QualifiedName>,
    pub members: Vec<ObjectMember>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl ObjectDefinition {
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.members.iter().filter_map(|m| match m {
            ObjectMember::Binding(b) => Some(b),
            _ => None,
        })
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings().find(|b| b.name.len() == 1 && b.name.first().name == name)
    }

    pub fn child_objects(&self) -> impl Iterator<Item = &ObjectDefinition> {
        self.members.iter().filter_map(|m| match m {
            ObjectMember::Object(o) => Some(o),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObjectMember {
    Object(ObjectDefinition),
    Binding(Binding),
    Property(PropertyDeclaration),
    Signal(SignalDeclaration),
    Method(MethodDeclaration),
    Enum(EnumDeclaration),
    InlineComponent(InlineComponent),
    /// `required someProperty`
    Required(Ident),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: QualifiedName,
    pub value: BindingValue,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BindingValue {
    Script(Box<Stmt>),
    Object(Box<ObjectDefinition>),
    ObjectList {
        objects: Vec<ObjectDefinition>,
        span: Span,
    },
    /// `font { pixelSize: 12 }`
    Group {
        members: Vec<ObjectMember>,
        span: Span,
    },
}

impl BindingValue {
    pub fn span(&self) -> Span {
        match self {
            BindingValue::Script(stmt) => stmt.span,
            BindingValue::Object(obj) => obj.span,
            BindingValue::ObjectList { span, .. } | BindingValue::Group { span, .. } => *span,
        }
    }

    /// The expression of a script binding that is a single expression
    /// statement.
    pub fn as_expression(&self) -> Option<&Expr> {
        match self {
            BindingValue::Script(stmt) => match &stmt.kind {
                StmtKind::Expr(expr) => Some(expr),
                _ => None,
            },
            _ => None,
        }
    }
}

/// `Type`, `list<Type>` or a dotted `Module.Type`.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeAnnotation {
    pub name: QualifiedName,
    pub is_list: bool,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn text(&self) -> String {
        if self.is_list {
            format!("list<{}>", self.name.text())
        } else {
            self.name.text()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDeclaration {
    pub name: Ident,
    pub type_annotation: TypeAnnotation,
    pub is_default: bool,
    pub is_required: bool,
    pub is_readonly: bool,
    pub value: Option<BindingValue>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl PropertyDeclaration {
    pub fn is_alias(&self) -> bool {
        !self.type_annotation.is_list && self.type_annotation.name.text() == "alias"
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignalParameter {
    pub name: Ident,
    pub type_annotation: Option<TypeAnnotation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignalDeclaration {
    pub name: Ident,
    pub parameters: Vec<SignalParameter>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDeclaration {
    pub function: Function,
    pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumKey {
    pub name: Ident,
    pub value: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDeclaration {
    pub name: Ident,
    pub keys: Vec<EnumKey>,
    pub span: Span,
}

/// `component Name: Base { }`
#[derive(Clone, Debug, PartialEq)]
pub struct InlineComponent {
    pub name: Ident,
    pub object: ObjectDefinition,
    pub span: Span,
}
