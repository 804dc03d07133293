//! Type descriptors held by the module cache.
//!
//! Descriptors live in one arena per session and refer to each other by
//! [`TypeId`]. Names that could not be resolved when a descriptor was
//! created keep their textual form so later loads can link them.

use indexmap::IndexMap;
use qmlint_parser::ast::Version;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How values of a type are passed around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessSemantics {
    #[default]
    Reference,
    Value,
    Sequence,
    None,
}

impl AccessSemantics {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "reference" => Some(AccessSemantics::Reference),
            "value" => Some(AccessSemantics::Value),
            "sequence" => Some(AccessSemantics::Sequence),
            "none" => Some(AccessSemantics::None),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deprecation {
    pub reason: Option<String>,
}

impl Deprecation {
    /// ` (Reason: r)` or the empty string.
    pub fn reason_suffix(&self) -> String {
        match &self.reason {
            Some(reason) if !reason.is_empty() => format!(" (Reason: {reason})"),
            _ => String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    /// Internal name for C++ types, written name for QML declarations.
    pub type_name: String,
    pub type_id: Option<TypeId>,
    pub is_list: bool,
    pub is_readonly: bool,
    pub is_required: bool,
    pub notify: Option<String>,
    pub bindable: Option<String>,
    pub is_alias: bool,
    pub deprecation: Option<Deprecation>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        PropertyDescriptor {
            name: name.into(),
            type_name: type_name.into(),
            type_id: None,
            is_list: false,
            is_readonly: false,
            is_required: false,
            notify: None,
            bindable: None,
            is_alias: false,
            deprecation: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Signal,
    Method,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDescriptor {
    pub name: String,
    pub kind: MethodKind,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: String,
    pub keys: Vec<String>,
    pub scoped: bool,
    /// Declared in a QML document rather than a type descriptor file.
    pub from_qml: bool,
}

/// A name a type is exported under, e.g. `QtQuick/Item 2.0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub module: String,
    pub name: String,
    pub version: Option<Version>,
}

impl Export {
    /// Parse `"Module/Name 2.0"`.
    pub fn parse(text: &str) -> Option<Export> {
        let (path, version) = match text.split_once(' ') {
            Some((path, version)) => (path, Version::parse(version)),
            None => (text, None),
        };
        let (module, name) = path.rsplit_once('/')?;
        Some(Export {
            module: module.to_string(),
            name: name.to_string(),
            version,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeDescriptor {
    pub internal_name: String,
    pub exports: Vec<Export>,
    pub module: Option<ModuleId>,
    /// Source file of a composite type.
    pub file: Option<PathBuf>,
    pub base_name: Option<String>,
    pub base: Option<TypeId>,
    pub properties: IndexMap<String, PropertyDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub enums: IndexMap<String, EnumDescriptor>,
    pub attached_type_name: Option<String>,
    pub attached_type: Option<TypeId>,
    pub default_property: Option<String>,
    pub creatable: bool,
    pub singleton: bool,
    pub has_custom_parser: bool,
    /// C++ interfaces, e.g. `QQmlPropertyValueSource`.
    pub interfaces: Vec<String>,
    pub access: AccessSemantics,
    pub composite: bool,
    pub deprecation: Option<Deprecation>,
    /// `component Name: Base {}` declared at the root of a composite.
    pub inline_components: IndexMap<String, TypeId>,
}

impl TypeDescriptor {
    pub fn new(internal_name: impl Into<String>) -> Self {
        TypeDescriptor {
            internal_name: internal_name.into(),
            exports: Vec::new(),
            module: None,
            file: None,
            base_name: None,
            base: None,
            properties: IndexMap::new(),
            methods: Vec::new(),
            enums: IndexMap::new(),
            attached_type_name: None,
            attached_type: None,
            default_property: None,
            creatable: true,
            singleton: false,
            has_custom_parser: false,
            interfaces: Vec::new(),
            access: AccessSemantics::Reference,
            composite: false,
            deprecation: None,
            inline_components: IndexMap::new(),
        }
    }

    /// The name users write: the first export, else the internal name.
    pub fn display_name(&self) -> &str {
        self.exports
            .first()
            .map(|e| e.name.as_str())
            .unwrap_or(&self.internal_name)
    }

    pub fn own_method(&self, name: &str, kind: MethodKind) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name && m.kind == kind)
    }
}

/// Where a module was loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleKind {
    /// A directory with a `qmldir` file found by URI.
    Qmldir,
    /// A plain directory, imported by path or implicitly.
    Directory,
    /// Standalone `.qmltypes` files given on the command line.
    TypeFiles,
    /// A JavaScript resource imported under a namespace.
    Script,
}

/// A message produced while loading a module; replayed at every direct
/// import of that module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadMessage {
    pub category: qmlint_common::Category,
    pub severity: Option<qmlint_common::Severity>,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct Module {
    pub id: ModuleId,
    pub uri: Option<String>,
    pub kind: ModuleKind,
    /// Display form of the directory or overlay path.
    pub location: String,
    /// Exported name to type, in declaration order.
    pub exports: IndexMap<String, TypeId>,
    /// Types only visible to documents inside the module directory:
    /// `internal` entries and files the qmldir does not list.
    pub internal: IndexMap<String, TypeId>,
    /// Modules whose exports are re-exported by this one.
    pub reexports: Vec<ModuleId>,
    /// Modules loaded for this one but not visible through it.
    pub dependencies: Vec<ModuleId>,
    /// File stems of the composites listed in the qmldir.
    pub listed_files: Vec<String>,
    /// File stems of composites declared as singletons.
    pub singletons: Vec<String>,
    pub messages: Vec<LoadMessage>,
}
