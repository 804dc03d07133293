//! The Scope Tree of one document.
//!
//! Nodes live in an arena indexed by [`ScopeId`]; parents are plain indices
//! and children are owned lists, so the tree can be walked in both
//! directions without reference cycles.

use bitflags::bitflags;
use indexmap::IndexMap;
use qmlint_common::{Diagnostic, Span};
use qmlint_resolver::{Deprecation, ImportScope, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a component region: the id-scope of one component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(pub u32);

impl RegionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// A QML object.
    Object,
    /// `anchors.left:` / `font { }`
    GroupedProperty,
    /// `Keys.onPressed:`
    AttachedProperty,
    /// Root object of `component Name: Base { }`.
    InlineComponent,
    /// A function, arrow function, script binding or signal handler.
    Function,
    /// A JavaScript block.
    Block,
}

impl ScopeKind {
    pub fn is_js(self) -> bool {
        matches!(self, ScopeKind::Function | ScopeKind::Block)
    }

    pub fn is_object(self) -> bool {
        matches!(self, ScopeKind::Object | ScopeKind::InlineComponent)
    }
}

/// The static type of a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaticType {
    Known(TypeId),
    /// Members are only known at runtime (JavaScript scopes, `var`).
    Dynamic,
    /// The type name could not be resolved.
    Unresolved,
}

impl StaticType {
    pub fn known(self) -> Option<TypeId> {
        match self {
            StaticType::Known(id) => Some(id),
            _ => None,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ScopeFlags: u16 {
        const DOCUMENT_ROOT = 1 << 0;
        /// Starts a component region.
        const COMPONENT_ROOT = 1 << 1;
        /// Implicitly wrapped in a Component by the property it is bound to.
        const WRAPPED = 1 << 2;
        /// The type parses its own bindings (ListModel, PropertyChanges).
        const CUSTOM_PARSER = 1 << 3;
        const CONNECTIONS = 1 << 4;
        const SIGNAL_HANDLER = 1 << 5;
        const ARROW = 1 << 6;
        const CATCH = 1 << 7;
        /// Instance of an inline component of this document.
        const INLINE_INSTANCE = 1 << 8;
        /// Body of a `with` statement; any name may be a member of its object.
        const WITH = 1 << 9;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeclaredProperty {
    pub name: String,
    pub type_name: String,
    /// Element type for lists.
    pub ty: Option<TypeId>,
    pub is_list: bool,
    pub is_readonly: bool,
    pub is_required: bool,
    pub is_alias: bool,
    pub is_default: bool,
    pub name_span: Span,
    pub span: Span,
    pub deprecation: Option<Deprecation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeclaredSignal {
    pub name: String,
    pub parameters: Vec<String>,
    pub span: Span,
    pub deprecation: Option<Deprecation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeclaredMethod {
    pub name: String,
    pub parameters: Vec<String>,
    pub span: Span,
    pub deprecation: Option<Deprecation>,
}

/// How a JavaScript name was declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Lexical,
    Function,
    Parameter,
    /// A signal parameter injected into a handler.
    Injected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsDeclaration {
    pub kind: DeclKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ScopeNode {
    pub kind: ScopeKind,
    pub ty: StaticType,
    /// Type name as written, or the property name of a grouped scope.
    pub type_name: Option<String>,
    pub type_span: Span,
    pub id: Option<String>,
    pub region: RegionId,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub properties: IndexMap<String, DeclaredProperty>,
    pub signals: IndexMap<String, DeclaredSignal>,
    pub methods: IndexMap<String, DeclaredMethod>,
    /// Enum name to keys, declared on this object.
    pub enums: IndexMap<String, Vec<String>>,
    /// Names declared in a JavaScript scope.
    pub identifiers: FxHashMap<String, JsDeclaration>,
    /// Names listed in `required x` members.
    pub required: Vec<String>,
    /// Name of the inline component this object instantiates.
    pub inline_of: Option<String>,
    pub span: Span,
    pub flags: ScopeFlags,
}

impl ScopeNode {
    pub(crate) fn new(kind: ScopeKind, ty: StaticType, region: RegionId, parent: Option<ScopeId>, span: Span) -> Self {
        ScopeNode {
            kind,
            ty,
            type_name: None,
            type_span: span,
            id: None,
            region,
            parent,
            children: Vec::new(),
            properties: IndexMap::new(),
            signals: IndexMap::new(),
            methods: IndexMap::new(),
            enums: IndexMap::new(),
            identifiers: FxHashMap::default(),
            required: Vec::new(),
            inline_of: None,
            span,
            flags: ScopeFlags::empty(),
        }
    }

    pub fn display_type(&self) -> &str {
        self.type_name.as_deref().unwrap_or("<unknown>")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdEntry {
    pub scope: ScopeId,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ComponentRegion {
    pub root: ScopeId,
    pub parent: Option<RegionId>,
    pub ids: IndexMap<String, IdEntry>,
    /// A view delegate: model roles are injected into its context.
    pub delegate: bool,
}

// =============================================================================
// Records
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    String { value: String, multiline: bool },
    Number(f64),
    Bool(bool),
    Null,
    Undefined,
}

impl Literal {
    /// The type name used in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::String { .. } => "string",
            Literal::Number(_) => "double",
            Literal::Bool(_) => "bool",
            Literal::Null => "null",
            Literal::Undefined => "undefined",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BindingKind {
    Literal(Literal),
    /// A script array literal; holds the elements that are plain literals.
    Array(Vec<(Literal, Span)>),
    /// Any other script value.
    Script,
    Object(ScopeId),
    ObjectList(Vec<ScopeId>),
    /// `onFoo: ...`
    Handler,
    /// `Behavior on x { }`
    Interceptor(ScopeId),
    Group(ScopeId),
}

/// A value bound to a property of an object, group or attached scope.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingRecord {
    pub scope: ScopeId,
    /// `None` for objects assigned to the default property.
    pub name: Option<String>,
    pub name_span: Span,
    pub value: BindingKind,
    pub value_span: Span,
    pub span: Span,
    /// Initializer of a property declared on the same object.
    pub is_declaration: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AliasTarget {
    pub id: String,
    pub id_span: Span,
    pub path: SmallVec<[(String, Span); 2]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AliasRecord {
    pub scope: ScopeId,
    pub name: String,
    pub name_span: Span,
    pub span: Span,
    /// `None` when the initializer is not `id` or `id.member...`.
    pub target: Option<AliasTarget>,
    pub value_span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumRecord {
    pub scope: ScopeId,
    pub name: String,
    pub name_span: Span,
    pub keys: Vec<(String, Span)>,
}

/// A bare identifier read, written or called from JavaScript, with the
/// member names that follow it.
#[derive(Clone, Debug, PartialEq)]
pub struct JsReference {
    pub name: String,
    pub span: Span,
    /// Innermost scope containing the reference.
    pub scope: ScopeId,
    pub members: SmallVec<[(String, Span); 4]>,
    /// The last element of the chain is called.
    pub called: bool,
    /// The chain is the target of an assignment.
    pub assigned: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeUse {
    Object,
    PropertyType,
    Attached,
    Script,
}

/// A type name written in the document.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeReference {
    pub name: String,
    pub span: Span,
    pub ty: TypeId,
    pub scope: ScopeId,
    pub usage: TypeUse,
    /// Only reachable through a dependency of an import.
    pub invisible: bool,
}

// =============================================================================
// ScopeTree
// =============================================================================

#[derive(Clone, Debug)]
pub struct ScopeTree {
    pub scopes: Vec<ScopeNode>,
    pub regions: Vec<ComponentRegion>,
    pub root: ScopeId,
    pub imports: ImportScope,
    pub bindings: Vec<BindingRecord>,
    pub references: Vec<JsReference>,
    pub aliases: Vec<AliasRecord>,
    pub enums: Vec<EnumRecord>,
    pub type_references: Vec<TypeReference>,
    /// Inline components of the document by name.
    pub inline_components: FxHashMap<String, ScopeId>,
    /// Indices into `imports.imports` used by some type reference.
    pub used_imports: FxHashSet<usize>,
    /// `pragma ComponentBehavior: Bound`
    pub bound_components: bool,
    /// Problems found while building the tree.
    pub diagnostics: Vec<Diagnostic>,
}

impl ScopeTree {
    pub fn get(&self, id: ScopeId) -> &ScopeNode {
        &self.scopes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &ScopeNode)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(i, node)| (ScopeId(i as u32), node))
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id).parent
    }

    /// `id` and its ancestors, innermost first.
    pub fn chain(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), |s| self.parent(*s))
    }

    /// The QML object a scope belongs to: itself for objects, else the
    /// nearest enclosing object.
    pub fn nearest_object(&self, id: ScopeId) -> ScopeId {
        self.chain(id)
            .find(|s| self.get(*s).kind.is_object())
            .unwrap_or(self.root)
    }

    pub fn region(&self, id: RegionId) -> &ComponentRegion {
        &self.regions[id.index()]
    }

    pub fn region_of(&self, id: ScopeId) -> RegionId {
        self.get(id).region
    }

    /// The id `name` in `region` itself.
    pub fn lookup_id(&self, region: RegionId, name: &str) -> Option<IdEntry> {
        self.region(region).ids.get(name).copied()
    }

    /// The id `name` declared in a region enclosing `region`.
    pub fn lookup_outer_id(&self, region: RegionId, name: &str) -> Option<(RegionId, IdEntry)> {
        let mut current = self.region(region).parent;
        while let Some(r) = current {
            if let Some(entry) = self.lookup_id(r, name) {
                return Some((r, entry));
            }
            current = self.region(r).parent;
        }
        None
    }

    /// The declared property `name` of an object, including the
    /// declarations of the inline component it instantiates.
    pub fn declared_property(&self, id: ScopeId, name: &str) -> Option<&DeclaredProperty> {
        let node = self.get(id);
        node.properties.get(name).or_else(|| {
            node.inline_of
                .as_ref()
                .and_then(|n| self.inline_components.get(n))
                .and_then(|root| self.get(*root).properties.get(name))
        })
    }

    pub fn declared_signal(&self, id: ScopeId, name: &str) -> Option<&DeclaredSignal> {
        let node = self.get(id);
        node.signals.get(name).or_else(|| {
            node.inline_of
                .as_ref()
                .and_then(|n| self.inline_components.get(n))
                .and_then(|root| self.get(*root).signals.get(name))
        })
    }

    pub fn declared_method(&self, id: ScopeId, name: &str) -> Option<&DeclaredMethod> {
        let node = self.get(id);
        node.methods.get(name).or_else(|| {
            node.inline_of
                .as_ref()
                .and_then(|n| self.inline_components.get(n))
                .and_then(|root| self.get(*root).methods.get(name))
        })
    }

    /// Whether `name` is declared on the object (property, signal, method,
    /// enum or enum key) in the document itself.
    pub fn declares_member(&self, id: ScopeId, name: &str) -> bool {
        if self.declared_property(id, name).is_some()
            || self.declared_signal(id, name).is_some()
            || self.declared_method(id, name).is_some()
        {
            return true;
        }
        let node = self.get(id);
        node.enums.contains_key(name) || node.enums.values().any(|keys| keys.iter().any(|k| k == name))
    }

    /// Bindings set on `scope`.
    pub fn bindings_of(&self, scope: ScopeId) -> impl Iterator<Item = &BindingRecord> {
        self.bindings.iter().filter(move |b| b.scope == scope)
    }
}
