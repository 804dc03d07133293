//! Shared state and lookups for the diagnostic passes.
//!
//! `PassContext` bundles the scope tree of one document with the type
//! registry and configuration, and implements the name and member
//! resolution several passes need. The resolution order mirrors what the
//! QML engine does at runtime: JavaScript scopes, the component's ids, the
//! scope object, enclosing objects, outer component ids, the delegate
//! context, imported types and finally the JavaScript globals.

use crate::config::AnalysisConfig;
use once_cell::sync::Lazy;
use qmlint_binder::{
    DeclaredMethod, DeclaredProperty, DeclaredSignal, RegionId, ScopeFlags, ScopeId, ScopeKind,
    ScopeTree, StaticType,
};
use qmlint_common::LineMap;
use qmlint_resolver::{
    AccessSemantics, Deprecation, EnumDescriptor, ImportScope, MethodDescriptor,
    PropertyDescriptor, SignalRef, TypeId, TypeRegistry,
};
use rustc_hash::FxHashSet;

/// Names provided by the JavaScript environment of every QML document.
static JS_GLOBALS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "undefined", "NaN", "Infinity", "globalThis", "arguments", "eval", "isNaN", "isFinite",
        "parseInt", "parseFloat", "encodeURI", "encodeURIComponent", "decodeURI",
        "decodeURIComponent", "escape", "unescape", "Object", "Function", "Array", "String",
        "Number", "Boolean", "Symbol", "BigInt", "Date", "RegExp", "Math", "JSON", "Reflect",
        "Proxy", "Promise", "Map", "Set", "WeakMap", "WeakSet", "ArrayBuffer", "SharedArrayBuffer",
        "DataView", "Int8Array", "Uint8Array", "Uint8ClampedArray", "Int16Array", "Uint16Array",
        "Int32Array", "Uint32Array", "Float32Array", "Float64Array", "Atomics", "Error",
        "EvalError", "RangeError", "ReferenceError", "SyntaxError", "TypeError", "URIError",
        "console", "print", "gc", "qsTr", "qsTrId", "qsTranslate", "QT_TR_NOOP",
        "QT_TRANSLATE_NOOP", "QT_TRID_NOOP", "XMLHttpRequest", "Qt",
    ]
    .into_iter()
    .collect()
});

/// Context properties a view injects into its delegates.
pub const DELEGATE_INJECTED: &[&str] = &["index", "model", "modelData"];

pub fn is_js_global(name: &str) -> bool {
    JS_GLOBALS.contains(name)
}

/// Where a bare identifier in JavaScript resolves to.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// A JavaScript declaration in an enclosing scope.
    Local(ScopeId),
    /// An id. `outer` is set when it belongs to an enclosing component.
    Id { scope: ScopeId, outer: bool },
    /// A member of `object`; `inherited` when `object` is not the scope
    /// object of the reference but one of its ancestors.
    Member { object: ScopeId, inherited: bool },
    /// A model role injected into a delegate.
    Injected,
    Type(TypeId),
    Namespace(String),
    Global,
    /// Nothing matched. `certain` is false when an object on the lookup
    /// path has an incomplete type, so the name may still exist.
    Unknown { certain: bool },
}

/// Something that has members: a scope of the tree or a registry type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Scope(ScopeId),
    Type(TypeId),
}

/// A member found on a [`Target`].
#[derive(Clone, Copy, Debug)]
pub enum Member<'a> {
    DeclaredProperty(&'a DeclaredProperty),
    DeclaredSignal(&'a DeclaredSignal),
    DeclaredMethod(&'a DeclaredMethod),
    DeclaredEnum,
    /// `<property>Changed` of a declared property.
    DeclaredChangeSignal,
    Property(&'a PropertyDescriptor),
    Signal(SignalRef<'a>),
    Method(&'a MethodDescriptor),
    Enum(&'a EnumDescriptor),
    EnumKey,
}

impl Member<'_> {
    pub fn deprecation(&self) -> Option<&Deprecation> {
        match self {
            Member::DeclaredProperty(p) => p.deprecation.as_ref(),
            Member::DeclaredSignal(s) => s.deprecation.as_ref(),
            Member::DeclaredMethod(m) => m.deprecation.as_ref(),
            Member::Property(p) => p.deprecation.as_ref(),
            Member::Method(m) => m.deprecation.as_ref(),
            Member::Signal(SignalRef::Declared(m)) => m.deprecation.as_ref(),
            _ => None,
        }
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Member::DeclaredProperty(_) | Member::Property(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Member::DeclaredMethod(_) | Member::Method(_))
    }
}

/// A property as seen by a binding: declared in the document or found on
/// the type.
#[derive(Clone, Debug)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: Option<TypeId>,
    pub is_list: bool,
    pub is_readonly: bool,
    pub deprecation: Option<Deprecation>,
    /// Declared on the same object in this document.
    pub declared: bool,
}

pub struct PassContext<'a> {
    pub tree: &'a ScopeTree,
    pub registry: &'a TypeRegistry<'a>,
    pub config: &'a AnalysisConfig,
    pub source: &'a str,
    pub line_map: &'a LineMap,
    /// Set for passes that run once per component region.
    pub region: Option<RegionId>,
}

impl<'a> PassContext<'a> {
    pub fn imports(&self) -> &'a ImportScope {
        &self.tree.imports
    }

    /// Whether `scope` lies in the region a component-scoped pass runs for.
    pub fn in_region(&self, scope: ScopeId) -> bool {
        self.region
            .is_none_or(|region| self.tree.region_of(scope) == region)
    }

    pub fn type_name(&self, ty: TypeId) -> &'a str {
        self.registry.name(ty)
    }

    /// 1-based `line:column` of `offset`.
    pub fn display_position(&self, offset: u32) -> String {
        let position = self.line_map.offset_to_position(offset, self.source);
        format!("{}:{}", position.line + 1, position.column + 1)
    }

    // =========================================================================
    // Completeness
    // =========================================================================

    /// Whether the member set of `scope` is fully known.
    pub fn scope_is_complete(&self, scope: ScopeId) -> bool {
        let node = self.tree.get(scope);
        let object = self.tree.nearest_object(scope);
        if self.tree.get(object).flags.contains(ScopeFlags::CUSTOM_PARSER) {
            return false;
        }
        match node.ty {
            StaticType::Known(ty) => self.registry.is_complete(ty) && !self.registry.is_variant(ty),
            _ => false,
        }
    }

    /// Whether members looked up on `target` can be reported as missing.
    pub fn target_is_checkable(&self, target: Target) -> bool {
        match target {
            Target::Scope(scope) => {
                self.scope_is_complete(scope)
                    && self
                        .tree
                        .get(scope)
                        .ty
                        .known()
                        .is_some_and(|ty| self.registry.get(ty).access == AccessSemantics::Reference)
            }
            Target::Type(ty) => {
                self.registry.is_complete(ty)
                    && !self.registry.is_variant(ty)
                    && self.registry.get(ty).access == AccessSemantics::Reference
            }
        }
    }

    pub fn target_name(&self, target: Target) -> String {
        match target {
            Target::Scope(scope) => match self.tree.get(scope).ty {
                StaticType::Known(ty) => self.type_name(ty).to_string(),
                _ => self.tree.get(scope).display_type().to_string(),
            },
            Target::Type(ty) => self.type_name(ty).to_string(),
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub fn member(&self, target: Target, name: &str) -> Option<Member<'a>> {
        match target {
            Target::Scope(scope) => self.scope_member(scope, name),
            Target::Type(ty) => self.type_member(ty, name),
        }
    }

    fn scope_member(&self, scope: ScopeId, name: &str) -> Option<Member<'a>> {
        let tree = self.tree;
        if let Some(property) = tree.declared_property(scope, name) {
            return Some(Member::DeclaredProperty(property));
        }
        if let Some(method) = tree.declared_method(scope, name) {
            return Some(Member::DeclaredMethod(method));
        }
        if let Some(signal) = tree.declared_signal(scope, name) {
            return Some(Member::DeclaredSignal(signal));
        }
        if name
            .strip_suffix("Changed")
            .is_some_and(|p| tree.declared_property(scope, p).is_some())
        {
            return Some(Member::DeclaredChangeSignal);
        }
        if tree.declares_member(scope, name) {
            return Some(Member::DeclaredEnum);
        }
        let ty = tree.get(scope).ty.known()?;
        self.type_member(ty, name)
    }

    fn type_member(&self, ty: TypeId, name: &str) -> Option<Member<'a>> {
        let registry = self.registry;
        if let Some((_, property)) = registry.find_property(ty, name) {
            return Some(Member::Property(property));
        }
        if let Some(method) = registry.find_method(ty, name) {
            return Some(Member::Method(method));
        }
        if let Some(signal) = registry.find_signal(ty, name) {
            return Some(Member::Signal(signal));
        }
        if let Some(e) = registry.find_enum(ty, name) {
            return Some(Member::Enum(e));
        }
        if registry.find_enum_key(ty, name).is_some() {
            return Some(Member::EnumKey);
        }
        None
    }

    /// The value type of a member, for following `a.b.c` chains. Lists,
    /// methods and signals end the chain.
    pub fn member_target(&self, member: &Member<'_>) -> Option<Target> {
        match member {
            Member::DeclaredProperty(p) if !p.is_list && !p.is_alias => p.ty.map(Target::Type),
            Member::Property(p) if !p.is_list => self.registry.property_type(p).map(Target::Type),
            _ => None,
        }
    }

    /// Every member name of `target`, for suggestions.
    pub fn member_names(&self, target: Target) -> Vec<&'a str> {
        let (mut names, ty) = match target {
            Target::Scope(scope) => {
                let node = self.tree.get(scope);
                let mut names: Vec<&str> = node
                    .properties
                    .keys()
                    .chain(node.methods.keys())
                    .chain(node.signals.keys())
                    .map(String::as_str)
                    .collect();
                names.extend(node.enums.keys().map(String::as_str));
                (names, node.ty.known())
            }
            Target::Type(ty) => (Vec::new(), Some(ty)),
        };
        if let Some(ty) = ty {
            names.extend(self.registry.member_names(ty));
        }
        names
    }

    /// The property `name` of `scope` as seen by a binding on it.
    pub fn binding_property(&self, scope: ScopeId, name: &str) -> Option<PropertyInfo> {
        if let Some(declared) = self.tree.declared_property(scope, name) {
            return Some(PropertyInfo {
                name: declared.name.clone(),
                ty: declared.ty,
                is_list: declared.is_list,
                is_readonly: declared.is_readonly,
                deprecation: declared.deprecation.clone(),
                declared: true,
            });
        }
        let ty = self.tree.get(scope).ty.known()?;
        let (_, property) = self.registry.find_property(ty, name)?;
        Some(PropertyInfo {
            name: property.name.clone(),
            ty: self.registry.property_type(property),
            is_list: property.is_list,
            is_readonly: property.is_readonly,
            deprecation: property.deprecation.clone(),
            declared: false,
        })
    }

    // =========================================================================
    // Name resolution
    // =========================================================================

    /// Resolve the bare identifier `name` read from `scope`.
    pub fn resolve_name(&self, scope: ScopeId, name: &str) -> Resolution {
        let tree = self.tree;
        for s in tree.chain(scope) {
            let node = tree.get(s);
            if !node.kind.is_js() {
                break;
            }
            if node.identifiers.contains_key(name) {
                return Resolution::Local(s);
            }
            if node.flags.contains(ScopeFlags::WITH) {
                return Resolution::Unknown { certain: false };
            }
        }

        let region = tree.region_of(scope);
        if let Some(entry) = tree.lookup_id(region, name) {
            return Resolution::Id {
                scope: entry.scope,
                outer: false,
            };
        }

        let mut certain = true;
        let scope_object = tree.nearest_object(scope);
        let mut inherited = false;
        let mut object = Some(scope_object);
        while let Some(current) = object {
            if self.scope_member(current, name).is_some() {
                return Resolution::Member {
                    object: current,
                    inherited,
                };
            }
            if !self.scope_is_complete(current) {
                certain = false;
                break;
            }
            if tree.get(current).kind == ScopeKind::InlineComponent {
                break;
            }
            inherited = true;
            object = tree
                .parent(current)
                .map(|parent| tree.nearest_object(parent))
                .filter(|parent| *parent != current);
        }

        if certain {
            if let Some((_, entry)) = tree.lookup_outer_id(region, name) {
                return Resolution::Id {
                    scope: entry.scope,
                    outer: true,
                };
            }
            if DELEGATE_INJECTED.contains(&name) && self.in_delegate(region) {
                return Resolution::Injected;
            }
        }

        let imports = self.imports();
        if let Some(found) = imports.lookup_type(name) {
            return Resolution::Type(found.id);
        }
        if imports.lookup_namespace(name).is_some() {
            return Resolution::Namespace(name.to_string());
        }
        if let Some(inline) = tree.inline_components.get(name) {
            if let Some(ty) = tree.get(*inline).ty.known() {
                return Resolution::Type(ty);
            }
            return Resolution::Unknown { certain: false };
        }
        if is_js_global(name) {
            return Resolution::Global;
        }
        Resolution::Unknown { certain }
    }

    /// Whether `region` or an enclosing region is a view delegate.
    pub fn in_delegate(&self, region: RegionId) -> bool {
        let mut current = Some(region);
        while let Some(r) = current {
            let region = self.tree.region(r);
            if region.delegate {
                return true;
            }
            current = region.parent;
        }
        false
    }

    /// Names visible from `scope` without qualification, for suggestions.
    pub fn visible_names(&self, scope: ScopeId) -> Vec<&'a str> {
        let tree = self.tree;
        let mut names = Vec::new();
        for s in tree.chain(scope) {
            let node = tree.get(s);
            if !node.kind.is_js() {
                break;
            }
            names.extend(node.identifiers.keys().map(String::as_str));
        }
        names.extend(tree.region(tree.region_of(scope)).ids.keys().map(String::as_str));
        names.extend(self.member_names(Target::Scope(tree.nearest_object(scope))));
        names
    }
}
