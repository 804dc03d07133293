//! Read access to the loaded type descriptors.

use crate::cache::CacheState;
use crate::types::{
    EnumDescriptor, MethodDescriptor, MethodKind, Module, ModuleId, PropertyDescriptor,
    TypeDescriptor, TypeId,
};
use rustc_hash::FxHashSet;
use std::sync::RwLockReadGuard;

/// Internal names of the types that accept any value.
const VARIANT_TYPES: &[&str] = &["QVariant", "QJSValue"];

/// A signal found on a type: declared, or the change signal `<p>Changed` of
/// a property.
#[derive(Clone, Copy, Debug)]
pub enum SignalRef<'r> {
    Declared(&'r MethodDescriptor),
    PropertyChange(&'r PropertyDescriptor),
}

impl SignalRef<'_> {
    pub fn parameter_names(&self) -> Vec<&str> {
        match self {
            SignalRef::Declared(method) => {
                method.parameters.iter().map(|p| p.name.as_str()).collect()
            }
            SignalRef::PropertyChange(_) => Vec::new(),
        }
    }
}

/// Snapshot of the module cache for one analysis. Holds the cache's read
/// lock; the cache must not be written while a registry is alive.
pub struct TypeRegistry<'a> {
    state: RwLockReadGuard<'a, CacheState>,
}

impl<'a> TypeRegistry<'a> {
    pub(crate) fn new(state: RwLockReadGuard<'a, CacheState>) -> Self {
        TypeRegistry { state }
    }

    pub fn get(&self, id: TypeId) -> &TypeDescriptor {
        &self.state.types[id.index()]
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.state.modules[id.index()]
    }

    pub fn modules(&self) -> &[Module] {
        &self.state.modules
    }

    pub fn type_count(&self) -> usize {
        self.state.types.len()
    }

    pub fn by_internal_name(&self, name: &str) -> Option<TypeId> {
        self.state.by_internal.get(name).copied()
    }

    /// The name users write for `id`.
    pub fn name(&self, id: TypeId) -> &str {
        self.get(id).display_name()
    }

    pub fn base(&self, id: TypeId) -> Option<TypeId> {
        self.get(id).base
    }

    /// `id` followed by its bases. Stops before the first repeated type, so
    /// this terminates on cyclic hierarchies.
    pub fn base_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = FxHashSet::default();
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(ty) = current {
            if !seen.insert(ty) {
                break;
            }
            chain.push(ty);
            current = self.base(ty);
        }
        chain
    }

    pub fn inherits(&self, derived: TypeId, base: TypeId) -> bool {
        self.base_chain(derived).contains(&base)
    }

    /// Whether every base of `id` is known, so its member set is complete.
    /// False on cyclic hierarchies and for composites whose file could not
    /// be read.
    pub fn is_complete(&self, id: TypeId) -> bool {
        let chain = self.base_chain(id);
        let Some(&last) = chain.last() else {
            return false;
        };
        if self.get(last).base.is_some() {
            return false;
        }
        chain.iter().all(|t| {
            let d = self.get(*t);
            match &d.base_name {
                Some(_) => d.base.is_some(),
                None => !d.composite,
            }
        })
    }

    pub fn inherits_internal(&self, derived: TypeId, internal_name: &str) -> bool {
        self.base_chain(derived)
            .iter()
            .any(|t| self.get(*t).internal_name == internal_name)
    }

    /// Whether `id` or one of its bases implements the C++ interface.
    pub fn has_interface(&self, id: TypeId, interface: &str) -> bool {
        self.base_chain(id)
            .iter()
            .any(|t| self.get(*t).interfaces.iter().any(|i| i == interface))
    }

    // -------------------------------------------------------------------------
    // Members
    // -------------------------------------------------------------------------

    /// The property `name` on `id` or its bases, with the type declaring it.
    pub fn find_property(&self, id: TypeId, name: &str) -> Option<(TypeId, &PropertyDescriptor)> {
        self.base_chain(id)
            .into_iter()
            .find_map(|t| self.get(t).properties.get(name).map(|p| (t, p)))
    }

    pub fn find_method(&self, id: TypeId, name: &str) -> Option<&MethodDescriptor> {
        self.base_chain(id)
            .into_iter()
            .find_map(|t| self.get(t).own_method(name, MethodKind::Method))
    }

    pub fn find_signal(&self, id: TypeId, name: &str) -> Option<SignalRef<'_>> {
        let chain = self.base_chain(id);
        if let Some(signal) = chain
            .iter()
            .find_map(|t| self.get(*t).own_method(name, MethodKind::Signal))
        {
            return Some(SignalRef::Declared(signal));
        }
        let property = name.strip_suffix("Changed")?;
        chain
            .iter()
            .find_map(|t| self.get(*t).properties.get(property))
            .map(SignalRef::PropertyChange)
    }

    pub fn find_enum(&self, id: TypeId, name: &str) -> Option<&EnumDescriptor> {
        self.base_chain(id)
            .into_iter()
            .find_map(|t| self.get(t).enums.get(name))
    }

    /// The unscoped enum of `id` (or a base) that has the key `key`.
    pub fn find_enum_key(&self, id: TypeId, key: &str) -> Option<&EnumDescriptor> {
        self.base_chain(id).into_iter().find_map(|t| {
            self.get(t)
                .enums
                .values()
                .find(|e| !e.scoped && e.keys.iter().any(|k| k == key))
        })
    }

    /// Whether `name` is any kind of member of `id`: property, method,
    /// signal, enum or unscoped enum key.
    pub fn has_member(&self, id: TypeId, name: &str) -> bool {
        self.find_property(id, name).is_some()
            || self.find_method(id, name).is_some()
            || self.find_signal(id, name).is_some()
            || self.find_enum(id, name).is_some()
            || self.find_enum_key(id, name).is_some()
    }

    /// Member names of `id` and its bases, for suggestions.
    pub fn member_names(&self, id: TypeId) -> Vec<&str> {
        let mut names = Vec::new();
        for t in self.base_chain(id) {
            let descriptor = self.get(t);
            names.extend(descriptor.properties.keys().map(String::as_str));
            names.extend(descriptor.methods.iter().map(|m| m.name.as_str()));
        }
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn property_names(&self, id: TypeId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .base_chain(id)
            .into_iter()
            .flat_map(|t| self.get(t).properties.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn default_property(&self, id: TypeId) -> Option<(TypeId, &PropertyDescriptor)> {
        let name = self
            .base_chain(id)
            .into_iter()
            .find_map(|t| self.get(t).default_property.as_deref())?;
        self.find_property(id, name)
    }

    pub fn attached_type(&self, id: TypeId) -> Option<TypeId> {
        self.base_chain(id)
            .into_iter()
            .find_map(|t| self.get(t).attached_type)
    }

    /// Required properties of `id` and its bases, nearest declaration first.
    pub fn required_properties(&self, id: TypeId) -> Vec<(TypeId, &PropertyDescriptor)> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for t in self.base_chain(id) {
            for property in self.get(t).properties.values() {
                if seen.insert(property.name.as_str()) && property.is_required {
                    out.push((t, property));
                }
            }
        }
        out
    }

    pub fn has_custom_parser(&self, id: TypeId) -> bool {
        self.base_chain(id)
            .into_iter()
            .any(|t| self.get(t).has_custom_parser)
    }

    // -------------------------------------------------------------------------
    // Type relations
    // -------------------------------------------------------------------------

    /// The type of a property, resolving its name as an internal name when
    /// it was not resolved at load time.
    pub fn property_type(&self, property: &PropertyDescriptor) -> Option<TypeId> {
        property
            .type_id
            .or_else(|| self.by_internal_name(&property.type_name))
    }

    pub fn is_variant(&self, id: TypeId) -> bool {
        VARIANT_TYPES.contains(&self.get(id).internal_name.as_str())
    }

    /// Whether a value of type `source` can be stored in `target`.
    pub fn can_assign(&self, target: TypeId, source: TypeId) -> bool {
        self.is_variant(target) || self.inherits(source, target)
    }

    /// Exported names of `module` with their types.
    pub fn module_exports(&self, module: ModuleId) -> Vec<(&str, TypeId)> {
        self.module(module)
            .exports
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
            .collect()
    }
}
