//! Object tree binding: object scopes, component regions, ids, grouped and
//! attached scopes, and QML member declarations.

use super::state::{
    BinderState, CONNECTIONS_TYPE, COMPONENT_TYPE, HandlerBody, HandlerSite, TypeLookup,
    deprecation_of,
};
use crate::scope_tree::{
    AliasRecord, AliasTarget, BindingKind, BindingRecord, DeclaredMethod, DeclaredProperty,
    DeclaredSignal, EnumRecord, Literal, RegionId, ScopeFlags, ScopeId, ScopeKind, ScopeNode,
    StaticType, TypeUse,
};
use qmlint_common::{Diagnostic, FixSuggestion, Span, category};
use qmlint_parser::ast::{
    Binding, BindingValue, EnumDeclaration, Ident, MethodDeclaration, ObjectDefinition,
    ObjectMember, PropertyDeclaration, QualifiedName, SignalDeclaration,
};
use qmlint_parser::js::{Expr, ExprKind, FunctionBody, Stmt, StmtKind};
use qmlint_resolver::TypeId;
use tracing::trace;

/// Where an object definition appears.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Placement {
    Root,
    /// Bound to a property, named or default, of type `ty`.
    Property { ty: Option<TypeId>, delegate: bool },
    /// Root object of an inline component.
    Inline,
    /// `Behavior on x { }`
    Interceptor,
}

impl BinderState<'_, '_> {
    pub(crate) fn bind_root(&mut self, root: &ObjectDefinition) {
        let id = self.bind_object(root, None, Placement::Root);
        self.tree.root = id;
        self.node_mut(id).flags |= ScopeFlags::DOCUMENT_ROOT;
    }

    pub(crate) fn bind_object(
        &mut self,
        def: &ObjectDefinition,
        parent: Option<ScopeId>,
        placement: Placement,
    ) -> ScopeId {
        let lookup = self.lookup_type_name(&def.type_name);
        let (ty, inline_of, invisible) = match &lookup {
            TypeLookup::Found {
                ty,
                invisible,
                inline_of,
                ..
            } => (StaticType::Known(*ty), inline_of.clone(), *invisible),
            TypeLookup::NotFound => {
                self.report_unknown_type(&def.type_name);
                (StaticType::Unresolved, None, false)
            }
        };

        let outer = self.current_region;
        let kind = match placement {
            Placement::Inline => ScopeKind::InlineComponent,
            _ => ScopeKind::Object,
        };
        let mut node = ScopeNode::new(kind, ty, outer, parent, def.span);
        node.type_name = Some(def.type_name.text());
        node.type_span = def.type_name.span;
        node.inline_of = inline_of.clone();
        if let StaticType::Known(t) = ty {
            if self.registry.has_custom_parser(t) {
                node.flags |= ScopeFlags::CUSTOM_PARSER;
            }
            if self.registry.inherits_internal(t, CONNECTIONS_TYPE) {
                node.flags |= ScopeFlags::CONNECTIONS;
            }
        }
        if inline_of.is_some() {
            node.flags |= ScopeFlags::INLINE_INSTANCE;
        }
        let scope = self.alloc_scope(node);
        if let StaticType::Known(t) = ty {
            self.record_type_use(
                def.type_name.text(),
                def.type_name.span,
                t,
                scope,
                TypeUse::Object,
                invisible,
            );
        }

        let is_component = inline_of.is_none() && self.inherits_component(ty);
        let (own_region, child_region) = match placement {
            Placement::Root => {
                let region = self.alloc_region(scope, None, false);
                (region, region)
            }
            Placement::Inline => {
                let region = self.alloc_region(scope, Some(outer), false);
                (region, region)
            }
            Placement::Property {
                ty: Some(property_type),
                delegate,
            } if !is_component
                && self.registry.inherits_internal(property_type, COMPONENT_TYPE) =>
            {
                let region = self.alloc_region(scope, Some(outer), delegate);
                self.node_mut(scope).flags |= ScopeFlags::WRAPPED | ScopeFlags::COMPONENT_ROOT;
                (region, region)
            }
            _ if is_component => {
                let delegate = matches!(placement, Placement::Property { delegate: true, .. });
                let region = self.alloc_region(scope, Some(outer), delegate);
                self.node_mut(scope).flags |= ScopeFlags::COMPONENT_ROOT;
                (outer, region)
            }
            _ => (outer, outer),
        };
        self.node_mut(scope).region = own_region;

        // The id of an explicit Component belongs to the enclosing region.
        if let Some(id_binding) = def
            .members
            .iter()
            .filter_map(|m| match m {
                ObjectMember::Binding(b) if b.name.len() == 1 && b.name.first().name == "id" => {
                    Some(b)
                }
                _ => None,
            })
            .next()
        {
            self.bind_id(id_binding, scope, own_region);
        }

        self.current_region = child_region;
        self.bind_members(&def.members, scope);
        self.current_region = outer;
        scope
    }

    fn bind_members(&mut self, members: &[ObjectMember], scope: ScopeId) {
        for member in members {
            match member {
                ObjectMember::Object(child) => self.bind_child_object(child, scope),
                ObjectMember::Binding(binding) => {
                    if binding.name.len() == 1
                        && binding.name.first().name == "id"
                        && self.tree.get(scope).kind.is_object()
                    {
                        // bound with the object itself
                        continue;
                    }
                    self.bind_binding(binding, scope);
                }
                ObjectMember::Property(decl) => self.bind_property_declaration(decl, scope),
                ObjectMember::Signal(decl) => self.bind_signal_declaration(decl, scope),
                ObjectMember::Method(decl) => self.bind_method_declaration(decl, scope),
                ObjectMember::Enum(decl) => self.bind_enum_declaration(decl, scope),
                ObjectMember::InlineComponent(inline) => {
                    let nested = self.inline_depth > 0;
                    if nested {
                        self.report(
                            category::SYNTAX,
                            inline.name.span,
                            "Nested inline components are not supported",
                        );
                    }
                    self.inline_depth += 1;
                    let root = self.bind_object(&inline.object, Some(scope), Placement::Inline);
                    self.inline_depth -= 1;
                    if !nested {
                        self.tree
                            .inline_components
                            .entry(inline.name.name.clone())
                            .or_insert(root);
                    }
                }
                ObjectMember::Required(name) => {
                    self.node_mut(scope).required.push(name.name.clone());
                }
            }
        }
    }

    fn bind_child_object(&mut self, child: &ObjectDefinition, scope: ScopeId) {
        if let Some(target) = &child.on_target {
            let (owner, name) = self.resolve_binding_target(target, scope);
            let interceptor = self.bind_object(child, Some(owner), Placement::Interceptor);
            self.tree.bindings.push(BindingRecord {
                scope: owner,
                name: Some(name.name.clone()),
                name_span: name.span,
                value: BindingKind::Interceptor(interceptor),
                value_span: child.span,
                span: child.span,
                is_declaration: false,
            });
            return;
        }
        let (default_name, default_type) = match self.default_property(scope) {
            Some((name, ty)) => (Some(name), ty),
            None => (None, None),
        };
        let placement = Placement::Property {
            ty: default_type,
            delegate: default_name.as_deref() == Some("delegate"),
        };
        let object = self.bind_object(child, Some(scope), placement);
        self.tree.bindings.push(BindingRecord {
            scope,
            name: None,
            name_span: child.type_name.span,
            value: BindingKind::Object(object),
            value_span: child.span,
            span: child.span,
            is_declaration: false,
        });
    }

    /// Name and element type of the default property of `scope`.
    pub(crate) fn default_property(&self, scope: ScopeId) -> Option<(String, Option<TypeId>)> {
        let node = self.tree.get(scope);
        if let Some(declared) = node.properties.values().find(|p| p.is_default) {
            return Some((declared.name.clone(), declared.ty));
        }
        let ty = node.ty.known()?;
        let (_, property) = self.registry.default_property(ty)?;
        Some((property.name.clone(), self.registry.property_type(property)))
    }

    /// Element type of property `name` of `scope`, declared or inherited.
    pub(crate) fn property_type_of(&self, scope: ScopeId, name: &str) -> Option<TypeId> {
        if let Some(declared) = self.tree.declared_property(scope, name) {
            return declared.ty;
        }
        let ty = self.tree.get(scope).ty.known()?;
        let (_, property) = self.registry.find_property(ty, name)?;
        self.registry.property_type(property)
    }

    pub(crate) fn has_property(&self, scope: ScopeId, name: &str) -> bool {
        self.tree.declared_property(scope, name).is_some()
            || self
                .tree
                .get(scope)
                .ty
                .known()
                .is_some_and(|ty| self.registry.find_property(ty, name).is_some())
    }

    // =========================================================================
    // Ids
    // =========================================================================

    fn bind_id(&mut self, binding: &Binding, scope: ScopeId, region: RegionId) {
        let Some(expr) = binding.value.as_expression() else {
            self.report(category::SYNTAX, binding.value.span(), "Failed to parse id");
            return;
        };
        match &expr.kind {
            ExprKind::Identifier(name) => {
                if !is_valid_id_start(name) {
                    self.report(
                        category::SYNTAX,
                        expr.span,
                        "Id must start with a lower case letter or an '_'",
                    );
                    return;
                }
                self.declare_id(region, scope, name, expr.span);
            }
            ExprKind::String(literal) if is_identifier(&literal.value) => {
                self.push_diagnostic(
                    Diagnostic::new(
                        category::ID_QUOTATION,
                        expr.span,
                        "ids do not need quotation marks",
                    )
                    .with_fix(
                        FixSuggestion::new("Remove the quotation marks", expr.span, literal.value.clone())
                            .auto_applicable(),
                    ),
                );
                if !is_valid_id_start(&literal.value) {
                    self.report(
                        category::SYNTAX,
                        expr.span,
                        "Id must start with a lower case letter or an '_'",
                    );
                    return;
                }
                let name = literal.value.clone();
                self.declare_id(region, scope, &name, expr.span);
            }
            _ => self.report(category::SYNTAX, expr.span, "Failed to parse id"),
        }
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    fn bind_binding(&mut self, binding: &Binding, scope: ScopeId) {
        let (target, name) = self.resolve_binding_target(&binding.name, scope);
        self.bind_value(&binding.value, target, name, binding.span, false);
    }

    /// Walk the prefix of a dotted binding name, creating the grouped and
    /// attached scopes it passes through. Returns the scope the last part
    /// is bound on.
    pub(crate) fn resolve_binding_target<'n>(
        &mut self,
        name: &'n QualifiedName,
        scope: ScopeId,
    ) -> (ScopeId, &'n Ident) {
        let parts = &name.parts;
        let mut current = scope;
        let mut i = 0;
        while i + 1 < parts.len() {
            let part = &parts[i];
            if starts_uppercase(&part.name) {
                let end = if i + 2 < parts.len()
                    && self.tree.imports.lookup_namespace(&part.name).is_some()
                {
                    i + 1
                } else {
                    i
                };
                let prefix = QualifiedName {
                    parts: parts[i..=end].to_vec(),
                    span: part.span.merge(parts[end].span),
                };
                current = self.attached_scope(current, &prefix);
                i = end + 1;
            } else {
                current = self.group_scope(current, part);
                i += 1;
            }
        }
        (current, name.last())
    }

    fn group_scope(&mut self, owner: ScopeId, name: &Ident) -> ScopeId {
        let key = (owner, name.name.clone());
        if let Some(existing) = self.nested_scopes.get(&key) {
            return *existing;
        }
        let ty = if let Some(declared) = self.tree.declared_property(owner, &name.name) {
            declared.ty.map_or(StaticType::Dynamic, StaticType::Known)
        } else {
            match self.tree.get(owner).ty {
                StaticType::Known(ty) => match self.registry.find_property(ty, &name.name) {
                    Some((_, property)) => self
                        .registry
                        .property_type(property)
                        .map_or(StaticType::Dynamic, StaticType::Known),
                    None => {
                        if self.has_complete_members(owner) {
                            self.report(
                                category::MISSING_PROPERTY,
                                name.span,
                                format!("unknown grouped property scope {}.", name.name),
                            );
                        }
                        StaticType::Unresolved
                    }
                },
                other => other,
            }
        };
        let region = self.tree.get(owner).region;
        let mut node = ScopeNode::new(ScopeKind::GroupedProperty, ty, region, Some(owner), name.span);
        node.type_name = Some(name.name.clone());
        node.type_span = name.span;
        let scope = self.alloc_scope(node);
        self.nested_scopes.insert(key, scope);
        scope
    }

    fn attached_scope(&mut self, owner: ScopeId, prefix: &QualifiedName) -> ScopeId {
        let text = prefix.text();
        let key = (owner, text.clone());
        if let Some(existing) = self.nested_scopes.get(&key) {
            return *existing;
        }
        let custom_parser = self
            .tree
            .get(self.tree.nearest_object(owner))
            .flags
            .contains(ScopeFlags::CUSTOM_PARSER);
        let region = self.tree.get(owner).region;
        let mut node = ScopeNode::new(
            ScopeKind::AttachedProperty,
            StaticType::Unresolved,
            region,
            Some(owner),
            prefix.span,
        );
        node.type_name = Some(text.clone());
        node.type_span = prefix.span;
        let scope = self.alloc_scope(node);
        self.nested_scopes.insert(key, scope);

        let ty = match self.lookup_type_name(prefix) {
            TypeLookup::Found { ty, invisible, .. } => {
                self.record_type_use(text.clone(), prefix.span, ty, scope, TypeUse::Attached, invisible);
                self.registry.attached_type(ty).map(StaticType::Known)
            }
            TypeLookup::NotFound => None,
        };
        let ty = match ty {
            Some(ty) => ty,
            None if custom_parser => StaticType::Dynamic,
            None => {
                self.report(
                    category::MISSING_PROPERTY,
                    prefix.span,
                    format!("unknown attached property scope {text}."),
                );
                StaticType::Unresolved
            }
        };
        self.node_mut(scope).ty = ty;
        scope
    }

    /// Bind the value of `name` on `target`, for both bindings and
    /// property declaration initializers.
    fn bind_value(&mut self, value: &BindingValue, target: ScopeId, name: &Ident, span: Span, is_declaration: bool) {
        let kind = match value {
            BindingValue::Script(stmt) => self.bind_script_value(stmt, target, name, span),
            BindingValue::Object(object) => {
                let placement = Placement::Property {
                    ty: self.property_type_of(target, &name.name),
                    delegate: name.name == "delegate",
                };
                BindingKind::Object(self.bind_object(object, Some(target), placement))
            }
            BindingValue::ObjectList { objects, .. } => {
                let placement = Placement::Property {
                    ty: self.property_type_of(target, &name.name),
                    delegate: name.name == "delegate",
                };
                let scopes = objects
                    .iter()
                    .map(|object| self.bind_object(object, Some(target), placement))
                    .collect();
                BindingKind::ObjectList(scopes)
            }
            BindingValue::Group { members, .. } => {
                let group = if starts_uppercase(&name.name) {
                    let prefix = QualifiedName {
                        parts: vec![name.clone()],
                        span: name.span,
                    };
                    self.attached_scope(target, &prefix)
                } else {
                    self.group_scope(target, name)
                };
                self.bind_members(members, group);
                BindingKind::Group(group)
            }
        };
        self.tree.bindings.push(BindingRecord {
            scope: target,
            name: Some(name.name.clone()),
            name_span: name.span,
            value: kind,
            value_span: value.span(),
            span,
            is_declaration,
        });
    }

    fn bind_script_value(&mut self, stmt: &Stmt, target: ScopeId, name: &Ident, span: Span) -> BindingKind {
        let is_handler =
            handler_signal_name(&name.name).is_some() && !self.has_property(target, &name.name);
        let flags = if is_handler {
            ScopeFlags::SIGNAL_HANDLER
        } else {
            ScopeFlags::empty()
        };
        let scope = self.js_scope(ScopeKind::Function, target, stmt.span, flags);
        self.bind_statement_body(stmt, scope);

        if self.tree.get(target).flags.contains(ScopeFlags::CONNECTIONS)
            && name.name == "target"
            && let StmtKind::Expr(expr) = &stmt.kind
            && let Some(path) = expr.as_member_path()
        {
            self.connection_targets
                .insert(target, path.iter().map(|(n, _)| n.to_string()).collect());
        }

        if is_handler {
            let (formals, body) = handler_shape(stmt);
            trace!(handler = %name.name, "signal handler");
            self.handlers.push(HandlerSite {
                owner: target,
                name: name.name.clone(),
                name_span: name.span,
                binding_span: span,
                scope,
                formals,
                body,
            });
            return BindingKind::Handler;
        }
        match &stmt.kind {
            StmtKind::Expr(expr) => match &expr.kind {
                ExprKind::Array(elements) => BindingKind::Array(
                    elements
                        .iter()
                        .filter_map(|element| literal_of(element).map(|literal| (literal, element.span)))
                        .collect(),
                ),
                _ => literal_of(expr).map_or(BindingKind::Script, BindingKind::Literal),
            },
            _ => BindingKind::Script,
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn bind_property_declaration(&mut self, decl: &PropertyDeclaration, scope: ScopeId) {
        let name = &decl.name.name;
        if self.tree.get(scope).properties.contains_key(name) {
            self.report(
                category::DUPLICATED_NAME,
                decl.name.span,
                format!("Duplicated property name \"{name}\"."),
            );
            return;
        }
        let is_alias = decl.is_alias();
        let type_name = decl.type_annotation.name.text();
        let ty = if is_alias {
            None
        } else {
            match self.lookup_type_name(&decl.type_annotation.name) {
                TypeLookup::Found { ty, invisible, .. } => {
                    self.record_type_use(
                        type_name.clone(),
                        decl.type_annotation.name.span,
                        ty,
                        scope,
                        TypeUse::PropertyType,
                        invisible,
                    );
                    Some(ty)
                }
                TypeLookup::NotFound => {
                    self.report(
                        category::UNRESOLVED_TYPE,
                        decl.type_annotation.span,
                        format!(
                            "Type \"{type_name}\" of property \"{name}\" not found. This is likely due to a missing dependency entry or a type not being exposed declaratively."
                        ),
                    );
                    None
                }
            }
        };
        self.node_mut(scope).properties.insert(
            name.clone(),
            DeclaredProperty {
                name: name.clone(),
                type_name,
                ty,
                is_list: decl.type_annotation.is_list,
                is_readonly: decl.is_readonly,
                is_required: decl.is_required,
                is_alias,
                is_default: decl.is_default,
                name_span: decl.name.span,
                span: decl.span,
                deprecation: deprecation_of(&decl.annotations),
            },
        );

        if is_alias {
            self.bind_alias(decl, scope);
        } else if let Some(value) = &decl.value {
            self.bind_value(value, scope, &decl.name, decl.span, true);
        }
    }

    fn bind_alias(&mut self, decl: &PropertyDeclaration, scope: ScopeId) {
        let Some(value) = &decl.value else {
            self.report(
                category::SYNTAX,
                decl.name.span,
                "Invalid alias expression – an initalizer is needed.",
            );
            return;
        };
        let target = value
            .as_expression()
            .and_then(Expr::as_member_path)
            .and_then(|path| {
                let (id, id_span) = *path.first()?;
                Some(AliasTarget {
                    id: id.to_string(),
                    id_span,
                    path: path[1..]
                        .iter()
                        .map(|(n, s)| (n.to_string(), *s))
                        .collect(),
                })
            });
        self.tree.aliases.push(AliasRecord {
            scope,
            name: decl.name.name.clone(),
            name_span: decl.name.span,
            span: decl.span,
            target,
            value_span: value.span(),
        });
    }

    fn bind_signal_declaration(&mut self, decl: &SignalDeclaration, scope: ScopeId) {
        let name = &decl.name.name;
        if self.tree.get(scope).signals.contains_key(name) {
            self.report(
                category::DUPLICATED_NAME,
                decl.name.span,
                format!("Duplicated signal name \"{name}\"."),
            );
            return;
        }
        for parameter in &decl.parameters {
            if let Some(annotation) = &parameter.type_annotation {
                self.use_annotation_type(&annotation.name, scope);
            }
        }
        let signal = DeclaredSignal {
            name: name.clone(),
            parameters: decl.parameters.iter().map(|p| p.name.name.clone()).collect(),
            span: decl.span,
            deprecation: deprecation_of(&decl.annotations),
        };
        self.node_mut(scope).signals.insert(name.clone(), signal);
    }

    fn bind_method_declaration(&mut self, decl: &MethodDeclaration, scope: ScopeId) {
        let function = &decl.function;
        let Some(name) = &function.name else {
            return;
        };
        let method = DeclaredMethod {
            name: name.name.clone(),
            parameters: function.params.iter().map(|p| p.name.name.clone()).collect(),
            span: function.span,
            deprecation: deprecation_of(&decl.annotations),
        };
        self.node_mut(scope)
            .methods
            .entry(name.name.clone())
            .or_insert(method);
        self.bind_function(function, scope, false);
    }

    fn bind_enum_declaration(&mut self, decl: &EnumDeclaration, scope: ScopeId) {
        let keys: Vec<(String, Span)> = decl
            .keys
            .iter()
            .map(|k| (k.name.name.clone(), k.name.span))
            .collect();
        self.node_mut(scope).enums.insert(
            decl.name.name.clone(),
            keys.iter().map(|(k, _)| k.clone()).collect(),
        );
        self.tree.enums.push(EnumRecord {
            scope,
            name: decl.name.name.clone(),
            name_span: decl.name.span,
            keys,
        });
    }

    /// Mark the import providing a type annotation as used.
    pub(crate) fn use_annotation_type(&mut self, name: &QualifiedName, scope: ScopeId) {
        if let TypeLookup::Found { ty, invisible, .. } = self.lookup_type_name(name) {
            self.record_type_use(name.text(), name.span, ty, scope, TypeUse::PropertyType, invisible);
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

pub(crate) fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn is_valid_id_start(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c == '_' || c.is_lowercase())
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c == '$' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

/// `onFooBar` -> `fooBar`.
pub fn handler_signal_name(handler: &str) -> Option<String> {
    let rest = handler.strip_prefix("on")?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    let mut name: String = first.to_lowercase().collect();
    name.push_str(chars.as_str());
    Some(name)
}

/// Formal parameters and body of a handler value.
fn handler_shape(stmt: &Stmt) -> (Option<Vec<(String, Span)>>, HandlerBody) {
    match &stmt.kind {
        StmtKind::Expr(expr) => match &expr.kind {
            ExprKind::Function(function) => {
                let formals = function
                    .params
                    .iter()
                    .map(|p| (p.name.name.clone(), p.name.span))
                    .collect();
                let body = match &function.body {
                    FunctionBody::Block(block) => HandlerBody::Block(block.span),
                    FunctionBody::Expr(expr) => HandlerBody::Expr(expr.span),
                };
                (Some(formals), body)
            }
            _ => (None, HandlerBody::Expr(expr.span)),
        },
        _ => (None, HandlerBody::Block(stmt.span)),
    }
}

pub(crate) fn literal_of(expr: &Expr) -> Option<Literal> {
    match &expr.kind {
        ExprKind::String(literal) => Some(Literal::String {
            value: literal.value.clone(),
            multiline: literal.multiline,
        }),
        ExprKind::Number(n) => Some(Literal::Number(*n)),
        ExprKind::Bool(b) => Some(Literal::Bool(*b)),
        ExprKind::Null => Some(Literal::Null),
        ExprKind::Identifier(name) if name == "undefined" => Some(Literal::Undefined),
        ExprKind::Unary { op: "-", operand } => match operand.kind {
            ExprKind::Number(n) => Some(Literal::Number(-n)),
            _ => None,
        },
        _ => None,
    }
}
