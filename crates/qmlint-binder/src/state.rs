//! Binder state: the tree under construction and the lookups shared by the
//! object, script and handler binding passes.

use crate::scope_tree::{
    ComponentRegion, IdEntry, RegionId, ScopeFlags, ScopeId, ScopeKind, ScopeNode, ScopeTree,
    StaticType, TypeReference, TypeUse,
};
use qmlint_common::{Category, Diagnostic, FixSuggestion, LineMap, Span, category, did_you_mean};
use qmlint_parser::ast::{Document, ObjectDefinition, ObjectMember, QualifiedName};
use qmlint_resolver::{Deprecation, ImportScope, TypeId, TypeRegistry};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Internal name of the type that makes an object a component.
pub(crate) const COMPONENT_TYPE: &str = "QQmlComponent";
pub(crate) const CONNECTIONS_TYPE: &str = "QQmlConnections";

/// Result of resolving a written type name.
#[derive(Clone, Debug)]
pub(crate) enum TypeLookup {
    Found {
        ty: TypeId,
        import: Option<usize>,
        invisible: bool,
        /// The name refers to an inline component of this document.
        inline_of: Option<String>,
    },
    NotFound,
}

/// A signal handler binding whose signal is resolved once the whole tree
/// is known.
#[derive(Clone, Debug)]
pub(crate) struct HandlerSite {
    /// Object, group or attached scope the handler is bound on.
    pub owner: ScopeId,
    pub name: String,
    pub name_span: Span,
    pub binding_span: Span,
    /// Function scope created for the binding value.
    pub scope: ScopeId,
    /// Parameters of `onFoo: function(a, b) {}` or `onFoo: (a, b) => ...`.
    pub formals: Option<Vec<(String, Span)>>,
    /// Text of the handler body for the Connections rewrite: the block
    /// including braces, or the bare expression.
    pub body: HandlerBody,
}

#[derive(Clone, Debug)]
pub(crate) enum HandlerBody {
    Block(Span),
    Expr(Span),
}

pub(crate) struct BinderState<'a, 'r> {
    pub(crate) source: &'a str,
    pub(crate) registry: &'a TypeRegistry<'r>,
    pub(crate) line_map: LineMap,
    pub(crate) tree: ScopeTree,
    pub(crate) current_region: RegionId,
    /// Nesting depth of inline component definitions.
    pub(crate) inline_depth: u32,
    /// Grouped and attached scopes by owner and name, so `anchors.left`
    /// and `anchors.right` share one scope.
    pub(crate) nested_scopes: FxHashMap<(ScopeId, String), ScopeId>,
    /// Base type names of the inline components declared in the document.
    pub(crate) inline_bases: FxHashMap<String, QualifiedName>,
    pub(crate) handlers: Vec<HandlerSite>,
    /// `target:` member path of each Connections object.
    pub(crate) connection_targets: FxHashMap<ScopeId, SmallVec<[String; 2]>>,
}

impl<'a, 'r> BinderState<'a, 'r> {
    pub(crate) fn new(source: &'a str, imports: ImportScope, registry: &'a TypeRegistry<'r>) -> Self {
        let tree = ScopeTree {
            scopes: Vec::new(),
            regions: Vec::new(),
            root: ScopeId(0),
            imports,
            bindings: Vec::new(),
            references: Vec::new(),
            aliases: Vec::new(),
            enums: Vec::new(),
            type_references: Vec::new(),
            inline_components: FxHashMap::default(),
            used_imports: Default::default(),
            bound_components: false,
            diagnostics: Vec::new(),
        };
        BinderState {
            source,
            registry,
            line_map: LineMap::build(source),
            tree,
            current_region: RegionId(0),
            inline_depth: 0,
            nested_scopes: FxHashMap::default(),
            inline_bases: FxHashMap::default(),
            handlers: Vec::new(),
            connection_targets: FxHashMap::default(),
        }
    }

    pub(crate) fn bind_document(mut self, document: &Document) -> ScopeTree {
        self.bind_pragmas(document);
        collect_inline_bases(&document.root, &mut self.inline_bases);
        self.bind_root(&document.root);
        self.resolve_handlers();
        debug!(
            scopes = self.tree.scopes.len(),
            regions = self.tree.regions.len(),
            references = self.tree.references.len(),
            diagnostics = self.tree.diagnostics.len(),
            "document bound"
        );
        self.tree
    }

    fn bind_pragmas(&mut self, document: &Document) {
        for pragma in &document.pragmas {
            if pragma.name.name != "ComponentBehavior" {
                continue;
            }
            for value in &pragma.values {
                match value.name.as_str() {
                    "Bound" => self.tree.bound_components = true,
                    "Unbound" => {}
                    other => self.report(
                        category::SYNTAX,
                        value.span,
                        format!("Unknown argument \"{other}\" to pragma ComponentBehavior"),
                    ),
                }
            }
        }
    }

    // =========================================================================
    // Arena
    // =========================================================================

    pub(crate) fn alloc_scope(&mut self, node: ScopeNode) -> ScopeId {
        let id = ScopeId(self.tree.scopes.len() as u32);
        if let Some(parent) = node.parent {
            self.tree.scopes[parent.index()].children.push(id);
        }
        self.tree.scopes.push(node);
        id
    }

    pub(crate) fn node_mut(&mut self, id: ScopeId) -> &mut ScopeNode {
        &mut self.tree.scopes[id.index()]
    }

    pub(crate) fn alloc_region(&mut self, root: ScopeId, parent: Option<RegionId>, delegate: bool) -> RegionId {
        let id = RegionId(self.tree.regions.len() as u32);
        self.tree.regions.push(ComponentRegion {
            root,
            parent,
            ids: Default::default(),
            delegate,
        });
        id
    }

    /// A JavaScript scope nested in `parent`.
    pub(crate) fn js_scope(&mut self, kind: ScopeKind, parent: ScopeId, span: Span, flags: ScopeFlags) -> ScopeId {
        let region = self.tree.get(parent).region;
        let mut node = ScopeNode::new(kind, StaticType::Dynamic, region, Some(parent), span);
        node.flags = flags;
        self.alloc_scope(node)
    }

    pub(crate) fn report(&mut self, category: Category, span: Span, message: impl Into<String>) {
        self.tree.diagnostics.push(Diagnostic::new(category, span, message));
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.tree.diagnostics.push(diagnostic);
    }

    /// 1-based `line:column` of `offset`.
    pub(crate) fn display_position(&self, offset: u32) -> String {
        let position = self.line_map.offset_to_position(offset, self.source);
        format!("{}:{}", position.line + 1, position.column + 1)
    }

    // =========================================================================
    // Ids
    // =========================================================================

    pub(crate) fn declare_id(&mut self, region: RegionId, scope: ScopeId, name: &str, span: Span) {
        if let Some(first) = self.tree.lookup_id(region, name) {
            let position = self.display_position(first.span.start);
            self.push_diagnostic(
                Diagnostic::new(
                    category::DUPLICATE_IDS,
                    span,
                    format!("Found a duplicated id. id {name} was first declared at {position}"),
                )
                .with_note(first.span, format!("id {name} was first declared here")),
            );
            return;
        }
        trace!(name, scope = scope.0, region = region.0, "declare id");
        self.tree.regions[region.index()]
            .ids
            .insert(name.to_string(), IdEntry { scope, span });
        self.node_mut(scope).id = Some(name.to_string());
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Resolve a written type name through the imports, the inline
    /// components of the document and the hidden dependency types.
    pub(crate) fn lookup_type_name(&mut self, name: &QualifiedName) -> TypeLookup {
        let mut visiting = Vec::new();
        self.lookup_type_name_guarded(name, &mut visiting)
    }

    fn lookup_type_name_guarded(&mut self, name: &QualifiedName, visiting: &mut Vec<String>) -> TypeLookup {
        let text = name.text();

        if name.len() == 1
            && let Some(base) = self.inline_bases.get(&text).cloned()
        {
            if visiting.contains(&text) {
                return TypeLookup::NotFound;
            }
            visiting.push(text.clone());
            return match self.lookup_type_name_guarded(&base, visiting) {
                TypeLookup::Found {
                    ty, import, invisible, ..
                } => TypeLookup::Found {
                    ty,
                    import,
                    invisible,
                    inline_of: Some(text),
                },
                TypeLookup::NotFound => TypeLookup::NotFound,
            };
        }

        if name.len() > 1 {
            let qualifier = &name.first().name;
            if self.tree.imports.lookup_namespace(qualifier).is_some()
                && qualifier.chars().next().is_some_and(|c| c.is_lowercase())
            {
                self.report(
                    category::IMPORT,
                    name.first().span,
                    format!("Namespace '{qualifier}' of '{text}' must start with an upper case letter."),
                );
            }
        }

        if let Some(found) = self.tree.imports.lookup_dotted(&text) {
            self.mark_import_used(found.import);
            return TypeLookup::Found {
                ty: found.id,
                import: Some(found.import),
                invisible: false,
                inline_of: None,
            };
        }

        // `File.Inline`: an inline component of another document.
        if name.len() == 2
            && let Some(found) = self.tree.imports.lookup_type(&name.first().name)
            && let Some(inline) = self
                .registry
                .get(found.id)
                .inline_components
                .get(&name.last().name)
                .copied()
        {
            self.mark_import_used(found.import);
            return TypeLookup::Found {
                ty: inline,
                import: Some(found.import),
                invisible: false,
                inline_of: None,
            };
        }

        if let Some(hidden) = self.tree.imports.lookup_hidden(&text) {
            return TypeLookup::Found {
                ty: hidden,
                import: None,
                invisible: true,
                inline_of: None,
            };
        }
        TypeLookup::NotFound
    }

    /// `X was not found...` with a suggestion among the visible names.
    pub(crate) fn report_unknown_type(&mut self, name: &QualifiedName) {
        let text = name.text();
        let mut diagnostic = Diagnostic::new(
            category::IMPORT,
            name.span,
            format!("{text} was not found. Did you add all imports and dependencies?"),
        );
        let suggestion = {
            let candidates = self
                .tree
                .imports
                .visible_names()
                .into_iter()
                .chain(self.inline_bases.keys().map(String::as_str));
            did_you_mean(&text, candidates)
        };
        if let Some(suggestion) = suggestion {
            diagnostic = diagnostic.with_fix(FixSuggestion::new(
                format!("Did you mean \"{suggestion}\"?"),
                name.span,
                suggestion,
            ));
        }
        self.push_diagnostic(diagnostic);
    }

    pub(crate) fn mark_import_used(&mut self, import: usize) {
        self.tree.used_imports.insert(import);
    }

    pub(crate) fn record_type_use(
        &mut self,
        name: String,
        span: Span,
        ty: TypeId,
        scope: ScopeId,
        usage: TypeUse,
        invisible: bool,
    ) {
        self.tree.type_references.push(TypeReference {
            name,
            span,
            ty,
            scope,
            usage,
            invisible,
        });
    }

    pub(crate) fn inherits_component(&self, ty: StaticType) -> bool {
        ty.known()
            .is_some_and(|t| self.registry.inherits_internal(t, COMPONENT_TYPE))
    }

    /// Whether members of `scope` can be enumerated: a known, complete type
    /// without a custom parser.
    pub(crate) fn has_complete_members(&self, scope: ScopeId) -> bool {
        let object = self.tree.nearest_object(scope);
        if self.tree.get(object).flags.contains(ScopeFlags::CUSTOM_PARSER) {
            return false;
        }
        match self.tree.get(scope).ty {
            StaticType::Known(ty) => self.registry.is_complete(ty),
            _ => false,
        }
    }
}

pub(crate) fn deprecation_of(annotations: &[qmlint_parser::ast::Annotation]) -> Option<Deprecation> {
    qmlint_parser::ast::deprecation(annotations).map(|reason| Deprecation { reason })
}

fn collect_inline_bases(object: &ObjectDefinition, out: &mut FxHashMap<String, QualifiedName>) {
    for member in &object.members {
        match member {
            ObjectMember::InlineComponent(inline) => {
                out.entry(inline.name.name.clone())
                    .or_insert_with(|| inline.object.type_name.clone());
                collect_inline_bases(&inline.object, out);
            }
            ObjectMember::Object(child) => collect_inline_bases(child, out),
            _ => {}
        }
    }
}
