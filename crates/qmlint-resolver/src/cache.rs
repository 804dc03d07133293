//! Session-wide module cache.
//!
//! Modules and type descriptors are loaded lazily the first time a document
//! imports them and then shared by every analysis of the session. The state
//! sits behind one `RwLock`. Importing a document whose modules are all
//! loaded only takes the read lock. Otherwise the importer takes the loader
//! mutex, so loads run one at a time, and holds the write lock while it
//! loads. Analyses read the loaded descriptors through a [`TypeRegistry`]
//! holding the read lock.

use crate::builtins;
use crate::error::ResolveError;
use crate::import_scope::{ImportScope, ResolvedImport, TypeRef};
use crate::qmldir::Qmldir;
use crate::qmltypes::{TypeFile, read_type_file};
use crate::registry::TypeRegistry;
use crate::search_path::{Location, ResourceOverlay, SearchEntry};
use crate::types::{
    Deprecation, EnumDescriptor, Export, LoadMessage, MethodDescriptor, MethodKind, Module,
    ModuleId, ModuleKind, Parameter, PropertyDescriptor, TypeDescriptor, TypeId,
};
use fixedbitset::FixedBitSet;
use indexmap::IndexMap;
use qmlint_common::{Diagnostic, Severity, Span, category};
use qmlint_parser::ast::{self, Document, Import, ImportTarget, ObjectDefinition, ObjectMember};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace, warn};

/// Where modules and type descriptors come from.
#[derive(Clone, Debug, Default)]
pub struct ResolverOptions {
    /// Import directories and resource overlays, highest precedence first.
    pub search_path: Vec<SearchEntry>,
    /// Descriptor files imported into every document (`-i`).
    pub qmltypes_files: Vec<PathBuf>,
    /// Do not fall back to the default import path.
    pub bare: bool,
}

// =============================================================================
// Cache state
// =============================================================================

pub(crate) struct CacheState {
    options: ResolverOptions,
    /// `options.search_path` followed by the built-in overlays.
    path: Vec<SearchEntry>,
    pub(crate) types: Vec<TypeDescriptor>,
    pub(crate) modules: Vec<Module>,
    /// C++ (descriptor file) types by internal name.
    pub(crate) by_internal: FxHashMap<String, TypeId>,
    by_location: FxHashMap<String, ModuleId>,
    by_uri: FxHashMap<String, Option<ModuleId>>,
    ambiguities: FxHashMap<String, String>,
    /// Composite types by the cache key of their file.
    composites: FxHashMap<String, TypeId>,
    composite_sources: FxHashMap<TypeId, Location>,
    /// Descriptors whose members are final.
    completed: FixedBitSet,
    scanned: FxHashSet<ModuleId>,
    type_files: Option<ModuleId>,
    /// Descriptors were added since the last link pass.
    dirty: bool,
}

impl CacheState {
    fn new(options: ResolverOptions) -> Self {
        let mut path = options.search_path.clone();
        if !options.bare {
            path.push(SearchEntry::overlay(builtins::default_imports_overlay()));
        }
        path.push(SearchEntry::overlay(builtins::builtin_overlay()));
        CacheState {
            options,
            path,
            types: Vec::new(),
            modules: Vec::new(),
            by_internal: FxHashMap::default(),
            by_location: FxHashMap::default(),
            by_uri: FxHashMap::default(),
            ambiguities: FxHashMap::default(),
            composites: FxHashMap::default(),
            composite_sources: FxHashMap::default(),
            completed: FixedBitSet::new(),
            scanned: FxHashSet::default(),
            type_files: None,
            dirty: false,
        }
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    fn push_module(&mut self, uri: Option<&str>, kind: ModuleKind, location: String) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Module {
            id,
            uri: uri.map(str::to_string),
            kind,
            location,
            exports: IndexMap::new(),
            internal: IndexMap::new(),
            reexports: Vec::new(),
            dependencies: Vec::new(),
            listed_files: Vec::new(),
            singletons: Vec::new(),
            messages: Vec::new(),
        });
        id
    }

    fn register_type(&mut self, mut descriptor: TypeDescriptor, module: Option<ModuleId>) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        descriptor.module = module;
        let composite = descriptor.composite;
        if !composite {
            self.by_internal
                .entry(descriptor.internal_name.clone())
                .or_insert(id);
        }
        self.types.push(descriptor);
        self.completed.grow(self.types.len());
        if !composite {
            self.completed.insert(id.index());
        }
        self.dirty = true;
        id
    }

    fn composite_stub(
        &mut self,
        file: &Location,
        name: &str,
        module: ModuleId,
    ) -> TypeId {
        let key = file.cache_key();
        if let Some(&id) = self.composites.get(&key) {
            return id;
        }
        let uri = self.modules[module.index()].uri.clone().unwrap_or_default();
        let mut descriptor = TypeDescriptor::new(name);
        descriptor.composite = true;
        descriptor.file = file.disk_path();
        descriptor.exports.push(Export {
            module: uri,
            name: name.to_string(),
            version: None,
        });
        let id = self.register_type(descriptor, Some(module));
        self.composites.insert(key, id);
        self.composite_sources.insert(id, file.clone());
        id
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    fn load_type_file(&self, file: &Location) -> Result<TypeFile, ResolveError> {
        let content = file.read().map_err(|source| ResolveError::Read {
            path: file.to_string(),
            source,
        })?;
        let document =
            qmlint_parser::parse_document(&content).map_err(|err| ResolveError::Parse {
                path: file.to_string(),
                message: err.to_string(),
            })?;
        Ok(read_type_file(&document.root))
    }

    /// Register the components of a descriptor file. Exports whose module
    /// matches `uri` (or every export when `uri` is `None`) become exports of
    /// `module`; for a name exported at several versions the newest wins.
    fn add_type_file(&mut self, module: ModuleId, uri: Option<&str>, file: TypeFile) {
        let mut newest: FxHashMap<String, Option<ast::Version>> = FxHashMap::default();
        for component in file.components {
            let exports: Vec<Export> = component
                .exports
                .iter()
                .filter(|e| uri.is_none_or(|uri| e.module == uri))
                .cloned()
                .collect();
            let id = self.register_type(component, Some(module));
            for export in exports {
                let replace = match newest.get(&export.name) {
                    Some(previous) => export.version > *previous,
                    None => true,
                };
                if replace {
                    newest.insert(export.name.clone(), export.version);
                    self.modules[module.index()].exports.insert(export.name, id);
                }
            }
        }
    }

    fn load_qmldir_module(&mut self, dir: &Location, uri: &str) -> ModuleId {
        let key = dir.cache_key();
        if let Some(&id) = self.by_location.get(&key) {
            return id;
        }
        let qmldir_location = dir.join("qmldir");
        let qmldir = match qmldir_location.read() {
            Ok(content) => Qmldir::parse(&content),
            Err(err) => {
                warn!(path = %qmldir_location, error = %err, "cannot read qmldir");
                Qmldir::default()
            }
        };
        debug!(uri, location = %dir, "loading module");
        let id = self.push_module(Some(uri), ModuleKind::Qmldir, dir.to_string());
        self.by_location.insert(key, id);

        let mut messages = Vec::new();
        if !qmldir.plugins.is_empty() && qmldir.typeinfos.is_empty() {
            messages.push(LoadMessage {
                category: category::IMPORT,
                severity: Some(Severity::Info),
                message: format!("typeinfo not declared in qmldir file: {qmldir_location}"),
            });
        }
        for component in qmldir.ambiguous_components() {
            let version = component
                .version
                .map(|v| format!(" {v}"))
                .unwrap_or_default();
            messages.push(LoadMessage {
                category: category::IMPORT,
                severity: None,
                message: format!(
                    "Ambiguous type detected. {}{version} is defined multiple times.",
                    component.name
                ),
            });
        }

        let mut dependency_uris: Vec<String> =
            qmldir.depends.iter().map(|d| d.uri.clone()).collect();
        for typeinfo in &qmldir.typeinfos {
            let file = dir.join(typeinfo);
            match self.load_type_file(&file) {
                Ok(type_file) => {
                    if !type_file.dependencies.is_empty() {
                        messages.push(LoadMessage {
                            category: category::IMPORT,
                            severity: None,
                            message: format!(
                                "Found deprecated dependency specifications in {file}. \
                                 Specify dependencies in qmldir instead."
                            ),
                        });
                        dependency_uris.extend(type_file.dependencies.iter().filter_map(|d| {
                            d.split_whitespace().next().map(str::to_string)
                        }));
                    }
                    self.add_type_file(id, Some(uri), type_file);
                }
                Err(err) => {
                    warn!(error = %err, "cannot load type descriptor file");
                    messages.push(LoadMessage {
                        category: category::IMPORT,
                        severity: None,
                        message: err.to_string(),
                    });
                }
            }
        }

        for dependency in dependency_uris {
            if dependency == uri {
                continue;
            }
            if let Some(module) = self.resolve_uri(&dependency) {
                self.modules[id.index()].dependencies.push(module);
            }
        }
        for import in &qmldir.imports {
            if import.uri == uri {
                continue;
            }
            if let Some(module) = self.resolve_uri(&import.uri) {
                self.modules[id.index()].reexports.push(module);
            }
        }

        for component in &qmldir.components {
            let file = dir.join(&component.file);
            let type_id = self.composite_stub(&file, &component.name, id);
            let stem = file_stem(&component.file);
            let module = &mut self.modules[id.index()];
            module.listed_files.push(stem.clone());
            if component.singleton {
                module.singletons.push(stem);
                self.types[type_id.index()].singleton = true;
            }
            let module = &mut self.modules[id.index()];
            if component.internal {
                module.internal.entry(component.name.clone()).or_insert(type_id);
            } else {
                module.exports.entry(component.name.clone()).or_insert(type_id);
            }
        }
        self.modules[id.index()].messages = messages;
        self.complete_module(id);
        id
    }

    /// Load `dir` as a module: its qmldir if it has one, plus every
    /// `Uppercase.qml` file in it.
    fn load_directory(&mut self, dir: &Location) -> ModuleId {
        let key = dir.cache_key();
        let id = match self.by_location.get(&key) {
            Some(&id) => id,
            None => {
                let qmldir_location = dir.join("qmldir");
                if qmldir_location.is_file() {
                    let uri = qmldir_location
                        .read()
                        .ok()
                        .and_then(|content| Qmldir::parse(&content).module)
                        .unwrap_or_default();
                    self.load_qmldir_module(dir, &uri)
                } else {
                    let id = self.push_module(None, ModuleKind::Directory, dir.to_string());
                    self.by_location.insert(key, id);
                    id
                }
            }
        };
        self.scan_directory(id, dir);
        id
    }

    fn scan_directory(&mut self, id: ModuleId, dir: &Location) {
        if !self.scanned.insert(id) {
            return;
        }
        trace!(location = %dir, "scanning directory");
        for file_name in dir.list_files() {
            let Some(stem) = file_name.strip_suffix(".qml") else {
                continue;
            };
            if !stem.chars().next().is_some_and(char::is_uppercase) {
                continue;
            }
            let module = &self.modules[id.index()];
            if module.exports.contains_key(stem) || module.internal.contains_key(stem) {
                continue;
            }
            let type_id = self.composite_stub(&dir.join(&file_name), stem, id);
            let module = &mut self.modules[id.index()];
            if module.kind == ModuleKind::Directory {
                module.exports.insert(stem.to_string(), type_id);
            } else {
                module.internal.insert(stem.to_string(), type_id);
            }
        }
        self.complete_module(id);
    }

    fn resolve_uri(&mut self, uri: &str) -> Option<ModuleId> {
        if let Some(found) = self.by_uri.get(uri) {
            return *found;
        }
        let candidates: Vec<Location> = self
            .path
            .iter()
            .filter_map(|entry| entry.find_module(uri))
            .collect();
        let Some(first) = candidates.first().cloned() else {
            debug!(uri, "module not found on the search path");
            self.by_uri.insert(uri.to_string(), None);
            return None;
        };
        let first_key = first.cache_key();
        let first_content = first.join("qmldir").read().ok();
        for other in &candidates[1..] {
            if other.cache_key() == first_key {
                continue;
            }
            if other.join("qmldir").read().ok() != first_content {
                self.ambiguities.insert(
                    uri.to_string(),
                    format!("Module \"{uri}\" is ambiguous. Found in {first} and in {other}"),
                );
                break;
            }
        }
        let id = self.load_qmldir_module(&first, uri);
        self.by_uri.insert(uri.to_string(), Some(id));
        Some(id)
    }

    /// The module holding the `-i` descriptor files.
    fn type_files_module(&mut self) -> ModuleId {
        if let Some(id) = self.type_files {
            return id;
        }
        let id = self.push_module(None, ModuleKind::TypeFiles, "<qmltypes>".to_string());
        self.type_files = Some(id);
        for path in self.options.qmltypes_files.clone() {
            let error = if path.is_dir() {
                Some(ResolveError::TypesFileIsDirectory(path.clone()))
            } else if !path.exists() {
                Some(ResolveError::TypesFileMissing(path.clone()))
            } else if path.file_name().is_some_and(|n| n == "qmldir") {
                let dir = Location::disk(path.parent().unwrap_or(Path::new(".")));
                let module = self.load_directory(&dir);
                self.modules[id.index()].reexports.push(module);
                None
            } else {
                match self.load_type_file(&Location::disk(&path)) {
                    Ok(file) => {
                        self.add_type_file(id, None, file);
                        None
                    }
                    Err(err) => Some(err),
                }
            };
            if let Some(error) = error {
                warn!(error = %error, "invalid qmltypes file");
                self.modules[id.index()].messages.push(LoadMessage {
                    category: category::IMPORT,
                    severity: Some(Severity::Error),
                    message: error.to_string(),
                });
            }
        }
        id
    }

    // -------------------------------------------------------------------------
    // Composite types
    // -------------------------------------------------------------------------

    fn complete_module(&mut self, id: ModuleId) {
        let module = &self.modules[id.index()];
        let pending: Vec<TypeId> = module
            .exports
            .values()
            .chain(module.internal.values())
            .copied()
            .filter(|t| !self.completed.contains(t.index()))
            .collect();
        for type_id in pending {
            self.complete_composite(type_id);
        }
    }

    /// Parse the file of a composite stub and fill in its base type and
    /// members. Files that cannot be parsed keep an empty descriptor.
    fn complete_composite(&mut self, id: TypeId) {
        if self.completed.put(id.index()) {
            return;
        }
        let Some(source) = self.composite_sources.get(&id).cloned() else {
            return;
        };
        let document = match source.read() {
            Ok(content) => match qmlint_parser::parse_document(&content) {
                Ok(document) => document,
                Err(err) => {
                    debug!(file = %source, error = %err, "composite type does not parse");
                    return;
                }
            },
            Err(err) => {
                debug!(file = %source, error = %err, "cannot read composite type");
                return;
            }
        };
        trace!(file = %source, "completing composite type");
        let dir = source.parent();
        self.load_imports(&document, dir.as_ref());
        let scope = self.build_scope(&document, dir.as_ref());

        let mut descriptor = self.types[id.index()].clone();
        fill_from_object(&mut descriptor, &document.root, &scope);
        descriptor.singleton |= document.pragma("Singleton").is_some();

        for member in &document.root.members {
            let ObjectMember::InlineComponent(inline) = member else {
                continue;
            };
            let qualified = format!("{}.{}", descriptor.internal_name, inline.name.name);
            let mut inline_descriptor = TypeDescriptor::new(qualified.clone());
            inline_descriptor.composite = true;
            inline_descriptor.file = descriptor.file.clone();
            inline_descriptor.exports.push(Export {
                module: descriptor
                    .exports
                    .first()
                    .map(|e| e.module.clone())
                    .unwrap_or_default(),
                name: qualified,
                version: None,
            });
            fill_from_object(&mut inline_descriptor, &inline.object, &scope);
            let inline_id = self.register_type(inline_descriptor, descriptor.module);
            self.completed.insert(inline_id.index());
            descriptor
                .inline_components
                .insert(inline.name.name.clone(), inline_id);
        }
        self.types[id.index()] = descriptor;
        self.dirty = true;
    }

    // -------------------------------------------------------------------------
    // Import scopes
    // -------------------------------------------------------------------------

    /// Exports of `module` and of the modules it re-exports. The module's
    /// own names come last so they shadow re-exported ones.
    fn collect_exports(&self, module: ModuleId, include_internal: bool) -> Vec<(String, TypeId)> {
        let mut visited = FxHashSet::default();
        let mut out = Vec::new();
        self.collect_exports_into(module, include_internal, &mut visited, &mut out);
        out
    }

    fn collect_exports_into(
        &self,
        module: ModuleId,
        include_internal: bool,
        visited: &mut FxHashSet<ModuleId>,
        out: &mut Vec<(String, TypeId)>,
    ) {
        if !visited.insert(module) {
            return;
        }
        let module = &self.modules[module.index()];
        for &reexport in &module.reexports {
            self.collect_exports_into(reexport, false, visited, out);
        }
        out.extend(module.exports.iter().map(|(n, t)| (n.clone(), *t)));
        if include_internal {
            out.extend(module.internal.iter().map(|(n, t)| (n.clone(), *t)));
        }
    }

    fn add_types(
        &self,
        scope: &mut ImportScope,
        module: ModuleId,
        index: usize,
        qualifier: Option<&str>,
        include_internal: bool,
    ) {
        let names = self.collect_exports(module, include_internal);
        match qualifier {
            None => {
                for (name, id) in names {
                    scope.types.insert(name, TypeRef { id, import: index });
                }
            }
            Some(qualifier) => {
                let namespace = scope.namespaces.entry(qualifier.to_string()).or_default();
                namespace.imports.push(index);
                for (name, id) in names {
                    namespace.types.insert(name, TypeRef { id, import: index });
                }
            }
        }
    }

    fn add_implicit(
        &self,
        scope: &mut ImportScope,
        module: ModuleId,
        display: String,
        include_internal: bool,
    ) {
        let index = scope.imports.len();
        // Only configuration problems surface at implicit imports; module
        // load messages are replayed at explicit imports.
        let mut has_warnings = false;
        if self.type_files == Some(module) {
            for message in &self.modules[module.index()].messages {
                has_warnings = true;
                scope.diagnostics.push(load_diagnostic(message, Span::at(0)));
            }
        }
        scope.imports.push(ResolvedImport {
            index,
            span: Span::at(0),
            display,
            qualifier: None,
            module: Some(module),
            failed: false,
            implicit: true,
            has_warnings,
            is_script: false,
        });
        self.add_types(scope, module, index, None, include_internal);
    }

    /// Load every module `document` imports when it lives in `dir`.
    fn load_imports(&mut self, document: &Document, dir: Option<&Location>) {
        self.resolve_uri("QML");
        if !self.options.bare {
            self.resolve_uri("QtQml");
        }
        if !self.options.qmltypes_files.is_empty() {
            self.type_files_module();
        }
        if let Some(dir) = dir.filter(|d| d.is_dir()) {
            self.load_directory(dir);
        }
        for import in &document.imports {
            match import_load(import, dir) {
                Some(ImportLoad::Module(uri)) => {
                    self.resolve_uri(&uri);
                }
                Some(ImportLoad::Directory(target)) => {
                    self.load_directory(&target);
                }
                None => {}
            }
        }
    }

    /// Whether `load_imports` would load or link anything.
    fn needs_load(&self, document: &Document, dir: Option<&Location>) -> bool {
        let uri_missing = |uri: &str| !self.by_uri.contains_key(uri);
        let dir_missing = |dir: &Location| {
            self.loaded_location(dir)
                .is_none_or(|id| !self.scanned.contains(&id))
        };
        self.dirty
            || uri_missing("QML")
            || (!self.options.bare && uri_missing("QtQml"))
            || (!self.options.qmltypes_files.is_empty() && self.type_files.is_none())
            || dir.filter(|d| d.is_dir()).is_some_and(dir_missing)
            || document
                .imports
                .iter()
                .any(|import| match import_load(import, dir) {
                    Some(ImportLoad::Module(uri)) => uri_missing(&uri),
                    Some(ImportLoad::Directory(target)) => dir_missing(&target),
                    None => false,
                })
    }

    fn loaded_uri(&self, uri: &str) -> Option<ModuleId> {
        self.by_uri.get(uri).copied().flatten()
    }

    fn loaded_location(&self, dir: &Location) -> Option<ModuleId> {
        self.by_location.get(&dir.cache_key()).copied()
    }

    /// Resolve the imports of `document`, which lives in `dir`, against the
    /// modules `load_imports` loaded.
    fn build_scope(&self, document: &Document, dir: Option<&Location>) -> ImportScope {
        let mut scope = ImportScope::default();
        if let Some(module) = self.loaded_uri("QML") {
            self.add_implicit(&mut scope, module, "QML".to_string(), false);
        }
        if !self.options.bare
            && let Some(module) = self.loaded_uri("QtQml")
        {
            self.add_implicit(&mut scope, module, "QtQml".to_string(), false);
        }
        if !self.options.qmltypes_files.is_empty()
            && let Some(module) = self.type_files
        {
            self.add_implicit(&mut scope, module, "<qmltypes>".to_string(), false);
        }
        if let Some(dir) = dir.filter(|d| d.is_dir())
            && let Some(module) = self.loaded_location(dir)
        {
            self.add_implicit(&mut scope, module, format!("\"{dir}\""), true);
        }
        for import in &document.imports {
            self.add_import(&mut scope, import, dir);
        }
        self.collect_hidden(&mut scope);
        scope
    }

    fn add_import(&self, scope: &mut ImportScope, import: &Import, dir: Option<&Location>) {
        let index = scope.imports.len();
        let qualifier = import.qualifier.as_ref().map(|q| q.name.clone());
        let mut resolved = ResolvedImport {
            index,
            span: import.span,
            display: match import.version {
                Some(version) => format!("{} {version}", import.target_text()),
                None => import.target_text(),
            },
            qualifier: qualifier.clone(),
            module: None,
            failed: false,
            implicit: false,
            has_warnings: false,
            is_script: false,
        };
        let mut diagnostics = Vec::new();
        if let Some(q) = &import.qualifier {
            if !q.name.chars().next().is_some_and(char::is_uppercase) {
                diagnostics.push(Diagnostic::new(
                    category::IMPORT,
                    q.span,
                    format!("Import qualifier '{}' must start with a capital letter.", q.name),
                ));
            }
        }

        match &import.target {
            ImportTarget::Module(name) => {
                let uri = name.text();
                match self.loaded_uri(&uri) {
                    Some(module) => {
                        resolved.module = Some(module);
                        if let Some(message) = self.ambiguities.get(&uri) {
                            diagnostics.push(Diagnostic::new(
                                category::IMPORT,
                                import.span,
                                message.clone(),
                            ));
                        }
                        for message in &self.modules[module.index()].messages {
                            diagnostics.push(load_diagnostic(message, import.span));
                        }
                        self.add_types(scope, module, index, qualifier.as_deref(), false);
                    }
                    None => {
                        resolved.failed = true;
                        diagnostics.push(Diagnostic::new(
                            category::IMPORT,
                            import.span,
                            format!(
                                "Failed to import {uri}. Are your import paths set up properly? \
                                 Did you build your project?"
                            ),
                        ));
                    }
                }
            }
            ImportTarget::Path { path, .. } => {
                let target = path_import_target(path, dir);
                let is_script = is_script_path(path);
                let directory = if is_script || !target.is_dir() {
                    None
                } else {
                    self.loaded_location(&target)
                };
                if is_script && target.is_file() {
                    resolved.is_script = true;
                    if let Some(qualifier) = &qualifier {
                        let namespace = scope.namespaces.entry(qualifier.clone()).or_default();
                        namespace.dynamic = true;
                        namespace.imports.push(index);
                    }
                } else if let Some(module) = directory {
                    resolved.module = Some(module);
                    for message in &self.modules[module.index()].messages {
                        diagnostics.push(load_diagnostic(message, import.span));
                    }
                    self.add_types(scope, module, index, qualifier.as_deref(), false);
                } else {
                    resolved.failed = true;
                    diagnostics.push(Diagnostic::new(
                        category::IMPORT,
                        import.span,
                        format!(
                            "File or directory you are trying to import does not exist: {target}."
                        ),
                    ));
                }
            }
        }
        resolved.has_warnings = !diagnostics.is_empty();
        scope.imports.push(resolved);
        scope.diagnostics.extend(diagnostics);
    }

    /// Types loaded as dependencies of the imported modules but not exported
    /// to the document.
    fn collect_hidden(&self, scope: &mut ImportScope) {
        let mut visited = FxHashSet::default();
        let mut stack: Vec<ModuleId> = Vec::new();
        for import in &scope.imports {
            if let Some(module) = import.module {
                stack.extend(self.modules[module.index()].dependencies.iter().copied());
                for &reexport in &self.modules[module.index()].reexports {
                    stack.extend(self.modules[reexport.index()].dependencies.iter().copied());
                }
            }
        }
        while let Some(module) = stack.pop() {
            if !visited.insert(module) {
                continue;
            }
            for (name, id) in self.collect_exports(module, false) {
                if !scope.types.contains_key(&name) {
                    scope.hidden.entry(name).or_insert(id);
                }
            }
            stack.extend(self.modules[module.index()].dependencies.iter().copied());
        }
    }

    /// qmldir `singleton` entries and `pragma Singleton` must agree.
    fn check_singleton_pragma(
        &self,
        document: &Document,
        path: &Path,
        dir: &Location,
        scope: &mut ImportScope,
    ) {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return;
        };
        let Some(&module) = self.by_location.get(&dir.cache_key()) else {
            return;
        };
        let module = &self.modules[module.index()];
        if module.kind != ModuleKind::Qmldir || !module.listed_files.iter().any(|f| f == stem) {
            return;
        }
        let declared = module.singletons.iter().any(|s| s == stem);
        match (declared, document.pragma("Singleton")) {
            (true, None) => scope.diagnostics.push(Diagnostic::new(
                category::IMPORT,
                document.root.type_name.span,
                format!("Type {stem} declared as singleton in qmldir but missing pragma Singleton"),
            )),
            (false, Some(pragma)) => scope.diagnostics.push(Diagnostic::new(
                category::IMPORT,
                pragma.span,
                format!("Type {stem} not declared as singleton in qmldir but using pragma Singleton"),
            )),
            _ => {}
        }
    }

    /// Resolve the textual base, attached and property types of descriptor
    /// file types against every loaded descriptor.
    fn link(&mut self) {
        if !self.dirty {
            return;
        }
        for index in 0..self.types.len() {
            let descriptor = &self.types[index];
            if descriptor.composite {
                continue;
            }
            let lookup = |name: Option<&str>| name.and_then(|n| self.by_internal.get(n)).copied();
            let base = lookup(descriptor.base_name.as_deref());
            let attached = lookup(descriptor.attached_type_name.as_deref());
            let property_types: Vec<Option<TypeId>> = descriptor
                .properties
                .values()
                .map(|p| lookup(Some(p.type_name.as_str())))
                .collect();
            let descriptor = &mut self.types[index];
            descriptor.base = base;
            descriptor.attached_type = attached;
            for (property, type_id) in descriptor.properties.values_mut().zip(property_types) {
                property.type_id = type_id;
            }
        }
        self.dirty = false;
    }
}

/// What importing a document needs loaded for one of its imports.
enum ImportLoad {
    Module(String),
    Directory(Location),
}

fn import_load(import: &Import, dir: Option<&Location>) -> Option<ImportLoad> {
    match &import.target {
        ImportTarget::Module(name) => Some(ImportLoad::Module(name.text())),
        ImportTarget::Path { path, .. } => {
            let target = path_import_target(path, dir);
            (!is_script_path(path) && target.is_dir()).then_some(ImportLoad::Directory(target))
        }
    }
}

fn path_import_target(path: &str, dir: Option<&Location>) -> Location {
    match dir {
        Some(dir) if !Path::new(path).is_absolute() => dir.join(path),
        _ => Location::disk(path),
    }
}

fn is_script_path(path: &str) -> bool {
    path.ends_with(".js") || path.ends_with(".mjs")
}

/// The directory a document at `path` imports implicitly.
fn document_dir(path: Option<&Path>) -> Option<Location> {
    path.map(|p| match p.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Location::disk(parent),
        _ => Location::disk("."),
    })
}

fn file_stem(file: &str) -> String {
    let name = file.rsplit('/').next().unwrap_or(file);
    name.strip_suffix(".qml").unwrap_or(name).to_string()
}

fn load_diagnostic(message: &LoadMessage, span: Span) -> Diagnostic {
    let diagnostic = Diagnostic::new(message.category, span, message.message.clone());
    match message.severity {
        Some(severity) => diagnostic.with_severity(severity),
        None => diagnostic,
    }
}

fn deprecation_of(annotations: &[ast::Annotation]) -> Option<Deprecation> {
    ast::deprecation(annotations).map(|reason| Deprecation { reason })
}

/// Fill `descriptor` from the declarations of a composite root object.
fn fill_from_object(descriptor: &mut TypeDescriptor, object: &ObjectDefinition, scope: &ImportScope) {
    let base_name = object.type_name.text();
    descriptor.base = scope.lookup_dotted(&base_name).map(|r| r.id);
    descriptor.base_name = Some(base_name);
    if let Some(deprecation) = deprecation_of(&object.annotations) {
        descriptor.deprecation = Some(deprecation);
    }

    for member in &object.members {
        match member {
            ObjectMember::Property(decl) => {
                let name = decl.name.name.clone();
                let type_text = decl.type_annotation.name.text();
                let mut property = PropertyDescriptor::new(name.clone(), type_text.clone());
                property.is_alias = decl.is_alias();
                if !property.is_alias {
                    property.type_id = scope.lookup_dotted(&type_text).map(|r| r.id);
                }
                property.is_list = decl.type_annotation.is_list;
                property.is_readonly = decl.is_readonly;
                property.is_required = decl.is_required;
                property.notify = Some(format!("{name}Changed"));
                property.deprecation = deprecation_of(&decl.annotations);
                if decl.is_default {
                    descriptor.default_property = Some(name.clone());
                }
                descriptor.properties.insert(name, property);
            }
            ObjectMember::Signal(decl) => descriptor.methods.push(MethodDescriptor {
                name: decl.name.name.clone(),
                kind: MethodKind::Signal,
                parameters: decl
                    .parameters
                    .iter()
                    .map(|p| Parameter {
                        name: p.name.name.clone(),
                        type_name: p.type_annotation.as_ref().map(|t| t.text()),
                    })
                    .collect(),
                return_type: None,
                deprecation: deprecation_of(&decl.annotations),
            }),
            ObjectMember::Method(decl) => {
                let Some(name) = &decl.function.name else {
                    continue;
                };
                descriptor.methods.push(MethodDescriptor {
                    name: name.name.clone(),
                    kind: MethodKind::Method,
                    parameters: decl
                        .function
                        .params
                        .iter()
                        .map(|p| Parameter {
                            name: p.name.name.clone(),
                            type_name: p.type_annotation.as_ref().map(|t| t.text()),
                        })
                        .collect(),
                    return_type: decl.function.return_type.as_ref().map(|t| t.text()),
                    deprecation: deprecation_of(&decl.annotations),
                });
            }
            ObjectMember::Enum(decl) => {
                descriptor.enums.insert(
                    decl.name.name.clone(),
                    EnumDescriptor {
                        name: decl.name.name.clone(),
                        keys: decl.keys.iter().map(|k| k.name.name.clone()).collect(),
                        scoped: false,
                        from_qml: true,
                    },
                );
            }
            _ => {}
        }
    }
    for member in &object.members {
        if let ObjectMember::Required(name) = member {
            if let Some(property) = descriptor.properties.get_mut(&name.name) {
                property.is_required = true;
            }
        }
    }
}

// =============================================================================
// ModuleCache
// =============================================================================

/// Loaded modules and type descriptors shared by all analyses of a session.
pub struct ModuleCache {
    state: RwLock<CacheState>,
    /// Held while checking for and performing a load.
    loader: Mutex<()>,
}

impl ModuleCache {
    pub fn new(options: ResolverOptions) -> Self {
        ModuleCache {
            state: RwLock::new(CacheState::new(options)),
            loader: Mutex::new(()),
        }
    }

    fn lock_loader(&self) -> MutexGuard<'_, ()> {
        self.loader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn options(&self) -> ResolverOptions {
        self.read().options.clone()
    }

    /// Replace the options and drop everything loaded so far.
    pub fn reconfigure(&self, options: ResolverOptions) {
        debug!("module cache reconfigured");
        *self.write() = CacheState::new(options);
    }

    /// Drop every loaded module; the next import reloads from the search
    /// path.
    pub fn clear(&self) {
        let options = self.options();
        self.reconfigure(options);
    }

    pub fn set_search_path(&self, search_path: Vec<SearchEntry>) {
        let mut options = self.options();
        options.search_path = search_path;
        self.reconfigure(options);
    }

    /// Swap the resource overlays of the search path. Directory entries keep
    /// their order; the new overlays take the place of the first old overlay,
    /// or go last when there was none. Clears the cache.
    pub fn replace_overlays(&self, overlays: Vec<ResourceOverlay>) {
        let mut options = self.options();
        let slot = options
            .search_path
            .iter()
            .position(|e| matches!(e, SearchEntry::Overlay(_)));
        options
            .search_path
            .retain(|e| matches!(e, SearchEntry::Directory(_)));
        let slot = slot.unwrap_or(options.search_path.len()).min(options.search_path.len());
        let entries = overlays.into_iter().map(SearchEntry::overlay);
        options.search_path.splice(slot..slot, entries);
        self.reconfigure(options);
    }

    /// Resolve the imports of `document`, loading modules as needed.
    /// `path` is the document's file; its directory is imported implicitly.
    pub fn import_document(&self, document: &Document, path: Option<&Path>) -> ImportScope {
        let _span = tracing::debug_span!("import_document", path = ?path).entered();
        let dir = document_dir(path);
        let dir = dir.as_ref();
        if self.read().needs_load(document, dir) {
            let _loader = self.lock_loader();
            // Another importer may have loaded the same modules meanwhile.
            if self.read().needs_load(document, dir) {
                trace!("loading imports");
                let mut state = self.write();
                state.load_imports(document, dir);
                state.link();
            }
        }

        let state = self.read();
        let mut scope = state.build_scope(document, dir);
        if let (Some(path), Some(dir)) = (path, dir) {
            state.check_singleton_pragma(document, path, dir, &mut scope);
        }
        debug!(
            imports = scope.imports.len(),
            diagnostics = scope.diagnostics.len(),
            "imports resolved"
        );
        scope
    }

    /// Load the module `uri` from the search path.
    pub fn resolve_module(&self, uri: &str) -> Option<ModuleId> {
        {
            let state = self.read();
            if !state.dirty
                && let Some(&found) = state.by_uri.get(uri)
            {
                return found;
            }
        }
        let _loader = self.lock_loader();
        let mut state = self.write();
        let module = state.resolve_uri(uri);
        state.link();
        module
    }

    /// Whether importing `document` from `path` would load anything.
    pub fn is_loaded(&self, document: &Document, path: Option<&Path>) -> bool {
        let dir = document_dir(path);
        !self.read().needs_load(document, dir.as_ref())
    }

    /// A read view of the loaded descriptors. Holds the cache's read lock
    /// until dropped.
    pub fn registry(&self) -> TypeRegistry<'_> {
        TypeRegistry::new(self.read())
    }

    pub fn module_count(&self) -> usize {
        self.read().modules.len()
    }

    pub fn type_count(&self) -> usize {
        self.read().types.len()
    }
}

impl Default for ModuleCache {
    fn default() -> Self {
        ModuleCache::new(ResolverOptions::default())
    }
}
