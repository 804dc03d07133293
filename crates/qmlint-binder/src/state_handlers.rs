//! Signal handler resolution.
//!
//! Handlers are matched after the whole tree is built so that signals
//! declared later in the document and `Connections` targets referring to
//! ids anywhere in the component are known.

use super::state::{BinderState, HandlerBody, HandlerSite};
use super::state_objects::handler_signal_name;
use crate::scope_tree::{DeclKind, ScopeFlags, ScopeId, StaticType};
use qmlint_common::{Diagnostic, FixSuggestion, category};

impl BinderState<'_, '_> {
    pub(crate) fn resolve_handlers(&mut self) {
        let handlers = std::mem::take(&mut self.handlers);
        for site in &handlers {
            let Some(signal) = handler_signal_name(&site.name) else {
                continue;
            };
            let owner_flags = self.tree.get(site.owner).flags;
            if owner_flags.contains(ScopeFlags::CONNECTIONS)
                && self.signal_parameters(site.owner, &signal).is_none()
            {
                self.resolve_connections_handler(site, &signal);
                continue;
            }
            match self.signal_parameters(site.owner, &signal) {
                Some(parameters) => self.check_handler_parameters(site, &parameters),
                None => {
                    if self.has_complete_members(site.owner) {
                        self.report(
                            category::MISSING_PROPERTY,
                            site.name_span,
                            format!("no matching signal found for handler \"{}\"", site.name),
                        );
                    }
                }
            }
        }
    }

    /// Parameter names of signal `name` on `scope`: declared in the
    /// document, a property change signal, or from the type descriptor.
    pub(crate) fn signal_parameters(&self, scope: ScopeId, name: &str) -> Option<Vec<String>> {
        if let Some(signal) = self.tree.declared_signal(scope, name) {
            return Some(signal.parameters.clone());
        }
        if let Some(property) = name.strip_suffix("Changed")
            && self.tree.declared_property(scope, property).is_some()
        {
            return Some(Vec::new());
        }
        let StaticType::Known(ty) = self.tree.get(scope).ty else {
            return None;
        };
        self.registry.find_signal(ty, name).map(|signal| {
            signal
                .parameter_names()
                .into_iter()
                .map(str::to_string)
                .collect()
        })
    }

    fn check_handler_parameters(&mut self, site: &HandlerSite, parameters: &[String]) {
        let Some(formals) = &site.formals else {
            for parameter in parameters {
                self.declare(site.scope, parameter, DeclKind::Injected, site.name_span);
            }
            return;
        };
        if formals.len() > parameters.len() {
            self.report(
                category::SIGNAL_HANDLER_PARAMETERS,
                site.name_span,
                format!(
                    "Signal handler for \"{}\" has more formal parameters than the signal it handles.",
                    site.name
                ),
            );
            return;
        }
        for (index, (formal, span)) in formals.iter().enumerate() {
            let Some(position) = parameters.iter().position(|p| p == formal) else {
                continue;
            };
            if position != index {
                self.report(
                    category::SIGNAL_HANDLER_PARAMETERS,
                    *span,
                    format!(
                        "Parameter {} to signal handler for \"{}\" is called \"{}\". The signal has a parameter of the same name in position {}.",
                        index + 1,
                        site.name,
                        formal,
                        position + 1
                    ),
                );
            }
        }
    }

    /// `onFoo:` inside `Connections` handles a signal of the target. The
    /// implicit form is deprecated in favour of a function declaration.
    fn resolve_connections_handler(&mut self, site: &HandlerSite, signal: &str) {
        let parameters = self
            .connections_target(site.owner)
            .and_then(|target| self.signal_parameters(target, signal))
            .unwrap_or_default();
        if site.formals.is_none() {
            for parameter in &parameters {
                self.declare(site.scope, parameter, DeclKind::Injected, site.name_span);
            }
        }

        let formals = match &site.formals {
            Some(formals) => formals
                .iter()
                .map(|(n, _)| n.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            None => parameters.join(", "),
        };
        let body = match site.body {
            HandlerBody::Block(span) => span.slice(self.source).to_string(),
            HandlerBody::Expr(span) => format!("{{ {} }}", span.slice(self.source)),
        };
        let replacement = format!("function {}({formals}) {body}", site.name);
        self.push_diagnostic(
            Diagnostic::new(
                category::DEPRECATED,
                site.name_span,
                format!(
                    "Implicitly defining \"{}\" as signal handler in Connections is deprecated. Create a function instead: \"function {}({formals}) {{ ... }}\".",
                    site.name, site.name
                ),
            )
            .with_fix(
                FixSuggestion::new("Create a function to handle the signal", site.binding_span, replacement)
                    .auto_applicable(),
            ),
        );
    }

    /// The object a `Connections` listens to: its `target:` id, else its
    /// parent object.
    fn connections_target(&self, connections: ScopeId) -> Option<ScopeId> {
        match self.connection_targets.get(&connections) {
            Some(path) => {
                let id = path.first()?;
                if path.len() > 1 {
                    return None;
                }
                let region = self.tree.region_of(connections);
                self.tree
                    .lookup_id(region, id)
                    .or_else(|| self.tree.lookup_outer_id(region, id).map(|(_, e)| e))
                    .map(|entry| entry.scope)
            }
            None => self
                .tree
                .parent(connections)
                .map(|parent| self.tree.nearest_object(parent)),
        }
    }
}
