//! JavaScript scopes: declarations, hoisting and identifier references of
//! script bindings, methods and handlers.

use super::state::BinderState;
use crate::scope_tree::{DeclKind, JsDeclaration, JsReference, ScopeFlags, ScopeId, ScopeKind, TypeUse};
use qmlint_common::{Diagnostic, FixSuggestion, Span, category};
use qmlint_parser::js::{
    Block, Expr, ExprKind, ForInit, Function, FunctionBody, PropertyKey, Stmt, StmtKind, VarDecl,
    VarKind,
};
use smallvec::SmallVec;

impl BinderState<'_, '_> {
    /// Bind the statement of a script binding inside its function scope.
    pub(crate) fn bind_statement_body(&mut self, stmt: &Stmt, scope: ScopeId) {
        match &stmt.kind {
            StmtKind::Block(block) => {
                self.enter_block(&block.stmts, scope, true);
                for s in &block.stmts {
                    self.bind_stmt(s, scope);
                }
            }
            _ => {
                self.enter_block(std::slice::from_ref(stmt), scope, true);
                self.bind_stmt(stmt, scope);
            }
        }
    }

    /// Bind a function and its body. Declared function names are hoisted
    /// into the enclosing scope; the name of a function expression is only
    /// visible inside it.
    pub(crate) fn bind_function(&mut self, function: &Function, parent: ScopeId, expression: bool) -> ScopeId {
        let flags = if function.is_arrow {
            ScopeFlags::ARROW
        } else {
            ScopeFlags::empty()
        };
        let scope = self.js_scope(ScopeKind::Function, parent, function.span, flags);
        if expression && let Some(name) = &function.name {
            self.declare(scope, &name.name, DeclKind::Function, name.span);
        }
        for param in &function.params {
            self.declare(scope, &param.name.name, DeclKind::Parameter, param.name.span);
            if let Some(annotation) = &param.type_annotation {
                self.use_annotation_type(&annotation.name, scope);
            }
        }
        if let Some(annotation) = &function.return_type {
            self.use_annotation_type(&annotation.name, scope);
        }
        for param in &function.params {
            if let Some(default) = &param.default {
                self.visit_expr(default, scope);
            }
        }
        match &function.body {
            FunctionBody::Block(block) => {
                self.enter_block(&block.stmts, scope, true);
                for stmt in &block.stmts {
                    self.bind_stmt(stmt, scope);
                }
            }
            FunctionBody::Expr(expr) => self.visit_expr(expr, scope),
        }
        scope
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Declare the names a block introduces: `let`/`const`/function
    /// declarations in `stmts`, plus every `var` of the function body when
    /// `function_level` is set.
    fn enter_block(&mut self, stmts: &[Stmt], scope: ScopeId, function_level: bool) {
        if function_level {
            let mut vars = Vec::new();
            collect_var_names(stmts, &mut vars);
            for (name, span) in vars {
                self.declare(scope, &name, DeclKind::Var, span);
            }
        }
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Var(decl) if decl.kind != VarKind::Var => {
                    self.declare_lexical(decl, scope);
                }
                StmtKind::Function(function) => {
                    if let Some(name) = &function.name {
                        self.declare(scope, &name.name, DeclKind::Function, name.span);
                    }
                }
                _ => {}
            }
        }
    }

    fn declare_lexical(&mut self, decl: &VarDecl, scope: ScopeId) {
        for declarator in &decl.declarators {
            self.declare(scope, &declarator.name.name, DeclKind::Lexical, declarator.name.span);
        }
    }

    pub(crate) fn declare(&mut self, scope: ScopeId, name: &str, kind: DeclKind, span: Span) {
        let declaration = JsDeclaration { kind, span };
        let previous = self.tree.get(scope).identifiers.get(name).copied();
        let Some(previous) = previous else {
            self.node_mut(scope)
                .identifiers
                .insert(name.to_string(), declaration);
            return;
        };
        let conflict = match (previous.kind, kind) {
            (DeclKind::Injected, _) => {
                self.node_mut(scope)
                    .identifiers
                    .insert(name.to_string(), declaration);
                return;
            }
            (DeclKind::Lexical, _) | (_, DeclKind::Lexical) => true,
            _ => false,
        };
        if !conflict || previous.span == span {
            return;
        }
        let (first, second) = if previous.span.start <= span.start {
            (previous.span, span)
        } else {
            (span, previous.span)
        };
        self.push_diagnostic(
            Diagnostic::new(
                category::SYNTAX,
                second,
                format!("Identifier '{name}' has already been declared"),
            )
            .with_note(first, format!("Note: previous declaration of '{name}' here")),
        );
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn bind_stmt(&mut self, stmt: &Stmt, scope: ScopeId) {
        match &stmt.kind {
            StmtKind::Expr(expr) | StmtKind::Throw(expr) => self.visit_expr(expr, scope),
            StmtKind::Var(decl) => self.visit_var_inits(decl, scope),
            StmtKind::Block(block) => self.bind_block(block, scope, ScopeFlags::empty()),
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test, scope);
                self.bind_stmt(consequent, scope);
                if let Some(alternate) = alternate {
                    self.bind_stmt(alternate, scope);
                }
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.visit_expr(value, scope);
                }
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                let inner = self.js_scope(ScopeKind::Block, scope, stmt.span, ScopeFlags::empty());
                if let Some(init) = init {
                    self.bind_for_init(init, inner);
                }
                if let Some(test) = test {
                    self.visit_expr(test, inner);
                }
                if let Some(update) = update {
                    self.visit_expr(update, inner);
                }
                self.bind_stmt(body, inner);
            }
            StmtKind::ForIn {
                left, right, body, ..
            } => {
                self.visit_expr(right, scope);
                let inner = self.js_scope(ScopeKind::Block, scope, stmt.span, ScopeFlags::empty());
                self.bind_for_init(left, inner);
                self.bind_stmt(body, inner);
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.visit_expr(test, scope);
                self.bind_stmt(body, scope);
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.bind_block(block, scope, ScopeFlags::empty());
                if let Some(handler) = handler {
                    let catch = self.js_scope(ScopeKind::Block, scope, handler.span, ScopeFlags::CATCH);
                    if let Some(param) = &handler.param {
                        self.declare(catch, &param.name, DeclKind::Parameter, param.span);
                    }
                    self.enter_block(&handler.body.stmts, catch, false);
                    for s in &handler.body.stmts {
                        self.bind_stmt(s, catch);
                    }
                }
                if let Some(finalizer) = finalizer {
                    self.bind_block(finalizer, scope, ScopeFlags::empty());
                }
            }
            StmtKind::Function(function) => {
                self.bind_function(function, scope, false);
            }
            StmtKind::Switch {
                discriminant,
                cases,
            } => {
                self.visit_expr(discriminant, scope);
                let inner = self.js_scope(ScopeKind::Block, scope, stmt.span, ScopeFlags::empty());
                for case in cases {
                    self.enter_block(&case.body, inner, false);
                }
                for case in cases {
                    if let Some(test) = &case.test {
                        self.visit_expr(test, inner);
                    }
                    for s in &case.body {
                        self.bind_stmt(s, inner);
                    }
                }
            }
            StmtKind::Labeled { body, .. } => self.bind_stmt(body, scope),
            StmtKind::With { object, body } => {
                self.report(
                    category::WITH,
                    Span::new(stmt.span.start, stmt.span.start + 4),
                    "with statements are strongly discouraged in QML and might cause false positives when analysing unqualified identifiers",
                );
                self.visit_expr(object, scope);
                let inner = self.js_scope(ScopeKind::Block, scope, stmt.span, ScopeFlags::WITH);
                self.bind_stmt(body, inner);
            }
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => {}
        }
    }

    fn bind_block(&mut self, block: &Block, scope: ScopeId, flags: ScopeFlags) {
        let inner = self.js_scope(ScopeKind::Block, scope, block.span, flags);
        self.enter_block(&block.stmts, inner, false);
        for stmt in &block.stmts {
            self.bind_stmt(stmt, inner);
        }
    }

    fn bind_for_init(&mut self, init: &ForInit, scope: ScopeId) {
        match init {
            ForInit::Var(decl) => {
                if decl.kind != VarKind::Var {
                    self.declare_lexical(decl, scope);
                }
                self.visit_var_inits(decl, scope);
            }
            ForInit::Expr(expr) => self.visit_expr(expr, scope),
        }
    }

    fn visit_var_inits(&mut self, decl: &VarDecl, scope: ScopeId) {
        for declarator in &decl.declarators {
            if let Some(init) = &declarator.init {
                self.visit_expr(init, scope);
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn visit_expr(&mut self, expr: &Expr, scope: ScopeId) {
        if let Some(path) = expr.as_member_path() {
            self.record_reference(&path, scope, false, false);
            return;
        }
        match &expr.kind {
            ExprKind::Member { object, .. } => self.visit_expr(object, scope),
            ExprKind::Index { object, index, .. } => {
                self.visit_expr(object, scope);
                self.visit_expr(index, scope);
            }
            ExprKind::Call {
                callee, arguments, ..
            }
            | ExprKind::New { callee, arguments } => {
                match callee.as_member_path() {
                    Some(path) => self.record_reference(&path, scope, true, false),
                    None => self.visit_expr(callee, scope),
                }
                for argument in arguments {
                    self.visit_expr(argument, scope);
                }
            }
            ExprKind::Assign { target, value, .. } => {
                match target.as_member_path() {
                    Some(path) => self.record_reference(&path, scope, false, true),
                    None => self.visit_expr(target, scope),
                }
                self.visit_expr(value, scope);
            }
            ExprKind::Update { operand, .. } => match operand.as_member_path() {
                Some(path) => self.record_reference(&path, scope, false, true),
                None => self.visit_expr(operand, scope),
            },
            // `typeof x` is how scripts probe for names that may not exist.
            ExprKind::Unary { op: "typeof", operand } if operand.as_identifier().is_some() => {}
            ExprKind::Unary { operand, .. } | ExprKind::Spread(operand) => {
                self.visit_expr(operand, scope);
            }
            ExprKind::Binary { .. } => {
                // Operator chains nest to the left; walk the spine in a loop.
                let mut rights = Vec::new();
                let mut current = expr;
                while let ExprKind::Binary { left, right, .. } = &current.kind {
                    rights.push(right.as_ref());
                    current = left;
                }
                self.visit_expr(current, scope);
                for right in rights.into_iter().rev() {
                    self.visit_expr(right, scope);
                }
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test, scope);
                self.visit_expr(consequent, scope);
                self.visit_expr(alternate, scope);
            }
            ExprKind::Sequence(items) | ExprKind::Array(items) | ExprKind::Template(items) => {
                for item in items {
                    self.visit_expr(item, scope);
                }
            }
            ExprKind::Object(properties) => {
                for property in properties {
                    if let PropertyKey::Computed(key) = &property.key {
                        self.visit_expr(key, scope);
                    }
                    self.visit_expr(&property.value, scope);
                }
            }
            ExprKind::Function(function) => {
                self.bind_function(function, scope, true);
            }
            ExprKind::String(literal) => {
                if literal.multiline {
                    self.report_multiline_string(expr.span);
                }
            }
            ExprKind::Identifier(_)
            | ExprKind::This
            | ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Number(_)
            | ExprKind::Regex
            | ExprKind::Elision => {}
        }
    }

    fn record_reference(&mut self, path: &[(&str, Span)], scope: ScopeId, called: bool, assigned: bool) {
        let Some(&(head, head_span)) = path.first() else {
            return;
        };
        let members: SmallVec<[(String, Span); 4]> = path[1..]
            .iter()
            .map(|(name, span)| (name.to_string(), *span))
            .collect();

        if let Some(namespace) = self.tree.imports.lookup_namespace(head) {
            let imports = namespace.imports.clone();
            let member_type = members
                .first()
                .and_then(|(name, span)| namespace.types.get(name).map(|t| (name.clone(), *span, *t)));
            for import in imports {
                self.mark_import_used(import);
            }
            if let Some((name, span, found)) = member_type {
                self.record_type_use(
                    format!("{head}.{name}"),
                    head_span.merge(span),
                    found.id,
                    scope,
                    TypeUse::Script,
                    false,
                );
            }
        } else if super::state_objects::starts_uppercase(head)
            && let Some(found) = self.tree.imports.lookup_type(head)
        {
            self.mark_import_used(found.import);
            self.record_type_use(head.to_string(), head_span, found.id, scope, TypeUse::Script, false);
        }

        self.tree.references.push(JsReference {
            name: head.to_string(),
            span: head_span,
            scope,
            members,
            called,
            assigned,
        });
    }

    fn report_multiline_string(&mut self, span: Span) {
        let raw = span.slice(self.source);
        let inner = raw
            .get(1..raw.len().saturating_sub(1))
            .unwrap_or_default();
        let escaped = inner.replace('`', "\\`").replace("${", "\\${");
        self.push_diagnostic(
            Diagnostic::new(
                category::MULTILINE_STRINGS,
                span,
                "String contains unescaped line terminator which is deprecated.",
            )
            .with_fix(
                FixSuggestion::new("Use a template literal instead.", span, format!("`{escaped}`"))
                    .auto_applicable(),
            ),
        );
    }
}

/// `var` names declared anywhere in `stmts`, without entering nested
/// functions.
fn collect_var_names(stmts: &[Stmt], out: &mut Vec<(String, Span)>) {
    for stmt in stmts {
        collect_var_names_in(stmt, out);
    }
}

fn collect_var_names_in(stmt: &Stmt, out: &mut Vec<(String, Span)>) {
    let push_decl = |decl: &VarDecl, out: &mut Vec<(String, Span)>| {
        if decl.kind == VarKind::Var {
            out.extend(
                decl.declarators
                    .iter()
                    .map(|d| (d.name.name.clone(), d.name.span)),
            );
        }
    };
    match &stmt.kind {
        StmtKind::Var(decl) => push_decl(decl, out),
        StmtKind::Block(block) => collect_var_names(&block.stmts, out),
        StmtKind::If {
            consequent,
            alternate,
            ..
        } => {
            collect_var_names_in(consequent, out);
            if let Some(alternate) = alternate {
                collect_var_names_in(alternate, out);
            }
        }
        StmtKind::For { init, body, .. } => {
            if let Some(ForInit::Var(decl)) = init {
                push_decl(decl, out);
            }
            collect_var_names_in(body, out);
        }
        StmtKind::ForIn { left, body, .. } => {
            if let ForInit::Var(decl) = left {
                push_decl(decl, out);
            }
            collect_var_names_in(body, out);
        }
        StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } => {
            collect_var_names_in(body, out);
        }
        StmtKind::Labeled { body, .. } | StmtKind::With { body, .. } => {
            collect_var_names_in(body, out)
        }
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            collect_var_names(&block.stmts, out);
            if let Some(handler) = handler {
                collect_var_names(&handler.body.stmts, out);
            }
            if let Some(finalizer) = finalizer {
                collect_var_names(&finalizer.stmts, out);
            }
        }
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                collect_var_names(&case.body, out);
            }
        }
        _ => {}
    }
}
