//! Scope graph construction.
//!
//! Each scope declares its bindings on entry, before any of its statements
//! are walked: `var` and parameters belong to the nearest function (or the
//! program), `let`, `const`, classes and function declarations to the
//! enclosing statement list. References then resolve against the full set,
//! which matches JavaScript hoisting.
//!
//! Outside strict code a function declared in a nested block is also bound
//! in the enclosing function, as web browsers do, unless a `let`, `const` or
//! class of the same name already lives there.

use crate::graph::*;
use jsnorm_syntax::ir::*;
use std::collections::HashSet;

/// Build the scope graph of a program.
pub fn analyze(program: &Program) -> ScopeGraph {
    let mut analyzer = Analyzer {
        graph: ScopeGraph::default(),
        current: ScopeId(0),
        strict: has_use_strict(&program.body),
        hoisted: HashSet::new(),
    };
    analyzer.graph.scopes.push(Scope {
        kind: ScopeKind::Program,
        parent: None,
        bindings: Vec::new(),
    });

    analyzer.hoist_vars(&program.body);
    analyzer.declare_lexical(&program.body);
    analyzer.hoist_block_functions(&program.body, false);
    analyzer.walk_stmts(&program.body);
    analyzer.graph
}

/// Whether a body's directive prologue contains `"use strict"`.
fn has_use_strict(body: &[Stmt]) -> bool {
    body.iter()
        .filter(|stmt| !matches!(stmt, Stmt::Comment(_)))
        .map_while(|stmt| match stmt {
            Stmt::Expr(Expr::Literal(Literal::String(text))) => Some(text),
            _ => None,
        })
        .any(|text| text == "use strict")
}

struct Analyzer {
    graph: ScopeGraph,
    current: ScopeId,
    strict: bool,
    /// Name ids of block functions already bound in their enclosing function.
    hoisted: HashSet<NodeId>,
}

impl Analyzer {
    /// Enter a child scope of the current one. Returns the scope to restore.
    fn enter(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.graph.scopes.len() as u32);
        self.graph.scopes.push(Scope {
            kind,
            parent: Some(self.current),
            bindings: Vec::new(),
        });
        std::mem::replace(&mut self.current, id)
    }

    fn exit(&mut self, saved: ScopeId) {
        self.current = saved;
    }

    fn declare(&mut self, ident: &Ident, kind: BindingKind) {
        let Some(name) = ident.name() else {
            return;
        };
        let scope = self.current;

        let existing = self.graph.scopes[scope.0 as usize]
            .bindings
            .iter()
            .copied()
            .find(|b| self.graph.bindings[b.0 as usize].name == name);

        let binding = match existing {
            Some(binding) => binding,
            None => {
                let binding = BindingId(self.graph.bindings.len() as u32);
                self.graph.bindings.push(Binding {
                    name: name.to_string(),
                    original: name.to_string(),
                    kind,
                    scope,
                    declarations: Vec::new(),
                    references: Vec::new(),
                });
                self.graph.scopes[scope.0 as usize].bindings.push(binding);
                binding
            }
        };

        if let Some(id) = ident.id() {
            self.graph.bindings[binding.0 as usize].declarations.push(id);
            self.graph.occurrences.insert(id, binding);
        }
    }

    fn reference(&mut self, ident: &Ident) {
        let Some(name) = ident.name() else {
            return;
        };
        match self.graph.lookup(self.current, name) {
            Some(binding) => {
                if let Some(id) = ident.id() {
                    self.graph.bindings[binding.0 as usize]
                        .references
                        .push(Reference {
                            id,
                            scope: self.current,
                        });
                    self.graph.occurrences.insert(id, binding);
                }
            }
            None => {
                self.graph.globals.insert(name.to_string());
            }
        }
    }

    fn declare_pat(&mut self, pat: &Pat, kind: BindingKind) {
        match pat {
            Pat::Ident(ident) => self.declare(ident, kind),
            Pat::Array(elements) => {
                for element in elements.iter().flatten() {
                    self.declare_pat(element, kind);
                }
            }
            Pat::Object(props) => {
                for prop in props {
                    match prop {
                        PatProp::KeyValue { value, .. } => self.declare_pat(value, kind),
                        PatProp::Shorthand { name, .. } => self.declare(name, kind),
                        PatProp::Rest(pat) => self.declare_pat(pat, kind),
                    }
                }
            }
            Pat::Default { target, .. } => self.declare_pat(target, kind),
            Pat::Rest(pat) => self.declare_pat(pat, kind),
        }
    }

    /// Expressions inside a binding pattern: defaults and computed keys.
    fn walk_pat_exprs(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(_) => {}
            Pat::Array(elements) => {
                for element in elements.iter().flatten() {
                    self.walk_pat_exprs(element);
                }
            }
            Pat::Object(props) => {
                for prop in props {
                    match prop {
                        PatProp::KeyValue { key, value } => {
                            self.walk_prop_key(key);
                            self.walk_pat_exprs(value);
                        }
                        PatProp::Shorthand { default, .. } => {
                            if let Some(default) = default {
                                self.walk_expr(default);
                            }
                        }
                        PatProp::Rest(pat) => self.walk_pat_exprs(pat),
                    }
                }
            }
            Pat::Default { target, value } => {
                self.walk_pat_exprs(target);
                self.walk_expr(value);
            }
            Pat::Rest(pat) => self.walk_pat_exprs(pat),
        }
    }

    /// Declare every `var` reachable without crossing a function boundary.
    fn hoist_vars(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.hoist_vars_stmt(stmt);
        }
    }

    fn hoist_vars_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(decl) => self.hoist_var_decl(decl),
            Stmt::Block(stmts) | Stmt::Sequence(stmts) => self.hoist_vars(stmts),
            Stmt::If {
                consequent,
                alternate,
                ..
            } => {
                self.hoist_vars_stmt(consequent);
                if let Some(alternate) = alternate {
                    self.hoist_vars_stmt(alternate);
                }
            }
            Stmt::For { init, body, .. } => {
                if let Some(ForInit::Var(decl)) = init {
                    self.hoist_var_decl(decl);
                }
                self.hoist_vars_stmt(body);
            }
            Stmt::ForIn { left, body, .. } | Stmt::ForOf { left, body, .. } => {
                if let ForInit::Var(decl) = left {
                    self.hoist_var_decl(decl);
                }
                self.hoist_vars_stmt(body);
            }
            Stmt::While { body, .. } | Stmt::DoWhile { body, .. } | Stmt::Labeled { body, .. } => {
                self.hoist_vars_stmt(body)
            }
            Stmt::Switch { cases, .. } => {
                for case in cases {
                    self.hoist_vars(&case.body);
                }
            }
            Stmt::Try {
                block,
                handler,
                finalizer,
            } => {
                self.hoist_vars(block);
                if let Some(handler) = handler {
                    self.hoist_vars(&handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.hoist_vars(finalizer);
                }
            }
            _ => {}
        }
    }

    fn hoist_var_decl(&mut self, decl: &VarDecl) {
        if decl.kind != VarKind::Var {
            return;
        }
        for declarator in &decl.declarators {
            self.declare_pat(&declarator.target, BindingKind::Var);
        }
    }

    /// Bind functions declared in nested blocks in the current function
    /// scope. Runs after the scope's own lexical declarations.
    fn hoist_block_functions(&mut self, stmts: &[Stmt], nested: bool) {
        if self.strict {
            return;
        }
        for stmt in stmts {
            self.hoist_block_functions_stmt(stmt, nested);
        }
    }

    fn hoist_block_functions_stmt(&mut self, stmt: &Stmt, nested: bool) {
        match stmt {
            Stmt::Function(function) if nested => self.hoist_block_function(function),
            Stmt::Sequence(stmts) => self.hoist_block_functions(stmts, nested),
            Stmt::Block(stmts) => self.hoist_block_functions(stmts, true),
            Stmt::Labeled { body, .. }
            | Stmt::For { body, .. }
            | Stmt::ForIn { body, .. }
            | Stmt::ForOf { body, .. }
            | Stmt::While { body, .. }
            | Stmt::DoWhile { body, .. } => self.hoist_block_functions_stmt(body, true),
            Stmt::If {
                consequent,
                alternate,
                ..
            } => {
                self.hoist_block_functions_stmt(consequent, true);
                if let Some(alternate) = alternate {
                    self.hoist_block_functions_stmt(alternate, true);
                }
            }
            Stmt::Switch { cases, .. } => {
                for case in cases {
                    self.hoist_block_functions(&case.body, true);
                }
            }
            Stmt::Try {
                block,
                handler,
                finalizer,
            } => {
                self.hoist_block_functions(block, true);
                if let Some(handler) = handler {
                    self.hoist_block_functions(&handler.body, true);
                }
                if let Some(finalizer) = finalizer {
                    self.hoist_block_functions(finalizer, true);
                }
            }
            _ => {}
        }
    }

    fn hoist_block_function(&mut self, function: &Function) {
        let Some(name) = &function.name else {
            return;
        };
        let Some(text) = name.name() else {
            return;
        };
        let shadowed = self.graph.scopes[self.current.0 as usize]
            .bindings
            .iter()
            .map(|b| &self.graph.bindings[b.0 as usize])
            .any(|b| {
                b.name == text
                    && matches!(
                        b.kind,
                        BindingKind::Let | BindingKind::Const | BindingKind::Class
                    )
            });
        if shadowed {
            return;
        }
        self.declare(name, BindingKind::Function);
        if let Some(id) = name.id() {
            self.hoisted.insert(id);
        }
    }

    /// Declare the block-scoped names of one statement list.
    fn declare_lexical(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Var(decl) => self.declare_lexical_decl(decl),
                Stmt::Function(function) => {
                    if let Some(name) = &function.name {
                        if name.id().is_some_and(|id| self.hoisted.contains(&id)) {
                            continue;
                        }
                        self.declare(name, BindingKind::Function);
                    }
                }
                Stmt::Class(class) => {
                    if let Some(name) = &class.name {
                        self.declare(name, BindingKind::Class);
                    }
                }
                Stmt::Sequence(stmts) => self.declare_lexical(stmts),
                _ => {}
            }
        }
    }

    fn declare_lexical_decl(&mut self, decl: &VarDecl) {
        let kind = match decl.kind {
            VarKind::Var => return,
            VarKind::Let => BindingKind::Let,
            VarKind::Const => BindingKind::Const,
        };
        for declarator in &decl.declarators {
            self.declare_pat(&declarator.target, kind);
        }
    }

    /// A nested statement list with its own block scope.
    fn walk_block(&mut self, stmts: &[Stmt]) {
        let saved = self.enter(ScopeKind::Block);
        self.declare_lexical(stmts);
        self.walk_stmts(stmts);
        self.exit(saved);
    }

    fn walk_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.walk_stmt(stmt);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) | Stmt::Throw(expr) => self.walk_expr(expr),
            Stmt::Var(decl) => self.walk_var_decl(decl),
            Stmt::Function(function) => self.walk_function(function, false),
            Stmt::Class(class) => self.walk_class(class, false),
            Stmt::Block(stmts) => self.walk_block(stmts),
            Stmt::Sequence(stmts) => self.walk_stmts(stmts),
            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                self.walk_expr(test);
                self.walk_stmt(consequent);
                if let Some(alternate) = alternate {
                    self.walk_stmt(alternate);
                }
            }
            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                let saved = self.enter(ScopeKind::For);
                match init {
                    Some(ForInit::Var(decl)) => {
                        self.declare_lexical_decl(decl);
                        self.walk_var_decl(decl);
                    }
                    Some(ForInit::Expr(expr)) => self.walk_expr(expr),
                    None => {}
                }
                if let Some(test) = test {
                    self.walk_expr(test);
                }
                if let Some(update) = update {
                    self.walk_expr(update);
                }
                self.walk_stmt(body);
                self.exit(saved);
            }
            Stmt::ForIn { left, right, body } | Stmt::ForOf { left, right, body, .. } => {
                let saved = self.enter(ScopeKind::For);
                match left {
                    ForInit::Var(decl) => {
                        self.declare_lexical_decl(decl);
                        self.walk_var_decl(decl);
                    }
                    ForInit::Expr(expr) => self.walk_expr(expr),
                }
                self.walk_expr(right);
                self.walk_stmt(body);
                self.exit(saved);
            }
            Stmt::While { test, body } | Stmt::DoWhile { body, test } => {
                self.walk_expr(test);
                self.walk_stmt(body);
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.walk_expr(value);
                }
            }
            Stmt::Labeled { body, .. } => self.walk_stmt(body),
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                self.walk_expr(discriminant);
                // All cases share one block scope.
                let saved = self.enter(ScopeKind::Block);
                for case in cases {
                    self.declare_lexical(&case.body);
                }
                for case in cases {
                    if let Some(test) = &case.test {
                        self.walk_expr(test);
                    }
                    self.walk_stmts(&case.body);
                }
                self.exit(saved);
            }
            Stmt::Try {
                block,
                handler,
                finalizer,
            } => {
                self.walk_block(block);
                if let Some(handler) = handler {
                    let saved = self.enter(ScopeKind::Catch);
                    if let Some(param) = &handler.param {
                        self.declare_pat(param, BindingKind::CatchParam);
                        self.walk_pat_exprs(param);
                    }
                    self.walk_block(&handler.body);
                    self.exit(saved);
                }
                if let Some(finalizer) = finalizer {
                    self.walk_block(finalizer);
                }
            }
            Stmt::Empty
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Debugger
            | Stmt::Comment(_)
            | Stmt::Placeholder { .. } => {}
        }
    }

    /// Declarations are already made; walk patterns and initializers.
    fn walk_var_decl(&mut self, decl: &VarDecl) {
        for declarator in &decl.declarators {
            self.walk_pat_exprs(&declarator.target);
            if let Some(init) = &declarator.init {
                self.walk_expr(init);
            }
        }
    }

    fn walk_function(&mut self, function: &Function, is_expression: bool) {
        let saved = self.enter(ScopeKind::Function);
        // A function expression's own name is only visible inside it.
        if is_expression {
            if let Some(name) = &function.name {
                self.declare(name, BindingKind::Function);
            }
        }
        self.walk_function_body(&function.params, &function.body);
        self.exit(saved);
    }

    /// Parameters and body, inside an already entered function scope.
    fn walk_function_body(&mut self, params: &[Pat], body: &[Stmt]) {
        let strict = self.strict;
        self.strict = strict || has_use_strict(body);
        for param in params {
            self.declare_pat(param, BindingKind::Param);
        }
        self.hoist_vars(body);
        self.declare_lexical(body);
        self.hoist_block_functions(body, false);
        for param in params {
            self.walk_pat_exprs(param);
        }
        self.walk_stmts(body);
        self.strict = strict;
    }

    fn walk_class(&mut self, class: &Class, is_expression: bool) {
        if let Some(super_class) = &class.super_class {
            self.walk_expr(super_class);
        }
        let saved = self.enter(ScopeKind::Class);
        // Class bodies are always strict.
        let strict = std::mem::replace(&mut self.strict, true);
        if is_expression {
            if let Some(name) = &class.name {
                self.declare(name, BindingKind::Class);
            }
        }
        for member in &class.members {
            match member {
                ClassMember::Method { key, function, .. } => {
                    self.walk_prop_key(key);
                    self.walk_function(function, false);
                }
                ClassMember::Field { key, value, .. } => {
                    self.walk_prop_key(key);
                    if let Some(value) = value {
                        self.walk_expr(value);
                    }
                }
                ClassMember::StaticBlock(body) => {
                    let inner = self.enter(ScopeKind::Function);
                    self.walk_function_body(&[], body);
                    self.exit(inner);
                }
            }
        }
        self.strict = strict;
        self.exit(saved);
    }

    fn walk_prop_key(&mut self, key: &PropKey) {
        if let PropKey::Computed(expr) = key {
            self.walk_expr(expr);
        }
    }

    fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.reference(ident),
            Expr::Template(template) => {
                for expr in &template.exprs {
                    self.walk_expr(expr);
                }
            }
            Expr::TaggedTemplate { tag, template } => {
                self.walk_expr(tag);
                for expr in &template.exprs {
                    self.walk_expr(expr);
                }
            }
            Expr::Array(elements) => {
                for element in elements.iter().flatten() {
                    self.walk_expr(element);
                }
            }
            Expr::Object(properties) => {
                for property in properties {
                    match property {
                        Property::KeyValue { key, value } => {
                            self.walk_prop_key(key);
                            self.walk_expr(value);
                        }
                        Property::Shorthand(ident) => self.reference(ident),
                        Property::Method { key, function, .. } => {
                            self.walk_prop_key(key);
                            self.walk_function(function, false);
                        }
                        Property::Spread(expr) => self.walk_expr(expr),
                    }
                }
            }
            Expr::Function(function) => self.walk_function(function, true),
            Expr::Arrow(arrow) => {
                let saved = self.enter(ScopeKind::Function);
                match &arrow.body {
                    ArrowBody::Block(body) => self.walk_function_body(&arrow.params, body),
                    ArrowBody::Expr(body) => {
                        self.walk_function_body(&arrow.params, &[]);
                        self.walk_expr(body);
                    }
                }
                self.exit(saved);
            }
            Expr::Class(class) => self.walk_class(class, true),
            Expr::Unary { arg, .. }
            | Expr::Update { arg, .. }
            | Expr::Spread(arg)
            | Expr::Await(arg) => self.walk_expr(arg),
            Expr::Binary { left, right, .. } => {
                self.walk_expr(left);
                self.walk_expr(right);
            }
            Expr::Assign { target, value, .. } => {
                self.walk_expr(target);
                self.walk_expr(value);
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.walk_expr(test);
                self.walk_expr(consequent);
                self.walk_expr(alternate);
            }
            Expr::Call { callee, args, .. } | Expr::New { callee, args } => {
                self.walk_expr(callee);
                for arg in args {
                    self.walk_expr(arg);
                }
            }
            Expr::Member {
                object,
                property,
                computed,
                ..
            } => {
                self.walk_expr(object);
                if *computed {
                    self.walk_expr(property);
                }
            }
            Expr::Sequence(exprs) => {
                for expr in exprs {
                    self.walk_expr(expr);
                }
            }
            Expr::Yield { arg, .. } => {
                if let Some(arg) = arg {
                    self.walk_expr(arg);
                }
            }
            Expr::Literal(_) | Expr::This | Expr::Super | Expr::Placeholder { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsnorm_syntax::read_javascript;

    fn graph(source: &str) -> ScopeGraph {
        analyze(&read_javascript(source).unwrap())
    }

    fn binding_named<'g>(graph: &'g ScopeGraph, name: &str) -> (BindingId, &'g Binding) {
        graph
            .bindings()
            .find(|(_, b)| b.name == name)
            .unwrap_or_else(|| panic!("no binding named {}", name))
    }

    #[test]
    fn test_var_hoists_to_function_scope() {
        let g = graph("function f() { if (a) { var x = 1; } return x; }");
        let (_, x) = binding_named(&g, "x");
        assert_eq!(x.kind, BindingKind::Var);
        assert_eq!(g.scope(x.scope).kind, ScopeKind::Function);
        assert_eq!(x.references.len(), 1);
        assert!(g.is_global("a"));
    }

    #[test]
    fn test_let_is_block_scoped() {
        let g = graph("{ let x = 1; } x;");
        let (_, x) = binding_named(&g, "x");
        assert_eq!(g.scope(x.scope).kind, ScopeKind::Block);
        assert!(x.references.is_empty());
        assert!(g.is_global("x"));
    }

    #[test]
    fn test_function_declarations_resolve_before_definition() {
        let g = graph("f(); function f() {}");
        let (_, f) = binding_named(&g, "f");
        assert_eq!(f.kind, BindingKind::Function);
        assert_eq!(f.references.len(), 1);
    }

    #[test]
    fn test_block_function_is_visible_in_enclosing_function() {
        let g = graph("if (a) { function h() {} } h();");
        let (_, h) = binding_named(&g, "h");
        assert_eq!(g.scope(h.scope).kind, ScopeKind::Program);
        assert_eq!(h.references.len(), 1);
        assert!(!g.is_global("h"));
    }

    #[test]
    fn test_strict_block_function_stays_in_block() {
        let g = graph("\"use strict\";\nif (a) { function h() {} } h();");
        let (_, h) = binding_named(&g, "h");
        assert_eq!(g.scope(h.scope).kind, ScopeKind::Block);
        assert!(h.references.is_empty());
        assert!(g.is_global("h"));
    }

    #[test]
    fn test_block_function_under_let_stays_in_block() {
        let g = graph("function f() { let h = 1; { function h() {} } return h; }");
        let (_, h) = g
            .bindings()
            .find(|(_, b)| b.name == "h" && b.kind == BindingKind::Function)
            .unwrap();
        assert_eq!(g.scope(h.scope).kind, ScopeKind::Block);
    }

    #[test]
    fn test_params_and_catch() {
        let g = graph("function f(a, { b = a }) { try {} catch (e) { e; } }");
        let (_, a) = binding_named(&g, "a");
        assert_eq!(a.kind, BindingKind::Param);
        assert_eq!(a.references.len(), 1);
        let (_, e) = binding_named(&g, "e");
        assert_eq!(g.scope(e.scope).kind, ScopeKind::Catch);
        assert_eq!(e.references.len(), 1);
    }
}
