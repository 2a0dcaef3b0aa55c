//! Mutable traversal of the syntax tree.
//!
//! Implement [`VisitMut`] for an in-place rewriting pass, overriding only the
//! methods you need, and call the matching `walk_*` function inside an
//! override to keep the default recursion.
//!
//! ```rust
//! use jsnorm_syntax::ir::{Expr, Ident};
//! use jsnorm_syntax::visit_mut::{VisitMut, walk_expr_mut};
//!
//! struct Uppercase;
//!
//! impl VisitMut for Uppercase {
//!     fn visit_ident_mut(&mut self, ident: &mut Ident) {
//!         if let Ident::Name { name, .. } = ident {
//!             *name = name.to_uppercase();
//!         }
//!     }
//! }
//!
//! let mut expr = Expr::call(Expr::ident("f"), vec![Expr::ident("x")]);
//! Uppercase.visit_expr_mut(&mut expr);
//! assert_eq!(expr, Expr::call(Expr::ident("F"), vec![Expr::ident("X")]));
//! ```

use crate::ir::*;

pub trait VisitMut: Sized {
    fn visit_program_mut(&mut self, program: &mut Program) {
        walk_program_mut(self, program);
    }

    /// A statement list: program body, block, function body or case body.
    fn visit_stmts_mut(&mut self, stmts: &mut Vec<Stmt>) {
        walk_stmts_mut(self, stmts);
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        walk_stmt_mut(self, stmt);
    }

    /// The single-statement body of `if`, loops and labels.
    fn visit_body_mut(&mut self, body: &mut Stmt) {
        self.visit_stmt_mut(body);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }

    fn visit_pat_mut(&mut self, pat: &mut Pat) {
        walk_pat_mut(self, pat);
    }

    fn visit_ident_mut(&mut self, _ident: &mut Ident) {}

    fn visit_function_mut(&mut self, function: &mut Function) {
        walk_function_mut(self, function);
    }

    fn visit_class_mut(&mut self, class: &mut Class) {
        walk_class_mut(self, class);
    }
}

pub fn walk_program_mut<V: VisitMut>(v: &mut V, program: &mut Program) {
    v.visit_stmts_mut(&mut program.body);
}

pub fn walk_stmts_mut<V: VisitMut>(v: &mut V, stmts: &mut Vec<Stmt>) {
    for stmt in stmts.iter_mut() {
        v.visit_stmt_mut(stmt);
    }
}

pub fn walk_stmt_mut<V: VisitMut>(v: &mut V, stmt: &mut Stmt) {
    match stmt {
        Stmt::Expr(expr) | Stmt::Throw(expr) => v.visit_expr_mut(expr),
        Stmt::Var(decl) => walk_var_decl_mut(v, decl),
        Stmt::Function(function) => v.visit_function_mut(function),
        Stmt::Class(class) => v.visit_class_mut(class),
        Stmt::Block(stmts) | Stmt::Sequence(stmts) => v.visit_stmts_mut(stmts),
        Stmt::If {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr_mut(test);
            v.visit_body_mut(consequent);
            if let Some(alternate) = alternate {
                v.visit_body_mut(alternate);
            }
        }
        Stmt::For {
            init,
            test,
            update,
            body,
        } => {
            if let Some(init) = init {
                walk_for_init_mut(v, init);
            }
            if let Some(test) = test {
                v.visit_expr_mut(test);
            }
            if let Some(update) = update {
                v.visit_expr_mut(update);
            }
            v.visit_body_mut(body);
        }
        Stmt::ForIn { left, right, body } | Stmt::ForOf { left, right, body, .. } => {
            walk_for_init_mut(v, left);
            v.visit_expr_mut(right);
            v.visit_body_mut(body);
        }
        Stmt::While { test, body } | Stmt::DoWhile { body, test } => {
            v.visit_expr_mut(test);
            v.visit_body_mut(body);
        }
        Stmt::Return(value) => {
            if let Some(value) = value {
                v.visit_expr_mut(value);
            }
        }
        Stmt::Labeled { body, .. } => v.visit_body_mut(body),
        Stmt::Switch {
            discriminant,
            cases,
        } => {
            v.visit_expr_mut(discriminant);
            for case in cases {
                if let Some(test) = &mut case.test {
                    v.visit_expr_mut(test);
                }
                v.visit_stmts_mut(&mut case.body);
            }
        }
        Stmt::Try {
            block,
            handler,
            finalizer,
        } => {
            v.visit_stmts_mut(block);
            if let Some(handler) = handler {
                if let Some(param) = &mut handler.param {
                    v.visit_pat_mut(param);
                }
                v.visit_stmts_mut(&mut handler.body);
            }
            if let Some(finalizer) = finalizer {
                v.visit_stmts_mut(finalizer);
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

pub fn walk_var_decl_mut<V: VisitMut>(v: &mut V, decl: &mut VarDecl) {
    for declarator in &mut decl.declarators {
        v.visit_pat_mut(&mut declarator.target);
        if let Some(init) = &mut declarator.init {
            v.visit_expr_mut(init);
        }
    }
}

pub fn walk_for_init_mut<V: VisitMut>(v: &mut V, init: &mut ForInit) {
    match init {
        ForInit::Var(decl) => walk_var_decl_mut(v, decl),
        ForInit::Expr(expr) => v.visit_expr_mut(expr),
    }
}

pub fn walk_expr_mut<V: VisitMut>(v: &mut V, expr: &mut Expr) {
    match expr {
        Expr::Ident(ident) => v.visit_ident_mut(ident),
        Expr::Template(template) => walk_template_mut(v, template),
        Expr::TaggedTemplate { tag, template } => {
            v.visit_expr_mut(tag);
            walk_template_mut(v, template);
        }
        Expr::Array(elements) => {
            for element in elements.iter_mut().flatten() {
                v.visit_expr_mut(element);
            }
        }
        Expr::Object(properties) => {
            for property in properties {
                match property {
                    Property::KeyValue { key, value } => {
                        walk_prop_key_mut(v, key);
                        v.visit_expr_mut(value);
                    }
                    Property::Shorthand(ident) => v.visit_ident_mut(ident),
                    Property::Method { key, function, .. } => {
                        walk_prop_key_mut(v, key);
                        v.visit_function_mut(function);
                    }
                    Property::Spread(expr) => v.visit_expr_mut(expr),
                }
            }
        }
        Expr::Function(function) => v.visit_function_mut(function),
        Expr::Arrow(arrow) => {
            for param in &mut arrow.params {
                v.visit_pat_mut(param);
            }
            match &mut arrow.body {
                ArrowBody::Expr(body) => v.visit_expr_mut(body),
                ArrowBody::Block(stmts) => v.visit_stmts_mut(stmts),
            }
        }
        Expr::Class(class) => v.visit_class_mut(class),
        Expr::Unary { arg, .. }
        | Expr::Update { arg, .. }
        | Expr::Spread(arg)
        | Expr::Await(arg) => v.visit_expr_mut(arg),
        Expr::Binary { left, right, .. } => {
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        Expr::Assign { target, value, .. } => {
            v.visit_expr_mut(target);
            v.visit_expr_mut(value);
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr_mut(test);
            v.visit_expr_mut(consequent);
            v.visit_expr_mut(alternate);
        }
        Expr::Call { callee, args, .. } | Expr::New { callee, args } => {
            v.visit_expr_mut(callee);
            for arg in args {
                v.visit_expr_mut(arg);
            }
        }
        Expr::Member {
            object,
            property,
            computed,
            ..
        } => {
            v.visit_expr_mut(object);
            // A dot property is a name, not an expression.
            if *computed {
                v.visit_expr_mut(property);
            }
        }
        Expr::Sequence(exprs) => {
            for expr in exprs {
                v.visit_expr_mut(expr);
            }
        }
        Expr::Yield { arg, .. } => {
            if let Some(arg) = arg {
                v.visit_expr_mut(arg);
            }
        }
        Expr::Literal(_) | Expr::This | Expr::Super | Expr::Placeholder { .. } => {}
    }
}

fn walk_template_mut<V: VisitMut>(v: &mut V, template: &mut Template) {
    for expr in &mut template.exprs {
        v.visit_expr_mut(expr);
    }
}

pub fn walk_prop_key_mut<V: VisitMut>(v: &mut V, key: &mut PropKey) {
    if let PropKey::Computed(expr) = key {
        v.visit_expr_mut(expr);
    }
}

pub fn walk_pat_mut<V: VisitMut>(v: &mut V, pat: &mut Pat) {
    match pat {
        Pat::Ident(ident) => v.visit_ident_mut(ident),
        Pat::Array(elements) => {
            for element in elements.iter_mut().flatten() {
                v.visit_pat_mut(element);
            }
        }
        Pat::Object(props) => {
            for prop in props {
                match prop {
                    PatProp::KeyValue { key, value } => {
                        walk_prop_key_mut(v, key);
                        v.visit_pat_mut(value);
                    }
                    PatProp::Shorthand { name, default } => {
                        v.visit_ident_mut(name);
                        if let Some(default) = default {
                            v.visit_expr_mut(default);
                        }
                    }
                    PatProp::Rest(pat) => v.visit_pat_mut(pat),
                }
            }
        }
        Pat::Default { target, value } => {
            v.visit_pat_mut(target);
            v.visit_expr_mut(value);
        }
        Pat::Rest(pat) => v.visit_pat_mut(pat),
    }
}

pub fn walk_function_mut<V: VisitMut>(v: &mut V, function: &mut Function) {
    if let Some(name) = &mut function.name {
        v.visit_ident_mut(name);
    }
    for param in &mut function.params {
        v.visit_pat_mut(param);
    }
    v.visit_stmts_mut(&mut function.body);
}

pub fn walk_class_mut<V: VisitMut>(v: &mut V, class: &mut Class) {
    if let Some(name) = &mut class.name {
        v.visit_ident_mut(name);
    }
    if let Some(super_class) = &mut class.super_class {
        v.visit_expr_mut(super_class);
    }
    for member in &mut class.members {
        match member {
            ClassMember::Method { key, function, .. } => {
                walk_prop_key_mut(v, key);
                v.visit_function_mut(function);
            }
            ClassMember::Field { key, value, .. } => {
                walk_prop_key_mut(v, key);
                if let Some(value) = value {
                    v.visit_expr_mut(value);
                }
            }
            ClassMember::StaticBlock(body) => v.visit_stmts_mut(body),
        }
    }
}
