//! JavaScript writer for the syntax tree.
//!
//! Emits two-space indented source. Parentheses are derived from operator
//! precedence, so the tree never has to record them.

use crate::ir::*;
use crate::traits::Writer;

/// Static instance of the JavaScript writer.
pub static JAVASCRIPT_WRITER: JavaScriptWriterImpl = JavaScriptWriterImpl;

/// JavaScript writer implementing the Writer trait.
pub struct JavaScriptWriterImpl;

impl Writer for JavaScriptWriterImpl {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn extension(&self) -> &'static str {
        "js"
    }

    fn write(&self, program: &Program) -> String {
        JavaScriptWriter::emit(program)
    }
}

/// Binding strength of expression forms, loosest first.
mod prec {
    pub const SEQUENCE: u8 = 1;
    pub const ASSIGN: u8 = 2;
    pub const CONDITIONAL: u8 = 3;
    pub const OR: u8 = 4;
    pub const AND: u8 = 5;
    pub const BIT_OR: u8 = 6;
    pub const BIT_XOR: u8 = 7;
    pub const BIT_AND: u8 = 8;
    pub const EQUALITY: u8 = 9;
    pub const RELATIONAL: u8 = 10;
    pub const SHIFT: u8 = 11;
    pub const ADDITIVE: u8 = 12;
    pub const MULTIPLICATIVE: u8 = 13;
    pub const EXPONENT: u8 = 14;
    pub const PREFIX: u8 = 15;
    pub const POSTFIX: u8 = 16;
    pub const CALL: u8 = 17;
    pub const PRIMARY: u8 = 18;
}

fn binary_prec(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or | BinaryOp::Nullish => prec::OR,
        BinaryOp::And => prec::AND,
        BinaryOp::BitOr => prec::BIT_OR,
        BinaryOp::BitXor => prec::BIT_XOR,
        BinaryOp::BitAnd => prec::BIT_AND,
        BinaryOp::LooseEq | BinaryOp::LooseNe | BinaryOp::Eq | BinaryOp::Ne => prec::EQUALITY,
        BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::In
        | BinaryOp::InstanceOf => prec::RELATIONAL,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => prec::SHIFT,
        BinaryOp::Add | BinaryOp::Sub => prec::ADDITIVE,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => prec::MULTIPLICATIVE,
        BinaryOp::Exp => prec::EXPONENT,
    }
}

fn expr_prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Sequence(_) => prec::SEQUENCE,
        Expr::Assign { .. } | Expr::Arrow(_) | Expr::Yield { .. } | Expr::Spread(_) => {
            prec::ASSIGN
        }
        Expr::Conditional { .. } => prec::CONDITIONAL,
        Expr::Binary { op, .. } => binary_prec(*op),
        Expr::Unary { .. } | Expr::Await(_) => prec::PREFIX,
        Expr::Update { prefix: true, .. } => prec::PREFIX,
        Expr::Update { prefix: false, .. } => prec::POSTFIX,
        Expr::Call { .. } | Expr::New { .. } | Expr::Member { .. } | Expr::TaggedTemplate { .. } => {
            prec::CALL
        }
        _ => prec::PRIMARY,
    }
}

/// `??` cannot be mixed with `&&`/`||` without parentheses.
fn mixes_nullish(parent: BinaryOp, child: BinaryOp) -> bool {
    let logical = |op| matches!(op, BinaryOp::And | BinaryOp::Or);
    (parent == BinaryOp::Nullish && logical(child)) || (child == BinaryOp::Nullish && logical(parent))
}

/// Emits the syntax tree as JavaScript source code.
pub struct JavaScriptWriter {
    output: String,
    indent: usize,
}

impl JavaScriptWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit a program to JavaScript source.
    pub fn emit(program: &Program) -> String {
        let mut writer = Self::new();
        writer.write_program(program);
        writer.output
    }

    /// Emit a single expression (used for rule listings and diagnostics).
    pub fn emit_expr(expr: &Expr) -> String {
        let mut writer = Self::new();
        writer.write_expr(expr);
        writer.output
    }

    /// Emit a single statement without a trailing newline.
    pub fn emit_stmt(stmt: &Stmt) -> String {
        let mut writer = Self::new();
        writer.write_stmt(stmt);
        writer.output
    }

    fn write_program(&mut self, program: &Program) {
        self.write_stmts(&program.body);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn write_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.write_stmt(stmt);
            self.output.push('\n');
        }
    }

    fn write_block(&mut self, stmts: &[Stmt]) {
        if stmts.is_empty() {
            self.output.push_str("{}");
            return;
        }
        self.output.push_str("{\n");
        self.indent += 1;
        self.write_stmts(stmts);
        self.indent -= 1;
        self.write_indent();
        self.output.push('}');
    }

    /// Body of a control statement, written after its header.
    fn write_body_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(stmts) | Stmt::Sequence(stmts) => {
                self.output.push(' ');
                self.write_block(stmts);
            }
            Stmt::Empty => self.output.push(';'),
            _ => {
                self.output.push('\n');
                self.indent += 1;
                self.write_stmt(stmt);
                self.indent -= 1;
            }
        }
    }

    /// Continue after a body with a keyword (`else`, `while`).
    fn write_after_body(&mut self, body: &Stmt, keyword: &str) {
        if matches!(body, Stmt::Block(_) | Stmt::Sequence(_)) {
            self.output.push(' ');
        } else {
            self.output.push('\n');
            self.write_indent();
        }
        self.output.push_str(keyword);
    }

    fn write_stmt(&mut self, stmt: &Stmt) {
        self.write_indent();
        self.write_stmt_inline(stmt);
    }

    /// Statement without leading indent.
    fn write_stmt_inline(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                let start = self.output.len();
                self.write_expr(expr);
                if needs_statement_parens(&self.output[start..]) {
                    self.output.insert(start, '(');
                    self.output.push(')');
                }
                self.output.push(';');
            }

            Stmt::Var(decl) => {
                self.write_var_decl(decl, false);
                self.output.push(';');
            }

            Stmt::Function(f) => self.write_function(f),
            Stmt::Class(c) => self.write_class(c),
            Stmt::Block(stmts) => self.write_block(stmts),
            Stmt::Empty => self.output.push(';'),

            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                self.output.push_str("if (");
                self.write_expr(test);
                self.output.push(')');
                match alternate {
                    Some(alt) => {
                        // Keep a trailing else from binding to a nested if.
                        if ends_with_open_if(consequent) {
                            self.output.push(' ');
                            self.write_block(std::slice::from_ref(consequent.as_ref()));
                            self.output.push_str(" else");
                        } else {
                            self.write_body_stmt(consequent);
                            self.write_after_body(consequent, "else");
                        }
                        if matches!(alt.as_ref(), Stmt::If { .. }) {
                            self.output.push(' ');
                            self.write_stmt_inline(alt);
                        } else {
                            self.write_body_stmt(alt);
                        }
                    }
                    None => self.write_body_stmt(consequent),
                }
            }

            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                self.output.push_str("for (");
                match init {
                    Some(ForInit::Var(decl)) => self.write_var_decl(decl, true),
                    Some(ForInit::Expr(expr)) => self.write_expr_no_in(expr, prec::SEQUENCE),
                    None => {}
                }
                self.output.push(';');
                if let Some(test) = test {
                    self.output.push(' ');
                    self.write_expr(test);
                }
                self.output.push(';');
                if let Some(update) = update {
                    self.output.push(' ');
                    self.write_expr(update);
                }
                self.output.push(')');
                self.write_body_stmt(body);
            }

            Stmt::ForIn { left, right, body } => {
                self.output.push_str("for (");
                self.write_for_left(left);
                self.output.push_str(" in ");
                self.write_expr(right);
                self.output.push(')');
                self.write_body_stmt(body);
            }

            Stmt::ForOf {
                left,
                right,
                body,
                is_await,
            } => {
                self.output.push_str(if *is_await { "for await (" } else { "for (" });
                self.write_for_left(left);
                self.output.push_str(" of ");
                self.write_expr_prec(right, prec::ASSIGN);
                self.output.push(')');
                self.write_body_stmt(body);
            }

            Stmt::While { test, body } => {
                self.output.push_str("while (");
                self.write_expr(test);
                self.output.push(')');
                self.write_body_stmt(body);
            }

            Stmt::DoWhile { body, test } => {
                self.output.push_str("do");
                self.write_body_stmt(body);
                self.write_after_body(body, "while (");
                self.write_expr(test);
                self.output.push_str(");");
            }

            Stmt::Return(expr) => {
                self.output.push_str("return");
                if let Some(e) = expr {
                    self.output.push(' ');
                    self.write_expr(e);
                }
                self.output.push(';');
            }

            Stmt::Throw(expr) => {
                self.output.push_str("throw ");
                self.write_expr(expr);
                self.output.push(';');
            }

            Stmt::Break(label) => self.write_jump("break", label.as_deref()),
            Stmt::Continue(label) => self.write_jump("continue", label.as_deref()),

            Stmt::Labeled { label, body } => {
                self.output.push_str(label);
                self.output.push_str(": ");
                self.write_stmt_inline(body);
            }

            Stmt::Switch {
                discriminant,
                cases,
            } => {
                self.output.push_str("switch (");
                self.write_expr(discriminant);
                self.output.push_str(") {\n");
                self.indent += 1;
                for case in cases {
                    self.write_indent();
                    match &case.test {
                        Some(test) => {
                            self.output.push_str("case ");
                            self.write_expr(test);
                            self.output.push_str(":\n");
                        }
                        None => self.output.push_str("default:\n"),
                    }
                    self.indent += 1;
                    self.write_stmts(&case.body);
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.write_indent();
                self.output.push('}');
            }

            Stmt::Try {
                block,
                handler,
                finalizer,
            } => {
                self.output.push_str("try ");
                self.write_block(block);
                if let Some(handler) = handler {
                    self.output.push_str(" catch ");
                    if let Some(param) = &handler.param {
                        self.output.push('(');
                        self.write_pat(param);
                        self.output.push_str(") ");
                    }
                    self.write_block(&handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.output.push_str(" finally ");
                    self.write_block(finalizer);
                }
            }

            Stmt::Debugger => self.output.push_str("debugger;"),
            Stmt::Comment(text) => self.output.push_str(text),

            Stmt::Sequence(stmts) => {
                for (i, s) in stmts.iter().enumerate() {
                    if i > 0 {
                        self.output.push('\n');
                        self.write_indent();
                    }
                    self.write_stmt_inline(s);
                }
            }

            Stmt::Placeholder { index, multi_line } => {
                self.output.push_str(&format!("statement{}", index));
                if *multi_line {
                    self.output.push_str(".multiLine");
                }
                self.output.push(';');
            }
        }
    }

    fn write_jump(&mut self, keyword: &str, label: Option<&str>) {
        self.output.push_str(keyword);
        if let Some(label) = label {
            self.output.push(' ');
            self.output.push_str(label);
        }
        self.output.push(';');
    }

    fn write_for_left(&mut self, left: &ForInit) {
        match left {
            ForInit::Var(decl) => self.write_var_decl(decl, true),
            ForInit::Expr(expr) => self.write_expr_prec(expr, prec::CALL),
        }
    }

    /// `var a = 1, b`. Inside a `for` head, initializers containing `in` are wrapped.
    fn write_var_decl(&mut self, decl: &VarDecl, in_for_head: bool) {
        self.output.push_str(decl.kind.as_str());
        self.output.push(' ');
        for (i, declarator) in decl.declarators.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_pat(&declarator.target);
            if let Some(init) = &declarator.init {
                self.output.push_str(" = ");
                if in_for_head {
                    self.write_expr_no_in(init, prec::ASSIGN);
                } else {
                    self.write_expr_prec(init, prec::ASSIGN);
                }
            }
        }
    }

    fn write_expr_no_in(&mut self, expr: &Expr, min: u8) {
        if contains_in(expr) {
            self.output.push('(');
            self.write_expr(expr);
            self.output.push(')');
        } else {
            self.write_expr_prec(expr, min);
        }
    }

    fn write_function(&mut self, f: &Function) {
        if f.is_async {
            self.output.push_str("async ");
        }
        self.output.push_str("function");
        if f.is_generator {
            self.output.push('*');
        }
        if let Some(name) = &f.name {
            self.output.push(' ');
            self.write_ident(name);
        }
        self.write_params(&f.params);
        self.output.push(' ');
        self.write_block(&f.body);
    }

    fn write_params(&mut self, params: &[Pat]) {
        self.output.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_pat(param);
        }
        self.output.push(')');
    }

    /// Method head and body: `get key() {}`, `async *key() {}`.
    fn write_method(&mut self, key: &PropKey, kind: MethodKind, function: &Function) {
        match kind {
            MethodKind::Getter => self.output.push_str("get "),
            MethodKind::Setter => self.output.push_str("set "),
            MethodKind::Method => {}
        }
        if function.is_async {
            self.output.push_str("async ");
        }
        if function.is_generator {
            self.output.push('*');
        }
        self.write_prop_key(key);
        self.write_params(&function.params);
        self.output.push(' ');
        self.write_block(&function.body);
    }

    fn write_class(&mut self, class: &Class) {
        self.output.push_str("class");
        if let Some(name) = &class.name {
            self.output.push(' ');
            self.write_ident(name);
        }
        if let Some(super_class) = &class.super_class {
            self.output.push_str(" extends ");
            self.write_expr_prec(super_class, prec::CALL);
        }
        if class.members.is_empty() {
            self.output.push_str(" {}");
            return;
        }
        self.output.push_str(" {\n");
        self.indent += 1;
        for member in &class.members {
            self.write_indent();
            match member {
                ClassMember::Method {
                    key,
                    kind,
                    is_static,
                    function,
                } => {
                    if *is_static {
                        self.output.push_str("static ");
                    }
                    self.write_method(key, *kind, function);
                }
                ClassMember::Field {
                    key,
                    value,
                    is_static,
                } => {
                    if *is_static {
                        self.output.push_str("static ");
                    }
                    self.write_prop_key(key);
                    if let Some(value) = value {
                        self.output.push_str(" = ");
                        self.write_expr_prec(value, prec::ASSIGN);
                    }
                    self.output.push(';');
                }
                ClassMember::StaticBlock(body) => {
                    self.output.push_str("static ");
                    self.write_block(body);
                }
            }
            self.output.push('\n');
        }
        self.indent -= 1;
        self.write_indent();
        self.output.push('}');
    }

    fn write_ident(&mut self, ident: &Ident) {
        match ident {
            Ident::Name { name, .. } => self.output.push_str(name),
            Ident::Placeholder(index) => self.output.push_str(&format!("placeholder{}", index)),
        }
    }

    fn write_pat(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(ident) => self.write_ident(ident),
            Pat::Array(elements) => {
                self.output.push('[');
                self.write_elements(elements, |writer, element| writer.write_pat(element));
                self.output.push(']');
            }
            Pat::Object(props) => {
                if props.is_empty() {
                    self.output.push_str("{}");
                    return;
                }
                self.output.push_str("{ ");
                for (i, prop) in props.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    match prop {
                        PatProp::KeyValue { key, value } => {
                            self.write_prop_key(key);
                            self.output.push_str(": ");
                            self.write_pat(value);
                        }
                        PatProp::Shorthand { name, default } => {
                            self.write_ident(name);
                            if let Some(default) = default {
                                self.output.push_str(" = ");
                                self.write_expr_prec(default, prec::ASSIGN);
                            }
                        }
                        PatProp::Rest(pat) => {
                            self.output.push_str("...");
                            self.write_pat(pat);
                        }
                    }
                }
                self.output.push_str(" }");
            }
            Pat::Default { target, value } => {
                self.write_pat(target);
                self.output.push_str(" = ");
                self.write_expr_prec(value, prec::ASSIGN);
            }
            Pat::Rest(pat) => {
                self.output.push_str("...");
                self.write_pat(pat);
            }
        }
    }

    /// Comma-separated elements; a trailing hole needs its own comma.
    fn write_elements<T>(&mut self, elements: &[Option<T>], mut write: impl FnMut(&mut Self, &T)) {
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            if let Some(element) = element {
                write(self, element);
            }
        }
        if matches!(elements.last(), Some(None)) {
            self.output.push(',');
        }
    }

    fn write_prop_key(&mut self, key: &PropKey) {
        match key {
            PropKey::Name(name) => self.output.push_str(name),
            PropKey::String(s) => {
                self.output.push('"');
                self.output.push_str(s);
                self.output.push('"');
            }
            PropKey::Number(n) => self.write_number(*n),
            PropKey::Computed(expr) => {
                self.output.push('[');
                self.write_expr_prec(expr, prec::ASSIGN);
                self.output.push(']');
            }
        }
    }

    fn write_expr(&mut self, expr: &Expr) {
        self.write_expr_prec(expr, prec::SEQUENCE);
    }

    /// Write `expr`, parenthesized when it binds looser than `min`.
    fn write_expr_prec(&mut self, expr: &Expr, min: u8) {
        if expr_prec(expr) < min {
            self.output.push('(');
            self.write_expr_bare(expr);
            self.output.push(')');
        } else {
            self.write_expr_bare(expr);
        }
    }

    fn write_operand(&mut self, expr: &Expr, min: u8, parent: BinaryOp) {
        match expr {
            Expr::Binary { op, .. } if mixes_nullish(parent, *op) => {
                self.output.push('(');
                self.write_expr_bare(expr);
                self.output.push(')');
            }
            _ => self.write_expr_prec(expr, min),
        }
    }

    fn write_args(&mut self, args: &[Expr]) {
        self.output.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_expr_prec(arg, prec::ASSIGN);
        }
        self.output.push(')');
    }

    fn write_expr_bare(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.write_ident(ident),
            Expr::Literal(lit) => self.write_literal(lit),
            Expr::This => self.output.push_str("this"),
            Expr::Super => self.output.push_str("super"),
            Expr::Template(template) => self.write_template(template),
            Expr::TaggedTemplate { tag, template } => {
                self.write_expr_prec(tag, prec::CALL);
                self.write_template(template);
            }

            Expr::Array(elements) => {
                self.output.push('[');
                self.write_elements(elements, |writer, element| {
                    writer.write_expr_prec(element, prec::ASSIGN)
                });
                self.output.push(']');
            }

            Expr::Object(properties) => {
                if properties.is_empty() {
                    self.output.push_str("{}");
                    return;
                }
                self.output.push_str("{ ");
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    match property {
                        Property::KeyValue { key, value } => {
                            self.write_prop_key(key);
                            self.output.push_str(": ");
                            self.write_expr_prec(value, prec::ASSIGN);
                        }
                        Property::Shorthand(name) => self.write_ident(name),
                        Property::Method {
                            key,
                            kind,
                            function,
                        } => self.write_method(key, *kind, function),
                        Property::Spread(expr) => {
                            self.output.push_str("...");
                            self.write_expr_prec(expr, prec::ASSIGN);
                        }
                    }
                }
                self.output.push_str(" }");
            }

            Expr::Function(f) => self.write_function(f),
            Expr::Class(c) => self.write_class(c),

            Expr::Arrow(arrow) => {
                if arrow.is_async {
                    self.output.push_str("async ");
                }
                self.write_params(&arrow.params);
                self.output.push_str(" => ");
                match &arrow.body {
                    ArrowBody::Block(stmts) => self.write_block(stmts),
                    ArrowBody::Expr(body) => {
                        let start = self.output.len();
                        self.write_expr_prec(body, prec::ASSIGN);
                        if self.output[start..].starts_with('{') {
                            self.output.insert(start, '(');
                            self.output.push(')');
                        }
                    }
                }
            }

            Expr::Unary { op, arg } => {
                self.output.push_str(op.as_str());
                if op.is_keyword() {
                    self.output.push(' ');
                }
                let start = self.output.len();
                self.write_expr_prec(arg, prec::PREFIX);
                // `- -x` and `+ +x` must not fuse into `--x` / `++x`
                let sign = match op {
                    UnaryOp::Neg => Some('-'),
                    UnaryOp::Plus => Some('+'),
                    _ => None,
                };
                if let Some(sign) = sign {
                    if self.output[start..].starts_with(sign) {
                        self.output.insert(start, ' ');
                    }
                }
            }

            Expr::Update { op, prefix, arg } => {
                if *prefix {
                    self.output.push_str(op.as_str());
                    self.write_expr_prec(arg, prec::POSTFIX);
                } else {
                    self.write_expr_prec(arg, prec::CALL);
                    self.output.push_str(op.as_str());
                }
            }

            Expr::Binary { left, op, right } => {
                let p = binary_prec(*op);
                // `**` is right-associative and rejects a bare unary on its left.
                let (left_min, right_min) = if *op == BinaryOp::Exp {
                    (prec::POSTFIX, p)
                } else {
                    (p, p + 1)
                };
                self.write_operand(left, left_min, *op);
                self.output.push(' ');
                self.output.push_str(op.as_str());
                self.output.push(' ');
                self.write_operand(right, right_min, *op);
            }

            Expr::Assign { target, op, value } => {
                self.write_expr_prec(target, prec::CALL);
                self.output.push(' ');
                self.output.push_str(op.as_str());
                self.output.push(' ');
                self.write_expr_prec(value, prec::ASSIGN);
            }

            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.write_expr_prec(test, prec::CONDITIONAL + 1);
                self.output.push_str(" ? ");
                self.write_expr_prec(consequent, prec::ASSIGN);
                self.output.push_str(" : ");
                self.write_expr_prec(alternate, prec::ASSIGN);
            }

            Expr::Call {
                callee,
                args,
                optional,
            } => {
                self.write_expr_prec(callee, prec::CALL);
                if *optional {
                    self.output.push_str("?.");
                }
                self.write_args(args);
            }

            Expr::New { callee, args } => {
                self.output.push_str("new ");
                if callee_has_call(callee) {
                    self.output.push('(');
                    self.write_expr(callee);
                    self.output.push(')');
                } else {
                    self.write_expr_prec(callee, prec::CALL);
                }
                self.write_args(args);
            }

            Expr::Member {
                object,
                property,
                computed,
                optional,
            } => {
                if matches!(object.as_ref(), Expr::Literal(Literal::Number(_))) {
                    self.output.push('(');
                    self.write_expr(object);
                    self.output.push(')');
                } else {
                    self.write_expr_prec(object, prec::CALL);
                }
                match (computed, property.as_ref()) {
                    (false, Expr::Literal(Literal::String(name))) => {
                        self.output.push_str(if *optional { "?." } else { "." });
                        self.output.push_str(name);
                    }
                    _ => {
                        if *optional {
                            self.output.push_str("?.");
                        }
                        self.output.push('[');
                        self.write_expr(property);
                        self.output.push(']');
                    }
                }
            }

            Expr::Sequence(exprs) => {
                for (i, e) in exprs.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_expr_prec(e, prec::ASSIGN);
                }
            }

            Expr::Spread(arg) => {
                self.output.push_str("...");
                self.write_expr_prec(arg, prec::ASSIGN);
            }

            Expr::Await(arg) => {
                self.output.push_str("await ");
                self.write_expr_prec(arg, prec::PREFIX);
            }

            Expr::Yield { arg, delegate } => {
                self.output.push_str("yield");
                if *delegate {
                    self.output.push('*');
                }
                if let Some(arg) = arg {
                    self.output.push(' ');
                    self.write_expr_prec(arg, prec::ASSIGN);
                }
            }

            Expr::Placeholder {
                index,
                or_declaration,
            } => {
                self.output.push_str(&format!("expression{}", index));
                if *or_declaration {
                    self.output.push_str(".orDeclaration");
                }
            }
        }
    }

    fn write_template(&mut self, template: &Template) {
        self.output.push('`');
        for (i, quasi) in template.quasis.iter().enumerate() {
            self.output.push_str(quasi);
            if let Some(expr) = template.exprs.get(i) {
                self.output.push_str("${");
                self.write_expr(expr);
                self.output.push('}');
            }
        }
        self.output.push('`');
    }

    fn write_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Null => self.output.push_str("null"),
            Literal::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Literal::Number(n) => self.write_number(*n),
            Literal::BigInt(digits) => {
                self.output.push_str(digits);
                self.output.push('n');
            }
            Literal::String(s) => {
                self.output.push('"');
                self.output.push_str(s);
                self.output.push('"');
            }
            Literal::Regex { pattern, flags } => {
                self.output.push('/');
                self.output.push_str(pattern);
                self.output.push('/');
                self.output.push_str(flags);
            }
        }
    }

    fn write_number(&mut self, n: f64) {
        self.output.push_str(&format_number(n));
    }
}

impl Default for JavaScriptWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Number literal text, shortest round-trip digits in JavaScript's
/// Number-to-string layout: exponent form below 1e-6 and from 1e21.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        // Overflows back to Infinity when read.
        return if n > 0.0 { "1e999" } else { "-1e999" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return n.to_string();
    }
    let text = format!("{:e}", n);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

/// Expression statements may not start with `{`, `function`, `class` or `let [`.
fn needs_statement_parens(text: &str) -> bool {
    text.starts_with('{')
        || starts_with_keyword(text, "function")
        || starts_with_keyword(text, "class")
        || text.starts_with("async function")
        || text.starts_with("let[")
        || text.starts_with("let [")
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.strip_prefix(keyword)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$'))
}

/// A `new` callee containing a call would take the call's arguments.
fn callee_has_call(expr: &Expr) -> bool {
    match expr {
        Expr::Call { .. } => true,
        Expr::Member { object, .. } => callee_has_call(object),
        Expr::TaggedTemplate { tag, .. } => callee_has_call(tag),
        _ => false,
    }
}

/// Whether a bare `in` operator would be visible inside a `for` head.
fn contains_in(expr: &Expr) -> bool {
    match expr {
        Expr::Binary { left, op, right } => {
            *op == BinaryOp::In || contains_in(left) || contains_in(right)
        }
        Expr::Assign { target, value, .. } => contains_in(target) || contains_in(value),
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => contains_in(test) || contains_in(consequent) || contains_in(alternate),
        Expr::Sequence(exprs) => exprs.iter().any(contains_in),
        Expr::Unary { arg, .. } | Expr::Await(arg) | Expr::Spread(arg) => contains_in(arg),
        Expr::Update { arg, .. } => contains_in(arg),
        Expr::Yield { arg, .. } => arg.as_deref().is_some_and(contains_in),
        Expr::Member { object, .. } => contains_in(object),
        Expr::Call { callee, .. } | Expr::New { callee, .. } => contains_in(callee),
        Expr::Arrow(arrow) => match &arrow.body {
            ArrowBody::Expr(body) => contains_in(body),
            ArrowBody::Block(_) => false,
        },
        _ => false,
    }
}

/// Statement whose last nested statement is an `if` without `else`.
fn ends_with_open_if(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::If {
            alternate: None, ..
        } => true,
        Stmt::If {
            alternate: Some(alt),
            ..
        } => ends_with_open_if(alt),
        Stmt::For { body, .. }
        | Stmt::ForIn { body, .. }
        | Stmt::ForOf { body, .. }
        | Stmt::While { body, .. }
        | Stmt::Labeled { body, .. } => ends_with_open_if(body),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_expr(expr: Expr) -> String {
        JavaScriptWriter::emit_expr(&expr)
    }

    #[test]
    fn test_simple_const() {
        let program = Program::new(vec![Stmt::var(VarKind::Const, "x", Some(Expr::number(42)))]);
        let js = JavaScriptWriter::emit(&program);
        assert_eq!(js.trim(), "const x = 42;");
    }

    #[test]
    fn test_function_call() {
        let program = Program::new(vec![Stmt::expr(Expr::call(
            Expr::member(Expr::ident("console"), "log"),
            vec![Expr::string("hello")],
        ))]);
        let js = JavaScriptWriter::emit(&program);
        assert_eq!(js.trim(), "console.log(\"hello\");");
    }

    #[test]
    fn test_binary_precedence() {
        let sum = Expr::binary(Expr::number(1), BinaryOp::Add, Expr::number(2));
        assert_eq!(
            emit_expr(Expr::binary(sum.clone(), BinaryOp::Mul, Expr::number(3))),
            "(1 + 2) * 3"
        );
        assert_eq!(
            emit_expr(Expr::binary(Expr::number(3), BinaryOp::Sub, sum)),
            "3 - (1 + 2)"
        );
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let pow = |l, r| Expr::binary(l, BinaryOp::Exp, r);
        let a = || Expr::ident("a");
        assert_eq!(emit_expr(pow(a(), pow(a(), a()))), "a ** a ** a");
        assert_eq!(emit_expr(pow(pow(a(), a()), a())), "(a ** a) ** a");
        assert_eq!(
            emit_expr(pow(Expr::unary(UnaryOp::Neg, a()), a())),
            "(-a) ** a"
        );
    }

    #[test]
    fn test_nullish_mixing_is_parenthesized() {
        let or = Expr::binary(Expr::ident("a"), BinaryOp::Or, Expr::ident("b"));
        assert_eq!(
            emit_expr(Expr::binary(or, BinaryOp::Nullish, Expr::ident("c"))),
            "(a || b) ?? c"
        );
    }

    #[test]
    fn test_double_negation_keeps_space() {
        let inner = Expr::unary(UnaryOp::Neg, Expr::ident("x"));
        assert_eq!(emit_expr(Expr::unary(UnaryOp::Neg, inner)), "- -x");
        assert_eq!(
            emit_expr(Expr::unary(UnaryOp::Not, Expr::unary(UnaryOp::Not, Expr::ident("x")))),
            "!!x"
        );
    }

    #[test]
    fn test_object_statement_is_parenthesized() {
        let program = Program::new(vec![Stmt::expr(Expr::assign(
            Expr::Object(vec![Property::Shorthand(Ident::new("a"))]),
            Expr::ident("b"),
        ))]);
        assert_eq!(JavaScriptWriter::emit(&program), "({ a } = b);\n");
    }

    #[test]
    fn test_number_layout() {
        assert_eq!(emit_expr(Expr::number(42)), "42");
        assert_eq!(emit_expr(Expr::number(0.5)), "0.5");
        assert_eq!(emit_expr(Expr::number(0.000001)), "0.000001");
        assert_eq!(emit_expr(Expr::number(1.5e-7)), "1.5e-7");
        assert_eq!(emit_expr(Expr::number(5e-324)), "5e-324");
        assert_eq!(emit_expr(Expr::number(1e20)), "100000000000000000000");
        assert_eq!(emit_expr(Expr::number(1e21)), "1e+21");
        assert_eq!(
            emit_expr(Expr::number(f64::MAX)),
            "1.7976931348623157e+308"
        );
    }

    #[test]
    fn test_infinite_number_stays_a_literal() {
        assert_eq!(emit_expr(Expr::number(f64::INFINITY)), "1e999");
        let program = crate::read_javascript("x = 1e999;").unwrap();
        assert_eq!(JavaScriptWriter::emit(&program), "x = 1e999;\n");
    }

    #[test]
    fn test_member_of_number_literal() {
        assert_eq!(
            emit_expr(Expr::call(Expr::member(Expr::number(1), "toString"), vec![])),
            "(1).toString()"
        );
    }

    #[test]
    fn test_dangling_else_is_braced() {
        let inner = Stmt::if_stmt(Expr::ident("b"), Stmt::expr(Expr::ident("x")), None);
        let outer = Stmt::if_stmt(Expr::ident("a"), inner, Some(Stmt::expr(Expr::ident("y"))));
        assert_eq!(
            JavaScriptWriter::emit_stmt(&outer),
            "if (a) {\n  if (b)\n    x;\n} else\n  y;"
        );
    }

    #[test]
    fn test_placeholders_print_as_pattern_text() {
        let program = Program::new(vec![
            Stmt::Placeholder {
                index: 1,
                multi_line: true,
            },
            Stmt::expr(Expr::Placeholder {
                index: 2,
                or_declaration: false,
            }),
        ]);
        assert_eq!(
            JavaScriptWriter::emit(&program),
            "statement1.multiLine;\nexpression2;\n"
        );
    }
}
