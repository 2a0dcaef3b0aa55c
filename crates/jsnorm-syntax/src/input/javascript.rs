//! Tree-sitter based JavaScript reader.
//!
//! String literal contents are kept in their source form (escapes intact),
//! re-delimited for double quotes, so reading and writing never alters a
//! string's value.
//!
//! Comments survive as [`Stmt::Comment`]. One inside an expression moves up
//! to the statement list holding that expression, just before its statement;
//! one leading an unbraced body stays with the body, which becomes a
//! [`Stmt::Sequence`].

use crate::ir::*;
use crate::traits::{ReadError, Reader};
use std::cell::RefCell;
use std::collections::HashSet;
use tree_sitter::{Node, Parser, Tree};

/// Static instance of the JavaScript reader.
pub static JAVASCRIPT_READER: JavaScriptReader = JavaScriptReader;

/// JavaScript reader using tree-sitter.
pub struct JavaScriptReader;

impl Reader for JavaScriptReader {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "mjs", "cjs"]
    }

    fn read(&self, source: &str) -> Result<Program, ReadError> {
        read_javascript(source)
    }
}

/// Parse JavaScript source into the syntax tree.
pub fn read_javascript(source: &str) -> Result<Program, ReadError> {
    let tree = parse_tree(source)?;
    let ctx = ReadContext::new(source);
    ctx.read_program(&tree)
}

/// Whether the last statement of `source` is an expression statement closed
/// by an explicit `;`. Trailing comments are ignored.
pub fn ends_with_semicolon(source: &str) -> Result<bool, ReadError> {
    let tree = parse_tree(source)?;
    let root = tree.root_node();
    let mut cursor = root.walk();
    let last = root
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .last();
    let Some(statement) = last else {
        return Ok(false);
    };
    if statement.kind() != "expression_statement" {
        return Ok(false);
    }
    let mut cursor = statement.walk();
    let terminated = statement
        .children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .last()
        .is_some_and(|token| token.kind() == ";" && token.end_byte() > token.start_byte());
    Ok(terminated)
}

fn parse_tree(source: &str) -> Result<Tree, ReadError> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_javascript::language().into())
        .map_err(|err| ReadError::Parse(err.to_string()))?;

    parser
        .parse(source, None)
        .ok_or_else(|| ReadError::Parse("failed to parse".into()))
}

struct ReadContext<'a> {
    source: &'a str,
    /// Start bytes of comments already placed in the tree.
    claimed: RefCell<HashSet<usize>>,
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            claimed: RefCell::new(HashSet::new()),
        }
    }

    fn comment(&self, node: Node) -> Stmt {
        self.claimed.borrow_mut().insert(node.start_byte());
        Stmt::Comment(self.node_text(node).to_string())
    }

    /// Comments anywhere under `node` that no statement list has taken yet,
    /// in source order. They are claimed by this call.
    fn unclaimed_comments(&self, node: Node) -> Vec<Stmt> {
        let mut found = Vec::new();
        self.collect_comments(node, &mut found);
        found.into_iter().map(|comment| self.comment(comment)).collect()
    }

    fn collect_comments<'t>(&self, node: Node<'t>, found: &mut Vec<Node<'t>>) {
        if node.kind() == "comment" {
            if !self.claimed.borrow().contains(&node.start_byte()) {
                found.push(node);
            }
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_comments(child, found);
        }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn ident(&self, node: Node) -> Ident {
        Ident::with_id(self.node_text(node), NodeId(node.start_byte() as u32))
    }

    fn field<'t>(&self, node: Node<'t>, name: &str) -> Result<Node<'t>, ReadError> {
        node.child_by_field_name(name)
            .ok_or_else(|| ReadError::Parse(format!("{} missing {}", node.kind(), name)))
    }

    /// Named children, comments excluded.
    fn named_children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        let children = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();
        children
    }

    fn first_named<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        self.named_children(node).into_iter().next()
    }

    fn required_named<'t>(&self, node: Node<'t>) -> Result<Node<'t>, ReadError> {
        self.first_named(node)
            .ok_or_else(|| ReadError::Parse(format!("empty {}", node.kind())))
    }

    /// Whether `node` has an anonymous child token with the given text.
    fn has_token(&self, node: Node, token: &str) -> bool {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .any(|child| !child.is_named() && child.kind() == token);
        found
    }

    fn unsupported(&self, what: &str, node: Node) -> ReadError {
        let text = self.node_text(node);
        let snippet: String = text.chars().take(40).collect();
        ReadError::Unsupported(format!("{} '{}': {}", what, node.kind(), snippet))
    }

    fn read_program(&self, tree: &Tree) -> Result<Program, ReadError> {
        let root = tree.root_node();

        if root.has_error() {
            return Err(match find_error(root) {
                Some(node) => {
                    let position = node.start_position();
                    ReadError::Parse(format!(
                        "syntax error at line {}, column {}",
                        position.row + 1,
                        position.column + 1
                    ))
                }
                None => ReadError::Parse("syntax error in source".into()),
            });
        }

        Ok(Program::new(self.read_statements(root)?))
    }

    /// Statement list of a program, block or body. Comments become statements.
    fn read_statements(&self, node: Node) -> Result<Vec<Stmt>, ReadError> {
        let mut statements = Vec::new();
        let mut cursor = node.walk();

        for child in node.named_children(&mut cursor) {
            self.push_stmt(child, &mut statements)?;
        }

        Ok(statements)
    }

    /// Read one list member, preceded by the comments found inside it.
    fn push_stmt(&self, node: Node, statements: &mut Vec<Stmt>) -> Result<(), ReadError> {
        let stmt = self.read_stmt(node)?;
        statements.extend(self.unclaimed_comments(node));
        statements.push(stmt);
        Ok(())
    }

    /// Body of `if`, `else`, a loop or a label. Comments leading an unbraced
    /// body, or inside it, are kept with it.
    fn read_body(&self, body: Node) -> Result<Stmt, ReadError> {
        let stmt = self.read_stmt(body)?;
        if body.kind() == "statement_block" {
            return Ok(stmt);
        }

        let mut leading = Vec::new();
        let mut previous = body.prev_sibling();
        while let Some(sibling) = previous.filter(|sibling| sibling.kind() == "comment") {
            leading.push(sibling);
            previous = sibling.prev_sibling();
        }
        let mut stmts: Vec<Stmt> = leading
            .into_iter()
            .rev()
            .map(|comment| self.comment(comment))
            .collect();
        stmts.extend(self.unclaimed_comments(body));

        if stmts.is_empty() {
            return Ok(stmt);
        }
        stmts.push(stmt);
        Ok(Stmt::Sequence(stmts))
    }

    fn read_stmt(&self, node: Node) -> Result<Stmt, ReadError> {
        match node.kind() {
            "comment" | "hash_bang_line" => Ok(self.comment(node)),

            "expression_statement" => {
                let expr = self.read_expr(self.required_named(node)?)?;
                Ok(Stmt::Expr(expr))
            }

            "variable_declaration" | "lexical_declaration" => {
                self.read_var_decl(node).map(Stmt::Var)
            }

            "function_declaration" | "generator_function_declaration" => {
                let function = self.read_function(node)?;
                Ok(Stmt::Function(Box::new(function)))
            }

            "class_declaration" => {
                let class = self.read_class(node)?;
                Ok(Stmt::Class(Box::new(class)))
            }

            "statement_block" => self.read_statements(node).map(Stmt::Block),
            "empty_statement" => Ok(Stmt::Empty),
            "debugger_statement" => Ok(Stmt::Debugger),

            // Control flow
            "if_statement" => self.read_if_statement(node),
            "for_statement" => self.read_for_statement(node),
            "for_in_statement" => self.read_for_in_statement(node),
            "while_statement" => Ok(Stmt::While {
                test: self.read_expr(self.field(node, "condition")?)?,
                body: Box::new(self.read_body(self.field(node, "body")?)?),
            }),
            "do_statement" => Ok(Stmt::DoWhile {
                body: Box::new(self.read_body(self.field(node, "body")?)?),
                test: self.read_expr(self.field(node, "condition")?)?,
            }),
            "switch_statement" => self.read_switch_statement(node),
            "try_statement" => self.read_try_statement(node),
            "labeled_statement" => Ok(Stmt::Labeled {
                label: self.node_text(self.field(node, "label")?).to_string(),
                body: Box::new(self.read_body(self.field(node, "body")?)?),
            }),

            // Jumps
            "return_statement" => {
                let value = match self.first_named(node) {
                    Some(child) => Some(self.read_expr(child)?),
                    None => None,
                };
                Ok(Stmt::Return(value))
            }
            "throw_statement" => Ok(Stmt::Throw(self.read_expr(self.required_named(node)?)?)),
            "break_statement" => Ok(Stmt::Break(self.label(node))),
            "continue_statement" => Ok(Stmt::Continue(self.label(node))),

            "import_statement" | "export_statement" => {
                Err(self.unsupported("module statement", node))
            }

            _ => Err(self.unsupported("statement type", node)),
        }
    }

    fn label(&self, node: Node) -> Option<String> {
        node.child_by_field_name("label")
            .map(|label| self.node_text(label).to_string())
    }

    fn read_if_statement(&self, node: Node) -> Result<Stmt, ReadError> {
        let test = self.read_expr(self.field(node, "condition")?)?;
        let consequent = self.read_body(self.field(node, "consequence")?)?;

        // alternative is an else_clause wrapping the statement
        let alternate = match node.child_by_field_name("alternative") {
            Some(clause) => Some(Box::new(self.read_body(self.required_named(clause)?)?)),
            None => None,
        };

        Ok(Stmt::If {
            test,
            consequent: Box::new(consequent),
            alternate,
        })
    }

    fn read_for_statement(&self, node: Node) -> Result<Stmt, ReadError> {
        let init = match node.child_by_field_name("initializer") {
            Some(init) => match init.kind() {
                "variable_declaration" | "lexical_declaration" => {
                    Some(ForInit::Var(self.read_var_decl(init)?))
                }
                _ => self.read_loop_clause(init)?.map(ForInit::Expr),
            },
            None => None,
        };

        let test = match node.child_by_field_name("condition") {
            Some(test) => self.read_loop_clause(test)?,
            None => None,
        };

        let update = match node.child_by_field_name("increment") {
            Some(update) => self.read_loop_clause(update)?,
            None => None,
        };

        Ok(Stmt::For {
            init,
            test,
            update,
            body: Box::new(self.read_body(self.field(node, "body")?)?),
        })
    }

    /// A `for` header clause: an expression, an expression statement, or empty.
    fn read_loop_clause(&self, node: Node) -> Result<Option<Expr>, ReadError> {
        if !node.is_named() || node.kind() == "empty_statement" {
            return Ok(None);
        }
        if node.kind() == "expression_statement" {
            return self.read_expr(self.required_named(node)?).map(Some);
        }
        self.read_expr(node).map(Some)
    }

    fn read_for_in_statement(&self, node: Node) -> Result<Stmt, ReadError> {
        let left_node = self.field(node, "left")?;
        let left = match node.child_by_field_name("kind") {
            Some(kind) => ForInit::Var(VarDecl {
                kind: self.var_kind(kind)?,
                declarators: vec![Declarator {
                    target: self.read_pat(left_node)?,
                    init: None,
                }],
            }),
            None => ForInit::Expr(self.read_expr(left_node)?),
        };

        let right = self.read_expr(self.field(node, "right")?)?;
        let body = Box::new(self.read_body(self.field(node, "body")?)?);

        let is_of = match node.child_by_field_name("operator") {
            Some(op) => self.node_text(op) == "of",
            None => self.has_token(node, "of"),
        };

        if is_of {
            Ok(Stmt::ForOf {
                left,
                right,
                body,
                is_await: self.has_token(node, "await"),
            })
        } else {
            Ok(Stmt::ForIn { left, right, body })
        }
    }

    fn read_switch_statement(&self, node: Node) -> Result<Stmt, ReadError> {
        let discriminant = self.read_expr(self.field(node, "value")?)?;
        let body = self.field(node, "body")?;

        let mut cases = Vec::new();
        let mut cursor = body.walk();
        for case in body.named_children(&mut cursor) {
            match case.kind() {
                "switch_case" | "switch_default" => {
                    let value = case.child_by_field_name("value");
                    let test = match value {
                        Some(value) => Some(self.read_expr(value)?),
                        None => None,
                    };

                    let mut stmts = Vec::new();
                    let mut case_cursor = case.walk();
                    for child in case.named_children(&mut case_cursor) {
                        if Some(child.id()) == value.map(|v| v.id()) {
                            continue;
                        }
                        self.push_stmt(child, &mut stmts)?;
                    }

                    cases.push(SwitchCase { test, body: stmts });
                }
                // Left for the list holding the switch.
                "comment" => {}
                _ => return Err(self.unsupported("switch member", case)),
            }
        }

        Ok(Stmt::Switch {
            discriminant,
            cases,
        })
    }

    fn read_try_statement(&self, node: Node) -> Result<Stmt, ReadError> {
        let block = self.read_statements(self.field(node, "body")?)?;

        let handler = match node.child_by_field_name("handler") {
            Some(clause) => {
                let param = match clause.child_by_field_name("parameter") {
                    Some(param) => Some(self.read_pat(param)?),
                    None => None,
                };
                Some(CatchClause {
                    param,
                    body: self.read_statements(self.field(clause, "body")?)?,
                })
            }
            None => None,
        };

        let finalizer = match node.child_by_field_name("finalizer") {
            Some(clause) => Some(self.read_statements(self.field(clause, "body")?)?),
            None => None,
        };

        Ok(Stmt::Try {
            block,
            handler,
            finalizer,
        })
    }

    fn var_kind(&self, node: Node) -> Result<VarKind, ReadError> {
        match self.node_text(node) {
            "var" => Ok(VarKind::Var),
            "let" => Ok(VarKind::Let),
            "const" => Ok(VarKind::Const),
            other => Err(ReadError::UnexpectedNode {
                expected: "var, let or const".into(),
                got: other.to_string(),
            }),
        }
    }

    fn read_var_decl(&self, node: Node) -> Result<VarDecl, ReadError> {
        let kind = match node.child_by_field_name("kind") {
            Some(kind) => self.var_kind(kind)?,
            None => VarKind::Var,
        };

        let mut declarators = Vec::new();
        for child in self.named_children(node) {
            if child.kind() != "variable_declarator" {
                continue;
            }
            let init = match child.child_by_field_name("value") {
                Some(value) => Some(self.read_expr(value)?),
                None => None,
            };
            declarators.push(Declarator {
                target: self.read_pat(self.field(child, "name")?)?,
                init,
            });
        }

        Ok(VarDecl { kind, declarators })
    }

    fn read_function(&self, node: Node) -> Result<Function, ReadError> {
        let name = node.child_by_field_name("name").map(|name| self.ident(name));
        Ok(Function {
            name,
            params: self.read_params(self.field(node, "parameters")?)?,
            body: self.read_statements(self.field(node, "body")?)?,
            is_async: self.has_token(node, "async"),
            is_generator: node.kind().contains("generator") || self.has_token(node, "*"),
        })
    }

    fn read_params(&self, node: Node) -> Result<Vec<Pat>, ReadError> {
        self.named_children(node)
            .into_iter()
            .map(|param| self.read_pat(param))
            .collect()
    }

    fn read_arrow(&self, node: Node) -> Result<Arrow, ReadError> {
        let params = match node.child_by_field_name("parameters") {
            Some(params) => self.read_params(params)?,
            None => vec![self.read_pat(self.field(node, "parameter")?)?],
        };

        let body_node = self.field(node, "body")?;
        let body = if body_node.kind() == "statement_block" {
            ArrowBody::Block(self.read_statements(body_node)?)
        } else {
            ArrowBody::Expr(Box::new(self.read_expr(body_node)?))
        };

        Ok(Arrow {
            params,
            body,
            is_async: self.has_token(node, "async"),
        })
    }

    fn read_class(&self, node: Node) -> Result<Class, ReadError> {
        let name = node.child_by_field_name("name").map(|name| self.ident(name));

        let mut super_class = None;
        for child in self.named_children(node) {
            if child.kind() == "class_heritage" {
                super_class = Some(self.read_expr(self.required_named(child)?)?);
            }
        }

        let mut members = Vec::new();
        for member in self.named_children(self.field(node, "body")?) {
            match member.kind() {
                "method_definition" => {
                    let (key, kind, is_static, function) = self.read_method(member)?;
                    members.push(ClassMember::Method {
                        key,
                        kind,
                        is_static,
                        function,
                    });
                }
                "field_definition" => {
                    let value = match member.child_by_field_name("value") {
                        Some(value) => Some(self.read_expr(value)?),
                        None => None,
                    };
                    members.push(ClassMember::Field {
                        key: self.read_prop_key(self.field(member, "property")?)?,
                        value,
                        is_static: self.has_token(member, "static"),
                    });
                }
                "class_static_block" => {
                    let body = self.read_statements(self.field(member, "body")?)?;
                    members.push(ClassMember::StaticBlock(body));
                }
                _ => return Err(self.unsupported("class member", member)),
            }
        }

        Ok(Class {
            name,
            super_class,
            members,
        })
    }

    fn read_method(&self, node: Node) -> Result<(PropKey, MethodKind, bool, Function), ReadError> {
        let key = self.read_prop_key(self.field(node, "name")?)?;

        let mut kind = MethodKind::Method;
        let mut is_static = false;
        let mut is_async = false;
        let mut is_generator = false;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.is_named() {
                continue;
            }
            match child.kind() {
                "static" => is_static = true,
                "static get" => {
                    is_static = true;
                    kind = MethodKind::Getter;
                }
                "get" => kind = MethodKind::Getter,
                "set" => kind = MethodKind::Setter,
                "async" => is_async = true,
                "*" => is_generator = true,
                _ => {}
            }
        }

        let function = Function {
            name: None,
            params: self.read_params(self.field(node, "parameters")?)?,
            body: self.read_statements(self.field(node, "body")?)?,
            is_async,
            is_generator,
        };

        Ok((key, kind, is_static, function))
    }

    fn read_prop_key(&self, node: Node) -> Result<PropKey, ReadError> {
        match node.kind() {
            "property_identifier" | "private_property_identifier" | "identifier" => {
                Ok(PropKey::Name(self.node_text(node).to_string()))
            }
            "string" => Ok(PropKey::String(self.read_string(node))),
            "number" => match parse_number(self.node_text(node)) {
                Some(Literal::Number(value)) => Ok(PropKey::Number(value)),
                _ => Err(self.unsupported("property key", node)),
            },
            "computed_property_name" => Ok(PropKey::Computed(Box::new(
                self.read_expr(self.required_named(node)?)?,
            ))),
            _ => Err(self.unsupported("property key", node)),
        }
    }

    fn read_expr(&self, node: Node) -> Result<Expr, ReadError> {
        match node.kind() {
            // Identifiers (`undefined` and `import` are ordinary names here)
            "identifier" | "undefined" | "import" => Ok(Expr::Ident(self.ident(node))),
            "this" => Ok(Expr::This),
            "super" => Ok(Expr::Super),

            // Literals
            "true" => Ok(Expr::bool(true)),
            "false" => Ok(Expr::bool(false)),
            "null" => Ok(Expr::null()),
            "number" => parse_number(self.node_text(node))
                .map(Expr::Literal)
                .ok_or_else(|| ReadError::Parse(format!("invalid number: {}", self.node_text(node)))),
            "string" => Ok(Expr::Literal(Literal::String(self.read_string(node)))),
            "template_string" => self.read_template(node).map(Expr::Template),
            "regex" => Ok(Expr::Literal(Literal::Regex {
                pattern: self.node_text(self.field(node, "pattern")?).to_string(),
                flags: node
                    .child_by_field_name("flags")
                    .map(|flags| self.node_text(flags).to_string())
                    .unwrap_or_default(),
            })),

            // Compound literals
            "array" => self
                .read_elements(node, |element| self.read_expr(element))
                .map(Expr::Array),
            "object" => self.read_object(node),
            "function_expression" | "function" | "generator_function" => {
                Ok(Expr::Function(Box::new(self.read_function(node)?)))
            }
            "arrow_function" => Ok(Expr::Arrow(Box::new(self.read_arrow(node)?))),
            "class" => Ok(Expr::Class(Box::new(self.read_class(node)?))),

            // Operators
            "parenthesized_expression" => self.read_expr(self.required_named(node)?),
            "unary_expression" => {
                let op_text = self.node_text(self.field(node, "operator")?);
                let op = UnaryOp::parse(op_text)
                    .ok_or_else(|| ReadError::Parse(format!("unknown unary operator: {}", op_text)))?;
                Ok(Expr::unary(op, self.read_expr(self.field(node, "argument")?)?))
            }
            "update_expression" => {
                let operator = self.field(node, "operator")?;
                let argument = self.field(node, "argument")?;
                let op_text = self.node_text(operator);
                let op = UpdateOp::parse(op_text)
                    .ok_or_else(|| ReadError::Parse(format!("unknown update operator: {}", op_text)))?;
                Ok(Expr::Update {
                    op,
                    prefix: operator.start_byte() < argument.start_byte(),
                    arg: Box::new(self.read_expr(argument)?),
                })
            }
            "binary_expression" => {
                let op_text = self.node_text(self.field(node, "operator")?);
                let op = BinaryOp::parse(op_text)
                    .ok_or_else(|| ReadError::Parse(format!("unknown binary operator: {}", op_text)))?;
                Ok(Expr::binary(
                    self.read_expr(self.field(node, "left")?)?,
                    op,
                    self.read_expr(self.field(node, "right")?)?,
                ))
            }
            "assignment_expression" => Ok(Expr::Assign {
                target: Box::new(self.read_assign_target(self.field(node, "left")?)?),
                op: AssignOp::Assign,
                value: Box::new(self.read_expr(self.field(node, "right")?)?),
            }),
            "augmented_assignment_expression" => {
                let op_text = self.node_text(self.field(node, "operator")?);
                let op = AssignOp::parse(op_text).ok_or_else(|| {
                    ReadError::Parse(format!("unknown assignment operator: {}", op_text))
                })?;
                Ok(Expr::Assign {
                    target: Box::new(self.read_assign_target(self.field(node, "left")?)?),
                    op,
                    value: Box::new(self.read_expr(self.field(node, "right")?)?),
                })
            }
            "ternary_expression" => Ok(Expr::conditional(
                self.read_expr(self.field(node, "condition")?)?,
                self.read_expr(self.field(node, "consequence")?)?,
                self.read_expr(self.field(node, "alternative")?)?,
            )),
            "sequence_expression" => {
                let mut exprs = Vec::new();
                self.read_sequence(node, &mut exprs)?;
                Ok(Expr::Sequence(exprs))
            }

            // Access and calls
            "call_expression" => self.read_call(node),
            "new_expression" => {
                let args = match node.child_by_field_name("arguments") {
                    Some(args) => self.read_args(args)?,
                    None => Vec::new(),
                };
                Ok(Expr::New {
                    callee: Box::new(self.read_expr(self.field(node, "constructor")?)?),
                    args,
                })
            }
            "member_expression" => Ok(Expr::Member {
                object: Box::new(self.read_expr(self.field(node, "object")?)?),
                property: Box::new(Expr::string(self.node_text(self.field(node, "property")?))),
                computed: false,
                optional: node.child_by_field_name("optional_chain").is_some(),
            }),
            "subscript_expression" => Ok(Expr::Member {
                object: Box::new(self.read_expr(self.field(node, "object")?)?),
                property: Box::new(self.read_expr(self.field(node, "index")?)?),
                computed: true,
                optional: node.child_by_field_name("optional_chain").is_some(),
            }),

            "spread_element" => Ok(Expr::Spread(Box::new(
                self.read_expr(self.required_named(node)?)?,
            ))),
            "await_expression" => Ok(Expr::Await(Box::new(
                self.read_expr(self.required_named(node)?)?,
            ))),
            "yield_expression" => {
                let arg = match self.first_named(node) {
                    Some(arg) => Some(Box::new(self.read_expr(arg)?)),
                    None => None,
                };
                Ok(Expr::Yield {
                    arg,
                    delegate: self.has_token(node, "*"),
                })
            }

            // Destructuring targets outside of an assignment (for-in/of heads)
            "object_pattern" | "array_pattern" | "assignment_pattern" | "rest_pattern" => {
                self.read_assign_target(node)
            }

            _ => Err(self.unsupported("expression type", node)),
        }
    }

    fn read_sequence(&self, node: Node, out: &mut Vec<Expr>) -> Result<(), ReadError> {
        for child in self.named_children(node) {
            if child.kind() == "sequence_expression" {
                self.read_sequence(child, out)?;
            } else {
                out.push(self.read_expr(child)?);
            }
        }
        Ok(())
    }

    fn read_call(&self, node: Node) -> Result<Expr, ReadError> {
        let callee = self.read_expr(self.field(node, "function")?)?;
        let args = self.field(node, "arguments")?;

        if args.kind() == "template_string" {
            return Ok(Expr::TaggedTemplate {
                tag: Box::new(callee),
                template: self.read_template(args)?,
            });
        }

        Ok(Expr::Call {
            callee: Box::new(callee),
            args: self.read_args(args)?,
            optional: node.child_by_field_name("optional_chain").is_some(),
        })
    }

    fn read_args(&self, node: Node) -> Result<Vec<Expr>, ReadError> {
        self.named_children(node)
            .into_iter()
            .map(|arg| self.read_expr(arg))
            .collect()
    }

    fn read_object(&self, node: Node) -> Result<Expr, ReadError> {
        let mut properties = Vec::new();
        for child in self.named_children(node) {
            let property = match child.kind() {
                "pair" => Property::KeyValue {
                    key: self.read_prop_key(self.field(child, "key")?)?,
                    value: self.read_expr(self.field(child, "value")?)?,
                },
                "shorthand_property_identifier" => Property::Shorthand(self.ident(child)),
                "method_definition" => {
                    let (key, kind, _, function) = self.read_method(child)?;
                    Property::Method {
                        key,
                        kind,
                        function,
                    }
                }
                "spread_element" => Property::Spread(self.read_expr(self.required_named(child)?)?),
                _ => return Err(self.unsupported("object member", child)),
            };
            properties.push(property);
        }
        Ok(Expr::Object(properties))
    }

    /// Elements of an array literal or array pattern; holes become `None`.
    fn read_elements<T>(
        &self,
        node: Node,
        mut read: impl FnMut(Node) -> Result<T, ReadError>,
    ) -> Result<Vec<Option<T>>, ReadError> {
        let mut elements = Vec::new();
        let mut pending = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "[" | "comment" => {}
                "," => elements.push(pending.take()),
                "]" => {
                    if pending.is_some() {
                        elements.push(pending.take());
                    }
                }
                _ => pending = Some(read(child)?),
            }
        }

        Ok(elements)
    }

    fn read_pat(&self, node: Node) -> Result<Pat, ReadError> {
        match node.kind() {
            "identifier" | "undefined" => Ok(Pat::Ident(self.ident(node))),
            "array_pattern" => self
                .read_elements(node, |element| self.read_pat(element))
                .map(Pat::Array),
            "object_pattern" => {
                let mut props = Vec::new();
                for child in self.named_children(node) {
                    let prop = match child.kind() {
                        "pair_pattern" => PatProp::KeyValue {
                            key: self.read_prop_key(self.field(child, "key")?)?,
                            value: self.read_pat(self.field(child, "value")?)?,
                        },
                        "shorthand_property_identifier_pattern" => PatProp::Shorthand {
                            name: self.ident(child),
                            default: None,
                        },
                        "object_assignment_pattern" => {
                            let left = self.field(child, "left")?;
                            if left.kind() != "shorthand_property_identifier_pattern" {
                                return Err(self.unsupported("object pattern default", child));
                            }
                            PatProp::Shorthand {
                                name: self.ident(left),
                                default: Some(self.read_expr(self.field(child, "right")?)?),
                            }
                        }
                        "rest_pattern" => PatProp::Rest(self.read_pat(self.required_named(child)?)?),
                        _ => return Err(self.unsupported("object pattern member", child)),
                    };
                    props.push(prop);
                }
                Ok(Pat::Object(props))
            }
            "assignment_pattern" => Ok(Pat::Default {
                target: Box::new(self.read_pat(self.field(node, "left")?)?),
                value: Box::new(self.read_expr(self.field(node, "right")?)?),
            }),
            "rest_pattern" => Ok(Pat::Rest(Box::new(
                self.read_pat(self.required_named(node)?)?,
            ))),
            _ => Err(self.unsupported("binding pattern", node)),
        }
    }

    /// Assignment targets are expressions; destructuring becomes array/object literals.
    fn read_assign_target(&self, node: Node) -> Result<Expr, ReadError> {
        match node.kind() {
            "array_pattern" => self
                .read_elements(node, |element| self.read_assign_target(element))
                .map(Expr::Array),
            "object_pattern" => {
                let mut properties = Vec::new();
                for child in self.named_children(node) {
                    let property = match child.kind() {
                        "pair_pattern" => Property::KeyValue {
                            key: self.read_prop_key(self.field(child, "key")?)?,
                            value: self.read_assign_target(self.field(child, "value")?)?,
                        },
                        "shorthand_property_identifier_pattern" => {
                            Property::Shorthand(self.ident(child))
                        }
                        "object_assignment_pattern" => {
                            let left = self.field(child, "left")?;
                            if left.kind() != "shorthand_property_identifier_pattern" {
                                return Err(self.unsupported("object pattern default", child));
                            }
                            Property::KeyValue {
                                key: PropKey::Name(self.node_text(left).to_string()),
                                value: Expr::Assign {
                                    target: Box::new(Expr::Ident(self.ident(left))),
                                    op: AssignOp::Assign,
                                    value: Box::new(self.read_expr(self.field(child, "right")?)?),
                                },
                            }
                        }
                        "rest_pattern" => Property::Spread(
                            self.read_assign_target(self.required_named(child)?)?,
                        ),
                        _ => return Err(self.unsupported("object pattern member", child)),
                    };
                    properties.push(property);
                }
                Ok(Expr::Object(properties))
            }
            "assignment_pattern" => Ok(Expr::Assign {
                target: Box::new(self.read_assign_target(self.field(node, "left")?)?),
                op: AssignOp::Assign,
                value: Box::new(self.read_expr(self.field(node, "right")?)?),
            }),
            "rest_pattern" => Ok(Expr::Spread(Box::new(
                self.read_assign_target(self.required_named(node)?)?,
            ))),
            _ => self.read_expr(node),
        }
    }

    fn read_template(&self, node: Node) -> Result<Template, ReadError> {
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();

        // Skip the opening backtick
        let mut start = node.start_byte() + 1;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "template_substitution" {
                quasis.push(self.source[start..child.start_byte()].to_string());
                exprs.push(self.read_expr(self.required_named(child)?)?);
                start = child.end_byte();
            }
        }
        let end = node.end_byte().saturating_sub(1).max(start);
        quasis.push(self.source[start..end].to_string());

        Ok(Template { quasis, exprs })
    }

    /// String contents re-delimited for double quotes, escapes untouched.
    fn read_string(&self, node: Node) -> String {
        let text = self.node_text(node);
        if text.len() < 2 {
            return String::new();
        }
        let quote = text.as_bytes()[0];
        let inner = &text[1..text.len() - 1];
        if quote == b'"' {
            return inner.to_string();
        }

        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                '"' => out.push_str("\\\""),
                _ => out.push(c),
            }
        }
        out
    }
}

/// First error or missing node in document order.
fn find_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = find_error(child) {
                return Some(found);
            }
        }
    }
    None
}

/// Parse a numeric literal (decimal, hex, octal, binary, legacy octal, bigint).
fn parse_number(text: &str) -> Option<Literal> {
    let clean: String = text.chars().filter(|c| *c != '_').collect();

    if let Some(digits) = clean.strip_suffix('n') {
        return Some(Literal::BigInt(digits.to_string()));
    }

    let lower = clean.to_ascii_lowercase();
    let value = if let Some(digits) = lower.strip_prefix("0x") {
        parse_radix(digits, 16)?
    } else if let Some(digits) = lower.strip_prefix("0o") {
        parse_radix(digits, 8)?
    } else if let Some(digits) = lower.strip_prefix("0b") {
        parse_radix(digits, 2)?
    } else if lower.len() > 1
        && lower.starts_with('0')
        && lower.chars().all(|c| c.is_ascii_digit())
    {
        // Legacy octal unless a digit rules it out (`019` is decimal)
        parse_radix(&lower[1..], 8).or_else(|| lower.parse().ok())?
    } else {
        lower.parse::<f64>().ok()?
    };

    Some(Literal::Number(value))
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix)
            .map(|digit| acc * radix as f64 + digit as f64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_number("42"), Some(Literal::Number(42.0)));
        assert_eq!(parse_number("0x1F"), Some(Literal::Number(31.0)));
        assert_eq!(parse_number("0b101"), Some(Literal::Number(5.0)));
        assert_eq!(parse_number("017"), Some(Literal::Number(15.0)));
        assert_eq!(parse_number("019"), Some(Literal::Number(19.0)));
        assert_eq!(parse_number("1_000"), Some(Literal::Number(1000.0)));
        assert_eq!(parse_number(".5"), Some(Literal::Number(0.5)));
        assert_eq!(parse_number("1e3"), Some(Literal::Number(1000.0)));
        assert_eq!(parse_number("10n"), Some(Literal::BigInt("10".into())));
    }

    #[test]
    fn test_single_quoted_strings_are_redelimited() {
        let program = read_javascript(r#"x = 'it\'s "quoted"';"#).unwrap();
        let Stmt::Expr(Expr::Assign { value, .. }) = &program.body[0] else {
            panic!("expected assignment");
        };
        assert_eq!(
            **value,
            Expr::Literal(Literal::String(r#"it's \"quoted\""#.into()))
        );
    }

    #[test]
    fn test_comma_expression_is_flat() {
        let program = read_javascript("a, b, c;").unwrap();
        assert_eq!(
            program.body,
            vec![Stmt::Expr(Expr::Sequence(vec![
                Expr::ident("a"),
                Expr::ident("b"),
                Expr::ident("c"),
            ]))]
        );
    }

    #[test]
    fn test_identifier_ids_are_byte_offsets() {
        let program = read_javascript("foo(bar);").unwrap();
        let Stmt::Expr(Expr::Call { callee, args, .. }) = &program.body[0] else {
            panic!("expected call");
        };
        let Expr::Ident(callee) = callee.as_ref() else {
            panic!("expected identifier callee");
        };
        let Expr::Ident(arg) = &args[0] else {
            panic!("expected identifier argument");
        };
        assert_eq!(callee.id(), Some(NodeId(0)));
        assert_eq!(arg.id(), Some(NodeId(4)));
    }

    #[test]
    fn test_array_holes() {
        let program = read_javascript("x = [, a, , b,];").unwrap();
        let Stmt::Expr(Expr::Assign { value, .. }) = &program.body[0] else {
            panic!("expected assignment");
        };
        assert_eq!(
            **value,
            Expr::Array(vec![None, Some(Expr::ident("a")), None, Some(Expr::ident("b"))])
        );
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = read_javascript("if (").unwrap_err();
        assert!(matches!(err, ReadError::Parse(msg) if msg.starts_with("syntax error")));
    }

    #[test]
    fn test_module_syntax_is_unsupported() {
        let err = read_javascript("import x from 'y';").unwrap_err();
        assert!(matches!(err, ReadError::Unsupported(_)));
    }
}
