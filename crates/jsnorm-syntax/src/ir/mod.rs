//! Syntax tree for JavaScript programs and rewrite patterns.
//!
//! Every syntactic category is a closed enum or struct. Rewrite patterns are
//! ordinary trees of the same types; the `Placeholder` variants of [`Ident`],
//! [`Stmt`] and [`Expr`] only appear in compiled patterns.
//!
//! # Equality
//!
//! `PartialEq` on the tree is structural: identifier ids (source positions)
//! are ignored, everything else (kinds, names, operators, literal values,
//! child order and arity) must agree.

mod ops;

pub use ops::{AssignOp, BinaryOp, UnaryOp, UpdateOp};

use serde::{Deserialize, Serialize};

/// Position of an identifier occurrence inside one parsed program.
///
/// The reader uses the byte offset of the identifier token, so ids are unique
/// within a program. Identifiers created by rewrites carry no id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// A whole program (script).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }
}

/// An identifier occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Ident {
    Name {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<NodeId>,
    },
    /// Generic pattern placeholder (`placeholderN`), binds an identifier name.
    Placeholder(u32),
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Ident::Name {
            name: name.into(),
            id: None,
        }
    }

    pub fn with_id(name: impl Into<String>, id: NodeId) -> Self {
        Ident::Name {
            name: name.into(),
            id: Some(id),
        }
    }

    /// The identifier text, `None` for placeholders.
    pub fn name(&self) -> Option<&str> {
        match self {
            Ident::Name { name, .. } => Some(name),
            Ident::Placeholder(_) => None,
        }
    }

    pub fn id(&self) -> Option<NodeId> {
        match self {
            Ident::Name { id, .. } => *id,
            Ident::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Ident::Placeholder(_))
    }
}

// Ids are position metadata and never take part in equality.
impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ident::Name { name: a, .. }, Ident::Name { name: b, .. }) => a == b,
            (Ident::Placeholder(a), Ident::Placeholder(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    /// Digits without the trailing `n`.
    BigInt(String),
    /// Source text between the quotes, escapes intact, as if double-quoted.
    String(String),
    Regex { pattern: String, flags: String },
}

/// Template literal. `quasis` holds the raw text chunks, one more than `exprs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub quasis: Vec<String>,
    pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Ident(Ident),
    Literal(Literal),
    This,
    Super,
    Template(Template),
    TaggedTemplate {
        tag: Box<Expr>,
        template: Template,
    },
    /// `None` entries are holes (`[a, , b]`).
    Array(Vec<Option<Expr>>),
    Object(Vec<Property>),
    Function(Box<Function>),
    Arrow(Box<Arrow>),
    Class(Box<Class>),
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        arg: Box<Expr>,
    },
    /// Arithmetic, comparison and logical operators.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Destructuring targets are `Array`/`Object` expressions.
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Non-computed properties are string literals (`a.b` has property `"b"`).
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
        optional: bool,
    },
    /// Comma expression, always at least two elements.
    Sequence(Vec<Expr>),
    Spread(Box<Expr>),
    Await(Box<Expr>),
    Yield {
        arg: Option<Box<Expr>>,
        delegate: bool,
    },
    /// Expression placeholder (`expressionN`, optionally `.orDeclaration`).
    Placeholder {
        index: u32,
        or_declaration: bool,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Ident::new(name))
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value))
    }

    pub fn number(value: impl Into<f64>) -> Self {
        Expr::Literal(Literal::Number(value.into()))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn unary(op: UnaryOp, arg: Expr) -> Self {
        Expr::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            op: AssignOp::Assign,
            value: Box::new(value),
        }
    }

    pub fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Self {
        Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
            optional: false,
        }
    }

    /// Dot access: `object.property`.
    pub fn member(object: Expr, property: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            property: Box::new(Expr::string(property)),
            computed: false,
            optional: false,
        }
    }

    pub fn index(object: Expr, index: Expr) -> Self {
        Expr::Member {
            object: Box::new(object),
            property: Box::new(index),
            computed: true,
            optional: false,
        }
    }

    pub fn object(pairs: Vec<(String, Expr)>) -> Self {
        Expr::Object(
            pairs
                .into_iter()
                .map(|(key, value)| Property::KeyValue {
                    key: PropKey::Name(key),
                    value,
                })
                .collect(),
        )
    }
}

/// Binding pattern: declaration targets, parameters, catch parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pat {
    Ident(Ident),
    Array(Vec<Option<Pat>>),
    Object(Vec<PatProp>),
    /// `target = value` default.
    Default {
        target: Box<Pat>,
        value: Box<Expr>,
    },
    Rest(Box<Pat>),
}

impl Pat {
    pub fn ident(name: impl Into<String>) -> Self {
        Pat::Ident(Ident::new(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatProp {
    KeyValue { key: PropKey, value: Pat },
    Shorthand { name: Ident, default: Option<Expr> },
    Rest(Pat),
}

/// Property name in object literals, object patterns and classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropKey {
    /// Identifier-like key, including private names (`#x`).
    Name(String),
    String(String),
    Number(f64),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Property {
    KeyValue {
        key: PropKey,
        value: Expr,
    },
    Shorthand(Ident),
    Method {
        key: PropKey,
        kind: MethodKind,
        function: Function,
    },
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: Option<Ident>,
    pub params: Vec<Pat>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub is_generator: bool,
}

impl Function {
    pub fn named(name: impl Into<String>, params: Vec<Pat>, body: Vec<Stmt>) -> Self {
        Self {
            name: Some(Ident::new(name)),
            params,
            body,
            is_async: false,
            is_generator: false,
        }
    }

    pub fn anonymous(params: Vec<Pat>, body: Vec<Stmt>) -> Self {
        Self {
            name: None,
            params,
            body,
            is_async: false,
            is_generator: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub params: Vec<Pat>,
    pub body: ArrowBody,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub name: Option<Ident>,
    pub super_class: Option<Expr>,
    pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassMember {
    Method {
        key: PropKey,
        kind: MethodKind,
        is_static: bool,
        function: Function,
    },
    Field {
        key: PropKey,
        value: Option<Expr>,
        is_static: bool,
    },
    StaticBlock(Vec<Stmt>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub target: Pat,
    pub init: Option<Expr>,
}

/// Head of a `for` loop initializer or a `for-in`/`for-of` left side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// `None` for `default:`.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: Option<Pat>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(Expr),
    Var(VarDecl),
    Function(Box<Function>),
    Class(Box<Class>),
    Block(Vec<Stmt>),
    Empty,
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
    },
    ForOf {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
        is_await: bool,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    Return(Option<Expr>),
    Throw(Expr),
    Break(Option<String>),
    Continue(Option<String>),
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Try {
        block: Vec<Stmt>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Stmt>>,
    },
    Debugger,
    /// Comment text including its delimiters.
    Comment(String),
    /// Transient multi-statement container. Rewrites produce it; the driver
    /// splices it into the enclosing statement list before it is printed.
    Sequence(Vec<Stmt>),
    /// Statement placeholder (`statementN`, optionally `.multiLine`).
    Placeholder {
        index: u32,
        multi_line: bool,
    },
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(stmts)
    }

    pub fn if_stmt(test: Expr, consequent: Stmt, alternate: Option<Stmt>) -> Self {
        Stmt::If {
            test,
            consequent: Box::new(consequent),
            alternate: alternate.map(Box::new),
        }
    }

    pub fn while_loop(test: Expr, body: Stmt) -> Self {
        Stmt::While {
            test,
            body: Box::new(body),
        }
    }

    pub fn return_stmt(expr: Option<Expr>) -> Self {
        Stmt::Return(expr)
    }

    pub fn var(kind: VarKind, name: impl Into<String>, init: Option<Expr>) -> Self {
        Stmt::Var(VarDecl {
            kind,
            declarators: vec![Declarator {
                target: Pat::ident(name),
                init,
            }],
        })
    }

    pub fn function(function: Function) -> Self {
        Stmt::Function(Box::new(function))
    }

    pub fn kind(&self) -> StmtKind {
        match self {
            Stmt::Expr(_) => StmtKind::Expr,
            Stmt::Var(_) => StmtKind::Var,
            Stmt::Function(_) => StmtKind::Function,
            Stmt::Class(_) => StmtKind::Class,
            Stmt::Block(_) => StmtKind::Block,
            Stmt::Empty => StmtKind::Empty,
            Stmt::If { .. } => StmtKind::If,
            Stmt::For { .. } => StmtKind::For,
            Stmt::ForIn { .. } => StmtKind::ForIn,
            Stmt::ForOf { .. } => StmtKind::ForOf,
            Stmt::While { .. } => StmtKind::While,
            Stmt::DoWhile { .. } => StmtKind::DoWhile,
            Stmt::Return(_) => StmtKind::Return,
            Stmt::Throw(_) => StmtKind::Throw,
            Stmt::Break(_) => StmtKind::Break,
            Stmt::Continue(_) => StmtKind::Continue,
            Stmt::Labeled { .. } => StmtKind::Labeled,
            Stmt::Switch { .. } => StmtKind::Switch,
            Stmt::Try { .. } => StmtKind::Try,
            Stmt::Debugger => StmtKind::Debugger,
            Stmt::Comment(_) => StmtKind::Comment,
            Stmt::Sequence(_) => StmtKind::Sequence,
            Stmt::Placeholder { .. } => StmtKind::Placeholder,
        }
    }
}

/// Fieldless statement kind, used to classify statements by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StmtKind {
    Expr,
    Var,
    Function,
    Class,
    Block,
    Empty,
    If,
    For,
    ForIn,
    ForOf,
    While,
    DoWhile,
    Return,
    Throw,
    Break,
    Continue,
    Labeled,
    Switch,
    Try,
    Debugger,
    Comment,
    Sequence,
    Placeholder,
}

impl StmtKind {
    /// Kinds that print across several lines (compound / control-flow statements).
    pub const MULTI_LINE: &'static [StmtKind] = &[
        StmtKind::Function,
        StmtKind::Class,
        StmtKind::Block,
        StmtKind::If,
        StmtKind::For,
        StmtKind::ForIn,
        StmtKind::ForOf,
        StmtKind::While,
        StmtKind::DoWhile,
        StmtKind::Labeled,
        StmtKind::Switch,
        StmtKind::Try,
        StmtKind::Sequence,
    ];
}
