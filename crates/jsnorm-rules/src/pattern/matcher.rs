//! Structural matching of a pattern against a concrete tree.
//!
//! One synchronized descent over pattern and node. Kinds must agree, scalars
//! must be equal, sequences must have equal length and match pairwise.
//! Placeholders bind the node they face; a placeholder seen again must face
//! an equal node. The first disagreement anywhere fails the whole match.

use super::{Bound, Environment, MatchOptions, PlaceholderKey};
use jsnorm_syntax::ir::*;

/// Match a statement pattern against `node`.
pub fn match_stmt<'a>(
    pattern: &Stmt,
    node: &'a Stmt,
    options: &MatchOptions,
) -> Option<Environment<'a>> {
    let mut state = MatchState::new(options);
    state.stmt(pattern, node).then_some(state.env)
}

/// Match an expression pattern against `node`.
pub fn match_expr<'a>(
    pattern: &Expr,
    node: &'a Expr,
    options: &MatchOptions,
) -> Option<Environment<'a>> {
    let mut state = MatchState::new(options);
    state.expr(pattern, node).then_some(state.env)
}

/// Match a run of statement patterns against an equally long run of nodes.
pub fn match_stmts<'a>(
    patterns: &[Stmt],
    nodes: &'a [Stmt],
    options: &MatchOptions,
) -> Option<Environment<'a>> {
    let mut state = MatchState::new(options);
    state.stmts(patterns, nodes).then_some(state.env)
}

struct MatchState<'a, 'o> {
    env: Environment<'a>,
    options: &'o MatchOptions,
}

impl<'a, 'o> MatchState<'a, 'o> {
    fn new(options: &'o MatchOptions) -> Self {
        Self {
            env: Environment::new(),
            options,
        }
    }

    fn list<T>(
        &mut self,
        patterns: &[T],
        nodes: &'a [T],
        mut each: impl FnMut(&mut Self, &T, &'a T) -> bool,
    ) -> bool {
        patterns.len() == nodes.len()
            && patterns
                .iter()
                .zip(nodes)
                .all(|(pattern, node)| each(self, pattern, node))
    }

    fn opt<T: ?Sized>(
        &mut self,
        pattern: Option<&T>,
        node: Option<&'a T>,
        each: impl FnOnce(&mut Self, &T, &'a T) -> bool,
    ) -> bool {
        match (pattern, node) {
            (Some(pattern), Some(node)) => each(self, pattern, node),
            (None, None) => true,
            _ => false,
        }
    }

    fn stmts(&mut self, patterns: &[Stmt], nodes: &'a [Stmt]) -> bool {
        self.list(patterns, nodes, Self::stmt)
    }

    fn stmt(&mut self, pattern: &Stmt, node: &'a Stmt) -> bool {
        match (pattern, node) {
            (Stmt::Placeholder { index, multi_line }, _) => {
                if *multi_line && !self.options.is_multi_line(node.kind()) {
                    return false;
                }
                self.env
                    .bind(PlaceholderKey::statement(*index), Bound::Stmt(node))
            }
            (Stmt::Expr(p), Stmt::Expr(n)) | (Stmt::Throw(p), Stmt::Throw(n)) => self.expr(p, n),
            (Stmt::Var(p), Stmt::Var(n)) => self.var_decl(p, n),
            (Stmt::Function(p), Stmt::Function(n)) => self.function(p, n),
            (Stmt::Class(p), Stmt::Class(n)) => self.class(p, n),
            (Stmt::Block(p), Stmt::Block(n)) | (Stmt::Sequence(p), Stmt::Sequence(n)) => {
                self.stmts(p, n)
            }
            (Stmt::Empty, Stmt::Empty) | (Stmt::Debugger, Stmt::Debugger) => true,
            (
                Stmt::If {
                    test: pt,
                    consequent: pc,
                    alternate: pa,
                },
                Stmt::If {
                    test: nt,
                    consequent: nc,
                    alternate: na,
                },
            ) => {
                self.expr(pt, nt)
                    && self.stmt(pc, nc)
                    && self.opt(pa.as_deref(), na.as_deref(), Self::stmt)
            }
            (
                Stmt::For {
                    init: pi,
                    test: pt,
                    update: pu,
                    body: pb,
                },
                Stmt::For {
                    init: ni,
                    test: nt,
                    update: nu,
                    body: nb,
                },
            ) => {
                self.opt(pi.as_ref(), ni.as_ref(), Self::for_init)
                    && self.opt(pt.as_ref(), nt.as_ref(), Self::expr)
                    && self.opt(pu.as_ref(), nu.as_ref(), Self::expr)
                    && self.stmt(pb, nb)
            }
            (
                Stmt::ForIn {
                    left: pl,
                    right: pr,
                    body: pb,
                },
                Stmt::ForIn {
                    left: nl,
                    right: nr,
                    body: nb,
                },
            ) => self.for_init(pl, nl) && self.expr(pr, nr) && self.stmt(pb, nb),
            (
                Stmt::ForOf {
                    left: pl,
                    right: pr,
                    body: pb,
                    is_await: pw,
                },
                Stmt::ForOf {
                    left: nl,
                    right: nr,
                    body: nb,
                    is_await: nw,
                },
            ) => pw == nw && self.for_init(pl, nl) && self.expr(pr, nr) && self.stmt(pb, nb),
            (Stmt::While { test: pt, body: pb }, Stmt::While { test: nt, body: nb })
            | (Stmt::DoWhile { body: pb, test: pt }, Stmt::DoWhile { body: nb, test: nt }) => {
                self.expr(pt, nt) && self.stmt(pb, nb)
            }
            (Stmt::Return(p), Stmt::Return(n)) => self.opt(p.as_ref(), n.as_ref(), Self::expr),
            (Stmt::Break(p), Stmt::Break(n)) | (Stmt::Continue(p), Stmt::Continue(n)) => p == n,
            (
                Stmt::Labeled {
                    label: pl,
                    body: pb,
                },
                Stmt::Labeled {
                    label: nl,
                    body: nb,
                },
            ) => pl == nl && self.stmt(pb, nb),
            (
                Stmt::Switch {
                    discriminant: pd,
                    cases: pc,
                },
                Stmt::Switch {
                    discriminant: nd,
                    cases: nc,
                },
            ) => {
                self.expr(pd, nd)
                    && self.list(pc, nc, |state, p, n| {
                        state.opt(p.test.as_ref(), n.test.as_ref(), Self::expr)
                            && state.stmts(&p.body, &n.body)
                    })
            }
            (
                Stmt::Try {
                    block: pb,
                    handler: ph,
                    finalizer: pf,
                },
                Stmt::Try {
                    block: nb,
                    handler: nh,
                    finalizer: nf,
                },
            ) => {
                self.stmts(pb, nb)
                    && self.opt(ph.as_ref(), nh.as_ref(), |state, p, n| {
                        state.opt(p.param.as_ref(), n.param.as_ref(), Self::pat)
                            && state.stmts(&p.body, &n.body)
                    })
                    && self.opt(pf.as_deref(), nf.as_deref(), Self::stmts)
            }
            (Stmt::Comment(p), Stmt::Comment(n)) => p == n,
            _ => false,
        }
    }

    fn var_decl(&mut self, pattern: &VarDecl, node: &'a VarDecl) -> bool {
        pattern.kind == node.kind
            && self.list(&pattern.declarators, &node.declarators, |state, p, n| {
                state.pat(&p.target, &n.target)
                    && state.opt(p.init.as_ref(), n.init.as_ref(), Self::expr)
            })
    }

    fn for_init(&mut self, pattern: &ForInit, node: &'a ForInit) -> bool {
        match (pattern, node) {
            (
                ForInit::Expr(Expr::Placeholder {
                    index,
                    or_declaration: true,
                }),
                ForInit::Var(decl),
            ) => self
                .env
                .bind(PlaceholderKey::expression(*index), Bound::Decl(decl)),
            (ForInit::Expr(p), ForInit::Expr(n)) => self.expr(p, n),
            (ForInit::Var(p), ForInit::Var(n)) => self.var_decl(p, n),
            _ => false,
        }
    }

    fn ident(&mut self, pattern: &Ident, node: &'a Ident) -> bool {
        match (pattern, node) {
            (Ident::Placeholder(index), Ident::Name { .. }) => self
                .env
                .bind(PlaceholderKey::generic(*index), Bound::Name(node)),
            (Ident::Name { name: p, .. }, Ident::Name { name: n, .. }) => p == n,
            _ => false,
        }
    }

    fn expr(&mut self, pattern: &Expr, node: &'a Expr) -> bool {
        match (pattern, node) {
            (Expr::Placeholder { index, .. }, _) => self
                .env
                .bind(PlaceholderKey::expression(*index), Bound::Expr(node)),
            (Expr::Ident(p), Expr::Ident(n)) => self.ident(p, n),
            (Expr::Literal(p), Expr::Literal(n)) => p == n,
            (Expr::This, Expr::This) | (Expr::Super, Expr::Super) => true,
            (Expr::Template(p), Expr::Template(n)) => self.template(p, n),
            (
                Expr::TaggedTemplate {
                    tag: pt,
                    template: pq,
                },
                Expr::TaggedTemplate {
                    tag: nt,
                    template: nq,
                },
            ) => self.expr(pt, nt) && self.template(pq, nq),
            (Expr::Array(p), Expr::Array(n)) => self.list(p, n, |state, p, n| {
                state.opt(p.as_ref(), n.as_ref(), Self::expr)
            }),
            (Expr::Object(p), Expr::Object(n)) => self.list(p, n, Self::property),
            (Expr::Function(p), Expr::Function(n)) => self.function(p, n),
            (Expr::Arrow(p), Expr::Arrow(n)) => {
                p.is_async == n.is_async
                    && self.list(&p.params, &n.params, Self::pat)
                    && match (&p.body, &n.body) {
                        (ArrowBody::Expr(p), ArrowBody::Expr(n)) => self.expr(p, n),
                        (ArrowBody::Block(p), ArrowBody::Block(n)) => self.stmts(p, n),
                        _ => false,
                    }
            }
            (Expr::Class(p), Expr::Class(n)) => self.class(p, n),
            (Expr::Unary { op: po, arg: pa }, Expr::Unary { op: no, arg: na }) => {
                po == no && self.expr(pa, na)
            }
            (
                Expr::Update {
                    op: po,
                    prefix: pp,
                    arg: pa,
                },
                Expr::Update {
                    op: no,
                    prefix: np,
                    arg: na,
                },
            ) => po == no && pp == np && self.expr(pa, na),
            (
                Expr::Binary {
                    left: pl,
                    op: po,
                    right: pr,
                },
                Expr::Binary {
                    left: nl,
                    op: no,
                    right: nr,
                },
            ) => po == no && self.expr(pl, nl) && self.expr(pr, nr),
            (
                Expr::Assign {
                    target: pt,
                    op: po,
                    value: pv,
                },
                Expr::Assign {
                    target: nt,
                    op: no,
                    value: nv,
                },
            ) => po == no && self.expr(pt, nt) && self.expr(pv, nv),
            (
                Expr::Conditional {
                    test: pt,
                    consequent: pc,
                    alternate: pa,
                },
                Expr::Conditional {
                    test: nt,
                    consequent: nc,
                    alternate: na,
                },
            ) => self.expr(pt, nt) && self.expr(pc, nc) && self.expr(pa, na),
            (
                Expr::Call {
                    callee: pc,
                    args: pa,
                    optional: po,
                },
                Expr::Call {
                    callee: nc,
                    args: na,
                    optional: no,
                },
            ) => po == no && self.expr(pc, nc) && self.list(pa, na, Self::expr),
            (Expr::New { callee: pc, args: pa }, Expr::New { callee: nc, args: na }) => {
                self.expr(pc, nc) && self.list(pa, na, Self::expr)
            }
            (
                Expr::Member {
                    object: po,
                    property: pp,
                    computed: pc,
                    optional: pq,
                },
                Expr::Member {
                    object: no,
                    property: np,
                    computed: nc,
                    optional: nq,
                },
            ) => pc == nc && pq == nq && self.expr(po, no) && self.expr(pp, np),
            (Expr::Sequence(p), Expr::Sequence(n)) => self.list(p, n, Self::expr),
            (Expr::Spread(p), Expr::Spread(n)) | (Expr::Await(p), Expr::Await(n)) => {
                self.expr(p, n)
            }
            (
                Expr::Yield {
                    arg: pa,
                    delegate: pd,
                },
                Expr::Yield {
                    arg: na,
                    delegate: nd,
                },
            ) => pd == nd && self.opt(pa.as_deref(), na.as_deref(), Self::expr),
            _ => false,
        }
    }

    fn template(&mut self, pattern: &Template, node: &'a Template) -> bool {
        pattern.quasis == node.quasis && self.list(&pattern.exprs, &node.exprs, Self::expr)
    }

    fn prop_key(&mut self, pattern: &PropKey, node: &'a PropKey) -> bool {
        match (pattern, node) {
            (PropKey::Computed(p), PropKey::Computed(n)) => self.expr(p, n),
            (PropKey::Name(p), PropKey::Name(n)) | (PropKey::String(p), PropKey::String(n)) => {
                p == n
            }
            (PropKey::Number(p), PropKey::Number(n)) => p == n,
            _ => false,
        }
    }

    fn property(&mut self, pattern: &Property, node: &'a Property) -> bool {
        match (pattern, node) {
            (
                Property::KeyValue {
                    key: pk,
                    value: pv,
                },
                Property::KeyValue {
                    key: nk,
                    value: nv,
                },
            ) => self.prop_key(pk, nk) && self.expr(pv, nv),
            (Property::Shorthand(p), Property::Shorthand(n)) => self.ident(p, n),
            (
                Property::Method {
                    key: pk,
                    kind: pm,
                    function: pf,
                },
                Property::Method {
                    key: nk,
                    kind: nm,
                    function: nf,
                },
            ) => pm == nm && self.prop_key(pk, nk) && self.function(pf, nf),
            (Property::Spread(p), Property::Spread(n)) => self.expr(p, n),
            _ => false,
        }
    }

    fn pat(&mut self, pattern: &Pat, node: &'a Pat) -> bool {
        match (pattern, node) {
            (Pat::Ident(p), Pat::Ident(n)) => self.ident(p, n),
            (Pat::Array(p), Pat::Array(n)) => self.list(p, n, |state, p, n| {
                state.opt(p.as_ref(), n.as_ref(), Self::pat)
            }),
            (Pat::Object(p), Pat::Object(n)) => self.list(p, n, Self::pat_prop),
            (
                Pat::Default {
                    target: pt,
                    value: pv,
                },
                Pat::Default {
                    target: nt,
                    value: nv,
                },
            ) => self.pat(pt, nt) && self.expr(pv, nv),
            (Pat::Rest(p), Pat::Rest(n)) => self.pat(p, n),
            _ => false,
        }
    }

    fn pat_prop(&mut self, pattern: &PatProp, node: &'a PatProp) -> bool {
        match (pattern, node) {
            (
                PatProp::KeyValue {
                    key: pk,
                    value: pv,
                },
                PatProp::KeyValue {
                    key: nk,
                    value: nv,
                },
            ) => self.prop_key(pk, nk) && self.pat(pv, nv),
            (
                PatProp::Shorthand {
                    name: pn,
                    default: pd,
                },
                PatProp::Shorthand {
                    name: nn,
                    default: nd,
                },
            ) => self.ident(pn, nn) && self.opt(pd.as_ref(), nd.as_ref(), Self::expr),
            (PatProp::Rest(p), PatProp::Rest(n)) => self.pat(p, n),
            _ => false,
        }
    }

    fn function(&mut self, pattern: &Function, node: &'a Function) -> bool {
        pattern.is_async == node.is_async
            && pattern.is_generator == node.is_generator
            && self.opt(pattern.name.as_ref(), node.name.as_ref(), Self::ident)
            && self.list(&pattern.params, &node.params, Self::pat)
            && self.stmts(&pattern.body, &node.body)
    }

    fn class(&mut self, pattern: &Class, node: &'a Class) -> bool {
        self.opt(pattern.name.as_ref(), node.name.as_ref(), Self::ident)
            && self.opt(
                pattern.super_class.as_ref(),
                node.super_class.as_ref(),
                Self::expr,
            )
            && self.list(&pattern.members, &node.members, Self::class_member)
    }

    fn class_member(&mut self, pattern: &ClassMember, node: &'a ClassMember) -> bool {
        match (pattern, node) {
            (
                ClassMember::Method {
                    key: pk,
                    kind: pm,
                    is_static: ps,
                    function: pf,
                },
                ClassMember::Method {
                    key: nk,
                    kind: nm,
                    is_static: ns,
                    function: nf,
                },
            ) => pm == nm && ps == ns && self.prop_key(pk, nk) && self.function(pf, nf),
            (
                ClassMember::Field {
                    key: pk,
                    value: pv,
                    is_static: ps,
                },
                ClassMember::Field {
                    key: nk,
                    value: nv,
                    is_static: ns,
                },
            ) => ps == ns && self.prop_key(pk, nk) && self.opt(pv.as_ref(), nv.as_ref(), Self::expr),
            (ClassMember::StaticBlock(p), ClassMember::StaticBlock(n)) => self.stmts(p, n),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use jsnorm_syntax::read_javascript;

    fn stmt_pattern(text: &str) -> Stmt {
        match Pattern::compile(text).unwrap() {
            Pattern::Stmt(stmt) => stmt,
            Pattern::Expr(expr) => panic!("expected a statement pattern, got {:?}", expr),
        }
    }

    fn first_stmt(source: &str) -> Stmt {
        read_javascript(source).unwrap().body.remove(0)
    }

    #[test]
    fn test_binds_each_family() {
        let pattern = stmt_pattern("placeholder1 = expression1 ? expression2 : f(placeholder1);");
        let node = first_stmt("x = a.b ? 1 : f(x);");
        let env = match_stmt(&pattern, &node, &MatchOptions::default()).unwrap();

        assert_eq!(env.len(), 3);
        let Some(Bound::Name(name)) = env.get(PlaceholderKey::generic(1)) else {
            panic!("placeholder1 unbound");
        };
        assert_eq!(name.name(), Some("x"));
        assert!(matches!(
            env.get(PlaceholderKey::expression(1)),
            Some(Bound::Expr(Expr::Member { .. }))
        ));
    }

    #[test]
    fn test_generic_placeholder_must_repeat_name() {
        let pattern = stmt_pattern("placeholder1 = placeholder1 + 1;");
        let options = MatchOptions::default();
        assert!(match_stmt(&pattern, &first_stmt("i = i + 1;"), &options).is_some());
        assert!(match_stmt(&pattern, &first_stmt("i = j + 1;"), &options).is_none());
    }

    #[test]
    fn test_kind_and_arity_must_agree() {
        let pattern = stmt_pattern("f(expression1);");
        let options = MatchOptions::default();
        assert!(match_stmt(&pattern, &first_stmt("f(a, b);"), &options).is_none());
        assert!(match_stmt(&pattern, &first_stmt("g(a);"), &options).is_none());
        assert!(match_stmt(&pattern, &first_stmt("new f(a);"), &options).is_none());
    }

    #[test]
    fn test_failed_match_has_no_partial_environment() {
        let pattern = stmt_pattern("if (expression1) statement1; else statement2;");
        let node = first_stmt("if (a) b;");
        assert!(match_stmt(&pattern, &node, &MatchOptions::default()).is_none());
    }

    #[test]
    fn test_multi_line_kinds_are_configurable() {
        let pattern = stmt_pattern("if (expression1) statement1.multiLine;");
        let node = first_stmt("if (a) while (b) c();");
        assert!(match_stmt(&pattern, &node, &MatchOptions::default()).is_some());

        let only_if = MatchOptions {
            multi_line_kinds: vec![StmtKind::If],
        };
        assert!(match_stmt(&pattern, &node, &only_if).is_none());
    }

    #[test]
    fn test_statement_run() {
        let Stmt::Sequence(patterns) = stmt_pattern("placeholder1 = 0; placeholder1++;") else {
            panic!("expected a sequence");
        };
        let program = read_javascript("n = 0; n++; m++;").unwrap();
        let options = MatchOptions::default();
        assert!(match_stmts(&patterns, &program.body[0..2], &options).is_some());
        assert!(match_stmts(&patterns, &program.body[1..3], &options).is_none());
    }
}
