//! Snapshot tests for the reader and writer.
//!
//! Each case parses JavaScript and prints it back, so the snapshots pin down
//! both what the reader understands and how the writer lays it out.

use jsnorm_syntax::ir::*;
use jsnorm_syntax::{JavaScriptWriter, ReadError, read_javascript};

fn roundtrip(code: &str) -> String {
    let program = read_javascript(code).expect("parse failed");
    JavaScriptWriter::emit(&program)
}

fn parse(code: &str) -> Program {
    read_javascript(code).expect("parse failed")
}

// ============================================================================
// Writer Snapshots - source printed back after parsing
// ============================================================================

mod roundtrip {
    use super::*;

    #[test]
    fn logical_expression_statement() {
        insta::assert_snapshot!(roundtrip("a&&b()"), @"a && b();");
    }

    #[test]
    fn unbraced_if_else() {
        insta::assert_snapshot!(roundtrip("if(a)b();else c()"), @r"
if (a)
  b();
else
  c();
");
    }

    #[test]
    fn for_loop() {
        insta::assert_snapshot!(roundtrip("for(var i=0;i<n;i++){f(i)}"), @r"
for (var i = 0; i < n; i++) {
  f(i);
}
");
    }

    #[test]
    fn empty_for_head() {
        insta::assert_snapshot!(roundtrip("label: for (;;) { break label; }"), @r"
label: for (;;) {
  break label;
}
");
    }

    #[test]
    fn destructuring_declaration() {
        insta::assert_snapshot!(
            roundtrip("const {a, b: [c, , d], ...rest} = obj;"),
            @"const { a, b: [c, , d], ...rest } = obj;"
        );
    }

    #[test]
    fn function_expression_statement_is_parenthesized() {
        insta::assert_snapshot!(roundtrip("(function(){})()"), @"(function() {}());");
    }

    #[test]
    fn arrow_returning_object() {
        insta::assert_snapshot!(roundtrip("f = () => ({a: 1})"), @"f = () => ({ a: 1 });");
    }

    #[test]
    fn template_literal() {
        insta::assert_snapshot!(roundtrip("`a${b}c`"), @"`a${b}c`;");
    }

    #[test]
    fn single_quoted_string() {
        insta::assert_snapshot!(roundtrip(r#"x = 'a"b'"#), @r#"x = "a\"b";"#);
    }

    #[test]
    fn switch_statement() {
        insta::assert_snapshot!(
            roundtrip("switch (x) { case 1: a(); break; default: b(); }"),
            @r"
switch (x) {
  case 1:
    a();
    break;
  default:
    b();
}
"
        );
    }

    #[test]
    fn try_catch_finally() {
        insta::assert_snapshot!(
            roundtrip("try { a() } catch (e) { b() } finally { c() }"),
            @r"
try {
  a();
} catch (e) {
  b();
} finally {
  c();
}
"
        );
    }

    #[test]
    fn class_declaration() {
        insta::assert_snapshot!(
            roundtrip("class A extends B { constructor(x) { super(x); } static m() {} get v() { return 1; } }"),
            @r"
class A extends B {
  constructor(x) {
    super(x);
  }
  static m() {}
  get v() {
    return 1;
  }
}
"
        );
    }

    #[test]
    fn async_generator() {
        insta::assert_snapshot!(
            roundtrip("async function* g() { yield* h(); await x; }"),
            @r"
async function* g() {
  yield* h();
  await x;
}
"
        );
    }

    #[test]
    fn do_while_without_braces() {
        insta::assert_snapshot!(roundtrip("do x(); while (y)"), @r"
do
  x();
while (y);
");
    }

    #[test]
    fn comments_in_statement_lists() {
        insta::assert_snapshot!(roundtrip("// lead\na();\n/* block */"), @r"
// lead
a();
/* block */
");
    }

    #[test]
    fn comment_inside_expression_moves_before_its_statement() {
        insta::assert_snapshot!(roundtrip("a();\nf(/* keep */ x);"), @r"
a();
/* keep */
f(x);
");
    }

    #[test]
    fn comment_inside_nested_function_stays_in_its_body() {
        insta::assert_snapshot!(roundtrip("function g() { return h(/* c */ 1); }"), @r"
function g() {
  /* c */
  return h(1);
}
");
    }

    #[test]
    fn comment_leading_unbraced_body_stays_with_body() {
        insta::assert_snapshot!(roundtrip("if (a) // note\n  b();"), @r"
if (a) {
  // note
  b();
}
");
    }

    #[test]
    fn numbers_are_normalized() {
        insta::assert_snapshot!(roundtrip("x = 0xff + 1e3 + .5"), @"x = 255 + 1000 + 0.5;");
    }

    #[test]
    fn grouping_survives() {
        insta::assert_snapshot!(roundtrip("a = (b, c); new (f())(); x = a ?? (b || c)"), @r"
a = (b, c);
new (f())();
x = a ?? (b || c);
");
    }

    #[test]
    fn for_of_with_destructuring() {
        insta::assert_snapshot!(
            roundtrip("for (const [k, v] of Object.entries(o)) {}"),
            @"for (const [k, v] of Object.entries(o)) {}"
        );
    }

    #[test]
    fn array_holes() {
        insta::assert_snapshot!(roundtrip("x = [, 1, , ]"), @"x = [, 1, ,];");
    }

    #[test]
    fn regex_literal() {
        insta::assert_snapshot!(roundtrip("/ab+c/gi.test(s)"), @"/ab+c/gi.test(s);");
    }
}

// ============================================================================
// Reader Structure - tree shapes the rewrite rules depend on
// ============================================================================

mod reader {
    use super::*;

    #[test]
    fn if_without_braces_has_expression_body() {
        let program = parse("if (a) b();");
        assert_eq!(
            program.body,
            vec![Stmt::if_stmt(
                Expr::ident("a"),
                Stmt::expr(Expr::call(Expr::ident("b"), vec![])),
                None,
            )]
        );
    }

    #[test]
    fn for_in_with_declaration() {
        let program = parse("for (var k in o) f(k);");
        let Stmt::ForIn { left, right, .. } = &program.body[0] else {
            panic!("expected for-in, got {:?}", program.body[0]);
        };
        assert_eq!(
            *left,
            ForInit::Var(VarDecl {
                kind: VarKind::Var,
                declarators: vec![Declarator {
                    target: Pat::ident("k"),
                    init: None,
                }],
            })
        );
        assert_eq!(*right, Expr::ident("o"));
    }

    #[test]
    fn for_with_expression_init() {
        let program = parse("for (i = 0; ; ) {}");
        assert_eq!(
            program.body,
            vec![Stmt::For {
                init: Some(ForInit::Expr(Expr::assign(Expr::ident("i"), Expr::number(0)))),
                test: None,
                update: None,
                body: Box::new(Stmt::block(vec![])),
            }]
        );
    }

    #[test]
    fn void_zero_and_negations() {
        let program = parse("void 0; !0; !1;");
        assert_eq!(
            program.body,
            vec![
                Stmt::expr(Expr::unary(UnaryOp::Void, Expr::number(0))),
                Stmt::expr(Expr::unary(UnaryOp::Not, Expr::number(0))),
                Stmt::expr(Expr::unary(UnaryOp::Not, Expr::number(1))),
            ]
        );
    }

    #[test]
    fn structural_equality_ignores_positions() {
        assert_eq!(parse("foo(bar);"), parse("  foo( bar ) ;"));
        assert_ne!(parse("foo(bar);"), parse("foo(baz);"));
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(matches!(read_javascript("let = ;"), Err(ReadError::Parse(_))));
    }

    #[test]
    fn jsx_is_rejected() {
        assert!(read_javascript("x = <div />;").is_err());
    }
}
