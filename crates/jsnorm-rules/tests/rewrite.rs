//! End-to-end behaviour of the pattern engine and the rewrite driver.

use jsnorm_rules::pattern::{fill_stmt, match_expr, match_stmt};
use jsnorm_rules::{
    Bound, Environment, FillError, MatchOptions, Pattern, PlaceholderKey, RewriteError,
    RewriteStats, Rewriter, Rule, RuleSet,
};
use jsnorm_syntax::ir::{Expr, Ident, Stmt};
use jsnorm_syntax::{JavaScriptWriter, Program, read_javascript};

fn parse(source: &str) -> Program {
    read_javascript(source).expect("parse failed")
}

fn first_stmt(source: &str) -> Stmt {
    parse(source).body.remove(0)
}

fn stmt_pattern(text: &str) -> Stmt {
    match Pattern::compile(text).expect("pattern compiles") {
        Pattern::Stmt(stmt) => stmt,
        Pattern::Expr(expr) => panic!("expected a statement pattern, got {:?}", expr),
    }
}

fn expr_pattern(text: &str) -> Expr {
    match Pattern::compile(text).expect("pattern compiles") {
        Pattern::Expr(expr) => expr,
        Pattern::Stmt(stmt) => panic!("expected an expression pattern, got {:?}", stmt),
    }
}

fn first_expr(source: &str) -> Expr {
    match first_stmt(source) {
        Stmt::Expr(expr) => expr,
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

fn normalize_with(rules: &RuleSet, source: &str) -> (String, RewriteStats) {
    let mut program = parse(source);
    let stats = Rewriter::new(rules)
        .rewrite(&mut program)
        .expect("rewrite failed");
    (JavaScriptWriter::emit(&program), stats)
}

fn normalize(source: &str) -> String {
    let rules = RuleSet::builtin().expect("builtin rules compile");
    normalize_with(&rules, source).0
}

mod matching {
    use super::*;

    #[test]
    fn layout_does_not_matter() {
        let pattern = stmt_pattern("if (a) { b(c); }");
        let node = first_stmt("if(a){\n\n      b( c )\n}");
        let env = match_stmt(&pattern, &node, &MatchOptions::default()).unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn repeated_statement_placeholder_needs_equal_statements() {
        let pattern = stmt_pattern("if (expression1) statement1; else statement1;");
        let options = MatchOptions::default();
        assert!(match_stmt(&pattern, &first_stmt("if (a) f(x); else f(x);"), &options).is_some());
        assert!(match_stmt(&pattern, &first_stmt("if (a) f(x); else f(y);"), &options).is_none());
    }

    #[test]
    fn repeated_expression_placeholder_needs_equal_expressions() {
        let pattern = expr_pattern("expression1 === expression1");
        let options = MatchOptions::default();
        assert!(match_expr(&pattern, &first_expr("a.b[0] === a.b[0];"), &options).is_some());
        assert!(match_expr(&pattern, &first_expr("a.b[0] === a.b[1];"), &options).is_none());
    }

    #[test]
    fn repeated_generic_placeholder_needs_same_name() {
        let pattern = expr_pattern("placeholder1 !== placeholder1");
        let options = MatchOptions::default();
        assert!(match_expr(&pattern, &first_expr("x !== x;"), &options).is_some());
        assert!(match_expr(&pattern, &first_expr("x !== y;"), &options).is_none());
    }

    #[test]
    fn multi_line_rejects_atomic_statements() {
        let pattern = stmt_pattern("if (expression1) statement1.multiLine;");
        let options = MatchOptions::default();
        assert!(match_stmt(&pattern, &first_stmt("if (a) x = 1;"), &options).is_none());
        assert!(match_stmt(&pattern, &first_stmt("if (a) return;"), &options).is_none());
        assert!(match_stmt(&pattern, &first_stmt("if (a) if (b) c();"), &options).is_some());
    }

    #[test]
    fn or_declaration_admits_loop_head_declarations() {
        let plain = stmt_pattern("for (expression1 of expression2) statement1;");
        let modified = stmt_pattern("for (expression1.orDeclaration of expression2) statement1;");
        let options = MatchOptions::default();

        let declared = first_stmt("for (let x of xs) f(x);");
        assert!(match_stmt(&plain, &declared, &options).is_none());
        let env = match_stmt(&modified, &declared, &options).unwrap();
        assert!(matches!(
            env.get(PlaceholderKey::expression(1)),
            Some(Bound::Decl(_))
        ));

        let assigned = first_stmt("for (x of xs) f(x);");
        assert!(match_stmt(&plain, &assigned, &options).is_some());
        assert!(match_stmt(&modified, &assigned, &options).is_some());
    }
}

mod filling {
    use super::*;

    #[test]
    fn placeholder_free_template_round_trips() {
        let text = "for (var i = 0; i < n; i++) { if (i % 2) { continue; } total += i; }";
        let template = stmt_pattern(text);
        let filled = fill_stmt(&template, &Environment::new()).unwrap();
        assert_eq!(filled, stmt_pattern(text));
    }

    #[test]
    fn any_missing_placeholder_fails() {
        let template = stmt_pattern("placeholder1 = expression1 ? expression2 : placeholder1;");
        let name = Ident::new("x");
        let one = Expr::number(1);
        let two = Expr::number(2);
        let all = [
            (PlaceholderKey::generic(1), Bound::Name(&name)),
            (PlaceholderKey::expression(1), Bound::Expr(&one)),
            (PlaceholderKey::expression(2), Bound::Expr(&two)),
        ];

        let mut complete = Environment::new();
        for (key, bound) in all {
            complete.bind(key, bound);
        }
        assert!(fill_stmt(&template, &complete).is_ok());

        for (omitted, _) in all {
            let mut env = Environment::new();
            for (key, bound) in all.iter().filter(|(key, _)| *key != omitted) {
                env.bind(*key, *bound);
            }
            assert_eq!(
                fill_stmt(&template, &env),
                Err(FillError::MissingBinding(omitted))
            );
        }
    }
}

mod driver {
    use super::*;

    #[test]
    fn negated_literals() {
        insta::assert_snapshot!(normalize("x = !1;\nf(!0, [!1]);\nif (!0) y();"), @r"
x = false;
f(true, [false]);
if (true) {
  y();
}
");
    }

    #[test]
    fn comma_statement_splits_in_order() {
        insta::assert_snapshot!(normalize("a, b, c;"), @r"
a;
b;
c;
");
    }

    #[test]
    fn split_statements_are_rewritten_in_the_same_pass() {
        insta::assert_snapshot!(normalize("ready && start(), done || retry(), void 0;"), @r"
if (ready) {
  start();
}
if (!done) {
  retry();
}
undefined;
");
    }

    #[test]
    fn nested_bare_conditionals_are_braced() {
        insta::assert_snapshot!(normalize("if (cond) if (x) y;"), @r"
if (cond) {
  if (x) {
    y;
  }
}
");
    }

    #[test]
    fn else_if_chains_keep_their_shape() {
        insta::assert_snapshot!(normalize("if (a) b(); else if (c) d(); else if (e) f(); else g();"), @r"
if (a) {
  b();
} else if (c) {
  d();
} else if (e) {
  f();
} else {
  g();
}
");
    }

    #[test]
    fn ternary_statement() {
        insta::assert_snapshot!(normalize("ok ? resolve(v) : reject(e);"), @r"
if (ok) {
  resolve(v);
} else {
  reject(e);
}
");
    }

    #[test]
    fn loops_are_braced() {
        insta::assert_snapshot!(normalize(
            "for (var i = 0; i < n; i++) sum += i;\nfor (k in o) use(k);\nfor (const v of vs) use(v);\nwhile (x) x--;\ndo x++; while (x < 9);\nfor (;;) break;"
        ), @r"
for (var i = 0; i < n; i++) {
  sum += i;
}
for (k in o) {
  use(k);
}
for (const v of vs) {
  use(v);
}
while (x) {
  x--;
}
do {
  x++;
} while (x < 9);
for (;;) {
  break;
}
");
    }

    #[test]
    fn comments_survive_bracing() {
        insta::assert_snapshot!(normalize(
            "if (a) // note\n  b();\nwhile (c) f(/* keep */ c--);"
        ), @r"
if (a) {
  // note
  b();
}
while (c) {
  /* keep */
  f(c--);
}
");
    }

    #[test]
    fn braced_code_is_left_alone() {
        let rules = RuleSet::builtin().unwrap();
        let (out, stats) = normalize_with(&rules, "if (a) {\n  b();\n}\nwhile (c) {}\n");
        assert_eq!(out, "if (a) {\n  b();\n}\nwhile (c) {}\n");
        assert!(!stats.changed());
    }

    #[test]
    fn replacement_is_not_matched_again_in_the_same_pass() {
        // `!!0` becomes `!true`; a second pass would be needed for anything more.
        let rules = RuleSet::builtin().unwrap();
        let (out, stats) = normalize_with(&rules, "x = !!0;");
        assert_eq!(out, "x = !true;\n");
        assert_eq!(stats.applied.get("not-zero"), Some(&1));
    }

    #[test]
    fn lone_container_body_becomes_a_block() {
        let mut rules = RuleSet::builtin().unwrap();
        rules.disable("if-braces").unwrap();
        let (out, stats) = normalize_with(&rules, "if (a) b, c;");
        assert_eq!(out, "if (a) {\n  b;\n  c;\n}\n");
        assert_eq!(stats.blocks_coerced, 1);
        assert_eq!(stats.sequences_split, 1);
    }

    #[test]
    fn duplicate_interop_helper_is_renamed_with_call_sites() {
        let rules = RuleSet::builtin().unwrap();
        let (out, stats) = normalize_with(
            &rules,
            r#"function _interopRequireDefault(obj) { return obj && obj.__esModule ? obj : { default: obj }; }
function _interop(e) { return e && e.__esModule ? e : { default: e }; }
var a = _interopRequireDefault(require("a"));
var b = _interop(require("b"));
function load() { return _interop(require("c")).default; }
"#,
        );
        assert_eq!(stats.renames, 1);
        assert_eq!(stats.applied.get("interop-require-default"), Some(&1));
        insta::assert_snapshot!(out, @r#"
function _interopRequireDefault(obj) {
  return obj && obj.__esModule ? obj : { default: obj };
}
function _interopRequireDefault1(obj) {
  return obj && obj.__esModule ? obj : { default: obj };
}
var a = _interopRequireDefault(require("a"));
var b = _interopRequireDefault1(require("b"));
function load() {
  return _interopRequireDefault1(require("c")).default;
}
"#);
    }

    #[test]
    fn interop_helper_takes_the_canonical_name_when_free() {
        insta::assert_snapshot!(normalize(
            "function n(m) { return m && m.__esModule ? m : { default: m }; }\nvar x = n(require(\"x\"));"
        ), @r#"
function _interopRequireDefault(obj) {
  return obj && obj.__esModule ? obj : { default: obj };
}
var x = _interopRequireDefault(require("x"));
"#);
    }

    #[test]
    fn renamed_helper_in_shorthand_export_keeps_the_key() {
        insta::assert_snapshot!(normalize(
            "function h(e){return e&&e.__esModule?e:{default:e}}\nmodule.exports = { h };"
        ), @r#"
function _interopRequireDefault(obj) {
  return obj && obj.__esModule ? obj : { default: obj };
}
module.exports = { h: _interopRequireDefault };
"#);
    }

    #[test]
    fn renamed_block_helper_updates_outer_calls() {
        insta::assert_snapshot!(normalize(
            "if (a) { function h(e){return e&&e.__esModule?e:{default:e}} }\nh(1);"
        ), @r#"
if (a) {
  function _interopRequireDefault(obj) {
    return obj && obj.__esModule ? obj : { default: obj };
  }
}
_interopRequireDefault(1);
"#);
    }

    #[test]
    fn external_statement_list_rule() {
        let mut rules = RuleSet::builtin().unwrap();
        rules
            .push(
                Rule::new(
                    "merge-declaration",
                    "var placeholder1; placeholder1 = expression1;",
                    "var placeholder1 = expression1;",
                )
                .unwrap(),
            )
            .unwrap();
        let (out, stats) = normalize_with(&rules, "var a;\na = f();\ng(a);");
        assert_eq!(out, "var a = f();\ng(a);\n");
        assert_eq!(stats.applied.get("merge-declaration"), Some(&1));
    }

    #[test]
    fn fill_errors_name_the_rule() {
        let mut rules = RuleSet::new();
        rules
            .push(Rule::new("broken", "f(expression1);", "g(expression2);").unwrap())
            .unwrap();
        let mut program = parse("f(1);");
        let err = Rewriter::new(&rules).rewrite(&mut program).unwrap_err();
        assert!(matches!(
            err,
            RewriteError::Fill { ref rule, source: FillError::MissingBinding(_) } if rule == "broken"
        ));
    }

    #[test]
    fn helper_without_a_binding_is_fatal() {
        let mut program = parse("function h(e) { return e && e.__esModule ? e : { default: e }; }");
        if let Stmt::Function(function) = &mut program.body[0] {
            function.name = Some(Ident::new("h"));
        }
        let rules = RuleSet::builtin().unwrap();
        let err = Rewriter::new(&rules).rewrite(&mut program).unwrap_err();
        assert!(matches!(err, RewriteError::ScopeNotFound { ref name } if name == "h"));
    }
}
