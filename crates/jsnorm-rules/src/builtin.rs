//! The built-in rule table.
//!
//! Order matters: the first rule whose pattern matches a node is applied, so
//! more specific shapes come before the general ones they overlap with
//! (`if`/`else if` chains before plain `if`/`else`).

/// `(name, pattern, replacement)` in priority order.
pub const BUILTIN_RULES: &[(&str, &str, &str)] = &[
    // Boolean and undefined tricks.
    ("not-one", "!1", "false"),
    ("not-zero", "!0", "true"),
    ("void-zero", "void 0", "undefined"),
    // Expressions used for control flow.
    (
        "and-statement",
        "expression1 && expression2;",
        "if (expression1) { expression2; }",
    ),
    (
        "or-statement",
        "expression1 || expression2;",
        "if (!expression1) { expression2; }",
    ),
    (
        "ternary-statement",
        "expression1 ? expression2 : expression3;",
        "if (expression1) { expression2; } else { expression3; }",
    ),
    // Conditionals. An `else if` keeps its chain shape; the nested `if` is
    // braced when the traversal reaches it.
    (
        "if-else-if-else-braces",
        "if (expression1) statement1; else if (expression2) statement2; else statement3;",
        "if (expression1) { statement1; } else if (expression2) statement2; else statement3;",
    ),
    (
        "if-else-if-braces",
        "if (expression1) statement1; else if (expression2) statement2;",
        "if (expression1) { statement1; } else if (expression2) statement2;",
    ),
    (
        "if-else-braces",
        "if (expression1) statement1; else statement2;",
        "if (expression1) { statement1; } else { statement2; }",
    ),
    (
        "if-braces",
        "if (expression1) statement1;",
        "if (expression1) { statement1; }",
    ),
    // Loops.
    (
        "while-braces",
        "while (expression1) statement1;",
        "while (expression1) { statement1; }",
    ),
    (
        "do-while-braces",
        "do statement1; while (expression1);",
        "do { statement1; } while (expression1);",
    ),
    (
        "for-init-test-update-braces",
        "for (expression1.orDeclaration; expression2; expression3) statement1;",
        "for (expression1.orDeclaration; expression2; expression3) { statement1; }",
    ),
    (
        "for-init-test-braces",
        "for (expression1.orDeclaration; expression2;) statement1;",
        "for (expression1.orDeclaration; expression2;) { statement1; }",
    ),
    (
        "for-init-update-braces",
        "for (expression1.orDeclaration;; expression3) statement1;",
        "for (expression1.orDeclaration;; expression3) { statement1; }",
    ),
    (
        "for-init-braces",
        "for (expression1.orDeclaration;;) statement1;",
        "for (expression1.orDeclaration;;) { statement1; }",
    ),
    (
        "for-test-update-braces",
        "for (; expression2; expression3) statement1;",
        "for (; expression2; expression3) { statement1; }",
    ),
    (
        "for-test-braces",
        "for (; expression2;) statement1;",
        "for (; expression2;) { statement1; }",
    ),
    (
        "for-update-braces",
        "for (;; expression3) statement1;",
        "for (;; expression3) { statement1; }",
    ),
    ("for-braces", "for (;;) statement1;", "for (;;) { statement1; }"),
    (
        "for-in-braces",
        "for (expression1.orDeclaration in expression2) statement1;",
        "for (expression1.orDeclaration in expression2) { statement1; }",
    ),
    (
        "for-of-braces",
        "for (expression1.orDeclaration of expression2) statement1;",
        "for (expression1.orDeclaration of expression2) { statement1; }",
    ),
    // Babel's CommonJS interop shim, under its canonical name.
    (
        "interop-require-default",
        "function placeholder1(placeholder2) { return placeholder2 && placeholder2.__esModule ? placeholder2 : { default: placeholder2 }; }",
        "function _interopRequireDefault(obj) { return obj && obj.__esModule ? obj : { default: obj }; }",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::rule::RuleSet;

    #[test]
    fn test_builtin_rules_compile() {
        let set = RuleSet::builtin().unwrap();
        assert_eq!(set.len(), BUILTIN_RULES.len());
        assert!(set.rules().iter().all(|rule| rule.window().is_none()));
    }

    #[test]
    fn test_expression_rules_are_expression_patterns() {
        let set = RuleSet::builtin().unwrap();
        for name in ["not-one", "not-zero", "void-zero"] {
            let rule = set.get(name).unwrap();
            assert!(matches!(rule.pattern(), Pattern::Expr(_)), "{}", name);
        }
        assert!(matches!(
            set.get("and-statement").unwrap().pattern(),
            Pattern::Stmt(_)
        ));
    }
}
