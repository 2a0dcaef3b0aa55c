//! Rule listing.

use jsnorm_rules::RuleSet;

/// One block per rule: the name, then the pattern and its replacement,
/// indented.
pub fn format_rules(rules: &RuleSet) -> String {
    let mut out = String::new();
    for rule in rules.rules() {
        out.push_str(rule.name());
        out.push('\n');
        push_indented(&mut out, "    ", &rule.pattern().to_string());
        push_indented(&mut out, " => ", &rule.replacement().to_string());
    }
    out
}

fn push_indented(out: &mut String, first: &str, text: &str) {
    for (i, line) in text.lines().enumerate() {
        out.push_str(if i == 0 { first } else { "    " });
        out.push_str(line);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsnorm_rules::Rule;

    #[test]
    fn test_format_rules() {
        let mut rules = RuleSet::new();
        rules.push(Rule::new("not-one", "!1", "false").unwrap()).unwrap();
        rules
            .push(
                Rule::new(
                    "while-braces",
                    "while (expression1) statement1;",
                    "while (expression1) { statement1; }",
                )
                .unwrap(),
            )
            .unwrap();
        insta::assert_snapshot!(format_rules(&rules), @r"
not-one
    !1
 => false
while-braces
    while (expression1)
      statement1;
 => while (expression1) {
      statement1;
    }
");
    }
}
