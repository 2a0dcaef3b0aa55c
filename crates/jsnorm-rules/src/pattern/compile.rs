//! Pattern text to pattern tree.

use super::{Family, Pattern, PlaceholderKey};
use jsnorm_syntax::ReadError;
use jsnorm_syntax::input::{ends_with_semicolon, read_javascript};
use jsnorm_syntax::ir::{Expr, Ident, Literal, Stmt};
use jsnorm_syntax::visit_mut::{VisitMut, walk_expr_mut, walk_stmt_mut, walk_stmts_mut};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("pattern does not parse: {0}")]
    Read(#[from] ReadError),

    #[error("unknown modifier `.{modifier}` on `{placeholder}`")]
    UnknownModifier {
        placeholder: PlaceholderKey,
        modifier: String,
    },

    #[error("`{0}` can only stand in statement position")]
    MisplacedPlaceholder(PlaceholderKey),

    #[error("pattern is empty")]
    Empty,
}

pub(super) fn compile(text: &str) -> Result<Pattern, CompileError> {
    let program = read_javascript(text)?;
    let mut body: Vec<Stmt> = program
        .body
        .into_iter()
        .filter(|stmt| !matches!(stmt, Stmt::Comment(_)))
        .collect();

    let mut converter = Converter { error: None };

    // Without a terminator a lone expression statement is an expression pattern.
    if body.len() == 1 && !ends_with_semicolon(text)? {
        if let Stmt::Expr(expr) = &mut body[0] {
            if statement_placeholder(expr)?.is_none() {
                converter.visit_expr_mut(expr);
                converter.finish()?;
                if let Some(Stmt::Expr(expr)) = body.pop() {
                    return Ok(Pattern::Expr(expr));
                }
            }
        }
    }

    converter.visit_stmts_mut(&mut body);
    converter.finish()?;
    match body.len() {
        0 => Err(CompileError::Empty),
        1 => Ok(Pattern::Stmt(body.remove(0))),
        _ => Ok(Pattern::Stmt(Stmt::Sequence(body))),
    }
}

/// `statementN` or `statementN.multiLine`, as `(index, multi_line)`.
fn statement_placeholder(expr: &Expr) -> Result<Option<(u32, bool)>, CompileError> {
    match placeholder_access(expr, Family::Statement) {
        Some((key, None)) => Ok(Some((key.index, false))),
        Some((key, Some("multiLine"))) => Ok(Some((key.index, true))),
        Some((key, Some(modifier))) => Err(CompileError::UnknownModifier {
            placeholder: key,
            modifier: modifier.to_string(),
        }),
        None => Ok(None),
    }
}

/// `expressionN` or `expressionN.orDeclaration`, as `(index, or_declaration)`.
fn expression_placeholder(expr: &Expr) -> Result<Option<(u32, bool)>, CompileError> {
    match placeholder_access(expr, Family::Expression) {
        Some((key, None)) => Ok(Some((key.index, false))),
        Some((key, Some("orDeclaration"))) => Ok(Some((key.index, true))),
        Some((key, Some(modifier))) => Err(CompileError::UnknownModifier {
            placeholder: key,
            modifier: modifier.to_string(),
        }),
        None => Ok(None),
    }
}

/// A bare placeholder identifier of `family`, or one followed by a single
/// dot access (the modifier).
fn placeholder_access(expr: &Expr, family: Family) -> Option<(PlaceholderKey, Option<&str>)> {
    let key_of = |ident: &Ident| {
        ident
            .name()
            .and_then(PlaceholderKey::parse)
            .filter(|key| key.family == family)
    };
    match expr {
        Expr::Ident(ident) => key_of(ident).map(|key| (key, None)),
        Expr::Member {
            object,
            property,
            computed: false,
            optional: false,
        } => {
            let Expr::Ident(ident) = object.as_ref() else {
                return None;
            };
            let Expr::Literal(Literal::String(modifier)) = property.as_ref() else {
                return None;
            };
            key_of(ident).map(|key| (key, Some(modifier.as_str())))
        }
        _ => None,
    }
}

/// Rewrites placeholder spellings into placeholder nodes and strips source ids.
struct Converter {
    error: Option<CompileError>,
}

impl Converter {
    fn fail(&mut self, error: CompileError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn finish(&mut self) -> Result<(), CompileError> {
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl VisitMut for Converter {
    fn visit_stmts_mut(&mut self, stmts: &mut Vec<Stmt>) {
        stmts.retain(|stmt| !matches!(stmt, Stmt::Comment(_)));
        walk_stmts_mut(self, stmts);
    }

    // A commented body reads as a sequence; without its comments it is the
    // lone statement again.
    fn visit_body_mut(&mut self, body: &mut Stmt) {
        self.visit_stmt_mut(body);
        if let Stmt::Sequence(stmts) = body {
            if stmts.len() == 1 {
                *body = stmts.remove(0);
            }
        }
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        if let Stmt::Expr(expr) = stmt {
            match statement_placeholder(expr) {
                Ok(Some((index, multi_line))) => {
                    *stmt = Stmt::Placeholder { index, multi_line };
                    return;
                }
                Ok(None) => {}
                Err(error) => return self.fail(error),
            }
        }
        walk_stmt_mut(self, stmt);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        match expression_placeholder(expr) {
            Ok(Some((index, or_declaration))) => {
                *expr = Expr::Placeholder {
                    index,
                    or_declaration,
                };
                return;
            }
            Ok(None) => {}
            Err(error) => return self.fail(error),
        }
        match statement_placeholder(expr) {
            Ok(Some((index, _))) => {
                return self.fail(CompileError::MisplacedPlaceholder(
                    PlaceholderKey::statement(index),
                ));
            }
            Ok(None) => {}
            Err(error) => return self.fail(error),
        }
        walk_expr_mut(self, expr);
    }

    fn visit_ident_mut(&mut self, ident: &mut Ident) {
        let Some(name) = ident.name() else {
            return;
        };
        match PlaceholderKey::parse(name) {
            Some(key) if key.family == Family::Generic => *ident = Ident::Placeholder(key.index),
            // Statement and expression placeholders in binding positions.
            Some(key) => self.fail(CompileError::MisplacedPlaceholder(key)),
            None => *ident = Ident::new(name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsnorm_syntax::ir::{BinaryOp, UnaryOp};

    #[test]
    fn test_bare_expression() {
        let pattern = compile("!1").unwrap();
        assert_eq!(
            pattern,
            Pattern::Expr(Expr::unary(UnaryOp::Not, Expr::number(1)))
        );
    }

    #[test]
    fn test_terminated_expression_is_statement() {
        let pattern = compile("expression1 && expression2;").unwrap();
        let operand = |index| Expr::Placeholder {
            index,
            or_declaration: false,
        };
        assert_eq!(
            pattern,
            Pattern::Stmt(Stmt::Expr(Expr::binary(
                operand(1),
                BinaryOp::And,
                operand(2)
            )))
        );
    }

    #[test]
    fn test_trailing_comment_keeps_statement_pattern() {
        let pattern = compile("f(expression1); // note").unwrap();
        assert!(matches!(pattern, Pattern::Stmt(Stmt::Expr(_))));
        let pattern = compile("f(expression1) // note").unwrap();
        assert!(matches!(pattern, Pattern::Expr(Expr::Call { .. })));
    }

    #[test]
    fn test_comment_before_body_is_dropped() {
        assert_eq!(
            compile("while (expression1) // loop\n  statement1;").unwrap(),
            compile("while (expression1) statement1;").unwrap()
        );
    }

    #[test]
    fn test_statement_placeholders() {
        let Pattern::Stmt(Stmt::If { consequent, .. }) =
            compile("if (expression1) statement1.multiLine;").unwrap()
        else {
            panic!("expected an if pattern");
        };
        assert_eq!(
            *consequent,
            Stmt::Placeholder {
                index: 1,
                multi_line: true
            }
        );
        assert_eq!(
            compile("statement2").unwrap(),
            Pattern::Stmt(Stmt::Placeholder {
                index: 2,
                multi_line: false
            })
        );
    }

    #[test]
    fn test_several_statements_compile_to_sequence() {
        let pattern = compile("statement1; statement2;").unwrap();
        assert!(matches!(pattern, Pattern::Stmt(Stmt::Sequence(ref s)) if s.len() == 2));
    }

    #[test]
    fn test_generic_placeholder_keeps_member_access() {
        let pattern = compile("placeholder1.length").unwrap();
        assert_eq!(
            pattern,
            Pattern::Expr(Expr::Member {
                object: Box::new(Expr::Ident(Ident::Placeholder(1))),
                property: Box::new(Expr::string("length")),
                computed: false,
                optional: false,
            })
        );
    }

    #[test]
    fn test_unknown_modifier() {
        let err = compile("expression1.multiLine").unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnknownModifier { ref modifier, .. } if modifier == "multiLine"
        ));
        assert!(compile("if (a) statement1.foo;").is_err());
    }

    #[test]
    fn test_statement_placeholder_in_expression_position() {
        let err = compile("f(statement1)").unwrap_err();
        assert!(matches!(err, CompileError::MisplacedPlaceholder(_)));
    }

    #[test]
    fn test_compile_is_pure() {
        let text = "for (expression1.orDeclaration of expression2) statement1;";
        assert_eq!(compile(text).unwrap(), compile(text).unwrap());
    }

    #[test]
    fn test_empty() {
        assert!(matches!(compile("// nothing"), Err(CompileError::Empty)));
    }
}
