//! Template instantiation.

use super::{Bound, Environment, PlaceholderKey};
use jsnorm_syntax::ir::{Expr, ForInit, Ident, Stmt};
use jsnorm_syntax::visit_mut::{VisitMut, walk_expr_mut, walk_stmt_mut};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FillError {
    #[error("template uses `{0}`, which the pattern never bound")]
    MissingBinding(PlaceholderKey),

    #[error("`{0}` is bound to a declaration, which cannot stand here")]
    KindMismatch(PlaceholderKey),
}

/// Instantiate a statement template. Bound subtrees are cloned, so the result
/// shares nothing with the matched tree.
pub fn fill_stmt(template: &Stmt, env: &Environment<'_>) -> Result<Stmt, FillError> {
    let mut stmt = template.clone();
    let mut filler = Filler { env, error: None };
    filler.visit_stmt_mut(&mut stmt);
    filler.finish().map(|()| stmt)
}

/// Instantiate an expression template.
pub fn fill_expr(template: &Expr, env: &Environment<'_>) -> Result<Expr, FillError> {
    let mut expr = template.clone();
    let mut filler = Filler { env, error: None };
    filler.visit_expr_mut(&mut expr);
    filler.finish().map(|()| expr)
}

struct Filler<'e, 'a> {
    env: &'e Environment<'a>,
    error: Option<FillError>,
}

impl<'a> Filler<'_, 'a> {
    fn lookup(&mut self, key: PlaceholderKey) -> Option<Bound<'a>> {
        let found = self.env.get(key);
        if found.is_none() {
            self.fail(FillError::MissingBinding(key));
        }
        found
    }

    fn fail(&mut self, error: FillError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn finish(&mut self) -> Result<(), FillError> {
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// `{ statementN; }` facing a bound block takes the block's statements
    /// instead of nesting it.
    fn adopt_block(&mut self, stmts: &[Stmt]) -> Option<Stmt> {
        let [Stmt::Placeholder { index, .. }] = stmts else {
            return None;
        };
        match self.env.get(PlaceholderKey::statement(*index))? {
            Bound::Stmt(Stmt::Block(inner) | Stmt::Sequence(inner)) => {
                Some(Stmt::Block(inner.clone()))
            }
            Bound::Stmt(Stmt::Empty) => Some(Stmt::Block(Vec::new())),
            _ => None,
        }
    }

    /// A loop head placeholder bound to a declaration becomes that declaration.
    fn fill_for_init(&mut self, init: &mut ForInit) {
        let ForInit::Expr(Expr::Placeholder { index, .. }) = init else {
            return;
        };
        let key = PlaceholderKey::expression(*index);
        if let Some(Bound::Decl(decl)) = self.env.get(key) {
            *init = ForInit::Var(decl.clone());
        }
    }
}

impl VisitMut for Filler<'_, '_> {
    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Placeholder { index, .. } => {
                let key = PlaceholderKey::statement(*index);
                match self.lookup(key) {
                    Some(Bound::Stmt(bound)) => *stmt = bound.clone(),
                    Some(_) => self.fail(FillError::KindMismatch(key)),
                    None => {}
                }
                return;
            }
            Stmt::Block(stmts) => {
                if let Some(adopted) = self.adopt_block(stmts) {
                    *stmt = adopted;
                    return;
                }
            }
            Stmt::For {
                init: Some(init), ..
            } => self.fill_for_init(init),
            Stmt::ForIn { left, .. } | Stmt::ForOf { left, .. } => self.fill_for_init(left),
            _ => {}
        }
        walk_stmt_mut(self, stmt);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if let Expr::Placeholder { index, .. } = expr {
            let key = PlaceholderKey::expression(*index);
            match self.lookup(key) {
                Some(Bound::Expr(bound)) => *expr = bound.clone(),
                Some(_) => self.fail(FillError::KindMismatch(key)),
                None => {}
            }
            return;
        }
        walk_expr_mut(self, expr);
    }

    fn visit_ident_mut(&mut self, ident: &mut Ident) {
        let Ident::Placeholder(index) = ident else {
            return;
        };
        let key = PlaceholderKey::generic(*index);
        match self.lookup(key) {
            Some(Bound::Name(bound)) => *ident = bound.clone(),
            Some(_) => self.fail(FillError::KindMismatch(key)),
            None => {}
        }
    }
}
