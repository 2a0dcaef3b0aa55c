//! Scope graph storage, queries and renaming.

use jsnorm_syntax::ir::{Expr, Ident, NodeId, Pat, PatProp, Program, PropKey, Property};
use jsnorm_syntax::visit_mut::{VisitMut, walk_expr_mut, walk_pat_mut};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Function,
    Block,
    Catch,
    /// Head of a `for`, `for-in` or `for-of` loop.
    For,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Param,
    CatchParam,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub bindings: Vec<BindingId>,
}

/// A resolved use of a binding.
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    pub id: NodeId,
    /// Scope the reference appears in.
    pub scope: ScopeId,
}

#[derive(Debug, Clone)]
pub struct Binding {
    /// Current name, updated by [`ScopeGraph::rename`].
    pub name: String,
    /// Name as declared in the source.
    pub original: String,
    pub kind: BindingKind,
    pub scope: ScopeId,
    /// Ids of the declaring identifiers (`var x; var x;` declares twice).
    pub declarations: Vec<NodeId>,
    pub references: Vec<Reference>,
}

impl Binding {
    pub fn is_renamed(&self) -> bool {
        self.name != self.original
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScopeGraph {
    pub(crate) scopes: Vec<Scope>,
    pub(crate) bindings: Vec<Binding>,
    /// Every declaring or referencing identifier id, mapped to its binding.
    pub(crate) occurrences: HashMap<NodeId, BindingId>,
    /// Names referenced but never declared.
    pub(crate) globals: HashSet<String>,
}

impl ScopeGraph {
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0 as usize]
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(i, binding)| (BindingId(i as u32), binding))
    }

    /// The program scope.
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Binding an identifier occurrence (declaration or reference) resolves to.
    pub fn binding_at(&self, id: NodeId) -> Option<BindingId> {
        self.occurrences.get(&id).copied()
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    /// Resolve `name` from `scope` outwards, using current (renamed) names.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<BindingId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(found) = scope
                .bindings
                .iter()
                .copied()
                .find(|b| self.binding(*b).name == name)
            {
                return Some(found);
            }
            current = scope.parent;
        }
        None
    }

    /// Whether `binding` could be renamed to `name` without changing what
    /// any identifier refers to.
    ///
    /// A binding already called `name` is free to keep it.
    pub fn is_name_free(&self, binding: BindingId, name: &str) -> bool {
        let target = self.binding(binding);
        if target.name == name {
            return true;
        }

        // Would capture references to an undeclared global.
        if self.is_global(name) {
            return false;
        }

        // Would collide with a binding visible where this one is declared.
        if self.lookup(target.scope, name).is_some() {
            return false;
        }

        // An inner declaration would shadow the renamed binding at some use.
        target
            .references
            .iter()
            .all(|reference| self.lookup(reference.scope, name).is_none())
    }

    /// First of `name`, `name1`, `name2`, ... that is free for `binding`.
    pub fn free_name(&self, binding: BindingId, name: &str) -> String {
        if self.is_name_free(binding, name) {
            return name.to_string();
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{}{}", name, suffix);
            if self.is_name_free(binding, &candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Record a new name for `binding`. Occurrences in the tree keep the old
    /// name until [`apply_renames`](Self::apply_renames) runs.
    pub fn rename(&mut self, binding: BindingId, name: impl Into<String>) {
        let name = name.into();
        let target = &mut self.bindings[binding.0 as usize];
        tracing::debug!(from = %target.name, to = %name, "rename binding");
        target.name = name;
    }

    /// Rewrite every occurrence of a renamed binding. Returns the number of
    /// identifiers changed.
    pub fn apply_renames(&self, program: &mut Program) -> usize {
        if !self.bindings.iter().any(Binding::is_renamed) {
            return 0;
        }
        let mut renamer = Renamer {
            graph: self,
            changed: 0,
        };
        renamer.visit_program_mut(program);
        renamer.changed
    }
}

struct Renamer<'g> {
    graph: &'g ScopeGraph,
    changed: usize,
}

impl Renamer<'_> {
    /// Source name of `ident` when its binding is being renamed.
    fn renamed_from(&self, ident: &Ident) -> Option<String> {
        let binding = self.graph.binding_at(ident.id()?)?;
        let binding = self.graph.binding(binding);
        binding.is_renamed().then(|| binding.original.clone())
    }
}

impl VisitMut for Renamer<'_> {
    // `{ h }` names both a key and a binding; only the binding follows a rename.
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if let Expr::Object(properties) = expr {
            for property in properties.iter_mut() {
                let Property::Shorthand(ident) = property else {
                    continue;
                };
                if let Some(key) = self.renamed_from(ident) {
                    *property = Property::KeyValue {
                        key: PropKey::Name(key),
                        value: Expr::Ident(ident.clone()),
                    };
                }
            }
        }
        walk_expr_mut(self, expr);
    }

    fn visit_pat_mut(&mut self, pat: &mut Pat) {
        if let Pat::Object(props) = pat {
            for prop in props.iter_mut() {
                let PatProp::Shorthand { name, default } = prop else {
                    continue;
                };
                let Some(key) = self.renamed_from(name) else {
                    continue;
                };
                let target = Pat::Ident(name.clone());
                let value = match default.take() {
                    Some(default) => Pat::Default {
                        target: Box::new(target),
                        value: Box::new(default),
                    },
                    None => target,
                };
                *prop = PatProp::KeyValue {
                    key: PropKey::Name(key),
                    value,
                };
            }
        }
        walk_pat_mut(self, pat);
    }

    fn visit_ident_mut(&mut self, ident: &mut Ident) {
        let Ident::Name { name, id: Some(id) } = ident else {
            return;
        };
        let Some(binding) = self.graph.binding_at(*id) else {
            return;
        };
        let binding = self.graph.binding(binding);
        if binding.is_renamed() && *name != binding.name {
            *name = binding.name.clone();
            self.changed += 1;
        }
    }
}
