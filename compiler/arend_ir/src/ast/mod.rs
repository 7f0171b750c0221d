//! Concrete model: parsed declarations, expressions and patterns before name
//! resolution.
//!
//! A [`ConcreteModule`] is rebuilt wholesale whenever its source changes and
//! is immutable afterwards. Expressions and patterns live in flat arenas
//! addressed by [`ExprId`] / [`PatId`]; resolution results are attached in
//! side tables keyed by those ids, never by mutating the tree.

mod def;
mod expr;

pub use def::{
    AliasDecl, Clause, ConcreteDef, ConstructorDecl, DefBody, DefKind, FieldDecl, FunctionBody,
    Implementation, NameRef,
};
pub use expr::{Binder, ElemPosition, Expr, ExprKind, Pattern, PatternKind, SeqElem};

use crate::{DefIndex, ExprId, LongName, ModulePath, PatId, Precedence, Span};

/// `\import Data.Nat \using (suc \as s) \hiding (zero)`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Import {
    pub path: ModulePath,
    pub span: Span,
    pub filter: NamespaceFilter,
}

/// `\open Nat \hiding (zero)`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Open {
    pub target: LongName,
    pub span: Span,
    pub filter: NamespaceFilter,
}

/// Filter and rename stage between an imported namespace and the importing
/// scope.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NamespaceFilter {
    /// `\using (...)` or a bare `(...)` list: only these names are visible.
    pub using: Option<Vec<Renaming>>,
    /// `\hiding (...)`: these names are removed.
    pub hiding: Vec<NameRef>,
}

impl NamespaceFilter {
    pub fn is_trivial(&self) -> bool {
        self.using.is_none() && self.hiding.is_empty()
    }
}

/// `name [\as [fixity] new_name]`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Renaming {
    pub name: String,
    pub span: Span,
    pub new_name: Option<String>,
    pub precedence: Option<Precedence>,
}

/// Parsed form of one module.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ConcreteModule {
    pub path: ModulePath,
    pub imports: Vec<Import>,
    pub opens: Vec<Open>,
    /// Every definition, nested `\where` definitions included.
    pub defs: Vec<ConcreteDef>,
    /// Definitions declared at module level, in source order.
    pub top_level: Vec<DefIndex>,
    exprs: Vec<Expr>,
    patterns: Vec<Pattern>,
}

impl ConcreteModule {
    pub fn new(path: ModulePath) -> Self {
        ConcreteModule {
            path,
            ..ConcreteModule::default()
        }
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::from_usize(self.exprs.len());
        self.exprs.push(Expr { kind, span });
        id
    }

    pub fn alloc_pattern(&mut self, kind: PatternKind, span: Span) -> PatId {
        let id = PatId::from_usize(self.patterns.len());
        self.patterns.push(Pattern { kind, span });
        id
    }

    /// Reserve a slot for a definition whose body is parsed afterwards.
    pub fn alloc_def(&mut self, def: ConcreteDef) -> DefIndex {
        let index = DefIndex::from_usize(self.defs.len());
        self.defs.push(def);
        index
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn pattern(&self, id: PatId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn def(&self, index: DefIndex) -> &ConcreteDef {
        &self.defs[index.index()]
    }

    pub fn def_mut(&mut self, index: DefIndex) -> &mut ConcreteDef {
        &mut self.defs[index.index()]
    }

    pub fn def_indices(&self) -> impl Iterator<Item = DefIndex> {
        (0..self.defs.len()).map(DefIndex::from_usize)
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Name of a definition qualified by its enclosing `\where` parents.
    pub fn long_name(&self, index: DefIndex) -> LongName {
        let def = self.def(index);
        match def.parent {
            Some(parent) => self.long_name(parent).child(def.name.clone()),
            None => LongName::short(def.name.clone()),
        }
    }

    /// Enclosing definitions of `index`, innermost first, `index` included.
    pub fn enclosing(&self, index: DefIndex) -> Vec<DefIndex> {
        let mut chain = vec![index];
        let mut current = self.def(index).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.def(parent).parent;
        }
        chain
    }

    /// Whether any definition was recovered from a syntax error.
    pub fn has_erroneous_defs(&self) -> bool {
        self.defs.iter().any(|def| def.erroneous)
    }
}
