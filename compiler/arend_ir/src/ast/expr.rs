//! Concrete expressions and patterns.

use crate::{ExprId, LongName, PatId, Span};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Reference to a name; its referable is attached by resolution.
    Ref(LongName),
    Number(u64),
    /// `\Type`
    Universe,
    /// `_` in expression position: a term to be inferred.
    Hole,
    /// Flat juxtaposition of elements, operators not yet associated.
    ///
    /// Always holds at least two elements; a single element is stored as
    /// the element itself.
    Seq(Vec<SeqElem>),
    /// `\lam x (y : A) {z : B} => body`
    Lam { params: Vec<Binder>, body: ExprId },
    /// `\Pi (x : A) {y : B} -> codomain`
    Pi { params: Vec<Binder>, codomain: ExprId },
    /// `A -> B`
    Arrow { domain: ExprId, codomain: ExprId },
    /// Placeholder for an expression that failed to parse.
    Error,
}

/// One element of a binary-operator sequence.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SeqElem {
    pub expr: ExprId,
    /// `false` for implicit arguments written in braces.
    pub explicit: bool,
    pub position: ElemPosition,
}

/// Syntactic hint about how an element wants to be used.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ElemPosition {
    /// Decided by the name's shape and its resolved fixity.
    #[default]
    Natural,
    /// Parenthesized: always an operand, even `(+)`.
    Operand,
    /// Backquoted on both sides: `` a `f` b ``.
    Infix,
    /// Leading backquote only: `` a `f ``.
    Postfix,
}

/// A binder in a telescope, lambda or meta header.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Binder {
    pub name: String,
    pub span: Span,
    pub ty: Option<ExprId>,
    pub explicit: bool,
}

impl Binder {
    /// `_` binders introduce no name.
    pub fn is_anonymous(&self) -> bool {
        self.name == "_"
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PatternKind {
    /// A constructor applied to sub-patterns, or a variable when `args` is
    /// empty and the name does not resolve to a constructor.
    Name { name: LongName, args: Vec<PatId> },
    Number(u64),
    Wildcard,
    Error,
}
