//! Typechecked (core) definitions.

use arend_ir::{DefId, DefIndex, LocalId, ModulePath};

use crate::Term;

/// How a definition takes part in recursion.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum RecursionStatus {
    NonRecursive,
    SelfRecursive,
    /// Mutually recursive with every listed unit (itself included).
    Mutual(Vec<DefId>),
}

impl RecursionStatus {
    pub fn is_recursive(&self) -> bool {
        !matches!(self, RecursionStatus::NonRecursive)
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CoreDef {
    pub id: DefId,
    /// Dotted name within its module.
    pub name: String,
    pub ty: Term,
    pub status: RecursionStatus,
    pub body: CoreBody,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CoreBody {
    /// Only the signature is known; never unfolds.
    Opaque,
    /// `\lam params => body`.
    Function(Term),
    Clauses(ClauseFunction),
    Data {
        params: usize,
        constructors: Vec<DefId>,
    },
    Constructor {
        data: DefId,
        position: usize,
        /// Leading implicit arguments that instantiate the data parameters.
        data_params: usize,
    },
    Class {
        params: usize,
        fields: Vec<DefId>,
    },
    Field {
        class: DefId,
        position: usize,
        /// Leading implicit arguments before the instance argument.
        class_params: usize,
    },
    Instance {
        class: DefId,
        params: usize,
        /// Each field with `\lam params => value`.
        implementations: Vec<(DefId, Term)>,
    },
    /// Expanded at use sites; the body stays concrete.
    Meta {
        module: ModulePath,
        index: DefIndex,
        params: Vec<LocalId>,
    },
}

/// A function defined by pattern matching.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ClauseFunction {
    pub params: Vec<LocalId>,
    /// Parameter positions matched by each clause, in pattern order.
    pub matched: Vec<usize>,
    pub clauses: Vec<CoreClause>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CoreClause {
    pub patterns: Vec<CorePattern>,
    /// Mentions pattern variables and the unmatched parameters.
    pub rhs: Term,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CorePattern {
    Var(LocalId),
    Wildcard,
    /// One sub-pattern per own constructor parameter; implicit ones are
    /// wildcards.
    Constructor {
        ctor: DefId,
        args: Vec<CorePattern>,
    },
    Number(u64),
}
