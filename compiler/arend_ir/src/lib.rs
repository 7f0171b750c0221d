//! Arend IR - names, identifiers and the concrete model.
//!
//! This crate holds the data shared by every phase of the core:
//! - Spans for source locations
//! - Module paths and qualified names
//! - Fixity / precedence declarations
//! - Arena ids for concrete nodes and stable definition identities
//! - The concrete AST produced by `arend_parse`
//!
//! # Salsa Compatibility
//!
//! Every type that flows out of the parse query derives Clone, Eq, Hash and
//! Debug so that unchanged parses are cut off early.

pub mod ast;
mod ids;
mod name;
mod precedence;
mod span;

pub use ast::{
    AliasDecl, Binder, Clause, ConcreteDef, ConcreteModule, ConstructorDecl, DefBody, DefKind,
    ElemPosition, Expr, ExprKind, FieldDecl, FunctionBody, Implementation, Import, NameRef,
    NamespaceFilter, Open, Pattern, PatternKind, Renaming, SeqElem,
};
pub use ids::{DefId, DefIndex, ExprId, LocalId, PatId};
pub use name::{is_symbolic, LongName, ModulePath, Segments};
pub use precedence::{Associativity, Fixity, Precedence};
pub use span::Span;
