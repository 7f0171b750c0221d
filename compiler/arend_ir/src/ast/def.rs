//! Concrete definitions.

use crate::{Binder, DefIndex, ExprId, PatId, Precedence, Span};

/// Closed set of definition variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DefKind {
    Function,
    Data,
    Class,
    Instance,
    Meta,
}

impl DefKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            DefKind::Function => "\\func",
            DefKind::Data => "\\data",
            DefKind::Class => "\\class",
            DefKind::Instance => "\\instance",
            DefKind::Meta => "\\meta",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConcreteDef {
    pub name: String,
    pub name_span: Span,
    /// Whole definition including its `\where` block.
    pub span: Span,
    /// End of the definition proper, before `\where`.
    pub header_end: u32,
    pub precedence: Precedence,
    pub alias: Option<AliasDecl>,
    pub params: Vec<Binder>,
    pub result: Option<ExprId>,
    pub body: DefBody,
    pub where_defs: Vec<DefIndex>,
    pub parent: Option<DefIndex>,
    /// Set when a syntax error was recovered inside this definition.
    pub erroneous: bool,
}

impl ConcreteDef {
    pub fn kind(&self) -> DefKind {
        match self.body {
            DefBody::Function(_) => DefKind::Function,
            DefBody::Data { .. } => DefKind::Data,
            DefBody::Class { .. } => DefKind::Class,
            DefBody::Instance { .. } => DefKind::Instance,
            DefBody::Meta { .. } => DefKind::Meta,
        }
    }

    /// Span of the definition without its `\where` block.
    pub fn own_span(&self) -> Span {
        Span::new(self.span.start, self.header_end.max(self.span.start))
    }
}

/// `\alias [fixity] name`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AliasDecl {
    pub name: String,
    pub span: Span,
    pub precedence: Precedence,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DefBody {
    Function(FunctionBody),
    Data {
        constructors: Vec<ConstructorDecl>,
    },
    Class {
        fields: Vec<FieldDecl>,
    },
    /// The class being instantiated is the definition's result type.
    Instance {
        implementations: Vec<Implementation>,
    },
    /// Meta parameters are the definition's (untyped) params.
    Meta {
        body: ExprId,
    },
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum FunctionBody {
    /// `=> expr`
    Term(ExprId),
    /// Pattern-matching clauses; `elim` lists the matched parameters, `None`
    /// matches every explicit parameter.
    Clauses {
        elim: Option<Vec<NameRef>>,
        clauses: Vec<Clause>,
    },
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Clause {
    pub patterns: Vec<PatId>,
    pub rhs: ExprId,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstructorDecl {
    pub name: String,
    pub span: Span,
    pub precedence: Precedence,
    pub params: Vec<Binder>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub span: Span,
    pub precedence: Precedence,
    pub ty: ExprId,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Implementation {
    pub name: String,
    pub span: Span,
    pub value: ExprId,
}

/// A bare name occurrence, e.g. in `\elim` or `\hiding` lists.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NameRef {
    pub name: String,
    pub span: Span,
}
