//! Binary operator engine.
//!
//! Turns a flat sequence of resolved elements into an [`OpTree`] using the
//! fixity of each element's referable:
//!
//! - consecutive operands form an application (juxtaposition binds tighter
//!   than any infix or postfix operator);
//! - a PREFIX operator binds only the operand right after it;
//! - INFIX and POSTFIX operators are associated by precedence climbing:
//!   the pending operator is reduced while its priority is higher than the
//!   incoming one, or equal with both LEFT associative; equal priority with
//!   both RIGHT shifts; any other tie is an error;
//! - operands right after a POSTFIX operator are arguments of its result,
//!   so `x ! y` is `((x !) y)`.
//!
//! Errors never abort: the engine records an [`OpError`] and still returns
//! a tree, with [`OpTree::Error`] standing in for missing operands.

use arend_ir::{Associativity, ExprId, Precedence, Span};

/// Associated form of an operator sequence.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum OpTree {
    Leaf(ExprId),
    App {
        fun: Box<OpTree>,
        arg: Box<OpTree>,
        explicit: bool,
    },
    Binary {
        op: ExprId,
        left: Box<OpTree>,
        right: Box<OpTree>,
    },
    Postfix {
        op: ExprId,
        operand: Box<OpTree>,
    },
    /// Missing operand.
    Error,
}

impl OpTree {
    fn app(fun: OpTree, arg: OpTree, explicit: bool) -> Self {
        OpTree::App {
            fun: Box::new(fun),
            arg: Box::new(arg),
            explicit,
        }
    }

    /// Render with full parenthesization, e.g. `((a + b) + c)`.
    ///
    /// Application spines print flat: `(f x {A} y)`.
    pub fn render(&self, name: &impl Fn(ExprId) -> String) -> String {
        match self {
            OpTree::Leaf(id) => name(*id),
            OpTree::App { .. } => {
                let mut args = Vec::new();
                let mut head = self;
                while let OpTree::App { fun, arg, explicit } = head {
                    let rendered = arg.render(name);
                    args.push(if *explicit { rendered } else { format!("{{{rendered}}}") });
                    head = fun;
                }
                args.reverse();
                format!("({} {})", head.render(name), args.join(" "))
            }
            OpTree::Binary { op, left, right } => {
                format!("({} {} {})", left.render(name), name(*op), right.render(name))
            }
            OpTree::Postfix { op, operand } => format!("({} {})", operand.render(name), name(*op)),
            OpTree::Error => "<error>".to_string(),
        }
    }
}

/// How an element takes part in the sequence.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Role {
    Operand { explicit: bool },
    Prefix,
    Infix(Precedence),
    Postfix(Precedence),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct OpElem {
    pub expr: ExprId,
    pub span: Span,
    pub role: Role,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct OpError {
    pub span: Span,
    pub message: String,
}

enum Item {
    Operand(OpTree),
    /// Argument applied to the operand before it.
    Argument(OpTree, bool),
    Infix(ExprId, Precedence, Span),
    Postfix(ExprId, Precedence, Span),
}

struct PendingOp {
    op: ExprId,
    precedence: Precedence,
    span: Span,
}

struct Engine<'a, N> {
    elems: &'a [OpElem],
    name: &'a N,
    errors: Vec<OpError>,
}

/// Associate a flat element sequence.
///
/// `name` renders an element for error messages.
pub fn reassociate<N: Fn(ExprId) -> String>(
    elems: &[OpElem],
    name: &N,
) -> (OpTree, Vec<OpError>) {
    let mut engine = Engine {
        elems,
        name,
        errors: Vec::new(),
    };
    let items = engine.group_applications();
    let tree = engine.climb(items);
    (tree, engine.errors)
}

impl<N: Fn(ExprId) -> String> Engine<'_, N> {
    fn error(&mut self, span: Span, message: String) {
        self.errors.push(OpError { span, message });
    }

    /// Fold juxtaposed operands (and prefix applications) into application
    /// spines, leaving infix and postfix operators between them.
    fn group_applications(&mut self) -> Vec<Item> {
        let mut items = Vec::new();
        let mut spine: Option<OpTree> = None;
        let mut after_postfix = false;
        let mut i = 0;
        while i < self.elems.len() {
            let elem = self.elems[i];
            match elem.role {
                Role::Operand { .. } | Role::Prefix => {
                    let explicit = !matches!(elem.role, Role::Operand { explicit: false });
                    let (atom, next) = self.atom(i);
                    i = next;
                    if after_postfix {
                        items.push(Item::Argument(atom, explicit));
                        continue;
                    }
                    spine = Some(match spine.take() {
                        Some(fun) => OpTree::app(fun, atom, explicit),
                        None => {
                            if !explicit {
                                self.error(
                                    elem.span,
                                    format!(
                                        "implicit argument `{}` has no function to apply to",
                                        (self.name)(elem.expr)
                                    ),
                                );
                            }
                            atom
                        }
                    });
                    continue;
                }
                Role::Infix(precedence) => {
                    items.extend(spine.take().map(Item::Operand));
                    items.push(Item::Infix(elem.expr, precedence, elem.span));
                    after_postfix = false;
                }
                Role::Postfix(precedence) => {
                    items.extend(spine.take().map(Item::Operand));
                    items.push(Item::Postfix(elem.expr, precedence, elem.span));
                    after_postfix = true;
                }
            }
            i += 1;
        }
        items.extend(spine.map(Item::Operand));
        items
    }

    /// Operand at `i`; a prefix operator takes the atom right after it.
    fn atom(&mut self, i: usize) -> (OpTree, usize) {
        let elem = self.elems[i];
        if elem.role != Role::Prefix {
            return (OpTree::Leaf(elem.expr), i + 1);
        }
        match self.elems.get(i + 1).map(|next| next.role) {
            Some(Role::Operand { explicit: true } | Role::Prefix) => {
                let (arg, next) = self.atom(i + 1);
                (OpTree::app(OpTree::Leaf(elem.expr), arg, true), next)
            }
            _ => {
                self.error(
                    elem.span,
                    format!("prefix operator `{}` is missing its operand", (self.name)(elem.expr)),
                );
                (OpTree::app(OpTree::Leaf(elem.expr), OpTree::Error, true), i + 1)
            }
        }
    }

    fn climb(&mut self, items: Vec<Item>) -> OpTree {
        let mut output: Vec<OpTree> = Vec::new();
        let mut pending: Vec<PendingOp> = Vec::new();
        let mut expect_operand = true;
        let mut last_op: Option<(ExprId, Span)> = None;

        for item in items {
            match item {
                Item::Operand(tree) => {
                    output.push(tree);
                    expect_operand = false;
                }
                Item::Argument(arg, explicit) => {
                    let fun = output.pop().unwrap_or(OpTree::Error);
                    output.push(OpTree::app(fun, arg, explicit));
                    expect_operand = false;
                }
                Item::Infix(op, precedence, span) => {
                    if expect_operand {
                        self.missing_left(op, span);
                        output.push(OpTree::Error);
                    }
                    self.reduce_while(&mut output, &mut pending, precedence, op);
                    pending.push(PendingOp {
                        op,
                        precedence,
                        span,
                    });
                    expect_operand = true;
                    last_op = Some((op, span));
                }
                Item::Postfix(op, precedence, span) => {
                    if expect_operand {
                        self.missing_left(op, span);
                        output.push(OpTree::Error);
                    }
                    self.reduce_while(&mut output, &mut pending, precedence, op);
                    let operand = output.pop().unwrap_or(OpTree::Error);
                    output.push(OpTree::Postfix {
                        op,
                        operand: Box::new(operand),
                    });
                    expect_operand = false;
                }
            }
        }

        if expect_operand {
            if let Some((op, span)) = last_op {
                let message = format!("operator `{}` is missing its right operand", (self.name)(op));
                self.error(span, message);
            }
            output.push(OpTree::Error);
        }
        while let Some(top) = pending.pop() {
            Self::reduce(&mut output, top.op);
        }
        let mut output = output.into_iter();
        let head = output.next().unwrap_or(OpTree::Error);
        output.fold(head, |fun, arg| OpTree::app(fun, arg, true))
    }

    fn missing_left(&mut self, op: ExprId, span: Span) {
        let message = format!("operator `{}` is missing its left operand", (self.name)(op));
        self.error(span, message);
    }

    fn reduce_while(
        &mut self,
        output: &mut Vec<OpTree>,
        pending: &mut Vec<PendingOp>,
        incoming: Precedence,
        incoming_op: ExprId,
    ) {
        while let Some(top) = pending.last() {
            if !self.should_reduce(top, incoming, incoming_op) {
                break;
            }
            if let Some(top) = pending.pop() {
                Self::reduce(output, top.op);
            }
        }
    }

    fn should_reduce(&mut self, top: &PendingOp, incoming: Precedence, incoming_op: ExprId) -> bool {
        if top.precedence.priority != incoming.priority {
            return top.precedence.priority > incoming.priority;
        }
        match (top.precedence.associativity, incoming.associativity) {
            (Associativity::Left, Associativity::Left) => true,
            (Associativity::Right, Associativity::Right) => false,
            _ => {
                let message = format!(
                    "cannot parse binary operator sequence: `{}` ({}) and `{}` ({}) have the same priority",
                    (self.name)(top.op),
                    top.precedence,
                    (self.name)(incoming_op),
                    incoming,
                );
                self.error(top.span, message);
                true
            }
        }
    }

    fn reduce(output: &mut Vec<OpTree>, op: ExprId) {
        let right = output.pop().unwrap_or(OpTree::Error);
        let left = output.pop().unwrap_or(OpTree::Error);
        output.push(OpTree::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        });
    }
}

#[cfg(test)]
mod tests;
