//! Conversion checking and hole solving.
//!
//! First-order: a hole is solved by whatever it is compared with, provided
//! the hole does not occur in it. Terms are compared up to weak-head
//! normalisation, alpha renaming and eta for lambdas; number literals are
//! convertible with `zero`/`suc` chains of the prelude `Nat`.

use arend_stack::ensure_sufficient_stack;

use crate::eval::Evaluator;
use crate::holes::Holes;
use crate::term::{HoleId, Term};

/// Unifies terms, recording hole solutions in `holes`.
pub struct Unifier<'e, 'a> {
    eval: &'e Evaluator<'a>,
    holes: &'e mut Holes,
}

impl<'e, 'a> Unifier<'e, 'a> {
    pub fn new(eval: &'e Evaluator<'a>, holes: &'e mut Holes) -> Self {
        Unifier { eval, holes }
    }

    /// Whether `left` and `right` are convertible.
    pub fn unify(&mut self, left: &Term, right: &Term) -> bool {
        if left == right {
            return true;
        }
        ensure_sufficient_stack(|| self.unify_whnf(left, right))
    }

    fn unify_whnf(&mut self, left: &Term, right: &Term) -> bool {
        let left = self.eval.whnf(left, self.holes);
        let right = self.eval.whnf(right, self.holes);
        if left == right {
            return true;
        }
        match (&left, &right) {
            (Term::Error, _) | (_, Term::Error) => true,
            (Term::Hole(hole), other) | (other, Term::Hole(hole)) => self.solve(*hole, other),
            (Term::Number(n), other) | (other, Term::Number(n)) => self.unify_number(*n, other),
            (
                Term::Pi {
                    param: left_param,
                    explicit: left_explicit,
                    domain: left_domain,
                    codomain: left_codomain,
                },
                Term::Pi {
                    param: right_param,
                    explicit: right_explicit,
                    domain: right_domain,
                    codomain: right_codomain,
                },
            ) => {
                left_explicit == right_explicit
                    && self.unify(left_domain, right_domain)
                    && self.unify(
                        left_codomain,
                        &right_codomain.subst(*right_param, &Term::Var(*left_param)),
                    )
            }
            (
                Term::Lam {
                    param: left_param,
                    body: left_body,
                    ..
                },
                Term::Lam {
                    param: right_param,
                    body: right_body,
                    ..
                },
            ) => self.unify(
                left_body,
                &right_body.subst(*right_param, &Term::Var(*left_param)),
            ),
            (
                Term::Lam {
                    param,
                    explicit,
                    body,
                    ..
                },
                other,
            )
            | (
                other,
                Term::Lam {
                    param,
                    explicit,
                    body,
                    ..
                },
            ) => {
                let expanded = Term::app(other.clone(), Term::Var(*param), *explicit);
                self.unify(body, &expanded)
            }
            (Term::App { .. }, Term::App { .. }) => {
                let (left_head, left_args) = left.spine();
                let (right_head, right_args) = right.spine();
                left_args.len() == right_args.len()
                    && self.unify(left_head, right_head)
                    && left_args.iter().zip(&right_args).all(
                        |((left_arg, left_explicit), (right_arg, right_explicit))| {
                            left_explicit == right_explicit && self.unify(left_arg, right_arg)
                        },
                    )
            }
            _ => false,
        }
    }

    fn solve(&mut self, hole: HoleId, value: &Term) -> bool {
        let value = self.holes.zonk(value);
        if value == Term::Hole(hole) {
            return true;
        }
        if value.mentions_hole(hole) {
            tracing::trace!(hole = hole.raw(), "occurs check failed");
            return false;
        }
        self.holes.solve(hole, value);
        true
    }

    /// `n` against a term in weak-head normal form that is not a literal.
    fn unify_number(&mut self, n: u64, other: &Term) -> bool {
        let Some(numbers) = self.eval.numbers() else {
            return false;
        };
        let (head, args) = other.spine();
        match head {
            Term::Global(id) if *id == numbers.zero && args.is_empty() => n == 0,
            Term::Global(id) if *id == numbers.suc && args.len() == 1 => match n.checked_sub(1) {
                Some(pred) => self.unify(&Term::Number(pred), args[0].0),
                None => false,
            },
            _ => false,
        }
    }
}
