//! Weak-head normalisation.
//!
//! Reduces beta redexes, unfolds function bodies, matches clauses against
//! constructor and number patterns and projects fields out of instances.
//! Every unfolding step burns one unit of fuel; once the fuel is gone terms
//! are left as they are, so non-terminating definitions only make
//! conversion checks fail instead of hanging the checker.

use std::cell::Cell;
use std::sync::Arc;

use arend_ir::{DefId, LocalId};
use arend_resolve::PreludeIds;
use rustc_hash::FxHashMap;

use crate::definition::{ClauseFunction, CoreBody, CoreDef, CorePattern};
use crate::holes::Holes;
use crate::term::{Spine, Term};

/// Source of core definitions.
pub trait Globals {
    fn definition(&self, id: DefId) -> Option<Arc<CoreDef>>;
}

impl Globals for FxHashMap<DefId, Arc<CoreDef>> {
    fn definition(&self, id: DefId) -> Option<Arc<CoreDef>> {
        self.get(&id).cloned()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Match {
    Yes,
    No,
    /// Depends on a value that is not a constructor yet.
    Stuck,
}

impl Match {
    fn and(self, other: Match) -> Match {
        match (self, other) {
            (Match::No, _) | (_, Match::No) => Match::No,
            (Match::Stuck, _) | (_, Match::Stuck) => Match::Stuck,
            (Match::Yes, Match::Yes) => Match::Yes,
        }
    }
}

pub struct Evaluator<'a> {
    globals: &'a dyn Globals,
    numbers: Option<PreludeIds>,
    fuel: Cell<u32>,
}

impl<'a> Evaluator<'a> {
    pub fn new(globals: &'a dyn Globals, numbers: Option<PreludeIds>, fuel: u32) -> Self {
        Evaluator {
            globals,
            numbers,
            fuel: Cell::new(fuel),
        }
    }

    pub fn globals(&self) -> &'a dyn Globals {
        self.globals
    }

    /// `Nat`, `zero` and `suc`, when the prelude is loaded.
    pub fn numbers(&self) -> Option<PreludeIds> {
        self.numbers
    }

    pub fn is_out_of_fuel(&self) -> bool {
        self.fuel.get() == 0
    }

    fn burn(&self) -> Option<()> {
        let fuel = self.fuel.get();
        if fuel == 0 {
            return None;
        }
        if fuel == 1 {
            tracing::debug!("evaluation fuel exhausted");
        }
        self.fuel.set(fuel - 1);
        Some(())
    }

    pub fn whnf(&self, term: &Term, holes: &Holes) -> Term {
        let mut current = term.clone();
        while let Some(next) = self.step(&current, holes) {
            current = next;
        }
        current
    }

    /// One head reduction, or `None` when the head is stuck.
    fn step(&self, term: &Term, holes: &Holes) -> Option<Term> {
        let (head, args) = term.spine();
        match head {
            Term::Hole(hole) => {
                let solution = holes.solution(*hole)?.clone();
                Some(rebuild(solution, &args))
            }
            Term::Lam { param, body, .. } if !args.is_empty() => {
                self.burn()?;
                let (arg, _) = args[0];
                Some(rebuild(body.subst(*param, arg), &args[1..]))
            }
            Term::Global(id) => self.unfold(*id, &args, holes),
            _ => None,
        }
    }

    fn unfold(&self, id: DefId, args: &Spine<'_>, holes: &Holes) -> Option<Term> {
        let def = self.globals.definition(id)?;
        match &def.body {
            CoreBody::Function(body) => {
                self.burn()?;
                Some(rebuild(body.clone(), args))
            }
            CoreBody::Clauses(function) => {
                let arity = function.params.len();
                if args.len() < arity {
                    return None;
                }
                let rhs = self.match_clauses(function, &args[..arity], holes)?;
                self.burn()?;
                Some(rebuild(rhs, &args[arity..]))
            }
            CoreBody::Field { class_params, .. } => {
                let (instance, _) = *args.get(*class_params)?;
                let instance = self.whnf(instance, holes);
                let (instance_head, instance_args) = instance.spine();
                let Term::Global(instance_id) = instance_head else {
                    return None;
                };
                let instance_def = self.globals.definition(*instance_id)?;
                let CoreBody::Instance {
                    implementations, ..
                } = &instance_def.body
                else {
                    return None;
                };
                let (_, value) = implementations.iter().find(|(field, _)| *field == id)?;
                self.burn()?;
                let projected = rebuild(value.clone(), &instance_args);
                Some(rebuild(projected, &args[class_params + 1..]))
            }
            _ => None,
        }
    }

    fn match_clauses(
        &self,
        function: &ClauseFunction,
        args: &[(&Term, bool)],
        holes: &Holes,
    ) -> Option<Term> {
        for clause in &function.clauses {
            let mut subst = FxHashMap::default();
            for (position, param) in function.params.iter().enumerate() {
                if !function.matched.contains(&position) {
                    subst.insert(*param, args[position].0.clone());
                }
            }
            let mut outcome = Match::Yes;
            for (pattern, &position) in clause.patterns.iter().zip(&function.matched) {
                let Some((arg, _)) = args.get(position) else {
                    return None;
                };
                outcome = outcome.and(self.match_pattern(pattern, arg, holes, &mut subst));
                if outcome == Match::No {
                    break;
                }
            }
            match outcome {
                Match::Yes => return Some(clause.rhs.subst_all(&subst)),
                Match::No => {}
                Match::Stuck => return None,
            }
        }
        None
    }

    fn match_pattern(
        &self,
        pattern: &CorePattern,
        value: &Term,
        holes: &Holes,
        subst: &mut FxHashMap<LocalId, Term>,
    ) -> Match {
        match pattern {
            CorePattern::Var(var) => {
                subst.insert(*var, value.clone());
                Match::Yes
            }
            CorePattern::Wildcard => Match::Yes,
            CorePattern::Number(n) => self.match_number(*n, value, holes),
            CorePattern::Constructor { ctor, args } => {
                let value = self.whnf(value, holes);
                if let Term::Number(n) = value {
                    return self.match_number_constructor(n, *ctor, args, holes, subst);
                }
                let (head, value_args) = value.spine();
                let Term::Global(head_id) = head else {
                    return Match::Stuck;
                };
                let Some(head_def) = self.globals.definition(*head_id) else {
                    return Match::Stuck;
                };
                let CoreBody::Constructor { data_params, .. } = &head_def.body else {
                    return Match::Stuck;
                };
                if head_id != ctor {
                    return Match::No;
                }
                let own = &value_args[(*data_params).min(value_args.len())..];
                if own.len() != args.len() {
                    return Match::Stuck;
                }
                let mut outcome = Match::Yes;
                for (pattern, (arg, _)) in args.iter().zip(own) {
                    outcome = outcome.and(self.match_pattern(pattern, arg, holes, subst));
                    if outcome == Match::No {
                        break;
                    }
                }
                outcome
            }
        }
    }

    fn match_number(&self, n: u64, value: &Term, holes: &Holes) -> Match {
        let value = self.whnf(value, holes);
        if let Term::Number(m) = value {
            return if m == n { Match::Yes } else { Match::No };
        }
        let Some(numbers) = self.numbers else {
            return Match::Stuck;
        };
        let (head, args) = value.spine();
        match head {
            Term::Global(id) if *id == numbers.zero && args.is_empty() => {
                if n == 0 {
                    Match::Yes
                } else {
                    Match::No
                }
            }
            Term::Global(id) if *id == numbers.suc && args.len() == 1 => match n.checked_sub(1) {
                Some(pred) => self.match_number(pred, args[0].0, holes),
                None => Match::No,
            },
            _ => Match::Stuck,
        }
    }

    /// A literal `n` against a `zero` or `suc` pattern.
    fn match_number_constructor(
        &self,
        n: u64,
        ctor: DefId,
        args: &[CorePattern],
        holes: &Holes,
        subst: &mut FxHashMap<LocalId, Term>,
    ) -> Match {
        let Some(numbers) = self.numbers else {
            return Match::Stuck;
        };
        if ctor == numbers.zero {
            return if n == 0 { Match::Yes } else { Match::No };
        }
        if ctor != numbers.suc {
            return Match::No;
        }
        match (n.checked_sub(1), args) {
            (Some(pred), [arg]) => self.match_pattern(arg, &Term::Number(pred), holes, subst),
            (Some(_), _) => Match::Stuck,
            (None, _) => Match::No,
        }
    }
}

fn rebuild(head: Term, args: &[(&Term, bool)]) -> Term {
    Term::apps(
        head,
        args.iter().map(|(arg, explicit)| ((*arg).clone(), *explicit)),
    )
}
