//! Clause patterns.

use arend_diagnostic::ErrorKind;
use arend_ir::{DefId, LocalId, PatId, PatternKind, Span};
use arend_resolve::PatternBinding;
use arend_stack::ensure_sufficient_stack;

use super::{instantiate, Elaborator};
use crate::definition::{CoreBody, CorePattern};
use crate::term::Term;

impl Elaborator<'_> {
    /// Check a pattern against `ty`, binding its variables. Returns the core
    /// pattern and the term it matches.
    pub(crate) fn check_pattern(&mut self, id: PatId, ty: &Term) -> (CorePattern, Term) {
        ensure_sufficient_stack(|| self.check_pattern_inner(id, ty))
    }

    fn check_pattern_inner(&mut self, id: PatId, ty: &Term) -> (CorePattern, Term) {
        let module = self.module;
        let pattern = module.concrete.pattern(id);
        match &pattern.kind {
            PatternKind::Wildcard => {
                let local = LocalId::fresh();
                self.bind(local, ty.clone(), None);
                (CorePattern::Wildcard, Term::Var(local))
            }
            PatternKind::Number(n) => match self.number_type() {
                Some(nat) if self.unify(&nat, ty) => (CorePattern::Number(*n), Term::Number(*n)),
                Some(_) => {
                    let message = format!(
                        "number pattern where a value of type {} is expected",
                        self.show(ty)
                    );
                    self.error(ErrorKind::TypeMismatch, pattern.span, message);
                    (CorePattern::Wildcard, Term::Error)
                }
                None => {
                    self.error(
                        ErrorKind::ElaborationError,
                        pattern.span,
                        "number patterns need the prelude `Nat`",
                    );
                    (CorePattern::Wildcard, Term::Error)
                }
            },
            PatternKind::Name { args, .. } => match module.resolved.pattern(id) {
                Some(PatternBinding::Variable(local)) => {
                    self.bind(local, ty.clone(), None);
                    (CorePattern::Var(local), Term::Var(local))
                }
                Some(PatternBinding::Constructor(ctor)) => {
                    self.check_constructor_pattern(ctor, args, ty, pattern.span)
                }
                None => {
                    self.bind_failed_patterns(args);
                    (CorePattern::Wildcard, Term::Error)
                }
            },
            PatternKind::Error => (CorePattern::Wildcard, Term::Error),
        }
    }

    fn check_constructor_pattern(
        &mut self,
        ctor: DefId,
        args: &[PatId],
        ty: &Term,
        span: Span,
    ) -> (CorePattern, Term) {
        let Some(def) = self.definition(ctor) else {
            self.missing_signature(ctor, span);
            self.bind_failed_patterns(args);
            return (CorePattern::Wildcard, Term::Error);
        };
        let (data, data_params) = match &def.body {
            CoreBody::Constructor {
                data, data_params, ..
            } => (*data, *data_params),
            _ => {
                self.bind_failed_patterns(args);
                return (CorePattern::Wildcard, Term::Error);
            }
        };

        let scrutinee = self.whnf(ty);
        let data_args: Option<Vec<Term>> = match scrutinee.spine() {
            (Term::Global(head), spine) if *head == data && spine.len() == data_params => {
                Some(spine.iter().map(|(arg, _)| (*arg).clone()).collect())
            }
            _ => None,
        };
        let Some(data_args) = data_args else {
            if !scrutinee.is_error() {
                let message = format!(
                    "constructor `{}` does not belong to type {}",
                    self.global_name(ctor),
                    self.show(ty)
                );
                self.error(ErrorKind::TypeMismatch, span, message);
            }
            self.bind_failed_patterns(args);
            return (CorePattern::Wildcard, Term::Error);
        };

        let mut ctor_ty = instantiate(def.ty.clone(), &data_args);

        let mut sub_patterns = args.iter();
        let mut core_args = Vec::new();
        let mut own = Vec::new();
        let mut too_few = false;
        loop {
            let Term::Pi {
                param,
                explicit,
                domain,
                codomain,
            } = ctor_ty
            else {
                break;
            };
            let next = if explicit { sub_patterns.next() } else { None };
            let (core, term) = match next {
                Some(sub) => self.check_pattern(*sub, &domain),
                None => {
                    too_few |= explicit;
                    let local = LocalId::fresh();
                    self.bind(local, *domain, None);
                    (CorePattern::Wildcard, Term::Var(local))
                }
            };
            ctor_ty = codomain.subst(param, &term);
            core_args.push(core);
            own.push((term, explicit));
        }
        let extra: Vec<PatId> = sub_patterns.copied().collect();
        if too_few || !extra.is_empty() {
            let message = format!(
                "too {} patterns for constructor `{}`",
                if too_few { "few" } else { "many" },
                self.global_name(ctor)
            );
            self.error(ErrorKind::ElaborationError, span, message);
            self.bind_failed_patterns(&extra);
        }

        let term = Term::apps(
            Term::apps(
                Term::Global(ctor),
                data_args.into_iter().map(|arg| (arg, false)),
            ),
            own,
        );
        (
            CorePattern::Constructor {
                ctor,
                args: core_args,
            },
            term,
        )
    }

    /// Bind the variables of patterns that could not be checked so later
    /// references to them do not fail again.
    fn bind_failed_patterns(&mut self, patterns: &[PatId]) {
        let module = self.module;
        for id in patterns {
            if let PatternKind::Name { args, .. } = &module.concrete.pattern(*id).kind {
                if let Some(PatternBinding::Variable(local)) = module.resolved.pattern(*id) {
                    self.bind(local, Term::Error, None);
                }
                self.bind_failed_patterns(args);
            }
        }
    }
}
