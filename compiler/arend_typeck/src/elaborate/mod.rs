//! Elaboration of concrete syntax into core terms.
//!
//! Bidirectional: [`Elaborator::infer`] synthesises a type,
//! [`Elaborator::check`] pushes an expected type into lambdas and holes and
//! otherwise infers and unifies. Omitted implicit arguments become holes
//! that unification solves. Problems are recorded as diagnostics and
//! elaboration carries on with [`Term::Error`].

mod definition;
mod pattern;

pub(crate) use definition::DefChecker;

use std::sync::Arc;

use arend_diagnostic::{Anchor, Diagnostic, ErrorKind};
use arend_ir::{
    Binder, ConcreteModule, DefBody, DefId, ExprId, ExprKind, LocalId, Span,
};
use arend_resolve::{BinderSite, ModuleUnit, OpTree, Referable, Workspace};
use arend_stack::ensure_sufficient_stack;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::definition::{CoreBody, CoreDef};
use crate::eval::{Evaluator, Globals};
use crate::holes::Holes;
use crate::term::{lams, pis, Names, Param, Term};
use crate::unify::Unifier;

/// Meta expansions nested deeper than this are reported instead of expanded.
const MAX_META_DEPTH: u32 = 64;

#[derive(Clone, Debug)]
struct LocalEntry {
    ty: Term,
    /// Meta parameters stand for the argument they were given.
    value: Option<Term>,
}

/// Elaboration state for one unit.
pub(crate) struct Elaborator<'a> {
    workspace: &'a Workspace,
    eval: Evaluator<'a>,
    holes: Holes,
    locals: FxHashMap<LocalId, LocalEntry>,
    /// Module whose syntax is elaborated; a meta's module during expansion.
    module: &'a ModuleUnit,
    /// Module of the unit.
    home: &'a ModuleUnit,
    unit: DefId,
    component: &'a [DefId],
    diagnostics: Vec<Diagnostic>,
    /// Dependency without signature that made this unit fail.
    propagated: Option<DefId>,
    meta_depth: u32,
    reported_holes: usize,
}

impl<'a> Elaborator<'a> {
    pub(crate) fn new(
        workspace: &'a Workspace,
        globals: &'a dyn Globals,
        fuel: u32,
        module: &'a ModuleUnit,
        unit: DefId,
        component: &'a [DefId],
    ) -> Self {
        Elaborator {
            workspace,
            eval: Evaluator::new(globals, workspace.prelude_ids(), fuel),
            holes: Holes::default(),
            locals: FxHashMap::default(),
            module,
            home: module,
            unit,
            component,
            diagnostics: Vec::new(),
            propagated: None,
            meta_depth: 0,
            reported_holes: 0,
        }
    }

    pub(crate) fn error(&mut self, kind: ErrorKind, span: Span, message: impl Into<String>) -> Term {
        let anchor = Anchor::new(self.module.concrete.path.clone(), span).in_definition(self.unit);
        self.diagnostics
            .push(Diagnostic::error(kind, anchor).with_message(message));
        Term::Error
    }

    pub(crate) fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub(crate) fn propagated(&self) -> Option<DefId> {
        self.propagated
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn bind(&mut self, id: LocalId, ty: Term, value: Option<Term>) {
        self.locals.insert(id, LocalEntry { ty, value });
    }

    fn definition(&self, id: DefId) -> Option<Arc<CoreDef>> {
        self.eval.globals().definition(id)
    }

    fn whnf(&self, term: &Term) -> Term {
        self.eval.whnf(term, &self.holes)
    }

    fn unify(&mut self, left: &Term, right: &Term) -> bool {
        Unifier::new(&self.eval, &mut self.holes).unify(left, right)
    }

    pub(crate) fn zonk(&self, term: &Term) -> Term {
        self.holes.zonk(term)
    }

    fn show(&self, term: &Term) -> String {
        self.zonk(term).display(self).to_string()
    }

    fn global_name(&self, id: DefId) -> String {
        self.workspace
            .def_info(id)
            .map_or_else(|| format!("#{}", id.raw()), |info| info.name().to_owned())
    }

    fn number_type(&self) -> Option<Term> {
        self.eval.numbers().map(|numbers| Term::Global(numbers.nat))
    }

    fn expects_implicit(&self, expected: &Term) -> bool {
        matches!(self.whnf(expected), Term::Pi { explicit: false, .. })
    }

    /// Type of a global, or an error when its signature is unavailable.
    fn global_type(&mut self, id: DefId, span: Span) -> Term {
        match self.definition(id) {
            Some(def) => def.ty.clone(),
            None => self.missing_signature(id, span),
        }
    }

    /// A dependency outside the component has no signature: this unit
    /// fails with a propagated failure. Inside the component the member
    /// that failed has already reported.
    fn missing_signature(&mut self, id: DefId, span: Span) -> Term {
        let unit = self.workspace.unit_of(id);
        if !self.component.contains(&unit) && self.propagated.is_none() {
            self.propagated = Some(unit);
            let message = format!(
                "`{}` cannot be used: its signature failed to typecheck",
                self.global_name(id)
            );
            self.error(ErrorKind::PropagatedFailure, span, message);
        }
        Term::Error
    }

    /// Report holes created since the last call that are still unsolved.
    pub(crate) fn report_unsolved(&mut self) {
        let unsolved: Vec<_> = self.holes.unsolved_since(self.reported_holes).collect();
        self.reported_holes = self.holes.len();
        if self.has_errors() {
            return;
        }
        let mut seen = FxHashSet::default();
        for hole in unsolved {
            let span = self.holes.span(hole).unwrap_or(Span::DUMMY);
            if seen.insert(span) {
                self.error(
                    ErrorKind::ElaborationError,
                    span,
                    "cannot infer an implicit argument or omitted type here",
                );
            }
        }
    }

    /// Elaborate a telescope, binding each parameter.
    pub(crate) fn bind_telescope(
        &mut self,
        binders: &[Binder],
        site: impl Fn(usize) -> BinderSite,
    ) -> Vec<Param> {
        let module = self.module;
        let mut params = Vec::with_capacity(binders.len());
        let mut group: Option<(ExprId, Term)> = None;
        for (position, binder) in binders.iter().enumerate() {
            let id = module
                .resolved
                .binder(site(position))
                .unwrap_or_else(LocalId::fresh);
            let ty = match (binder.ty, &group) {
                (Some(expr), Some((shared, ty))) if *shared == expr => ty.clone(),
                (Some(expr), _) => {
                    let ty = self.check_type(expr);
                    group = Some((expr, ty.clone()));
                    ty
                }
                (None, _) => Term::Hole(self.holes.fresh(Term::Universe, binder.span)),
            };
            self.bind(id, ty.clone(), None);
            params.push(Param {
                id,
                explicit: binder.explicit,
                ty,
            });
        }
        params
    }

    pub(crate) fn check_type(&mut self, expr: ExprId) -> Term {
        self.check(expr, &Term::Universe)
    }

    pub(crate) fn infer(&mut self, expr: ExprId) -> (Term, Term) {
        ensure_sufficient_stack(|| self.infer_expr(expr))
    }

    pub(crate) fn check(&mut self, expr: ExprId, expected: &Term) -> Term {
        ensure_sufficient_stack(|| self.check_expr(expr, expected))
    }

    fn infer_expr(&mut self, id: ExprId) -> (Term, Term) {
        let module = self.module;
        let expr = module.concrete.expr(id);
        match &expr.kind {
            ExprKind::Ref(_) => self.infer_ref(id, expr.span),
            ExprKind::Number(n) => match self.number_type() {
                Some(nat) => (Term::Number(*n), nat),
                None => (
                    self.error(
                        ErrorKind::ElaborationError,
                        expr.span,
                        "number literals need the prelude `Nat`",
                    ),
                    Term::Error,
                ),
            },
            ExprKind::Universe => (Term::Universe, Term::Universe),
            ExprKind::Hole => {
                let ty = Term::Hole(self.holes.fresh(Term::Universe, expr.span));
                let hole = self.holes.fresh(ty.clone(), expr.span);
                (Term::Hole(hole), ty)
            }
            ExprKind::Seq(_) => match module.resolved.op_tree(id) {
                Some(tree) => self.infer_tree(tree, expr.span),
                None => (Term::Error, Term::Error),
            },
            ExprKind::Lam { params, body } => {
                let mut bound = Vec::with_capacity(params.len());
                for (position, binder) in params.iter().enumerate() {
                    let local = module
                        .resolved
                        .binder(BinderSite::Lam(id, position))
                        .unwrap_or_else(LocalId::fresh);
                    let ty = match binder.ty {
                        Some(ty) => self.check_type(ty),
                        None => Term::Hole(self.holes.fresh(Term::Universe, binder.span)),
                    };
                    self.bind(local, ty.clone(), None);
                    bound.push(Param {
                        id: local,
                        explicit: binder.explicit,
                        ty,
                    });
                }
                let (body, body_ty) = self.infer(*body);
                (lams(&bound, body), pis(&bound, body_ty))
            }
            ExprKind::Pi { params, codomain } => {
                let bound = self.bind_telescope(params, |position| BinderSite::Pi(id, position));
                let codomain = self.check_type(*codomain);
                (pis(&bound, codomain), Term::Universe)
            }
            ExprKind::Arrow { domain, codomain } => {
                let domain = self.check_type(*domain);
                let codomain = self.check_type(*codomain);
                (Term::arrow(domain, codomain), Term::Universe)
            }
            ExprKind::Error => (Term::Error, Term::Error),
        }
    }

    fn infer_ref(&mut self, id: ExprId, span: Span) -> (Term, Term) {
        let module = self.module;
        let Some(referable) = module.resolved.referent(id) else {
            // Unresolved: the resolver has reported it.
            return (Term::Error, Term::Error);
        };
        match referable.underlying() {
            Referable::Local(local) => match self.locals.get(local) {
                Some(entry) => (
                    entry.value.clone().unwrap_or(Term::Var(*local)),
                    entry.ty.clone(),
                ),
                None => {
                    let name = module.resolved.local_name(*local).unwrap_or("_");
                    let message = format!("`{name}` cannot be used here");
                    (
                        self.error(ErrorKind::ElaborationError, span, message),
                        Term::Error,
                    )
                }
            },
            Referable::Global(def) | Referable::Field(def) => {
                (Term::Global(*def), self.global_type(*def, span))
            }
            Referable::Meta(meta) => self.expand_meta(*meta, &[], None, span),
            Referable::Alias { .. } => (Term::Error, Term::Error),
        }
    }

    fn meta_referent(&self, expr: ExprId) -> Option<DefId> {
        match self.module.resolved.referent(expr)?.underlying() {
            Referable::Meta(meta) => Some(*meta),
            _ => None,
        }
    }

    fn check_expr(&mut self, id: ExprId, expected: &Term) -> Term {
        let module = self.module;
        let expr = module.concrete.expr(id);
        match &expr.kind {
            ExprKind::Lam { params, body } => self.check_lam(id, params, *body, expected),
            ExprKind::Hole => Term::Hole(self.holes.fresh(expected.clone(), expr.span)),
            ExprKind::Seq(_) => match module.resolved.op_tree(id) {
                Some(tree) => self.check_tree(tree, expected, expr.span),
                None => Term::Error,
            },
            _ => {
                let (term, ty) = match self.meta_referent(id) {
                    Some(meta) => self.expand_meta(meta, &[], Some(expected), expr.span),
                    None => self.infer(id),
                };
                self.coerce(term, ty, expected, expr.span)
            }
        }
    }

    /// `\lam` against an expected function type. Implicit parameters the
    /// lambda does not bind are inserted as implicit lambdas.
    fn check_lam(&mut self, id: ExprId, params: &[Binder], body: ExprId, expected: &Term) -> Term {
        let module = self.module;
        let mut expected = expected.clone();
        let mut bound = Vec::with_capacity(params.len());
        for (position, binder) in params.iter().enumerate() {
            let local = module
                .resolved
                .binder(BinderSite::Lam(id, position))
                .unwrap_or_else(LocalId::fresh);
            if binder.explicit {
                while let Term::Pi {
                    param,
                    explicit: false,
                    domain,
                    codomain,
                } = self.whnf(&expected)
                {
                    let implicit = LocalId::fresh();
                    self.bind(implicit, (*domain).clone(), None);
                    bound.push(Param {
                        id: implicit,
                        explicit: false,
                        ty: *domain,
                    });
                    expected = codomain.subst(param, &Term::Var(implicit));
                }
            }
            match self.whnf(&expected) {
                Term::Pi {
                    param,
                    explicit,
                    domain,
                    codomain,
                } if explicit == binder.explicit => {
                    if let Some(annotation) = binder.ty {
                        let annotated = self.check_type(annotation);
                        if !self.unify(&annotated, &domain) {
                            let message = format!(
                                "parameter type {} does not match the expected {}",
                                self.show(&annotated),
                                self.show(&domain)
                            );
                            let span = module.concrete.expr(annotation).span;
                            self.error(ErrorKind::TypeMismatch, span, message);
                        }
                    }
                    self.bind(local, (*domain).clone(), None);
                    bound.push(Param {
                        id: local,
                        explicit,
                        ty: *domain,
                    });
                    expected = codomain.subst(param, &Term::Var(local));
                }
                Term::Error => {
                    self.bind(local, Term::Error, None);
                    bound.push(Param {
                        id: local,
                        explicit: binder.explicit,
                        ty: Term::Error,
                    });
                }
                other => {
                    let message = format!(
                        "expected an expression of type {}, found a lambda",
                        self.show(&other)
                    );
                    let span = module.concrete.expr(id).span;
                    self.error(ErrorKind::TypeMismatch, span, message);
                    for binder_position in position..params.len() {
                        if let Some(local) =
                            module.resolved.binder(BinderSite::Lam(id, binder_position))
                        {
                            self.bind(local, Term::Error, None);
                        }
                    }
                    self.infer(body);
                    return Term::Error;
                }
            }
        }
        let body = self.check(body, &expected);
        lams(&bound, body)
    }

    fn infer_tree(&mut self, tree: &'a OpTree, span: Span) -> (Term, Term) {
        match flatten(tree) {
            (None, _) => (Term::Error, Term::Error),
            (Some(head), args) if args.is_empty() => self.infer(head),
            (Some(head), args) => self.apply(head, &args, None, span),
        }
    }

    fn check_tree(&mut self, tree: &'a OpTree, expected: &Term, span: Span) -> Term {
        match flatten(tree) {
            (None, _) => Term::Error,
            (Some(head), args) if args.is_empty() => self.check(head, expected),
            (Some(head), args) => {
                let (term, ty) = self.apply(head, &args, Some(expected), span);
                self.coerce(term, ty, expected, span)
            }
        }
    }

    fn apply(
        &mut self,
        head: ExprId,
        args: &[(&'a OpTree, bool)],
        expected: Option<&Term>,
        span: Span,
    ) -> (Term, Term) {
        if let Some(meta) = self.meta_referent(head) {
            return self.expand_meta(meta, args, expected, span);
        }
        let (fun, ty) = self.infer(head);
        self.apply_args(fun, ty, args, span)
    }

    fn apply_args(
        &mut self,
        fun: Term,
        ty: Term,
        args: &[(&'a OpTree, bool)],
        span: Span,
    ) -> (Term, Term) {
        let (mut fun, mut ty) = (fun, ty);
        for &(arg, explicit) in args {
            let arg_span = tree_span(&self.module.concrete, arg).unwrap_or(span);
            if explicit {
                (fun, ty) = self.insert_implicits(fun, ty, arg_span);
            }
            match self.whnf(&ty) {
                Term::Pi {
                    param,
                    explicit: takes_explicit,
                    domain,
                    codomain,
                } if takes_explicit == explicit => {
                    let value = self.check_tree(arg, &domain, arg_span);
                    ty = codomain.subst(param, &value);
                    fun = Term::app(fun, value, explicit);
                }
                Term::Error => {
                    self.infer_tree(arg, arg_span);
                    fun = Term::Error;
                }
                other => {
                    let message = if explicit {
                        format!(
                            "expected a function, found an expression of type {}",
                            self.show(&other)
                        )
                    } else {
                        format!(
                            "unexpected implicit argument for an expression of type {}",
                            self.show(&other)
                        )
                    };
                    self.error(ErrorKind::TypeMismatch, arg_span, message);
                    self.infer_tree(arg, arg_span);
                    fun = Term::Error;
                    ty = Term::Error;
                }
            }
        }
        (fun, ty)
    }

    /// Apply `fun` to a fresh hole for every leading implicit parameter.
    fn insert_implicits(&mut self, fun: Term, ty: Term, span: Span) -> (Term, Term) {
        let (mut fun, mut ty) = (fun, ty);
        while let Term::Pi {
            param,
            explicit: false,
            domain,
            codomain,
        } = self.whnf(&ty)
        {
            let hole = Term::Hole(self.holes.fresh(*domain, span));
            ty = codomain.subst(param, &hole);
            fun = Term::app(fun, hole, false);
        }
        (fun, ty)
    }

    /// Check that an inferred `ty` fits `expected`.
    fn coerce(&mut self, term: Term, ty: Term, expected: &Term, span: Span) -> Term {
        if term.is_error() || ty.is_error() {
            return term;
        }
        let (term, ty) = if self.expects_implicit(expected) {
            (term, ty)
        } else {
            self.insert_implicits(term, ty, span)
        };
        if self.unify(&ty, expected) {
            term
        } else {
            let message = format!(
                "expected an expression of type {}, found one of type {}",
                self.show(expected),
                self.show(&ty)
            );
            self.error(ErrorKind::TypeMismatch, span, message)
        }
    }

    /// Elaborate the body of a meta with its parameters bound to the
    /// elaborated arguments, then apply the remaining arguments.
    fn expand_meta(
        &mut self,
        meta: DefId,
        args: &[(&'a OpTree, bool)],
        expected: Option<&Term>,
        span: Span,
    ) -> (Term, Term) {
        let Some(def) = self.definition(meta) else {
            return (self.missing_signature(meta, span), Term::Error);
        };
        let CoreBody::Meta {
            module: path,
            index,
            params,
        } = &def.body
        else {
            return (Term::Error, Term::Error);
        };
        let workspace = self.workspace;
        let Some(meta_module) = workspace.module(path) else {
            return (Term::Error, Term::Error);
        };
        let meta_module: &'a ModuleUnit = meta_module;
        let DefBody::Meta { body } = &meta_module.concrete.def(*index).body else {
            return (Term::Error, Term::Error);
        };
        if self.meta_depth >= MAX_META_DEPTH {
            let message = format!(
                "expansion of meta `{}` is nested too deeply",
                self.global_name(meta)
            );
            return (
                self.error(ErrorKind::ElaborationError, span, message),
                Term::Error,
            );
        }
        if args.len() < params.len() {
            let message = format!(
                "meta `{}` expects {} arguments, found {}",
                self.global_name(meta),
                params.len(),
                args.len()
            );
            for &(arg, _) in args {
                self.infer_tree(arg, span);
            }
            return (
                self.error(ErrorKind::ElaborationError, span, message),
                Term::Error,
            );
        }

        let mut bound = Vec::with_capacity(params.len());
        for (&(arg, _), param) in args.iter().zip(params) {
            let arg_span = tree_span(&self.module.concrete, arg).unwrap_or(span);
            let (value, ty) = self.infer_tree(arg, arg_span);
            bound.push((*param, ty, value));
        }
        let caller = std::mem::replace(&mut self.module, meta_module);
        self.meta_depth += 1;
        for (param, ty, value) in bound {
            self.bind(param, ty, Some(value));
        }
        let rest = &args[params.len()..];
        let (term, ty) = match expected {
            Some(expected) if rest.is_empty() => (self.check(*body, expected), expected.clone()),
            _ => self.infer(*body),
        };
        self.meta_depth -= 1;
        self.module = caller;
        self.apply_args(term, ty, rest, span)
    }
}

impl Names for Elaborator<'_> {
    fn local(&self, id: LocalId) -> Option<String> {
        self.module
            .resolved
            .local_name(id)
            .or_else(|| self.home.resolved.local_name(id))
            .map(str::to_owned)
    }

    fn global(&self, id: DefId) -> String {
        self.global_name(id)
    }
}

/// Apply a Pi type to `args`, one leading parameter each.
pub(crate) fn instantiate(ty: Term, args: &[Term]) -> Term {
    let mut ty = ty;
    for arg in args {
        ty = match ty {
            Term::Pi {
                param, codomain, ..
            } => codomain.subst(param, arg),
            other => return other,
        };
    }
    ty
}

/// Head and arguments of an operator tree: `a + b` is `+` applied to `a`
/// and `b`.
fn flatten(tree: &OpTree) -> (Option<ExprId>, Vec<(&OpTree, bool)>) {
    match tree {
        OpTree::Leaf(expr) => (Some(*expr), Vec::new()),
        OpTree::App { fun, arg, explicit } => {
            let (head, mut args) = flatten(fun);
            args.push((&**arg, *explicit));
            (head, args)
        }
        OpTree::Binary { op, left, right } => {
            (Some(*op), vec![(&**left, true), (&**right, true)])
        }
        OpTree::Postfix { op, operand } => (Some(*op), vec![(&**operand, true)]),
        OpTree::Error => (None, Vec::new()),
    }
}

fn tree_span(module: &ConcreteModule, tree: &OpTree) -> Option<Span> {
    let merge = |left: Option<Span>, right: Option<Span>| match (left, right) {
        (Some(left), Some(right)) => Some(left.merge(right)),
        (one, other) => one.or(other),
    };
    match tree {
        OpTree::Leaf(expr) => Some(module.expr(*expr).span),
        OpTree::App { fun, arg, .. } => merge(tree_span(module, fun), tree_span(module, arg)),
        OpTree::Binary { op, left, right } => merge(
            merge(tree_span(module, left), Some(module.expr(*op).span)),
            tree_span(module, right),
        ),
        OpTree::Postfix { op, operand } => {
            merge(tree_span(module, operand), Some(module.expr(*op).span))
        }
        OpTree::Error => None,
    }
}
