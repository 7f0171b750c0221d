//! Checking one definition in two phases.
//!
//! [`DefChecker::signature`] elaborates what other definitions may rely on:
//! parameters, result types and the shape of data types and classes.
//! [`DefChecker::body`] elaborates the rest. A component runs every
//! signature before any body, so mutually recursive members see each
//! other's types.

use arend_diagnostic::{Diagnostic, ErrorKind};
use arend_ir::{
    Clause, ConcreteDef, DefBody, DefId, DefIndex, ExprId, FunctionBody, Implementation, LocalId,
};
use arend_resolve::{BinderSite, ModuleUnit};
use rustc_hash::FxHashMap;

use super::{instantiate, Elaborator};
use crate::checker::Env;
use crate::definition::{
    ClauseFunction, CoreBody, CoreClause, CoreDef, CorePattern, RecursionStatus,
};
use crate::term::{lams, param_args, pis, Param, Term};

pub(crate) struct DefChecker<'a> {
    elab: Elaborator<'a>,
    env: &'a Env<'a>,
    module: &'a ModuleUnit,
    def: &'a ConcreteDef,
    index: DefIndex,
    unit: DefId,
    status: RecursionStatus,
    params: Vec<Param>,
    result: Option<Term>,
    /// Class an instance implements, its arguments and its fields.
    instance_of: Option<(DefId, Vec<Term>, Vec<DefId>)>,
    signature_ok: bool,
}

impl<'a> DefChecker<'a> {
    pub(crate) fn new(
        env: &'a Env<'a>,
        module: &'a ModuleUnit,
        index: DefIndex,
        component: &'a [DefId],
        status: RecursionStatus,
        fuel: u32,
    ) -> Self {
        let unit = module.ids.def(index);
        DefChecker {
            elab: Elaborator::new(env.workspace(), env, fuel, module, unit, component),
            env,
            module,
            def: module.concrete.def(index),
            index,
            unit,
            status,
            params: Vec::new(),
            result: None,
            instance_of: None,
            signature_ok: false,
        }
    }

    pub(crate) fn has_errors(&self) -> bool {
        self.elab.has_errors()
    }

    /// Dependency outside the component whose missing signature made this
    /// definition fail.
    pub(crate) fn propagated(&self) -> Option<DefId> {
        self.elab.propagated()
    }

    pub(crate) fn finish(mut self) -> Vec<Diagnostic> {
        self.elab.take_diagnostics()
    }

    /// Record an error against this definition from outside the elaborator.
    pub(crate) fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.elab.error(kind, self.def.name_span, message);
    }

    #[tracing::instrument(level = "trace", skip_all, fields(def = %self.def.name))]
    pub(crate) fn signature(&mut self) {
        let def = self.def;
        match &def.body {
            DefBody::Function(body) => self.function_signature(body),
            DefBody::Data { .. } => self.data_signature(),
            DefBody::Class { .. } => self.class_signature(),
            DefBody::Instance { .. } => self.instance_signature(),
            DefBody::Meta { .. } => self.meta_signature(),
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(def = %self.def.name))]
    pub(crate) fn body(&mut self) {
        if !self.signature_ok {
            return;
        }
        let def = self.def;
        match &def.body {
            DefBody::Function(FunctionBody::Term(expr)) => self.function_term(*expr),
            DefBody::Function(FunctionBody::Clauses { clauses, .. }) => {
                self.function_clauses(clauses);
            }
            DefBody::Data { .. } => self.constructors(),
            DefBody::Class { .. } => self.fields(),
            DefBody::Instance { implementations } => self.implementations(implementations),
            DefBody::Meta { .. } => {}
        }
    }

    fn publish(&self, id: DefId, ty: &Term, body: CoreBody) {
        let name = self
            .elab
            .workspace
            .def_info(id)
            .map(|info| info.long_name.to_string())
            .unwrap_or_default();
        self.env.publish(CoreDef {
            id,
            name,
            ty: self.elab.zonk(ty),
            status: self.status.clone(),
            body,
        });
    }

    /// Elaborate and bind the parameters of the definition.
    fn bind_params(&mut self) {
        let index = self.index;
        self.params = self
            .elab
            .bind_telescope(&self.def.params, |position| BinderSite::Param(index, position));
    }

    fn settle_signature(&mut self) -> bool {
        self.elab.report_unsolved();
        self.params = self
            .params
            .iter()
            .map(|param| Param {
                ty: self.elab.zonk(&param.ty),
                ..param.clone()
            })
            .collect();
        self.result = self.result.as_ref().map(|result| self.elab.zonk(result));
        self.signature_ok = !self.elab.has_errors();
        self.signature_ok
    }

    fn implicit_params(&self) -> Vec<Param> {
        self.params
            .iter()
            .map(|param| Param {
                explicit: false,
                ..param.clone()
            })
            .collect()
    }

    /// `D params`, the unit applied to its own parameters.
    fn applied_unit(&self) -> Term {
        Term::apps(Term::Global(self.unit), param_args(&self.params))
    }

    fn function_signature(&mut self, body: &FunctionBody) {
        self.bind_params();
        self.result = self.def.result.map(|result| self.elab.check_type(result));
        if self.result.is_none() {
            if self.status.is_recursive() {
                let message = format!(
                    "recursive function `{}` needs an explicit result type",
                    self.def.name
                );
                self.fail(ErrorKind::ElaborationError, message);
            } else if matches!(body, FunctionBody::Clauses { .. }) {
                let message = format!(
                    "function `{}` is defined by pattern matching and needs an explicit result type",
                    self.def.name
                );
                self.fail(ErrorKind::ElaborationError, message);
            }
        }
        if self.settle_signature() {
            if let Some(result) = &self.result {
                self.publish(self.unit, &pis(&self.params, result.clone()), CoreBody::Opaque);
            }
        }
    }

    fn function_term(&mut self, expr: ExprId) {
        let value = match self.result.clone() {
            Some(result) => self.elab.check(expr, &result),
            None => {
                let (value, ty) = self.elab.infer(expr);
                self.result = Some(ty);
                value
            }
        };
        self.elab.report_unsolved();
        if self.elab.has_errors() {
            return;
        }
        let result = self.result.clone().unwrap_or(Term::Error);
        let body = self.elab.zonk(&lams(&self.params, value));
        self.publish(self.unit, &pis(&self.params, result), CoreBody::Function(body));
    }

    fn function_clauses(&mut self, clauses: &[Clause]) {
        let Some(result) = self.result.clone() else {
            return;
        };
        let matched = self.module.resolved.matched_params(self.index).to_vec();
        let mut core = Vec::with_capacity(clauses.len());
        for clause in clauses {
            if clause.patterns.len() != matched.len() {
                let message = format!(
                    "expected {} patterns, found {}",
                    matched.len(),
                    clause.patterns.len()
                );
                self.elab
                    .error(ErrorKind::ElaborationError, clause.span, message);
                continue;
            }
            let mut subst = FxHashMap::default();
            let mut patterns = vec![CorePattern::Wildcard; matched.len()];
            for (position, param) in self.params.iter().enumerate() {
                let ty = param.ty.subst_all(&subst);
                match matched.iter().position(|matched| *matched == position) {
                    Some(slot) => {
                        let (pattern, term) = self.elab.check_pattern(clause.patterns[slot], &ty);
                        patterns[slot] = pattern;
                        subst.insert(param.id, term);
                    }
                    None => self.elab.bind(param.id, ty, None),
                }
            }
            let rhs = self.elab.check(clause.rhs, &result.subst_all(&subst));
            core.push(CoreClause {
                patterns,
                rhs: rhs.subst_all(&subst),
            });
        }
        self.elab.report_unsolved();
        if self.elab.has_errors() {
            return;
        }
        let clauses = core
            .into_iter()
            .map(|clause| CoreClause {
                rhs: self.elab.zonk(&clause.rhs),
                ..clause
            })
            .collect();
        let function = ClauseFunction {
            params: self.params.iter().map(|param| param.id).collect(),
            matched,
            clauses,
        };
        self.publish(
            self.unit,
            &pis(&self.params, result),
            CoreBody::Clauses(function),
        );
    }

    fn members(&self, count: usize) -> Vec<DefId> {
        (0..count)
            .filter_map(|position| self.module.ids.member(self.index, position))
            .collect()
    }

    fn data_signature(&mut self) {
        self.bind_params();
        if let Some(result) = self.def.result {
            self.elab.check_type(result);
        }
        let def = self.def;
        let DefBody::Data { constructors } = &def.body else {
            return;
        };
        if self.settle_signature() {
            let body = CoreBody::Data {
                params: self.params.len(),
                constructors: self.members(constructors.len()),
            };
            self.publish(self.unit, &pis(&self.params, Term::Universe), body);
        }
    }

    fn constructors(&mut self) {
        let def = self.def;
        let DefBody::Data { constructors } = &def.body else {
            return;
        };
        let index = self.index;
        let data_params = self.implicit_params();
        for (position, ctor) in constructors.iter().enumerate() {
            let Some(id) = self.module.ids.member(index, position) else {
                continue;
            };
            let before = self.elab.diagnostics.len();
            let own = self.elab.bind_telescope(&ctor.params, |param| {
                BinderSite::CtorParam(index, position, param)
            });
            self.elab.report_unsolved();
            if self.elab.diagnostics.len() > before {
                continue;
            }
            let ty = pis(&data_params, pis(&own, self.applied_unit()));
            let body = CoreBody::Constructor {
                data: self.unit,
                position,
                data_params: data_params.len(),
            };
            self.publish(id, &ty, body);
        }
    }

    fn class_signature(&mut self) {
        self.bind_params();
        let def = self.def;
        let DefBody::Class { fields } = &def.body else {
            return;
        };
        if self.settle_signature() {
            let body = CoreBody::Class {
                params: self.params.len(),
                fields: self.members(fields.len()),
            };
            self.publish(self.unit, &pis(&self.params, Term::Universe), body);
        }
    }

    fn fields(&mut self) {
        let def = self.def;
        let DefBody::Class { fields } = &def.body else {
            return;
        };
        let class_params = self.implicit_params();
        for (position, field) in fields.iter().enumerate() {
            let Some(id) = self.module.ids.member(self.index, position) else {
                continue;
            };
            let before = self.elab.diagnostics.len();
            let ty = self.elab.check_type(field.ty);
            self.elab.report_unsolved();
            if self.elab.diagnostics.len() > before {
                continue;
            }
            let ty = pis(&class_params, Term::arrow(self.applied_unit(), ty));
            let body = CoreBody::Field {
                class: self.unit,
                position,
                class_params: class_params.len(),
            };
            self.publish(id, &ty, body);
        }
    }

    fn instance_signature(&mut self) {
        self.bind_params();
        let Some(result_expr) = self.def.result else {
            let message = format!(
                "instance `{}` needs the class it implements as its result type",
                self.def.name
            );
            self.fail(ErrorKind::ElaborationError, message);
            return;
        };
        let result = self.elab.check_type(result_expr);
        let class = {
            let head_form = self.elab.whnf(&result);
            let (head, spine) = head_form.spine();
            match head {
                Term::Global(id) => self.elab.definition(*id).and_then(|def| match &def.body {
                    CoreBody::Class { params, fields } if *params == spine.len() => Some((
                        *id,
                        spine.iter().map(|(arg, _)| (*arg).clone()).collect(),
                        fields.clone(),
                    )),
                    _ => None,
                }),
                _ => None,
            }
        };
        if class.is_none() && !result.is_error() {
            let message = format!("expected a class, found {}", self.elab.show(&result));
            let span = self.module.concrete.expr(result_expr).span;
            self.elab.error(ErrorKind::TypeMismatch, span, message);
        }
        self.instance_of = class;
        self.result = Some(result);
        if self.settle_signature() {
            let result = self.result.clone().unwrap_or(Term::Error);
            self.publish(self.unit, &pis(&self.params, result), CoreBody::Opaque);
        }
    }

    fn implementations(&mut self, implementations: &[Implementation]) {
        let Some((class, class_args, fields)) = self.instance_of.clone() else {
            return;
        };
        let resolved = &self.module.resolved;
        let implemented: Vec<Option<DefId>> = (0..implementations.len())
            .map(|position| resolved.implementation(self.index, position))
            .collect();
        for (implementation, field) in implementations.iter().zip(&implemented) {
            if let Some(field) = field.filter(|field| !fields.contains(field)) {
                let message = format!(
                    "`{}` is not a field of class `{}`",
                    self.elab.global_name(field),
                    self.elab.global_name(class)
                );
                self.elab
                    .error(ErrorKind::ElaborationError, implementation.span, message);
            }
        }

        let mut args = class_args;
        args.push(self.applied_unit());
        let mut values = Vec::with_capacity(fields.len());
        for field in &fields {
            let positions: Vec<usize> = implemented
                .iter()
                .enumerate()
                .filter(|(_, implemented)| **implemented == Some(*field))
                .map(|(position, _)| position)
                .collect();
            let Some((&first, duplicates)) = positions.split_first() else {
                let message = format!("field `{}` is not implemented", self.elab.global_name(*field));
                self.fail(ErrorKind::ElaborationError, message);
                continue;
            };
            for duplicate in duplicates {
                let message = format!(
                    "field `{}` is implemented more than once",
                    self.elab.global_name(*field)
                );
                self.elab.error(
                    ErrorKind::ElaborationError,
                    implementations[*duplicate].span,
                    message,
                );
            }
            let implementation = &implementations[first];
            let field_ty = self.elab.global_type(*field, implementation.span);
            let expected = instantiate(field_ty, &args);
            let value = self.elab.check(implementation.value, &expected);
            values.push((*field, value));
        }
        self.elab.report_unsolved();
        if self.elab.has_errors() {
            return;
        }
        let implementations = values
            .into_iter()
            .map(|(field, value)| (field, self.elab.zonk(&lams(&self.params, value))))
            .collect();
        let result = self.result.clone().unwrap_or(Term::Error);
        let body = CoreBody::Instance {
            class,
            params: self.params.len(),
            implementations,
        };
        self.publish(self.unit, &pis(&self.params, result), body);
    }

    /// Metas are expanded where they are used; only their parameters are
    /// recorded.
    fn meta_signature(&mut self) {
        let params = (0..self.def.params.len())
            .map(|position| {
                self.module
                    .resolved
                    .binder(BinderSite::Param(self.index, position))
                    .unwrap_or_else(LocalId::fresh)
            })
            .collect();
        self.signature_ok = true;
        let body = CoreBody::Meta {
            module: self.module.concrete.path.clone(),
            index: self.index,
            params,
        };
        self.publish(self.unit, &Term::Error, body);
    }
}
