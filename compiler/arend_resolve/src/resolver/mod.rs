//! Resolution of one module.
//!
//! Walks every definition of a [`ConcreteModule`] in its layered scope and
//! records, in side tables keyed by arena ids, what each name refers to, the
//! local each binder introduces, how each pattern binds, and the associated
//! form of each operator sequence. The concrete model itself is never
//! mutated.
//!
//! While walking a unit the resolver also collects the units it depends on
//! and a fingerprint of its resolved shape. The fingerprint ignores source
//! positions, so moving a definition does not change it, while editing its
//! text or changing what one of its names resolves to does.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use arend_diagnostic::{Anchor, Diagnostic, ErrorKind};
use arend_ir::{
    is_symbolic, Binder, ConcreteModule, DefBody, DefId, DefIndex, ElemPosition, ExprId, ExprKind,
    Fixity, FunctionBody, LocalId, LongName, ModulePath, NameRef, NamespaceFilter, PatId,
    PatternKind, Precedence, SeqElem, Span,
};
use arend_stack::ensure_sufficient_stack;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

use crate::binop::{reassociate, OpElem, OpTree, Role};
use crate::def_table::{DefTable, ModuleIds};
use crate::scope::{Resolution, Scope, ScopeLevel};
use crate::{GlobalKind, Namespaces, Referable};

/// Where a local binder was introduced.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinderSite {
    /// Parameter of a definition.
    Param(DefIndex, usize),
    /// Parameter of a constructor: data definition, constructor, position.
    CtorParam(DefIndex, usize, usize),
    Lam(ExprId, usize),
    Pi(ExprId, usize),
}

/// What a name pattern turned out to be.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PatternBinding {
    Constructor(DefId),
    Variable(LocalId),
}

/// Resolution results for one module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedModule {
    referents: FxHashMap<ExprId, Referable>,
    patterns: FxHashMap<PatId, PatternBinding>,
    binders: FxHashMap<BinderSite, LocalId>,
    op_trees: FxHashMap<ExprId, OpTree>,
    local_names: FxHashMap<LocalId, String>,
    /// Parameters matched by the clauses of a function.
    matched: FxHashMap<DefIndex, Vec<usize>>,
    implementations: FxHashMap<(DefIndex, usize), DefId>,
    unit_deps: FxHashMap<DefIndex, Vec<DefId>>,
    fingerprints: FxHashMap<DefIndex, u64>,
}

impl ResolvedModule {
    /// Referable a `Ref` expression resolved to.
    pub fn referent(&self, expr: ExprId) -> Option<&Referable> {
        self.referents.get(&expr)
    }

    pub fn pattern(&self, pattern: PatId) -> Option<PatternBinding> {
        self.patterns.get(&pattern).copied()
    }

    pub fn binder(&self, site: BinderSite) -> Option<LocalId> {
        self.binders.get(&site).copied()
    }

    /// Associated form of a `Seq` expression.
    pub fn op_tree(&self, expr: ExprId) -> Option<&OpTree> {
        self.op_trees.get(&expr)
    }

    pub fn local_name(&self, local: LocalId) -> Option<&str> {
        self.local_names.get(&local).map(String::as_str)
    }

    /// Parameter positions the clauses of a function match on, in order.
    pub fn matched_params(&self, def: DefIndex) -> &[usize] {
        self.matched.get(&def).map_or(&[], Vec::as_slice)
    }

    /// Field implemented by the `position`-th implementation of an instance.
    pub fn implementation(&self, def: DefIndex, position: usize) -> Option<DefId> {
        self.implementations.get(&(def, position)).copied()
    }

    /// Units a definition refers to, sorted and deduplicated. Includes the
    /// definition itself when it is recursive.
    pub fn unit_deps(&self, def: DefIndex) -> &[DefId] {
        self.unit_deps.get(&def).map_or(&[], Vec::as_slice)
    }

    pub fn fingerprint(&self, def: DefIndex) -> Option<u64> {
        self.fingerprints.get(&def).copied()
    }
}

/// Global state resolution reads.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub defs: &'a DefTable,
    pub namespaces: &'a Arc<Namespaces>,
    pub prelude: Option<&'a ModulePath>,
    /// Data type that number literals and number patterns belong to.
    pub number_type: Option<DefId>,
}

/// Scope of a module's top level: prelude, imports, opened namespaces and
/// the module's own declarations. Problems with imports and opens are
/// pushed to `diagnostics`.
pub fn module_scope(
    module: &ConcreteModule,
    cx: &ResolveContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Scope {
    let mut qualifiers = Vec::new();
    let mut prelude_level = None;
    if let Some(prelude) = cx.prelude.filter(|prelude| **prelude != module.path) {
        if let Some(exports) = cx.namespaces.module(prelude) {
            prelude_level = Some(Arc::clone(exports));
            qualifiers.push(prelude.clone());
        }
    }

    let mut imported = ScopeLevel::new();
    for import in &module.imports {
        let Some(exports) = cx.namespaces.module(&import.path) else {
            diagnostics.push(
                Diagnostic::error(
                    ErrorKind::UnknownModule,
                    Anchor::new(module.path.clone(), import.span),
                )
                .with_message(format!("module `{}` not found", import.path)),
            );
            continue;
        };
        let origin = import.path.to_string();
        apply_filter(&mut imported, exports, &import.filter, &origin, &module.path, diagnostics);
        qualifiers.push(import.path.clone());
    }
    qualifiers.push(module.path.clone());

    let own = cx.namespaces.module(&module.path).cloned().unwrap_or_default();
    let mut scope = Scope::new(Arc::clone(cx.namespaces), qualifiers);
    if let Some(level) = prelude_level {
        scope.push(level);
    }
    scope.push(Arc::new(imported));

    let mut lookup = scope.clone();
    lookup.push(Arc::clone(&own));
    let mut opened = ScopeLevel::new();
    for open in &module.opens {
        let anchor = Anchor::new(module.path.clone(), open.span);
        let origin = open.target.to_string();
        let namespace = match lookup.resolve(&open.target) {
            Resolution::Resolved(referable) => {
                referable.def_id().and_then(|id| cx.namespaces.def(id)).cloned()
            }
            Resolution::Ambiguous(_) => {
                diagnostics.push(
                    Diagnostic::error(ErrorKind::AmbiguousReference, anchor)
                        .with_message(format!("`{origin}` is ambiguous")),
                );
                continue;
            }
            Resolution::Unresolved => lookup
                .module_path(open.target.segments())
                .and_then(|path| cx.namespaces.module(&path))
                .cloned(),
        };
        match namespace {
            Some(namespace) => {
                apply_filter(&mut opened, &namespace, &open.filter, &origin, &module.path, diagnostics);
            }
            None => diagnostics.push(
                Diagnostic::error(ErrorKind::UnresolvedReference, anchor)
                    .with_message(format!("cannot open `{origin}`: no such namespace")),
            ),
        }
    }
    scope.push(Arc::new(opened));
    scope.push(own);
    scope
}

/// Copy the names of `source` selected by `filter` into `target`.
///
/// `\using` restricts to the listed names, renaming those written with
/// `\as`; `\hiding` removes names. Listing a name `source` does not export
/// is an error.
fn apply_filter(
    target: &mut ScopeLevel,
    source: &ScopeLevel,
    filter: &NamespaceFilter,
    origin: &str,
    module: &ModulePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut not_exported = |name: &str, span: Span| {
        diagnostics.push(
            Diagnostic::error(ErrorKind::UnresolvedReference, Anchor::new(module.clone(), span))
                .with_message(format!("`{name}` is not exported by `{origin}`")),
        );
    };

    let mut hidden = FxHashSet::default();
    for name in &filter.hiding {
        if !source.contains(&name.name) {
            not_exported(&name.name, name.span);
        }
        hidden.insert(name.name.as_str());
    }

    let Some(renamings) = &filter.using else {
        for (name, candidates) in source.iter() {
            if hidden.contains(name) {
                continue;
            }
            for candidate in candidates {
                target.insert(name, candidate.clone());
            }
        }
        return;
    };

    for renaming in renamings {
        let candidates = source.get(&renaming.name);
        if candidates.is_empty() {
            not_exported(&renaming.name, renaming.span);
            continue;
        }
        if hidden.contains(renaming.name.as_str()) {
            continue;
        }
        let visible = renaming.new_name.as_deref().unwrap_or(&renaming.name);
        let renamed = renaming.new_name.is_some() || renaming.precedence.is_some();
        for candidate in candidates {
            let referable = if renamed {
                Referable::alias(candidate.clone(), visible, renaming.precedence)
            } else {
                candidate.clone()
            };
            target.insert(visible, referable);
        }
    }
}

/// Resolve every definition of a module.
#[tracing::instrument(level = "debug", skip_all, fields(module = %module.path))]
pub fn resolve_module(
    module: &ConcreteModule,
    ids: &ModuleIds,
    cx: &ResolveContext<'_>,
) -> (ResolvedModule, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let base = module_scope(module, cx, &mut diagnostics);
    let mut resolver = Resolver {
        module,
        ids,
        cx,
        scope: base.clone(),
        out: ResolvedModule::default(),
        diagnostics,
        unit_id: DefId::new(0),
        deps: FxHashSet::default(),
        hasher: FxHasher::default(),
    };
    for index in module.def_indices() {
        resolver.resolve_def(index, &base);
    }
    tracing::debug!(
        references = resolver.out.referents.len(),
        errors = resolver.diagnostics.len(),
        "resolved module"
    );
    (resolver.out, resolver.diagnostics)
}

struct Resolver<'a> {
    module: &'a ConcreteModule,
    ids: &'a ModuleIds,
    cx: &'a ResolveContext<'a>,
    scope: Scope,
    out: ResolvedModule,
    diagnostics: Vec<Diagnostic>,
    /// Unit being resolved.
    unit_id: DefId,
    deps: FxHashSet<DefId>,
    hasher: FxHasher,
}

impl Resolver<'_> {
    fn mark(&mut self, value: impl Hash) {
        value.hash(&mut self.hasher);
    }

    fn error(&mut self, kind: ErrorKind, span: Span, message: String) {
        let anchor = Anchor::new(self.module.path.clone(), span).in_definition(self.unit_id);
        self.diagnostics
            .push(Diagnostic::error(kind, anchor).with_message(message));
    }

    fn depend_on(&mut self, id: DefId) {
        let unit = self.cx.defs.unit_of(id);
        self.deps.insert(unit);
    }

    fn resolve_def(&mut self, index: DefIndex, base: &Scope) {
        let module = self.module;
        let def = module.def(index);
        self.unit_id = self.ids.def(index);
        self.deps.clear();
        self.hasher = FxHasher::default();

        self.scope = base.clone();
        for &enclosing in module.enclosing(index).iter().rev() {
            if let Some(level) = self.cx.namespaces.def(self.ids.def(enclosing)) {
                self.scope.push(Arc::clone(level));
            }
        }
        let outer = self.scope.depth();

        self.mark((def.kind().keyword(), &def.name, def.precedence, def.erroneous));
        if let Some(alias) = &def.alias {
            self.mark((&alias.name, alias.precedence));
        }
        self.bind_telescope(&def.params, |i| BinderSite::Param(index, i));
        if let Some(result) = def.result {
            self.mark("result");
            self.resolve_expr(result);
        }

        match &def.body {
            DefBody::Function(FunctionBody::Term(body)) => {
                self.mark("term");
                self.resolve_expr(*body);
            }
            DefBody::Function(FunctionBody::Clauses { elim, clauses }) => {
                let matched = self.matched_params(index, elim.as_deref());
                self.mark(("clauses", &matched));
                self.scope.truncate(outer);
                for (position, binder) in def.params.iter().enumerate() {
                    if matched.contains(&position) || binder.is_anonymous() {
                        continue;
                    }
                    if let Some(local) = self.out.binder(BinderSite::Param(index, position)) {
                        self.scope.push_local(binder.name.clone(), Referable::Local(local));
                    }
                }
                self.out.matched.insert(index, matched);
                for clause in clauses {
                    let depth = self.scope.depth();
                    let mut vars = ScopeLevel::new();
                    self.mark(("clause", clause.patterns.len()));
                    for &pattern in &clause.patterns {
                        self.resolve_pattern(pattern, &mut vars);
                    }
                    self.scope.push(Arc::new(vars));
                    self.resolve_expr(clause.rhs);
                    self.scope.truncate(depth);
                }
            }
            DefBody::Data { constructors } => {
                for (ctor, decl) in constructors.iter().enumerate() {
                    self.mark(("ctor", &decl.name, decl.precedence));
                    let depth = self.scope.depth();
                    self.bind_telescope(&decl.params, |i| BinderSite::CtorParam(index, ctor, i));
                    self.scope.truncate(depth);
                }
            }
            DefBody::Class { fields } => {
                for field in fields {
                    self.mark(("field", &field.name, field.precedence));
                    self.resolve_expr(field.ty);
                }
            }
            DefBody::Instance { implementations } => {
                let class = def.result.and_then(|result| self.head_class(result));
                for (position, implementation) in implementations.iter().enumerate() {
                    self.mark(("impl", &implementation.name));
                    match class.and_then(|class| self.field_of(class, &implementation.name)) {
                        Some(field) => {
                            self.out.implementations.insert((index, position), field);
                        }
                        None => self.error(
                            ErrorKind::UnresolvedReference,
                            implementation.span,
                            format!("`{}` is not a field of the instantiated class", implementation.name),
                        ),
                    }
                    self.resolve_expr(implementation.value);
                }
            }
            DefBody::Meta { body } => {
                self.mark("meta");
                self.resolve_expr(*body);
            }
        }
        self.scope.truncate(outer);

        let mut deps: Vec<DefId> = self.deps.drain().collect();
        deps.sort_unstable();
        self.out.unit_deps.insert(index, deps);
        self.out.fingerprints.insert(index, self.hasher.finish());
    }

    /// Parameter positions the clauses match: the `\elim` list, or every
    /// explicit parameter.
    fn matched_params(&mut self, index: DefIndex, elim: Option<&[NameRef]>) -> Vec<usize> {
        let module = self.module;
        let params = &module.def(index).params;
        let Some(names) = elim else {
            return params
                .iter()
                .enumerate()
                .filter(|(_, binder)| binder.explicit)
                .map(|(position, _)| position)
                .collect();
        };
        let mut matched = Vec::with_capacity(names.len());
        for name in names {
            match params
                .iter()
                .position(|binder| !binder.is_anonymous() && binder.name == name.name)
            {
                Some(position) => matched.push(position),
                None => self.error(
                    ErrorKind::UnresolvedReference,
                    name.span,
                    format!("`{}` is not a parameter", name.name),
                ),
            }
        }
        matched
    }

    fn bind_telescope(&mut self, binders: &[Binder], site: impl Fn(usize) -> BinderSite) {
        let mut last_ty = None;
        for (position, binder) in binders.iter().enumerate() {
            if let Some(ty) = binder.ty {
                // A group `(x y : A)` shares one type, resolved before any of
                // its names is bound.
                if last_ty != Some(ty) {
                    self.resolve_expr(ty);
                    last_ty = Some(ty);
                }
            }
            self.bind(binder, site(position));
        }
    }

    fn bind(&mut self, binder: &Binder, site: BinderSite) -> LocalId {
        let local = LocalId::fresh();
        self.mark(("bind", &binder.name, binder.explicit, binder.ty.is_some()));
        self.out.binders.insert(site, local);
        if !binder.is_anonymous() {
            self.out.local_names.insert(local, binder.name.clone());
            self.scope.push_local(binder.name.clone(), Referable::Local(local));
        }
        local
    }

    fn resolve_pattern(&mut self, pattern: PatId, vars: &mut ScopeLevel) {
        let module = self.module;
        let node = module.pattern(pattern);
        match &node.kind {
            PatternKind::Name { name, args } => {
                if let Some(ctor) = self.constructor(name, node.span) {
                    self.mark(("ctor-pattern", ctor.raw(), args.len()));
                    self.depend_on(ctor);
                    self.out.patterns.insert(pattern, PatternBinding::Constructor(ctor));
                    for &arg in args {
                        self.resolve_pattern(arg, vars);
                    }
                    return;
                }
                if name.is_qualified() || !args.is_empty() {
                    self.error(
                        ErrorKind::UnresolvedReference,
                        node.span,
                        format!("`{name}` is not a constructor"),
                    );
                    self.mark(("bad-pattern", name.to_string()));
                    for &arg in args {
                        self.resolve_pattern(arg, vars);
                    }
                    return;
                }
                let local = LocalId::fresh();
                self.mark(("var-pattern", name.last()));
                // The first binding stays in scope; the body sees only that one.
                if vars.contains(name.last()) {
                    self.error(
                        ErrorKind::NameClash,
                        node.span,
                        format!("pattern variable `{name}` is bound twice"),
                    );
                } else {
                    vars.insert(name.last(), Referable::Local(local));
                }
                self.out.local_names.insert(local, name.last().to_string());
                self.out.patterns.insert(pattern, PatternBinding::Variable(local));
            }
            PatternKind::Number(value) => {
                self.mark(("number-pattern", value));
                if let Some(nat) = self.cx.number_type {
                    self.depend_on(nat);
                }
            }
            PatternKind::Wildcard => self.mark("wildcard"),
            PatternKind::Error => self.mark("error-pattern"),
        }
    }

    /// Constructor a pattern name denotes, if any.
    fn constructor(&mut self, name: &LongName, span: Span) -> Option<DefId> {
        let is_ctor = |referable: &Referable| {
            referable
                .def_id()
                .filter(|&id| self.cx.defs.get(id).is_some_and(|info| info.kind == GlobalKind::Constructor))
        };
        match self.scope.resolve(name) {
            Resolution::Resolved(referable) => is_ctor(&referable),
            Resolution::Ambiguous(candidates) => {
                let ctors: Vec<DefId> = candidates.iter().filter_map(is_ctor).collect();
                let first = ctors.first().copied();
                if first.is_some() {
                    self.error(
                        ErrorKind::AmbiguousReference,
                        span,
                        format!("`{name}` is ambiguous"),
                    );
                }
                first
            }
            Resolution::Unresolved => None,
        }
    }

    /// Class at the head of an instance's result type.
    fn head_class(&self, result: ExprId) -> Option<DefId> {
        let module = self.module;
        let head = match &module.expr(result).kind {
            ExprKind::Seq(elems) => elems.first()?.expr,
            _ => result,
        };
        let id = self.out.referent(head)?.def_id()?;
        (self.cx.defs.get(id)?.kind == GlobalKind::Class).then_some(id)
    }

    fn field_of(&self, class: DefId, name: &str) -> Option<DefId> {
        let namespace = self.cx.namespaces.def(class)?;
        namespace.get(name).iter().find_map(|candidate| {
            let id = candidate.def_id()?;
            let info = self.cx.defs.get(id)?;
            (info.kind == GlobalKind::Field && info.owner == Some(class)).then_some(id)
        })
    }

    fn resolve_expr(&mut self, id: ExprId) {
        ensure_sufficient_stack(|| self.resolve_expr_inner(id));
    }

    fn resolve_expr_inner(&mut self, id: ExprId) {
        let module = self.module;
        let expr = module.expr(id);
        match &expr.kind {
            ExprKind::Ref(name) => self.resolve_ref(id, name, expr.span),
            ExprKind::Number(value) => {
                self.mark(("number", value));
                if let Some(nat) = self.cx.number_type {
                    self.depend_on(nat);
                }
            }
            ExprKind::Universe => self.mark("universe"),
            ExprKind::Hole => self.mark("hole"),
            ExprKind::Error => self.mark("error"),
            ExprKind::Seq(elems) => self.resolve_seq(id, elems),
            ExprKind::Lam { params, body } => {
                self.mark(("lam", params.len()));
                let depth = self.scope.depth();
                self.bind_telescope(params, |i| BinderSite::Lam(id, i));
                self.resolve_expr(*body);
                self.scope.truncate(depth);
            }
            ExprKind::Pi { params, codomain } => {
                self.mark(("pi", params.len()));
                let depth = self.scope.depth();
                self.bind_telescope(params, |i| BinderSite::Pi(id, i));
                self.resolve_expr(*codomain);
                self.scope.truncate(depth);
            }
            ExprKind::Arrow { domain, codomain } => {
                self.mark("arrow");
                self.resolve_expr(*domain);
                self.resolve_expr(*codomain);
            }
        }
    }

    fn resolve_ref(&mut self, id: ExprId, name: &LongName, span: Span) {
        let referable = match self.scope.resolve(name) {
            Resolution::Resolved(referable) => referable,
            Resolution::Ambiguous(candidates) => {
                let names: Vec<String> = candidates
                    .iter()
                    .map(|candidate| self.describe(candidate))
                    .collect();
                self.error(
                    ErrorKind::AmbiguousReference,
                    span,
                    format!("`{name}` is ambiguous: it may refer to {}", names.join(", ")),
                );
                let raw: Vec<u32> = candidates.iter().map(|c| c.sort_key().1).collect();
                self.mark(("ambiguous", raw));
                let Some(first) = candidates.into_iter().next() else {
                    return;
                };
                first
            }
            Resolution::Unresolved => {
                self.error(
                    ErrorKind::UnresolvedReference,
                    span,
                    format!("cannot resolve `{name}`"),
                );
                self.mark(("unresolved", name.to_string()));
                return;
            }
        };
        match referable.underlying() {
            Referable::Local(local) => {
                let local_name = self.out.local_name(*local).unwrap_or("_").to_string();
                self.mark(("local", local_name));
            }
            other => {
                if let Some(def) = other.def_id() {
                    self.mark(("global", def.raw()));
                    self.depend_on(def);
                }
            }
        }
        self.out.referents.insert(id, referable);
    }

    /// `module.name` of a candidate, for messages.
    fn describe(&self, referable: &Referable) -> String {
        match referable.def_id().and_then(|id| self.cx.defs.get(id)) {
            Some(info) => format!("`{}.{}`", info.module, info.long_name),
            None => "a local binding".to_string(),
        }
    }

    fn resolve_seq(&mut self, id: ExprId, elems: &[SeqElem]) {
        self.mark(("seq", elems.len()));
        for elem in elems {
            self.mark((elem.explicit, elem.position == ElemPosition::Operand));
            self.resolve_expr(elem.expr);
        }
        let module = self.module;
        let op_elems: Vec<OpElem> = elems
            .iter()
            .map(|elem| OpElem {
                expr: elem.expr,
                span: module.expr(elem.expr).span,
                role: self.classify(elem),
            })
            .collect();
        let text = |expr: ExprId| element_text(module, expr);
        let (tree, errors) = reassociate(&op_elems, &text);
        for error in errors {
            self.error(ErrorKind::OperatorParseError, error.span, error.message);
        }
        self.mark(tree.render(&text));
        self.out.op_trees.insert(id, tree);
    }

    /// Role of a sequence element, from its position and resolved fixity.
    fn classify(&mut self, elem: &SeqElem) -> Role {
        let operand = Role::Operand {
            explicit: elem.explicit,
        };
        if !elem.explicit || elem.position == ElemPosition::Operand {
            return operand;
        }
        let module = self.module;
        let node = module.expr(elem.expr);
        let ExprKind::Ref(name) = &node.kind else {
            return operand;
        };
        let Some(referable) = self.out.referent(elem.expr) else {
            return operand;
        };
        let precedence = self.cx.defs.precedence_of(referable);
        match elem.position {
            ElemPosition::Infix => match precedence.as_infix() {
                Some(infix) => Role::Infix(infix),
                None => {
                    self.no_fixity(name.last(), node.span);
                    operand
                }
            },
            ElemPosition::Postfix => {
                if precedence.is_nonfix() {
                    self.no_fixity(name.last(), node.span);
                    operand
                } else {
                    Role::Postfix(Precedence::postfix(precedence.priority))
                }
            }
            ElemPosition::Natural => match precedence.fixity {
                Fixity::Infix => Role::Infix(precedence),
                Fixity::Postfix => Role::Postfix(precedence),
                Fixity::Prefix => Role::Prefix,
                Fixity::Nonfix => {
                    if is_symbolic(name.last()) {
                        self.no_fixity(name.last(), node.span);
                    }
                    operand
                }
            },
            ElemPosition::Operand => operand,
        }
    }

    fn no_fixity(&mut self, name: &str, span: Span) {
        self.error(
            ErrorKind::OperatorParseError,
            span,
            format!("operator has no fixity declared for infix use: `{name}`"),
        );
    }
}

/// Text of a sequence element for messages and op-tree rendering.
fn element_text(module: &ConcreteModule, expr: ExprId) -> String {
    match &module.expr(expr).kind {
        ExprKind::Ref(name) => name.to_string(),
        ExprKind::Number(value) => value.to_string(),
        ExprKind::Universe => "\\Type".to_string(),
        _ => "_".to_string(),
    }
}

#[cfg(test)]
mod tests;
