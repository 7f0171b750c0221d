//! The typecheck driver.
//!
//! A [`Checker`] typechecks the units of a set of modules. Each pass takes a
//! workspace snapshot, orders the units into strongly connected components
//! (dependencies first) and walks them: a component whose cache entries are
//! all valid is skipped and its cached diagnostics are replayed, unless it
//! holds the focus. Any other component is checked and committed as a whole.
//! Rechecking unchanged inputs reproduces the same stamp.
//!
//! Edits do not cancel a run. Before committing, the checker compares the
//! component's inputs with a fresh snapshot; if they moved, nothing is
//! committed and the pass starts over on the new snapshot, up to
//! [`CheckOptions::max_passes`] times.

use std::cell::RefCell;
use std::sync::Arc;

use arend_diagnostic::{Diagnostic, ErrorKind, ErrorSink};
use arend_ir::{DefBody, DefId, ModulePath};
use arend_resolve::Workspace;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::cache::{Cache, CacheEntry, EntryStatus, Stamp};
use crate::cancel::{CancellationToken, Cancelled, ProgressSink};
use crate::definition::{CoreBody, CoreDef, RecursionStatus};
use crate::elaborate::DefChecker;
use crate::eval::Globals;
use crate::order::components_with_focus;

/// Hands out the current workspace.
pub trait SnapshotSource: Sync {
    fn snapshot(&self) -> Arc<Workspace>;
}

impl SnapshotSource for RwLock<Arc<Workspace>> {
    fn snapshot(&self) -> Arc<Workspace> {
        self.read().clone()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CheckOptions {
    /// Unfolding steps allowed per definition.
    pub fuel: u32,
    /// Passes before a run that keeps seeing edits gives up.
    pub max_passes: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            fuel: 10_000,
            max_passes: 3,
        }
    }
}

impl CheckOptions {
    #[must_use]
    pub fn with_fuel(mut self, fuel: u32) -> Self {
        self.fuel = fuel;
        self
    }

    #[must_use]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}

/// What a run did.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug)]
pub struct CheckSummary {
    /// Units checked in the final pass.
    pub checked: usize,
    /// Units whose valid entries were reused in the final pass.
    pub reused: usize,
    /// Checked units that did not typecheck.
    pub failed: usize,
    pub passes: usize,
    /// The last pass still saw edits and committed only part of its work.
    pub stale: bool,
}

enum PassOutcome {
    Complete,
    Stale,
}

/// Typechecks the units of a set of modules against the shared cache.
pub struct Checker<'a> {
    source: &'a dyn SnapshotSource,
    cache: &'a Cache,
    options: CheckOptions,
    modules: Vec<ModulePath>,
}

impl<'a> Checker<'a> {
    pub fn new(source: &'a dyn SnapshotSource, cache: &'a Cache, modules: Vec<ModulePath>) -> Self {
        Checker {
            source,
            cache,
            options: CheckOptions::default(),
            modules,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn modules(&self) -> &[ModulePath] {
        &self.modules
    }

    /// Typecheck every unit of the modules, `focus` and its dependencies
    /// first. The component of `focus` is checked even when its entries are
    /// valid. Diagnostics go to `sink` once the run ends, including a
    /// cancelled one; entries committed before a cancellation stay.
    #[tracing::instrument(level = "debug", skip_all, fields(modules = self.modules.len()))]
    pub fn typecheck(
        &self,
        focus: Option<DefId>,
        sink: &mut dyn ErrorSink,
        cancel: &CancellationToken,
        progress: &mut dyn ProgressSink,
    ) -> Result<CheckSummary, Cancelled> {
        let max_passes = self.options.max_passes.max(1);
        let mut summary = CheckSummary::default();
        for pass in 1..=max_passes {
            summary = CheckSummary {
                passes: pass,
                ..CheckSummary::default()
            };
            let mut buffer = Vec::new();
            match self.run_pass(focus, &mut buffer, cancel, progress, &mut summary) {
                Ok(PassOutcome::Complete) => {
                    flush(sink, buffer);
                    return Ok(summary);
                }
                Ok(PassOutcome::Stale) => {
                    tracing::debug!(pass, "inputs changed during the pass");
                    summary.stale = true;
                    if pass == max_passes {
                        flush(sink, buffer);
                    }
                }
                Err(cancelled) => {
                    tracing::debug!(pass, "cancelled");
                    flush(sink, buffer);
                    return Err(cancelled);
                }
            }
        }
        Ok(summary)
    }

    fn run_pass(
        &self,
        focus: Option<DefId>,
        buffer: &mut Vec<Diagnostic>,
        cancel: &CancellationToken,
        progress: &mut dyn ProgressSink,
        summary: &mut CheckSummary,
    ) -> Result<PassOutcome, Cancelled> {
        let workspace = self.source.snapshot();
        let targets = workspace.units_of(&self.modules);
        let focus = focus.map(|focus| workspace.unit_of(focus));
        let components =
            components_with_focus(&targets, focus, |unit| live_deps(&workspace, unit));
        let total = components.len();
        let mut memo = FxHashMap::default();
        for (done, component) in components.iter().enumerate() {
            cancel.check()?;
            let requested = focus.is_some_and(|focus| component.contains(&focus));
            let valid = !requested
                && component
                    .iter()
                    .all(|unit| self.cache.is_valid(*unit, &workspace, &mut memo));
            if valid {
                summary.reused += component.len();
                self.replay(component, &workspace, buffer);
            } else {
                let entries =
                    check_component(&workspace, self.cache, component, self.options, cancel)?;
                if self.is_stale(&workspace, &entries) {
                    return Ok(PassOutcome::Stale);
                }
                summary.checked += entries.len();
                summary.failed += entries.iter().filter(|entry| !entry.status.is_ok()).count();
                for entry in &entries {
                    buffer.extend(entry.diagnostics.iter().cloned());
                }
                self.cache.commit(entries);
                for unit in component {
                    memo.insert(*unit, true);
                }
            }
            progress.report(done + 1, total);
        }
        Ok(PassOutcome::Complete)
    }

    /// Whether the inputs of freshly checked entries changed since
    /// `workspace` was taken.
    fn is_stale(&self, workspace: &Arc<Workspace>, entries: &[CacheEntry]) -> bool {
        let fresh = self.source.snapshot();
        if Arc::ptr_eq(&fresh, workspace) {
            return false;
        }
        let moved = |unit: DefId| {
            !fresh.defs().is_live(unit) || fresh.version(unit) != workspace.version(unit)
        };
        entries.iter().any(|entry| {
            moved(entry.unit) || entry.deps.iter().any(|(dep, _)| moved(*dep))
        })
    }

    /// Send the cached diagnostics of a valid component, moved to where its
    /// definitions are now.
    fn replay(&self, component: &[DefId], workspace: &Workspace, buffer: &mut Vec<Diagnostic>) {
        for unit in component {
            let Some(entry) = self.cache.entry(*unit) else {
                continue;
            };
            let Some((module, index)) = workspace.concrete_def(*unit) else {
                continue;
            };
            let start = module.concrete.def(index).span.start;
            let delta = i64::from(start) - i64::from(entry.def_start);
            for diagnostic in &entry.diagnostics {
                if diagnostic.anchor.module == module.concrete.path {
                    buffer.push(diagnostic.clone().shifted(delta));
                } else {
                    buffer.push(diagnostic.clone());
                }
            }
        }
    }
}

fn flush(sink: &mut dyn ErrorSink, buffer: Vec<Diagnostic>) {
    for diagnostic in buffer {
        sink.report(diagnostic);
    }
}

/// Live units `unit` depends on.
fn live_deps(workspace: &Workspace, unit: DefId) -> Vec<DefId> {
    workspace
        .unit_deps(unit)
        .iter()
        .copied()
        .filter(|dep| workspace.defs().is_live(*dep))
        .collect()
}

/// Core definitions visible while checking one component: what members
/// have published so far, then the cache for everything outside.
pub(crate) struct Env<'a> {
    workspace: &'a Workspace,
    cache: &'a Cache,
    component: &'a [DefId],
    pending: RefCell<FxHashMap<DefId, Arc<CoreDef>>>,
    /// Published definitions in publication order, latest version of each.
    published: RefCell<Vec<Arc<CoreDef>>>,
}

impl<'a> Env<'a> {
    fn new(workspace: &'a Workspace, cache: &'a Cache, component: &'a [DefId]) -> Self {
        Env {
            workspace,
            cache,
            component,
            pending: RefCell::default(),
            published: RefCell::default(),
        }
    }

    pub(crate) fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    pub(crate) fn publish(&self, def: CoreDef) {
        tracing::trace!(def = %def.name, "publish");
        let def = Arc::new(def);
        self.pending.borrow_mut().insert(def.id, def.clone());
        let mut published = self.published.borrow_mut();
        match published.iter_mut().find(|old| old.id == def.id) {
            Some(old) => *old = def,
            None => published.push(def),
        }
    }

    fn published_by(&self, unit: DefId) -> Vec<Arc<CoreDef>> {
        self.published
            .borrow()
            .iter()
            .filter(|def| self.workspace.unit_of(def.id) == unit)
            .cloned()
            .collect()
    }
}

impl Globals for Env<'_> {
    fn definition(&self, id: DefId) -> Option<Arc<CoreDef>> {
        if let Some(def) = self.pending.borrow().get(&id) {
            return Some(def.clone());
        }
        let unit = self.workspace.unit_of(id);
        if self.component.contains(&unit) {
            return None;
        }
        self.cache.definition(unit, id)
    }
}

struct Member<'a> {
    unit: DefId,
    checker: DefChecker<'a>,
    /// Failed before elaboration: broken syntax or unresolved names, which
    /// were reported by parsing and resolution.
    pre_failed: bool,
}

impl Member<'_> {
    fn failed(&self) -> bool {
        self.pre_failed || self.checker.has_errors()
    }

    fn status(&self) -> EntryStatus {
        match self.checker.propagated() {
            Some(culprit) => EntryStatus::PropagatedFailure { culprit },
            None => EntryStatus::Failed,
        }
    }
}

/// Check one component: every signature, then every body. Returns one
/// entry per member, all with the same stamp.
#[tracing::instrument(level = "debug", skip_all, fields(members = component.len()))]
fn check_component(
    workspace: &Workspace,
    cache: &Cache,
    component: &[DefId],
    options: CheckOptions,
    cancel: &CancellationToken,
) -> Result<Vec<CacheEntry>, Cancelled> {
    let env = Env::new(workspace, cache, component);
    let status = match component {
        [unit] if workspace.unit_deps(*unit).contains(unit) => RecursionStatus::SelfRecursive,
        [_] => RecursionStatus::NonRecursive,
        _ => RecursionStatus::Mutual(component.to_vec()),
    };
    let large = component.len() > 1;

    let mut members = Vec::with_capacity(component.len());
    for unit in component {
        let Some((module, index)) = workspace.concrete_def(*unit) else {
            continue;
        };
        let def = module.concrete.def(index);
        let mut checker =
            DefChecker::new(&env, module, index, component, status.clone(), options.fuel);
        let pre_failed = def.erroneous
            || module.resolve_diagnostics.iter().any(|diagnostic| {
                diagnostic.is_error() && diagnostic.anchor.definition == Some(*unit)
            });
        let no_cycles = matches!(def.body, DefBody::Meta { .. } | DefBody::Instance { .. });
        if no_cycles && status.is_recursive() {
            let what = if matches!(def.body, DefBody::Meta { .. }) { "meta" } else { "instance" };
            let message =
                format!("{what} `{}` cannot take part in a dependency cycle", def.name);
            checker.fail(ErrorKind::CyclicDependency, message);
        }
        members.push(Member {
            unit: *unit,
            checker,
            pre_failed,
        });
    }

    for member in &mut members {
        if large {
            cancel.check()?;
        }
        if !member.failed() {
            member.checker.signature();
        }
    }
    if !members.iter().any(Member::failed) {
        for member in &mut members {
            if large {
                cancel.check()?;
            }
            member.checker.body();
        }
    }

    let culprit = members.iter().find(|member| member.failed()).map(|member| member.unit);
    let deps = external_deps(workspace, cache, component);
    let versions: Vec<_> = component
        .iter()
        .map(|unit| (*unit, workspace.version(*unit)))
        .collect();
    let stamp = Stamp::compute(&versions, &deps);

    let mut entries = Vec::with_capacity(members.len());
    for member in members {
        let unit = member.unit;
        let status = match culprit {
            None => EntryStatus::Ok,
            Some(culprit) if culprit == unit => member.status(),
            Some(culprit) => EntryStatus::PropagatedFailure { culprit },
        };
        let mut checker = member.checker;
        if let (Some(culprit), true) = (culprit, large) {
            if culprit != unit {
                let message = format!(
                    "`{}` was not checked because `{}` in the same recursive group failed",
                    name_of(workspace, unit),
                    name_of(workspace, culprit)
                );
                checker.fail(ErrorKind::PropagatedFailure, message);
            }
        }
        let diagnostics = checker.finish();
        let mut defs = env.published_by(unit);
        if !status.is_ok() {
            defs = defs.into_iter().map(signature_only).collect();
        }
        let def_start = workspace
            .concrete_def(unit)
            .map_or(0, |(module, index)| module.concrete.def(index).span.start);
        tracing::debug!(?unit, ?status, "checked");
        entries.push(CacheEntry {
            unit,
            version: workspace.version(unit),
            stamp,
            component: component.to_vec(),
            deps: deps.clone(),
            status,
            defs,
            diagnostics,
            def_start,
        });
    }
    Ok(entries)
}

/// Units outside the component that its members use, with their current
/// stamps.
fn external_deps(workspace: &Workspace, cache: &Cache, component: &[DefId]) -> Vec<(DefId, Stamp)> {
    let mut deps: Vec<DefId> = component
        .iter()
        .flat_map(|unit| live_deps(workspace, *unit))
        .filter(|dep| !component.contains(dep))
        .collect();
    deps.sort_unstable();
    deps.dedup();
    deps.into_iter()
        .map(|dep| (dep, cache.stamp(dep).unwrap_or(Stamp::MISSING)))
        .collect()
}

/// Drop what a failed unit must not expose: bodies that may not reduce.
fn signature_only(def: Arc<CoreDef>) -> Arc<CoreDef> {
    let has_body = matches!(
        def.body,
        CoreBody::Function(_) | CoreBody::Clauses(_) | CoreBody::Instance { .. }
    );
    if has_body {
        Arc::new(CoreDef {
            body: CoreBody::Opaque,
            ..(*def).clone()
        })
    } else {
        def
    }
}

fn name_of(workspace: &Workspace, id: DefId) -> String {
    workspace
        .def_info(id)
        .map_or_else(|| format!("#{}", id.raw()), |info| info.long_name.to_string())
}

#[cfg(test)]
mod tests;
