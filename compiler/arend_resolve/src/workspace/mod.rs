//! Resolved snapshot of every known module.
//!
//! A [`Workspace`] owns the definition table, the namespaces of all modules
//! and each module's resolution. Updating a module re-registers its
//! definitions, rebuilds the namespaces and re-resolves the module together
//! with every module that (transitively) imports it; when the prelude
//! changes, every module is re-resolved. Unit versions move only for units
//! whose fingerprint actually changed.
//!
//! The server keeps the current workspace behind an `Arc` and replaces it
//! wholesale on every edit, so readers always see a consistent snapshot.

use std::sync::Arc;

use arend_diagnostic::Diagnostic;
use arend_ir::{ConcreteModule, DefId, DefIndex, LongName, ModulePath};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::def_table::{DefInfo, DefTable, ModuleIds, Version};
use crate::resolver::{module_scope, resolve_module, ResolveContext, ResolvedModule};
use crate::{Namespaces, Scope};

/// One module: its concrete model, ids and resolution.
#[derive(Debug)]
pub struct ModuleUnit {
    pub concrete: Arc<ConcreteModule>,
    pub ids: ModuleIds,
    pub resolved: Arc<ResolvedModule>,
    pub parse_diagnostics: Vec<Diagnostic>,
    pub resolve_diagnostics: Vec<Diagnostic>,
}

/// Definitions of the prelude the typechecker builds numbers from.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PreludeIds {
    pub nat: DefId,
    pub zero: DefId,
    pub suc: DefId,
}

#[derive(Clone, Debug, Default)]
pub struct Workspace {
    modules: FxHashMap<ModulePath, Arc<ModuleUnit>>,
    defs: DefTable,
    namespaces: Arc<Namespaces>,
    prelude: Option<ModulePath>,
}

impl Workspace {
    /// Empty workspace; names exported by `prelude` are visible everywhere
    /// once that module is added.
    pub fn new(prelude: Option<ModulePath>) -> Self {
        Workspace {
            prelude,
            ..Workspace::default()
        }
    }

    /// Replace (or add) a module. Returns the units whose version changed.
    #[tracing::instrument(level = "debug", skip_all, fields(module = %concrete.path))]
    pub fn update_module(
        &mut self,
        concrete: ConcreteModule,
        parse_diagnostics: Vec<Diagnostic>,
    ) -> Vec<DefId> {
        let since = self.defs.clock();
        let path = concrete.path.clone();
        let ids = self.defs.register_module(&concrete);
        self.modules.insert(
            path.clone(),
            Arc::new(ModuleUnit {
                concrete: Arc::new(concrete),
                ids,
                resolved: Arc::default(),
                parse_diagnostics,
                resolve_diagnostics: Vec::new(),
            }),
        );
        self.refresh(&path);
        self.defs.changed_since(since)
    }

    /// Forget a module. Its definitions die and its importers are
    /// re-resolved. Returns the units whose version changed.
    pub fn remove_module(&mut self, path: &ModulePath) -> Vec<DefId> {
        if self.modules.remove(path).is_none() {
            return Vec::new();
        }
        let since = self.defs.clock();
        self.defs.remove_module(path);
        self.refresh(path);
        self.defs.changed_since(since)
    }

    /// Rebuild namespaces and re-resolve everything affected by `changed`.
    fn refresh(&mut self, changed: &ModulePath) {
        let mut paths: Vec<&ModulePath> = self.modules.keys().collect();
        paths.sort();
        self.namespaces = Arc::new(Namespaces::build(
            paths.iter().map(|path| {
                let unit = &self.modules[*path];
                (&*unit.concrete, &unit.ids)
            }),
            &self.defs,
        ));

        let affected = self.affected_by(changed);
        tracing::debug!(modules = affected.len(), "re-resolving");
        let prelude_ids = self.prelude_ids();
        let mut fingerprints = Vec::new();
        let mut resolved_units = Vec::with_capacity(affected.len());
        for path in &affected {
            let Some(unit) = self.modules.get(path) else {
                continue;
            };
            let cx = ResolveContext {
                defs: &self.defs,
                namespaces: &self.namespaces,
                prelude: self.prelude.as_ref(),
                number_type: prelude_ids.map(|ids| ids.nat),
            };
            let (resolved, diagnostics) = resolve_module(&unit.concrete, &unit.ids, &cx);
            for index in unit.concrete.def_indices() {
                if let Some(fingerprint) = resolved.fingerprint(index) {
                    fingerprints.push((unit.ids.def(index), fingerprint));
                }
            }
            resolved_units.push((
                path.clone(),
                ModuleUnit {
                    concrete: Arc::clone(&unit.concrete),
                    ids: unit.ids.clone(),
                    resolved: Arc::new(resolved),
                    parse_diagnostics: unit.parse_diagnostics.clone(),
                    resolve_diagnostics: diagnostics,
                },
            ));
        }
        for (path, unit) in resolved_units {
            self.modules.insert(path, Arc::new(unit));
        }
        for (unit, fingerprint) in fingerprints {
            if self.defs.record_fingerprint(unit, fingerprint) {
                tracing::trace!(?unit, "unit changed");
            }
        }
    }

    /// `changed` and its transitive importers, or every module when the
    /// prelude changed. Sorted.
    fn affected_by(&self, changed: &ModulePath) -> Vec<ModulePath> {
        let mut affected: FxHashSet<ModulePath> = FxHashSet::default();
        if self.prelude.as_ref() == Some(changed) {
            affected.extend(self.modules.keys().cloned());
        } else {
            affected.insert(changed.clone());
            loop {
                let importers: Vec<ModulePath> = self
                    .modules
                    .iter()
                    .filter(|(path, _)| !affected.contains(*path))
                    .filter(|(_, unit)| {
                        unit.concrete
                            .imports
                            .iter()
                            .any(|import| affected.contains(&import.path))
                    })
                    .map(|(path, _)| path.clone())
                    .collect();
                if importers.is_empty() {
                    break;
                }
                affected.extend(importers);
            }
        }
        let mut affected: Vec<ModulePath> = affected.into_iter().collect();
        affected.sort();
        affected
    }

    pub fn module(&self, path: &ModulePath) -> Option<&Arc<ModuleUnit>> {
        self.modules.get(path)
    }

    /// Known module paths, sorted.
    pub fn module_paths(&self) -> Vec<ModulePath> {
        let mut paths: Vec<ModulePath> = self.modules.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn defs(&self) -> &DefTable {
        &self.defs
    }

    pub fn def_info(&self, id: DefId) -> Option<&DefInfo> {
        self.defs.get(id)
    }

    pub fn unit_of(&self, id: DefId) -> DefId {
        self.defs.unit_of(id)
    }

    pub fn version(&self, id: DefId) -> Version {
        self.defs.version(id)
    }

    pub fn namespaces(&self) -> &Arc<Namespaces> {
        &self.namespaces
    }

    pub fn prelude(&self) -> Option<&ModulePath> {
        self.prelude.as_ref()
    }

    /// Module and index of a live definition; members map to their owner.
    pub fn concrete_def(&self, id: DefId) -> Option<(&Arc<ModuleUnit>, DefIndex)> {
        let info = self.defs.get(id).filter(|info| info.live)?;
        let unit = self.modules.get(&info.module)?;
        Some((unit, info.location.index))
    }

    /// Units the unit of `id` refers to.
    pub fn unit_deps(&self, id: DefId) -> &[DefId] {
        match self.concrete_def(self.defs.unit_of(id)) {
            Some((unit, index)) => unit.resolved.unit_deps(index),
            None => &[],
        }
    }

    pub fn lookup(&self, module: &ModulePath, name: &LongName) -> Option<DefId> {
        self.defs.lookup(module, name)
    }

    /// `Nat`, `zero` and `suc` of the prelude, once it is loaded.
    pub fn prelude_ids(&self) -> Option<PreludeIds> {
        let prelude = self.prelude.as_ref()?;
        Some(PreludeIds {
            nat: self.lookup(prelude, &LongName::short("Nat"))?,
            zero: self.lookup(prelude, &LongName::parse("Nat.zero"))?,
            suc: self.lookup(prelude, &LongName::parse("Nat.suc"))?,
        })
    }

    /// Top-level scope of a module, for resolving names from outside.
    pub fn module_scope(&self, path: &ModulePath) -> Option<Scope> {
        let unit = self.modules.get(path)?;
        let prelude_ids = self.prelude_ids();
        let cx = ResolveContext {
            defs: &self.defs,
            namespaces: &self.namespaces,
            prelude: self.prelude.as_ref(),
            number_type: prelude_ids.map(|ids| ids.nat),
        };
        let mut ignored = Vec::new();
        Some(module_scope(&unit.concrete, &cx, &mut ignored))
    }

    /// Syntax, declaration and resolution problems of a module.
    pub fn diagnostics(&self, path: &ModulePath) -> Vec<Diagnostic> {
        let Some(unit) = self.modules.get(path) else {
            return Vec::new();
        };
        let mut diagnostics = unit.parse_diagnostics.clone();
        diagnostics.extend(self.namespaces.clashes(path).iter().cloned());
        diagnostics.extend(unit.resolve_diagnostics.iter().cloned());
        diagnostics
    }

    /// Live units of the given modules, in module then source order.
    pub fn units_of(&self, paths: &[ModulePath]) -> Vec<DefId> {
        let mut units = Vec::new();
        for path in paths {
            let Some(unit) = self.modules.get(path) else {
                continue;
            };
            units.extend(unit.concrete.def_indices().map(|index| unit.ids.def(index)));
        }
        units
    }
}
