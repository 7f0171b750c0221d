//! The stamped typecheck cache.
//!
//! One [`CacheEntry`] per unit. Every member of a component carries the same
//! [`Stamp`]: a Merkle hash over the members' versions and the stamps of the
//! component's external dependencies. An entry is valid when its unit is
//! live, its version is current, its component is intact and each recorded
//! dependency is itself valid with the recorded stamp. Validity is computed
//! lazily when a checker or reader asks; editing a module never touches the
//! cache.
//!
//! Entries of a component are committed together under one write lock, so
//! readers see either the old or the new entries, never a mix.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use arend_diagnostic::Diagnostic;
use arend_ir::DefId;
use arend_resolve::{Version, Workspace};
use arend_stack::ensure_sufficient_stack;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};

use crate::definition::CoreDef;

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct Stamp(u64);

impl Stamp {
    /// Recorded for a dependency that has no entry.
    pub const MISSING: Stamp = Stamp(0);

    /// Merkle hash of a component. Inputs need not be sorted.
    pub fn compute(members: &[(DefId, Version)], deps: &[(DefId, Stamp)]) -> Stamp {
        let mut members = members.to_vec();
        members.sort_unstable();
        let mut deps = deps.to_vec();
        deps.sort_unstable();
        let mut hasher = FxHasher::default();
        members.hash(&mut hasher);
        deps.hash(&mut hasher);
        Stamp(hasher.finish().max(1))
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum EntryStatus {
    Ok,
    Failed,
    /// Another member of the component, or a dependency without signature,
    /// failed.
    PropagatedFailure {
        culprit: DefId,
    },
}

impl EntryStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, EntryStatus::Ok)
    }
}

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub unit: DefId,
    pub version: Version,
    pub stamp: Stamp,
    /// Members of the component, sorted.
    pub component: Vec<DefId>,
    /// External dependencies with the stamps they had when checked.
    pub deps: Vec<(DefId, Stamp)>,
    pub status: EntryStatus,
    /// The unit's core definition followed by its constructors or fields.
    /// Failed units keep only signatures.
    pub defs: Vec<Arc<CoreDef>>,
    pub diagnostics: Vec<Diagnostic>,
    /// Start offset of the definition when it was checked, for shifting
    /// replayed diagnostics.
    pub def_start: u32,
}

impl CacheEntry {
    pub fn definition(&self, id: DefId) -> Option<&Arc<CoreDef>> {
        self.defs.iter().find(|def| def.id == id)
    }
}

#[derive(Debug, Default)]
pub struct Cache {
    entries: RwLock<FxHashMap<DefId, Arc<CacheEntry>>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn entry(&self, unit: DefId) -> Option<Arc<CacheEntry>> {
        self.entries.read().get(&unit).cloned()
    }

    pub fn stamp(&self, unit: DefId) -> Option<Stamp> {
        self.entries.read().get(&unit).map(|entry| entry.stamp)
    }

    /// The entries of every member of the component of `unit`, read under
    /// one lock so they all come from the same commit.
    pub fn component_entries(&self, unit: DefId) -> Vec<Arc<CacheEntry>> {
        let map = self.entries.read();
        let Some(entry) = map.get(&unit) else {
            return Vec::new();
        };
        entry
            .component
            .iter()
            .filter_map(|member| map.get(member).cloned())
            .collect()
    }

    /// Core form of `id`, whose unit is `unit`, regardless of validity.
    pub fn definition(&self, unit: DefId, id: DefId) -> Option<Arc<CoreDef>> {
        self.entries
            .read()
            .get(&unit)
            .and_then(|entry| entry.definition(id).cloned())
    }

    /// Units with an entry, sorted.
    pub fn units(&self) -> Vec<DefId> {
        let mut units: Vec<DefId> = self.entries.read().keys().copied().collect();
        units.sort_unstable();
        units
    }

    /// Whether the entry of `unit` is valid against `workspace`. `memo`
    /// caches answers within one pass.
    pub fn is_valid(
        &self,
        unit: DefId,
        workspace: &Workspace,
        memo: &mut FxHashMap<DefId, bool>,
    ) -> bool {
        if let Some(valid) = memo.get(&unit) {
            return *valid;
        }
        // Entries form a DAG; the provisional `false` cuts any cycle.
        memo.insert(unit, false);
        let valid = ensure_sufficient_stack(|| self.compute_validity(unit, workspace, memo));
        memo.insert(unit, valid);
        valid
    }

    fn compute_validity(
        &self,
        unit: DefId,
        workspace: &Workspace,
        memo: &mut FxHashMap<DefId, bool>,
    ) -> bool {
        let Some(entry) = self.entry(unit) else {
            return false;
        };
        let current = |member: DefId, version: Version| {
            workspace.defs().is_live(member) && workspace.version(member) == version
        };
        if !current(unit, entry.version) {
            return false;
        }
        let component_intact = entry.component.iter().all(|member| {
            *member == unit
                || self.entry(*member).is_some_and(|other| {
                    other.stamp == entry.stamp && current(*member, other.version)
                })
        });
        if !component_intact {
            return false;
        }
        entry.deps.iter().all(|(dep, stamp)| {
            self.is_valid(*dep, workspace, memo) && self.stamp(*dep) == Some(*stamp)
        })
    }

    /// The entry of `unit`, if it is valid.
    pub fn valid_entry(&self, unit: DefId, workspace: &Workspace) -> Option<Arc<CacheEntry>> {
        let mut memo = FxHashMap::default();
        if self.is_valid(unit, workspace, &mut memo) {
            self.entry(unit)
        } else {
            None
        }
    }

    /// Store the entries of one component atomically.
    pub fn commit(&self, entries: Vec<CacheEntry>) {
        let mut map = self.entries.write();
        for entry in entries {
            tracing::trace!(unit = ?entry.unit, stamp = entry.stamp.raw(), "commit");
            map.insert(entry.unit, Arc::new(entry));
        }
    }

    /// Drop entries of units that no longer exist. Returns how many went.
    pub fn prune(&self, workspace: &Workspace) -> usize {
        let mut map = self.entries.write();
        let before = map.len();
        map.retain(|unit, _| workspace.defs().is_live(*unit));
        before - map.len()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
