//! Layered scopes and name lookup.
//!
//! A [`Scope`] is a stack of [`ScopeLevel`]s searched innermost first. For a
//! definition body the levels are, from outermost to innermost: prelude,
//! imports, opened namespaces, the module's own declarations, the `\where`
//! blocks of the enclosing definitions, and one level per local binder.
//!
//! The first level that knows a name decides: one distinct candidate
//! resolves, several are ambiguous. Candidates are compared by their
//! alias-resolved target, so seeing the same definition twice (directly and
//! through an alias) is not an ambiguity.

use std::sync::Arc;

use arend_ir::{LongName, ModulePath};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{Namespaces, Referable};

pub type Candidates = SmallVec<[Referable; 1]>;

/// One level of a scope: names to candidate referables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeLevel {
    entries: FxHashMap<String, Candidates>,
}

impl ScopeLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level binding a single name.
    pub fn single(name: impl Into<String>, referable: Referable) -> Self {
        let mut level = ScopeLevel::new();
        level.insert(name, referable);
        level
    }

    /// Add a candidate. Returns `false` when the name already denoted a
    /// different definition at this level.
    pub fn insert(&mut self, name: impl Into<String>, referable: Referable) -> bool {
        let candidates = self.entries.entry(name.into()).or_default();
        if candidates.iter().any(|c| c.same_definition(&referable)) {
            return true;
        }
        candidates.push(referable);
        candidates.len() == 1
    }

    pub fn get(&self, name: &str) -> &[Referable] {
        self.entries.get(name).map_or(&[], SmallVec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Referable])> {
        self.entries
            .iter()
            .map(|(name, candidates)| (name.as_str(), candidates.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge another level into this one.
    pub fn extend_from(&mut self, other: &ScopeLevel) {
        for (name, candidates) in other.iter() {
            for candidate in candidates {
                self.insert(name, candidate.clone());
            }
        }
    }
}

/// Outcome of looking up a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Referable),
    /// Two or more distinct definitions, ordered by id.
    Ambiguous(SmallVec<[Referable; 2]>),
    Unresolved,
}

impl Resolution {
    fn from_candidates(candidates: &[Referable]) -> Self {
        match candidates {
            [] => Resolution::Unresolved,
            [single] => Resolution::Resolved(single.clone()),
            many => {
                let mut sorted: SmallVec<[Referable; 2]> = many.iter().cloned().collect();
                sorted.sort_by_key(Referable::sort_key);
                Resolution::Ambiguous(sorted)
            }
        }
    }

    pub fn resolved(&self) -> Option<&Referable> {
        match self {
            Resolution::Resolved(referable) => Some(referable),
            _ => None,
        }
    }
}

/// A layered scope.
///
/// Levels are shared through `Arc`, so extending a definition's base scope
/// with local binders is cheap.
#[derive(Clone, Debug)]
pub struct Scope {
    /// Outermost first.
    levels: Vec<Arc<ScopeLevel>>,
    /// Module paths usable as qualifiers: the imports and the module itself.
    modules: Arc<[ModulePath]>,
    namespaces: Arc<Namespaces>,
}

impl Scope {
    pub fn new(namespaces: Arc<Namespaces>, modules: Vec<ModulePath>) -> Self {
        Scope {
            levels: Vec::new(),
            modules: modules.into(),
            namespaces,
        }
    }

    pub fn push(&mut self, level: Arc<ScopeLevel>) {
        self.levels.push(level);
    }

    pub fn push_local(&mut self, name: impl Into<String>, referable: Referable) {
        self.levels.push(Arc::new(ScopeLevel::single(name, referable)));
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Drop every level pushed after `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.levels.truncate(depth);
    }

    pub fn namespaces(&self) -> &Arc<Namespaces> {
        &self.namespaces
    }

    /// Look up a short name, innermost level first.
    pub fn lookup(&self, name: &str) -> Resolution {
        self.levels
            .iter()
            .rev()
            .map(|level| level.get(name))
            .find(|candidates| !candidates.is_empty())
            .map_or(Resolution::Unresolved, Resolution::from_candidates)
    }

    /// Known module whose path is exactly `segments`.
    pub fn module_path(&self, segments: &[String]) -> Option<ModulePath> {
        self.modules
            .iter()
            .find(|module| module.segments() == segments)
            .cloned()
    }

    /// Resolve a possibly qualified name.
    ///
    /// A qualified name first tries the longest prefix naming a known module
    /// and continues inside that module's exports; otherwise its first
    /// segment is resolved in this scope and the remaining segments are
    /// looked up in the namespace of each definition reached.
    pub fn resolve(&self, name: &LongName) -> Resolution {
        let segments = name.segments();
        let Some((first, rest)) = segments.split_first() else {
            return Resolution::Unresolved;
        };
        if rest.is_empty() {
            return self.lookup(first);
        }

        for split in (1..segments.len()).rev() {
            let prefix = &segments[..split];
            let Some(module) = self.modules.iter().find(|m| m.segments() == prefix) else {
                continue;
            };
            let Some(exports) = self.namespaces.module(module) else {
                continue;
            };
            let candidates = exports.get(&segments[split]);
            return self.descend(Resolution::from_candidates(candidates), &segments[split + 1..]);
        }

        self.descend(self.lookup(first), rest)
    }

    fn descend(&self, mut current: Resolution, rest: &[String]) -> Resolution {
        for segment in rest {
            let Resolution::Resolved(referable) = &current else {
                return current;
            };
            let Some(namespace) = referable.def_id().and_then(|id| self.namespaces.def(id)) else {
                return Resolution::Unresolved;
            };
            current = Resolution::from_candidates(namespace.get(segment));
        }
        current
    }
}

#[cfg(test)]
mod tests;
