//! Test harness: a workspace behind a lock, a cache and helpers to check
//! and inspect modules.

use std::sync::Arc;

use arend_diagnostic::{Diagnostic, ErrorKind};
use arend_ir::{DefId, LongName, ModulePath};
use arend_parse::parse;
use arend_resolve::Workspace;
use parking_lot::RwLock;

use crate::{
    Cache, CancellationToken, CheckSummary, Checker, CoreDef, EntryStatus, NoProgress, Stamp,
};

pub(crate) const PRELUDE: &str = "\\data Nat | zero | suc Nat";

pub(crate) struct Harness {
    pub(crate) source: RwLock<Arc<Workspace>>,
    pub(crate) cache: Cache,
}

impl Harness {
    /// A workspace with the prelude and module `M` holding `source`.
    pub(crate) fn new(source: &str) -> Self {
        let mut workspace = Workspace::new(Some(ModulePath::parse("Prelude")));
        for (path, text) in [("Prelude", PRELUDE), ("M", source)] {
            let output = parse(ModulePath::parse(path), text);
            workspace.update_module(output.module, output.diagnostics);
        }
        Harness {
            source: RwLock::new(Arc::new(workspace)),
            cache: Cache::new(),
        }
    }

    pub(crate) fn workspace(&self) -> Arc<Workspace> {
        self.source.read().clone()
    }

    /// Replace the text of module `M`.
    pub(crate) fn edit(&self, source: &str) {
        edit(&self.source, source);
    }

    pub(crate) fn checker(&self) -> Checker<'_> {
        Checker::new(&self.source, &self.cache, vec![ModulePath::parse("M")])
    }

    pub(crate) fn check(&self) -> (CheckSummary, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let summary = self
            .checker()
            .typecheck(None, &mut diagnostics, &CancellationToken::new(), &mut NoProgress)
            .unwrap();
        (summary, diagnostics)
    }

    pub(crate) fn id(&self, name: &str) -> DefId {
        self.workspace()
            .lookup(&ModulePath::parse("M"), &LongName::parse(name))
            .unwrap()
    }

    pub(crate) fn prelude_id(&self, name: &str) -> DefId {
        self.workspace()
            .lookup(&ModulePath::parse("Prelude"), &LongName::parse(name))
            .unwrap()
    }

    pub(crate) fn status(&self, name: &str) -> EntryStatus {
        let unit = self.workspace().unit_of(self.id(name));
        self.cache.entry(unit).unwrap().status.clone()
    }

    pub(crate) fn stamp(&self, name: &str) -> Stamp {
        self.cache.stamp(self.id(name)).unwrap()
    }

    pub(crate) fn is_valid(&self, name: &str) -> bool {
        self.cache
            .valid_entry(self.id(name), &self.workspace())
            .is_some()
    }

    pub(crate) fn core(&self, name: &str) -> Arc<CoreDef> {
        let id = self.id(name);
        let unit = self.workspace().unit_of(id);
        self.cache.definition(unit, id).unwrap()
    }
}

pub(crate) fn edit(source: &RwLock<Arc<Workspace>>, text: &str) {
    let mut guard = source.write();
    let mut workspace = (**guard).clone();
    let output = parse(ModulePath::parse("M"), text);
    workspace.update_module(output.module, output.diagnostics);
    *guard = Arc::new(workspace);
}

pub(crate) fn kinds(diagnostics: &[Diagnostic]) -> Vec<ErrorKind> {
    diagnostics.iter().map(|diagnostic| diagnostic.kind).collect()
}
