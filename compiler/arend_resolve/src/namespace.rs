//! Namespaces exported by modules and definitions.
//!
//! A module exports its top-level definitions together with their aliases,
//! constructors and fields; it never re-exports what it imports. A
//! definition's namespace holds its own constructors or fields and the
//! declarations of its `\where` block.

use std::sync::Arc;

use arend_diagnostic::{Anchor, Diagnostic, ErrorKind};
use arend_ir::{ConcreteModule, DefBody, DefId, DefIndex, ModulePath, Span};
use rustc_hash::FxHashMap;

use crate::def_table::{DefTable, ModuleIds};
use crate::{GlobalKind, Referable, ScopeLevel};

/// Referable for a global definition of the given kind.
pub fn global_referable(kind: GlobalKind, id: DefId) -> Referable {
    match kind {
        GlobalKind::Field => Referable::Field(id),
        GlobalKind::Meta => Referable::Meta(id),
        _ => Referable::Global(id),
    }
}

#[derive(Clone, Debug, Default)]
pub struct Namespaces {
    modules: FxHashMap<ModulePath, Arc<ScopeLevel>>,
    defs: FxHashMap<DefId, Arc<ScopeLevel>>,
    /// Name clashes found while building, per module.
    clashes: FxHashMap<ModulePath, Vec<Diagnostic>>,
}

impl Namespaces {
    /// Build the namespaces of every registered module.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build<'a>(
        modules: impl IntoIterator<Item = (&'a ConcreteModule, &'a ModuleIds)>,
        defs: &DefTable,
    ) -> Self {
        let mut namespaces = Namespaces::default();
        for (module, ids) in modules {
            let mut builder = LevelBuilder {
                module,
                ids,
                defs,
                clashes: Vec::new(),
            };
            let mut exports = ScopeLevel::new();
            builder.declare(&mut exports, &module.top_level);
            for index in module.def_indices() {
                let mut level = ScopeLevel::new();
                builder.add_members(&mut level, index);
                builder.declare(&mut level, &module.def(index).where_defs);
                namespaces.defs.insert(ids.def(index), Arc::new(level));
            }
            namespaces.modules.insert(module.path.clone(), Arc::new(exports));
            if !builder.clashes.is_empty() {
                namespaces.clashes.insert(module.path.clone(), builder.clashes);
            }
        }
        namespaces
    }

    /// Exports of a module.
    pub fn module(&self, path: &ModulePath) -> Option<&Arc<ScopeLevel>> {
        self.modules.get(path)
    }

    /// Namespace of a definition.
    pub fn def(&self, id: DefId) -> Option<&Arc<ScopeLevel>> {
        self.defs.get(&id)
    }

    pub fn has_module(&self, path: &ModulePath) -> bool {
        self.modules.contains_key(path)
    }

    pub fn clashes(&self, path: &ModulePath) -> &[Diagnostic] {
        self.clashes.get(path).map_or(&[], Vec::as_slice)
    }
}

struct LevelBuilder<'a> {
    module: &'a ConcreteModule,
    ids: &'a ModuleIds,
    defs: &'a DefTable,
    clashes: Vec<Diagnostic>,
}

impl LevelBuilder<'_> {
    /// Add a list of sibling declarations to a level.
    fn declare(&mut self, level: &mut ScopeLevel, indices: &[DefIndex]) {
        let module = self.module;
        for &index in indices {
            let def = module.def(index);
            let id = self.ids.def(index);
            let Some(info) = self.defs.get(id) else {
                continue;
            };
            let referable = global_referable(info.kind, id);
            self.add(level, &def.name, referable.clone(), def.name_span);
            if let Some(alias) = &def.alias {
                let aliased =
                    Referable::alias(referable, alias.name.clone(), Some(alias.precedence));
                self.add(level, &alias.name, aliased, alias.span);
            }
            self.add_members(level, index);
        }
    }

    fn add_members(&mut self, level: &mut ScopeLevel, index: DefIndex) {
        let module = self.module;
        let def = module.def(index);
        let members: Vec<(&str, Span)> = match &def.body {
            DefBody::Data { constructors } => {
                constructors.iter().map(|c| (c.name.as_str(), c.span)).collect()
            }
            DefBody::Class { fields } => fields.iter().map(|f| (f.name.as_str(), f.span)).collect(),
            _ => Vec::new(),
        };
        for (position, (name, span)) in members.into_iter().enumerate() {
            let Some(id) = self.ids.member(index, position) else {
                continue;
            };
            let Some(info) = self.defs.get(id) else {
                continue;
            };
            self.add(level, name, global_referable(info.kind, id), span);
        }
    }

    fn add(&mut self, level: &mut ScopeLevel, name: &str, referable: Referable, span: Span) {
        if level.insert(name, referable.clone()) {
            return;
        }
        let mut anchor = Anchor::new(self.module.path.clone(), span);
        if let Some(id) = referable.def_id() {
            anchor = anchor.in_definition(self.defs.unit_of(id));
        }
        self.clashes.push(
            Diagnostic::error(ErrorKind::NameClash, anchor)
                .with_message(format!("`{name}` is already declared in this scope")),
        );
    }
}
