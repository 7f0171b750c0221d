//! Definition table: stable identities for global definitions.
//!
//! Every definition, constructor and field gets a [`DefId`] keyed by
//! `(module, long name, occurrence)`. Re-registering a module after an edit
//! reuses the id of each definition that keeps its key, so cache entries and
//! references from other modules survive unrelated edits. Ids of definitions
//! that disappear are kept but marked dead.
//!
//! The table also carries each unit's [`Version`] and resolution fingerprint.
//! A *unit* is what the typechecker checks as one piece: a function, data
//! type, class, instance or meta. Constructors and fields belong to the unit
//! of their owner.

use std::fmt;

use arend_ir::{
    ConcreteModule, DefBody, DefId, DefIndex, DefKind, LongName, ModulePath, Precedence, Span,
};
use rustc_hash::FxHashMap;

use crate::{GlobalKind, Referable};

/// Monotonic edit counter attached to units.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct Version(u64);

impl Version {
    pub const fn new(raw: u64) -> Self {
        Version(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Where a definition lives in its module's concrete model.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DefLocation {
    pub index: DefIndex,
    /// Constructor or field position within the owner.
    pub member: Option<usize>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DefInfo {
    pub module: ModulePath,
    pub long_name: LongName,
    pub kind: GlobalKind,
    pub precedence: Precedence,
    /// `\alias` name and notation.
    pub alias: Option<(String, Precedence)>,
    /// Owning data type or class of a constructor or field.
    pub owner: Option<DefId>,
    pub location: DefLocation,
    pub name_span: Span,
    pub version: Version,
    /// Fingerprint of the last resolution of this unit.
    pub fingerprint: Option<u64>,
    pub live: bool,
}

impl DefInfo {
    pub fn name(&self) -> &str {
        self.long_name.last()
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
struct DefKey {
    module: ModulePath,
    name: LongName,
    occurrence: u32,
}

/// Ids assigned to one module's definitions, aligned with its concrete model.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ModuleIds {
    /// Indexed by [`DefIndex`].
    pub defs: Vec<DefId>,
    /// Constructors and fields by `(owner index, position)`.
    pub members: FxHashMap<(DefIndex, usize), DefId>,
}

impl ModuleIds {
    pub fn def(&self, index: DefIndex) -> DefId {
        self.defs[index.index()]
    }

    pub fn member(&self, owner: DefIndex, position: usize) -> Option<DefId> {
        self.members.get(&(owner, position)).copied()
    }
}

#[derive(Clone, Debug, Default)]
pub struct DefTable {
    infos: Vec<DefInfo>,
    by_key: FxHashMap<DefKey, DefId>,
    by_module: FxHashMap<ModulePath, Vec<DefId>>,
    clock: u64,
}

impl DefTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: DefId) -> Option<&DefInfo> {
        self.infos.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn is_live(&self, id: DefId) -> bool {
        self.get(id).is_some_and(|info| info.live)
    }

    /// The unit a definition is checked with: itself, or its owner.
    pub fn unit_of(&self, id: DefId) -> DefId {
        self.get(id).and_then(|info| info.owner).unwrap_or(id)
    }

    pub fn version(&self, id: DefId) -> Version {
        self.get(self.unit_of(id)).map(|info| info.version).unwrap_or_default()
    }

    /// Live definitions of a module, in registration order.
    pub fn module_defs(&self, module: &ModulePath) -> &[DefId] {
        self.by_module.get(module).map_or(&[], Vec::as_slice)
    }

    /// Find a live definition by module and qualified name.
    pub fn lookup(&self, module: &ModulePath, name: &LongName) -> Option<DefId> {
        self.module_defs(module)
            .iter()
            .copied()
            .find(|&id| self.get(id).is_some_and(|info| &info.long_name == name))
    }

    /// Notation a referable is used with: an alias's own declaration, or
    /// the precedence of the definition behind it. Locals are nonfix.
    pub fn precedence_of(&self, referable: &Referable) -> Precedence {
        match referable {
            Referable::Alias {
                precedence: Some(precedence),
                ..
            } => *precedence,
            Referable::Alias { target, .. } => self.precedence_of(target),
            Referable::Global(id) | Referable::Field(id) | Referable::Meta(id) => self
                .get(*id)
                .map_or(Precedence::NONFIX, |info| info.precedence),
            Referable::Local(_) => Precedence::NONFIX,
        }
    }

    /// Latest version handed out.
    pub fn clock(&self) -> Version {
        Version(self.clock)
    }

    /// Units whose version moved past `since`, dead ones included.
    pub fn changed_since(&self, since: Version) -> Vec<DefId> {
        self.infos
            .iter()
            .enumerate()
            .filter(|(_, info)| info.owner.is_none() && info.version > since)
            .map(|(index, _)| DefId::from_usize(index))
            .collect()
    }

    fn tick(&mut self) -> Version {
        self.clock += 1;
        Version(self.clock)
    }

    /// Assign ids to every definition of `module`, reusing existing ids for
    /// unchanged keys. Definitions no longer present are marked dead and
    /// their version is bumped.
    pub fn register_module(&mut self, module: &ConcreteModule) -> ModuleIds {
        let mut occurrences: FxHashMap<LongName, u32> = FxHashMap::default();
        let mut ids = ModuleIds::default();
        let mut live = Vec::new();

        for index in module.def_indices() {
            let def = module.def(index);
            let long_name = module.long_name(index);
            let kind = match def.kind() {
                DefKind::Function => GlobalKind::Function,
                DefKind::Data => GlobalKind::Data,
                DefKind::Class => GlobalKind::Class,
                DefKind::Instance => GlobalKind::Instance,
                DefKind::Meta => GlobalKind::Meta,
            };
            let id = self.assign(
                module.path.clone(),
                long_name.clone(),
                &mut occurrences,
                DefSlot {
                    kind,
                    precedence: def.precedence,
                    alias: def.alias.as_ref().map(|a| (a.name.clone(), a.precedence)),
                    owner: None,
                    location: DefLocation {
                        index,
                        member: None,
                    },
                    name_span: def.name_span,
                },
            );
            ids.defs.push(id);
            live.push(id);

            let members: Vec<(&str, Precedence, Span, GlobalKind)> = match &def.body {
                DefBody::Data { constructors } => constructors
                    .iter()
                    .map(|c| (c.name.as_str(), c.precedence, c.span, GlobalKind::Constructor))
                    .collect(),
                DefBody::Class { fields } => fields
                    .iter()
                    .map(|f| (f.name.as_str(), f.precedence, f.span, GlobalKind::Field))
                    .collect(),
                _ => Vec::new(),
            };
            for (position, (name, precedence, span, kind)) in members.into_iter().enumerate() {
                let member_id = self.assign(
                    module.path.clone(),
                    long_name.child(name),
                    &mut occurrences,
                    DefSlot {
                        kind,
                        precedence,
                        alias: None,
                        owner: Some(id),
                        location: DefLocation {
                            index,
                            member: Some(position),
                        },
                        name_span: span,
                    },
                );
                ids.members.insert((index, position), member_id);
                live.push(member_id);
            }
        }

        let previous = self
            .by_module
            .insert(module.path.clone(), live.clone())
            .unwrap_or_default();
        for id in previous {
            if !live.contains(&id) {
                self.kill(id);
            }
        }
        tracing::debug!(module = %module.path, defs = live.len(), "registered definitions");
        ids
    }

    /// Mark every definition of a module dead.
    pub fn remove_module(&mut self, module: &ModulePath) -> Vec<DefId> {
        let removed = self.by_module.remove(module).unwrap_or_default();
        for &id in &removed {
            self.kill(id);
        }
        removed
    }

    /// Record a unit's fresh fingerprint; bumps its version when it differs
    /// from the previous one. Returns whether the version changed.
    pub fn record_fingerprint(&mut self, unit: DefId, fingerprint: u64) -> bool {
        let Some(previous) = self.get(unit).map(|info| info.fingerprint) else {
            return false;
        };
        if previous == Some(fingerprint) {
            return false;
        }
        let version = self.tick();
        let info = &mut self.infos[unit.index()];
        info.fingerprint = Some(fingerprint);
        info.version = version;
        true
    }

    fn kill(&mut self, id: DefId) {
        let version = self.tick();
        let info = &mut self.infos[id.index()];
        if info.live {
            info.live = false;
            info.version = version;
            info.fingerprint = None;
        }
    }

    fn assign(
        &mut self,
        module: ModulePath,
        name: LongName,
        occurrences: &mut FxHashMap<LongName, u32>,
        slot: DefSlot,
    ) -> DefId {
        let occurrence = occurrences.entry(name.clone()).or_insert(0);
        let key = DefKey {
            module: module.clone(),
            name: name.clone(),
            occurrence: *occurrence,
        };
        *occurrence += 1;

        if let Some(&id) = self.by_key.get(&key) {
            let info = &mut self.infos[id.index()];
            let kind_changed = info.kind != slot.kind;
            info.kind = slot.kind;
            info.precedence = slot.precedence;
            info.alias = slot.alias;
            info.owner = slot.owner;
            info.location = slot.location;
            info.name_span = slot.name_span;
            let revived = !info.live;
            info.live = true;
            if kind_changed || revived {
                info.fingerprint = None;
                let version = self.tick();
                self.infos[id.index()].version = version;
            }
            return id;
        }

        let id = DefId::from_usize(self.infos.len());
        let version = self.tick();
        self.infos.push(DefInfo {
            module,
            long_name: name,
            kind: slot.kind,
            precedence: slot.precedence,
            alias: slot.alias,
            owner: slot.owner,
            location: slot.location,
            name_span: slot.name_span,
            version,
            fingerprint: None,
            live: true,
        });
        self.by_key.insert(key, id);
        id
    }
}

/// Per-registration attributes of a definition.
struct DefSlot {
    kind: GlobalKind,
    precedence: Precedence,
    alias: Option<(String, Precedence)>,
    owner: Option<DefId>,
    location: DefLocation,
    name_span: Span,
}
