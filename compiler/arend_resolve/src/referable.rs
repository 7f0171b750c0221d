//! Referables: what a name can resolve to.

use std::fmt;

use arend_ir::{DefId, LocalId, Precedence};

/// Kind of a global definition in the definition table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GlobalKind {
    Function,
    Data,
    Constructor,
    Class,
    Field,
    Instance,
    Meta,
}

impl GlobalKind {
    /// Constructors and fields are checked as part of their owner.
    pub fn is_member(self) -> bool {
        matches!(self, GlobalKind::Constructor | GlobalKind::Field)
    }
}

impl fmt::Display for GlobalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GlobalKind::Function => "function",
            GlobalKind::Data => "data type",
            GlobalKind::Constructor => "constructor",
            GlobalKind::Class => "class",
            GlobalKind::Field => "field",
            GlobalKind::Instance => "instance",
            GlobalKind::Meta => "meta",
        };
        f.write_str(text)
    }
}

/// An entity a name resolves to.
///
/// Identity is by id, never by name. Aliases keep the name and notation they
/// were introduced with but compare by their target (see
/// [`Referable::same_definition`]).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Referable {
    /// Function, data type, constructor, class or instance.
    Global(DefId),
    /// Class field.
    Field(DefId),
    /// User-defined notation macro.
    Meta(DefId),
    /// Binder introduced by a telescope, lambda, Pi or pattern.
    Local(LocalId),
    /// `\alias` declaration or `\as` renaming.
    Alias {
        target: Box<Referable>,
        name: String,
        /// Notation declared with the alias; `None` inherits the target's.
        precedence: Option<Precedence>,
    },
}

impl Referable {
    pub fn alias(target: Referable, name: impl Into<String>, precedence: Option<Precedence>) -> Self {
        Referable::Alias {
            target: Box::new(target),
            name: name.into(),
            precedence,
        }
    }

    /// The referable with every alias layer removed.
    pub fn underlying(&self) -> &Referable {
        let mut current = self;
        while let Referable::Alias { target, .. } = current {
            current = target;
        }
        current
    }

    /// Whether both refer to the same definition once aliases are resolved.
    pub fn same_definition(&self, other: &Referable) -> bool {
        self.underlying() == other.underlying()
    }

    /// Global definition id behind this referable, if any.
    pub fn def_id(&self) -> Option<DefId> {
        match self.underlying() {
            Referable::Global(id) | Referable::Field(id) | Referable::Meta(id) => Some(*id),
            Referable::Local(_) | Referable::Alias { .. } => None,
        }
    }

    pub fn local_id(&self) -> Option<LocalId> {
        match self.underlying() {
            Referable::Local(id) => Some(*id),
            _ => None,
        }
    }

    /// Sort key making candidate lists deterministic.
    pub(crate) fn sort_key(&self) -> (u8, u32) {
        match self.underlying() {
            Referable::Global(id) | Referable::Field(id) | Referable::Meta(id) => (0, id.raw()),
            Referable::Local(id) => (1, id.raw()),
            Referable::Alias { .. } => (2, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underlying_strips_nested_aliases() {
        let global = Referable::Global(DefId::new(3));
        let once = Referable::alias(global.clone(), "a", None);
        let twice = Referable::alias(once.clone(), "b", Some(Precedence::NONFIX));
        assert_eq!(twice.underlying(), &global);
        assert!(twice.same_definition(&once));
        assert!(twice.same_definition(&global));
        assert_ne!(twice, global);
        assert_eq!(twice.def_id(), Some(DefId::new(3)));
    }

    #[test]
    fn test_distinct_globals_differ() {
        let a = Referable::Global(DefId::new(1));
        let b = Referable::Global(DefId::new(2));
        assert!(!a.same_definition(&b));
    }

    #[test]
    fn test_local_has_no_def_id() {
        let local = Referable::Local(LocalId::fresh());
        assert_eq!(local.def_id(), None);
        assert!(local.local_id().is_some());
    }
}
