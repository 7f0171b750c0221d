//! Arena indices and stable identities.
//!
//! Concrete nodes are addressed by `u32` indices into per-module arenas.
//! Back-references (parent definitions, owning modules) are lookups through
//! these ids rather than owning pointers.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Build from a `Vec` length, saturating at `u32::MAX`.
            #[inline]
            pub fn from_usize(index: usize) -> Self {
                $name(u32::try_from(index).unwrap_or(u32::MAX))
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

arena_id!(
    /// Index into a module's expression arena.
    ExprId
);
arena_id!(
    /// Index into a module's pattern arena.
    PatId
);
arena_id!(
    /// Index of a definition within its module's definition list.
    DefIndex
);
arena_id!(
    /// Stable identity of a global definition, allocated by the definition
    /// table and reused across re-parses while the definition keeps its key.
    DefId
);

/// Identity of a local binding (parameter, lambda binder, pattern variable).
///
/// Ids are unique for the whole process so that core terms built from
/// different modules never confuse two binders.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct LocalId(u32);

static NEXT_LOCAL: AtomicU32 = AtomicU32::new(0);

impl LocalId {
    /// Allocate a fresh, never before seen local id.
    pub fn fresh() -> Self {
        LocalId(NEXT_LOCAL.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalId({})", self.0)
    }
}
