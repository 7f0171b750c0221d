//! Name resolution for Arend.
//!
//! - [`DefTable`]: stable [`DefId`](arend_ir::DefId)s, unit versions and
//!   fingerprints
//! - [`Namespaces`]: what modules and definitions export
//! - [`Scope`]: layered lookup of short and qualified names
//! - [`binop`]: association of flat operator sequences by fixity
//! - [`resolve_module`]: attaches referables, locals, pattern bindings and
//!   operator trees to a concrete module
//! - [`Workspace`]: the resolved snapshot of every module, updated per edit
//!
//! Resolution errors are per node and never abort a module: each one is a
//! diagnostic, and resolution carries on with a best guess.

pub mod binop;
pub mod def_table;
mod namespace;
mod referable;
mod resolver;
mod scope;
mod workspace;

pub use binop::{reassociate, OpElem, OpError, OpTree, Role};
pub use def_table::{DefInfo, DefLocation, DefTable, ModuleIds, Version};
pub use namespace::{global_referable, Namespaces};
pub use referable::{GlobalKind, Referable};
pub use resolver::{
    module_scope, resolve_module, BinderSite, PatternBinding, ResolveContext, ResolvedModule,
};
pub use scope::{Candidates, Resolution, Scope, ScopeLevel};
pub use workspace::{ModuleUnit, PreludeIds, Workspace};
