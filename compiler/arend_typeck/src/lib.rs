//! Typechecking for Arend.
//!
//! - [`term`]: core terms with holes, substitution and printing
//! - [`eval`]: weak-head normalisation bounded by fuel
//! - [`unify`]: first-order unification with hole solving
//! - [`order`]: Tarjan's strongly connected components over unit
//!   dependencies, dependencies first
//! - [`cache`]: the stamped cache of checked components
//! - [`checker`]: the driver that walks components, skips valid ones and
//!   commits the rest
//!
//! Elaboration turns resolved concrete definitions into [`CoreDef`]s. Type
//! errors are diagnostics; they fail the current component and never abort
//! a run. Only cancellation does.

pub mod cache;
mod cancel;
pub mod checker;
mod definition;
mod elaborate;
pub mod eval;
mod holes;
pub mod order;
pub mod term;
#[cfg(test)]
mod testing;
pub mod unify;

pub use cache::{Cache, CacheEntry, EntryStatus, Stamp};
pub use cancel::{CancellationToken, Cancelled, NoProgress, ProgressSink};
pub use checker::{CheckOptions, CheckSummary, Checker, SnapshotSource};
pub use definition::{
    ClauseFunction, CoreBody, CoreClause, CoreDef, CorePattern, RecursionStatus,
};
pub use eval::{Evaluator, Globals};
pub use holes::Holes;
pub use order::{components, components_with_focus};
pub use term::{HoleId, Names, Param, Term};
pub use unify::Unifier;
