//! Arend server.
//!
//! # Architecture
//!
//! ```text
//! update_module(path, text)
//!     │
//!     ▼
//! SourceFile (Salsa input) ──► parsed() ──► ConcreteModule
//!     │
//!     ▼
//! Workspace snapshot: ids, namespaces, scopes, resolution, operator trees
//!     │
//!     ▼
//! Checker: components in dependency order ──► stamped Cache
//! ```
//!
//! Parsing is a Salsa query. Everything after it is invalidated by unit
//! versions and component stamps, and is recomputed only when a checker runs.

use std::sync::Once;

pub mod commands;
mod context;
pub mod db;
pub mod input;
pub mod query;
pub mod reporting;
mod server;

pub use context::{Prelude, ServerContext, PRELUDE_MODULE, PRELUDE_SOURCE};
pub use db::{ArendDb, Db};
pub use input::SourceFile;
pub use server::{ArendServer, ServerError};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber. Safe to call more than once.
///
/// Filtering comes from `AREND_LOG`, then `RUST_LOG`; without either nothing
/// is logged. Example: `AREND_LOG=arend_typeck=debug arend check src`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let Some(directives) = std::env::var("AREND_LOG")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
        else {
            return;
        };
        let filter = EnvFilter::try_new(&directives).unwrap_or_else(|error| {
            eprintln!("warning: ignoring invalid log filter `{directives}`: {error}");
            EnvFilter::new("warn")
        });
        let layer = tracing_tree::HierarchicalLayer::new(2)
            .with_targets(true)
            .with_bracketed_fields(true)
            .with_writer(std::io::stderr);
        let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
    });
}
