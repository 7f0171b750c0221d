//! Salsa database holding module sources.
//!
//! Only text -> concrete model goes through Salsa: an edit that re-parses to
//! the same module is cut off before it reaches the workspace. Resolution and
//! typechecking have their own invalidation (unit versions and stamps).

use crate::input::SourceFile;
use arend_ir::ModulePath;
use rustc_hash::FxHashMap;

/// Database trait for code that reads Arend inputs.
#[salsa::db]
pub trait Db: salsa::Database {}

#[salsa::db]
#[derive(Clone, Default)]
pub struct ArendDb {
    storage: salsa::Storage<Self>,
}

impl ArendDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[salsa::db]
impl Db for ArendDb {}

#[salsa::db]
impl salsa::Database for ArendDb {
    fn salsa_event(&self, event: &dyn Fn() -> salsa::Event) {
        if tracing::enabled!(tracing::Level::TRACE) {
            let event = event();
            if let salsa::EventKind::WillExecute { .. } = event.kind {
                tracing::trace!(?event, "salsa");
            }
        }
    }
}

/// The database together with the input of every known module.
#[derive(Default)]
pub(crate) struct Inputs {
    pub(crate) db: ArendDb,
    pub(crate) files: FxHashMap<ModulePath, SourceFile>,
}
