//! The Arend server.
//!
//! [`ArendServer`] owns the module inputs, the current [`Workspace`] snapshot
//! and the typecheck [`Cache`]. Edits go through [`ArendServer::update_module`]:
//! the module is re-parsed through Salsa, the workspace is rebuilt into a new
//! snapshot and swapped in. Nothing is typechecked on edit; cache entries are
//! invalidated lazily through unit versions and stamps.
//!
//! Writers are serialized by the input lock. Readers, checkers included, take
//! `Arc` snapshots and never block an edit for longer than the swap.

use std::sync::Arc;

use arend_diagnostic::{Diagnostic, DiagnosticQueue};
use arend_ir::{ConcreteModule, DefId, LongName, ModulePath};
use arend_resolve::{Referable, Resolution, Scope, Workspace};
use arend_typeck::{Cache, Cancelled, Checker, CoreDef, SnapshotSource};
use parking_lot::{Mutex, RwLock};
use salsa::Setter;

use crate::context::ServerContext;
use crate::db::Inputs;
use crate::input::SourceFile;
use crate::query::parsed;

/// Errors of server operations. Problems in Arend code are diagnostics,
/// never `ServerError`s.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("unknown module `{0}`")]
    UnknownModule(ModulePath),
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

pub struct ArendServer {
    context: ServerContext,
    inputs: Mutex<Inputs>,
    workspace: RwLock<Arc<Workspace>>,
    cache: Cache,
}

impl ArendServer {
    /// A server with the context's prelude loaded.
    pub fn new(context: ServerContext) -> Self {
        let workspace = Workspace::new(context.prelude_module().cloned());
        let server = ArendServer {
            inputs: Mutex::new(Inputs::default()),
            workspace: RwLock::new(Arc::new(workspace)),
            cache: Cache::new(),
            context,
        };
        if let Some(prelude) = server.context.prelude.clone() {
            server.update_module(prelude.module, prelude.source);
        }
        server
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Replace the source of a module, adding it if it is new. Returns the
    /// units whose version changed.
    #[tracing::instrument(level = "debug", skip(self, source), fields(module = %path))]
    pub fn update_module(&self, path: ModulePath, source: impl Into<String>) -> Vec<DefId> {
        let source = source.into();
        let mut inputs = self.inputs.lock();
        let Inputs { db, files } = &mut *inputs;
        let file = match files.get(&path) {
            Some(file) => {
                let file = *file;
                if file.text(&*db) != &source {
                    file.set_text(db).to(source);
                }
                file
            }
            None => {
                let file = SourceFile::new(&*db, path.clone(), source);
                files.insert(path, file);
                file
            }
        };
        let output = parsed(&*db, file);

        let mut workspace = Workspace::clone(&self.snapshot());
        let changed = workspace.update_module(output.module, output.diagnostics);
        let pruned = self.cache.prune(&workspace);
        *self.workspace.write() = Arc::new(workspace);
        tracing::debug!(changed = changed.len(), pruned, "module updated");
        changed
    }

    /// Forget a module. Its cache entries go; importers are re-resolved.
    pub fn remove_module(&self, path: &ModulePath) -> Result<Vec<DefId>, ServerError> {
        let mut inputs = self.inputs.lock();
        if inputs.files.remove(path).is_none() {
            return Err(ServerError::UnknownModule(path.clone()));
        }
        let mut workspace = Workspace::clone(&self.snapshot());
        let changed = workspace.remove_module(path);
        self.cache.prune(&workspace);
        *self.workspace.write() = Arc::new(workspace);
        drop(inputs);
        tracing::debug!(module = %path, changed = changed.len(), "module removed");
        Ok(changed)
    }

    /// Known modules, sorted.
    pub fn module_paths(&self) -> Vec<ModulePath> {
        self.snapshot().module_paths()
    }

    /// The concrete model of a module as last parsed.
    pub fn raw_group(&self, path: &ModulePath) -> Option<Arc<ConcreteModule>> {
        self.snapshot()
            .module(path)
            .map(|unit| unit.concrete.clone())
    }

    /// Top-level scope of a module.
    pub fn module_scope(&self, path: &ModulePath) -> Option<Scope> {
        self.snapshot().module_scope(path)
    }

    pub fn resolve(&self, name: &LongName, scope: &Scope) -> Resolution {
        scope.resolve(name)
    }

    /// A checker for the units of `modules`.
    pub fn checker_for(&self, modules: &[ModulePath]) -> Result<Checker<'_>, ServerError> {
        let workspace = self.snapshot();
        if let Some(missing) = modules.iter().find(|path| workspace.module(path).is_none()) {
            return Err(ServerError::UnknownModule(missing.clone()));
        }
        Ok(Checker::new(self, &self.cache, modules.to_vec()).with_options(self.context.check))
    }

    /// The checked core form of a definition, if its cache entry is valid and
    /// it typechecked.
    pub fn resolved_definition(&self, referable: &Referable) -> Option<Arc<CoreDef>> {
        let id = referable.def_id()?;
        let workspace = self.snapshot();
        let unit = workspace.unit_of(id);
        let entry = self.cache.valid_entry(unit, &workspace)?;
        if !entry.status.is_ok() {
            return None;
        }
        entry.definition(id).cloned()
    }

    /// Syntax, declaration and resolution diagnostics of `modules`.
    pub fn diagnostics(&self, modules: &[ModulePath]) -> Vec<Diagnostic> {
        let workspace = self.snapshot();
        let mut queue = DiagnosticQueue::with_config(self.context.diagnostics.clone());
        for path in modules {
            for diagnostic in workspace.diagnostics(path) {
                queue.add(diagnostic);
            }
        }
        queue.flush()
    }

    /// A queue configured by the context, for collecting a run's output.
    pub fn diagnostic_queue(&self) -> DiagnosticQueue {
        DiagnosticQueue::with_config(self.context.diagnostics.clone())
    }
}

impl SnapshotSource for ArendServer {
    fn snapshot(&self) -> Arc<Workspace> {
        self.workspace.read().clone()
    }
}

impl Default for ArendServer {
    fn default() -> Self {
        ArendServer::new(ServerContext::new())
    }
}
