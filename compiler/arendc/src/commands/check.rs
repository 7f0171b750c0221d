//! `arend check`: resolve and typecheck modules.

use arend_diagnostic::{Diagnostic, ErrorSink};
use arend_ir::ModulePath;
use arend_typeck::{CancellationToken, CheckSummary};

use crate::server::{ArendServer, ServerError};

/// Everything a check run reports.
#[derive(Clone, Debug, Default)]
pub struct CheckOutcome {
    pub summary: CheckSummary,
    /// Parse, resolve and typecheck diagnostics in deterministic order.
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckOutcome {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_error()).count()
    }

    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }
}

/// Typecheck `modules`. Diagnostics go through the server's queue, so they
/// come out deduplicated and sorted.
pub fn check_modules(
    server: &ArendServer,
    modules: &[ModulePath],
    cancel: &CancellationToken,
) -> Result<CheckOutcome, ServerError> {
    let mut queue = server.diagnostic_queue();
    for diagnostic in server.diagnostics(modules) {
        queue.report(diagnostic);
    }
    let mut progress = |done: usize, total: usize| {
        tracing::debug!(done, total, "progress");
    };
    let summary = server
        .checker_for(modules)?
        .typecheck(None, &mut queue, cancel, &mut progress)?;
    tracing::info!(
        checked = summary.checked,
        reused = summary.reused,
        failed = summary.failed,
        "check finished"
    );
    Ok(CheckOutcome {
        summary,
        diagnostics: queue.flush(),
    })
}
