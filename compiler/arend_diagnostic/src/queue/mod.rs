//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! Typechecking visits SCCs in dependency order, so raw diagnostics arrive in
//! an order that depends on the graph. Flushing through the queue gives a
//! deterministic order: by module, then by position, then by kind.

use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorSink};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop exact duplicates (same kind, anchor and message).
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 100,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// A config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<Diagnostic>,
    error_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            seen: FxHashSet::default(),
            error_count: 0,
            config,
        }
    }

    /// Add a diagnostic. Returns `false` if it was filtered out.
    pub fn add(&mut self, diagnostic: Diagnostic) -> bool {
        let is_error = diagnostic.is_error();
        if is_error && self.config.error_limit > 0 && self.error_count >= self.config.error_limit
        {
            return false;
        }
        if self.config.deduplicate && !self.seen.insert(diagnostic.clone()) {
            return false;
        }
        if is_error {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
        true
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all queued diagnostics in deterministic order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.sort_by(|a, b| {
            a.anchor
                .module
                .cmp(&b.anchor.module)
                .then(a.anchor.span.start.cmp(&b.anchor.span.start))
                .then(a.kind.cmp(&b.kind))
                .then(a.message.cmp(&b.message))
        });
        self.seen.clear();
        self.error_count = 0;
        diagnostics
    }
}

impl ErrorSink for DiagnosticQueue {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.add(diagnostic);
    }
}
