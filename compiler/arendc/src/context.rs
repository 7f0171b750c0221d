//! Server context: the prelude and run configuration.
//!
//! What would otherwise be process-wide state lives here and is handed to
//! [`ArendServer::new`](crate::ArendServer::new). A server loads its prelude
//! once when it is created; dropping the server tears everything down.

use arend_diagnostic::DiagnosticConfig;
use arend_ir::ModulePath;
use arend_typeck::CheckOptions;

/// Name of the default prelude module.
pub const PRELUDE_MODULE: &str = "Prelude";

/// Source of the default prelude. Number literals elaborate to `Nat`.
pub const PRELUDE_SOURCE: &str = "\\data Nat\n  | zero\n  | suc Nat\n";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prelude {
    pub module: ModulePath,
    pub source: String,
}

impl Default for Prelude {
    fn default() -> Self {
        Prelude {
            module: ModulePath::parse(PRELUDE_MODULE),
            source: PRELUDE_SOURCE.to_string(),
        }
    }
}

/// Configuration injected into a server.
#[derive(Clone, Debug, Default)]
pub struct ServerContext {
    pub prelude: Option<Prelude>,
    pub check: CheckOptions,
    pub diagnostics: DiagnosticConfig,
}

impl ServerContext {
    /// The default prelude with default options.
    pub fn new() -> Self {
        ServerContext {
            prelude: Some(Prelude::default()),
            ..ServerContext::default()
        }
    }

    #[must_use]
    pub fn with_prelude(mut self, module: ModulePath, source: impl Into<String>) -> Self {
        self.prelude = Some(Prelude {
            module,
            source: source.into(),
        });
        self
    }

    /// No prelude: number literals do not elaborate.
    #[must_use]
    pub fn without_prelude(mut self) -> Self {
        self.prelude = None;
        self
    }

    #[must_use]
    pub fn with_check_options(mut self, check: CheckOptions) -> Self {
        self.check = check;
        self
    }

    #[must_use]
    pub fn with_diagnostic_config(mut self, diagnostics: DiagnosticConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn prelude_module(&self) -> Option<&ModulePath> {
        self.prelude.as_ref().map(|prelude| &prelude.module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_context_has_no_prelude() {
        assert_eq!(ServerContext::default().prelude, None);
        assert_eq!(
            ServerContext::new().prelude_module(),
            Some(&ModulePath::parse(PRELUDE_MODULE))
        );
    }

    #[test]
    fn test_builders() {
        let context = ServerContext::new()
            .with_prelude(ModulePath::parse("Base"), "\\data Nat | zero | suc Nat")
            .with_check_options(CheckOptions::default().with_fuel(10))
            .with_diagnostic_config(DiagnosticConfig::unlimited());
        assert_eq!(context.prelude_module(), Some(&ModulePath::parse("Base")));
        assert_eq!(context.check.fuel, 10);
        assert_eq!(context.diagnostics, DiagnosticConfig::unlimited());
        assert_eq!(context.without_prelude().prelude, None);
    }
}
