//! Parse error type.

use arend_diagnostic::{Anchor, Diagnostic, ErrorKind};
use arend_ir::{ModulePath, Span};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }

    pub fn into_diagnostic(self, module: ModulePath) -> Diagnostic {
        Diagnostic::error(ErrorKind::SyntaxError, Anchor::new(module, self.span))
            .with_message(self.message)
    }
}
