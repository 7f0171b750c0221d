use std::fmt;

use arend_ir::{DefId, ModulePath, Span};

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Kind tag of a diagnostic.
///
/// Consumers switch on the kind; the message is informational only.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Recovered locally; the enclosing node is marked erroneous.
    SyntaxError,
    UnresolvedReference,
    AmbiguousReference,
    /// Two bindings or declarations with the same name in one scope level.
    NameClash,
    /// `\import` of a module the server does not know.
    UnknownModule,
    /// Missing or conflicting fixity in a binary-operator sequence.
    OperatorParseError,
    /// A dependency cycle through definitions that cannot be recursive.
    CyclicDependency,
    TypeMismatch,
    /// Other elaboration failures: unsolved implicit arguments, bad patterns,
    /// missing implementations, missing result types.
    ElaborationError,
    /// Member of a failed SCC, or user of a definition without signature.
    PropagatedFailure,
    Cancelled,
}

impl ErrorKind {
    /// Stable code for searchability and diffing.
    pub const fn code(self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "E0001",
            ErrorKind::UnresolvedReference => "E1001",
            ErrorKind::AmbiguousReference => "E1002",
            ErrorKind::NameClash => "E1003",
            ErrorKind::UnknownModule => "E1004",
            ErrorKind::OperatorParseError => "E2001",
            ErrorKind::CyclicDependency => "E3001",
            ErrorKind::TypeMismatch => "E4001",
            ErrorKind::ElaborationError => "E4002",
            ErrorKind::PropagatedFailure => "E4003",
            ErrorKind::Cancelled => "E9001",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Where a diagnostic points: a module, optionally the definition it was
/// found in, and a span.
///
/// The `(definition, kind, message)` part stays stable across edits that
/// only move a definition, so diagnostics of successive checks can be diffed.
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct Anchor {
    pub module: ModulePath,
    pub definition: Option<DefId>,
    pub span: Span,
}

impl Anchor {
    pub fn new(module: ModulePath, span: Span) -> Self {
        Anchor {
            module,
            definition: None,
            span,
        }
    }

    #[must_use]
    pub fn in_definition(mut self, definition: DefId) -> Self {
        self.definition = Some(definition);
        self
    }

    #[must_use]
    pub fn shifted(mut self, delta: i64) -> Self {
        self.span = self.span.shifted(delta);
        self
    }
}

/// A structured diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: ErrorKind,
    pub message: String,
    pub anchor: Anchor,
    /// Secondary locations in the same module.
    pub related: Vec<(Span, String)>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(severity: Severity, kind: ErrorKind, anchor: Anchor) -> Self {
        Diagnostic {
            severity,
            kind,
            message: String::new(),
            anchor,
            related: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn error(kind: ErrorKind, anchor: Anchor) -> Self {
        Self::new_with_severity(Severity::Error, kind, anchor)
    }

    pub fn warning(kind: ErrorKind, anchor: Anchor) -> Self {
        Self::new_with_severity(Severity::Warning, kind, anchor)
    }

    pub fn info(kind: ErrorKind, anchor: Anchor) -> Self {
        Self::new_with_severity(Severity::Info, kind, anchor)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push((span, message.into()));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Move every span of the diagnostic by `delta` bytes.
    pub fn shifted(mut self, delta: i64) -> Self {
        if delta == 0 {
            return self;
        }
        self.anchor = self.anchor.shifted(delta);
        for (span, _) in &mut self.related {
            *span = span.shifted(delta);
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}:{:?}: {}",
            self.severity, self.kind, self.anchor.module, self.anchor.span, self.message
        )?;
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
