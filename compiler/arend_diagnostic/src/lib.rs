//! Diagnostics for the Arend core.
//!
//! The core never formats for display. It produces structured
//! [`Diagnostic`]s carrying a severity, a kind tag, a message and a stable
//! [`Anchor`], and hands them to an [`ErrorSink`] supplied by the caller.
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is type-level proof that an error was reported:
//!
//! ```text
//! let guarantee = sink.report_error(diagnostic);
//! fn elaborate(..) -> Result<Term, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
mod guarantee;
pub mod queue;
mod sink;

pub use diagnostic::{Anchor, Diagnostic, ErrorKind, Severity};
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
pub use sink::{CountingSink, ErrorSink};
