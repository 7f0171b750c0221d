use crate::{Diagnostic, ErrorGuaranteed};

/// Receiver of structured diagnostics.
///
/// Resolution, operator parsing and typechecking never throw: every problem
/// is reported here and processing continues with a fallback.
pub trait ErrorSink {
    fn report(&mut self, diagnostic: Diagnostic);

    /// Report an error and obtain proof that it was reported.
    fn report_error(&mut self, diagnostic: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diagnostic.is_error(), "report_error called with a non-error");
        self.report(diagnostic);
        ErrorGuaranteed::new()
    }
}

impl ErrorSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: ErrorSink + ?Sized> ErrorSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Forwards to an inner sink while counting errors.
pub struct CountingSink<'a> {
    inner: &'a mut dyn ErrorSink,
    errors: usize,
}

impl<'a> CountingSink<'a> {
    pub fn new(inner: &'a mut dyn ErrorSink) -> Self {
        CountingSink { inner, errors: 0 }
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }
}

impl ErrorSink for CountingSink<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.errors += 1;
        }
        self.inner.report(diagnostic);
    }
}
