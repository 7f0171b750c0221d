use std::fmt;

/// Proof that at least one error diagnostic was reported.
///
/// Only obtainable by reporting an error through an [`ErrorSink`] (or from a
/// non-zero error count), so a function returning `Err(ErrorGuaranteed)`
/// cannot fail silently.
///
/// [`ErrorSink`]: crate::ErrorSink
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed(())
    }

    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
