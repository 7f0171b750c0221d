use super::*;

fn anchor() -> Anchor {
    Anchor::new(ModulePath::parse("Test"), Span::new(4, 9))
}

#[test]
fn test_builder() {
    let diag = Diagnostic::error(ErrorKind::TypeMismatch, anchor())
        .with_message("expected `Nat`")
        .with_related(Span::new(20, 22), "declared here")
        .with_note("while checking `f`");

    assert!(diag.is_error());
    assert_eq!(diag.kind.code(), "E4001");
    assert_eq!(diag.related.len(), 1);
    assert_eq!(diag.notes, vec!["while checking `f`".to_string()]);
}

#[test]
fn test_shifted_moves_all_spans() {
    let diag = Diagnostic::warning(ErrorKind::NameClash, anchor())
        .with_related(Span::new(20, 22), "other")
        .shifted(10);
    assert_eq!(diag.anchor.span, Span::new(14, 19));
    assert_eq!(diag.related[0].0, Span::new(30, 32));
}

#[test]
fn test_severity_ordering() {
    assert!(Severity::Info < Severity::Warning);
    assert!(Severity::Warning < Severity::Error);
}

#[test]
fn test_display() {
    let diag =
        Diagnostic::error(ErrorKind::UnresolvedReference, anchor()).with_message("cannot resolve `x`");
    assert_eq!(
        diag.to_string(),
        "error [E1001] Test:4..9: cannot resolve `x`"
    );
}
