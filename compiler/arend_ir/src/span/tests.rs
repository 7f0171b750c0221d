use super::*;

#[test]
fn test_span_merge() {
    let a = Span::new(3, 7);
    let b = Span::new(5, 12);
    assert_eq!(a.merge(b), Span::new(3, 12));
    assert_eq!(b.merge(a), Span::new(3, 12));
}

#[test]
fn test_span_shifted() {
    let span = Span::new(10, 14);
    assert_eq!(span.shifted(5), Span::new(15, 19));
    assert_eq!(span.shifted(-10), Span::new(0, 4));
    assert_eq!(span.shifted(-100), Span::new(0, 0));
}

#[test]
fn test_span_slice() {
    let text = "\\func f => 0";
    assert_eq!(Span::new(6, 7).slice(text), "f");
    assert_eq!(Span::new(6, 100).slice(text), "");
}

#[test]
fn test_span_contains() {
    let span = Span::new(2, 4);
    assert!(span.contains(2));
    assert!(span.contains(3));
    assert!(!span.contains(4));
    assert!(!Span::DUMMY.contains(0));
}
