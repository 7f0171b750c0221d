use super::*;
use arend_ir::{DefId, LocalId};
use pretty_assertions::assert_eq;

fn global(raw: u32) -> Referable {
    Referable::Global(DefId::new(raw))
}

fn scope_with(levels: Vec<ScopeLevel>) -> Scope {
    let mut scope = Scope::new(Arc::new(Namespaces::default()), Vec::new());
    for level in levels {
        scope.push(Arc::new(level));
    }
    scope
}

#[test]
fn test_insert_reports_clash_once_per_new_definition() {
    let mut level = ScopeLevel::new();
    assert!(level.insert("x", global(1)));
    // Same definition again, directly or through an alias: no clash.
    assert!(level.insert("x", global(1)));
    assert!(level.insert("x", Referable::alias(global(1), "x", None)));
    assert!(!level.insert("x", global(2)));
    assert_eq!(level.get("x").len(), 2);
    assert_eq!(level.len(), 1);
}

#[test]
fn test_innermost_level_wins() {
    let local = Referable::Local(LocalId::fresh());
    let scope = scope_with(vec![
        ScopeLevel::single("x", global(1)),
        ScopeLevel::single("y", global(2)),
        ScopeLevel::single("x", local.clone()),
    ]);
    assert_eq!(scope.lookup("x"), Resolution::Resolved(local));
    assert_eq!(scope.lookup("y"), Resolution::Resolved(global(2)));
    assert_eq!(scope.lookup("z"), Resolution::Unresolved);
}

#[test]
fn test_ambiguity_is_decided_by_the_first_level_that_knows_the_name() {
    let mut imports = ScopeLevel::new();
    imports.insert("x", global(7));
    imports.insert("x", global(3));
    let mut scope = scope_with(vec![imports]);

    let Resolution::Ambiguous(candidates) = scope.lookup("x") else {
        panic!("expected ambiguity");
    };
    assert_eq!(candidates.as_slice(), &[global(3), global(7)]);

    // A closer declaration shadows the ambiguous pair.
    scope.push_local("x", global(9));
    assert_eq!(scope.lookup("x"), Resolution::Resolved(global(9)));
}

#[test]
fn test_truncate_drops_inner_levels() {
    let mut scope = scope_with(vec![ScopeLevel::single("x", global(1))]);
    let depth = scope.depth();
    scope.push_local("x", Referable::Local(LocalId::fresh()));
    assert_eq!(scope.depth(), depth + 1);
    scope.truncate(depth);
    assert_eq!(scope.lookup("x"), Resolution::Resolved(global(1)));
}

#[test]
fn test_extend_from_merges_candidates() {
    let mut left = ScopeLevel::single("a", global(1));
    let mut right = ScopeLevel::single("a", global(2));
    right.insert("b", global(3));
    left.extend_from(&right);
    assert_eq!(left.get("a").len(), 2);
    assert_eq!(left.get("b"), &[global(3)]);
    let mut names: Vec<&str> = left.names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_unqualified_resolution_of_a_dotted_name_without_namespace() {
    let scope = scope_with(vec![ScopeLevel::single("f", global(1))]);
    // `f` has no namespace registered, so `f.g` cannot be found.
    assert_eq!(scope.resolve(&LongName::parse("f.g")), Resolution::Unresolved);
    assert_eq!(scope.resolve(&LongName::parse("f")), Resolution::Resolved(global(1)));
}
