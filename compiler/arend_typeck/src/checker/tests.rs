use super::*;
use crate::testing::{edit, kinds, Harness};
use crate::{NoProgress, Term};
use pretty_assertions::assert_eq;

const MUTUAL: &str = "\\func h (n : Nat) : Nat | zero => zero | suc m => f m\n\
                      \\func f (n : Nat) : Nat | zero => zero | suc m => g m\n\
                      \\func g (n : Nat) : Nat | zero => zero | suc m => h m\n\
                      \\func unrelated : Nat => 0";

fn mutual_ids(harness: &Harness) -> Vec<DefId> {
    let mut ids = vec![harness.id("h"), harness.id("f"), harness.id("g")];
    ids.sort_unstable();
    ids
}

#[test]
fn test_mutually_recursive_functions_share_one_status() {
    let harness = Harness::new(MUTUAL);
    let (summary, diagnostics) = harness.check();
    assert_eq!(diagnostics, vec![]);
    assert_eq!(summary.failed, 0);
    let expected = RecursionStatus::Mutual(mutual_ids(&harness));
    for name in ["h", "f", "g"] {
        assert_eq!(harness.core(name).status, expected);
    }
    assert_eq!(harness.core("unrelated").status, RecursionStatus::NonRecursive);

    // Editing one member rechecks the whole component.
    let unrelated = harness.stamp("unrelated");
    harness.edit(&MUTUAL.replace("| zero => zero | suc m => g m", "| zero => 1 | suc m => g m"));
    let (summary, _) = harness.check();
    assert_eq!(summary.checked, 3);
    for name in ["h", "f", "g"] {
        assert_eq!(harness.core(name).status, expected);
        assert!(harness.is_valid(name));
    }
    assert_eq!(harness.stamp("unrelated"), unrelated);
}

#[test]
fn test_edit_invalidates_exactly_the_transitive_dependents() {
    let source = "\\func x : Nat => 0\n\
                  \\func y : Nat => x\n\
                  \\func z : Nat => y\n\
                  \\func other : Nat => 1";
    let harness = Harness::new(source);
    harness.check();
    let stamps: Vec<Stamp> = ["x", "y", "z", "other"]
        .iter()
        .map(|name| harness.stamp(name))
        .collect();

    harness.edit(&source.replace("x : Nat => 0", "x : Nat => 2"));
    let validity: Vec<bool> = ["x", "y", "z", "other"]
        .iter()
        .map(|name| harness.is_valid(name))
        .collect();
    assert_eq!(validity, vec![false, false, false, true]);

    let (summary, _) = harness.check();
    // `Nat` and `other` are reused.
    assert_eq!((summary.checked, summary.reused), (3, 2));
    assert_ne!(harness.stamp("x"), stamps[0]);
    assert_ne!(harness.stamp("z"), stamps[2]);
    assert_eq!(harness.stamp("other"), stamps[3]);
}

#[test]
fn test_rechecking_unchanged_inputs_reuses_everything() {
    let harness = Harness::new("\\func x : Nat => 0\n\\func y : Nat => x");
    harness.check();
    let before = harness.stamp("y");
    let (summary, _) = harness.check();
    assert_eq!((summary.checked, summary.reused), (0, 3));
    assert_eq!(harness.stamp("y"), before);
}

#[test]
fn test_cancellation_keeps_completed_components() {
    let harness = Harness::new(
        "\\func a : Nat => 0\n\
         \\func b : Nat => a\n\
         \\func c : Nat => b",
    );
    let cancel = CancellationToken::new();
    let mut progress = |done: usize, _total: usize| {
        // `Nat` and `a` are done.
        if done == 2 {
            cancel.cancel();
        }
    };
    let mut diagnostics = Vec::new();
    let result = harness
        .checker()
        .typecheck(None, &mut diagnostics, &cancel, &mut progress);
    assert_eq!(result, Err(Cancelled));
    assert!(harness.is_valid("a"));
    assert!(harness.cache.entry(harness.id("b")).is_none());
    assert!(harness.cache.entry(harness.id("c")).is_none());

    let (summary, diagnostics) = harness.check();
    assert_eq!(diagnostics, vec![]);
    assert_eq!((summary.checked, summary.reused), (2, 2));
}

#[test]
fn test_focus_and_its_dependencies_come_first() {
    let harness = Harness::new(
        "\\func a : Nat => 0\n\
         \\func b : Nat => 1\n\
         \\func c : Nat => b",
    );
    let cancel = CancellationToken::new();
    let mut progress = |done: usize, _total: usize| {
        // `Nat`, `b` and `c`.
        if done == 3 {
            cancel.cancel();
        }
    };
    let mut diagnostics = Vec::new();
    let focus = Some(harness.id("c"));
    let result = harness
        .checker()
        .typecheck(focus, &mut diagnostics, &cancel, &mut progress);
    assert_eq!(result, Err(Cancelled));
    assert!(harness.is_valid("b"));
    assert!(harness.is_valid("c"));
    assert!(!harness.is_valid("a"));
}

#[test]
fn test_focused_component_is_rechecked_when_valid() {
    let harness = Harness::new("\\func a : Nat => 0\n\\func b : Nat => a");
    harness.check();
    let stamps = (harness.stamp("a"), harness.stamp("b"));

    let mut diagnostics = Vec::new();
    let summary = harness
        .checker()
        .typecheck(
            Some(harness.id("b")),
            &mut diagnostics,
            &CancellationToken::new(),
            &mut NoProgress,
        )
        .unwrap();
    assert_eq!((summary.checked, summary.reused), (1, 2));
    assert_eq!(diagnostics, vec![]);
    assert_eq!((harness.stamp("a"), harness.stamp("b")), stamps);
    assert!(harness.is_valid("b"));
}

#[test]
fn test_failure_in_a_component_propagates_to_its_members() {
    let harness = Harness::new(
        "\\func f (n : Nat) : Nat | zero => zero | suc m => g m\n\
         \\func g (n : Nat) : Nat | zero => \\Type | suc m => f m",
    );
    let (summary, diagnostics) = harness.check();
    assert_eq!(summary.failed, 2);
    let (f, g) = (harness.id("f"), harness.id("g"));
    assert_eq!(harness.status("g"), EntryStatus::Failed);
    assert_eq!(harness.status("f"), EntryStatus::PropagatedFailure { culprit: g });
    assert_eq!(
        kinds(&diagnostics),
        vec![ErrorKind::PropagatedFailure, ErrorKind::TypeMismatch]
    );
    assert_eq!(diagnostics[0].anchor.definition, Some(f));
    // Failed members keep their signatures but never unfold.
    assert!(matches!(harness.core("g").body, CoreBody::Opaque));
    assert!(harness.cache.valid_entry(g, &harness.workspace()).is_some());
}

#[test]
fn test_dependency_without_signature_propagates() {
    let harness = Harness::new(
        "\\func bad (x : zero) : Nat => 0\n\
         \\func user : Nat => bad 0\n\
         \\func badBody : Nat => \\Type\n\
         \\func fine : Nat => badBody",
    );
    let (_, diagnostics) = harness.check();
    let bad = harness.id("bad");
    assert_eq!(harness.status("bad"), EntryStatus::Failed);
    assert_eq!(harness.status("user"), EntryStatus::PropagatedFailure { culprit: bad });
    assert_eq!(harness.status("badBody"), EntryStatus::Failed);
    assert_eq!(harness.status("fine"), EntryStatus::Ok);
    assert_eq!(
        kinds(&diagnostics),
        vec![
            ErrorKind::TypeMismatch,
            ErrorKind::PropagatedFailure,
            ErrorKind::TypeMismatch
        ]
    );
}

#[test]
fn test_metas_and_instances_cannot_be_recursive() {
    let harness = Harness::new(
        "\\meta m => k\n\
         \\func k : Nat => m",
    );
    let (_, diagnostics) = harness.check();
    assert!(kinds(&diagnostics).contains(&ErrorKind::CyclicDependency));
    assert!(!harness.status("m").is_ok());
    assert!(!harness.status("k").is_ok());

    let harness = Harness::new(
        "\\class C (E : \\Type) | get : E\n\
         \\instance I : C Nat | get => useI\n\
         \\func useI : Nat => get I",
    );
    let (_, diagnostics) = harness.check();
    assert!(kinds(&diagnostics).contains(&ErrorKind::CyclicDependency));
    assert!(!harness.status("I").is_ok());
}

#[test]
fn test_cached_diagnostics_are_replayed_at_the_new_position() {
    let source = "\\func bad : Nat => \\Type";
    let harness = Harness::new(source);
    let (_, first) = harness.check();
    assert_eq!(kinds(&first), vec![ErrorKind::TypeMismatch]);

    let padding = "\\func pad : Nat => 0\n";
    harness.edit(&format!("{padding}{source}"));
    let (summary, second) = harness.check();
    assert_eq!(summary.checked, 1);
    assert_eq!(kinds(&second), vec![ErrorKind::TypeMismatch]);
    let shift = u32::try_from(padding.len()).unwrap();
    assert_eq!(second[0].anchor.span.start, first[0].anchor.span.start + shift);
    assert_eq!(second[0].message, first[0].message);
}

#[test]
fn test_edit_during_a_run_reruns_the_pass() {
    let harness = Harness::new("\\func a : Nat => 0\n\\func b : Nat => 1");
    let mut edited = false;
    let mut progress = |done: usize, _total: usize| {
        if done == 1 && !edited {
            edited = true;
            edit(&harness.source, "\\func a : Nat => 0\n\\func b : Nat => 2");
        }
    };
    let mut diagnostics = Vec::new();
    let summary = harness
        .checker()
        .typecheck(None, &mut diagnostics, &CancellationToken::new(), &mut progress)
        .unwrap();
    assert_eq!(summary.passes, 2);
    assert!(!summary.stale);
    assert!(harness.is_valid("b"));
    let CoreBody::Function(body) = &harness.core("b").body else {
        panic!("expected a function body");
    };
    assert_eq!(*body, Term::Number(2));
}

#[test]
fn test_stamps_are_shared_within_a_component() {
    let harness = Harness::new(MUTUAL);
    harness.check();
    let entry = harness.cache.entry(harness.id("f")).unwrap();
    assert_eq!(entry.component, mutual_ids(&harness));
    assert_eq!(harness.stamp("h"), harness.stamp("f"));
    assert_eq!(harness.stamp("g"), harness.stamp("f"));
    assert!(entry.deps.iter().any(|(dep, _)| *dep == harness.prelude_id("Nat")));
    assert_eq!(
        Checker::new(&harness.source, &harness.cache, vec![])
            .typecheck(None, &mut Vec::new(), &CancellationToken::new(), &mut NoProgress),
        Ok(CheckSummary {
            passes: 1,
            ..CheckSummary::default()
        })
    );
}

#[test]
fn test_concurrent_readers_see_whole_components() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let harness = Harness::new(MUTUAL);
    harness.check();
    let members = mutual_ids(&harness);
    let edited = MUTUAL.replace("| zero => zero | suc m => g m", "| zero => 1 | suc m => g m");
    let done = AtomicBool::new(false);

    let views = std::thread::scope(|scope| {
        let reader = scope.spawn(|| {
            let mut views = 0usize;
            loop {
                let finished = done.load(Ordering::Acquire);
                let entries = harness.cache.component_entries(members[0]);
                let units: Vec<DefId> = entries.iter().map(|entry| entry.unit).collect();
                assert_eq!(units, members);
                assert!(entries.iter().all(|entry| entry.stamp == entries[0].stamp));
                assert!(entries.iter().all(|entry| entry.component == members));
                views += 1;
                if finished {
                    return views;
                }
            }
        });
        for round in 0..20 {
            harness.edit(if round % 2 == 0 { &edited } else { MUTUAL });
            let (summary, diagnostics) = harness.check();
            assert_eq!(diagnostics, vec![]);
            assert_eq!(summary.checked, 3);
        }
        done.store(true, Ordering::Release);
        reader.join().unwrap()
    });
    assert!(views > 0);
    for name in ["h", "f", "g"] {
        assert!(harness.is_valid(name));
    }
}
