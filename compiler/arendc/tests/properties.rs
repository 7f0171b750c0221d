//! End-to-end properties of the server: operator association, recursive
//! groups, invalidation, ambiguity, fixity errors and cancellation.

use arend_diagnostic::{Diagnostic, ErrorKind};
use arend_ir::{DefBody, DefId, ExprId, FunctionBody, LongName, ModulePath};
use arend_resolve::Resolution;
use arend_typeck::{
    CancellationToken, Cancelled, EntryStatus, NoProgress, RecursionStatus, SnapshotSource,
};
use arendc::{ArendServer, ServerContext};
use pretty_assertions::assert_eq;

fn module(path: &str) -> ModulePath {
    ModulePath::parse(path)
}

fn server(modules: &[(&str, &str)]) -> ArendServer {
    let server = ArendServer::new(ServerContext::new());
    for (path, source) in modules {
        server.update_module(module(path), *source);
    }
    server
}

fn check(server: &ArendServer, paths: &[&str]) -> Vec<Diagnostic> {
    let paths: Vec<_> = paths.iter().map(|path| module(path)).collect();
    let mut diagnostics = Vec::new();
    server
        .checker_for(&paths)
        .unwrap()
        .typecheck(None, &mut diagnostics, &CancellationToken::new(), &mut NoProgress)
        .unwrap();
    diagnostics
}

fn kinds(diagnostics: &[Diagnostic]) -> Vec<ErrorKind> {
    diagnostics.iter().map(|diagnostic| diagnostic.kind).collect()
}

fn id(server: &ArendServer, path: &str, name: &str) -> DefId {
    server
        .snapshot()
        .lookup(&module(path), &LongName::parse(name))
        .unwrap()
}

fn status(server: &ArendServer, path: &str, name: &str) -> EntryStatus {
    let unit = server.snapshot().unit_of(id(server, path, name));
    server.cache().entry(unit).unwrap().status.clone()
}

/// The association of the body of `name`, fully parenthesized. `text` is
/// the module source.
fn association(server: &ArendServer, path: &str, name: &str, text: &str) -> String {
    let workspace = server.snapshot();
    let unit = workspace.module(&module(path)).unwrap();
    let concrete = &unit.concrete;
    let index = concrete
        .def_indices()
        .find(|&index| concrete.def(index).name == name)
        .unwrap();
    let DefBody::Function(FunctionBody::Term(body)) = concrete.def(index).body else {
        panic!("{name} has no term body");
    };
    let element = |id: ExprId| {
        let span = concrete.expr(id).span;
        text[span.start as usize..span.end as usize].to_string()
    };
    unit.resolved.op_tree(body).unwrap().render(&element)
}

const TREES: &str = "\\data Tree | leaf | node Tree Tree\n\
                     \\data Is (t : Tree) | is\n\
                     \\func mkIs (t : Tree) : Is t => is\n\
                     \\func \\infixl 5 & (a b : Tree) : Tree => node a b\n\
                     \\func \\infixr 5 ^ (a b : Tree) : Tree => node a b\n";

#[test]
fn test_equal_priority_chains_follow_associativity() {
    let source = format!(
        "{TREES}\\func l => leaf & leaf & leaf\n\
         \\func r => leaf ^ leaf ^ leaf"
    );
    let server = server(&[("M", &source)]);
    assert_eq!(association(&server, "M", "l", &source), "((leaf & leaf) & leaf)");
    assert_eq!(association(&server, "M", "r", &source), "(leaf ^ (leaf ^ leaf))");

    // The association is what the typechecker sees.
    let checked = format!(
        "{TREES}\\func l : Is (node (node leaf leaf) leaf) => mkIs (leaf & leaf & leaf)\n\
         \\func r : Is (node leaf (node leaf leaf)) => mkIs (leaf ^ leaf ^ leaf)\n\
         \\func wrong : Is (node leaf (node leaf leaf)) => mkIs (leaf & leaf & leaf)"
    );
    let server = self::server(&[("M", &checked)]);
    let diagnostics = check(&server, &["M"]);
    assert_eq!(kinds(&diagnostics), vec![ErrorKind::TypeMismatch]);
    assert_eq!(diagnostics[0].anchor.definition, Some(id(&server, "M", "wrong")));
}

#[test]
fn test_operand_after_postfix_is_not_dropped() {
    let source = "\\func \\postfix 9 ! (a : Nat) : Nat => a\n\
                  \\func t (x y : Nat) : Nat => x ! y";
    let server = server(&[("M", source)]);
    assert_eq!(association(&server, "M", "t", source), "((x !) y)");
    let diagnostics = check(&server, &["M"]);
    assert!(!diagnostics.is_empty());
    assert!(diagnostics
        .iter()
        .all(|diagnostic| diagnostic.anchor.definition == Some(id(&server, "M", "t"))));
}

const MUTUAL: &str = "\\func h (n : Nat) : Nat | zero => 0 | suc m => f m\n\
                      \\func f (n : Nat) : Nat | zero => 1 | suc m => g m\n\
                      \\func g (n : Nat) : Nat | zero => 2 | suc m => h m\n";

#[test]
fn test_mutual_recursion_forms_one_group() {
    let server = server(&[("M", MUTUAL)]);
    assert_eq!(check(&server, &["M"]), vec![]);
    let mut members = vec![id(&server, "M", "h"), id(&server, "M", "f"), id(&server, "M", "g")];
    members.sort_unstable();

    server.update_module(module("M"), MUTUAL.replace("zero => 1", "zero => 5"));
    assert_eq!(check(&server, &["M"]), vec![]);
    for name in ["h", "f", "g"] {
        let core = server
            .resolved_definition(&arend_resolve::Referable::Global(id(&server, "M", name)))
            .unwrap();
        assert_eq!(core.status, RecursionStatus::Mutual(members.clone()));
    }
}

#[test]
fn test_edits_invalidate_exactly_the_dependents() {
    let server = server(&[
        ("A", "\\func x : Nat => 0\n\\func unrelated : Nat => 1"),
        ("B", "\\import A\n\\func y : Nat => x"),
        ("C", "\\import B\n\\func z : Nat => y\n\\func alone : Nat => 2"),
    ]);
    assert_eq!(check(&server, &["A", "B", "C"]), vec![]);
    let stamp = |path: &str, name: &str| server.cache().stamp(id(&server, path, name)).unwrap();
    let valid = |path: &str, name: &str| {
        server
            .cache()
            .valid_entry(id(&server, path, name), &server.snapshot())
            .is_some()
    };
    let before = [stamp("A", "unrelated"), stamp("C", "alone"), stamp("C", "z")];

    server.update_module(module("A"), "\\func x : Nat => 3\n\\func unrelated : Nat => 1");
    assert!(!valid("A", "x"));
    assert!(!valid("B", "y"));
    assert!(!valid("C", "z"));
    assert!(valid("A", "unrelated"));
    assert!(valid("C", "alone"));

    assert_eq!(check(&server, &["A", "B", "C"]), vec![]);
    assert_eq!(stamp("A", "unrelated"), before[0]);
    assert_eq!(stamp("C", "alone"), before[1]);
    assert_ne!(stamp("C", "z"), before[2]);
}

#[test]
fn test_name_from_two_imports_is_ambiguous() {
    let server = server(&[
        ("A", "\\func x => 0"),
        ("B", "\\func x => 1"),
        ("C", "\\import A\n\\import B\n\\func y => x"),
        ("D", "\\import A\n\\import B \\hiding (x)\n\\func y => x"),
    ]);
    let scope = server.module_scope(&module("C")).unwrap();
    let Resolution::Ambiguous(candidates) = server.resolve(&LongName::short("x"), &scope) else {
        panic!("expected an ambiguous resolution");
    };
    assert_eq!(candidates.len(), 2);
    assert_eq!(
        kinds(&server.diagnostics(&[module("C")])),
        vec![ErrorKind::AmbiguousReference]
    );

    let scope = server.module_scope(&module("D")).unwrap();
    let resolved = server.resolve(&LongName::short("x"), &scope);
    assert_eq!(
        resolved.resolved().and_then(arend_resolve::Referable::def_id),
        Some(id(&server, "A", "x"))
    );
}

#[test]
fn test_nonfix_operator_is_an_error() {
    let server = server(&[(
        "M",
        "\\func ++ (a b : Nat) : Nat => a\n\\func g (x : Nat) => x ++ x",
    )]);
    assert_eq!(
        kinds(&server.diagnostics(&[module("M")])),
        vec![ErrorKind::OperatorParseError]
    );
}

#[test]
fn test_nonfix_names_apply_by_juxtaposition() {
    let functions = "\\func g (n : Nat) : Nat => n\n\
                     \\func f (a : Nat) (h : Nat -> Nat) (b : Nat) : Nat => h b\n";
    let applied = format!("{functions}\\func t (x y : Nat) : Nat => f x g y");
    let server = server(&[("M", &applied)]);
    assert_eq!(server.diagnostics(&[module("M")]), vec![]);
    assert_eq!(check(&server, &["M"]), vec![]);
    assert_eq!(association(&server, "M", "t", &applied), "(f x g y)");

    // Only a request for infix use needs a fixity.
    let infix = format!("{functions}\\func u (x y : Nat) : Nat => x `g` y");
    let server = self::server(&[("M", &infix)]);
    assert_eq!(
        kinds(&server.diagnostics(&[module("M")])),
        vec![ErrorKind::OperatorParseError]
    );
}

#[test]
fn test_cancellation_keeps_finished_groups() {
    let server = server(&[(
        "M",
        "\\func a : Nat => 0\n\\func b : Nat => a\n\\func c : Nat => b",
    )]);
    let cancel = CancellationToken::new();
    let mut progress = |done: usize, _total: usize| {
        // `Nat`, then `a`.
        if done == 2 {
            cancel.cancel();
        }
    };
    let mut diagnostics = Vec::new();
    let result = server
        .checker_for(&[module("M")])
        .unwrap()
        .typecheck(None, &mut diagnostics, &cancel, &mut progress);
    assert_eq!(result, Err(Cancelled));

    let valid = |name: &str| {
        server
            .cache()
            .valid_entry(id(&server, "M", name), &server.snapshot())
            .is_some()
    };
    assert!(valid("a"));
    assert!(!valid("b"));
    assert!(server.cache().entry(id(&server, "M", "c")).is_none());
    assert_eq!(status(&server, "M", "a"), EntryStatus::Ok);

    assert_eq!(check(&server, &["M"]), vec![]);
    assert!(valid("c"));
}
