use super::*;
use crate::Workspace;
use arend_parse::parse;
use pretty_assertions::assert_eq;

const NAT: &str = "\\data Nat | zero | suc Nat\n";

fn workspace(modules: &[(&str, &str)]) -> Workspace {
    let mut workspace = Workspace::new(None);
    for (path, source) in modules {
        let output = parse(ModulePath::parse(path), source);
        assert_eq!(output.diagnostics, vec![], "syntax errors in {path}");
        workspace.update_module(output.module, output.diagnostics);
    }
    workspace
}

fn kinds(workspace: &Workspace, path: &str) -> Vec<ErrorKind> {
    workspace
        .diagnostics(&ModulePath::parse(path))
        .iter()
        .map(|diagnostic| diagnostic.kind)
        .collect()
}

fn show(workspace: &Workspace, referable: &Referable) -> String {
    match referable.def_id().and_then(|id| workspace.def_info(id)) {
        Some(info) => format!("{}.{}", info.module, info.long_name),
        None => "local".to_string(),
    }
}

/// What every occurrence of `name` in module `path` resolved to, in source
/// order; `?` for unresolved occurrences.
fn resolved(workspace: &Workspace, path: &str, name: &str) -> Vec<String> {
    let unit = workspace.module(&ModulePath::parse(path)).unwrap();
    let module = &unit.concrete;
    let mut found: Vec<(u32, String)> = (0..module.expr_count())
        .map(ExprId::from_usize)
        .filter(|&id| matches!(&module.expr(id).kind, ExprKind::Ref(n) if n.to_string() == name))
        .map(|id| {
            let shown = unit
                .resolved
                .referent(id)
                .map_or_else(|| "?".to_string(), |r| show(workspace, r));
            (module.expr(id).span.start, shown)
        })
        .collect();
    found.sort();
    found.into_iter().map(|(_, shown)| shown).collect()
}

fn def_index(workspace: &Workspace, path: &str, name: &str) -> DefIndex {
    let unit = workspace.module(&ModulePath::parse(path)).unwrap();
    unit.concrete
        .def_indices()
        .find(|&index| unit.concrete.def(index).name == name)
        .unwrap()
}

fn rendered_body(workspace: &Workspace, path: &str, name: &str) -> String {
    let index = def_index(workspace, path, name);
    let unit = workspace.module(&ModulePath::parse(path)).unwrap();
    let DefBody::Function(FunctionBody::Term(body)) = unit.concrete.def(index).body else {
        panic!("{name} has no term body");
    };
    let text = |id: ExprId| element_text(&unit.concrete, id);
    unit.resolved.op_tree(body).unwrap().render(&text)
}

#[test]
fn test_two_imports_make_a_name_ambiguous() {
    let workspace = workspace(&[
        ("A", "\\func x => 0"),
        ("B", "\\func x => 1"),
        ("C", "\\import A\n\\import B\n\\func y => x"),
    ]);
    assert_eq!(kinds(&workspace, "C"), vec![ErrorKind::AmbiguousReference]);

    let scope = workspace.module_scope(&ModulePath::parse("C")).unwrap();
    let Resolution::Ambiguous(candidates) = scope.resolve(&LongName::short("x")) else {
        panic!("expected an ambiguous resolution");
    };
    let shown: Vec<String> = candidates.iter().map(|c| show(&workspace, c)).collect();
    assert_eq!(shown, vec!["A.x", "B.x"]);
}

#[test]
fn test_hiding_removes_the_ambiguity() {
    let workspace = workspace(&[
        ("A", "\\func x => 0"),
        ("B", "\\func x => 1"),
        ("C", "\\import A\n\\import B \\hiding (x)\n\\func y => x"),
    ]);
    assert_eq!(kinds(&workspace, "C"), vec![]);
    assert_eq!(resolved(&workspace, "C", "x"), vec!["A.x"]);
}

#[test]
fn test_renaming_with_as() {
    let workspace = workspace(&[
        ("A", "\\func x => 0"),
        ("B", "\\func x => 1"),
        ("C", "\\import A (x \\as ax)\n\\import B\n\\func y => ax\n\\func z => x"),
    ]);
    assert_eq!(kinds(&workspace, "C"), vec![]);
    assert_eq!(resolved(&workspace, "C", "ax"), vec!["A.x"]);
    assert_eq!(resolved(&workspace, "C", "x"), vec!["B.x"]);

    let unit = workspace.module(&ModulePath::parse("C")).unwrap();
    let ax = (0..unit.concrete.expr_count())
        .map(ExprId::from_usize)
        .find_map(|id| unit.resolved.referent(id))
        .unwrap();
    assert!(matches!(ax, Referable::Alias { name, .. } if name == "ax"));
}

#[test]
fn test_using_restricts_and_checks_names() {
    let workspace = workspace(&[
        ("A", "\\func x => 0\n\\func z => 0"),
        ("C", "\\import A (x, w)\n\\func y => z"),
    ]);
    assert_eq!(
        kinds(&workspace, "C"),
        vec![ErrorKind::UnresolvedReference, ErrorKind::UnresolvedReference]
    );
    assert_eq!(resolved(&workspace, "C", "z"), vec!["?"]);
}

#[test]
fn test_qualified_names() {
    let workspace = workspace(&[
        ("Data.Nat", NAT),
        (
            "M",
            "\\import Data.Nat\n\\func one => Data.Nat.suc zero\n\\func two => Nat.suc one",
        ),
    ]);
    assert_eq!(kinds(&workspace, "M"), vec![]);
    assert_eq!(resolved(&workspace, "M", "Data.Nat.suc"), vec!["Data.Nat.Nat.suc"]);
    assert_eq!(resolved(&workspace, "M", "Nat.suc"), vec!["Data.Nat.Nat.suc"]);
    assert_eq!(resolved(&workspace, "M", "zero"), vec!["Data.Nat.Nat.zero"]);
}

#[test]
fn test_where_blocks_scope_their_definitions() {
    let workspace = workspace(&[(
        "M",
        "\\func f => g \\where \\func g => 0\n\\func h => g\n\\func k => f.g",
    )]);
    assert_eq!(resolved(&workspace, "M", "g"), vec!["M.f.g", "?"]);
    assert_eq!(resolved(&workspace, "M", "f.g"), vec!["M.f.g"]);
    assert_eq!(kinds(&workspace, "M"), vec![ErrorKind::UnresolvedReference]);
}

#[test]
fn test_locals_shadow_globals() {
    let source = format!("{NAT}\\func x => 0\n\\func f (x : Nat) => x\n\\func g => \\lam x => x");
    let workspace = workspace(&[("M", &source)]);
    assert_eq!(kinds(&workspace, "M"), vec![]);
    assert_eq!(resolved(&workspace, "M", "x"), vec!["local", "local"]);
}

#[test]
fn test_patterns_bind_constructors_or_variables() {
    let source = format!("{NAT}\\func pred (n : Nat) : Nat | zero => zero | suc m => m");
    let workspace = workspace(&[("M", &source)]);
    assert_eq!(kinds(&workspace, "M"), vec![]);
    assert_eq!(resolved(&workspace, "M", "m"), vec!["local"]);

    let unit = workspace.module(&ModulePath::parse("M")).unwrap();
    let pred = def_index(&workspace, "M", "pred");
    assert_eq!(unit.resolved.matched_params(pred), &[0]);
    let DefBody::Function(FunctionBody::Clauses { clauses, .. }) = &unit.concrete.def(pred).body
    else {
        panic!("expected clauses");
    };
    let zero = clauses[0].patterns[0];
    assert!(matches!(unit.resolved.pattern(zero), Some(PatternBinding::Constructor(_))));
    let PatternKind::Name { args, .. } = &unit.concrete.pattern(clauses[1].patterns[0]).kind else {
        panic!("expected a constructor pattern");
    };
    assert!(matches!(unit.resolved.pattern(args[0]), Some(PatternBinding::Variable(_))));
}

#[test]
fn test_duplicate_pattern_variables_clash() {
    let source = format!("{NAT}\\func f (a b : Nat) : Nat | x, x => x");
    let workspace = workspace(&[("M", &source)]);
    assert_eq!(kinds(&workspace, "M"), vec![ErrorKind::NameClash]);

    // The body sees the first binding.
    let unit = workspace.module(&ModulePath::parse("M")).unwrap();
    let index = def_index(&workspace, "M", "f");
    let DefBody::Function(FunctionBody::Clauses { clauses, .. }) = &unit.concrete.def(index).body
    else {
        panic!("expected clauses");
    };
    let Some(PatternBinding::Variable(first)) = unit.resolved.pattern(clauses[0].patterns[0])
    else {
        panic!("expected a variable pattern");
    };
    assert_eq!(
        unit.resolved.referent(clauses[0].rhs),
        Some(&Referable::Local(first))
    );
}

#[test]
fn test_elim_hides_matched_parameters_only() {
    let source = format!(
        "{NAT}\\func f (n k : Nat) : Nat \\elim n | zero => k | suc m => n\n\
         \\func g (n : Nat) : Nat \\elim q | _ => 0"
    );
    let workspace = workspace(&[("M", &source)]);
    assert_eq!(resolved(&workspace, "M", "k"), vec!["local"]);
    assert_eq!(resolved(&workspace, "M", "n"), vec!["?"]);
    assert_eq!(
        kinds(&workspace, "M"),
        vec![ErrorKind::UnresolvedReference, ErrorKind::UnresolvedReference]
    );
}

#[test]
fn test_operator_sequences_follow_fixity() {
    let source = format!(
        "{NAT}\\func \\infixl 6 + (a b : Nat) : Nat => a\n\
         \\func \\infixl 7 * (a b : Nat) : Nat => a\n\
         \\func \\infixr 5 :: (a b : Nat) : Nat => a\n\
         \\func f (a b c : Nat) => a + b * c + a\n\
         \\func g (a b c : Nat) => a :: b :: c\n\
         \\func h (a b : Nat) => suc a + suc b"
    );
    let workspace = workspace(&[("M", &source)]);
    assert_eq!(kinds(&workspace, "M"), vec![]);
    assert_eq!(rendered_body(&workspace, "M", "f"), "((a + (b * c)) + a)");
    assert_eq!(rendered_body(&workspace, "M", "g"), "(a :: (b :: c))");
    assert_eq!(rendered_body(&workspace, "M", "h"), "((suc a) + (suc b))");
}

#[test]
fn test_alias_carries_its_own_notation() {
    let source = format!(
        "{NAT}\\func plus \\alias \\infixl 6 ++ (a b : Nat) : Nat => a\n\
         \\func f (x : Nat) => x ++ x ++ x"
    );
    let workspace = workspace(&[("M", &source)]);
    assert_eq!(kinds(&workspace, "M"), vec![]);
    assert_eq!(rendered_body(&workspace, "M", "f"), "((x ++ x) ++ x)");
    assert_eq!(resolved(&workspace, "M", "++"), vec!["M.plus", "M.plus"]);
}

#[test]
fn test_nonfix_in_operator_position_is_an_error() {
    let source = format!(
        "{NAT}\\func plus (a b : Nat) : Nat => a\n\
         \\func ++ (a b : Nat) : Nat => a\n\
         \\func f (x : Nat) => x `plus` x\n\
         \\func g (x : Nat) => x ++ x"
    );
    let workspace = workspace(&[("M", &source)]);
    let diagnostics = workspace.diagnostics(&ModulePath::parse("M"));
    assert_eq!(
        kinds(&workspace, "M"),
        vec![ErrorKind::OperatorParseError, ErrorKind::OperatorParseError]
    );
    assert!(diagnostics[0]
        .message
        .starts_with("operator has no fixity declared for infix use"));
    // The misused operator becomes an ordinary argument.
    assert_eq!(rendered_body(&workspace, "M", "g"), "(x ++ x)");
}

#[test]
fn test_equal_priority_conflict_is_reported() {
    let source = format!(
        "{NAT}\\func \\infixl 6 + (a b : Nat) : Nat => a\n\
         \\func \\infixr 6 - (a b : Nat) : Nat => a\n\
         \\func f (x : Nat) => x + x - x"
    );
    let workspace = workspace(&[("M", &source)]);
    assert_eq!(kinds(&workspace, "M"), vec![ErrorKind::OperatorParseError]);
}

#[test]
fn test_duplicate_declarations_clash() {
    let workspace = workspace(&[("M", "\\func f => 0\n\\func f => 1\n\\func g => f")]);
    assert_eq!(
        kinds(&workspace, "M"),
        vec![ErrorKind::NameClash, ErrorKind::AmbiguousReference]
    );
}

#[test]
fn test_unknown_module() {
    let workspace = workspace(&[("M", "\\import Nowhere\n\\func f => 0")]);
    assert_eq!(kinds(&workspace, "M"), vec![ErrorKind::UnknownModule]);
}

#[test]
fn test_open_brings_a_namespace_into_scope() {
    let workspace = workspace(&[(
        "M",
        "\\func f => 0 \\where { \\func g => 0 \\func k => 0 }\n\
         \\open f \\hiding (k)\n\
         \\func h => g\n\
         \\func l => k",
    )]);
    assert_eq!(resolved(&workspace, "M", "g"), vec!["M.f.g"]);
    assert_eq!(resolved(&workspace, "M", "k"), vec!["?"]);
}

#[test]
fn test_unit_dependencies() {
    let source = format!(
        "{NAT}\\func f (n : Nat) : Nat => g (suc n)\n\
         \\func g (n : Nat) : Nat => f n\n\
         \\func h => 0"
    );
    let workspace = workspace(&[("M", &source)]);
    let unit = workspace.module(&ModulePath::parse("M")).unwrap();
    let id = |name: &str| unit.ids.def(def_index(&workspace, "M", name));
    let mut expected = vec![id("Nat"), id("g")];
    expected.sort_unstable();
    // `suc` is checked as part of `Nat`.
    assert_eq!(workspace.unit_deps(id("f")), expected.as_slice());
    assert!(workspace.unit_deps(id("h")).is_empty());
}

#[test]
fn test_instance_implementations_name_fields() {
    let workspace = workspace(&[(
        "M",
        "\\class Pointed (E : \\Type) | point : E\n\
         \\data Unit | unit\n\
         \\instance UnitPointed : Pointed Unit | point => unit | other => unit",
    )]);
    let unit = workspace.module(&ModulePath::parse("M")).unwrap();
    let instance = def_index(&workspace, "M", "UnitPointed");
    let field = unit.resolved.implementation(instance, 0).unwrap();
    assert_eq!(workspace.def_info(field).unwrap().long_name, LongName::parse("Pointed.point"));
    assert_eq!(unit.resolved.implementation(instance, 1), None);
    assert_eq!(kinds(&workspace, "M"), vec![ErrorKind::UnresolvedReference]);
}

#[test]
fn test_fingerprint_ignores_position() {
    let first = workspace(&[("M", "\\func f => 0")]);
    let second = workspace(&[("M", "\\func g => 1\n\n\n\\func f => 0")]);
    let fingerprint = |workspace: &Workspace| {
        let index = def_index(workspace, "M", "f");
        workspace
            .module(&ModulePath::parse("M"))
            .unwrap()
            .resolved
            .fingerprint(index)
    };
    assert_eq!(fingerprint(&first), fingerprint(&second));

    let edited = workspace(&[("M", "\\func f => 1")]);
    assert_ne!(fingerprint(&first), fingerprint(&edited));
}
