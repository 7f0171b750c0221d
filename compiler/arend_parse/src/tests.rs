use super::*;
use arend_ir::{
    Associativity, DefBody, DefIndex, ElemPosition, ExprId, ExprKind, Fixity, FunctionBody,
    LongName, PatternKind, Precedence,
};
use pretty_assertions::assert_eq;

fn parse_ok(source: &str) -> ConcreteModule {
    let output = parse(ModulePath::parse("Test"), source);
    assert_eq!(output.diagnostics, vec![], "unexpected syntax errors");
    output.module
}

fn def_named(module: &ConcreteModule, name: &str) -> DefIndex {
    module
        .def_indices()
        .find(|&index| module.def(index).name == name)
        .unwrap_or_else(|| panic!("no definition named {name}"))
}

/// Render an expression back to a compact form for assertions.
fn show(module: &ConcreteModule, id: ExprId) -> String {
    match &module.expr(id).kind {
        ExprKind::Ref(name) => name.to_string(),
        ExprKind::Number(n) => n.to_string(),
        ExprKind::Universe => "\\Type".to_string(),
        ExprKind::Hole => "_".to_string(),
        ExprKind::Seq(elems) => {
            let parts: Vec<String> = elems
                .iter()
                .map(|elem| {
                    let inner = show(module, elem.expr);
                    match (elem.explicit, elem.position) {
                        (false, _) => format!("{{{inner}}}"),
                        (true, ElemPosition::Operand) => format!("({inner})"),
                        (true, ElemPosition::Infix) => format!("`{inner}`"),
                        (true, ElemPosition::Postfix) => format!("`{inner}"),
                        (true, ElemPosition::Natural) => inner,
                    }
                })
                .collect();
            format!("[{}]", parts.join(" "))
        }
        ExprKind::Lam { params, body } => {
            let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
            format!("\\lam {} => {}", names.join(" "), show(module, *body))
        }
        ExprKind::Pi { params, codomain } => {
            format!("\\Pi({}) -> {}", params.len(), show(module, *codomain))
        }
        ExprKind::Arrow { domain, codomain } => {
            format!("{} -> {}", show(module, *domain), show(module, *codomain))
        }
        ExprKind::Error => "<error>".to_string(),
    }
}

fn term_body(module: &ConcreteModule, index: DefIndex) -> ExprId {
    match &module.def(index).body {
        DefBody::Function(FunctionBody::Term(expr)) => *expr,
        other => panic!("expected a term body, found {other:?}"),
    }
}

#[test]
fn test_function_with_telescope_and_result() {
    let module = parse_ok("\\func f (x y : Nat) {A : \\Type} : Nat => x + y");
    let f = def_named(&module, "f");
    let def = module.def(f);
    assert_eq!(def.params.len(), 3);
    assert_eq!(def.params[1].name, "y");
    assert!(!def.params[2].explicit);
    assert_eq!(def.params[0].ty, def.params[1].ty);
    assert_eq!(show(&module, def.result.unwrap()), "Nat");
    assert_eq!(show(&module, term_body(&module, f)), "[x + y]");
    assert_eq!(module.top_level, vec![f]);
}

#[test]
fn test_sequence_element_positions() {
    let module = parse_ok("\\func f => g {A} (a + b) x `div` y z `!");
    let body = term_body(&module, def_named(&module, "f"));
    assert_eq!(show(&module, body), "[g {A} ([a + b]) x `div` y z `!]");
}

#[test]
fn test_arrow_is_right_associative() {
    let module = parse_ok("\\func T => Nat -> Nat -> \\Type");
    let body = term_body(&module, def_named(&module, "T"));
    assert_eq!(show(&module, body), "Nat -> Nat -> \\Type");
    match &module.expr(body).kind {
        ExprKind::Arrow { codomain, .. } => {
            assert!(matches!(module.expr(*codomain).kind, ExprKind::Arrow { .. }));
        }
        other => panic!("expected arrow, found {other:?}"),
    }
}

#[test]
fn test_lambda_closes_a_sequence() {
    let module = parse_ok("\\func f => g \\lam x {y} => x");
    let body = term_body(&module, def_named(&module, "f"));
    assert_eq!(show(&module, body), "[g \\lam x y => x]");
}

#[test]
fn test_pi_type() {
    let module = parse_ok("\\func idType => \\Pi (A : \\Type) (a : A) -> A");
    let body = term_body(&module, def_named(&module, "idType"));
    assert_eq!(show(&module, body), "\\Pi(2) -> A");
}

#[test]
fn test_data_constructors() {
    let module = parse_ok("\\data List (A : \\Type) | nil | \\infixr 5 :: A (List A)");
    let list = module.def(def_named(&module, "List"));
    let DefBody::Data { constructors } = &list.body else {
        panic!("expected data body");
    };
    assert_eq!(constructors.len(), 2);
    assert_eq!(constructors[0].name, "nil");
    assert!(constructors[0].params.is_empty());
    assert_eq!(constructors[1].name, "::");
    assert_eq!(constructors[1].precedence.fixity, Fixity::Infix);
    assert_eq!(constructors[1].precedence.associativity, Associativity::Right);
    assert_eq!(constructors[1].params.len(), 2);
    assert!(constructors[1].params.iter().all(|p| p.is_anonymous()));
    assert_eq!(show(&module, constructors[1].params[1].ty.unwrap()), "[List A]");
}

#[test]
fn test_class_and_instance() {
    let module = parse_ok(
        "\\class Monoid (E : \\Type)\n\
         | ide : E\n\
         | \\infixl 6 op : E -> E -> E\n\
         \\instance NatMonoid : Monoid Nat\n\
         | ide => 0\n\
         | op => +",
    );
    let class = module.def(def_named(&module, "Monoid"));
    let DefBody::Class { fields } = &class.body else {
        panic!("expected class body");
    };
    assert_eq!(fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["ide", "op"]);
    assert_eq!(fields[1].precedence, Precedence::infix(Associativity::Left, 6));

    let instance = module.def(def_named(&module, "NatMonoid"));
    assert_eq!(show(&module, instance.result.unwrap()), "[Monoid Nat]");
    let DefBody::Instance { implementations } = &instance.body else {
        panic!("expected instance body");
    };
    assert_eq!(implementations.len(), 2);
    assert_eq!(show(&module, implementations[1].value), "+");
}

#[test]
fn test_meta_definition() {
    let module = parse_ok("\\meta twice f x => f (f x)");
    let meta = module.def(def_named(&module, "twice"));
    assert_eq!(meta.params.len(), 2);
    assert!(meta.params.iter().all(|p| p.ty.is_none()));
    let DefBody::Meta { body } = meta.body else {
        panic!("expected meta body");
    };
    assert_eq!(show(&module, body), "[f ([f x])]");
}

#[test]
fn test_clauses_with_elim() {
    let module = parse_ok(
        "\\func pred (n : Nat) : Nat \\elim n\n\
         | zero => zero\n\
         | suc (suc m) => m\n\
         | _ => 0",
    );
    let pred = module.def(def_named(&module, "pred"));
    let DefBody::Function(FunctionBody::Clauses { elim, clauses }) = &pred.body else {
        panic!("expected clauses");
    };
    assert_eq!(elim.as_ref().map(Vec::len), Some(1));
    assert_eq!(clauses.len(), 3);
    match &module.pattern(clauses[1].patterns[0]).kind {
        PatternKind::Name { name, args } => {
            assert_eq!(name, &LongName::short("suc"));
            assert_eq!(args.len(), 1);
            assert!(matches!(
                &module.pattern(args[0]).kind,
                PatternKind::Name { args, .. } if args.len() == 1
            ));
        }
        other => panic!("unexpected pattern {other:?}"),
    }
    assert_eq!(module.pattern(clauses[2].patterns[0]).kind, PatternKind::Wildcard);
}

#[test]
fn test_clauses_without_elim() {
    let module = parse_ok("\\func plus (a b : Nat) : Nat | zero, b => b | suc a, b => suc (plus a b)");
    let plus = module.def(def_named(&module, "plus"));
    let DefBody::Function(FunctionBody::Clauses { elim, clauses }) = &plus.body else {
        panic!("expected clauses");
    };
    assert!(elim.is_none());
    assert_eq!(clauses[0].patterns.len(), 2);
}

#[test]
fn test_where_blocks_nest() {
    let module = parse_ok(
        "\\func f => g \\where {\n\
           \\func g => h \\where \\func h => 0\n\
         }\n\
         \\func k => f",
    );
    let f = def_named(&module, "f");
    let g = def_named(&module, "g");
    let h = def_named(&module, "h");
    assert_eq!(module.def(f).where_defs, vec![g]);
    assert_eq!(module.def(g).where_defs, vec![h]);
    assert_eq!(module.long_name(h), LongName::parse("f.g.h"));
    assert_eq!(module.top_level.len(), 2);
    assert_eq!(module.enclosing(h), vec![h, g, f]);
    let def = module.def(f);
    assert!(def.own_span().end < def.span.end);
}

#[test]
fn test_alias_and_fixity() {
    let module = parse_ok("\\func \\infixl 6 + \\alias \\infixl 6 plus (a b : Nat) : Nat => a");
    let plus = module.def(def_named(&module, "+"));
    assert_eq!(plus.precedence, Precedence::infix(Associativity::Left, 6));
    let alias = plus.alias.as_ref().unwrap();
    assert_eq!(alias.name, "plus");
    assert_eq!(alias.precedence.priority, 6);
}

#[test]
fn test_imports_and_opens() {
    let module = parse_ok(
        "\\import Data.Nat (suc \\as \\infixl 4 s, zero) \\hiding (plus)\n\
         \\import Logic \\using (and)\n\
         \\import Prelude\n\
         \\open Nat \\hiding (zero)",
    );
    assert_eq!(module.imports.len(), 3);
    let first = &module.imports[0];
    assert_eq!(first.path, ModulePath::parse("Data.Nat"));
    let using = first.filter.using.as_ref().unwrap();
    assert_eq!(using[0].new_name.as_deref(), Some("s"));
    assert_eq!(using[0].precedence.map(|p| p.priority), Some(4));
    assert_eq!(using[1].new_name, None);
    assert_eq!(first.filter.hiding[0].name, "plus");
    assert!(module.imports[2].filter.is_trivial());
    assert_eq!(module.opens[0].target, LongName::short("Nat"));
    assert_eq!(module.opens[0].filter.hiding.len(), 1);
}

#[test]
fn test_error_inside_parentheses_is_local() {
    let output = parse(
        ModulePath::parse("Test"),
        "\\func f => g (x => y) z\n\\func ok => 0",
    );
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].kind, arend_diagnostic::ErrorKind::SyntaxError);
    let module = output.module;
    let f = def_named(&module, "f");
    assert!(module.def(f).erroneous);
    assert_eq!(show(&module, term_body(&module, f)), "[g (<error>) z]");
    assert!(!module.def(def_named(&module, "ok")).erroneous);
}

#[test]
fn test_recovery_resumes_at_next_definition() {
    let output = parse(
        ModulePath::parse("Test"),
        "\\func broken (x : ) : Nat => x\n\\data D | c\n\\func fine => c",
    );
    assert!(output.has_errors());
    let module = output.module;
    assert!(module.def(def_named(&module, "broken")).erroneous);
    assert!(module.has_erroneous_defs());
    assert!(!module.def(def_named(&module, "D")).erroneous);
    assert!(!module.def(def_named(&module, "fine")).erroneous);
    assert_eq!(module.top_level.len(), 3);
}

#[test]
fn test_bad_clause_keeps_other_clauses() {
    let output = parse(
        ModulePath::parse("Test"),
        "\\func f (n : Nat) : Nat | zero => => | suc m => m",
    );
    assert_eq!(output.diagnostics.len(), 1);
    let module = output.module;
    let f = module.def(def_named(&module, "f"));
    assert!(f.erroneous);
    let DefBody::Function(FunctionBody::Clauses { clauses, .. }) = &f.body else {
        panic!("expected clauses");
    };
    assert_eq!(clauses.len(), 1);
}

#[test]
fn test_missing_name_drops_definition() {
    let output = parse(ModulePath::parse("Test"), "\\func => 0\n\\func g => 1");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.module.top_level.len(), 1);
    assert_eq!(output.module.def(output.module.top_level[0]).name, "g");
}

#[test]
fn test_stray_tokens_at_top_level() {
    let output = parse(ModulePath::parse("Test"), "x y z \\func g => 1");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.module.top_level.len(), 1);
}

#[test]
fn test_lexer_errors_become_diagnostics() {
    let output = parse(ModulePath::parse("Test"), "\\func f => 1 \\nonsense");
    assert_eq!(output.diagnostics.len(), 1);
    assert!(output.diagnostics[0].message.contains("\\nonsense"));
}

#[test]
fn test_priority_out_of_range() {
    let output = parse(ModulePath::parse("Test"), "\\func \\infix 11 + => 0");
    assert_eq!(output.diagnostics.len(), 1);
    assert!(output.module.top_level.is_empty());
}

#[test]
fn test_lone_implicit_argument_is_an_error() {
    let output = parse(ModulePath::parse("Test"), "\\func f => {x}");
    assert_eq!(output.diagnostics.len(), 1);
    assert!(output.module.defs[0].erroneous);
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let depth = 5_000;
    let source = format!("\\func f => {}x{}", "(".repeat(depth), ")".repeat(depth));
    let module = parse_ok(&source);
    assert_eq!(show(&module, term_body(&module, def_named(&module, "f"))), "x");
}

#[test]
fn test_reparse_is_equal() {
    let source = "\\func f (x : Nat) => x \\where \\func g => f 0";
    let a = parse(ModulePath::parse("Test"), source);
    let b = parse(ModulePath::parse("Test"), source);
    assert_eq!(a, b);
}
