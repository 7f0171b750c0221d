use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Builds element sequences over a name table.
#[derive(Default)]
struct Seq {
    names: Vec<String>,
    elems: Vec<OpElem>,
}

impl Seq {
    fn push(mut self, name: &str, role: Role) -> Self {
        let id = ExprId::from_usize(self.names.len());
        let start = u32::try_from(self.names.len()).unwrap_or(0) * 2;
        self.names.push(name.to_string());
        self.elems.push(OpElem {
            expr: id,
            span: Span::new(start, start + 1),
            role,
        });
        self
    }

    fn operand(self, name: &str) -> Self {
        self.push(name, Role::Operand { explicit: true })
    }

    fn implicit(self, name: &str) -> Self {
        self.push(name, Role::Operand { explicit: false })
    }

    fn infix(self, name: &str, associativity: Associativity, priority: u8) -> Self {
        self.push(name, Role::Infix(Precedence::infix(associativity, priority)))
    }

    fn run(&self) -> (String, Vec<String>) {
        let name = |id: ExprId| self.names[id.index()].clone();
        let (tree, errors) = reassociate(&self.elems, &name);
        (tree.render(&name), errors.into_iter().map(|e| e.message).collect())
    }

    fn render(&self) -> String {
        let (rendered, errors) = self.run();
        assert_eq!(errors, Vec::<String>::new());
        rendered
    }
}

use Associativity::{Left, NonAssoc, Right};

#[test]
fn test_left_chain() {
    let seq = Seq::default()
        .operand("a")
        .infix("+", Left, 6)
        .operand("b")
        .infix("+", Left, 6)
        .operand("c");
    assert_eq!(seq.render(), "((a + b) + c)");
}

#[test]
fn test_right_chain() {
    let seq = Seq::default()
        .operand("a")
        .infix("::", Right, 5)
        .operand("b")
        .infix("::", Right, 5)
        .operand("c");
    assert_eq!(seq.render(), "(a :: (b :: c))");
}

#[test]
fn test_higher_priority_binds_tighter() {
    let seq = Seq::default()
        .operand("a")
        .infix("+", Left, 6)
        .operand("b")
        .infix("*", Left, 7)
        .operand("c")
        .infix("+", Left, 6)
        .operand("d");
    assert_eq!(seq.render(), "((a + (b * c)) + d)");
}

#[test]
fn test_application_binds_tighter_than_operators() {
    let seq = Seq::default()
        .operand("f")
        .operand("x")
        .infix("+", Left, 6)
        .operand("g")
        .implicit("A")
        .operand("y");
    assert_eq!(seq.render(), "((f x) + (g {A} y))");
}

#[test]
fn test_prefix_binds_next_operand_only() {
    let seq = Seq::default()
        .operand("f")
        .push("neg", Role::Prefix)
        .operand("x")
        .operand("y");
    assert_eq!(seq.render(), "(f (neg x) y)");

    let nested = Seq::default()
        .push("neg", Role::Prefix)
        .push("neg", Role::Prefix)
        .operand("x")
        .infix("+", Left, 6)
        .operand("y");
    assert_eq!(nested.render(), "((neg (neg x)) + y)");
}

#[test]
fn test_postfix_binds_preceding_operand() {
    let seq = Seq::default()
        .operand("a")
        .infix("+", Left, 6)
        .operand("b")
        .push("!", Role::Postfix(Precedence::postfix(8)));
    assert_eq!(seq.render(), "(a + (b !))");

    let low = Seq::default()
        .operand("a")
        .infix("+", Left, 6)
        .operand("b")
        .push("!", Role::Postfix(Precedence::postfix(2)));
    assert_eq!(low.render(), "((a + b) !)");
}

#[test]
fn test_operands_after_postfix_are_arguments() {
    let seq = Seq::default()
        .operand("a")
        .push("!", Role::Postfix(Precedence::postfix(9)))
        .operand("b");
    assert_eq!(seq.render(), "((a !) b)");

    let spine = Seq::default()
        .operand("a")
        .push("!", Role::Postfix(Precedence::postfix(9)))
        .operand("b")
        .operand("c")
        .infix("+", Left, 6)
        .operand("d");
    assert_eq!(spine.render(), "(((a !) b c) + d)");

    let low = Seq::default()
        .operand("a")
        .infix("+", Left, 6)
        .operand("b")
        .push("!", Role::Postfix(Precedence::postfix(2)))
        .operand("c");
    assert_eq!(low.render(), "(((a + b) !) c)");
}

#[test]
fn test_non_associative_tie_is_an_error() {
    let seq = Seq::default()
        .operand("a")
        .infix("==", NonAssoc, 4)
        .operand("b")
        .infix("==", NonAssoc, 4)
        .operand("c");
    let (rendered, errors) = seq.run();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("cannot parse binary operator sequence"));
    assert_eq!(rendered, "((a == b) == c)");
}

#[test]
fn test_conflicting_associativity_is_an_error() {
    let seq = Seq::default()
        .operand("a")
        .infix("+", Left, 6)
        .operand("b")
        .infix("::", Right, 6)
        .operand("c");
    let (_, errors) = seq.run();
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_missing_operands() {
    let (rendered, errors) = Seq::default().operand("a").infix("+", Left, 6).run();
    assert_eq!(rendered, "(a + <error>)");
    assert_eq!(errors, vec!["operator `+` is missing its right operand".to_string()]);

    let (rendered, errors) = Seq::default().infix("+", Left, 6).operand("b").run();
    assert_eq!(rendered, "(<error> + b)");
    assert_eq!(errors.len(), 1);

    let (_, errors) = Seq::default().operand("f").push("neg", Role::Prefix).run();
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_leading_implicit_is_an_error() {
    let (_, errors) = Seq::default().implicit("A").operand("x").run();
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_single_operand() {
    assert_eq!(Seq::default().operand("x").render(), "x");
}

fn chain(ops: usize, associativity: Associativity) -> Seq {
    let mut seq = Seq::default().operand("x0");
    for i in 1..=ops {
        seq = seq.infix("o", associativity, 5).operand(&format!("x{i}"));
    }
    seq
}

/// `+` at priority 6 and `*` at priority 7, both left associative.
fn evaluate(tree: &OpTree, values: &[u64], ops: &[&str]) -> u64 {
    match tree {
        OpTree::Leaf(id) => values[id.index()],
        OpTree::Binary { op, left, right } => {
            let l = evaluate(left, values, ops);
            let r = evaluate(right, values, ops);
            if ops[op.index()] == "+" {
                l.wrapping_add(r)
            } else {
                l.wrapping_mul(r)
            }
        }
        other => panic!("unexpected tree {other:?}"),
    }
}

proptest! {
    #[test]
    fn prop_left_chains_group_left(n in 1usize..12) {
        let expected = (1..=n).fold("x0".to_string(), |acc, i| format!("({acc} o x{i})"));
        prop_assert_eq!(chain(n, Left).render(), expected);
    }

    #[test]
    fn prop_right_chains_group_right(n in 1usize..12) {
        let expected = (0..n)
            .rev()
            .fold(format!("x{n}"), |acc, i| format!("(x{i} o {acc})"));
        prop_assert_eq!(chain(n, Right).render(), expected);
    }

    #[test]
    fn prop_sum_of_products(
        first in 0u64..100,
        rest in proptest::collection::vec((any::<bool>(), 0u64..100), 0..10),
    ) {
        // Reference: products bind tighter than sums.
        let mut sum = 0u64;
        let mut product = first;
        for &(is_sum, value) in &rest {
            if is_sum {
                sum = sum.wrapping_add(product);
                product = value;
            } else {
                product = product.wrapping_mul(value);
            }
        }
        let expected = sum.wrapping_add(product);

        let mut seq = Seq::default().operand("v");
        let mut values = vec![first];
        let mut ops = vec![""];
        for &(is_sum, value) in &rest {
            let (op, priority) = if is_sum { ("+", 6) } else { ("*", 7) };
            seq = seq.infix(op, Left, priority).operand("v");
            values.extend([0, value]);
            ops.extend([op, ""]);
        }
        let name = |id: ExprId| seq.names[id.index()].clone();
        let (tree, errors) = reassociate(&seq.elems, &name);
        prop_assert!(errors.is_empty());
        prop_assert_eq!(evaluate(&tree, &values, &ops), expected);
    }
}
