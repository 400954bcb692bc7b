//! Property-based tests for operand splitting
//!
//! Invariants that should hold for every operand list:
//! - Roundtrip: joining the split operands with commas recovers the input
//! - Count: quoted or parenthesised commas never add an operand

use hlasm_flow::features::parsing::split_operands;
use proptest::prelude::*;

fn plain() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9]{0,6}"
}

fn quoted() -> impl Strategy<Value = String> {
    "[A-Z ,]{0,6}".prop_map(|body| format!("C'{}'", body))
}

fn nested() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Z0-9]{1,4}", 1..4).prop_map(|parts| format!("({})", parts.join(",")))
}

fn operand() -> impl Strategy<Value = String> {
    prop_oneof![plain(), quoted(), nested()]
}

proptest! {
    #[test]
    fn prop_split_roundtrip(operands in prop::collection::vec(operand(), 1..6)) {
        let joined = operands.join(",");
        let split = split_operands(&joined);
        prop_assert_eq!(split.join(","), joined);
        prop_assert_eq!(split, operands);
    }
}

#[test]
fn test_split_examples() {
    assert_eq!(split_operands("A,C'X,Y',(B,C)"), vec!["A", "C'X,Y'", "(B,C)"]);
    assert_eq!(split_operands("A,,B"), vec!["A", "", "B"]);
    assert!(split_operands("").is_empty());
}
