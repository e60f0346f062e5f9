//! Property-based checks of spec.md §8's universal invariants, over
//! randomly generated inputs and randomly assembled choice/sequence
//! grammars of character parsers.

use proptest::prelude::*;

use petitgraph::charset::{any_of, char, digit, letter};
use petitgraph::context::{buffer_of, Outcome};
use petitgraph::grammar::GrammarBuilder;
use petitgraph::node::Parser;

/// Builds a small parser out of a handful of character-class choices,
/// shaped by `choice_mask`: each set bit adds one more alternative.
fn sample_grammar(choice_mask: u8) -> Parser {
    let mut alternatives = vec![digit("digit expected")];
    if choice_mask & 0b001 != 0 {
        alternatives.push(letter("letter expected"));
    }
    if choice_mask & 0b010 != 0 {
        alternatives.push(any_of("xyz", None));
    }
    if choice_mask & 0b100 != 0 {
        alternatives.push(char('_', None));
    }
    let first = alternatives.remove(0);
    first.or(&alternatives).star()
}

proptest! {
    #[test]
    fn invariant_1_acceptance_consistency(
        choice_mask in 0u8..8,
        input in "[a-zA-Z0-9_]{0,12}",
    ) {
        let parser = sample_grammar(choice_mask);
        let outcome = parser.parse(&input);
        let accepted = parser.accept(&input);
        prop_assert_eq!(outcome.is_success(), accepted);

        let buffer = buffer_of(&input);
        let fast = parser.fast_parse_on(&buffer, 0);
        match &outcome {
            Outcome::Success(s) => prop_assert_eq!(fast, Some(s.position())),
            Outcome::Failure(_) => prop_assert_eq!(fast, None),
        }
    }

    #[test]
    fn invariant_2_deep_copy_preserves_structural_equality(choice_mask in 0u8..8) {
        let parser = sample_grammar(choice_mask);
        let copy = parser.deep_copy();
        prop_assert!(copy.is_equal_to(&parser));
    }

    #[test]
    fn invariant_3_building_a_grammar_twice_is_idempotent(choice_mask in 0u8..8) {
        let mut g = GrammarBuilder::new();
        g.define("start", sample_grammar(choice_mask));
        let once = g.build("start");
        let twice = g.build("start");
        prop_assert!(once.is_equal_to(&twice));
    }
}

#[test]
fn invariant_2_holds_for_a_settable_induced_cycle() {
    let settable = petitgraph::charset::char('a', None).settable();
    settable.settable_set(
        petitgraph::charset::char('b', None)
            .seq(&[settable.clone()])
            .optional(petitgraph::value::Value::Unit),
    );
    let copy = settable.deep_copy();
    assert!(copy.is_equal_to(&settable));
}
