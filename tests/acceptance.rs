//! End-to-end scenarios seeded directly from the grammar's test suite
//! (E1-E10) and the universal invariants it's checked against.

use petitgraph::charset::{digit, word};
use petitgraph::grammar::GrammarBuilder;
use petitgraph::node::Parser;
use petitgraph::strlit::string_of;
use petitgraph::value::Value;

// -- E1-E5: direct combinator scenarios ---------------------------------

#[test]
fn e1_sequence_of_two_characters() {
    let parser = petitgraph::charset::char('a', None).seq(&[petitgraph::charset::char('b', None)]);
    let outcome = parser.parse("ab");
    assert!(outcome.is_success());
    assert_eq!(outcome.position(), 2);
    assert_eq!(
        outcome.into_value().unwrap(),
        Value::List(vec![Value::Char('a'), Value::Char('b')])
    );
}

#[test]
fn e2_choice_fails_at_entry_position() {
    let parser = petitgraph::charset::char('a', None).or(&[petitgraph::charset::char('b', None)]);
    let outcome = parser.parse("c");
    assert!(outcome.is_failure());
    assert_eq!(outcome.position(), 0);
}

#[test]
fn e3_digits_flattened_and_trimmed() {
    let parser = digit("digit expected").plus().flatten(None).trim(None, None);
    let outcome = parser.parse("  123  ");
    assert!(outcome.is_success());
    assert_eq!(outcome.position(), 7);
    assert_eq!(outcome.into_value().unwrap(), Value::Str("123".to_owned()));
}

#[test]
fn e4_lazy_repetition_stops_as_soon_as_limiter_matches() {
    let parser = word("word expected").plus_lazy(&digit("digit expected"));
    let outcome = parser.parse("abc12");
    assert!(outcome.is_success());
    assert_eq!(outcome.position(), 3);
    assert_eq!(
        outcome.into_value().unwrap(),
        Value::List(vec![Value::Char('a'), Value::Char('b'), Value::Char('c')])
    );
}

#[test]
fn e5_greedy_repetition_backtracks_until_limiter_matches() {
    let parser = word("word expected").plus_greedy(&digit("digit expected"));
    let outcome = parser.parse("abc12");
    assert!(outcome.is_success());
    assert_eq!(outcome.position(), 4);
    assert_eq!(
        outcome.into_value().unwrap(),
        Value::List(vec![
            Value::Char('a'),
            Value::Char('b'),
            Value::Char('c'),
            Value::Char('1'),
        ])
    );
}

// -- E9-E10: grammar definition scenarios -------------------------------

#[test]
fn e9_lambda_calculus_application_is_accepted() {
    let mut g = GrammarBuilder::new();
    g.define("variable", petitgraph::charset::letter("letter expected").plus());
    g.define(
        "application",
        petitgraph::charset::any_of("(", None).seq(&[
            g.ref_("term"),
            petitgraph::charset::whitespace("whitespace expected").plus(),
            g.ref_("term"),
            petitgraph::charset::any_of(")", None),
        ]),
    );
    g.define("term", g.ref_("application").or(&[g.ref_("variable")]));

    let parser = g.build("term");
    assert!(parser.accept("(x (y z))"));
}

#[test]
#[should_panic(expected = "recursive references detected")]
fn e10_direct_self_reference_is_a_construction_error() {
    let mut g = GrammarBuilder::new();
    g.define("x", g.ref_("x"));
    g.build("x");
}

// -- Universal invariants, §8 --------------------------------------------

fn sample_parsers() -> Vec<Parser> {
    vec![
        petitgraph::charset::char('a', None),
        petitgraph::charset::digit("digit expected").plus(),
        string_of("ab").or(&[string_of("abc")]),
        petitgraph::charset::letter("letter expected").star_greedy(&digit("digit expected")),
    ]
}

#[test]
fn invariant_1_acceptance_consistency() {
    for parser in sample_parsers() {
        for input in ["", "a", "ab", "abc123", "xyz"] {
            let outcome = parser.parse(input);
            let accepted = parser.accept(input);
            assert_eq!(outcome.is_success(), accepted, "input={input:?}");
            if let petitgraph::context::Outcome::Success(s) = &outcome {
                let buffer = petitgraph::context::buffer_of(input);
                assert_eq!(parser.fast_parse_on(&buffer, 0), Some(s.position()));
            }
        }
    }
}

#[test]
fn invariant_2_deep_copy_is_structurally_equal_including_cycles() {
    for parser in sample_parsers() {
        let copy = parser.deep_copy();
        assert!(copy.is_equal_to(&parser));
    }

    let settable = petitgraph::charset::char('a', None).settable();
    settable.settable_set(petitgraph::charset::char('b', None).seq(&[settable.clone()]));
    let copy = settable.deep_copy();
    assert!(copy.is_equal_to(&settable));
}

#[test]
fn invariant_3_building_twice_is_idempotent() {
    let mut g = GrammarBuilder::new();
    g.define("digits", digit("digit expected").plus());
    let once = g.build("digits");
    let twice = g.build("digits");
    assert!(once.is_equal_to(&twice));
}

#[test]
fn invariant_4_repeat_bounds_match_exact_repeat_and_star_plus_aliases() {
    let a = petitgraph::charset::char('a', None);
    assert!(a.repeat(3, Some(3)).parse("aaa").is_success());
    assert!(a.repeat(3, Some(3)).parse("aa").is_failure());
    assert!(a.plus().is_equal_to(&a.repeat(1, None)));
    assert!(a.star().is_equal_to(&a.repeat(0, None)));
}

#[test]
fn invariant_5_possessive_consumes_all_leaving_nothing_for_the_tail() {
    let a = petitgraph::charset::char('a', None);
    assert!(a.star().seq(&[a.clone()]).parse("aaa").is_failure());
    assert!(a
        .star_greedy(&a)
        .seq(&[a.clone()])
        .parse("aaa")
        .is_success());
}

#[test]
fn invariant_6_large_input_does_not_overflow_the_stack() {
    let input = "a".repeat(100_000);
    let outcome = petitgraph::charset::char('a', None).repeat(2, None).parse(&input);
    assert!(outcome.is_success());
    assert_eq!(outcome.position(), 100_000);
}

#[test]
fn invariant_7_choice_ordering_prefers_the_first_match() {
    let parser = string_of("ab").or(&[string_of("abc")]);
    let outcome = parser.parse("abc");
    assert_eq!(outcome.position(), 2);
    assert_eq!(outcome.into_value().unwrap(), Value::Str("ab".to_owned()));
}

#[test]
fn invariant_8_mirror_visits_a_shared_node_exactly_once() {
    let shared = petitgraph::charset::char('a', None);
    let root = shared.seq(&[shared.clone()]);
    let visited: Vec<_> = petitgraph::node::algebra::ParserIterator::new(root).collect();
    // root + the one shared leaf, not two.
    assert_eq!(visited.len(), 2);
}
