//! An arithmetic grammar built with [`ExpressionBuilder`], matching
//! spec.md's E7 (left-associative subtraction) and E8 (right-associative
//! exponentiation) scenarios.

use std::rc::Rc;

use petitgraph::charset::{char, digit};
use petitgraph::expression::ExpressionBuilder;
use petitgraph::node::Parser;
use petitgraph::value::Value;

fn pair_of_ints(args: &[Value]) -> (i64, i64) {
    let (Value::Int(l), Value::Int(r)) = (args[0].clone(), args[2].clone()) else {
        panic!("arithmetic demo: operand was not an integer")
    };
    (l, r)
}

fn number() -> Parser {
    digit("digit expected")
        .plus()
        .flatten(None)
        .map(|v| {
            let Value::Str(s) = v else {
                panic!("number: flatten did not produce a string")
            };
            Value::Int(s.parse().expect("digit+ guarantees valid integer syntax"))
        })
}

fn arithmetic_grammar() -> Parser {
    let mut builder = ExpressionBuilder::new();

    builder.group().primitive(number(), None);

    builder.group().wrapper(
        char('(', None),
        char(')', None),
        Some(Rc::new(|args: &[Value]| args[1].clone())),
    );

    // E8: right-associative exponentiation, highest precedence.
    builder.group().right(
        char('^', None),
        Some(Rc::new(|args: &[Value]| {
            let (base, exp) = pair_of_ints(args);
            Value::Int(base.pow(exp as u32))
        })),
    );

    builder.group().left(
        char('*', None),
        Some(Rc::new(|args: &[Value]| {
            let (l, r) = pair_of_ints(args);
            Value::Int(l * r)
        })),
    );

    // E7: left-associative addition/subtraction, lowest precedence.
    builder
        .group()
        .left(
            char('+', None),
            Some(Rc::new(|args: &[Value]| {
                let (l, r) = pair_of_ints(args);
                Value::Int(l + r)
            })),
        )
        .left(
            char('-', None),
            Some(Rc::new(|args: &[Value]| {
                let (l, r) = pair_of_ints(args);
                Value::Int(l - r)
            })),
        );

    builder.build()
}

fn main() {
    let parser = arithmetic_grammar();
    for input in ["1 - 2 - 3", "4 ^ 3 ^ 2", "(2 + 3) * 4"] {
        let trimmed: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let outcome = parser.parse(&trimmed);
        println!("{input} => {:?}", outcome.into_value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_associative_subtraction_matches_e7() {
        let parser = arithmetic_grammar();
        let outcome = parser.parse("1-2-3");
        assert_eq!(outcome.into_value().unwrap(), Value::Int(-4));
    }

    #[test]
    fn right_associative_exponentiation_matches_e8() {
        let parser = arithmetic_grammar();
        let outcome = parser.parse("4^3^2");
        assert_eq!(outcome.into_value().unwrap(), Value::Int(262144));
    }
}
