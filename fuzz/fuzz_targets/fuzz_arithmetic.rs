#![no_main]
use std::rc::Rc;
use std::str;

use libfuzzer_sys::fuzz_target;

use petitgraph::charset::{char, digit};
use petitgraph::expression::ExpressionBuilder;
use petitgraph::node::Parser;
use petitgraph::value::Value;

fn pair_of_ints(args: &[Value]) -> (i64, i64) {
    let (Value::Int(l), Value::Int(r)) = (args[0].clone(), args[2].clone()) else {
        return (0, 0);
    };
    (l, r)
}

fn arithmetic_grammar() -> Parser {
    let mut builder = ExpressionBuilder::new();
    builder.group().primitive(
        digit("digit expected").plus().flatten(None).map(|v| {
            let Value::Str(s) = v else {
                panic!("flatten always produces a string")
            };
            Value::Int(s.parse().unwrap_or(0))
        }),
        None,
    );
    builder
        .group()
        .wrapper(char('(', None), char(')', None), Some(Rc::new(|args: &[Value]| args[1].clone())));
    builder.group().left(
        char('*', None),
        Some(Rc::new(|args: &[Value]| Value::Int(pair_of_ints(args).0.saturating_mul(pair_of_ints(args).1)))),
    );
    builder
        .group()
        .left(
            char('+', None),
            Some(Rc::new(|args: &[Value]| Value::Int(pair_of_ints(args).0.saturating_add(pair_of_ints(args).1)))),
        )
        .left(
            char('-', None),
            Some(Rc::new(|args: &[Value]| Value::Int(pair_of_ints(args).0.saturating_sub(pair_of_ints(args).1)))),
        );
    builder.build()
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.len() > 4096 {
        return;
    }
    let _ = arithmetic_grammar().parse(input);
});
