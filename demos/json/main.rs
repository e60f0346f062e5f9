//! A JSON grammar built with [`GrammarBuilder`], matching spec.md's E6
//! scenario: parses an object/array/string/number/bool/null tree into
//! `Value::Map`/`Value::List`/`Value::Str`/`Value::Float`/`Value::Bool`/
//! `Value::Unit`.

use petitgraph::charset::{any_of, digit, none_of};
use petitgraph::grammar::GrammarBuilder;
use petitgraph::node::Parser;
use petitgraph::strlit::string_of;
use petitgraph::value::Value;

fn whitespace() -> Parser {
    any_of(" \t\r\n", None).star()
}

/// `separated_by`/`delimited_by` interleave `[elem, sep, elem, sep, elem,
/// ...]`; grammar actions that only want the elements step over the
/// separators, matching `original_source/petitparser/grammar/json.py`'s
/// `data[::2]`.
fn elements_only(list: Vec<Value>) -> Vec<Value> {
    list.into_iter().step_by(2).collect()
}

fn token(p: Parser) -> Parser {
    p.trim(Some(whitespace()), Some(whitespace()))
}

fn json_grammar() -> GrammarBuilder {
    let mut g = GrammarBuilder::new();

    g.define(
        "value",
        g.ref_("object")
            .or(&[
                g.ref_("array"),
                g.ref_("string"),
                g.ref_("number"),
                g.ref_("boolean"),
                g.ref_("null"),
            ]),
    );

    let member = string_literal()
        .seq(&[token(petitgraph::charset::char(':', None)), g.ref_("value")])
        .map(|v| Value::List(vec![v.pick(0), v.pick(2)]));
    g.define(
        "object",
        token(petitgraph::charset::char('{', None))
            .seq(&[
                member.clone().delimited_by(&token(petitgraph::charset::char(',', None))),
                token(petitgraph::charset::char('}', None)),
            ])
            .map(|v| {
                let Value::List(entries) = v.pick(1) else {
                    panic!("object: delimited_by did not produce a list")
                };
                let pairs = elements_only(entries)
                    .into_iter()
                    .map(|e| {
                        let Value::List(pair) = e else {
                            panic!("object: member was not a pair")
                        };
                        let mut pair = pair.into_iter();
                        (pair.next().expect("key"), pair.next().expect("value"))
                    })
                    .collect();
                Value::Map(pairs)
            }),
    );

    g.define(
        "array",
        token(petitgraph::charset::char('[', None))
            .seq(&[
                g.ref_("value").delimited_by(&token(petitgraph::charset::char(',', None))),
                token(petitgraph::charset::char(']', None)),
            ])
            .map(|v| {
                let Value::List(elements) = v.pick(1) else {
                    panic!("array: delimited_by did not produce a list")
                };
                Value::List(elements_only(elements))
            }),
    );

    g.define("string", token(string_literal()));

    g.define(
        "number",
        token(
            petitgraph::charset::char('-', None)
                .optional(Value::Unit)
                .seq(&[digit("digit expected").plus(), fractional(), exponent()])
                .flatten(None)
                .map(|v| {
                    let Value::Str(s) = v else {
                        panic!("number: flatten did not produce a string")
                    };
                    Value::Float(s.parse().expect("number grammar guarantees valid float syntax"))
                }),
        ),
    );

    g.define("boolean", token(string_of("true").or(&[string_of("false")]).map(|v| {
        let Value::Str(s) = v else {
            panic!("boolean: string literal did not produce a string")
        };
        Value::Bool(s == "true")
    })));

    g.define("null", token(string_of("null").map(|_| Value::Unit)));

    g
}

fn string_literal() -> Parser {
    petitgraph::charset::char('"', None)
        .seq(&[
            escaped_char().or(&[none_of("\"\\", None)]).star(),
            petitgraph::charset::char('"', None),
        ])
        .map(|v| v.pick(1))
        .flatten(None)
        .map(|v| {
            let Value::Str(s) = v else {
                panic!("string: flatten did not produce a string")
            };
            Value::Str(s[1..s.len() - 1].to_owned())
        })
}

fn escaped_char() -> Parser {
    petitgraph::charset::char('\\', None).seq(&[petitgraph::charset::any("escape expected")])
}

fn fractional() -> Parser {
    petitgraph::charset::char('.', None)
        .seq(&[digit("digit expected").plus()])
        .optional(Value::Unit)
}

fn exponent() -> Parser {
    any_of("eE", None)
        .seq(&[any_of("+-", None).optional(Value::Unit), digit("digit expected").plus()])
        .optional(Value::Unit)
}

fn main() {
    let grammar = json_grammar();
    let parser = grammar.build("value").end("end of input expected");

    let input = r#"{"a":1,"b":[true,null]}"#;
    match parser.parse(input).into_value() {
        Ok(value) => println!("{input} => {value:?}"),
        Err(err) => {
            eprintln!(
                "{}",
                petitgraph::diagnostic::DiagnosticPrinter::new(err.failure(), input)
                    .colored(true)
                    .render()
            );
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_nested_object() {
        let parser = json_grammar().build("value");
        let outcome = parser.parse(r#"{"a":1,"b":[true,null]}"#);
        let value = outcome.into_value().expect("valid json");
        let Value::Map(pairs) = value else {
            panic!("expected a map");
        };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, Value::Str("a".to_owned()));
        assert_eq!(pairs[0].1, Value::Float(1.0));
        let Value::List(b) = pairs[1].1.clone() else {
            panic!("expected b to be a list");
        };
        assert_eq!(b, vec![Value::Bool(true), Value::Unit]);
    }

    #[test]
    fn rejects_trailing_garbage() {
        let parser = json_grammar().build("value").end("end of input expected");
        assert!(parser.parse("{}x").is_failure());
    }
}
