#![no_main]
use std::str;

use libfuzzer_sys::fuzz_target;

use petitgraph::charset::{any_of, digit, none_of};
use petitgraph::grammar::GrammarBuilder;
use petitgraph::node::Parser;
use petitgraph::strlit::string_of;
use petitgraph::value::Value;

fn whitespace() -> Parser {
    any_of(" \t\r\n", None).star()
}

fn token(p: Parser) -> Parser {
    p.trim(Some(whitespace()), Some(whitespace()))
}

fn string_literal() -> Parser {
    petitgraph::charset::char('"', None)
        .seq(&[
            petitgraph::charset::char('\\', None)
                .seq(&[petitgraph::charset::any("escape expected")])
                .or(&[none_of("\"\\", None)])
                .star(),
            petitgraph::charset::char('"', None),
        ])
        .flatten(None)
}

fn json_value() -> Parser {
    let mut g = GrammarBuilder::new();
    g.define(
        "value",
        g.ref_("object")
            .or(&[g.ref_("array"), g.ref_("string"), g.ref_("number"), g.ref_("boolean"), g.ref_("null")]),
    );
    let member = string_literal()
        .seq(&[token(petitgraph::charset::char(':', None)), g.ref_("value")])
        .map(|v| Value::List(vec![v.pick(0), v.pick(2)]));
    g.define(
        "object",
        token(petitgraph::charset::char('{', None)).seq(&[
            member.delimited_by(&token(petitgraph::charset::char(',', None))),
            token(petitgraph::charset::char('}', None)),
        ]),
    );
    g.define(
        "array",
        token(petitgraph::charset::char('[', None)).seq(&[
            g.ref_("value").delimited_by(&token(petitgraph::charset::char(',', None))),
            token(petitgraph::charset::char(']', None)),
        ]),
    );
    g.define("string", token(string_literal()));
    g.define(
        "number",
        token(
            petitgraph::charset::char('-', None)
                .optional(Value::Unit)
                .seq(&[digit("digit expected").plus()])
                .flatten(None),
        ),
    );
    g.define("boolean", token(string_of("true").or(&[string_of("false")])));
    g.define("null", token(string_of("null")));
    g.build("value")
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.len() > 4096 {
        return;
    }
    let _ = json_value().parse(input);
});
