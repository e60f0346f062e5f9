//! A lambda-calculus recognizer grammar, matching spec.md's E9 scenario:
//! `term := variable | abstraction | application`, accepting `"(x (y z))"`.
//!
//! This is a pure *recognizer* (booleans, via `accept`/`matches`) rather
//! than a grammar that builds an AST — spec.md's scenario only asks
//! whether the input is accepted.

use petitgraph::charset::{any_of, letter, whitespace};
use petitgraph::grammar::GrammarBuilder;
use petitgraph::node::Parser;
use petitgraph::strlit::string_of;

fn lambda_grammar() -> GrammarBuilder {
    let mut g = GrammarBuilder::new();

    g.define("variable", letter("letter expected").plus());

    g.define(
        "abstraction",
        string_of("\\")
            .seq(&[
                g.ref_("variable"),
                any_of(".", None),
                g.ref_("term"),
            ]),
    );

    g.define(
        "application",
        any_of("(", None)
            .seq(&[
                g.ref_("term"),
                whitespace("whitespace expected").plus(),
                g.ref_("term"),
                any_of(")", None),
            ]),
    );

    g.define(
        "term",
        g.ref_("abstraction").or(&[g.ref_("application"), g.ref_("variable")]),
    );

    g
}

fn recognizer() -> Parser {
    lambda_grammar().build("term")
}

fn main() {
    let parser = recognizer();
    for input in ["(x (y z))", "\\x.x", "(\\f.\\x.(f x) y)"] {
        println!("{input} => accept = {}", parser.accept(input));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_an_application_of_two_variables() {
        assert!(recognizer().accept("(x (y z))"));
    }

    #[test]
    fn accepts_an_abstraction() {
        assert!(recognizer().accept("\\x.x"));
    }

    #[test]
    fn rejects_an_unbalanced_application() {
        assert!(!recognizer().accept("(x (y z)"));
    }
}
