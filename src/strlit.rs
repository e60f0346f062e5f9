//! Fixed-length string-literal parser factories, and the two context-free
//! primitive factories ([`epsilon`], [`fail`]) that round out the parser
//! algebra's base cases alongside [`crate::charset`].

use crate::node::primitive::{string, StringPredicate};
use crate::node::Parser;

/// Matches `literal` exactly.
pub fn string_of(literal: &str) -> Parser {
    string_of_with_message(literal, None)
}

pub fn string_of_with_message(literal: &str, message: Option<String>) -> Parser {
    let message = message.unwrap_or_else(|| format!("{literal:?} expected"));
    string(StringPredicate::exact(literal), message)
}

/// Matches `literal` case-insensitively.
pub fn string_of_ignoring_case(literal: &str) -> Parser {
    string_of_ignoring_case_with_message(literal, None)
}

pub fn string_of_ignoring_case_with_message(literal: &str, message: Option<String>) -> Parser {
    let message = message.unwrap_or_else(|| format!("{literal:?} expected"));
    string(StringPredicate::exact_ignoring_case(literal), message)
}

/// Always succeeds, consuming nothing.
pub fn epsilon() -> Parser {
    crate::node::primitive::epsilon()
}

/// Always fails with `message`, consuming nothing.
pub fn fail(message: impl Into<String>) -> Parser {
    crate::node::primitive::fail(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_of_matches_the_exact_literal() {
        let p = string_of("hello");
        assert!(p.accept("hello"));
        assert!(!p.accept("hell"));
    }

    #[test]
    fn string_of_ignoring_case_is_case_insensitive() {
        let p = string_of_ignoring_case("hello");
        assert!(p.accept("HELLO"));
        assert!(p.accept("HeLLo"));
    }
}
