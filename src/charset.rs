//! Character-class parser factories.
//!
//! Every factory here builds a [`CharacterNode`][crate::node::primitive::CharacterNode]
//! over a predicate; there's no dedicated node type per character class,
//! mirroring how the reference implementation's `character` module is a
//! handful of small functions feeding one `CharacterParser`.

use std::rc::Rc;

use crate::node::primitive::{character, CharPredicate};
use crate::node::Parser;

/// A single character equal to `ch`.
pub fn char(ch: char, message: Option<String>) -> Parser {
    let message = message.unwrap_or_else(|| format!("{ch:?} expected"));
    character(CharPredicate::Closure(Rc::new(move |c| c == ch)), message)
}

/// Any single character.
pub fn any(message: impl Into<String>) -> Parser {
    crate::node::primitive::any(message)
}

/// No character at all — always fails.
pub fn none(message: impl Into<String>) -> Parser {
    character(CharPredicate::Fn(|_| false, "none"), message)
}

/// Any one of the characters in `characters`.
pub fn any_of(characters: &str, message: Option<String>) -> Parser {
    let message = message.unwrap_or_else(|| format!("any of {characters:?} expected"));
    let set: Rc<[char]> = characters.chars().collect::<Vec<_>>().into();
    character(
        CharPredicate::Closure(Rc::new(move |c| set.contains(&c))),
        message,
    )
}

/// None of the characters in `characters`.
pub fn none_of(characters: &str, message: Option<String>) -> Parser {
    let message = message.unwrap_or_else(|| format!("none of {characters:?} expected"));
    let set: Rc<[char]> = characters.chars().collect::<Vec<_>>().into();
    character(
        CharPredicate::Closure(Rc::new(move |c| !set.contains(&c))),
        message,
    )
}

/// A single ASCII/Unicode digit.
pub fn digit(message: impl Into<String>) -> Parser {
    character(CharPredicate::Fn(|c| c.is_numeric(), "digit"), message)
}

/// A single alphabetic letter.
pub fn letter(message: impl Into<String>) -> Parser {
    character(CharPredicate::Fn(|c| c.is_alphabetic(), "letter"), message)
}

/// A single lowercase letter.
pub fn lowercase(message: impl Into<String>) -> Parser {
    character(CharPredicate::Fn(|c| c.is_lowercase(), "lowercase"), message)
}

/// A single uppercase letter.
pub fn uppercase(message: impl Into<String>) -> Parser {
    character(CharPredicate::Fn(|c| c.is_uppercase(), "uppercase"), message)
}

/// A single character within the inclusive range `[start, end]`.
pub fn range(start: char, end: char, message: Option<String>) -> Parser {
    let message = message.unwrap_or_else(|| format!("{start}..{end} expected"));
    character(
        CharPredicate::Closure(Rc::new(move |c| start <= c && c <= end)),
        message,
    )
}

/// A single whitespace character.
pub fn whitespace(message: impl Into<String>) -> Parser {
    character(CharPredicate::Fn(|c| c.is_whitespace(), "whitespace"), message)
}

/// A single letter or digit.
pub fn word(message: impl Into<String>) -> Parser {
    character(
        CharPredicate::Fn(|c| c.is_alphanumeric(), "word"),
        message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_accepts_unicode_decimal_digits() {
        assert!(digit("digit expected").accept("7"));
        assert!(!digit("digit expected").accept("x"));
    }

    #[test]
    fn any_of_matches_only_listed_characters() {
        let p = any_of("abc", None);
        assert!(p.accept("b"));
        assert!(!p.accept("d"));
    }

    #[test]
    fn none_of_matches_the_complement() {
        let p = none_of("abc", None);
        assert!(p.accept("d"));
        assert!(!p.accept("a"));
    }

    #[test]
    fn range_is_inclusive() {
        let p = range('a', 'f', None);
        assert!(p.accept("a"));
        assert!(p.accept("f"));
        assert!(!p.accept("g"));
    }
}
