//! Leaf nodes: character/string predicates, epsilon, and failure.
//!
//! Every character-testing factory in [`crate::charset`] bottoms out in
//! [`character`], and every fixed-length string/case-insensitive factory in
//! [`crate::strlit`] bottoms out in [`string`] — mirroring the reference
//! implementation's single `CharacterParser`/`StringParser` classes fed by a
//! handful of small predicate functions, rather than one Rust type per
//! character class.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::node::{Parser, ParserNode};
use crate::value::Value;

/// A character test, carrying enough identity to support structural
/// equality the way the reference implementation's function-identity
/// equality does.
///
/// `Fn` variants compare equal when both the function pointer and label
/// match — this is what every built-in factory in [`crate::charset`] uses,
/// so e.g. two independently constructed `digit()` parsers are equal.
/// `Closure` variants compare equal only to themselves (`Rc::ptr_eq`),
/// matching Python's closures: two separately created lambdas with
/// identical bodies are never `==`.
#[derive(Clone)]
pub enum CharPredicate {
    Fn(fn(char) -> bool, &'static str),
    Closure(Rc<dyn Fn(char) -> bool>),
}

impl CharPredicate {
    pub fn test(&self, c: char) -> bool {
        match self {
            CharPredicate::Fn(f, _) => f(c),
            CharPredicate::Closure(f) => f(c),
        }
    }
}

impl PartialEq for CharPredicate {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CharPredicate::Fn(f, l), CharPredicate::Fn(g, m)) => f == g && l == m,
            (CharPredicate::Closure(f), CharPredicate::Closure(g)) => Rc::ptr_eq(f, g),
            _ => false,
        }
    }
}

impl fmt::Debug for CharPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharPredicate::Fn(_, label) => write!(f, "CharPredicate::Fn({label})"),
            CharPredicate::Closure(_) => write!(f, "CharPredicate::Closure(..)"),
        }
    }
}

/// A single-character recognizer, built from a predicate and the message to
/// raise on mismatch. Every character-class factory in [`crate::charset`]
/// constructs one of these; there is no per-class node type.
#[derive(Debug)]
pub struct CharacterNode {
    predicate: CharPredicate,
    message: String,
}

impl CharacterNode {
    pub fn new(predicate: CharPredicate, message: impl Into<String>) -> Self {
        CharacterNode {
            predicate,
            message: message.into(),
        }
    }

    /// A character node accepting the complement of this one. Distinct from
    /// [`Parser::neg`], which consumes a character by wrapping in
    /// `not`+`any` instead of inverting the predicate in place.
    pub fn negated(&self, message: Option<String>) -> CharacterNode {
        let message = message.unwrap_or_else(|| format!("not {}", self.message));
        let predicate = self.predicate.clone();
        CharacterNode::new(
            CharPredicate::Closure(Rc::new(move |c| !predicate.test(c))),
            message,
        )
    }
}

impl ParserNode for CharacterNode {
    fn parse_on(&self, context: &Context) -> crate::context::Outcome {
        let buffer = context.buffer();
        let position = context.position();
        if position < buffer.len() && self.predicate.test(buffer[position]) {
            context
                .success_at(Value::Char(buffer[position]), position + 1)
                .into()
        } else {
            context.failure(self.message.clone()).into()
        }
    }

    fn fast_parse_on(
        &self,
        buffer: &crate::context::Buffer,
        position: usize,
    ) -> Option<usize> {
        if position < buffer.len() && self.predicate.test(buffer[position]) {
            Some(position + 1)
        } else {
            None
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(CharacterNode::new(self.predicate.clone(), self.message.clone()))
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.predicate == self.predicate && o.message == self.message)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        format!("Character[{}]", self.message)
    }
}

/// The success/failure conversion every leaf node needs: a bare
/// `Success`/`Failure` into an [`crate::context::Outcome`].
impl From<crate::context::Success> for crate::context::Outcome {
    fn from(s: crate::context::Success) -> Self {
        crate::context::Outcome::Success(s)
    }
}

impl From<crate::context::Failure> for crate::context::Outcome {
    fn from(f: crate::context::Failure) -> Self {
        crate::context::Outcome::Failure(f)
    }
}

pub fn character(predicate: CharPredicate, message: impl Into<String>) -> Parser {
    Parser::new(CharacterNode::new(predicate, message))
}

pub fn any(message: impl Into<String>) -> Parser {
    character(CharPredicate::Fn(|_| true, "any"), message)
}

/// A string test over a fixed-length window, carrying the window size
/// alongside the predicate. `size` is in `char`s, matching the buffer's
/// code-point indexing.
#[derive(Clone)]
pub struct StringPredicate {
    size: usize,
    test: StringTest,
}

#[derive(Clone)]
enum StringTest {
    Fn(fn(&[char]) -> bool),
    Closure(Rc<dyn Fn(&[char]) -> bool>),
}

impl PartialEq for StringTest {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StringTest::Fn(f), StringTest::Fn(g)) => f == g,
            (StringTest::Closure(f), StringTest::Closure(g)) => Rc::ptr_eq(f, g),
            _ => false,
        }
    }
}

impl fmt::Debug for StringTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StringTest::Fn(_) => "StringTest::Fn(..)",
            StringTest::Closure(_) => "StringTest::Closure(..)",
        })
    }
}

impl fmt::Debug for StringPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringPredicate")
            .field("size", &self.size)
            .field("test", &self.test)
            .finish()
    }
}

impl PartialEq for StringPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.test == other.test
    }
}

impl StringPredicate {
    pub fn exact(literal: &str) -> Self {
        let owned: Rc<[char]> = literal.chars().collect::<Vec<_>>().into();
        StringPredicate {
            size: owned.len(),
            test: StringTest::Closure(Rc::new(move |window| window == &owned[..])),
        }
    }

    pub fn exact_ignoring_case(literal: &str) -> Self {
        let owned: Vec<char> = literal.chars().flat_map(char::to_lowercase).collect();
        let size = literal.chars().count();
        StringPredicate {
            size,
            test: StringTest::Closure(Rc::new(move |window| {
                window.iter().flat_map(|c| c.to_lowercase()).eq(owned.iter().copied())
            })),
        }
    }
}

/// A fixed-length-window string recognizer.
#[derive(Debug)]
pub struct StringNode {
    predicate: StringPredicate,
    message: String,
}

impl StringNode {
    pub fn new(predicate: StringPredicate, message: impl Into<String>) -> Self {
        StringNode {
            predicate,
            message: message.into(),
        }
    }
}

impl ParserNode for StringNode {
    fn parse_on(&self, context: &Context) -> crate::context::Outcome {
        let buffer = context.buffer();
        let start = context.position();
        let stop = start + self.predicate.size;
        if stop <= buffer.len() {
            let window = &buffer[start..stop];
            let matched = match &self.predicate.test {
                StringTest::Fn(f) => f(window),
                StringTest::Closure(f) => f(window),
            };
            if matched {
                return context
                    .success_at(Value::Str(crate::context::slice_to_string(window)), stop)
                    .into();
            }
        }
        context.failure(self.message.clone()).into()
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        let stop = position + self.predicate.size;
        if stop <= buffer.len() {
            let window = &buffer[position..stop];
            let matched = match &self.predicate.test {
                StringTest::Fn(f) => f(window),
                StringTest::Closure(f) => f(window),
            };
            matched.then_some(stop)
        } else {
            None
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(StringNode::new(self.predicate.clone(), self.message.clone()))
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.predicate == self.predicate && o.message == self.message)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        format!("String[{}]", self.message)
    }
}

pub fn string(predicate: StringPredicate, message: impl Into<String>) -> Parser {
    Parser::new(StringNode::new(predicate, message))
}

/// Always succeeds, consuming nothing, producing [`Value::Unit`].
#[derive(Debug, Default)]
pub struct EpsilonNode;

impl ParserNode for EpsilonNode {
    fn parse_on(&self, context: &Context) -> crate::context::Outcome {
        context.success(Value::Unit).into()
    }

    fn fast_parse_on(&self, _buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        Some(position)
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(EpsilonNode)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "Epsilon".to_owned()
    }
}

pub fn epsilon() -> Parser {
    Parser::new(EpsilonNode)
}

/// Always fails with a fixed message, consuming nothing.
#[derive(Debug)]
pub struct FailureNode {
    message: String,
}

impl FailureNode {
    pub fn new(message: impl Into<String>) -> Self {
        FailureNode {
            message: message.into(),
        }
    }
}

impl ParserNode for FailureNode {
    fn parse_on(&self, context: &Context) -> crate::context::Outcome {
        context.failure(self.message.clone()).into()
    }

    fn fast_parse_on(&self, _buffer: &crate::context::Buffer, _position: usize) -> Option<usize> {
        None
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(FailureNode::new(self.message.clone()))
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.message == self.message)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        format!("Failure[{}]", self.message)
    }
}

pub fn fail(message: impl Into<String>) -> Parser {
    Parser::new(FailureNode::new(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn character_matches_and_advances() {
        let p = character(CharPredicate::Fn(|c| c.is_ascii_digit(), "digit"), "digit expected");
        let outcome = p.parse_on(&Context::of_str("9x"));
        assert!(outcome.is_success());
        assert_eq!(outcome.position(), 1);
    }

    #[test]
    fn character_fails_at_end_of_input() {
        let p = character(CharPredicate::Fn(|c| c.is_ascii_digit(), "digit"), "digit expected");
        let outcome = p.parse_on(&Context::of_str(""));
        assert!(outcome.is_failure());
    }

    #[test]
    fn fn_predicates_compare_equal_by_pointer_and_label() {
        let a = CharPredicate::Fn(|c| c.is_ascii_digit(), "digit");
        let b = CharPredicate::Fn(|c| c.is_ascii_digit(), "digit");
        assert_eq!(a, b);
    }

    #[test]
    fn closures_never_compare_equal_to_a_separate_closure() {
        let a = CharPredicate::Closure(Rc::new(|c: char| c == 'x'));
        let b = CharPredicate::Closure(Rc::new(|c: char| c == 'x'));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn string_node_matches_fixed_window() {
        let p = string(StringPredicate::exact("foo"), "'foo' expected");
        let outcome = p.parse_on(&Context::of_str("foobar"));
        assert!(outcome.is_success());
        assert_eq!(outcome.position(), 3);
    }

    #[test]
    fn string_node_ignoring_case() {
        let p = string(StringPredicate::exact_ignoring_case("foo"), "'foo' expected");
        assert!(p.parse_on(&Context::of_str("FOO")).is_success());
    }

    #[test]
    fn epsilon_always_succeeds_without_consuming() {
        let outcome = epsilon().parse_on(&Context::of_str("anything"));
        assert!(outcome.is_success());
        assert_eq!(outcome.position(), 0);
    }

    #[test]
    fn failure_never_succeeds() {
        let outcome = fail("nope").parse_on(&Context::of_str("anything"));
        assert!(outcome.is_failure());
    }
}
