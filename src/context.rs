//! The immutable cursor over the input buffer, and the two results a parse
//! step can produce.
//!
//! A [`Context`] pairs a shared, already-decoded buffer with a position.
//! Every advance creates a new value — nothing here is mutated in place.
//! `buffer` is indexed by Unicode scalar value (`char`), matching the
//! code-point indexing of the dynamically typed implementation this crate's
//! engine is modeled on, rather than raw UTF-8 byte offsets.

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// The shared, decoded input. Cheap to clone: every `Context` derived from
/// the same `parse` call shares one allocation.
pub type Buffer = Rc<[char]>;

/// Decodes a `&str` into the `char`-indexed buffer the engine parses over.
pub fn buffer_of(input: &str) -> Buffer {
    input.chars().collect::<Vec<char>>().into()
}

/// Renders a buffer slice back into an owned `String`.
pub fn slice_to_string(buffer: &[char]) -> String {
    buffer.iter().collect()
}

/// Computes the 1-based (line, column) of `position` within `buffer`.
///
/// Scans forward counting `\n`; a carriage return without a following
/// newline is not treated specially, matching the reference implementation.
pub fn line_and_column_of(buffer: &[char], position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for &c in &buffer[..position.min(buffer.len())] {
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// An immutable parse position: `0 <= position <= buffer.len()`.
#[derive(Clone, Debug)]
pub struct Context {
    buffer: Buffer,
    position: usize,
}

impl Context {
    /// Builds a context at `position` within `buffer`. `position` is clamped
    /// to the buffer length so callers never have to special-case the end.
    pub fn new(buffer: Buffer, position: usize) -> Self {
        let position = position.min(buffer.len());
        Context { buffer, position }
    }

    /// Builds a context at the start of `input`.
    pub fn of_str(input: &str) -> Self {
        Context::new(buffer_of(input), 0)
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Builds a [`Success`] carrying `value`, at `self`'s current position.
    pub fn success(&self, value: Value) -> Success {
        self.success_at(value, self.position)
    }

    /// Builds a [`Success`] carrying `value`, at an explicit `position`.
    pub fn success_at(&self, value: Value, position: usize) -> Success {
        Success {
            buffer: self.buffer.clone(),
            position: position.min(self.buffer.len()),
            value,
        }
    }

    /// Builds a [`Failure`] diagnosing `message`, at `self`'s current position.
    pub fn failure(&self, message: impl Into<String>) -> Failure {
        self.failure_at(message, self.position)
    }

    /// Builds a [`Failure`] diagnosing `message`, at an explicit `position`.
    pub fn failure_at(&self, message: impl Into<String>, position: usize) -> Failure {
        Failure {
            buffer: self.buffer.clone(),
            position: position.min(self.buffer.len()),
            message: message.into(),
        }
    }

    /// Renders the `(line, column)` of this context's position.
    pub fn line_and_column(&self) -> (usize, usize) {
        line_and_column_of(&self.buffer, self.position)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.line_and_column();
        write!(f, "Context[{line}:{col}]")
    }
}

/// A cursor that also carries a parsed value — the outcome of a successful
/// parse step. `Success` is itself a valid starting point for the next
/// parse step, the way `Context` is.
#[derive(Clone, Debug)]
pub struct Success {
    buffer: Buffer,
    position: usize,
    value: Value,
}

impl Success {
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    fn as_context(&self) -> Context {
        Context::new(self.buffer.clone(), self.position)
    }

    /// Builds a new `Success` at this cursor's position, replacing the value.
    pub fn success(&self, value: Value) -> Success {
        self.as_context().success(value)
    }

    /// Builds a new `Success` at an explicit position, replacing the value.
    pub fn success_at(&self, value: Value, position: usize) -> Success {
        self.as_context().success_at(value, position)
    }

    pub fn failure(&self, message: impl Into<String>) -> Failure {
        self.as_context().failure(message)
    }

    pub fn failure_at(&self, message: impl Into<String>, position: usize) -> Failure {
        self.as_context().failure_at(message, position)
    }
}

impl fmt::Display for Success {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = line_and_column_of(&self.buffer, self.position);
        write!(f, "Success[{line}:{col}]: {:?}", self.value)
    }
}

/// A cursor at the point a parse diverged, carrying a diagnostic message.
///
/// The failure's position is "where the mismatch was detected", which is
/// not necessarily the position the enclosing combinator started at — some
/// combinators (notably [`Choice`][crate::node::combinators::ChoiceNode])
/// report a position of their own rather than forwarding a child's.
#[derive(Clone, Debug)]
pub struct Failure {
    buffer: Buffer,
    position: usize,
    message: String,
}

impl Failure {
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line_and_column(&self) -> (usize, usize) {
        line_and_column_of(&self.buffer, self.position)
    }

    /// Turns this failure into the recoverable exception spec.md mandates
    /// for accessing `.value` on a failed result.
    pub fn into_error(self) -> crate::error::ParseError {
        crate::error::ParseError::new(self)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.line_and_column();
        write!(f, "Failure[{line}:{col}]: {}", self.message)
    }
}

/// The result of a parse step: a success carrying a value, or a failure
/// carrying a diagnostic. Both extend [`Context`] in spirit (buffer +
/// position); Rust models that as a sum type rather than a base class.
#[derive(Clone, Debug)]
pub enum Outcome {
    Success(Success),
    Failure(Failure),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn position(&self) -> usize {
        match self {
            Outcome::Success(s) => s.position(),
            Outcome::Failure(f) => f.position(),
        }
    }

    pub fn as_success(&self) -> Option<&Success> {
        match self {
            Outcome::Success(s) => Some(s),
            Outcome::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Failure(f) => Some(f),
            Outcome::Success(_) => None,
        }
    }

    /// Accessing the value of a failed outcome raises a recoverable parse
    /// error carrying the failure, per spec.md §3.
    pub fn into_value(self) -> Result<Value, crate::error::ParseError> {
        match self {
            Outcome::Success(s) => Ok(s.into_value()),
            Outcome::Failure(f) => Err(f.into_error()),
        }
    }
}

/// `(buffer, start, stop, value)`: the span a [`token`][crate::node::Parser::token]
/// combinator wraps around a successful sub-parse. Line/column are derived,
/// not stored. Equality is structural over all four fields.
#[derive(Clone, Debug)]
pub struct Token {
    buffer: Buffer,
    start: usize,
    stop: usize,
    value: Box<Value>,
}

impl Token {
    pub fn new(buffer: Buffer, start: usize, stop: usize, value: Value) -> Self {
        Token {
            buffer,
            start,
            stop,
            value: Box::new(value),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn stop(&self) -> usize {
        self.stop
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn text(&self) -> String {
        slice_to_string(&self.buffer[self.start..self.stop])
    }

    pub fn line(&self) -> usize {
        line_and_column_of(&self.buffer, self.start).0
    }

    pub fn column(&self) -> usize {
        line_and_column_of(&self.buffer, self.start).1
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.stop == other.stop
            && *self.buffer == *other.buffer
            && self.value == other.value
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = line_and_column_of(&self.buffer, self.start);
        write!(f, "Token[{line}:{col}]: {:?}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column_counts_newlines() {
        let buf = buffer_of("ab\ncd\nef");
        assert_eq!(line_and_column_of(&buf, 0), (1, 1));
        assert_eq!(line_and_column_of(&buf, 3), (2, 1));
        assert_eq!(line_and_column_of(&buf, 7), (3, 2));
    }

    #[test]
    fn failure_value_access_raises() {
        let ctx = Context::of_str("x");
        let failure = ctx.failure("nope");
        let outcome = Outcome::Failure(failure);
        assert!(outcome.into_value().is_err());
    }
}
