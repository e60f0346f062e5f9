//! # Error management
//!
//! This crate separates two concerns that are easy to conflate:
//!
//! - A **parse failure** is a value (an [`Outcome::Failure`][crate::context::Outcome]),
//!   not an exception. Combinators branch on it constantly (`Choice` tries
//!   the next alternative, `Optional` substitutes a fallback) and paying
//!   stack-unwinding cost for that would be wrong.
//! - A **construction error** (bad repetition bounds, an empty `Choice`, a
//!   duplicate production name, a reference cycle, parsing a bare
//!   `Reference`) is a programming mistake in the grammar author's own Rust
//!   code, raised immediately via `panic!` at the call site that made the
//!   mistake — exactly as the reference implementation raises `ValueError`/
//!   `TypeError` synchronously rather than deferring them into the result.
//!
//! [`ParseError`] bridges the two: it's what you get if you call
//! `.into_value()` on a failed [`Outcome`][crate::context::Outcome], for
//! callers who'd rather use `?`-based control flow than match on success/
//! failure.

use std::error::Error;
use std::fmt;

use crate::context::Failure;

/// The recoverable exception raised by accessing the value of a failed
/// parse outcome.
#[derive(Clone, Debug)]
pub struct ParseError {
    failure: Failure,
}

impl ParseError {
    pub fn new(failure: Failure) -> Self {
        ParseError { failure }
    }

    /// The failure this error was raised from.
    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    pub fn message(&self) -> &str {
        self.failure.message()
    }

    pub fn position(&self) -> usize {
        self.failure.position()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.failure)
    }
}

impl Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn display_includes_message_and_position() {
        let ctx = Context::of_str("abc");
        let failure = ctx.failure_at("digit expected", 1);
        let err = ParseError::new(failure);
        let rendered = err.to_string();
        assert!(rendered.contains("digit expected"));
    }
}
