//! Repetition: three strategies over the same `min`/`max(Option<usize>)`
//! bounds, differing only in how they interact with what comes after them.
//!
//! - [`PossessiveNode`] repeats as many times as possible and never backs
//!   off, regardless of what follows — the ordinary `star`/`plus`/`times`.
//! - [`GreedyNode`] also repeats as many times as possible, but backs off
//!   one repetition at a time until a trailing `limit` parser succeeds —
//!   for `a* end` where `end` needs a chance to match.
//! - [`LazyNode`] repeats as few times as possible, trying `limit` after
//!   every repetition and only consuming another one if `limit` still
//!   fails.
//!
//! `max: None` stands in for the reference implementation's `-1` sentinel
//! for "unbounded".

use std::any::Any;
use std::cell::RefCell;

use crate::context::{Context, Outcome};
use crate::node::{Parser, ParserNode};
use crate::value::Value;

fn range_label(min: usize, max: Option<usize>) -> String {
    match max {
        Some(max) => format!("{min}..{max}"),
        None => format!("{min}..*"),
    }
}

fn validate_bounds(min: usize, max: Option<usize>) {
    if let Some(max) = max {
        assert!(min <= max, "invalid repetition bounds: {}", range_label(min, max));
    }
}

/// Repeats the delegate as many times as possible within `[min, max]`,
/// never reconsidering how many repetitions it took once it stops.
#[derive(Debug)]
pub struct PossessiveNode {
    delegate: RefCell<Parser>,
    min: usize,
    max: Option<usize>,
}

impl PossessiveNode {
    pub fn new(delegate: Parser, min: usize, max: Option<usize>) -> Self {
        validate_bounds(min, max);
        PossessiveNode {
            delegate: RefCell::new(delegate),
            min,
            max,
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }
}

impl ParserNode for PossessiveNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        let delegate = self.get();
        let mut current = context.clone();
        let mut elements = Vec::new();

        while elements.len() < self.min {
            match delegate.parse_on(&current) {
                Outcome::Success(s) => {
                    current = Context::new(s.buffer().clone(), s.position());
                    elements.push(s.into_value());
                }
                failure @ Outcome::Failure(_) => return failure,
            }
        }

        while self.max.is_none_or(|max| elements.len() < max) {
            match delegate.parse_on(&current) {
                Outcome::Success(s) => {
                    current = Context::new(s.buffer().clone(), s.position());
                    elements.push(s.into_value());
                }
                Outcome::Failure(_) => break,
            }
        }

        current.success(Value::List(elements)).into()
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        let delegate = self.get();
        let mut current = position;
        let mut count = 0;

        while count < self.min {
            current = delegate.fast_parse_on(buffer, current)?;
            count += 1;
        }

        while self.max.is_none_or(|max| count < max) {
            match delegate.fast_parse_on(buffer, current) {
                Some(next) => {
                    current = next;
                    count += 1;
                }
                None => break,
            }
        }

        Some(current)
    }

    fn children(&self) -> Vec<Parser> {
        vec![self.get()]
    }

    fn replace_child(&self, src: &Parser, tgt: &Parser) {
        if self.get().ptr_key() == src.ptr_key() {
            *self.delegate.borrow_mut() = tgt.clone();
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(PossessiveNode::new(self.get(), self.min, self.max))
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.min == self.min && o.max == self.max)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        format!("Possessive[{}]", range_label(self.min, self.max))
    }
}

/// Repeats the delegate as many times as possible, then backtracks one
/// repetition at a time until `limit` accepts at the resulting position.
#[derive(Debug)]
pub struct GreedyNode {
    delegate: RefCell<Parser>,
    limit: RefCell<Parser>,
    min: usize,
    max: Option<usize>,
}

impl GreedyNode {
    pub fn new(delegate: Parser, limit: Parser, min: usize, max: Option<usize>) -> Self {
        validate_bounds(min, max);
        GreedyNode {
            delegate: RefCell::new(delegate),
            limit: RefCell::new(limit),
            min,
            max,
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }

    fn limit(&self) -> Parser {
        self.limit.borrow().clone()
    }
}

impl ParserNode for GreedyNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        let delegate = self.get();
        let limit = self.limit();
        let mut current = context.clone();
        let mut elements = Vec::new();

        while elements.len() < self.min {
            match delegate.parse_on(&current) {
                Outcome::Success(s) => {
                    current = Context::new(s.buffer().clone(), s.position());
                    elements.push(s.into_value());
                }
                failure @ Outcome::Failure(_) => return failure,
            }
        }

        let mut contexts = vec![current.clone()];
        while self.max.is_none_or(|max| elements.len() < max) {
            match delegate.parse_on(contexts.last().expect("contexts is never empty")) {
                Outcome::Success(s) => {
                    let next = Context::new(s.buffer().clone(), s.position());
                    elements.push(s.into_value());
                    contexts.push(next);
                }
                Outcome::Failure(_) => break,
            }
        }

        loop {
            let at = contexts.last().expect("contexts is never empty");
            match limit.parse_on(at) {
                Outcome::Success(_) => return at.success(Value::List(elements)).into(),
                failure @ Outcome::Failure(_) => {
                    if elements.is_empty() {
                        return failure;
                    }
                    contexts.pop();
                    elements.pop();
                    if contexts.is_empty() {
                        return failure;
                    }
                }
            }
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        let delegate = self.get();
        let limit = self.limit();
        let mut count = 0;
        let mut current = position;

        while count < self.min {
            current = delegate.fast_parse_on(buffer, current)?;
            count += 1;
        }

        let mut positions = vec![current];
        while self.max.is_none_or(|max| count < max) {
            match delegate.fast_parse_on(buffer, *positions.last().expect("never empty")) {
                Some(next) => {
                    positions.push(next);
                    count += 1;
                }
                None => break,
            }
        }

        loop {
            let at = *positions.last().expect("never empty");
            if limit.fast_parse_on(buffer, at).is_some() {
                return Some(at);
            }
            if count == 0 {
                return None;
            }
            positions.pop();
            count -= 1;
            if positions.is_empty() {
                return None;
            }
        }
    }

    fn children(&self) -> Vec<Parser> {
        vec![self.get(), self.limit()]
    }

    fn replace_child(&self, src: &Parser, tgt: &Parser) {
        if self.get().ptr_key() == src.ptr_key() {
            *self.delegate.borrow_mut() = tgt.clone();
        }
        if self.limit().ptr_key() == src.ptr_key() {
            *self.limit.borrow_mut() = tgt.clone();
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(GreedyNode::new(self.get(), self.limit(), self.min, self.max))
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.min == self.min && o.max == self.max)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        format!("Greedy[{}]", range_label(self.min, self.max))
    }
}

/// Repeats the delegate as few times as possible, trying `limit` before
/// every additional repetition.
#[derive(Debug)]
pub struct LazyNode {
    delegate: RefCell<Parser>,
    limit: RefCell<Parser>,
    min: usize,
    max: Option<usize>,
}

impl LazyNode {
    pub fn new(delegate: Parser, limit: Parser, min: usize, max: Option<usize>) -> Self {
        validate_bounds(min, max);
        LazyNode {
            delegate: RefCell::new(delegate),
            limit: RefCell::new(limit),
            min,
            max,
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }

    fn limit(&self) -> Parser {
        self.limit.borrow().clone()
    }
}

impl ParserNode for LazyNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        let delegate = self.get();
        let limit = self.limit();
        let mut current = context.clone();
        let mut elements = Vec::new();

        while elements.len() < self.min {
            match delegate.parse_on(&current) {
                Outcome::Success(s) => {
                    current = Context::new(s.buffer().clone(), s.position());
                    elements.push(s.into_value());
                }
                failure @ Outcome::Failure(_) => return failure,
            }
        }

        loop {
            match limit.parse_on(&current) {
                Outcome::Success(_) => return current.success(Value::List(elements)).into(),
                failure @ Outcome::Failure(_) => {
                    if self.max.is_some_and(|max| elements.len() >= max) {
                        return failure;
                    }
                    match delegate.parse_on(&current) {
                        Outcome::Success(s) => {
                            current = Context::new(s.buffer().clone(), s.position());
                            elements.push(s.into_value());
                        }
                        Outcome::Failure(_) => return failure,
                    }
                }
            }
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        let delegate = self.get();
        let limit = self.limit();
        let mut count = 0;
        let mut current = position;

        while count < self.min {
            current = delegate.fast_parse_on(buffer, current)?;
            count += 1;
        }

        loop {
            if limit.fast_parse_on(buffer, current).is_some() {
                return Some(current);
            }
            if self.max.is_some_and(|max| count >= max) {
                return None;
            }
            current = delegate.fast_parse_on(buffer, current)?;
            count += 1;
        }
    }

    fn children(&self) -> Vec<Parser> {
        vec![self.get(), self.limit()]
    }

    fn replace_child(&self, src: &Parser, tgt: &Parser) {
        if self.get().ptr_key() == src.ptr_key() {
            *self.delegate.borrow_mut() = tgt.clone();
        }
        if self.limit().ptr_key() == src.ptr_key() {
            *self.limit.borrow_mut() = tgt.clone();
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(LazyNode::new(self.get(), self.limit(), self.min, self.max))
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.min == self.min && o.max == self.max)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        format!("Lazy[{}]", range_label(self.min, self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::primitive::{character, CharPredicate};

    fn digit() -> Parser {
        character(CharPredicate::Fn(|c| c.is_ascii_digit(), "digit"), "digit expected")
    }

    fn any_char() -> Parser {
        super::super::primitive::any("any character expected")
    }

    #[test]
    fn possessive_consumes_maximally() {
        let p = Parser::new(PossessiveNode::new(digit(), 0, None));
        let outcome = p.parse_on(&Context::of_str("123a"));
        let Outcome::Success(s) = outcome else {
            panic!("expected success")
        };
        assert_eq!(s.position(), 3);
    }

    #[test]
    fn possessive_respects_minimum() {
        let p = Parser::new(PossessiveNode::new(digit(), 2, None));
        assert!(p.parse_on(&Context::of_str("1a")).is_failure());
    }

    #[test]
    fn greedy_backtracks_to_let_the_limit_match() {
        // digits greedily, but must leave exactly one character for `any`.
        let p = Parser::new(GreedyNode::new(digit(), any_char(), 0, None));
        let seq = p.seq(&[any_char()]);
        let outcome = seq.parse_on(&Context::of_str("123"));
        let Outcome::Success(s) = outcome else {
            panic!("expected success")
        };
        assert_eq!(s.position(), 3);
        let Value::List(parts) = s.into_value() else {
            panic!("expected list")
        };
        assert_eq!(parts[0], Value::List(vec![Value::Char('1'), Value::Char('2')]));
    }

    #[test]
    fn lazy_stops_as_soon_as_the_limit_matches() {
        let p = Parser::new(LazyNode::new(any_char(), digit(), 0, None));
        let outcome = p.seq(&[digit()]).parse_on(&Context::of_str("ab9"));
        let Outcome::Success(s) = outcome else {
            panic!("expected success")
        };
        assert_eq!(s.position(), 3);
    }
}
