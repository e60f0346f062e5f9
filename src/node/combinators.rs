//! Delegate-based combinators: `And`, `Not`, `Optional`, `Settable`, plus
//! the list-based `Sequence` and `Choice`, and `EndOfInput`.
//!
//! `Delegate` itself (a node forwarding to one child) has no public
//! constructor — every combinator here that wraps a single child embeds the
//! delegate slot directly rather than going through a shared base type,
//! since Rust has no inheritance to hang `replace_child`/`children` off of
//! once. [`SettableNode`] is the one delegate whose slot is rebindable after
//! construction, which is how recursive grammars close a cycle.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{Context, Outcome};
use crate::node::{Parser, ParserNode};
use crate::value::Value;

/// `self` followed by zero consumption: succeeds iff the delegate succeeds,
/// but rewinds to the starting position either way (lookahead).
#[derive(Debug)]
pub struct AndNode {
    delegate: RefCell<Parser>,
}

impl AndNode {
    pub fn new(delegate: Parser) -> Self {
        AndNode {
            delegate: RefCell::new(delegate),
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }
}

impl ParserNode for AndNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        match self.get().parse_on(context) {
            Outcome::Success(s) => context.success(s.into_value()).into(),
            failure @ Outcome::Failure(_) => failure,
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        self.get().fast_parse_on(buffer, position).map(|_| position)
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
        Parser::new(AndNode::new(self.get()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "And".to_owned()
    }
}

/// Negative lookahead: succeeds consuming nothing iff the delegate fails.
#[derive(Debug)]
pub struct NotNode {
    delegate: RefCell<Parser>,
    message: String,
}

impl NotNode {
    pub fn new(delegate: Parser, message: String) -> Self {
        NotNode {
            delegate: RefCell::new(delegate),
            message,
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }
}

impl ParserNode for NotNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        match self.get().parse_on(context) {
            Outcome::Failure(_) => context.success(Value::Unit).into(),
            Outcome::Success(_) => context.failure(self.message.clone()).into(),
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        match self.get().fast_parse_on(buffer, position) {
            Some(_) => None,
            None => Some(position),
        }
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
        Parser::new(NotNode::new(self.get(), self.message.clone()))
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
        format!("Not[{}]", self.message)
    }
}

/// Succeeds whether or not the delegate does, substituting `otherwise` on
/// failure without consuming input.
#[derive(Debug)]
pub struct OptionalNode {
    delegate: RefCell<Parser>,
    otherwise: Value,
}

impl OptionalNode {
    pub fn new(delegate: Parser, otherwise: Value) -> Self {
        OptionalNode {
            delegate: RefCell::new(delegate),
            otherwise,
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }
}

impl ParserNode for OptionalNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        match self.get().parse_on(context) {
            success @ Outcome::Success(_) => success,
            Outcome::Failure(_) => context.success(self.otherwise.clone()).into(),
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        Some(self.get().fast_parse_on(buffer, position).unwrap_or(position))
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
        Parser::new(OptionalNode::new(self.get(), self.otherwise.clone()))
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.otherwise == self.otherwise)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "Optional".to_owned()
    }
}

/// A rebindable delegate slot, distinguished from the other single-child
/// combinators only by `get`/`set` being part of its public surface. Every
/// recursive grammar production resolves to one of these so the
/// self-reference can be wired up once the production's body exists.
#[derive(Debug)]
pub struct SettableNode {
    delegate: RefCell<Parser>,
}

impl SettableNode {
    pub fn new(delegate: Parser) -> Self {
        SettableNode {
            delegate: RefCell::new(delegate),
        }
    }

    pub fn undefined(message: impl Into<String>) -> Self {
        SettableNode::new(super::primitive::fail(message))
    }

    pub fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }

    pub fn set(&self, delegate: Parser) {
        *self.delegate.borrow_mut() = delegate;
    }
}

impl ParserNode for SettableNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        self.get().parse_on(context)
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        self.get().fast_parse_on(buffer, position)
    }

    fn children(&self) -> Vec<Parser> {
        vec![self.get()]
    }

    fn replace_child(&self, src: &Parser, tgt: &Parser) {
        if self.get().ptr_key() == src.ptr_key() {
            self.set(tgt.clone());
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(SettableNode::new(self.get()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "Settable".to_owned()
    }
}

/// `self` then each of `parsers` in turn, producing a [`Value::List`] of
/// their results. Panics at construction if `parsers` is empty — an empty
/// sequence has no sensible identity element to fall back to here, unlike
/// [`crate::node::primitive::epsilon`] which a caller can use explicitly.
#[derive(Debug)]
pub struct SequenceNode {
    parsers: Vec<RefCell<Parser>>,
}

impl SequenceNode {
    pub fn new(parsers: Vec<Parser>) -> Self {
        assert!(!parsers.is_empty(), "Sequence cannot be empty");
        SequenceNode {
            parsers: parsers.into_iter().map(RefCell::new).collect(),
        }
    }

    fn snapshot(&self) -> Vec<Parser> {
        self.parsers.iter().map(|p| p.borrow().clone()).collect()
    }
}

impl ParserNode for SequenceNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        let mut cur = context.clone();
        let mut values = Vec::with_capacity(self.parsers.len());
        for parser in &self.parsers {
            match parser.borrow().parse_on(&cur) {
                Outcome::Success(s) => {
                    cur = Context::new(s.buffer().clone(), s.position());
                    values.push(s.into_value());
                }
                failure @ Outcome::Failure(_) => return failure,
            }
        }
        cur.success(Value::List(values)).into()
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        let mut position = position;
        for parser in &self.parsers {
            position = parser.borrow().fast_parse_on(buffer, position)?;
        }
        Some(position)
    }

    fn children(&self) -> Vec<Parser> {
        self.snapshot()
    }

    fn replace_child(&self, src: &Parser, tgt: &Parser) {
        for slot in &self.parsers {
            if slot.borrow().ptr_key() == src.ptr_key() {
                *slot.borrow_mut() = tgt.clone();
            }
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(SequenceNode::new(self.snapshot()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "Sequence".to_owned()
    }
}

pub fn sequence(parsers: Vec<Parser>) -> Parser {
    Parser::new(SequenceNode::new(parsers))
}

/// The first of `parsers` that succeeds; fails with a message naming every
/// alternative if none do. Panics at construction if `parsers` is empty.
#[derive(Debug)]
pub struct ChoiceNode {
    parsers: Vec<RefCell<Parser>>,
}

impl ChoiceNode {
    pub fn new(parsers: Vec<Parser>) -> Self {
        assert!(!parsers.is_empty(), "Choice cannot be empty");
        ChoiceNode {
            parsers: parsers.into_iter().map(RefCell::new).collect(),
        }
    }

    fn snapshot(&self) -> Vec<Parser> {
        self.parsers.iter().map(|p| p.borrow().clone()).collect()
    }
}

impl ParserNode for ChoiceNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        for parser in &self.parsers {
            if let success @ Outcome::Success(_) = parser.borrow().parse_on(context) {
                return success;
            }
        }
        let alternatives = self
            .snapshot()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        context.failure(format!("expected {alternatives}")).into()
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        for parser in &self.parsers {
            if let Some(end) = parser.borrow().fast_parse_on(buffer, position) {
                return Some(end);
            }
        }
        None
    }

    fn children(&self) -> Vec<Parser> {
        self.snapshot()
    }

    fn replace_child(&self, src: &Parser, tgt: &Parser) {
        for slot in &self.parsers {
            if slot.borrow().ptr_key() == src.ptr_key() {
                *slot.borrow_mut() = tgt.clone();
            }
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(ChoiceNode::new(self.snapshot()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "Choice".to_owned()
    }
}

pub fn choice(parsers: Vec<Parser>) -> Parser {
    Parser::new(ChoiceNode::new(parsers))
}

/// Succeeds consuming nothing iff the cursor is at the end of the buffer.
#[derive(Debug)]
pub struct EndOfInputNode {
    message: String,
}

impl EndOfInputNode {
    pub fn new(message: impl Into<String>) -> Self {
        EndOfInputNode {
            message: message.into(),
        }
    }
}

impl ParserNode for EndOfInputNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        if context.position() < context.buffer().len() {
            context.failure(self.message.clone()).into()
        } else {
            context.success(Value::Unit).into()
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        (position >= buffer.len()).then_some(position)
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(EndOfInputNode::new(self.message.clone()))
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
        format!("EndOfInput[{}]", self.message)
    }
}

pub fn end_of_input(message: impl Into<String>) -> Parser {
    Parser::new(EndOfInputNode::new(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::primitive::{character, CharPredicate};

    fn digit() -> Parser {
        character(CharPredicate::Fn(|c| c.is_ascii_digit(), "digit"), "digit expected")
    }

    #[test]
    fn sequence_collects_values_in_order() {
        let p = sequence(vec![digit(), digit()]);
        let outcome = p.parse_on(&Context::of_str("12"));
        let Outcome::Success(s) = outcome else {
            panic!("expected success")
        };
        assert_eq!(s.into_value(), Value::List(vec![Value::Char('1'), Value::Char('2')]));
    }

    #[test]
    fn sequence_fails_on_first_mismatch_without_partial_consumption() {
        let p = sequence(vec![digit(), digit()]);
        let outcome = p.parse_on(&Context::of_str("1a"));
        assert!(outcome.is_failure());
    }

    #[test]
    fn choice_tries_alternatives_in_order() {
        let p = choice(vec![digit(), super::super::primitive::any("any")]);
        let outcome = p.parse_on(&Context::of_str("a"));
        assert!(outcome.is_success());
    }

    #[test]
    fn not_node_consumes_nothing_on_success() {
        let p = NotNode::new(digit(), "not expected here".to_owned());
        let outcome = p.parse_on(&Context::of_str("a"));
        assert_eq!(outcome.position(), 0);
    }

    #[test]
    fn settable_rebinds_to_a_new_delegate() {
        let settable = Parser::new(SettableNode::undefined("undefined"));
        assert!(settable.parse_on(&Context::of_str("1")).is_failure());
        settable.settable_set(digit());
        assert!(settable.parse_on(&Context::of_str("1")).is_success());
    }

    #[test]
    fn optional_falls_back_without_consuming() {
        let p = OptionalNode::new(digit(), Value::Unit);
        let outcome = p.parse_on(&Context::of_str("a"));
        let Outcome::Success(s) = outcome else {
            panic!("expected success")
        };
        assert_eq!(s.position(), 0);
        assert_eq!(s.into_value(), Value::Unit);
    }
}
