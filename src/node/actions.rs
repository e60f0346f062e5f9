//! Nodes that transform a delegate's result without changing what it
//! accepts: `map`, `flatten`, `token`, `trim`, and full-continuation
//! handover.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{Context, Outcome, Token};
use crate::node::{Parser, ParserNode};
use crate::value::Value;

type Action = Rc<dyn Fn(Value) -> Value>;

/// Applies a function to the delegate's value on success.
///
/// `has_side_effects` mirrors the reference implementation's
/// `fast_parse_on` short-circuit: an action without side effects is safe to
/// skip running during a fast (position-only) parse, since nothing
/// observes the value it would have produced; one with side effects (e.g.
/// a grammar action that mutates a symbol table) must still run, so the
/// fast path falls back to the full `parse_on`.
pub struct ActionNode {
    delegate: RefCell<Parser>,
    function: Action,
    has_side_effects: bool,
}

impl ActionNode {
    pub fn new(delegate: Parser, function: Action, has_side_effects: bool) -> Self {
        ActionNode {
            delegate: RefCell::new(delegate),
            function,
            has_side_effects,
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }
}

impl std::fmt::Debug for ActionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionNode")
            .field("has_side_effects", &self.has_side_effects)
            .finish_non_exhaustive()
    }
}

impl ParserNode for ActionNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        match self.get().parse_on(context) {
            Outcome::Success(s) => {
                let value = (self.function)(s.value().clone());
                s.success(value).into()
            }
            failure @ Outcome::Failure(_) => failure,
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        if self.has_side_effects {
            match self.parse_on(&Context::new(buffer.clone(), position)) {
                Outcome::Success(s) => Some(s.position()),
                Outcome::Failure(_) => None,
            }
        } else {
            self.get().fast_parse_on(buffer, position)
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
        Parser::new(ActionNode::new(
            self.get(),
            self.function.clone(),
            self.has_side_effects,
        ))
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| {
            Rc::ptr_eq(&o.function, &self.function) && o.has_side_effects == self.has_side_effects
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "Action".to_owned()
    }
}

/// Hands the delegate's own `parse_on` to a handler as a callable, letting
/// the handler decide whether/when/how many times to invoke it. Used to
/// implement control-flow escapes a plain combinator tree can't express
/// (e.g. a grammar production that wants to retry with a different
/// continuation on failure).
pub struct ContinuationNode {
    delegate: RefCell<Parser>,
    handler: Rc<dyn Fn(&dyn Fn(&Context) -> Outcome, &Context) -> Outcome>,
}

impl ContinuationNode {
    pub fn new(
        delegate: Parser,
        handler: Rc<dyn Fn(&dyn Fn(&Context) -> Outcome, &Context) -> Outcome>,
    ) -> Self {
        ContinuationNode {
            delegate: RefCell::new(delegate),
            handler,
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }
}

impl std::fmt::Debug for ContinuationNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContinuationNode").finish_non_exhaustive()
    }
}

impl ParserNode for ContinuationNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        let delegate = self.get();
        let continuation = move |ctx: &Context| delegate.parse_on(ctx);
        (self.handler)(&continuation, context)
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
        Parser::new(ContinuationNode::new(self.get(), self.handler.clone()))
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| Rc::ptr_eq(&o.handler, &self.handler))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "Continuation".to_owned()
    }
}

/// Replaces a successful delegate's value with the exact input text it
/// consumed. With an explicit `message`, skips running the delegate's full
/// `parse_on` (it runs `fast_parse_on` instead) the way the reference
/// implementation's two-branch `FlattenParser.parse_on` does — a
/// significant saving when the delegate's own values are never used.
pub struct FlattenNode {
    delegate: RefCell<Parser>,
    message: Option<String>,
}

impl FlattenNode {
    pub fn new(delegate: Parser, message: Option<String>) -> Self {
        FlattenNode {
            delegate: RefCell::new(delegate),
            message,
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }
}

impl std::fmt::Debug for FlattenNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlattenNode")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl ParserNode for FlattenNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        match &self.message {
            None => match self.get().parse_on(context) {
                Outcome::Success(s) => {
                    let text = crate::context::slice_to_string(
                        &context.buffer()[context.position()..s.position()],
                    );
                    s.success(Value::Str(text)).into()
                }
                failure @ Outcome::Failure(_) => failure,
            },
            Some(message) => match self.get().fast_parse_on(context.buffer(), context.position())
            {
                Some(end) => {
                    let text =
                        crate::context::slice_to_string(&context.buffer()[context.position()..end]);
                    context.success_at(Value::Str(text), end).into()
                }
                None => context.failure(message.clone()).into(),
            },
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        self.get().fast_parse_on(buffer, position)
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
        Parser::new(FlattenNode::new(self.get(), self.message.clone()))
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
        "Flatten".to_owned()
    }
}

/// Wraps a successful delegate's value in a [`Token`] spanning the input it
/// consumed.
#[derive(Debug)]
pub struct TokenNode {
    delegate: RefCell<Parser>,
}

impl TokenNode {
    pub fn new(delegate: Parser) -> Self {
        TokenNode {
            delegate: RefCell::new(delegate),
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }
}

impl ParserNode for TokenNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        match self.get().parse_on(context) {
            Outcome::Success(s) => {
                let token = Token::new(
                    context.buffer().clone(),
                    context.position(),
                    s.position(),
                    s.value().clone(),
                );
                s.success(Value::Token(token)).into()
            }
            failure @ Outcome::Failure(_) => failure,
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        self.get().fast_parse_on(buffer, position)
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
        Parser::new(TokenNode::new(self.get()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "Token".to_owned()
    }
}

/// Consumes (and discards) `before`/`after` around the delegate, for as
/// many repetitions as each will match — `_consume` in the reference
/// implementation loops `fast_parse_on` until it stops advancing, which is
/// what [`consume_fully`] does here.
#[derive(Debug)]
pub struct TrimNode {
    delegate: RefCell<Parser>,
    before: RefCell<Parser>,
    after: RefCell<Parser>,
}

impl TrimNode {
    pub fn new(delegate: Parser, before: Parser, after: Parser) -> Self {
        TrimNode {
            delegate: RefCell::new(delegate),
            before: RefCell::new(before),
            after: RefCell::new(after),
        }
    }

    fn get(&self) -> Parser {
        self.delegate.borrow().clone()
    }
}

fn consume_fully(parser: &Parser, buffer: &crate::context::Buffer, mut position: usize) -> usize {
    while let Some(next) = parser.fast_parse_on(buffer, position) {
        if next == position {
            break;
        }
        position = next;
    }
    position
}

impl ParserNode for TrimNode {
    fn parse_on(&self, context: &Context) -> Outcome {
        let buffer = context.buffer();
        let before = self.before.borrow().clone();
        let start = consume_fully(&before, buffer, context.position());
        let trimmed_context = if start != context.position() {
            Context::new(buffer.clone(), start)
        } else {
            context.clone()
        };

        match self.get().parse_on(&trimmed_context) {
            Outcome::Success(s) => {
                let after = self.after.borrow().clone();
                let end = consume_fully(&after, buffer, s.position());
                if end == s.position() {
                    s.into()
                } else {
                    s.success_at(s.value().clone(), end).into()
                }
            }
            failure @ Outcome::Failure(_) => failure,
        }
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        let before = self.before.borrow().clone();
        let start = consume_fully(&before, buffer, position);
        let end = self.get().fast_parse_on(buffer, start)?;
        let after = self.after.borrow().clone();
        Some(consume_fully(&after, buffer, end))
    }

    fn children(&self) -> Vec<Parser> {
        vec![self.get(), self.before.borrow().clone(), self.after.borrow().clone()]
    }

    fn replace_child(&self, src: &Parser, tgt: &Parser) {
        if self.get().ptr_key() == src.ptr_key() {
            *self.delegate.borrow_mut() = tgt.clone();
        }
        if self.before.borrow().ptr_key() == src.ptr_key() {
            *self.before.borrow_mut() = tgt.clone();
        }
        if self.after.borrow().ptr_key() == src.ptr_key() {
            *self.after.borrow_mut() = tgt.clone();
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(TrimNode::new(
            self.get(),
            self.before.borrow().clone(),
            self.after.borrow().clone(),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        "Trim".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::primitive::{character, CharPredicate};

    fn letters() -> Parser {
        character(CharPredicate::Fn(|c| c.is_ascii_alphabetic(), "letter"), "letter expected").plus()
    }

    #[test]
    fn flatten_returns_consumed_text() {
        let p = Parser::new(FlattenNode::new(letters(), None));
        let outcome = p.parse_on(&Context::of_str("abc123"));
        let Outcome::Success(s) = outcome else {
            panic!("expected success")
        };
        assert_eq!(s.into_value(), Value::Str("abc".to_owned()));
    }

    #[test]
    fn token_wraps_span_and_value() {
        let p = Parser::new(TokenNode::new(letters()));
        let outcome = p.parse_on(&Context::of_str("abc"));
        let Outcome::Success(s) = outcome else {
            panic!("expected success")
        };
        let Value::Token(token) = s.into_value() else {
            panic!("expected a token")
        };
        assert_eq!(token.text(), "abc");
    }

    #[test]
    fn trim_consumes_surrounding_whitespace() {
        let ws = character(CharPredicate::Fn(|c| c.is_whitespace(), "whitespace"), "whitespace expected").star();
        let p = Parser::new(TrimNode::new(letters(), ws.clone(), ws));
        let outcome = p.parse_on(&Context::of_str("  abc  "));
        let Outcome::Success(s) = outcome else {
            panic!("expected success")
        };
        assert_eq!(s.position(), 7);
    }

    #[test]
    fn action_map_transforms_value() {
        let p = Parser::new(ActionNode::new(
            letters(),
            Rc::new(|v| Value::Int(v.as_list().map_or(0, |l| l.len() as i64))),
            false,
        ));
        let outcome = p.parse_on(&Context::of_str("abcd"));
        let Outcome::Success(s) = outcome else {
            panic!("expected success")
        };
        assert_eq!(s.into_value(), Value::Int(4));
    }
}
