//! A priority-climbing expression grammar, built from lowest to highest
//! precedence one [`ExpressionGroup`] at a time.
//!
//! Each group layers primitives, parenthesization (`wrapper`), prefix and
//! postfix unary operators, and left/right-associative binary operators
//! around whatever the previous (lower-priority) group already built.
//! [`ExpressionBuilder`] threads a single [`Settable`][crate::node::combinators::SettableNode]
//! "loopback" through every group's `wrapper`s so a parenthesized
//! sub-expression can recurse back into the full expression grammar before
//! the grammar itself is finished being assembled.
//!
//! Binary/unary operator actions aren't stored inside [`Value`] — a closed
//! value enum has nowhere to put an `Rc<dyn Fn>` without every `Value`
//! paying for it. Instead each operator's action lives in a Rust-side
//! `Vec<ExprAction>` on the group, and the operator's own parser is mapped
//! to [`Value::Pair`] tagging the matched operator value together with its
//! index into that vec — [`Value::Int`] underneath. The combining stage
//! (`build_left`/`build_right`/...) reads the index back out to find which
//! action to invoke with the operands it already has in hand.

use std::rc::Rc;

use crate::node::combinators::{self, SettableNode};
use crate::node::primitive::fail;
use crate::node::Parser;
use crate::value::Value;

/// An operator/wrapper action: given the operand(s)/operator value(s) in
/// the reference implementation's original call order, produces the
/// combined value.
pub type ExprAction = Rc<dyn Fn(&[Value]) -> Value>;

fn default_action() -> ExprAction {
    Rc::new(|args: &[Value]| Value::List(args.to_vec()))
}

fn choice_or_single(parsers: &[Parser]) -> Parser {
    match parsers {
        [] => unreachable!("caller checked non-empty"),
        [only] => only.clone(),
        many => combinators::choice(many.to_vec()),
    }
}

fn unpack_tagged(value: Value) -> (Value, usize) {
    match value {
        Value::Pair(op, idx) => {
            let Value::Int(idx) = *idx else {
                panic!("expression builder: tag was not an index")
            };
            (*op, idx as usize)
        }
        other => panic!("expression builder: expected a tagged operator, got {other:?}"),
    }
}

/// Builds a full expression grammar out of priority-ordered groups, lowest
/// precedence first.
pub struct ExpressionBuilder {
    loopback: Parser,
    groups: Vec<ExpressionGroup>,
}

impl Default for ExpressionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionBuilder {
    pub fn new() -> Self {
        ExpressionBuilder {
            loopback: Parser::new(SettableNode::undefined("expression grammar is not built yet")),
            groups: Vec::new(),
        }
    }

    /// Starts a new priority group, built on top of whatever the previous
    /// group produced. The first group added is the grammar's primitive
    /// (highest-precedence) layer.
    pub fn group(&mut self) -> &mut ExpressionGroup {
        self.groups.push(ExpressionGroup::new(self.loopback.clone()));
        self.groups.last_mut().expect("just pushed")
    }

    /// Assembles every group into the final parser and binds the loopback
    /// so `wrapper` sub-expressions recurse through the whole grammar.
    pub fn build(&self) -> Parser {
        let mut parser = fail("highest priority group should define a primitive parser");
        for group in &self.groups {
            parser = group.build(parser);
        }
        self.loopback.settable_set(parser.clone());
        parser
    }
}

/// One precedence level: any combination of primitives, wrappers, prefix,
/// postfix, left-, and right-associative operators.
pub struct ExpressionGroup {
    loopback: Parser,
    primitives: Vec<Parser>,
    wrappers: Vec<Parser>,
    prefix: Vec<Parser>,
    prefix_actions: Vec<ExprAction>,
    postfix: Vec<Parser>,
    postfix_actions: Vec<ExprAction>,
    left: Vec<Parser>,
    left_actions: Vec<ExprAction>,
    right: Vec<Parser>,
    right_actions: Vec<ExprAction>,
}

impl ExpressionGroup {
    fn new(loopback: Parser) -> Self {
        ExpressionGroup {
            loopback,
            primitives: Vec::new(),
            wrappers: Vec::new(),
            prefix: Vec::new(),
            prefix_actions: Vec::new(),
            postfix: Vec::new(),
            postfix_actions: Vec::new(),
            left: Vec::new(),
            left_actions: Vec::new(),
            right: Vec::new(),
            right_actions: Vec::new(),
        }
    }

    /// Registers a primitive (a terminal of the expression grammar, e.g. a
    /// number literal). `action`, if given, is applied to the match immediately.
    pub fn primitive(&mut self, parser: Parser, action: Option<ExprAction>) -> &mut Self {
        let parser = match action {
            Some(action) => parser.map(move |v| action(&[v])),
            None => parser,
        };
        self.primitives.push(parser);
        self
    }

    /// Registers `left delimiter` / `right delimiter` parenthesization
    /// around a recursive sub-expression (the builder's loopback).
    /// `action(left, inner, right)` combines the three; defaults to a
    /// 3-element list.
    pub fn wrapper(&mut self, left: Parser, right: Parser, action: Option<ExprAction>) -> &mut Self {
        let sequence = combinators::sequence(vec![left, self.loopback.clone(), right]);
        let action = action.unwrap_or_else(default_action);
        self.wrappers.push(sequence.map(move |v| {
            let Value::List(parts) = v else {
                panic!("expression builder: wrapper sequence did not produce a list")
            };
            action(&parts)
        }));
        self
    }

    /// Registers a prefix unary operator. `action(operator, operand)`
    /// combines the two; defaults to a 2-element list.
    pub fn prefix(&mut self, parser: Parser, action: Option<ExprAction>) -> &mut Self {
        Self::add_tagged(&mut self.prefix, &mut self.prefix_actions, parser, action);
        self
    }

    /// Registers a postfix unary operator. `action(operand, operator)`
    /// combines the two; defaults to a 2-element list.
    pub fn postfix(&mut self, parser: Parser, action: Option<ExprAction>) -> &mut Self {
        Self::add_tagged(&mut self.postfix, &mut self.postfix_actions, parser, action);
        self
    }

    /// Registers a left-associative binary operator. `action(left, operator,
    /// right)` combines the three; defaults to a 3-element list.
    pub fn left(&mut self, parser: Parser, action: Option<ExprAction>) -> &mut Self {
        Self::add_tagged(&mut self.left, &mut self.left_actions, parser, action);
        self
    }

    /// Registers a right-associative binary operator. `action(left,
    /// operator, right)` combines the three; defaults to a 3-element list.
    pub fn right(&mut self, parser: Parser, action: Option<ExprAction>) -> &mut Self {
        Self::add_tagged(&mut self.right, &mut self.right_actions, parser, action);
        self
    }

    fn add_tagged(list: &mut Vec<Parser>, actions: &mut Vec<ExprAction>, parser: Parser, action: Option<ExprAction>) {
        let index = actions.len();
        actions.push(action.unwrap_or_else(default_action));
        list.push(parser.map(move |v| Value::Pair(Box::new(v), Box::new(Value::Int(index as i64)))));
    }

    fn build(&self, inner: Parser) -> Parser {
        let built = self.build_primitive(inner);
        let built = self.build_wrapper(built);
        let built = self.build_prefix(built);
        let built = self.build_postfix(built);
        let built = self.build_right(built);
        self.build_left(built)
    }

    fn build_primitive(&self, inner: Parser) -> Parser {
        if self.primitives.is_empty() {
            inner
        } else {
            choice_or_single(&self.primitives)
        }
    }

    fn build_wrapper(&self, inner: Parser) -> Parser {
        if self.wrappers.is_empty() {
            inner
        } else {
            let mut choices = self.wrappers.clone();
            choices.push(inner);
            choice_or_single(&choices)
        }
    }

    fn build_prefix(&self, inner: Parser) -> Parser {
        if self.prefix.is_empty() {
            return inner;
        }
        let operators = choice_or_single(&self.prefix).star();
        let actions = self.prefix_actions.clone();
        operators.seq(&[inner]).map(move |v| {
            let Value::List(mut parts) = v else {
                panic!("expression builder: prefix sequence did not produce a list")
            };
            let mut value = parts.pop().expect("sequence always has two parts");
            let Value::List(tagged) = parts.pop().expect("sequence always has two parts") else {
                panic!("expression builder: prefix operators did not produce a list")
            };
            for tag in tagged.into_iter().rev() {
                let (operator, index) = unpack_tagged(tag);
                value = actions[index](&[operator, value]);
            }
            value
        })
    }

    fn build_postfix(&self, inner: Parser) -> Parser {
        if self.postfix.is_empty() {
            return inner;
        }
        let operators = choice_or_single(&self.postfix).star();
        let actions = self.postfix_actions.clone();
        inner.seq(&[operators]).map(move |v| {
            let Value::List(mut parts) = v else {
                panic!("expression builder: postfix sequence did not produce a list")
            };
            let Value::List(tagged) = parts.pop().expect("sequence always has two parts") else {
                panic!("expression builder: postfix operators did not produce a list")
            };
            let mut value = parts.pop().expect("sequence always has two parts");
            for tag in tagged {
                let (operator, index) = unpack_tagged(tag);
                value = actions[index](&[value, operator]);
            }
            value
        })
    }

    fn build_right(&self, inner: Parser) -> Parser {
        if self.right.is_empty() {
            return inner;
        }
        let operators = choice_or_single(&self.right);
        let actions = self.right_actions.clone();
        inner.separated_by(&operators).map(move |v| {
            let Value::List(seq) = v else {
                panic!("expression builder: right-assoc chain did not produce a list")
            };
            let mut result = seq.last().expect("separated_by always has at least one element").clone();
            let mut i = seq.len().saturating_sub(2);
            while i >= 1 {
                let (operator, index) = unpack_tagged(seq[i].clone());
                result = actions[index](&[seq[i - 1].clone(), operator, result]);
                if i < 2 {
                    break;
                }
                i -= 2;
            }
            result
        })
    }

    fn build_left(&self, inner: Parser) -> Parser {
        if self.left.is_empty() {
            return inner;
        }
        let operators = choice_or_single(&self.left);
        let actions = self.left_actions.clone();
        inner.separated_by(&operators).map(move |v| {
            let Value::List(seq) = v else {
                panic!("expression builder: left-assoc chain did not produce a list")
            };
            let mut result = seq[0].clone();
            let mut i = 1;
            while i < seq.len() {
                let (operator, index) = unpack_tagged(seq[i].clone());
                result = actions[index](&[result, operator, seq[i + 1].clone()]);
                i += 2;
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset;
    use crate::node::primitive::{character, CharPredicate};

    fn digit_value() -> Parser {
        character(CharPredicate::Fn(|c| c.is_ascii_digit(), "digit"), "digit expected")
            .map(|v| match v {
                Value::Char(c) => Value::Int(c.to_digit(10).expect("ascii digit") as i64),
                other => other,
            })
    }

    fn arithmetic() -> Parser {
        let mut builder = ExpressionBuilder::new();
        builder.group().primitive(digit_value(), None);
        builder.group().wrapper(
            charset::char('(', None),
            charset::char(')', None),
            Some(Rc::new(|args: &[Value]| args[1].clone())),
        );
        builder.group().left(
            charset::char('*', None),
            Some(Rc::new(|args: &[Value]| {
                let (Value::Int(l), Value::Int(r)) = (args[0].clone(), args[2].clone()) else {
                    panic!("expected ints")
                };
                Value::Int(l * r)
            })),
        );
        builder.group().left(
            charset::char('+', None),
            Some(Rc::new(|args: &[Value]| {
                let (Value::Int(l), Value::Int(r)) = (args[0].clone(), args[2].clone()) else {
                    panic!("expected ints")
                };
                Value::Int(l + r)
            })),
        );
        builder.build()
    }

    #[test]
    fn left_associative_precedence_groups_multiply_before_add() {
        let parser = arithmetic();
        let outcome = parser.parse("2+3*4");
        assert_eq!(outcome.into_value().unwrap(), Value::Int(14));
    }

    #[test]
    fn wrapper_overrides_precedence() {
        let parser = arithmetic();
        let outcome = parser.parse("(2+3)*4");
        assert_eq!(outcome.into_value().unwrap(), Value::Int(20));
    }

    #[test]
    fn prefix_and_right_assoc_compose() {
        let mut builder = ExpressionBuilder::new();
        builder.group().primitive(digit_value(), None);
        builder.group().right(
            charset::char('^', None),
            Some(Rc::new(|args: &[Value]| {
                let (Value::Int(base), Value::Int(exp)) = (args[0].clone(), args[2].clone()) else {
                    panic!("expected ints")
                };
                Value::Int(base.pow(exp as u32))
            })),
        );
        let parser = builder.build();
        // right-assoc: 2^3^2 == 2^(3^2) == 2^9 == 512
        let outcome = parser.parse("2^3^2");
        assert_eq!(outcome.into_value().unwrap(), Value::Int(512));
    }
}
