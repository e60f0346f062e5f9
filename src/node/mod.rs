//! The parser graph: node kinds, the combinator algebra, and the `Parser`
//! handle every public factory and combinator method hangs off of.
//!
//! A grammar is a directed graph of [`ParserNode`]s reached through
//! [`Parser`] handles (`Rc<dyn ParserNode>`). Every node implements the two
//! execution primitives (`parse_on`, `fast_parse_on`) plus the algebra used
//! by grammar resolution and structural equality (`children`,
//! `replace_child`, `shallow_copy`, `props_eq`). Child slots live behind
//! `RefCell` so `Settable` can rebind its delegate, and so reference
//! resolution (`crate::grammar`) and `Mirror` (`crate::node::algebra`) can
//! rewrite child slots in place.
//!
//! All edges but one are a DAG: the same child `Parser` may be reachable
//! from several parents (a grammar's productions form a diamond, not a
//! tree). The exception is `Settable`, whose rebindable slot is how
//! recursive grammars close a cycle without the graph itself needing to be
//! built top-down.

pub mod actions;
pub mod algebra;
pub mod combinators;
pub mod primitive;
pub mod reference;
pub mod repeating;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::context::{Buffer, Context, Outcome};
use crate::value::Value;

/// The capability set every parser-graph node implements.
///
/// Defaults are provided for leaf nodes (no children, default-equal
/// properties); combinators override what they need.
pub trait ParserNode: fmt::Debug + 'static {
    /// The full parse: produces a typed value on success.
    fn parse_on(&self, context: &Context) -> Outcome;

    /// The position-only fast path. Must be observationally equivalent to
    /// `parse_on` with respect to acceptance and final position, except
    /// that nodes with user-visible side effects must fall back to the
    /// full path (see [`actions::ActionNode`]).
    ///
    /// The default simply delegates to `parse_on` and extracts the
    /// position; nodes on the hot path (primitives, `Sequence`, `Choice`,
    /// repetition) override it to skip constructing a `Value`.
    fn fast_parse_on(&self, buffer: &Buffer, position: usize) -> Option<usize> {
        match self.parse_on(&Context::new(buffer.clone(), position)) {
            Outcome::Success(s) => Some(s.position()),
            Outcome::Failure(_) => None,
        }
    }

    /// Direct child slots, in a stable order. Empty for leaves.
    fn children(&self) -> Vec<Parser> {
        Vec::new()
    }

    /// Rewrites any child slot whose current value is identity-equal to
    /// `src` so it now holds `tgt`. A no-op for leaves.
    fn replace_child(&self, _src: &Parser, _tgt: &Parser) {}

    /// A new node with the same child references and scalar properties —
    /// the building block `deep_copy`/`Mirror::transform` shallow-copy
    /// every reachable node from before rewiring their children to point at
    /// the copies.
    fn shallow_copy(&self) -> Parser;

    /// Scalar-property equality against another node of (expected) the same
    /// concrete kind, ignoring children. The default requires `other` to be
    /// the same concrete type and have no other scalar properties to check;
    /// nodes with their own fields (messages, bounds, predicate identity)
    /// override this to also compare those.
    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other.as_any().downcast_ref::<Self>().is_some()
    }

    /// Enables the `Any`-downcasting `props_eq` relies on.
    fn as_any(&self) -> &dyn Any;

    /// A short, human-readable label used in synthesized `Choice` failure
    /// messages and in `Debug`/trace output.
    fn label(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }
}

/// A handle to a node in a parser graph.
///
/// Cloning a `Parser` clones the `Rc`, not the node: two clones refer to the
/// same underlying node, so rebinding a shared `Settable` is observed
/// everywhere that `Settable` is reachable.
#[derive(Clone, Debug)]
pub struct Parser(pub(crate) Rc<dyn ParserNode>);

impl Parser {
    pub fn new(node: impl ParserNode) -> Self {
        Parser(Rc::new(node))
    }

    pub(crate) fn from_rc(node: Rc<dyn ParserNode>) -> Self {
        Parser(node)
    }

    pub fn parse_on(&self, context: &Context) -> Outcome {
        self.0.parse_on(context)
    }

    pub fn fast_parse_on(&self, buffer: &Buffer, position: usize) -> Option<usize> {
        self.0.fast_parse_on(buffer, position)
    }

    /// Parses `input` from the start, returning the full [`Outcome`].
    pub fn parse(&self, input: &str) -> Outcome {
        self.parse_on(&Context::of_str(input))
    }

    /// Whether `input` is accepted from the start, via the fast path.
    pub fn accept(&self, input: &str) -> bool {
        let buffer = crate::context::buffer_of(input);
        self.fast_parse_on(&buffer, 0).is_some()
    }

    /// All non-overlapping matches, trying this parser anchored at every
    /// position and advancing one character on a mismatch.
    ///
    /// A zero-advance success (an empty match) would loop forever advancing
    /// by zero each time; per spec.md §9's open question, this is treated
    /// as a bug-equivalent condition and the scan force-advances by one
    /// character in that case too.
    pub fn matches(&self, input: &str) -> Vec<Value> {
        let buffer = crate::context::buffer_of(input);
        let mut found = Vec::new();
        let mut position = 0usize;
        while position <= buffer.len() {
            if let Outcome::Success(s) = self.parse_on(&Context::new(buffer.clone(), position)) {
                found.push(s.into_value());
            }
            position += 1;
        }
        found
    }

    /// Like [`matches`][Self::matches], but after a successful match the
    /// next attempt starts at the match's end instead of one character in.
    pub fn matches_skipping(&self, input: &str) -> Vec<Value> {
        let buffer = crate::context::buffer_of(input);
        let mut found = Vec::new();
        let mut position = 0usize;
        while position <= buffer.len() {
            match self.parse_on(&Context::new(buffer.clone(), position)) {
                Outcome::Success(s) => {
                    let end = s.position();
                    found.push(s.into_value());
                    position = if end > position { end } else { position + 1 };
                }
                Outcome::Failure(_) => position += 1,
            }
        }
        found
    }

    // -- combinator surface -------------------------------------------------

    pub fn seq(&self, others: &[Parser]) -> Parser {
        let mut all = vec![self.clone()];
        all.extend_from_slice(others);
        combinators::sequence(all)
    }

    pub fn or(&self, others: &[Parser]) -> Parser {
        let mut all = vec![self.clone()];
        all.extend_from_slice(others);
        combinators::choice(all)
    }

    pub fn optional(&self, otherwise: Value) -> Parser {
        Parser::new(combinators::OptionalNode::new(self.clone(), otherwise))
    }

    pub fn and(&self) -> Parser {
        Parser::new(combinators::AndNode::new(self.clone()))
    }

    pub fn not(&self, message: impl Into<String>) -> Parser {
        Parser::new(combinators::NotNode::new(self.clone(), message.into()))
    }

    /// `self` negated: succeeds consuming one character iff `self` would not
    /// match here. Sugar for `not(msg).seq(any()).pick(1)`, distinct from
    /// `CharacterNode::neg`, which instead inverts the character predicate.
    pub fn neg(&self, message: Option<String>) -> Parser {
        let message = message.unwrap_or_else(|| format!("{} not expected", self.0.label()));
        self.not(message)
            .seq(&[primitive::any("any character expected")])
            .map(|v| v.pick(1))
    }

    pub fn settable(&self) -> Parser {
        Parser::new(combinators::SettableNode::new(self.clone()))
    }

    pub fn end(&self, message: impl Into<String>) -> Parser {
        self.seq(&[combinators::end_of_input(message)])
            .map(|v| v.pick(0))
    }

    pub fn map(&self, f: impl Fn(Value) -> Value + 'static) -> Parser {
        Parser::new(actions::ActionNode::new(self.clone(), Rc::new(f), false))
    }

    pub fn map_with_side_effects(&self, f: impl Fn(Value) -> Value + 'static) -> Parser {
        Parser::new(actions::ActionNode::new(self.clone(), Rc::new(f), true))
    }

    pub fn pick(&self, index: isize) -> Parser {
        self.map(move |v| v.pick(index))
    }

    pub fn permute(&self, indexes: &'static [isize]) -> Parser {
        self.map(move |v| Value::List(indexes.iter().map(|&i| v.pick(i)).collect()))
    }

    pub fn flatten(&self, message: Option<String>) -> Parser {
        Parser::new(actions::FlattenNode::new(self.clone(), message))
    }

    pub fn token(&self) -> Parser {
        Parser::new(actions::TokenNode::new(self.clone()))
    }

    pub fn trim(&self, before: Option<Parser>, after: Option<Parser>) -> Parser {
        let before = before.unwrap_or_else(|| crate::charset::whitespace("whitespace expected"));
        let after = after.unwrap_or_else(|| before.clone());
        Parser::new(actions::TrimNode::new(self.clone(), before, after))
    }

    pub fn call_cc(
        &self,
        handler: impl Fn(&dyn Fn(&Context) -> Outcome, &Context) -> Outcome + 'static,
    ) -> Parser {
        Parser::new(actions::ContinuationNode::new(self.clone(), Rc::new(handler)))
    }

    pub fn separated_by(&self, separator: &Parser) -> Parser {
        let tail = combinators::sequence(vec![separator.clone(), self.clone()]).star();
        self.seq(&[tail]).map(|v| {
            let Value::List(mut parts) = v else {
                panic!("separated_by: sequence did not produce a list")
            };
            let tail = parts.pop().expect("sequence always has two parts");
            let first = parts.pop().expect("sequence always has two parts");
            let mut result = vec![first];
            let Value::List(pairs) = tail else {
                panic!("separated_by: tail repetition did not produce a list")
            };
            for pair in pairs {
                let Value::List(pair) = pair else {
                    panic!("separated_by: pair is not a list")
                };
                result.extend(pair);
            }
            Value::List(result)
        })
    }

    pub fn delimited_by(&self, separator: &Parser) -> Parser {
        let separator = separator.clone();
        self.separated_by(&separator)
            .seq(&[separator.optional(Value::Unit)])
            .map(|v| {
                let Value::List(mut parts) = v else {
                    panic!("delimited_by: sequence did not produce a list")
                };
                let trailing = parts.pop().expect("sequence always has two parts");
                let Value::List(mut result) = parts.pop().expect("sequence always has two parts")
                else {
                    panic!("delimited_by: separated_by did not produce a list")
                };
                if !matches!(trailing, Value::Unit) {
                    result.push(trailing);
                }
                Value::List(result)
            })
    }

    // -- repetition -----------------------------------------------------

    pub fn repeat(&self, min: usize, max: Option<usize>) -> Parser {
        Parser::new(repeating::PossessiveNode::new(self.clone(), min, max))
    }

    pub fn star(&self) -> Parser {
        self.repeat(0, None)
    }

    pub fn plus(&self) -> Parser {
        self.repeat(1, None)
    }

    pub fn times(&self, count: usize) -> Parser {
        self.repeat(count, Some(count))
    }

    pub fn repeat_greedy(&self, limit: &Parser, min: usize, max: Option<usize>) -> Parser {
        Parser::new(repeating::GreedyNode::new(
            self.clone(),
            limit.clone(),
            min,
            max,
        ))
    }

    pub fn star_greedy(&self, limit: &Parser) -> Parser {
        self.repeat_greedy(limit, 0, None)
    }

    pub fn plus_greedy(&self, limit: &Parser) -> Parser {
        self.repeat_greedy(limit, 1, None)
    }

    pub fn repeat_lazy(&self, limit: &Parser, min: usize, max: Option<usize>) -> Parser {
        Parser::new(repeating::LazyNode::new(
            self.clone(),
            limit.clone(),
            min,
            max,
        ))
    }

    pub fn star_lazy(&self, limit: &Parser) -> Parser {
        self.repeat_lazy(limit, 0, None)
    }

    pub fn plus_lazy(&self, limit: &Parser) -> Parser {
        self.repeat_lazy(limit, 1, None)
    }

    // -- algebra ----------------------------------------------------------

    pub fn get_children(&self) -> Vec<Parser> {
        self.0.children()
    }

    pub fn replace(&self, src: &Parser, tgt: &Parser) {
        self.0.replace_child(src, tgt);
    }

    pub fn copy(&self) -> Parser {
        self.0.shallow_copy()
    }

    pub fn deep_copy(&self) -> Parser {
        algebra::Mirror::new(self.clone()).transform(&|p| p)
    }

    pub fn is_equal_to(&self, other: &Parser) -> bool {
        algebra::is_equal_to(self, other, &mut std::collections::HashSet::new())
    }

    /// Rebinds a [`Settable`][combinators::SettableNode]'s delegate.
    ///
    /// Panics if `self` is not a `Settable` — a programming error, like
    /// calling `.set()` on a non-settable parser in the reference
    /// implementation.
    pub fn settable_set(&self, delegate: Parser) {
        self.0
            .as_any()
            .downcast_ref::<combinators::SettableNode>()
            .unwrap_or_else(|| panic!("settable_set: {} is not a Settable", self.0.label()))
            .set(delegate);
    }

    /// Returns the current delegate of a [`Settable`][combinators::SettableNode].
    pub fn settable_get(&self) -> Parser {
        self.0
            .as_any()
            .downcast_ref::<combinators::SettableNode>()
            .unwrap_or_else(|| panic!("settable_get: {} is not a Settable", self.0.label()))
            .get()
    }

    /// If this node is a grammar [`Reference`][reference::ReferenceNode],
    /// its production name.
    pub fn as_reference_name(&self) -> Option<String> {
        self.0
            .as_any()
            .downcast_ref::<reference::ReferenceNode>()
            .map(|r| r.name().to_string())
    }

    pub(crate) fn ptr_key(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.label())
    }
}
