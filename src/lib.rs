//! # petitgraph, grammars as a graph of composable recognizer nodes
//!
//! petitgraph is a parser-combinator library built around one idea: a
//! grammar is a directed graph of small recognizer nodes, not a chain of
//! generic function types. Every combinator — `seq`, `or`, `star`, `map`,
//! a named grammar production — produces a [`Parser`][node::Parser] handle
//! to a node in that graph, and the graph can be walked, copied, compared,
//! and rewired after the fact (grammar reference resolution does exactly
//! that).
//!
//! This trades away some of what a `nom`/`winnow`-style `Fn(Input) ->
//! IResult<Input, Output>` combinator buys you — monomorphized, inlinable
//! parse functions — for a uniform, reflectable grammar representation:
//! mutually recursive productions without a hand-written enum of parser
//! state, structural equality between two parsers built independently, and
//! a single [`Value`][value::Value] type every combinator can read and
//! produce without threading a generic output type through the whole graph.
//!
//! ## Example
//!
//! ```rust
//! use petitgraph::prelude::*;
//! use petitgraph::charset::digit;
//!
//! let number = digit("digit expected").plus().flatten(None);
//! let outcome = number.parse("042");
//! assert!(outcome.is_success());
//! assert_eq!(outcome.into_value().unwrap(), Value::Str("042".to_owned()));
//! ```
//!
//! Mutually recursive grammars are built explicitly with
//! [`GrammarBuilder`][grammar::GrammarBuilder] rather than through forward
//! declarations the compiler resolves for you:
//!
//! ```rust
//! use petitgraph::charset::digit;
//! use petitgraph::grammar::GrammarBuilder;
//!
//! let mut g = GrammarBuilder::new();
//! g.define("expr", digit("digit expected").seq(&[g.ref_("expr")]).or(&[digit("digit expected")]));
//! let parser = g.build("expr");
//! assert!(parser.parse("123").is_success());
//! ```
//!
//! ## Crate layout
//!
//! - [`context`] — the input buffer, parse cursor, and the `Success`/
//!   `Failure`/`Outcome` trio every node produces.
//! - [`value`] — the dynamically typed parse result, [`Value`][value::Value].
//! - [`error`] — [`ParseError`][error::ParseError], the recoverable
//!   exception raised by accessing a failed outcome's value.
//! - [`node`] — the parser graph itself: [`Parser`][node::Parser], the
//!   [`ParserNode`][node::ParserNode] trait, and every built-in node kind,
//!   organized the way the reference engine's own modules are:
//!   [`node::primitive`] (characters, strings, epsilon, failure),
//!   [`node::combinators`] (sequence, choice, and/not/optional, settable,
//!   end-of-input), [`node::actions`] (map, flatten, token, trim,
//!   continuations), [`node::repeating`] (possessive/greedy/lazy
//!   repetition), [`node::reference`] (grammar forward references), and
//!   [`node::algebra`] (graph traversal, deep copy, structural equality).
//! - [`charset`] and [`strlit`] — the character-class and string-literal
//!   parser factories built on top of `node::primitive`.
//! - [`grammar`] — [`GrammarBuilder`][grammar::GrammarBuilder], for
//!   mutually recursive named productions.
//! - [`expression`] — [`ExpressionBuilder`][expression::ExpressionBuilder],
//!   for operator-precedence grammars built bottom-up from priority groups.
//! - [`diagnostic`] — pretty, source-annotated rendering of a `Failure`.
//! - [`instrument`] — parser execution tracing, behind the `debug` feature.
//!
//! [`prelude`] re-exports the handful of names a grammar author reaches for
//! constantly.
//!
//! The engine is `Rc`/`RefCell`-based throughout and is not `Send`/`Sync` —
//! a grammar is built and consumed on one thread, matching the dynamically
//! typed reference implementation this crate generalizes from.

#![warn(missing_docs)]
#![cfg_attr(feature = "unstable-doc", feature(doc_auto_cfg))]

pub mod charset;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod expression;
pub mod grammar;
pub mod instrument;
pub mod node;
pub mod strlit;
pub mod value;

pub use instrument::trace;

/// The names a grammar typically needs close at hand: [`Parser`], `Value`,
/// the `Outcome`/`Failure` pair, and `GrammarBuilder`.
///
/// ```rust
/// use petitgraph::prelude::*;
/// ```
pub mod prelude {
    pub use crate::context::{Context, Failure, Outcome, Success};
    pub use crate::error::ParseError;
    pub use crate::grammar::GrammarBuilder;
    pub use crate::node::Parser;
    pub use crate::value::Value;
}
