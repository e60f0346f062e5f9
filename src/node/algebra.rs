//! Whole-graph operations: traversal, transformation, and structural
//! equality.
//!
//! Every operation here is identity-based rather than structural in how it
//! walks the graph — two `Parser` handles are "the same node" iff they wrap
//! the same `Rc` allocation, tracked by [`Parser::ptr_key`]. This is what
//! lets [`Mirror::transform`] and [`is_equal_to`] terminate on a grammar
//! that contains a `Settable`-induced cycle, where naive recursion over
//! `children()` would not.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use crate::node::{Parser, ParserNode};

/// Iterative, identity-deduplicated pre-order walk of every node reachable
/// from a root. A plain work-stack plus a seen-set of pointer keys, so a
/// cycle through a `Settable` is visited exactly once instead of looping.
pub struct ParserIterator {
    todo: Vec<Parser>,
    seen: HashSet<usize>,
}

impl ParserIterator {
    pub fn new(root: Parser) -> Self {
        let mut seen = HashSet::new();
        seen.insert(root.ptr_key());
        ParserIterator {
            todo: vec![root],
            seen,
        }
    }
}

impl Iterator for ParserIterator {
    type Item = Parser;

    fn next(&mut self) -> Option<Parser> {
        let current = self.todo.pop()?;
        for child in current.get_children() {
            if self.seen.insert(child.ptr_key()) {
                self.todo.push(child);
            }
        }
        Some(current)
    }
}

/// A view over the subgraph reachable from a root, supporting iteration and
/// whole-graph transformation.
pub struct Mirror {
    root: Parser,
}

impl Mirror {
    pub fn new(root: Parser) -> Self {
        Mirror { root }
    }

    pub fn iter(&self) -> ParserIterator {
        ParserIterator::new(self.root.clone())
    }

    /// Builds a new graph isomorphic to this one, with every node replaced
    /// by `transformer(node.copy())`, and every child slot in the new graph
    /// rewired to point at the corresponding new node.
    ///
    /// [`Parser::deep_copy`] is `transform` with the identity transformer;
    /// routing it through here instead of a direct recursive `copy` +
    /// `replace(child, child.deep_copy())` is what lets it terminate on a
    /// grammar with a reference cycle.
    pub fn transform(&self, transformer: &dyn Fn(Parser) -> Parser) -> Parser {
        let mapping: HashMap<usize, Parser> = self
            .iter()
            .map(|p| (p.ptr_key(), transformer(p.copy())))
            .collect();

        let mut seen: HashSet<usize> = mapping.keys().copied().collect();
        let mut todo: Vec<Parser> = mapping.values().cloned().collect();

        while let Some(parent) = todo.pop() {
            for child in parent.get_children() {
                let key = child.ptr_key();
                if let Some(replacement) = mapping.get(&key) {
                    parent.replace(&child, replacement);
                } else if seen.insert(key) {
                    todo.push(child);
                }
            }
        }

        mapping
            .get(&self.root.ptr_key())
            .cloned()
            .unwrap_or_else(|| self.root.clone())
    }
}

/// Structural equality: same concrete node kind, same scalar properties,
/// and pairwise-equal children, recursively. `seen` records pairs already
/// compared so a cycle in either graph is treated as equal rather than
/// walked forever — a pair once assumed equal to justify the recursion that
/// reaches it back is consistent with how a cyclic grammar's self-reference
/// is meant to compare equal to itself.
pub fn is_equal_to(a: &Parser, b: &Parser, seen: &mut HashSet<(usize, usize)>) -> bool {
    let key = (a.ptr_key(), b.ptr_key());
    if a.ptr_key() == b.ptr_key() || seen.contains(&key) {
        return true;
    }
    seen.insert(key);

    let a_node: &dyn Any = a.0.as_any();
    let b_node: &dyn Any = b.0.as_any();
    if a_node.type_id() != b_node.type_id() {
        return false;
    }
    if !a.0.props_eq(b.0.as_ref()) {
        return false;
    }

    let a_children = a.get_children();
    let b_children = b.get_children();
    if a_children.len() != b_children.len() {
        return false;
    }
    a_children
        .iter()
        .zip(b_children.iter())
        .all(|(x, y)| is_equal_to(x, y, seen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::combinators::SettableNode;
    use crate::node::primitive::{character, CharPredicate};

    fn digit() -> Parser {
        character(CharPredicate::Fn(|c| c.is_ascii_digit(), "digit"), "digit expected")
    }

    #[test]
    fn deep_copy_produces_an_independent_equal_graph() {
        let original = digit().star();
        let copy = original.deep_copy();
        assert!(original.is_equal_to(&copy));
        assert_ne!(original.ptr_key(), copy.ptr_key());
    }

    #[test]
    fn deep_copy_terminates_on_a_reference_cycle() {
        let settable = Parser::new(SettableNode::undefined("undefined"));
        let body = digit().seq(&[settable.clone()]).optional(crate::value::Value::Unit);
        settable.settable_set(body);

        let copy = settable.deep_copy();
        assert_ne!(copy.ptr_key(), settable.ptr_key());
    }

    #[test]
    fn is_equal_to_distinguishes_different_predicates() {
        let a = digit();
        let b = super::super::primitive::any("any character expected");
        assert!(!a.is_equal_to(&b));
    }

    #[test]
    fn parser_iterator_visits_each_node_once_through_a_diamond() {
        let shared = digit();
        let graph = shared.seq(&[shared.clone()]);
        let count = Mirror::new(graph).iter().count();
        // Sequence node + the one shared digit node, not two.
        assert_eq!(count, 2);
    }
}
