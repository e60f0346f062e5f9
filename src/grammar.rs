//! Named, mutually recursive productions resolved into a single parser
//! graph.
//!
//! [`GrammarBuilder`] is this crate's stand-in for the Python reference
//! implementation's `GrammarDefinition` metaclass: Rust has no class body to
//! intercept, so instead of productions being declared as class attributes
//! and collected automatically, they're registered explicitly through
//! [`GrammarBuilder::define`]/[`GrammarBuilder::redef`]/[`GrammarBuilder::action`].
//! [`GrammarBuilder::build`] performs the same reference-dereferencing walk
//! the metaclass's `_resolve` does: every [`reference`][crate::node::reference::reference]
//! reachable from the named production is replaced in place by the
//! production it names, detecting unknown names, undefined productions, and
//! reference cycles as construction-time panics.

use std::collections::{HashMap, HashSet};

use crate::node::reference::reference;
use crate::node::Parser;
use crate::value::Value;

/// A grammar under construction: a set of named productions, any of which
/// may refer to another (including itself) via [`GrammarBuilder::ref_`]
/// before that production exists.
#[derive(Default)]
pub struct GrammarBuilder {
    productions: HashMap<String, Parser>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        GrammarBuilder {
            productions: HashMap::new(),
        }
    }

    /// A forward reference to a production that may not be defined yet.
    /// Only meaningful inside another production passed to `define`/`redef`
    /// on this same builder — resolved away by [`build`][Self::build].
    pub fn ref_(&self, name: impl Into<String>) -> Parser {
        reference(name)
    }

    /// Registers a brand-new production. Panics if `name` is already
    /// defined on this builder — use [`redef`][Self::redef] to override one,
    /// including one brought in by [`extend`][Self::extend].
    pub fn define(&mut self, name: impl Into<String>, parser: Parser) {
        let name = name.into();
        assert!(
            !self.productions.contains_key(&name),
            "duplicate production: {name}"
        );
        self.productions.insert(name, parser);
    }

    /// Replaces an existing production's parser outright. Panics if `name`
    /// has no existing definition.
    pub fn redef(&mut self, name: &str, parser: Parser) {
        assert!(
            self.productions.contains_key(name),
            "undefined production: {name}"
        );
        self.productions.insert(name.to_owned(), parser);
    }

    /// Wraps an existing production's value with `action`, the common case
    /// of `redef` (attaching a semantic action to a bare grammar rule).
    /// Panics if `name` has no existing definition.
    pub fn action(&mut self, name: &str, action: impl Fn(Value) -> Value + 'static) {
        let current = self
            .productions
            .get(name)
            .unwrap_or_else(|| panic!("undefined production: {name}"))
            .clone();
        self.redef(name, current.map(action));
    }

    /// Brings in every production from `base` that isn't already defined on
    /// this builder, the way a grammar subclass inherits its parent's
    /// productions before applying its own overrides (via `redef`).
    pub fn extend(&mut self, base: &GrammarBuilder) {
        for (name, parser) in &base.productions {
            self.productions.entry(name.clone()).or_insert_with(|| parser.clone());
        }
    }

    /// Resolves every reference reachable from the `name` production and
    /// returns the now fully concrete root parser.
    ///
    /// Every production is deep-copied into a private snapshot before any
    /// resolution happens, so the in-place `replace` walk below only ever
    /// mutates that snapshot's graph, never the `Parser`s stored in `self` —
    /// a base grammar handed to [`extend`][Self::extend] stays untouched by
    /// a derived grammar's `build`, matching the reference implementation's
    /// `{k: v.deep_copy() for …}` snapshot ahead of its own resolution walk.
    ///
    /// Panics on an unknown production name, or on a cycle of references
    /// that never bottoms out in a non-reference production (`a` := `ref_("a")`
    /// with nothing else defining `a`).
    pub fn build(&self, name: &str) -> Parser {
        let snapshot: HashMap<String, Parser> =
            self.productions.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect();

        let mut resolved: HashMap<String, Parser> = HashMap::new();
        let root = Self::dereference(&snapshot, &mut resolved, name);

        let mut seen = HashSet::new();
        seen.insert(root.ptr_key());
        let mut todo = vec![root.clone()];

        while let Some(parent) = todo.pop() {
            for child in parent.get_children() {
                let child = match child.as_reference_name() {
                    Some(ref_name) => {
                        let referenced = Self::dereference(&snapshot, &mut resolved, &ref_name);
                        parent.replace(&child, &referenced);
                        referenced
                    }
                    None => child,
                };
                if seen.insert(child.ptr_key()) {
                    todo.push(child);
                }
            }
        }

        root
    }

    /// Follows a chain of references starting at `name` until it reaches a
    /// non-reference production, memoizing every name visited along the way
    /// so repeated resolution of the same chain is O(1) after the first.
    fn dereference(
        productions: &HashMap<String, Parser>,
        resolved: &mut HashMap<String, Parser>,
        name: &str,
    ) -> Parser {
        if let Some(p) = resolved.get(name) {
            return p.clone();
        }

        let mut chain = vec![name.to_owned()];
        let mut parser = productions
            .get(name)
            .unwrap_or_else(|| panic!("unknown parser reference: {name}"))
            .clone();

        while let Some(next_name) = parser.as_reference_name() {
            if chain.contains(&next_name) {
                panic!("recursive references detected: {}", chain.join(","));
            }
            chain.push(next_name.clone());
            parser = productions
                .get(&next_name)
                .unwrap_or_else(|| panic!("unknown parser reference: {next_name}"))
                .clone();
        }

        for visited in &chain {
            resolved.insert(visited.clone(), parser.clone());
        }
        parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::primitive::{character, CharPredicate};
    use crate::value::Value;

    fn digit() -> Parser {
        character(CharPredicate::Fn(|c| c.is_ascii_digit(), "digit"), "digit expected")
    }

    #[test]
    fn resolves_a_forward_reference() {
        let mut g = GrammarBuilder::new();
        g.define("start", g.ref_("digits"));
        g.define("digits", digit().plus());
        let parser = g.build("start");
        assert!(parser.parse("123").is_success());
    }

    #[test]
    fn resolves_recursive_self_reference() {
        let mut g = GrammarBuilder::new();
        g.define(
            "expr",
            digit()
                .seq(&[g.ref_("expr")])
                .or(&[digit()]),
        );
        let parser = g.build("expr");
        assert!(parser.parse("12").is_success());
    }

    #[test]
    #[should_panic(expected = "duplicate production")]
    fn define_panics_on_duplicate_name() {
        let mut g = GrammarBuilder::new();
        g.define("a", digit());
        g.define("a", digit());
    }

    #[test]
    #[should_panic(expected = "undefined production")]
    fn redef_panics_on_missing_name() {
        let mut g = GrammarBuilder::new();
        g.redef("a", digit());
    }

    #[test]
    #[should_panic(expected = "unknown parser reference")]
    fn build_panics_on_unresolved_reference() {
        let mut g = GrammarBuilder::new();
        g.define("start", g.ref_("missing"));
        g.build("start");
    }

    #[test]
    #[should_panic(expected = "recursive references detected")]
    fn build_panics_on_a_pure_reference_cycle() {
        let mut g = GrammarBuilder::new();
        g.define("a", g.ref_("b"));
        g.define("b", g.ref_("a"));
        g.build("a");
    }

    #[test]
    fn extend_inherits_base_productions_for_override() {
        let mut base = GrammarBuilder::new();
        base.define("greeting", crate::strlit::string_of("hi"));

        let mut child = GrammarBuilder::new();
        child.extend(&base);
        child.redef("greeting", crate::strlit::string_of("hello"));

        let parser = child.build("greeting");
        assert!(parser.parse("hello").is_success());
        assert!(parser.parse("hi").is_failure());
    }

    fn letter() -> Parser {
        character(CharPredicate::Fn(|c| c.is_ascii_alphabetic(), "letter"), "letter expected")
    }

    #[test]
    fn build_does_not_mutate_a_shared_base_grammar() {
        // "container" is a sequence node holding a reference to "inner" as a
        // child — exactly the shape extend()'s shallow Rc clone leaves
        // shared between base and child, and build()'s in-place `replace`
        // walk used to resolve right inside that shared node.
        let mut base = GrammarBuilder::new();
        base.define("inner", letter().plus());
        base.define("container", digit().seq(&[base.ref_("inner")]));

        let mut child = GrammarBuilder::new();
        child.extend(&base);
        child.redef("inner", digit().plus());

        let child_parser = child.build("container");
        assert!(child_parser.parse("11").is_success());

        // If `build` had resolved in place on the shared node, `base` would
        // now also see `child`'s digit-based "inner" instead of its own
        // letter-based one.
        let base_parser = base.build("container");
        assert!(base_parser.parse("1a").is_success());
        assert!(base_parser.parse("11").is_failure());
    }

    #[test]
    fn action_wraps_the_existing_production() {
        let mut g = GrammarBuilder::new();
        g.define("digit", digit());
        g.action("digit", |v| match v {
            Value::Char(c) => Value::Int(c.to_digit(10).expect("digit predicate guarantees ascii digit") as i64),
            other => other,
        });
        let outcome = g.build("digit").parse("7");
        assert_eq!(outcome.into_value().unwrap(), Value::Int(7));
    }
}
