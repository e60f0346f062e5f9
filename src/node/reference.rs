//! Forward references inside a [`crate::grammar::GrammarBuilder`] production,
//! resolved away entirely by [`crate::grammar::GrammarBuilder::build`].
//!
//! A `Reference` never participates in an actual parse: `build` always
//! replaces every reachable reference with the production it names before
//! handing the grammar back to its caller. `parse_on` panics if one is
//! somehow still present, the way the reference implementation treats
//! parsing a bare reference as a programming error rather than a possible
//! outcome.

use std::any::Any;

use crate::context::{Context, Outcome};
use crate::node::{Parser, ParserNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceNode {
    name: String,
}

impl ReferenceNode {
    pub fn new(name: impl Into<String>) -> Self {
        ReferenceNode { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ParserNode for ReferenceNode {
    fn parse_on(&self, _context: &Context) -> Outcome {
        panic!(
            "Reference[{}] was parsed directly — GrammarBuilder::build did not resolve it",
            self.name
        );
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(self.clone())
    }

    fn props_eq(&self, other: &dyn ParserNode) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| o.name == self.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> String {
        format!("Reference[{}]", self.name)
    }
}

pub fn reference(name: impl Into<String>) -> Parser {
    Parser::new(ReferenceNode::new(name))
}
