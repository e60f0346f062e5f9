//! Parser execution tracing, gated behind the `debug` feature.
//!
//! [`trace`] wraps a parser so every call to it prints a start/end line to
//! stderr showing the call depth, the position it started at, and whether
//! it matched. With `debug` off, `trace` is the identity function — the
//! wrapping node is never constructed, so there's no overhead to opt out of.

#[cfg(feature = "debug")]
mod internals {
    use std::cell::Cell;
    use std::io::Write;

    use crate::context::Outcome;

    thread_local! {
        static DEPTH: Cell<usize> = const { Cell::new(0) };
    }

    /// Tracks this call's nesting depth, decrementing on drop. A plain
    /// thread-local `Cell` rather than an atomic: this crate's parser graph
    /// is `Rc`-based and already confined to one thread, so there's nothing
    /// to synchronize.
    pub struct Depth {
        depth: usize,
        owns_increment: bool,
    }

    impl Depth {
        pub fn enter() -> Self {
            let depth = DEPTH.with(|d| {
                let current = d.get();
                d.set(current + 1);
                current
            });
            Depth {
                depth,
                owns_increment: true,
            }
        }
    }

    impl Drop for Depth {
        fn drop(&mut self) {
            if self.owns_increment {
                DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
            }
        }
    }

    impl std::ops::Deref for Depth {
        type Target = usize;

        fn deref(&self) -> &usize {
            &self.depth
        }
    }

    pub enum Severity {
        Success,
        Failure,
    }

    impl Severity {
        pub fn of(outcome: &Outcome) -> Self {
            match outcome {
                Outcome::Success(_) => Severity::Success,
                Outcome::Failure(_) => Severity::Failure,
            }
        }
    }

    pub fn start(depth: usize, name: &str, position: usize) {
        let gutter = anstyle::Style::new().bold();
        let pos_style = anstyle::Style::new().underline();
        let mut writer = anstream::stderr().lock();
        let _ = writeln!(
            writer,
            "{:depth$}> {name} {g}|{r} {ps}@{position}{pr}",
            "",
            g = gutter.render(),
            r = gutter.render_reset(),
            ps = pos_style.render(),
            pr = pos_style.render_reset(),
        );
    }

    pub fn end(depth: usize, name: &str, outcome: &Outcome) {
        let gutter = anstyle::Style::new().bold();
        let (style, status) = match Severity::of(outcome) {
            Severity::Success => (
                anstyle::Style::new().fg_color(Some(anstyle::AnsiColor::Green.into())),
                format!("+{}", outcome.position()),
            ),
            Severity::Failure => (
                anstyle::Style::new().fg_color(Some(anstyle::AnsiColor::Yellow.into())),
                "backtrack".to_owned(),
            ),
        };
        let mut writer = anstream::stderr().lock();
        let _ = writeln!(
            writer,
            "{s}{:depth$}< {name}{sr} {g}|{r} {s}{status}{sr}",
            "",
            g = gutter.render(),
            r = gutter.render_reset(),
            s = style.render(),
            sr = style.render_reset(),
        );
    }
}

#[cfg(feature = "debug")]
use crate::node::{Parser, ParserNode};

#[cfg(feature = "debug")]
#[derive(Debug)]
struct TraceNode {
    delegate: std::cell::RefCell<Parser>,
    name: String,
}

#[cfg(feature = "debug")]
impl ParserNode for TraceNode {
    fn parse_on(&self, context: &crate::context::Context) -> crate::context::Outcome {
        let depth = internals::Depth::enter();
        internals::start(*depth, &self.name, context.position());
        let outcome = self.delegate.borrow().parse_on(context);
        internals::end(*depth, &self.name, &outcome);
        outcome
    }

    fn fast_parse_on(&self, buffer: &crate::context::Buffer, position: usize) -> Option<usize> {
        self.delegate.borrow().fast_parse_on(buffer, position)
    }

    fn children(&self) -> Vec<Parser> {
        vec![self.delegate.borrow().clone()]
    }

    fn replace_child(&self, src: &Parser, tgt: &Parser) {
        let mut slot = self.delegate.borrow_mut();
        if slot.ptr_key() == src.ptr_key() {
            *slot = tgt.clone();
        }
    }

    fn shallow_copy(&self) -> Parser {
        Parser::new(TraceNode {
            delegate: std::cell::RefCell::new(self.delegate.borrow().clone()),
            name: self.name.clone(),
        })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn label(&self) -> String {
        format!("Trace[{}]", self.name)
    }
}

/// Wraps `parser` to log its entry/exit to stderr under the `debug`
/// feature. Without that feature, returns `parser` unchanged.
#[cfg_attr(not(feature = "debug"), allow(unused_variables))]
pub fn trace(name: impl Into<String>, parser: crate::node::Parser) -> crate::node::Parser {
    #[cfg(feature = "debug")]
    {
        crate::node::Parser::new(TraceNode {
            delegate: std::cell::RefCell::new(parser),
            name: name.into(),
        })
    }
    #[cfg(not(feature = "debug"))]
    {
        parser
    }
}
