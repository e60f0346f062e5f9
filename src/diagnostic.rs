//! Pretty, source-annotated rendering of a [`Failure`].
//!
//! [`DiagnosticPrinter`] turns a [`Failure`]'s buffer position into a byte
//! offset into the original source text and hands it to `annotate-snippets`
//! for the boxed, line-numbered rendering familiar from `rustc` diagnostics.

use std::fmt::Write as _;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

use crate::context::Failure;

/// Builder for rendering a [`Failure`] against its source text.
pub struct DiagnosticPrinter<'f, 's> {
    failure: &'f Failure,
    source: &'s str,
    path: Option<&'s str>,
    colored: bool,
}

impl<'f, 's> DiagnosticPrinter<'f, 's> {
    /// `source` must be the exact text `failure`'s buffer was decoded from —
    /// the failure's char position is translated into a byte offset into it.
    pub fn new(failure: &'f Failure, source: &'s str) -> Self {
        DiagnosticPrinter {
            failure,
            source,
            path: None,
            colored: false,
        }
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl std::fmt::Write) -> std::fmt::Result {
        let offset = byte_offset_of_char(self.source, self.failure.position());
        let span = offset..offset;

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let mut snippet = Snippet::source(self.source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(span).label(self.failure.message()));
        if let Some(p) = self.path {
            snippet = snippet.path(p);
        }

        let group = Level::ERROR
            .primary_title(self.failure.message())
            .element(snippet);
        write!(w, "{}", renderer.render(&[group]))
    }
}

/// The byte offset of the `char_position`-th character in `source`, or
/// `source.len()` if `char_position` is at or past the end.
fn byte_offset_of_char(source: &str, char_position: usize) -> usize {
    source
        .char_indices()
        .nth(char_position)
        .map(|(byte, _)| byte)
        .unwrap_or(source.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn renders_an_error_pointing_at_the_failure_position() {
        let ctx = Context::of_str("1+x");
        let failure = ctx.failure_at("digit expected", 2);
        let rendered = DiagnosticPrinter::new(&failure, "1+x").render();
        assert!(rendered.contains("digit expected"));
    }

    #[test]
    fn byte_offset_tracks_multibyte_characters() {
        assert_eq!(byte_offset_of_char("héllo", 0), 0);
        assert_eq!(byte_offset_of_char("héllo", 1), 1);
        assert_eq!(byte_offset_of_char("héllo", 2), 3);
        assert_eq!(byte_offset_of_char("héllo", 10), 6);
    }
}
