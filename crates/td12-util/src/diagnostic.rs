//! Diagnostic formatting.
//!
//! td12dk never throws exceptions for ordinary control flow: every stage
//! returns `Result<T, Diagnostic>` (or, for the assembler, accumulates a
//! `Vec<Diagnostic>`). A [`Diagnostic`] knows how to render itself against
//! the source text it was raised from — but it does not own that text,
//! since file I/O is a driver concern, not a core one.

use std::fmt;

use crate::span::Span;

/// The one-word category printed in a diagnostic's header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Semantic,
    CodeGeneration,
    Assembler,
    Emulator,
    Compiler,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorCategory::Lexical => "Lexical",
            ErrorCategory::Syntax => "Syntax",
            ErrorCategory::Semantic => "Semantic",
            ErrorCategory::CodeGeneration => "Code Generation",
            ErrorCategory::Assembler => "Assembler",
            ErrorCategory::Emulator => "Emulator",
            ErrorCategory::Compiler => "Compiler",
        };
        write!(f, "{label}")
    }
}

/// A single fatal diagnostic, anchored at a primary span with an optional
/// secondary "context" span (used e.g. to show the operator of an invalid
/// operand, or the site of a prior declaration).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub category: ErrorCategory,
    pub kind: &'static str,
    pub message: String,
    pub span: Span,
    pub context: Option<Span>,
}

impl Diagnostic {
    pub fn new(category: ErrorCategory, kind: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            category,
            kind,
            message: message.into(),
            span,
            context: None,
        }
    }

    pub fn with_context(mut self, context: Span) -> Self {
        self.context = Some(context);
        self
    }

    /// Render the diagnostic against the source text it refers to.
    ///
    /// `source` must be the full text of `self.span.filename`.
    pub fn render(&self, source: &str) -> String {
        let mut out = format!(
            "[{} Error] {}:\n",
            self.category, self.kind
        );
        out.push_str(&format!(
            "  {}\n",
            self.message,
        ));
        out.push_str(&format!(
            "In file {} at line {}",
            self.span.filename, self.span.line
        ));

        let lines: Vec<&str> = source.lines().collect();

        if self.span.is_multiline() {
            out.push_str(&format!(" to line {}\n\n", self.span.end_line()));
            let start = self.span.line as usize;
            let end = self.span.end_line() as usize;
            for n in start..=end {
                if let Some(text) = lines.get(n - 1) {
                    out.push_str(&format!("   |{text}\n"));
                }
            }
            return out;
        }

        out.push_str(&format!(" col {}\n\n", self.span.column));
        let line_text = lines
            .get((self.span.line as usize).saturating_sub(1))
            .copied()
            .unwrap_or("");
        out.push_str(&format!("   |{line_text}\n"));
        out.push_str("   |");
        out.push_str(&Self::marker_line(&self.span, self.context.as_ref()));
        out
    }

    /// Build the spaces/carets/tildes line beneath the source excerpt.
    fn marker_line(primary: &Span, context: Option<&Span>) -> String {
        match context {
            None => {
                let mut line = String::new();
                for _ in 0..primary.column.saturating_sub(1) {
                    line.push(' ');
                }
                for _ in 0..primary.length.max(1) {
                    line.push('^');
                }
                line
            }
            Some(ctx) => {
                let width = (primary.end_column()).max(ctx.end_column()) as usize;
                let mut chars = vec![' '; width];
                for i in ctx.column.saturating_sub(1)..ctx.end_column().saturating_sub(1) {
                    if let Some(c) = chars.get_mut(i as usize) {
                        *c = '~';
                    }
                }
                for i in primary.column.saturating_sub(1)..primary.end_column().saturating_sub(1) {
                    if let Some(c) = chars.get_mut(i as usize) {
                        *c = '^';
                    }
                }
                chars.into_iter().collect()
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} Error] {}: {}", self.category, self.kind, self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_caret_matches_column_and_length() {
        let span = Span::new("a.td12", 1, 5, 3);
        let diag = Diagnostic::new(ErrorCategory::Syntax, "UnexpectedToken", "oops", span);
        let rendered = diag.render("let xyz = 1;\n");
        let caret_line = rendered.lines().last().unwrap();
        let body = caret_line.strip_prefix("   |").unwrap();
        assert_eq!(body, "    ^^^");
    }

    #[test]
    fn multiline_span_prints_full_range() {
        let span = Span::with_extra_lines("a.td12", 1, 1, 1, 2);
        let diag = Diagnostic::new(ErrorCategory::Syntax, "Unbalanced", "oops", span);
        let rendered = diag.render("one\ntwo\nthree\n");
        assert!(rendered.contains("one"));
        assert!(rendered.contains("two"));
        assert!(rendered.contains("three"));
    }

    #[test]
    fn context_overlays_caret_on_tilde() {
        let primary = Span::new("a.td12", 1, 7, 1);
        let context = Span::new("a.td12", 1, 1, 10);
        let diag = Diagnostic::new(ErrorCategory::Semantic, "InvalidOperand", "bad", primary)
            .with_context(context);
        let rendered = diag.render("some expr here\n");
        let caret_line = rendered.lines().last().unwrap();
        assert!(caret_line.contains('^'));
        assert!(caret_line.contains('~'));
    }
}
