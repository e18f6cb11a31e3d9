//! Terminal Emitter
//!
//! Human-readable diagnostic output with optional ANSI color support. When
//! the source text is attached, primary labels are rendered with the offending
//! line and a caret underline.

use std::io::{self, Write};

use sq_ir::{LineCol, Span};

use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Automatically detect based on terminal capabilities.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a boolean; `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Source text attached to an emitter for snippet rendering.
struct SourceView {
    path: String,
    text: String,
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    source: Option<SourceView>,
}

impl<W: Write> TerminalEmitter<W> {
    /// Create a new terminal emitter with explicit color mode.
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }

    /// Attach source text so labels can show `path:line:col` and a snippet.
    #[must_use]
    pub fn with_source(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.source = Some(SourceView {
            path: path.into(),
            text: text.into(),
        });
        self
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        };
        self.write_colored(&severity.to_string(), color);
    }

    fn write_code(&mut self, code: &str) {
        if self.colors {
            let _ = write!(self.writer, "{}[{code}]{}", colors::BOLD, colors::RESET);
        } else {
            let _ = write!(self.writer, "[{code}]");
        }
    }

    /// Render `path:line:col` for a span, or the raw byte range without source.
    fn location(&self, span: Span) -> String {
        match &self.source {
            Some(source) => {
                let pos = LineCol::of_offset(&source.text, span.start as usize);
                format!("{}:{pos}", source.path)
            }
            None => format!("{span:?}"),
        }
    }

    fn write_snippet(&mut self, span: Span, message: &str) {
        let Some(source) = &self.source else {
            return;
        };
        let pos = LineCol::of_offset(&source.text, span.start as usize);
        let Some(line) = source.text.lines().nth(pos.line as usize - 1) else {
            return;
        };
        let line = line.to_string();
        let gutter = pos.line.to_string();
        let pad = " ".repeat(gutter.len());
        let line_chars = line.chars().count();
        let start_col = (pos.column as usize - 1).min(line_chars);
        let width = (span.len() as usize).clamp(1, (line_chars - start_col).max(1));

        let _ = writeln!(self.writer, "{pad} |");
        let _ = writeln!(self.writer, "{gutter} | {line}");
        let _ = write!(self.writer, "{pad} | {}", " ".repeat(start_col));
        self.write_colored(&"^".repeat(width), colors::ERROR);
        if !message.is_empty() {
            let _ = write!(self.writer, " ");
            self.write_colored(message, colors::ERROR);
        }
        let _ = writeln!(self.writer);
    }
}

impl TerminalEmitter<io::Stderr> {
    /// Create a terminal emitter for stderr with explicit color mode.
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        // Header: severity[CODE]: message
        self.write_severity(diagnostic.severity);
        self.write_code(diagnostic.code.as_str());
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            let location = self.location(label.span);
            if label.is_primary {
                let _ = writeln!(self.writer, "  --> {location}");
                self.write_snippet(label.span, &label.message);
            } else {
                let _ = write!(self.writer, "      {location}: ");
                self.write_colored(&label.message, colors::SECONDARY);
                let _ = writeln!(self.writer);
            }
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
