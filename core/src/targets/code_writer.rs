//! Code writer with indentation tracking for the target printers.
//!
//! Indentation is held behind an `Rc<Cell<_>>` so an [`IndentGuard`] can live while the
//! writer is still borrowed mutably for output.
//!
//! ```
//! use thaum_core::targets::CodeWriter;
//!
//! let mut w = CodeWriter::with_indent_spaces(2);
//! w.block("class Point", |w| {
//!     w.line("final int x;");
//! });
//! assert_eq!(w.finish(), "class Point {\n  final int x;\n}\n");
//! ```

use std::cell::Cell;
use std::rc::Rc;

/// Accumulates emitted source text.
#[derive(Debug)]
pub struct CodeWriter {
    out: String,
    indent_level: Rc<Cell<usize>>,
    indent_string: String,
    at_line_start: bool,
}

impl CodeWriter {
    /// A writer indenting with `spaces` spaces per level.
    pub fn with_indent_spaces(spaces: usize) -> Self {
        Self {
            out: String::new(),
            indent_level: Rc::new(Cell::new(0)),
            indent_string: " ".repeat(spaces),
            at_line_start: true,
        }
    }

    /// Writes text without a newline, indenting first when at the start of a line.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            for _ in 0..self.indent_level.get() {
                self.out.push_str(&self.indent_string);
            }
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    /// Writes a full line.
    pub fn line(&mut self, text: &str) {
        self.write(text);
        self.out.push('\n');
        self.at_line_start = true;
    }

    /// Writes an empty line.
    pub fn blank_line(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    /// Increases indentation until the guard is dropped.
    pub fn indent(&self) -> IndentGuard {
        self.indent_level.set(self.indent_level.get() + 1);
        IndentGuard {
            indent_level: Rc::clone(&self.indent_level),
        }
    }

    /// Writes `header {`, the indented body, then `}`.
    pub fn block<F>(&mut self, header: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.line(&format!("{} {{", header));
        {
            let _indent = self.indent();
            body(self);
        }
        self.line("}");
    }

    /// Continues a block just closed by [`block`](Self::block): `} header {`.
    /// Falls back to a plain block when the output does not end with a closing brace.
    pub fn chain<F>(&mut self, header: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        if self.at_line_start && self.out.ends_with("}\n") {
            self.out.pop();
            self.out.push(' ');
            self.at_line_start = false;
        }
        self.block(header, body);
    }

    /// Writes `items` separated by `separator`.
    pub fn separated<I, T, F>(&mut self, items: I, separator: &str, mut each: F)
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Self, T),
    {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            each(self, item);
        }
    }

    /// Writes one line per item, every line but the last followed by `,`.
    pub fn comma_lines<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = String>,
    {
        let items: Vec<String> = items.into_iter().collect();
        let last = items.len().saturating_sub(1);
        for (i, item) in items.iter().enumerate() {
            if i == last {
                self.line(item);
            } else {
                self.line(&format!("{},", item));
            }
        }
    }

    /// Current indentation depth.
    pub fn indent_level(&self) -> usize {
        self.indent_level.get()
    }

    /// Returns the accumulated text.
    pub fn finish(self) -> String {
        self.out
    }
}

/// Restores the previous indentation when dropped.
#[derive(Debug)]
pub struct IndentGuard {
    indent_level: Rc<Cell<usize>>,
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        self.indent_level
            .set(self.indent_level.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks() {
        let mut w = CodeWriter::with_indent_spaces(2);
        w.block("a", |w| {
            w.block("b", |w| w.line("c;"));
            w.blank_line();
            w.line("d;");
        });
        assert_eq!(w.finish(), "a {\n  b {\n    c;\n  }\n\n  d;\n}\n");
    }

    #[test]
    fn test_guard_restores_level() {
        let w = CodeWriter::with_indent_spaces(4);
        {
            let _outer = w.indent();
            let _inner = w.indent();
            assert_eq!(w.indent_level(), 2);
        }
        assert_eq!(w.indent_level(), 0);
    }

    #[test]
    fn test_chain_joins_closing_brace() {
        let mut w = CodeWriter::with_indent_spaces(2);
        w.block("try", |w| w.line("a();"));
        w.chain("catch (e)", |w| w.line("b();"));
        assert_eq!(w.finish(), "try {\n  a();\n} catch (e) {\n  b();\n}\n");
    }

    #[test]
    fn test_separated_and_comma_lines() {
        let mut w = CodeWriter::with_indent_spaces(2);
        w.write("f(");
        w.separated(["a", "b"], ", ", |w, s| w.write(s));
        w.line(")");
        w.comma_lines(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(w.finish(), "f(a, b)\nx,\ny\n");
    }
}
