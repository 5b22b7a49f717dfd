//! Line-oriented output buffer with indentation and backpatching.

use crate::validate::CompilerError;

/// A reserved line, filled in later with [`EmitBuffer::patch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMark {
    index: usize,
    depth: usize,
}

#[derive(Debug, Clone)]
pub struct EmitBuffer {
    lines: Vec<Option<String>>,
    depth: usize,
    indent_unit: String,
}

impl Default for EmitBuffer {
    fn default() -> Self {
        Self::new(4)
    }
}

impl EmitBuffer {
    pub fn new(indent_width: usize) -> Self {
        Self {
            lines: Vec::new(),
            depth: 0,
            indent_unit: " ".repeat(indent_width),
        }
    }

    pub fn write(&mut self, line: impl AsRef<str>) {
        let text = format!("{}{}", self.indentation(), line.as_ref());
        self.lines.push(Some(text));
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.depth > 0, "dedent below column zero");
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Prefix written in front of lines at the current depth.
    pub fn indentation(&self) -> String {
        self.indentation_at(self.depth)
    }

    pub fn indentation_at(&self, depth: usize) -> String {
        self.indent_unit.repeat(depth)
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    pub fn last_line(&self) -> Option<&str> {
        self.lines.iter().rev().flatten().next().map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Reserve a line at the current depth whose text is decided later.
    pub fn reserve(&mut self) -> LineMark {
        self.lines.push(None);
        LineMark {
            index: self.lines.len() - 1,
            depth: self.depth,
        }
    }

    pub fn patch(&mut self, mark: LineMark, line: impl AsRef<str>) {
        let text = format!("{}{}", self.indentation_at(mark.depth), line.as_ref());
        self.lines[mark.index] = Some(text);
    }

    /// Render every line terminated by a newline. Unpatched reservations are skipped.
    pub fn read(&self) -> String {
        let mut out = String::new();
        for line in self.lines.iter().flatten() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Final read of a compile: indentation must be balanced and every
    /// reserved line patched.
    pub fn finish(self) -> Result<String, CompilerError> {
        if self.depth != 0 {
            return Err(CompilerError::internal(format!(
                "Unbalanced indentation at end of unit (depth {})",
                self.depth
            )));
        }
        if let Some(index) = self.lines.iter().position(|l| l.is_none()) {
            return Err(CompilerError::internal(format!(
                "Reserved line {} was never patched",
                index
            )));
        }
        Ok(self.read())
    }
}
