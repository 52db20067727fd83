//! Line-oriented source builder

/// Build generated source line by line with block indentation
#[derive(Debug, Default)]
pub struct SourceBuilder {
    lines: Vec<String>,
    indent: usize,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn indent_str(&self) -> String {
        "    ".repeat(self.indent)
    }

    /// Append one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", self.indent_str(), text));
        }
    }

    /// Append `header {`, and indent what follows
    pub fn open(&mut self, header: impl AsRef<str>) {
        self.line(format!("{} {{", header.as_ref()));
        self.indent += 1;
    }

    /// Close the innermost block
    pub fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
