/// Process-wide clipboard shared by all open documents. The last cut or copy wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    text: String,
    /// Payload holds whole rows rather than inline text
    line_mode: bool,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole payload
    pub fn set(&mut self, text: impl Into<String>, line_mode: bool) {
        self.text = text.into();
        self.line_mode = line_mode;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_line_mode(&self) -> bool {
        self.line_mode
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && !self.line_mode
    }

    /// Rows of a line-mode payload
    pub fn rows(&self) -> Vec<String> {
        self.text.split('\n').map(str::to_string).collect()
    }
}
