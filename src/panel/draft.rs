/// The text being composed, bounded to `max_len` characters.
///
/// Input past the bound is dropped, the way a length-limited text field
/// ignores extra keystrokes.
#[derive(Debug, Clone)]
pub struct Draft {
    text: String,
    max_len: usize,
}

impl Draft {
    pub fn new(max_len: usize) -> Self {
        Self {
            text: String::new(),
            max_len,
        }
    }

    /// Replaces the text, keeping at most `max_len` characters.
    pub fn set(&mut self, text: &str) {
        self.text = text.chars().take(self.max_len).collect();
    }

    /// Appends `c` unless the draft is full. Returns whether it was kept.
    pub fn push(&mut self, c: char) -> bool {
        if self.is_full() {
            return false;
        }
        self.text.push(c);
        true
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.max_len
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}
