//! Single-line text input used by the unlock prompt, the list filter and the
//! entry editor.

use unicode_width::UnicodeWidthStr;
use zeroize::Zeroize;

use crate::keybinds::Action;

/// Character shown in place of each hidden character.
pub const MASK_CHAR: char = '\u{2022}';

/// A single-line editable buffer with a byte-offset cursor.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    /// Byte offset into `value`, always on a char boundary.
    cursor: usize,
    /// Hide the content behind [`MASK_CHAR`] when rendering.
    pub masked: bool,
    /// Shown dimmed while the buffer is empty.
    pub placeholder: String,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replace the content and move the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value.zeroize();
        self.value = value.into();
        self.cursor = self.value.len();
    }

    /// Wipe the buffer. The old content is zeroized before release.
    pub fn clear(&mut self) {
        self.value.zeroize();
        self.cursor = 0;
    }

    /// Move the content out, leaving the input empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.value.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            let next = self.next_boundary();
            self.value.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.next_boundary();
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Apply an editing action. Returns whether the action was consumed.
    pub fn apply(&mut self, action: &Action) -> bool {
        match action {
            Action::InsertChar(c) => self.insert_char(*c),
            Action::Backspace => self.backspace(),
            Action::Delete => self.delete(),
            Action::CursorLeft => self.move_left(),
            Action::CursorRight => self.move_right(),
            Action::CursorHome => self.move_home(),
            Action::CursorEnd => self.move_end(),
            _ => return false,
        }
        true
    }

    /// The text to draw: the value itself, or one mask char per character.
    pub fn display(&self) -> String {
        if self.masked {
            MASK_CHAR.to_string().repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Terminal column of the cursor relative to the start of the input.
    pub fn cursor_column(&self) -> u16 {
        let before = &self.value[..self.cursor];
        let width = if self.masked {
            before.chars().count()
        } else {
            before.width()
        };
        width as u16
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.value.len())
    }
}

impl Drop for TextInput {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TextInput {
        let mut input = TextInput::new();
        for c in text.chars() {
            input.insert_char(c);
        }
        input
    }

    #[test]
    fn test_insert_and_backspace() {
        let mut input = typed("hunter2");
        assert_eq!(input.value(), "hunter2");
        input.backspace();
        assert_eq!(input.value(), "hunter");
        assert_eq!(input.cursor_column(), 6);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("héllo");
        input.move_left();
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.value(), "hllo");
        input.delete();
        assert_eq!(input.value(), "hlo");
    }

    #[test]
    fn test_cursor_motion_bounds() {
        let mut input = typed("ab");
        input.move_right();
        assert_eq!(input.cursor_column(), 2);
        input.move_home();
        input.move_left();
        assert_eq!(input.cursor_column(), 0);
        input.insert_char('x');
        assert_eq!(input.value(), "xab");
    }

    #[test]
    fn test_masked_display() {
        let mut input = TextInput::new().masked();
        input.set_value("pässword");
        assert_eq!(input.display(), "\u{2022}".repeat(8));
        assert_eq!(input.cursor_column(), 8);
    }

    #[test]
    fn test_apply_ignores_non_editing_actions() {
        let mut input = TextInput::new();
        assert!(input.apply(&Action::InsertChar('z')));
        assert!(!input.apply(&Action::Submit));
        assert!(!input.apply(&Action::MoveDown));
        assert_eq!(input.value(), "z");
    }

    #[test]
    fn test_clear_and_take() {
        let mut input = typed("secret");
        let taken = input.take();
        assert_eq!(taken, "secret");
        assert!(input.is_empty());
        input.set_value("again");
        input.clear();
        assert!(input.is_empty());
        assert_eq!(input.cursor_column(), 0);
    }
}
