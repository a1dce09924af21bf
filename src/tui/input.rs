//! Input field handling for the terminal user interface.

/// A text input field with cursor position and active state management.
///
/// The cursor counts characters, not bytes, so editing stays valid for
/// multibyte input; the byte offset is derived at each edit point.
#[derive(Clone, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
    pub active: bool,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte offset of the cursor's character position.
    fn byte_offset(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_offset();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset();
            self.value.remove(at);
        }
    }

    /// Move cursor one position to the left.
    pub fn move_cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// Move cursor one position to the right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    /// The value split at the cursor, for rendering the cursor in place.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.value.split_at(self.byte_offset())
    }

    /// Reset to empty, keeping the active flag.
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// The value with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.trimmed().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(field: &mut InputField, s: &str) {
        for c in s.chars() {
            field.handle_char(c);
        }
    }

    #[test]
    fn test_multibyte_insert_keeps_typing_valid() {
        let mut field = InputField::new();
        field.handle_char('é');
        field.handle_char('x');
        assert_eq!(field.value, "éx");
        assert_eq!(field.cursor, 2);

        type_into(&mut field, " café ☕");
        assert_eq!(field.value, "éx café ☕");
    }

    #[test]
    fn test_backspace_at_mid_string_cursor() {
        let mut field = InputField::new();
        type_into(&mut field, "naïve");
        field.move_cursor_left();
        field.move_cursor_left();
        // Removes the 'ï' sitting before the cursor.
        field.handle_backspace();
        assert_eq!(field.value, "nave");
        assert_eq!(field.cursor, 2);

        // Backspace at the start is a no-op.
        field.cursor = 0;
        field.handle_backspace();
        assert_eq!(field.value, "nave");
    }

    #[test]
    fn test_insert_at_mid_string_cursor() {
        let mut field = InputField::new();
        type_into(&mut field, "将棋");
        field.move_cursor_left();
        field.handle_char('/');
        assert_eq!(field.value, "将/棋");
        assert_eq!(field.cursor, 2);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut field = InputField::new();
        type_into(&mut field, "héllo");
        assert_eq!(field.cursor, 5);
        // Right is clamped to the character count, not the byte length.
        field.move_cursor_right();
        assert_eq!(field.cursor, 5);

        for _ in 0..10 {
            field.move_cursor_left();
        }
        assert_eq!(field.cursor, 0);
    }

    #[test]
    fn test_split_at_cursor() {
        let mut field = InputField::new();
        type_into(&mut field, "über");
        field.move_cursor_left();
        field.move_cursor_left();
        assert_eq!(field.split_at_cursor(), ("üb", "er"));
        field.cursor = 4;
        assert_eq!(field.split_at_cursor(), ("über", ""));
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut field = InputField::new();
        type_into(&mut field, "done");
        field.clear();
        assert!(field.value.is_empty());
        assert_eq!(field.cursor, 0);
        field.handle_char('a');
        assert_eq!(field.value, "a");
    }
}
