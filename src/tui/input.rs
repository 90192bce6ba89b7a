use super::message::Key;

const CURSOR: char = '█';

/// Single-line text editor. The cursor is a char index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Applies an editing key. Returns whether the key was used.
    pub fn handle(&mut self, key: Key) -> bool {
        match key {
            Key::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            Key::Backspace => {
                if self.cursor == 0 {
                    return true;
                }
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
            }
            Key::Left => self.cursor = self.cursor.saturating_sub(1),
            Key::Right => self.cursor = (self.cursor + 1).min(self.value.chars().count()),
            Key::Ctrl('a') => self.cursor = 0,
            Key::Ctrl('e') => self.cursor = self.value.chars().count(),
            Key::Ctrl('k') => {
                let at = self.byte_index(self.cursor);
                self.value.truncate(at);
            }
            _ => return false,
        }
        true
    }

    /// The value with a block cursor drawn in when `cursor` is set
    pub fn render(&self, cursor: bool) -> String {
        if !cursor {
            return self.value.clone();
        }
        let at = self.byte_index(self.cursor);
        let mut out = String::with_capacity(self.value.len() + CURSOR.len_utf8());
        out.push_str(&self.value[..at]);
        out.push(CURSOR);
        out.push_str(&self.value[at..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> TextInput {
        let mut input = TextInput::new();
        for c in s.chars() {
            input.handle(Key::Char(c));
        }
        input
    }

    #[test]
    fn test_editing_in_the_middle() {
        let mut input = typed("héllo");
        input.handle(Key::Left);
        input.handle(Key::Left);
        input.handle(Key::Backspace);
        input.handle(Key::Char('L'));
        assert_eq!(input.value(), "héLlo");
        assert_eq!(input.render(true), "héL█lo");
    }

    #[test]
    fn test_backspace_at_start_is_harmless() {
        let mut input = typed("a");
        input.handle(Key::Ctrl('a'));
        assert!(input.handle(Key::Backspace));
        assert_eq!(input.value(), "a");
    }

    #[test]
    fn test_unrelated_keys_are_not_consumed() {
        let mut input = TextInput::with_value("x");
        assert!(!input.handle(Key::Enter));
        assert!(!input.handle(Key::Tab));
        assert_eq!(input.render(false), "x");
    }
}
