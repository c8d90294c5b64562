/// A position in scanned text that the body grammar advances and rewinds.
///
/// Positions are absolute byte offsets into `text` and always fall on a
/// character boundary.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// Current byte offset.
    pos: usize,
    /// The whole text being scanned.
    text: &'a str,
}

impl<'a> Cursor<'a> {
    /// Consume one character if `accept` holds for it.
    pub fn eat(&mut self, accept: impl Fn(char) -> bool) -> bool {
        match self.peek() {
            Some(c) if accept(c) => {
                self.pos = self.pos.saturating_add(c.len_utf8());
                return true;
            }
            _ => return false,
        }
    }

    /// Consume a run of ASCII digits, returning it. Returns `None` and
    /// leaves the cursor in place if there are none.
    pub fn eat_digits(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let count = self.rest().bytes().take_while(u8::is_ascii_digit).count();
        if count == 0 {
            return None;
        }
        self.pos = start.saturating_add(count);
        return self.text.get(start..self.pos);
    }

    /// Consume `prefix` if the remaining text starts with it.
    pub fn eat_str(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos = self.pos.saturating_add(prefix.len());
            return true;
        }
        return false;
    }

    /// Creates a cursor at byte offset `pos` of `text`.
    pub const fn new(text: &'a str, pos: usize) -> Self {
        return Self { pos, text };
    }

    /// The character at the cursor.
    pub fn peek(&self) -> Option<char> {
        return self.rest().chars().next();
    }

    pub const fn pos(&self) -> usize {
        return self.pos;
    }

    /// The character just before the cursor.
    pub fn previous(&self) -> Option<char> {
        return self.text.get(..self.pos)?.chars().next_back();
    }

    /// Everything from the cursor on.
    pub fn rest(&self) -> &'a str {
        return self.text.get(self.pos..).unwrap_or_default();
    }

    /// Move back to an earlier position from [`Cursor::pos`].
    pub const fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Consume any whitespace, line breaks included.
    pub fn skip_whitespace(&mut self) {
        while self.eat(char::is_whitespace) {}
    }

    /// The text between `start` and the cursor.
    pub fn slice_from(&self, start: usize) -> &'a str {
        return self.text.get(start..self.pos).unwrap_or_default();
    }

    pub const fn text(&self) -> &'a str {
        return self.text;
    }
}
