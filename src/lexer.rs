//! Single cursor over script source exposing a token view and a line view.
//!
//! Tokens are stamped with their physical line when they are cut, so the token
//! stream and the line stream can be advanced in any interleaving without a
//! second reader to reconcile line numbers.

use crate::types::Token;

/// Whitespace-splitting cursor with one-based line tracking.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    /// Physical line the cursor is on.
    line: u32,
    /// Byte offset of the cursor. Always on a char boundary.
    pos: usize,
    /// The full source text.
    source: &'src str,
}

impl<'src> Lexer<'src> {
    /// Create a cursor at the start of `source`, on line 1.
    pub const fn new(source: &'src str) -> Self {
        return Self { line: 1, pos: 0, source };
    }

    /// Whether another token remains.
    pub fn has_next(&self) -> bool {
        return self.rest().chars().any(|c| return !c.is_whitespace());
    }

    /// The physical line the cursor currently sits on.
    pub const fn line(&self) -> u32 {
        return self.line;
    }

    /// Return the remainder of the current physical line and move to the next one.
    ///
    /// The line break is consumed but not returned; a trailing `\r` is dropped.
    /// Returns `None` only when the cursor is already at end of input.
    pub fn next_line(&mut self) -> Option<&'src str> {
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }

        let (text, consumed) = match rest.find('\n') {
            Some(idx) => {
                self.line = self.line.saturating_add(1);
                (rest.get(..idx).unwrap_or(""), idx.saturating_add(1))
            },
            None => (rest, rest.len()),
        };
        self.pos = self.pos.saturating_add(consumed);

        return Some(text.strip_suffix('\r').unwrap_or(text));
    }

    /// Cut the next maximal run of non-whitespace characters.
    pub fn next_token(&mut self) -> Option<Token<'src>> {
        let rest = self.rest();
        let mut start = None;
        for (offset, ch) in rest.char_indices() {
            if !ch.is_whitespace() {
                start = Some(offset);
                break;
            }
            if ch == '\n' {
                self.line = self.line.saturating_add(1);
            }
        }

        let Some(start) = start else {
            self.pos = self.source.len();
            return None;
        };

        let word = rest.get(start..).unwrap_or("");
        let len = word.find(char::is_whitespace).unwrap_or(word.len());
        let text = word.get(..len).unwrap_or("");
        self.pos = self.pos.saturating_add(start).saturating_add(len);

        return Some(Token { line: self.line, text });
    }

    /// Unconsumed source from the cursor onward.
    fn rest(&self) -> &'src str {
        return self.source.get(self.pos..).unwrap_or("");
    }
}
