//! A bounded cursor over source characters.
//!
//! The scanner knows nothing about the grammar. It offers four characters of
//! lookahead, tracks the current line, and can be saved and restored so the
//! lexer can rescan or scan a sub-range.

use crate::char_codes::{digit_value, is_line_break, EOF_CHAR};

/// Saved scanner position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerState {
    pub position: usize,
    pub limit: usize,
    pub line: u32,
    pub line_position: usize,
}

pub struct Scanner<'s> {
    content: &'s [char],
    position: usize,
    /// Scanning stops here; may be below `content.len()` for nested scans.
    limit: usize,
    /// 1-based line of `position`.
    line: u32,
    /// Offset of the start of the current line.
    line_position: usize,
}

impl<'s> Scanner<'s> {
    pub fn new(content: &'s [char]) -> Self {
        Self {
            content,
            position: 0,
            limit: content.len(),
            line: 1,
            line_position: 0,
        }
    }

    #[inline]
    pub fn content(&self) -> &'s [char] {
        self.content
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn line_position(&self) -> usize {
        self.line_position
    }

    #[inline]
    pub fn char_at(&self, index: usize) -> char {
        if index < self.limit {
            self.content[index]
        } else {
            EOF_CHAR
        }
    }

    #[inline]
    pub fn ch0(&self) -> char {
        self.char_at(self.position)
    }

    #[inline]
    pub fn ch1(&self) -> char {
        self.char_at(self.position + 1)
    }

    #[inline]
    pub fn ch2(&self) -> char {
        self.char_at(self.position + 2)
    }

    #[inline]
    pub fn ch3(&self) -> char {
        self.char_at(self.position + 3)
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        self.position >= self.limit
    }

    /// Advance `n` characters, never past the limit.
    #[inline]
    pub fn skip(&mut self, n: usize) {
        self.position = (self.position + n).min(self.limit);
    }

    /// Move to an absolute position without touching line information.
    #[inline]
    pub fn reset(&mut self, position: usize) {
        self.position = position.min(self.limit);
    }

    /// Skip one line terminator (`\r\n` counts as one) and start a new line.
    pub fn skip_eol(&mut self) {
        if self.ch0() == '\r' {
            self.skip(1);
            if self.ch0() == '\n' {
                self.skip(1);
            }
        } else {
            self.skip(1);
        }
        self.line += 1;
        self.line_position = self.position;
    }

    /// Skip the rest of the current line including its terminator.
    pub fn skip_line(&mut self) {
        while !self.at_eof() && !is_line_break(self.ch0()) {
            self.skip(1);
        }
        if !self.at_eof() {
            self.skip_eol();
        }
    }

    pub fn save(&self) -> ScannerState {
        ScannerState {
            position: self.position,
            limit: self.limit,
            line: self.line,
            line_position: self.line_position,
        }
    }

    pub fn restore(&mut self, state: ScannerState) {
        self.limit = state.limit.min(self.content.len());
        self.position = state.position.min(self.limit);
        self.line = state.line;
        self.line_position = state.line_position;
    }

    /// Restrict scanning to `[start, end)`, keeping line information.
    pub fn set_window(&mut self, start: usize, end: usize) {
        self.limit = end.min(self.content.len());
        self.position = start.min(self.limit);
    }

    /// Read exactly `length` hex digits. `None` leaves the cursor on the first
    /// non-hex character.
    pub fn hex_sequence(&mut self, length: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..length {
            let digit = digit_value(self.ch0(), 16)?;
            value = (value << 4) | digit;
            self.skip(1);
        }
        Some(value)
    }

    /// Read the digits of a `\u` escape: `XXXX`, or `{X...}` when braces are
    /// allowed.
    pub fn unicode_escape(&mut self, allow_braces: bool) -> Option<u32> {
        if allow_braces && self.ch0() == '{' {
            self.skip(1);
            let mut value = 0u32;
            let mut digits = 0;
            while let Some(digit) = digit_value(self.ch0(), 16) {
                value = value.checked_mul(16)?.checked_add(digit)?;
                digits += 1;
                self.skip(1);
            }
            if digits == 0 || self.ch0() != '}' || value > 0x10FFFF {
                return None;
            }
            self.skip(1);
            return Some(value);
        }
        self.hex_sequence(4)
    }

    /// Read a legacy octal escape of up to three digits, capped at `\377`.
    pub fn octal_sequence(&mut self) -> u32 {
        let mut value = 0;
        for i in 0..3 {
            let Some(digit) = digit_value(self.ch0(), 8) else { break };
            value = value * 8 + digit;
            self.skip(1);
            if i == 1 && value >= 32 {
                break;
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_lookahead_and_eof() {
        let text = chars("ab");
        let mut scanner = Scanner::new(&text);
        assert_eq!((scanner.ch0(), scanner.ch1(), scanner.ch2()), ('a', 'b', EOF_CHAR));
        scanner.skip(5);
        assert!(scanner.at_eof());
        assert_eq!(scanner.position(), 2);
    }

    #[test]
    fn test_line_tracking() {
        let text = chars("a\r\nb\nc");
        let mut scanner = Scanner::new(&text);
        scanner.skip_line();
        assert_eq!((scanner.line(), scanner.line_position()), (2, 3));
        scanner.skip_line();
        assert_eq!((scanner.line(), scanner.position()), (3, 5));
    }

    #[test]
    fn test_save_restore_window() {
        let text = chars("0123456789");
        let mut scanner = Scanner::new(&text);
        let saved = scanner.save();
        scanner.set_window(2, 4);
        scanner.skip(10);
        assert_eq!(scanner.position(), 4);
        assert!(scanner.at_eof());
        scanner.restore(saved);
        assert_eq!(scanner.position(), 0);
        assert_eq!(scanner.limit(), 10);
    }

    #[test]
    fn test_escape_sequences() {
        let text = chars("00e9{1F600}zz101");
        let mut scanner = Scanner::new(&text);
        assert_eq!(scanner.hex_sequence(4), Some(0xE9));
        assert_eq!(scanner.unicode_escape(true), Some(0x1F600));
        assert_eq!(scanner.hex_sequence(2), None);
        assert_eq!(scanner.position(), 11);
        scanner.skip(2);
        assert_eq!(scanner.octal_sequence(), 0o101);
    }
}
