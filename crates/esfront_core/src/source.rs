//! The immutable source buffer handed to the lexer and parser.

use crate::text::{LineAndColumn, LineMap, TextPos};

/// A named piece of ECMAScript source text, decoded to characters once.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    content: Vec<char>,
    line_map: LineMap,
}

impl Source {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        let content: Vec<char> = text.chars().collect();
        let line_map = LineMap::new(&content);
        Self {
            name: name.into(),
            content,
            line_map,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[char] {
        &self.content
    }

    /// Number of characters in the source.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn char_at(&self, pos: TextPos) -> Option<char> {
        self.content.get(pos as usize).copied()
    }

    /// Text of `length` characters starting at `start`, clamped to the buffer.
    pub fn substring(&self, start: TextPos, length: TextPos) -> String {
        let start = (start as usize).min(self.content.len());
        let end = (start + length as usize).min(self.content.len());
        self.content[start..end].iter().collect()
    }

    /// 1-based line of an offset.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        self.line_map.line_of(pos) + 1
    }

    /// 0-based column of an offset.
    pub fn column_of(&self, pos: TextPos) -> u32 {
        self.line_map.line_and_column_of(pos).column
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        self.line_map.line_and_column_of(pos)
    }

    /// The full text of the line containing `pos`, without its terminator.
    pub fn source_line(&self, pos: TextPos) -> String {
        let line = self.line_map.line_of(pos);
        let start = self.line_map.line_start(line) as usize;
        let end = self.content[start..]
            .iter()
            .position(|&ch| crate::text::is_line_terminator(ch))
            .map_or(self.content.len(), |offset| start + offset);
        self.content[start..end].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_and_positions() {
        let source = Source::new("test.js", "var a = 1;\nfoo(a);");
        assert_eq!(source.substring(4, 1), "a");
        assert_eq!(source.substring(11, 3), "foo");
        assert_eq!(source.line_of(11), 2);
        assert_eq!(source.column_of(12), 1);
        assert_eq!(source.source_line(13), "foo(a);");
        assert_eq!(source.substring(15, 100), "a);");
    }

    #[test]
    fn test_non_ascii_offsets_are_characters() {
        let source = Source::new("u.js", "'é' + x");
        assert_eq!(source.len(), 7);
        assert_eq!(source.char_at(1), Some('é'));
        assert_eq!(source.substring(6, 1), "x");
    }
}
