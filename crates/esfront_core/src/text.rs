//! Text span and range types for source location tracking.
//!
//! Offsets count characters (Unicode scalar values) of a [`crate::Source`],
//! not bytes. Line numbers follow the ECMAScript notion of a line terminator:
//! LF, CR, CR LF, U+2028 and U+2029.

use std::fmt;

/// A position in source text, measured in characters from the start.
pub type TextPos = u32;

/// A span in source text, defined by a start position and a length.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextSpan {
    /// The character offset where this span starts.
    pub start: TextPos,
    /// The length of this span in characters.
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self {
            start: pos,
            length: 0,
        }
    }

    /// The end position of this span (exclusive).
    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

/// A text range with start and end positions, as stored on AST nodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextRange {
    /// Start offset (inclusive).
    pub pos: TextPos,
    /// End offset (exclusive).
    pub end: TextPos,
}

impl TextRange {
    #[inline]
    pub fn new(pos: TextPos, end: TextPos) -> Self {
        Self { pos, end }
    }

    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self { pos, end: pos }
    }

    #[inline]
    pub fn len(&self) -> TextPos {
        self.end.saturating_sub(self.pos)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    #[inline]
    pub fn to_span(&self) -> TextSpan {
        TextSpan::new(self.pos, self.len())
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.pos, self.end)
    }
}

/// Line and column of a position.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    /// 1-based line number.
    pub line: u32,
    /// 0-based column, in characters.
    pub column: u32,
}

impl LineAndColumn {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Whether `ch` terminates a line.
#[inline]
pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// A map from character offsets to line numbers.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Offsets of the start of each line.
    line_starts: Vec<TextPos>,
}

impl LineMap {
    /// Build a line map from source characters. `\r\n` counts as one break.
    pub fn new(text: &[char]) -> Self {
        let mut line_starts = vec![0u32];
        let mut i = 0;
        while i < text.len() {
            let ch = text[i];
            if is_line_terminator(ch) {
                if ch == '\r' && text.get(i + 1) == Some(&'\n') {
                    i += 1;
                }
                line_starts.push((i + 1) as u32);
            }
            i += 1;
        }
        Self { line_starts }
    }

    /// Get the line index (0-based) for an offset.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(line) => (line - 1) as u32,
        }
    }

    /// Get the 1-based line and 0-based column for an offset.
    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        let line_start = self.line_starts[line as usize];
        LineAndColumn {
            line: line + 1,
            column: pos - line_start,
        }
    }

    /// Get the offset of the start of a line (0-based index).
    pub fn line_start(&self, line: u32) -> TextPos {
        self.line_starts[line as usize]
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
