//! Packed token descriptors.
//!
//! A token is a single `u64`: the type in the low 8 bits, the length in the
//! next 24 and the start offset in the upper 32. Tokens are `Copy` and are
//! compared by value, which is how the lexer recognises that the parser is
//! asking to rescan the most recent token.

use esfront_ast::TokenType;
use esfront_core::TextSpan;
use std::fmt;

const TYPE_BITS: u64 = 8;
const LENGTH_BITS: u64 = 24;
const LENGTH_MASK: u64 = (1 << LENGTH_BITS) - 1;
const TYPE_MASK: u64 = (1 << TYPE_BITS) - 1;

/// Longest length a token can carry.
pub const MAX_TOKEN_LENGTH: u32 = LENGTH_MASK as u32;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(u64);

impl Token {
    /// Pack a token. The lexer never produces a length above
    /// [`MAX_TOKEN_LENGTH`].
    pub fn new(token_type: TokenType, position: u32, length: u32) -> Self {
        debug_assert!(length <= MAX_TOKEN_LENGTH, "token length {} does not fit", length);
        let length = u64::from(length) & LENGTH_MASK;
        Token((u64::from(position) << (TYPE_BITS + LENGTH_BITS)) | (length << TYPE_BITS) | token_type as u64)
    }

    #[inline]
    pub fn token_type(self) -> TokenType {
        TokenType::from_u8((self.0 & TYPE_MASK) as u8).unwrap_or(TokenType::Error)
    }

    #[inline]
    pub fn position(self) -> u32 {
        (self.0 >> (TYPE_BITS + LENGTH_BITS)) as u32
    }

    /// Length in characters. For `Eol` tokens this holds the line number of
    /// the line that starts at `position`.
    #[inline]
    pub fn length(self) -> u32 {
        ((self.0 >> TYPE_BITS) & LENGTH_MASK) as u32
    }

    #[inline]
    pub fn end(self) -> u32 {
        self.position() + self.length()
    }

    #[inline]
    pub fn span(self) -> TextSpan {
        TextSpan::new(self.position(), self.length())
    }

    /// Replace the type and keep the position and length.
    #[inline]
    pub fn recast(self, token_type: TokenType) -> Self {
        Token((self.0 & !TYPE_MASK) | token_type as u64)
    }

    /// Widen string and template tokens to include their delimiters.
    pub fn with_delimiter(self) -> Self {
        let position = self.position();
        let length = self.length();
        match self.token_type() {
            TokenType::String | TokenType::EscString | TokenType::ExecString | TokenType::Template => {
                Token::new(self.token_type(), position.saturating_sub(1), length + 2)
            }
            TokenType::TemplateHead | TokenType::TemplateMiddle => {
                Token::new(self.token_type(), position.saturating_sub(1), length + 3)
            }
            TokenType::TemplateTail => Token::new(self.token_type(), position.saturating_sub(1), length + 2),
            _ => self,
        }
    }
}

impl Default for Token {
    /// An empty `Error` token at offset 0.
    fn default() -> Self {
        Token::new(TokenType::Error, 0, 0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}+{}", self.token_type(), self.position(), self.length())
    }
}
