//! esfront_lexer: Context-sensitive tokenizer for ECMAScript source.
//!
//! The lexer fills a [`TokenStream`] with packed [`Token`] descriptors and
//! stops after any token that might start a regular expression or a
//! here-document, so the parser can ask for a rescan once it knows which
//! one the grammar expects. It supports:
//! - string literal values decoded lazily, with strict-mode octal checks
//! - template literals, scanned with nested lexing for substitutions
//! - scripting-mode here-documents, edit strings and exec strings
//! - restarting at a recorded position for lazy function body skipping

mod char_codes;
mod lexer;
mod scanner;
mod token;
mod token_stream;

pub use char_codes::{is_identifier_part, is_identifier_start};
pub use lexer::{tokenize, Lexer, LexerOptions, LexicalError, TokenValue};
pub use scanner::{Scanner, ScannerState};
pub use token::{Token, MAX_TOKEN_LENGTH};
pub use token_stream::TokenStream;
