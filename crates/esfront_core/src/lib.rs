//! esfront_core: Core utilities for the esfront ECMAScript front end.
//!
//! Provides the source buffer, text spans, line maps and the hash
//! collections shared by the lexer and parser.

pub mod collections;
pub mod source;
pub mod text;

// Re-export commonly used types
pub use source::Source;
pub use text::{LineAndColumn, LineMap, TextPos, TextRange, TextSpan};
