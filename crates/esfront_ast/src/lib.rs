//! esfront_ast: Abstract syntax tree definitions for the esfront front end.
//!
//! This module defines the token type table, the arena-allocated AST node
//! types, the flag sets attached to them and a visitor over the tree.

pub mod node;
pub mod token_type;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use token_type::{TokenKind, TokenType};
pub use types::*;
