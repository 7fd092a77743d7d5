//! esfront_parser: Recursive descent parser for ECMAScript.
//!
//! Turns the token stream of [`esfront_lexer`] into the arena-allocated AST
//! of [`esfront_ast`]. Besides plain scripts it parses modules, bare
//! parameter lists and bare function bodies, and can reparse a program
//! lazily, skipping the bodies of functions it already knows about.

mod classes;
mod context;
mod expressions;
mod functions;
mod lazy;
mod literals;
mod modules;
mod namespace;
mod options;
mod parser;
mod statements;

pub use lazy::{FunctionDataMap, RecordedFunction, ReparsedFunction};
pub use modules::DEFAULT_EXPORT_BINDING_NAME;
pub use options::{parse_options_json, ParserOptions, ParserOptionsFile};
pub use parser::{parse_script, ParseOutcome, Parser, ANON_FUNCTION_PREFIX, ARROW_FUNCTION_PREFIX, PROGRAM_NAME};
