//! The positioned error raised by the lexer and the parser.

use crate::{format_message, Diagnostic, DiagnosticCategory, DiagnosticMessage};
use esfront_core::text::{LineAndColumn, TextSpan};
use esfront_core::Source;
use std::fmt;
use thiserror::Error;

/// Which ECMAScript error class the failure maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Grammar and early errors.
    Syntax,
    /// Invalid assignment targets.
    Reference,
    /// Malformed or unterminated literals and comments.
    Lexical,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Syntax | ParseErrorKind::Lexical => write!(f, "SyntaxError"),
            ParseErrorKind::Reference => write!(f, "ReferenceError"),
        }
    }
}

/// A syntax error with the offending token span and its line and column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}:{column} {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub code: u32,
    pub message: String,
    /// Name of the source the error was found in.
    pub file: String,
    /// Span of the offending token.
    pub span: TextSpan,
    /// 1-based line.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
    /// The text of the offending line, for rendering.
    pub source_line: String,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        message: &DiagnosticMessage,
        args: &[&str],
        source: &Source,
        span: TextSpan,
    ) -> Self {
        let LineAndColumn { line, column } = source.line_and_column_of(span.start);
        Self {
            kind,
            code: message.code,
            message: format_message(message.message, args),
            file: source.name().to_string(),
            span,
            line,
            column,
            source_line: source.source_line(span.start),
        }
    }

    /// The recorded form of this error.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            file: Some(self.file.clone()),
            span: Some(self.span),
            location: Some(LineAndColumn::new(self.line, self.column)),
            message_text: self.message.clone(),
            code: self.code,
            category: DiagnosticCategory::Error,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
