//! Parse diagnostics rendered through miette.
//!
//! Offsets in the front end count characters; miette wants byte offsets
//! into the UTF-8 text, so spans are converted on the way out.

// Fields are read by the miette derive
#![allow(unused_assignments)]

use esfront_core::TextSpan;
use esfront_diagnostics::{Diagnostic as FrontDiagnostic, ParseError};
use miette::{Diagnostic, SourceSpan};

/// One reported problem with its source snippet.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(esfront::parse))]
pub struct ParseDiagnostic {
    pub code: u32,
    pub message: String,
    #[source_code]
    pub src: miette::NamedSource<String>,
    #[label("{label}")]
    pub span: SourceSpan,
    pub label: String,
}

impl ParseDiagnostic {
    pub fn from_diagnostic(diagnostic: &FrontDiagnostic, path: &str, text: &str) -> Self {
        let span = diagnostic.span.unwrap_or_else(|| TextSpan::new(0, 0));
        Self::new(diagnostic.code, &diagnostic.message_text, span, path, text)
    }

    pub fn from_error(error: &ParseError, path: &str, text: &str) -> Self {
        Self::new(error.code, &error.message, error.span, path, text)
    }

    fn new(code: u32, message: &str, span: TextSpan, path: &str, text: &str) -> Self {
        let start = byte_offset(text, span.start as usize);
        let end = byte_offset(text, (span.start + span.length) as usize);
        Self {
            code,
            message: format!("ES{}: {}", code, message),
            src: miette::NamedSource::new(path, text.to_string()),
            span: (start, end - start).into(),
            label: "here".to_string(),
        }
    }
}

/// Byte offset of the character at `char_offset`, clamped to the end.
fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(offset, _)| offset)
}
