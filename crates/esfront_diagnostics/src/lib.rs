//! esfront_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! This module defines every message the lexer and parser can raise, the
//! positioned [`ParseError`] that carries one of them through `Result`, and
//! the [`DiagnosticCollection`] sink that accumulates recovered errors.

pub mod error;

pub use error::{ParseError, ParseErrorKind, ParseResult};

use esfront_core::text::{LineAndColumn, TextSpan};
use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 1001, 1201).
    pub code: u32,
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The source name where this diagnostic occurred, if any.
    pub file: Option<String>,
    /// The offending source span, if any.
    pub span: Option<TextSpan>,
    /// 1-based line and 0-based column of the span start.
    pub location: Option<LineAndColumn>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            location: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(location) = self.location {
                write!(f, ":{}:{}", location.line, location.column)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} ES{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during one parse.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Lexer errors (1000-1099)
    // ========================================================================
    pub const MISSING_CLOSE_QUOTE: DiagnosticMessage = diag!(1001, Error, "Missing close quote");
    pub const UNTERMINATED_REGEX: DiagnosticMessage = diag!(1002, Error, "Unterminated regular expression literal");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1003, Error, "Missing */ to close block comment");
    pub const MISSING_SPACE_AFTER_NUMBER: DiagnosticMessage = diag!(1004, Error, "Missing space after numeric literal");
    pub const INVALID_HEX: DiagnosticMessage = diag!(1005, Error, "Invalid hex digit");
    pub const INVALID_UNICODE_ESCAPE: DiagnosticMessage = diag!(1006, Error, "Invalid unicode escape sequence");
    pub const HERE_MISSING_END_MARKER: DiagnosticMessage = diag!(1007, Error, "Here string missing end marker \"{0}\"");
    pub const HERE_NON_MATCHING_DELIMITER: DiagnosticMessage = diag!(1008, Error, "Here string quoted marker is not closed");
    pub const EDIT_STRING_MISSING_BRACE: DiagnosticMessage = diag!(1009, Error, "Edit string expression missing closing brace");
    pub const TOKEN_TOO_LONG: DiagnosticMessage = diag!(1010, Error, "Token is too long");
    pub const INVALID_NUMBER: DiagnosticMessage = diag!(1011, Error, "Invalid numeric literal \"{0}\"");

    // ========================================================================
    // Parser errors (1100-1199)
    // ========================================================================
    pub const EXPECTED_0_BUT_FOUND_1: DiagnosticMessage = diag!(1100, Error, "Expected {0} but found {1}");
    pub const EXPECTED_STATEMENT: DiagnosticMessage = diag!(1101, Error, "Expected statement but found {0}");
    pub const EXPECTED_OPERAND: DiagnosticMessage = diag!(1102, Error, "Expected an operand but found {0}");
    pub const EXPECTED_LVALUE: DiagnosticMessage = diag!(1103, Error, "Expected an lvalue but found {0}");
    pub const EXPECTED_COMMA: DiagnosticMessage = diag!(1104, Error, "Expected comma but found {0}");
    pub const EXPECTED_PROPERTY_ID: DiagnosticMessage = diag!(1105, Error, "Expected property id but found {0}");
    pub const UNDEFINED_LABEL: DiagnosticMessage = diag!(1106, Error, "Undefined label \"{0}\"");
    pub const DUPLICATE_LABEL: DiagnosticMessage = diag!(1107, Error, "Duplicate label \"{0}\"");
    pub const ILLEGAL_BREAK_STMT: DiagnosticMessage = diag!(1108, Error, "break must be inside a loop, switch or labeled statement");
    pub const ILLEGAL_CONTINUE_STMT: DiagnosticMessage = diag!(1109, Error, "continue must be inside a loop");
    pub const INVALID_RETURN: DiagnosticMessage = diag!(1110, Error, "Invalid return statement");
    pub const DUPLICATE_DEFAULT_IN_SWITCH: DiagnosticMessage = diag!(1111, Error, "More than one default clause in switch statement");
    pub const MISSING_CATCH_OR_FINALLY: DiagnosticMessage = diag!(1112, Error, "Missing catch or finally after try");
    pub const PROPERTY_REDEFINITION: DiagnosticMessage = diag!(1113, Error, "Property \"{0}\" already defined");
    pub const MULTIPLE_PROTO_KEY: DiagnosticMessage = diag!(1114, Error, "Property __proto__ may only be defined once");
    pub const FOR_IN_LOOP_INITIALIZER: DiagnosticMessage = diag!(1115, Error, "for-in loop variable declaration may not have an initializer");
    pub const MANY_VARS_IN_FOR_IN_LOOP: DiagnosticMessage = diag!(1116, Error, "Only one variable allowed in for-{0} loop");
    pub const NOT_LVALUE_FOR_IN_LOOP: DiagnosticMessage = diag!(1117, Error, "Invalid left side value of for-{0} loop");
    pub const FOR_EACH_WITHOUT_IN: DiagnosticMessage = diag!(1118, Error, "for each can only be used with for..in");
    pub const UNTERMINATED_TEMPLATE_EXPRESSION: DiagnosticMessage = diag!(1119, Error, "Expected } after expression in template literal");
    pub const MISSING_CONST_ASSIGNMENT: DiagnosticMessage = diag!(1120, Error, "Missing assignment to constant \"{0}\"");
    pub const INVALID_ARROW_PARAMETER: DiagnosticMessage = diag!(1121, Error, "Invalid arrow function parameter");
    pub const ESCAPED_KEYWORD: DiagnosticMessage = diag!(1122, Error, "Keyword \"{0}\" must not contain escaped characters");
    pub const EXPECTED_STRING_MODULE_SPECIFIER: DiagnosticMessage = diag!(1123, Error, "Expected a module specifier string but found {0}");
    pub const DUPLICATE_EXPORT: DiagnosticMessage = diag!(1124, Error, "Duplicate export \"{0}\"");
    pub const TOO_DEEPLY_NESTED: DiagnosticMessage = diag!(1126, Error, "Source is nested too deeply");
    pub const MULTIPLE_CONSTRUCTORS: DiagnosticMessage = diag!(1127, Error, "A class may only have one constructor");
    pub const GENERATOR_CONSTRUCTOR: DiagnosticMessage = diag!(1128, Error, "Class constructor must not be a generator");
    pub const ACCESSOR_CONSTRUCTOR: DiagnosticMessage = diag!(1129, Error, "Class constructor must not be an accessor");
    pub const STATIC_PROTOTYPE_METHOD: DiagnosticMessage = diag!(1130, Error, "Class may not have a static method named \"prototype\"");
    pub const INVALID_SUPER: DiagnosticMessage = diag!(1131, Error, "\"super\" is not allowed here");
    pub const NEW_TARGET_IN_FUNCTION: DiagnosticMessage = diag!(1132, Error, "new.target expression is only allowed in functions");

    // ========================================================================
    // Strict mode errors (1200-1299)
    // ========================================================================
    pub const STRICT_NAME: DiagnosticMessage = diag!(1200, Error, "\"{0}\" cannot be used as {1} in strict mode");
    pub const STRICT_PARAM_REDEFINITION: DiagnosticMessage = diag!(1201, Error, "Duplicate parameter name \"{0}\"");
    pub const STRICT_NO_WITH: DiagnosticMessage = diag!(1202, Error, "\"with\" statement cannot be used in strict mode");
    pub const STRICT_NO_OCTAL: DiagnosticMessage = diag!(1203, Error, "Octal literals are not allowed in strict mode");
    pub const STRICT_CANT_DELETE_IDENT: DiagnosticMessage = diag!(1204, Error, "Cannot delete identifier \"{0}\" in strict mode");
    pub const STRICT_NO_FUNC_DECL_HERE: DiagnosticMessage = diag!(1205, Error, "In strict mode, functions can only be declared at top level or immediately within another function");

    // ========================================================================
    // Reference errors (1300-1399)
    // ========================================================================
    pub const INVALID_LVALUE: DiagnosticMessage = diag!(1300, Error, "Invalid left hand side for assignment");
}
