//! Lexer integration tests.
//!
//! Verifies tokenization of ECMAScript source, including line-break tokens,
//! literal rescanning and the scripting-mode string forms.

use esfront_ast::{Number, TokenType};
use esfront_core::Source;
use esfront_lexer::{tokenize, Lexer, LexerOptions, Token, TokenStream, TokenValue, MAX_TOKEN_LENGTH};

fn es6() -> LexerOptions {
    LexerOptions { es6: true, ..LexerOptions::default() }
}

fn scripting() -> LexerOptions {
    LexerOptions { scripting: true, ..LexerOptions::default() }
}

/// Helper: every token including `Eol` and `Eof`.
fn scan_raw(text: &str, options: LexerOptions) -> Vec<Token> {
    let source = Source::new("test.js", text);
    tokenize(&source, options).unwrap()
}

/// Helper: scan significant tokens as (type, source text) pairs.
fn scan_with(text: &str, options: LexerOptions) -> Vec<(TokenType, String)> {
    let source = Source::new("test.js", text);
    let tokens = tokenize(&source, options).unwrap();
    tokens
        .into_iter()
        .filter(|t| !matches!(t.token_type(), TokenType::Eol | TokenType::Eof))
        .map(|t| (t.token_type(), source.substring(t.position(), t.length())))
        .collect()
}

fn scan_all(text: &str) -> Vec<(TokenType, String)> {
    scan_with(text, LexerOptions::default())
}

/// Helper: scan significant token types.
fn scan_types(text: &str, options: LexerOptions) -> Vec<TokenType> {
    scan_with(text, options).into_iter().map(|(t, _)| t).collect()
}

/// Helper: the value of the first significant token.
fn first_value(text: &str, options: LexerOptions, strict: bool) -> TokenValue {
    let source = Source::new("test.js", text);
    let tokens = tokenize(&source, options).unwrap();
    let token = tokens
        .into_iter()
        .find(|t| !matches!(t.token_type(), TokenType::Eol | TokenType::Eof))
        .unwrap();
    Lexer::new(&source, options).value_of(token, strict).unwrap()
}

fn scan_error(text: &str, options: LexerOptions) -> (u32, u32) {
    let source = Source::new("test.js", text);
    let error = tokenize(&source, options).unwrap_err();
    (error.code, error.span.start)
}

// ============================================================================
// Basics
// ============================================================================

#[test]
fn test_empty_source() {
    let tokens = scan_raw("", LexerOptions::default());
    let types: Vec<_> = tokens.iter().map(|t| t.token_type()).collect();
    assert_eq!(types, vec![TokenType::Eol, TokenType::Eof]);
    assert_eq!(tokens[0].length(), 1);
}

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(
        scan_types("var x = function yield", LexerOptions::default()),
        vec![TokenType::Var, TokenType::Ident, TokenType::Assign, TokenType::Function, TokenType::Yield]
    );
}

#[test]
fn test_longest_operator_match() {
    assert_eq!(
        scan_types("a >>>= b !== c ... d", es6()),
        vec![
            TokenType::Ident,
            TokenType::AssignShr,
            TokenType::Ident,
            TokenType::NeStrict,
            TokenType::Ident,
            TokenType::Ellipsis,
            TokenType::Ident,
        ]
    );
}

#[test]
fn test_unknown_character_is_error_token() {
    assert_eq!(
        scan_types("a @ b", LexerOptions::default()),
        vec![TokenType::Ident, TokenType::Error, TokenType::Ident]
    );
}

#[test]
fn test_escaped_identifier_value() {
    let tokens = scan_all("\\u0061bc");
    assert_eq!(tokens[0].0, TokenType::Ident);
    assert_eq!(first_value("\\u0061bc", LexerOptions::default(), false), TokenValue::String("abc".into()));
}

#[test]
fn test_invalid_identifier_escape() {
    assert_eq!(scan_error("\\u00zz", LexerOptions::default()), (1006, 0));
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numeric_literal_kinds() {
    assert_eq!(
        scan_types("0x1F 017 1.5e3 .5 08 42", LexerOptions::default()),
        vec![
            TokenType::Hexadecimal,
            TokenType::OctalLegacy,
            TokenType::Floating,
            TokenType::Floating,
            TokenType::Decimal,
            TokenType::Decimal,
        ]
    );
}

#[test]
fn test_es6_numeric_literals() {
    assert_eq!(scan_types("0o17 0b101", es6()), vec![TokenType::Octal, TokenType::BinaryNumber]);
    assert_eq!(first_value("0b101", es6(), false), TokenValue::Number(Number::Integer(5)));
    assert_eq!(first_value("0o17", es6(), false), TokenValue::Number(Number::Integer(15)));
}

#[test]
fn test_missing_space_after_number() {
    assert_eq!(scan_error("3in x", LexerOptions::default()), (1004, 1));
    // Without ES6, `0o17` is a zero followed by an identifier.
    assert_eq!(scan_error("0o17", LexerOptions::default()), (1004, 1));
}

#[test]
fn test_number_values() {
    assert_eq!(first_value("017", LexerOptions::default(), false), TokenValue::Number(Number::Integer(15)));
    assert_eq!(first_value("2.5", LexerOptions::default(), false), TokenValue::Number(Number::Double(2.5)));
    assert_eq!(first_value("1e2", LexerOptions::default(), false), TokenValue::Number(Number::Integer(100)));
    assert_eq!(
        first_value("0xFFFFFFFF", LexerOptions::default(), false),
        TokenValue::Number(Number::Double(4_294_967_295.0))
    );
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_tokens_exclude_quotes() {
    assert_eq!(
        scan_all(r#"'a' "b\n""#),
        vec![(TokenType::String, "a".to_string()), (TokenType::EscString, "b\\n".to_string())]
    );
}

#[test]
fn test_string_escape_values() {
    assert_eq!(
        first_value(r#""\x41B\u{43}\t""#, es6(), false),
        TokenValue::String("ABC\t".into())
    );
    assert_eq!(first_value("'a\\\nb'", LexerOptions::default(), false), TokenValue::String("ab".into()));
}

#[test]
fn test_strict_octal_escape_rejected() {
    let source = Source::new("test.js", r#""\12""#);
    let tokens = tokenize(&source, LexerOptions::default()).unwrap();
    let lexer = Lexer::new(&source, LexerOptions::default());
    assert_eq!(lexer.value_of(tokens[1], false).unwrap(), TokenValue::String("\n".into()));
    let error = lexer.value_of(tokens[1], true).unwrap_err();
    assert_eq!(error.code, 1203);
}

#[test]
fn test_invalid_hex_escape() {
    let source = Source::new("test.js", r#""\xZ1""#);
    let tokens = tokenize(&source, LexerOptions::default()).unwrap();
    let lexer = Lexer::new(&source, LexerOptions::default());
    assert_eq!(lexer.value_of(tokens[1], false).unwrap_err().code, 1005);
}

#[test]
fn test_missing_close_quote_at_opening_quote() {
    assert_eq!(scan_error("x = \"abc\ny", LexerOptions::default()), (1001, 4));
    assert_eq!(scan_error("'abc", LexerOptions::default()), (1001, 0));
}

// ============================================================================
// Line breaks and comments
// ============================================================================

#[test]
fn test_eol_runs_coalesce() {
    let tokens = scan_raw("a\n\n\nb", LexerOptions::default());
    let types: Vec<_> = tokens.iter().map(|t| t.token_type()).collect();
    assert_eq!(
        types,
        vec![TokenType::Eol, TokenType::Ident, TokenType::Eol, TokenType::Ident, TokenType::Eof]
    );
    assert_eq!(tokens[2].position(), 4);
    assert_eq!(tokens[2].length(), 4);
}

#[test]
fn test_crlf_and_line_separator() {
    let tokens = scan_raw("a\r\nb\u{2028}c", LexerOptions::default());
    let eols: Vec<_> = tokens
        .iter()
        .filter(|t| t.token_type() == TokenType::Eol)
        .map(|t| (t.position(), t.length()))
        .collect();
    assert_eq!(eols, vec![(0, 1), (3, 2), (5, 3)]);
}

#[test]
fn test_block_comment_with_newline_is_line_break() {
    let with_break = scan_raw("a /* x\n */ b", LexerOptions::default());
    assert_eq!(with_break[2].token_type(), TokenType::Eol);
    let without_break = scan_raw("a /* x */ b", LexerOptions::default());
    assert_eq!(without_break[2].token_type(), TokenType::Ident);
}

#[test]
fn test_line_comments_skipped() {
    assert_eq!(scan_types("a // comment\nb", LexerOptions::default()), vec![TokenType::Ident, TokenType::Ident]);
}

#[test]
fn test_directive_comment_token() {
    assert_eq!(
        scan_with("//# sourceURL=foo.js\nx", LexerOptions::default()),
        vec![
            (TokenType::DirectiveComment, "//# sourceURL=foo.js".to_string()),
            (TokenType::Ident, "x".to_string()),
        ]
    );
}

#[test]
fn test_directive_comment_needs_no_space_after_the_marker() {
    assert_eq!(
        scan_with("//#sourceURL=bar.js
//@sourceMappingURL=bar.map
// # plain
x", LexerOptions::default()),
        vec![
            (TokenType::DirectiveComment, "//#sourceURL=bar.js".to_string()),
            (TokenType::DirectiveComment, "//@sourceMappingURL=bar.map".to_string()),
            (TokenType::Ident, "x".to_string()),
        ]
    );
}

#[test]
fn test_string_longer_than_a_token_can_hold() {
    let text = format!("'{}'", "a".repeat(MAX_TOKEN_LENGTH as usize));
    assert_eq!(scan_error(&text, LexerOptions::default()), (1010, 1));
}

#[test]
fn test_unterminated_comment_at_start() {
    assert_eq!(scan_error("a /* b", LexerOptions::default()), (1003, 2));
}

// ============================================================================
// Division and regular expressions
// ============================================================================

#[test]
fn test_regex_in_operand_position() {
    assert_eq!(
        scan_all("x = /ab+c/gi.test(y)"),
        vec![
            (TokenType::Ident, "x".to_string()),
            (TokenType::Assign, "=".to_string()),
            (TokenType::Regex, "/ab+c/gi".to_string()),
            (TokenType::Period, ".".to_string()),
            (TokenType::Ident, "test".to_string()),
            (TokenType::LParen, "(".to_string()),
            (TokenType::Ident, "y".to_string()),
            (TokenType::RParen, ")".to_string()),
        ]
    );
}

#[test]
fn test_division_after_operand() {
    assert_eq!(
        scan_types("a / b /= c", LexerOptions::default()),
        vec![TokenType::Ident, TokenType::Div, TokenType::Ident, TokenType::AssignDiv, TokenType::Ident]
    );
}

#[test]
fn test_unterminated_regex() {
    assert_eq!(scan_error("x = /abc\n", LexerOptions::default()), (1002, 4));
}

#[test]
fn test_regex_value() {
    assert_eq!(
        first_value("/[/]\\//m", LexerOptions::default(), false),
        TokenValue::Regex { pattern: "[/]\\/".into(), flags: "m".into() }
    );
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_template_parts() {
    assert_eq!(
        scan_with("`a${b}c${d}e`", es6()),
        vec![
            (TokenType::TemplateHead, "a".to_string()),
            (TokenType::Ident, "b".to_string()),
            (TokenType::TemplateMiddle, "c".to_string()),
            (TokenType::Ident, "d".to_string()),
            (TokenType::TemplateTail, "e".to_string()),
        ]
    );
}

#[test]
fn test_nested_template() {
    assert_eq!(
        scan_types("`a${`b${c}`}`", es6()),
        vec![
            TokenType::TemplateHead,
            TokenType::TemplateHead,
            TokenType::Ident,
            TokenType::TemplateTail,
            TokenType::TemplateTail,
        ]
    );
}

#[test]
fn test_braces_inside_substitution() {
    assert_eq!(
        scan_types("`${ {a:1}.a }`", es6()),
        vec![
            TokenType::TemplateHead,
            TokenType::LBrace,
            TokenType::Ident,
            TokenType::Colon,
            TokenType::Decimal,
            TokenType::RBrace,
            TokenType::Period,
            TokenType::Ident,
            TokenType::TemplateTail,
        ]
    );
}

#[test]
fn test_unclosed_template_at_backtick() {
    assert_eq!(scan_error("x = `abc${y", es6()), (1001, 4));
    assert_eq!(scan_error("`abc", es6()), (1001, 0));
}

#[test]
fn test_template_raw_and_cooked() {
    let source = Source::new("test.js", "`a\\nb`");
    let tokens = tokenize(&source, es6()).unwrap();
    let lexer = Lexer::new(&source, es6());
    assert_eq!(lexer.value_of_raw_string(tokens[1]), "a\\nb");
    assert_eq!(lexer.value_of(tokens[1], true).unwrap(), TokenValue::String("a\nb".into()));
}

#[test]
fn test_backtick_without_es6_or_scripting() {
    assert_eq!(
        scan_types("`", LexerOptions::default()),
        vec![TokenType::Error]
    );
}

// ============================================================================
// Scripting mode
// ============================================================================

#[test]
fn test_shell_comments_and_shebang() {
    assert_eq!(
        scan_types("#!/usr/bin/env jjs\n# note\nprint(1)", scripting()),
        vec![TokenType::Ident, TokenType::LParen, TokenType::Decimal, TokenType::RParen]
    );
}

#[test]
fn test_exec_string() {
    assert_eq!(
        scan_with("`ls -l`", scripting()),
        vec![
            (TokenType::ExecString, "ls -l".to_string()),
            (TokenType::LBrace, String::new()),
            (TokenType::String, "ls -l".to_string()),
            (TokenType::RBrace, String::new()),
        ]
    );
}

#[test]
fn test_edit_string() {
    assert_eq!(
        scan_types("\"a${x}b\"", scripting()),
        vec![
            TokenType::String,
            TokenType::Add,
            TokenType::LParen,
            TokenType::Ident,
            TokenType::RParen,
            TokenType::Add,
            TokenType::String,
        ]
    );
    // Single-quoted strings are never edited.
    assert_eq!(scan_types("'a${x}b'", scripting()), vec![TokenType::String]);
}

#[test]
fn test_here_document() {
    let text = "var s = <<EOD;\nhello\nworld\nEOD\nprint(s)";
    let tokens = scan_raw(text, scripting());
    let significant: Vec<_> = tokens
        .iter()
        .filter(|t| t.token_type() != TokenType::Eol)
        .map(|t| t.token_type())
        .collect();
    assert_eq!(
        significant,
        vec![
            TokenType::Var,
            TokenType::Ident,
            TokenType::Assign,
            TokenType::String,
            TokenType::Semicolon,
            TokenType::Ident,
            TokenType::LParen,
            TokenType::Ident,
            TokenType::RParen,
            TokenType::Eof,
        ]
    );
    let source = Source::new("test.js", text);
    let body = tokens.iter().find(|t| t.token_type() == TokenType::String).unwrap();
    assert_eq!(source.substring(body.position(), body.length()), "hello\nworld");
    let print_eol = tokens.iter().rev().find(|t| t.token_type() == TokenType::Eol).unwrap();
    assert_eq!(print_eol.length(), 5);
}

#[test]
fn test_here_document_keeps_last_line_break() {
    let text = "x = <<<'END'\nline\nEND\n";
    let source = Source::new("test.js", text);
    let tokens = tokenize(&source, scripting()).unwrap();
    let body = tokens.iter().find(|t| t.token_type() == TokenType::String).unwrap();
    assert_eq!(source.substring(body.position(), body.length()), "line\n");
}

#[test]
fn test_here_document_missing_marker() {
    assert_eq!(scan_error("x = <<EOD\nabc\n", scripting()), (1007, 4));
}

#[test]
fn test_shift_is_not_here_document() {
    assert_eq!(
        scan_types("a << 2", scripting()),
        vec![TokenType::Ident, TokenType::Shl, TokenType::Decimal]
    );
}

// ============================================================================
// Stream control
// ============================================================================

#[test]
fn test_pause_on_function_body() {
    let source = Source::new("test.js", "function f() { return 1; }");
    let options = LexerOptions { pause_on_function_body: true, ..LexerOptions::default() };
    let mut lexer = Lexer::new(&source, options);
    let mut stream = TokenStream::new();
    lexer.lexify(&mut stream);
    let last = stream.last().unwrap();
    assert_eq!(stream.get(last).token_type(), TokenType::LBrace);
    lexer.lexify(&mut stream);
    assert_eq!(stream.get(stream.last().unwrap()).token_type(), TokenType::Eof);
}

#[test]
fn test_token_positions_are_char_offsets() {
    let tokens = scan_raw("é = 'ü'", LexerOptions::default());
    assert_eq!(tokens[1].position(), 0);
    assert_eq!(tokens[2].position(), 2);
    assert_eq!(tokens[3].position(), 5);
    assert_eq!(tokens[3].length(), 1);
}
