//! The context-sensitive lexer.
//!
//! `lexify` appends tokens to a [`TokenStream`] until the stream is full, the
//! input ends, or a token is added that might begin a regular expression or a
//! here-document. In the last case the parser decides: if it expects an
//! operand it calls [`Lexer::scan_literal`] to rescan from that token,
//! otherwise it keeps the operator and asks for more tokens.
//!
//! Line terminators produce `Eol` tokens whose length field holds the line
//! number. Only the last `Eol` of a run of blank lines and comments is kept,
//! and it is flushed right before the next real token.

use crate::char_codes::{
    digit_value, is_digit, is_identifier_part, is_identifier_start, is_line_break, is_string_delimiter,
    is_white_space_single_line, BACKTICK,
};
use crate::scanner::{Scanner, ScannerState};
use crate::token::{Token, MAX_TOKEN_LENGTH};
use crate::token_stream::TokenStream;
use esfront_ast::{Number, ParserState, TokenType};
use esfront_core::{Source, TextSpan};
use esfront_diagnostics::messages;
use esfront_diagnostics::{DiagnosticMessage, ParseError, ParseErrorKind, ParseResult};
use tracing::trace;

/// Dialect switches that change how characters are grouped into tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexerOptions {
    /// Shell-style extensions: `#` comments, here-documents, edit strings
    /// and exec strings.
    pub scripting: bool,
    /// ES6 lexical grammar: templates, `0o`/`0b` numbers, `\u{...}` escapes.
    pub es6: bool,
    /// Stop after the `{` that follows a `function` keyword.
    pub pause_on_function_body: bool,
}

/// The decoded value of a literal or identifier token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Number(Number),
    String(String),
    Regex { pattern: String, flags: String },
    None,
}

impl TokenValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Longest literal or comment body. The delimiters a token regains in
/// [`Token::with_delimiter`] must still fit.
const MAX_LITERAL_LENGTH: usize = MAX_TOKEN_LENGTH as usize - 3;

/// A lexical error the parser has not reached yet. It sits in the stream as
/// an `Error` token at the place the scan failed.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalError {
    pub error: ParseError,
    /// The failed scan ran to the end of input, so nothing after the error
    /// can be lexed.
    pub at_end: bool,
}

/// How a recursive scan ends.
#[derive(Debug, Clone, Copy)]
struct NestedScan {
    /// Open braces of a template substitution; zero for a bounded sub-range.
    template_braces: u32,
}

impl NestedScan {
    fn bounded() -> Self {
        NestedScan { template_braces: 0 }
    }

    fn template() -> Self {
        NestedScan { template_braces: 1 }
    }
}

pub struct Lexer<'s> {
    source: &'s Source,
    scanner: Scanner<'s>,
    options: LexerOptions,
    /// Line break waiting to be flushed: (start of the new line, line number).
    pending_eol: Option<(usize, u32)>,
    /// Most recent token other than `Eol` and comments.
    last_significant: TokenType,
    pause_on_next_left_brace: bool,
    /// Errors by the `Error` token standing in for them.
    errors: Vec<(Token, LexicalError)>,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s Source, options: LexerOptions) -> Self {
        Self {
            source,
            scanner: Scanner::new(source.content()),
            options,
            pending_eol: Some((0, 1)),
            last_significant: TokenType::Eol,
            pause_on_next_left_brace: false,
            errors: Vec::new(),
        }
    }

    #[inline]
    pub fn source(&self) -> &'s Source {
        self.source
    }

    #[inline]
    pub fn options(&self) -> LexerOptions {
        self.options
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.scanner.line()
    }

    /// Continue lexing at a recorded position as if a `;` had just been read.
    pub fn restart(&mut self, state: ParserState) {
        trace!(position = state.position, line = state.line, "lexer restart");
        self.scanner.restore(ScannerState {
            position: state.position as usize,
            limit: self.source.len(),
            line: state.line,
            line_position: state.line_position as usize,
        });
        self.pending_eol = None;
        self.last_significant = TokenType::Semicolon;
        self.pause_on_next_left_brace = false;
    }

    /// Source text covered by a token.
    pub fn token_text(&self, token: Token) -> String {
        self.source.substring(token.position(), token.length())
    }

    /// Whether `token_type` can be the first character of a literal that
    /// needs the parser's help to recognise.
    pub fn can_start_literal(&self, token_type: TokenType) -> bool {
        match token_type {
            TokenType::Div | TokenType::AssignDiv => true,
            TokenType::Shl => self.options.scripting,
            _ => false,
        }
    }

    // ========================================================================
    // Token production
    // ========================================================================

    fn add(&mut self, stream: &mut TokenStream, token_type: TokenType, start: usize, end: usize) -> ParseResult<()> {
        let length = end.saturating_sub(start);
        if length > MAX_LITERAL_LENGTH {
            return Err(self.error(&messages::TOKEN_TOO_LONG, &[], start, length));
        }
        self.flush_eol(stream);
        stream.put(Token::new(token_type, start as u32, length as u32));
        if !matches!(token_type, TokenType::Comment | TokenType::DirectiveComment) {
            self.last_significant = token_type;
        }
        Ok(())
    }

    fn flush_eol(&mut self, stream: &mut TokenStream) {
        if let Some((position, line)) = self.pending_eol.take() {
            stream.put(Token::new(TokenType::Eol, position as u32, line));
        }
    }

    /// Put an `Error` token where a scan failed and keep `error` for the
    /// parser. Lexing resumes wherever the failed scan stopped.
    fn add_error(&mut self, stream: &mut TokenStream, error: ParseError) {
        trace!(code = error.code, position = error.span.start, "lexical error");
        self.flush_eol(stream);
        let token = Token::new(TokenType::Error, error.span.start, error.span.length.min(MAX_TOKEN_LENGTH));
        stream.put(token);
        self.last_significant = TokenType::Error;
        let at_end = self.scanner.at_eof();
        let resume = error.span.start as usize + 1;
        if self.scanner.position() < resume && !at_end {
            self.scanner.reset(resume);
        }
        self.errors.push((token, LexicalError { error, at_end }));
    }

    /// The lexical error an `Error` token stands for. `Error` tokens for
    /// stray characters have none.
    pub fn error_for(&self, token: Token) -> Option<&LexicalError> {
        self.errors
            .iter()
            .find(|(error_token, _)| *error_token == token)
            .map(|(_, error)| error)
    }

    #[inline]
    fn add_eol(&mut self) {
        self.pending_eol = Some((self.scanner.position(), self.scanner.line()));
    }

    fn error(&self, message: &DiagnosticMessage, args: &[&str], start: usize, length: usize) -> ParseError {
        ParseError::new(
            ParseErrorKind::Lexical,
            message,
            args,
            self.source,
            TextSpan::new(start as u32, length as u32),
        )
    }

    /// Fill the stream until it is full, the input ends, a token that may
    /// start a literal has been added, or a scan failed.
    pub fn lexify(&mut self, stream: &mut TokenStream) {
        if let Err(error) = self.lexify_until(stream, None) {
            self.add_error(stream, error);
        }
    }

    fn lexify_until(&mut self, stream: &mut TokenStream, mut nested: Option<NestedScan>) -> ParseResult<()> {
        while nested.is_some() || !stream.is_full() {
            self.skip_whitespace(true);

            if self.scanner.at_eof() {
                if nested.is_none() {
                    let position = self.scanner.position();
                    self.add(stream, TokenType::Eof, position, position)?;
                }
                break;
            }

            let ch0 = self.scanner.ch0();
            let ch1 = self.scanner.ch1();

            if ch0 == '/' && self.skip_comments(stream)? {
                continue;
            }
            if self.options.scripting && ch0 == '#' && self.skip_comments(stream)? {
                continue;
            }

            if ch0 == '.' && is_digit(ch1) {
                self.scan_number(stream)?;
            } else if let Some(token_type) =
                TokenType::lookup_operator(ch0, ch1, self.scanner.ch2(), self.scanner.ch3())
            {
                if let Some(scan) = nested.as_mut() {
                    if scan.template_braces > 0 {
                        if token_type == TokenType::LBrace {
                            scan.template_braces += 1;
                        } else if token_type == TokenType::RBrace {
                            scan.template_braces -= 1;
                            if scan.template_braces == 0 {
                                break;
                            }
                        }
                    }
                }

                // Nested scans cannot hand control back to the parser.
                if nested.is_some()
                    && self.can_start_literal(token_type)
                    && regex_allowed_after(self.last_significant)
                {
                    let saved = self.scanner.save();
                    if self.scan_literal_at_cursor(stream, saved)? {
                        continue;
                    }
                }

                let start = self.scanner.position();
                let length = token_type.name().map_or(1, |name| name.chars().count());
                self.scanner.skip(length);
                self.add(stream, token_type, start, start + length)?;

                if nested.is_none() {
                    if self.can_start_literal(token_type) {
                        break;
                    }
                    if token_type == TokenType::LBrace && self.pause_on_next_left_brace {
                        self.pause_on_next_left_brace = false;
                        break;
                    }
                }
            } else if is_identifier_start(ch0) || (ch0 == '\\' && ch1 == 'u') {
                self.scan_identifier_or_keyword(stream, nested.is_none())?;
            } else if is_string_delimiter(ch0) {
                self.scan_string(stream)?;
            } else if is_digit(ch0) {
                self.scan_number(stream)?;
            } else if ch0 == BACKTICK && self.options.es6 {
                self.scan_template(stream)?;
            } else if ch0 == BACKTICK && self.options.scripting {
                self.scan_string(stream)?;
            } else {
                let start = self.scanner.position();
                self.scanner.skip(1);
                self.add(stream, TokenType::Error, start, start + 1)?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Whitespace and comments
    // ========================================================================

    fn skip_whitespace(&mut self, add_eol: bool) -> bool {
        let mut skipped = false;
        while !self.scanner.at_eof() {
            let ch = self.scanner.ch0();
            if is_line_break(ch) {
                self.scanner.skip_eol();
                if add_eol {
                    self.add_eol();
                }
            } else if is_white_space_single_line(ch) {
                self.scanner.skip(1);
            } else {
                break;
            }
            skipped = true;
        }
        skipped
    }

    /// Skip a comment at the cursor. `//#` and `//@` comments are kept as
    /// `DirectiveComment` tokens; line breaks inside block comments count as
    /// line breaks.
    fn skip_comments(&mut self, stream: &mut TokenStream) -> ParseResult<bool> {
        let start = self.scanner.position();
        let ch0 = self.scanner.ch0();
        let ch1 = self.scanner.ch1();

        if ch0 == '/' && ch1 == '/' {
            self.scanner.skip(2);
            // `//#` and `//@` open a directive whatever follows the marker.
            let directive = matches!(self.scanner.ch0(), '#' | '@');
            self.skip_to_line_end();
            if directive {
                let end = self.scanner.position();
                self.add(stream, TokenType::DirectiveComment, start, end)?;
            }
            return Ok(true);
        }

        if ch0 == '/' && ch1 == '*' {
            self.scanner.skip(2);
            while !self.scanner.at_eof() && !(self.scanner.ch0() == '*' && self.scanner.ch1() == '/') {
                if is_line_break(self.scanner.ch0()) {
                    self.scanner.skip_eol();
                    self.add_eol();
                } else {
                    self.scanner.skip(1);
                }
            }
            if self.scanner.at_eof() {
                return Err(self.error(&messages::UNTERMINATED_COMMENT, &[], start, 2));
            }
            self.scanner.skip(2);
            return Ok(true);
        }

        if ch0 == '#' && self.options.scripting {
            self.skip_to_line_end();
            return Ok(true);
        }

        Ok(false)
    }

    fn skip_to_line_end(&mut self) {
        while !self.scanner.at_eof() && !is_line_break(self.scanner.ch0()) {
            self.scanner.skip(1);
        }
    }

    // ========================================================================
    // Identifiers and keywords
    // ========================================================================

    /// Scan an identifier, validating `\uXXXX` escapes. Returns its length.
    fn scan_identifier(&mut self) -> ParseResult<usize> {
        let start = self.scanner.position();
        let mut first = true;
        while !self.scanner.at_eof() {
            let ch0 = self.scanner.ch0();
            if ch0 == '\\' && self.scanner.ch1() == 'u' {
                let escape_start = self.scanner.position();
                self.scanner.skip(2);
                let valid = self
                    .scanner
                    .unicode_escape(self.options.es6)
                    .and_then(char::from_u32)
                    .is_some_and(|ch| if first { is_identifier_start(ch) } else { is_identifier_part(ch) });
                if !valid {
                    let length = (self.scanner.position() - escape_start).max(1);
                    return Err(self.error(&messages::INVALID_UNICODE_ESCAPE, &[], escape_start, length));
                }
            } else if (first && is_identifier_start(ch0)) || (!first && is_identifier_part(ch0)) {
                self.scanner.skip(1);
            } else {
                break;
            }
            first = false;
        }
        Ok(self.scanner.position() - start)
    }

    fn scan_identifier_or_keyword(&mut self, stream: &mut TokenStream, top_level: bool) -> ParseResult<()> {
        let start = self.scanner.position();
        let length = self.scan_identifier()?;
        let text: String = self.scanner.content()[start..start + length].iter().collect();
        let token_type = TokenType::from_keyword(&text).unwrap_or(TokenType::Ident);
        if token_type == TokenType::Function && self.options.pause_on_function_body && top_level {
            self.pause_on_next_left_brace = true;
        }
        self.add(stream, token_type, start, start + length)?;
        Ok(())
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn skip_digits(&mut self, radix: u32) {
        while digit_value(self.scanner.ch0(), radix).is_some() {
            self.scanner.skip(1);
        }
    }

    fn scan_number(&mut self, stream: &mut TokenStream) -> ParseResult<()> {
        let start = self.scanner.position();
        let ch0 = self.scanner.ch0();
        let ch1 = self.scanner.ch1();
        let ch2 = self.scanner.ch2();
        let es6 = self.options.es6;

        let token_type = if ch0 == '0' && matches!(ch1, 'x' | 'X') && digit_value(ch2, 16).is_some() {
            self.scanner.skip(3);
            self.skip_digits(16);
            TokenType::Hexadecimal
        } else if es6 && ch0 == '0' && matches!(ch1, 'o' | 'O') && digit_value(ch2, 8).is_some() {
            self.scanner.skip(3);
            self.skip_digits(8);
            TokenType::Octal
        } else if es6 && ch0 == '0' && matches!(ch1, 'b' | 'B') && digit_value(ch2, 2).is_some() {
            self.scanner.skip(3);
            self.skip_digits(2);
            TokenType::BinaryNumber
        } else {
            let mut octal = ch0 == '0';
            if is_digit(ch0) {
                self.scanner.skip(1);
            }
            while let Some(digit) = digit_value(self.scanner.ch0(), 10) {
                octal = octal && digit < 8;
                self.scanner.skip(1);
            }
            if octal && self.scanner.position() - start > 1 {
                TokenType::OctalLegacy
            } else if matches!(self.scanner.ch0(), '.' | 'e' | 'E') {
                if self.scanner.ch0() == '.' {
                    self.scanner.skip(1);
                    self.skip_digits(10);
                }
                if matches!(self.scanner.ch0(), 'e' | 'E') {
                    self.scanner.skip(1);
                    if matches!(self.scanner.ch0(), '+' | '-') {
                        self.scanner.skip(1);
                    }
                    self.skip_digits(10);
                }
                TokenType::Floating
            } else {
                TokenType::Decimal
            }
        };

        if is_identifier_start(self.scanner.ch0()) && !self.scanner.at_eof() {
            let position = self.scanner.position();
            return Err(self.error(&messages::MISSING_SPACE_AFTER_NUMBER, &[], position, 1));
        }

        let end = self.scanner.position();
        self.add(stream, token_type, start, end)?;
        Ok(())
    }

    // ========================================================================
    // Strings, edit strings and exec strings
    // ========================================================================

    fn scan_string(&mut self, stream: &mut TokenStream) -> ParseResult<()> {
        let quote = self.scanner.ch0();
        let quote_start = self.scanner.position();
        let mut token_type = TokenType::String;
        self.scanner.skip(1);
        let content_start = self.scanner.position();

        while !self.scanner.at_eof() && self.scanner.ch0() != quote && !is_line_break(self.scanner.ch0()) {
            if self.scanner.ch0() == '\\' {
                token_type = TokenType::EscString;
                self.scanner.skip(1);
                if is_line_break(self.scanner.ch0()) {
                    self.scanner.skip_eol();
                    continue;
                }
            }
            self.scanner.skip(1);
        }

        if self.scanner.at_eof() || self.scanner.ch0() != quote {
            return Err(self.error(&messages::MISSING_CLOSE_QUOTE, &[], quote_start, 1));
        }
        let content_end = self.scanner.position();
        self.scanner.skip(1);

        if self.options.scripting && content_end > content_start {
            match quote {
                BACKTICK => {
                    self.add(stream, TokenType::ExecString, content_start, content_end)?;
                    self.add(stream, TokenType::LBrace, content_start, content_start)?;
                    self.edit_string(stream, token_type, content_start, content_end)?;
                    self.add(stream, TokenType::RBrace, content_end, content_end)?;
                }
                '"' => self.edit_string(stream, token_type, content_start, content_end)?,
                _ => self.add(stream, token_type, content_start, content_end)?,
            }
        } else {
            self.add(stream, token_type, content_start, content_end)?;
        }
        Ok(())
    }

    /// Split `[start, end)` at `${expr}` substitutions into
    /// `str + (expr) + str` token sequences.
    fn edit_string(&mut self, stream: &mut TokenStream, string_type: TokenType, start: usize, end: usize) -> ParseResult<()> {
        let outer = self.scanner.save();
        self.scanner.set_window(start, end);
        let result = self.edit_string_parts(stream, string_type, start);
        self.scanner.restore(outer);
        result
    }

    fn edit_string_parts(&mut self, stream: &mut TokenStream, string_type: TokenType, start: usize) -> ParseResult<()> {
        let mut string_start = start;
        let mut primary_count = 0;
        loop {
            if self.scanner.at_eof() {
                let position = self.scanner.position();
                self.add(stream, string_type, string_start, position)?;
                break;
            }

            if self.scanner.ch0() == '\\' && string_type == TokenType::EscString {
                self.scanner.skip(2);
                continue;
            }

            if self.scanner.ch0() == '$' && self.scanner.ch1() == '{' {
                let position = self.scanner.position();
                if primary_count == 0 || string_start != position {
                    self.add(stream, string_type, string_start, position)?;
                    primary_count += 1;
                    self.add(stream, TokenType::Add, position, position)?;
                }
                self.scanner.skip(2);
                self.add(stream, TokenType::LParen, position + 1, position + 2)?;

                let expression_start = self.scanner.position();
                let mut depth = 0u32;
                while !self.scanner.at_eof() {
                    match self.scanner.ch0() {
                        '{' => depth += 1,
                        '}' if depth == 0 => break,
                        '}' => depth -= 1,
                        _ => {}
                    }
                    self.scanner.skip(1);
                }
                if self.scanner.at_eof() {
                    return Err(self.error(&messages::EDIT_STRING_MISSING_BRACE, &[], position, 2));
                }
                let expression_end = self.scanner.position();
                self.scanner.skip(1);

                let resume = self.scanner.save();
                self.scanner.set_window(expression_start, expression_end);
                self.lexify_until(stream, Some(NestedScan::bounded()))?;
                self.scanner.restore(resume);

                self.add(stream, TokenType::RParen, expression_end, expression_end + 1)?;
                string_start = self.scanner.position();
                primary_count += 1;
                self.add(stream, TokenType::Add, string_start, string_start)?;
            } else {
                self.scanner.skip(1);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Templates
    // ========================================================================

    /// Scan a template literal. Substitutions are lexed in place until the
    /// brace that closes them.
    fn scan_template(&mut self, stream: &mut TokenStream) -> ParseResult<()> {
        let quote_start = self.scanner.position();
        let mut token_type = TokenType::Template;
        self.scanner.skip(1);
        let mut content_start = self.scanner.position();

        while !self.scanner.at_eof() {
            let ch0 = self.scanner.ch0();
            if ch0 == BACKTICK {
                let content_end = self.scanner.position();
                self.scanner.skip(1);
                let closing = if token_type == TokenType::Template {
                    TokenType::Template
                } else {
                    TokenType::TemplateTail
                };
                self.add(stream, closing, content_start, content_end)?;
                return Ok(());
            } else if ch0 == '$' && self.scanner.ch1() == '{' {
                let content_end = self.scanner.position();
                self.scanner.skip(2);
                let opening = if token_type == TokenType::Template {
                    TokenType::TemplateHead
                } else {
                    token_type
                };
                self.add(stream, opening, content_start, content_end)?;

                self.lexify_until(stream, Some(NestedScan::template()))?;
                if self.scanner.at_eof() || self.scanner.ch0() != '}' {
                    return Err(self.error(&messages::MISSING_CLOSE_QUOTE, &[], quote_start, 1));
                }
                self.scanner.skip(1);
                content_start = self.scanner.position();
                token_type = TokenType::TemplateMiddle;
            } else if ch0 == '\\' {
                self.scanner.skip(1);
                if is_line_break(self.scanner.ch0()) {
                    self.scanner.skip_eol();
                } else {
                    self.scanner.skip(1);
                }
            } else if is_line_break(ch0) {
                self.scanner.skip_eol();
            } else {
                self.scanner.skip(1);
            }
        }

        Err(self.error(&messages::MISSING_CLOSE_QUOTE, &[], quote_start, 1))
    }

    // ========================================================================
    // Rescanning: regular expressions and here-documents
    // ========================================================================

    /// Rescan from `token` as a literal. Only the most recent token in the
    /// stream can be rescanned. On success the literal token follows `token`
    /// in the stream and `true` is returned.
    pub fn scan_literal(&mut self, stream: &mut TokenStream, token: Token, start_type: TokenType) -> ParseResult<bool> {
        if !self.can_start_literal(start_type) {
            return Ok(false);
        }
        if stream.last().map(|k| stream.get(k)) != Some(token) {
            return Ok(false);
        }

        let saved = self.scanner.save();
        self.scanner.reset(token.position() as usize);
        trace!(position = token.position(), ?start_type, "rescan literal");
        self.scan_literal_at_cursor(stream, saved)
    }

    /// Scan a regular expression or here-document starting at the cursor.
    /// `saved` is restored when no literal is found.
    fn scan_literal_at_cursor(&mut self, stream: &mut TokenStream, saved: ScannerState) -> ParseResult<bool> {
        if self.scanner.ch0() == '/' {
            self.scan_regex(stream, saved)
        } else if self.scanner.ch0() == '<' && self.scanner.ch1() == '<' {
            self.scan_here_string(stream, saved)
        } else {
            self.scanner.restore(saved);
            Ok(false)
        }
    }

    fn scan_regex(&mut self, stream: &mut TokenStream, saved: ScannerState) -> ParseResult<bool> {
        let start = self.scanner.position();
        self.scanner.skip(1);
        let mut in_brackets = false;

        while !self.scanner.at_eof()
            && (self.scanner.ch0() != '/' || in_brackets)
            && !is_line_break(self.scanner.ch0())
        {
            match self.scanner.ch0() {
                '\\' => {
                    self.scanner.skip(1);
                    if is_line_break(self.scanner.ch0()) {
                        break;
                    }
                    self.scanner.skip(1);
                }
                '[' => {
                    in_brackets = true;
                    self.scanner.skip(1);
                }
                ']' => {
                    in_brackets = false;
                    self.scanner.skip(1);
                }
                _ => self.scanner.skip(1),
            }
        }

        if self.scanner.at_eof() || self.scanner.ch0() != '/' {
            self.scanner.restore(saved);
            return Err(self.error(&messages::UNTERMINATED_REGEX, &[], start, 1));
        }

        self.scanner.skip(1);
        while !self.scanner.at_eof() && is_identifier_part(self.scanner.ch0()) {
            self.scanner.skip(1);
        }
        let end = self.scanner.position();
        self.add(stream, TokenType::Regex, start, end)?;
        Ok(true)
    }

    /// Scan `<<MARKER` or `<<<MARKER`. The body runs from the next line up
    /// to a line holding only the marker. `<<` drops the final line break; a
    /// quoted marker turns off `${}` editing. The rest of the opening line is
    /// lexed after the body.
    fn scan_here_string(&mut self, stream: &mut TokenStream, saved: ScannerState) -> ParseResult<bool> {
        let start = self.scanner.position();
        let exclude_last_eol = self.scanner.ch2() != '<';
        self.scanner.skip(if exclude_last_eol { 2 } else { 3 });

        let quote = self.scanner.ch0();
        let no_editing = quote == '"' || quote == '\'';
        if no_editing {
            self.scanner.skip(1);
        }

        let marker_start = self.scanner.position();
        let marker_length = match self.scan_identifier() {
            Ok(length) => length,
            Err(_) => {
                self.scanner.restore(saved);
                return Ok(false);
            }
        };

        if no_editing {
            if self.scanner.ch0() != quote {
                let error = self.error(&messages::HERE_NON_MATCHING_DELIMITER, &[], start, self.scanner.position() - start);
                self.scanner.restore(saved);
                return Err(error);
            }
            self.scanner.skip(1);
        }

        if marker_length == 0 {
            self.scanner.restore(saved);
            return Ok(false);
        }

        let marker: Vec<char> = self.scanner.content()[marker_start..marker_start + marker_length].to_vec();
        let rest_of_line = self.scanner.save();
        self.scanner.skip_line();
        let rest_limit = self.scanner.position();

        let body_start = self.scanner.position();
        let mut body_end = body_start;
        let mut found = false;
        while !self.scanner.at_eof() {
            self.skip_whitespace(false);
            if self.has_here_marker(&marker) {
                found = true;
                break;
            }
            self.scanner.skip_line();
            body_end = self.scanner.position();
        }

        if !found {
            let name: String = marker.iter().collect();
            let length = marker_start + marker_length - start;
            let error = self.error(&messages::HERE_MISSING_END_MARKER, &[&name], start, length);
            self.scanner.restore(saved);
            return Err(error);
        }

        let content = self.scanner.content();
        let mut string_end = body_end;
        if exclude_last_eol {
            if string_end > body_start && content[string_end - 1] == '\n' {
                string_end -= 1;
            }
            if string_end > body_start && content[string_end - 1] == '\r' {
                string_end -= 1;
            }
        }

        if !no_editing && string_end > body_start {
            self.edit_string(stream, TokenType::String, body_start, string_end)?;
        } else {
            self.add(stream, TokenType::String, body_start, string_end)?;
        }

        let resume = self.scanner.save();
        self.scanner.restore(ScannerState {
            limit: rest_limit,
            ..rest_of_line
        });
        let rest = self.lexify_until(stream, Some(NestedScan::bounded()));
        self.scanner.restore(resume);
        rest.map(|_| true)
    }

    /// Match a here-document marker at the cursor and skip it.
    fn has_here_marker(&mut self, marker: &[char]) -> bool {
        let position = self.scanner.position();
        let matches = marker
            .iter()
            .enumerate()
            .all(|(i, &ch)| self.scanner.char_at(position + i) == ch);
        if !matches || is_identifier_part(self.scanner.char_at(position + marker.len())) {
            return false;
        }
        self.scanner.skip(marker.len());
        true
    }

    // ========================================================================
    // Token values
    // ========================================================================

    /// Decode the value of a literal or identifier token. `strict` rejects
    /// legacy octal escapes other than a bare `\0`.
    pub fn value_of(&self, token: Token, strict: bool) -> ParseResult<TokenValue> {
        let start = token.position() as usize;
        let length = token.length() as usize;
        let text = || self.source.substring(token.position(), token.length());

        let value = match token.token_type() {
            TokenType::Decimal => TokenValue::Number(self.number_value(token, &text(), 10)?),
            TokenType::OctalLegacy => TokenValue::Number(self.number_value(token, &text(), 8)?),
            TokenType::Hexadecimal => TokenValue::Number(self.number_value(token, &text()[2..], 16)?),
            TokenType::Octal => TokenValue::Number(self.number_value(token, &text()[2..], 8)?),
            TokenType::BinaryNumber => TokenValue::Number(self.number_value(token, &text()[2..], 2)?),
            TokenType::Floating => TokenValue::Number(self.floating_value(token, &text())?),
            TokenType::String | TokenType::DirectiveComment | TokenType::ExecString => TokenValue::String(text()),
            TokenType::EscString => TokenValue::String(self.value_of_string(start, length, strict)?),
            TokenType::Template | TokenType::TemplateHead | TokenType::TemplateMiddle | TokenType::TemplateTail => {
                TokenValue::String(self.value_of_string(start, length, true)?)
            }
            TokenType::Ident => TokenValue::String(self.value_of_ident(start, length)?),
            TokenType::Regex => self.value_of_pattern(start, length),
            _ => TokenValue::None,
        };
        Ok(value)
    }

    fn number_value(&self, token: Token, digits: &str, radix: u32) -> ParseResult<Number> {
        if let Ok(value) = i32::from_str_radix(digits, radix) {
            return Ok(Number::Integer(value));
        }
        if radix == 10 {
            return digits
                .parse::<f64>()
                .map(Number::Double)
                .map_err(|_| self.invalid_number(token));
        }
        let mut value = 0.0f64;
        for ch in digits.chars() {
            let digit = digit_value(ch, radix).ok_or_else(|| self.invalid_number(token))?;
            value = value * f64::from(radix) + f64::from(digit);
        }
        Ok(Number::Double(value))
    }

    /// Floating literals without a decimal point narrow to integers when
    /// exactly representable, so `1e3` is the integer 1000.
    fn floating_value(&self, token: Token, text: &str) -> ParseResult<Number> {
        let value: f64 = text.parse().map_err(|_| self.invalid_number(token))?;
        if !text.contains('.') && is_strictly_representable_as_int(value) {
            return Ok(Number::Integer(value as i32));
        }
        Ok(Number::Double(value))
    }

    fn invalid_number(&self, token: Token) -> ParseError {
        let text = self.token_text(token);
        self.error(&messages::INVALID_NUMBER, &[&text], token.position() as usize, token.length() as usize)
    }

    fn value_of_string(&self, start: usize, length: usize, strict: bool) -> ParseResult<String> {
        let mut scanner = Scanner::new(self.source.content());
        scanner.reset(start);
        let end = start + length;
        let mut value = String::with_capacity(length);

        while scanner.position() < end {
            let ch0 = scanner.ch0();
            if ch0 == '\r' {
                value.push('\n');
                scanner.skip(if scanner.ch1() == '\n' { 2 } else { 1 });
                continue;
            }
            if ch0 != '\\' {
                value.push(ch0);
                scanner.skip(1);
                continue;
            }

            let escape_start = scanner.position();
            scanner.skip(1);
            let next = scanner.ch0();
            let after_slash = scanner.position();
            scanner.skip(1);
            match next {
                '0'..='7' => {
                    if strict && (next != '0' || is_digit(scanner.ch0())) {
                        let error = ParseError::new(
                            ParseErrorKind::Syntax,
                            &messages::STRICT_NO_OCTAL,
                            &[],
                            self.source,
                            TextSpan::new(escape_start as u32, (scanner.position() - escape_start) as u32),
                        );
                        return Err(error);
                    }
                    scanner.reset(after_slash);
                    push_code_point(&mut value, scanner.octal_sequence());
                }
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'b' => value.push('\u{0008}'),
                'f' => value.push('\u{000C}'),
                'r' => value.push('\r'),
                'v' => value.push('\u{000B}'),
                '\r' => {
                    if scanner.ch0() == '\n' {
                        scanner.skip(1);
                    }
                }
                '\n' | '\u{2028}' | '\u{2029}' => {}
                'x' => match scanner.hex_sequence(2) {
                    Some(code) => push_code_point(&mut value, code),
                    None => {
                        let position = scanner.position();
                        return Err(self.error(&messages::INVALID_HEX, &[], position, 1));
                    }
                },
                'u' => match scanner.unicode_escape(self.options.es6) {
                    Some(code) => push_code_point(&mut value, code),
                    None => {
                        let length = scanner.position() - escape_start;
                        return Err(self.error(&messages::INVALID_UNICODE_ESCAPE, &[], escape_start, length.max(2)));
                    }
                },
                other => value.push(other),
            }
        }
        Ok(value)
    }

    fn value_of_ident(&self, start: usize, length: usize) -> ParseResult<String> {
        let mut scanner = Scanner::new(self.source.content());
        scanner.reset(start);
        let end = start + length;
        let mut value = String::with_capacity(length);

        while scanner.position() < end {
            if scanner.ch0() == '\\' && scanner.ch1() == 'u' {
                let escape_start = scanner.position();
                scanner.skip(2);
                match scanner.unicode_escape(self.options.es6) {
                    Some(code) => push_code_point(&mut value, code),
                    None => {
                        return Err(self.error(&messages::INVALID_UNICODE_ESCAPE, &[], escape_start, 2));
                    }
                }
            } else {
                value.push(scanner.ch0());
                scanner.skip(1);
            }
        }
        Ok(value)
    }

    fn value_of_pattern(&self, start: usize, length: usize) -> TokenValue {
        let content = self.source.content();
        let end = (start + length).min(content.len());
        let mut pattern = String::new();
        let mut position = start + 1;
        let mut in_brackets = false;

        while position < end && (content[position] != '/' || in_brackets) {
            let ch = content[position];
            if ch == '\\' && position + 1 < end {
                pattern.push(ch);
                pattern.push(content[position + 1]);
                position += 2;
                continue;
            }
            if ch == '[' {
                in_brackets = true;
            } else if ch == ']' {
                in_brackets = false;
            }
            pattern.push(ch);
            position += 1;
        }

        let flags: String = content[(position + 1).min(end)..end].iter().collect();
        TokenValue::Regex { pattern, flags }
    }

    /// The raw text of a template part: line terminators normalised, no
    /// escape processing.
    pub fn value_of_raw_string(&self, token: Token) -> String {
        let content = self.source.content();
        let start = token.position() as usize;
        let end = (start + token.length() as usize).min(content.len());
        let mut value = String::with_capacity(end.saturating_sub(start));
        let mut position = start;
        while position < end {
            let ch = content[position];
            if ch == '\r' {
                value.push('\n');
                position += if content.get(position + 1) == Some(&'\n') { 2 } else { 1 };
            } else {
                value.push(ch);
                position += 1;
            }
        }
        value
    }
}

/// Whether a `/` after `previous` starts a regular expression rather than a
/// division. Used where no parser is available to decide.
fn regex_allowed_after(previous: TokenType) -> bool {
    !matches!(
        previous,
        TokenType::Ident
            | TokenType::This
            | TokenType::Null
            | TokenType::True
            | TokenType::False
            | TokenType::Decimal
            | TokenType::Hexadecimal
            | TokenType::Octal
            | TokenType::OctalLegacy
            | TokenType::BinaryNumber
            | TokenType::Floating
            | TokenType::String
            | TokenType::EscString
            | TokenType::Regex
            | TokenType::Template
            | TokenType::TemplateTail
            | TokenType::RParen
            | TokenType::RBracket
            | TokenType::RBrace
            | TokenType::IncPrefix
            | TokenType::DecPrefix
    )
}

fn is_strictly_representable_as_int(value: f64) -> bool {
    value.fract() == 0.0
        && value >= f64::from(i32::MIN)
        && value <= f64::from(i32::MAX)
        && !(value == 0.0 && value.is_sign_negative())
}

/// Lone surrogates cannot be stored in a `String` and become U+FFFD.
fn push_code_point(value: &mut String, code: u32) {
    value.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
}

/// Lex a whole source without a parser. A `/` is read as the start of a
/// regular expression wherever the previous token cannot end an operand.
/// The first lexical error ends the scan.
pub fn tokenize(source: &Source, options: LexerOptions) -> ParseResult<Vec<Token>> {
    let mut lexer = Lexer::new(source, options);
    let mut stream = TokenStream::new();
    let mut tokens = Vec::new();
    let mut previous = TokenType::Eol;
    let mut k = 0;

    loop {
        while stream.last().map_or(true, |last| k > last) {
            if stream.is_full() {
                stream.grow();
            }
            lexer.lexify(&mut stream);
        }

        let token = stream.get(k);
        let token_type = token.token_type();
        k += 1;
        if let Some(pending) = lexer.error_for(token) {
            return Err(pending.error.clone());
        }

        if lexer.can_start_literal(token_type)
            && regex_allowed_after(previous)
            && lexer.scan_literal(&mut stream, token, token_type)?
        {
            continue;
        }

        tokens.push(token);
        if token_type == TokenType::Eof {
            break;
        }
        if !matches!(token_type, TokenType::Eol | TokenType::Comment | TokenType::DirectiveComment) {
            previous = token_type;
        }
        stream.commit(k);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(text: &str, options: LexerOptions) -> Vec<TokenType> {
        let source = Source::new("test.js", text);
        tokenize(&source, options)
            .unwrap()
            .into_iter()
            .map(Token::token_type)
            .filter(|t| *t != TokenType::Eol)
            .collect()
    }

    #[test]
    fn test_lexify_pauses_after_slash() {
        let source = Source::new("test.js", "a / b");
        let mut lexer = Lexer::new(&source, LexerOptions::default());
        let mut stream = TokenStream::new();
        lexer.lexify(&mut stream);
        let last = stream.last().unwrap();
        assert_eq!(stream.get(last).token_type(), TokenType::Div);
    }

    #[test]
    fn test_scan_literal_rescans_regex() {
        let source = Source::new("test.js", "x = /a[/]b/g;");
        let mut lexer = Lexer::new(&source, LexerOptions::default());
        let mut stream = TokenStream::new();
        lexer.lexify(&mut stream);
        let last = stream.last().unwrap();
        let div = stream.get(last);
        assert!(lexer.scan_literal(&mut stream, div, TokenType::Div).unwrap());
        let regex = stream.get(last + 1);
        assert_eq!(regex.token_type(), TokenType::Regex);
        assert_eq!(
            lexer.value_of(regex, false).unwrap(),
            TokenValue::Regex { pattern: "a[/]b".to_string(), flags: "g".to_string() }
        );
    }

    #[test]
    fn test_scan_literal_only_for_last_token() {
        let source = Source::new("test.js", "a / b");
        let mut lexer = Lexer::new(&source, LexerOptions::default());
        let mut stream = TokenStream::new();
        lexer.lexify(&mut stream);
        let div = stream.get(stream.last().unwrap());
        lexer.lexify(&mut stream);
        assert!(!lexer.scan_literal(&mut stream, div, TokenType::Div).unwrap());
    }

    #[test]
    fn test_restart_primes_statement_start() {
        let source = Source::new("test.js", "function f() { a }\nb");
        let mut lexer = Lexer::new(&source, LexerOptions::default());
        lexer.restart(ParserState { position: 17, line: 1, line_position: 0 });
        let mut stream = TokenStream::new();
        lexer.lexify(&mut stream);
        assert_eq!(stream.get(0).token_type(), TokenType::RBrace);
        assert_eq!(stream.get(1).token_type(), TokenType::Eol);
        assert_eq!(stream.get(1).length(), 2);
    }

    #[test]
    fn test_nested_template_expression_regex() {
        let es6 = LexerOptions { es6: true, ..LexerOptions::default() };
        assert_eq!(
            types("`${a / b}${/x/}`", es6),
            vec![
                TokenType::TemplateHead,
                TokenType::Ident,
                TokenType::Div,
                TokenType::Ident,
                TokenType::TemplateMiddle,
                TokenType::Regex,
                TokenType::TemplateTail,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_strict_octal_escape() {
        let source = Source::new("test.js", r#""\0" "\01""#);
        let tokens = tokenize(&source, LexerOptions::default()).unwrap();
        let lexer = Lexer::new(&source, LexerOptions::default());
        assert_eq!(lexer.value_of(tokens[1], true).unwrap(), TokenValue::String("\0".to_string()));
        assert!(lexer.value_of(tokens[2], true).is_err());
        assert_eq!(lexer.value_of(tokens[2], false).unwrap(), TokenValue::String("\u{1}".to_string()));
    }

    #[test]
    fn test_number_narrowing() {
        let source = Source::new("test.js", "1e3 1.0 0x10 4294967296");
        let tokens = tokenize(&source, LexerOptions::default()).unwrap();
        let lexer = Lexer::new(&source, LexerOptions::default());
        let values: Vec<_> = tokens[1..5].iter().map(|t| lexer.value_of(*t, false).unwrap()).collect();
        assert_eq!(values[0], TokenValue::Number(Number::Integer(1000)));
        assert_eq!(values[1], TokenValue::Number(Number::Double(1.0)));
        assert_eq!(values[2], TokenValue::Number(Number::Integer(16)));
        assert_eq!(values[3], TokenValue::Number(Number::Double(4_294_967_296.0)));
    }
}
