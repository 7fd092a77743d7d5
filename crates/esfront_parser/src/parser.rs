//! The parser: token cursor, entry points and error recovery.
//!
//! This is a recursive descent parser over the shared [`TokenStream`]. The
//! grammar productions live in sibling modules (`statements`, `expressions`,
//! `functions`, `literals`, `modules`), each adding its own `impl Parser`
//! block. This file owns the cursor, the error helpers, the per-statement
//! recovery of the program loop and the directive prologue.

use crate::context::{BlockFrame, Frame, FunctionFrame, ModuleFrame, ParserContext};
use crate::lazy::{FunctionDataMap, LazyPlan, ReparsedFunction};
use crate::namespace::Namespace;
use crate::options::ParserOptions;
use bumpalo::Bump;
use esfront_ast::*;
use esfront_core::{Source, TextRange, TextSpan};
use esfront_diagnostics::{
    messages, DiagnosticCollection, DiagnosticMessage, ParseError, ParseErrorKind, ParseResult,
};
use esfront_lexer::{is_identifier_part, is_identifier_start, Lexer, Token, TokenStream, TokenValue};
use std::time::Instant;
use tracing::{debug, info};

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
pub(crate) const MAX_RECURSION_DEPTH: u32 = 100;

/// Name of the synthetic function that wraps a whole script.
pub const PROGRAM_NAME: &str = ":program";
/// Prefix of names given to anonymous functions.
pub const ANON_FUNCTION_PREFIX: &str = "L:";
pub const ARROW_FUNCTION_PREFIX: &str = "=>:";

/// Allocate a Vec into the arena as a slice.
pub(crate) fn alloc_vec_in<T: Copy>(arena: &Bump, vec: Vec<T>) -> &[T] {
    if vec.is_empty() {
        return &[];
    }
    arena.alloc_slice_copy(&vec)
}

/// Whether `name` could be written as an identifier.
pub(crate) fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => is_identifier_start(first) && chars.all(is_identifier_part),
        None => false,
    }
}

/// A parsed program together with the errors recovered while parsing it.
#[derive(Debug)]
pub struct ParseOutcome<'a> {
    pub program: &'a FunctionNode<'a>,
    pub diagnostics: DiagnosticCollection,
    /// Per-function data for a later lazy reparse. Empty unless
    /// `lazy_compilation` is on.
    pub recorded: FunctionDataMap,
}

impl<'a> ParseOutcome<'a> {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Parse a script with `options`, collecting recovered errors.
pub fn parse_script<'a>(arena: &'a Bump, source: &'a Source, options: ParserOptions) -> ParseResult<ParseOutcome<'a>> {
    let mut parser = Parser::new(arena, source, options);
    let program = parser.parse()?;
    Ok(parser.into_outcome(program))
}

/// State restored when a top-level statement is abandoned.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    context_depth: usize,
    statement_count: usize,
    declaration_count: usize,
    default_names: usize,
    is_strict_mode: bool,
    depth: u32,
    brace_depth: u32,
}

/// ECMAScript parser producing an arena-allocated AST.
pub struct Parser<'a> {
    pub(crate) arena: &'a Bump,
    pub(crate) source: &'a Source,
    pub(crate) options: ParserOptions,
    pub(crate) lexer: Lexer<'a>,
    pub(crate) stream: TokenStream,
    /// Index of the current token in the stream.
    pub(crate) k: usize,
    pub(crate) token: Token,
    pub(crate) token_type: TokenType,
    /// Type of the token before the current one, comments excluded. `Eol`
    /// here means a line break precedes the current token.
    pub(crate) last: TokenType,
    pub(crate) previous_token: Token,
    /// Start of the current token, delimiters included.
    pub(crate) start: u32,
    /// End of the last consumed token.
    pub(crate) finish: u32,
    pub(crate) line: u32,
    pub(crate) line_position: u32,
    pub(crate) is_strict_mode: bool,
    pub(crate) context: ParserContext<'a>,
    pub(crate) namespace: Namespace,
    /// Names an anonymous function may borrow; `None` hides the outer name.
    pub(crate) default_names: Vec<Option<&'a str>>,
    function_name: Option<String>,
    pub(crate) lazy: Option<LazyPlan>,
    pub(crate) recorded: FunctionDataMap,
    diagnostics: DiagnosticCollection,
    /// `{` minus `}` among the consumed tokens.
    pub(crate) brace_depth: u32,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, source: &'a Source, options: ParserOptions) -> Self {
        Self {
            arena,
            source,
            options,
            lexer: Lexer::new(source, options.lexer_options(false)),
            stream: TokenStream::new(),
            k: 0,
            token: Token::new(TokenType::Eol, 0, 1),
            token_type: TokenType::Eol,
            last: TokenType::Eol,
            previous_token: Token::default(),
            start: 0,
            finish: 0,
            line: 1,
            line_position: 0,
            is_strict_mode: options.strict,
            context: ParserContext::new(),
            namespace: Namespace::new(),
            default_names: Vec::new(),
            function_name: None,
            lazy: None,
            recorded: FunctionDataMap::new(),
            diagnostics: DiagnosticCollection::new(),
            brace_depth: 0,
            depth: 0,
        }
    }

    /// Name the program function instead of `:program`.
    pub fn set_function_name(&mut self, name: impl Into<String>) {
        self.function_name = Some(name.into());
    }

    /// Make the next [`Parser::parse`] a lazy reparse for `target`: bodies of
    /// functions in `data` that neither enclose nor lie inside the target
    /// are skipped.
    pub fn set_reparsed_function(&mut self, target: ReparsedFunction, data: FunctionDataMap) {
        self.lexer = Lexer::new(self.source, self.options.lexer_options(true));
        self.lazy = Some(LazyPlan::new(target, data));
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Flags and end positions of every function finished so far, for a
    /// later lazy reparse.
    pub fn recorded_functions(&self) -> &FunctionDataMap {
        &self.recorded
    }

    pub fn into_outcome(self, program: &'a FunctionNode<'a>) -> ParseOutcome<'a> {
        ParseOutcome {
            program,
            diagnostics: self.diagnostics,
            recorded: self.recorded,
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Parse the whole source as a script.
    pub fn parse(&mut self) -> ParseResult<&'a FunctionNode<'a>> {
        let started = Instant::now();
        info!(source = self.source.name(), "parse begin");

        self.scan_first_token()?;
        let program = self.program(FunctionKind::Script, None)?;

        info!(
            source = self.source.name(),
            elapsed_us = started.elapsed().as_micros() as u64,
            statements = program.body.statements.len(),
            errors = self.diagnostics.error_count(),
            "parse end"
        );
        Ok(program)
    }

    /// Parse the whole source as a module named `name`.
    pub fn parse_module(&mut self, name: &str) -> ParseResult<&'a FunctionNode<'a>> {
        let started = Instant::now();
        info!(source = self.source.name(), module = name, "parse begin");

        self.scan_first_token()?;
        let program = self.program(FunctionKind::Module, Some(name))?;

        info!(
            source = self.source.name(),
            elapsed_us = started.elapsed().as_micros() as u64,
            statements = program.body.statements.len(),
            errors = self.diagnostics.error_count(),
            "parse end"
        );
        Ok(program)
    }

    /// Parse the source as a formal parameter list with nothing after it.
    pub fn parse_formal_parameter_list(&mut self) -> ParseResult<Vec<IdentNode<'a>>> {
        self.scan_first_token()?;
        let ident = IdentNode::new(TextRange::empty(0), PROGRAM_NAME);
        self.begin_function(ident, FunctionId(0), 0, FunctionKind::Normal, self.line);
        let parameters = self.formal_parameter_list(TokenType::Eof);
        let frame = self.pop_function_frame();
        parameters?;
        Ok(frame.parameters)
    }

    /// Parse the source as the body of an anonymous function.
    pub fn parse_function_body(&mut self) -> ParseResult<&'a FunctionNode<'a>> {
        self.scan_first_token()?;
        let line = self.line;
        let ident = IdentNode::new(TextRange::empty(0), PROGRAM_NAME);
        self.begin_function(ident, FunctionId(0), 0, FunctionKind::Normal, line);
        self.current_function_mut().set_flag(FunctionFlags::IS_ANONYMOUS);
        self.push_block();

        self.source_elements(false)?;
        self.add_function_declarations();

        let body_frame = self.context.pop_block();
        let body = self.finish_block(body_frame, 0, BlockFlags::NEEDS_SCOPE | BlockFlags::IS_SYNTHETIC);
        let mut frame = self.pop_function_frame();
        frame.last_token = self.token;
        self.expect(TokenType::Eof)?;
        Ok(self.finish_function(frame, body, TextRange::new(0, self.source.len() as u32)))
    }

    /// The program function. Only this loop recovers from errors.
    fn program(&mut self, kind: FunctionKind, module_name: Option<&str>) -> ParseResult<&'a FunctionNode<'a>> {
        let line = self.line;
        let name = self.function_name.clone().unwrap_or_else(|| PROGRAM_NAME.to_string());
        let ident = IdentNode::new(TextRange::empty(0), self.alloc_str(&name));
        self.begin_function(ident, FunctionId::PROGRAM, 0, kind, line);
        self.push_block();

        let module = match module_name {
            Some(module_name) => {
                self.is_strict_mode = true;
                self.current_function_mut().set_flag(FunctionFlags::IS_STRICT);
                self.context.push(Frame::Module(ModuleFrame::new(module_name.to_string())));
                self.module_body()?;
                let frame = self.context.pop_module();
                Some(self.finish_module(frame))
            }
            None => {
                self.source_elements(true)?;
                None
            }
        };
        self.add_function_declarations();

        let body_frame = self.context.pop_block();
        let body = self.finish_block(
            body_frame,
            0,
            BlockFlags::NEEDS_SCOPE | BlockFlags::IS_SYNTHETIC | BlockFlags::IS_BODY,
        );
        let mut frame = self.pop_function_frame();
        frame.last_token = self.token;
        if let Some(recorded) = self.lazy.as_ref().and_then(|lazy| lazy.recorded(FunctionId::PROGRAM)) {
            frame.flags |= recorded.flags;
        }
        self.expect(TokenType::Eof)?;

        let mut program = self.build_function(frame, body, TextRange::new(0, self.source.len() as u32));
        program.module = module;
        self.record_function(&program);
        Ok(self.arena.alloc(program))
    }

    // ========================================================================
    // Token management
    // ========================================================================

    /// Token `k`, lexing more input as needed.
    pub(crate) fn get_token(&mut self, k: usize) -> Token {
        while self.stream.last().map_or(true, |last| k > last) {
            if self.stream.is_full() {
                self.stream.grow();
            }
            self.lexer.lexify(&mut self.stream);
        }
        self.stream.get(k)
    }

    /// Type of token `k` without moving the cursor.
    pub(crate) fn t(&mut self, k: usize) -> TokenType {
        self.get_token(k).token_type()
    }

    fn observe_token(&mut self) {
        if self.token_type == TokenType::Eol {
            self.line = self.token.length();
            self.line_position = self.token.position();
        } else {
            self.start = self.token.with_delimiter().position();
        }
    }

    fn next_token(&mut self) -> ParseResult<TokenType> {
        if !matches!(self.token_type, TokenType::Comment | TokenType::DirectiveComment) {
            self.last = self.token_type;
        }
        if self.token_type != TokenType::Eof {
            self.k += 1;
            let last_token = self.token;
            match last_token.token_type() {
                TokenType::LBrace => self.brace_depth += 1,
                TokenType::RBrace => self.brace_depth = self.brace_depth.saturating_sub(1),
                _ => {}
            }
            self.previous_token = last_token;
            self.token = self.get_token(self.k);
            self.token_type = self.token.token_type();
            if self.last != TokenType::Eol {
                self.finish = last_token.with_delimiter().end();
            }
            self.observe_token();
        }
        Ok(self.token_type)
    }

    /// Advance to the next token, stopping at line breaks.
    pub(crate) fn next_or_eol(&mut self) -> ParseResult<TokenType> {
        loop {
            self.next_token()?;
            if !matches!(self.token_type, TokenType::Comment | TokenType::DirectiveComment) {
                return Ok(self.token_type);
            }
        }
    }

    /// Advance to the next significant token.
    pub(crate) fn next(&mut self) -> ParseResult<TokenType> {
        loop {
            self.next_or_eol()?;
            if self.token_type != TokenType::Eol {
                return Ok(self.token_type);
            }
        }
    }

    /// Load the token at the end of the stream as the current one.
    pub(crate) fn scan_first_token(&mut self) -> ParseResult<()> {
        self.k = self.stream.count();
        self.token = self.get_token(self.k);
        self.token_type = self.token.token_type();
        self.observe_token();
        if matches!(
            self.token_type,
            TokenType::Eol | TokenType::Comment | TokenType::DirectiveComment
        ) {
            self.next()?;
        }
        Ok(())
    }

    pub(crate) fn expect(&mut self, expected: TokenType) -> ParseResult<()> {
        self.expect_dont_advance(expected)?;
        self.next()?;
        Ok(())
    }

    pub(crate) fn expect_dont_advance(&self, expected: TokenType) -> ParseResult<()> {
        if self.token_type != expected {
            return Err(self.expected(&expected.name_or_type()));
        }
        Ok(())
    }

    /// Automatic semicolon insertion at the end of a statement.
    pub(crate) fn end_of_line(&mut self) -> ParseResult<()> {
        match self.token_type {
            TokenType::Semicolon | TokenType::Eol => {
                self.next()?;
            }
            TokenType::RParen | TokenType::RBracket | TokenType::RBrace | TokenType::Eof => {}
            _ => {
                if self.last != TokenType::Eol {
                    self.expect(TokenType::Semicolon)?;
                }
            }
        }
        Ok(())
    }

    /// Range from `start` to the end of the last consumed token.
    #[inline]
    pub(crate) fn range_from(&self, start: u32) -> TextRange {
        TextRange::new(start, self.finish.max(start))
    }

    #[inline]
    pub(crate) fn token_range(token: Token) -> TextRange {
        let token = token.with_delimiter();
        TextRange::new(token.position(), token.end())
    }

    /// A keyword reserved only in strict mode, used as an identifier.
    pub(crate) fn is_non_strict_mode_ident(&self) -> bool {
        !self.is_strict_mode && self.token_type.kind() == TokenKind::FutureStrict
    }

    pub(crate) fn get_value(&self, token: Token) -> ParseResult<TokenValue> {
        self.lexer.value_of(token, self.is_strict_mode)
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub(crate) fn error_kind_at(
        &self,
        kind: ParseErrorKind,
        message: &DiagnosticMessage,
        args: &[&str],
        token: Token,
    ) -> ParseError {
        if let Some(pending) = self.lexer.error_for(token) {
            return pending.error.clone();
        }
        let span = match token.token_type() {
            TokenType::Eol | TokenType::Eof => TextSpan::empty(token.position()),
            _ => token.with_delimiter().span(),
        };
        ParseError::new(kind, message, args, self.source, span)
    }

    pub(crate) fn error_at(&self, message: &DiagnosticMessage, args: &[&str], token: Token) -> ParseError {
        self.error_kind_at(ParseErrorKind::Syntax, message, args, token)
    }

    /// An error at the current token.
    pub(crate) fn error(&self, message: &DiagnosticMessage, args: &[&str]) -> ParseError {
        self.error_at(message, args, self.token)
    }

    pub(crate) fn error_in_range(
        &self,
        kind: ParseErrorKind,
        message: &DiagnosticMessage,
        args: &[&str],
        range: TextRange,
    ) -> ParseError {
        ParseError::new(kind, message, args, self.source, range.to_span())
    }

    /// How the current token reads in an error message.
    pub(crate) fn found_text(&self) -> String {
        match self.token_type {
            TokenType::Eof => "eof".to_string(),
            TokenType::Eol => "newline".to_string(),
            _ => self.lexer.token_text(self.token.with_delimiter()),
        }
    }

    pub(crate) fn expected(&self, expected: &str) -> ParseError {
        let found = self.found_text();
        self.error(&messages::EXPECTED_0_BUT_FOUND_1, &[expected, &found])
    }

    pub(crate) fn enter(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(self.error(&messages::TOO_DEEPLY_NESTED, &[]));
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            context_depth: self.context.depth(),
            statement_count: self.context.current_block().map_or(0, |block| block.statements.len()),
            declaration_count: self.context.current_function().map_or(0, |f| f.function_declarations.len()),
            default_names: self.default_names.len(),
            is_strict_mode: self.is_strict_mode,
            depth: self.depth,
            brace_depth: self.brace_depth,
        }
    }

    /// A lexical error after which nothing can be lexed.
    fn fatal_lexical_error(&self) -> Option<ParseError> {
        self.lexer
            .error_for(self.token)
            .filter(|pending| pending.at_end)
            .map(|pending| pending.error.clone())
    }

    /// Record `error`, drop whatever the failed statement left behind and
    /// skip to a token a new statement can start after. Blocks the statement
    /// opened are skipped whole. A lexical error that ran to the end of input
    /// ends the parse.
    fn recover(&mut self, error: ParseError, checkpoint: Checkpoint) -> ParseResult<()> {
        if let Some(fatal) = self.fatal_lexical_error() {
            return Err(fatal);
        }
        debug!(line = error.line, column = error.column, code = error.code, message = %error.message, "recovered parse error");
        self.diagnostics.add(error.to_diagnostic());

        self.context.truncate(checkpoint.context_depth);
        if let Some(block) = self.context.current_block_mut() {
            block.statements.truncate(checkpoint.statement_count);
        }
        if let Some(function) = self.context.current_function_mut() {
            function.function_declarations.truncate(checkpoint.declaration_count);
        }
        self.default_names.truncate(checkpoint.default_names);
        self.is_strict_mode = checkpoint.is_strict_mode;
        self.depth = checkpoint.depth;

        let error_start = self.start;
        let error_line = self.line;
        let outside = checkpoint.brace_depth;
        loop {
            match self.token_type {
                TokenType::Eof => break,
                TokenType::Eol | TokenType::Semicolon | TokenType::RBrace if self.brace_depth <= outside => {
                    self.next()?;
                    break;
                }
                TokenType::Error => {
                    if let Some(fatal) = self.fatal_lexical_error() {
                        return Err(fatal);
                    }
                    if let Some(pending) = self.lexer.error_for(self.token).filter(|pending| pending.error != error) {
                        debug!(code = pending.error.code, "lexical error inside skipped statement");
                        self.diagnostics.add(pending.error.to_diagnostic());
                    }
                    self.next_or_eol()?;
                }
                _ => {
                    self.next_or_eol()?;
                }
            }
        }
        self.brace_depth = self.brace_depth.min(outside);

        let range = self.range_from(error_start);
        let expression = self.arena.alloc(Expression::Error(ErrorNode { range }));
        self.context.append_statement(Statement::Expression(ExpressionStatement {
            range,
            line: error_line,
            expression,
        }));
        Ok(())
    }

    // ========================================================================
    // Source elements and directives
    // ========================================================================

    /// Statements up to the end of input or, for function bodies, the
    /// closing brace. Leading string literal statements form the directive
    /// prologue.
    pub(crate) fn source_elements(&mut self, recover: bool) -> ParseResult<()> {
        let old_strict_mode = self.is_strict_mode;
        let result = self.source_elements_with(recover, old_strict_mode);
        self.is_strict_mode = old_strict_mode;
        result
    }

    fn source_elements_with(&mut self, recover: bool, old_strict_mode: bool) -> ParseResult<()> {
        let mut directives: Vec<LiteralNode<'a>> = Vec::new();
        let mut check_directive = true;

        while self.token_type != TokenType::Eof {
            if self.token_type == TokenType::RBrace && !recover {
                break;
            }

            if recover {
                let checkpoint = self.checkpoint();
                if let Err(error) = self.statement(true, false, false) {
                    self.recover(error, checkpoint)?;
                    check_directive = false;
                    self.stream.commit(self.k);
                    continue;
                }
            } else {
                self.statement(true, false, false)?;
            }

            if check_directive {
                let directive = self.context.last_statement().and_then(directive_literal);
                check_directive = directive.is_some();
                if let Some(literal) = directive {
                    if !old_strict_mode {
                        directives.push(literal);
                    }
                    if self.directive_text(&literal) == "use strict" {
                        self.use_strict(&directives, old_strict_mode)?;
                    }
                }
            }

            self.stream.commit(self.k);
        }
        Ok(())
    }

    /// Switch the current function to strict mode and re-check what was
    /// parsed before the directive.
    fn use_strict(&mut self, directives: &[LiteralNode<'a>], old_strict_mode: bool) -> ParseResult<()> {
        self.is_strict_mode = true;
        self.current_function_mut().set_flag(FunctionFlags::IS_STRICT);
        if old_strict_mode {
            return Ok(());
        }

        for literal in directives {
            let token = Token::new(
                literal.token_type,
                literal.range.pos + 1,
                literal.range.len().saturating_sub(2),
            );
            self.lexer.value_of(token, true)?;
        }

        let function = self.current_function();
        let ident = function.ident;
        let anonymous = function.flags.contains(FunctionFlags::IS_ANONYMOUS);
        let parameters = function.parameters.clone();
        if !anonymous {
            self.verify_strict_ident(&ident, "function name")?;
        }
        for parameter in &parameters {
            self.verify_strict_ident(parameter, "function parameter")?;
        }
        Ok(())
    }

    /// The directive as written in source, quotes stripped and escapes kept.
    fn directive_text(&self, literal: &LiteralNode<'a>) -> String {
        self.source
            .substring(literal.range.pos + 1, literal.range.len().saturating_sub(2))
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    /// The name of an identifier token, decoding escapes.
    pub(crate) fn ident_name(&self, token: Token) -> ParseResult<(&'a str, bool)> {
        let text = self.lexer.token_text(token);
        if !text.contains('\\') {
            return Ok((self.alloc_str(&text), false));
        }
        let name = match self.lexer.value_of(token, self.is_strict_mode)? {
            TokenValue::String(name) => name,
            _ => text,
        };
        let reserved = TokenType::from_keyword(&name)
            .map_or(false, |keyword| keyword.kind() != TokenKind::FutureStrict || self.is_strict_mode);
        if reserved {
            return Err(self.error_at(&messages::ESCAPED_KEYWORD, &[&name], token));
        }
        Ok((self.alloc_str(&name), true))
    }

    /// Consume an identifier. Words reserved only in strict mode are
    /// accepted outside it and flagged.
    pub(crate) fn get_ident(&mut self) -> ParseResult<IdentNode<'a>> {
        let token = self.token;
        let range = Self::token_range(token);
        if self.is_non_strict_mode_ident() {
            let name = self.alloc_str(&self.lexer.token_text(token));
            self.next()?;
            return Ok(IdentNode::new(range, name).with_flags(IdentFlags::FUTURE_STRICT_NAME));
        }
        self.expect_dont_advance(TokenType::Ident)?;
        let (name, escaped) = self.ident_name(token)?;
        self.next()?;
        let ident = IdentNode::new(range, name);
        Ok(if escaped { ident.with_flags(IdentFlags::ESCAPED) } else { ident })
    }

    /// Strict mode forbids `eval`, `arguments` and strict-reserved words as
    /// binding names.
    pub(crate) fn verify_strict_ident(&self, ident: &IdentNode<'a>, context_name: &str) -> ParseResult<()> {
        if self.is_strict_mode
            && (ident.name == "eval" || ident.name == "arguments" || ident.is_future_strict_name())
        {
            return Err(self.error_in_range(
                ParseErrorKind::Syntax,
                &messages::STRICT_NAME,
                &[ident.name, context_name],
                ident.range,
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Arena helpers
    // ========================================================================

    #[inline]
    pub(crate) fn alloc_str(&self, value: &str) -> &'a str {
        self.arena.alloc_str(value)
    }

    #[inline]
    pub(crate) fn alloc_expression(&self, expression: Expression<'a>) -> &'a Expression<'a> {
        self.arena.alloc(expression)
    }

    // ========================================================================
    // Context helpers
    // ========================================================================

    pub(crate) fn current_function(&self) -> &FunctionFrame<'a> {
        match self.context.current_function() {
            Some(function) => function,
            None => unreachable!("statements are always parsed inside a function"),
        }
    }

    pub(crate) fn current_function_mut(&mut self) -> &mut FunctionFrame<'a> {
        match self.context.current_function_mut() {
            Some(function) => function,
            None => unreachable!("statements are always parsed inside a function"),
        }
    }

    pub(crate) fn push_block(&mut self) {
        self.context.push(Frame::Block(BlockFrame {
            flags: BlockFlags::empty(),
            statements: Vec::new(),
        }));
    }

    /// Turn a popped block frame into a block ending at the last consumed
    /// token.
    pub(crate) fn finish_block(&self, frame: BlockFrame<'a>, start: u32, flags: BlockFlags) -> Block<'a> {
        Block {
            range: self.range_from(start),
            statements: alloc_vec_in(self.arena, frame.statements),
            flags: frame.flags | flags,
        }
    }

    #[inline]
    pub(crate) fn append_statement(&mut self, statement: Statement<'a>) {
        self.context.append_statement(statement);
    }

    /// `this` is resolved by the nearest non-arrow function.
    pub(crate) fn mark_this(&mut self) {
        for function in self.context.functions_mut() {
            function.set_flag(FunctionFlags::USES_THIS);
            if !function.is_arrow() {
                break;
            }
        }
    }

    /// A direct `eval` call: the caller gets `HAS_EVAL`, every enclosing
    /// function `HAS_NESTED_EVAL`, and all of them a scope.
    pub(crate) fn mark_eval(&mut self) {
        let mut first = true;
        let mut in_arrow = false;
        for function in self.context.functions_mut() {
            if first {
                function.set_flag(FunctionFlags::HAS_EVAL);
                in_arrow = function.is_arrow();
                first = false;
            } else {
                function.set_flag(FunctionFlags::HAS_NESTED_EVAL);
            }
            function.set_flag(FunctionFlags::HAS_SCOPE_BLOCK);
        }
        if in_arrow {
            self.mark_this();
        }
    }

    /// `arguments` belongs to the nearest non-arrow function.
    pub(crate) fn mark_arguments(&mut self) {
        if let Some(function) = self.context.functions_mut().find(|function| !function.is_arrow()) {
            function.set_flag(FunctionFlags::USES_ARGUMENTS);
        }
    }

    /// Flags of the innermost function that is not an arrow.
    pub(crate) fn non_arrow_function_flags(&mut self) -> FunctionFlags {
        self.context
            .functions_mut()
            .find(|function| !function.is_arrow())
            .map_or(FunctionFlags::empty(), |function| function.flags)
    }

    /// `super` and `new.target` belong to the innermost non-arrow function.
    pub(crate) fn mark_non_arrow_function(&mut self, flag: FunctionFlags) {
        if let Some(function) = self.context.functions_mut().find(|function| !function.is_arrow()) {
            function.set_flag(flag);
        }
    }
}

/// The literal of a statement that consists of a single string literal.
fn directive_literal<'a>(statement: &Statement<'a>) -> Option<LiteralNode<'a>> {
    match statement {
        Statement::Expression(ExpressionStatement {
            expression: Expression::Literal(literal),
            ..
        }) if matches!(literal.token_type, TokenType::String | TokenType::EscString) => Some(*literal),
        _ => None,
    }
}
