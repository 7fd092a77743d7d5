//! Statements and blocks.
//!
//! Each statement production appends its node to the innermost block frame.
//! Loops, switches and labels push frames of their own so that `break` and
//! `continue` can be checked against what encloses them.

use crate::context::{BlockFrame, Frame, LabelFrame};
use crate::parser::{alloc_vec_in, Parser};
use esfront_ast::*;
use esfront_diagnostics::{messages, ParseErrorKind, ParseResult};

impl<'a> Parser<'a> {
    /// One statement. `top_level` is set for statements directly in a
    /// function body, `single_statement` for the body of `if`, loops and
    /// labels where declarations are not allowed.
    pub(crate) fn statement(&mut self, top_level: bool, single_statement: bool, labelled: bool) -> ParseResult<()> {
        self.enter()?;
        let result = self.statement_inner(top_level, single_statement, labelled);
        self.leave();
        result
    }

    fn statement_inner(&mut self, top_level: bool, single_statement: bool, labelled: bool) -> ParseResult<()> {
        match self.token_type {
            TokenType::LBrace => self.block_statement(),
            TokenType::Var => self.variable_statement(TokenType::Var),
            TokenType::Semicolon => self.empty_statement(),
            TokenType::If => self.if_statement(),
            TokenType::For => self.for_statement(),
            TokenType::While => self.while_statement(),
            TokenType::Do => self.do_statement(),
            TokenType::Continue => self.continue_statement(),
            TokenType::Break => self.break_statement(),
            TokenType::Return => self.return_statement(),
            TokenType::With => self.with_statement(),
            TokenType::Switch => self.switch_statement(),
            TokenType::Throw => self.throw_statement(),
            TokenType::Try => self.try_statement(),
            TokenType::Debugger => self.debugger_statement(),
            TokenType::RParen | TokenType::RBracket | TokenType::Eof => self.expect(TokenType::Semicolon),
            TokenType::Function => {
                if single_statement && (!labelled || self.is_strict_mode) {
                    return Err(self.error(&messages::EXPECTED_STATEMENT, &["function declaration"]));
                }
                self.function_expression(true, top_level || labelled)?;
                Ok(())
            }
            TokenType::Class if self.options.es6 => {
                if single_statement {
                    return Err(self.error(&messages::EXPECTED_STATEMENT, &["class declaration"]));
                }
                self.class_declaration()?;
                Ok(())
            }
            _ => {
                let declaration = self.options.es6
                    && match self.token_type {
                        TokenType::Let => self.lookahead_is_let_declaration(false)?,
                        TokenType::Const => true,
                        _ => false,
                    };
                if declaration {
                    let var_type = self.token_type;
                    if single_statement {
                        let what = format!("{} declaration", var_type.name_or_type());
                        return Err(self.error(&messages::EXPECTED_STATEMENT, &[&what]));
                    }
                    return self.variable_statement(var_type);
                }
                if (self.token_type == TokenType::Ident || self.is_non_strict_mode_ident())
                    && self.t(self.k + 1) == TokenType::Colon
                {
                    return self.label_statement();
                }
                self.expression_statement()
            }
        }
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    /// Statements up to a token that ends a block or a case clause.
    fn statement_list(&mut self) -> ParseResult<()> {
        while !matches!(
            self.token_type,
            TokenType::Eof | TokenType::Case | TokenType::Default | TokenType::RBrace
        ) {
            self.statement(false, false, false)?;
        }
        Ok(())
    }

    /// Run `parse` with `frame` pushed. On failure every frame pushed since
    /// is dropped.
    fn with_frame<T>(&mut self, frame: Frame<'a>, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let depth = self.context.depth();
        let kind = frame.kind();
        self.context.push(frame);
        let result = parse(self);
        match &result {
            Ok(_) => {
                self.context.pop(kind);
            }
            Err(_) => self.context.truncate(depth),
        }
        result
    }

    /// [`Parser::with_frame`] for a new block, which is handed back.
    pub(crate) fn in_block<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<(BlockFrame<'a>, T)> {
        let depth = self.context.depth();
        self.push_block();
        match parse(self) {
            Ok(value) => Ok((self.context.pop_block(), value)),
            Err(error) => {
                self.context.truncate(depth);
                Err(error)
            }
        }
    }

    /// `{ statements }`, or without braces the statements of a case clause.
    pub(crate) fn get_block(&mut self, need_braces: bool) -> ParseResult<Block<'a>> {
        self.enter()?;
        let result = self.block_contents(need_braces);
        self.leave();
        result
    }

    fn block_contents(&mut self, need_braces: bool) -> ParseResult<Block<'a>> {
        let start = self.start;
        let (frame, ()) = self.in_block(|parser| {
            if need_braces {
                parser.expect(TokenType::LBrace)?;
            }
            parser.statement_list()
        })?;
        if need_braces {
            self.expect(TokenType::RBrace)?;
        }
        let flags = if need_braces { BlockFlags::empty() } else { BlockFlags::IS_SYNTHETIC };
        Ok(self.finish_block(frame, start, flags))
    }

    /// The body of a compound statement: a block, or a single statement
    /// wrapped in a synthetic one.
    pub(crate) fn get_statement(&mut self, labelled: bool) -> ParseResult<Block<'a>> {
        if self.token_type == TokenType::LBrace {
            return self.get_block(true);
        }
        let start = self.start;
        let (frame, ()) = self.in_block(|parser| parser.statement(false, true, labelled))?;
        Ok(self.finish_block(frame, start, BlockFlags::IS_SYNTHETIC))
    }

    fn block_statement(&mut self) -> ParseResult<()> {
        let line = self.line;
        let block = self.get_block(true)?;
        self.append_statement(Statement::Block(BlockStatement {
            range: block.range,
            line,
            block,
        }));
        Ok(())
    }

    /// Close the synthetic block pushed around `statement` and append it.
    fn wrap_in_block(&mut self, statement: Statement<'a>, start: u32, line: u32, flags: BlockFlags) {
        let mut frame = self.context.pop_block();
        frame.statements.push(statement);
        let block = self.finish_block(frame, start, BlockFlags::IS_SYNTHETIC | flags);
        self.append_statement(Statement::Block(BlockStatement {
            range: block.range,
            line,
            block,
        }));
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub(crate) fn variable_statement(&mut self, var_type: TokenType) -> ParseResult<()> {
        let vars = self.variable_declaration_list(var_type, true)?;
        for var in vars {
            self.append_statement(Statement::Var(var));
        }
        self.end_of_line()
    }

    /// `var a = 1, b`, also `let` and `const`. Outside a statement (a for
    /// loop header) `in` is not an operator in the initializers.
    pub(crate) fn variable_declaration_list(
        &mut self,
        var_type: TokenType,
        is_statement: bool,
    ) -> ParseResult<Vec<VarNode<'a>>> {
        self.next()?;
        let flags = match var_type {
            TokenType::Let => VarFlags::IS_LET,
            TokenType::Const => VarFlags::IS_CONST,
            _ => VarFlags::empty(),
        };

        let mut vars = Vec::new();
        let mut missing_assignment = None;
        loop {
            let start = self.start;
            let line = self.line;
            if self.token_type == TokenType::Yield && self.current_function().is_generator() {
                self.expect(TokenType::Ident)?;
            }
            let mut name = self.binding_identifier("variable name")?;

            let mut init = None;
            if self.token_type == TokenType::Assign {
                self.next()?;
                self.push_default_name(Some(name.name));
                let value = self.assignment_expression(!is_statement);
                self.pop_default_name();
                init = Some(value?);
            } else if var_type == TokenType::Const {
                if is_statement {
                    return Err(self.error(&messages::MISSING_CONST_ASSIGNMENT, &[name.name]));
                }
                missing_assignment.get_or_insert(name.name);
            }

            if var_type != TokenType::Var {
                name = name.with_flags(IdentFlags::DECLARED_HERE);
            }
            vars.push(VarNode {
                range: self.range_from(start),
                line,
                name,
                init,
                flags,
            });

            if self.token_type != TokenType::CommaRight {
                break;
            }
            self.next()?;
        }

        // `for (const a; ...)` is the only place an initializer may be left
        // out until the header shows whether it is a for-in loop.
        if let Some(name) = missing_assignment {
            if self.token_type == TokenType::Semicolon {
                return Err(self.error(&messages::MISSING_CONST_ASSIGNMENT, &[name]));
            }
        }
        if var_type != TokenType::Var {
            if let Some(block) = self.context.current_block_mut() {
                block.flags |= BlockFlags::NEEDS_SCOPE;
            }
        }
        Ok(vars)
    }

    /// Whether a `let` token starts a declaration rather than naming a
    /// variable. In a for loop header `let of` is an identifier.
    fn lookahead_is_let_declaration(&mut self, of_contextual: bool) -> ParseResult<bool> {
        let mut i = 1;
        loop {
            let token = self.get_token(self.k + i);
            match token.token_type() {
                TokenType::Eol | TokenType::Comment | TokenType::DirectiveComment => i += 1,
                TokenType::Ident => {
                    return Ok(!(of_contextual && self.options.es6 && self.lexer.token_text(token) == "of"));
                }
                TokenType::LBracket | TokenType::LBrace => return Ok(true),
                other => return Ok(!self.is_strict_mode && other.kind() == TokenKind::FutureStrict),
            }
        }
    }

    // ========================================================================
    // Simple statements
    // ========================================================================

    fn empty_statement(&mut self) -> ParseResult<()> {
        self.append_statement(Statement::Empty(EmptyNode {
            range: Self::token_range(self.token),
            line: self.line,
        }));
        self.next()?;
        Ok(())
    }

    fn expression_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        let expression = self.expression()?;
        self.append_statement(Statement::Expression(ExpressionStatement {
            range: self.range_from(start),
            line,
            expression,
        }));
        self.end_of_line()
    }

    fn debugger_statement(&mut self) -> ParseResult<()> {
        let range = Self::token_range(self.token);
        let line = self.line;
        self.next()?;
        self.end_of_line()?;
        self.append_statement(Statement::Debugger(DebuggerNode { range, line }));
        Ok(())
    }

    /// `( expression )` after `if`, `while`, `with` and `switch`.
    fn parenthesized(&mut self) -> ParseResult<&'a Expression<'a>> {
        self.expect(TokenType::LParen)?;
        let expression = self.expression()?;
        self.expect(TokenType::RParen)?;
        Ok(expression)
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn if_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        self.next()?;
        let test = self.parenthesized()?;
        let pass = self.get_statement(false)?;
        let fail = if self.token_type == TokenType::Else {
            self.next()?;
            Some(self.get_statement(false)?)
        } else {
            None
        };
        self.append_statement(Statement::If(IfNode {
            range: self.range_from(start),
            line,
            test,
            pass,
            fail,
        }));
        Ok(())
    }

    /// Parse a loop inside a loop frame so `break` and `continue` find it.
    fn in_loop<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.with_frame(Frame::Loop, parse)
    }

    fn while_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        let (test, body) = self.in_loop(|parser| {
            parser.next()?;
            let test = parser.parenthesized()?;
            let body = parser.get_statement(false)?;
            Ok((test, body))
        })?;
        self.append_statement(Statement::While(WhileNode {
            range: self.range_from(start),
            line,
            is_do_while: false,
            test,
            body,
        }));
        Ok(())
    }

    fn do_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        let (test, body) = self.in_loop(|parser| {
            parser.next()?;
            let body = parser.get_statement(false)?;
            parser.expect(TokenType::While)?;
            let test = parser.parenthesized()?;
            if parser.token_type == TokenType::Semicolon {
                parser.end_of_line()?;
            }
            Ok((test, body))
        })?;
        self.append_statement(Statement::While(WhileNode {
            range: self.range_from(start),
            line,
            is_do_while: true,
            test,
            body,
        }));
        Ok(())
    }

    /// `for (init; test; modify)`, `for (x in o)`, ES6 `for (x of o)` and
    /// scripting `for each (x in o)`. In ES6 mode the loop is wrapped in a
    /// block holding its `let` and `const` bindings.
    fn for_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        let outer_block = self.options.es6;
        let depth = self.context.depth();
        if outer_block {
            self.push_block();
        }
        let result = self.in_loop(|parser| parser.for_loop(start, line));
        let for_node = match result {
            Ok(for_node) => for_node,
            Err(error) => {
                self.context.truncate(depth);
                return Err(error);
            }
        };
        let statement = Statement::For(for_node);
        if outer_block {
            self.wrap_in_block(statement, start, line, BlockFlags::empty());
        } else {
            self.append_statement(statement);
        }
        Ok(())
    }

    fn for_loop(&mut self, start: u32, line: u32) -> ParseResult<ForNode<'a>> {
        self.next()?;
        let mut flags = ForFlags::empty();
        if self.options.scripting && self.token_type == TokenType::Ident && self.lexer.token_text(self.token) == "each" {
            flags |= ForFlags::IS_FOR_EACH;
            self.next()?;
        }
        self.expect(TokenType::LParen)?;

        let mut vars = None;
        let mut init_expression = None;
        match self.token_type {
            TokenType::Var => vars = Some(self.variable_declaration_list(TokenType::Var, false)?),
            TokenType::Semicolon => {}
            _ => {
                let declaration = self.options.es6
                    && match self.token_type {
                        TokenType::Let => self.lookahead_is_let_declaration(true)?,
                        TokenType::Const => true,
                        _ => false,
                    };
                if declaration {
                    flags |= ForFlags::PER_ITERATION_SCOPE;
                    vars = Some(self.variable_declaration_list(self.token_type, false)?);
                } else {
                    let unary = self.unary_expression()?;
                    init_expression = Some(self.climb(unary, TokenType::CommaRight.precedence(), true)?);
                }
            }
        }

        let is_for_of = self.options.es6
            && self.token_type == TokenType::Ident
            && self.lexer.token_text(self.token) == "of";
        let mut test = None;
        let mut modify = None;
        if self.token_type == TokenType::In || is_for_of {
            let loop_kind = if is_for_of { "of" } else { "in" };
            flags |= if is_for_of { ForFlags::IS_FOR_OF } else { ForFlags::IS_FOR_IN };
            self.verify_for_in_target(vars.as_deref(), init_expression, loop_kind)?;
            self.next()?;
            test = Some(if is_for_of {
                self.assignment_expression(false)?
            } else {
                self.expression()?
            });
        } else {
            if flags.contains(ForFlags::IS_FOR_EACH) {
                return Err(self.error(&messages::FOR_EACH_WITHOUT_IN, &[]));
            }
            self.expect(TokenType::Semicolon)?;
            if self.token_type != TokenType::Semicolon {
                test = Some(self.expression()?);
            }
            self.expect(TokenType::Semicolon)?;
            if self.token_type != TokenType::RParen {
                modify = Some(self.expression()?);
            }
        }
        self.expect(TokenType::RParen)?;
        let body = self.get_statement(false)?;

        let init = match (vars, init_expression) {
            (Some(vars), _) => Some(ForInit::Vars(alloc_vec_in(self.arena, vars))),
            (None, Some(expression)) => Some(ForInit::Expression(expression)),
            (None, None) => None,
        };
        Ok(ForNode {
            range: self.range_from(start),
            line,
            init,
            test,
            modify,
            body,
            flags,
        })
    }

    /// The left side of a for-in/of loop: one declaration without an
    /// initializer, or an assignable expression.
    fn verify_for_in_target(
        &self,
        vars: Option<&[VarNode<'a>]>,
        init: Option<&'a Expression<'a>>,
        loop_kind: &str,
    ) -> ParseResult<()> {
        if let Some(vars) = vars {
            if let Some(extra) = vars.get(1) {
                return Err(self.error_in_range(
                    ParseErrorKind::Syntax,
                    &messages::MANY_VARS_IN_FOR_IN_LOOP,
                    &[loop_kind],
                    extra.range,
                ));
            }
            if let Some(var) = vars.first().filter(|var| var.init.is_some()) {
                return Err(self.error_in_range(
                    ParseErrorKind::Syntax,
                    &messages::FOR_IN_LOOP_INITIALIZER,
                    &[],
                    var.range,
                ));
            }
            return Ok(());
        }

        let Some(init) = init else {
            return Err(self.expected("ident"));
        };
        if !init.is_assignable() {
            return Err(self.error_in_range(
                ParseErrorKind::Syntax,
                &messages::NOT_LVALUE_FOR_IN_LOOP,
                &[loop_kind],
                init.range(),
            ));
        }
        if let Expression::Ident(ident) = init {
            self.verify_strict_ident(ident, &format!("for-{} iterator", loop_kind))?;
        }
        Ok(())
    }

    // ========================================================================
    // Jumps
    // ========================================================================

    fn continue_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        let keyword = self.token;
        self.next_or_eol()?;
        let label = self.jump_label()?;
        let target_found = match label {
            Some(_) => self.context.get_continue_to(label).is_some(),
            None => self.context.is_in_loop(),
        };
        if !target_found {
            return Err(self.error_at(&messages::ILLEGAL_CONTINUE_STMT, &[], keyword));
        }
        self.end_of_line()?;
        self.append_statement(Statement::Continue(JumpNode {
            range: self.range_from(start),
            line,
            label,
        }));
        Ok(())
    }

    fn break_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        let keyword = self.token;
        self.next_or_eol()?;
        let label = self.jump_label()?;
        let target_found = match label {
            Some(_) => self.context.get_breakable(label).is_some(),
            None => self.context.is_in_loop() || self.context.in_unprotected_switch_context(),
        };
        if !target_found {
            return Err(self.error_at(&messages::ILLEGAL_BREAK_STMT, &[], keyword));
        }
        self.end_of_line()?;
        self.append_statement(Statement::Break(JumpNode {
            range: self.range_from(start),
            line,
            label,
        }));
        Ok(())
    }

    /// The optional label after `break` or `continue`, which must name an
    /// enclosing labeled statement.
    fn jump_label(&mut self) -> ParseResult<Option<&'a str>> {
        if matches!(
            self.token_type,
            TokenType::RBrace | TokenType::Semicolon | TokenType::Eol | TokenType::Eof
        ) {
            return Ok(None);
        }
        let ident = self.get_ident()?;
        if self.context.find_label(ident.name).is_none() {
            return Err(self.error_in_range(
                ParseErrorKind::Syntax,
                &messages::UNDEFINED_LABEL,
                &[ident.name],
                ident.range,
            ));
        }
        Ok(Some(ident.name))
    }

    fn return_statement(&mut self) -> ParseResult<()> {
        if matches!(self.current_function().kind, FunctionKind::Script | FunctionKind::Module) {
            return Err(self.error(&messages::INVALID_RETURN, &[]));
        }
        let start = self.start;
        let line = self.line;
        self.next_or_eol()?;
        let expression = match self.token_type {
            TokenType::RBrace | TokenType::Semicolon | TokenType::Eol | TokenType::Eof => None,
            _ => Some(self.expression()?),
        };
        self.end_of_line()?;
        self.append_statement(Statement::Return(ReturnNode {
            range: self.range_from(start),
            line,
            expression,
        }));
        Ok(())
    }

    fn throw_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        self.next_or_eol()?;
        let expression = match self.token_type {
            TokenType::RBrace | TokenType::Semicolon | TokenType::Eol => None,
            _ => Some(self.expression()?),
        };
        let Some(expression) = expression else {
            let found = self.found_text();
            return Err(self.error(&messages::EXPECTED_OPERAND, &[&found]));
        };
        self.end_of_line()?;
        self.append_statement(Statement::Throw(ThrowNode {
            range: self.range_from(start),
            line,
            expression,
        }));
        Ok(())
    }

    // ========================================================================
    // Compound statements
    // ========================================================================

    fn with_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        if self.is_strict_mode {
            return Err(self.error(&messages::STRICT_NO_WITH, &[]));
        }
        self.next()?;
        let expression = self.parenthesized()?;
        let body = self.get_statement(false)?;
        self.current_function_mut().set_flag(FunctionFlags::HAS_WITH);
        self.append_statement(Statement::With(WithNode {
            range: self.range_from(start),
            line,
            expression,
            body,
        }));
        Ok(())
    }

    /// The switch is wrapped in a synthetic block that scopes declarations
    /// made in its clauses.
    fn switch_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        let depth = self.context.depth();
        self.push_block();
        match self.with_frame(Frame::Switch, |parser| parser.switch_clauses(start, line)) {
            Ok(switch) => {
                self.wrap_in_block(Statement::Switch(switch), start, line, BlockFlags::IS_SWITCH_BLOCK);
                Ok(())
            }
            Err(error) => {
                self.context.truncate(depth);
                Err(error)
            }
        }
    }

    fn switch_clauses(&mut self, start: u32, line: u32) -> ParseResult<SwitchNode<'a>> {
        self.next()?;
        let expression = self.parenthesized()?;
        self.expect(TokenType::LBrace)?;

        let mut cases = Vec::new();
        let mut default_case = None;
        while self.token_type != TokenType::RBrace {
            let case_start = self.start;
            let test = match self.token_type {
                TokenType::Case => {
                    self.next()?;
                    Some(self.expression()?)
                }
                TokenType::Default => {
                    if default_case.is_some() {
                        return Err(self.error(&messages::DUPLICATE_DEFAULT_IN_SWITCH, &[]));
                    }
                    self.next()?;
                    default_case = Some(cases.len());
                    None
                }
                _ => return Err(self.expected("case")),
            };
            self.expect(TokenType::Colon)?;
            let body = self.get_block(false)?;
            cases.push(CaseNode {
                range: self.range_from(case_start),
                test,
                body,
            });
        }
        self.next()?;

        Ok(SwitchNode {
            range: self.range_from(start),
            line,
            expression,
            cases: alloc_vec_in(self.arena, cases),
            default_case,
        })
    }

    fn label_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        let ident = self.get_ident()?;
        self.expect(TokenType::Colon)?;
        if self.context.find_label(ident.name).is_some() {
            return Err(self.error_in_range(
                ParseErrorKind::Syntax,
                &messages::DUPLICATE_LABEL,
                &[ident.name],
                ident.range,
            ));
        }

        let body = self.with_frame(Frame::Label(LabelFrame { name: ident.name }), |parser| parser.get_statement(true))?;
        self.append_statement(Statement::Label(LabelNode {
            range: self.range_from(start),
            line,
            label: ident.name,
            body,
        }));
        Ok(())
    }

    /// `try {} catch (e) {} finally {}`. With syntax extensions several
    /// guarded `catch (e if cond)` clauses may precede the final one.
    fn try_statement(&mut self) -> ParseResult<()> {
        let start = self.start;
        let line = self.line;
        let keyword = self.token;
        self.next()?;
        let depth = self.context.depth();
        self.push_block();
        match self.try_clauses(start, line, keyword) {
            Ok(try_node) => {
                self.wrap_in_block(Statement::Try(try_node), start, line, BlockFlags::empty());
                Ok(())
            }
            Err(error) => {
                self.context.truncate(depth);
                Err(error)
            }
        }
    }

    fn try_clauses(&mut self, start: u32, line: u32, keyword: esfront_lexer::Token) -> ParseResult<TryNode<'a>> {
        let body = self.get_block(true)?;

        let mut catches = Vec::new();
        while self.token_type == TokenType::Catch {
            let catch_start = self.start;
            let catch_line = self.line;
            self.next()?;
            self.expect(TokenType::LParen)?;
            let exception = self.get_ident()?;
            self.verify_strict_ident(&exception, "catch argument")?;
            let condition = if self.options.scripting && self.token_type == TokenType::If {
                self.next()?;
                Some(self.expression()?)
            } else {
                None
            };
            self.expect(TokenType::RParen)?;
            let catch_body = self.get_block(true)?;
            catches.push(CatchNode {
                range: self.range_from(catch_start),
                line: catch_line,
                exception,
                condition,
                body: catch_body,
            });
            if condition.is_none() {
                break;
            }
        }

        let finally_body = if self.token_type == TokenType::Finally {
            self.next()?;
            Some(self.get_block(true)?)
        } else {
            None
        };
        if catches.is_empty() && finally_body.is_none() {
            return Err(self.error_at(&messages::MISSING_CATCH_OR_FINALLY, &[], keyword));
        }

        Ok(TryNode {
            range: self.range_from(start),
            line,
            body,
            catches: alloc_vec_in(self.arena, catches),
            finally_body,
        })
    }
}
