//! Expressions: operator precedence climbing, unary and postfix operators,
//! member and call chains, primary expressions, templates and `yield`.
//!
//! Binary operators are parsed by climbing on [`TokenType::precedence`]. The
//! assignment level sits above the climb so that arrow functions and `yield`
//! are recognised where they may appear.

use crate::parser::{alloc_vec_in, Parser};
use esfront_ast::*;
use esfront_core::TextRange;
use esfront_diagnostics::{messages, ParseErrorKind, ParseResult};
use esfront_lexer::{Token, TokenValue};

/// Callee of the call a scripting exec string turns into.
const EXEC_NAME: &str = "$EXEC";

impl<'a> Parser<'a> {
    // ========================================================================
    // Comma and assignment
    // ========================================================================

    pub(crate) fn expression(&mut self) -> ParseResult<&'a Expression<'a>> {
        self.comma_expression(false)
    }

    /// `a, b, c`. In ES6 mode a trailing `...rest` is allowed when the list
    /// turns out to be arrow function parameters.
    pub(crate) fn comma_expression(&mut self, no_in: bool) -> ParseResult<&'a Expression<'a>> {
        let mut lhs = self.assignment_expression(no_in)?;
        while self.token_type == TokenType::CommaRight {
            self.next()?;
            let mut rest = false;
            if self.options.es6 && self.token_type == TokenType::Ellipsis && self.rest_parameter_end_of_arrow_list()? {
                self.next()?;
                rest = true;
            }
            let mut rhs = self.assignment_expression(no_in)?;
            if rest {
                let Expression::Ident(ident) = rhs else {
                    return Err(self.expected("ident"));
                };
                rhs = self.alloc_expression(Expression::Ident(ident.with_flags(IdentFlags::REST_PARAMETER)));
            }
            lhs = self.binary(TokenType::CommaRight, lhs, rhs);
        }
        Ok(lhs)
    }

    /// Whether `... ident ) =>` follows, line breaks and comments allowed
    /// everywhere except before the arrow.
    fn rest_parameter_end_of_arrow_list(&mut self) -> ParseResult<bool> {
        let mut i = 1;
        for (wanted, skip_eol) in [
            (TokenType::Ident, true),
            (TokenType::RParen, true),
            (TokenType::Arrow, false),
        ] {
            loop {
                let token_type = self.t(self.k + i);
                i += 1;
                if token_type == wanted {
                    break;
                }
                let skipped = matches!(token_type, TokenType::Comment | TokenType::DirectiveComment)
                    || (skip_eol && token_type == TokenType::Eol);
                if !skipped {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    pub(crate) fn assignment_expression(&mut self, no_in: bool) -> ParseResult<&'a Expression<'a>> {
        self.enter()?;
        let result = self.assignment_expression_inner(no_in);
        self.leave();
        result
    }

    fn assignment_expression_inner(&mut self, no_in: bool) -> ParseResult<&'a Expression<'a>> {
        if self.options.es6 && self.token_type == TokenType::Yield && self.current_function().is_generator() {
            return self.yield_expression(no_in);
        }

        let start = self.start;
        let line = self.line;
        let unary = self.unary_expression()?;
        let lhs = self.climb(unary, TokenType::Ternary.precedence(), no_in)?;

        if self.token_type == TokenType::Arrow && self.options.es6 && self.last != TokenType::Eol {
            return self.arrow_function(start, line, lhs);
        }

        let op = self.token_type;
        if !op.is_assignment() {
            return Ok(lhs);
        }
        let is_assign = op == TokenType::Assign;
        if is_assign {
            self.push_default_name(Self::default_name_of(lhs));
        }
        let rhs = self.next().and_then(|_| self.assignment_expression(no_in));
        if is_assign {
            self.pop_default_name();
        }
        self.verify_assignment(op, lhs, rhs?)
    }

    /// Fold binary operators of precedence `min_precedence` or higher onto
    /// `lhs`. `in` is not an operator while `no_in` is set.
    pub(crate) fn climb(
        &mut self,
        lhs: &'a Expression<'a>,
        min_precedence: u8,
        no_in: bool,
    ) -> ParseResult<&'a Expression<'a>> {
        let mut lhs = lhs;
        let mut op = self.token_type;
        while op.is_operator(no_in) && op.precedence() >= min_precedence {
            self.next()?;
            if op == TokenType::Ternary {
                lhs = self.ternary(lhs, no_in)?;
            } else {
                let is_assign = op == TokenType::Assign;
                if is_assign {
                    self.push_default_name(Self::default_name_of(lhs));
                }
                let rhs = self.climb_rhs(op.precedence(), no_in);
                if is_assign {
                    self.pop_default_name();
                }
                lhs = self.verify_assignment(op, lhs, rhs?)?;
            }
            op = self.token_type;
        }
        Ok(lhs)
    }

    /// The right operand of an operator of `precedence`: everything that
    /// binds tighter, or as tight and to the right.
    fn climb_rhs(&mut self, precedence: u8, no_in: bool) -> ParseResult<&'a Expression<'a>> {
        let mut rhs = self.unary_expression()?;
        loop {
            let next = self.token_type;
            let next_precedence = next.precedence();
            let binds = next_precedence > precedence || (next_precedence == precedence && !next.is_left_associative());
            if !next.is_operator(no_in) || !binds {
                return Ok(rhs);
            }
            rhs = self.climb(rhs, next_precedence, no_in)?;
        }
    }

    /// `test ? a : b`, entered after the `?`.
    fn ternary(&mut self, test: &'a Expression<'a>, no_in: bool) -> ParseResult<&'a Expression<'a>> {
        self.enter()?;
        let result = self.ternary_branches(test, no_in);
        self.leave();
        result
    }

    fn ternary_branches(&mut self, test: &'a Expression<'a>, no_in: bool) -> ParseResult<&'a Expression<'a>> {
        let assign = TokenType::Assign.precedence();
        let unary = self.unary_expression()?;
        let true_expression = self.climb(unary, assign, false)?;
        self.expect(TokenType::Colon)?;
        let unary = self.unary_expression()?;
        let false_expression = self.climb(unary, assign, no_in)?;
        Ok(self.alloc_expression(Expression::Ternary(TernaryNode {
            range: TextRange::new(test.range().pos, false_expression.range().end),
            test,
            true_expression,
            false_expression,
        })))
    }

    /// Check the target of an assignment operator and build the node.
    pub(crate) fn verify_assignment(
        &self,
        op: TokenType,
        lhs: &'a Expression<'a>,
        rhs: &'a Expression<'a>,
    ) -> ParseResult<&'a Expression<'a>> {
        if op.is_assignment() {
            if !lhs.is_assignable() {
                return Err(self.error_in_range(
                    ParseErrorKind::Reference,
                    &messages::INVALID_LVALUE,
                    &[],
                    lhs.range(),
                ));
            }
            if let Expression::Ident(ident) = lhs {
                self.verify_strict_ident(ident, "assignment")?;
            }
        }
        Ok(self.binary(op, lhs, rhs))
    }

    pub(crate) fn binary(&self, op: TokenType, lhs: &'a Expression<'a>, rhs: &'a Expression<'a>) -> &'a Expression<'a> {
        self.alloc_expression(Expression::Binary(BinaryNode {
            range: TextRange::new(lhs.range().pos, rhs.range().end),
            op,
            lhs,
            rhs,
        }))
    }

    // ========================================================================
    // Unary and postfix
    // ========================================================================

    pub(crate) fn unary_expression(&mut self) -> ParseResult<&'a Expression<'a>> {
        let start = self.start;
        let op = self.token_type;
        match op {
            TokenType::Delete
            | TokenType::Void
            | TokenType::TypeOf
            | TokenType::Add
            | TokenType::Sub
            | TokenType::BitNot
            | TokenType::Not => {
                self.next()?;
                self.enter()?;
                let operand = self.unary_expression();
                self.leave();
                let operand = operand?;
                if op == TokenType::Delete && self.is_strict_mode {
                    if let Expression::Ident(ident) = operand {
                        return Err(self.error_in_range(
                            ParseErrorKind::Syntax,
                            &messages::STRICT_CANT_DELETE_IDENT,
                            &[ident.name],
                            ident.range,
                        ));
                    }
                }
                Ok(self.unary(op, start, operand))
            }
            TokenType::IncPrefix | TokenType::DecPrefix => {
                self.next()?;
                let Some(operand) = self.left_hand_side_expression()? else {
                    let found = self.token_type.name_or_type();
                    return Err(self.error(&messages::EXPECTED_LVALUE, &[&found]));
                };
                self.verify_inc_dec(op, operand)?;
                Ok(self.unary(op, start, operand))
            }
            _ => {
                let expression = self.left_hand_side_expression()?;
                if self.last != TokenType::Eol
                    && matches!(self.token_type, TokenType::IncPrefix | TokenType::DecPrefix)
                {
                    let found = self.token_type.name_or_type();
                    let Some(operand) = expression else {
                        return Err(self.error(&messages::EXPECTED_LVALUE, &[&found]));
                    };
                    let postfix = if self.token_type == TokenType::IncPrefix {
                        TokenType::IncPostfix
                    } else {
                        TokenType::DecPostfix
                    };
                    self.verify_inc_dec(postfix, operand)?;
                    self.next()?;
                    return Ok(self.unary(postfix, operand.range().pos, operand));
                }
                match expression {
                    Some(expression) => Ok(expression),
                    None => {
                        let found = self.token_type.name_or_type();
                        Err(self.error(&messages::EXPECTED_OPERAND, &[&found]))
                    }
                }
            }
        }
    }

    fn unary(&self, op: TokenType, start: u32, expression: &'a Expression<'a>) -> &'a Expression<'a> {
        self.alloc_expression(Expression::Unary(UnaryNode {
            range: self.range_from(start),
            op,
            expression,
        }))
    }

    fn verify_inc_dec(&self, op: TokenType, operand: &'a Expression<'a>) -> ParseResult<()> {
        if !operand.is_assignable() {
            return Err(self.error_in_range(
                ParseErrorKind::Reference,
                &messages::INVALID_LVALUE,
                &[],
                operand.range(),
            ));
        }
        if let Expression::Ident(ident) = operand {
            let context_name = format!("operand for {} operator", op.name().unwrap_or_default());
            self.verify_strict_ident(ident, &context_name)?;
        }
        Ok(())
    }

    // ========================================================================
    // Member and call chains
    // ========================================================================

    /// A member expression followed by any mix of calls, property accesses
    /// and tagged templates. The first call of a plain `eval` marks the
    /// enclosing functions.
    pub(crate) fn left_hand_side_expression(&mut self) -> ParseResult<Option<&'a Expression<'a>>> {
        self.enter()?;
        let result = self.call_chain();
        self.leave();
        result
    }

    fn call_chain(&mut self) -> ParseResult<Option<&'a Expression<'a>>> {
        let line = self.line;
        let Some(mut lhs) = self.member_expression()? else {
            return Ok(None);
        };

        if self.token_type == TokenType::LParen {
            let args = self.argument_list()?;
            if matches!(lhs, Expression::Ident(ident) if ident.name == "eval") {
                self.mark_eval();
            }
            lhs = self.call(lhs, line, args, false);
        }

        loop {
            let line = self.line;
            lhs = match self.token_type {
                TokenType::LParen => {
                    let args = self.argument_list()?;
                    self.call(lhs, line, args, false)
                }
                TokenType::LBracket => self.index_suffix(lhs)?,
                TokenType::Period => self.access_suffix(lhs)?,
                TokenType::Template | TokenType::TemplateHead => {
                    let args = self.template_argument_list()?;
                    self.call(lhs, line, args, false)
                }
                _ => return Ok(Some(lhs)),
            };
        }
    }

    fn member_expression(&mut self) -> ParseResult<Option<&'a Expression<'a>>> {
        let lhs = match self.token_type {
            TokenType::New => self.new_expression()?,
            TokenType::Function => {
                let function = self.function_expression(false, false)?;
                Some(self.alloc_expression(Expression::Function(function)))
            }
            TokenType::Class if self.options.es6 => {
                let class = self.class_expression(false)?;
                Some(self.alloc_expression(Expression::Class(class)))
            }
            TokenType::Super if self.options.es6 => Some(self.super_expression()?),
            _ => self.primary_expression()?,
        };
        let Some(mut lhs) = lhs else {
            return Ok(None);
        };

        loop {
            let line = self.line;
            lhs = match self.token_type {
                TokenType::LBracket => self.index_suffix(lhs)?,
                TokenType::Period => self.access_suffix(lhs)?,
                TokenType::Template | TokenType::TemplateHead => {
                    let args = self.template_argument_list()?;
                    self.call(lhs, line, args, false)
                }
                _ => return Ok(Some(lhs)),
            };
        }
    }

    /// `super.name` and `super[index]` inside a method, `super(args)`
    /// inside the constructor of a derived class.
    fn super_expression(&mut self) -> ParseResult<&'a Expression<'a>> {
        let token = self.token;
        let range = Self::token_range(token);
        let flags = self.non_arrow_function_flags();
        self.next()?;

        if flags.contains(FunctionFlags::IS_METHOD) {
            let ident = IdentNode::new(range, "super");
            match self.token_type {
                TokenType::Period | TokenType::LBracket => {
                    self.mark_non_arrow_function(FunctionFlags::USES_SUPER);
                    return Ok(self.alloc_expression(Expression::Ident(ident)));
                }
                TokenType::LParen if flags.contains(FunctionFlags::IS_SUBCLASS_CONSTRUCTOR) => {
                    self.mark_non_arrow_function(FunctionFlags::HAS_DIRECT_SUPER);
                    let ident = ident.with_flags(IdentFlags::DIRECT_SUPER);
                    return Ok(self.alloc_expression(Expression::Ident(ident)));
                }
                _ => {}
            }
        }
        Err(self.error_at(&messages::INVALID_SUPER, &[], token))
    }

    /// `[index]` after `base`.
    fn index_suffix(&mut self, base: &'a Expression<'a>) -> ParseResult<&'a Expression<'a>> {
        self.next()?;
        let index = self.expression()?;
        self.expect(TokenType::RBracket)?;
        Ok(self.alloc_expression(Expression::Index(IndexNode {
            range: self.range_from(base.range().pos),
            base,
            index,
        })))
    }

    /// `.name` after `base`. Reserved words are valid property names.
    fn access_suffix(&mut self, base: &'a Expression<'a>) -> ParseResult<&'a Expression<'a>> {
        self.next()?;
        let property = self.get_identifier_name()?;
        Ok(self.alloc_expression(Expression::Access(AccessNode {
            range: self.range_from(base.range().pos),
            base,
            property,
        })))
    }

    fn call(
        &self,
        function: &'a Expression<'a>,
        line: u32,
        args: &'a [Expression<'a>],
        is_new: bool,
    ) -> &'a Expression<'a> {
        self.alloc_expression(Expression::Call(CallNode {
            range: self.range_from(function.range().pos),
            line,
            function,
            args,
            is_new,
        }))
    }

    /// `new Ctor(args)`; the argument list may be left out. With syntax
    /// extensions an object literal after the arguments is one more argument.
    fn new_expression(&mut self) -> ParseResult<Option<&'a Expression<'a>>> {
        self.enter()?;
        let result = self.new_call();
        self.leave();
        result
    }

    fn new_call(&mut self) -> ParseResult<Option<&'a Expression<'a>>> {
        let start = self.start;
        let new_token = self.token;
        self.next()?;
        if self.options.es6 && self.token_type == TokenType::Period {
            return self.new_target(start, new_token).map(Some);
        }
        let line = self.line;
        let Some(constructor) = self.member_expression()? else {
            return Ok(None);
        };

        let mut args = Vec::new();
        if self.token_type == TokenType::LParen {
            args.extend_from_slice(self.argument_list()?);
        }
        if self.options.scripting && self.token_type == TokenType::LBrace {
            args.push(*self.object_literal()?);
        }

        Ok(Some(self.alloc_expression(Expression::Call(CallNode {
            range: self.range_from(start),
            line,
            function: constructor,
            args: alloc_vec_in(self.arena, args),
            is_new: true,
        }))))
    }

    /// `new.target`, entered at the `.`. Only valid inside a function.
    fn new_target(&mut self, start: u32, new_token: Token) -> ParseResult<&'a Expression<'a>> {
        self.next()?;
        if self.token_type != TokenType::Ident || self.lexer.token_text(self.token) != "target" {
            return Err(self.expected("target"));
        }
        if self.non_arrow_function_flags().contains(FunctionFlags::IS_PROGRAM) {
            return Err(self.error_at(&messages::NEW_TARGET_IN_FUNCTION, &[], new_token));
        }
        self.next()?;
        self.mark_non_arrow_function(FunctionFlags::USES_NEW_TARGET);
        Ok(self.alloc_expression(Expression::Ident(IdentNode::new(
            self.range_from(start),
            "new.target",
        ))))
    }

    /// `( args )`, with `...spread` arguments in ES6 mode.
    fn argument_list(&mut self) -> ParseResult<&'a [Expression<'a>]> {
        self.next()?;
        let mut args = Vec::new();
        let mut first = true;
        while self.token_type != TokenType::RParen {
            if !first {
                self.expect(TokenType::CommaRight)?;
            }
            first = false;

            let spread_start = (self.options.es6 && self.token_type == TokenType::Ellipsis).then_some(self.start);
            if spread_start.is_some() {
                self.next()?;
            }
            let mut argument = self.assignment_expression(false)?;
            if let Some(start) = spread_start {
                argument = self.unary(TokenType::Spread, start, argument);
            }
            args.push(*argument);
        }
        self.expect(TokenType::RParen)?;
        Ok(alloc_vec_in(self.arena, args))
    }

    // ========================================================================
    // Primary expressions
    // ========================================================================

    /// `None` when the current token cannot start an expression.
    pub(crate) fn primary_expression(&mut self) -> ParseResult<Option<&'a Expression<'a>>> {
        let expression = match self.token_type {
            TokenType::This => {
                let range = Self::token_range(self.token);
                self.next()?;
                self.mark_this();
                Expression::This(range)
            }
            TokenType::Ident => {
                let ident = self.get_ident()?;
                if ident.name == "arguments" {
                    self.mark_arguments();
                }
                Expression::Ident(ident)
            }
            TokenType::OctalLegacy if self.is_strict_mode => {
                return Err(self.error(&messages::STRICT_NO_OCTAL, &[]));
            }
            TokenType::String
            | TokenType::EscString
            | TokenType::Decimal
            | TokenType::Hexadecimal
            | TokenType::OctalLegacy
            | TokenType::Octal
            | TokenType::BinaryNumber
            | TokenType::Floating
            | TokenType::Regex
            | TokenType::Xml => Expression::Literal(self.get_literal()?),
            TokenType::ExecString => return self.exec_string().map(Some),
            TokenType::True | TokenType::False | TokenType::Null => {
                let value = match self.token_type {
                    TokenType::True => LiteralValue::Boolean(true),
                    TokenType::False => LiteralValue::Boolean(false),
                    _ => LiteralValue::Null,
                };
                let literal = LiteralNode {
                    range: Self::token_range(self.token),
                    value,
                    token_type: self.token_type,
                };
                self.next()?;
                Expression::Literal(literal)
            }
            TokenType::LBracket => return self.array_literal().map(Some),
            TokenType::LBrace => return self.object_literal().map(Some),
            TokenType::LParen => return self.parenthesized_expression().map(Some),
            TokenType::Template | TokenType::TemplateHead => return self.template_literal().map(Some),
            _ => {
                if self.lexer.scan_literal(&mut self.stream, self.token, self.token_type)? {
                    self.next()?;
                    Expression::Literal(self.get_literal()?)
                } else if self.is_non_strict_mode_ident() {
                    Expression::Ident(self.get_ident()?)
                } else {
                    return Ok(None);
                }
            }
        };
        Ok(Some(self.alloc_expression(expression)))
    }

    /// `( expression )`. In ES6 mode `()` and `(...rest)` are only valid as
    /// arrow parameters and must be followed by `=>`.
    fn parenthesized_expression(&mut self) -> ParseResult<&'a Expression<'a>> {
        let start = self.start;
        self.next()?;
        if self.options.es6 {
            match self.token_type {
                TokenType::RParen => {
                    self.next_or_eol()?;
                    self.expect_dont_advance(TokenType::Arrow)?;
                    return Ok(self.alloc_expression(Expression::Error(ErrorNode {
                        range: self.range_from(start),
                    })));
                }
                TokenType::Ellipsis => {
                    self.next()?;
                    let ident = self.binding_identifier("function parameter")?;
                    self.expect_dont_advance(TokenType::RParen)?;
                    self.next_or_eol()?;
                    self.expect_dont_advance(TokenType::Arrow)?;
                    return Ok(self.alloc_expression(Expression::Ident(ident.with_flags(IdentFlags::REST_PARAMETER))));
                }
                _ => {}
            }
        }
        let expression = self.expression()?;
        self.expect(TokenType::RParen)?;
        Ok(expression)
    }

    /// The literal at the current token, then advance.
    pub(crate) fn get_literal(&mut self) -> ParseResult<LiteralNode<'a>> {
        let token = self.token;
        let value = match self.get_value(token)? {
            TokenValue::Number(number) => LiteralValue::Number(number),
            TokenValue::String(value) => LiteralValue::String(self.alloc_str(&value)),
            TokenValue::Regex { pattern, flags } => LiteralValue::Regex {
                pattern: self.alloc_str(&pattern),
                flags: self.alloc_str(&flags),
            },
            TokenValue::None => LiteralValue::String(self.alloc_str(&self.lexer.token_text(token))),
        };
        self.next()?;
        Ok(LiteralNode {
            range: Self::token_range(token),
            value,
            token_type: token.token_type(),
        })
    }

    /// `` `cmd ${arg}` `` in scripting mode: a call of `$EXEC` with the
    /// command string.
    fn exec_string(&mut self) -> ParseResult<&'a Expression<'a>> {
        let start = self.start;
        let line = self.line;
        let callee_range = Self::token_range(self.token);
        self.next()?;
        self.expect(TokenType::LBrace)?;
        let command = self.expression()?;
        self.expect(TokenType::RBrace)?;

        let function = self.alloc_expression(Expression::Ident(IdentNode::new(callee_range, EXEC_NAME)));
        Ok(self.alloc_expression(Expression::Call(CallNode {
            range: self.range_from(start),
            line,
            function,
            args: self.arena.alloc_slice_copy(&[*command]),
            is_new: false,
        })))
    }

    /// `void 0`, standing in for a missing value.
    pub(crate) fn undefined_literal(&self, range: TextRange) -> &'a Expression<'a> {
        let zero = self.alloc_expression(Expression::Literal(LiteralNode {
            range,
            value: LiteralValue::Number(Number::Integer(0)),
            token_type: TokenType::Decimal,
        }));
        self.alloc_expression(Expression::Unary(UnaryNode {
            range,
            op: TokenType::Void,
            expression: zero,
        }))
    }

    /// `yield`, `yield value` or `yield* iterable` inside a generator.
    fn yield_expression(&mut self, no_in: bool) -> ParseResult<&'a Expression<'a>> {
        let start = self.start;
        let yield_range = Self::token_range(self.token);
        self.next_or_eol()?;

        let mut op = TokenType::Yield;
        if self.token_type == TokenType::Mul {
            op = TokenType::YieldStar;
            self.next()?;
        }

        let ends_operand = matches!(
            self.token_type,
            TokenType::RBrace
                | TokenType::RBracket
                | TokenType::RParen
                | TokenType::CommaRight
                | TokenType::Semicolon
                | TokenType::Eof
                | TokenType::Eol
                | TokenType::Colon
        );
        let operand = if ends_operand && op == TokenType::Yield {
            if self.token_type == TokenType::Eol {
                self.next()?;
            }
            self.undefined_literal(yield_range)
        } else {
            self.assignment_expression(no_in)?
        };
        Ok(self.unary(op, start, operand))
    }

    // ========================================================================
    // Templates
    // ========================================================================

    /// An untagged template: a string, or its parts joined with `+`.
    fn template_literal(&mut self) -> ParseResult<&'a Expression<'a>> {
        let no_substitutions = self.token_type == TokenType::Template;
        let head = self.get_literal()?;
        let mut concat = self.alloc_expression(Expression::Literal(head));
        if no_substitutions {
            return Ok(concat);
        }
        loop {
            let substitution = self.expression()?;
            self.expect_template_continuation()?;
            concat = self.binary(TokenType::Add, concat, substitution);
            let last_part = self.token_type;
            let part = self.get_literal()?;
            let literal = self.alloc_expression(Expression::Literal(part));
            concat = self.binary(TokenType::Add, concat, literal);
            if last_part != TokenType::TemplateMiddle {
                return Ok(concat);
            }
        }
    }

    fn expect_template_continuation(&self) -> ParseResult<()> {
        if !matches!(self.token_type, TokenType::TemplateMiddle | TokenType::TemplateTail) {
            return Err(self.error(&messages::UNTERMINATED_TEMPLATE_EXPRESSION, &[]));
        }
        Ok(())
    }

    /// Arguments of a tagged template call: the template object built from
    /// the raw and cooked strings, then the substitutions.
    fn template_argument_list(&mut self) -> ParseResult<&'a [Expression<'a>]> {
        let start = self.start;
        let has_substitutions = self.token_type == TokenType::TemplateHead;
        let mut raw = Vec::new();
        let mut cooked = Vec::new();
        let mut substitutions = Vec::new();

        self.add_template_string(&mut raw, &mut cooked)?;
        if has_substitutions {
            loop {
                let substitution = self.expression()?;
                self.expect_template_continuation()?;
                substitutions.push(*substitution);
                let last_part = self.token_type;
                self.add_template_string(&mut raw, &mut cooked)?;
                if last_part != TokenType::TemplateMiddle {
                    break;
                }
            }
        }

        let range = self.range_from(start);
        let strings = [raw, cooked].map(|elements| {
            Expression::Array(ArrayLiteralNode {
                range,
                elements: alloc_vec_in(self.arena, elements),
            })
        });
        let template_object = Expression::Runtime(RuntimeNode {
            range,
            request: RuntimeRequest::GetTemplateObject,
            args: self.arena.alloc_slice_copy(&strings),
        });

        let mut args = Vec::with_capacity(substitutions.len() + 1);
        args.push(template_object);
        args.extend(substitutions);
        Ok(alloc_vec_in(self.arena, args))
    }

    fn add_template_string(
        &mut self,
        raw: &mut Vec<Option<Expression<'a>>>,
        cooked: &mut Vec<Option<Expression<'a>>>,
    ) -> ParseResult<()> {
        let token = self.token;
        let raw_value = self.alloc_str(&self.lexer.value_of_raw_string(token));
        let cooked_literal = self.get_literal()?;
        raw.push(Some(Expression::Literal(LiteralNode {
            value: LiteralValue::String(raw_value),
            ..cooked_literal
        })));
        cooked.push(Some(Expression::Literal(cooked_literal)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parser::{parse_script, ParseOutcome};
    use bumpalo::Bump;
    use esfront_ast::*;
    use esfront_core::Source;

    fn parse<'a>(arena: &'a Bump, source: &'a Source, options: ParserOptions) -> ParseOutcome<'a> {
        parse_script(arena, source, options).unwrap()
    }

    /// The expression of the first statement.
    fn first_expression<'a>(outcome: &ParseOutcome<'a>) -> &'a Expression<'a> {
        match outcome.program.body.statements[0] {
            Statement::Expression(statement) => statement.expression,
            other => panic!("expected an expression statement, found {:?}", other),
        }
    }

    fn es6() -> ParserOptions {
        ParserOptions {
            es6: true,
            ..Default::default()
        }
    }

    fn first_error_code(text: &str, options: ParserOptions) -> u32 {
        let arena = Bump::new();
        let source = Source::new("test.js", text);
        let outcome = parse(&arena, &source, options);
        assert!(outcome.has_errors(), "expected an error for {:?}", text);
        outcome.diagnostics.diagnostics()[0].code
    }

    #[test]
    fn test_precedence_and_associativity() {
        let arena = Bump::new();
        let source = Source::new("test.js", "a + b * c - d;");
        let outcome = parse(&arena, &source, ParserOptions::default());
        let Expression::Binary(sub) = first_expression(&outcome) else {
            panic!("expected a binary expression");
        };
        assert_eq!(sub.op, TokenType::Sub);
        let Expression::Binary(add) = sub.lhs else {
            panic!("expected a binary expression");
        };
        assert_eq!(add.op, TokenType::Add);
        assert!(matches!(add.rhs, Expression::Binary(BinaryNode { op: TokenType::Mul, .. })));
        assert_eq!(sub.range.pos, 0);
        assert_eq!(sub.range.end, 13);
    }

    #[test]
    fn test_new_target() {
        let arena = Bump::new();
        let source = Source::new("test.js", "function F() { return () => new.target.name; }");
        let outcome = parse(&arena, &source, es6());
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        let functions = visitor::collect_functions(outcome.program);
        let f = functions.iter().find(|f| f.name == "F").unwrap();
        assert!(f.flags.contains(FunctionFlags::USES_NEW_TARGET));
        let arrow = functions.iter().find(|f| f.kind == FunctionKind::Arrow).unwrap();
        assert!(!arrow.flags.contains(FunctionFlags::USES_NEW_TARGET));

        assert_eq!(first_error_code("new.target;", es6()), 1132);
        assert_eq!(first_error_code("x = () => new.target;", es6()), 1132);
        assert_eq!(first_error_code("function f() { new.tar; }", es6()), 1100);
    }

    #[test]
    fn test_super_outside_methods() {
        assert_eq!(first_error_code("super.x;", es6()), 1131);
        assert_eq!(first_error_code("x = { m: function() { super.x; } };", es6()), 1131);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let arena = Bump::new();
        let source = Source::new("test.js", "a = b = c;");
        let outcome = parse(&arena, &source, ParserOptions::default());
        let Expression::Binary(outer) = first_expression(&outcome) else {
            panic!("expected an assignment");
        };
        assert_eq!(outer.op, TokenType::Assign);
        assert!(matches!(outer.rhs, Expression::Binary(BinaryNode { op: TokenType::Assign, .. })));
    }

    #[test]
    fn test_ternary_nests_in_false_branch() {
        let arena = Bump::new();
        let source = Source::new("test.js", "a ? b : c ? d : e;");
        let outcome = parse(&arena, &source, ParserOptions::default());
        let Expression::Ternary(outer) = first_expression(&outcome) else {
            panic!("expected a ternary");
        };
        assert!(matches!(outer.false_expression, Expression::Ternary(_)));
    }

    #[test]
    fn test_postfix_needs_same_line() {
        let arena = Bump::new();
        let source = Source::new("test.js", "a\n++b");
        let outcome = parse(&arena, &source, ParserOptions::default());
        assert!(!outcome.has_errors());
        let statements = outcome.program.body.statements;
        assert_eq!(statements.len(), 2);
        match statements[1] {
            Statement::Expression(ExpressionStatement {
                expression: Expression::Unary(unary),
                ..
            }) => assert_eq!(unary.op, TokenType::IncPrefix),
            other => panic!("expected a prefix increment, found {:?}", other),
        }
    }

    #[test]
    fn test_postfix_operator_recast() {
        let arena = Bump::new();
        let source = Source::new("test.js", "i--;");
        let outcome = parse(&arena, &source, ParserOptions::default());
        let Expression::Unary(unary) = first_expression(&outcome) else {
            panic!("expected a unary expression");
        };
        assert_eq!(unary.op, TokenType::DecPostfix);
        assert_eq!(unary.range.end, 3);
    }

    #[test]
    fn test_invalid_assignment_targets() {
        assert_eq!(first_error_code("1 = a;", ParserOptions::default()), 1300);
        assert_eq!(first_error_code("a + b++;\n(a + b)++;", ParserOptions::default()), 1300);
        assert_eq!(first_error_code("++;", ParserOptions::default()), 1103);
    }

    #[test]
    fn test_strict_assignment_to_eval() {
        assert_eq!(first_error_code("'use strict'; eval = 1;", ParserOptions::default()), 1200);
        assert_eq!(first_error_code("'use strict'; arguments++;", ParserOptions::default()), 1200);
        assert_eq!(first_error_code("'use strict'; delete x;", ParserOptions::default()), 1204);
    }

    #[test]
    fn test_member_call_chain() {
        let arena = Bump::new();
        let source = Source::new("test.js", "a.b(1)[c].d();");
        let outcome = parse(&arena, &source, ParserOptions::default());
        let Expression::Call(call) = first_expression(&outcome) else {
            panic!("expected a call");
        };
        assert!(call.args.is_empty());
        let Expression::Access(access) = call.function else {
            panic!("expected an access");
        };
        assert_eq!(access.property.name, "d");
        assert!(matches!(access.base, Expression::Index(_)));
        assert_eq!(call.range.pos, 0);
    }

    #[test]
    fn test_reserved_word_property_name() {
        let arena = Bump::new();
        let source = Source::new("test.js", "a.default.if;");
        let outcome = parse(&arena, &source, ParserOptions::default());
        assert!(!outcome.has_errors());
        let Expression::Access(access) = first_expression(&outcome) else {
            panic!("expected an access");
        };
        assert_eq!(access.property.name, "if");
        assert!(access.property.flags.contains(IdentFlags::PROPERTY_NAME));
    }

    #[test]
    fn test_new_without_arguments() {
        let arena = Bump::new();
        let source = Source::new("test.js", "new Foo;\nnew a.B(1, 2);");
        let outcome = parse(&arena, &source, ParserOptions::default());
        assert!(!outcome.has_errors());
        let Expression::Call(call) = first_expression(&outcome) else {
            panic!("expected a constructor call");
        };
        assert!(call.is_new);
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_new_with_trailing_object_literal_in_scripting_mode() {
        let arena = Bump::new();
        let source = Source::new("test.js", "x = new Runnable() { run: f };");
        let options = ParserOptions {
            scripting: true,
            ..Default::default()
        };
        let outcome = parse(&arena, &source, options);
        assert!(!outcome.has_errors());
        let Expression::Binary(assign) = first_expression(&outcome) else {
            panic!("expected an assignment");
        };
        let Expression::Call(call) = assign.rhs else {
            panic!("expected a constructor call");
        };
        assert_eq!(call.args.len(), 1);
        assert!(matches!(call.args[0], Expression::Object(_)));
    }

    #[test]
    fn test_eval_call_marks_functions() {
        let arena = Bump::new();
        let source = Source::new("test.js", "function f() { function g() { eval('1'); } }");
        let outcome = parse(&arena, &source, ParserOptions::default());
        let functions = visitor::collect_functions(outcome.program);
        let f = functions.iter().find(|f| f.name == "f").unwrap();
        let g = functions.iter().find(|f| f.name == "f$g").unwrap();
        assert!(g.flags.contains(FunctionFlags::HAS_EVAL));
        assert!(f.flags.contains(FunctionFlags::HAS_NESTED_EVAL));
        assert!(!f.flags.contains(FunctionFlags::HAS_EVAL));
    }

    #[test]
    fn test_regex_rescanned_in_operand_position() {
        let arena = Bump::new();
        let source = Source::new("test.js", "x = /ab+c/gi;");
        let outcome = parse(&arena, &source, ParserOptions::default());
        assert!(!outcome.has_errors());
        let Expression::Binary(assign) = first_expression(&outcome) else {
            panic!("expected an assignment");
        };
        match assign.rhs {
            Expression::Literal(LiteralNode {
                value: LiteralValue::Regex { pattern, flags },
                ..
            }) => {
                assert_eq!(*pattern, "ab+c");
                assert_eq!(*flags, "gi");
            }
            other => panic!("expected a regex literal, found {:?}", other),
        }
    }

    #[test]
    fn test_division_is_not_rescanned() {
        let arena = Bump::new();
        let source = Source::new("test.js", "a / b / c;");
        let outcome = parse(&arena, &source, ParserOptions::default());
        assert!(!outcome.has_errors());
        assert!(matches!(
            first_expression(&outcome),
            Expression::Binary(BinaryNode { op: TokenType::Div, .. })
        ));
    }

    #[test]
    fn test_template_literal_desugars_to_concatenation() {
        let arena = Bump::new();
        let source = Source::new("test.js", "`a${b}c`;");
        let outcome = parse(&arena, &source, es6());
        assert!(!outcome.has_errors());
        let Expression::Binary(outer) = first_expression(&outcome) else {
            panic!("expected a concatenation");
        };
        assert_eq!(outer.op, TokenType::Add);
        assert!(matches!(outer.rhs, Expression::Literal(literal) if literal.as_str() == Some("c")));
        let Expression::Binary(inner) = outer.lhs else {
            panic!("expected a concatenation");
        };
        assert!(matches!(inner.lhs, Expression::Literal(literal) if literal.as_str() == Some("a")));
        assert!(matches!(inner.rhs, Expression::Ident(ident) if ident.name == "b"));
    }

    #[test]
    fn test_tagged_template_arguments() {
        let arena = Bump::new();
        let source = Source::new("test.js", "tag`x\\n${1}y`;");
        let outcome = parse(&arena, &source, es6());
        assert!(!outcome.has_errors());
        let Expression::Call(call) = first_expression(&outcome) else {
            panic!("expected a call");
        };
        assert_eq!(call.args.len(), 2);
        let Expression::Runtime(template) = call.args[0] else {
            panic!("expected the template object");
        };
        assert_eq!(template.request, RuntimeRequest::GetTemplateObject);
        let strings: Vec<Vec<&str>> = template
            .args
            .iter()
            .map(|array| match array {
                Expression::Array(array) => array
                    .elements
                    .iter()
                    .filter_map(|element| element.as_ref().and_then(|e| match e {
                        Expression::Literal(literal) => literal.as_str(),
                        _ => None,
                    }))
                    .collect(),
                _ => Vec::new(),
            })
            .collect();
        assert_eq!(strings, vec![vec!["x\\n", "y"], vec!["x\n", "y"]]);
    }

    #[test]
    fn test_spread_arguments() {
        let arena = Bump::new();
        let source = Source::new("test.js", "f(a, ...b);");
        let outcome = parse(&arena, &source, es6());
        assert!(!outcome.has_errors());
        let Expression::Call(call) = first_expression(&outcome) else {
            panic!("expected a call");
        };
        assert!(matches!(call.args[1], Expression::Unary(UnaryNode { op: TokenType::Spread, .. })));
    }

    #[test]
    fn test_yield_forms() {
        let arena = Bump::new();
        let source = Source::new("test.js", "function* g() { yield; yield 1; yield* h(); }");
        let outcome = parse(&arena, &source, es6());
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        let functions = visitor::collect_functions(outcome.program);
        let generator = functions.iter().find(|f| f.kind == FunctionKind::Generator).unwrap();
        let ops: Vec<(TokenType, bool)> = generator
            .body
            .statements
            .iter()
            .filter_map(|statement| match statement {
                Statement::Expression(ExpressionStatement {
                    expression: Expression::Unary(unary),
                    ..
                }) => Some((unary.op, matches!(unary.expression, Expression::Unary(_)))),
                _ => None,
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                (TokenType::Yield, true),
                (TokenType::Yield, false),
                (TokenType::YieldStar, false)
            ]
        );
    }

    #[test]
    fn test_exec_string_becomes_exec_call() {
        let arena = Bump::new();
        let source = Source::new("test.js", "x = `ls -l`;");
        let options = ParserOptions {
            scripting: true,
            ..Default::default()
        };
        let outcome = parse(&arena, &source, options);
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        let Expression::Binary(assign) = first_expression(&outcome) else {
            panic!("expected an assignment");
        };
        let Expression::Call(call) = assign.rhs else {
            panic!("expected a call");
        };
        assert!(matches!(call.function, Expression::Ident(ident) if ident.name == "$EXEC"));
        assert!(matches!(call.args[0], Expression::Literal(literal) if literal.as_str() == Some("ls -l")));
    }

    #[test]
    fn test_in_operator_excluded_from_for_header() {
        let arena = Bump::new();
        let source = Source::new("test.js", "for (a = b in c;;) {}");
        let outcome = parse(&arena, &source, ParserOptions::default());
        assert!(outcome.has_errors());
    }

    #[test]
    fn test_deep_nesting_reports_error() {
        let text = format!("x = {}1{};", "(".repeat(500), ")".repeat(500));
        assert_eq!(first_error_code(&text, ParserOptions::default()), 1126);
    }

    #[test]
    fn test_nesting_limit_holds_on_a_default_thread_stack() {
        let nested = std::thread::spawn(|| {
            let inputs = [
                format!("x = {}1{};", "(".repeat(100), ")".repeat(100)),
                format!("x = {}1{};", "[".repeat(100), "]".repeat(100)),
                format!("x = {}1;", "!".repeat(300)),
                format!("x = {}f;", "new ".repeat(300)),
                format!("{}{}", "{".repeat(100), "}".repeat(100)),
                format!("x = {}1{};", "{a:".repeat(100), "}".repeat(100)),
                format!("{}x{}", "(function(){ return ".repeat(60), "; })()".repeat(60)),
            ];
            inputs.iter().map(|text| first_error_code(text, ParserOptions::default())).collect::<Vec<_>>()
        });
        let codes = nested.join().unwrap();
        assert!(codes.iter().all(|&code| code == 1126), "{:?}", codes);
    }
}
