//! Functions: declarations, expressions, arrows, accessors and methods.
//!
//! Every function is built in a [`FunctionFrame`] that collects parameters,
//! flags and hoisted declarations while the body is parsed, then turned into
//! an arena [`FunctionNode`] once. This is also where lazy reparsing skips
//! bodies it does not need.

use crate::context::{Frame, FunctionFrame};
use crate::lazy::RecordedFunction;
use crate::namespace::Namespace;
use crate::parser::{alloc_vec_in, is_valid_identifier, Parser, ANON_FUNCTION_PREFIX, ARROW_FUNCTION_PREFIX};
use esfront_ast::*;
use esfront_core::TextRange;
use esfront_diagnostics::{messages, ParseErrorKind, ParseResult};
use rustc_hash::FxHashSet;
use tracing::debug;

impl<'a> Parser<'a> {
    // ========================================================================
    // Frames
    // ========================================================================

    /// Push a frame for a new function. Nested functions are named
    /// `outer$inner`; the name is made unique across the whole parse.
    pub(crate) fn begin_function(
        &mut self,
        ident: IdentNode<'a>,
        id: FunctionId,
        start: u32,
        kind: FunctionKind,
        line: u32,
    ) {
        let base = match self.context.current_function() {
            Some(parent) if !parent.is_program() => format!("{}${}", parent.name, ident.name),
            _ => ident.name.to_string(),
        };
        let name = self.namespace.unique_name(Namespace::ROOT, &base);
        let namespace = self.namespace.child(Namespace::ROOT);

        let mut frame = FunctionFrame::new(id, start, line, ident, name, kind, namespace);
        if id == FunctionId::PROGRAM {
            frame.set_flag(FunctionFlags::IS_PROGRAM);
        }
        if self.is_strict_mode {
            frame.set_flag(FunctionFlags::IS_STRICT);
        }
        self.context.push(Frame::Function(Box::new(frame)));
        // Names from outside do not leak into the new function.
        self.default_names.push(None);
    }

    pub(crate) fn pop_function_frame(&mut self) -> FunctionFrame<'a> {
        self.default_names.pop();
        self.context.pop_function()
    }

    /// Run `parse` inside a new function frame and hand back the finished
    /// frame. On failure every frame pushed since is dropped.
    pub(crate) fn in_function<T>(
        &mut self,
        ident: IdentNode<'a>,
        start: u32,
        kind: FunctionKind,
        line: u32,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<(FunctionFrame<'a>, T)> {
        let depth = self.context.depth();
        let default_names = self.default_names.len();
        self.begin_function(ident, FunctionId(start), start, kind, line);
        match parse(self) {
            Ok(value) => Ok((self.pop_function_frame(), value)),
            Err(error) => {
                self.context.truncate(depth);
                self.default_names.truncate(default_names);
                Err(error)
            }
        }
    }

    pub(crate) fn build_function(&self, frame: FunctionFrame<'a>, body: Block<'a>, range: TextRange) -> FunctionNode<'a> {
        FunctionNode {
            range,
            line: frame.line,
            id: frame.id,
            ident: frame.ident,
            name: self.alloc_str(&frame.name),
            kind: frame.kind,
            parameters: alloc_vec_in(self.arena, frame.parameters),
            body,
            flags: frame.flags,
            end_parser_state: frame.end_parser_state,
            module: None,
        }
    }

    /// Build and allocate a finished function, recording it for lazy
    /// reparsing when that is enabled.
    pub(crate) fn finish_function(
        &mut self,
        frame: FunctionFrame<'a>,
        body: Block<'a>,
        range: TextRange,
    ) -> &'a FunctionNode<'a> {
        let function = self.build_function(frame, body, range);
        self.record_function(&function);
        self.arena.alloc(function)
    }

    pub(crate) fn record_function(&mut self, function: &FunctionNode<'a>) {
        if self.options.lazy_compilation {
            self.recorded.insert(
                function.id,
                RecordedFunction {
                    flags: function.flags,
                    end_state: function.end_parser_state,
                },
            );
        }
    }

    /// Prepend the hoisted declarations of the current function to the
    /// current block, marking the last one.
    pub(crate) fn add_function_declarations(&mut self) {
        let function = self.current_function_mut();
        let declarations = std::mem::take(&mut function.function_declarations);
        if declarations.is_empty() {
            return;
        }
        function.set_flag(FunctionFlags::HAS_FUNCTION_DECLARATIONS);

        let mut last_marked = false;
        for mut declaration in declarations.into_iter().rev() {
            if !last_marked {
                if let Statement::Var(ref mut var) = declaration {
                    var.flags |= VarFlags::IS_LAST_FUNCTION_DECLARATION;
                    last_marked = true;
                }
            }
            self.context.prepend_statement(declaration);
        }
    }

    // ========================================================================
    // Default names
    // ========================================================================

    /// Offer `name` to an anonymous function parsed next.
    pub(crate) fn push_default_name(&mut self, name: Option<&'a str>) {
        self.default_names.push(name);
    }

    pub(crate) fn pop_default_name(&mut self) {
        self.default_names.pop();
    }

    /// The name an assignment target offers: an identifier or the property
    /// of an access.
    pub(crate) fn default_name_of(target: &Expression<'a>) -> Option<&'a str> {
        match target {
            Expression::Ident(ident) => Some(ident.name),
            Expression::Access(access) => Some(access.property.name),
            _ => None,
        }
    }

    /// Take the offered name; it names at most one function.
    fn take_default_name(&mut self) -> Option<&'a str> {
        self.default_names.last_mut().and_then(Option::take)
    }

    /// Name of an anonymous function: the offered name when it is a valid
    /// identifier, otherwise `L:<line>`. Statements get the prefix either
    /// way so the name cannot clash with a declared variable.
    pub(crate) fn default_function_name(&mut self, line: u32, is_statement: bool) -> String {
        match self.take_default_name() {
            Some(name) if is_valid_identifier(name) => {
                if is_statement {
                    format!("{}{}", ANON_FUNCTION_PREFIX, name)
                } else {
                    name.to_string()
                }
            }
            _ => format!("{}{}", ANON_FUNCTION_PREFIX, line),
        }
    }

    // ========================================================================
    // Function declarations and expressions
    // ========================================================================

    /// `function name(params) { body }`, as a statement or an expression.
    /// Declarations are also placed: hoisted at the top level of a function,
    /// hoisted to the block in ES6 mode, appended in place otherwise.
    pub(crate) fn function_expression(&mut self, is_statement: bool, top_level: bool) -> ParseResult<&'a FunctionNode<'a>> {
        let function_token = self.token;
        let start = self.start;
        let line = self.line;
        self.next()?;

        let mut kind = FunctionKind::Normal;
        if self.options.es6 && self.token_type == TokenType::Mul {
            kind = FunctionKind::Generator;
            self.next()?;
        }

        let mut name = None;
        if self.token_type == TokenType::Ident || self.is_non_strict_mode_ident() {
            let in_generator = self.current_function().is_generator();
            if self.token_type == TokenType::Yield
                && ((!is_statement && kind == FunctionKind::Generator) || (is_statement && in_generator))
            {
                self.expect(TokenType::Ident)?;
            }
            let ident = self.get_ident()?;
            self.verify_strict_ident(&ident, "function name")?;
            name = Some(ident);
        } else if is_statement && !self.options.scripting && self.lazy.is_none() {
            self.expect(TokenType::Ident)?;
        }

        let is_anonymous = name.is_none();
        let ident = match name {
            Some(ident) => ident,
            None => {
                let default_name = self.default_function_name(line, is_statement);
                IdentNode::new(TextRange::empty(start), self.alloc_str(&default_name))
            }
        };

        let (mut frame, body) = self.in_function(ident, start, kind, line, |parser| {
            parser.expect(TokenType::LParen)?;
            parser.formal_parameter_list(TokenType::RParen)?;
            parser.expect(TokenType::RParen)?;
            parser.function_body()
        })?;

        if is_statement {
            if top_level || self.options.es6 || !self.is_strict_mode {
                frame.set_flag(FunctionFlags::IS_DECLARED);
            } else {
                return Err(self.error_at(&messages::STRICT_NO_FUNC_DECL_HERE, &[], function_token));
            }
            if ident.name == "arguments" {
                self.current_function_mut().set_flag(FunctionFlags::DEFINES_ARGUMENTS);
            }
        }
        if is_anonymous {
            frame.set_flag(FunctionFlags::IS_ANONYMOUS);
        }
        self.verify_parameter_list(&mut frame)?;

        let range = self.range_from(frame.start);
        let function = self.finish_function(frame, body, range);

        if is_statement {
            let init = self.alloc_expression(Expression::Function(function));
            if is_anonymous {
                self.append_statement(Statement::Expression(ExpressionStatement {
                    range,
                    line,
                    expression: init,
                }));
                return Ok(function);
            }

            let mut flags = VarFlags::IS_FUNCTION_DECLARATION;
            if !top_level && self.options.es6 {
                flags |= VarFlags::IS_LET;
            }
            let declaration = Statement::Var(VarNode {
                range,
                line,
                name: ident.with_flags(IdentFlags::DECLARED_HERE),
                init: Some(init),
                flags,
            });
            if top_level {
                self.current_function_mut().function_declarations.push(declaration);
            } else if self.options.es6 {
                self.context.prepend_statement(declaration);
                if let Some(block) = self.context.current_block_mut() {
                    block.flags |= BlockFlags::NEEDS_SCOPE;
                }
            } else {
                self.append_statement(declaration);
            }
        }
        Ok(function)
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Parameters up to `end`, bound into the current function frame. In ES6
    /// mode a trailing `...rest` and `name = default` initializers are
    /// accepted; initializers become statements run before the body.
    pub(crate) fn formal_parameter_list(&mut self, end: TokenType) -> ParseResult<()> {
        let mut first = true;
        while self.token_type != end {
            if !first {
                self.expect(TokenType::CommaRight)?;
            }
            first = false;

            let mut rest = false;
            if self.options.es6 && self.token_type == TokenType::Ellipsis {
                self.next()?;
                rest = true;
            }
            if self.token_type == TokenType::Yield && self.current_function().is_generator() {
                self.expect(TokenType::Ident)?;
            }

            let ident = self.binding_identifier("function parameter")?;
            if rest {
                self.expect_dont_advance(end)?;
                self.bind_parameter(ident.with_flags(IdentFlags::REST_PARAMETER));
                self.current_function_mut().simple_parameter_list = false;
                break;
            }

            if self.options.es6 && self.token_type == TokenType::Assign {
                let line = self.line;
                self.next()?;
                let init = self.assignment_expression(false)?;
                let statement = self.default_parameter_statement(ident, init, line);
                let function = self.current_function_mut();
                function.parameter_statements.push(statement);
                function.simple_parameter_list = false;
                self.bind_parameter(ident.with_flags(IdentFlags::DEFAULT_PARAMETER));
            } else {
                self.bind_parameter(ident);
            }
        }
        Ok(())
    }

    pub(crate) fn is_binding_identifier(&self) -> bool {
        self.token_type == TokenType::Ident || self.is_non_strict_mode_ident()
    }

    pub(crate) fn binding_identifier(&mut self, context_name: &str) -> ParseResult<IdentNode<'a>> {
        let ident = self.get_ident()?;
        self.verify_strict_ident(&ident, context_name)?;
        Ok(ident)
    }

    pub(crate) fn bind_parameter(&mut self, ident: IdentNode<'a>) {
        let function = self.current_function_mut();
        function.add_parameter_binding(ident);
        function.parameters.push(ident);
        let namespace = function.namespace;
        self.namespace.reserve(namespace, ident.name);
    }

    /// `name = name === void 0 ? init : name`
    fn default_parameter_statement(&self, ident: IdentNode<'a>, init: &'a Expression<'a>, line: u32) -> Statement<'a> {
        let range = TextRange::new(ident.range.pos, init.range().end);
        let target = self.alloc_expression(Expression::Ident(ident));
        let test = self.alloc_expression(Expression::Binary(BinaryNode {
            range,
            op: TokenType::EqStrict,
            lhs: target,
            rhs: self.undefined_literal(ident.range),
        }));
        let value = self.alloc_expression(Expression::Ternary(TernaryNode {
            range,
            test,
            true_expression: init,
            false_expression: target,
        }));
        let assignment = self.alloc_expression(Expression::Binary(BinaryNode {
            range,
            op: TokenType::Assign,
            lhs: target,
            rhs: value,
        }));
        Statement::Expression(ExpressionStatement {
            range,
            line,
            expression: assignment,
        })
    }

    /// Duplicate parameter names are an error in strict code, arrows and
    /// non-simple lists. Elsewhere every occurrence but the last is renamed.
    pub(crate) fn verify_parameter_list(&mut self, frame: &mut FunctionFrame<'a>) -> ParseResult<()> {
        let Some(duplicate) = frame.duplicate_parameter else {
            return Ok(());
        };
        if frame.is_strict() || frame.is_arrow() || !frame.simple_parameter_list {
            return Err(self.error_in_range(
                ParseErrorKind::Syntax,
                &messages::STRICT_PARAM_REDEFINITION,
                &[duplicate.name],
                duplicate.range,
            ));
        }

        let mut seen = FxHashSet::default();
        for index in (0..frame.parameters.len()).rev() {
            let parameter = frame.parameters[index];
            if !seen.insert(parameter.name) {
                let renamed = self.namespace.unique_name(frame.namespace, parameter.name);
                frame.parameters[index] = IdentNode {
                    name: self.alloc_str(&renamed),
                    ..parameter
                };
            }
        }
        Ok(())
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    /// The body of the current function frame. Arrows, and any function in
    /// scripting mode, may have a single expression instead of a block. A
    /// lazy reparse skips bodies it does not need and restores their
    /// recorded flags.
    pub(crate) fn function_body(&mut self) -> ParseResult<Block<'a>> {
        self.enter()?;
        let result = self.function_body_inner();
        self.leave();
        result
    }

    fn function_body_inner(&mut self) -> ParseResult<Block<'a>> {
        let id = self.current_function().id;
        let parse_body = self.lazy.as_ref().map_or(true, |lazy| lazy.should_parse_body(id));
        let recorded = self.lazy.as_ref().and_then(|lazy| lazy.recorded(id)).copied();
        let body_start = self.start;
        let mut end_state = None;
        let last_token;

        self.push_block();
        let expression_closure = (self.options.scripting || self.current_function().is_arrow())
            && self.token_type != TokenType::LBrace;
        if expression_closure {
            let line = self.line;
            let expression = self.assignment_expression(false)?;
            last_token = self.previous_token;
            if parse_body {
                self.append_statement(Statement::Return(ReturnNode {
                    range: expression.range(),
                    line,
                    expression: Some(expression),
                }));
            }
        } else {
            self.expect_dont_advance(TokenType::LBrace)?;
            if parse_body || !self.skip_function_body(recorded)? {
                self.next()?;
                self.source_elements(false)?;
                self.add_function_declarations();
                if parse_body {
                    end_state = Some(ParserState {
                        position: self.start,
                        line: self.line,
                        line_position: self.line_position,
                    });
                }
            }
            last_token = self.token;
            self.expect(TokenType::RBrace)?;
        }

        let mut block = self.context.pop_block();
        let function = self.current_function_mut();
        function.last_token = last_token;
        if let Some(recorded) = recorded {
            function.flags |= recorded.flags;
            if !parse_body {
                end_state = recorded.end_state;
            }
        }
        function.end_parser_state = end_state;

        let mut flags = BlockFlags::IS_BODY;
        if function.flags.contains(FunctionFlags::HAS_SCOPE_BLOCK) {
            flags |= BlockFlags::NEEDS_SCOPE;
        }
        if parse_body {
            let parameter_statements = std::mem::take(&mut function.parameter_statements);
            block.statements.splice(0..0, parameter_statements);
        } else {
            block.statements.clear();
        }
        Ok(self.finish_block(block, body_start, flags))
    }

    /// Move the cursor to the recorded closing brace of the current
    /// function. Uses the lookahead window when the brace is already in it,
    /// otherwise restarts the lexer there. Returns `false` when nothing was
    /// recorded.
    fn skip_function_body(&mut self, recorded: Option<RecordedFunction>) -> ParseResult<bool> {
        let Some(state) = recorded.and_then(|recorded| recorded.end_state) else {
            return Ok(false);
        };
        let id = self.current_function().id;

        if let Some(last) = self.stream.last() {
            if self.k < last && self.start < state.position && state.position <= self.stream.get(last).position() {
                for index in self.k..last {
                    let next = self.stream.get(index + 1);
                    if next.position() == state.position && next.token_type() == TokenType::RBrace {
                        // The `{` stays current so that consuming it lands on the `}`.
                        self.k = index;
                        self.line = state.line;
                        self.line_position = state.line_position;
                        self.next()?;
                        debug!(function = %id, position = state.position, "skipped function body in lookahead");
                        return Ok(true);
                    }
                }
            }
        }

        self.stream.reset();
        self.lexer.restart(state);
        self.brace_depth += 1;
        self.line = state.line;
        self.line_position = state.line_position;
        self.token_type = TokenType::Semicolon;
        self.last = TokenType::Semicolon;
        self.scan_first_token()?;
        debug!(function = %id, position = state.position, "skipped function body by restarting the lexer");
        Ok(true)
    }

    // ========================================================================
    // Arrow functions
    // ========================================================================

    /// `params => body`, where `parameters` is the already parsed left side:
    /// an identifier, a comma list, or the empty `()` placeholder.
    pub(crate) fn arrow_function(
        &mut self,
        start: u32,
        line: u32,
        parameters: &'a Expression<'a>,
    ) -> ParseResult<&'a Expression<'a>> {
        self.expect(TokenType::Arrow)?;

        let name = format!("{}{}", ARROW_FUNCTION_PREFIX, line);
        let ident = IdentNode::new(TextRange::empty(start), self.alloc_str(&name));
        let (mut frame, body) = self.in_function(ident, start, FunctionKind::Arrow, line, |parser| {
            parser.current_function_mut().set_flag(FunctionFlags::IS_ANONYMOUS);
            parser.convert_arrow_parameters(parameters)?;
            parser.function_body()
        })?;
        self.verify_parameter_list(&mut frame)?;

        let range = self.range_from(frame.start);
        let function = self.finish_function(frame, body, range);
        Ok(self.alloc_expression(Expression::Function(function)))
    }

    fn convert_arrow_parameters(&mut self, parameters: &'a Expression<'a>) -> ParseResult<()> {
        match parameters {
            // `()`
            Expression::Error(_) => Ok(()),
            Expression::Binary(BinaryNode {
                op: TokenType::CommaRight,
                lhs,
                rhs,
                ..
            }) => {
                self.convert_arrow_parameters(lhs)?;
                self.arrow_parameter(rhs)
            }
            parameter => self.arrow_parameter(parameter),
        }
    }

    fn arrow_parameter(&mut self, parameter: &'a Expression<'a>) -> ParseResult<()> {
        match parameter {
            Expression::Ident(ident) => {
                self.verify_strict_ident(ident, "function parameter")?;
                if ident.flags.contains(IdentFlags::REST_PARAMETER) {
                    self.current_function_mut().simple_parameter_list = false;
                }
                self.bind_parameter(*ident);
                Ok(())
            }
            Expression::Binary(BinaryNode {
                op: TokenType::Assign,
                lhs: Expression::Ident(ident),
                rhs,
                ..
            }) => {
                self.verify_strict_ident(ident, "function parameter")?;
                let statement = self.default_parameter_statement(*ident, rhs, self.line);
                let function = self.current_function_mut();
                function.parameter_statements.push(statement);
                function.simple_parameter_list = false;
                self.bind_parameter(ident.with_flags(IdentFlags::DEFAULT_PARAMETER));
                Ok(())
            }
            _ => Err(self.error_in_range(
                ParseErrorKind::Syntax,
                &messages::INVALID_ARROW_PARAMETER,
                &[],
                parameter.range(),
            )),
        }
    }

    // ========================================================================
    // Accessors and methods
    // ========================================================================

    /// `get key() { body }`, entered after the `get` word at `start`.
    /// `flags` are set on the function before its body is parsed.
    pub(crate) fn property_getter(
        &mut self,
        start: u32,
        line: u32,
        flags: FunctionFlags,
    ) -> ParseResult<(PropertyKey<'a>, &'a str, &'a FunctionNode<'a>)> {
        let (key, key_name) = self.property_name()?;
        let ident = IdentNode::new(key.range(), self.alloc_str(&format!("get {}", key_name)));
        self.expect(TokenType::LParen)?;
        self.expect(TokenType::RParen)?;

        let (frame, body) = self.in_function(ident, start, FunctionKind::Getter, line, |parser| {
            parser.current_function_mut().set_flag(flags);
            parser.function_body()
        })?;
        let range = self.range_from(frame.start);
        Ok((key, key_name, self.finish_function(frame, body, range)))
    }

    /// `set key(value) { body }`. A missing parameter is tolerated.
    pub(crate) fn property_setter(
        &mut self,
        start: u32,
        line: u32,
        flags: FunctionFlags,
    ) -> ParseResult<(PropertyKey<'a>, &'a str, &'a FunctionNode<'a>)> {
        let (key, key_name) = self.property_name()?;
        let ident = IdentNode::new(key.range(), self.alloc_str(&format!("set {}", key_name)));
        self.expect(TokenType::LParen)?;

        let (frame, body) = self.in_function(ident, start, FunctionKind::Setter, line, |parser| {
            parser.current_function_mut().set_flag(flags);
            if parser.is_binding_identifier() {
                let argument = parser.binding_identifier("setter argument")?;
                parser.bind_parameter(argument);
            }
            parser.expect(TokenType::RParen)?;
            parser.function_body()
        })?;
        let range = self.range_from(frame.start);
        Ok((key, key_name, self.finish_function(frame, body, range)))
    }

    /// ES6 shorthand method `key(params) { body }`, in an object literal or
    /// a class body.
    pub(crate) fn property_method(
        &mut self,
        key: PropertyKey<'a>,
        key_name: &'a str,
        start: u32,
        line: u32,
        generator: bool,
        flags: FunctionFlags,
    ) -> ParseResult<&'a FunctionNode<'a>> {
        let kind = if generator { FunctionKind::Generator } else { FunctionKind::Normal };
        let ident = IdentNode::new(key.range(), key_name);
        let (mut frame, body) = self.in_function(ident, start, kind, line, |parser| {
            parser.current_function_mut().set_flag(flags);
            parser.expect(TokenType::LParen)?;
            parser.formal_parameter_list(TokenType::RParen)?;
            parser.expect(TokenType::RParen)?;
            parser.function_body()
        })?;
        self.verify_parameter_list(&mut frame)?;

        let range = self.range_from(frame.start);
        Ok(self.finish_function(frame, body, range))
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parser::parse_script;
    use bumpalo::Bump;
    use esfront_ast::visitor::collect_functions;
    use esfront_ast::*;
    use esfront_core::Source;

    fn functions<'a>(arena: &'a Bump, source: &'a Source, options: ParserOptions) -> Vec<&'a FunctionNode<'a>> {
        let outcome = parse_script(arena, source, options).unwrap();
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        collect_functions(outcome.program)
    }

    #[test]
    fn test_nested_names_are_qualified() {
        let arena = Bump::new();
        let source = Source::new("test.js", "function outer() { function inner() {} }\nfunction outer2() {}");
        let names: Vec<&str> = functions(&arena, &source, ParserOptions::default())
            .iter()
            .map(|f| f.name)
            .collect();
        assert!(names.contains(&"outer"));
        assert!(names.contains(&"outer$inner"));
        assert!(names.contains(&"outer2"));
    }

    #[test]
    fn test_anonymous_function_borrows_assignment_target() {
        let arena = Bump::new();
        let source = Source::new("test.js", "a.b = function() {};\nvar c = function() {};\nd[0] = function() {};\n");
        let all = functions(&arena, &source, ParserOptions::default());
        let names: Vec<&str> = all.iter().filter(|f| !f.is_program()).map(|f| f.ident.name).collect();
        assert_eq!(names, vec!["b", "c", "L:3"]);
        assert!(all.iter().filter(|f| !f.is_program()).all(|f| f.is_anonymous()));
    }

    #[test]
    fn test_default_name_names_one_function() {
        let arena = Bump::new();
        let source = Source::new("test.js", "x = function() { return function() {}; };");
        let all = functions(&arena, &source, ParserOptions::default());
        let names: Vec<&str> = all.iter().filter(|f| !f.is_program()).map(|f| f.ident.name).collect();
        assert_eq!(names, vec!["x", "L:1"]);
    }

    #[test]
    fn test_duplicate_parameters_renamed_except_last() {
        let arena = Bump::new();
        let source = Source::new("test.js", "function f(a, b, a) {}");
        let all = functions(&arena, &source, ParserOptions::default());
        let f = all.iter().find(|f| f.name == "f").unwrap();
        let names: Vec<&str> = f.parameters.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["a-1", "b", "a"]);
    }

    #[test]
    fn test_strict_duplicate_parameters_rejected() {
        let arena = Bump::new();
        let source = Source::new("test.js", "function f(a, a) { 'use strict'; }");
        let outcome = parse_script(&arena, &source, ParserOptions::default()).unwrap();
        assert_eq!(outcome.diagnostics.error_count(), 1);
        assert_eq!(outcome.diagnostics.diagnostics()[0].code, 1201);
    }

    #[test]
    fn test_declarations_are_hoisted_and_last_marked() {
        let arena = Bump::new();
        let source = Source::new("test.js", "a();\nfunction a() {}\nfunction b() {}\n");
        let outcome = parse_script(&arena, &source, ParserOptions::default()).unwrap();
        let program = outcome.program;
        assert!(program.flags.contains(FunctionFlags::HAS_FUNCTION_DECLARATIONS));
        let statements = program.body.statements;
        assert_eq!(statements[0].as_function_declaration().map(|f| f.name), Some("a"));
        assert_eq!(statements[1].as_function_declaration().map(|f| f.name), Some("b"));
        match statements[1] {
            Statement::Var(var) => assert!(var.flags.contains(VarFlags::IS_LAST_FUNCTION_DECLARATION)),
            _ => panic!("expected a declaration"),
        }
        assert!(matches!(statements[2], Statement::Expression(_)));
    }

    #[test]
    fn test_arrow_parameters_and_expression_body() {
        let arena = Bump::new();
        let source = Source::new("test.js", "f = (a, b = 1, ...c) => a;");
        let options = ParserOptions {
            es6: true,
            ..Default::default()
        };
        let all = functions(&arena, &source, options);
        let arrow = all.iter().find(|f| f.kind == FunctionKind::Arrow).unwrap();
        assert_eq!(arrow.name, "=>:1");
        let names: Vec<&str> = arrow.parameters.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(arrow.parameters[1].flags.contains(IdentFlags::DEFAULT_PARAMETER));
        assert!(arrow.parameters[2].flags.contains(IdentFlags::REST_PARAMETER));
        // default parameter statement, then the implicit return
        assert_eq!(arrow.body.statements.len(), 2);
        assert!(matches!(arrow.body.statements[1], Statement::Return(_)));
    }

    #[test]
    fn test_empty_arrow_parameter_list() {
        let arena = Bump::new();
        let source = Source::new("test.js", "g = () => { return this; };");
        let options = ParserOptions {
            es6: true,
            ..Default::default()
        };
        let outcome = parse_script(&arena, &source, options).unwrap();
        assert!(!outcome.has_errors());
        let all = collect_functions(outcome.program);
        let arrow = all.iter().find(|f| f.kind == FunctionKind::Arrow).unwrap();
        assert!(arrow.parameters.is_empty());
        assert!(arrow.flags.contains(FunctionFlags::USES_THIS));
        assert!(outcome.program.flags.contains(FunctionFlags::USES_THIS));
    }

    #[test]
    fn test_invalid_arrow_parameter() {
        let arena = Bump::new();
        let source = Source::new("test.js", "f = (a + 1) => a;");
        let options = ParserOptions {
            es6: true,
            ..Default::default()
        };
        let outcome = parse_script(&arena, &source, options).unwrap();
        assert_eq!(outcome.diagnostics.diagnostics()[0].code, 1121);
    }

    #[test]
    fn test_accessor_names() {
        let arena = Bump::new();
        let source = Source::new("test.js", "o = { get x() { return 1; }, set x(v) {} };");
        let all = functions(&arena, &source, ParserOptions::default());
        let getter = all.iter().find(|f| f.kind == FunctionKind::Getter).unwrap();
        let setter = all.iter().find(|f| f.kind == FunctionKind::Setter).unwrap();
        assert_eq!(getter.name, "get x");
        assert_eq!(setter.name, "set x");
        assert_eq!(setter.parameters.len(), 1);
    }

    #[test]
    fn test_strict_function_in_block_rejected() {
        let arena = Bump::new();
        let source = Source::new("test.js", "'use strict';\nif (a) { function f() {} }\n");
        let outcome = parse_script(&arena, &source, ParserOptions::default()).unwrap();
        assert_eq!(outcome.diagnostics.diagnostics()[0].code, 1205);
    }
}
