//! Module bodies: `import` and `export` declarations.
//!
//! Entries are collected in the [`ModuleFrame`] on the context stack and
//! turned into a [`ModuleNode`] when the program function is finished.

use crate::context::ModuleFrame;
use crate::parser::{alloc_vec_in, Parser};
use esfront_ast::*;
use esfront_diagnostics::{messages, ParseErrorKind, ParseResult};
use esfront_lexer::TokenValue;
use tracing::trace;

/// Local binding that holds the value of `export default <expression>`.
pub const DEFAULT_EXPORT_BINDING_NAME: &str = "*default*";

impl<'a> Parser<'a> {
    /// Module items up to the end of input.
    pub(crate) fn module_body(&mut self) -> ParseResult<()> {
        while self.token_type != TokenType::Eof {
            match self.token_type {
                TokenType::Import => self.import_declaration()?,
                TokenType::Export => self.export_declaration()?,
                _ => self.statement(true, false, false)?,
            }
            self.stream.commit(self.k);
        }
        Ok(())
    }

    pub(crate) fn finish_module(&self, frame: ModuleFrame<'a>) -> &'a ModuleNode<'a> {
        trace!(
            module = %frame.name,
            requests = frame.requested_modules.len(),
            imports = frame.imports.len(),
            exports = frame.exports.len(),
            "module finished"
        );
        self.arena.alloc(ModuleNode {
            requested_modules: alloc_vec_in(self.arena, frame.requested_modules),
            imports: alloc_vec_in(self.arena, frame.imports),
            exports: alloc_vec_in(self.arena, frame.exports),
        })
    }

    fn module(&mut self) -> &mut ModuleFrame<'a> {
        match self.context.current_module_mut() {
            Some(module) => module,
            None => unreachable!("module items are only parsed inside a module frame"),
        }
    }

    /// Whether the current token is the identifier `word`.
    fn is_contextual(&self, word: &str) -> bool {
        self.token_type == TokenType::Ident && self.lexer.token_text(self.token) == word
    }

    fn expect_contextual(&mut self, word: &str) -> ParseResult<()> {
        if !self.is_contextual(word) {
            return Err(self.expected(word));
        }
        self.next()?;
        Ok(())
    }

    /// A string literal naming a module.
    fn module_specifier(&mut self) -> ParseResult<&'a str> {
        if !matches!(self.token_type, TokenType::String | TokenType::EscString) {
            let found = self.found_text();
            return Err(self.error(&messages::EXPECTED_STRING_MODULE_SPECIFIER, &[&found]));
        }
        let specifier = match self.get_value(self.token)? {
            TokenValue::String(value) => self.alloc_str(&value),
            _ => self.alloc_str(&self.lexer.token_text(self.token)),
        };
        self.next()?;
        Ok(specifier)
    }

    /// `from "module"`
    fn from_clause(&mut self) -> ParseResult<&'a str> {
        self.expect_contextual("from")?;
        self.module_specifier()
    }

    // ========================================================================
    // Imports
    // ========================================================================

    /// `import "m";`, `import d from "m";`, `import * as ns from "m";`,
    /// `import { a, b as c } from "m";` and `import d, {...} from "m";`.
    fn import_declaration(&mut self) -> ParseResult<()> {
        let start = self.start;
        self.next()?;

        if matches!(self.token_type, TokenType::String | TokenType::EscString) {
            let specifier = self.module_specifier()?;
            self.module().add_module_request(specifier);
            return self.expect(TokenType::Semicolon);
        }

        let mut entries: Vec<(&'a str, &'a str)> = Vec::new();
        match self.token_type {
            TokenType::Mul => entries.push(self.namespace_import()?),
            TokenType::LBrace => entries.extend(self.named_imports()?),
            _ if self.is_binding_identifier() => {
                let local = self.binding_identifier("imported binding")?;
                entries.push(("default", local.name));
                if self.token_type == TokenType::CommaRight {
                    self.next()?;
                    match self.token_type {
                        TokenType::Mul => entries.push(self.namespace_import()?),
                        TokenType::LBrace => entries.extend(self.named_imports()?),
                        _ => return Err(self.expected("named import")),
                    }
                }
            }
            _ => return Err(self.expected("import")),
        }

        let specifier = self.from_clause()?;
        let range = self.range_from(start);
        let module = self.module();
        module.add_module_request(specifier);
        module.imports.extend(entries.into_iter().map(|(import_name, local_name)| ImportEntry {
            range,
            module_request: specifier,
            import_name,
            local_name,
        }));
        self.expect(TokenType::Semicolon)
    }

    /// `* as name`
    fn namespace_import(&mut self) -> ParseResult<(&'a str, &'a str)> {
        self.next()?;
        self.expect_contextual("as")?;
        let local = self.binding_identifier("imported binding")?;
        Ok(("*", local.name))
    }

    /// `{ a, b as c }`; a name that is not a valid binding must be renamed.
    fn named_imports(&mut self) -> ParseResult<Vec<(&'a str, &'a str)>> {
        self.next()?;
        let mut entries = Vec::new();
        while self.token_type != TokenType::RBrace {
            let is_binding = self.is_binding_identifier();
            let name_token = self.token;
            let import_name = self.get_identifier_name()?;
            if self.is_contextual("as") {
                self.next()?;
                let local = self.binding_identifier("imported binding")?;
                entries.push((import_name.name, local.name));
            } else if !is_binding {
                let found = self.lexer.token_text(name_token);
                return Err(self.error_at(&messages::EXPECTED_0_BUT_FOUND_1, &["binding identifier", &found], name_token));
            } else {
                self.verify_strict_ident(&import_name, "imported binding")?;
                entries.push((import_name.name, import_name.name));
            }
            if self.token_type != TokenType::CommaRight {
                break;
            }
            self.next()?;
        }
        self.expect(TokenType::RBrace)?;
        Ok(entries)
    }

    // ========================================================================
    // Exports
    // ========================================================================

    fn export_declaration(&mut self) -> ParseResult<()> {
        let start = self.start;
        self.next()?;

        match self.token_type {
            TokenType::Mul => {
                self.next()?;
                let specifier = self.from_clause()?;
                self.expect(TokenType::Semicolon)?;
                let range = self.range_from(start);
                let module = self.module();
                module.add_module_request(specifier);
                module.exports.push(ExportEntry {
                    range,
                    export_name: None,
                    local_name: None,
                    module_request: Some(specifier),
                });
                Ok(())
            }
            TokenType::LBrace => {
                let specifiers = self.export_clause()?;
                let module_request = if self.is_contextual("from") {
                    Some(self.from_clause()?)
                } else {
                    None
                };
                self.expect(TokenType::Semicolon)?;
                if let Some(specifier) = module_request {
                    self.module().add_module_request(specifier);
                }
                for (local, exported) in specifiers {
                    self.add_export(exported, Some(local.name), module_request)?;
                }
                Ok(())
            }
            TokenType::Default => self.export_default(),
            TokenType::Var | TokenType::Let | TokenType::Const => {
                let var_type = self.token_type;
                let first = self.context.current_block().map_or(0, |block| block.statements.len());
                self.variable_statement(var_type)?;
                let mut names = Vec::new();
                if let Some(block) = self.context.current_block_mut() {
                    for statement in &mut block.statements[first..] {
                        if let Statement::Var(var) = statement {
                            var.flags |= VarFlags::IS_EXPORT;
                            names.push(var.name);
                        }
                    }
                }
                for name in names {
                    self.add_export(name, Some(name.name), None)?;
                }
                Ok(())
            }
            TokenType::Function => {
                let function = self.function_expression(true, true)?;
                self.add_export(function.ident, Some(function.ident.name), None)
            }
            TokenType::Class => {
                let ident = self.class_declaration()?;
                self.add_export(ident, Some(ident.name), None)
            }
            _ => Err(self.expected("export")),
        }
    }

    /// `export default function f() {}` exports `f` and `export default
    /// class C {}` declares and exports `C`; any other expression is bound
    /// to a hidden local.
    fn export_default(&mut self) -> ParseResult<()> {
        let default_token = self.token;
        let start = self.start;
        let line = self.line;
        self.next()?;

        if self.token_type == TokenType::Function {
            let function = self.function_expression(false, true)?;
            let exported = IdentNode::new(Self::token_range(default_token), "default");
            return self.add_export(exported, Some(function.ident.name), None);
        }
        if self.token_type == TokenType::Class && self.t(self.k + 1) == TokenType::Ident {
            let ident = self.class_declaration()?;
            let exported = IdentNode::new(Self::token_range(default_token), "default");
            return self.add_export(exported, Some(ident.name), None);
        }

        let value_start = self.start;
        let value = self.assignment_expression(false)?;
        let name = IdentNode::new(self.range_from(value_start), DEFAULT_EXPORT_BINDING_NAME)
            .with_flags(IdentFlags::DECLARED_HERE);
        self.append_statement(Statement::Var(VarNode {
            range: self.range_from(start),
            line,
            name,
            init: Some(value),
            flags: VarFlags::IS_LET | VarFlags::IS_EXPORT,
        }));
        self.expect(TokenType::Semicolon)?;
        let exported = IdentNode::new(Self::token_range(default_token), "default");
        self.add_export(exported, Some(DEFAULT_EXPORT_BINDING_NAME), None)
    }

    /// `{ a, b as c }` as (local, exported) pairs.
    fn export_clause(&mut self) -> ParseResult<Vec<(IdentNode<'a>, IdentNode<'a>)>> {
        self.next()?;
        let mut specifiers = Vec::new();
        while self.token_type != TokenType::RBrace {
            let local = self.get_identifier_name()?;
            let exported = if self.is_contextual("as") {
                self.next()?;
                self.get_identifier_name()?
            } else {
                local
            };
            specifiers.push((local, exported));
            if self.token_type != TokenType::CommaRight {
                break;
            }
            self.next()?;
        }
        self.expect(TokenType::RBrace)?;
        Ok(specifiers)
    }

    fn add_export(
        &mut self,
        exported: IdentNode<'a>,
        local_name: Option<&'a str>,
        module_request: Option<&'a str>,
    ) -> ParseResult<()> {
        if !self.module().export_names.insert(exported.name) {
            return Err(self.error_in_range(
                ParseErrorKind::Syntax,
                &messages::DUPLICATE_EXPORT,
                &[exported.name],
                exported.range,
            ));
        }
        self.module().exports.push(ExportEntry {
            range: exported.range,
            export_name: Some(exported.name),
            local_name,
            module_request,
        });
        Ok(())
    }
}
