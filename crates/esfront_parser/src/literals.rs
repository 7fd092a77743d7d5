//! Array and object literals, property names.

use crate::parser::{alloc_vec_in, Parser};
use esfront_ast::*;
use esfront_diagnostics::{messages, ParseErrorKind, ParseResult};
use rustc_hash::FxHashMap;

const PROTO_NAME: &str = "__proto__";

/// A parsed object literal entry, and whether it is a `__proto__: value`
/// entry.
type PropertyEntry<'a> = (PropertyNode<'a>, bool);

impl<'a> Parser<'a> {
    // ========================================================================
    // Arrays
    // ========================================================================

    /// `[a, , b]`. Holes are `None`; a trailing comma adds no hole.
    pub(crate) fn array_literal(&mut self) -> ParseResult<&'a Expression<'a>> {
        let start = self.start;
        self.next()?;

        let mut elements = Vec::new();
        let mut elision = true;
        loop {
            match self.token_type {
                TokenType::RBracket => {
                    self.next()?;
                    break;
                }
                TokenType::CommaRight => {
                    self.next()?;
                    if elision {
                        elements.push(None);
                    }
                    elision = true;
                }
                _ => {
                    if !elision {
                        let found = self.token_type.name_or_type();
                        return Err(self.error(&messages::EXPECTED_COMMA, &[&found]));
                    }
                    let spread_start = (self.options.es6 && self.token_type == TokenType::Ellipsis).then_some(self.start);
                    if spread_start.is_some() {
                        self.next()?;
                    }
                    let mut element = *self.assignment_expression(false)?;
                    if let Some(start) = spread_start {
                        element = Expression::Unary(UnaryNode {
                            range: self.range_from(start),
                            op: TokenType::Spread,
                            expression: self.alloc_expression(element),
                        });
                    }
                    elements.push(Some(element));
                    elision = false;
                }
            }
        }

        Ok(self.alloc_expression(Expression::Array(ArrayLiteralNode {
            range: self.range_from(start),
            elements: alloc_vec_in(self.arena, elements),
        })))
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// `{ key: value, get key() {}, set key(v) {} }`. A getter and a setter
    /// for the same key share one property; a later value replaces what came
    /// before.
    pub(crate) fn object_literal(&mut self) -> ParseResult<&'a Expression<'a>> {
        let start = self.start;
        self.next()?;

        let mut properties: Vec<PropertyNode<'a>> = Vec::new();
        // Key name to the index of its property and whether that one is a
        // `__proto__` entry.
        let mut seen: FxHashMap<&'a str, (usize, bool)> = FxHashMap::default();
        let mut comma_seen = true;
        loop {
            match self.token_type {
                TokenType::RBrace => {
                    self.next()?;
                    break;
                }
                TokenType::CommaRight => {
                    if comma_seen {
                        let found = self.token_type.name_or_type();
                        return Err(self.error(&messages::EXPECTED_PROPERTY_ID, &[&found]));
                    }
                    self.next()?;
                    comma_seen = true;
                }
                _ => {
                    if !comma_seen {
                        let found = self.token_type.name_or_type();
                        return Err(self.error(&messages::EXPECTED_COMMA, &[&found]));
                    }
                    comma_seen = false;

                    let (property, is_proto) = self.property_assignment()?;
                    if property.key.is_computed() {
                        properties.push(property);
                        continue;
                    }
                    let Some(&(existing, existing_is_proto)) = seen.get(property.key_name) else {
                        seen.insert(property.key_name, (properties.len(), is_proto));
                        properties.push(property);
                        continue;
                    };

                    let previous = properties[existing];
                    if !self.options.es6 {
                        self.check_property_redefinition(&property, &previous)?;
                    } else if is_proto && existing_is_proto {
                        return Err(self.error_in_range(
                            ParseErrorKind::Syntax,
                            &messages::MULTIPLE_PROTO_KEY,
                            &[],
                            property.key.range(),
                        ));
                    }

                    if property.value.is_some() || previous.value.is_some() {
                        seen.insert(property.key_name, (properties.len(), is_proto));
                        properties.push(property);
                    } else if property.getter.is_some() {
                        properties[existing].getter = property.getter;
                    } else if property.setter.is_some() {
                        properties[existing].setter = property.setter;
                    }
                }
            }
        }

        Ok(self.alloc_expression(Expression::Object(ObjectNode {
            range: self.range_from(start),
            properties: alloc_vec_in(self.arena, properties),
        })))
    }

    /// ES5 rules for a key defined twice: data twice only outside strict
    /// mode, never data and accessor, never the same accessor twice.
    fn check_property_redefinition(&self, property: &PropertyNode<'a>, previous: &PropertyNode<'a>) -> ParseResult<()> {
        let is_accessor = property.getter.is_some() || property.setter.is_some();
        let was_accessor = previous.getter.is_some() || previous.setter.is_some();
        let redefined = (self.is_strict_mode && property.value.is_some() && previous.value.is_some())
            || (previous.value.is_some() && is_accessor)
            || (was_accessor && property.value.is_some())
            || (property.getter.is_some() && previous.getter.is_some())
            || (property.setter.is_some() && previous.setter.is_some());
        if redefined {
            return Err(self.error_in_range(
                ParseErrorKind::Syntax,
                &messages::PROPERTY_REDEFINITION,
                &[property.key_name],
                property.key.range(),
            ));
        }
        Ok(())
    }

    /// One object literal entry.
    fn property_assignment(&mut self) -> ParseResult<PropertyEntry<'a>> {
        let start = self.start;
        let line = self.line;

        let generator = self.options.es6 && self.token_type == TokenType::Mul;
        if generator {
            self.next()?;
        }
        let method_flags = if self.options.es6 {
            FunctionFlags::IS_METHOD
        } else {
            FunctionFlags::empty()
        };

        let (key, key_name, is_identifier, is_proto) = if self.token_type == TokenType::Ident {
            let ident = self.get_ident()?;
            if self.token_type != TokenType::Colon && (self.token_type != TokenType::LParen || !self.options.es6) {
                let accessor = match ident.name {
                    "get" => Some(self.property_getter(start, line, method_flags)?),
                    "set" => Some(self.property_setter(start, line, method_flags)?),
                    _ => None,
                };
                if let Some((key, key_name, function)) = accessor {
                    let is_getter = function.kind == FunctionKind::Getter;
                    let property = PropertyNode {
                        range: self.range_from(start),
                        key,
                        key_name,
                        value: None,
                        getter: is_getter.then_some(function),
                        setter: (!is_getter).then_some(function),
                        is_static: false,
                    };
                    return Ok((property, false));
                }
            }
            let is_proto = self.token_type == TokenType::Colon && ident.name == PROTO_NAME;
            let key = PropertyKey::Ident(ident.with_flags(IdentFlags::PROPERTY_NAME));
            (key, ident.name, true, is_proto)
        } else {
            let is_identifier = self.is_non_strict_mode_ident();
            let (key, key_name) = self.property_name()?;
            (key, key_name, is_identifier, false)
        };

        if generator {
            self.expect_dont_advance(TokenType::LParen)?;
        }

        let value = if self.options.es6 && self.token_type == TokenType::LParen {
            let method = self.property_method(key, key_name, start, line, generator, method_flags)?;
            self.alloc_expression(Expression::Function(method))
        } else if self.options.es6
            && is_identifier
            && matches!(
                self.token_type,
                TokenType::CommaRight | TokenType::RBrace | TokenType::Assign
            )
        {
            let shorthand = self.alloc_expression(Expression::Ident(IdentNode::new(key.range(), key_name)));
            if self.token_type == TokenType::Assign {
                self.next()?;
                let rhs = self.assignment_expression(false)?;
                self.verify_assignment(TokenType::Assign, shorthand, rhs)?
            } else {
                shorthand
            }
        } else {
            self.expect(TokenType::Colon)?;
            self.push_default_name((!key.is_computed()).then_some(key_name));
            let value = self.assignment_expression(false);
            self.pop_default_name();
            value?
        };

        let property = PropertyNode {
            range: self.range_from(start),
            key,
            key_name,
            value: Some(value),
            getter: None,
            setter: None,
            is_static: false,
        };
        Ok((property, is_proto))
    }

    // ========================================================================
    // Property names
    // ========================================================================

    /// A literal property name, or in ES6 mode a computed `[expression]`
    /// key. A computed key is named by its source text.
    pub(crate) fn property_name(&mut self) -> ParseResult<(PropertyKey<'a>, &'a str)> {
        if !self.options.es6 || self.token_type != TokenType::LBracket {
            return self.literal_property_name();
        }
        let start = self.start;
        self.next()?;
        let expression = self.assignment_expression(false)?;
        self.expect(TokenType::RBracket)?;
        let range = self.range_from(start);
        let key_name = self.alloc_str(&self.source.substring(range.pos, range.len()));
        Ok((PropertyKey::Computed { range, expression }, key_name))
    }

    /// An identifier, string or number used as a property key, with the key
    /// as a property name string.
    pub(crate) fn literal_property_name(&mut self) -> ParseResult<(PropertyKey<'a>, &'a str)> {
        match self.token_type {
            TokenType::Ident => {
                let ident = self.get_ident()?;
                Ok((PropertyKey::Ident(ident.with_flags(IdentFlags::PROPERTY_NAME)), ident.name))
            }
            TokenType::OctalLegacy if self.is_strict_mode => Err(self.error(&messages::STRICT_NO_OCTAL, &[])),
            TokenType::String
            | TokenType::EscString
            | TokenType::Decimal
            | TokenType::Hexadecimal
            | TokenType::OctalLegacy
            | TokenType::Octal
            | TokenType::BinaryNumber
            | TokenType::Floating => {
                let literal = self.get_literal()?;
                let key_name = match literal.value {
                    LiteralValue::String(value) => value,
                    LiteralValue::Number(number) => self.alloc_str(&number_key_name(number)),
                    _ => self.alloc_str(&self.source.substring(literal.range.pos, literal.range.len())),
                };
                Ok((PropertyKey::Literal(literal), key_name))
            }
            _ => {
                let ident = self.get_identifier_name()?;
                Ok((PropertyKey::Ident(ident), ident.name))
            }
        }
    }

    /// An identifier or any reserved word, as after `.`.
    pub(crate) fn get_identifier_name(&mut self) -> ParseResult<IdentNode<'a>> {
        if self.token_type == TokenType::Ident {
            return Ok(self.get_ident()?.with_flags(IdentFlags::PROPERTY_NAME));
        }
        if !self.token_type.is_reserved_word() {
            return Err(self.expected("ident"));
        }
        let token = self.token;
        let name = self.alloc_str(&self.lexer.token_text(token));
        self.next()?;
        Ok(IdentNode::new(Self::token_range(token), name).with_flags(IdentFlags::PROPERTY_NAME))
    }
}

/// A numeric key the way it reads as a property name: `1`, `1.5`, `1e+21`.
fn number_key_name(number: Number) -> String {
    match number {
        Number::Integer(value) => value.to_string(),
        Number::Double(value) if value.is_nan() => "NaN".to_string(),
        Number::Double(value) if value.is_infinite() => {
            (if value > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
        }
        Number::Double(value) if value.abs() >= 1e21 => format!("{:e}", value).replacen('e', "e+", 1),
        Number::Double(value) if value.fract() == 0.0 => format!("{:.0}", value),
        Number::Double(value) => value.to_string(),
    }
}
