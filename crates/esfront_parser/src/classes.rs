//! ES6 classes: declarations, expressions and their bodies.
//!
//! Everything inside a class is strict code. Methods are ordinary functions
//! flagged `IS_METHOD`; the constructor is the method named `constructor`,
//! or a synthesized one when the body has none.

use crate::parser::{alloc_vec_in, Parser};
use esfront_ast::*;
use esfront_core::TextRange;
use esfront_diagnostics::{messages, ParseErrorKind, ParseResult};
use rustc_hash::FxHashMap;

const CONSTRUCTOR_NAME: &str = "constructor";

impl<'a> Parser<'a> {
    /// `class Name ... { }` as a statement, bound like a `const`. Returns the
    /// declared name.
    pub(crate) fn class_declaration(&mut self) -> ParseResult<IdentNode<'a>> {
        let line = self.line;
        let class = self.class_expression(true)?;
        let ident = class.ident.ok_or_else(|| self.expected("ident"))?;
        let range = class.range;
        let init = self.alloc_expression(Expression::Class(class));
        self.append_statement(Statement::Var(VarNode {
            range,
            line,
            name: ident.with_flags(IdentFlags::DECLARED_HERE),
            init: Some(init),
            flags: VarFlags::IS_CONST,
        }));
        Ok(ident)
    }

    /// `class [Name] [extends Base] { elements }`. A declaration must be
    /// named.
    pub(crate) fn class_expression(&mut self, is_statement: bool) -> ParseResult<ClassNode<'a>> {
        let start = self.start;
        let line = self.line;
        self.next()?;

        let was_strict = std::mem::replace(&mut self.is_strict_mode, true);
        let result = self.class_tail(start, line, is_statement);
        self.is_strict_mode = was_strict;
        result
    }

    fn class_tail(&mut self, start: u32, line: u32, is_statement: bool) -> ParseResult<ClassNode<'a>> {
        let ident = if is_statement || self.token_type == TokenType::Ident {
            Some(self.binding_identifier("class name")?)
        } else {
            None
        };

        let mut heritage = None;
        if self.token_type == TokenType::Extends {
            self.next()?;
            let Some(base) = self.left_hand_side_expression()? else {
                let found = self.token_type.name_or_type();
                return Err(self.error(&messages::EXPECTED_OPERAND, &[&found]));
            };
            heritage = Some(base);
        }
        let is_subclass = heritage.is_some();

        self.expect(TokenType::LBrace)?;
        let mut constructor = None;
        let mut elements: Vec<PropertyNode<'a>> = Vec::new();
        // (is static, key name) to the index of the element.
        let mut seen: FxHashMap<(bool, &'a str), usize> = FxHashMap::default();
        loop {
            match self.token_type {
                TokenType::Semicolon => {
                    self.next()?;
                    continue;
                }
                TokenType::RBrace => break,
                _ => {}
            }

            let element_token = self.token;
            let element = self.class_element(is_subclass)?;
            if element.key.is_computed() {
                elements.push(element);
                continue;
            }
            if !element.is_static && element.key_name == CONSTRUCTOR_NAME {
                if constructor.is_some() {
                    return Err(self.error_at(&messages::MULTIPLE_CONSTRUCTORS, &[], element_token));
                }
                constructor = element.value.and_then(Expression::as_function);
                continue;
            }

            let key = (element.is_static, element.key_name);
            let Some(&existing) = seen.get(&key) else {
                seen.insert(key, elements.len());
                elements.push(element);
                continue;
            };
            if element.value.is_some() || elements[existing].value.is_some() {
                seen.insert(key, elements.len());
                elements.push(element);
            } else if element.getter.is_some() {
                elements[existing].getter = element.getter;
            } else if element.setter.is_some() {
                elements[existing].setter = element.setter;
            }
        }
        self.expect(TokenType::RBrace)?;

        let constructor = match constructor {
            Some(constructor) => constructor,
            None => self.default_class_constructor(start, line, ident, is_subclass)?,
        };
        Ok(ClassNode {
            range: self.range_from(start),
            line,
            ident,
            heritage,
            constructor,
            elements: alloc_vec_in(self.arena, elements),
        })
    }

    /// One method, accessor or generator of a class body, with an optional
    /// `static` in front.
    fn class_element(&mut self, is_subclass: bool) -> ParseResult<PropertyNode<'a>> {
        let start = self.start;
        let line = self.line;
        let is_static = self.token_type == TokenType::Static;
        if is_static {
            self.next()?;
        }
        let generator = self.token_type == TokenType::Mul;
        if generator {
            self.next()?;
        }

        let is_ident = self.token_type == TokenType::Ident;
        let (key, key_name) = self.property_name()?;
        let mut flags = FunctionFlags::IS_METHOD;
        if !key.is_computed() {
            if !generator && is_ident && self.token_type != TokenType::LParen && matches!(key_name, "get" | "set") {
                let (key, key_name, function) = if key_name == "get" {
                    self.property_getter(start, line, flags)?
                } else {
                    self.property_setter(start, line, flags)?
                };
                self.verify_method_name(&key, key_name, is_static, generator, true)?;
                let is_getter = function.kind == FunctionKind::Getter;
                return Ok(PropertyNode {
                    range: self.range_from(start),
                    key,
                    key_name,
                    value: None,
                    getter: is_getter.then_some(function),
                    setter: (!is_getter).then_some(function),
                    is_static,
                });
            }
            if !is_static && !generator && key_name == CONSTRUCTOR_NAME {
                flags |= FunctionFlags::IS_CLASS_CONSTRUCTOR;
                if is_subclass {
                    flags |= FunctionFlags::IS_SUBCLASS_CONSTRUCTOR;
                }
            }
            self.verify_method_name(&key, key_name, is_static, generator, false)?;
        }

        let method = self.property_method(key, key_name, start, line, generator, flags)?;
        Ok(PropertyNode {
            range: self.range_from(start),
            key,
            key_name,
            value: Some(self.alloc_expression(Expression::Function(method))),
            getter: None,
            setter: None,
            is_static,
        })
    }

    /// A constructor may not be a generator or an accessor, and no static
    /// member may be called `prototype`.
    fn verify_method_name(
        &self,
        key: &PropertyKey<'a>,
        key_name: &str,
        is_static: bool,
        generator: bool,
        accessor: bool,
    ) -> ParseResult<()> {
        if key.is_computed() {
            return Ok(());
        }
        let message = if !is_static && generator && key_name == CONSTRUCTOR_NAME {
            &messages::GENERATOR_CONSTRUCTOR
        } else if !is_static && accessor && key_name == CONSTRUCTOR_NAME {
            &messages::ACCESSOR_CONSTRUCTOR
        } else if is_static && key_name == "prototype" {
            &messages::STATIC_PROTOTYPE_METHOD
        } else {
            return Ok(());
        };
        Err(self.error_in_range(ParseErrorKind::Syntax, message, &[], key.range()))
    }

    /// The constructor of a class without one: empty, or
    /// `(...args) { super(...args); }` in a derived class.
    fn default_class_constructor(
        &mut self,
        start: u32,
        line: u32,
        class_name: Option<IdentNode<'a>>,
        is_subclass: bool,
    ) -> ParseResult<&'a FunctionNode<'a>> {
        let range = self.range_from(start);
        let at = TextRange::empty(start);
        let ident = class_name.unwrap_or_else(|| IdentNode::new(at, CONSTRUCTOR_NAME));
        let args = IdentNode::new(at, "args").with_flags(IdentFlags::REST_PARAMETER);

        let (frame, ()) = self.in_function(ident, start, FunctionKind::Normal, line, |parser| {
            let function = parser.current_function_mut();
            function.set_flag(FunctionFlags::IS_METHOD | FunctionFlags::IS_CLASS_CONSTRUCTOR);
            if class_name.is_none() {
                function.set_flag(FunctionFlags::IS_ANONYMOUS);
            }
            if is_subclass {
                function.set_flag(FunctionFlags::IS_SUBCLASS_CONSTRUCTOR | FunctionFlags::HAS_DIRECT_SUPER);
                function.simple_parameter_list = false;
                parser.bind_parameter(args);
            }
            Ok(())
        })?;

        let mut statements = Vec::new();
        if is_subclass {
            let super_ident = IdentNode::new(at, "super").with_flags(IdentFlags::DIRECT_SUPER);
            let spread = Expression::Unary(UnaryNode {
                range,
                op: TokenType::Spread,
                expression: self.alloc_expression(Expression::Ident(args)),
            });
            let call = self.alloc_expression(Expression::Call(CallNode {
                range,
                line,
                function: self.alloc_expression(Expression::Ident(super_ident)),
                args: alloc_vec_in(self.arena, vec![spread]),
                is_new: false,
            }));
            statements.push(Statement::Expression(ExpressionStatement {
                range,
                line,
                expression: call,
            }));
        }
        let body = Block {
            range,
            statements: alloc_vec_in(self.arena, statements),
            flags: BlockFlags::IS_BODY,
        };
        Ok(self.finish_function(frame, body, range))
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use crate::parser::{parse_script, ParseOutcome};
    use bumpalo::Bump;
    use esfront_ast::visitor::collect_functions;
    use esfront_ast::*;
    use esfront_core::Source;

    fn es6() -> ParserOptions {
        ParserOptions {
            es6: true,
            ..Default::default()
        }
    }

    fn parse<'a>(arena: &'a Bump, source: &'a Source) -> ParseOutcome<'a> {
        let outcome = parse_script(arena, source, es6()).unwrap();
        assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
        outcome
    }

    fn error_codes(text: &str) -> Vec<u32> {
        let arena = Bump::new();
        let source = Source::new("test.js", text);
        let outcome = parse_script(&arena, &source, es6()).unwrap();
        outcome.diagnostics.diagnostics().iter().map(|d| d.code).collect()
    }

    fn declared_class<'a>(outcome: &ParseOutcome<'a>) -> &'a ClassNode<'a> {
        match outcome.program.body.statements[0] {
            Statement::Var(VarNode {
                init: Some(Expression::Class(class)),
                flags,
                ..
            }) => {
                assert!(flags.contains(VarFlags::IS_CONST));
                class
            }
            other => panic!("expected a class declaration, found {:?}", other),
        }
    }

    #[test]
    fn test_class_declaration_elements() {
        let arena = Bump::new();
        let source = Source::new(
            "test.js",
            "class A {\n\
               constructor(x) { this.x = x; }\n\
               get v() { return this.x; };\n\
               set v(y) { this.x = y; }\n\
               static make() { return new A(1); }\n\
               *items() {}\n\
               [key]() {}\n\
             }",
        );
        let outcome = parse(&arena, &source);
        let class = declared_class(&outcome);
        assert_eq!(class.ident.map(|ident| ident.name), Some("A"));
        assert!(class.heritage.is_none());
        assert_eq!(class.constructor.parameters.len(), 1);
        assert!(class.constructor.flags.contains(FunctionFlags::IS_CLASS_CONSTRUCTOR | FunctionFlags::IS_STRICT));

        let names: Vec<&str> = class.elements.iter().map(|element| element.key_name).collect();
        assert_eq!(names, vec!["v", "make", "items", "[key]"]);
        let accessor = &class.elements[0];
        assert!(accessor.getter.is_some() && accessor.setter.is_some());
        assert!(class.elements[1].is_static);
        assert!(class.elements[3].key.is_computed());
    }

    #[test]
    fn test_default_constructors() {
        let arena = Bump::new();
        let source = Source::new("test.js", "class A {}\nclass B extends A {}");
        let outcome = parse(&arena, &source);
        let statements = outcome.program.body.statements;
        let constructors: Vec<&FunctionNode> = statements
            .iter()
            .filter_map(|statement| match statement {
                Statement::Var(VarNode {
                    init: Some(Expression::Class(class)),
                    ..
                }) => Some(class.constructor),
                _ => None,
            })
            .collect();

        assert!(constructors[0].parameters.is_empty());
        assert!(constructors[0].body.statements.is_empty());

        let derived = constructors[1];
        assert!(derived.flags.contains(FunctionFlags::IS_SUBCLASS_CONSTRUCTOR | FunctionFlags::HAS_DIRECT_SUPER));
        assert!(derived.parameters[0].flags.contains(IdentFlags::REST_PARAMETER));
        let Statement::Expression(ExpressionStatement {
            expression: Expression::Call(call),
            ..
        }) = derived.body.statements[0]
        else {
            panic!("expected the forwarding super call");
        };
        assert!(matches!(call.function, Expression::Ident(ident) if ident.flags.contains(IdentFlags::DIRECT_SUPER)));
        assert!(matches!(call.args[0], Expression::Unary(UnaryNode { op: TokenType::Spread, .. })));
    }

    #[test]
    fn test_class_expression_and_heritage() {
        let arena = Bump::new();
        let source = Source::new("test.js", "x = class extends mixin(Base) { m() { return super.m(); } };");
        let outcome = parse(&arena, &source);
        let Statement::Expression(ExpressionStatement {
            expression: Expression::Binary(assign),
            ..
        }) = outcome.program.body.statements[0]
        else {
            panic!("expected an assignment");
        };
        let Expression::Class(class) = assign.rhs else {
            panic!("expected a class expression");
        };
        assert!(class.ident.is_none());
        assert!(matches!(class.heritage, Some(Expression::Call(_))));
        assert!(class.constructor.is_anonymous());

        let method = collect_functions(outcome.program).into_iter().find(|f| f.ident.name == "m").unwrap();
        assert!(method.flags.contains(FunctionFlags::IS_METHOD | FunctionFlags::USES_SUPER));
    }

    #[test]
    fn test_class_body_is_strict() {
        assert_eq!(error_codes("class A { m() { with (a) {} } }"), vec![1202]);
        assert_eq!(error_codes("class eval {}"), vec![1200]);
        assert!(error_codes("class A {} with (a) {}").is_empty());
    }

    #[test]
    fn test_constructor_rules() {
        assert_eq!(error_codes("class A { constructor() {} constructor() {} }"), vec![1127]);
        assert_eq!(error_codes("class A { *constructor() {} }"), vec![1128]);
        assert_eq!(error_codes("class A { get constructor() {} }"), vec![1129]);
        assert_eq!(error_codes("class A { static prototype() {} }"), vec![1130]);
        assert!(error_codes("class A { static constructor() {} prototype() {} }").is_empty());
    }

    #[test]
    fn test_super_calls_only_in_derived_constructors() {
        assert!(error_codes("class A extends B { constructor() { super(); } }").is_empty());
        assert!(error_codes("class A extends B { constructor() { (() => super())(); } }").is_empty());
        assert_eq!(error_codes("class A { constructor() { super(); } }"), vec![1131]);
        assert_eq!(error_codes("class A extends B { m() { super(); } }"), vec![1131]);
        assert_eq!(error_codes("function f() { super.x; }"), vec![1131]);
        assert_eq!(error_codes("class A { m() { function g() { super.x; } } }"), vec![1131]);
    }

    #[test]
    fn test_class_declaration_position() {
        assert_eq!(error_codes("if (a) class A {}"), vec![1101]);
        assert!(error_codes("{ class A {} }").is_empty());
    }
}
