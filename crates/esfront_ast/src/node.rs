//! AST node definitions.
//!
//! Nodes are allocated in a bump arena owned by the caller and are immutable
//! once built. Children are arena references or arena slices, so every node
//! is cheap to copy and never owns heap memory.

use crate::token_type::TokenType;
use crate::types::*;
use esfront_core::text::TextRange;

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

// ============================================================================
// Functions and blocks
// ============================================================================

/// A function, the program itself included.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub id: FunctionId,
    /// The name written in source, or the name borrowed from context for
    /// anonymous functions.
    pub ident: IdentNode<'a>,
    /// Collision-free internal name (`outer$inner`, `f-1`, ...).
    pub name: &'a str,
    pub kind: FunctionKind,
    pub parameters: NodeList<'a, IdentNode<'a>>,
    pub body: Block<'a>,
    pub flags: FunctionFlags,
    /// Recorded position of the closing brace, absent for the program.
    pub end_parser_state: Option<ParserState>,
    /// Import and export entries when the function is a module.
    pub module: Option<&'a ModuleNode<'a>>,
}

impl<'a> FunctionNode<'a> {
    pub fn is_strict(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_STRICT)
    }

    pub fn is_anonymous(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_ANONYMOUS)
    }

    pub fn is_program(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_PROGRAM)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'a> {
    pub range: TextRange,
    pub statements: NodeList<'a, Statement<'a>>,
    pub flags: BlockFlags,
}

impl<'a> Block<'a> {
    pub fn needs_scope(&self) -> bool {
        self.flags.contains(BlockFlags::NEEDS_SCOPE)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

// ============================================================================
// Modules
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportEntry<'a> {
    pub range: TextRange,
    pub module_request: &'a str,
    /// `*` for namespace imports, `default` for default imports.
    pub import_name: &'a str,
    pub local_name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportEntry<'a> {
    pub range: TextRange,
    /// Absent for `export * from "m"`.
    pub export_name: Option<&'a str>,
    pub local_name: Option<&'a str>,
    pub module_request: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleNode<'a> {
    pub requested_modules: NodeList<'a, &'a str>,
    pub imports: NodeList<'a, ImportEntry<'a>>,
    pub exports: NodeList<'a, ExportEntry<'a>>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statement<'a> {
    Block(BlockStatement<'a>),
    Var(VarNode<'a>),
    Empty(EmptyNode),
    Expression(ExpressionStatement<'a>),
    If(IfNode<'a>),
    While(WhileNode<'a>),
    For(ForNode<'a>),
    Continue(JumpNode<'a>),
    Break(JumpNode<'a>),
    Return(ReturnNode<'a>),
    With(WithNode<'a>),
    Switch(SwitchNode<'a>),
    Label(LabelNode<'a>),
    Throw(ThrowNode<'a>),
    Try(TryNode<'a>),
    Debugger(DebuggerNode),
}

impl<'a> Statement<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            Statement::Block(n) => n.range,
            Statement::Var(n) => n.range,
            Statement::Empty(n) => n.range,
            Statement::Expression(n) => n.range,
            Statement::If(n) => n.range,
            Statement::While(n) => n.range,
            Statement::For(n) => n.range,
            Statement::Continue(n) | Statement::Break(n) => n.range,
            Statement::Return(n) => n.range,
            Statement::With(n) => n.range,
            Statement::Switch(n) => n.range,
            Statement::Label(n) => n.range,
            Statement::Throw(n) => n.range,
            Statement::Try(n) => n.range,
            Statement::Debugger(n) => n.range,
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            Statement::Block(n) => n.line,
            Statement::Var(n) => n.line,
            Statement::Empty(n) => n.line,
            Statement::Expression(n) => n.line,
            Statement::If(n) => n.line,
            Statement::While(n) => n.line,
            Statement::For(n) => n.line,
            Statement::Continue(n) | Statement::Break(n) => n.line,
            Statement::Return(n) => n.line,
            Statement::With(n) => n.line,
            Statement::Switch(n) => n.line,
            Statement::Label(n) => n.line,
            Statement::Throw(n) => n.line,
            Statement::Try(n) => n.line,
            Statement::Debugger(n) => n.line,
        }
    }

    /// The hoisted function a declaration statement introduces.
    pub fn as_function_declaration(&self) -> Option<&'a FunctionNode<'a>> {
        match self {
            Statement::Var(var) if var.flags.contains(VarFlags::IS_FUNCTION_DECLARATION) => {
                match var.init {
                    Some(&Expression::Function(function)) => Some(function),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Whether this is the placeholder left by error recovery.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Statement::Expression(ExpressionStatement {
                expression: Expression::Error(_),
                ..
            })
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStatement<'a> {
    pub range: TextRange,
    pub line: u32,
    pub block: Block<'a>,
}

/// One declared name. `var a, b` yields two consecutive nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub name: IdentNode<'a>,
    pub init: Option<&'a Expression<'a>>,
    pub flags: VarFlags,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmptyNode {
    pub range: TextRange,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpressionStatement<'a> {
    pub range: TextRange,
    pub line: u32,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub test: &'a Expression<'a>,
    pub pass: Block<'a>,
    pub fail: Option<Block<'a>>,
}

/// `while` and `do`/`while` loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub is_do_while: bool,
    pub test: &'a Expression<'a>,
    pub body: Block<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForInit<'a> {
    /// Declarations in the loop header; for-in/of loops carry exactly one.
    Vars(NodeList<'a, VarNode<'a>>),
    Expression(&'a Expression<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub init: Option<ForInit<'a>>,
    /// The condition, or the iterated object for for-in/of loops.
    pub test: Option<&'a Expression<'a>>,
    pub modify: Option<&'a Expression<'a>>,
    pub body: Block<'a>,
    pub flags: ForFlags,
}

impl<'a> ForNode<'a> {
    pub fn is_for_in(&self) -> bool {
        self.flags.contains(ForFlags::IS_FOR_IN)
    }

    pub fn is_for_of(&self) -> bool {
        self.flags.contains(ForFlags::IS_FOR_OF)
    }
}

/// `break` and `continue`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub label: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub expression: Option<&'a Expression<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub expression: &'a Expression<'a>,
    pub body: Block<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseNode<'a> {
    pub range: TextRange,
    /// `None` for the `default` clause.
    pub test: Option<&'a Expression<'a>>,
    pub body: Block<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub expression: &'a Expression<'a>,
    pub cases: NodeList<'a, CaseNode<'a>>,
    /// Index into `cases` of the `default` clause.
    pub default_case: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub label: &'a str,
    pub body: Block<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub exception: IdentNode<'a>,
    /// Condition of a `catch (e if cond)` clause.
    pub condition: Option<&'a Expression<'a>>,
    pub body: Block<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TryNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub body: Block<'a>,
    pub catches: NodeList<'a, CatchNode<'a>>,
    pub finally_body: Option<Block<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebuggerNode {
    pub range: TextRange,
    pub line: u32,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expression<'a> {
    Ident(IdentNode<'a>),
    This(TextRange),
    Literal(LiteralNode<'a>),
    Array(ArrayLiteralNode<'a>),
    Object(ObjectNode<'a>),
    Function(&'a FunctionNode<'a>),
    Class(ClassNode<'a>),
    Access(AccessNode<'a>),
    Index(IndexNode<'a>),
    Call(CallNode<'a>),
    Unary(UnaryNode<'a>),
    Binary(BinaryNode<'a>),
    Ternary(TernaryNode<'a>),
    Runtime(RuntimeNode<'a>),
    Error(ErrorNode),
}

impl<'a> Expression<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            Expression::Ident(n) => n.range,
            Expression::This(range) => *range,
            Expression::Literal(n) => n.range,
            Expression::Array(n) => n.range,
            Expression::Object(n) => n.range,
            Expression::Function(n) => n.range,
            Expression::Class(n) => n.range,
            Expression::Access(n) => n.range,
            Expression::Index(n) => n.range,
            Expression::Call(n) => n.range,
            Expression::Unary(n) => n.range,
            Expression::Binary(n) => n.range,
            Expression::Ternary(n) => n.range,
            Expression::Runtime(n) => n.range,
            Expression::Error(n) => n.range,
        }
    }

    /// Whether the expression may appear on the left of an assignment or as
    /// the operand of `++`/`--`.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expression::Ident(_) | Expression::Access(_) | Expression::Index(_)
        )
    }

    pub fn as_ident(&self) -> Option<&IdentNode<'a>> {
        match self {
            Expression::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&'a FunctionNode<'a>> {
        match self {
            Expression::Function(function) => Some(*function),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentNode<'a> {
    pub range: TextRange,
    pub name: &'a str,
    pub flags: IdentFlags,
}

impl<'a> IdentNode<'a> {
    pub fn new(range: TextRange, name: &'a str) -> Self {
        Self {
            range,
            name,
            flags: IdentFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: IdentFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn is_future_strict_name(&self) -> bool {
        self.flags.contains(IdentFlags::FUTURE_STRICT_NAME)
    }
}

/// A numeric literal value, narrowed to `Integer` when it fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i32),
    Double(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(value) => value as f64,
            Number::Double(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'a> {
    Null,
    Boolean(bool),
    Number(Number),
    String(&'a str),
    Regex { pattern: &'a str, flags: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralNode<'a> {
    pub range: TextRange,
    pub value: LiteralValue<'a>,
    /// The token the literal was read from (`EscString`, `OctalLegacy`, ...).
    pub token_type: TokenType,
}

impl<'a> LiteralNode<'a> {
    pub fn as_str(&self) -> Option<&'a str> {
        match self.value {
            LiteralValue::String(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayLiteralNode<'a> {
    pub range: TextRange,
    /// `None` marks an elision.
    pub elements: NodeList<'a, Option<Expression<'a>>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyKey<'a> {
    Ident(IdentNode<'a>),
    Literal(LiteralNode<'a>),
    /// `[expression]`; the range covers the brackets.
    Computed { range: TextRange, expression: &'a Expression<'a> },
}

impl<'a> PropertyKey<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            PropertyKey::Ident(ident) => ident.range,
            PropertyKey::Literal(literal) => literal.range,
            PropertyKey::Computed { range, .. } => *range,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, PropertyKey::Computed { .. })
    }
}

/// One object literal entry or class element. A getter and setter for the
/// same key share a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyNode<'a> {
    pub range: TextRange,
    pub key: PropertyKey<'a>,
    /// The key as a property name string (`1`, `"a b"`, `x`). Computed keys
    /// use their source text.
    pub key_name: &'a str,
    pub value: Option<&'a Expression<'a>>,
    pub getter: Option<&'a FunctionNode<'a>>,
    pub setter: Option<&'a FunctionNode<'a>>,
    /// A `static` class element.
    pub is_static: bool,
}

/// `class Name extends Base { ... }`. A class without a written constructor
/// gets an empty one, or `constructor(...args) { super(...args); }` when it
/// extends another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub ident: Option<IdentNode<'a>>,
    pub heritage: Option<&'a Expression<'a>>,
    pub constructor: &'a FunctionNode<'a>,
    pub elements: NodeList<'a, PropertyNode<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectNode<'a> {
    pub range: TextRange,
    pub properties: NodeList<'a, PropertyNode<'a>>,
}

/// `base.property`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessNode<'a> {
    pub range: TextRange,
    pub base: &'a Expression<'a>,
    pub property: IdentNode<'a>,
}

/// `base[index]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexNode<'a> {
    pub range: TextRange,
    pub base: &'a Expression<'a>,
    pub index: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallNode<'a> {
    pub range: TextRange,
    pub line: u32,
    pub function: &'a Expression<'a>,
    pub args: NodeList<'a, Expression<'a>>,
    /// A `new` expression.
    pub is_new: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryNode<'a> {
    pub range: TextRange,
    /// The operator; postfix `++`/`--` are `IncPostfix`/`DecPostfix`.
    pub op: TokenType,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryNode<'a> {
    pub range: TextRange,
    /// Arithmetic, logical, comparison, comma or assignment operator.
    pub op: TokenType,
    pub lhs: &'a Expression<'a>,
    pub rhs: &'a Expression<'a>,
}

impl<'a> BinaryNode<'a> {
    pub fn is_assignment(&self) -> bool {
        self.op.is_assignment()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryNode<'a> {
    pub range: TextRange,
    pub test: &'a Expression<'a>,
    pub true_expression: &'a Expression<'a>,
    pub false_expression: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeNode<'a> {
    pub range: TextRange,
    pub request: RuntimeRequest,
    pub args: NodeList<'a, Expression<'a>>,
}

/// Placeholder for a statement that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorNode {
    pub range: TextRange,
}
