//! Flag sets and small value types attached to AST nodes.

use std::fmt;

bitflags::bitflags! {
    /// Facts about a function discovered while parsing it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionFlags: u32 {
        const IS_STRICT                  = 1 << 0;
        const IS_ANONYMOUS               = 1 << 1;
        const IS_DECLARED                = 1 << 2;
        const IS_PROGRAM                 = 1 << 3;
        const USES_ARGUMENTS             = 1 << 4;
        const DEFINES_ARGUMENTS          = 1 << 5;
        /// The function calls `eval` directly.
        const HAS_EVAL                   = 1 << 6;
        /// Some nested function calls `eval`.
        const HAS_NESTED_EVAL            = 1 << 7;
        const HAS_SCOPE_BLOCK            = 1 << 8;
        const USES_THIS                  = 1 << 9;
        const HAS_FUNCTION_DECLARATIONS  = 1 << 10;
        const HAS_WITH                   = 1 << 11;
        /// A class or object literal method, accessors included.
        const IS_METHOD                  = 1 << 12;
        const IS_CLASS_CONSTRUCTOR       = 1 << 13;
        /// Constructor of a class with an `extends` clause.
        const IS_SUBCLASS_CONSTRUCTOR    = 1 << 14;
        /// `super.x` or `super[x]` appears in the method.
        const USES_SUPER                 = 1 << 15;
        /// `super(...)` appears in the constructor.
        const HAS_DIRECT_SUPER           = 1 << 16;
        const USES_NEW_TARGET            = 1 << 17;

        const HAS_ANY_EVAL = Self::HAS_EVAL.bits() | Self::HAS_NESTED_EVAL.bits();
        /// The function needs its parent's scope object at runtime.
        const NEEDS_PARENT_SCOPE = Self::HAS_ANY_EVAL.bits() | Self::HAS_WITH.bits();
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BlockFlags: u32 {
        const NEEDS_SCOPE      = 1 << 0;
        /// Not written in source with braces.
        const IS_SYNTHETIC     = 1 << 1;
        /// The body block of a function.
        const IS_BODY          = 1 << 2;
        const IS_SWITCH_BLOCK  = 1 << 3;
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VarFlags: u32 {
        const IS_LET                        = 1 << 0;
        const IS_CONST                      = 1 << 1;
        const IS_FUNCTION_DECLARATION       = 1 << 2;
        const IS_LAST_FUNCTION_DECLARATION  = 1 << 3;
        const IS_EXPORT                     = 1 << 4;

        const IS_BLOCK_SCOPED = Self::IS_LET.bits() | Self::IS_CONST.bits();
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ForFlags: u32 {
        const IS_FOR_IN            = 1 << 0;
        const IS_FOR_EACH          = 1 << 1;
        const IS_FOR_OF            = 1 << 2;
        /// `let`/`const` loop variables get a fresh binding per iteration.
        const PER_ITERATION_SCOPE  = 1 << 3;
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IdentFlags: u32 {
        const PROPERTY_NAME       = 1 << 0;
        const FUTURE_STRICT_NAME  = 1 << 1;
        const DECLARED_HERE       = 1 << 2;
        /// The identifier was written with a `\u` escape.
        const ESCAPED             = 1 << 3;
        const REST_PARAMETER      = 1 << 4;
        /// A parameter with an initializer, desugared into the body.
        const DEFAULT_PARAMETER   = 1 << 5;
        /// The callee of a `super(...)` call.
        const DIRECT_SUPER        = 1 << 6;
    }
}

/// The syntactic form of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Script,
    Module,
    Normal,
    Arrow,
    Generator,
    Getter,
    Setter,
}

/// Stable identity of a function: the start offset of its first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl FunctionId {
    /// Identity of the synthetic program function.
    pub const PROGRAM: FunctionId = FunctionId(u32::MAX);
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == FunctionId::PROGRAM {
            write!(f, "program")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Where the parser stood just before a function's closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParserState {
    /// Offset of the closing brace.
    pub position: u32,
    /// 1-based line of the closing brace.
    pub line: u32,
    /// Offset of the start of that line.
    pub line_position: u32,
}

/// Request kinds for runtime helper nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeRequest {
    /// Builds the frozen strings object passed to a template tag.
    GetTemplateObject,
}
