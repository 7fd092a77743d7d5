//! TokenType - every lexical kind the lexer can produce.
//!
//! Each entry carries its kind class, its source text (for operators and
//! keywords), its binary precedence and its associativity. The parser climbs
//! expressions with `precedence()` and `is_left_associative()`.

use std::borrow::Cow;
use std::fmt;

/// Classification of a [`TokenType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Special,
    Unary,
    Binary,
    BracketL,
    BracketR,
    Keyword,
    Literal,
    /// Types that only exist after recasting by the parser.
    Ir,
    /// Reserved in strict mode only.
    FutureStrict,
    /// Always reserved.
    Future,
}

macro_rules! token_types {
    ($($variant:ident => ($kind:ident, $name:expr, $prec:expr, $left:expr)),* $(,)?) => {
        /// The type of a lexical token.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum TokenType {
            $($variant),*
        }

        impl TokenType {
            /// All token types, indexed by discriminant.
            pub const VALUES: &'static [TokenType] = &[$(TokenType::$variant),*];

            pub fn kind(self) -> TokenKind {
                match self {
                    $(TokenType::$variant => TokenKind::$kind),*
                }
            }

            /// Source text of an operator, keyword or fixed literal.
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $(TokenType::$variant => $name),*
                }
            }

            /// Binary precedence; 0 when the token is not a binary operator.
            pub fn precedence(self) -> u8 {
                match self {
                    $(TokenType::$variant => $prec),*
                }
            }

            pub fn is_left_associative(self) -> bool {
                match self {
                    $(TokenType::$variant => $left),*
                }
            }

            fn variant_name(self) -> &'static str {
                match self {
                    $(TokenType::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

token_types! {
    // ========================================================================
    // Special
    // ========================================================================
    Error => (Special, None, 0, true),
    Eof => (Special, None, 0, true),
    Eol => (Special, None, 0, true),
    Comment => (Special, None, 0, true),
    DirectiveComment => (Special, None, 0, true),

    // ========================================================================
    // Punctuators
    // ========================================================================
    Not => (Unary, Some("!"), 0, false),
    Ne => (Binary, Some("!="), 9, true),
    NeStrict => (Binary, Some("!=="), 9, true),
    Mod => (Binary, Some("%"), 13, true),
    AssignMod => (Binary, Some("%="), 2, false),
    BitAnd => (Binary, Some("&"), 8, true),
    And => (Binary, Some("&&"), 5, true),
    AssignBitAnd => (Binary, Some("&="), 2, false),
    LParen => (BracketL, Some("("), 16, true),
    RParen => (BracketR, Some(")"), 0, true),
    Mul => (Binary, Some("*"), 13, true),
    AssignMul => (Binary, Some("*="), 2, false),
    Add => (Binary, Some("+"), 12, true),
    IncPrefix => (Unary, Some("++"), 15, true),
    AssignAdd => (Binary, Some("+="), 2, false),
    CommaRight => (Binary, Some(","), 1, true),
    Sub => (Binary, Some("-"), 12, true),
    DecPrefix => (Unary, Some("--"), 15, true),
    AssignSub => (Binary, Some("-="), 2, false),
    Period => (BracketL, Some("."), 17, true),
    Div => (Binary, Some("/"), 13, true),
    AssignDiv => (Binary, Some("/="), 2, false),
    Colon => (Binary, Some(":"), 0, true),
    Semicolon => (Binary, Some(";"), 0, true),
    Lt => (Binary, Some("<"), 10, true),
    Shl => (Binary, Some("<<"), 11, true),
    AssignShl => (Binary, Some("<<="), 2, false),
    Le => (Binary, Some("<="), 10, true),
    Assign => (Binary, Some("="), 2, false),
    Eq => (Binary, Some("=="), 9, true),
    EqStrict => (Binary, Some("==="), 9, true),
    Arrow => (Binary, Some("=>"), 0, false),
    Gt => (Binary, Some(">"), 10, true),
    Ge => (Binary, Some(">="), 10, true),
    Sar => (Binary, Some(">>"), 11, true),
    AssignSar => (Binary, Some(">>="), 2, false),
    Shr => (Binary, Some(">>>"), 11, true),
    AssignShr => (Binary, Some(">>>="), 2, false),
    Ternary => (Binary, Some("?"), 3, false),
    LBracket => (BracketL, Some("["), 17, true),
    RBracket => (BracketR, Some("]"), 0, true),
    BitXor => (Binary, Some("^"), 7, true),
    AssignBitXor => (Binary, Some("^="), 2, false),
    LBrace => (BracketL, Some("{"), 0, true),
    BitOr => (Binary, Some("|"), 6, true),
    AssignBitOr => (Binary, Some("|="), 2, false),
    Or => (Binary, Some("||"), 4, true),
    RBrace => (BracketR, Some("}"), 0, true),
    BitNot => (Unary, Some("~"), 0, false),
    Ellipsis => (Unary, Some("..."), 0, true),

    // ========================================================================
    // Keywords
    // ========================================================================
    Break => (Keyword, Some("break"), 0, true),
    Case => (Keyword, Some("case"), 0, true),
    Catch => (Keyword, Some("catch"), 0, true),
    Class => (Future, Some("class"), 0, true),
    Const => (Keyword, Some("const"), 0, true),
    Continue => (Keyword, Some("continue"), 0, true),
    Debugger => (Keyword, Some("debugger"), 0, true),
    Default => (Keyword, Some("default"), 0, true),
    Delete => (Unary, Some("delete"), 0, true),
    Do => (Keyword, Some("do"), 0, true),
    Else => (Keyword, Some("else"), 0, true),
    Enum => (Future, Some("enum"), 0, true),
    Export => (Future, Some("export"), 0, true),
    Extends => (Future, Some("extends"), 0, true),
    False => (Literal, Some("false"), 0, true),
    Finally => (Keyword, Some("finally"), 0, true),
    For => (Keyword, Some("for"), 0, true),
    Function => (Keyword, Some("function"), 0, true),
    If => (Keyword, Some("if"), 0, true),
    Implements => (FutureStrict, Some("implements"), 0, true),
    Import => (Future, Some("import"), 0, true),
    In => (Binary, Some("in"), 10, true),
    InstanceOf => (Binary, Some("instanceof"), 10, true),
    Interface => (FutureStrict, Some("interface"), 0, true),
    Let => (FutureStrict, Some("let"), 0, true),
    New => (Unary, Some("new"), 17, false),
    Null => (Literal, Some("null"), 0, true),
    Package => (FutureStrict, Some("package"), 0, true),
    Private => (FutureStrict, Some("private"), 0, true),
    Protected => (FutureStrict, Some("protected"), 0, true),
    Public => (FutureStrict, Some("public"), 0, true),
    Return => (Keyword, Some("return"), 0, true),
    Static => (FutureStrict, Some("static"), 0, true),
    Super => (Future, Some("super"), 0, true),
    Switch => (Keyword, Some("switch"), 0, true),
    This => (Keyword, Some("this"), 0, true),
    Throw => (Keyword, Some("throw"), 0, true),
    True => (Literal, Some("true"), 0, true),
    Try => (Keyword, Some("try"), 0, true),
    TypeOf => (Unary, Some("typeof"), 0, true),
    Var => (Keyword, Some("var"), 0, true),
    Void => (Unary, Some("void"), 0, true),
    While => (Keyword, Some("while"), 0, true),
    With => (Keyword, Some("with"), 0, true),
    Yield => (FutureStrict, Some("yield"), 0, true),

    // ========================================================================
    // Literals
    // ========================================================================
    Decimal => (Literal, None, 0, true),
    Hexadecimal => (Literal, None, 0, true),
    OctalLegacy => (Literal, None, 0, true),
    Octal => (Literal, None, 0, true),
    BinaryNumber => (Literal, None, 0, true),
    Floating => (Literal, None, 0, true),
    String => (Literal, None, 0, true),
    EscString => (Literal, None, 0, true),
    ExecString => (Literal, None, 0, true),
    Ident => (Literal, None, 0, true),
    Regex => (Literal, None, 0, true),
    Xml => (Literal, None, 0, true),
    Template => (Literal, None, 0, true),
    TemplateHead => (Literal, None, 0, true),
    TemplateMiddle => (Literal, None, 0, true),
    TemplateTail => (Literal, None, 0, true),

    // ========================================================================
    // Parser-internal recasts
    // ========================================================================
    IncPostfix => (Ir, Some("++"), 15, true),
    DecPostfix => (Ir, Some("--"), 15, true),
    Spread => (Ir, Some("..."), 0, true),
    YieldStar => (Ir, Some("yield*"), 0, true),
}

impl TokenType {
    /// Reconstruct a token type from its discriminant.
    #[inline]
    pub fn from_u8(value: u8) -> Option<TokenType> {
        Self::VALUES.get(value as usize).copied()
    }

    /// The source text, or the lower-cased type name for value-carrying tokens.
    pub fn name_or_type(self) -> Cow<'static, str> {
        match self.name() {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.variant_name().to_ascii_lowercase()),
        }
    }

    /// Whether the token is a binary, ternary or assignment operator usable in
    /// expression climbing. `in` is excluded when `no_in` is set.
    pub fn is_operator(self, no_in: bool) -> bool {
        self.kind() == TokenKind::Binary && (!no_in || self != TokenType::In) && self.precedence() != 0
    }

    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenType::Assign
                | TokenType::AssignAdd
                | TokenType::AssignSub
                | TokenType::AssignMul
                | TokenType::AssignDiv
                | TokenType::AssignMod
                | TokenType::AssignShl
                | TokenType::AssignSar
                | TokenType::AssignShr
                | TokenType::AssignBitAnd
                | TokenType::AssignBitOr
                | TokenType::AssignBitXor
        )
    }

    /// `&&` and `||`.
    pub fn is_logical(self) -> bool {
        matches!(self, TokenType::And | TokenType::Or)
    }

    /// Whether the token is a word that may be used as a property name.
    pub fn is_reserved_word(self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Keyword | TokenKind::Future | TokenKind::FutureStrict
        ) || matches!(
            self,
            TokenType::True
                | TokenType::False
                | TokenType::Null
                | TokenType::In
                | TokenType::InstanceOf
                | TokenType::Delete
                | TokenType::New
                | TokenType::TypeOf
                | TokenType::Void
        )
    }

    /// Keyword lookup for a scanned identifier.
    pub fn from_keyword(text: &str) -> Option<TokenType> {
        let token = match text {
            "break" => TokenType::Break,
            "case" => TokenType::Case,
            "catch" => TokenType::Catch,
            "class" => TokenType::Class,
            "const" => TokenType::Const,
            "continue" => TokenType::Continue,
            "debugger" => TokenType::Debugger,
            "default" => TokenType::Default,
            "delete" => TokenType::Delete,
            "do" => TokenType::Do,
            "else" => TokenType::Else,
            "enum" => TokenType::Enum,
            "export" => TokenType::Export,
            "extends" => TokenType::Extends,
            "false" => TokenType::False,
            "finally" => TokenType::Finally,
            "for" => TokenType::For,
            "function" => TokenType::Function,
            "if" => TokenType::If,
            "implements" => TokenType::Implements,
            "import" => TokenType::Import,
            "in" => TokenType::In,
            "instanceof" => TokenType::InstanceOf,
            "interface" => TokenType::Interface,
            "let" => TokenType::Let,
            "new" => TokenType::New,
            "null" => TokenType::Null,
            "package" => TokenType::Package,
            "private" => TokenType::Private,
            "protected" => TokenType::Protected,
            "public" => TokenType::Public,
            "return" => TokenType::Return,
            "static" => TokenType::Static,
            "super" => TokenType::Super,
            "switch" => TokenType::Switch,
            "this" => TokenType::This,
            "throw" => TokenType::Throw,
            "true" => TokenType::True,
            "try" => TokenType::Try,
            "typeof" => TokenType::TypeOf,
            "var" => TokenType::Var,
            "void" => TokenType::Void,
            "while" => TokenType::While,
            "with" => TokenType::With,
            "yield" => TokenType::Yield,
            _ => return None,
        };
        Some(token)
    }

    /// Longest-match operator lookup on up to four characters of lookahead.
    pub fn lookup_operator(ch0: char, ch1: char, ch2: char, ch3: char) -> Option<TokenType> {
        let token = match ch0 {
            '!' => match (ch1, ch2) {
                ('=', '=') => TokenType::NeStrict,
                ('=', _) => TokenType::Ne,
                _ => TokenType::Not,
            },
            '%' => if ch1 == '=' { TokenType::AssignMod } else { TokenType::Mod },
            '&' => match ch1 {
                '&' => TokenType::And,
                '=' => TokenType::AssignBitAnd,
                _ => TokenType::BitAnd,
            },
            '(' => TokenType::LParen,
            ')' => TokenType::RParen,
            '*' => if ch1 == '=' { TokenType::AssignMul } else { TokenType::Mul },
            '+' => match ch1 {
                '+' => TokenType::IncPrefix,
                '=' => TokenType::AssignAdd,
                _ => TokenType::Add,
            },
            ',' => TokenType::CommaRight,
            '-' => match ch1 {
                '-' => TokenType::DecPrefix,
                '=' => TokenType::AssignSub,
                _ => TokenType::Sub,
            },
            '.' => if ch1 == '.' && ch2 == '.' { TokenType::Ellipsis } else { TokenType::Period },
            '/' => if ch1 == '=' { TokenType::AssignDiv } else { TokenType::Div },
            ':' => TokenType::Colon,
            ';' => TokenType::Semicolon,
            '<' => match (ch1, ch2) {
                ('<', '=') => TokenType::AssignShl,
                ('<', _) => TokenType::Shl,
                ('=', _) => TokenType::Le,
                _ => TokenType::Lt,
            },
            '=' => match (ch1, ch2) {
                ('=', '=') => TokenType::EqStrict,
                ('=', _) => TokenType::Eq,
                ('>', _) => TokenType::Arrow,
                _ => TokenType::Assign,
            },
            '>' => match (ch1, ch2, ch3) {
                ('>', '>', '=') => TokenType::AssignShr,
                ('>', '>', _) => TokenType::Shr,
                ('>', '=', _) => TokenType::AssignSar,
                ('>', _, _) => TokenType::Sar,
                ('=', _, _) => TokenType::Ge,
                _ => TokenType::Gt,
            },
            '?' => TokenType::Ternary,
            '[' => TokenType::LBracket,
            ']' => TokenType::RBracket,
            '^' => if ch1 == '=' { TokenType::AssignBitXor } else { TokenType::BitXor },
            '{' => TokenType::LBrace,
            '|' => match ch1 {
                '|' => TokenType::Or,
                '=' => TokenType::AssignBitOr,
                _ => TokenType::BitOr,
            },
            '}' => TokenType::RBrace,
            '~' => TokenType::BitNot,
            _ => return None,
        };
        Some(token)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name_or_type())
    }
}
