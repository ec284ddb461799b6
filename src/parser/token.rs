//! Token model and the token source consumed by the parser
//!
//! Turning characters into tokens happens outside this crate. The parser only
//! sees a [`TokenSource`]: something that can peek ahead, consume, and hand
//! out a cheap [`Cursor`] that fully captures its read position so a failed
//! production can rewind to it.
//!
//! Newline tokens are part of the stream so the source can count lines, but
//! [`TokenSource::peek`] and [`TokenSource::consume`] step over them.

use std::fmt;

/// Closed set of token tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    If,
    Else,
    Do,
    While,
    For,
    Switch,
    Case,
    Break,
    Continue,
    Default,
    Return,
    Goto,
    Typedef,
    Struct,
    Union,
    Enum,
    Signed,
    Unsigned,
    Void,
    Int,
    Char,
    Long,
    Short,
    Float,
    Double,
    Const,
    Static,
    Extern,
    Auto,
    Volatile,
    Register,
    Restrict,
    Inline,
    Sizeof,

    // Identifiers and literals
    Ident,
    LiteralInt,
    LiteralFloat,
    LiteralChar,
    LiteralString,

    // Single-character punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Dot,       // .
    Star,      // *
    Plus,      // +
    Minus,     // -
    Slash,     // /
    Percent,   // %
    Amp,       // &
    Pipe,      // |
    Caret,     // ^
    Tilde,     // ~
    Bang,      // !
    Lt,        // <
    Gt,        // >
    Assign,    // =
    Question,  // ?
    Colon,     // :

    // Multi-character operators
    PlusPlus,   // ++
    MinusMinus, // --
    Arrow,      // ->
    ShLeft,     // <<
    ShRight,    // >>
    Le,         // <=
    Ge,         // >=
    EqEq,       // ==
    Ne,         // !=
    AndAnd,     // &&
    OrOr,       // ||
    PlusEq,     // +=
    MinusEq,    // -=
    StarEq,     // *=
    SlashEq,    // /=
    PercentEq,  // %=
    AmpEq,      // &=
    PipeEq,     // |=
    CaretEq,    // ^=
    ShLeftEq,   // <<=
    ShRightEq,  // >>=

    Newline,
    Invalid,
    Eof,
}

impl TokenKind {
    /// `auto`, `register`, `static` or `extern`.
    pub fn is_storage_class(self) -> bool {
        matches!(
            self,
            TokenKind::Auto | TokenKind::Register | TokenKind::Static | TokenKind::Extern
        )
    }

    /// `const`, `volatile` or `restrict`.
    pub fn is_qualifier(self) -> bool {
        matches!(
            self,
            TokenKind::Const | TokenKind::Volatile | TokenKind::Restrict
        )
    }

    pub fn is_signedness(self) -> bool {
        matches!(self, TokenKind::Signed | TokenKind::Unsigned)
    }

    /// Base types accepted by the type production.
    pub fn is_base_type(self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Char
                | TokenKind::Long
                | TokenKind::Short
                | TokenKind::Float
                | TokenKind::Double
        )
    }

    /// Source spelling for keywords and punctuation, `None` for value-carrying kinds.
    pub fn spelling(self) -> Option<&'static str> {
        let s = match self {
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Do => "do",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Default => "default",
            TokenKind::Return => "return",
            TokenKind::Goto => "goto",
            TokenKind::Typedef => "typedef",
            TokenKind::Struct => "struct",
            TokenKind::Union => "union",
            TokenKind::Enum => "enum",
            TokenKind::Signed => "signed",
            TokenKind::Unsigned => "unsigned",
            TokenKind::Void => "void",
            TokenKind::Int => "int",
            TokenKind::Char => "char",
            TokenKind::Long => "long",
            TokenKind::Short => "short",
            TokenKind::Float => "float",
            TokenKind::Double => "double",
            TokenKind::Const => "const",
            TokenKind::Static => "static",
            TokenKind::Extern => "extern",
            TokenKind::Auto => "auto",
            TokenKind::Volatile => "volatile",
            TokenKind::Register => "register",
            TokenKind::Restrict => "restrict",
            TokenKind::Inline => "inline",
            TokenKind::Sizeof => "sizeof",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Star => "*",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Assign => "=",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Arrow => "->",
            TokenKind::ShLeft => "<<",
            TokenKind::ShRight => ">>",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::EqEq => "==",
            TokenKind::Ne => "!=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::ShLeftEq => "<<=",
            TokenKind::ShRightEq => ">>=",
            TokenKind::Ident
            | TokenKind::LiteralInt
            | TokenKind::LiteralFloat
            | TokenKind::LiteralChar
            | TokenKind::LiteralString
            | TokenKind::Newline
            | TokenKind::Invalid
            | TokenKind::Eof => return None,
        };
        Some(s)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spelling() {
            Some(s) => write!(f, "'{}'", s),
            None => match self {
                TokenKind::Ident => write!(f, "identifier"),
                TokenKind::LiteralInt => write!(f, "int literal"),
                TokenKind::LiteralFloat => write!(f, "float literal"),
                TokenKind::LiteralChar => write!(f, "char literal"),
                TokenKind::LiteralString => write!(f, "string literal"),
                TokenKind::Newline => write!(f, "newline"),
                TokenKind::Invalid => write!(f, "invalid token"),
                _ => write!(f, "end of input"),
            },
        }
    }
}

/// Payload carried by identifier and literal tokens
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Ident(String),
    Int(i64),
    Float(f64),
    Char(u8),
    Str(String),
}

/// A token: kind tag plus optional payload. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
}

impl Token {
    pub const EOF: Token = Token {
        kind: TokenKind::Eof,
        value: TokenValue::None,
    };

    /// Token without a payload (keywords, punctuation, newline).
    pub fn new(kind: TokenKind) -> Self {
        Token {
            kind,
            value: TokenValue::None,
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Token {
            kind: TokenKind::Ident,
            value: TokenValue::Ident(name.into()),
        }
    }

    pub fn int(value: i64) -> Self {
        Token {
            kind: TokenKind::LiteralInt,
            value: TokenValue::Int(value),
        }
    }

    pub fn float(value: f64) -> Self {
        Token {
            kind: TokenKind::LiteralFloat,
            value: TokenValue::Float(value),
        }
    }

    pub fn char(value: u8) -> Self {
        Token {
            kind: TokenKind::LiteralChar,
            value: TokenValue::Char(value),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Token {
            kind: TokenKind::LiteralString,
            value: TokenValue::Str(value.into()),
        }
    }

    pub fn newline() -> Self {
        Token::new(TokenKind::Newline)
    }

    /// Identifier spelling, if this is an identifier.
    pub fn ident_text(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Ident(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TokenValue::Ident(s) => write!(f, "identifier '{}'", s),
            TokenValue::Int(n) => write!(f, "int literal {}", n),
            TokenValue::Float(x) => write!(f, "float literal {}", x),
            TokenValue::Char(c) => {
                if c.is_ascii_graphic() || *c == b' ' {
                    write!(f, "char literal '{}'", *c as char)
                } else {
                    write!(f, "char literal '\\x{:02x}'", c)
                }
            }
            TokenValue::Str(s) => write!(f, "string literal \"{}\"", s),
            TokenValue::None => write!(f, "{}", self.kind),
        }
    }
}

static END_OF_STREAM: Token = Token::EOF;

/// Read position of a token source. Restoring a cursor fully determines what
/// the source yields next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub line: u32,
}

impl Cursor {
    pub const START: Cursor = Cursor { index: 0, line: 1 };
}

/// What the parser needs from a tokenizer.
pub trait TokenSource {
    /// The `n`-th significant token ahead (0 is the next one), or the
    /// end-of-stream token when the source runs out.
    fn peek(&self, n: usize) -> &Token;

    /// Returns the next significant token and advances past it, counting the
    /// newlines stepped over.
    fn consume(&mut self) -> &Token;

    fn position(&self) -> Cursor;

    fn restore(&mut self, cursor: Cursor);

    /// Line of the most recently consumed token.
    fn line(&self) -> u32 {
        self.position().line
    }

    /// Line the next significant token sits on.
    fn next_line(&self) -> u32;
}

/// Token source over a fully materialized token list
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: Cursor,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream {
            tokens,
            cursor: Cursor::START,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.peek(0).kind == TokenKind::Eof
    }

    /// Index of the `n`-th significant token at or after `from`.
    fn significant_index(&self, from: usize, n: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(from)
            .filter(|(_, t)| t.kind != TokenKind::Newline)
            .nth(n)
            .map(|(i, _)| i)
    }
}

impl TokenSource for TokenStream {
    fn peek(&self, n: usize) -> &Token {
        match self.significant_index(self.cursor.index, n) {
            Some(i) => &self.tokens[i],
            None => &END_OF_STREAM,
        }
    }

    fn consume(&mut self) -> &Token {
        while let Some(token) = self.tokens.get(self.cursor.index) {
            self.cursor.index += 1;
            if token.kind == TokenKind::Newline {
                self.cursor.line += 1;
                continue;
            }
            return token;
        }
        &END_OF_STREAM
    }

    fn position(&self) -> Cursor {
        self.cursor
    }

    fn restore(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn next_line(&self) -> u32 {
        let newlines = self.tokens[self.cursor.index.min(self.tokens.len())..]
            .iter()
            .take_while(|t| t.kind == TokenKind::Newline)
            .count();
        self.cursor.line + newlines as u32
    }
}
