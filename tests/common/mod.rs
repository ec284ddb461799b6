// Shared helpers for the integration tests

#![allow(dead_code)]

use crustast::parser::token::{Token, TokenKind, TokenStream};

const KINDS: &[TokenKind] = &[
    TokenKind::If,
    TokenKind::Else,
    TokenKind::Do,
    TokenKind::While,
    TokenKind::For,
    TokenKind::Switch,
    TokenKind::Case,
    TokenKind::Break,
    TokenKind::Continue,
    TokenKind::Default,
    TokenKind::Return,
    TokenKind::Goto,
    TokenKind::Typedef,
    TokenKind::Struct,
    TokenKind::Union,
    TokenKind::Enum,
    TokenKind::Signed,
    TokenKind::Unsigned,
    TokenKind::Void,
    TokenKind::Int,
    TokenKind::Char,
    TokenKind::Long,
    TokenKind::Short,
    TokenKind::Float,
    TokenKind::Double,
    TokenKind::Const,
    TokenKind::Static,
    TokenKind::Extern,
    TokenKind::Auto,
    TokenKind::Volatile,
    TokenKind::Register,
    TokenKind::Restrict,
    TokenKind::Inline,
    TokenKind::Sizeof,
    TokenKind::LParen,
    TokenKind::RParen,
    TokenKind::LBrace,
    TokenKind::RBrace,
    TokenKind::LBracket,
    TokenKind::RBracket,
    TokenKind::Semicolon,
    TokenKind::Comma,
    TokenKind::Dot,
    TokenKind::Star,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Slash,
    TokenKind::Percent,
    TokenKind::Amp,
    TokenKind::Pipe,
    TokenKind::Caret,
    TokenKind::Tilde,
    TokenKind::Bang,
    TokenKind::Lt,
    TokenKind::Gt,
    TokenKind::Assign,
    TokenKind::Question,
    TokenKind::Colon,
    TokenKind::PlusPlus,
    TokenKind::MinusMinus,
    TokenKind::Arrow,
    TokenKind::ShLeft,
    TokenKind::ShRight,
    TokenKind::Le,
    TokenKind::Ge,
    TokenKind::EqEq,
    TokenKind::Ne,
    TokenKind::AndAnd,
    TokenKind::OrOr,
    TokenKind::PlusEq,
    TokenKind::MinusEq,
    TokenKind::StarEq,
    TokenKind::SlashEq,
    TokenKind::PercentEq,
];

/// Every kind a token-pool property test may draw from.
pub fn all_kinds() -> &'static [TokenKind] {
    KINDS
}

/// Turn whitespace-separated words into tokens, one `Newline` per line break.
///
/// Keywords and punctuation map to their kinds, digit strings to int literals,
/// everything else to identifiers. Tokens must be separated by spaces:
/// `int f ( ) ;`.
pub fn lex(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (i, line) in src.split('\n').enumerate() {
        if i > 0 {
            tokens.push(Token::newline());
        }
        for word in line.split_whitespace() {
            tokens.push(word_token(word));
        }
    }
    tokens
}

pub fn stream(src: &str) -> TokenStream {
    TokenStream::new(lex(src))
}

fn word_token(word: &str) -> Token {
    if let Some(&kind) = KINDS.iter().find(|k| k.spelling() == Some(word)) {
        return Token::new(kind);
    }
    if let Ok(n) = word.parse::<i64>() {
        return Token::int(n);
    }
    Token::ident(word)
}
