//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, the error type, the helpers the
//! productions share, and the translation-unit driver.
//!
//! # Parser Architecture
//!
//! The Parser is a backtracking recursive descent parser:
//! - This module: Parser struct, helper methods, and the top-level loop
//! - `declarations`: types, identifiers, variable and function declarations
//! - `statements`: function bodies and statements
//! - `expressions`: expressions, including the cast/parenthesis split
//!
//! # Backtracking
//!
//! Every production snapshots the token cursor, tries to recognize its text,
//! and on the first mismatch restores the snapshot and reports `Ok(None)`.
//! Mismatch is ordinary control flow, not an error. Nodes allocated during a
//! failed attempt stay in the arena as garbage until the arena is released.
//!
//! [`ParseError`] is reserved for the cases that stop the parse: a construct
//! the grammar does not implement yet, top-level text nothing matches, or
//! productions nested deeper than [`MAX_NESTING_DEPTH`].

use crate::arena::Arena;
use crate::parser::ast::*;
use crate::parser::token::{TokenKind, TokenSource};
use std::fmt;

/// Deepest chain of productions in progress at once.
pub const MAX_NESTING_DEPTH: u32 = 256;

/// Constructs recognized by keyword whose productions are not implemented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    If,
    For,
    While,
    Do,
    Switch,
    Goto,
    Break,
    Continue,
    Case,
    Default,
    Else,
    Struct,
    Union,
    Enum,
    Typedef,
}

impl Construct {
    /// Unimplemented statement introduced by `kind`.
    pub fn statement(kind: TokenKind) -> Option<Construct> {
        match kind {
            TokenKind::If => Some(Construct::If),
            TokenKind::For => Some(Construct::For),
            TokenKind::While => Some(Construct::While),
            TokenKind::Do => Some(Construct::Do),
            TokenKind::Switch => Some(Construct::Switch),
            TokenKind::Goto => Some(Construct::Goto),
            TokenKind::Break => Some(Construct::Break),
            TokenKind::Continue => Some(Construct::Continue),
            TokenKind::Case => Some(Construct::Case),
            TokenKind::Default => Some(Construct::Default),
            TokenKind::Else => Some(Construct::Else),
            _ => None,
        }
    }

    /// Unimplemented top-level declaration introduced by `kind`.
    pub fn declaration(kind: TokenKind) -> Option<Construct> {
        match kind {
            TokenKind::Struct => Some(Construct::Struct),
            TokenKind::Union => Some(Construct::Union),
            TokenKind::Enum => Some(Construct::Enum),
            TokenKind::Typedef => Some(Construct::Typedef),
            _ => None,
        }
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Construct::If => "'if' statement",
            Construct::For => "'for' statement",
            Construct::While => "'while' statement",
            Construct::Do => "'do' statement",
            Construct::Switch => "'switch' statement",
            Construct::Goto => "'goto' statement",
            Construct::Break => "'break' statement",
            Construct::Continue => "'continue' statement",
            Construct::Case => "'case' label",
            Construct::Default => "'default' label",
            Construct::Else => "'else' branch",
            Construct::Struct => "struct declaration",
            Construct::Union => "union declaration",
            Construct::Enum => "enum declaration",
            Construct::Typedef => "typedef",
        };
        f.write_str(name)
    }
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The grammar reached a construct it does not implement yet.
    Unsupported { construct: Construct, line: u32 },
    /// No top-level production matches the remaining input.
    Unrecognized { found: TokenKind, line: u32 },
    /// Productions nested deeper than [`MAX_NESTING_DEPTH`].
    NestingTooDeep { line: u32 },
}

impl ParseError {
    pub fn line(&self) -> u32 {
        match self {
            ParseError::Unsupported { line, .. }
            | ParseError::Unrecognized { line, .. }
            | ParseError::NestingTooDeep { line } => *line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Unsupported { construct, line } => {
                write!(f, "Parse error at line {}: {} is not supported", line, construct)
            }
            ParseError::Unrecognized { found, line } => write!(
                f,
                "Parse error at line {}: expected a declaration or definition, found {}",
                line, found
            ),
            ParseError::NestingTooDeep { line } => write!(
                f,
                "Parse error at line {}: nesting exceeds {} levels",
                line, MAX_NESTING_DEPTH
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Outcome of one production: a node on match, `None` on mismatch.
pub type Production<'a> = Result<Option<&'a mut Node<'a>>, ParseError>;

/// Backtracking recursive descent parser for a C subset
pub struct Parser<'a, S: TokenSource> {
    pub(crate) tokens: S,
    pub(crate) arena: &'a Arena,
    pub(crate) interner: Interner<'a>,
    depth: u32,
}

impl<'a, S: TokenSource> Parser<'a, S> {
    pub fn new(tokens: S, arena: &'a Arena) -> Self {
        Self {
            tokens,
            arena,
            interner: Interner::new(arena),
            depth: 0,
        }
    }

    /// Parse the whole token stream into a translation unit.
    ///
    /// Top-level productions are tried in a fixed order (variable declaration,
    /// variable definition, function declaration, function definition, then
    /// the aggregate/typedef slot); the first match wins. If none matches,
    /// the partial tree is dropped and the line of the offending token is
    /// reported.
    pub fn parse_translation_unit(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let root = self.new_node(NodeKind::TranslationUnit, 4);

        let productions: [fn(&mut Self) -> Production<'a>; 5] = [
            Self::parse_var_decl,
            Self::parse_var_def,
            Self::parse_func_decl,
            Self::parse_func_def,
            Self::parse_aggregate_or_typedef,
        ];

        'top: while self.peek_kind() != TokenKind::Eof {
            for production in productions {
                if let Some(node) = production(self)? {
                    root.append_child(self.arena, node);
                    continue 'top;
                }
            }
            return Err(self.unrecognized());
        }

        tracing::debug!(
            declarations = root.child_count(),
            lines = self.tokens.line(),
            "translation unit parsed"
        );
        Ok(root)
    }

    pub fn tokens(&self) -> &S {
        &self.tokens
    }

    pub fn into_tokens(self) -> S {
        self.tokens
    }

    fn unrecognized(&self) -> ParseError {
        let error = ParseError::Unrecognized {
            found: self.peek_kind(),
            line: self.tokens.next_line(),
        };
        tracing::debug!(%error, "translation unit rejected");
        error
    }

    // ===== Helper methods =====

    /// Run `production` speculatively: on `Ok(None)` the cursor is put back
    /// where it was. Fails once [`MAX_NESTING_DEPTH`] attempts are in progress.
    pub(crate) fn attempt<F>(&mut self, name: &'static str, production: F) -> Production<'a>
    where
        F: FnOnce(&mut Self) -> Production<'a>,
    {
        if self.depth >= MAX_NESTING_DEPTH {
            let line = self.tokens.next_line();
            tracing::debug!(production = name, line, "nesting limit reached");
            return Err(ParseError::NestingTooDeep { line });
        }

        let saved = self.tokens.position();
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        if let Ok(None) = result {
            tracing::trace!(production = name, line = saved.line, "backtrack");
            self.tokens.restore(saved);
        }
        result
    }

    /// Node stamped with the line of the next significant token.
    pub(crate) fn new_node(&self, kind: NodeKind, capacity: usize) -> &'a mut Node<'a> {
        Node::alloc(self.arena, kind, self.tokens.next_line(), capacity)
    }

    /// Consume the next token and turn it into a leaf.
    pub(crate) fn consume_leaf(&mut self) -> &'a mut Node<'a> {
        let token = self.tokens.consume();
        let kind = token.kind;
        let text = token.ident_text().map(|s| self.interner.intern(s));
        Node::alloc_leaf(self.arena, kind.into(), self.tokens.line(), text)
    }

    /// Consume the next token into a leaf appended to `parent`.
    pub(crate) fn push_leaf(&mut self, parent: &mut Node<'a>) {
        let leaf = self.consume_leaf();
        parent.append_child(self.arena, leaf);
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.tokens.peek(0).kind
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Consume the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.tokens.consume();
            true
        } else {
            false
        }
    }
}

/// Parse `tokens` into a translation unit allocated in `arena`.
pub fn parse<'a, S: TokenSource>(tokens: S, arena: &'a Arena) -> Result<&'a Node<'a>, ParseError> {
    Parser::new(tokens, arena).parse_translation_unit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::{Token, TokenStream};

    fn tok(kind: TokenKind) -> Token {
        Token::new(kind)
    }

    #[test]
    fn test_parse_empty_stream() {
        let arena = Arena::new();
        let root = parse(TokenStream::new(Vec::new()), &arena).unwrap();
        assert_eq!(root.kind(), NodeKind::TranslationUnit);
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_parse_simple_function() {
        // int main() { return 0; }
        let tokens = TokenStream::new(vec![
            tok(TokenKind::Int),
            Token::ident("main"),
            tok(TokenKind::LParen),
            tok(TokenKind::RParen),
            tok(TokenKind::LBrace),
            tok(TokenKind::Return),
            Token::int(0),
            tok(TokenKind::Semicolon),
            tok(TokenKind::RBrace),
        ]);
        let arena = Arena::new();
        let root = parse(tokens, &arena).unwrap();

        assert_eq!(root.child_count(), 1);
        let func = root.child(0).unwrap();
        assert_eq!(func.kind(), NodeKind::FuncDef);
        assert_eq!(func.child(1).unwrap().text(), Some("main"));
    }

    #[test]
    fn test_into_tokens_returns_drained_source() {
        let tokens = TokenStream::new(vec![
            tok(TokenKind::Int),
            Token::ident("x"),
            tok(TokenKind::Semicolon),
        ]);
        let arena = Arena::new();
        let mut parser = Parser::new(tokens, &arena);
        parser.parse_translation_unit().unwrap();
        let tokens = parser.into_tokens();
        assert!(tokens.is_at_end());
        assert_eq!(tokens.position().index, 3);
    }

    #[test]
    fn test_nesting_limit_unwinds_depth() {
        let arena = Arena::new();
        let mut parser = Parser::new(TokenStream::new(Vec::new()), &arena);
        parser.depth = MAX_NESTING_DEPTH;
        let err = parser.attempt("test", |_| Ok(None)).unwrap_err();
        assert_eq!(err, ParseError::NestingTooDeep { line: 1 });

        parser.depth = 0;
        let result = parser.attempt("outer", |p| {
            assert_eq!(p.depth, 1);
            p.attempt("inner", |q| {
                assert_eq!(q.depth, 2);
                Ok(None)
            })
        });
        assert!(matches!(result, Ok(None)));
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn test_unrecognized_top_level_reports_line() {
        // int x;\n 42 ;
        let tokens = TokenStream::new(vec![
            tok(TokenKind::Int),
            Token::ident("x"),
            tok(TokenKind::Semicolon),
            Token::newline(),
            Token::int(42),
            tok(TokenKind::Semicolon),
        ]);
        let arena = Arena::new();
        let err = parse(tokens, &arena).unwrap_err();
        assert_eq!(
            err,
            ParseError::Unrecognized {
                found: TokenKind::LiteralInt,
                line: 2
            }
        );
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_attempt_restores_cursor_on_mismatch() {
        let tokens = TokenStream::new(vec![Token::ident("a"), tok(TokenKind::Comma)]);
        let arena = Arena::new();
        let mut parser = Parser::new(tokens, &arena);
        let before = parser.tokens().position();

        let result = parser.attempt("test", |p| {
            p.tokens.consume();
            p.tokens.consume();
            Ok(None)
        });
        assert!(matches!(result, Ok(None)));
        assert_eq!(parser.tokens().position(), before);
    }

    const PRODUCTIONS: [&str; 10] = [
        "type",
        "ident",
        "var_decl",
        "var_def",
        "params",
        "func_decl",
        "func_def",
        "body",
        "statement",
        "expression",
    ];

    fn run_production<'a>(parser: &mut Parser<'a, TokenStream>, name: &str) -> Production<'a> {
        match name {
            "type" => parser.parse_type(),
            "ident" => parser.parse_ident(),
            "var_decl" => parser.parse_var_decl(),
            "var_def" => parser.parse_var_def(),
            "params" => parser.parse_param_list(),
            "func_decl" => parser.parse_func_decl(),
            "func_def" => parser.parse_func_def(),
            "body" => parser.parse_func_body(),
            "statement" => parser.parse_statement(),
            _ => parser.parse_expression(),
        }
    }

    fn pool_token() -> impl proptest::strategy::Strategy<Value = Token> {
        use proptest::prelude::*;

        let kinds = vec![
            TokenKind::Extern,
            TokenKind::Static,
            TokenKind::Const,
            TokenKind::Volatile,
            TokenKind::Unsigned,
            TokenKind::Int,
            TokenKind::Char,
            TokenKind::Return,
            TokenKind::Star,
            TokenKind::Plus,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Comma,
            TokenKind::Semicolon,
        ];
        prop_oneof![
            4 => proptest::sample::select(kinds).prop_map(Token::new),
            1 => Just(Token::ident("v")),
            1 => Just(Token::int(1)),
            1 => Just(Token::newline()),
        ]
    }

    proptest::proptest! {
        #[test]
        fn test_mismatch_leaves_cursor_untouched(
            tokens in proptest::collection::vec(pool_token(), 0..32)
        ) {
            for name in PRODUCTIONS {
                let arena = Arena::with_capacity(1024);
                let mut parser = Parser::new(TokenStream::new(tokens.clone()), &arena);
                let before = parser.tokens().position();
                if let Ok(None) = run_production(&mut parser, name) {
                    proptest::prop_assert_eq!(parser.tokens().position(), before, "{}", name);
                }
            }
        }
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::Unsupported {
            construct: Construct::Goto,
            line: 7,
        };
        assert_eq!(
            err.to_string(),
            "Parse error at line 7: 'goto' statement is not supported"
        );
    }
}
