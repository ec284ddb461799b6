//! # Introduction
//!
//! CRustAST parses a subset of C into a syntax tree that lives entirely in a
//! bump arena. The parser backtracks freely: any production may consume
//! tokens, fail partway through, and rewind to where it started. Tree nodes
//! allocated by a failed attempt are simply left in the arena, which makes
//! speculation cheap; everything is released at once when the arena goes away.
//!
//! ## Pipeline
//!
//! ```text
//! Tokens → TokenSource → Parser → Node tree (in Arena)
//! ```
//!
//! 1. [`parser::token`]: the token model and the [`parser::token::TokenSource`]
//!    boundary. Lexing characters into tokens is left to the host.
//! 2. [`parser::parse`]: the [`Parser`] and the translation-unit driver.
//! 3. [`parser::ast`]: [`Node`]s with positional children.
//! 4. [`arena`]: the bump allocator with its overflow chain of blocks.
//!
//! ## Example
//!
//! ```
//! use crustast::parser::token::{Token, TokenKind, TokenStream};
//! use crustast::{parse, Arena, NodeKind};
//!
//! // int x;
//! let tokens = TokenStream::new(vec![
//!     Token::new(TokenKind::Int),
//!     Token::ident("x"),
//!     Token::new(TokenKind::Semicolon),
//! ]);
//! let arena = Arena::new();
//! let unit = parse(tokens, &arena).unwrap();
//! assert_eq!(unit.child(0).unwrap().kind(), NodeKind::VarDef);
//! ```

pub mod arena;
pub mod parser;

pub use arena::Arena;
pub use parser::ast::{Node, NodeKind};
pub use parser::parse::{parse, Construct, ParseError, Parser};
