//! C declaration and statement parser
//!
//! This module turns a token stream into an arena-allocated syntax tree:
//! - [`token`]: Token model and the [`token::TokenSource`] the parser reads
//! - [`parse`]: The parser, its error type and the translation-unit driver
//! - [`ast`]: Syntax tree nodes
//!
//! # Supported C Subset
//!
//! - Types: `int`, `char`, `long`, `short`, `float`, `double` with storage
//!   class, `signed`/`unsigned`, `const`/`volatile`/`restrict` and pointers
//! - Top level: `extern` declarations, variable definitions, function
//!   declarations and definitions
//! - Statements: compound, `return`, expression statements
//! - Expressions: flat operand/operator sequences, parenthesized
//!   sub-expressions and casts
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent with unbounded lookahead: any production may
//! consume tokens, fail, and rewind the cursor to where it started.

pub mod ast;
mod declarations;
mod expressions;
pub mod parse;
mod statements;
pub mod token;
