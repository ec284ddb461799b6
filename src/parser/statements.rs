//! Statement parsing implementation
//!
//! This module handles function bodies and the statements inside them:
//!
//! - Compound statements: `{ ... }`
//! - Return statements: `return expr;`
//! - Expression statements: `expr;`
//!
//! # Grammar
//!
//! ```text
//! body      ::= (var_def | statement)*            (stops before "}")
//! statement ::= "{" statement* "}"
//!             | "return" expression ";"
//!             | expression ";"
//! ```
//!
//! `if`, `else`, `for`, `while`, `do`, `switch`, `case`, `default`, `break`,
//! `continue` and `goto` are recognized but not implemented. Reaching one in statement position stops the whole parse with
//! [`ParseError::Unsupported`] instead of backtracking.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Construct, Parser, Production};
use crate::parser::token::{TokenKind, TokenSource};

impl<'a, S: TokenSource> Parser<'a, S> {
    /// Parse a function body up to, not including, the closing brace.
    pub(crate) fn parse_func_body(&mut self) -> Production<'a> {
        self.attempt("function body", |p| {
            let body = p.new_node(NodeKind::StatementList, 4);

            while !p.check(TokenKind::RBrace) {
                let stmt = match p.parse_var_def()? {
                    Some(def) => def,
                    None => match p.parse_statement()? {
                        Some(stmt) => stmt,
                        None => return Ok(None),
                    },
                };
                body.append_child(p.arena, stmt);
            }

            Ok(Some(body))
        })
    }

    /// Parse a statement.
    ///
    /// The statement node's children tell the forms apart: a return statement
    /// is `[return, expression]`, an expression statement `[expression]`, and a
    /// compound statement holds its inner statements.
    pub(crate) fn parse_statement(&mut self) -> Production<'a> {
        self.attempt("statement", |p| {
            let stmt = p.new_node(NodeKind::Statement, 2);
            let kind = p.peek_kind();

            if kind == TokenKind::LBrace {
                p.tokens.consume();
                while !p.eat(TokenKind::RBrace) {
                    let Some(inner) = p.parse_statement()? else {
                        return Ok(None);
                    };
                    stmt.append_child(p.arena, inner);
                }
                return Ok(Some(stmt));
            }

            if let Some(construct) = Construct::statement(kind) {
                return Err(p.unsupported(construct));
            }

            if kind == TokenKind::Return {
                p.push_leaf(stmt);
            }

            let Some(expr) = p.parse_expression()? else {
                return Ok(None);
            };
            if !p.eat(TokenKind::Semicolon) {
                return Ok(None);
            }
            stmt.append_child(p.arena, expr);
            Ok(Some(stmt))
        })
    }
}
