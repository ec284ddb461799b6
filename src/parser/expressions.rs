//! Expression parsing implementation
//!
//! Expressions are collected as a flat sequence of operand and operator
//! leaves, with parenthesized sub-expressions and casts as nested nodes. The
//! loop ends on a `;` or `)` it does not consume.
//!
//! # Casts
//!
//! An opening parenthesis is ambiguous. The parser first tries `type ")"`; if
//! that matches, the parenthesized text is a [`NodeKind::Cast`] applied to
//! whatever follows. Otherwise the cursor goes back to just after the `(` and
//! the same text is parsed again as a parenthesized sub-expression.
//!
//! # Precedence
//!
//! Operator structure is not built yet. When it is, it follows C precedence,
//! tightest first:
//!
//! ```text
//! () [] -> .                           left to right
//! ! ~ ++ -- + - * & (type) sizeof      right to left
//! * / %                                left to right
//! + -                                  left to right
//! << >>                                left to right
//! < <= > >=                            left to right
//! == !=                                left to right
//! &                                    left to right
//! ^                                    left to right
//! |                                    left to right
//! &&                                   left to right
//! ||                                   left to right
//! ?:                                   right to left
//! = += -= *= /= %= &= ^= |= <<= >>=    right to left
//! ,                                    left to right
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Parser, Production};
use crate::parser::token::{TokenKind, TokenSource};

impl<'a, S: TokenSource> Parser<'a, S> {
    /// Parse expression up to a terminating `;` or `)`.
    ///
    /// Braces or the end of input inside an expression are a mismatch.
    pub(crate) fn parse_expression(&mut self) -> Production<'a> {
        self.attempt("expression", |p| {
            let expr = p.new_node(NodeKind::Expression, 4);

            loop {
                match p.peek_kind() {
                    TokenKind::Semicolon | TokenKind::RParen => return Ok(Some(expr)),
                    TokenKind::LBrace | TokenKind::RBrace | TokenKind::Eof => return Ok(None),
                    TokenKind::LParen => {
                        p.tokens.consume();
                        if let Some(cast) = p.parse_cast()? {
                            expr.append_child(p.arena, cast);
                            continue;
                        }

                        // Not a cast: a parenthesized sub-expression
                        let Some(inner) = p.parse_expression()? else {
                            return Ok(None);
                        };
                        if !p.eat(TokenKind::RParen) {
                            return Ok(None);
                        }
                        expr.append_child(p.arena, inner);
                    }
                    _ => p.push_leaf(expr),
                }
            }
        })
    }

    /// Parse `type )` following an already consumed `(`.
    fn parse_cast(&mut self) -> Production<'a> {
        self.attempt("cast", |p| {
            let Some(ty) = p.parse_type()? else {
                return Ok(None);
            };
            if !p.eat(TokenKind::RParen) {
                return Ok(None);
            }
            ty.set_kind(NodeKind::Cast);
            Ok(Some(ty))
        })
    }
}
