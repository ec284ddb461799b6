//! Declaration parsing implementation
//!
//! This module handles the top-level productions and the pieces they share:
//!
//! - Types: storage class, qualifiers, signedness, base type, pointers
//! - Identifiers
//! - Variable declarations (`extern`) and definitions
//! - Parameter lists, function declarations and function definitions
//!
//! # Grammar
//!
//! ```text
//! type       ::= storage? qualifier? sign? base qualifier? ('*'+ qualifier?)?
//! var_decl   ::= "extern" type identifier ";"
//! var_def    ::= type identifier ";"
//! params     ::= (type identifier ("," type identifier)*)?
//! func_decl  ::= type identifier "(" params ")" ";"
//! func_def   ::= type identifier "(" params ")" "{" body "}"
//! ```
//!
//! `struct`, `union`, `enum` and `typedef` are recognized at top level but not
//! implemented; reaching one stops the parse with [`ParseError::Unsupported`].
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Construct, ParseError, Parser, Production};
use crate::parser::token::{TokenKind, TokenSource};

impl<'a, S: TokenSource> Parser<'a, S> {
    /// Parse a type. A missing base type, or a second qualifier in the same
    /// position, is a mismatch of the whole production.
    pub(crate) fn parse_type(&mut self) -> Production<'a> {
        self.attempt("type", |p| {
            let ty = p.new_node(NodeKind::Type, 4);

            if p.peek_kind().is_storage_class() {
                p.push_leaf(ty);
            }

            let leading_qualifier = p.peek_kind().is_qualifier();
            if leading_qualifier {
                p.push_leaf(ty);
            }

            if p.peek_kind().is_signedness() {
                p.push_leaf(ty);
            }

            // TODO: user-defined type names once typedef is parsed
            if !p.peek_kind().is_base_type() {
                return Ok(None);
            }
            p.push_leaf(ty);

            if p.peek_kind().is_qualifier() {
                if leading_qualifier {
                    p.duplicate_qualifier();
                    return Ok(None);
                }
                p.push_leaf(ty);
            }

            if p.check(TokenKind::Star) {
                while p.check(TokenKind::Star) {
                    p.push_leaf(ty);
                }
                if p.peek_kind().is_qualifier() {
                    p.push_leaf(ty);
                    if p.peek_kind().is_qualifier() {
                        p.duplicate_qualifier();
                        return Ok(None);
                    }
                }
            }

            Ok(Some(ty))
        })
    }

    fn duplicate_qualifier(&self) {
        tracing::debug!(
            line = self.tokens.next_line(),
            found = %self.peek_kind(),
            "duplicate type qualifier, type rejected"
        );
    }

    /// Parse a single identifier into a leaf carrying its text.
    pub(crate) fn parse_ident(&mut self) -> Production<'a> {
        if !self.check(TokenKind::Ident) {
            return Ok(None);
        }
        Ok(Some(self.consume_leaf()))
    }

    /// Parse an external variable declaration: extern type name;
    pub(crate) fn parse_var_decl(&mut self) -> Production<'a> {
        self.attempt("variable declaration", |p| {
            let line = p.tokens.next_line();
            if !p.eat(TokenKind::Extern) {
                return Ok(None);
            }
            let Some(ty) = p.parse_type()? else {
                return Ok(None);
            };
            let Some(name) = p.parse_ident()? else {
                return Ok(None);
            };
            if !p.eat(TokenKind::Semicolon) {
                return Ok(None);
            }
            Ok(Some(p.branch(NodeKind::VarDecl, line, [&*ty, &*name])))
        })
    }

    /// Parse a variable definition: type name;
    pub(crate) fn parse_var_def(&mut self) -> Production<'a> {
        self.attempt("variable definition", |p| {
            let line = p.tokens.next_line();
            let Some(ty) = p.parse_type()? else {
                return Ok(None);
            };
            let Some(name) = p.parse_ident()? else {
                return Ok(None);
            };
            // TODO: optional initializer once assignment expressions are parsed
            if !p.eat(TokenKind::Semicolon) {
                return Ok(None);
            }
            Ok(Some(p.branch(NodeKind::VarDef, line, [&*ty, &*name])))
        })
    }

    /// Parse parameter list: type name, type name, ...
    ///
    /// Stops before the closing parenthesis without consuming it. The list's
    /// children alternate type and identifier.
    pub(crate) fn parse_param_list(&mut self) -> Production<'a> {
        self.attempt("parameter list", |p| {
            let list = p.new_node(NodeKind::ParamList, 4);
            if p.check(TokenKind::RParen) {
                return Ok(Some(list));
            }

            loop {
                let Some(ty) = p.parse_type()? else {
                    return Ok(None);
                };
                let Some(name) = p.parse_ident()? else {
                    return Ok(None);
                };
                list.append_child(p.arena, ty);
                list.append_child(p.arena, name);

                if p.check(TokenKind::RParen) {
                    return Ok(Some(list));
                }
                if !p.eat(TokenKind::Comma) {
                    return Ok(None);
                }
            }
        })
    }

    /// Parse function declaration: type name(params);
    pub(crate) fn parse_func_decl(&mut self) -> Production<'a> {
        self.attempt("function declaration", |p| {
            let line = p.tokens.next_line();
            let Some((ty, name, params)) = p.parse_signature()? else {
                return Ok(None);
            };
            if !p.eat(TokenKind::Semicolon) {
                return Ok(None);
            }
            Ok(Some(p.branch(NodeKind::FuncDecl, line, [ty, name, params])))
        })
    }

    /// Parse function definition: type name(params) { body }
    pub(crate) fn parse_func_def(&mut self) -> Production<'a> {
        self.attempt("function definition", |p| {
            let line = p.tokens.next_line();
            let Some((ty, name, params)) = p.parse_signature()? else {
                return Ok(None);
            };
            if !p.eat(TokenKind::LBrace) {
                return Ok(None);
            }
            let Some(body) = p.parse_func_body()? else {
                return Ok(None);
            };
            if !p.eat(TokenKind::RBrace) {
                return Ok(None);
            }
            Ok(Some(p.branch(NodeKind::FuncDef, line, [ty, name, params, &*body])))
        })
    }

    /// `type name ( params )`, shared by declarations and definitions. The
    /// callers backtrack, so this one does not snapshot on its own.
    #[allow(clippy::type_complexity)]
    fn parse_signature(
        &mut self,
    ) -> Result<Option<(&'a Node<'a>, &'a Node<'a>, &'a Node<'a>)>, ParseError> {
        let Some(ty) = self.parse_type()? else {
            return Ok(None);
        };
        let Some(name) = self.parse_ident()? else {
            return Ok(None);
        };
        if !self.eat(TokenKind::LParen) {
            return Ok(None);
        }
        let Some(params) = self.parse_param_list()? else {
            return Ok(None);
        };
        if !self.eat(TokenKind::RParen) {
            return Ok(None);
        }
        Ok(Some((&*ty, &*name, &*params)))
    }

    /// Slot for struct/union/enum declarations and typedefs.
    pub(crate) fn parse_aggregate_or_typedef(&mut self) -> Production<'a> {
        match Construct::declaration(self.peek_kind()) {
            Some(construct) => Err(self.unsupported(construct)),
            None => Ok(None),
        }
    }

    /// Allocate a `kind` node holding `children` in order.
    pub(crate) fn branch<const N: usize>(
        &self,
        kind: NodeKind,
        line: u32,
        children: [&'a Node<'a>; N],
    ) -> &'a mut Node<'a> {
        let node = Node::alloc(self.arena, kind, line, N);
        for child in children {
            node.append_child(self.arena, child);
        }
        node
    }

    pub(crate) fn unsupported(&self, construct: Construct) -> ParseError {
        let line = self.tokens.next_line();
        tracing::debug!(%construct, line, "unsupported construct");
        ParseError::Unsupported { construct, line }
    }
}
