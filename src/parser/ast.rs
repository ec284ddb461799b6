//! Arena-owned syntax tree
//!
//! Every [`Node`] and every child array lives in an [`Arena`]; nodes have no
//! lifetime of their own and all of them go away when the arena does.
//!
//! Children are positional. A var-def is always `[type, identifier]`, a
//! function declaration `[type, identifier, param-list]`, and so on; the
//! grammar order is the meaning.
//!
//! Child arrays start with capacity 0, grow to 2, then double. Growth copies
//! the array forward in the arena and the old copy is left behind as garbage.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::arena::Arena;
use crate::parser::token::TokenKind;

/// Node tag: a token kind for leaves, or one of the structural kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Token(TokenKind),
    TranslationUnit,
    Type,
    Cast,
    VarDecl,
    VarDef,
    FuncDecl,
    FuncDef,
    StructDecl,
    StructDef,
    UnionDecl,
    UnionDef,
    EnumDecl,
    EnumDef,
    Typedef,
    ParamList,
    Statement,
    StatementList,
    Expression,
}

impl NodeKind {
    pub fn is_leaf_kind(self) -> bool {
        matches!(self, NodeKind::Token(_))
    }
}

impl From<TokenKind> for NodeKind {
    fn from(kind: TokenKind) -> Self {
        NodeKind::Token(kind)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Token(kind) => return write!(f, "{}", kind),
            NodeKind::TranslationUnit => "translation unit",
            NodeKind::Type => "type",
            NodeKind::Cast => "cast",
            NodeKind::VarDecl => "variable declaration",
            NodeKind::VarDef => "variable definition",
            NodeKind::FuncDecl => "function declaration",
            NodeKind::FuncDef => "function definition",
            NodeKind::StructDecl => "struct declaration",
            NodeKind::StructDef => "struct definition",
            NodeKind::UnionDecl => "union declaration",
            NodeKind::UnionDef => "union definition",
            NodeKind::EnumDecl => "enum declaration",
            NodeKind::EnumDef => "enum definition",
            NodeKind::Typedef => "typedef",
            NodeKind::ParamList => "parameter list",
            NodeKind::Statement => "statement",
            NodeKind::StatementList => "statement list",
            NodeKind::Expression => "expression",
        };
        f.write_str(name)
    }
}

/// Growable child array stored in the arena
pub struct ChildList<'a> {
    slots: &'a mut [Option<&'a Node<'a>>],
    len: usize,
}

impl<'a> ChildList<'a> {
    /// Non-zero capacities are rounded up to a power of two no smaller than 2.
    fn with_capacity(arena: &'a Arena, capacity: usize) -> Self {
        let slots: &'a mut [Option<&'a Node<'a>>] = match capacity {
            0 => &mut [],
            n => arena.alloc_slice_fill_copy(n.next_power_of_two().max(2), None),
        };
        ChildList { slots, len: 0 }
    }

    fn push(&mut self, arena: &'a Arena, child: &'a Node<'a>) {
        if self.len == self.slots.len() {
            let new_capacity = match self.slots.len() {
                0 => 2,
                n => n * 2,
            };
            self.slots = arena.grow_slice_copy(&*self.slots, new_capacity, None);
        }
        self.slots[self.len] = Some(child);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&'a Node<'a>> {
        if index < self.len {
            self.slots[index]
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Node<'a>> + '_ {
        self.slots[..self.len].iter().flatten().copied()
    }
}

/// One syntax tree node
pub struct Node<'a> {
    kind: NodeKind,
    text: Option<&'a str>,
    line: u32,
    children: ChildList<'a>,
}

impl<'a> Node<'a> {
    /// Allocates a childless node in `arena` with room for `capacity` children.
    pub fn alloc(arena: &'a Arena, kind: NodeKind, line: u32, capacity: usize) -> &'a mut Node<'a> {
        arena.alloc(Node {
            kind,
            text: None,
            line,
            children: ChildList::with_capacity(arena, capacity),
        })
    }

    /// Allocates a leaf carrying `text`.
    pub fn alloc_leaf(
        arena: &'a Arena,
        kind: NodeKind,
        line: u32,
        text: Option<&'a str>,
    ) -> &'a mut Node<'a> {
        let node = Node::alloc(arena, kind, line, 0);
        node.text = text;
        node
    }

    pub fn append_child(&mut self, arena: &'a Arena, child: &'a Node<'a>) {
        self.children.push(arena, child);
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    /// Identifier spelling; `None` for every other kind of node.
    pub fn text(&self) -> Option<&'a str> {
        self.text
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn children(&self) -> &ChildList<'a> {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&'a Node<'a>> {
        self.children.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Kinds of the direct children, in order.
    pub fn child_kinds(&self) -> Vec<NodeKind> {
        self.children.iter().map(Node::kind).collect()
    }

    /// Whether this is an identifier leaf.
    pub fn is_ident(&self) -> bool {
        self.kind == NodeKind::Token(TokenKind::Ident)
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("kind", &self.kind).field("line", &self.line);
        if let Some(text) = self.text {
            s.field("text", &text);
        }
        if !self.children.is_empty() {
            s.field("children", &self.children.iter().collect::<Vec<_>>());
        }
        s.finish()
    }
}

/// Deduplicates identifier spellings into the arena
pub struct Interner<'a> {
    arena: &'a Arena,
    strings: FxHashSet<&'a str>,
}

impl<'a> Interner<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        Interner {
            arena,
            strings: FxHashSet::default(),
        }
    }

    pub fn intern(&mut self, s: &str) -> &'a str {
        if let Some(&interned) = self.strings.get(s) {
            return interned;
        }
        let interned = self.arena.alloc_str(s);
        self.strings.insert(interned);
        interned
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
