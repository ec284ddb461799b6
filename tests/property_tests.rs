// Property tests for the arena and the parser driver

mod common;

use crustast::arena::{default_align, Arena, MAX_DEFAULT_ALIGN};
use crustast::parser::token::{Token, TokenKind, TokenStream};
use crustast::{parse, Node, NodeKind};
use proptest::prelude::*;

const MAX_TOKENS: usize = 64;

fn token() -> impl Strategy<Value = Token> {
    prop_oneof![
        6 => proptest::sample::select(common::all_kinds()).prop_map(Token::new),
        2 => "[a-d]".prop_map(|name| Token::ident(name)),
        1 => (0i64..100).prop_map(Token::int),
        1 => Just(Token::newline()),
    ]
}

fn check_top_level(root: &Node<'_>) -> Result<(), TestCaseError> {
    prop_assert_eq!(root.kind(), NodeKind::TranslationUnit);
    for child in root.children().iter() {
        prop_assert!(
            matches!(
                child.kind(),
                NodeKind::VarDecl | NodeKind::VarDef | NodeKind::FuncDecl | NodeKind::FuncDef
            ),
            "unexpected top-level node {:?}",
            child
        );
        prop_assert!(child.line() >= 1);
    }
    Ok(())
}

proptest! {
    #[test]
    fn allocations_respect_alignment_and_never_overlap(
        requests in proptest::collection::vec((1usize..2048, 0u32..7), 1..200)
    ) {
        let arena = Arena::with_capacity(512);
        let mut spans: Vec<(usize, usize)> = Vec::new();
        let mut last_allocated = 0;

        for (size, align_exp) in requests {
            let align = 1usize << align_exp;
            let addr = arena.allocate(size, align).as_ptr() as usize;
            prop_assert_eq!(addr % align, 0);

            let stats = arena.stats();
            prop_assert!(stats.allocated_bytes >= last_allocated + size);
            last_allocated = stats.allocated_bytes;
            spans.push((addr, addr + size));
        }

        spans.sort_unstable();
        for pair in spans.windows(2) {
            prop_assert!(pair[0].1 <= pair[1].0, "overlap: {:?}", pair);
        }

        let blocks = arena.stats().blocks;
        prop_assert_eq!(arena.release(), blocks);
    }

    #[test]
    fn default_alignment_is_capped_power_of_two(size in 0usize..4096) {
        let align = default_align(size);
        prop_assert!(align.is_power_of_two());
        prop_assert!(align <= MAX_DEFAULT_ALIGN);
        prop_assert!(align <= size.max(1));

        let arena = Arena::with_capacity(64);
        let addr = arena.allocate_default(size.max(1)).as_ptr() as usize;
        prop_assert_eq!(addr % default_align(size.max(1)), 0);
    }

    #[test]
    fn children_keep_order_and_capacity_doubles(lines in proptest::collection::vec(1u32..10_000, 0..100)) {
        let arena = Arena::with_capacity(256);
        let parent = Node::alloc(&arena, NodeKind::StatementList, 1, 0);
        for &line in &lines {
            let child = Node::alloc(&arena, NodeKind::Statement, line, 0);
            parent.append_child(&arena, child);

            let capacity = parent.children().capacity();
            prop_assert!(capacity.is_power_of_two());
            prop_assert!(capacity >= parent.child_count());
            prop_assert!(capacity < 2 * parent.child_count().max(2));
        }

        let seen: Vec<u32> = parent.children().iter().map(|c| c.line()).collect();
        prop_assert_eq!(seen, lines);
    }

    #[test]
    fn parse_terminates_on_random_tokens(
        tokens in proptest::collection::vec(token(), 0..=MAX_TOKENS)
    ) {
        let newlines = tokens.iter().filter(|t| t.kind == TokenKind::Newline).count();
        let arena = Arena::new();
        match parse(TokenStream::new(tokens), &arena) {
            Ok(root) => check_top_level(root)?,
            Err(err) => {
                prop_assert!(err.line() >= 1);
                prop_assert!(err.line() as usize <= newlines + 1);
            }
        }
    }

    #[test]
    fn parse_accepts_generated_declarations(
        decls in proptest::collection::vec((0usize..4, "[a-z]{1,6}"), 0..20)
    ) {
        // Build `int name ;`, `extern char name ;`, `long * name ( ) ;` and
        // `int name ( ) { return 0 ; }` lines and expect them back in order.
        let templates = [
            ("int {} ;", NodeKind::VarDef),
            ("extern char {} ;", NodeKind::VarDecl),
            ("long * {} ( ) ;", NodeKind::FuncDecl),
            ("int {} ( ) { return 0 ; }", NodeKind::FuncDef),
        ];
        let mut src = String::new();
        let mut expected = Vec::new();
        for (which, name) in &decls {
            // keep names clear of keywords by prefixing them
            let name = format!("v_{}", name);
            let (template, kind) = templates[*which];
            src.push_str(&template.replace("{}", &name));
            src.push('\n');
            expected.push(kind);
        }

        let arena = Arena::new();
        let root = parse(common::stream(&src), &arena).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(root.child_kinds(), expected);

        let lines: Vec<u32> = root.children().iter().map(|n| n.line()).collect();
        let want: Vec<u32> = (1..=decls.len() as u32).collect();
        prop_assert_eq!(lines, want);
    }
}
