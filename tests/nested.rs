mod common;

use shiftreduce::term::EOF;
use shiftreduce::{
    Action, EventSink, OwnedTables, Parse, Span, StateDescriptor, StateFlags, Step, TableBuilder,
    Token, TreeBuilder,
};

use common::init_logger;

const OPEN: u16 = 3;
const CLOSE: u16 = 5;
const INNER: u16 = 7;
const DOC: u16 = 9;
const WORD: u16 = 11;
const TEXT: u16 = 13;
const NAMES: [&str; 14] = [
    "", "", "", "Open", "", "Close", "", "Inner", "", "Doc", "", "Word", "", "Text",
];

// Text -> Word
fn inner() -> OwnedTables {
    let mut b = TableBuilder::new();
    let s0 = b.state(StateDescriptor::default());
    let s1 = b.state(StateDescriptor::default());
    let s2 = b.state(StateDescriptor::new(StateFlags::ACCEPTING));
    b.action(s0, WORD, Action::shift(s1))
        .action(s1, EOF, Action::reduce(TEXT, 1))
        .goto(s0, TEXT, s2);
    b.build().unwrap()
}

// Doc -> Open Inner Close, where Inner is whatever the nested grammar
// parses up to the Close token
fn host() -> OwnedTables {
    let mut b = TableBuilder::new();
    let index = b.nest("inner", inner(), CLOSE, INNER);
    let s0 = b.state(StateDescriptor::default());
    let s1 = b.state(StateDescriptor::nest(StateFlags::empty(), index));
    let s2 = b.state(StateDescriptor::default());
    let s3 = b.state(StateDescriptor::default());
    let s4 = b.state(StateDescriptor::new(StateFlags::ACCEPTING));
    b.action(s0, OPEN, Action::shift(s1))
        .goto(s0, DOC, s4)
        .action(s1, INNER, Action::shift(s2))
        .action(s2, CLOSE, Action::shift(s3))
        .action(s3, EOF, Action::reduce(DOC, 3));
    b.build().unwrap()
}

#[test]
fn nested_region_is_mounted() {
    init_logger();
    let owned = host();
    let tables = owned.view();
    let mut parse = Parse::new(&tables);
    let mut builder = TreeBuilder::new();

    assert_eq!(parse.active_grammar(), None);
    parse.advance(Token::new(OPEN, 0, 1), &mut builder).unwrap();
    assert_eq!(parse.nest_depth(), 1);
    assert_eq!(parse.active_grammar(), Some("inner"));

    parse.advance(Token::new(WORD, 1, 4), &mut builder).unwrap();
    parse.advance(Token::new(CLOSE, 5, 1), &mut builder).unwrap();
    assert_eq!(parse.nest_depth(), 0);
    assert_eq!(
        parse.advance(Token::eof(6), &mut builder),
        Ok(Step::Accepted)
    );

    let tree = builder.finish();
    assert_eq!(tree.visualize(&NAMES), "Doc[Open Inner[Text[Word]] Close]");

    let doc = tree.node(tree.roots()[0]);
    let inner = tree.node(doc.children[1]);
    assert_eq!(inner.term, INNER);
    assert_eq!(inner.span, Span::new(1, 5));
    assert_eq!(doc.span, Span::new(0, 6));
}

mod after_whitespace {
    use super::*;

    const WS: u16 = 14;
    const WHITESPACE: u16 = 15;
    const LEAD: u16 = 17;
    const NAMES: [&str; 18] = [
        "", "", "", "Open", "", "Close", "", "Inner", "", "Doc", "", "Word", "", "Text", "",
        "Whitespace", "", "Lead",
    ];

    // Text -> Lead Word, with Lead empty
    fn inner() -> OwnedTables {
        let mut b = TableBuilder::new();
        let s0 = b.state(StateDescriptor::default());
        let s1 = b.state(StateDescriptor::default());
        let s2 = b.state(StateDescriptor::default());
        let s3 = b.state(StateDescriptor::new(StateFlags::ACCEPTING));
        b.action(s0, WORD, Action::reduce(LEAD, 0))
            .goto(s0, LEAD, s1)
            .goto(s0, TEXT, s3)
            .action(s1, WORD, Action::shift(s2))
            .action(s2, EOF, Action::reduce(TEXT, 2));
        b.build().unwrap()
    }

    // Doc -> Open Inner Close. Whitespace after Open is skipped in the host
    // and the nested grammar is entered by a goto on the first Word.
    fn host() -> OwnedTables {
        let mut b = TableBuilder::new();
        let index = b.nest("inner", inner(), CLOSE, INNER);
        let s0 = b.state(StateDescriptor::default());
        let s1 = b.state(StateDescriptor::default());
        let s2 = b.state(StateDescriptor::nest(StateFlags::empty(), index));
        let s3 = b.state(StateDescriptor::default());
        let s4 = b.state(StateDescriptor::default());
        let s5 = b.state(StateDescriptor::new(StateFlags::SKIPPED));
        let s6 = b.state(StateDescriptor::new(StateFlags::SKIPPED));
        let s7 = b.state(StateDescriptor::new(StateFlags::ACCEPTING));
        b.action(s0, OPEN, Action::shift(s1))
            .goto(s0, DOC, s7)
            .action(s1, WS, Action::goto(s5))
            .action(s1, WORD, Action::goto(s2))
            .action(s2, INNER, Action::shift(s3))
            .action(s3, CLOSE, Action::shift(s4))
            .action(s4, EOF, Action::reduce(DOC, 4))
            .action(s5, WS, Action::shift(s6));
        for t in [WS, WORD] {
            b.action(s6, t, Action::reduce(WHITESPACE, 2).staying());
        }
        b.build().unwrap()
    }

    #[test]
    fn host_whitespace_stays_in_the_host() {
        init_logger();
        let owned = host();
        let tables = owned.view();
        let mut builder = TreeBuilder::new();
        shiftreduce::parse(
            &tables,
            vec![
                Token::new(OPEN, 0, 1),
                Token::new(WS, 1, 1),
                Token::new(WORD, 2, 4),
                Token::new(CLOSE, 6, 1),
            ],
            &mut builder,
            Default::default(),
        )
        .unwrap();

        let tree = builder.finish();
        assert_eq!(
            tree.visualize(&NAMES),
            "Doc[Open Whitespace Inner[Text[Lead Word]] Close]"
        );
        assert_eq!(tree.roots().len(), 1);

        let doc = tree.node(tree.roots()[0]);
        let inner = tree.node(doc.children[2]);
        assert_eq!(inner.term, INNER);
        assert_eq!(inner.span, Span::new(2, 6));
        let text = tree.node(inner.children[0]);
        let lead = tree.node(text.children[0]);
        assert_eq!(lead.span, Span::new(2, 2));
        assert_eq!(text.span, Span::new(2, 6));
    }

    #[test]
    fn placeholder_adopts_the_nested_tree() {
        let owned = host();
        let tables = owned.view();
        let mut events = Vec::new();
        shiftreduce::parse(
            &tables,
            vec![
                Token::new(OPEN, 0, 1),
                Token::new(WS, 1, 1),
                Token::new(WORD, 2, 4),
                Token::new(CLOSE, 6, 1),
            ],
            &mut events,
            Default::default(),
        )
        .unwrap();
        assert!(events.contains(&shiftreduce::Event::Shift {
            term: INNER,
            span: Span::new(2, 6),
            children: 1,
            skipped: false,
        }));
        assert!(events.contains(&shiftreduce::Event::Reduce {
            term: TEXT,
            span: Span::new(2, 6),
            depth: 2,
            children: 2,
            hoisted: 0,
            repeat: false,
            skipped: false,
        }));
    }
}

#[test]
fn empty_nested_region_fails_inside() {
    let owned = host();
    let tables = owned.view();
    let mut parse = Parse::new(&tables);
    let mut sink = Vec::new();
    parse.advance(Token::new(OPEN, 0, 1), &mut sink).unwrap();

    // The nested grammar needs a Word before it can accept
    let err = parse.advance(Token::new(CLOSE, 1, 1), &mut sink).unwrap_err();
    match err {
        shiftreduce::Error::Syntax(e) => {
            assert_eq!(e.found, EOF);
            assert_eq!(e.expected, vec![WORD]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn events_without_a_tree() {
    struct Count(usize);
    impl EventSink for Count {
        fn event(&mut self, _: shiftreduce::Event) {
            self.0 += 1;
        }
    }

    let owned = host();
    let tables = owned.view();
    let mut count = Count(0);
    shiftreduce::parse(
        &tables,
        vec![
            Token::new(OPEN, 0, 1),
            Token::new(WORD, 1, 4),
            Token::new(CLOSE, 5, 1),
        ],
        &mut count,
        Default::default(),
    )
    .unwrap();
    // Open, Word, Text, Inner, Close, Doc
    assert_eq!(count.0, 6);
}
