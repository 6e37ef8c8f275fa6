//! What goes into and comes out of the automaton.
//!
//! The lexer supplies [`Token`]s; the automaton reports what it did as
//! [`Event`]s to an [`EventSink`]. The events describe a tree bottom-up
//! against a list of pending items kept by the consumer:
//!
//! - `Shift` appends one item. `children` is non-zero only for the
//!   placeholder of a finished nested grammar, which adopts that many items
//!   from the end of the list.
//! - `Reduce` takes the `children` items that precede the last `hoisted`
//!   items and replaces them with one node. The hoisted items (skipped
//!   content after the reduced span) stay where they are, after the new node.
//! - `Error` reports a recovered syntax error and adds nothing. The error
//!   leaf, if any, follows as a `Shift` of the `ERR` term.

use crate::errors::ParseError;
use crate::term::{TermId, EOF};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A token from the lexer: raw term id and its place in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub term: TermId,
    pub start: usize,
    pub len: usize,
}

impl Token {
    pub fn new(term: TermId, start: usize, len: usize) -> Token {
        Token { term, start, len }
    }

    pub fn eof(at: usize) -> Token {
        Token::new(EOF, at, 0)
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Shift {
        /// Term after specialization
        term: TermId,
        span: Span,
        children: usize,
        /// Consumed by a skip expression
        skipped: bool,
    },
    Reduce {
        term: TermId,
        span: Span,
        depth: usize,
        children: usize,
        hoisted: usize,
        /// Folds a repetition body into its repeat term
        repeat: bool,
        /// Built inside a skip expression
        skipped: bool,
    },
    Error(Diagnostic),
}

/// A syntax error the automaton recovered from through an `ERR` action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: ParseError,
    /// The offending token was turned into an error leaf
    pub consumed: bool,
}

pub trait EventSink {
    fn event(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn event(&mut self, event: Event) {
        self.push(event);
    }
}

/// Discards everything, for parses that only need to succeed or fail
impl EventSink for () {
    fn event(&mut self, _event: Event) {}
}
