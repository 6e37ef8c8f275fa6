//! The table-driven shift/reduce automaton.
//!
//! A `Parse` is fed one token at a time. Each step resolves the token
//! through the specializer, looks up the action for the top state and
//! applies it, reporting what happened to an [`EventSink`]. Tables are only
//! borrowed, so any number of parses can run over the same tables.

use log::{debug, trace, warn};

use crate::action::{Action, Reduce, StateId};
use crate::errors::{Error, ParseError, Result};
use crate::parser::events::{Diagnostic, Event, EventSink, Span, Token};
use crate::parser::stack::{Frame, Stack};
use crate::specialize::SpecializeKind;
use crate::table::{NestedGrammar, ParseTables};
use crate::term::{self, TermId, EOF, ERR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Recoveries through `ERR` actions allowed before a syntax error is
    /// returned instead
    pub max_recoveries: usize,
    /// Frames per stack, base frame included
    pub max_stack_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_recoveries: 32,
            max_stack_depth: 65536,
        }
    }
}

/// What a single step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Consumed the token and pushed a state
    Shifted,
    /// Consumed the token without leaving the state
    Skipped,
    /// Pushed a state without consuming
    Pushed,
    Reduced,
    Accepted,
}

impl Step {
    pub fn consumed(self) -> bool {
        matches!(self, Step::Shifted | Step::Skipped)
    }
}

#[derive(Debug, Clone, Copy)]
struct Nest<'p, 't> {
    grammar: &'p NestedGrammar<'t>,
    start: usize,
    // Host counters when the grammar was entered, restored when it closes
    base: usize,
    tail: usize,
    reduce_pos: usize,
}

#[derive(Debug)]
struct Level<'p, 't> {
    tables: &'p ParseTables<'t>,
    stack: Stack,
    nest: Option<Nest<'p, 't>>,
}

#[derive(Debug)]
pub struct Parse<'p, 't> {
    // Host grammar first, innermost nested grammar last. Never empty.
    levels: Vec<Level<'p, 't>>,
    options: ParseOptions,
    pos: usize,
    // End of the last content that was not skipped
    reduce_pos: usize,
    // Pending tree items as seen by the event consumer, and how many of
    // them at the end are skipped content
    items: usize,
    skipped_tail: usize,
    // Items a finished nested grammar left for the placeholder shift
    mount: usize,
    recoveries: usize,
    finished: bool,
}

impl<'p, 't> Parse<'p, 't> {
    pub fn new(tables: &'p ParseTables<'t>) -> Self {
        Self::with_options(tables, ParseOptions::default())
    }

    pub fn with_options(tables: &'p ParseTables<'t>, options: ParseOptions) -> Self {
        Parse {
            levels: vec![Level {
                tables,
                stack: Stack::new(tables.start(), 0, options.max_stack_depth),
                nest: None,
            }],
            options,
            pos: 0,
            reduce_pos: 0,
            items: 0,
            skipped_tail: 0,
            mount: 0,
            recoveries: 0,
            finished: false,
        }
    }

    fn level(&self) -> &Level<'p, 't> {
        &self.levels[self.levels.len() - 1]
    }

    fn level_mut(&mut self) -> &mut Level<'p, 't> {
        let last = self.levels.len() - 1;
        &mut self.levels[last]
    }

    /// Top state of the active grammar
    pub fn state(&self) -> StateId {
        self.level().stack.state()
    }

    /// States of the active grammar's stack, bottom first
    pub fn stack(&self) -> Vec<StateId> {
        self.level().stack.states()
    }

    /// End of the consumed input
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn recoveries(&self) -> usize {
        self.recoveries
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of nested grammars currently active
    pub fn nest_depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Name of the innermost active nested grammar, `None` in the host.
    /// Lexers use this to pick their token set.
    pub fn active_grammar(&self) -> Option<&'t str> {
        self.level().nest.map(|n| n.grammar.name)
    }

    /// Feeds one token, stepping until it is consumed. For `EOF` that means
    /// until the parse accepts.
    pub fn advance<S: EventSink>(&mut self, token: Token, sink: &mut S) -> Result<Step> {
        if self.finished {
            return Err(Error::ParseFinished);
        }
        while let Some(nest) = self.level().nest {
            if token.term != EOF && token.term != nest.grammar.end {
                break;
            }
            self.close_nest(nest, token.start, sink)?;
        }
        loop {
            let step = self.step(&token, sink)?;
            if step == Step::Accepted || (step.consumed() && token.term != EOF) {
                return Ok(step);
            }
        }
    }

    /// Applies a single action for `token`
    pub fn step<S: EventSink>(&mut self, token: &Token, sink: &mut S) -> Result<Step> {
        if self.finished {
            return Err(Error::ParseFinished);
        }
        let tables = self.level().tables;
        let state = self.state();

        if token.term == EOF && tables.descriptor(state)?.is_accepting() {
            if self.levels.len() == 1 {
                debug!("accepted at {}", token.start);
                self.finished = true;
            }
            return Ok(Step::Accepted);
        }

        match resolve(tables, state, token.term)? {
            Some((term, action)) => self.apply(term, action, token, sink),
            None => self.recover(token, sink),
        }
    }

    fn apply<S: EventSink>(
        &mut self,
        term: TermId,
        action: Action,
        token: &Token,
        sink: &mut S,
    ) -> Result<Step> {
        match action {
            Action::Shift(shift) if shift.goto => {
                debug!("state {}: goto {}", self.state(), shift.target);
                let frame = self.frame(shift.target, token.start);
                self.level_mut().stack.push(frame)?;
                self.enter_nest(shift.target, token.start)?;
                Ok(Step::Pushed)
            }
            Action::Shift(shift) if shift.stay => {
                debug!("state {}: skip {}", self.state(), term::name(term));
                self.consume(term, token, true, sink);
                Ok(Step::Skipped)
            }
            Action::Shift(shift) => {
                let skipped = self.level().tables.descriptor(shift.target)?.is_skipped();
                debug!(
                    "state {}: shift {} -> {}",
                    self.state(),
                    term::name(term),
                    shift.target
                );
                let (base, tail) = self.consume(term, token, skipped, sink);
                self.level_mut().stack.push(Frame {
                    state: shift.target,
                    start: token.start,
                    base,
                    tail,
                })?;
                self.enter_nest(shift.target, self.pos)?;
                Ok(Step::Shifted)
            }
            Action::Reduce(reduce) => {
                self.reduce(reduce, token, sink)?;
                Ok(Step::Reduced)
            }
        }
    }

    // Items below this belong to the grammars further out
    fn floor(&self) -> usize {
        self.level().nest.map_or(0, |n| n.base)
    }

    fn frame(&self, state: StateId, start: usize) -> Frame {
        Frame {
            state,
            start,
            base: self.items,
            tail: self.skipped_tail,
        }
    }

    /// Emits the shift event and moves past the token. Returns the item
    /// counters from before the new item.
    fn consume<S: EventSink>(
        &mut self,
        term: TermId,
        token: &Token,
        skipped: bool,
        sink: &mut S,
    ) -> (usize, usize) {
        let children = std::mem::take(&mut self.mount);
        let base = self.items.saturating_sub(children);
        let tail = self.skipped_tail.saturating_sub(children);

        sink.event(Event::Shift {
            term,
            span: token.span(),
            children,
            skipped,
        });

        self.items = base + 1;
        self.skipped_tail = if skipped { tail + 1 } else { 0 };
        self.pos = self.pos.max(token.end());
        if !skipped {
            self.reduce_pos = self.pos;
        }
        (base, tail)
    }

    fn reduce<S: EventSink>(&mut self, reduce: Reduce, token: &Token, sink: &mut S) -> Result<()> {
        let tables = self.level().tables;
        let state = self.state();
        let skipped = tables.descriptor(state)?.is_skipped();
        let end = if skipped { self.pos } else { self.reduce_pos };
        let depth = reduce.depth as usize;

        let lowest = if depth == 0 {
            // An empty node goes before any trailing skipped content
            if skipped {
                self.frame(state, end)
            } else {
                Frame {
                    state,
                    start: end,
                    base: (self.items - self.skipped_tail).max(self.floor()),
                    tail: 0,
                }
            }
        } else {
            self.level_mut().stack.pop(depth)?
        };

        let span = Span::new(lowest.start, end.max(lowest.start));
        let available = self.items.saturating_sub(lowest.base);
        let (children, hoisted) = if skipped {
            (available, 0)
        } else {
            let hoisted = self.skipped_tail.min(available);
            (available - hoisted, hoisted)
        };

        let next = if reduce.stay {
            None
        } else {
            let top = self.state();
            let target = tables.goto(top, reduce.term)?.ok_or(Error::MissingGoto {
                state: top,
                term: reduce.term,
            })?;
            Some(target)
        };

        debug!(
            "state {}: reduce {} depth {}{}",
            state,
            term::name(reduce.term),
            depth,
            if reduce.repeat { " (repeat)" } else { "" }
        );
        sink.event(Event::Reduce {
            term: reduce.term,
            span,
            depth,
            children,
            hoisted,
            repeat: reduce.repeat,
            skipped,
        });
        self.items = lowest.base + 1 + hoisted;
        self.skipped_tail = if skipped { lowest.tail + 1 } else { hoisted };

        if let Some(target) = next {
            self.level_mut().stack.push(Frame {
                state: target,
                start: span.start,
                base: lowest.base,
                tail: lowest.tail,
            })?;
            self.enter_nest(target, token.start)?;
        }
        Ok(())
    }

    fn recover<S: EventSink>(&mut self, token: &Token, sink: &mut S) -> Result<Step> {
        let tables = self.level().tables;
        let state = self.state();
        let error = ParseError {
            position: token.start,
            state,
            found: token.term,
            expected: tables
                .action_terms(state)?
                .into_iter()
                .filter(|t| *t != ERR)
                .collect(),
        };

        if self.recoveries >= self.options.max_recoveries {
            return Err(Error::Syntax(error));
        }
        let action = match tables.action(state, ERR)? {
            Some(action) => action,
            None => return Err(Error::Syntax(error)),
        };

        self.recoveries += 1;
        warn!("recovering from {}", error);
        let consumed = matches!(action, Action::Shift(s) if !s.goto);
        sink.event(Event::Error(Diagnostic { error, consumed }));
        self.apply(ERR, action, token, sink)
    }

    fn enter_nest(&mut self, state: StateId, start: usize) -> Result<()> {
        let tables = self.level().tables;
        let index = match tables.descriptor(state)?.nest_index() {
            Some(index) => index,
            None => return Ok(()),
        };
        let grammar = tables.nested(index).ok_or(Error::InvalidNestIndex {
            state: state as usize,
            index,
        })?;

        debug!("entering nested grammar {} at {}", grammar.name, start);
        self.levels.push(Level {
            tables: &grammar.tables,
            stack: Stack::new(grammar.tables.start(), start, self.options.max_stack_depth),
            nest: Some(Nest {
                grammar,
                start,
                base: self.items,
                tail: self.skipped_tail,
                reduce_pos: self.reduce_pos,
            }),
        });
        // The nested grammar starts with no content of its own
        self.skipped_tail = 0;
        self.reduce_pos = start;
        Ok(())
    }

    /// Finishes the innermost nested grammar at `at` and shifts its
    /// placeholder in the grammar below
    fn close_nest<S: EventSink>(
        &mut self,
        nest: Nest<'p, 't>,
        at: usize,
        sink: &mut S,
    ) -> Result<()> {
        let eof = Token::eof(at);
        loop {
            if self.step(&eof, sink)? == Step::Accepted {
                break;
            }
        }
        self.levels.pop();

        let mount = self.items - nest.base;
        debug!("leaving nested grammar {} at {}", nest.grammar.name, at);
        self.mount = mount;
        self.skipped_tail = nest.tail + mount;
        self.reduce_pos = nest.reduce_pos;

        let placeholder = Token::new(
            nest.grammar.placeholder,
            nest.start,
            at.saturating_sub(nest.start),
        );
        loop {
            if self.step(&placeholder, sink)?.consumed() {
                return Ok(());
            }
        }
    }
}

/// Finds the action for `raw` in `state`, trying specializations first
fn resolve(tables: &ParseTables, state: StateId, raw: TermId) -> Result<Option<(TermId, Action)>> {
    for entry in tables.specializer().entries(raw) {
        match (tables.action(state, entry.term)?, entry.kind) {
            (Some(action), _) => {
                trace!("{} read as {}", term::name(raw), term::name(entry.term));
                return Ok(Some((entry.term, action)));
            }
            (None, SpecializeKind::Specialize) => return Ok(None),
            (None, SpecializeKind::Extend) => continue,
        }
    }
    Ok(tables.action(state, raw)?.map(|action| (raw, action)))
}

/// Runs a whole token stream to acceptance. An `EOF` token is supplied if
/// the stream does not end with one.
pub fn parse<S: EventSink>(
    tables: &ParseTables<'_>,
    tokens: impl IntoIterator<Item = Token>,
    sink: &mut S,
    options: ParseOptions,
) -> Result<()> {
    let mut parse = Parse::with_options(tables, options);
    let mut end = 0;
    for token in tokens {
        end = token.end();
        if parse.advance(token, sink)? == Step::Accepted {
            return Ok(());
        }
    }
    parse.advance(Token::eof(end), sink)?;
    Ok(())
}
