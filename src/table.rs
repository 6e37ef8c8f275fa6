//! Compiled parse tables.
//!
//! Tables are a handful of flat integer arrays, borrowed rather than copied
//! so they can live in static data or a memory map:
//!
//! - `states`: three `u32` words per state: the descriptor word, the offset
//!   of the state's action run and the offset of its goto run.
//! - `actions`: runs of `term, low, high` where `low`/`high` are the two
//!   cells of a split action (see [`crate::action::split`]), ended by `END`.
//! - `gotos`: runs of `term, target`, ended by `END`.
//! - `specializations`: see [`crate::specialize`].
//!
//! Everything is checked once by [`ParseTables::new`]. After that the
//! lookups can only fail on state ids that did not come from the table.

use log::trace;

use crate::action::{self, Action, StateId};
use crate::errors::{Error, Result, TableKind};
use crate::specialize::Specializer;
use crate::state::StateDescriptor;
use crate::term::{self, TermId};

pub const STATE_STRIDE: usize = 3;
const DESCRIPTOR: usize = 0;
const ACTIONS: usize = 1;
const GOTOS: usize = 2;

/// Cursor over a run of 16-bit cells
#[derive(Debug, Clone, Copy)]
pub struct Cells<'t> {
    cells: &'t [u16],
    pos: usize,
    table: TableKind,
    // What the run belongs to, for error messages
    owner: usize,
}

impl<'t> Cells<'t> {
    pub fn new(cells: &'t [u16], pos: usize, table: TableKind, owner: usize) -> Cells<'t> {
        Cells {
            cells,
            pos,
            table,
            owner,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.cells.len().saturating_sub(self.pos)
    }

    pub fn set_owner(&mut self, owner: usize) {
        self.owner = owner;
    }

    fn missing_terminator(&self) -> Error {
        Error::MissingTerminator {
            table: self.table,
            owner: self.owner,
        }
    }

    /// Reads the key of the next entry, or `None` (consuming the marker)
    /// when the run ends here.
    pub fn next_term(&mut self) -> Result<Option<u16>> {
        let cell = *self.cells.get(self.pos).ok_or_else(|| self.missing_terminator())?;
        self.pos += 1;
        if cell == term::END {
            Ok(None)
        } else {
            Ok(Some(cell))
        }
    }

    /// Reads one value cell, which may not be the end marker
    pub fn next_value(&mut self) -> Result<u16> {
        let cell = *self.cells.get(self.pos).ok_or_else(|| self.missing_terminator())?;
        if cell == term::END {
            return Err(Error::MisplacedTerminator {
                table: self.table,
                offset: self.pos,
            });
        }
        self.pos += 1;
        Ok(cell)
    }

    /// Reads a value split over two adjacent cells
    pub fn next_pair(&mut self) -> Result<u32> {
        match self.remaining() {
            0 => Err(self.missing_terminator()),
            1 => Err(Error::OddCells {
                table: self.table,
                offset: self.pos,
            }),
            _ => {
                let low = self.next_value()?;
                let high = self.next_value()?;
                Ok(action::join(low, high))
            }
        }
    }
}

/// The raw arrays of one compiled grammar
#[derive(Debug, Clone, Copy)]
pub struct TableData<'t> {
    pub start: StateId,
    pub states: &'t [u32],
    pub actions: &'t [u16],
    pub gotos: &'t [u16],
    pub specializations: &'t [u16],
}

/// A grammar that takes over the input when the host enters a state with
/// `START_NEST`
#[derive(Debug, Clone)]
pub struct NestedGrammar<'t> {
    pub name: &'t str,
    pub tables: ParseTables<'t>,
    /// Host token that ends the nested region
    pub end: TermId,
    /// Host term shifted over the nested region once it is done
    pub placeholder: TermId,
}

/// Validated, read-only parse tables. Shared freely between parses.
#[derive(Debug, Clone)]
pub struct ParseTables<'t> {
    data: TableData<'t>,
    specializer: Specializer<'t>,
    nested: Vec<NestedGrammar<'t>>,
}

impl<'t> ParseTables<'t> {
    pub fn new(data: TableData<'t>, nested: Vec<NestedGrammar<'t>>) -> Result<ParseTables<'t>> {
        let tables = ParseTables {
            data,
            specializer: Specializer::new(data.specializations)?,
            nested,
        };
        tables.validate()?;
        Ok(tables)
    }

    // For views of tables that were validated when they were built
    pub(crate) fn new_unchecked(
        data: TableData<'t>,
        nested: Vec<NestedGrammar<'t>>,
    ) -> ParseTables<'t> {
        ParseTables {
            data,
            specializer: Specializer::new_unchecked(data.specializations),
            nested,
        }
    }

    fn validate(&self) -> Result<()> {
        let states = self.data.states;
        // State ids are 16 bits wide
        if states.is_empty()
            || states.len() % STATE_STRIDE != 0
            || self.state_count() > StateId::MAX as usize + 1
        {
            return Err(Error::InvalidStateTable(states.len()));
        }
        if self.data.start as usize >= self.state_count() {
            return Err(Error::UnknownState(self.data.start as u32));
        }

        for state in 0..self.state_count() {
            let descriptor = StateDescriptor::from_bits(states[state * STATE_STRIDE + DESCRIPTOR]);
            if let Some(index) = descriptor.nest_index() {
                if index >= self.nested.len() {
                    return Err(Error::InvalidNestIndex { state, index });
                }
            }
            self.validate_actions(state)?;
            self.validate_gotos(state)?;
        }

        Ok(())
    }

    fn validate_actions(&self, state: usize) -> Result<()> {
        let mut cursor = self.run(state, ACTIONS)?;
        while cursor.next_term()?.is_some() {
            let raw = cursor.next_pair()?;
            match Action::decode(raw)? {
                Action::Shift(s) if !s.stay => self.check_state(s.target)?,
                // Would resume the same state without consuming, forever
                Action::Reduce(r) if r.stay && r.depth == 0 => {
                    return Err(Error::MalformedAction(raw));
                }
                Action::Reduce(r) if term::is_reserved(r.term) => {
                    return Err(Error::ReservedTerm {
                        table: TableKind::Actions,
                        term: r.term,
                    });
                }
                _ => (),
            }
        }
        Ok(())
    }

    fn validate_gotos(&self, state: usize) -> Result<()> {
        let mut cursor = self.run(state, GOTOS)?;
        while let Some(t) = cursor.next_term()? {
            if term::is_reserved(t) {
                return Err(Error::ReservedTerm {
                    table: TableKind::Gotos,
                    term: t,
                });
            }
            self.check_state(cursor.next_value()?)?;
        }
        Ok(())
    }

    fn check_state(&self, state: StateId) -> Result<()> {
        if (state as usize) < self.state_count() {
            Ok(())
        } else {
            Err(Error::UnknownState(state as u32))
        }
    }

    fn record(&self, state: StateId, field: usize) -> Result<u32> {
        self.data
            .states
            .get(state as usize * STATE_STRIDE + field)
            .copied()
            .ok_or(Error::UnknownState(state as u32))
    }

    /// Cursor at the start of a state's action or goto run
    fn run(&self, state: usize, field: usize) -> Result<Cells<'t>> {
        let (cells, table) = if field == ACTIONS {
            (self.data.actions, TableKind::Actions)
        } else {
            (self.data.gotos, TableKind::Gotos)
        };
        let offset = self.record(state as StateId, field)? as usize;
        if offset >= cells.len() {
            return Err(Error::OffsetOutOfRange {
                table,
                state,
                offset,
            });
        }
        Ok(Cells::new(cells, offset, table, state))
    }

    pub fn data(&self) -> &TableData<'t> {
        &self.data
    }

    pub fn start(&self) -> StateId {
        self.data.start
    }

    pub fn state_count(&self) -> usize {
        self.data.states.len() / STATE_STRIDE
    }

    pub fn descriptor(&self, state: StateId) -> Result<StateDescriptor> {
        self.record(state, DESCRIPTOR).map(StateDescriptor::from_bits)
    }

    /// The action for `term` in `state`, if any
    pub fn action(&self, state: StateId, term: TermId) -> Result<Option<Action>> {
        let mut cursor = self.run(state as usize, ACTIONS)?;
        while let Some(t) = cursor.next_term()? {
            let raw = cursor.next_pair()?;
            if t == term {
                let action = Action::decode(raw)?;
                trace!("state {} on {}: {:?}", state, term, action);
                return Ok(Some(action));
            }
        }
        Ok(None)
    }

    /// Every term `state` has an action for
    pub fn action_terms(&self, state: StateId) -> Result<Vec<TermId>> {
        let mut cursor = self.run(state as usize, ACTIONS)?;
        let mut terms = Vec::new();
        while let Some(t) = cursor.next_term()? {
            cursor.next_pair()?;
            terms.push(t);
        }
        Ok(terms)
    }

    pub fn goto(&self, state: StateId, term: TermId) -> Result<Option<StateId>> {
        let mut cursor = self.run(state as usize, GOTOS)?;
        while let Some(t) = cursor.next_term()? {
            let target = cursor.next_value()?;
            if t == term {
                return Ok(Some(target));
            }
        }
        Ok(None)
    }

    pub fn specializer(&self) -> &Specializer<'t> {
        &self.specializer
    }

    pub fn nested(&self, index: usize) -> Option<&NestedGrammar<'t>> {
        self.nested.get(index)
    }

    pub fn nested_count(&self) -> usize {
        self.nested.len()
    }
}
