use crate::action::{self, Action, StateId};
use crate::errors::{Error, Result};
use crate::specialize::SpecializeKind;
use crate::state::StateDescriptor;
use crate::table::{NestedGrammar, ParseTables, TableData};
use crate::term::{TermId, END};

/// Parse tables that own their arrays, as produced by `TableBuilder` or
/// loaded from JSON. Borrow them as `ParseTables` with `view`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnedTables {
    pub(crate) start: StateId,
    pub(crate) states: Vec<u32>,
    pub(crate) actions: Vec<u16>,
    pub(crate) gotos: Vec<u16>,
    pub(crate) specializations: Vec<u16>,
    pub(crate) nested: Vec<OwnedNested>,
    pub(crate) names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedNested {
    pub name: String,
    pub tables: OwnedTables,
    pub end: TermId,
    pub placeholder: TermId,
}

impl OwnedNested {
    fn view(&self) -> NestedGrammar<'_> {
        NestedGrammar {
            name: &self.name,
            tables: self.tables.view(),
            end: self.end,
            placeholder: self.placeholder,
        }
    }
}

impl OwnedTables {
    /// Takes ownership of raw arrays, validating them the same way
    /// `ParseTables::new` does.
    pub fn new(
        start: StateId,
        states: Vec<u32>,
        actions: Vec<u16>,
        gotos: Vec<u16>,
        specializations: Vec<u16>,
        nested: Vec<OwnedNested>,
    ) -> Result<OwnedTables> {
        let tables = OwnedTables {
            start,
            states,
            actions,
            gotos,
            specializations,
            nested,
            names: Vec::new(),
        };
        ParseTables::new(
            tables.data(),
            tables.nested.iter().map(OwnedNested::view).collect(),
        )?;
        Ok(tables)
    }

    fn data(&self) -> TableData<'_> {
        TableData {
            start: self.start,
            states: &self.states,
            actions: &self.actions,
            gotos: &self.gotos,
            specializations: &self.specializations,
        }
    }

    pub fn view(&self) -> ParseTables<'_> {
        ParseTables::new_unchecked(
            self.data(),
            self.nested.iter().map(OwnedNested::view).collect(),
        )
    }

    pub fn with_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Term names, indexed by term id. May be empty.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Assembles tables in the flat storage layout
#[derive(Debug, Default)]
pub struct TableBuilder {
    start: StateId,
    descriptors: Vec<StateDescriptor>,
    actions: Vec<(StateId, TermId, Action)>,
    gotos: Vec<(StateId, TermId, StateId)>,
    specializations: Vec<(TermId, TermId, SpecializeKind)>,
    nested: Vec<OwnedNested>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        Default::default()
    }

    /// Adds a state and returns its id. The first state is the start state
    /// unless `start` says otherwise.
    pub fn state(&mut self, descriptor: StateDescriptor) -> StateId {
        self.descriptors.push(descriptor);
        (self.descriptors.len() - 1) as StateId
    }

    pub fn start(&mut self, state: StateId) -> &mut Self {
        self.start = state;
        self
    }

    pub fn action(&mut self, state: StateId, term: TermId, action: Action) -> &mut Self {
        self.actions.push((state, term, action));
        self
    }

    pub fn goto(&mut self, state: StateId, term: TermId, target: StateId) -> &mut Self {
        self.gotos.push((state, term, target));
        self
    }

    pub fn specialize(&mut self, raw: TermId, refined: TermId, kind: SpecializeKind) -> &mut Self {
        self.specializations.push((raw, refined, kind));
        self
    }

    /// Registers a nested grammar and returns its index for
    /// `StateDescriptor::nest`
    pub fn nest(
        &mut self,
        name: &str,
        tables: OwnedTables,
        end: TermId,
        placeholder: TermId,
    ) -> u16 {
        self.nested.push(OwnedNested {
            name: name.to_string(),
            tables,
            end,
            placeholder,
        });
        (self.nested.len() - 1) as u16
    }

    pub fn build(&self) -> Result<OwnedTables> {
        let count = self.descriptors.len();
        for &(state, _, _) in &self.actions {
            if state as usize >= count {
                return Err(Error::UnknownState(state as u32));
            }
        }
        for &(state, _, _) in &self.gotos {
            if state as usize >= count {
                return Err(Error::UnknownState(state as u32));
            }
        }

        let mut states = Vec::with_capacity(count * 3);
        let mut actions = Vec::new();
        let mut gotos = Vec::new();

        for (id, descriptor) in self.descriptors.iter().enumerate() {
            states.push(descriptor.bits());

            states.push(actions.len() as u32);
            for (_, term, action) in self.actions.iter().filter(|a| a.0 as usize == id) {
                actions.push(*term);
                actions.extend_from_slice(&action::split(action.encode()?));
            }
            actions.push(END);

            states.push(gotos.len() as u32);
            for (_, term, target) in self.gotos.iter().filter(|g| g.0 as usize == id) {
                gotos.push(*term);
                gotos.push(*target);
            }
            gotos.push(END);
        }

        // One run per raw id, entries in insertion order
        let mut specializations = Vec::new();
        let mut seen: Vec<TermId> = Vec::new();
        for &(raw, _, _) in &self.specializations {
            if seen.contains(&raw) {
                continue;
            }
            seen.push(raw);
            specializations.push(raw);
            for &(_, refined, kind) in self.specializations.iter().filter(|s| s.0 == raw) {
                specializations.push(refined);
                specializations.push(kind as u16);
            }
            specializations.push(END);
        }

        OwnedTables::new(
            self.start,
            states,
            actions,
            gotos,
            specializations,
            self.nested.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateFlags;
    use crate::term::EOF;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn layout() {
        let mut b = TableBuilder::new();
        let s0 = b.state(StateDescriptor::default());
        let s1 = b.state(StateDescriptor::new(StateFlags::ACCEPTING));
        b.action(s0, 3, Action::shift(s1))
            .goto(s0, 5, s1)
            .specialize(3, 7, SpecializeKind::Extend);
        let owned = b.build().unwrap();

        assert_eq!(owned.states, vec![0, 0, 0, 2, 4, 3]);
        assert_eq!(owned.actions, vec![3, 1, 0, END, END]);
        assert_eq!(owned.gotos, vec![5, 1, END, END]);
        assert_eq!(owned.specializations, vec![3, 7, 1, END]);

        let tables = owned.view();
        assert_eq!(tables.action(s0, 3), Ok(Some(Action::shift(s1))));
        assert_eq!(tables.action(s1, EOF), Ok(None));
    }

    #[test]
    fn rejects_unknown_states() {
        let mut b = TableBuilder::new();
        let s0 = b.state(StateDescriptor::default());
        b.action(s0, 3, Action::shift(4));
        assert_eq!(b.build(), Err(Error::UnknownState(4)));

        let mut b = TableBuilder::new();
        b.state(StateDescriptor::default());
        b.goto(2, 3, 0);
        assert_eq!(b.build(), Err(Error::UnknownState(2)));
    }

    #[test]
    fn rejects_unencodable_actions() {
        let mut b = TableBuilder::new();
        let s0 = b.state(StateDescriptor::default());
        b.action(s0, 3, Action::shift(0));
        assert_eq!(b.build(), Err(Error::ShiftToStartState));
    }

    proptest! {
        #[test]
        fn lookups_find_the_first_entry(
            entries in prop::collection::vec((0u16..4, 2u16..200, 1u16..4, any::<bool>()), 0..40)
        ) {
            let mut b = TableBuilder::new();
            for _ in 0..4 {
                b.state(StateDescriptor::default());
            }
            let mut expected = HashMap::new();
            for (state, term, n, shift) in entries {
                let action = if shift { Action::shift(n) } else { Action::reduce(term, n) };
                b.action(state, term, action);
                expected.entry((state, term)).or_insert(action);
            }

            let owned = b.build().unwrap();
            let tables = owned.view();
            for ((state, term), action) in expected {
                prop_assert_eq!(tables.action(state, term), Ok(Some(action)));
            }
            prop_assert_eq!(tables.action(0, 1), Ok(None));
        }
    }
}
