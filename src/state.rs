use bitflags::bitflags;

bitflags! {
    /// Flags in the low bits of a state's descriptor word
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateFlags: u32 {
        /// Part of a skip expression. Nodes built here are moved out of the
        /// node reduced right after them.
        const SKIPPED = 1;
        const ACCEPTING = 2;
        /// Starts a nested grammar. The nested grammar's index is stored
        /// from `NEST_SHIFT` up.
        const START_NEST = 4;
    }
}

pub const NEST_SHIFT: u32 = 10;

/// The descriptor word of one automaton state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateDescriptor(u32);

impl StateDescriptor {
    pub fn new(flags: StateFlags) -> StateDescriptor {
        StateDescriptor(flags.bits() & !StateFlags::START_NEST.bits())
    }

    /// A state that hands control to nested grammar `index`
    pub fn nest(flags: StateFlags, index: u16) -> StateDescriptor {
        StateDescriptor(
            (flags | StateFlags::START_NEST).bits() | (index as u32) << NEST_SHIFT,
        )
    }

    pub fn from_bits(bits: u32) -> StateDescriptor {
        StateDescriptor(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn flags(self) -> StateFlags {
        StateFlags::from_bits_truncate(self.0)
    }

    pub fn is_skipped(self) -> bool {
        self.0 & StateFlags::SKIPPED.bits() != 0
    }

    pub fn is_accepting(self) -> bool {
        self.0 & StateFlags::ACCEPTING.bits() != 0
    }

    pub fn starts_nest(self) -> bool {
        self.0 & StateFlags::START_NEST.bits() != 0
    }

    /// Index into the nested grammar table, only for states that start one
    pub fn nest_index(self) -> Option<usize> {
        if self.starts_nest() {
            Some((self.0 >> NEST_SHIFT) as usize)
        } else {
            None
        }
    }
}
