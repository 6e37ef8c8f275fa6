//! Parse actions.
//!
//! Compiled tables store an action as a single integer with the fields
//! packed into bits. Inside the crate an action is always the [`Action`]
//! enum; [`Action::decode`] and [`Action::encode`] are the only places that
//! know the bit layout:
//!
//! ```text
//!  31 .. 19   18     17            16        15 .. 0
//!  depth      stay   repeat|goto   reduce    state (shift) / term (reduce)
//! ```
//!
//! Bit 17 means "repeat" on a reduce and "goto" on a shift, so the reduce
//! bit is always examined first. The value 0 is never a valid action (no
//! shift targets the start state) and marks an absent table entry.

use bitflags::bitflags;

use crate::errors::{Error, Result};
use crate::term::{TermId, END};

pub type StateId = u16;

/// Set on reduce actions, clear on shifts
pub const REDUCE_FLAG: u32 = 1 << 16;
/// Target state for shifts, produced term for reduces
pub const VALUE_MASK: u32 = (1 << 16) - 1;
/// Reduce depth lives in the bits from here up
pub const REDUCE_DEPTH_SHIFT: u32 = 19;
/// Reduce of a repetition body into its repeat term. Not set on the
/// reduction that joins two instances of the repeat term.
pub const REPEAT_FLAG: u32 = 1 << 17;
/// Shift that pushes a frame without consuming the token, used to enter
/// skip rules from states that have no goto entry for them.
pub const GOTO_FLAG: u32 = 1 << 17;
/// Shift: consume the token but keep the state. Reduce: resume the state
/// beneath the reduced frames instead of consulting the goto table.
pub const STAY_FLAG: u32 = 1 << 18;
/// Largest depth that fits above `REDUCE_DEPTH_SHIFT`, less one: the top
/// depth with every flag set would store `END` in the high cell
pub const MAX_DEPTH: u32 = (1 << (32 - REDUCE_DEPTH_SHIFT)) - 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Shift,
    Reduce,
}

bitflags! {
    /// Modifier flags as passed to [`encode`]. Which ones are allowed depends
    /// on the action kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActionFlags: u8 {
        const STAY = 1 << 0;
        /// Reduce only
        const REPEAT = 1 << 1;
        /// Shift only
        const GOTO = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shift {
    pub target: StateId,
    pub goto: bool,
    pub stay: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reduce {
    pub term: TermId,
    pub depth: u16,
    pub repeat: bool,
    pub stay: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Shift(Shift),
    Reduce(Reduce),
}

impl Action {
    /// Plain shift: consume the token and push `target`
    pub fn shift(target: StateId) -> Action {
        Action::Shift(Shift {
            target,
            goto: false,
            stay: false,
        })
    }

    /// Push `target` without consuming the token
    pub fn goto(target: StateId) -> Action {
        Action::Shift(Shift {
            target,
            goto: true,
            stay: false,
        })
    }

    /// Consume the token and stay in `state`
    pub fn skip(state: StateId) -> Action {
        Action::Shift(Shift {
            target: state,
            goto: false,
            stay: true,
        })
    }

    pub fn reduce(term: TermId, depth: u16) -> Action {
        Action::Reduce(Reduce {
            term,
            depth,
            repeat: false,
            stay: false,
        })
    }

    /// Marks a reduce as a repeat fold. No effect on shifts.
    pub fn repeating(self) -> Action {
        match self {
            Action::Reduce(r) => Action::Reduce(Reduce { repeat: true, ..r }),
            shift => shift,
        }
    }

    /// Sets the stay flag on a reduce. Shifts use `skip` instead.
    pub fn staying(self) -> Action {
        match self {
            Action::Reduce(r) => Action::Reduce(Reduce { stay: true, ..r }),
            shift => shift,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Shift(_) => ActionKind::Shift,
            Action::Reduce(_) => ActionKind::Reduce,
        }
    }

    pub fn flags(&self) -> ActionFlags {
        let mut flags = ActionFlags::empty();
        match self {
            Action::Shift(s) => {
                flags.set(ActionFlags::GOTO, s.goto);
                flags.set(ActionFlags::STAY, s.stay);
            }
            Action::Reduce(r) => {
                flags.set(ActionFlags::REPEAT, r.repeat);
                flags.set(ActionFlags::STAY, r.stay);
            }
        }
        flags
    }

    /// Unpacks a raw action. Fails on 0 (no action) and on values that mix
    /// the shift and reduce layouts.
    pub fn decode(raw: u32) -> Result<Action> {
        if raw == 0 {
            return Err(Error::AbsentAction);
        }

        let value = raw & VALUE_MASK;
        if value == END as u32 {
            return Err(Error::MalformedAction(raw));
        }
        let stay = raw & STAY_FLAG != 0;

        if raw & REDUCE_FLAG != 0 {
            let depth = raw >> REDUCE_DEPTH_SHIFT;
            if depth > MAX_DEPTH {
                return Err(Error::MalformedAction(raw));
            }
            return Ok(Action::Reduce(Reduce {
                term: value as TermId,
                depth: depth as u16,
                repeat: raw & REPEAT_FLAG != 0,
                stay,
            }));
        }

        let goto = raw & GOTO_FLAG != 0;
        // Depth bits only mean something on a reduce
        if raw >> REDUCE_DEPTH_SHIFT != 0 || (goto && stay) || (value == 0 && !stay) {
            return Err(Error::MalformedAction(raw));
        }

        Ok(Action::Shift(Shift {
            target: value as StateId,
            goto,
            stay,
        }))
    }

    pub fn encode(self) -> Result<u32> {
        match self {
            Action::Shift(s) => encode(ActionKind::Shift, s.target as u32, self.flags(), 0),
            Action::Reduce(r) => {
                encode(ActionKind::Reduce, r.term as u32, self.flags(), r.depth as u32)
            }
        }
    }
}

/// Packs an action from its parts.
pub fn encode(kind: ActionKind, value: u32, flags: ActionFlags, depth: u32) -> Result<u32> {
    if value >= END as u32 {
        return Err(Error::ValueOutOfRange(value));
    }
    if depth > MAX_DEPTH {
        return Err(Error::DepthOutOfRange(depth));
    }

    let mut raw = value;
    if flags.contains(ActionFlags::STAY) {
        raw |= STAY_FLAG;
    }

    match kind {
        ActionKind::Shift => {
            if flags.contains(ActionFlags::GOTO) {
                raw |= GOTO_FLAG;
            }
            if flags.contains(ActionFlags::REPEAT)
                || depth != 0
                || flags.contains(ActionFlags::GOTO | ActionFlags::STAY)
            {
                return Err(Error::MalformedAction(raw | depth << REDUCE_DEPTH_SHIFT));
            }
            if value == 0 && !flags.contains(ActionFlags::STAY) {
                return Err(Error::ShiftToStartState);
            }
        }
        ActionKind::Reduce => {
            raw |= REDUCE_FLAG | depth << REDUCE_DEPTH_SHIFT;
            if flags.contains(ActionFlags::REPEAT) {
                raw |= REPEAT_FLAG;
            }
            if flags.contains(ActionFlags::GOTO) {
                return Err(Error::MalformedAction(raw | GOTO_FLAG));
            }
        }
    }

    Ok(raw)
}

/// Splits a raw action into the two 16-bit cells it occupies in a table,
/// low half first.
pub fn split(raw: u32) -> [u16; 2] {
    [(raw & VALUE_MASK) as u16, (raw >> 16) as u16]
}

/// Inverse of `split`
pub fn join(low: u16, high: u16) -> u32 {
    low as u32 | (high as u32) << 16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shift_layout() {
        assert_eq!(Action::shift(5).encode(), Ok(5));
        assert_eq!(Action::goto(5).encode(), Ok(5 | GOTO_FLAG));
        assert_eq!(Action::skip(7).encode(), Ok(7 | STAY_FLAG));
    }

    #[test]
    fn reduce_layout() {
        let raw = Action::reduce(12, 3).repeating().encode().unwrap();
        assert_eq!(raw, 12 | REDUCE_FLAG | REPEAT_FLAG | 3 << REDUCE_DEPTH_SHIFT);

        let raw = Action::reduce(12, 1).staying().encode().unwrap();
        assert_eq!(raw, 12 | REDUCE_FLAG | STAY_FLAG | 1 << REDUCE_DEPTH_SHIFT);
    }

    #[test]
    fn bit_17_depends_on_reduce_flag() {
        // Same bit pattern above the value, read two ways
        let as_shift = Action::decode(9 | (1 << 17)).unwrap();
        let as_reduce = Action::decode(9 | (1 << 17) | REDUCE_FLAG).unwrap();
        assert_eq!(as_shift, Action::goto(9));
        assert_eq!(as_reduce, Action::reduce(9, 0).repeating());
    }

    #[test]
    fn zero_is_absent() {
        assert_eq!(Action::decode(0), Err(Error::AbsentAction));
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            encode(ActionKind::Shift, 1 << 16, ActionFlags::empty(), 0),
            Err(Error::ValueOutOfRange(1 << 16))
        );
        assert_eq!(
            encode(ActionKind::Reduce, 70_000, ActionFlags::empty(), 1),
            Err(Error::ValueOutOfRange(70_000))
        );
        assert_eq!(
            encode(ActionKind::Reduce, END as u32, ActionFlags::empty(), 1),
            Err(Error::ValueOutOfRange(END as u32))
        );
        assert_eq!(
            encode(ActionKind::Reduce, 4, ActionFlags::empty(), MAX_DEPTH + 1),
            Err(Error::DepthOutOfRange(MAX_DEPTH + 1))
        );
    }

    #[test]
    fn deepest_reduce_never_stores_the_end_marker() {
        let deepest = Action::reduce(5, MAX_DEPTH as u16).repeating().staying();
        let raw = deepest.encode().unwrap();
        assert_ne!(split(raw)[1], END);
        assert_eq!(Action::decode(raw), Ok(deepest));

        let too_deep = Action::reduce(5, MAX_DEPTH as u16 + 1).repeating().staying();
        assert_eq!(too_deep.encode(), Err(Error::DepthOutOfRange(MAX_DEPTH + 1)));
        let raw = join(5, END);
        assert_eq!(Action::decode(raw), Err(Error::MalformedAction(raw)));
    }

    #[test]
    fn rejects_flags_of_the_other_kind() {
        assert!(encode(ActionKind::Shift, 4, ActionFlags::REPEAT, 0).is_err());
        assert!(encode(ActionKind::Shift, 4, ActionFlags::empty(), 2).is_err());
        assert!(encode(ActionKind::Shift, 4, ActionFlags::GOTO | ActionFlags::STAY, 0).is_err());
        assert!(encode(ActionKind::Reduce, 4, ActionFlags::GOTO, 1).is_err());
        assert_eq!(
            encode(ActionKind::Shift, 0, ActionFlags::empty(), 0),
            Err(Error::ShiftToStartState)
        );
    }

    #[test]
    fn rejects_mixed_layouts() {
        // A shift with depth bits set
        assert_eq!(
            Action::decode(4 | 2 << REDUCE_DEPTH_SHIFT),
            Err(Error::MalformedAction(4 | 2 << REDUCE_DEPTH_SHIFT))
        );
        assert!(Action::decode(GOTO_FLAG).is_err());
        assert!(Action::decode(END as u32 | REDUCE_FLAG).is_err());
    }

    #[test]
    fn cells() {
        let raw = Action::reduce(300, 4).encode().unwrap();
        let [low, high] = split(raw);
        assert_eq!(low, 300);
        assert_eq!(high as u32, (REDUCE_FLAG | 4 << REDUCE_DEPTH_SHIFT) >> 16);
        assert_eq!(join(low, high), raw);
    }

    fn any_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            (1..END, any::<bool>()).prop_map(|(target, goto)| Action::Shift(Shift {
                target,
                goto,
                stay: false
            })),
            (0..END).prop_map(Action::skip),
            (0..END, 0..=MAX_DEPTH as u16, any::<bool>(), any::<bool>()).prop_map(
                |(term, depth, repeat, stay)| Action::Reduce(Reduce {
                    term,
                    depth,
                    repeat,
                    stay
                })
            ),
        ]
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(action in any_action()) {
            let raw = action.encode().unwrap();
            prop_assert_ne!(raw, 0);
            prop_assert_eq!(Action::decode(raw).unwrap(), action);
            let [low, high] = split(raw);
            prop_assert_eq!(join(low, high), raw);
        }
    }
}
