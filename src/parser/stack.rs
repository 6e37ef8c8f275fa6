use crate::action::StateId;
use crate::errors::{Error, Result};

/// An entry on the stack
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct Frame {
    pub state: StateId,
    /// Input offset where the content of this frame begins
    pub start: usize,
    /// Number of pending tree items when the frame was pushed
    pub(crate) base: usize,
    /// How many of those were trailing skipped items
    pub(crate) tail: usize,
}

/// The state stack of one automaton. The base frame (start state) is never
/// popped, so the stack is never empty.
#[derive(Debug, Clone)]
pub struct Stack {
    frames: Vec<Frame>,
    limit: usize,
}

impl Stack {
    pub fn new(start: StateId, pos: usize, limit: usize) -> Stack {
        Stack {
            frames: vec![Frame {
                state: start,
                start: pos,
                base: 0,
                tail: 0,
            }],
            limit,
        }
    }

    pub fn top(&self) -> Frame {
        self.frames[self.frames.len() - 1]
    }

    pub fn state(&self) -> StateId {
        self.top().state
    }

    /// Number of frames, base frame included
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn states(&self) -> Vec<StateId> {
        self.frames.iter().map(|f| f.state).collect()
    }

    pub fn push(&mut self, frame: Frame) -> Result<()> {
        if self.frames.len() >= self.limit {
            return Err(Error::StackOverflow(self.limit));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pops `depth` frames and returns the lowest one popped. The base frame
    /// must survive.
    pub fn pop(&mut self, depth: usize) -> Result<Frame> {
        let available = self.frames.len() - 1;
        if depth == 0 || depth > available {
            return Err(Error::StackUnderflow { depth, available });
        }
        let lowest = self.frames[self.frames.len() - depth];
        self.frames.truncate(self.frames.len() - depth);
        Ok(lowest)
    }
}
