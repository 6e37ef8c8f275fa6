use std::fmt;

use crate::term::{self, TermId};

pub type Result<T> = std::result::Result<T, Error>;

/// Which flat table a storage error was found in
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum TableKind {
    States,
    Actions,
    Gotos,
    Specializations,
}

#[derive(Debug, PartialEq)]
pub enum Error {
    // Codec
    AbsentAction,
    ValueOutOfRange(u32),
    DepthOutOfRange(u32),
    ShiftToStartState,
    MalformedAction(u32),

    // Table storage
    OddCells { table: TableKind, offset: usize },
    MissingTerminator { table: TableKind, owner: usize },
    MisplacedTerminator { table: TableKind, offset: usize },
    OffsetOutOfRange { table: TableKind, state: usize, offset: usize },
    InvalidStateTable(usize),
    UnknownState(u32),
    ReservedTerm { table: TableKind, term: TermId },
    InvalidSpecializationKind(u16),
    InvalidNestIndex { state: usize, index: usize },
    Json(String),

    // Interpreter
    StackUnderflow { depth: usize, available: usize },
    StackOverflow(usize),
    MissingGoto { state: u16, term: TermId },
    ParseFinished,
    Syntax(ParseError),

    Render(String),
}

impl Error {
    /// Returns true for errors caused by a corrupt or incompatible table, or
    /// by misuse of the API, as opposed to errors in the parsed input.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Syntax(_))
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AbsentAction => write!(f, "no action (0) cannot be decoded"),
            Error::ValueOutOfRange(v) => {
                write!(f, "action value {} does not fit a state or term id", v)
            }
            Error::DepthOutOfRange(d) => write!(f, "reduce depth {} is too large", d),
            Error::ShiftToStartState => write!(f, "shift actions may not target state 0"),
            Error::MalformedAction(raw) => write!(f, "malformed action {:#x}", raw),
            Error::OddCells { table, offset } => {
                write!(f, "{} table: odd cell count at offset {}", table, offset)
            }
            Error::MissingTerminator { table, owner } => {
                write!(f, "{} table: sequence for {} is not terminated", table, owner)
            }
            Error::MisplacedTerminator { table, offset } => {
                write!(f, "{} table: end marker used as a value at offset {}", table, offset)
            }
            Error::OffsetOutOfRange { table, state, offset } => write!(
                f,
                "{} table: offset {} for state {} is out of range",
                table, offset, state
            ),
            Error::InvalidStateTable(len) => {
                write!(f, "state table length {} is not 1 to 65536 whole states", len)
            }
            Error::UnknownState(s) => write!(f, "unknown state {}", s),
            Error::ReservedTerm { table, term } => {
                write!(f, "{} table: reserved term {} used here", table, term::name(*term))
            }
            Error::InvalidSpecializationKind(k) => write!(f, "invalid specialization kind {}", k),
            Error::InvalidNestIndex { state, index } => {
                write!(f, "state {} refers to missing nested grammar {}", state, index)
            }
            Error::Json(s) => write!(f, "invalid table document: {}", s),
            Error::StackUnderflow { depth, available } => write!(
                f,
                "reduction of depth {} with only {} frames above the base",
                depth, available
            ),
            Error::StackOverflow(limit) => write!(f, "stack exceeded {} frames", limit),
            Error::MissingGoto { state, term } => {
                write!(f, "no goto from state {} on term {}", state, term)
            }
            Error::ParseFinished => write!(f, "parse already finished"),
            Error::Syntax(e) => write!(f, "parse error: {}", e),
            Error::Render(s) => write!(f, "failed to render graph: {}", s),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TableKind::States => "state",
            TableKind::Actions => "action",
            TableKind::Gotos => "goto",
            TableKind::Specializations => "specialization",
        };
        f.write_str(name)
    }
}

/// A syntax error: no action (and no recovery) for the lookahead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Input offset of the offending token
    pub position: usize,
    /// State on top of the stack when the error was found
    pub state: u16,
    /// Term the automaton was looking at
    pub found: TermId,
    /// Terms with an action in that state
    pub expected: Vec<TermId>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unexpected {} at {} (state {})",
            term::name(self.found),
            self.position,
            self.state
        )?;
        if !self.expected.is_empty() {
            let expected: Vec<String> = self.expected.iter().map(|t| term::name(*t)).collect();
            write!(f, ", expected one of: {}", expected.join(", "))?;
        }
        Ok(())
    }
}
