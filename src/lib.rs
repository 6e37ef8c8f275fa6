//! Runtime for table-driven shift/reduce parsers.
//!
//! A grammar compiler produces flat integer tables; this crate validates
//! them ([`ParseTables`]), runs the automaton they describe over a token
//! stream ([`Parse`]) and reports shifts and reductions as events from
//! which a tree can be built ([`TreeBuilder`]).

pub mod action;
pub mod builder;
pub mod embedded;
pub mod errors;
pub mod load;
pub mod parser;
pub mod specialize;
pub mod state;
pub mod table;
pub mod term;

pub use action::{Action, StateId};
pub use builder::{OwnedNested, OwnedTables, TableBuilder};
pub use errors::{Error, ParseError, Result};
pub use parser::{parse, Event, EventSink, Parse, ParseOptions, Span, Step, Token, Tree, TreeBuilder};
pub use specialize::{Specialization, SpecializeKind, Specializer};
pub use state::{StateDescriptor, StateFlags};
pub use table::{NestedGrammar, ParseTables, TableData};
pub use term::TermId;
