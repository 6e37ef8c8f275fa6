pub mod automaton;
pub mod draw;
pub mod events;
pub mod stack;
pub mod tree;

pub use automaton::{parse, Parse, ParseOptions, Step};
pub use events::{Diagnostic, Event, EventSink, Span, Token};
pub use tree::{Node, NodeId, Tree, TreeBuilder};
