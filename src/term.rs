// Term ids are 16-bit numbers. Odd ids are tagged and show up in the
// user-visible tree, even ids are synthetic. Only the end-of-input and
// error terms have fixed ids, everything else is allocated by the grammar
// compiler.

pub type TermId = u16;

/// End of input, emitted once by the lexer
pub const EOF: TermId = 0;

/// The error term, used for recovery actions
pub const ERR: TermId = 1;

/// Low bit set on terms that must appear in the tree
pub const TAGGED: TermId = 1;

/// End marker for sequences stored in 16-bit cell arrays. Never a valid
/// term or state id.
pub const END: u16 = 0xffff;

pub fn is_tagged(term: TermId) -> bool {
    term & TAGGED != 0
}

/// True for the ids every grammar shares
pub fn is_reserved(term: TermId) -> bool {
    term == EOF || term == ERR
}

/// Display name for a term when no grammar names are at hand
pub fn name(term: TermId) -> String {
    match term {
        EOF => "Eof".to_string(),
        ERR => "Err".to_string(),
        t => format!("#{}", t),
    }
}

/// Looks a term up in a list of names, falling back to `name`
pub fn display<S: AsRef<str>>(term: TermId, names: &[S]) -> String {
    match names.get(term as usize) {
        Some(n) if !n.as_ref().is_empty() => n.as_ref().to_string(),
        _ => name(term),
    }
}
