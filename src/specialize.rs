// Token specialization. The lexer hands out raw token ids; a grammar may
// refine some of them into more specific terms (keywords out of
// identifiers, say). A `Specialize` entry replaces the raw interpretation,
// an `Extend` entry adds one that is tried first while the raw id stays
// valid.
//
// Storage is a flat run per raw id: `raw, (refined, kind)*, END`.

use log::trace;

use crate::errors::{Error, Result, TableKind};
use crate::table::Cells;
use crate::term::{self, TermId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecializeKind {
    Specialize = 0,
    Extend = 1,
}

impl SpecializeKind {
    pub fn from_cell(cell: u16) -> Result<SpecializeKind> {
        match cell {
            0 => Ok(SpecializeKind::Specialize),
            1 => Ok(SpecializeKind::Extend),
            k => Err(Error::InvalidSpecializationKind(k)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Specialization {
    pub term: TermId,
    pub kind: SpecializeKind,
}

/// Read-only view of a specialization table
#[derive(Debug, Clone, Copy, Default)]
pub struct Specializer<'t> {
    cells: &'t [u16],
}

impl<'t> Specializer<'t> {
    /// Wraps and validates a specialization table
    pub fn new(cells: &'t [u16]) -> Result<Specializer<'t>> {
        let specializer = Specializer { cells };
        specializer.validate()?;
        Ok(specializer)
    }

    pub(crate) fn new_unchecked(cells: &'t [u16]) -> Specializer<'t> {
        Specializer { cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn validate(&self) -> Result<()> {
        let mut cursor = Cells::new(self.cells, 0, TableKind::Specializations, 0);
        while cursor.remaining() > 0 {
            let raw = cursor.next_value()?;
            check_term(raw)?;
            cursor.set_owner(raw as usize);

            while let Some(refined) = cursor.next_term()? {
                if cursor.remaining() == 0 {
                    return Err(Error::OddCells {
                        table: TableKind::Specializations,
                        offset: cursor.pos() - 1,
                    });
                }
                check_term(refined)?;
                SpecializeKind::from_cell(cursor.next_value()?)?;
            }
        }
        Ok(())
    }

    /// All entries for `raw`, in table order
    pub fn entries(&self, raw: TermId) -> Entries<'t> {
        let mut pos = 0;
        while pos < self.cells.len() {
            let found = self.cells[pos] == raw;
            pos += 1;
            if found {
                return Entries {
                    cells: self.cells,
                    pos,
                };
            }
            while pos < self.cells.len() && self.cells[pos] != term::END {
                pos += 2;
            }
            pos += 1;
        }

        Entries {
            cells: self.cells,
            pos: self.cells.len(),
        }
    }

    /// The first entry for `raw`, if the grammar specializes it at all
    pub fn resolve(&self, raw: TermId) -> Option<Specialization> {
        let found = self.entries(raw).next();
        if let Some(s) = found {
            trace!("token {} specializes to {} ({:?})", raw, s.term, s.kind);
        }
        found
    }
}

fn check_term(term: TermId) -> Result<()> {
    if term::is_reserved(term) {
        Err(Error::ReservedTerm {
            table: TableKind::Specializations,
            term,
        })
    } else {
        Ok(())
    }
}

pub struct Entries<'t> {
    cells: &'t [u16],
    pos: usize,
}

impl Iterator for Entries<'_> {
    type Item = Specialization;

    fn next(&mut self) -> Option<Specialization> {
        if self.pos + 1 >= self.cells.len() || self.cells[self.pos] == term::END {
            return None;
        }
        let term = self.cells[self.pos];
        // Validated on construction, only 0 and 1 occur
        let kind = if self.cells[self.pos + 1] == SpecializeKind::Extend as u16 {
            SpecializeKind::Extend
        } else {
            SpecializeKind::Specialize
        };
        self.pos += 2;
        Some(Specialization { term, kind })
    }
}
