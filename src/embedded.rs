//! Tables compiled into the binary by the build script, one set per file
//! in `grammars/`. Nothing here allocates except the (empty) nested
//! grammar list.

use crate::errors::Result;
use crate::table::ParseTables;

include!(concat!(env!("OUT_DIR"), "/embedded_tables.rs"));

/// Sums of numbers, `Num (Plus Num)*`, with whitespace skipped
pub fn sum() -> Result<ParseTables<'static>> {
    ParseTables::new(SUM, Vec::new())
}

/// Term names for `sum`, indexed by term id
pub fn sum_names() -> &'static [&'static str] {
    &SUM_TERMS
}
