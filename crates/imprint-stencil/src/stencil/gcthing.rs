//! Tagged references into the stencil tables.
//!
//! Each script carries an ordered list of the things its bytecode
//! references. The lists for all scripts live in one flat table; a
//! script holds its slice as a start/length pair. Instantiation walks a
//! script's list positionally and resolves each entry against the table
//! its tag names.

use crate::atom::AtomIndex;

use super::indices::{RegExpIndex, ScopeIndex, ScriptIndex};

/// One tagged reference in a script's GC-thing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GCThing {
    /// Cleared entry
    Null,
    /// Reference into the atom table
    Atom(AtomIndex),
    /// Reference into the script table
    Script(ScriptIndex),
    /// Reference into the scope table
    Scope(ScopeIndex),
    /// Reference into the regexp table
    RegExp(RegExpIndex),
}

/// One script's slice of the flat GC-thing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GCThingsRange {
    /// Position of the script's first entry
    pub start: u32,
    /// Number of entries
    pub length: u32,
}

impl GCThingsRange {
    /// An empty range; scripts with no GC things store this and occupy
    /// nothing in the flat table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the range holds no entries.
    pub fn is_empty(self) -> bool {
        self.length == 0
    }
}
