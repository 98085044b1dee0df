//! Index newtypes for the stencil tables.
//!
//! Every cross-reference in a stencil is a position in a named,
//! append-only table, never an address. Indices equal creation order;
//! the builders are the only code that mints them.

/// Largest number of entries any stencil table may hold.
///
/// Downstream instantiation packs tagged table references into 32-bit
/// words with a tag nibble, so every table shares the 28-bit index
/// space.
pub const INDEX_LIMIT: usize = (1 << 28) - 1;

/// Position of a scope in the scope table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeIndex(u32);

impl ScopeIndex {
    pub(crate) fn new(raw: u32) -> Self {
        ScopeIndex(raw)
    }

    /// The table position as a plain `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of a regular expression in the regexp table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegExpIndex(u32);

impl RegExpIndex {
    pub(crate) fn new(raw: u32) -> Self {
        RegExpIndex(raw)
    }

    /// The table position as a plain `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of a script in the script table. Position 0 is always the
/// top-level script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptIndex(u32);

impl ScriptIndex {
    /// The top-level script.
    pub const TOP_LEVEL: ScriptIndex = ScriptIndex(0);

    pub(crate) fn new(raw: u32) -> Self {
        ScriptIndex(raw)
    }

    /// The table position as a plain `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of an entry in a script's GC-thing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GCThingIndex(u32);

impl GCThingIndex {
    pub(crate) fn new(raw: u32) -> Self {
        GCThingIndex(raw)
    }

    /// The list position as a plain `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
