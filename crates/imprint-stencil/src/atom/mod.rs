//! Atom interning.
//!
//! Atoms are deduplicated strings identified by a small-integer handle.
//! Every other stencil table refers to string data only through an
//! [`AtomIndex`]; the text itself is stored once, in the compilation's
//! bump arena, and freed with it in one bulk deallocation.

use std::borrow::Cow;
use std::fmt;
use std::str;

use bumpalo::Bump;
use rustc_hash::FxHashMap;

use crate::error::StencilError;

/// Handle to an interned atom.
///
/// Handles compare by identity: two atoms are the same string exactly
/// when their handles are equal. A handle stays valid for the whole
/// compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomIndex(u32);

impl AtomIndex {
    /// Largest raw handle value a table may hand out. The literal
    /// instruction stream packs atom handles into 31-bit key words.
    pub const MAX_RAW: u32 = 0x7fff_ffff;

    pub(crate) fn from_raw(raw: u32) -> Self {
        AtomIndex(raw)
    }

    /// The raw table position of this atom.
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Source encoding of raw atom bytes handed over by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 bytes, validated at intern time
    Utf8,
    /// Latin-1 (ISO-8859-1) bytes, widened to UTF-8 at intern time
    Latin1,
}

struct AtomEntry<'alloc> {
    text: &'alloc str,
    /// Referenced by this compilation's stencil tables or literals
    used_by_stencil: bool,
}

/// Deduplicating atom table for one compilation.
///
/// Single-writer during construction; read-only once the stencil is
/// finished. Text storage borrows from the compilation arena.
pub struct AtomTable<'alloc> {
    alloc: &'alloc Bump,
    map: FxHashMap<&'alloc str, AtomIndex>,
    entries: Vec<AtomEntry<'alloc>>,
}

impl<'alloc> AtomTable<'alloc> {
    /// Create an empty table backed by `alloc`.
    pub fn new(alloc: &'alloc Bump) -> Self {
        Self {
            alloc,
            map: FxHashMap::default(),
            entries: Vec::new(),
        }
    }

    /// Intern raw bytes, returning the existing handle if the content
    /// has been seen before.
    pub fn intern(&mut self, bytes: &[u8], encoding: Encoding) -> Result<AtomIndex, StencilError> {
        let text: Cow<'_, str> = match encoding {
            Encoding::Utf8 => {
                Cow::Borrowed(str::from_utf8(bytes).map_err(|_| StencilError::MalformedAtom)?)
            }
            Encoding::Latin1 => {
                if bytes.is_ascii() {
                    // ASCII is valid in both encodings as-is.
                    String::from_utf8_lossy(bytes)
                } else {
                    Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
                }
            }
        };
        self.intern_str(&text)
    }

    fn intern_str(&mut self, text: &str) -> Result<AtomIndex, StencilError> {
        if let Some(&index) = self.map.get(text) {
            return Ok(index);
        }

        let raw = self.entries.len();
        if raw > AtomIndex::MAX_RAW as usize {
            return Err(StencilError::AllocationOverflow { table: "atom" });
        }
        let index = AtomIndex::from_raw(raw as u32);

        let stored: &'alloc str = self.alloc.alloc_str(text);
        self.map.insert(stored, index);
        self.entries.push(AtomEntry {
            text: stored,
            used_by_stencil: false,
        });
        Ok(index)
    }

    /// The text of an interned atom.
    pub fn get(&self, index: AtomIndex) -> Option<&'alloc str> {
        self.entries.get(index.raw() as usize).map(|e| e.text)
    }

    /// Mark an atom as referenced by this compilation's stencil.
    ///
    /// Downstream instantiation only promotes marked atoms to the
    /// runtime's atom cache.
    pub fn mark_used(&mut self, index: AtomIndex) {
        if let Some(entry) = self.entries.get_mut(index.raw() as usize) {
            entry.used_by_stencil = true;
        }
    }

    /// Whether an atom has been marked used by this compilation.
    pub fn is_used(&self, index: AtomIndex) -> bool {
        self.entries
            .get(index.raw() as usize)
            .is_some_and(|e| e.used_by_stencil)
    }

    /// Number of distinct atoms interned so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for AtomTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomTable")
            .field("len", &self.entries.len())
            .finish()
    }
}
