//! Script stencils and shared bytecode data.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::atom::AtomIndex;

use super::gcthing::GCThingsRange;
use super::indices::{GCThingIndex, ScopeIndex, ScriptIndex};

/// Immutable script flag bitset.
///
/// Carries the flags the parser computed, merged with flags only the
/// ambient compile configuration knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImmutableScriptFlags(u32);

impl ImmutableScriptFlags {
    /// The script is a function.
    pub const IS_FUNCTION: ImmutableScriptFlags = ImmutableScriptFlags(1 << 0);
    /// The script is a self-hosted intrinsic.
    pub const SELF_HOSTED: ImmutableScriptFlags = ImmutableScriptFlags(1 << 1);
    /// Strict-mode semantics were forced by the host.
    pub const FORCE_STRICT: ImmutableScriptFlags = ImmutableScriptFlags(1 << 2);
    /// The script runs against a non-syntactic scope chain.
    pub const HAS_NON_SYNTACTIC_SCOPE: ImmutableScriptFlags = ImmutableScriptFlags(1 << 3);
    /// The script is known to execute at most once.
    pub const TREAT_AS_RUN_ONCE: ImmutableScriptFlags = ImmutableScriptFlags(1 << 4);
    /// The script's completion value is unused.
    pub const NO_SCRIPT_RVAL: ImmutableScriptFlags = ImmutableScriptFlags(1 << 5);

    /// Wrap raw flag bits from the parser.
    pub fn from_raw(raw: u32) -> Self {
        ImmutableScriptFlags(raw)
    }

    /// The raw flag bits.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Whether every bit of `flag` is set.
    pub fn has(self, flag: ImmutableScriptFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// Set or clear `flag`.
    pub fn set(&mut self, flag: ImmutableScriptFlags, value: bool) {
        if value {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }
}

/// Opaque function flag bits computed by the parser.
///
/// The stencil carries them through to instantiation untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FunctionFlags(u16);

impl FunctionFlags {
    /// Wrap raw flag bits from the parser.
    pub fn from_raw(raw: u16) -> Self {
        FunctionFlags(raw)
    }

    /// The raw flag bits.
    pub fn raw(self) -> u16 {
        self.0
    }
}

/// Source coordinates of one script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceExtent {
    /// Byte offset where the script's code starts
    pub source_start: u32,
    /// Byte offset just past the script's code
    pub source_end: u32,
    /// Byte offset where `toString` output starts
    pub to_string_start: u32,
    /// Byte offset just past `toString` output
    pub to_string_end: u32,
    /// 1-based starting line
    pub lineno: u32,
    /// 0-based starting column
    pub column: u32,
}

/// One scope note: which scope is live over a bytecode range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeNote {
    /// Position into the owning script's GC-thing list
    pub index: GCThingIndex,
    /// Bytecode offset where the note starts
    pub start: u32,
    /// Length of the noted bytecode range
    pub length: u32,
    /// Position of the enclosing note, or [`ScopeNote::NO_PARENT`]
    pub parent: u32,
}

impl ScopeNote {
    /// Sentinel parent value for top-level notes.
    pub const NO_PARENT: u32 = u32::MAX;
}

/// Bytecode and the per-script constants fixed at emit time.
///
/// The one structure in the stencil with shared ownership: distinct
/// script records may reference the same blob, so the container hands it
/// out behind an [`Arc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmutableScriptData {
    /// Bytecode offset of the main entry point
    pub main_offset: u32,
    /// Number of fixed frame slots
    pub nfixed: u32,
    /// Total number of frame slots
    pub nslots: u32,
    /// Position of the body scope in the script's GC-thing list
    pub body_scope_index: GCThingIndex,
    /// Number of inline-cache entries the bytecode needs
    pub num_ic_entries: u32,
    /// Length reported by `Function.prototype.length`
    pub fun_length: u16,
    /// The bytecode itself
    pub bytecode: Vec<u8>,
    /// Scope notes covering the bytecode
    pub scope_notes: Vec<ScopeNote>,
}

/// Shared-ownership registry of bytecode blobs, keyed by script.
#[derive(Debug, Default)]
pub struct SharedDataTable {
    entries: FxHashMap<ScriptIndex, Arc<ImmutableScriptData>>,
}

impl SharedDataTable {
    /// Create an empty table sized for `capacity` scripts.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Register `data` for `script`, sharing ownership with the caller.
    pub fn add_and_share(&mut self, script: ScriptIndex, data: Arc<ImmutableScriptData>) {
        self.entries.insert(script, data);
    }

    /// The blob registered for `script`, if any.
    pub fn get(&self, script: ScriptIndex) -> Option<&Arc<ImmutableScriptData>> {
        self.entries.get(&script)
    }

    /// Number of scripts with registered blobs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no blob has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-script stencil data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptStencil {
    /// Function name; `None` for anonymous functions and non-functions
    pub function_atom: Option<AtomIndex>,
    /// Raw function flag bits from the parser
    pub function_flags: FunctionFlags,
    /// Enclosing scope of a lazily compiled function, resolved at
    /// delazification
    pub lazy_function_enclosing_scope: Option<ScopeIndex>,
    /// The function literal was emitted into its enclosing script
    pub was_function_emitted: bool,
    /// A bytecode blob is registered for this script
    pub has_shared_data: bool,
    /// This script's slice of the flat GC-thing table
    pub gcthings: GCThingsRange,
}

/// Immutable per-script data fixed at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptStencilExtra {
    /// Merged immutable flag bitset
    pub immutable_flags: ImmutableScriptFlags,
    /// Source coordinates
    pub extent: SourceExtent,
    /// Declared argument count; meaningful for functions only
    pub nargs: u16,
}
