//! The stencil container and its construction state.
//!
//! A stencil is the compact, GC-free result of one compilation: parallel
//! tables of scopes, regular expressions and scripts, a flat list of
//! tagged cross-references, shared bytecode blobs, and encoded object
//! literals — all addressed by construction-order indices.
//!
//! Construction goes through [`CompilationState`], which is single-writer
//! and strictly additive. [`CompilationState::finish`] seals the result
//! into a [`CompilationStencil`], which is read-only and safe to hand to
//! concurrent readers.

pub mod gcthing;
pub mod indices;
pub mod scope;
pub mod script;

use bumpalo::Bump;

use crate::atom::AtomTable;
use crate::error::StencilError;
use crate::objliteral::ObjLiteralStencil;
use crate::regexp::RegExpStencil;

pub use gcthing::{GCThing, GCThingsRange};
pub use indices::{GCThingIndex, INDEX_LIMIT, RegExpIndex, ScopeIndex, ScriptIndex};
pub use scope::{BindingName, ScopeKind, ScopeStencil};
pub use script::{
    FunctionFlags, ImmutableScriptData, ImmutableScriptFlags, ScopeNote, ScriptStencil,
    ScriptStencilExtra, SharedDataTable, SourceExtent,
};

/// Mutable construction state for one compilation's stencil.
///
/// Owned by the compiling pipeline; the bytecode emitter reaches in to
/// intern atoms and register object literals while conversion runs.
#[derive(Debug)]
pub struct CompilationState<'alloc> {
    /// Interned atoms for this compilation
    pub atoms: AtomTable<'alloc>,
    pub(crate) scopes: Vec<ScopeStencil>,
    pub(crate) regexps: Vec<RegExpStencil>,
    pub(crate) scripts: Vec<ScriptStencil>,
    pub(crate) script_extras: Vec<ScriptStencilExtra>,
    pub(crate) gcthings: Vec<GCThing>,
    pub(crate) shared_data: SharedDataTable,
    pub(crate) obj_literals: Vec<ObjLiteralStencil>,
}

impl<'alloc> CompilationState<'alloc> {
    /// Create empty state backed by the compilation arena.
    pub fn new(alloc: &'alloc Bump) -> Self {
        Self {
            atoms: AtomTable::new(alloc),
            scopes: Vec::new(),
            regexps: Vec::new(),
            scripts: Vec::new(),
            script_extras: Vec::new(),
            gcthings: Vec::new(),
            shared_data: SharedDataTable::default(),
            obj_literals: Vec::new(),
        }
    }

    /// Append a scope, returning its table position.
    pub(crate) fn push_scope(&mut self, scope: ScopeStencil) -> ScopeIndex {
        let index = ScopeIndex::new(self.scopes.len() as u32);
        self.scopes.push(scope);
        index
    }

    /// Append a regexp, returning its table position.
    pub(crate) fn push_regexp(&mut self, regexp: RegExpStencil) -> RegExpIndex {
        let index = RegExpIndex::new(self.regexps.len() as u32);
        self.regexps.push(regexp);
        index
    }

    /// Reserve the script and extra tables in one pass, before any
    /// script is converted. `shared_data_count` is the precomputed
    /// number of non-deferred scripts. No mid-construction growth
    /// happens after this.
    pub(crate) fn prepare_storage_for(
        &mut self,
        script_count: usize,
        shared_data_count: usize,
    ) -> Result<(), StencilError> {
        self.scripts
            .try_reserve_exact(script_count)
            .map_err(|_| StencilError::OutOfMemory)?;
        self.script_extras
            .try_reserve_exact(script_count)
            .map_err(|_| StencilError::OutOfMemory)?;
        self.shared_data = SharedDataTable::with_capacity(shared_data_count);
        Ok(())
    }

    /// Reserve `count` entries at the end of the flat GC-thing table,
    /// returning the start position. The caller fills them positionally.
    pub(crate) fn reserve_gcthings(&mut self, count: usize) -> Result<u32, StencilError> {
        let start = self.gcthings.len();
        if start + count > INDEX_LIMIT {
            return Err(StencilError::AllocationOverflow { table: "gcthing" });
        }
        self.gcthings
            .try_reserve_exact(count)
            .map_err(|_| StencilError::OutOfMemory)?;
        Ok(start as u32)
    }

    /// Register an encoded object literal, returning its table position.
    ///
    /// Called by the bytecode emitter for every literal it routes
    /// through the instruction-stream representation.
    pub fn add_obj_literal(&mut self, literal: ObjLiteralStencil) -> Result<u32, StencilError> {
        let index = self.obj_literals.len();
        if index > INDEX_LIMIT {
            return Err(StencilError::AllocationOverflow { table: "objliteral" });
        }
        self.obj_literals.push(literal);
        Ok(index as u32)
    }

    /// Seal the state into a read-only stencil.
    pub fn finish(self) -> CompilationStencil<'alloc> {
        CompilationStencil {
            atoms: self.atoms,
            scopes: self.scopes,
            regexps: self.regexps,
            scripts: self.scripts,
            script_extras: self.script_extras,
            gcthings: self.gcthings,
            shared_data: self.shared_data,
            obj_literals: self.obj_literals,
        }
    }
}

/// The finished, read-only stencil of one compilation.
///
/// Exclusively owned until it is moved to the instantiation stage; after
/// that it is never written again, so shared readers are safe. Atom text
/// borrows from the compilation arena, which outlives the stencil and is
/// released in one bulk deallocation.
#[derive(Debug)]
pub struct CompilationStencil<'alloc> {
    atoms: AtomTable<'alloc>,
    scopes: Vec<ScopeStencil>,
    regexps: Vec<RegExpStencil>,
    scripts: Vec<ScriptStencil>,
    script_extras: Vec<ScriptStencilExtra>,
    gcthings: Vec<GCThing>,
    shared_data: SharedDataTable,
    obj_literals: Vec<ObjLiteralStencil>,
}

impl<'alloc> CompilationStencil<'alloc> {
    /// The atom table.
    pub fn atoms(&self) -> &AtomTable<'alloc> {
        &self.atoms
    }

    /// All scopes, in creation order.
    pub fn scopes(&self) -> &[ScopeStencil] {
        &self.scopes
    }

    /// The scope at `index`, validated.
    pub fn scope(&self, index: ScopeIndex) -> Option<&ScopeStencil> {
        self.scopes.get(index.index())
    }

    /// All regular expressions, in creation order.
    pub fn regexps(&self) -> &[RegExpStencil] {
        &self.regexps
    }

    /// The regexp at `index`, validated.
    pub fn regexp(&self, index: RegExpIndex) -> Option<&RegExpStencil> {
        self.regexps.get(index.index())
    }

    /// All scripts, in creation order; position 0 is the top level.
    pub fn scripts(&self) -> &[ScriptStencil] {
        &self.scripts
    }

    /// The script at `index`, validated.
    pub fn script(&self, index: ScriptIndex) -> Option<&ScriptStencil> {
        self.scripts.get(index.index())
    }

    /// All per-script immutable extras, parallel to [`Self::scripts`].
    pub fn script_extras(&self) -> &[ScriptStencilExtra] {
        &self.script_extras
    }

    /// The extra data of the script at `index`, validated.
    pub fn script_extra(&self, index: ScriptIndex) -> Option<&ScriptStencilExtra> {
        self.script_extras.get(index.index())
    }

    /// The GC-thing list of the script at `index`; empty for scripts
    /// with no entries or an out-of-range index.
    pub fn gcthings_of(&self, index: ScriptIndex) -> &[GCThing] {
        let Some(script) = self.script(index) else {
            return &[];
        };
        let range = script.gcthings;
        let start = range.start as usize;
        let end = start + range.length as usize;
        self.gcthings.get(start..end).unwrap_or(&[])
    }

    /// The shared bytecode registry.
    pub fn shared_data(&self) -> &SharedDataTable {
        &self.shared_data
    }

    /// All encoded object literals, in registration order.
    pub fn obj_literals(&self) -> &[ObjLiteralStencil] {
        &self.obj_literals
    }
}
