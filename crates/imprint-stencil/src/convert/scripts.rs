//! Script record and GC-thing conversion.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::atom::AtomIndex;
use crate::config::CompileOptions;
use crate::error::StencilError;
use crate::foreign::{
    ForeignGCThing, ForeignImmutableScriptData, ForeignResult, ForeignScriptStencil,
};
use crate::stencil::script::{
    FunctionFlags, ImmutableScriptData, ImmutableScriptFlags, ScopeNote, ScriptStencil,
    ScriptStencilExtra, SourceExtent,
};
use crate::stencil::{
    CompilationState, GCThing, GCThingIndex, GCThingsRange, INDEX_LIMIT, RegExpIndex, ScopeIndex,
    ScriptIndex,
};

/// Blobs already converted this compilation, keyed by foreign position.
/// Scripts that reference the same blob share one allocation.
type SharedBlobCache = FxHashMap<u32, Arc<ImmutableScriptData>>;

fn convert_immutable_script_data(foreign: &ForeignImmutableScriptData) -> ImmutableScriptData {
    let scope_notes = foreign
        .scope_notes
        .iter()
        .map(|note| ScopeNote {
            index: GCThingIndex::new(note.index),
            start: note.start,
            length: note.length,
            parent: note.parent,
        })
        .collect();

    ImmutableScriptData {
        main_offset: foreign.main_offset,
        nfixed: foreign.nfixed,
        nslots: foreign.nslots,
        body_scope_index: GCThingIndex::new(foreign.body_scope_index),
        num_ic_entries: foreign.num_ic_entries,
        fun_length: foreign.fun_length,
        bytecode: foreign.bytecode.clone(),
        scope_notes,
    }
}

/// Convert one script's GC-thing list into its slice of the flat table.
fn convert_gcthings<'alloc>(
    foreign: &ForeignScriptStencil,
    all_atoms: &[AtomIndex],
    state: &mut CompilationState<'alloc>,
) -> Result<GCThingsRange, StencilError> {
    let count = foreign.gcthings.len();
    // No entries, no storage.
    if count == 0 {
        return Ok(GCThingsRange::empty());
    }

    let start = state.reserve_gcthings(count)?;
    for item in &foreign.gcthings {
        let thing = match *item {
            ForeignGCThing::Null => GCThing::Null,
            ForeignGCThing::Atom(index) => GCThing::Atom(all_atoms[index as usize]),
            ForeignGCThing::Script(index) => GCThing::Script(ScriptIndex::new(index)),
            ForeignGCThing::Scope(index) => GCThing::Scope(ScopeIndex::new(index)),
            ForeignGCThing::RegExp(index) => GCThing::RegExp(RegExpIndex::new(index)),
        };
        state.gcthings.push(thing);
    }

    Ok(GCThingsRange {
        start,
        length: count as u32,
    })
}

fn convert_script<'alloc>(
    result: &ForeignResult<'alloc>,
    foreign: &ForeignScriptStencil,
    all_atoms: &[AtomIndex],
    options: &CompileOptions,
    state: &mut CompilationState<'alloc>,
    script_index: ScriptIndex,
    blob_cache: &mut SharedBlobCache,
) -> Result<(), StencilError> {
    let mut script = ScriptStencil::default();

    let mut flags = ImmutableScriptFlags::from_raw(foreign.immutable_flags);
    // The parser cannot know these; they come from the ambient compile
    // configuration.
    flags.set(ImmutableScriptFlags::SELF_HOSTED, options.self_hosting_mode);
    flags.set(ImmutableScriptFlags::FORCE_STRICT, options.force_strict_mode);
    flags.set(
        ImmutableScriptFlags::HAS_NON_SYNTACTIC_SCOPE,
        options.non_syntactic_scope,
    );
    if script_index == ScriptIndex::TOP_LEVEL {
        flags.set(ImmutableScriptFlags::TREAT_AS_RUN_ONCE, options.is_run_once);
        flags.set(ImmutableScriptFlags::NO_SCRIPT_RVAL, options.no_script_rval);
    }

    let is_function = flags.has(ImmutableScriptFlags::IS_FUNCTION);

    if let Some(data_index) = foreign.immutable_script_data {
        let shared = blob_cache
            .entry(data_index)
            .or_insert_with(|| {
                Arc::new(convert_immutable_script_data(
                    &result.script_data[data_index as usize],
                ))
            })
            .clone();
        state.shared_data.add_and_share(script_index, shared);
        script.has_shared_data = true;
    }

    let extent = SourceExtent {
        source_start: foreign.extent.source_start,
        source_end: foreign.extent.source_end,
        to_string_start: foreign.extent.to_string_start,
        to_string_end: foreign.extent.to_string_end,
        lineno: foreign.extent.lineno,
        column: foreign.extent.column,
    };

    let mut nargs = 0;
    if is_function {
        if let Some(name) = foreign.fun_name {
            script.function_atom = Some(all_atoms[name as usize]);
        }
        script.function_flags = FunctionFlags::from_raw(foreign.fun_flags);
        nargs = foreign.fun_nargs;
        if let Some(enclosing) = foreign.lazy_function_enclosing_scope_index {
            script.lazy_function_enclosing_scope = Some(ScopeIndex::new(enclosing));
        }
        if foreign.was_function_emitted {
            script.was_function_emitted = true;
        }
    }

    script.gcthings = convert_gcthings(foreign, all_atoms, state)?;

    state.scripts.push(script);
    state.script_extras.push(ScriptStencilExtra {
        immutable_flags: flags,
        extent,
        nargs,
    });
    debug_assert_eq!(state.scripts.len() - 1, script_index.index());
    Ok(())
}

/// Convert the foreign script list, in order, into the script tables.
pub(super) fn convert_scripts<'alloc>(
    result: &ForeignResult<'alloc>,
    all_atoms: &[AtomIndex],
    options: &CompileOptions,
    state: &mut CompilationState<'alloc>,
) -> Result<(), StencilError> {
    let len = result.scripts.len();
    if len == 0 {
        return Ok(());
    }
    if len > INDEX_LIMIT {
        return Err(StencilError::AllocationOverflow { table: "script" });
    }

    // Scripts past the top level that already carry bytecode are the
    // non-deferred functions; the aggregate storage is sized before any
    // script is converted and never grows mid-construction.
    let non_deferred = result
        .scripts
        .iter()
        .skip(1)
        .filter(|script| script.immutable_script_data.is_some())
        .count();
    let top_level_blobs = usize::from(result.scripts[0].immutable_script_data.is_some());
    state.prepare_storage_for(len, non_deferred + top_level_blobs)?;

    let mut blob_cache = SharedBlobCache::default();
    for (i, foreign) in result.scripts.iter().enumerate() {
        convert_script(
            result,
            foreign,
            all_atoms,
            options,
            state,
            ScriptIndex::new(i as u32),
            &mut blob_cache,
        )?;
    }

    debug!(scripts = len, non_deferred, "converted script list");
    Ok(())
}
