//! Scope record conversion.

use tracing::debug;

use crate::atom::AtomIndex;
use crate::error::StencilError;
use crate::foreign::{ForeignBindingName, ForeignResult, ForeignScopeData};
use crate::stencil::scope::{BindingName, ScopeStencil};
use crate::stencil::{CompilationState, INDEX_LIMIT, ScopeIndex, ScriptIndex};

fn copy_binding_names(from: &[ForeignBindingName], all_atoms: &[AtomIndex]) -> Vec<BindingName> {
    from.iter()
        .map(|name| BindingName {
            atom: Some(all_atoms[name.name as usize]),
            closed_over: name.is_closed_over,
            is_top_level_function: name.is_top_level_function,
        })
        .collect()
}

/// Function-scope bindings may be elided positional parameters; those
/// slots stay in the array as cleared entries.
fn copy_optional_binding_names(
    from: &[Option<ForeignBindingName>],
    all_atoms: &[AtomIndex],
) -> Vec<BindingName> {
    from.iter()
        .map(|maybe_name| match maybe_name {
            Some(name) => BindingName {
                atom: Some(all_atoms[name.name as usize]),
                closed_over: name.is_closed_over,
                is_top_level_function: name.is_top_level_function,
            },
            None => BindingName::empty(),
        })
        .collect()
}

/// Convert the foreign scope list, in order, into the scope table.
///
/// Output position equals input position; the GC-thing conversion
/// depends on that alignment.
pub(super) fn convert_scopes<'alloc>(
    result: &ForeignResult<'alloc>,
    all_atoms: &[AtomIndex],
    state: &mut CompilationState<'alloc>,
) -> Result<(), StencilError> {
    if result.scopes.len() > INDEX_LIMIT {
        return Err(StencilError::AllocationOverflow { table: "scope" });
    }
    state
        .scopes
        .try_reserve_exact(result.scopes.len())
        .map_err(|_| StencilError::OutOfMemory)?;

    for (i, scope_data) in result.scopes.iter().enumerate() {
        let index = match scope_data {
            ForeignScopeData::Global(global) => {
                let bindings = copy_binding_names(&global.bindings, all_atoms);
                state.push_scope(ScopeStencil::for_global_scope(
                    bindings,
                    global.let_start,
                    global.const_start,
                ))
            }
            ForeignScopeData::Var(var) => {
                let bindings = copy_binding_names(&var.bindings, all_atoms);
                state.push_scope(ScopeStencil::for_var_scope(
                    bindings,
                    var.first_frame_slot,
                    var.function_has_extensible_scope,
                    ScopeIndex::new(var.enclosing),
                ))
            }
            ForeignScopeData::Lexical(lexical) => {
                let bindings = copy_binding_names(&lexical.bindings, all_atoms);
                state.push_scope(ScopeStencil::for_lexical_scope(
                    bindings,
                    lexical.const_start,
                    lexical.first_frame_slot,
                    ScopeIndex::new(lexical.enclosing),
                ))
            }
            ForeignScopeData::Function(function) => {
                let bindings = copy_optional_binding_names(&function.bindings, all_atoms);
                state.push_scope(ScopeStencil::for_function_scope(
                    bindings,
                    function.has_parameter_exprs,
                    function.non_positional_formal_start,
                    function.var_start,
                    ScriptIndex::new(function.function_index),
                    function.is_arrow,
                    ScopeIndex::new(function.enclosing),
                ))
            }
        };

        // GC-thing conversion depends on this alignment.
        debug_assert_eq!(index.index(), i);
    }

    debug!(scopes = result.scopes.len(), "converted scope list");
    Ok(())
}
