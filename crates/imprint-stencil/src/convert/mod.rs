//! Conversion from foreign parser output to a stencil.
//!
//! Stage order is load-bearing: atoms first, then scopes, regular
//! expressions, and scripts — later stages reference earlier tables by
//! index. Any stage failing aborts the whole conversion; the caller
//! discards the arena and with it everything built so far.

mod scopes;
mod scripts;

#[cfg(test)]
mod tests;

use bumpalo::Bump;
use tracing::debug;

use crate::atom::{AtomIndex, Encoding};
use crate::config::CompileOptions;
use crate::error::{CompileError, StencilError};
use crate::foreign::{ForeignResult, ParseOutcome};
use crate::init;
use crate::regexp::{RegExpFlags, RegExpStencil, check_pattern_syntax};
use crate::stencil::{CompilationState, CompilationStencil, INDEX_LIMIT};

/// Convert the foreign atom list into interned atoms, returning the
/// handle for each foreign atom position.
fn convert_atoms<'alloc>(
    result: &ForeignResult<'alloc>,
    state: &mut CompilationState<'alloc>,
) -> Result<Vec<AtomIndex>, StencilError> {
    let mut all_atoms = Vec::new();
    all_atoms
        .try_reserve_exact(result.atoms.len())
        .map_err(|_| StencilError::OutOfMemory)?;

    for atom in &result.atoms {
        let index = state.atoms.intern(atom.bytes, atom.encoding)?;
        state.atoms.mark_used(index);
        all_atoms.push(index);
    }

    debug!(atoms = all_atoms.len(), "converted atom list");
    Ok(all_atoms)
}

/// Convert the foreign regexp list into validated stencils.
fn convert_regexps<'alloc>(
    result: &ForeignResult<'alloc>,
    state: &mut CompilationState<'alloc>,
) -> Result<(), StencilError> {
    let len = result.regexps.len();
    if len == 0 {
        return Ok(());
    }
    if len > INDEX_LIMIT {
        return Err(StencilError::AllocationOverflow { table: "regexp" });
    }
    state
        .regexps
        .try_reserve_exact(len)
        .map_err(|_| StencilError::OutOfMemory)?;

    for item in &result.regexps {
        let pattern = result.slices[item.pattern as usize];

        let mut flags = RegExpFlags::empty();
        if item.global {
            flags |= RegExpFlags::GLOBAL;
        }
        if item.ignore_case {
            flags |= RegExpFlags::IGNORE_CASE;
        }
        if item.multi_line {
            flags |= RegExpFlags::MULTILINE;
        }
        if item.dot_all {
            flags |= RegExpFlags::DOT_ALL;
        }
        if item.sticky {
            flags |= RegExpFlags::STICKY;
        }
        if item.unicode {
            flags |= RegExpFlags::UNICODE;
        }

        // The parser already validated the pattern; this pass is the
        // stencil's own guarantee that no invalid entry exists.
        check_pattern_syntax(pattern, flags).map_err(|err| StencilError::RegExpSyntax {
            message: err.message,
            offset: err.offset,
        })?;

        let atom = state.atoms.intern(pattern.as_bytes(), Encoding::Utf8)?;
        state.atoms.mark_used(atom);
        state.push_regexp(RegExpStencil::new(atom, flags));
    }

    debug!(regexps = len, "converted regexp list");
    Ok(())
}

/// Convert a successful foreign parse into `state`.
///
/// The bytecode emitter may keep using `state` afterwards (interning
/// atoms, registering object literals) before sealing it.
pub fn build_stencil_into<'alloc>(
    result: &ForeignResult<'alloc>,
    options: &CompileOptions,
    state: &mut CompilationState<'alloc>,
) -> Result<(), StencilError> {
    debug_assert!(
        init::is_initialized(),
        "initialize() must be called before the first compilation"
    );

    let all_atoms = convert_atoms(result, state)?;
    scopes::convert_scopes(result, &all_atoms, state)?;
    convert_regexps(result, state)?;
    scripts::convert_scripts(result, &all_atoms, options, state)?;
    Ok(())
}

/// Convert a successful foreign parse into a finished stencil.
pub fn build_stencil<'alloc>(
    alloc: &'alloc Bump,
    result: &ForeignResult<'alloc>,
    options: &CompileOptions,
) -> Result<CompilationStencil<'alloc>, StencilError> {
    let mut state = CompilationState::new(alloc);
    build_stencil_into(result, options, &mut state)?;
    Ok(state.finish())
}

/// Fold the parser's three outcomes into one compile result.
///
/// [`CompileError::Unimplemented`] tells the caller to fall back to an
/// alternate frontend; [`CompileError::Syntax`] is reported to the user;
/// anything else means the attempt is discarded.
pub fn compile_global_script<'alloc>(
    alloc: &'alloc Bump,
    outcome: ParseOutcome<'alloc>,
    options: &CompileOptions,
) -> Result<CompilationStencil<'alloc>, CompileError> {
    match outcome {
        ParseOutcome::SyntaxError(error) => Err(CompileError::Syntax(error)),
        ParseOutcome::Unimplemented => Err(CompileError::Unimplemented),
        ParseOutcome::Success(result) => Ok(build_stencil(alloc, &result, options)?),
    }
}
