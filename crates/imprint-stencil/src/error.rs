//! Error types for stencil construction.
//!
//! Two kinds of failure abort a conversion: resource exhaustion
//! (`OutOfMemory`, `AllocationOverflow`) and content errors
//! (`RegExpSyntax`, `MalformedAtom`). Both discard everything built so
//! far; there is never a partial stencil.

use thiserror::Error;

use crate::foreign::ForeignSyntaxError;

/// Error raised while building a stencil from foreign parser output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StencilError {
    /// Backing storage for a table could not be reserved.
    #[error("out of memory")]
    OutOfMemory,

    /// A table needs more entries than its fixed-width index can address.
    #[error("{table} table exceeds its index limit")]
    AllocationOverflow {
        /// Name of the table that overflowed
        table: &'static str,
    },

    /// A regular expression pattern failed syntax validation.
    #[error("invalid regular expression at offset {offset}: {message}")]
    RegExpSyntax {
        /// Human-readable description of the syntax error
        message: String,
        /// Byte offset of the error within the pattern text
        offset: usize,
    },

    /// Atom bytes did not match their declared encoding.
    #[error("atom bytes are not valid for the declared encoding")]
    MalformedAtom,
}

/// Error surface of the whole compile-to-stencil pipeline.
///
/// Folds the parser's three possible outcomes with stencil-construction
/// failures so the caller can distinguish "report to the user", "fall
/// back to another frontend", and "discard the attempt".
#[derive(Error, Debug)]
pub enum CompileError {
    /// The foreign parser reported a hard syntax error in the source.
    #[error("syntax error: {0}")]
    Syntax(ForeignSyntaxError),

    /// The foreign parser does not implement a feature the source needs;
    /// the caller must fall back to an alternate frontend.
    #[error("unimplemented in foreign parser")]
    Unimplemented,

    /// Stencil construction failed after a successful parse.
    #[error(transparent)]
    Stencil(#[from] StencilError),
}

/// Decode failure in the object-literal instruction reader.
///
/// The instruction stream never crosses a process or version boundary,
/// so a failure here means the stream did not come from this crate's
/// writer. The reader still reports it rather than asserting, since the
/// buffer itself may have been truncated by a caller bug.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjLiteralError {
    /// The stream ended in the middle of an instruction.
    #[error("truncated instruction stream at offset {offset}")]
    Truncated {
        /// Byte offset at which more input was expected
        offset: usize,
    },

    /// An opcode byte outside the valid range.
    #[error("invalid opcode byte {byte:#04x} at offset {offset}")]
    InvalidOpcode {
        /// The offending byte
        byte: u8,
        /// Byte offset of the opcode
        offset: usize,
    },
}
