//! Replay contract for the heap materializer.
//!
//! The materializer walks a literal's instruction stream exactly once,
//! in order. In array mode it appends dense elements; in object mode it
//! defines each property by its key. Either way, the resulting object's
//! enumeration order is the instruction order.

use crate::atom::AtomIndex;
use crate::error::ObjLiteralError;

use super::reader::ObjLiteralReader;
use super::{ObjLiteralFlags, ObjLiteralInsn, ObjLiteralKey};

/// A decoded primitive literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue {
    /// Numeric constant
    Number(f64),
    /// Interned string
    Atom(AtomIndex),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// Boolean constant
    Boolean(bool),
}

/// Receiver the materializer implements to build the real object.
///
/// [`interpret`] drives it once, in stream order; the implementation
/// must preserve that order as the object's enumeration order.
pub trait LiteralSink {
    /// Define one property of an object-mode literal.
    fn define_property(&mut self, key: ObjLiteralKey, value: LiteralValue);

    /// Append one dense element of an array-mode literal.
    fn append_element(&mut self, value: LiteralValue);
}

/// Replay an encoded sequence into `sink`.
///
/// A decode failure here means the stream did not come from this
/// crate's writer — the two are co-versioned and the stream never
/// crosses a process boundary — so it is a caller bug, not input
/// corruption. Debug builds assert; release builds surface the error.
pub fn interpret<S: LiteralSink>(
    code: &[u8],
    flags: ObjLiteralFlags,
    sink: &mut S,
) -> Result<(), ObjLiteralError> {
    let array = flags.contains(ObjLiteralFlags::ARRAY);
    let mut reader = ObjLiteralReader::new(code, flags);
    loop {
        let insn = match reader.read_insn() {
            Ok(Some(insn)) => insn,
            Ok(None) => return Ok(()),
            Err(err) => {
                debug_assert!(false, "malformed stream from co-versioned writer: {err}");
                return Err(err);
            }
        };
        let value = match insn {
            ObjLiteralInsn::ConstValue { value, .. } => LiteralValue::Number(value),
            ObjLiteralInsn::ConstAtom { atom, .. } => LiteralValue::Atom(atom),
            ObjLiteralInsn::Null { .. } => LiteralValue::Null,
            ObjLiteralInsn::Undefined { .. } => LiteralValue::Undefined,
            ObjLiteralInsn::True { .. } => LiteralValue::Boolean(true),
            ObjLiteralInsn::False { .. } => LiteralValue::Boolean(false),
        };
        if array {
            sink.append_element(value);
        } else {
            sink.define_property(insn.key(), value);
        }
    }
}
