//! Object-literal instruction streams.
//!
//! Object and array literals whose values are primitives and whose keys
//! are not computed get captured at parse time as a compact instruction
//! stream instead of real objects, so nothing touches the memory manager
//! during the parse. Each instruction adds one property: an opcode, a
//! key (atom, numeric index, or none for dense array elements), and an
//! optional inline payload. The [`writer::ObjLiteralWriter`] buffers a
//! straight-line sequence; the [`reader::ObjLiteralReader`] replays it
//! when the heap materializer finally builds the object.
//!
//! Two flags describe a whole sequence: `ARRAY` switches from properties
//! to dense elements, and `SINGLETON` marks a literal whose values are
//! final (the replayed object is used directly rather than as a shape
//! template). Which mode a literal gets is the bytecode emitter's call.
//!
//! The wire format is private to this pipeline stage and co-versioned
//! with the reader; it is not a persistence format. Layout per
//! instruction, little-endian regardless of host byte order:
//!
//! - 1-byte opcode
//! - 4-byte key word: top bit set = array index, low 31 bits = raw index
//! - payload: 8 bytes (`f64` bits) after `ConstValue`, 4 bytes (atom
//!   handle) after `ConstAtom`, nothing otherwise

pub mod interpret;
pub mod reader;
pub mod writer;


use std::ops::{BitOr, BitOrAssign};

use crate::atom::AtomIndex;

pub use interpret::{LiteralSink, LiteralValue, interpret};
pub use reader::ObjLiteralReader;
pub use writer::ObjLiteralWriter;

/// Mask of the key word's index bits.
pub(crate) const ATOM_INDEX_MASK: u32 = 0x7fff_ffff;
/// Key-word bit marking the index as an array index, not an atom.
pub(crate) const INDEXED_PROP: u32 = 0x8000_0000;

/// Object-literal instruction opcodes. A literal is a straight-line
/// sequence of these, each adding one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjLiteralOpcode {
    /// Numeric constant payload
    ConstValue = 1,
    /// Interned atom payload
    ConstAtom = 2,
    /// `null`, no payload
    Null = 3,
    /// `undefined`, no payload
    Undefined = 4,
    /// `true`, no payload
    True = 5,
    /// `false`, no payload
    False = 6,
}

impl ObjLiteralOpcode {
    const MAX: u8 = ObjLiteralOpcode::False as u8;

    /// Decode a wire byte; zero and out-of-range bytes are invalid.
    pub(crate) fn from_byte(byte: u8) -> Option<ObjLiteralOpcode> {
        match byte {
            1 => Some(ObjLiteralOpcode::ConstValue),
            2 => Some(ObjLiteralOpcode::ConstAtom),
            3 => Some(ObjLiteralOpcode::Null),
            4 => Some(ObjLiteralOpcode::Undefined),
            5 => Some(ObjLiteralOpcode::True),
            6 => Some(ObjLiteralOpcode::False),
            _ => {
                debug_assert!(byte == 0 || byte > ObjLiteralOpcode::MAX);
                None
            }
        }
    }

    /// Whether the opcode is followed by an 8-byte numeric payload.
    pub fn has_value_arg(self) -> bool {
        self == ObjLiteralOpcode::ConstValue
    }

    /// Whether the opcode is followed by a 4-byte atom payload.
    pub fn has_atom_arg(self) -> bool {
        self == ObjLiteralOpcode::ConstAtom
    }
}

/// Property key of one instruction.
///
/// Array literals are dense, so their elements carry no key at all;
/// object literals use either an atom name or a numeric property index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjLiteralKey {
    /// No key; dense array elements are implicit
    #[default]
    None,
    /// Property name
    Atom(AtomIndex),
    /// Numeric property index
    ArrayIndex(u32),
}

impl ObjLiteralKey {
    /// Whether this is the no-key placeholder.
    pub fn is_none(self) -> bool {
        matches!(self, ObjLiteralKey::None)
    }

    /// Whether this is an atom property name.
    pub fn is_atom(self) -> bool {
        matches!(self, ObjLiteralKey::Atom(_))
    }

    /// Whether this is a numeric property index.
    pub fn is_array_index(self) -> bool {
        matches!(self, ObjLiteralKey::ArrayIndex(_))
    }

    /// Encode as a wire key word.
    pub(crate) fn to_raw(self) -> u32 {
        match self {
            ObjLiteralKey::None => 0,
            ObjLiteralKey::Atom(atom) => atom.raw(),
            ObjLiteralKey::ArrayIndex(index) => index | INDEXED_PROP,
        }
    }
}

/// Flags describing one instruction sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjLiteralFlags(u8);

impl ObjLiteralFlags {
    /// The literal is an array; elements are dense and keys implicit.
    pub const ARRAY: ObjLiteralFlags = ObjLiteralFlags(1 << 0);
    /// Singleton context: values are final and the replayed object is
    /// the literal's runtime value.
    pub const SINGLETON: ObjLiteralFlags = ObjLiteralFlags(1 << 1);

    /// The empty flag set.
    pub fn empty() -> Self {
        ObjLiteralFlags(0)
    }

    /// Whether every flag in `other` is set.
    pub fn contains(self, other: ObjLiteralFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ObjLiteralFlags {
    type Output = ObjLiteralFlags;

    fn bitor(self, rhs: ObjLiteralFlags) -> ObjLiteralFlags {
        ObjLiteralFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ObjLiteralFlags {
    fn bitor_assign(&mut self, rhs: ObjLiteralFlags) {
        self.0 |= rhs.0;
    }
}

/// One decoded instruction: opcode, key, and payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjLiteralInsn {
    /// Numeric constant value
    ConstValue {
        /// Property key
        key: ObjLiteralKey,
        /// The constant
        value: f64,
    },
    /// Interned string value
    ConstAtom {
        /// Property key
        key: ObjLiteralKey,
        /// The interned string
        atom: AtomIndex,
    },
    /// `null` value
    Null {
        /// Property key
        key: ObjLiteralKey,
    },
    /// `undefined` value
    Undefined {
        /// Property key
        key: ObjLiteralKey,
    },
    /// `true` value
    True {
        /// Property key
        key: ObjLiteralKey,
    },
    /// `false` value
    False {
        /// Property key
        key: ObjLiteralKey,
    },
}

impl ObjLiteralInsn {
    /// The instruction's opcode.
    pub fn op(&self) -> ObjLiteralOpcode {
        match self {
            ObjLiteralInsn::ConstValue { .. } => ObjLiteralOpcode::ConstValue,
            ObjLiteralInsn::ConstAtom { .. } => ObjLiteralOpcode::ConstAtom,
            ObjLiteralInsn::Null { .. } => ObjLiteralOpcode::Null,
            ObjLiteralInsn::Undefined { .. } => ObjLiteralOpcode::Undefined,
            ObjLiteralInsn::True { .. } => ObjLiteralOpcode::True,
            ObjLiteralInsn::False { .. } => ObjLiteralOpcode::False,
        }
    }

    /// The instruction's key.
    pub fn key(&self) -> ObjLiteralKey {
        match *self {
            ObjLiteralInsn::ConstValue { key, .. }
            | ObjLiteralInsn::ConstAtom { key, .. }
            | ObjLiteralInsn::Null { key }
            | ObjLiteralInsn::Undefined { key }
            | ObjLiteralInsn::True { key }
            | ObjLiteralInsn::False { key } => key,
        }
    }
}

/// An encoded literal owned by the stencil, ready for the heap
/// materializer to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjLiteralStencil {
    code: Vec<u8>,
    flags: ObjLiteralFlags,
}

impl ObjLiteralStencil {
    pub(crate) fn new(code: Vec<u8>, flags: ObjLiteralFlags) -> Self {
        Self { code, flags }
    }

    /// The encoded instruction stream.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// The sequence-level flags.
    pub fn flags(&self) -> ObjLiteralFlags {
        self.flags
    }

    /// Replay this literal into `sink` in instruction order.
    pub fn interpret<S: LiteralSink>(&self, sink: &mut S) -> Result<(), crate::error::ObjLiteralError> {
        interpret(&self.code, self.flags, sink)
    }
}
