//! Instruction writer, held by the bytecode emitter.
//!
//! The emitter begins a sequence, sets a key before each instruction in
//! object mode (array-mode elements are dense, so keys stay implicit),
//! and pushes one instruction per property value. Offsets into the
//! buffer let the emitter delimit each literal's range.

use crate::atom::{AtomIndex, AtomTable};

use super::{
    ATOM_INDEX_MASK, ObjLiteralFlags, ObjLiteralKey, ObjLiteralOpcode, ObjLiteralStencil,
};

/// Encodes a straight-line sequence of object-literal instructions.
#[derive(Debug, Default)]
pub struct ObjLiteralWriter {
    code: Vec<u8>,
    flags: ObjLiteralFlags,
    next_key: ObjLiteralKey,
}

impl ObjLiteralWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a sequence with the given flags.
    pub fn begin_object(&mut self, flags: ObjLiteralFlags) {
        self.flags = flags;
    }

    /// Set an atom property name for the next instruction. Object mode
    /// only. The atom is marked used by the stencil.
    pub fn set_prop_name(&mut self, atoms: &mut AtomTable<'_>, name: AtomIndex) {
        debug_assert!(!self.flags.contains(ObjLiteralFlags::ARRAY));
        atoms.mark_used(name);
        self.next_key = ObjLiteralKey::Atom(name);
    }

    /// Set a numeric property index for the next instruction. Object
    /// mode only.
    pub fn set_prop_index(&mut self, index: u32) {
        debug_assert!(!self.flags.contains(ObjLiteralFlags::ARRAY));
        debug_assert!(index <= ATOM_INDEX_MASK);
        self.next_key = ObjLiteralKey::ArrayIndex(index);
    }

    /// Start emitting dense array elements. Array mode only; element
    /// indices stay implicit.
    pub fn begin_dense_array_elements(&mut self) {
        debug_assert!(self.flags.contains(ObjLiteralFlags::ARRAY));
        self.next_key = ObjLiteralKey::None;
    }

    /// Push a numeric constant property.
    pub fn prop_with_const_numeric_value(&mut self, value: f64) {
        self.push_op_and_key(ObjLiteralOpcode::ConstValue);
        self.code.extend_from_slice(&value.to_bits().to_le_bytes());
    }

    /// Push an interned-string property. The atom is marked used by the
    /// stencil.
    pub fn prop_with_atom_value(&mut self, atoms: &mut AtomTable<'_>, value: AtomIndex) {
        atoms.mark_used(value);
        self.push_op_and_key(ObjLiteralOpcode::ConstAtom);
        self.code.extend_from_slice(&value.raw().to_le_bytes());
    }

    /// Push a `null` property.
    pub fn prop_with_null_value(&mut self) {
        self.push_op_and_key(ObjLiteralOpcode::Null);
    }

    /// Push an `undefined` property.
    pub fn prop_with_undefined_value(&mut self) {
        self.push_op_and_key(ObjLiteralOpcode::Undefined);
    }

    /// Push a `true` property.
    pub fn prop_with_true_value(&mut self) {
        self.push_op_and_key(ObjLiteralOpcode::True);
    }

    /// Push a `false` property.
    pub fn prop_with_false_value(&mut self) {
        self.push_op_and_key(ObjLiteralOpcode::False);
    }

    /// Whether `index` fits the 31-bit key index space.
    pub fn array_index_in_range(index: i32) -> bool {
        index >= 0 && index as u32 <= ATOM_INDEX_MASK
    }

    /// Current end of the buffer; the emitter records these to delimit
    /// one literal's instruction range.
    pub fn cur_offset(&self) -> usize {
        self.code.len()
    }

    /// The encoded bytes so far.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// The flags of the current sequence.
    pub fn flags(&self) -> ObjLiteralFlags {
        self.flags
    }

    /// Discard all buffered instructions.
    pub fn clear(&mut self) {
        self.code.clear();
        self.next_key = ObjLiteralKey::None;
    }

    /// Hand the buffered sequence off as an owned stencil, leaving the
    /// writer empty for reuse.
    pub fn finish(&mut self) -> ObjLiteralStencil {
        self.next_key = ObjLiteralKey::None;
        ObjLiteralStencil::new(std::mem::take(&mut self.code), self.flags)
    }

    fn push_op_and_key(&mut self, op: ObjLiteralOpcode) {
        self.code.push(op as u8);
        self.code.extend_from_slice(&self.next_key.to_raw().to_le_bytes());
    }
}
