//! Instruction reader: single-pass forward decoding.

use byteorder::{ByteOrder, LittleEndian};

use crate::atom::AtomIndex;
use crate::error::ObjLiteralError;

use super::{
    ATOM_INDEX_MASK, INDEXED_PROP, ObjLiteralFlags, ObjLiteralInsn, ObjLiteralKey,
    ObjLiteralOpcode,
};

/// Decodes one encoded sequence, one instruction per call. The cursor
/// only ever moves forward.
#[derive(Debug)]
pub struct ObjLiteralReader<'a> {
    data: &'a [u8],
    cursor: usize,
    array: bool,
}

impl<'a> ObjLiteralReader<'a> {
    /// Create a reader over `data`, decoding under the sequence's flags.
    pub fn new(data: &'a [u8], flags: ObjLiteralFlags) -> Self {
        Self {
            data,
            cursor: 0,
            array: flags.contains(ObjLiteralFlags::ARRAY),
        }
    }

    /// Decode the next instruction.
    ///
    /// Returns `Ok(None)` at a clean end of stream; fails on a truncated
    /// buffer or an opcode byte outside the valid range.
    pub fn read_insn(&mut self) -> Result<Option<ObjLiteralInsn>, ObjLiteralError> {
        if self.cursor == self.data.len() {
            return Ok(None);
        }

        let op_offset = self.cursor;
        let op_byte = self.read_byte()?;
        let op = ObjLiteralOpcode::from_byte(op_byte).ok_or(ObjLiteralError::InvalidOpcode {
            byte: op_byte,
            offset: op_offset,
        })?;
        let key = self.read_key()?;

        let insn = match op {
            ObjLiteralOpcode::ConstValue => {
                let bits = self.read_u64()?;
                ObjLiteralInsn::ConstValue {
                    key,
                    value: f64::from_bits(bits),
                }
            }
            ObjLiteralOpcode::ConstAtom => {
                let raw = self.read_u32()?;
                ObjLiteralInsn::ConstAtom {
                    key,
                    atom: AtomIndex::from_raw(raw),
                }
            }
            ObjLiteralOpcode::Null => ObjLiteralInsn::Null { key },
            ObjLiteralOpcode::Undefined => ObjLiteralInsn::Undefined { key },
            ObjLiteralOpcode::True => ObjLiteralInsn::True { key },
            ObjLiteralOpcode::False => ObjLiteralInsn::False { key },
        };
        Ok(Some(insn))
    }

    fn read_key(&mut self) -> Result<ObjLiteralKey, ObjLiteralError> {
        let word = self.read_u32()?;
        if self.array {
            // Dense elements never carry keys; the slot in the layout is
            // still consumed.
            return Ok(ObjLiteralKey::None);
        }
        if word & INDEXED_PROP != 0 {
            Ok(ObjLiteralKey::ArrayIndex(word & ATOM_INDEX_MASK))
        } else {
            Ok(ObjLiteralKey::Atom(AtomIndex::from_raw(word)))
        }
    }

    fn read_byte(&mut self) -> Result<u8, ObjLiteralError> {
        let byte = *self
            .data
            .get(self.cursor)
            .ok_or(ObjLiteralError::Truncated { offset: self.cursor })?;
        self.cursor += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, size: usize) -> Result<&'a [u8], ObjLiteralError> {
        let bytes = self
            .data
            .get(self.cursor..self.cursor + size)
            .ok_or(ObjLiteralError::Truncated { offset: self.cursor })?;
        self.cursor += size;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> Result<u32, ObjLiteralError> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    fn read_u64(&mut self) -> Result<u64, ObjLiteralError> {
        Ok(LittleEndian::read_u64(self.read_bytes(8)?))
    }
}
