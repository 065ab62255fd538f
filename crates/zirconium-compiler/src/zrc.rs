//! The `Zrc` binary chunk format.
//!
//! ```text
//! "Zrc" major minor patch
//! 0x01 INSTRUCTION_ARRAY  u32 count, count * u32
//! 0x02 CONSTANTS          u32 count, count * (tag, payload)
//! 0x03 LABELS             u32 count, count * (u32 index, u32 len, utf-8)
//! ```
//!
//! All integers are little-endian. Constant tags are `STRING` (u32 length
//! and UTF-8), `NUMBER` (f64), `BOOLEAN` (u8) and `UNDEFINED` (no payload).

use zirconium_core::DecodeError;

use crate::bytecode::{Constant, ConstantPool, ZrChunk};

pub const MAGIC: &[u8; 3] = b"Zrc";
pub const VERSION: [u8; 3] = [0, 1, 0];

const SECTION_INSTRUCTIONS: u8 = 0x01;
const SECTION_CONSTANTS: u8 = 0x02;
const SECTION_LABELS: u8 = 0x03;

const TAG_STRING: u8 = 0;
const TAG_NUMBER: u8 = 1;
const TAG_BOOLEAN: u8 = 2;
const TAG_UNDEFINED: u8 = 3;

// ============================================================================
// Writer
// ============================================================================

/// Serializes chunks.
#[derive(Debug, Default)]
pub struct ZrBytecodeWriter {
    buffer: Vec<u8>,
}

impl ZrBytecodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `chunk` into a fresh buffer.
    pub fn write(chunk: &ZrChunk) -> Vec<u8> {
        let mut writer = Self::new();
        writer.write_chunk(chunk);
        writer.finish()
    }

    pub fn write_chunk(&mut self, chunk: &ZrChunk) {
        self.buffer.extend_from_slice(MAGIC);
        self.buffer.extend_from_slice(&VERSION);

        self.buffer.push(SECTION_INSTRUCTIONS);
        self.write_len(chunk.instructions().len());
        for &word in chunk.instructions() {
            self.write_u32(word);
        }

        self.buffer.push(SECTION_CONSTANTS);
        self.write_len(chunk.constants().len());
        for constant in chunk.constants().constants() {
            self.write_constant(constant);
        }

        self.buffer.push(SECTION_LABELS);
        self.write_len(chunk.labels().len());
        for (index, name) in chunk.labels() {
            self.write_len(*index);
            self.write_str(name);
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    fn write_constant(&mut self, constant: &Constant) {
        match constant {
            Constant::String(s) => {
                self.buffer.push(TAG_STRING);
                self.write_str(s);
            }
            Constant::Number(n) => {
                self.buffer.push(TAG_NUMBER);
                self.buffer.extend_from_slice(&n.to_le_bytes());
            }
            Constant::Boolean(b) => {
                self.buffer.push(TAG_BOOLEAN);
                self.buffer.push(u8::from(*b));
            }
            Constant::Undefined => self.buffer.push(TAG_UNDEFINED),
        }
    }

    fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Lengths and indices are written as u32; chunks never approach that.
    fn write_len(&mut self, value: usize) {
        self.write_u32(value as u32);
    }

    fn write_str(&mut self, value: &str) {
        self.write_len(value.len());
        self.buffer.extend_from_slice(value.as_bytes());
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Deserializes chunks.
pub struct ZrBytecodeReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ZrBytecodeReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Decode a whole chunk.
    pub fn read(bytes: &'a [u8]) -> Result<ZrChunk, DecodeError> {
        Self::new(bytes).read_chunk()
    }

    /// The header version, if the input has a valid header.
    pub fn version(bytes: &[u8]) -> Result<[u8; 3], DecodeError> {
        let mut reader = ZrBytecodeReader::new(bytes);
        reader.read_header()
    }

    pub fn read_chunk(&mut self) -> Result<ZrChunk, DecodeError> {
        self.read_header()?;

        let mut instructions = Vec::new();
        let mut constants = Vec::new();
        let mut labels = Vec::new();

        while self.pos < self.bytes.len() {
            match self.read_u8()? {
                SECTION_INSTRUCTIONS => {
                    let count = self.read_len()?;
                    instructions.reserve(count.min(self.remaining() / 4));
                    for _ in 0..count {
                        instructions.push(self.read_u32()?);
                    }
                }
                SECTION_CONSTANTS => {
                    let count = self.read_len()?;
                    for _ in 0..count {
                        constants.push(self.read_constant()?);
                    }
                }
                SECTION_LABELS => {
                    let count = self.read_len()?;
                    for _ in 0..count {
                        let index = self.read_len()?;
                        let name = self.read_string()?;
                        labels.push((index, name));
                    }
                }
                tag => return Err(DecodeError::UnknownSection(tag)),
            }
        }

        Ok(ZrChunk::from_parts(
            instructions,
            ConstantPool::from_constants(constants),
            labels,
        ))
    }

    fn read_header(&mut self) -> Result<[u8; 3], DecodeError> {
        let magic = self.take(3).map_err(|_| DecodeError::BadMagic)?;
        if magic != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        let version = self.take(3)?;
        Ok([version[0], version[1], version[2]])
    }

    fn read_constant(&mut self) -> Result<Constant, DecodeError> {
        match self.read_u8()? {
            TAG_STRING => Ok(Constant::String(self.read_string()?)),
            TAG_NUMBER => {
                let bytes = self.take(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Ok(Constant::Number(f64::from_le_bytes(raw)))
            }
            TAG_BOOLEAN => Ok(Constant::Boolean(self.read_u8()? != 0)),
            TAG_UNDEFINED => Ok(Constant::Undefined),
            tag => Err(DecodeError::UnknownConstantTag(tag)),
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(DecodeError::UnexpectedEof(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_len(&mut self) -> Result<usize, DecodeError> {
        Ok(self.read_u32()? as usize)
    }

    fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_len()?;
        let start = self.pos;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| DecodeError::InvalidUtf8(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::OpCode;
    use crate::emit::ChunkEmitter;

    fn sample() -> ZrChunk {
        let mut emitter = ChunkEmitter::new();
        emitter.emit_constant(Constant::Number(1.5));
        emitter.emit_constant(Constant::Boolean(true));
        emitter.emit_constant(Constant::Undefined);
        emitter.mark_label("f");
        emitter.emit_call("print", 3);
        emitter.finish()
    }

    #[test]
    fn header_layout() {
        let bytes = ZrBytecodeWriter::write(&sample());
        assert_eq!(&bytes[..3], b"Zrc");
        assert_eq!(&bytes[3..6], &VERSION);
        assert_eq!(bytes[6], SECTION_INSTRUCTIONS);
        assert_eq!(ZrBytecodeReader::version(&bytes), Ok(VERSION));
    }

    #[test]
    fn chunk_survives_encoding() {
        let chunk = sample();
        let decoded = ZrBytecodeReader::read(&ZrBytecodeWriter::write(&chunk)).unwrap();
        assert_eq!(decoded.instructions(), chunk.instructions());
        assert_eq!(decoded.constants().constants(), chunk.constants().constants());
        assert_eq!(decoded.labels(), chunk.labels());
        decoded.assert_opcodes(&[OpCode::LoadK, OpCode::LoadK, OpCode::LoadK, OpCode::CallK]);
    }

    #[test]
    fn bad_magic() {
        assert!(matches!(ZrBytecodeReader::read(b"Zr"), Err(DecodeError::BadMagic)));
        assert!(matches!(ZrBytecodeReader::read(b"abc\0\0\0"), Err(DecodeError::BadMagic)));
    }

    #[test]
    fn truncated_input() {
        let bytes = ZrBytecodeWriter::write(&sample());
        let err = ZrBytecodeReader::read(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEof(_)));
    }

    #[test]
    fn unknown_tags() {
        let mut bytes = b"Zrc\0\x01\0".to_vec();
        bytes.push(0x09);
        assert!(matches!(ZrBytecodeReader::read(&bytes), Err(DecodeError::UnknownSection(0x09))));

        let mut bytes = b"Zrc\0\x01\0".to_vec();
        bytes.push(SECTION_CONSTANTS);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.push(7);
        assert!(matches!(
            ZrBytecodeReader::read(&bytes),
            Err(DecodeError::UnknownConstantTag(7))
        ));
    }

    #[test]
    fn invalid_utf8() {
        let mut bytes = b"Zrc\0\x01\0".to_vec();
        bytes.push(SECTION_CONSTANTS);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.push(TAG_STRING);
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        assert!(matches!(ZrBytecodeReader::read(&bytes), Err(DecodeError::InvalidUtf8(_))));
    }
}
