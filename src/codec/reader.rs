//! Array read side of the wire codec (spec.md §4.G).
//!
//! `Reader` borrows a byte slice and advances an internal cursor. Bounds
//! failures from the underlying primitive/varint readers are remapped to
//! `Decoding("truncated input")`: a short read against a borrowed slice
//! during sequential decode is "the input ended early," not the random-access
//! `OutOfBounds` that a typed view reports (spec.md §7 reserves `OutOfBounds`
//! for view/region index checks).

use crate::error::{Error, Result};
use crate::primitives;
use crate::utf8;
use crate::varint;

#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn truncated(err: Error) -> Error {
        match err {
            Error::OutOfBounds { offset, length } => Error::Decoding(format!(
                "truncated input: expected more bytes at offset {offset}, input length {length}"
            )),
            other => other,
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let v = primitives::read_u8(self.data, self.pos).map_err(Self::truncated)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        let v = primitives::read_i8(self.data, self.pos).map_err(Self::truncated)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let v = primitives::read_u16(self.data, self.pos).map_err(Self::truncated)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let v = primitives::read_u32(self.data, self.pos).map_err(Self::truncated)?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let v = primitives::read_u64(self.data, self.pos).map_err(Self::truncated)?;
        self.pos += 8;
        Ok(v)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let v = primitives::read_i16(self.data, self.pos).map_err(Self::truncated)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let v = primitives::read_i32(self.data, self.pos).map_err(Self::truncated)?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let v = primitives::read_i64(self.data, self.pos).map_err(Self::truncated)?;
        self.pos += 8;
        Ok(v)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reader accepts only `0x00`/`0x01`; any other byte is `Decoding`
    /// (spec.md §4.G, §8 boundary behavior).
    pub fn read_bool(&mut self) -> Result<bool> {
        let v = primitives::read_bool(self.data, self.pos).map_err(Self::truncated)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_varint_u(&mut self) -> Result<u64> {
        let (value, consumed) = varint::decode_u64(self.data, self.pos)?;
        self.pos += consumed;
        Ok(value)
    }

    pub fn read_varint_i(&mut self) -> Result<i64> {
        let (value, consumed) = varint::decode_i64(self.data, self.pos)?;
        self.pos += consumed;
        Ok(value)
    }

    pub fn read_enum_value(&mut self) -> Result<u64> {
        self.read_varint_u()
    }

    /// `string`: varint byte length, then that many UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<&'a str> {
        let bytes = self.read_data()?;
        utf8::decode(bytes)
    }

    /// `data`: varint byte length, then that many raw bytes.
    pub fn read_data(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint_u()? as usize;
        self.read_fixed_data(len)
    }

    /// `fixed data(n)`: exactly `len` bytes, no length prefix.
    pub fn read_fixed_data(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or_else(|| {
            Error::Decoding("truncated input: length overflows cursor".to_string())
        })?;
        if end > self.data.len() {
            return Err(Error::Decoding(format!(
                "truncated input: need {len} bytes at offset {}, input length {}",
                self.pos,
                self.data.len()
            )));
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// `optional T` presence tag; any byte other than `0x00`/`0x01` is
    /// `Decoding` (spec.md §8 boundary behavior).
    pub fn read_optional_tag(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            other => Err(Error::Decoding(format!(
                "invalid optional tag: {other:#04x}"
            ))),
        }
    }

    /// `list T` / `map K V` count prefix.
    pub fn read_count(&mut self) -> Result<u64> {
        self.read_varint_u()
    }

    /// `union` tag. Decoding whether the tag has a known payload is the
    /// caller's responsibility (the reader has no schema); an unrecognized
    /// tag is `Decoding` at the call site that dispatches on it.
    pub fn read_union_tag(&mut self) -> Result<u32> {
        let tag = self.read_varint_u()?;
        u32::try_from(tag)
            .map_err(|_| Error::Decoding(format!("union tag exceeds 32 bits: {tag}")))
    }
}
