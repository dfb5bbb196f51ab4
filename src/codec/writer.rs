//! Buffer write side of the wire codec (spec.md §4.G).
//!
//! `Writer` owns a growable byte buffer and tracks a position (its current
//! length). Every write method appends at the end and returns the new
//! position so calls can be chained. The codec is schema-directed rather
//! than self-describing: callers pick the method matching the declared
//! `SchemaType` (there is no `write_value(schema, ty, ..)` dispatcher here),
//! mirroring the teacher's reader-trait style of one method per concrete
//! wire shape rather than one dynamically-dispatched entry point.

use crate::error::{Error, Result};
use crate::varint;

/// A growable output buffer. `bounded` caps the buffer at a maximum size so
/// overflow (spec.md §4.G, §7 `Encoding`) is reachable in tests and in
/// callers writing into a fixed-capacity region; the unbounded constructors
/// never fail on size alone.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
    limit: Option<usize>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Writer {
            buf: Vec::with_capacity(capacity),
            limit: None,
        }
    }

    /// A writer that fails with `Encoding` once its buffer would grow past
    /// `limit` bytes.
    pub fn bounded(limit: usize) -> Self {
        Writer {
            buf: Vec::new(),
            limit: Some(limit),
        }
    }

    /// The current write position (buffer length).
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.buf.len() + additional > limit {
                return Err(Error::Encoding(format!(
                    "buffer overflow: writing {additional} bytes at position {} would exceed limit {limit}",
                    self.buf.len()
                )));
            }
        }
        Ok(())
    }

    fn push(&mut self, bytes: &[u8]) -> Result<usize> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(self.position())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<usize> {
        self.push(&[value])
    }

    pub fn write_i8(&mut self, value: i8) -> Result<usize> {
        self.push(&[value as u8])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<usize> {
        self.push(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<usize> {
        self.push(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<usize> {
        self.push(&value.to_le_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<usize> {
        self.push(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<usize> {
        self.push(&value.to_le_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<usize> {
        self.push(&value.to_le_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<usize> {
        self.write_u32(value.to_bits())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<usize> {
        self.write_u64(value.to_bits())
    }

    /// Writer emits only `0x00`/`0x01` (spec.md §4.G).
    pub fn write_bool(&mut self, value: bool) -> Result<usize> {
        self.write_u8(if value { 0x01 } else { 0x00 })
    }

    pub fn write_varint_u(&mut self, value: u64) -> Result<usize> {
        let mut encoded = Vec::with_capacity(varint::MAX_VARINT_BYTES);
        varint::encode_u64(value, &mut encoded);
        self.push(&encoded)
    }

    pub fn write_varint_i(&mut self, value: i64) -> Result<usize> {
        let mut encoded = Vec::with_capacity(varint::MAX_VARINT_BYTES);
        varint::encode_i64(value, &mut encoded);
        self.push(&encoded)
    }

    /// `enum` wire form: varint of the chosen variant's numeric value.
    pub fn write_enum_value(&mut self, value: u64) -> Result<usize> {
        self.write_varint_u(value)
    }

    /// `string`: varint byte length, then the UTF-8 bytes.
    pub fn write_string(&mut self, value: &str) -> Result<usize> {
        self.write_varint_u(value.len() as u64)?;
        self.push(value.as_bytes())
    }

    /// `data`: varint byte length, then the raw bytes.
    pub fn write_data(&mut self, bytes: &[u8]) -> Result<usize> {
        self.write_varint_u(bytes.len() as u64)?;
        self.push(bytes)
    }

    /// `fixed data(n)`: exactly `bytes.len()` bytes, no length prefix. The
    /// caller is responsible for supplying a slice of the schema's declared
    /// length; this is a caller error, not checked here, the same way a
    /// fixed-list element-count mismatch is a caller error (spec.md §8).
    pub fn write_fixed_data(&mut self, bytes: &[u8]) -> Result<usize> {
        self.push(bytes)
    }

    /// `optional T` presence tag: `0x00` absent, `0x01` present. The caller
    /// writes `T`'s encoding immediately afterward when present.
    pub fn write_optional_tag(&mut self, present: bool) -> Result<usize> {
        self.write_bool(present)
    }

    /// `list T` / `map K V` count prefix. The caller then writes that many
    /// elements (or key/value pairs) using the matching write methods.
    pub fn write_count(&mut self, count: u64) -> Result<usize> {
        self.write_varint_u(count)
    }

    /// `union` tag. The caller writes the selected case's payload
    /// immediately afterward.
    pub fn write_union_tag(&mut self, tag: u32) -> Result<usize> {
        self.write_varint_u(tag as u64)
    }
}
