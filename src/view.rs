//! Typed memory view (spec.md §4.H).
//!
//! A view precomputes a dotted-path → field-offset map once over a
//! validated struct schema, then answers `get`/`set` calls against a
//! borrowed byte region by dispatching on the stored leaf `SchemaType`.
//! Capability (read-only vs. read-write) is carried by which of two
//! concrete types a caller holds — [`View`] or [`ViewMut`] — rather than by
//! a generic marker-typed struct: the phantom/unit-of-measure-typed pointer
//! pattern the source uses for this (Design Notes §9) needs a single
//! pointer type erased over its capability, which in turn needs unsafe code
//! to store uniformly; two concrete borrow-checked types give the same
//! static guarantee (a read-only view cannot write) for free, under
//! `#![forbid(unsafe_code)]`.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::platform::{PlatformContext, TypeKind};
use crate::primitives;
use crate::schema::analyzer;
use crate::schema::model::{Schema, SchemaType, StructField};
use crate::varint;

/// One resolved leaf: where it lives, its declared type, its precomputed
/// size (the min size, per spec.md §4.H) and alignment.
#[derive(Debug, Clone)]
struct FieldOffset {
    field_type: SchemaType,
    offset: usize,
    #[allow(dead_code)]
    size: u64,
    #[allow(dead_code)]
    alignment: u32,
}

/// The precomputed dotted-path → field-offset map for a struct-rooted
/// schema, plus the struct's own total size and alignment (spec.md §4.H).
#[derive(Debug)]
pub struct FieldLayout {
    offsets: HashMap<String, FieldOffset>,
    total_size: usize,
    alignment: u32,
}

impl FieldLayout {
    /// Walks `schema`'s root struct and builds its field-offset map.
    /// Fails with `InvalidValue` if the root is not a `Struct`.
    pub fn build(schema: &Schema, platform: &dyn PlatformContext) -> Result<Self> {
        let SchemaType::Struct(fields) = schema.root_type() else {
            return Err(Error::InvalidValue(
                "typed views require a struct-rooted schema".to_string(),
            ));
        };

        let mut offsets = HashMap::new();
        let mut cursor: u64 = 0;
        let mut max_align: u32 = 1;
        walk_fields(schema, platform, fields, "", &mut cursor, &mut max_align, &mut offsets)?;

        let total_size = round_up(cursor, max_align as u64) as usize;
        Ok(FieldLayout {
            offsets,
            total_size,
            alignment: max_align,
        })
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    fn field(&self, path: &str) -> Result<&FieldOffset> {
        self.offsets
            .get(path)
            .ok_or_else(|| Error::InvalidValue(format!("Field path not found: {path}")))
    }
}

fn round_up(value: u64, align: u64) -> u64 {
    if align <= 1 {
        return value;
    }
    value.div_ceil(align) * align
}

/// Follows `TypeRef` chains to their eventual non-`TypeRef` type.
///
/// Guarded against cycles the same way `analyzer::SizeSolver::size_of_named`
/// is: a `Schema` can reach this function without ever having passed through
/// `SchemaBuilder::validate` (see `tools::load_schema`, which deserializes a
/// `Schema` directly), so a cyclic `TypeRef` chain is a real possibility, not
/// just a hypothetical one.
fn fully_resolve<'s>(schema: &'s Schema, ty: &'s SchemaType) -> Result<&'s SchemaType> {
    let mut current = ty;
    let mut seen = HashSet::new();
    while let SchemaType::TypeRef(name) = current {
        if !seen.insert(name.as_str()) {
            return Err(Error::InvalidValue(format!(
                "cyclic type reference while resolving field layout: {name}"
            )));
        }
        match schema.get(name) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(current)
}

fn walk_fields(
    schema: &Schema,
    platform: &dyn PlatformContext,
    fields: &[StructField],
    prefix: &str,
    cursor: &mut u64,
    max_align: &mut u32,
    offsets: &mut HashMap<String, FieldOffset>,
) -> Result<()> {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };

        let align = analyzer::align_of(schema, platform, &field.field_type);
        *cursor = round_up(*cursor, align as u64);
        let offset = *cursor;
        *max_align = (*max_align).max(align);

        match fully_resolve(schema, &field.field_type)? {
            SchemaType::Struct(nested) => {
                walk_fields(schema, platform, nested, &path, cursor, max_align, offsets)?;
            }
            SchemaType::Primitive(_, _) | SchemaType::Enum { .. } | SchemaType::FixedData(_) => {
                let size = analyzer::size_of(schema, platform, &field.field_type);
                offsets.insert(
                    path,
                    FieldOffset {
                        field_type: field.field_type.clone(),
                        offset: offset as usize,
                        size: size.min,
                        alignment: align,
                    },
                );
                *cursor += size.min;
            }
            _ => {
                // List/Map/Union/Optional: consumes cursor space but is not
                // directly addressable through a dotted path (spec.md §4.H).
                let size = analyzer::size_of(schema, platform, &field.field_type);
                *cursor += size.min;
            }
        }
    }
    Ok(())
}

fn type_mismatch(expected: &str, actual: &SchemaType) -> Error {
    Error::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.kind_name().to_string(),
    }
}

macro_rules! primitive_getter {
    ($name:ident, $kind:ident, $ret:ty, $read:path) => {
        pub fn $name(&self, path: &str) -> Result<$ret> {
            let field = self.layout.field(path)?;
            match field.field_type {
                SchemaType::Primitive(TypeKind::$kind, _) => $read(self.data, field.offset),
                ref other => Err(type_mismatch(stringify!($kind), other)),
            }
        }
    };
}

macro_rules! primitive_setter {
    ($name:ident, $kind:ident, $val:ty, $write:path) => {
        pub fn $name(&mut self, path: &str, value: $val) -> Result<()> {
            let field = self.layout.field(path)?.clone();
            match field.field_type {
                SchemaType::Primitive(TypeKind::$kind, _) => $write(self.data, field.offset, value),
                ref other => Err(type_mismatch(stringify!($kind), other)),
            }
        }
    };
}

/// A read-only view over a borrowed byte region.
pub struct View<'a> {
    data: &'a [u8],
    layout: Rc<FieldLayout>,
}

impl<'a> View<'a> {
    pub fn new(data: &'a [u8], layout: Rc<FieldLayout>) -> Self {
        View { data, layout }
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    primitive_getter!(get_u8, U8, u8, primitives::read_u8);
    primitive_getter!(get_i8, I8, i8, primitives::read_i8);
    primitive_getter!(get_u16, U16, u16, primitives::read_u16);
    primitive_getter!(get_i16, I16, i16, primitives::read_i16);
    primitive_getter!(get_u32, U32, u32, primitives::read_u32);
    primitive_getter!(get_i32, I32, i32, primitives::read_i32);
    primitive_getter!(get_u64, U64, u64, primitives::read_u64);
    primitive_getter!(get_i64, I64, i64, primitives::read_i64);
    primitive_getter!(get_f32, F32, f32, primitives::read_f32);
    primitive_getter!(get_f64, F64, f64, primitives::read_f64);
    primitive_getter!(get_bool, Bool, bool, primitives::read_bool);

    /// Reads an `enum` leaf's raw varint-encoded value.
    pub fn get_enum(&self, path: &str) -> Result<u64> {
        let field = self.layout.field(path)?;
        match field.field_type {
            SchemaType::Enum { .. } => varint::decode_u64(self.data, field.offset)
                .map(|(value, _)| value)
                .map_err(|_| Error::OutOfBounds {
                    offset: field.offset,
                    length: self.data.len(),
                }),
            ref other => Err(type_mismatch("enum", other)),
        }
    }

    /// Reads a `fixed data(n)` leaf's raw bytes.
    pub fn get_fixed_data(&self, path: &str) -> Result<&'a [u8]> {
        let field = self.layout.field(path)?;
        match field.field_type {
            SchemaType::FixedData(n) => {
                let end = field.offset + n as usize;
                if end > self.data.len() {
                    return Err(Error::OutOfBounds {
                        offset: field.offset,
                        length: self.data.len(),
                    });
                }
                Ok(&self.data[field.offset..end])
            }
            ref other => Err(type_mismatch("fixed_data", other)),
        }
    }
}

/// A read-write view over a borrowed byte region.
pub struct ViewMut<'a> {
    data: &'a mut [u8],
    layout: Rc<FieldLayout>,
}

impl<'a> ViewMut<'a> {
    pub fn new(data: &'a mut [u8], layout: Rc<FieldLayout>) -> Self {
        ViewMut { data, layout }
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    /// Borrows this view as read-only, e.g. to share `get_*` calls without
    /// duplicating dispatch logic.
    pub fn as_view(&self) -> View<'_> {
        View {
            data: self.data,
            layout: Rc::clone(&self.layout),
        }
    }

    pub fn get_u8(&self, path: &str) -> Result<u8> {
        self.as_view().get_u8(path)
    }

    pub fn get_u32(&self, path: &str) -> Result<u32> {
        self.as_view().get_u32(path)
    }

    primitive_setter!(set_u8, U8, u8, primitives::write_u8);
    primitive_setter!(set_i8, I8, i8, primitives::write_i8);
    primitive_setter!(set_u16, U16, u16, primitives::write_u16);
    primitive_setter!(set_i16, I16, i16, primitives::write_i16);
    primitive_setter!(set_u32, U32, u32, primitives::write_u32);
    primitive_setter!(set_i32, I32, i32, primitives::write_i32);
    primitive_setter!(set_u64, U64, u64, primitives::write_u64);
    primitive_setter!(set_i64, I64, i64, primitives::write_i64);
    primitive_setter!(set_f32, F32, f32, primitives::write_f32);
    primitive_setter!(set_f64, F64, f64, primitives::write_f64);
    primitive_setter!(set_bool, Bool, bool, primitives::write_bool);

    /// Writes a `fixed data(n)` leaf. The supplied slice must be exactly
    /// `n` bytes long.
    pub fn set_fixed_data(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let field = self.layout.field(path)?.clone();
        match field.field_type {
            SchemaType::FixedData(n) => {
                if bytes.len() != n as usize {
                    return Err(Error::InvalidValue(format!(
                        "fixed data length mismatch: expected {n}, got {}",
                        bytes.len()
                    )));
                }
                let end = field.offset + bytes.len();
                if end > self.data.len() {
                    return Err(Error::OutOfBounds {
                        offset: field.offset,
                        length: self.data.len(),
                    });
                }
                self.data[field.offset..end].copy_from_slice(bytes);
                Ok(())
            }
            ref other => Err(type_mismatch("fixed_data", other)),
        }
    }
}
