//! Size, alignment, and compatibility analysis over a [`Schema`]
//! (spec.md §3.4, §5).
//!
//! Sizes are memoized by type name the same way the teacher's
//! `TILTypeSizeSolver` memoizes by type index, with a "currently solving" set
//! standing in for its cycle guard — redundant here since the validator
//! already rejects cyclic schemas before an analyzer ever sees them, but kept
//! as a defensive backstop against a `Schema` built by some other path.

use std::collections::{HashMap, HashSet};

use crate::platform::{PlatformContext, TypeKind};
use crate::schema::model::{Encoding, Schema, SchemaType, StructField, UnionCase};

/// Maximum ULEB128 bytes for a union's 32-bit tag.
const UNION_TAG_MAX_BYTES: u64 = 5;

/// The encoded size range of a type. `max` is `None` when the type is
/// unbounded (a `List`, `Map`, or `string`/length-prefixed primitive with no
/// declared upper bound).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeInfo {
    pub min: u64,
    pub max: Option<u64>,
    pub is_fixed: bool,
}

impl SizeInfo {
    fn fixed(n: u64) -> Self {
        SizeInfo {
            min: n,
            max: Some(n),
            is_fixed: true,
        }
    }

    fn bounded(min: u64, max: u64) -> Self {
        SizeInfo {
            min,
            max: Some(max),
            is_fixed: min == max,
        }
    }

    fn unbounded(min: u64) -> Self {
        SizeInfo {
            min,
            max: None,
            is_fixed: false,
        }
    }

    fn add(self, other: SizeInfo) -> SizeInfo {
        SizeInfo {
            min: self.min + other.min,
            max: self.max.zip(other.max).map(|(a, b)| a + b),
            is_fixed: self.is_fixed && other.is_fixed,
        }
    }
}

fn round_up(value: u64, align: u64) -> u64 {
    if align <= 1 {
        return value;
    }
    value.div_ceil(align) * align
}

struct SizeSolver<'a> {
    schema: &'a Schema,
    platform: &'a dyn PlatformContext,
    solved: HashMap<String, SizeInfo>,
    solving: HashSet<String>,
}

impl<'a> SizeSolver<'a> {
    fn new(schema: &'a Schema, platform: &'a dyn PlatformContext) -> Self {
        Self {
            schema,
            platform,
            solved: HashMap::new(),
            solving: HashSet::new(),
        }
    }

    fn size_of_named(&mut self, name: &str) -> SizeInfo {
        if let Some(info) = self.solved.get(name) {
            return *info;
        }
        if !self.solving.insert(name.to_string()) {
            // A cycle slipped past validation; treat as unbounded rather
            // than recursing forever.
            return SizeInfo::unbounded(0);
        }
        let ty = self.schema.get(name);
        let info = match ty {
            Some(ty) => self.size_of(ty),
            None => SizeInfo::unbounded(0),
        };
        self.solving.remove(name);
        self.solved.insert(name.to_string(), info);
        info
    }

    fn size_of(&mut self, ty: &SchemaType) -> SizeInfo {
        match ty {
            SchemaType::Primitive(kind, Encoding::Fixed) => {
                SizeInfo::fixed(self.platform.resolve_size(*kind) as u64)
            }
            SchemaType::Primitive(TypeKind::Void, _) => SizeInfo::fixed(0),
            SchemaType::Primitive(_, Encoding::VarInt) => SizeInfo::bounded(1, 10),
            SchemaType::Primitive(_, Encoding::LengthPrefixed) => SizeInfo::unbounded(1),
            SchemaType::FixedData(n) => SizeInfo::fixed(*n as u64),
            SchemaType::Enum { .. } => SizeInfo::bounded(1, 10),
            SchemaType::Optional(inner) => {
                let inner_size = self.size_of(inner);
                SizeInfo {
                    min: 1,
                    max: inner_size.max.map(|m| 1 + m),
                    is_fixed: false,
                }
            }
            SchemaType::List(inner) => {
                let _ = self.size_of(inner);
                SizeInfo::unbounded(1)
            }
            SchemaType::FixedList(inner, n) => {
                let element = self.size_of(inner);
                let n = *n as u64;
                SizeInfo {
                    min: element.min * n,
                    max: element.max.map(|m| m * n),
                    is_fixed: element.is_fixed,
                }
            }
            SchemaType::Map(key, value) => {
                let _ = self.size_of(key);
                let _ = self.size_of(value);
                SizeInfo::unbounded(1)
            }
            SchemaType::Union(cases) => self.size_of_union(cases),
            SchemaType::Struct(fields) => self.size_of_struct(fields),
            SchemaType::TypeRef(name) => self.size_of_named(name),
        }
    }

    /// Fields are laid out in declaration order with padding inserted before
    /// each field to its own alignment, and the total rounded up to the
    /// struct's own alignment (spec.md §4.F). Mirrors `view::walk_fields`'s
    /// cursor/`round_up` treatment of the same schema shape, tracked
    /// separately for the min and max ends of each field's size range.
    fn size_of_struct(&mut self, fields: &[StructField]) -> SizeInfo {
        let mut min_cursor: u64 = 0;
        let mut max_cursor: Option<u64> = Some(0);
        let mut is_fixed = true;
        let mut struct_align: u32 = 1;

        for field in fields {
            let align = align_of(self.schema, self.platform, &field.field_type);
            struct_align = struct_align.max(align);
            let align = align as u64;
            min_cursor = round_up(min_cursor, align);
            max_cursor = max_cursor.map(|m| round_up(m, align));

            let field_size = self.size_of(&field.field_type);
            min_cursor += field_size.min;
            max_cursor = max_cursor.zip(field_size.max).map(|(m, f)| m + f);
            is_fixed = is_fixed && field_size.is_fixed;
        }

        min_cursor = round_up(min_cursor, struct_align as u64);
        max_cursor = max_cursor.map(|m| round_up(m, struct_align as u64));
        SizeInfo {
            min: min_cursor,
            max: max_cursor,
            is_fixed,
        }
    }

    fn size_of_union(&mut self, cases: &[UnionCase]) -> SizeInfo {
        let mut min_payload = None;
        let mut max_payload = Some(0u64);
        for case in cases {
            let payload = self.size_of(&case.payload);
            min_payload = Some(match min_payload {
                None => payload.min,
                Some(current) => current.min(payload.min),
            });
            max_payload = max_payload.zip(payload.max).map(|(a, b)| a.max(b));
        }
        let min_payload = min_payload.unwrap_or(0);
        SizeInfo {
            min: 1 + min_payload,
            max: max_payload.map(|m| UNION_TAG_MAX_BYTES + m),
            is_fixed: false,
        }
    }
}

/// The encoded size range of `ty` within `schema`, under `platform`'s
/// natural-size table.
pub fn size_of(schema: &Schema, platform: &dyn PlatformContext, ty: &SchemaType) -> SizeInfo {
    SizeSolver::new(schema, platform).size_of(ty)
}

/// The required alignment of `ty` within `schema`.
pub fn align_of(schema: &Schema, platform: &dyn PlatformContext, ty: &SchemaType) -> u32 {
    match ty {
        SchemaType::Primitive(kind, Encoding::Fixed) => platform.resolve_align(*kind),
        SchemaType::Primitive(_, _) => 1,
        SchemaType::FixedData(_) => 1,
        SchemaType::Enum { base_kind, .. } => platform.resolve_align(*base_kind),
        SchemaType::Optional(_) | SchemaType::List(_) | SchemaType::Map(_, _) | SchemaType::Union(_) => 1,
        SchemaType::FixedList(inner, _) => align_of(schema, platform, inner),
        SchemaType::Struct(fields) => fields
            .iter()
            .map(|f| align_of(schema, platform, &f.field_type))
            .max()
            .unwrap_or(1),
        SchemaType::TypeRef(name) => match schema.get(name) {
            Some(resolved) => align_of(schema, platform, resolved),
            None => 1,
        },
    }
}

/// The result of comparing two versions of a schema's root type, from the
/// perspective of "can a reader built against one version decode data
/// written by the other."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// Identical wire shape; either version can read the other's data.
    FullyCompatible,
    /// `new` can read data written by `old`, but not vice versa.
    BackwardCompatible,
    /// `old` can read data written by `new`, but not vice versa.
    ForwardCompatible,
    Incompatible,
}

/// Classifies the compatibility of `new`'s root type relative to `old`'s.
///
/// Only the root type's immediate shape is compared (struct field sequence,
/// union tag set); nested named types are compared structurally by
/// resolving one level of `TypeRef`, not recursively renamed or diffed.
pub fn check_compatibility(old: &Schema, new: &Schema) -> Compatibility {
    let old_root = old.root_type();
    let new_root = new.root_type();

    match (old_root, new_root) {
        (SchemaType::Struct(old_fields), SchemaType::Struct(new_fields)) => {
            compare_struct(old_fields, new_fields)
        }
        (SchemaType::Union(old_cases), SchemaType::Union(new_cases)) => {
            compare_union(old_cases, new_cases)
        }
        (a, b) if a == b => Compatibility::FullyCompatible,
        _ => Compatibility::Incompatible,
    }
}

/// Both roots `Struct`: identical prefix (same names, same positions,
/// equal types) in both required; lengths equal is `FullyCompatible`,
/// `new` strictly longer (fields only appended) is `BackwardCompatible`,
/// anything else (prefix mismatch, or fields removed) is `Incompatible`.
fn compare_struct(
    old_fields: &[crate::schema::model::StructField],
    new_fields: &[crate::schema::model::StructField],
) -> Compatibility {
    let common = old_fields.len().min(new_fields.len());
    let prefix_matches = old_fields[..common]
        .iter()
        .zip(new_fields[..common].iter())
        .all(|(a, b)| a.name == b.name && a.field_type == b.field_type);

    if !prefix_matches {
        return Compatibility::Incompatible;
    }
    match old_fields.len().cmp(&new_fields.len()) {
        std::cmp::Ordering::Equal => Compatibility::FullyCompatible,
        std::cmp::Ordering::Less => Compatibility::BackwardCompatible,
        std::cmp::Ordering::Greater => Compatibility::Incompatible,
    }
}

fn compare_union(old_cases: &[UnionCase], new_cases: &[UnionCase]) -> Compatibility {
    let matches_shared_tags = old_cases.iter().all(|old_case| {
        match new_cases.iter().find(|new_case| new_case.tag == old_case.tag) {
            Some(new_case) => new_case.payload == old_case.payload,
            None => true,
        }
    });
    if !matches_shared_tags {
        return Compatibility::Incompatible;
    }

    let old_tags_covered_by_new = old_cases
        .iter()
        .all(|o| new_cases.iter().any(|n| n.tag == o.tag));
    let new_tags_covered_by_old = new_cases
        .iter()
        .all(|n| old_cases.iter().any(|o| o.tag == n.tag));

    match (old_tags_covered_by_new, new_tags_covered_by_old) {
        (true, true) => Compatibility::FullyCompatible,
        (true, false) => Compatibility::BackwardCompatible,
        (false, true) => Compatibility::ForwardCompatible,
        (false, false) => Compatibility::Incompatible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HostPlatform;
    use crate::schema::model::{SchemaBuilder, StructField};

    fn platform() -> HostPlatform {
        HostPlatform::default()
    }

    #[test]
    fn fixed_primitive_is_exact_size() {
        let schema = SchemaBuilder::new()
            .insert_type("Root", SchemaType::Primitive(TypeKind::U32, Encoding::Fixed))
            .set_root("Root")
            .validate()
            .unwrap();
        let info = size_of(&schema, &platform(), schema.root_type());
        assert_eq!(info, SizeInfo::fixed(4));
    }

    #[test]
    fn varint_primitive_is_bounded_not_fixed() {
        let schema = SchemaBuilder::new()
            .insert_type("Root", SchemaType::Primitive(TypeKind::U64, Encoding::VarInt))
            .set_root("Root")
            .validate()
            .unwrap();
        let info = size_of(&schema, &platform(), schema.root_type());
        assert!(!info.is_fixed);
        assert_eq!(info.min, 1);
        assert_eq!(info.max, Some(10));
    }

    #[test]
    fn list_is_unbounded() {
        let schema = SchemaBuilder::new()
            .insert_type(
                "Root",
                SchemaType::List(Box::new(SchemaType::Primitive(TypeKind::U8, Encoding::Fixed))),
            )
            .set_root("Root")
            .validate()
            .unwrap();
        let info = size_of(&schema, &platform(), schema.root_type());
        assert_eq!(info.max, None);
        assert_eq!(info.min, 1);
    }

    #[test]
    fn fixed_list_multiplies_element_size() {
        let schema = SchemaBuilder::new()
            .insert_type(
                "Root",
                SchemaType::FixedList(
                    Box::new(SchemaType::Primitive(TypeKind::U32, Encoding::Fixed)),
                    4,
                ),
            )
            .set_root("Root")
            .validate()
            .unwrap();
        let info = size_of(&schema, &platform(), schema.root_type());
        assert_eq!(info, SizeInfo::fixed(16));
    }

    #[test]
    fn struct_size_pads_fields_and_rounds_up_to_struct_alignment() {
        let schema = SchemaBuilder::new()
            .insert_type(
                "Root",
                SchemaType::Struct(vec![
                    StructField {
                        name: "a".to_string(),
                        field_type: SchemaType::Primitive(TypeKind::U8, Encoding::Fixed),
                    },
                    StructField {
                        name: "b".to_string(),
                        field_type: SchemaType::Primitive(TypeKind::U32, Encoding::Fixed),
                    },
                ]),
            )
            .set_root("Root")
            .validate()
            .unwrap();
        let info = size_of(&schema, &platform(), schema.root_type());
        // 1 byte for `a`, 3 bytes padding to align `b` at offset 4, 4 bytes
        // for `b`: total 8, already a multiple of the struct's alignment (4).
        assert_eq!(info, SizeInfo::fixed(8));
    }

    fn struct_schema(fields: Vec<StructField>) -> Schema {
        SchemaBuilder::new()
            .insert_type("Root", SchemaType::Struct(fields))
            .set_root("Root")
            .validate()
            .unwrap()
    }

    #[test]
    fn identical_structs_are_fully_compatible() {
        let a = struct_schema(vec![StructField {
            name: "x".to_string(),
            field_type: SchemaType::Primitive(TypeKind::U8, Encoding::Fixed),
        }]);
        let b = struct_schema(vec![StructField {
            name: "x".to_string(),
            field_type: SchemaType::Primitive(TypeKind::U8, Encoding::Fixed),
        }]);
        assert_eq!(check_compatibility(&a, &b), Compatibility::FullyCompatible);
    }

    #[test]
    fn appending_a_field_is_backward_compatible_scenario_s8() {
        // S8: old struct {a: u32}, new struct {a: u32, b: u8}.
        let old = struct_schema(vec![StructField {
            name: "a".to_string(),
            field_type: SchemaType::Primitive(TypeKind::U32, Encoding::Fixed),
        }]);
        let new = struct_schema(vec![
            StructField {
                name: "a".to_string(),
                field_type: SchemaType::Primitive(TypeKind::U32, Encoding::Fixed),
            },
            StructField {
                name: "b".to_string(),
                field_type: SchemaType::Primitive(TypeKind::U8, Encoding::Fixed),
            },
        ]);
        assert_eq!(
            check_compatibility(&old, &new),
            Compatibility::BackwardCompatible
        );
        assert_eq!(check_compatibility(&new, &old), Compatibility::Incompatible);
    }

    #[test]
    fn changing_a_field_type_is_incompatible() {
        let old = struct_schema(vec![StructField {
            name: "x".to_string(),
            field_type: SchemaType::Primitive(TypeKind::U8, Encoding::Fixed),
        }]);
        let new = struct_schema(vec![StructField {
            name: "x".to_string(),
            field_type: SchemaType::Primitive(TypeKind::U32, Encoding::Fixed),
        }]);
        assert_eq!(check_compatibility(&old, &new), Compatibility::Incompatible);
    }
}
