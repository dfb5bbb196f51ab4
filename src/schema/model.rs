//! Schema model (spec.md §3.2, §4.D).
//!
//! Construction is purely additive: add a named type, set the root. There
//! is no mutation API beyond insertion; inserting under an existing name
//! overwrites it. The model is language-agnostic and does not depend on
//! reflection — it is a plain algebraic data type, grounded the same way
//! the teacher's `til::Type`/`TypeRaw` split separates "what was read off
//! the wire" from "the validated, owned representation a caller programs
//! against".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::platform::TypeKind;
use crate::schema::validator::{self, ValidationError};

/// How a primitive value is represented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    /// The platform's natural fixed-width little-endian representation.
    Fixed,
    /// ULEB128 (zigzag for signed kinds).
    VarInt,
    /// A varint byte-count followed by that many payload bytes.
    LengthPrefixed,
}

/// A single named union case: a 32-bit tag and its payload type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionCase {
    pub tag: u32,
    pub payload: SchemaType,
}

/// An ordered struct field: `(name, type)`. Field order is part of the
/// type's identity (spec.md §3.2) and must never be reordered by any
/// operation in this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub field_type: SchemaType,
}

/// A named integer constant backed by an integer kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    pub value: u64,
}

/// The tagged variant of every representable BARE type (spec.md §3.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaType {
    Primitive(TypeKind, Encoding),
    /// Exactly `n` bytes, no length prefix.
    FixedData(u32),
    Enum {
        base_kind: TypeKind,
        variants: Vec<EnumVariant>,
    },
    Optional(Box<SchemaType>),
    List(Box<SchemaType>),
    FixedList(Box<SchemaType>, u32),
    Map(Box<SchemaType>, Box<SchemaType>),
    Union(Vec<UnionCase>),
    Struct(Vec<StructField>),
    /// A named reference resolved in the owning schema.
    TypeRef(String),
}

impl SchemaType {
    /// A short, human-readable name for this type's constructor, used in
    /// error messages (`TypeMismatch`, validator diagnostics).
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaType::Primitive(_, _) => "primitive",
            SchemaType::FixedData(_) => "fixed_data",
            SchemaType::Enum { .. } => "enum",
            SchemaType::Optional(_) => "optional",
            SchemaType::List(_) => "list",
            SchemaType::FixedList(_, _) => "fixed_list",
            SchemaType::Map(_, _) => "map",
            SchemaType::Union(_) => "union",
            SchemaType::Struct(_) => "struct",
            SchemaType::TypeRef(_) => "type_ref",
        }
    }
}

/// A validated, immutable schema: a name → type map plus a designated root.
///
/// Schemas are values. They are built additively via [`SchemaBuilder`],
/// validated exactly once, and are immutable from then on — there is no API
/// that could mutate a `Schema` after a derived cache (an analyzer's size
/// table, a view's field-offset map) has been computed from it, which is
/// how the "mutating after derived caches exist is undefined behavior"
/// lifecycle rule (spec.md §3.5) is prevented by construction rather than
/// documented as a caller obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    types: HashMap<String, SchemaType>,
    root: String,
}

impl Schema {
    /// The designated root type name.
    pub fn root_name(&self) -> &str {
        &self.root
    }

    /// The root type itself. Always present: a `Schema` cannot be
    /// constructed (via [`SchemaBuilder::validate`]) unless its root
    /// resolves.
    pub fn root_type(&self) -> &SchemaType {
        self.types.get(&self.root).expect("root resolves by construction")
    }

    /// Looks up a named type.
    pub fn get(&self, name: &str) -> Option<&SchemaType> {
        self.types.get(name)
    }

    /// Iterates over every named type in the schema.
    pub fn types(&self) -> impl Iterator<Item = (&str, &SchemaType)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolves a `TypeRef` by name, or any other type passed through
    /// unchanged. Used by the analyzer and validator to walk through
    /// references without the caller needing to special-case them.
    pub fn resolve<'a>(&'a self, ty: &'a SchemaType) -> Option<&'a SchemaType> {
        match ty {
            SchemaType::TypeRef(name) => self.types.get(name),
            other => Some(other),
        }
    }
}

/// An additive builder for a [`Schema`]. Insertion only; no API removes or
/// mutates a previously-inserted type except by overwriting its name.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    types: HashMap<String, SchemaType>,
    root: Option<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or overwrites) a named type.
    pub fn insert_type(mut self, name: impl Into<String>, ty: SchemaType) -> Self {
        self.types.insert(name.into(), ty);
        self
    }

    /// Sets the designated root type name.
    pub fn set_root(mut self, name: impl Into<String>) -> Self {
        self.root = Some(name.into());
        self
    }

    /// Validates the accumulated types and root, consuming the builder.
    ///
    /// Errors are accumulated (batch), not fail-fast: the validator walks
    /// every defined type and returns the complete set of violations rather
    /// than stopping at the first one.
    pub fn validate(self) -> Result<Schema, Vec<ValidationError>> {
        let Some(root) = self.root else {
            return Err(vec![ValidationError::UndefinedType(
                "<no root set>".to_string(),
            )]);
        };
        let schema = Schema {
            types: self.types,
            root,
        };
        validator::validate(&schema)?;
        Ok(schema)
    }

    /// Builds a `Schema` without running the validator. Exists so the
    /// validator's own tests can construct deliberately invalid schemas to
    /// validate; not exported outside the crate.
    pub(crate) fn into_unchecked(self) -> Schema {
        Schema {
            types: self.types,
            root: self.root.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_fixed() -> SchemaType {
        SchemaType::Primitive(TypeKind::U32, Encoding::Fixed)
    }

    #[test]
    fn builder_insert_overwrites_same_name() {
        let schema = SchemaBuilder::new()
            .insert_type("Root", u32_fixed())
            .insert_type("Root", SchemaType::Primitive(TypeKind::U8, Encoding::Fixed))
            .set_root("Root")
            .validate()
            .unwrap();
        assert_eq!(schema.get("Root"), Some(&SchemaType::Primitive(TypeKind::U8, Encoding::Fixed)));
    }

    #[test]
    fn missing_root_is_rejected() {
        let result = SchemaBuilder::new().insert_type("A", u32_fixed()).validate();
        assert!(result.is_err());
    }

    #[test]
    fn resolve_passes_through_non_ref_types() {
        let schema = SchemaBuilder::new()
            .insert_type("Root", u32_fixed())
            .set_root("Root")
            .validate()
            .unwrap();
        assert_eq!(schema.resolve(&u32_fixed()), Some(&u32_fixed()));
    }
}
