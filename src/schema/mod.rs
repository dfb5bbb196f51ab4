//! The schema model, its validator, and the size/compatibility analyzer
//! (spec.md §3-§5).

pub mod analyzer;
pub mod model;
pub mod validator;

pub use analyzer::{Compatibility, SizeInfo};
pub use model::{Encoding, EnumVariant, Schema, SchemaBuilder, SchemaType, StructField, UnionCase};
pub use validator::ValidationError;
