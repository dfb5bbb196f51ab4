#![forbid(unsafe_code)]

//! `barewire` is a schema-driven implementation of the BARE binary wire
//! format: a schema model and validator, a size/alignment/compatibility
//! analyzer, a wire codec (owned writer, borrowed-slice reader), and a
//! capability-typed view over byte buffers backed by a struct's precomputed
//! field layout.
//!
//! The crate is split along those lines:
//!
//! - [`schema`] — the type algebra ([`schema::SchemaType`]), the additive
//!   builder ([`schema::SchemaBuilder`]), the two-phase validator
//!   ([`schema::validator`]), and the size/alignment/compatibility analyzer
//!   ([`schema::analyzer`]).
//! - [`codec`] — [`codec::Writer`] and [`codec::Reader`], one method per wire
//!   shape. Neither is self-describing; the caller picks the method matching
//!   the declared [`schema::SchemaType`].
//! - [`view`] — [`view::View`] and [`view::ViewMut`], read-only and
//!   read-write accessors over a byte buffer addressed by dotted field path.
//! - [`platform`] — the [`platform::PlatformContext`] trait used to resolve
//!   primitive size and alignment, and the host's own implementation.
//! - [`hardware`] — peripheral/register descriptor records consumed by an
//!   external code generator, not by the core.
//!
//! [`error::Error`] is the single error type returned across all of the
//! above.

pub mod codec;
pub mod error;
pub mod hardware;
pub mod platform;
pub mod primitives;
pub mod schema;
pub mod utf8;
pub mod varint;
pub mod view;

pub use codec::{Reader, Writer};
pub use error::{Error, Result};
pub use platform::{HostPlatform, PlatformContext, TypeKind};
pub use schema::{Compatibility, Schema, SchemaBuilder, SchemaType, SizeInfo};
pub use view::{View, ViewMut};
