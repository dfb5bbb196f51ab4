//! The wire codec (spec.md §4.G): a growable-buffer writer and a
//! borrowed-slice reader, one method per wire shape.

pub mod reader;
pub mod writer;

pub use reader::Reader;
pub use writer::Writer;
