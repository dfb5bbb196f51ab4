//! Host type-kind bridge (spec.md §3.1, §6.2).
//!
//! The schema defers its primitive vocabulary to an externally-supplied
//! [`TypeKind`] enumeration and a [`PlatformContext`] that answers the two
//! questions the core never hard-codes: natural byte size and natural byte
//! alignment. Pointer-sized integers vary per target, which is why this is a
//! trait rather than a table of constants.
//!
//! Grounded on the teacher's `TILSectionHeader` (`til/section.rs`), which
//! plays the same role for the IDA type system: an externally supplied
//! record answering "how big is `int`/`bool`/`long double` on this target".

/// The BARE primitive kinds the schema model can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TypeKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    /// unit/void — legal only as a union case payload (spec.md §3.3 rule 3).
    Void,
    /// UTF-8 string.
    Str,
}

/// Answers the two platform-dependent questions the core needs about a
/// [`TypeKind`]: its natural size and its natural alignment, in bytes.
pub trait PlatformContext {
    fn resolve_size(&self, kind: TypeKind) -> u32;
    fn resolve_align(&self, kind: TypeKind) -> u32;
}

/// A concrete [`PlatformContext`] describing one target's natural sizes.
///
/// `pointer_size`/`pointer_align` are carried even though no [`TypeKind`]
/// variant is itself a pointer type (the core has no pointer kind per
/// spec.md §3.1); they are kept here because `word_size` and pointer size
/// commonly diverge (e.g. an ILP32 ABI on a 64-bit word CPU) and a caller
/// wiring this crate into a larger system needs both to answer
/// target-specific questions that sit just outside the BARE type universe,
/// such as whether a `FixedData` blob represents a raw pointer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPlatform {
    pub word_size: u32,
    pub pointer_size: u32,
    pub pointer_align: u32,
}

impl HostPlatform {
    /// The common LP64 target: 8-byte word, 8-byte pointer.
    pub const fn lp64() -> Self {
        Self {
            word_size: 8,
            pointer_size: 8,
            pointer_align: 8,
        }
    }

    /// The common ILP32 target: 4-byte word, 4-byte pointer.
    pub const fn ilp32() -> Self {
        Self {
            word_size: 4,
            pointer_size: 4,
            pointer_align: 4,
        }
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::lp64()
    }
}

impl PlatformContext for HostPlatform {
    fn resolve_size(&self, kind: TypeKind) -> u32 {
        match kind {
            TypeKind::U8 | TypeKind::I8 | TypeKind::Bool => 1,
            TypeKind::U16 | TypeKind::I16 => 2,
            TypeKind::U32 | TypeKind::I32 | TypeKind::F32 => 4,
            TypeKind::U64 | TypeKind::I64 | TypeKind::F64 => 8,
            TypeKind::Void => 0,
            // strings have no fixed natural size; length is data-dependent.
            TypeKind::Str => 0,
        }
    }

    fn resolve_align(&self, kind: TypeKind) -> u32 {
        match kind {
            TypeKind::U8 | TypeKind::I8 | TypeKind::Bool | TypeKind::Void | TypeKind::Str => 1,
            TypeKind::U16 | TypeKind::I16 => 2,
            TypeKind::U32 | TypeKind::I32 | TypeKind::F32 => 4,
            TypeKind::U64 | TypeKind::I64 | TypeKind::F64 => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lp64_sizes() {
        let ctx = HostPlatform::lp64();
        assert_eq!(ctx.resolve_size(TypeKind::U64), 8);
        assert_eq!(ctx.resolve_align(TypeKind::U64), 8);
        assert_eq!(ctx.resolve_size(TypeKind::U8), 1);
    }

    #[test]
    fn default_is_lp64() {
        assert_eq!(HostPlatform::default(), HostPlatform::lp64());
    }

    #[test]
    fn void_has_zero_size_one_align() {
        let ctx = HostPlatform::lp64();
        assert_eq!(ctx.resolve_size(TypeKind::Void), 0);
        assert_eq!(ctx.resolve_align(TypeKind::Void), 1);
    }
}
