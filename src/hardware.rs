//! Hardware peripheral descriptor data contract (spec.md §6.3).
//!
//! Consumer-facing only: an external register-map code generator is the
//! actual consumer of these shapes. The core neither builds nor interprets
//! them beyond offering the record types and the `MemoryRegionKind`
//! classifiers; nothing here is exercised by the schema/codec/view core.

use serde::{Deserialize, Serialize};

/// A memory access permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessKind {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// The kind of memory region a peripheral or field lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryRegionKind {
    Flash,
    SRAM,
    Peripheral,
    SystemControl,
    DMA,
    CCM,
}

impl MemoryRegionKind {
    /// Whether contents of this region can change independent of normal
    /// program flow (memory-mapped registers, DMA targets) and therefore
    /// must never be assumed stable across reads.
    pub fn is_volatile(self) -> bool {
        !matches!(self, MemoryRegionKind::Flash)
    }

    /// Whether a CPU data cache may safely hold a copy of this region.
    pub fn is_cacheable(self) -> bool {
        matches!(self, MemoryRegionKind::Flash | MemoryRegionKind::SRAM | MemoryRegionKind::CCM)
    }

    /// Whether instructions may be fetched from this region.
    pub fn is_executable(self) -> bool {
        matches!(self, MemoryRegionKind::Flash | MemoryRegionKind::SRAM | MemoryRegionKind::CCM)
    }
}

/// A single bit-field within a register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitFieldDescriptor {
    pub name: String,
    pub position: u32,
    pub width: u32,
    pub access: AccessKind,
}

/// A single named field within a peripheral's register layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub offset: u32,
    pub type_name: String,
    pub access: AccessKind,
    pub bit_fields: Vec<BitFieldDescriptor>,
    pub documentation: Option<String>,
}

/// The register layout of one peripheral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeripheralLayout {
    pub size: u32,
    pub alignment: u32,
    pub fields: Vec<FieldDescriptor>,
}

/// One memory-mapped instance of a peripheral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeripheralInstance {
    pub instance_name: String,
    pub base_address: u64,
}

/// A full peripheral descriptor: its instances, its layout, and the memory
/// region its instances live in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeripheralDescriptor {
    pub name: String,
    pub instances: Vec<PeripheralInstance>,
    pub layout: PeripheralLayout,
    pub memory_region: MemoryRegionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_is_non_volatile_cacheable_and_executable() {
        assert!(!MemoryRegionKind::Flash.is_volatile());
        assert!(MemoryRegionKind::Flash.is_cacheable());
        assert!(MemoryRegionKind::Flash.is_executable());
    }

    #[test]
    fn peripheral_region_is_volatile_and_not_cacheable() {
        assert!(MemoryRegionKind::Peripheral.is_volatile());
        assert!(!MemoryRegionKind::Peripheral.is_cacheable());
        assert!(!MemoryRegionKind::Peripheral.is_executable());
    }

    #[test]
    fn dma_region_is_not_cacheable_or_executable() {
        assert!(!MemoryRegionKind::DMA.is_cacheable());
        assert!(!MemoryRegionKind::DMA.is_executable());
    }
}
