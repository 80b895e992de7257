//! # RADEON Core Types
//!
//! Fundamental type definitions used across the state tracker:
//! GPU offsets, sizes, typed handles, memory domains and chip families.

use core::fmt;
use core::marker::PhantomData;

use bitflags::bitflags;
use static_assertions::{assert_eq_size, const_assert};

// =============================================================================
// GPU ADDRESS
// =============================================================================

/// Offset in the GPU address space, resolved by the kernel through relocations
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct GpuAddr(u64);

impl GpuAddr {
    /// Create a new GPU address
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Get the raw u64 value
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Align up to boundary
    #[inline]
    pub const fn align_up(self, alignment: u64) -> Self {
        let mask = alignment - 1;
        Self((self.0 + mask) & !mask)
    }

    /// Offset by bytes
    #[inline]
    pub const fn offset(self, bytes: u64) -> Self {
        Self(self.0.wrapping_add(bytes))
    }

    /// Low 32 bits, as written into a packet dword
    #[inline]
    pub const fn lo(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Debug for GpuAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpuAddr(0x{:08x})", self.0)
    }
}

assert_eq_size!(GpuAddr, u64);

// =============================================================================
// BYTE SIZE
// =============================================================================

/// Size in bytes with helpers
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ByteSize(u64);

impl ByteSize {
    /// Zero bytes
    pub const ZERO: Self = Self(0);

    /// From bytes
    #[inline]
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// From KiB
    #[inline]
    pub const fn from_kib(kib: u64) -> Self {
        Self(kib * 1024)
    }

    /// From MiB
    #[inline]
    pub const fn from_mib(mib: u64) -> Self {
        Self(mib * 1024 * 1024)
    }

    /// As bytes
    #[inline]
    pub const fn as_bytes(self) -> u64 {
        self.0
    }

    /// Align up
    #[inline]
    pub const fn align_up(self, alignment: u64) -> Self {
        let mask = alignment - 1;
        Self((self.0 + mask) & !mask)
    }
}

impl fmt::Debug for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 1024 * 1024 && self.0 % (1024 * 1024) == 0 {
            write!(f, "{} MiB", self.0 / (1024 * 1024))
        } else if self.0 >= 1024 && self.0 % 1024 == 0 {
            write!(f, "{} KiB", self.0 / 1024)
        } else {
            write!(f, "{} B", self.0)
        }
    }
}

// =============================================================================
// TYPED HANDLE
// =============================================================================

/// Type-safe numeric handle
pub struct Handle<T> {
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Create a new handle
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Get the raw id
    #[inline]
    pub const fn id(self) -> u64 {
        self.id
    }
}

// Manual impls: derives would put bounds on T.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> core::hash::Hash for Handle<T> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

// =============================================================================
// MEMORY DOMAINS
// =============================================================================

bitflags! {
    /// GEM memory domains a buffer object may be read from or written to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Domain: u32 {
        /// System memory
        const CPU = 1 << 0;
        /// GART-mapped system memory
        const GTT = 1 << 1;
        /// On-board video memory
        const VRAM = 1 << 2;
    }
}

// =============================================================================
// CHIP FAMILY
// =============================================================================

/// Radeon chip generation handled by this driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipFamily {
    /// R600, RV610, RV630, RV670, RS780
    R600,
    /// RV770, RV730, RV710, RV740
    R700,
    /// Cedar, Redwood, Juniper, Cypress
    Evergreen,
}

impl ChipFamily {
    /// R700 and later program blending per color target
    pub const fn has_per_mrt_blend(self) -> bool {
        !matches!(self, Self::R600)
    }

    /// Evergreen moved the base-vertex location into a control constant
    pub const fn has_base_vertex_ctl(self) -> bool {
        matches!(self, Self::Evergreen)
    }

    /// Maximum texture units sampled by the fragment stage
    pub const fn max_texture_units(self) -> usize {
        match self {
            Self::R600 | Self::R700 => 16,
            Self::Evergreen => 18,
        }
    }
}

/// Bytes per command dword
pub const DWORD_BYTES: u32 = 4;

const_assert!(DWORD_BYTES as usize == core::mem::size_of::<u32>());
