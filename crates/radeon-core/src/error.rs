//! # RADEON Error Handling
//!
//! Error types for the state tracker.
//!
//! Two kinds of "failure" flow through the driver:
//! - [`FallbackReason`]: the hardware path cannot render this draw; the
//!   caller retries in software. This is policy, not a fault.
//! - [`Error`]: a real failure (submission, exhausted resources, misuse).

use core::fmt;

// =============================================================================
// RESULT TYPE
// =============================================================================

/// RADEON Result type alias
pub type Result<T> = core::result::Result<T, Error>;

// =============================================================================
// ERROR ENUM
// =============================================================================

/// RADEON unified error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Generic Errors
    // =========================================================================
    /// Invalid parameter provided
    InvalidParameter,
    /// Resource not found
    NotFound,
    /// Operation not supported on this hardware
    NotSupported,

    // =========================================================================
    // Command Stream Errors
    // =========================================================================
    /// Reservation can never fit, even in an empty command buffer
    ReservationTooLarge {
        /// Dwords requested
        requested: u32,
        /// Total command buffer capacity in dwords
        capacity: u32,
    },
    /// A batch wrote a different number of dwords than it reserved
    BatchMismatch {
        /// Dwords reserved by `begin_batch`
        reserved: u32,
        /// Dwords actually written
        written: u32,
    },
    /// Too many relocations in one command buffer
    RelocationOverflow,
    /// Kernel rejected the command buffer
    SubmissionFailed,

    // =========================================================================
    // Memory Errors
    // =========================================================================
    /// Out of memory
    OutOfMemory,
    /// Allocation request larger than any DMA buffer
    AllocationTooLarge,
    /// Alignment is zero or not a power of two
    InvalidAlignment,
    /// Access outside the bounds of a buffer object
    OutOfBounds,
    /// Referenced buffers do not fit in the GPU domains
    WorkingSetTooLarge,

    // =========================================================================
    // Render Errors
    // =========================================================================
    /// Draw must be handled by the software path
    Fallback(FallbackReason),
    /// Shader program could not be translated to microcode
    ShaderTranslationFailed,
    /// Fragment inputs exceed interpolator slots
    RoutingOverflow {
        /// Slots needed by the fragment program
        needed: u32,
        /// Slots available in hardware
        available: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Generic
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::NotFound => write!(f, "resource not found"),
            Self::NotSupported => write!(f, "operation not supported"),

            // Command stream
            Self::ReservationTooLarge { requested, capacity } => write!(
                f,
                "reservation of {} dwords exceeds command buffer capacity {}",
                requested, capacity
            ),
            Self::BatchMismatch { reserved, written } => write!(
                f,
                "batch reserved {} dwords but wrote {}",
                reserved, written
            ),
            Self::RelocationOverflow => write!(f, "relocation list full"),
            Self::SubmissionFailed => write!(f, "command submission failed"),

            // Memory
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::AllocationTooLarge => write!(f, "allocation larger than DMA buffer"),
            Self::InvalidAlignment => write!(f, "invalid alignment"),
            Self::OutOfBounds => write!(f, "buffer access out of bounds"),
            Self::WorkingSetTooLarge => write!(f, "buffer working set exceeds GPU domains"),

            // Render
            Self::Fallback(reason) => write!(f, "software fallback: {}", reason),
            Self::ShaderTranslationFailed => write!(f, "shader translation failed"),
            Self::RoutingOverflow { needed, available } => write!(
                f,
                "fragment inputs need {} interpolators, hardware has {}",
                needed, available
            ),
        }
    }
}

// =============================================================================
// FALLBACK REASONS
// =============================================================================

/// Why a draw call was rejected from the hardware path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackReason {
    /// Render mode is GL_SELECT or GL_FEEDBACK
    RenderMode,
    /// Two-sided stencil with different front/back reference values
    StencilTwoSideRefs,
    /// Point sprites requested
    PointSprite,
    /// Polygon stipple enabled
    PolygonStipple,
    /// Multisample enabled
    Multisample,
    /// Line smoothing with low-impact fallback off
    LineSmooth,
    /// Point smoothing with low-impact fallback off
    PointSmooth,
    /// Active vertex or fragment program failed to translate
    ShaderTranslation,
    /// Fragment inputs exceed interpolator slots
    RoutingOverflow,
    /// Buffer objects do not fit in the GPU domains
    WorkingSet,
    /// Batch cannot fit in a command buffer
    CommandBuffer,
    /// Primitive mode has no hardware encoding
    UnsupportedPrimitive,
    /// Vertex array type, size or stride the fetcher cannot read
    VertexFormat,
    /// Primitive run outside the index buffer or the index range
    PrimitiveRange,
}

impl FallbackReason {
    /// Feature-based fallbacks are decided from GL state alone; resource
    /// fallbacks are discovered while preparing the draw.
    pub const fn is_resource_exhaustion(self) -> bool {
        matches!(self, Self::WorkingSet | Self::CommandBuffer)
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::RenderMode => "render mode is not GL_RENDER",
            Self::StencilTwoSideRefs => "two-sided stencil with different refs",
            Self::PointSprite => "point sprites",
            Self::PolygonStipple => "polygon stipple",
            Self::Multisample => "multisample",
            Self::LineSmooth => "line smoothing",
            Self::PointSmooth => "point smoothing",
            Self::ShaderTranslation => "shader translation failed",
            Self::RoutingOverflow => "interpolator slots exhausted",
            Self::WorkingSet => "buffer working set too large",
            Self::CommandBuffer => "command buffer exhausted",
            Self::UnsupportedPrimitive => "unsupported primitive",
            Self::VertexFormat => "unsupported vertex format",
            Self::PrimitiveRange => "primitive range out of bounds",
        };
        f.write_str(text)
    }
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<FallbackReason> for Error {
    fn from(reason: FallbackReason) -> Self {
        Error::Fallback(reason)
    }
}

impl Error {
    /// Map an error onto the fallback it should trigger, if any
    pub const fn as_fallback(self) -> Option<FallbackReason> {
        match self {
            Self::Fallback(reason) => Some(reason),
            Self::ShaderTranslationFailed => Some(FallbackReason::ShaderTranslation),
            Self::RoutingOverflow { .. } => Some(FallbackReason::RoutingOverflow),
            Self::WorkingSetTooLarge => Some(FallbackReason::WorkingSet),
            Self::ReservationTooLarge { .. } => Some(FallbackReason::CommandBuffer),
            _ => None,
        }
    }
}
