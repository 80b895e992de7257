//! # RADEON Core
//!
//! Foundational types shared by every layer of the R600/R700 state tracker.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      radeon-core                            │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Error     │  │   Types     │  │     warn_once!      │  │
//! │  │ (Fallback,  │  │ (GpuAddr,   │  │  (per-callsite      │  │
//! │  │  Result)    │  │  Domain)    │  │   log throttle)     │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "std")]
extern crate std;

// =============================================================================
// MODULE EXPORTS
// =============================================================================

pub mod error;
pub mod types;
pub mod warn;

// Re-exports for convenience
pub use error::{Error, FallbackReason, Result};
pub use types::*;

#[doc(hidden)]
pub use log as __log;
