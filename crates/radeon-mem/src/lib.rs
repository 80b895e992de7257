//! # RADEON Memory Management
//!
//! Buffer objects, the rotating DMA region pool, and working-set accounting.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     RADEON Memory System                        │
//! │                                                                 │
//! │  ┌─────────────────┐  ┌───────────────┐  ┌──────────────────┐  │
//! │  │   DMA Manager   │  │ Buffer Object │  │  Working Set     │  │
//! │  │ (rotating pool, │─▶│  (Arc-shared, │◀─│  (space check    │  │
//! │  │  bump regions)  │  │  scoped map)  │  │   per domain)    │  │
//! │  └─────────────────┘  └───────┬───────┘  └──────────────────┘  │
//! │                               │                                 │
//! │  ┌────────────────────────────┴────────────────────────────┐   │
//! │  │          BufferManager (kernel GEM interface)           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Buffer objects are shared between the CPU-side tracker and pending
//! command buffers; a BO lives as long as its longest holder.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bo;
pub mod dma;
pub mod tracker;

// Re-exports
pub use bo::{Bo, BoId, BufferManager, BufferObject, HostBufferManager, MappedBo};
pub use dma::{DmaConfig, DmaManager, DmaRegion, DmaStats};
pub use tracker::{BoTracker, MemoryLimits, TrackerStats, WorkingSet};
