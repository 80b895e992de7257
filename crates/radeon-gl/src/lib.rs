//! # RADEON R600 OpenGL Backend
//!
//! Translates OpenGL state into cached register atoms and submits draws for
//! R600, R700 and Evergreen class GPUs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        R600 GL Backend                          │
//! │                                                                 │
//! │  ┌─────────────────┐  ┌───────────────┐  ┌──────────────────┐  │
//! │  │ DriverFunctions │─▶│   GlState     │─▶│   Translators    │  │
//! │  │ (glBlendFunc,   │  │  (mirror of   │  │ (blend, depth,   │  │
//! │  │  glDraw*, ...)  │  │   GL state)   │  │  raster, tex)    │  │
//! │  └────────┬────────┘  └───────────────┘  └────────┬─────────┘  │
//! │           │                                       ▼            │
//! │  ┌────────▼────────┐  ┌───────────────┐  ┌──────────────────┐  │
//! │  │  Render Engine  │─▶│ Render Stage  │  │   StateCache     │  │
//! │  │ (fallbacks,     │  │ (per-chip     │  │ (register atoms, │  │
//! │  │  space, DMA)    │  │  draw packets)│  │  dirty tracking) │  │
//! │  └────────┬────────┘  └───────┬───────┘  └────────┬─────────┘  │
//! │           └───────────────────┼───────────────────┘            │
//! │                               ▼                                 │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              CommandStream (radeon-cmd)                 │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! State changes only touch the register cache. A draw emits the dirty
//! atoms, then the primitive packets, all inside one space reservation so
//! a flush can never split state from the draw that depends on it.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// =============================================================================
// STATE
// =============================================================================

pub mod enums;
pub mod state;
pub mod types;

pub mod atoms;
pub mod encode;
pub mod translate;

// =============================================================================
// RENDERING
// =============================================================================

pub mod config;
pub mod context;
pub mod fallback;
pub mod functions;
pub mod prim;
pub mod program;
pub mod render;
pub mod stage;
pub mod tcl;
pub mod vertex;

// Re-exports
pub use atoms::{Atom, AtomKind, RegSeq, StateCache};
pub use config::DriverConfig;
pub use context::R600Context;
pub use functions::DriverFunctions;
pub use prim::Primitive;
pub use program::{ProgramId, ProgramIo, ProgramKind, ShaderProgram};
pub use render::{DrawCall, DrawOutcome, DrawStats, RenderStats};
pub use stage::{PacketCosts, RenderStage, StageStatus, stage_for};
pub use state::{GlState, NewState};
pub use tcl::{TclMode, TclState};
pub use vertex::{DataSource, IndexBuffer, VertexArray};
