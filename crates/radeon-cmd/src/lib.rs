//! # RADEON Command System
//!
//! PM4 packet encoding, the bounded command buffer, relocations and
//! submission to the kernel.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                    Command Submission Pipeline                    │
//! │                                                                   │
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐    │
//! │  │    Batch     │    │   Command    │    │    Submitter     │    │
//! │  │ (reserve N,  │───▶│   Stream     │───▶│  (kernel CS      │    │
//! │  │  write N)    │    │ (+ relocs)   │    │   ioctl)         │    │
//! │  └──────────────┘    └──────┬───────┘    └────────┬─────────┘    │
//! │                             │                     │              │
//! │                      ┌──────▼───────┐    ┌────────▼─────────┐    │
//! │                      │  Submit Ring │◀───│  Fence values    │    │
//! │                      │  (in flight) │    │                  │    │
//! │                      └──────────────┘    └──────────────────┘    │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submission Flow
//!
//! 1. A caller reserves N dwords with [`CommandStream::begin_batch`]
//! 2. If the buffer cannot hold them it is submitted and a new one begun
//! 3. The caller writes exactly N dwords, relocations included
//! 4. On flush the words and relocation list go to the [`Submitter`]
//! 5. The returned fence retires the submission and its buffers

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod cmdbuf;
pub mod packet;
pub mod regs;
pub mod reloc;
pub mod ring;
pub mod stream;
pub mod submit;

// Re-exports
pub use cmdbuf::{CmdBufConfig, CommandBuffer};
pub use packet::{Opcode, Packet3, RegSpace, packet0, packet3, packet_header};
pub use reloc::{RelocList, Relocation};
pub use ring::{RingStats, SubmitRing};
pub use regs::{Field, cp::SyncAction};
pub use stream::{Batch, CommandStream, StreamStats};
pub use submit::{CaptureLog, CaptureSubmitter, Submission, Submitter};
