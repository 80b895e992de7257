//! # PM4 Packets
//!
//! Command processor packet headers and register-space addressing.
//!
//! ```text
//! type 0:  [31:30]=0  [29:16]=count-1  [15:0]=register >> 2
//! type 3:  [31:30]=3  [29:16]=count-1  [15:8]=opcode  [7:0]=0
//! ```

use radeon_core::{Error, Result};
use static_assertions::const_assert_eq;

// =============================================================================
// OPCODES
// =============================================================================

/// Type-3 packet opcodes used by the state tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// No operation, also carries relocation indices
    Nop = 0x10,
    /// Select 16 or 32-bit indices
    IndexType = 0x2A,
    /// Draw with indices fetched from memory
    DrawIndex = 0x2B,
    /// Draw with auto-generated indices
    DrawIndexAuto = 0x2D,
    /// Draw with indices embedded in the packet
    DrawIndexImmd = 0x2E,
    /// Instance count for the following draw
    NumInstances = 0x2F,
    /// Flush/invalidate caches for a surface range
    SurfaceSync = 0x43,
    /// Write a pipeline event
    EventWrite = 0x46,
    /// Config register write
    SetConfigReg = 0x68,
    /// Context register write
    SetContextReg = 0x69,
    /// ALU constant write
    SetAluConst = 0x6A,
    /// Boolean constant write
    SetBoolConst = 0x6B,
    /// Loop constant write
    SetLoopConst = 0x6C,
    /// Texture or vertex fetch resource write
    SetResource = 0x6D,
    /// Sampler write
    SetSampler = 0x6E,
    /// Control constant write
    SetCtlConst = 0x6F,
}

impl Opcode {
    /// Look up an opcode by its encoded value
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0x10 => Self::Nop,
            0x2A => Self::IndexType,
            0x2B => Self::DrawIndex,
            0x2D => Self::DrawIndexAuto,
            0x2E => Self::DrawIndexImmd,
            0x2F => Self::NumInstances,
            0x43 => Self::SurfaceSync,
            0x46 => Self::EventWrite,
            0x68 => Self::SetConfigReg,
            0x69 => Self::SetContextReg,
            0x6A => Self::SetAluConst,
            0x6B => Self::SetBoolConst,
            0x6C => Self::SetLoopConst,
            0x6D => Self::SetResource,
            0x6E => Self::SetSampler,
            0x6F => Self::SetCtlConst,
            _ => return None,
        })
    }
}

// =============================================================================
// HEADERS
// =============================================================================

/// Largest count a header can carry
pub const MAX_PACKET_COUNT: u32 = 0x3FFF;

/// Type-0 header: `count` consecutive register writes starting at `reg`
#[inline]
pub const fn packet0(reg: u32, count: u32) -> u32 {
    ((count & MAX_PACKET_COUNT) << 16) | ((reg >> 2) & 0xFFFF)
}

/// Type-3 header with a raw count field (payload dwords minus one)
#[inline]
pub const fn packet3(op: Opcode, count: u32) -> u32 {
    (3 << 30) | ((count & MAX_PACKET_COUNT) << 16) | ((op as u32) << 8)
}

/// Type-3 header for a packet carrying `payload_dwords` dwords.
///
/// Rejects empty payloads and payloads the count field cannot express.
pub fn packet_header(op: Opcode, payload_dwords: u32) -> Result<u32> {
    if payload_dwords == 0 || payload_dwords - 1 > MAX_PACKET_COUNT {
        return Err(Error::InvalidParameter);
    }
    Ok(packet3(op, payload_dwords - 1))
}

const_assert_eq!(packet3(Opcode::Nop, 0), 0xC000_1000);
const_assert_eq!(packet3(Opcode::SetContextReg, 1), 0xC001_6900);

/// Decoded type-3 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet3 {
    /// Opcode
    pub opcode: Opcode,
    /// Payload dwords following the header
    pub payload: u32,
}

impl Packet3 {
    /// Decode a header word; `None` for non type-3 words or unknown opcodes
    pub fn parse(word: u32) -> Option<Self> {
        if word >> 30 != 3 {
            return None;
        }
        let opcode = Opcode::from_u8(((word >> 8) & 0xFF) as u8)?;
        Some(Self {
            opcode,
            payload: ((word >> 16) & MAX_PACKET_COUNT) + 1,
        })
    }

    /// Total dwords including the header
    pub const fn len(&self) -> u32 {
        self.payload + 1
    }
}

// =============================================================================
// REGISTER SPACES
// =============================================================================

/// Register apertures, each written by its own SET_* packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegSpace {
    /// Config registers (SET_CONFIG_REG)
    Config,
    /// Per-context registers (SET_CONTEXT_REG)
    Context,
    /// Shader ALU constants
    AluConst,
    /// Texture and vertex fetch resources
    Resource,
    /// Texture samplers
    Sampler,
    /// Control constants
    CtlConst,
    /// Loop constants
    LoopConst,
    /// Boolean constants
    BoolConst,
}

impl RegSpace {
    const ALL: [RegSpace; 8] = [
        Self::Config,
        Self::Context,
        Self::AluConst,
        Self::Resource,
        Self::Sampler,
        Self::CtlConst,
        Self::LoopConst,
        Self::BoolConst,
    ];

    /// First byte address of the aperture
    pub const fn base(self) -> u32 {
        match self {
            Self::Config => 0x0000_8000,
            Self::Context => 0x0002_8000,
            Self::AluConst => 0x0003_0000,
            Self::Resource => 0x0003_8000,
            Self::Sampler => 0x0003_C000,
            Self::CtlConst => 0x0003_CFF0,
            Self::LoopConst => 0x0003_E200,
            Self::BoolConst => 0x0003_E380,
        }
    }

    /// One past the last byte address of the aperture
    pub const fn end(self) -> u32 {
        match self {
            Self::Config => 0x0000_AC00,
            Self::Context => 0x0002_9000,
            Self::AluConst => 0x0003_2000,
            Self::Resource => 0x0003_C000,
            Self::Sampler => 0x0003_CFF0,
            Self::CtlConst => 0x0003_E200,
            Self::LoopConst => 0x0003_E380,
            Self::BoolConst => 0x0004_0000,
        }
    }

    /// Packet that writes this aperture
    pub const fn opcode(self) -> Opcode {
        match self {
            Self::Config => Opcode::SetConfigReg,
            Self::Context => Opcode::SetContextReg,
            Self::AluConst => Opcode::SetAluConst,
            Self::Resource => Opcode::SetResource,
            Self::Sampler => Opcode::SetSampler,
            Self::CtlConst => Opcode::SetCtlConst,
            Self::LoopConst => Opcode::SetLoopConst,
            Self::BoolConst => Opcode::SetBoolConst,
        }
    }

    /// Aperture containing `reg`
    pub fn of(reg: u32) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|space| reg >= space.base() && reg < space.end())
    }

    /// Dword offset of `reg` within the aperture
    #[inline]
    pub const fn offset(self, reg: u32) -> u32 {
        (reg - self.base()) >> 2
    }

    /// Header and offset dwords for writing `count` registers from `reg`
    pub fn seq_header(self, reg: u32, count: u32) -> [u32; 2] {
        [packet3(self.opcode(), count), self.offset(reg)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_header_counts_payload() {
        let header = packet_header(Opcode::DrawIndexAuto, 2).unwrap();
        let parsed = Packet3::parse(header).unwrap();
        assert_eq!(parsed.opcode, Opcode::DrawIndexAuto);
        assert_eq!(parsed.payload, 2);
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn test_packet_header_rejects_bad_counts() {
        assert!(packet_header(Opcode::Nop, 0).is_err());
        assert!(packet_header(Opcode::Nop, MAX_PACKET_COUNT + 2).is_err());
        assert!(packet_header(Opcode::Nop, MAX_PACKET_COUNT + 1).is_ok());
    }

    #[test]
    fn test_packet0() {
        assert_eq!(packet0(0x28800, 1), 0x0001_A200);
    }

    #[test]
    fn test_reg_space_lookup() {
        assert_eq!(RegSpace::of(0x28800), Some(RegSpace::Context));
        assert_eq!(RegSpace::of(0x8958), Some(RegSpace::Config));
        assert_eq!(RegSpace::of(0x3CFF0), Some(RegSpace::CtlConst));
        assert_eq!(RegSpace::of(0x100), None);
        assert_eq!(RegSpace::Context.offset(0x28800), 0x200);
    }

    #[test]
    fn test_seq_header() {
        let [header, offset] = RegSpace::Context.seq_header(0x28410, 1);
        assert_eq!(Packet3::parse(header).unwrap().opcode, Opcode::SetContextReg);
        assert_eq!(Packet3::parse(header).unwrap().payload, 2);
        assert_eq!(offset, (0x28410 - 0x28000) >> 2);
    }
}
