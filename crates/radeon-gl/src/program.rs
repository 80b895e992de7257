//! # Shader Programs
//!
//! Compiled vertex and fragment programs as handed over by the shader
//! compiler. The driver reads them; it never modifies one.

use alloc::vec::Vec;

use bitflags::bitflags;
use radeon_core::Handle;

/// Program identity; a new id means new code
pub type ProgramId = Handle<ShaderProgram>;

/// Pipeline stage of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Vertex program
    Vertex,
    /// Fragment program
    Fragment,
}

bitflags! {
    /// Varyings written by a vertex program or read by a fragment program
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProgramIo: u32 {
        /// Primary color
        const COL0 = 1 << 0;
        /// Secondary color
        const COL1 = 1 << 1;
        /// Fog coordinate
        const FOGC = 1 << 2;
        /// Window position
        const WPOS = 1 << 3;
        /// First texture coordinate; unit `n` is `TEX0 << n`
        const TEX0 = 1 << 4;
    }
}

impl ProgramIo {
    /// Highest texture coordinate set a program can use
    pub const MAX_TEXCOORDS: usize = 16;

    /// Texture coordinate set `unit`
    pub const fn tex(unit: usize) -> Self {
        Self::from_bits_retain(Self::TEX0.bits() << unit)
    }
}

/// A compiled program
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    /// Identity
    pub id: ProgramId,
    /// Stage
    pub kind: ProgramKind,
    /// Microcode
    pub code: Vec<u32>,
    /// The compiler produced hardware code
    pub translated: bool,
    /// Varyings read (fragment programs)
    pub inputs: ProgramIo,
    /// Varyings written (vertex programs)
    pub outputs: ProgramIo,
    /// Fragment program writes depth
    pub writes_depth: bool,
    /// Fragment program may discard
    pub uses_kill: bool,
    /// General purpose registers used
    pub num_gprs: u32,
    /// Control flow stack depth
    pub stack_size: u32,
    /// Color outputs exported (fragment programs)
    pub color_exports: u32,
    /// ALU constants
    pub constants: Vec<[f32; 4]>,
}

impl ShaderProgram {
    fn new(id: u64, kind: ProgramKind, code: Vec<u32>) -> Self {
        Self {
            id: ProgramId::new(id),
            kind,
            code,
            translated: true,
            inputs: ProgramIo::empty(),
            outputs: ProgramIo::empty(),
            writes_depth: false,
            uses_kill: false,
            num_gprs: 1,
            stack_size: 0,
            color_exports: 0,
            constants: Vec::new(),
        }
    }

    /// Translated vertex program
    pub fn vertex(id: u64, code: Vec<u32>, outputs: ProgramIo) -> Self {
        Self {
            outputs,
            ..Self::new(id, ProgramKind::Vertex, code)
        }
    }

    /// Translated fragment program exporting one color
    pub fn fragment(id: u64, code: Vec<u32>, inputs: ProgramIo) -> Self {
        Self {
            inputs,
            color_exports: 1,
            ..Self::new(id, ProgramKind::Fragment, code)
        }
    }

    /// A program the compiler could not translate
    pub fn untranslated(id: u64, kind: ProgramKind) -> Self {
        Self {
            translated: false,
            ..Self::new(id, kind, Vec::new())
        }
    }

    /// Code size in bytes
    pub fn code_bytes(&self) -> u32 {
        (self.code.len() * 4) as u32
    }

    /// Export slot of vertex output `io`: outputs are packed in bit order
    pub fn output_semantic(&self, io: ProgramIo) -> Option<u32> {
        if !self.outputs.contains(io) || io.bits().count_ones() != 1 {
            return None;
        }
        let below = io.bits() - 1;
        Some((self.outputs.bits() & below).count_ones())
    }

    /// Number of exported varyings
    pub fn output_count(&self) -> u32 {
        self.outputs.difference(ProgramIo::WPOS).bits().count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_output_semantics_pack_in_bit_order() {
        let vp = ShaderProgram::vertex(
            1,
            vec![0; 4],
            ProgramIo::COL0 | ProgramIo::tex(0) | ProgramIo::tex(2),
        );
        assert_eq!(vp.output_semantic(ProgramIo::COL0), Some(0));
        assert_eq!(vp.output_semantic(ProgramIo::tex(0)), Some(1));
        assert_eq!(vp.output_semantic(ProgramIo::tex(2)), Some(2));
        assert_eq!(vp.output_semantic(ProgramIo::COL1), None);
        assert_eq!(vp.output_count(), 3);
    }

    #[test]
    fn test_untranslated() {
        let fp = ShaderProgram::untranslated(9, ProgramKind::Fragment);
        assert!(!fp.translated);
        assert_eq!(fp.code_bytes(), 0);
    }
}
