//! # R600 Register Map
//!
//! Register addresses, bitfields and hardware enumerations for the blocks
//! the state tracker programs. Grouped by hardware block.

// =============================================================================
// BITFIELDS
// =============================================================================

/// A bitfield inside a 32-bit register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Bit position of the least significant bit
    pub shift: u32,
    /// Unshifted mask
    pub mask: u32,
}

impl Field {
    /// Field of `width` bits starting at `shift`
    pub const fn new(shift: u32, width: u32) -> Self {
        let mask = if width >= 32 { u32::MAX } else { (1 << width) - 1 };
        Self { shift, mask }
    }

    /// Replace this field in `word` with `value`
    #[inline]
    pub const fn set(self, word: u32, value: u32) -> u32 {
        (word & !(self.mask << self.shift)) | ((value & self.mask) << self.shift)
    }

    /// Extract this field from `word`
    #[inline]
    pub const fn get(self, word: u32) -> u32 {
        (word >> self.shift) & self.mask
    }
}

/// Set or clear a single bit
#[inline]
pub const fn set_bit(word: u32, bit: u32, on: bool) -> u32 {
    if on { word | bit } else { word & !bit }
}

// =============================================================================
// COMMAND PROCESSOR
// =============================================================================

/// Command processor registers and events
pub mod cp {
    /// Stall register (config space)
    pub const WAIT_UNTIL: u32 = 0x8040;
    /// Wait for the 3D engine to go idle
    pub const WAIT_3D_IDLE: u32 = 1 << 15;
    /// Wait for the 3D engine to go idle and its caches to be clean
    pub const WAIT_3D_IDLECLEAN: u32 = 1 << 17;

    /// EVENT_WRITE: flush and invalidate the CB/DB caches
    pub const CACHE_FLUSH_AND_INV_EVENT: u32 = 0x16;

    /// SURFACE_SYNC size value meaning "whole address space"
    pub const COHER_SIZE_ALL: u32 = 0xFFFF_FFFF;
    /// SURFACE_SYNC poll interval
    pub const SYNC_POLL_INTERVAL: u32 = 10;

    bitflags::bitflags! {
        /// CP_COHER_CNTL actions for SURFACE_SYNC
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct SyncAction: u32 {
            /// Color target 0 destination base
            const CB0_DEST_BASE_ENA = 1 << 6;
            /// Depth destination base
            const DB_DEST_BASE_ENA = 1 << 14;
            /// Texture cache
            const TC_ACTION_ENA = 1 << 23;
            /// Vertex cache
            const VC_ACTION_ENA = 1 << 24;
            /// Color block
            const CB_ACTION_ENA = 1 << 25;
            /// Depth block
            const DB_ACTION_ENA = 1 << 26;
            /// Shader instruction cache
            const SH_ACTION_ENA = 1 << 27;
        }
    }
}

// =============================================================================
// VERTEX GROUPER / TESSELLATOR
// =============================================================================

/// Vertex grouper registers and draw encodings
pub mod vgt {
    use super::*;

    /// Primitive type (config space)
    pub const VGT_PRIMITIVE_TYPE: u32 = 0x8958;
    /// PRIM_TYPE field of VGT_PRIMITIVE_TYPE
    pub const PRIM_TYPE: Field = Field::new(0, 6);

    /// Hardware primitive types (DI_PT_*)
    pub const DI_PT_POINTLIST: u32 = 0x01;
    /// Line list
    pub const DI_PT_LINELIST: u32 = 0x02;
    /// Line strip
    pub const DI_PT_LINESTRIP: u32 = 0x03;
    /// Triangle list
    pub const DI_PT_TRILIST: u32 = 0x04;
    /// Triangle fan
    pub const DI_PT_TRIFAN: u32 = 0x05;
    /// Triangle strip
    pub const DI_PT_TRISTRIP: u32 = 0x06;
    /// Rectangle list
    pub const DI_PT_RECTLIST: u32 = 0x11;
    /// Line loop
    pub const DI_PT_LINELOOP: u32 = 0x12;
    /// Quad list
    pub const DI_PT_QUADLIST: u32 = 0x13;
    /// Quad strip
    pub const DI_PT_QUADSTRIP: u32 = 0x14;
    /// Polygon
    pub const DI_PT_POLYGON: u32 = 0x15;

    /// INDEX_SIZE field of the INDEX_TYPE packet
    pub const INDEX_TYPE: Field = Field::new(0, 2);
    /// 16-bit indices
    pub const DI_INDEX_SIZE_16_BIT: u32 = 0;
    /// 32-bit indices
    pub const DI_INDEX_SIZE_32_BIT: u32 = 1;
    /// Endian swap mode for fetched indices
    pub const SWAP_MODE: Field = Field::new(2, 2);
    /// No swap
    pub const VGT_DMA_SWAP_NONE: u32 = 0;

    /// SOURCE_SELECT field of the draw initiator
    pub const SOURCE_SELECT: Field = Field::new(0, 2);
    /// Indices fetched by DMA
    pub const DI_SRC_SEL_DMA: u32 = 0;
    /// Indices embedded in the packet
    pub const DI_SRC_SEL_IMMEDIATE: u32 = 1;
    /// Indices generated 0..n
    pub const DI_SRC_SEL_AUTO_INDEX: u32 = 2;
    /// MAJOR_MODE field of the draw initiator
    pub const MAJOR_MODE: Field = Field::new(2, 2);
    /// Implicit major mode
    pub const DI_MAJOR_MODE_0: u32 = 0;

    /// Largest index the vertex grouper accepts
    pub const VGT_MAX_VTX_INDX: u32 = 0x28400;
    /// Smallest index the vertex grouper accepts
    pub const VGT_MIN_VTX_INDX: u32 = 0x28404;
    /// Offset added to every index
    pub const VGT_INDX_OFFSET: u32 = 0x28408;
}

// =============================================================================
// PRIMITIVE ASSEMBLY / SETUP / SCAN CONVERTER
// =============================================================================

/// Primitive assembly, setup unit and scan converter
pub mod pa {
    use super::*;

    /// Generic scissor top-left
    pub const PA_SC_GENERIC_SCISSOR_TL: u32 = 0x28240;
    /// Generic scissor bottom-right
    pub const PA_SC_GENERIC_SCISSOR_BR: u32 = 0x28244;
    /// Viewport 0 scissor top-left
    pub const PA_SC_VPORT_SCISSOR_0_TL: u32 = 0x28250;
    /// Viewport 0 scissor bottom-right
    pub const PA_SC_VPORT_SCISSOR_0_BR: u32 = 0x28254;
    /// Viewport 0 depth minimum
    pub const PA_SC_VPORT_ZMIN_0: u32 = 0x282D0;
    /// Viewport 0 depth maximum
    pub const PA_SC_VPORT_ZMAX_0: u32 = 0x282D4;
    /// X coordinate field of scissor registers
    pub const SCISSOR_X: Field = Field::new(0, 14);
    /// Y coordinate field of scissor registers
    pub const SCISSOR_Y: Field = Field::new(16, 14);
    /// Disable window offset for the scissor
    pub const WINDOW_OFFSET_DISABLE: u32 = 1 << 31;

    /// Viewport transform, six consecutive float registers
    pub const PA_CL_VPORT_XSCALE_0: u32 = 0x2843C;
    /// X offset
    pub const PA_CL_VPORT_XOFFSET_0: u32 = 0x28440;
    /// Y scale
    pub const PA_CL_VPORT_YSCALE_0: u32 = 0x28444;
    /// Y offset
    pub const PA_CL_VPORT_YOFFSET_0: u32 = 0x28448;
    /// Z scale
    pub const PA_CL_VPORT_ZSCALE_0: u32 = 0x2844C;
    /// Z offset
    pub const PA_CL_VPORT_ZOFFSET_0: u32 = 0x28450;

    /// Clipper control
    pub const PA_CL_CLIP_CNTL: u32 = 0x28810;
    /// User clip plane enables, one bit per plane
    pub const UCP_ENA: Field = Field::new(0, 6);
    /// Disable clipping entirely
    pub const CLIP_DISABLE: u32 = 1 << 16;
    /// Z range is [0, 1] rather than [-1, 1]
    pub const DX_CLIP_SPACE_DEF: u32 = 1 << 19;

    /// Setup unit mode control
    pub const PA_SU_SC_MODE_CNTL: u32 = 0x28814;
    /// Cull front-facing polygons
    pub const CULL_FRONT: u32 = 1 << 0;
    /// Cull back-facing polygons
    pub const CULL_BACK: u32 = 1 << 1;
    /// Clockwise is front-facing
    pub const FACE: u32 = 1 << 2;
    /// Dual polygon mode enable
    pub const POLY_MODE: Field = Field::new(3, 2);
    /// Front polygon fill type
    pub const POLYMODE_FRONT_PTYPE: Field = Field::new(5, 3);
    /// Back polygon fill type
    pub const POLYMODE_BACK_PTYPE: Field = Field::new(8, 3);
    /// Polygon offset for front faces
    pub const POLY_OFFSET_FRONT_ENABLE: u32 = 1 << 11;
    /// Polygon offset for back faces
    pub const POLY_OFFSET_BACK_ENABLE: u32 = 1 << 12;
    /// Polygon offset for lines and points
    pub const POLY_OFFSET_PARA_ENABLE: u32 = 1 << 13;
    /// Flat shading takes the last vertex
    pub const PROVOKING_VTX_LAST: u32 = 1 << 19;
    /// Fill types for POLYMODE_*_PTYPE
    pub const X_DRAW_POINTS: u32 = 0;
    /// Lines
    pub const X_DRAW_LINES: u32 = 1;
    /// Triangles
    pub const X_DRAW_TRIANGLES: u32 = 2;

    /// Viewport transform enables
    pub const PA_CL_VTE_CNTL: u32 = 0x28818;
    /// Default: all scale/offset enabled, W0 format
    pub const VTE_DEFAULT: u32 = 0x0000_043F;

    /// Point size, 12.4 fixed point halves
    pub const PA_SU_POINT_SIZE: u32 = 0x28A00;
    /// Height field of PA_SU_POINT_SIZE
    pub const POINT_HEIGHT: Field = Field::new(0, 16);
    /// Width field of PA_SU_POINT_SIZE
    pub const POINT_WIDTH: Field = Field::new(16, 16);
    /// Point size clamp
    pub const PA_SU_POINT_MINMAX: u32 = 0x28A04;
    /// Minimum size field
    pub const MIN_SIZE: Field = Field::new(0, 16);
    /// Maximum size field
    pub const MAX_SIZE: Field = Field::new(16, 16);
    /// Line width
    pub const PA_SU_LINE_CNTL: u32 = 0x28A08;
    /// Width field of PA_SU_LINE_CNTL
    pub const LINE_WIDTH: Field = Field::new(0, 16);
    /// Horizontal line pattern counter
    pub const LINE_CNT_HO: u32 = 1 << 16;
    /// Vertical line pattern counter
    pub const LINE_CNT_VE: u32 = 1 << 17;
    /// Line stipple
    pub const PA_SC_LINE_STIPPLE: u32 = 0x28A0C;
    /// Stipple pattern
    pub const LINE_PATTERN: Field = Field::new(0, 16);
    /// Stipple repeat count
    pub const REPEAT_COUNT: Field = Field::new(16, 8);
    /// When the stipple pattern restarts
    pub const AUTO_RESET_CNTL: Field = Field::new(29, 2);
    /// Scan converter mode
    pub const PA_SC_MODE_CNTL: u32 = 0x28A4C;
    /// Enable line stipple
    pub const LINE_STIPPLE_ENABLE: u32 = 1 << 2;
    /// Scale between GL size units and register units
    pub const SIZE_SCALE: f32 = 6.0;

    /// Polygon offset depth format
    pub const PA_SU_POLY_OFFSET_DB_FMT_CNTL: u32 = 0x28DF8;
    /// Polygon offset clamp
    pub const PA_SU_POLY_OFFSET_CLAMP: u32 = 0x28DFC;
    /// Front face offset scale
    pub const PA_SU_POLY_OFFSET_FRONT_SCALE: u32 = 0x28E00;
    /// Front face offset
    pub const PA_SU_POLY_OFFSET_FRONT_OFFSET: u32 = 0x28E04;
    /// Back face offset scale
    pub const PA_SU_POLY_OFFSET_BACK_SCALE: u32 = 0x28E08;
    /// Back face offset
    pub const PA_SU_POLY_OFFSET_BACK_OFFSET: u32 = 0x28E0C;
    /// Negative bits of depth precision
    pub const POLY_OFFSET_NEG_NUM_DB_BITS: Field = Field::new(0, 8);

    /// User clip plane 0, X coefficient; planes are 16 bytes apart
    pub const PA_CL_UCP_0_X: u32 = 0x28E20;
    /// Stride between user clip planes
    pub const UCP_STRIDE: u32 = 0x10;
    /// Number of user clip planes
    pub const MAX_CLIP_PLANES: usize = 6;
}

// =============================================================================
// SHADER EXPORT
// =============================================================================

/// Shader export (alpha test)
pub mod sx {
    use super::*;

    /// Alpha test control
    pub const SX_ALPHA_TEST_CONTROL: u32 = 0x28410;
    /// Compare function field
    pub const ALPHA_FUNC: Field = Field::new(0, 3);
    /// Alpha test enable
    pub const ALPHA_TEST_ENABLE: u32 = 1 << 3;
    /// Alpha reference value, float bits
    pub const SX_ALPHA_REF: u32 = 0x28438;
}

// =============================================================================
// DEPTH BLOCK
// =============================================================================

/// Depth/stencil block
pub mod db {
    use super::*;

    /// Depth buffer base, relocated
    pub const DB_DEPTH_BASE: u32 = 0x2800C;
    /// Depth buffer format
    pub const DB_DEPTH_INFO: u32 = 0x28010;
    /// FORMAT field of DB_DEPTH_INFO
    pub const DEPTH_FORMAT: Field = Field::new(0, 3);
    /// 16-bit depth
    pub const DEPTH_16: u32 = 1;
    /// 24-bit depth, 8-bit stencil
    pub const DEPTH_8_24: u32 = 3;

    /// Depth/stencil control
    pub const DB_DEPTH_CONTROL: u32 = 0x28800;
    /// Stencil test enable
    pub const STENCIL_ENABLE: u32 = 1 << 0;
    /// Depth test enable
    pub const Z_ENABLE: u32 = 1 << 1;
    /// Depth write enable
    pub const Z_WRITE_ENABLE: u32 = 1 << 2;
    /// Depth compare function
    pub const ZFUNC: Field = Field::new(4, 3);
    /// Separate back-face stencil
    pub const BACKFACE_ENABLE: u32 = 1 << 7;
    /// Front stencil function
    pub const STENCILFUNC: Field = Field::new(8, 3);
    /// Front stencil fail op
    pub const STENCILFAIL: Field = Field::new(11, 3);
    /// Front stencil pass, depth pass op
    pub const STENCILZPASS: Field = Field::new(14, 3);
    /// Front stencil pass, depth fail op
    pub const STENCILZFAIL: Field = Field::new(17, 3);
    /// Back stencil function
    pub const STENCILFUNC_BF: Field = Field::new(20, 3);
    /// Back stencil fail op
    pub const STENCILFAIL_BF: Field = Field::new(23, 3);
    /// Back stencil pass, depth pass op
    pub const STENCILZPASS_BF: Field = Field::new(26, 3);
    /// Back stencil pass, depth fail op
    pub const STENCILZFAIL_BF: Field = Field::new(29, 3);

    /// Front stencil ref and masks
    pub const DB_STENCILREFMASK: u32 = 0x28430;
    /// Back stencil ref and masks
    pub const DB_STENCILREFMASK_BF: u32 = 0x28434;
    /// Reference value
    pub const STENCILREF: Field = Field::new(0, 8);
    /// Compare mask
    pub const STENCILMASK: Field = Field::new(8, 8);
    /// Write mask
    pub const STENCILWRITEMASK: Field = Field::new(16, 8);

    /// Fragment-shader interaction with the depth block
    pub const DB_SHADER_CONTROL: u32 = 0x2880C;
    /// Shader exports Z
    pub const Z_EXPORT_ENABLE: u32 = 1 << 0;
    /// Shader may kill pixels
    pub const KILL_ENABLE: u32 = 1 << 6;
    /// When the depth test runs relative to the shader
    pub const Z_ORDER: Field = Field::new(4, 2);
    /// Depth test after the shader
    pub const LATE_Z: u32 = 0;
    /// Early test, re-tested late
    pub const EARLY_Z_THEN_LATE_Z: u32 = 1;

    /// Render control
    pub const DB_RENDER_CONTROL: u32 = 0x28D0C;
    /// Render override
    pub const DB_RENDER_OVERRIDE: u32 = 0x28D10;
    /// Force hierarchical Z off
    pub const FORCE_HIZ_ENABLE: Field = Field::new(0, 2);
    /// Force disable
    pub const FORCE_DISABLE: u32 = 1;

    /// Compare functions (REF_*)
    pub const REF_NEVER: u32 = 0;
    /// Less
    pub const REF_LESS: u32 = 1;
    /// Equal
    pub const REF_EQUAL: u32 = 2;
    /// Less or equal
    pub const REF_LEQUAL: u32 = 3;
    /// Greater
    pub const REF_GREATER: u32 = 4;
    /// Not equal
    pub const REF_NOTEQUAL: u32 = 5;
    /// Greater or equal
    pub const REF_GEQUAL: u32 = 6;
    /// Always
    pub const REF_ALWAYS: u32 = 7;

    /// Stencil ops (STENCIL_*)
    pub const STENCIL_KEEP: u32 = 0;
    /// Zero
    pub const STENCIL_ZERO: u32 = 1;
    /// Replace
    pub const STENCIL_REPLACE: u32 = 2;
    /// Increment, clamp
    pub const STENCIL_INCR_CLAMP: u32 = 3;
    /// Decrement, clamp
    pub const STENCIL_DECR_CLAMP: u32 = 4;
    /// Invert
    pub const STENCIL_INVERT: u32 = 5;
    /// Increment, wrap
    pub const STENCIL_INCR_WRAP: u32 = 6;
    /// Decrement, wrap
    pub const STENCIL_DECR_WRAP: u32 = 7;
}

// =============================================================================
// COLOR BLOCK
// =============================================================================

/// Color block
pub mod cb {
    use super::*;

    /// Color target 0 base, relocated
    pub const CB_COLOR0_BASE: u32 = 0x28040;
    /// Color target 0 size
    pub const CB_COLOR0_SIZE: u32 = 0x28060;
    /// Color target 0 format
    pub const CB_COLOR0_INFO: u32 = 0x280A0;
    /// Pitch field of CB_COLOR0_SIZE, in 8-pixel units minus one
    pub const PITCH_TILE_MAX: Field = Field::new(0, 10);
    /// Slice field of CB_COLOR0_SIZE, in 64-pixel units minus one
    pub const SLICE_TILE_MAX: Field = Field::new(10, 20);

    /// Per-target channel write mask
    pub const CB_TARGET_MASK: u32 = 0x28238;
    /// Channels exported by the shader
    pub const CB_SHADER_MASK: u32 = 0x2823C;
    /// Target 0 channel mask
    pub const TARGET0_ENABLE: Field = Field::new(0, 4);

    /// Blend constant, red
    pub const CB_BLEND_RED: u32 = 0x28414;
    /// Blend constant, green
    pub const CB_BLEND_GREEN: u32 = 0x28418;
    /// Blend constant, blue
    pub const CB_BLEND_BLUE: u32 = 0x2841C;
    /// Blend constant, alpha
    pub const CB_BLEND_ALPHA: u32 = 0x28420;

    /// Target 0 blend control (R700 and later)
    pub const CB_BLEND0_CONTROL: u32 = 0x28780;
    /// Shared blend control (R600)
    pub const CB_BLEND_CONTROL: u32 = 0x28804;
    /// Color source factor
    pub const COLOR_SRCBLEND: Field = Field::new(0, 5);
    /// Color combine function
    pub const COLOR_COMB_FCN: Field = Field::new(5, 3);
    /// Color destination factor
    pub const COLOR_DESTBLEND: Field = Field::new(8, 5);
    /// Alpha source factor
    pub const ALPHA_SRCBLEND: Field = Field::new(16, 5);
    /// Alpha combine function
    pub const ALPHA_COMB_FCN: Field = Field::new(21, 3);
    /// Alpha destination factor
    pub const ALPHA_DESTBLEND: Field = Field::new(24, 5);
    /// Alpha uses its own factors
    pub const SEPARATE_ALPHA_BLEND: u32 = 1 << 29;

    /// Color control
    pub const CB_COLOR_CONTROL: u32 = 0x28808;
    /// Blend settings are per render target
    pub const PER_MRT_BLEND: u32 = 1 << 7;
    /// Per-target blend (destination read) enable
    pub const TARGET_BLEND_ENABLE: Field = Field::new(8, 8);
    /// Raster op, ROP3 code
    pub const ROP3: Field = Field::new(16, 8);
    /// ROP3 code for plain copy
    pub const ROP3_COPY: u32 = 0xCC;

    /// Blend factors (BLEND_*)
    pub const BLEND_ZERO: u32 = 0;
    /// One
    pub const BLEND_ONE: u32 = 1;
    /// Source color
    pub const BLEND_SRC_COLOR: u32 = 2;
    /// One minus source color
    pub const BLEND_ONE_MINUS_SRC_COLOR: u32 = 3;
    /// Source alpha
    pub const BLEND_SRC_ALPHA: u32 = 4;
    /// One minus source alpha
    pub const BLEND_ONE_MINUS_SRC_ALPHA: u32 = 5;
    /// Destination alpha
    pub const BLEND_DST_ALPHA: u32 = 6;
    /// One minus destination alpha
    pub const BLEND_ONE_MINUS_DST_ALPHA: u32 = 7;
    /// Destination color
    pub const BLEND_DST_COLOR: u32 = 8;
    /// One minus destination color
    pub const BLEND_ONE_MINUS_DST_COLOR: u32 = 9;
    /// Saturated source alpha
    pub const BLEND_SRC_ALPHA_SATURATE: u32 = 10;
    /// Constant color
    pub const BLEND_CONSTANT_COLOR: u32 = 13;
    /// One minus constant color
    pub const BLEND_ONE_MINUS_CONSTANT_COLOR: u32 = 14;
    /// Constant alpha
    pub const BLEND_CONSTANT_ALPHA: u32 = 19;
    /// One minus constant alpha
    pub const BLEND_ONE_MINUS_CONSTANT_ALPHA: u32 = 20;

    /// Combine functions (COMB_*)
    pub const COMB_DST_PLUS_SRC: u32 = 0;
    /// Source minus destination
    pub const COMB_SRC_MINUS_DST: u32 = 1;
    /// Minimum
    pub const COMB_MIN_DST_SRC: u32 = 2;
    /// Maximum
    pub const COMB_MAX_DST_SRC: u32 = 3;
    /// Destination minus source
    pub const COMB_DST_MINUS_SRC: u32 = 4;
}

// =============================================================================
// SHADER PROCESSOR INPUT
// =============================================================================

/// Shader processor input (interpolator routing)
pub mod spi {
    use super::*;

    /// Vertex shader export semantic ids, four per register
    pub const SPI_VS_OUT_ID_0: u32 = 0x28614;
    /// Number of exported vertex parameters minus one
    pub const SPI_VS_OUT_CONFIG: u32 = 0x286C4;
    /// VS_EXPORT_COUNT field
    pub const VS_EXPORT_COUNT: Field = Field::new(1, 5);

    /// Per-input interpolation control, 32 consecutive registers
    pub const SPI_PS_INPUT_CNTL_0: u32 = 0x28644;
    /// Semantic id matched against SPI_VS_OUT_ID
    pub const SEMANTIC: Field = Field::new(0, 8);
    /// Default value when the VS does not export the semantic
    pub const DEFAULT_VAL: Field = Field::new(8, 2);
    /// Flat shade this input
    pub const FLAT_SHADE: u32 = 1 << 10;
    /// Point sprite texture coordinate
    pub const PT_SPRITE_TEX: u32 = 1 << 17;
    /// Maximum interpolated inputs
    pub const MAX_PS_INPUTS: usize = 32;

    /// Input count control
    pub const SPI_PS_IN_CONTROL_0: u32 = 0x286CC;
    /// NUM_INTERP field
    pub const NUM_INTERP: Field = Field::new(0, 6);
    /// Compute window position
    pub const POSITION_ENA: u32 = 1 << 8;
    /// GPR receiving the window position
    pub const POSITION_ADDR: Field = Field::new(10, 5);
    /// Second input control
    pub const SPI_PS_IN_CONTROL_1: u32 = 0x286D0;

    /// Interpolator control
    pub const SPI_INTERP_CONTROL_0: u32 = 0x286D4;
    /// Flat shade every input
    pub const FLAT_SHADE_ENA: u32 = 1 << 0;
    /// Point sprite coordinate generation
    pub const PNT_SPRITE_ENA: u32 = 1 << 1;
}

// =============================================================================
// SEQUENCER
// =============================================================================

/// Shader sequencer: programs, constants, fetch resources, samplers
pub mod sq {
    use super::*;

    /// Shader pipe configuration (config space)
    pub const SQ_CONFIG: u32 = 0x8C00;
    /// Vertex cache enable
    pub const VC_ENABLE: u32 = 1 << 0;
    /// Export source color
    pub const EXPORT_SRC_C: u32 = 1 << 1;
    /// DX9 constant mode
    pub const DX9_CONSTS: u32 = 1 << 2;

    /// Pixel shader start address, relocated
    pub const SQ_PGM_START_PS: u32 = 0x28840;
    /// Pixel shader GPR/stack resources
    pub const SQ_PGM_RESOURCES_PS: u32 = 0x28850;
    /// Pixel shader exports
    pub const SQ_PGM_EXPORTS_PS: u32 = 0x28854;
    /// Vertex shader start address, relocated
    pub const SQ_PGM_START_VS: u32 = 0x28858;
    /// Vertex shader GPR/stack resources
    pub const SQ_PGM_RESOURCES_VS: u32 = 0x28868;
    /// NUM_GPRS field of SQ_PGM_RESOURCES_*
    pub const NUM_GPRS: Field = Field::new(0, 8);
    /// STACK_SIZE field of SQ_PGM_RESOURCES_*
    pub const STACK_SIZE: Field = Field::new(8, 8);
    /// Shader writes Z (SQ_PGM_EXPORTS_PS)
    pub const EXPORT_Z: u32 = 1 << 0;
    /// Exported color count (SQ_PGM_EXPORTS_PS)
    pub const EXPORT_MODE: Field = Field::new(1, 5);

    /// First pixel shader ALU constant
    pub const SQ_ALU_CONSTANT0_0: u32 = 0x30000;
    /// First vertex shader ALU constant
    pub const SQ_ALU_CONSTANT_VS_0: u32 = 0x31000;
    /// ALU constants per stage
    pub const MAX_ALU_CONSTANTS: usize = 256;

    /// Base vertex location (control constant)
    pub const SQ_VTX_BASE_VTX_LOC: u32 = 0x3CFF0;
    /// Start instance location (control constant)
    pub const SQ_VTX_START_INST_LOC: u32 = 0x3CFF4;

    /// First texture resource
    pub const SQ_TEX_RESOURCE_WORD0_0: u32 = 0x38000;
    /// First texture sampler
    pub const SQ_TEX_SAMPLER_WORD0_0: u32 = 0x3C000;
    /// Dwords per sampler
    pub const SAMPLER_DWORDS: u32 = 3;
    /// Resource slot of the first vertex fetch resource (R600/R700)
    pub const FETCH_RESOURCE_VS_OFFSET: u32 = 160;
    /// Resource slot of the first vertex fetch resource (Evergreen)
    pub const EG_FETCH_RESOURCE_VS_OFFSET: u32 = 176;

    /// Vertex constant word 2: stride
    pub const VTX_STRIDE: Field = Field::new(8, 11);
    /// Vertex constant word 2: data format
    pub const VTX_DATA_FORMAT: Field = Field::new(20, 6);
    /// Vertex constant word 2: number format
    pub const VTX_NUM_FORMAT_ALL: Field = Field::new(26, 2);
    /// Vertex constant word 2: signed components
    pub const VTX_FORMAT_COMP_ALL: u32 = 1 << 28;
    /// Normalized number format
    pub const SQ_NUM_FORMAT_NORM: u32 = 0;
    /// Scaled number format
    pub const SQ_NUM_FORMAT_SCALED: u32 = 2;
    /// Resource type: vertex buffer (word 6 on R600, word 7 on Evergreen)
    pub const SQ_TEX_VTX_VALID_BUFFER: u32 = 3 << 30;
    /// Vertex constant word 3 (Evergreen): fetch components as XYZW
    pub const EG_VTX_DST_SEL_XYZW: u32 = (1 << 6) | (2 << 9) | (3 << 12);
    /// Vertex fetch resources per shader stage
    pub const MAX_VERTEX_RESOURCES: usize = 16;

    /// Sampler word 0: wrap S
    pub const CLAMP_X: Field = Field::new(0, 3);
    /// Sampler word 0: wrap T
    pub const CLAMP_Y: Field = Field::new(3, 3);
    /// Sampler word 0: wrap R
    pub const CLAMP_Z: Field = Field::new(6, 3);
    /// Sampler word 0: magnification filter
    pub const XY_MAG_FILTER: Field = Field::new(9, 3);
    /// Sampler word 0: minification filter
    pub const XY_MIN_FILTER: Field = Field::new(12, 3);
    /// Sampler word 0: mip filter
    pub const MIP_FILTER: Field = Field::new(17, 2);
    /// Sampler word 0: border color select
    pub const BORDER_COLOR_TYPE: Field = Field::new(22, 2);
    /// Sampler word 1: LOD bias, signed 6.6
    pub const LOD_BIAS: Field = Field::new(20, 12);
    /// Sampler word 1: minimum LOD
    pub const MIN_LOD: Field = Field::new(0, 10);
    /// Sampler word 1: maximum LOD
    pub const MAX_LOD: Field = Field::new(10, 10);

    /// Texture filters (SQ_TEX_XY_FILTER_*)
    pub const SQ_TEX_XY_FILTER_POINT: u32 = 0;
    /// Bilinear
    pub const SQ_TEX_XY_FILTER_BILINEAR: u32 = 1;
    /// Mip filters (SQ_TEX_Z_FILTER_*)
    pub const SQ_TEX_Z_FILTER_NONE: u32 = 0;
    /// Nearest mip
    pub const SQ_TEX_Z_FILTER_POINT: u32 = 1;
    /// Blend mips
    pub const SQ_TEX_Z_FILTER_LINEAR: u32 = 2;

    /// Wrap modes (SQ_TEX_*)
    pub const SQ_TEX_WRAP: u32 = 0;
    /// Mirrored repeat
    pub const SQ_TEX_MIRROR: u32 = 1;
    /// Clamp to edge
    pub const SQ_TEX_CLAMP_LAST_TEXEL: u32 = 2;
    /// Mirror once, clamp to edge
    pub const SQ_TEX_MIRROR_ONCE_LAST_TEXEL: u32 = 3;
    /// Legacy clamp (half border)
    pub const SQ_TEX_CLAMP_HALF_BORDER: u32 = 4;
    /// Mirror once, legacy clamp
    pub const SQ_TEX_MIRROR_ONCE_HALF_BORDER: u32 = 5;
    /// Clamp to border
    pub const SQ_TEX_CLAMP_BORDER: u32 = 6;
    /// Mirror once, clamp to border
    pub const SQ_TEX_MIRROR_ONCE_BORDER: u32 = 7;

    /// Texture resource word 0: dimension
    pub const TEX_DIM: Field = Field::new(0, 3);
    /// 2D texture
    pub const SQ_TEX_DIM_2D: u32 = 1;
    /// Texture resource word 0: pitch in 8-texel units, minus one
    pub const TEX_PITCH: Field = Field::new(8, 11);
    /// Texture resource word 0: width minus one
    pub const TEX_WIDTH: Field = Field::new(19, 13);
    /// Texture resource word 1: height minus one
    pub const TEX_HEIGHT: Field = Field::new(0, 13);
    /// Texture resource word 1: data format
    pub const TEX_DATA_FORMAT: Field = Field::new(26, 6);
    /// Texture resource word 5: last mip level
    pub const TEX_LAST_LEVEL: Field = Field::new(3, 4);
    /// Resource type: texture
    pub const SQ_TEX_VTX_VALID_TEXTURE: u32 = 2 << 30;
    /// Dwords per fetch resource (R600/R700)
    pub const RESOURCE_DWORDS: u32 = 7;
    /// Dwords per fetch resource (Evergreen)
    pub const EG_RESOURCE_DWORDS: u32 = 8;

    /// Vertex data formats (FMT_*)
    pub const FMT_8: u32 = 0x01;
    /// Two 8-bit components
    pub const FMT_8_8: u32 = 0x07;
    /// One 16-bit component
    pub const FMT_16: u32 = 0x05;
    /// One 32-bit integer component
    pub const FMT_32: u32 = 0x0D;
    /// One 32-bit float
    pub const FMT_32_FLOAT: u32 = 0x0E;
    /// Two 16-bit components
    pub const FMT_16_16: u32 = 0x0F;
    /// Four 8-bit components
    pub const FMT_8_8_8_8: u32 = 0x1A;
    /// Two 32-bit floats
    pub const FMT_32_32_FLOAT: u32 = 0x1E;
    /// Four 16-bit components
    pub const FMT_16_16_16_16: u32 = 0x1F;
    /// Four 32-bit floats
    pub const FMT_32_32_32_32_FLOAT: u32 = 0x23;
    /// Three 8-bit components
    pub const FMT_8_8_8: u32 = 0x2C;
    /// Three 16-bit components
    pub const FMT_16_16_16: u32 = 0x2D;
    /// Three 32-bit floats
    pub const FMT_32_32_32_FLOAT: u32 = 0x30;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_set_get() {
        let word = db::ZFUNC.set(0, db::REF_LEQUAL);
        assert_eq!(word, 3 << 4);
        assert_eq!(db::ZFUNC.get(word), db::REF_LEQUAL);

        let word = db::ZFUNC.set(word | db::Z_ENABLE, db::REF_ALWAYS);
        assert_eq!(db::ZFUNC.get(word), db::REF_ALWAYS);
        assert_ne!(word & db::Z_ENABLE, 0);
    }

    #[test]
    fn test_field_masks_value() {
        assert_eq!(cb::ROP3.set(0, 0x1FF), 0xFF << 16);
        assert_eq!(Field::new(0, 32).set(0, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_set_bit() {
        assert_eq!(set_bit(0, 1 << 3, true), 8);
        assert_eq!(set_bit(0xF, 1 << 3, false), 7);
    }
}
