//! # GL Enum Encoding
//!
//! Stateless conversions from GL enumerants to hardware codes, plus the
//! inverse tables where the mapping is one-to-one. Unknown inputs are
//! programming errors: they log once and fall back to a safe default.

use radeon_cmd::regs::{cb, db, vgt};
use radeon_core::warn_once;

use crate::enums::*;
use crate::types::GLenum;

// =============================================================================
// BLEND FACTORS
// =============================================================================

const BLEND_FACTORS: [(GLenum, u32); 15] = [
    (GL_ZERO, cb::BLEND_ZERO),
    (GL_ONE, cb::BLEND_ONE),
    (GL_SRC_COLOR, cb::BLEND_SRC_COLOR),
    (GL_ONE_MINUS_SRC_COLOR, cb::BLEND_ONE_MINUS_SRC_COLOR),
    (GL_SRC_ALPHA, cb::BLEND_SRC_ALPHA),
    (GL_ONE_MINUS_SRC_ALPHA, cb::BLEND_ONE_MINUS_SRC_ALPHA),
    (GL_DST_ALPHA, cb::BLEND_DST_ALPHA),
    (GL_ONE_MINUS_DST_ALPHA, cb::BLEND_ONE_MINUS_DST_ALPHA),
    (GL_DST_COLOR, cb::BLEND_DST_COLOR),
    (GL_ONE_MINUS_DST_COLOR, cb::BLEND_ONE_MINUS_DST_COLOR),
    (GL_SRC_ALPHA_SATURATE, cb::BLEND_SRC_ALPHA_SATURATE),
    (GL_CONSTANT_COLOR, cb::BLEND_CONSTANT_COLOR),
    (GL_ONE_MINUS_CONSTANT_COLOR, cb::BLEND_ONE_MINUS_CONSTANT_COLOR),
    (GL_CONSTANT_ALPHA, cb::BLEND_CONSTANT_ALPHA),
    (GL_ONE_MINUS_CONSTANT_ALPHA, cb::BLEND_ONE_MINUS_CONSTANT_ALPHA),
];

/// Hardware blend factor for `factor`.
///
/// `SRC_ALPHA_SATURATE` is only meaningful as a source factor and becomes
/// ZERO on the destination side. Unknown factors become ONE (source) or
/// ZERO (destination).
pub fn encode_blend_factor(factor: GLenum, is_src: bool) -> u32 {
    if factor == GL_SRC_ALPHA_SATURATE && !is_src {
        return cb::BLEND_ZERO;
    }
    match BLEND_FACTORS.iter().find(|(gl, _)| *gl == factor) {
        Some(&(_, hw)) => hw,
        None => {
            warn_once!("unknown blend factor 0x{:04x}", factor);
            if is_src { cb::BLEND_ONE } else { cb::BLEND_ZERO }
        }
    }
}

/// GL blend factor for a hardware code
pub fn decode_blend_factor(hw: u32) -> Option<GLenum> {
    BLEND_FACTORS
        .iter()
        .find(|(_, code)| *code == hw)
        .map(|&(gl, _)| gl)
}

// =============================================================================
// BLEND EQUATIONS
// =============================================================================

/// Hardware combine function for a blend equation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendCombine {
    /// COMB_* code
    pub func: u32,
    /// MIN and MAX ignore the factors; the hardware wants ONE/ONE
    pub force_one: bool,
}

/// Hardware combine function for `equation`; unknown equations add
pub fn encode_blend_equation(equation: GLenum) -> BlendCombine {
    let (func, force_one) = match equation {
        GL_FUNC_ADD => (cb::COMB_DST_PLUS_SRC, false),
        GL_FUNC_SUBTRACT => (cb::COMB_SRC_MINUS_DST, false),
        GL_FUNC_REVERSE_SUBTRACT => (cb::COMB_DST_MINUS_SRC, false),
        GL_MIN => (cb::COMB_MIN_DST_SRC, true),
        GL_MAX => (cb::COMB_MAX_DST_SRC, true),
        _ => {
            warn_once!("unknown blend equation 0x{:04x}", equation);
            (cb::COMB_DST_PLUS_SRC, false)
        }
    };
    BlendCombine { func, force_one }
}

// =============================================================================
// COMPARE FUNCTIONS
// =============================================================================

const COMPARE_FUNCS: [(GLenum, u32); 8] = [
    (GL_NEVER, db::REF_NEVER),
    (GL_LESS, db::REF_LESS),
    (GL_EQUAL, db::REF_EQUAL),
    (GL_LEQUAL, db::REF_LEQUAL),
    (GL_GREATER, db::REF_GREATER),
    (GL_NOTEQUAL, db::REF_NOTEQUAL),
    (GL_GEQUAL, db::REF_GEQUAL),
    (GL_ALWAYS, db::REF_ALWAYS),
];

/// Hardware compare function shared by depth, stencil and alpha test;
/// unknown functions always pass
pub fn encode_compare_func(func: GLenum) -> u32 {
    match COMPARE_FUNCS.iter().find(|(gl, _)| *gl == func) {
        Some(&(_, hw)) => hw,
        None => {
            warn_once!("unknown compare function 0x{:04x}", func);
            db::REF_ALWAYS
        }
    }
}

/// GL compare function for a hardware code
pub fn decode_compare_func(hw: u32) -> Option<GLenum> {
    COMPARE_FUNCS
        .iter()
        .find(|(_, code)| *code == hw)
        .map(|&(gl, _)| gl)
}

// =============================================================================
// STENCIL OPS
// =============================================================================

const STENCIL_OPS: [(GLenum, u32); 8] = [
    (GL_KEEP, db::STENCIL_KEEP),
    (GL_ZERO, db::STENCIL_ZERO),
    (GL_REPLACE, db::STENCIL_REPLACE),
    (GL_INCR, db::STENCIL_INCR_CLAMP),
    (GL_DECR, db::STENCIL_DECR_CLAMP),
    (GL_INCR_WRAP, db::STENCIL_INCR_WRAP),
    (GL_DECR_WRAP, db::STENCIL_DECR_WRAP),
    (GL_INVERT, db::STENCIL_INVERT),
];

/// Hardware stencil op; unknown ops keep
pub fn encode_stencil_op(op: GLenum) -> u32 {
    match STENCIL_OPS.iter().find(|(gl, _)| *gl == op) {
        Some(&(_, hw)) => hw,
        None => {
            warn_once!("do not know how to translate stencil op 0x{:04x}", op);
            db::STENCIL_KEEP
        }
    }
}

/// GL stencil op for a hardware code
pub fn decode_stencil_op(hw: u32) -> Option<GLenum> {
    STENCIL_OPS
        .iter()
        .find(|(_, code)| *code == hw)
        .map(|&(gl, _)| gl)
}

// =============================================================================
// LOGIC OPS
// =============================================================================

/// ROP3 code for a GL logic op; unknown ops copy
pub fn encode_logic_op(op: GLenum) -> u32 {
    match op {
        GL_CLEAR => 0x00,
        GL_SET => 0xff,
        GL_COPY => 0xcc,
        GL_COPY_INVERTED => 0x33,
        GL_NOOP => 0xaa,
        GL_INVERT => 0x55,
        GL_AND => 0x88,
        GL_NAND => 0x77,
        GL_OR => 0xee,
        GL_NOR => 0x11,
        GL_XOR => 0x66,
        GL_EQUIV => 0x99,
        GL_AND_REVERSE => 0x44,
        GL_AND_INVERTED => 0x22,
        GL_OR_REVERSE => 0xdd,
        GL_OR_INVERTED => 0xbb,
        _ => {
            warn_once!("unknown logic op 0x{:04x}", op);
            cb::ROP3_COPY
        }
    }
}

// =============================================================================
// PRIMITIVE TYPES
// =============================================================================

const PRIMITIVES: [(GLenum, u32); 10] = [
    (GL_POINTS, vgt::DI_PT_POINTLIST),
    (GL_LINES, vgt::DI_PT_LINELIST),
    (GL_LINE_STRIP, vgt::DI_PT_LINESTRIP),
    (GL_LINE_LOOP, vgt::DI_PT_LINELOOP),
    (GL_TRIANGLES, vgt::DI_PT_TRILIST),
    (GL_TRIANGLE_STRIP, vgt::DI_PT_TRISTRIP),
    (GL_TRIANGLE_FAN, vgt::DI_PT_TRIFAN),
    (GL_QUADS, vgt::DI_PT_QUADLIST),
    (GL_QUAD_STRIP, vgt::DI_PT_QUADSTRIP),
    (GL_POLYGON, vgt::DI_PT_POLYGON),
];

/// Hardware primitive type, `None` for modes the VGT cannot draw
pub fn encode_primitive_type(mode: GLenum) -> Option<u32> {
    PRIMITIVES
        .iter()
        .find(|(gl, _)| *gl == mode)
        .map(|&(_, hw)| hw)
}

/// GL primitive mode for a hardware primitive type
pub fn decode_primitive_type(hw: u32) -> Option<GLenum> {
    PRIMITIVES
        .iter()
        .find(|(_, code)| *code == hw)
        .map(|&(gl, _)| gl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_factor_round_trip() {
        for &(gl, _) in BLEND_FACTORS.iter() {
            assert_eq!(decode_blend_factor(encode_blend_factor(gl, true)), Some(gl));
        }
    }

    #[test]
    fn test_saturate_is_source_only() {
        assert_eq!(
            encode_blend_factor(GL_SRC_ALPHA_SATURATE, true),
            cb::BLEND_SRC_ALPHA_SATURATE
        );
        assert_eq!(encode_blend_factor(GL_SRC_ALPHA_SATURATE, false), cb::BLEND_ZERO);
    }

    #[test]
    fn test_unknown_blend_factor_defaults() {
        assert_eq!(encode_blend_factor(0xDEAD, true), cb::BLEND_ONE);
        assert_eq!(encode_blend_factor(0xDEAD, false), cb::BLEND_ZERO);
    }

    #[test]
    fn test_min_max_force_one() {
        assert!(encode_blend_equation(GL_MIN).force_one);
        assert!(encode_blend_equation(GL_MAX).force_one);
        let sub = encode_blend_equation(GL_FUNC_REVERSE_SUBTRACT);
        assert_eq!(sub.func, cb::COMB_DST_MINUS_SRC);
        assert!(!sub.force_one);
        assert_eq!(encode_blend_equation(0x1234).func, cb::COMB_DST_PLUS_SRC);
    }

    #[test]
    fn test_compare_and_stencil_round_trip() {
        for &(gl, _) in COMPARE_FUNCS.iter() {
            assert_eq!(decode_compare_func(encode_compare_func(gl)), Some(gl));
        }
        for &(gl, _) in STENCIL_OPS.iter() {
            assert_eq!(decode_stencil_op(encode_stencil_op(gl)), Some(gl));
        }
    }

    #[test]
    fn test_unknown_stencil_op_keeps() {
        assert_eq!(encode_stencil_op(0xBEEF), db::STENCIL_KEEP);
    }

    #[test]
    fn test_logic_ops() {
        assert_eq!(encode_logic_op(GL_CLEAR), 0x00);
        assert_eq!(encode_logic_op(GL_XOR), 0x66);
        assert_eq!(encode_logic_op(GL_SET), 0xff);
        assert_eq!(encode_logic_op(0), cb::ROP3_COPY);
    }

    #[test]
    fn test_primitive_types() {
        for &(gl, _) in PRIMITIVES.iter() {
            let hw = encode_primitive_type(gl).unwrap();
            assert_eq!(decode_primitive_type(hw), Some(gl));
        }
        assert_eq!(encode_primitive_type(0x000A), None);
    }
}
