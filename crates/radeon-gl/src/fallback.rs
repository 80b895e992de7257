//! # Software Fallbacks
//!
//! GL features the hardware path cannot render. A draw that needs any of
//! them is rejected before resources are committed and the caller retries
//! it in software.

use radeon_core::FallbackReason;

use crate::enums::GL_RENDER;
use crate::state::GlState;

/// First feature in `gl` that forces a software fallback.
///
/// With `low_impact_fallback` set, line and point smoothing are drawn
/// aliased instead of falling back.
pub fn check_fallbacks(gl: &GlState, low_impact_fallback: bool) -> Option<FallbackReason> {
    let reason = if gl.render_mode != GL_RENDER {
        FallbackReason::RenderMode
    } else if gl.stencil.enabled
        && gl.stencil.two_side
        && gl.stencil.front.reference != gl.stencil.back.reference
    {
        FallbackReason::StencilTwoSideRefs
    } else if gl.point.sprite {
        FallbackReason::PointSprite
    } else if gl.polygon.stipple {
        FallbackReason::PolygonStipple
    } else if gl.multisample {
        FallbackReason::Multisample
    } else if gl.line.smooth && !low_impact_fallback {
        FallbackReason::LineSmooth
    } else if gl.point.smooth && !low_impact_fallback {
        FallbackReason::PointSmooth
    } else {
        return None;
    };
    log::debug!("software fallback: {}", reason);
    Some(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{GL_FEEDBACK, GL_SELECT};

    #[test]
    fn test_default_state_renders() {
        assert_eq!(check_fallbacks(&GlState::default(), false), None);
    }

    #[test]
    fn test_render_mode() {
        let mut gl = GlState::default();
        gl.render_mode = GL_SELECT;
        assert_eq!(check_fallbacks(&gl, true), Some(FallbackReason::RenderMode));
        gl.render_mode = GL_FEEDBACK;
        assert_eq!(check_fallbacks(&gl, true), Some(FallbackReason::RenderMode));
    }

    #[test]
    fn test_two_sided_stencil_refs() {
        let mut gl = GlState::default();
        gl.stencil.enabled = true;
        gl.stencil.two_side = true;
        gl.stencil.back.reference = 1;
        assert_eq!(
            check_fallbacks(&gl, false),
            Some(FallbackReason::StencilTwoSideRefs)
        );

        gl.stencil.back.reference = 0;
        assert_eq!(check_fallbacks(&gl, false), None);
    }

    #[test]
    fn test_smoothing_respects_low_impact() {
        let mut gl = GlState::default();
        gl.line.smooth = true;
        assert_eq!(check_fallbacks(&gl, false), Some(FallbackReason::LineSmooth));
        assert_eq!(check_fallbacks(&gl, true), None);

        gl.line.smooth = false;
        gl.point.smooth = true;
        assert_eq!(check_fallbacks(&gl, false), Some(FallbackReason::PointSmooth));
        assert_eq!(check_fallbacks(&gl, true), None);
    }

    #[test]
    fn test_unconditional_features() {
        let mut gl = GlState::default();
        gl.polygon.stipple = true;
        assert_eq!(check_fallbacks(&gl, true), Some(FallbackReason::PolygonStipple));

        let mut gl = GlState::default();
        gl.multisample = true;
        assert_eq!(check_fallbacks(&gl, true), Some(FallbackReason::Multisample));

        let mut gl = GlState::default();
        gl.point.sprite = true;
        assert_eq!(check_fallbacks(&gl, true), Some(FallbackReason::PointSprite));
    }
}
