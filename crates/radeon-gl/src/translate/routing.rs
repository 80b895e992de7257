//! # Fragment Input Routing
//!
//! Assigns each fragment program input an interpolator and tells the
//! interpolator which vertex export feeds it.
//!
//! ```text
//! VS exports ──▶ SPI_VS_OUT_ID (semantic per export)
//!                      │
//!                      ▼
//! PS inputs  ◀── SPI_PS_INPUT_CNTL[slot] (semantic, flat shade)
//! ```
//!
//! Inputs are assigned in a fixed order: primary color, secondary color,
//! texture coordinates by unit, fog, then window position.

use arrayvec::ArrayVec;

use radeon_cmd::regs::spi;
use radeon_core::{Error, Result, warn_once};

use crate::atoms::{AtomKind, StateCache};
use crate::enums::GL_FLAT;
use crate::program::{ProgramIo, ShaderProgram};
use crate::state::GlState;

/// Colors, texture coordinates and fog
const MAX_VARYINGS: usize = 3 + ProgramIo::MAX_TEXCOORDS;

/// Interpolated inputs in assignment order, excluding window position
fn varyings(units: usize) -> impl Iterator<Item = ProgramIo> {
    [ProgramIo::COL0, ProgramIo::COL1]
        .into_iter()
        .chain((0..units).map(ProgramIo::tex))
        .chain(core::iter::once(ProgramIo::FOGC))
}

/// One resolved interpolator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Route {
    semantic: u32,
    flat: bool,
}

/// Resolve the interpolators `fp` needs against the exports of `vp`.
///
/// Inputs the vertex program does not write are dropped with a warning.
fn resolve(
    vp: &ShaderProgram,
    fp: &ShaderProgram,
    flat: bool,
    units: usize,
) -> ArrayVec<Route, MAX_VARYINGS> {
    let mut routes = ArrayVec::new();
    for io in varyings(units).filter(|io| fp.inputs.contains(*io)) {
        let Some(semantic) = vp.output_semantic(io) else {
            warn_once!("fragment input {:?} is not written by the vertex program", io);
            continue;
        };
        let is_color = io == ProgramIo::COL0 || io == ProgramIo::COL1;
        routes.push(Route {
            semantic,
            flat: flat && is_color,
        });
    }
    routes
}

/// Route fragment inputs and describe the vertex exports.
///
/// Returns the number of interpolators in use. Fails with
/// [`Error::RoutingOverflow`] without touching the cache when the program
/// needs more than `slots` interpolators.
pub fn update_routing(gl: &GlState, cache: &mut StateCache, slots: usize) -> Result<u32> {
    let (Some(vp), Some(fp)) = (&gl.vertex_program, &gl.fragment_program) else {
        return Ok(0);
    };

    let units = cache.chip().max_texture_units().min(ProgramIo::MAX_TEXCOORDS);
    let routes = resolve(vp, fp, gl.shade_model == GL_FLAT, units);
    let wpos = fp.inputs.contains(ProgramIo::WPOS);
    let needed = routes.len() + wpos as usize;
    let available = slots.min(spi::MAX_PS_INPUTS);
    if needed > available {
        log::debug!("fragment program needs {} interpolators, {} available", needed, available);
        return Err(Error::RoutingOverflow {
            needed: needed as u32,
            available: available as u32,
        });
    }

    let atom = cache.get_atom(AtomKind::Spi);

    for slot in 0..spi::MAX_PS_INPUTS {
        let mut cntl = 0;
        if let Some(route) = routes.get(slot) {
            cntl = spi::SEMANTIC.set(cntl, route.semantic);
            if route.flat {
                cntl |= spi::FLAT_SHADE;
            }
        }
        atom.set_reg(spi::SPI_PS_INPUT_CNTL_0 + slot as u32 * 4, cntl);
    }

    let mut in_control = atom.reg(spi::SPI_PS_IN_CONTROL_0).unwrap_or(0);
    in_control = spi::NUM_INTERP.set(in_control, needed as u32);
    in_control = radeon_cmd::regs::set_bit(in_control, spi::POSITION_ENA, wpos);
    in_control = spi::POSITION_ADDR.set(in_control, if wpos { routes.len() as u32 } else { 0 });
    atom.set_reg(spi::SPI_PS_IN_CONTROL_0, in_control);

    // Export i carries semantic i; four ids per register.
    let exports = vp.output_count();
    let mut ids = [0u32; 10];
    for export in 0..exports.min(ids.len() as u32 * 4) {
        ids[(export / 4) as usize] |= export << ((export % 4) * 8);
    }
    for (i, id) in ids.iter().enumerate() {
        atom.set_reg(spi::SPI_VS_OUT_ID_0 + i as u32 * 4, *id);
    }
    atom.set_field(
        spi::SPI_VS_OUT_CONFIG,
        spi::VS_EXPORT_COUNT,
        exports.saturating_sub(1),
    );

    Ok(needed as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use alloc::vec;
    use radeon_core::ChipFamily;

    fn programs(gl: &mut GlState, outputs: ProgramIo, inputs: ProgramIo) {
        gl.vertex_program = Some(Arc::new(ShaderProgram::vertex(1, vec![0; 4], outputs)));
        gl.fragment_program = Some(Arc::new(ShaderProgram::fragment(2, vec![0; 4], inputs)));
    }

    fn input_cntl(cache: &StateCache, slot: u32) -> u32 {
        cache
            .reg(AtomKind::Spi, spi::SPI_PS_INPUT_CNTL_0 + slot * 4)
            .unwrap()
    }

    #[test]
    fn test_inputs_routed_in_priority_order() {
        let mut gl = GlState::default();
        let io = ProgramIo::COL0 | ProgramIo::tex(1) | ProgramIo::FOGC;
        programs(&mut gl, io, io);
        let mut cache = StateCache::new(ChipFamily::R700);

        assert_eq!(update_routing(&gl, &mut cache, 32), Ok(3));
        assert_eq!(spi::SEMANTIC.get(input_cntl(&cache, 0)), 0);
        // Exports are packed in bit order: col0, fog, tex1.
        assert_eq!(spi::SEMANTIC.get(input_cntl(&cache, 1)), 2);
        assert_eq!(spi::SEMANTIC.get(input_cntl(&cache, 2)), 1);
        assert_eq!(input_cntl(&cache, 3), 0);

        let control = cache.reg(AtomKind::Spi, spi::SPI_PS_IN_CONTROL_0).unwrap();
        assert_eq!(spi::NUM_INTERP.get(control), 3);
        assert_eq!(control & spi::POSITION_ENA, 0);

        let config = cache.reg(AtomKind::Spi, spi::SPI_VS_OUT_CONFIG).unwrap();
        assert_eq!(spi::VS_EXPORT_COUNT.get(config), 2);
        assert_eq!(cache.reg(AtomKind::Spi, spi::SPI_VS_OUT_ID_0), Some(0x0002_0100));
    }

    #[test]
    fn test_flat_shading_marks_colors_only() {
        let mut gl = GlState::default();
        gl.shade_model = GL_FLAT;
        let io = ProgramIo::COL0 | ProgramIo::tex(0);
        programs(&mut gl, io, io);
        let mut cache = StateCache::new(ChipFamily::R700);
        update_routing(&gl, &mut cache, 32).unwrap();

        assert_ne!(input_cntl(&cache, 0) & spi::FLAT_SHADE, 0);
        assert_eq!(input_cntl(&cache, 1) & spi::FLAT_SHADE, 0);
    }

    #[test]
    fn test_missing_vertex_output_skipped() {
        let mut gl = GlState::default();
        programs(
            &mut gl,
            ProgramIo::tex(0),
            ProgramIo::COL0 | ProgramIo::tex(0),
        );
        let mut cache = StateCache::new(ChipFamily::R600);
        assert_eq!(update_routing(&gl, &mut cache, 32), Ok(1));
        assert_eq!(spi::SEMANTIC.get(input_cntl(&cache, 0)), 0);
    }

    #[test]
    fn test_window_position_takes_last_slot() {
        let mut gl = GlState::default();
        programs(
            &mut gl,
            ProgramIo::COL0,
            ProgramIo::COL0 | ProgramIo::WPOS,
        );
        let mut cache = StateCache::new(ChipFamily::R700);
        assert_eq!(update_routing(&gl, &mut cache, 32), Ok(2));

        let control = cache.reg(AtomKind::Spi, spi::SPI_PS_IN_CONTROL_0).unwrap();
        assert_ne!(control & spi::POSITION_ENA, 0);
        assert_eq!(spi::POSITION_ADDR.get(control), 1);
    }

    #[test]
    fn test_overflow_rejected_without_writes() {
        let mut gl = GlState::default();
        let io = ProgramIo::COL0 | ProgramIo::COL1 | ProgramIo::tex(0) | ProgramIo::tex(1);
        programs(&mut gl, io, io);
        let mut cache = StateCache::new(ChipFamily::R700);
        let before = input_cntl(&cache, 0);

        assert_eq!(
            update_routing(&gl, &mut cache, 3),
            Err(Error::RoutingOverflow {
                needed: 4,
                available: 3
            })
        );
        assert_eq!(input_cntl(&cache, 0), before);
    }

    #[test]
    fn test_no_programs_no_routing() {
        let gl = GlState::default();
        let mut cache = StateCache::new(ChipFamily::R700);
        assert_eq!(update_routing(&gl, &mut cache, 32), Ok(0));
    }
}
