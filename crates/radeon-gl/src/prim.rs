//! # Primitives
//!
//! A draw request is a list of `{start, count, mode}` runs over the bound
//! vertex arrays. The hardware has no partial primitives, so every count is
//! trimmed to what the topology can draw before a packet is built.

use crate::encode::encode_primitive_type;
use crate::enums::*;
use crate::types::GLenum;

/// One run of vertices drawn with one topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    /// GL primitive mode
    pub mode: GLenum,
    /// First vertex (or first index when drawing indexed)
    pub start: u32,
    /// Vertex count before trimming
    pub count: u32,
    /// Added to every index of an indexed draw
    pub base_vertex: i32,
}

impl Primitive {
    /// `count` vertices of `mode` starting at `start`
    pub const fn new(mode: GLenum, start: u32, count: u32) -> Self {
        Self {
            mode,
            start,
            count,
            base_vertex: 0,
        }
    }

    /// Same run, indices offset by `base_vertex`
    pub const fn with_base_vertex(mut self, base_vertex: i32) -> Self {
        self.base_vertex = base_vertex;
        self
    }

    /// Hardware primitive type, `None` when the mode cannot be drawn
    pub fn hw_type(&self) -> Option<u32> {
        encode_primitive_type(self.mode)
    }

    /// Vertices actually submitted; zero means the run is skipped
    pub fn drawable_count(&self) -> u32 {
        trim_vertex_count(self.mode, self.count).unwrap_or(0)
    }
}

/// Trim `count` to a whole number of primitives of `mode`.
///
/// Strips, loops, fans and polygons only need their minimum vertex count;
/// lists drop the incomplete tail. Returns `None` for an unknown mode.
pub fn trim_vertex_count(mode: GLenum, count: u32) -> Option<u32> {
    let at_least = |min: u32| if count < min { 0 } else { count };
    let trimmed = match mode {
        GL_POINTS => count,
        GL_LINES => count - count % 2,
        GL_LINE_STRIP | GL_LINE_LOOP => at_least(2),
        GL_TRIANGLES => count - count % 3,
        GL_TRIANGLE_STRIP | GL_TRIANGLE_FAN | GL_POLYGON => at_least(3),
        GL_QUADS => count - count % 4,
        GL_QUAD_STRIP if count < 4 => 0,
        GL_QUAD_STRIP => count - count % 2,
        _ => return None,
    };
    Some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_drop_partial_tail() {
        assert_eq!(trim_vertex_count(GL_TRIANGLES, 7), Some(6));
        assert_eq!(trim_vertex_count(GL_LINES, 5), Some(4));
        assert_eq!(trim_vertex_count(GL_QUADS, 10), Some(8));
        assert_eq!(trim_vertex_count(GL_POINTS, 1), Some(1));
    }

    #[test]
    fn test_below_minimum_skipped() {
        assert_eq!(trim_vertex_count(GL_TRIANGLES, 2), Some(0));
        assert_eq!(trim_vertex_count(GL_LINE_LOOP, 1), Some(0));
        assert_eq!(trim_vertex_count(GL_TRIANGLE_FAN, 2), Some(0));
        assert_eq!(trim_vertex_count(GL_QUAD_STRIP, 3), Some(0));
        assert_eq!(trim_vertex_count(GL_POLYGON, 0), Some(0));
    }

    #[test]
    fn test_strips_keep_count() {
        assert_eq!(trim_vertex_count(GL_TRIANGLE_FAN, 5), Some(5));
        assert_eq!(trim_vertex_count(GL_TRIANGLE_STRIP, 4), Some(4));
        assert_eq!(trim_vertex_count(GL_LINE_STRIP, 2), Some(2));
        assert_eq!(trim_vertex_count(GL_QUAD_STRIP, 7), Some(6));
    }

    #[test]
    fn test_unknown_mode() {
        assert_eq!(trim_vertex_count(0x42, 3), None);
        let prim = Primitive::new(0x42, 0, 3);
        assert_eq!(prim.drawable_count(), 0);
        assert_eq!(prim.hw_type(), None);
    }

    #[test]
    fn test_trimmed_counts_are_valid_for_topology() {
        for count in 0..64 {
            assert_eq!(trim_vertex_count(GL_TRIANGLES, count).unwrap() % 3, 0);
            assert_eq!(trim_vertex_count(GL_QUADS, count).unwrap() % 4, 0);
            assert_eq!(trim_vertex_count(GL_LINES, count).unwrap() % 2, 0);
            let strip = trim_vertex_count(GL_QUAD_STRIP, count).unwrap();
            assert!(strip == 0 || (strip >= 4 && strip % 2 == 0));
        }
    }
}
