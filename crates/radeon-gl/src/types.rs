//! # OpenGL Types
//!
//! Scalar type aliases used by the GL-facing entry points.

// =============================================================================
// BASIC TYPES
// =============================================================================

/// OpenGL boolean type
pub type GLboolean = bool;
/// OpenGL unsigned byte type
pub type GLubyte = u8;
/// OpenGL unsigned short type
pub type GLushort = u16;
/// OpenGL int type
pub type GLint = i32;
/// OpenGL unsigned int type
pub type GLuint = u32;
/// OpenGL size type
pub type GLsizei = i32;
/// OpenGL enum type
pub type GLenum = u32;
/// OpenGL bitfield type
pub type GLbitfield = u32;
/// OpenGL float type
pub type GLfloat = f32;
/// OpenGL clamp float type
pub type GLclampf = f32;
/// OpenGL clamp double type
pub type GLclampd = f64;
