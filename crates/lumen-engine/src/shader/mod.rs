//! Shader source inspection.
//!
//! The buffered renderer answers uniform queries on the recording side, long before the
//! backend has compiled anything, so uniforms are reflected straight from the GLSL text.

mod reflect;

pub use reflect::{reflect_uniforms, ENGINE_MATRICES};
