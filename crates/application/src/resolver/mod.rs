//! Variable context resolution
//!
//! Merges the three overlays by precedence, then walks the input schema and
//! the computed schema to produce the final context.

pub mod engine;
pub mod merge;

pub use engine::{ContextResolver, resolve};
pub use merge::{merge_overlay_set, merge_raw};
