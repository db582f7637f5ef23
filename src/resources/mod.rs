//! The concrete resource kinds a picture's opcodes reference by index.
//!
//! Each kind is a black box to the archive layer: it knows how to flatten
//! itself into the structured buffer (or encode to a standalone blob) and
//! how to reconstruct itself from the matching read. The codec only
//! arranges the kinds into tagged sections and validates the framing.

pub mod drawable;
pub mod effect;
pub mod image;
pub mod paint;
pub mod path;
pub mod text_blob;
pub mod vertices;
