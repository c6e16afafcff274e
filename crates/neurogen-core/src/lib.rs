//! Core library for assembling PBR texture sets.
//!
//! - Synthesis: tangent-space normal maps from a color/height image (3x3
//!   Sobel over a luminance field, toroidal addressing, OpenGL Y-up)
//! - Packing: metallic/occlusion/roughness into one HDRP-convention mask
//! - Lifecycle: a `TextureSet` of independently populated map slots
//! - Export: the `{prefix}_{id}_{suffix}.png` naming contract consumed by
//!   authoring-tool integrations
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use neurogen_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let base = ImageReader::open("brick.png")?.decode()?.to_rgba8();
//! let cfg = EngineConfig::default();
//! let mut ids = SetIdAllocator::new();
//! let mut set = TextureSet::new(ids.allocate(), PixelBuffer::from_rgba8(base)?);
//! set.populate(MapKind::Normal, &cfg, |albedo| {
//!     synthesize_normal_map(albedo, cfg.normal_strength)
//! })?;
//! for file in plan_export(&set, &cfg, true) {
//!     file.rgba.save(&file.file_name)?;
//! }
//! # Ok(()) }
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod export;
pub mod mask;
pub mod normal;
pub mod set;
pub mod source;

pub use buffer::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use mask::*;
pub use normal::*;
pub use set::*;
pub use source::*;

/// Convenience prelude for common types and functions.
/// Importing `neurogen_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::buffer::PixelBuffer;
    pub use crate::config::{EngineConfig, EngineConfigBuilder, ResampleFilter};
    pub use crate::error::{NeuroGenError, Result};
    pub use crate::export::{plan_export, ExportFile, EXPORT_PREFIX};
    pub use crate::mask::{pack_mask_map, MaskSources};
    pub use crate::normal::synthesize_normal_map;
    pub use crate::set::{MapKind, SetId, SetIdAllocator, SlotStatus, TextureSet};
    pub use crate::source::MapSource;
}
