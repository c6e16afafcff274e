use crate::buffer::PixelBuffer;
use crate::config::ResampleFilter;
use crate::error::{NeuroGenError, Result};
use tracing::instrument;

// Physically neutral channel values used when a source map is absent, so a
// partially complete set still packs into a plausible material.
const DEFAULT_METALLIC: u8 = 0; // fully non-metal
const DEFAULT_OCCLUSION: u8 = 255; // fully unoccluded
const DEFAULT_SMOOTHNESS: u8 = 255; // fully smooth

/// Optional single-channel source maps for mask packing. Each map's red
/// channel carries the scalar property.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaskSources<'a> {
    pub metallic: Option<&'a PixelBuffer>,
    pub occlusion: Option<&'a PixelBuffer>,
    pub roughness: Option<&'a PixelBuffer>,
}

impl MaskSources<'_> {
    pub fn is_empty(&self) -> bool {
        self.metallic.is_none() && self.occlusion.is_none() && self.roughness.is_none()
    }
}

/// Packs up to three scalar maps into one mask texture in the HDRP channel
/// convention:
///
/// | Channel | Content                         | Absent source |
/// |---------|---------------------------------|---------------|
/// | R       | metallic                        | 0             |
/// | G       | occlusion                       | 255           |
/// | B       | reserved ("detail"), always 0   | 0             |
/// | A       | smoothness (`255 - roughness`)  | 255           |
///
/// Sources may come from different generation calls at different native
/// sizes; each present source is independently resampled to
/// `width * height` with `filter` before its red channel is extracted.
///
/// Fails with `InsufficientInputs` when all three sources are absent: an
/// all-default buffer would be a meaningless artifact, not a material.
#[instrument(skip_all, fields(width, height))]
pub fn pack_mask_map(
    sources: &MaskSources<'_>,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> Result<PixelBuffer> {
    if sources.is_empty() {
        return Err(NeuroGenError::InsufficientInputs);
    }
    if width == 0 || height == 0 {
        return Err(NeuroGenError::InvalidParameter(format!(
            "mask resolution must be positive, got {width}x{height}"
        )));
    }

    let metallic = resample_source(sources.metallic, width, height, filter)?;
    let occlusion = resample_source(sources.occlusion, width, height, filter)?;
    let roughness = resample_source(sources.roughness, width, height, filter)?;

    let px = (width as usize) * (height as usize);
    let mut data = vec![0u8; px * 4];
    for i in 0..px {
        let o = i * 4;
        data[o] = metallic
            .as_ref()
            .map_or(DEFAULT_METALLIC, |m| m.data()[o]);
        data[o + 1] = occlusion
            .as_ref()
            .map_or(DEFAULT_OCCLUSION, |m| m.data()[o]);
        data[o + 2] = 0;
        data[o + 3] = roughness
            .as_ref()
            .map_or(DEFAULT_SMOOTHNESS, |m| 255 - m.data()[o]);
    }
    PixelBuffer::from_raw(width, height, data)
}

fn resample_source(
    source: Option<&PixelBuffer>,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> Result<Option<PixelBuffer>> {
    source
        .map(|s| s.resample(width, height, filter))
        .transpose()
}
