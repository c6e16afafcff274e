use crate::buffer::PixelBuffer;
use crate::error::{NeuroGenError, Result};
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The encoding of an undisturbed surface normal `(0, 0, 1)`.
pub const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];

/// Derives a tangent-space normal map from `source`, treated as a height
/// field via its per-pixel luminance.
///
/// Gradients are estimated with a 3x3 Sobel kernel using toroidal
/// addressing, so the output tiles as seamlessly as the input. The
/// unnormalized normal is `(dX, dY, 1/strength)`, normalized to unit length
/// and packed into RGB as `round((c * 0.5 + 0.5) * 255)` with opaque alpha.
///
/// Convention: OpenGL-style, Y-up. `dY` is the south row minus the north
/// row of the kernel and is stored in G as computed; DirectX-convention
/// consumers flip G themselves.
///
/// The operation is pure and deterministic: identical `(source, strength)`
/// always yields a byte-identical buffer, with or without the `parallel`
/// feature.
#[instrument(skip_all, fields(width = source.width(), height = source.height(), strength))]
pub fn synthesize_normal_map(source: &PixelBuffer, strength: f32) -> Result<PixelBuffer> {
    if !strength.is_finite() || strength <= 0.0 {
        return Err(NeuroGenError::InvalidParameter(format!(
            "normal map strength must be a positive finite number, got {strength}"
        )));
    }
    let (width, height) = source.dimensions();
    let inv_strength = 1.0 / strength;
    let stride = (width as usize) * 4;
    let mut data = vec![0u8; stride * (height as usize)];

    #[cfg(feature = "parallel")]
    data.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| shade_row(source, y as i64, inv_strength, row));

    #[cfg(not(feature = "parallel"))]
    for (y, row) in data.chunks_mut(stride).enumerate() {
        shade_row(source, y as i64, inv_strength, row);
    }

    PixelBuffer::from_raw(width, height, data)
}

fn shade_row(source: &PixelBuffer, y: i64, inv_strength: f32, row: &mut [u8]) {
    for x in 0..source.width() as i64 {
        let tl = source.luma(x - 1, y - 1);
        let t = source.luma(x, y - 1);
        let tr = source.luma(x + 1, y - 1);
        let l = source.luma(x - 1, y);
        let r = source.luma(x + 1, y);
        let bl = source.luma(x - 1, y + 1);
        let b = source.luma(x, y + 1);
        let br = source.luma(x + 1, y + 1);

        let dx = (tr + 2.0 * r + br) - (tl + 2.0 * l + bl);
        let dy = (bl + 2.0 * b + br) - (tl + 2.0 * t + tr);

        let inv_len = 1.0 / (dx * dx + dy * dy + inv_strength * inv_strength).sqrt();
        let i = (x as usize) * 4;
        row[i] = encode(dx * inv_len);
        row[i + 1] = encode(dy * inv_len);
        row[i + 2] = encode(inv_strength * inv_len);
        row[i + 3] = 255;
    }
}

#[inline]
fn encode(component: f32) -> u8 {
    ((component * 0.5 + 0.5) * 255.0).round() as u8
}
