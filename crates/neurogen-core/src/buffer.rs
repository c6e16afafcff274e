use crate::config::ResampleFilter;
use crate::error::{NeuroGenError, Result};
use image::RgbaImage;

/// Owned, dense, row-major RGBA8 pixel grid.
///
/// Invariant: `data.len() == width * height * 4`, enforced by every
/// constructor. Producing operations take `&PixelBuffer` and return a new
/// buffer; inputs are never mutated in place.
///
/// Neighbor lookups for gradient estimation use toroidal (wrap-around)
/// addressing via [`PixelBuffer::pixel_wrapped`], so derived maps stay
/// seamlessly tileable like their sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a buffer of `width * height` pixels, all set to `fill`.
    pub fn new(width: u32, height: u32, fill: [u8; 4]) -> Result<Self> {
        check_dimensions(width, height)?;
        let px = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(px * 4);
        for _ in 0..px {
            data.extend_from_slice(&fill);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wraps a raw RGBA byte vector. Fails with `DimensionMismatch` if the
    /// length does not match `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(NeuroGenError::DimensionMismatch {
                width,
                height,
                expected_len: expected,
                actual_len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_rgba8(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, image.into_raw())
    }

    /// Copies the buffer into an `image::RgbaImage` for encoding or interop.
    pub fn to_rgba8(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("length invariant holds by construction")
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// RGBA sample at `(x, y)`. Panics if the coordinate is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} buffer",
            self.width,
            self.height
        );
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// RGBA sample with toroidal addressing: coordinates outside
    /// `[0, width) x [0, height)` wrap modulo the buffer dimensions.
    #[inline]
    pub fn pixel_wrapped(&self, x: i64, y: i64) -> [u8; 4] {
        let wx = x.rem_euclid(self.width as i64) as u32;
        let wy = y.rem_euclid(self.height as i64) as u32;
        self.pixel(wx, wy)
    }

    /// Scalar height proxy at `(x, y)`: Rec.601 luminance normalized to
    /// `[0, 1]`, with toroidal addressing.
    #[inline]
    pub fn luma(&self, x: i64, y: i64) -> f32 {
        let [r, g, b, _] = self.pixel_wrapped(x, y);
        (r as f32 * 0.299 + g as f32 * 0.587 + b as f32 * 0.114) / 255.0
    }

    /// Returns a copy rescaled to `width * height` with the given filter.
    ///
    /// Same-dimension calls return an unmodified copy. Rescaling clamps at
    /// the image edges; wrap addressing applies to gradient sampling, not
    /// to resampling.
    pub fn resample(&self, width: u32, height: u32, filter: ResampleFilter) -> Result<Self> {
        check_dimensions(width, height)?;
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let mut data = vec![0u8; (width as usize) * (height as usize) * 4];
        match filter {
            ResampleFilter::Nearest => self.resample_nearest(width, height, &mut data),
            ResampleFilter::Bilinear => self.resample_bilinear(width, height, &mut data),
        }
        Self::from_raw(width, height, data)
    }

    fn resample_nearest(&self, width: u32, height: u32, out: &mut [u8]) {
        for y in 0..height {
            let sy = ((y as u64 * self.height as u64) / height as u64) as u32;
            let sy = sy.min(self.height - 1);
            for x in 0..width {
                let sx = ((x as u64 * self.width as u64) / width as u64) as u32;
                let sx = sx.min(self.width - 1);
                let px = self.pixel(sx, sy);
                let i = ((y as usize) * (width as usize) + (x as usize)) * 4;
                out[i..i + 4].copy_from_slice(&px);
            }
        }
    }

    fn resample_bilinear(&self, width: u32, height: u32, out: &mut [u8]) {
        let sx_ratio = self.width as f32 / width as f32;
        let sy_ratio = self.height as f32 / height as f32;
        for y in 0..height {
            let fy = ((y as f32 + 0.5) * sy_ratio - 0.5).max(0.0);
            let y0 = (fy as u32).min(self.height - 1);
            let y1 = (y0 + 1).min(self.height - 1);
            let ty = fy - y0 as f32;
            for x in 0..width {
                let fx = ((x as f32 + 0.5) * sx_ratio - 0.5).max(0.0);
                let x0 = (fx as u32).min(self.width - 1);
                let x1 = (x0 + 1).min(self.width - 1);
                let tx = fx - x0 as f32;

                let p00 = self.pixel(x0, y0);
                let p10 = self.pixel(x1, y0);
                let p01 = self.pixel(x0, y1);
                let p11 = self.pixel(x1, y1);

                let i = ((y as usize) * (width as usize) + (x as usize)) * 4;
                for c in 0..4 {
                    let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
                    let bottom = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
                    out[i + c] = (top * (1.0 - ty) + bottom * ty).round() as u8;
                }
            }
        }
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(NeuroGenError::InvalidParameter(format!(
            "buffer dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}
