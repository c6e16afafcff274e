use crate::buffer::PixelBuffer;
use crate::error::Result;
use crate::set::MapKind;

/// An opaque producer of derived maps, typically a remote generative-image
/// service.
///
/// The engine treats a producer as a fallible, possibly slow black box:
/// `(source image, map kind) -> image or error`. It owns no retry or
/// backoff logic; a failure is recorded on the target slot and the caller
/// decides whether to invoke the producer again.
pub trait MapSource {
    fn produce(&self, source: &PixelBuffer, kind: MapKind) -> Result<PixelBuffer>;
}
