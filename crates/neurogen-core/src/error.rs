use crate::set::MapKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NeuroGenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Dimension mismatch: expected {expected_len} bytes for {width}x{height} RGBA, got {actual_len}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected_len: usize,
        actual_len: usize,
    },
    #[error("No source maps provided for mask packing")]
    InsufficientInputs,
    #[error("Slot {0} already has a generation pending")]
    SlotBusy(MapKind),
    #[error("Upstream generator failed: {0}")]
    Upstream(String),
}

pub type Result<T> = std::result::Result<T, NeuroGenError>;
