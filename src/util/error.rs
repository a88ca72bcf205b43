//! Error types for gridmatch.

use thiserror::Error;

/// Result alias for gridmatch operations.
pub type GridMatchResult<T> = std::result::Result<T, GridMatchError>;

/// Errors that can occur when building or running the matching pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridMatchError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is shorter than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer does not hold enough elements.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested region does not fit inside the image.
    #[error(
        "roi ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height} image"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Validity mask length differs from the template pixel count.
    #[error("mask has {got} pixels, template has {expected}")]
    MaskSizeMismatch { expected: usize, got: usize },
    /// Grid cannot be laid over a frame of the given size.
    #[error("cannot partition {width}x{height} frame into {cols}x{rows} grid")]
    InvalidGrid {
        cols: usize,
        rows: usize,
        width: usize,
        height: usize,
    },
    /// Worker pools need at least one thread.
    #[error("worker pool needs at least one worker")]
    InvalidWorkerCount,
    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {reason}")]
    WorkerSpawn { reason: String },
    /// Two templates share one identifier.
    #[error("duplicate template id {id}")]
    DuplicateTemplateId { id: u32 },
    /// Loading or decoding an image failed.
    #[cfg(feature = "image-io")]
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
