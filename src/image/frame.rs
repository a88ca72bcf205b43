//! Captured frames and their single-channel intensity form.
//!
//! A `Frame` is whatever the capture side produced, in one of a few fixed
//! channel layouts. Matching always runs on intensity, so each cycle converts
//! the frame once into a `SharedImage` that worker tasks read concurrently.

use crate::image::{ImageView, OwnedImage};
use crate::util::{GridMatchError, GridMatchResult};
use std::sync::Arc;

/// Channel layout of a frame's pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    Bgr8,
    Bgra8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Bgr8 | PixelFormat::Rgb8 => 3,
            PixelFormat::Bgra8 | PixelFormat::Rgba8 => 4,
        }
    }

    /// Byte offsets of the red, green and blue channels.
    fn rgb_offsets(self) -> Option<(usize, usize, usize)> {
        match self {
            PixelFormat::Gray8 => None,
            PixelFormat::Bgr8 | PixelFormat::Bgra8 => Some((2, 1, 0)),
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => Some((0, 1, 2)),
        }
    }
}

/// One captured screenshot.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl Frame {
    /// Wraps a tightly packed pixel buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize, format: PixelFormat) -> GridMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(GridMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(format.channels()))
            .ok_or(GridMatchError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(GridMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Wraps a single-channel buffer.
    pub fn gray(data: Vec<u8>, width: usize, height: usize) -> GridMatchResult<Self> {
        Self::new(data, width, height, PixelFormat::Gray8)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Converts the frame to intensity.
    ///
    /// Color layouts use BT.601 weights in 14-bit fixed point; alpha is
    /// ignored. Gray frames are copied as-is.
    pub fn to_luma(&self) -> SharedImage {
        let luma = match self.format.rgb_offsets() {
            None => self.data.clone(),
            Some((r, g, b)) => self
                .data
                .chunks_exact(self.format.channels())
                .map(|px| luma_u8(px[r], px[g], px[b]))
                .collect(),
        };
        SharedImage(Arc::new(OwnedImage {
            data: luma,
            width: self.width,
            height: self.height,
        }))
    }
}

const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// BT.601 luma with rounding, weights summing to `1 << 14`.
pub(crate) fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let sum = u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B;
    ((sum + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Reference-counted intensity image shared by worker tasks.
#[derive(Clone, Debug)]
pub struct SharedImage(Arc<OwnedImage>);

impl SharedImage {
    pub fn new(image: OwnedImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn width(&self) -> usize {
        self.0.width()
    }

    pub fn height(&self) -> usize {
        self.0.height()
    }

    pub fn view(&self) -> ImageView<'_, u8> {
        self.0.view()
    }
}

/// Produces one frame per matching cycle.
///
/// Returning `None` means no frame is available; the cycle is skipped.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

impl<F> FrameSource for F
where
    F: FnMut() -> Option<Frame>,
{
    fn next_frame(&mut self) -> Option<Frame> {
        self()
    }
}
