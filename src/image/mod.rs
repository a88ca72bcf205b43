//! Grayscale image storage and borrowed views.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! Tiles are ROI views that keep the parent's stride, so partitioning a frame
//! never copies pixels.

use crate::search::Rect;
use crate::util::{GridMatchError, GridMatchResult};

pub mod frame;
#[cfg(feature = "image-io")]
pub mod io;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> GridMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> GridMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(GridMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns row `y` trimmed to `width` elements.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Returns a zero-copy view of `rect` inside this view.
    pub fn roi(&self, rect: Rect) -> GridMatchResult<ImageView<'a, T>> {
        let out_of_bounds = GridMatchError::RoiOutOfBounds {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            img_width: self.width,
            img_height: self.height,
        };
        if rect.width == 0 || rect.height == 0 {
            return Err(GridMatchError::InvalidDimensions {
                width: rect.width,
                height: rect.height,
            });
        }
        let end_x = rect.x.checked_add(rect.width).ok_or(out_of_bounds.clone())?;
        let end_y = rect.y.checked_add(rect.height).ok_or(out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = rect.y * self.stride + rect.x;
        let data = self.data.get(start..).ok_or(out_of_bounds)?;
        ImageView::new(data, rect.width, rect.height, self.stride)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> GridMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(GridMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(GridMatchError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(GridMatchError::InvalidDimensions { width, height })
}

/// Owned contiguous grayscale image buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer of exactly `width * height` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> GridMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(GridMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(GridMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(GridMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(GridMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a borrowed view of the whole image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}
