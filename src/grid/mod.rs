//! Overlap-aware partitioning of a frame into a grid of tiles.
//!
//! The base cell size is `frame / grid` with integer division; the last row
//! and column absorb the remainder pixels, so cells are not uniform when the
//! frame does not divide evenly. Every interior-facing edge of a cell is then
//! pushed outwards by `overlap` pixels, clamped at the frame border, so that
//! patterns straddling a cell boundary are fully contained in at least one
//! tile.

use crate::image::ImageView;
use crate::search::Rect;
use crate::util::{GridMatchError, GridMatchResult};

/// Grid layout parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSpec {
    pub cols: usize,
    pub rows: usize,
    /// Pixels added on each interior-facing edge of a cell.
    pub overlap: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            cols: 2,
            rows: 2,
            overlap: 50,
        }
    }
}

/// One grid cell in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub row: usize,
    pub col: usize,
    /// Nominal cell before overlap growth. Cells tile the frame exactly.
    pub cell: Rect,
    /// Cell grown by the overlap and clamped to the frame. Matching runs here.
    pub rect: Rect,
}

impl Tile {
    /// Maps a tile-local position to frame coordinates.
    pub fn to_frame(&self, x: usize, y: usize) -> (usize, usize) {
        (self.rect.x + x, self.rect.y + y)
    }
}

/// Tiles laid out row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    cols: usize,
    rows: usize,
    frame_width: usize,
    frame_height: usize,
    cell_width: usize,
    cell_height: usize,
    overlap: usize,
}

impl TileGrid {
    /// Single tile covering the whole frame.
    pub fn whole(frame_width: usize, frame_height: usize) -> GridMatchResult<Self> {
        partition(
            frame_width,
            frame_height,
            GridSpec {
                cols: 1,
                rows: 1,
                overlap: 0,
            },
        )
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.tiles.get(row * self.cols + col)
    }

    /// Size of a frame this grid was built for.
    pub fn frame_size(&self) -> (usize, usize) {
        (self.frame_width, self.frame_height)
    }

    /// Base cell size from integer division.
    pub fn cell_size(&self) -> (usize, usize) {
        (self.cell_width, self.cell_height)
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Returns the zero-copy view of `tile` inside `frame`.
    pub fn view<'a>(&self, tile: &Tile, frame: ImageView<'a, u8>) -> GridMatchResult<ImageView<'a, u8>> {
        if frame.width() != self.frame_width || frame.height() != self.frame_height {
            return Err(GridMatchError::InvalidInput("frame size differs from grid"));
        }
        frame.roi(tile.rect)
    }
}

/// Splits a `frame_width x frame_height` frame into `spec.rows x spec.cols`
/// tiles.
pub fn partition(frame_width: usize, frame_height: usize, spec: GridSpec) -> GridMatchResult<TileGrid> {
    let GridSpec {
        cols,
        rows,
        overlap,
    } = spec;
    let invalid = GridMatchError::InvalidGrid {
        cols,
        rows,
        width: frame_width,
        height: frame_height,
    };
    if cols == 0 || rows == 0 {
        return Err(invalid);
    }
    let cell_width = frame_width / cols;
    let cell_height = frame_height / rows;
    if cell_width == 0 || cell_height == 0 {
        return Err(invalid);
    }

    let mut tiles = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let (y0, y1) = span(row, rows, cell_height, frame_height);
        let (gy0, gy1) = grow(row, rows, y0, y1, overlap, frame_height);
        for col in 0..cols {
            let (x0, x1) = span(col, cols, cell_width, frame_width);
            let (gx0, gx1) = grow(col, cols, x0, x1, overlap, frame_width);
            tiles.push(Tile {
                row,
                col,
                cell: Rect::new(x0, y0, x1 - x0, y1 - y0),
                rect: Rect::new(gx0, gy0, gx1 - gx0, gy1 - gy0),
            });
        }
    }

    Ok(TileGrid {
        tiles,
        cols,
        rows,
        frame_width,
        frame_height,
        cell_width,
        cell_height,
        overlap,
    })
}

/// Nominal `[start, end)` of cell `idx`; the last cell runs to the frame edge.
fn span(idx: usize, count: usize, cell: usize, extent: usize) -> (usize, usize) {
    let start = idx * cell;
    let end = if idx + 1 == count { extent } else { start + cell };
    (start, end)
}

/// Grows interior-facing edges by `overlap`, never past the frame.
fn grow(idx: usize, count: usize, start: usize, end: usize, overlap: usize, extent: usize) -> (usize, usize) {
    let start = if idx == 0 { start } else { start.saturating_sub(overlap) };
    let end = if idx + 1 == count {
        end
    } else {
        end.saturating_add(overlap).min(extent)
    };
    (start, end)
}
