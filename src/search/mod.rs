//! Detections and the matching passes that produce them.
//!
//! `single` matches one template against one tile and suppresses duplicates
//! inside that tile. `parallel` fans every (tile, template) pair out to the
//! worker pool, maps tile-local results back to frame coordinates and runs a
//! second suppression pass to merge matches found by two overlapping tiles.

use crate::kernel::ScanParams;
use crate::template::TemplateId;
use std::collections::BTreeMap;

pub(crate) mod parallel;
pub(crate) mod single;

/// Axis-aligned integer rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// One located occurrence of a template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Placement of the template; always the template's exact size.
    pub rect: Rect,
    /// Score in the template's native scale (ZNCC or normalized SSD).
    pub score: f32,
    pub template: TemplateId,
}

/// Final per-template detection lists of one cycle.
///
/// Every template in the bank has an entry, empty when nothing matched.
pub type Detections = BTreeMap<TemplateId, Vec<Detection>>;

/// Configuration for the matching passes.
#[derive(Clone, Copy, Debug)]
pub struct MatchConfig {
    /// IoU above which the lower-ranked of two detections is dropped. Shared
    /// by the per-tile and the global pass.
    pub nms_overlap: f32,
    /// Minimum image-window variance for ZNCC scoring.
    pub min_var_i: f32,
    /// Row-parallel scoring for whole-frame templates (`rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            nms_overlap: 0.3,
            min_var_i: 1e-6,
            parallel: false,
        }
    }
}

impl MatchConfig {
    pub(crate) fn scan_params(&self) -> ScanParams {
        ScanParams {
            min_var_i: self.min_var_i,
        }
    }
}

pub use parallel::{match_all, remap};
pub use single::{match_tile, suppress};
