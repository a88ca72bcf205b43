//! Gridmatch is a concurrent grayscale template matcher for screen frames.
//!
//! A frame is split into overlapping tiles, every (tile, template) pair is
//! matched on a bounded worker pool, and per-tile results are mapped back to
//! frame coordinates and merged with a second non-maximum suppression pass so
//! that objects straddling tile boundaries are reported exactly once.

pub mod bank;
mod candidate;
pub mod engine;
pub mod grid;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod pool;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use bank::{CompiledTemplate, TemplateBank};
pub use engine::{EngineConfig, MatchEngine};
pub use grid::{partition, GridSpec, Tile, TileGrid};
pub use image::frame::{Frame, FrameSource, PixelFormat, SharedImage};
pub use image::{ImageView, OwnedImage};
pub use pool::WorkerPool;
pub use search::{match_all, match_tile, Detection, Detections, MatchConfig, Rect};
pub use template::{CompareMode, Template, TemplateId};
pub use util::{GridMatchError, GridMatchResult};

#[cfg(feature = "image-io")]
pub use image::io;
