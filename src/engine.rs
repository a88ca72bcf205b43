//! Per-frame driver owning the pool, the template bank and the grid.

use crate::bank::TemplateBank;
use crate::grid::{partition, GridSpec, TileGrid};
use crate::image::frame::{Frame, FrameSource};
use crate::pool::{default_workers, WorkerPool};
use crate::search::parallel::{empty_detections, match_with_grid};
use crate::search::{Detections, MatchConfig};
use crate::trace::trace_warn;
use crate::util::GridMatchResult;

/// Configuration for a [`MatchEngine`].
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Worker threads in the pool.
    pub workers: usize,
    pub grid: GridSpec,
    pub matching: MatchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            grid: GridSpec::default(),
            matching: MatchConfig::default(),
        }
    }
}

/// Runs one matching cycle per captured frame.
///
/// The pool is spawned once and reused. The tile grid is cached and rebuilt
/// only when the frame size changes.
pub struct MatchEngine {
    pool: WorkerPool,
    bank: TemplateBank,
    cfg: EngineConfig,
    grid: Option<TileGrid>,
}

impl MatchEngine {
    pub fn new(cfg: EngineConfig, bank: TemplateBank) -> GridMatchResult<Self> {
        let pool = WorkerPool::new(cfg.workers)?;
        Ok(Self {
            pool,
            bank,
            cfg,
            grid: None,
        })
    }

    pub fn bank(&self) -> &TemplateBank {
        &self.bank
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Matches all templates against `frame`.
    ///
    /// A grid that cannot be laid over this frame size yields empty lists
    /// for divided templates; whole-frame templates are still matched.
    pub fn process(&mut self, frame: &Frame) -> Detections {
        let size = (frame.width(), frame.height());
        if self.grid.as_ref().map(TileGrid::frame_size) != Some(size) {
            self.grid = match partition(size.0, size.1, self.cfg.grid) {
                Ok(grid) => Some(grid),
                Err(_) => {
                    trace_warn!("grid_rejected", frame_width = size.0, frame_height = size.1);
                    None
                }
            };
        }
        let luma = frame.to_luma();
        match_with_grid(
            &luma,
            self.grid.as_ref(),
            &self.bank,
            &self.pool,
            &self.cfg.matching,
        )
    }

    /// Pulls one frame from `source` and processes it. No frame means no
    /// detections this cycle.
    pub fn run_cycle<S>(&mut self, source: &mut S) -> Detections
    where
        S: FrameSource + ?Sized,
    {
        match source.next_frame() {
            Some(frame) => self.process(&frame),
            None => {
                trace_warn!("frame_unavailable");
                empty_detections(&self.bank)
            }
        }
    }
}
