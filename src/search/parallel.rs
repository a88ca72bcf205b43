//! Fan-out of (tile, template) pairs onto the worker pool.
//!
//! Each task writes into its own pre-sized slot, so tasks never contend on
//! results. After the barrier, tile-local detections are shifted into frame
//! coordinates and a second suppression pass runs per template: an object in
//! the overlap band between two tiles is found once in each tile, and only in
//! shared coordinates can the two boxes be recognized as the same object.

use crate::bank::{CompiledTemplate, TemplateBank};
use crate::grid::{Tile, TileGrid};
use crate::image::frame::SharedImage;
use crate::pool::WorkerPool;
use crate::search::single::{match_view, suppress};
use crate::search::{Detection, Detections, MatchConfig, Rect};
use crate::trace::{trace_event, trace_span, trace_warn};
use std::sync::{Arc, OnceLock};

struct Job {
    template_idx: usize,
    tile: Tile,
}

/// Matches every template in `bank` against `frame`.
///
/// Templates flagged as divided are matched once per tile of `grid`; the rest
/// run once against the whole frame. Blocks until all tasks are done. The
/// returned map has one entry per template.
///
/// A grid built for another frame size leaves the divided templates empty;
/// whole-frame templates still run.
pub fn match_all(
    frame: &SharedImage,
    grid: &TileGrid,
    bank: &TemplateBank,
    pool: &WorkerPool,
    cfg: &MatchConfig,
) -> Detections {
    let grid = if grid.frame_size() == (frame.width(), frame.height()) {
        Some(grid)
    } else {
        trace_warn!(
            "grid_frame_mismatch",
            frame_width = frame.width(),
            frame_height = frame.height(),
        );
        None
    };
    match_with_grid(frame, grid, bank, pool, cfg)
}

/// Like [`match_all`], but `None` means no usable grid: divided templates
/// report nothing and only whole-frame templates are scheduled.
pub(crate) fn match_with_grid(
    frame: &SharedImage,
    grid: Option<&TileGrid>,
    bank: &TemplateBank,
    pool: &WorkerPool,
    cfg: &MatchConfig,
) -> Detections {
    let tile_count = grid.map_or(0, TileGrid::len);
    let _span = trace_span!("match_all", templates = bank.len(), tiles = tile_count).entered();

    let mut out = empty_detections(bank);
    let Ok(whole) = TileGrid::whole(frame.width(), frame.height()) else {
        return out;
    };

    let templates: Vec<&Arc<CompiledTemplate>> = bank.iter().collect();
    let mut jobs = Vec::new();
    for (template_idx, compiled) in templates.iter().enumerate() {
        let tiles: &[Tile] = match (compiled.template().divided(), grid) {
            (true, Some(grid)) => grid.tiles(),
            (true, None) => &[],
            (false, _) => whole.tiles(),
        };
        jobs.extend(tiles.iter().map(|&tile| Job { template_idx, tile }));
    }

    let slots: Arc<[OnceLock<Vec<Detection>>]> = jobs.iter().map(|_| OnceLock::new()).collect();
    for (slot_idx, job) in jobs.iter().enumerate() {
        let compiled = Arc::clone(templates[job.template_idx]);
        let parallel = cfg.parallel && !compiled.template().divided();
        let frame = frame.clone();
        let slots = Arc::clone(&slots);
        let tile = job.tile;
        let cfg = *cfg;
        pool.submit(move || {
            let local = match frame.view().roi(tile.rect) {
                Ok(view) => match_view(view, &compiled, &cfg, parallel),
                Err(_) => Vec::new(),
            };
            let stored = slots[slot_idx].set(local).is_ok();
            debug_assert!(stored, "result slot {slot_idx} written twice");
        });
    }
    pool.await_idle();

    let mut merged: Vec<Vec<Detection>> = vec![Vec::new(); templates.len()];
    for (job, slot) in jobs.iter().zip(slots.iter()) {
        let Some(local) = slot.get() else { continue };
        merged[job.template_idx].extend(local.iter().map(|det| remap(det, &job.tile)));
    }

    for (compiled, candidates) in templates.iter().zip(merged) {
        let tpl = compiled.template();
        let candidate_count = candidates.len();
        let kept = suppress(candidates, tpl.mode(), cfg.nms_overlap);
        trace_event!(
            "template_matched",
            template = tpl.id().0,
            candidates = candidate_count,
            detections = kept.len(),
        );
        out.insert(tpl.id(), kept);
    }

    out
}

/// Moves a tile-local detection into frame coordinates.
///
/// The tile's origin already accounts for the overlap growth on its leading
/// edges, so for an unclamped tile at `(row, col)` this is
/// `col * cell_width + x - overlap` (no subtraction on the first column), and
/// likewise for `y`.
pub fn remap(det: &Detection, tile: &Tile) -> Detection {
    let (x, y) = tile.to_frame(det.rect.x, det.rect.y);
    Detection {
        rect: Rect::new(x, y, det.rect.width, det.rect.height),
        ..*det
    }
}

/// One empty list per template in `bank`.
pub(crate) fn empty_detections(bank: &TemplateBank) -> Detections {
    bank.iter()
        .map(|compiled| (compiled.template().id(), Vec::new()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::remap;
    use crate::grid::{partition, GridSpec};
    use crate::search::{Detection, Rect};
    use crate::template::TemplateId;

    #[test]
    fn remap_matches_cell_offset_formula() {
        let spec = GridSpec {
            cols: 3,
            rows: 2,
            overlap: 5,
        };
        let grid = partition(90, 40, spec).unwrap();
        let (cell_w, cell_h) = grid.cell_size();
        for tile in grid.tiles() {
            let local = Detection {
                rect: Rect::new(7, 3, 4, 4),
                score: 0.9,
                template: TemplateId(0),
            };
            let det = remap(&local, tile);
            let shift_x = if tile.col == 0 { 0 } else { spec.overlap };
            let shift_y = if tile.row == 0 { 0 } else { spec.overlap };
            assert_eq!(det.rect.x, tile.col * cell_w + 7 - shift_x);
            assert_eq!(det.rect.y, tile.row * cell_h + 3 - shift_y);
            assert_eq!((det.rect.width, det.rect.height), (4, 4));
            assert_eq!(det.score, 0.9);
        }
    }
}
