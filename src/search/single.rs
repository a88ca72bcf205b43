//! Matching one template against one tile.

use crate::bank::CompiledTemplate;
use crate::candidate::nms::nms;
use crate::kernel::scalar::{SqDiffScalar, ZnccScalar};
use crate::kernel::{Kernel, ScanParams, Surface};
use crate::search::{Detection, MatchConfig, Rect};
use crate::template::{CompareMode, TemplatePlan};
use crate::trace::{trace_span, trace_warn};
use crate::ImageView;

/// Finds every occurrence of `compiled` in `tile`, in tile-local coordinates.
///
/// `HigherIsBetter` templates report each surface cell at or above the
/// threshold, reduced by non-maximum suppression. `LowerIsBetter` templates
/// report at most the single global minimum, and only when it is below the
/// threshold. A tile smaller than the template yields nothing.
pub fn match_tile(
    tile: ImageView<'_, u8>,
    compiled: &CompiledTemplate,
    cfg: &MatchConfig,
) -> Vec<Detection> {
    match_view(tile, compiled, cfg, false)
}

pub(crate) fn match_view(
    tile: ImageView<'_, u8>,
    compiled: &CompiledTemplate,
    cfg: &MatchConfig,
    parallel: bool,
) -> Vec<Detection> {
    let tpl = compiled.template();
    let _span = trace_span!("match_tile", template = tpl.id().0).entered();

    if tile.width() < tpl.width() || tile.height() < tpl.height() {
        trace_warn!(
            "template_larger_than_tile",
            template = tpl.id().0,
            tile_width = tile.width(),
            tile_height = tile.height(),
        );
        return Vec::new();
    }

    let surface = score_surface(tile, compiled.plan(), cfg, parallel);
    if surface.is_empty() {
        trace_warn!("degenerate_template", template = tpl.id().0);
        return Vec::new();
    }

    let size = (tpl.width(), tpl.height());
    let detection = |(x, y, score): (usize, usize, f32)| Detection {
        rect: Rect::new(x, y, size.0, size.1),
        score,
        template: tpl.id(),
    };

    match tpl.mode() {
        CompareMode::HigherIsBetter => {
            let candidates = surface
                .at_least(tpl.threshold())
                .into_iter()
                .map(detection)
                .collect();
            suppress(candidates, tpl.mode(), cfg.nms_overlap)
        }
        CompareMode::LowerIsBetter => surface
            .min()
            .filter(|&(_, _, score)| tpl.mode().accepts(score, tpl.threshold()))
            .map(detection)
            .into_iter()
            .collect(),
    }
}

fn score_surface(
    tile: ImageView<'_, u8>,
    plan: &TemplatePlan,
    cfg: &MatchConfig,
    parallel: bool,
) -> Surface {
    let params = cfg.scan_params();
    match plan {
        TemplatePlan::Zncc(plan) if plan.is_degenerate() => Surface::empty(),
        TemplatePlan::Zncc(plan) => surface_with::<ZnccScalar>(tile, plan, params, parallel),
        TemplatePlan::SqDiff(plan) => surface_with::<SqDiffScalar>(tile, plan, params, parallel),
    }
}

#[cfg(feature = "rayon")]
fn surface_with<K>(tile: ImageView<'_, u8>, plan: &K::Plan, params: ScanParams, parallel: bool) -> Surface
where
    K: Kernel,
    K::Plan: Sync,
{
    if parallel {
        crate::kernel::rayon::surface_par::<K>(tile, plan, params)
    } else {
        K::surface(tile, plan, params)
    }
}

#[cfg(not(feature = "rayon"))]
fn surface_with<K: Kernel>(
    tile: ImageView<'_, u8>,
    plan: &K::Plan,
    params: ScanParams,
    _parallel: bool,
) -> Surface {
    K::surface(tile, plan, params)
}

/// Greedy IoU suppression over detections of one template.
///
/// Detections are ranked best-first in the direction of `mode`; survivors are
/// returned in that order.
pub fn suppress(detections: Vec<Detection>, mode: CompareMode, overlap: f32) -> Vec<Detection> {
    if detections.len() < 2 {
        return detections;
    }
    let boxes: Vec<Rect> = detections.iter().map(|d| d.rect).collect();
    let keys: Vec<f32> = detections.iter().map(|d| mode.rank_key(d.score)).collect();
    nms(&boxes, &keys, overlap)
        .into_iter()
        .map(|idx| detections[idx])
        .collect()
}
