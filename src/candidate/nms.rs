//! Greedy non-maximum suppression over axis-aligned rectangles.

use crate::search::Rect;
use crate::util::math::iou;
use std::cmp::Ordering;

/// Returns the indices of rectangles that survive suppression.
///
/// Indices are visited by descending score; equal scores keep input order, so
/// the first-seen rectangle wins a tie. Each accepted rectangle suppresses
/// every later one whose IoU with it is strictly greater than
/// `overlap_threshold`. Survivors are returned in acceptance order.
pub fn nms(boxes: &[Rect], scores: &[f32], overlap_threshold: f32) -> Vec<usize> {
    debug_assert_eq!(boxes.len(), scores.len());
    let len = boxes.len().min(scores.len());

    let key = |idx: usize| {
        let score = scores[idx];
        if score.is_nan() {
            f32::NEG_INFINITY
        } else {
            score
        }
    };
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));

    let mut suppressed = vec![false; len];
    let mut kept = Vec::new();
    for (pos, &idx) in order.iter().enumerate() {
        if suppressed[idx] {
            continue;
        }
        kept.push(idx);
        for &other in &order[pos + 1..] {
            if !suppressed[other] && iou(&boxes[idx], &boxes[other]) > overlap_threshold {
                suppressed[other] = true;
            }
        }
    }

    kept
}
