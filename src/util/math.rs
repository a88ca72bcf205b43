//! Integer rectangle helpers used by suppression.

use crate::search::Rect;

/// Area of the intersection of two rectangles, zero when disjoint.
pub(crate) fn intersection_area(a: &Rect, b: &Rect) -> u64 {
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = (a.x + a.width).min(b.x + b.width);
    let y1 = (a.y + a.height).min(b.y + b.height);
    if x1 <= x0 || y1 <= y0 {
        return 0;
    }
    ((x1 - x0) as u64) * ((y1 - y0) as u64)
}

/// Intersection-over-union of two rectangles.
///
/// Returns 0 when the union is empty.
pub(crate) fn iou(a: &Rect, b: &Rect) -> f32 {
    let inter = intersection_area(a, b);
    let union = a.area() + b.area() - inter;
    if union == 0 {
        return 0.0;
    }
    (inter as f64 / union as f64) as f32
}
