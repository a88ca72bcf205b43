//! Correlation kernels and the score surfaces they produce.

use crate::ImageView;

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Scan configuration shared by kernels.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Minimum variance of an image window for ZNCC; flatter windows score
    /// as invalid.
    pub min_var_i: f32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self { min_var_i: 1e-6 }
    }
}

/// Kernel trait for scoring a template plan against an image.
pub trait Kernel {
    type Plan;

    /// Computes the score with the template's top-left at `(x, y)`.
    ///
    /// Placements that do not fit, or windows the metric cannot score, give a
    /// non-finite value.
    fn score_at(
        image: ImageView<'_, u8>,
        plan: &Self::Plan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> f32;

    /// Returns `(width, height)` of the template described by `plan`.
    fn plan_size(plan: &Self::Plan) -> (usize, usize);

    /// Scores every valid placement.
    fn surface(image: ImageView<'_, u8>, plan: &Self::Plan, params: ScanParams) -> Surface {
        let (tpl_width, tpl_height) = Self::plan_size(plan);
        let Some((width, height)) = surface_size(image, tpl_width, tpl_height) else {
            return Surface::empty();
        };
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(Self::score_at(image, plan, x, y, params));
            }
        }
        Surface::new(data, width, height)
    }
}

/// Size of the placement surface, or `None` when the template does not fit.
pub(crate) fn surface_size(
    image: ImageView<'_, u8>,
    tpl_width: usize,
    tpl_height: usize,
) -> Option<(usize, usize)> {
    if tpl_width == 0 || tpl_height == 0 {
        return None;
    }
    if image.width() < tpl_width || image.height() < tpl_height {
        return None;
    }
    Some((image.width() - tpl_width + 1, image.height() - tpl_height + 1))
}

/// Dense 2D array of match scores, one per template placement.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl Surface {
    pub(crate) fn new(data: Vec<f32>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
        }
    }

    /// Surface for a template that does not fit the image.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Iterates `(x, y, score)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, &score)| (idx % width, idx / width, score))
    }

    /// Finite cells with `score >= threshold`, row-major.
    pub fn at_least(&self, threshold: f32) -> Vec<(usize, usize, f32)> {
        self.cells()
            .filter(|&(_, _, score)| score.is_finite() && score >= threshold)
            .collect()
    }

    /// Smallest finite cell; the first one in row-major order wins ties.
    pub fn min(&self) -> Option<(usize, usize, f32)> {
        let mut best: Option<(usize, usize, f32)> = None;
        for (x, y, score) in self.cells() {
            if !score.is_finite() {
                continue;
            }
            match best {
                Some((_, _, current)) if score >= current => {}
                _ => best = Some((x, y, score)),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::Surface;

    #[test]
    fn min_skips_non_finite_and_keeps_first_tie() {
        let surface = Surface::new(vec![f32::NAN, 0.5, 0.2, 0.2, f32::INFINITY, 0.9], 3, 2);
        assert_eq!(surface.min(), Some((2, 0, 0.2)));
    }

    #[test]
    fn at_least_filters_in_row_major_order() {
        let surface = Surface::new(vec![0.9, 0.1, f32::NAN, 0.95], 2, 2);
        assert_eq!(surface.at_least(0.9), vec![(0, 0, 0.9), (1, 1, 0.95)]);
    }

    #[test]
    fn empty_surface_has_no_cells() {
        let surface = Surface::empty();
        assert!(surface.is_empty());
        assert_eq!(surface.min(), None);
        assert!(surface.at_least(f32::NEG_INFINITY).is_empty());
    }
}
