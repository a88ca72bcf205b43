//! Scalar reference kernels.

use crate::kernel::{Kernel, ScanParams};
use crate::template::{SqDiffPlan, ZnccPlan};
use crate::ImageView;

/// Masked zero-normalized cross-correlation. Scores lie in `[-1, 1]`.
pub struct ZnccScalar;

/// Masked normalized squared difference. Zero is a perfect match.
pub struct SqDiffScalar;

fn fits(image: ImageView<'_, u8>, width: usize, height: usize, x: usize, y: usize) -> bool {
    image.width() >= width
        && image.height() >= height
        && x <= image.width() - width
        && y <= image.height() - height
}

impl Kernel for ZnccScalar {
    type Plan = ZnccPlan;

    fn score_at(
        image: ImageView<'_, u8>,
        tpl: &Self::Plan,
        x: usize,
        y: usize,
        params: ScanParams,
    ) -> f32 {
        let tpl_width = tpl.width();
        let tpl_height = tpl.height();
        if !fits(image, tpl_width, tpl_height, x, y) || tpl.is_degenerate() {
            return f32::NEG_INFINITY;
        }

        let t_prime = tpl.t_prime();
        let mask = tpl.mask();
        let mut dot = 0.0f64;
        let mut sum_i = 0.0f64;
        let mut sum_i2 = 0.0f64;

        for ty in 0..tpl_height {
            let Some(img_row) = image.row(y + ty) else {
                return f32::NEG_INFINITY;
            };
            let base = ty * tpl_width;
            for tx in 0..tpl_width {
                let idx = base + tx;
                if mask.is_some_and(|m| m[idx] == 0) {
                    continue;
                }
                let value = f64::from(img_row[x + tx]);
                dot += t_prime[idx] * value;
                sum_i += value;
                sum_i2 += value * value;
            }
        }

        let var_i = sum_i2 - (sum_i * sum_i) / tpl.sum_w();
        if var_i <= f64::from(params.min_var_i) {
            return f32::NEG_INFINITY;
        }

        let score = dot / (tpl.var_t() * var_i).sqrt();
        if score.is_finite() {
            score.clamp(-1.0, 1.0) as f32
        } else {
            f32::NEG_INFINITY
        }
    }

    fn plan_size(plan: &Self::Plan) -> (usize, usize) {
        (plan.width(), plan.height())
    }
}

impl Kernel for SqDiffScalar {
    type Plan = SqDiffPlan;

    fn score_at(
        image: ImageView<'_, u8>,
        tpl: &Self::Plan,
        x: usize,
        y: usize,
        _params: ScanParams,
    ) -> f32 {
        let tpl_width = tpl.width();
        let tpl_height = tpl.height();
        if !fits(image, tpl_width, tpl_height, x, y) {
            return f32::INFINITY;
        }

        let data = tpl.data();
        let mask = tpl.mask();
        let mut sse = 0.0f64;
        let mut sum_i2 = 0.0f64;

        for ty in 0..tpl_height {
            let Some(img_row) = image.row(y + ty) else {
                return f32::INFINITY;
            };
            let base = ty * tpl_width;
            for tx in 0..tpl_width {
                let idx = base + tx;
                if mask.is_some_and(|m| m[idx] == 0) {
                    continue;
                }
                let value = f64::from(img_row[x + tx]);
                let diff = value - data[idx];
                sse += diff * diff;
                sum_i2 += value * value;
            }
        }

        let score = (sse / (sum_i2 * tpl.sum_t2()).sqrt()) as f32;
        if score.is_finite() {
            score
        } else {
            f32::INFINITY
        }
    }

    fn plan_size(plan: &Self::Plan) -> (usize, usize) {
        (plan.width(), plan.height())
    }
}

#[cfg(test)]
mod tests {
    use super::{SqDiffScalar, ZnccScalar};
    use crate::kernel::{Kernel, ScanParams};
    use crate::template::{SqDiffPlan, Template, TemplateId, ZnccPlan};
    use crate::ImageView;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn make_image(width: usize, height: usize) -> Vec<u8> {
        let mut image = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                image.push(((x * 17 + y * 9 + x * y) & 0xFF) as u8);
            }
        }
        image
    }

    fn patch(image: &[u8], img_width: usize, x0: usize, y0: usize, w: usize, h: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(w * h);
        for y in 0..h {
            let start = (y0 + y) * img_width + x0;
            out.extend_from_slice(&image[start..start + w]);
        }
        out
    }

    #[test]
    fn zncc_surface_matches_bruteforce() {
        let (img_width, img_height) = (9, 7);
        let image = make_image(img_width, img_height);
        let tpl_data = vec![3u8, 80, 14, 200, 9, 61];
        let tpl = Template::new(TemplateId(0), tpl_data.clone(), 3, 2).unwrap();
        let plan = ZnccPlan::from_template(&tpl);
        let view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let surface = ZnccScalar::surface(view, &plan, ScanParams::default());
        assert_eq!((surface.width(), surface.height()), (7, 6));

        let t_mean = tpl_data.iter().map(|&v| v as f64).sum::<f64>() / 6.0;
        for (x, y, score) in surface.cells() {
            let window = patch(&image, img_width, x, y, 3, 2);
            let i_mean = window.iter().map(|&v| v as f64).sum::<f64>() / 6.0;
            let mut num = 0.0f64;
            let mut den_t = 0.0f64;
            let mut den_i = 0.0f64;
            for (&t, &i) in tpl_data.iter().zip(window.iter()) {
                let dt = t as f64 - t_mean;
                let di = i as f64 - i_mean;
                num += dt * di;
                den_t += dt * dt;
                den_i += di * di;
            }
            if den_i <= 1e-6 {
                assert!(!score.is_finite());
                continue;
            }
            let expected = num / (den_t * den_i).sqrt();
            assert!((score as f64 - expected).abs() < 1e-4, "({x}, {y})");
        }
    }

    #[test]
    fn zncc_scores_self_match_as_one() {
        let (img_width, img_height) = (12, 10);
        let image = make_image(img_width, img_height);
        let tpl_data = patch(&image, img_width, 4, 3, 5, 4);
        let tpl = Template::new(TemplateId(0), tpl_data, 5, 4).unwrap();
        let plan = ZnccPlan::from_template(&tpl);
        let view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let score = ZnccScalar::score_at(view, &plan, 4, 3, ScanParams::default());
        assert!((score - 1.0).abs() < 1e-4);
    }

    #[test]
    fn masked_pixels_do_not_affect_zncc() {
        let (img_width, img_height) = (12, 10);
        let mut image = make_image(img_width, img_height);
        let mut tpl_data = patch(&image, img_width, 2, 2, 4, 4);
        let mut mask = vec![1u8; 16];
        // Corrupt one pixel on both sides and hide it from the score.
        tpl_data[5] = 255 - tpl_data[5];
        image[3 * img_width + 3] = 0;
        mask[5] = 0;
        let tpl = Template::new(TemplateId(0), tpl_data, 4, 4)
            .unwrap()
            .with_mask(mask)
            .unwrap();
        let plan = ZnccPlan::from_template(&tpl);
        let view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let score = ZnccScalar::score_at(view, &plan, 2, 2, ScanParams::default());
        assert!((score - 1.0).abs() < 1e-4);
    }

    fn bright_low_contrast(width: usize, height: usize, low: u8, high: u8, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..width * height).map(|_| rng.random_range(low..=high)).collect()
    }

    #[test]
    fn large_low_contrast_self_match_scores_one() {
        for &(side, low, high) in &[(64usize, 200u8, 215u8), (96, 240, 244), (128, 250, 253)] {
            let data = bright_low_contrast(side, side, low, high, side as u64);
            let tpl = Template::new(TemplateId(0), data.clone(), side, side).unwrap();
            let plan = ZnccPlan::from_template(&tpl);
            let view = ImageView::from_slice(&data, side, side).unwrap();
            let score = ZnccScalar::score_at(view, &plan, 0, 0, ScanParams::default());
            assert!((score - 1.0).abs() < 1e-3, "{side}x{side}: {score}");
        }
    }

    #[test]
    fn zncc_scores_stay_in_unit_range() {
        let image = bright_low_contrast(140, 120, 248, 253, 7);
        let tpl_data = bright_low_contrast(100, 96, 248, 253, 8);
        let tpl = Template::new(TemplateId(0), tpl_data, 100, 96).unwrap();
        let plan = ZnccPlan::from_template(&tpl);
        let view = ImageView::from_slice(&image, 140, 120).unwrap();
        let surface = ZnccScalar::surface(view, &plan, ScanParams::default());
        assert!(surface
            .cells()
            .all(|(_, _, s)| !s.is_finite() || (-1.0..=1.0).contains(&s)));
    }

    #[test]
    fn large_bright_sqdiff_self_match_is_zero() {
        let data = bright_low_contrast(128, 128, 250, 253, 9);
        let tpl = Template::new(TemplateId(0), data.clone(), 128, 128).unwrap();
        let plan = SqDiffPlan::from_template(&tpl);
        let view = ImageView::from_slice(&data, 128, 128).unwrap();
        let score = SqDiffScalar::score_at(view, &plan, 0, 0, ScanParams::default());
        assert!(score.abs() < 1e-6);
    }

    #[test]
    fn flat_window_is_not_scored() {
        let image = vec![42u8; 36];
        let tpl = Template::new(TemplateId(0), vec![0u8, 10, 20, 30], 2, 2).unwrap();
        let plan = ZnccPlan::from_template(&tpl);
        let view = ImageView::from_slice(&image, 6, 6).unwrap();
        let surface = ZnccScalar::surface(view, &plan, ScanParams::default());
        assert!(surface.cells().all(|(_, _, s)| !s.is_finite()));
    }

    #[test]
    fn sqdiff_is_zero_on_exact_match() {
        let (img_width, img_height) = (10, 8);
        let image = make_image(img_width, img_height);
        let tpl_data = patch(&image, img_width, 5, 1, 3, 3);
        let tpl = Template::new(TemplateId(0), tpl_data, 3, 3).unwrap();
        let plan = SqDiffPlan::from_template(&tpl);
        let view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let score = SqDiffScalar::score_at(view, &plan, 5, 1, ScanParams::default());
        assert!(score.abs() < 1e-6);
    }

    #[test]
    fn sqdiff_matches_hand_computed_value() {
        let image = vec![10u8; 4];
        let tpl = Template::new(TemplateId(0), vec![200u8; 4], 2, 2).unwrap();
        let plan = SqDiffPlan::from_template(&tpl);
        let view = ImageView::from_slice(&image, 2, 2).unwrap();
        let score = SqDiffScalar::score_at(view, &plan, 0, 0, ScanParams::default());
        // 190^2 / (10 * 200)
        assert!((score - 18.05).abs() < 1e-3);
    }

    #[test]
    fn template_larger_than_image_gives_empty_surface() {
        let image = vec![0u8; 9];
        let tpl = Template::new(TemplateId(0), (0u8..16).collect(), 4, 4).unwrap();
        let plan = ZnccPlan::from_template(&tpl);
        let view = ImageView::from_slice(&image, 3, 3).unwrap();
        assert!(ZnccScalar::surface(view, &plan, ScanParams::default()).is_empty());
    }
}
