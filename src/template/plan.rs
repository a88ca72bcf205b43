//! Per-template statistics precomputed once at bank construction.

use crate::template::{CompareMode, Template};

/// Masked ZNCC plan.
///
/// `t_prime` holds the mask-weighted, zero-mean template so the numerator
/// of the score reduces to a dot product with raw image intensities. Sums
/// are kept in `f64`: bright, low-contrast windows cancel badly in `f32`.
#[derive(Clone, Debug)]
pub struct ZnccPlan {
    width: usize,
    height: usize,
    mask: Option<Vec<u8>>,
    sum_w: f64,
    var_t: f64,
    t_prime: Vec<f64>,
}

impl ZnccPlan {
    pub fn from_template(tpl: &Template) -> Self {
        let width = tpl.width();
        let height = tpl.height();
        let view = tpl.view();
        let mask = tpl.mask();
        let weight = |idx: usize| mask.map_or(1.0, |m| if m[idx] == 0 { 0.0 } else { 1.0 });

        let mut sum_w = 0.0f64;
        let mut sum = 0.0f64;
        for y in 0..height {
            let Some(row) = view.row(y) else { continue };
            for (x, &value) in row.iter().enumerate() {
                let w = weight(y * width + x);
                sum_w += w;
                sum += w * f64::from(value);
            }
        }

        let mean = if sum_w > 0.0 { sum / sum_w } else { 0.0 };
        let mut t_prime = Vec::with_capacity(width * height);
        let mut var_t = 0.0f64;
        for y in 0..height {
            let Some(row) = view.row(y) else { continue };
            for (x, &value) in row.iter().enumerate() {
                let t = weight(y * width + x) * (f64::from(value) - mean);
                var_t += t * t;
                t_prime.push(t);
            }
        }

        Self {
            width,
            height,
            mask: mask.map(<[u8]>::to_vec),
            sum_w,
            var_t,
            t_prime,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of valid template pixels.
    pub fn sum_w(&self) -> f64 {
        self.sum_w
    }

    /// Sum of squared zero-mean template values over valid pixels.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    pub fn t_prime(&self) -> &[f64] {
        &self.t_prime
    }

    pub fn mask(&self) -> Option<&[u8]> {
        self.mask.as_deref()
    }

    /// True when the template has no intensity variation to correlate.
    pub fn is_degenerate(&self) -> bool {
        self.sum_w < 1.0 || self.var_t <= 1e-8
    }
}

/// Masked normalized squared-difference plan.
#[derive(Clone, Debug)]
pub struct SqDiffPlan {
    width: usize,
    height: usize,
    mask: Option<Vec<u8>>,
    data: Vec<f64>,
    sum_t2: f64,
}

impl SqDiffPlan {
    pub fn from_template(tpl: &Template) -> Self {
        let width = tpl.width();
        let height = tpl.height();
        let view = tpl.view();
        let mask = tpl.mask();

        let mut data = Vec::with_capacity(width * height);
        let mut sum_t2 = 0.0f64;
        for y in 0..height {
            let Some(row) = view.row(y) else { continue };
            for (x, &value) in row.iter().enumerate() {
                let valid = mask.map_or(true, |m| m[y * width + x] != 0);
                let t = if valid { f64::from(value) } else { 0.0 };
                sum_t2 += t * t;
                data.push(t);
            }
        }

        Self {
            width,
            height,
            mask: mask.map(<[u8]>::to_vec),
            data,
            sum_t2,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Template intensities with masked pixels zeroed.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Sum of squared valid template intensities.
    pub fn sum_t2(&self) -> f64 {
        self.sum_t2
    }

    pub fn mask(&self) -> Option<&[u8]> {
        self.mask.as_deref()
    }
}

/// Plan matching the template's comparison mode.
#[derive(Clone, Debug)]
pub enum TemplatePlan {
    Zncc(ZnccPlan),
    SqDiff(SqDiffPlan),
}

impl TemplatePlan {
    pub fn compile(tpl: &Template) -> Self {
        match tpl.mode() {
            CompareMode::HigherIsBetter => TemplatePlan::Zncc(ZnccPlan::from_template(tpl)),
            CompareMode::LowerIsBetter => TemplatePlan::SqDiff(SqDiffPlan::from_template(tpl)),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            TemplatePlan::Zncc(plan) => plan.width(),
            TemplatePlan::SqDiff(plan) => plan.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            TemplatePlan::Zncc(plan) => plan.height(),
            TemplatePlan::SqDiff(plan) => plan.height(),
        }
    }
}
