//! Reference patterns and their comparison policy.
//!
//! Templates are built once at startup and never change afterwards. Each one
//! carries its own threshold, comparison direction and whether it is matched
//! per tile or against the whole frame.

use crate::image::{ImageView, OwnedImage};
use crate::util::{GridMatchError, GridMatchResult};
use std::fmt;

mod plan;

pub use plan::{SqDiffPlan, TemplatePlan, ZnccPlan};

/// Default confidence threshold for new templates.
pub const DEFAULT_THRESHOLD: f32 = 0.8;

/// Identifier of a template, unique within a bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(pub u32);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction in which a template's score is compared to its threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompareMode {
    /// Correlation score; every cell at or above the threshold is a candidate.
    #[default]
    HigherIsBetter,
    /// Squared-difference score; only the global minimum below the threshold
    /// is reported. Meant for patterns with a single on-screen instance.
    LowerIsBetter,
}

impl CompareMode {
    /// Returns true when `score` passes `threshold` in this direction.
    pub fn accepts(self, score: f32, threshold: f32) -> bool {
        if !score.is_finite() {
            return false;
        }
        match self {
            CompareMode::HigherIsBetter => score >= threshold,
            CompareMode::LowerIsBetter => score < threshold,
        }
    }

    /// Maps a score to a key where larger always means better.
    pub fn rank_key(self, score: f32) -> f32 {
        match self {
            CompareMode::HigherIsBetter => score,
            CompareMode::LowerIsBetter => -score,
        }
    }
}

/// Grayscale template with optional validity mask.
#[derive(Clone, Debug)]
pub struct Template {
    id: TemplateId,
    name: Option<String>,
    img: OwnedImage,
    mask: Option<Vec<u8>>,
    mode: CompareMode,
    threshold: f32,
    divided: bool,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    pub fn new(id: TemplateId, data: Vec<u8>, width: usize, height: usize) -> GridMatchResult<Self> {
        let img = OwnedImage::new(data, width, height)?;
        Ok(Self {
            id,
            name: None,
            img,
            mask: None,
            mode: CompareMode::default(),
            threshold: DEFAULT_THRESHOLD,
            divided: true,
        })
    }

    /// Attaches a per-pixel validity mask; zero entries are ignored by scoring.
    pub fn with_mask(mut self, mask: Vec<u8>) -> GridMatchResult<Self> {
        let expected = self.img.width() * self.img.height();
        if mask.len() != expected {
            return Err(GridMatchError::MaskSizeMismatch {
                expected,
                got: mask.len(),
            });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    pub fn with_mode(mut self, mode: CompareMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the confidence threshold, in the native scale of the mode's metric.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Chooses per-tile matching (`true`) or a single whole-frame pass.
    pub fn with_divided(mut self, divided: bool) -> Self {
        self.divided = divided;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn width(&self) -> usize {
        self.img.width()
    }

    pub fn height(&self) -> usize {
        self.img.height()
    }

    pub fn mask(&self) -> Option<&[u8]> {
        self.mask.as_deref()
    }

    pub fn mode(&self) -> CompareMode {
        self.mode
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn divided(&self) -> bool {
        self.divided
    }

    /// Returns a borrowed view of the intensity data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }
}

#[cfg(test)]
mod tests {
    use super::{CompareMode, Template, TemplateId};
    use crate::util::GridMatchError;

    #[test]
    fn compare_mode_rejects_non_finite_scores() {
        assert!(!CompareMode::HigherIsBetter.accepts(f32::NAN, 0.5));
        assert!(!CompareMode::HigherIsBetter.accepts(f32::INFINITY, 0.5));
        assert!(!CompareMode::LowerIsBetter.accepts(f32::NEG_INFINITY, 0.5));
    }

    #[test]
    fn compare_mode_threshold_direction() {
        assert!(CompareMode::HigherIsBetter.accepts(0.9, 0.9));
        assert!(!CompareMode::HigherIsBetter.accepts(0.89, 0.9));
        assert!(CompareMode::LowerIsBetter.accepts(0.05, 0.1));
        assert!(!CompareMode::LowerIsBetter.accepts(0.1, 0.1));
    }

    #[test]
    fn rank_key_prefers_better_scores() {
        let low = CompareMode::LowerIsBetter;
        assert!(low.rank_key(0.01) > low.rank_key(0.2));
        let high = CompareMode::HigherIsBetter;
        assert!(high.rank_key(0.99) > high.rank_key(0.8));
    }

    #[test]
    fn mask_must_match_template_size() {
        let tpl = Template::new(TemplateId(1), vec![0u8; 6], 3, 2).unwrap();
        let err = tpl.with_mask(vec![1u8; 5]).unwrap_err();
        assert_eq!(err, GridMatchError::MaskSizeMismatch { expected: 6, got: 5 });
    }
}
