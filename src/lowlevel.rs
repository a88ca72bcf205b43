//! Low-level building blocks for custom matching pipelines.
//!
//! These expose template plans, kernels, surfaces and suppression for callers
//! that want to drive matching themselves instead of going through
//! `MatchEngine` or `match_all`.

pub use crate::candidate::nms::nms;
pub use crate::kernel::scalar::{SqDiffScalar, ZnccScalar};
pub use crate::kernel::{Kernel, ScanParams, Surface};
pub use crate::search::{remap, suppress};
pub use crate::template::{SqDiffPlan, TemplatePlan, ZnccPlan};

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::surface_par;
