//! Rayon row-parallel surface computation (feature-gated).
//!
//! Used for whole-frame templates, which run as a single pool task and are
//! otherwise the slowest unit of work in a cycle.

use crate::kernel::{surface_size, Kernel, ScanParams, Surface};
use crate::ImageView;
use rayon::prelude::*;

/// Computes the same surface as [`Kernel::surface`], one row per rayon task.
pub fn surface_par<K>(image: ImageView<'_, u8>, plan: &K::Plan, params: ScanParams) -> Surface
where
    K: Kernel,
    K::Plan: Sync,
{
    let (tpl_width, tpl_height) = K::plan_size(plan);
    let Some((width, height)) = surface_size(image, tpl_width, tpl_height) else {
        return Surface::empty();
    };

    let rows: Vec<Vec<f32>> = (0..height)
        .into_par_iter()
        .map(|y| {
            (0..width)
                .map(|x| K::score_at(image, plan, x, y, params))
                .collect()
        })
        .collect();

    Surface::new(rows.concat(), width, height)
}
