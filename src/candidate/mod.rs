//! Candidate pruning.
//!
//! Greedy IoU suppression shared by the per-tile and the global pass.

pub(crate) mod nms;
