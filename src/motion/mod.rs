//! # Parametric Motion
//!
//! Runs a frame element's event through a [`TransformSpec`](crate::transform::TransformSpec)
//! over a range of frames, yielding the sprite and resolved transform for
//! each one and keeping the element's motion state up to date.

pub mod evaluator;

pub use evaluator::{MotionEvaluator, MotionRun, MotionStep};
