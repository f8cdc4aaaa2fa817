//! # Transform Engine
//!
//! Resolves parametric transform specs for a frame and renders transformed
//! sprites (rotate → scale → flip → alpha). Translation is a placement offset
//! and is left to the compositor.

pub mod engine;
pub mod param;
pub mod spec;

pub use engine::{Sampling, TransformEngine, TransformedSprite};
pub use param::{FrameTime, Keyframes, Param, ParamFn};
pub use spec::{Flip, ResolvedTransform, TransformSpec, Vec2};
