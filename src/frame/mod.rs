//! # Frame Assembly
//!
//! The [`FrameBuffer`] owns the working canvas. Transformed sprites are
//! blended onto it by the [`Compositor`], and saving hands the canvas to a
//! [`FrameSink`] (a numbered PNG sequence by default) before starting the
//! next frame from the [`Background`] template.

pub mod buffer;
pub mod compositor;
pub mod sink;
pub mod types;

pub use buffer::{EmptyFramePolicy, FrameBuffer, FrameState, SaveReport};
pub use compositor::Compositor;
pub use sink::{FrameArtifact, FrameSink, MemorySink, PngSequenceWriter};
pub use types::{Background, Frame};
