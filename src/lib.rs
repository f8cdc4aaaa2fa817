//! # Sprite-Animator
//!
//! Script-driven 2D sprite animation rendered to numbered PNG frames.
//!
//! Sprites are grouped into frame elements by event (`walking`, `sitting`,
//! ...), moved through per-frame transforms (translate, rotate, scale, flip,
//! alpha) and composited onto a background canvas. Every `save()` writes the
//! canvas as the next frame of the sequence.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sprite_animator::{
//!     composition::Animator,
//!     config::Config,
//!     transform::{Param, TransformSpec},
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut animator = Animator::new(Config::default())?;
//! animator.load_element("cat", "Sprites/Cat")?.set_position(52.0, 476.0);
//!
//! // Walk right 10 px per frame, restarting the walk cycle every 4 frames
//! let walk = TransformSpec::identity().translate(Param::linear(0.0, 10.0), 0.0);
//! animator.animate("cat", "Walking", &walk, 0..48, Some(4))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`sprite`] - Sprites, frame elements and loading from disk
//! - [`transform`] - Parametric transform specs and the transform engine
//! - [`frame`] - Canvas, compositing, frame buffer and PNG output
//! - [`motion`] - Frame-by-frame evaluation of parametric motion
//! - [`composition`] - The script-facing [`Animator`]
//! - [`config`] - Configuration management
//!
//! ## Custom Frame Sinks
//!
//! Frames go to a PNG sequence by default. Anything else can receive them by
//! implementing the [`FrameSink`](frame::FrameSink) trait:
//!
//! ```rust,no_run
//! use sprite_animator::frame::{Frame, FrameArtifact, FrameSink};
//! use sprite_animator::Result;
//!
//! struct CountingSink(u64);
//!
//! impl FrameSink for CountingSink {
//!     fn name(&self) -> &str {
//!         "counting"
//!     }
//!
//!     fn write_frame(&mut self, frame_index: u64, _frame: &Frame) -> Result<FrameArtifact> {
//!         self.0 += 1;
//!         Ok(FrameArtifact { frame_index, location: "counted".into() })
//!     }
//!
//!     fn discard_frame(&mut self, _artifact: &FrameArtifact) -> Result<()> {
//!         self.0 -= 1;
//!         Ok(())
//!     }
//! }
//! ```

pub mod composition;
pub mod config;
pub mod error;
pub mod frame;
pub mod motion;
pub mod sprite;
pub mod transform;

// Re-export commonly used types for convenience
pub use crate::{
    composition::Animator,
    config::Config,
    error::{AnimatorError, Result},
    frame::{Background, FrameBuffer, FrameSink},
    sprite::{FrameElement, Sprite},
    transform::{Param, TransformEngine, TransformSpec},
};
