//! # Sprites and Frame Elements
//!
//! Sprite assets are immutable RGBA images. A [`FrameElement`] groups them by
//! event (`walking`, `sitting`, ...) and resolves `(event, frame index)` to a
//! sprite, wrapping around the sequence so cycles loop without bookkeeping.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sprite_animator::sprite::{FrameElement, SpriteLoader};
//!
//! # fn main() -> sprite_animator::Result<()> {
//! let loader = SpriteLoader::new().with_color_key([60, 60, 60]);
//!
//! let mut cat = FrameElement::new("cat");
//! cat.register_event("walking", loader.load_event_dir("Sprites/Cat/Walking")?)?;
//!
//! // Frame 9 of a 4-sprite cycle shows sprite 1
//! let sprite = cat.get_sprite("walking", 9)?;
//! # let _ = sprite;
//! # Ok(())
//! # }
//! ```

pub mod element;
pub mod loader;
pub mod types;

pub use element::{FrameElement, MotionState};
pub use loader::SpriteLoader;
pub use types::{Sprite, SpriteId};
