use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{AssetError, Result},
    sprite::Sprite,
    transform::{Flip, ResolvedTransform, Vec2},
};

/// Persistent placement and transform state of a frame element
///
/// This is what parametric motion writes to; it stays as last set until
/// something changes it again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    /// Top-left anchor on the canvas
    pub position: Vec2,
    /// Degrees, counter-clockwise
    pub rotation: f64,
    pub scale: f64,
    pub flip: Flip,
    pub alpha: f64,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
            flip: Flip::None,
            alpha: 1.0,
        }
    }
}

impl MotionState {
    /// Default state placed at `(x, y)`
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// Pixel transform for this state; the position is carried separately
    pub fn transform(&self) -> ResolvedTransform {
        ResolvedTransform {
            translate: Vec2::ZERO,
            rotation: self.rotation,
            scale: self.scale,
            flip: self.flip,
            alpha: self.alpha,
        }
    }

    /// Whole-pixel anchor on the canvas
    pub fn placement(&self) -> (i64, i64) {
        self.position.round()
    }

    /// State reached by moving `origin` through `resolved`
    pub fn moved(origin: Vec2, resolved: &ResolvedTransform) -> Self {
        Self {
            position: origin + resolved.translate,
            rotation: resolved.rotation,
            scale: resolved.scale,
            flip: resolved.flip,
            alpha: resolved.alpha,
        }
    }
}

/// A named entity whose sprites are grouped by event
///
/// A cat might be one element with `sitting`, `standing` and `walking`
/// events. Looking up a sprite wraps the index around the event's sequence,
/// so any non-negative frame index is valid and cycles loop by themselves.
#[derive(Debug, Clone)]
pub struct FrameElement {
    name: String,
    events: HashMap<String, Vec<Sprite>>,
    cursors: HashMap<String, usize>,
    state: MotionState,
}

impl FrameElement {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            events: HashMap::new(),
            cursors: HashMap::new(),
            state: MotionState::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store an ordered sprite sequence under `event`
    ///
    /// Replaces any sequence previously registered under the same name.
    pub fn register_event<S: Into<String>>(&mut self, event: S, sprites: Vec<Sprite>) -> Result<()> {
        let event = event.into();
        if sprites.is_empty() {
            return Err(AssetError::EmptySequence {
                element: self.name.clone(),
                event,
            }
            .into());
        }

        debug!("Registered event '{}' on '{}' with {} sprites", event, self.name, sprites.len());
        self.cursors.remove(&event);
        self.events.insert(event, sprites);
        Ok(())
    }

    /// Builder form of [`register_event`](Self::register_event)
    pub fn with_event<S: Into<String>>(mut self, event: S, sprites: Vec<Sprite>) -> Result<Self> {
        self.register_event(event, sprites)?;
        Ok(self)
    }

    fn sequence(&self, event: &str) -> Result<&[Sprite]> {
        self.events
            .get(event)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                AssetError::UnknownEvent {
                    element: self.name.clone(),
                    event: event.to_string(),
                }
                .into()
            })
    }

    /// Sprite shown at `frame_index` of `event`, wrapping around the sequence
    pub fn get_sprite(&self, event: &str, frame_index: u64) -> Result<&Sprite> {
        let sprites = self.sequence(event)?;
        let index = (frame_index % sprites.len() as u64) as usize;
        Ok(&sprites[index])
    }

    /// Number of sprites registered under `event`
    pub fn event_len(&self, event: &str) -> Result<usize> {
        Ok(self.sequence(event)?.len())
    }

    pub fn has_event(&self, event: &str) -> bool {
        self.events.contains_key(event)
    }

    /// Registered event names in alphabetical order
    pub fn events(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.events.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Step the event's sprite cursor and return the index to draw
    ///
    /// The cursor starts before the first sprite, moves `1 + skip` sprites per
    /// call and wraps, so a cycle can be continued across separately scripted
    /// stretches of frames.
    pub fn advance_cursor(&mut self, event: &str, skip: usize) -> Result<usize> {
        let len = self.sequence(event)?.len();
        let next = match self.cursors.get(event) {
            Some(current) => (current + 1 + skip) % len,
            None => skip % len,
        };
        self.cursors.insert(event.to_string(), next);
        Ok(next)
    }

    /// Forget the cursor position of `event`
    pub fn reset_cursor(&mut self, event: &str) {
        self.cursors.remove(event);
    }

    pub fn motion_state(&self) -> &MotionState {
        &self.state
    }

    pub fn set_motion_state(&mut self, state: MotionState) {
        self.state = state;
    }

    /// Move the anchor without touching the other state
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.state.position = Vec2::new(x, y);
    }
}
