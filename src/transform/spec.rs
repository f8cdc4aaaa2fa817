use std::ops::Add;

use serde::{Deserialize, Serialize};

use super::param::Param;

/// A 2D point or offset in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Nearest whole-pixel position
    pub fn round(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<(i64, i64)> for Vec2 {
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x as f64, y as f64)
    }
}

/// Mirror a sprite horizontally and/or vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    pub fn from_flags(horizontal: bool, vertical: bool) -> Self {
        match (horizontal, vertical) {
            (false, false) => Self::None,
            (true, false) => Self::Horizontal,
            (false, true) => Self::Vertical,
            (true, true) => Self::Both,
        }
    }

    pub fn horizontal(&self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    pub fn vertical(&self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }
}

/// Per-field description of how a sprite is transformed over time
///
/// Rotation is in degrees, counter-clockwise. Translation is a placement
/// offset; it never changes the sprite's pixels.
#[derive(Debug, Clone)]
pub struct TransformSpec {
    pub translate_x: Param,
    pub translate_y: Param,
    pub rotate: Param,
    pub scale: Param,
    pub flip: Flip,
    pub alpha: Param,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            translate_x: Param::Constant(0.0),
            translate_y: Param::Constant(0.0),
            rotate: Param::Constant(0.0),
            scale: Param::Constant(1.0),
            flip: Flip::None,
            alpha: Param::Constant(1.0),
        }
    }
}

impl TransformSpec {
    /// The no-op transform
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn translate<X: Into<Param>, Y: Into<Param>>(mut self, x: X, y: Y) -> Self {
        self.translate_x = x.into();
        self.translate_y = y.into();
        self
    }

    pub fn rotate<P: Into<Param>>(mut self, degrees: P) -> Self {
        self.rotate = degrees.into();
        self
    }

    pub fn scale<P: Into<Param>>(mut self, factor: P) -> Self {
        self.scale = factor.into();
        self
    }

    pub fn flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }

    pub fn alpha<P: Into<Param>>(mut self, alpha: P) -> Self {
        self.alpha = alpha.into();
        self
    }
}

/// A transform spec evaluated for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTransform {
    pub translate: Vec2,
    pub rotation: f64,
    pub scale: f64,
    pub flip: Flip,
    pub alpha: f64,
}

impl Default for ResolvedTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
            flip: Flip::None,
            alpha: 1.0,
        }
    }
}

impl ResolvedTransform {
    /// True when applying this transform leaves the pixels untouched
    pub fn is_pixel_identity(&self) -> bool {
        self.rotation.rem_euclid(360.0) == 0.0
            && self.scale == 1.0
            && self.flip == Flip::None
            && self.alpha >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_flags() {
        assert_eq!(Flip::from_flags(true, true), Flip::Both);
        assert!(Flip::Both.horizontal() && Flip::Both.vertical());
        assert!(!Flip::Vertical.horizontal());
    }

    #[test]
    fn test_builder_sets_fields() {
        let spec = TransformSpec::identity()
            .translate(Param::linear(0.0, 10.0), 5.0)
            .scale(2.0)
            .flip(Flip::Horizontal);

        assert!(matches!(spec.translate_x, Param::Linear { rate, .. } if rate == 10.0));
        assert!(matches!(spec.translate_y, Param::Constant(v) if v == 5.0));
        assert_eq!(spec.flip, Flip::Horizontal);
    }

    #[test]
    fn test_full_turn_is_pixel_identity() {
        let resolved = ResolvedTransform {
            rotation: 720.0,
            ..ResolvedTransform::default()
        };
        assert!(resolved.is_pixel_identity());
    }

    #[test]
    fn test_round_position() {
        assert_eq!(Vec2::new(2.5, -1.4).round(), (3, -1));
    }
}
