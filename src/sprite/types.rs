use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::error::{AssetError, Result};

static NEXT_SPRITE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying one sprite asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(u64);

impl SpriteId {
    fn next() -> Self {
        Self(NEXT_SPRITE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SpriteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sprite#{}", self.0)
    }
}

/// An immutable RGBA sprite image
///
/// Cloning a sprite is cheap: the pixels are shared, and the clone keeps the
/// same [`SpriteId`]. Two sprites compare equal when they are the same asset,
/// not merely when their pixels match.
#[derive(Clone, Debug)]
pub struct Sprite {
    id: SpriteId,
    label: Option<Arc<str>>,
    image: Arc<RgbaImage>,
}

impl Sprite {
    /// Wrap a decoded RGBA image
    pub fn new(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(AssetError::InvalidSprite {
                reason: format!("sprite has zero area ({}x{})", image.width(), image.height()),
            }
            .into());
        }

        Ok(Self {
            id: SpriteId::next(),
            label: None,
            image: Arc::new(image),
        })
    }

    /// Create a sprite from raw RGBA bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = data.len();
        let image = ImageBuffer::from_raw(width, height, data).ok_or_else(|| {
            AssetError::InvalidSprite {
                reason: format!("{} bytes do not describe a {}x{} RGBA image", len, width, height),
            }
        })?;
        Self::new(image)
    }

    /// Create a sprite filled with a single color
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Result<Self> {
        Self::new(ImageBuffer::from_pixel(width, height, Rgba(color)))
    }

    /// Attach a human-readable label (usually the source file name)
    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(Arc::from(label.into()));
        self
    }

    pub fn id(&self) -> SpriteId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGBA array)
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Borrow the underlying image buffer
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Check whether two handles refer to the same asset
    pub fn same_asset(&self, other: &Sprite) -> bool {
        self.id == other.id
    }
}

impl PartialEq for Sprite {
    fn eq(&self, other: &Self) -> bool {
        self.same_asset(other)
    }
}

impl Eq for Sprite {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_area_sprite_is_rejected() {
        assert!(Sprite::new(RgbaImage::new(0, 4)).is_err());
        assert!(Sprite::filled(3, 0, [0, 0, 0, 255]).is_err());
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Sprite::from_rgba(2, 2, vec![0; 15]).is_err());

        let sprite = Sprite::from_rgba(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(sprite.pixel(1, 0), [5, 6, 7, 8]);
    }

    #[test]
    fn test_identity_is_per_asset() {
        let a = Sprite::filled(2, 2, [10, 20, 30, 255]).unwrap();
        let b = Sprite::filled(2, 2, [10, 20, 30, 255]).unwrap();
        let a_clone = a.clone().with_label("cat_000.png");

        assert_eq!(a, a_clone);
        assert_ne!(a, b);
        assert_eq!(a_clone.label(), Some("cat_000.png"));
    }
}
