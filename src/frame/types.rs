use image::{ImageBuffer, Rgba, RgbaImage};

use crate::config::FrameConfig;
use crate::sprite::Sprite;

/// A single animation frame (the working canvas)
///
/// This is a simple wrapper around an RGBA image buffer that provides
/// convenient methods for pixel access used by the compositor and sinks.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbaImage,
}

impl Frame {
    /// Create a new frame from an RGBA image buffer
    pub fn new(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba(color));
        Self { buffer }
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGBA array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        self.buffer.put_pixel(x, y, Rgba(color));
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Get a mutable reference to the underlying image buffer
    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.buffer
    }

    /// Raw RGBA bytes, row major
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.buffer.as_raw().clone()
    }

    /// Raw RGB bytes with the alpha channel dropped
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.buffer
            .pixels()
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect()
    }
}

/// Template every new canvas is initialised from
#[derive(Clone, Debug)]
pub enum Background {
    /// Plain color fill
    Solid { width: u32, height: u32, color: [u8; 4] },

    /// A backdrop image; canvases take its dimensions
    Image(Sprite),
}

impl Background {
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::Solid { width, height, color }
    }

    pub fn image(sprite: Sprite) -> Self {
        Self::Image(sprite)
    }

    pub fn from_config(config: &FrameConfig) -> Self {
        Self::solid(config.width, config.height, config.background)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Solid { width, height, .. } => (*width, *height),
            Self::Image(sprite) => sprite.dimensions(),
        }
    }

    /// A fresh canvas holding only the template
    pub fn canvas(&self) -> Frame {
        match self {
            Self::Solid { width, height, color } => Frame::new_filled(*width, *height, *color),
            Self::Image(sprite) => Frame::new(sprite.image().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_bytes_drop_alpha() {
        let frame = Frame::new_filled(2, 1, [1, 2, 3, 4]);
        assert_eq!(frame.to_rgb_bytes(), vec![1, 2, 3, 1, 2, 3]);
        assert_eq!(frame.to_rgba_bytes().len(), 8);
    }

    #[test]
    fn test_background_canvas_dimensions() {
        let solid = Background::solid(100, 100, [255, 255, 255, 255]);
        assert_eq!(solid.canvas().dimensions(), (100, 100));

        let sprite = Sprite::filled(30, 20, [0, 128, 0, 255]).unwrap();
        let scene = Background::image(sprite);
        assert_eq!(scene.dimensions(), (30, 20));
        assert_eq!(scene.canvas().get_pixel(5, 5), [0, 128, 0, 255]);
    }
}
