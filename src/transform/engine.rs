use image::{imageops, ImageBuffer, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::TransformConfig,
    error::{Result, TransformError},
    sprite::Sprite,
};

use super::param::{FrameTime, Param};
use super::spec::{Flip, ResolvedTransform, TransformSpec, Vec2};

/// Largest side a transformed sprite may have
pub const MAX_DIMENSION: u32 = 16_384;

/// Resampling used for rotation and non-integer scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Hard pixel edges, suited to pixel art
    #[default]
    Nearest,
    /// Smooth edges
    Bilinear,
}

impl Sampling {
    fn filter(self) -> imageops::FilterType {
        match self {
            Sampling::Nearest => imageops::FilterType::Nearest,
            Sampling::Bilinear => imageops::FilterType::Triangle,
        }
    }
}

/// A sprite after the transform pipeline, ready for pasting
#[derive(Debug, Clone)]
pub struct TransformedSprite {
    /// Transformed pixels
    pub image: RgbaImage,

    /// Shift from the sprite's anchor to the top-left of `image`, so that
    /// rotation turns the sprite around its own centre
    pub offset: (i64, i64),
}

impl TransformedSprite {
    /// Top-left canvas position of the pixels for a sprite anchored at `anchor`
    pub fn placement(&self, anchor: (i64, i64)) -> (i64, i64) {
        (
            anchor.0.saturating_add(self.offset.0),
            anchor.1.saturating_add(self.offset.1),
        )
    }
}

/// Evaluates transform specs and renders transformed sprites
///
/// Transforms are applied in a fixed order: rotate, scale, flip, alpha.
/// The input sprite is never modified.
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    sampling: Sampling,
}

impl TransformEngine {
    pub fn new(sampling: Sampling) -> Self {
        Self { sampling }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(config.sampling)
    }

    /// Resolve every field of `spec` for one frame
    ///
    /// A loop period wraps time only for [`Param::Looped`] fields (and
    /// callables that read [`FrameTime::local`]); every other field is sampled
    /// at the absolute `frame_index`, so motion keeps progressing while the
    /// sprite cycle repeats. A period of 0 is rejected.
    pub fn evaluate(
        &self,
        spec: &TransformSpec,
        frame_index: u64,
        loop_period: Option<u64>,
    ) -> Result<ResolvedTransform> {
        if loop_period == Some(0) {
            return Err(TransformError::InvalidLoopPeriod.into());
        }

        let time = FrameTime::new(frame_index, loop_period);
        let field = |name: &'static str, param: &Param| -> Result<f64> {
            let value = param.sample(time);
            if value.is_finite() {
                Ok(value)
            } else {
                Err(TransformError::NonFinite { field: name, frame: frame_index }.into())
            }
        };

        let translate = Vec2::new(
            field("translate_x", &spec.translate_x)?,
            field("translate_y", &spec.translate_y)?,
        );
        let rotation = field("rotate", &spec.rotate)?;
        let scale = field("scale", &spec.scale)?;
        if scale <= 0.0 {
            return Err(TransformError::InvalidScale { value: scale }.into());
        }
        let alpha = field("alpha", &spec.alpha)?.clamp(0.0, 1.0);

        Ok(ResolvedTransform {
            translate,
            rotation,
            scale,
            flip: spec.flip,
            alpha,
        })
    }

    /// Render `sprite` through the transform pipeline
    pub fn apply(&self, sprite: &Sprite, resolved: &ResolvedTransform) -> Result<TransformedSprite> {
        if !resolved.scale.is_finite() || resolved.scale <= 0.0 {
            return Err(TransformError::InvalidScale { value: resolved.scale }.into());
        }
        if !resolved.rotation.is_finite() {
            return Err(TransformError::InvalidValue {
                field: "rotate",
                value: resolved.rotation,
            }
            .into());
        }
        let alpha = if resolved.alpha.is_nan() { 1.0 } else { resolved.alpha.clamp(0.0, 1.0) };

        let source = sprite.image();
        let (scaled_w, scaled_h) = scaled_dimensions(source.dimensions(), resolved.scale)?;

        if resolved.is_pixel_identity() {
            return Ok(TransformedSprite {
                image: source.clone(),
                offset: (0, 0),
            });
        }

        let mut image = rotate(source, resolved.rotation, self.sampling);
        if resolved.scale != 1.0 {
            image = scale(&image, resolved.scale, self.sampling)?;
        }
        flip(&mut image, resolved.flip);
        if alpha < 1.0 {
            multiply_alpha(&mut image, alpha);
        }

        let offset = (
            i64::from(scaled_w / 2) - i64::from(image.width() / 2),
            i64::from(scaled_h / 2) - i64::from(image.height() / 2),
        );

        debug!(
            "Transformed {} ({}x{}) -> {}x{} (rotate {:.1}, scale {:.2}, {:?}, alpha {:.2})",
            sprite.id(), source.width(), source.height(),
            image.width(), image.height(),
            resolved.rotation, resolved.scale, resolved.flip, alpha
        );

        Ok(TransformedSprite { image, offset })
    }
}

fn scaled_dimensions((width, height): (u32, u32), factor: f64) -> Result<(u32, u32)> {
    let w = (f64::from(width) * factor).round().max(1.0);
    let h = (f64::from(height) * factor).round().max(1.0);
    if w > f64::from(MAX_DIMENSION) || h > f64::from(MAX_DIMENSION) {
        return Err(TransformError::InvalidScale { value: factor }.into());
    }
    Ok((w as u32, h as u32))
}

/// Rotate counter-clockwise around the centre, expanding to fit the result
fn rotate(image: &RgbaImage, degrees: f64, sampling: Sampling) -> RgbaImage {
    let turn = degrees.rem_euclid(360.0);

    // Right angles are exact; imageops rotates clockwise
    if turn == 0.0 {
        return image.clone();
    } else if turn == 90.0 {
        return imageops::rotate270(image);
    } else if turn == 180.0 {
        return imageops::rotate180(image);
    } else if turn == 270.0 {
        return imageops::rotate90(image);
    }

    let (w, h) = (f64::from(image.width()), f64::from(image.height()));
    let (sin, cos) = turn.to_radians().sin_cos();
    let out_w = (h * sin.abs() + w * cos.abs()).round().max(1.0) as u32;
    let out_h = (h * cos.abs() + w * sin.abs()).round().max(1.0) as u32;

    let (cx, cy) = (w / 2.0, h / 2.0);
    let (out_cx, out_cy) = (f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);

    ImageBuffer::from_fn(out_w, out_h, |x, y| {
        // Inverse-map the output pixel centre back into the source (y grows downwards)
        let dx = f64::from(x) + 0.5 - out_cx;
        let dy = f64::from(y) + 0.5 - out_cy;
        let sx = dx * cos - dy * sin + cx;
        let sy = dx * sin + dy * cos + cy;
        match sampling {
            Sampling::Nearest => sample_nearest(image, sx, sy),
            Sampling::Bilinear => sample_bilinear(image, sx, sy),
        }
    })
}

fn sample_nearest(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (px, py) = (x.floor(), y.floor());
    if px < 0.0 || py < 0.0 || px >= f64::from(image.width()) || py >= f64::from(image.height()) {
        return Rgba([0, 0, 0, 0]);
    }
    *image.get_pixel(px as u32, py as u32)
}

fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let (x0, y0) = (fx.floor(), fy.floor());
    let (tx, ty) = (fx - x0, fy - y0);

    let texel = |ix: f64, iy: f64| -> [f64; 4] {
        if ix < 0.0 || iy < 0.0 || ix >= f64::from(image.width()) || iy >= f64::from(image.height()) {
            return [0.0; 4];
        }
        let p = image.get_pixel(ix as u32, iy as u32);
        let a = f64::from(p[3]) / 255.0;
        // Premultiply so transparent neighbours do not darken edges
        [f64::from(p[0]) * a, f64::from(p[1]) * a, f64::from(p[2]) * a, a]
    };

    let weights = [
        ((1.0 - tx) * (1.0 - ty), texel(x0, y0)),
        (tx * (1.0 - ty), texel(x0 + 1.0, y0)),
        ((1.0 - tx) * ty, texel(x0, y0 + 1.0)),
        (tx * ty, texel(x0 + 1.0, y0 + 1.0)),
    ];

    let mut acc = [0.0f64; 4];
    for (weight, texel) in weights {
        for i in 0..4 {
            acc[i] += weight * texel[i];
        }
    }

    let alpha = acc[3];
    if alpha <= f64::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |v: f64| (v / alpha).round().clamp(0.0, 255.0) as u8;
    Rgba([
        channel(acc[0]),
        channel(acc[1]),
        channel(acc[2]),
        (alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

fn scale(image: &RgbaImage, factor: f64, sampling: Sampling) -> Result<RgbaImage> {
    let (width, height) = scaled_dimensions(image.dimensions(), factor)?;

    // Whole-number upscales replicate pixels exactly
    if sampling == Sampling::Nearest && factor >= 1.0 && factor.fract() == 0.0 {
        let k = factor as u32;
        return Ok(ImageBuffer::from_fn(width, height, |x, y| *image.get_pixel(x / k, y / k)));
    }

    Ok(imageops::resize(image, width, height, sampling.filter()))
}

fn flip(image: &mut RgbaImage, flip: Flip) {
    if flip.horizontal() {
        imageops::flip_horizontal_in_place(image);
    }
    if flip.vertical() {
        imageops::flip_vertical_in_place(image);
    }
}

fn multiply_alpha(image: &mut RgbaImage, alpha: f64) {
    for pixel in image.pixels_mut() {
        pixel[3] = (f64::from(pixel[3]) * alpha).round() as u8;
    }
}
