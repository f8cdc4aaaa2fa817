use image::{Rgba, RgbaImage};

use crate::frame::Frame;

/// Pastes sprites onto a canvas with "source over" alpha blending
///
/// Positions are the top-left corner of the sprite and may be negative or
/// lie past the canvas edge; whatever falls outside is clipped.
pub struct Compositor;

impl Compositor {
    /// Blend `sprite` onto `canvas` at `position`
    ///
    /// Returns `false` when no part of the sprite lands on the canvas.
    pub fn paste(canvas: &mut Frame, sprite: &RgbaImage, position: (i64, i64)) -> bool {
        let (x, y) = position;
        let (canvas_w, canvas_h) = (i64::from(canvas.width()), i64::from(canvas.height()));

        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(i64::from(sprite.width())).min(canvas_w);
        let y1 = y.saturating_add(i64::from(sprite.height())).min(canvas_h);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }

        let target = canvas.as_image_mut();
        for cy in y0..y1 {
            for cx in x0..x1 {
                let src = *sprite.get_pixel((cx - x) as u32, (cy - y) as u32);
                let dst = target.get_pixel_mut(cx as u32, cy as u32);
                *dst = over(*dst, src);
            }
        }
        true
    }
}

/// Porter-Duff "over" on straight (non-premultiplied) RGBA
///
/// `out_a = sa + da * (1 - sa)` and
/// `out_rgb = (src * sa + dst * da * (1 - sa)) / out_a`. Over an opaque
/// destination this is `src * sa + dst * (1 - sa)`.
pub fn over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    match src[3] {
        0 => dst,
        255 => src,
        _ => {
            let sa = f32::from(src[3]) / 255.0;
            let da = f32::from(dst[3]) / 255.0;
            let out_a = sa + da * (1.0 - sa);
            if out_a <= 0.0 {
                return Rgba([0, 0, 0, 0]);
            }

            let channel = |s: u8, d: u8| -> u8 {
                let blended = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
                blended.round().clamp(0.0, 255.0) as u8
            };

            Rgba([
                channel(src[0], dst[0]),
                channel(src[1], dst[1]),
                channel(src[2], dst[2]),
                (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
            ])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    #[test]
    fn test_over_transparent_is_noop() {
        let dst = Rgba([10, 20, 30, 40]);
        assert_eq!(over(dst, Rgba([255, 255, 255, 0])), dst);
    }

    #[test]
    fn test_over_opaque_replaces() {
        let src = Rgba([255, 0, 0, 255]);
        assert_eq!(over(Rgba([0, 0, 0, 255]), src), src);
    }

    #[test]
    fn test_over_half_alpha_on_opaque() {
        let out = over(Rgba([0, 0, 0, 255]), Rgba([200, 100, 50, 128]));
        // 200 * 128/255 = 100.4
        assert_eq!(out, Rgba([100, 50, 25, 255]));
    }

    #[test]
    fn test_over_accumulates_alpha() {
        let out = over(Rgba([0, 0, 255, 128]), Rgba([255, 0, 0, 128]));
        // 0.502 + 0.502 * 0.498 = 0.752
        assert_eq!(out[3], 192);
        assert!(out[0] > out[2]);
    }

    #[test]
    fn test_opaque_paste_overwrites_exactly() {
        let mut canvas = Frame::new_filled(10, 10, [1, 2, 3, 255]);
        canvas.set_pixel(4, 4, [90, 90, 90, 255]);
        let sprite: RgbaImage = ImageBuffer::from_fn(3, 2, |x, y| Rgba([x as u8 * 50, y as u8 * 50, 7, 255]));

        assert!(Compositor::paste(&mut canvas, &sprite, (3, 4)));

        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(canvas.get_pixel(3 + x, 4 + y), sprite.get_pixel(x, y).0);
            }
        }
        assert_eq!(canvas.get_pixel(2, 4), [1, 2, 3, 255]);
        assert_eq!(canvas.get_pixel(6, 4), [1, 2, 3, 255]);
    }

    #[test]
    fn test_partially_offscreen_paste_is_clipped() {
        let mut canvas = Frame::new_filled(4, 4, [0, 0, 0, 255]);
        let sprite: RgbaImage = ImageBuffer::from_fn(3, 3, |x, y| Rgba([x as u8 * 100, y as u8 * 100, 0, 255]));

        assert!(Compositor::paste(&mut canvas, &sprite, (-2, 2)));

        // Only sprite column 2 and rows 0..2 are visible
        assert_eq!(canvas.get_pixel(0, 2), [200, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(0, 3), [200, 100, 0, 255]);
        assert_eq!(canvas.get_pixel(1, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn test_offscreen_paste_leaves_canvas_unchanged() {
        let mut canvas = Frame::new_filled(8, 8, [5, 6, 7, 255]);
        let before = canvas.clone();
        let sprite: RgbaImage = ImageBuffer::from_pixel(4, 4, Rgba([255, 0, 0, 255]));

        for position in [(8, 0), (0, 8), (-4, 0), (0, -4), (i64::MAX, i64::MAX), (i64::MIN, 3)] {
            assert!(!Compositor::paste(&mut canvas, &sprite, position));
        }
        assert_eq!(canvas, before);
    }
}
