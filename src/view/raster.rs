//! Software implementation of [`DrawSurface`] over an RGBA pixel buffer.
//!
//! Used by the native host (the finished frame is uploaded to the GPU as a
//! texture) and by tests, which can inspect every pixel.

use std::path::Path;
use std::rc::Rc;

use glam::{Affine2, Vec2};
use image::{Rgba, RgbaImage};

use crate::model::{ImageResource, LoadState};
use crate::view::surface::{DrawSurface, Rect};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Decoded sprite sheet plus its load state. Clones share the pixels.
#[derive(Debug, Clone, Default)]
pub struct RasterImage {
    state: LoadState,
    pixels: Option<Rc<RgbaImage>>,
}

impl RasterImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            state: LoadState::Ready,
            pixels: Some(Rc::new(pixels)),
        }
    }

    /// Decode an image file. Failure is reported through the load state.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match image::open(path) {
            Ok(decoded) => {
                let pixels = decoded.to_rgba8();
                tracing::info!(
                    path = %path.display(),
                    width = pixels.width(),
                    height = pixels.height(),
                    "image loaded"
                );
                Self::from_rgba(pixels)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "image failed to load");
                Self {
                    state: LoadState::Failed,
                    pixels: None,
                }
            }
        }
    }

    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_deref()
    }
}

impl ImageResource for RasterImage {
    fn load_state(&self) -> LoadState {
        self.state
    }
}

pub struct PixelSurface {
    pixels: RgbaImage,
    transform: Affine2,
    saved: Vec<Affine2>,
    smoothing: bool,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            transform: Affine2::IDENTITY,
            saved: Vec::new(),
            smoothing: true,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    pub fn image_smoothing(&self) -> bool {
        self.smoothing
    }

    fn sample(&self, sheet: &RgbaImage, src: Rect, u: f32, v: f32) -> Option<Rgba<u8>> {
        // Texel lookups never leave the source rectangle
        let min_x = src.x.floor().max(0.0) as i64;
        let min_y = src.y.floor().max(0.0) as i64;
        let max_x = ((src.x + src.w).ceil() as i64).min(sheet.width() as i64) - 1;
        let max_y = ((src.y + src.h).ceil() as i64).min(sheet.height() as i64) - 1;
        if max_x < min_x || max_y < min_y {
            return None;
        }
        let texel = |x: i64, y: i64| *sheet.get_pixel(x.clamp(min_x, max_x) as u32, y.clamp(min_y, max_y) as u32);

        if !self.smoothing {
            return Some(texel(u.floor() as i64, v.floor() as i64));
        }

        let (fu, fv) = (u - 0.5, v - 0.5);
        let (x0, y0) = (fu.floor(), fv.floor());
        let (tx, ty) = (fu - x0, fv - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);
        let corners = [
            (texel(x0, y0), (1.0 - tx) * (1.0 - ty)),
            (texel(x0 + 1, y0), tx * (1.0 - ty)),
            (texel(x0, y0 + 1), (1.0 - tx) * ty),
            (texel(x0 + 1, y0 + 1), tx * ty),
        ];
        let mut out = [0u8; 4];
        for (c, channel) in out.iter_mut().enumerate() {
            let value: f32 = corners.iter().map(|(p, w)| p.0[c] as f32 * w).sum();
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
        Some(Rgba(out))
    }
}

impl DrawSurface for PixelSurface {
    type Image = RasterImage;

    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.smoothing = enabled;
    }

    fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = TRANSPARENT;
        }
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.transform = self.transform * Affine2::from_translation(Vec2::new(x, y));
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
    }

    fn draw_image(&mut self, image: &RasterImage, src: Rect, dst: Rect) {
        let Some(sheet) = image.pixels() else {
            return;
        };
        if dst.w <= 0.0 || dst.h <= 0.0 {
            return;
        }

        // Screen-space bounds of the transformed destination quad
        let corners = [
            Vec2::new(dst.x, dst.y),
            Vec2::new(dst.x + dst.w, dst.y),
            Vec2::new(dst.x, dst.y + dst.h),
            Vec2::new(dst.x + dst.w, dst.y + dst.h),
        ]
        .map(|c| self.transform.transform_point2(c));
        let lo = corners.iter().fold(Vec2::splat(f32::INFINITY), |a, c| a.min(*c));
        let hi = corners.iter().fold(Vec2::splat(f32::NEG_INFINITY), |a, c| a.max(*c));

        let x0 = lo.x.floor().max(0.0) as u32;
        let y0 = lo.y.floor().max(0.0) as u32;
        let x1 = (hi.x.ceil().max(0.0) as u32).min(self.width());
        let y1 = (hi.y.ceil().max(0.0) as u32).min(self.height());

        let to_local = self.transform.inverse();
        for py in y0..y1 {
            for px in x0..x1 {
                let local = to_local.transform_point2(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                if !dst.contains(local.x, local.y) {
                    continue;
                }
                let u = src.x + (local.x - dst.x) / dst.w * src.w;
                let v = src.y + (local.y - dst.y) / dst.h * src.h;
                if let Some(color) = self.sample(sheet, src, u, v) {
                    blend_over(self.pixels.get_pixel_mut(px, py), color);
                }
            }
        }
    }
}

/// Source-over compositing of non-premultiplied RGBA
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src.0[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    if sa >= 1.0 {
        *dst = src;
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let blended = (src.0[c] as f32 * sa + dst.0[c] as f32 * da * (1.0 - sa)) / out_a;
        dst.0[c] = blended.round() as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}
