use std::f32::consts::FRAC_PI_2;

use crate::model::{Bitmap, Entity, ImageResource};
use crate::view::surface::{DrawSurface, Rect};

/// Sprite art points "up" while heading 0 points along +x
pub const SPRITE_ORIENTATION_OFFSET: f32 = FRAC_PI_2;

/// Draws entities onto a fixed surface at a fixed scale
pub struct Camera<S: DrawSurface> {
    surface: S,
    width: u32,
    height: u32,
    scale: f32,
}

impl<S: DrawSurface> Camera<S> {
    pub fn new(mut surface: S, scale: f32) -> Self {
        // Keep pixel art crisp when scaling up
        surface.set_image_smoothing(false);
        Self {
            width: surface.width(),
            height: surface.height(),
            surface,
            scale,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Clear the surface, then draw entities in order (later ones on top)
    pub fn render<'a, E, I>(&mut self, entities: I) -> usize
    where
        E: Entity<Image = S::Image> + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        self.surface.clear();

        let mut drawn = 0;
        for entity in entities {
            let pos = entity.position();
            if self.draw(entity.bitmap(), pos.x, pos.y, entity.direction()) {
                drawn += 1;
            }
        }
        tracing::trace!(drawn, "frame rendered");
        drawn
    }

    /// Draw the bitmap's current frame centred on world point (x, y).
    /// Returns false without touching the surface if the image isn't loaded.
    pub fn draw(&mut self, bitmap: &Bitmap<S::Image>, x: f32, y: f32, rotation: f32) -> bool {
        if !bitmap.image.load_state().is_ready() {
            return false;
        }

        let fw = bitmap.frame_width as f32;
        let fh = bitmap.frame_height as f32;
        let src = Rect::new(bitmap.frame_offset() as f32, 0.0, fw, fh);
        let dst = Rect::new(
            -fw / 2.0 * self.scale,
            -fh / 2.0 * self.scale,
            fw * self.scale,
            fh * self.scale,
        );

        self.surface.save();
        self.surface.translate(x * self.scale, y * self.scale);
        self.surface.rotate(rotation + SPRITE_ORIENTATION_OFFSET);
        self.surface.draw_image(&bitmap.image, src, dst);
        self.surface.restore();
        true
    }
}
