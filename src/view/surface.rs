use crate::model::ImageResource;

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.w && py < self.y + self.h
    }
}

/// 2D raster target with canvas-style transform state.
///
/// `translate` and `rotate` compose onto the current transform in local
/// space; `save`/`restore` push and pop it.
pub trait DrawSurface {
    type Image: ImageResource;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn set_image_smoothing(&mut self, enabled: bool);

    /// Reset every pixel to transparent
    fn clear(&mut self);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);

    /// Blit `src` of `image` scaled into `dst` under the current transform
    fn draw_image(&mut self, image: &Self::Image, src: Rect, dst: Rect);
}
