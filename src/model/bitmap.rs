/// Loading progress of an image resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotStarted,
    Loading,
    Ready,
    Failed,
}

impl LoadState {
    pub fn is_ready(self) -> bool {
        self == LoadState::Ready
    }
}

/// Anything a drawing surface can blit from.
///
/// Loading may finish after the owning bitmap is created, so renderers
/// check `load_state` before every draw.
pub trait ImageResource {
    fn load_state(&self) -> LoadState;
}

/// A sprite sheet laid out as a horizontal strip of equal-width frames.
///
/// `frame_count == 0` means the image is a single static frame.
/// `current_frame` always stays below `max(frame_count, 1)`.
#[derive(Debug, Clone)]
pub struct Bitmap<I> {
    pub image: I,
    pub frame_width: u32,
    pub frame_height: u32,
    frame_count: u32,
    current_frame: u32,
}

impl<I> Bitmap<I> {
    pub fn new(image: I, frame_width: u32, frame_height: u32, frame_count: u32) -> Self {
        Self {
            image,
            frame_width,
            frame_height,
            frame_count,
            current_frame: 0,
        }
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn is_animated(&self) -> bool {
        self.frame_count > 0
    }

    /// Step to the next frame, wrapping at the end of the strip.
    /// Static bitmaps stay on frame 0.
    pub fn advance_frame(&mut self) {
        if self.frame_count > 0 {
            self.current_frame = (self.current_frame + 1) % self.frame_count;
        }
    }

    /// Horizontal pixel offset of the current frame inside the strip
    pub fn frame_offset(&self) -> u32 {
        self.current_frame * self.frame_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_at_frame_count() {
        let mut bitmap = Bitmap::new((), 16, 16, 3);
        let frames: Vec<u32> = (0..4)
            .map(|_| {
                bitmap.advance_frame();
                bitmap.current_frame()
            })
            .collect();
        assert_eq!(frames, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_static_bitmap_stays_on_first_frame() {
        let mut bitmap = Bitmap::new((), 32, 8, 0);
        assert!(!bitmap.is_animated());
        bitmap.advance_frame();
        bitmap.advance_frame();
        assert_eq!(bitmap.current_frame(), 0);
        assert_eq!(bitmap.frame_offset(), 0);
    }

    #[test]
    fn test_frame_offset_follows_frame_width() {
        let mut bitmap = Bitmap::new((), 24, 16, 4);
        bitmap.advance_frame();
        bitmap.advance_frame();
        assert_eq!(bitmap.frame_offset(), 48);
    }
}
