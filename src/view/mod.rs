// VIEW: Rendering and graphics
pub mod surface;
pub mod camera;
pub mod raster;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
#[cfg(not(target_arch = "wasm32"))]
pub mod gpu_init;

pub use surface::{DrawSurface, Rect};
pub use camera::Camera;
pub use raster::{PixelSurface, RasterImage};
#[cfg(target_arch = "wasm32")]
pub use canvas::{AnimationFrames, CanvasImage, CanvasSurface};
#[cfg(not(target_arch = "wasm32"))]
pub use gpu_init::{FramePresenter, GpuContext};
