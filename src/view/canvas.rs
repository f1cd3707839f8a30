//! Browser backend: 2D canvas drawing, `<img>` sprite sheets and
//! `requestAnimationFrame` scheduling.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlImageElement, Window};

use crate::controller::FrameScheduler;
use crate::model::{ImageResource, LoadState};
use crate::view::surface::{DrawSurface, Rect};

/// `<img>` element whose load progress is tracked through onload/onerror
#[derive(Clone)]
pub struct CanvasImage {
    element: HtmlImageElement,
    state: Rc<Cell<LoadState>>,
}

impl CanvasImage {
    /// Start loading `src`; the image becomes drawable once the browser has decoded it
    pub fn load(src: &str) -> Result<Self, JsValue> {
        let element = HtmlImageElement::new()?;
        let state = Rc::new(Cell::new(LoadState::NotStarted));

        {
            let state = state.clone();
            let src_name = src.to_string();
            let onload = Closure::wrap(Box::new(move |_e: Event| {
                state.set(LoadState::Ready);
                tracing::info!(src = %src_name, "image loaded");
            }) as Box<dyn FnMut(Event)>);
            element.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();
        }

        {
            let state = state.clone();
            let src_name = src.to_string();
            let onerror = Closure::wrap(Box::new(move |_e: Event| {
                state.set(LoadState::Failed);
                tracing::warn!(src = %src_name, "image failed to load");
            }) as Box<dyn FnMut(Event)>);
            element.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();
        }

        element.set_src(src);
        state.set(LoadState::Loading);

        Ok(Self { element, state })
    }
}

impl ImageResource for CanvasImage {
    fn load_state(&self) -> LoadState {
        self.state.get()
    }
}

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl CanvasSurface {
    /// Wrap the canvas' 2D context; the size is read once here
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("2d context has unexpected type"))?;
        Ok(Self {
            ctx,
            width: canvas.width(),
            height: canvas.height(),
        })
    }
}

fn log_rejected(op: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        tracing::warn!(op, error = ?e, "canvas call rejected");
    }
}

impl DrawSurface for CanvasSurface {
    type Image = CanvasImage;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.ctx.set_image_smoothing_enabled(enabled);
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        log_rejected("translate", self.ctx.translate(x as f64, y as f64));
    }

    fn rotate(&mut self, radians: f32) {
        log_rejected("rotate", self.ctx.rotate(radians as f64));
    }

    fn draw_image(&mut self, image: &CanvasImage, src: Rect, dst: Rect) {
        log_rejected(
            "drawImage",
            self.ctx
                .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    &image.element,
                    src.x as f64,
                    src.y as f64,
                    src.w as f64,
                    src.h as f64,
                    dst.x as f64,
                    dst.y as f64,
                    dst.w as f64,
                    dst.h as f64,
                ),
        );
    }
}

/// `window.requestAnimationFrame`
pub struct AnimationFrames {
    window: Window,
}

impl AnimationFrames {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl FrameScheduler for AnimationFrames {
    fn request_frame(&self, on_frame: Box<dyn FnOnce(f64)>) {
        let callback = Closure::once_into_js(move |time: f64| on_frame(time));
        if let Err(e) = self.window.request_animation_frame(callback.unchecked_ref()) {
            tracing::error!(error = ?e, "requestAnimationFrame failed");
        }
    }
}
