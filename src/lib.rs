// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod config;
pub mod error;
pub mod app;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use app::AppContext;
pub use config::GameConfig;
pub use error::ConfigError;
#[cfg(not(target_arch = "wasm32"))]
pub use error::AppError;

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, HtmlCanvasElement};

#[cfg(target_arch = "wasm32")]
use controller::input::wasm::DocumentKeys;
#[cfg(target_arch = "wasm32")]
use view::{AnimationFrames, CanvasImage, CanvasSurface};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    logging::init();

    let config = GameConfig::default();
    let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
    let document = window.document().ok_or_else(|| js_error("no document on window"))?;
    let canvas = init_canvas(&document, &config)?;

    let surface = CanvasSurface::new(&canvas)?;
    let sprite = CanvasImage::load(&config.sprite.path)?;
    let app = AppContext::new(&config, surface, sprite);
    app.controls.attach(&mut DocumentKeys::new(document))?;

    tracing::info!(
        width = canvas.width(),
        height = canvas.height(),
        scale = config.scale,
        "starting"
    );

    // The scheduled frame closures keep the context alive
    app.start(config.max_frame_delta, Rc::new(AnimationFrames::new(window)));
    Ok(())
}

/// Use the page's canvas if it has one, otherwise append a new one to `<body>`
#[cfg(target_arch = "wasm32")]
fn init_canvas(document: &Document, config: &GameConfig) -> Result<HtmlCanvasElement, JsValue> {
    if let Some(existing) = document.get_element_by_id(&config.canvas_id) {
        return existing
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error(format!("#{} is not a canvas", config.canvas_id)));
    }

    let body = document.body().ok_or_else(|| js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_id(&config.canvas_id);
    canvas_el.set_width(config.canvas_width);
    canvas_el.set_height(config.canvas_height);
    body.append_child(&canvas_el)?;
    Ok(canvas_el)
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}
