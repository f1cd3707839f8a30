use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

// Import from the library crate
use sprite_loop::{
    controller::input::{native::key_code_from_winit, KeyRouter},
    controller::{FrameQueue, GameLoop, KeyEventKind},
    logging,
    view::{FramePresenter, GpuContext, PixelSurface, RasterImage},
    AppContext, AppError, GameConfig,
};

struct App {
    config: GameConfig,
    game: Rc<RefCell<AppContext<PixelSurface>>>,
    game_loop: Rc<RefCell<GameLoop>>,
    keys: KeyRouter,
    frames: Rc<FrameQueue>,
    // Timestamps handed to the loop are milliseconds since this instant
    origin: Instant,

    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    presenter: Option<FramePresenter>,
    failure: Option<AppError>,
}

impl App {
    fn new(config: GameConfig) -> Self {
        let surface = PixelSurface::new(config.canvas_width, config.canvas_height);
        let sprite = RasterImage::load(&config.sprite.path);
        let context = AppContext::new(&config, surface, sprite);

        let mut keys = KeyRouter::new();
        context
            .controls
            .attach(&mut keys)
            .unwrap_or_else(|never| match never {});

        let frames = Rc::new(FrameQueue::new());
        let (game, game_loop) = context.start(config.max_frame_delta, frames.clone());

        Self {
            config,
            game,
            game_loop,
            keys,
            frames,
            origin: Instant::now(),
            window: None,
            gpu: None,
            presenter: None,
            failure: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attrs = Window::default_attributes()
            .with_title("sprite-loop")
            .with_inner_size(LogicalSize::new(self.config.canvas_width, self.config.canvas_height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let presenter = FramePresenter::new(&gpu, self.config.canvas_width, self.config.canvas_height);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.presenter = Some(presenter);
        Ok(())
    }

    fn redraw(&mut self) {
        let now = self.origin.elapsed().as_secs_f64() * 1000.0;
        self.frames.fire(now);

        let (Some(gpu), Some(presenter)) = (&self.gpu, &self.presenter) else {
            return;
        };
        let game = self.game.borrow();
        match presenter.present(gpu, game.camera.surface().pixels()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(e) => tracing::error!(error = %e, "present failed"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            tracing::error!(error = %e, "graphics initialization failed");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(
                    skipped_frames = self.game_loop.borrow().skipped_frames(),
                    "window closed"
                );
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(code) = key_code_from_winit(key) {
                    let kind = match state {
                        ElementState::Pressed => KeyEventKind::Press,
                        ElementState::Released => KeyEventKind::Release,
                    };
                    self.keys.dispatch(kind, code);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), AppError> {
    logging::init();

    let config = GameConfig::from_env()?;
    tracing::info!(?config, "starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
