use std::cell::RefCell;
use std::rc::Rc;

use crate::config::GameConfig;
use crate::controller::{Controls, FrameScheduler, GameLoop};
use crate::model::{Bitmap, Player};
use crate::view::{Camera, DrawSurface};

/// Everything one running game owns: input, entities and the camera
pub struct AppContext<S: DrawSurface> {
    pub controls: Controls,
    /// Draw order; later entries are drawn on top
    pub entities: Vec<Player<S::Image>>,
    pub camera: Camera<S>,
}

impl<S: DrawSurface> AppContext<S> {
    /// One player at the configured spawn point
    pub fn new(config: &GameConfig, surface: S, sprite: S::Image) -> Self {
        let sheet = &config.sprite;
        let bitmap = Bitmap::new(sprite, sheet.frame_width, sheet.frame_height, sheet.frame_count);
        let player = Player::new(config.spawn.x, config.spawn.y, bitmap);

        Self {
            controls: Controls::new(),
            entities: vec![player],
            camera: Camera::new(surface, config.scale),
        }
    }

    pub fn player(&self) -> Option<&Player<S::Image>> {
        self.entities.first()
    }

    /// Update every entity from one input snapshot, then redraw.
    /// Returns how many entities were drawn.
    pub fn frame(&mut self, dt: f32) -> usize {
        let controls = self.controls.snapshot();
        for entity in &mut self.entities {
            entity.update(&controls, dt);
        }
        self.camera.render(&self.entities)
    }
}

impl<S: DrawSurface + 'static> AppContext<S> {
    /// Hand the context to a game loop driven by `scheduler`
    pub fn start<F>(self, max_frame_delta: f64, scheduler: Rc<F>) -> (Rc<RefCell<Self>>, Rc<RefCell<GameLoop>>)
    where
        F: FrameScheduler + 'static,
    {
        let app = Rc::new(RefCell::new(self));
        let game_loop = GameLoop::new().with_max_delta(max_frame_delta).start(
            {
                let app = app.clone();
                move |dt| {
                    app.borrow_mut().frame(dt);
                }
            },
            scheduler,
        );
        (app, game_loop)
    }
}
