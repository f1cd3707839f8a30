use std::rc::Rc;

use glam::Vec2;
use image::{Rgba, RgbaImage};
use sprite_loop::config::SpriteSheet;
use sprite_loop::controller::input::KeyRouter;
use sprite_loop::controller::{FrameQueue, KeyEventKind};
use sprite_loop::view::{PixelSurface, RasterImage};
use sprite_loop::{AppContext, GameConfig};

const FRAME_COLORS: [[u8; 4]; 4] = [
    [255, 0, 0, 255],
    [0, 255, 0, 255],
    [0, 0, 255, 255],
    [255, 255, 255, 255],
];

const UP: u32 = 38;
const LEFT: u32 = 37;
const SPACE: u32 = 32;

/// 8x2 strip: four solid 2x2 frames
fn strip() -> RasterImage {
    let mut sheet = RgbaImage::new(8, 2);
    for (frame, color) in FRAME_COLORS.iter().enumerate() {
        for x in 0..2 {
            for y in 0..2 {
                sheet.put_pixel(frame as u32 * 2 + x, y, Rgba(*color));
            }
        }
    }
    RasterImage::from_rgba(sheet)
}

fn config() -> GameConfig {
    GameConfig {
        canvas_width: 128,
        canvas_height: 128,
        scale: 2.0,
        spawn: Vec2::new(32.0, 32.0),
        sprite: SpriteSheet {
            path: String::new(),
            frame_width: 2,
            frame_height: 2,
            frame_count: 4,
        },
        ..GameConfig::default()
    }
}

fn new_game() -> AppContext<PixelSurface> {
    let config = config();
    AppContext::new(&config, PixelSurface::new(128, 128), strip())
}

#[test]
fn test_frame_draws_player_at_scaled_position() {
    let mut game = new_game();
    assert_eq!(game.frame(0.01), 1);

    let surface = game.camera.surface();
    assert_eq!(surface.pixel(64, 64), FRAME_COLORS[0]);
    assert_eq!(surface.pixel(10, 10), [0, 0, 0, 0]);
}

#[test]
fn test_animation_shows_next_strip_frame() {
    let mut game = new_game();
    game.entities[0].animation_timer = 0.0;

    game.frame(1.0 / 24.0);
    assert_eq!(game.camera.surface().pixel(64, 64), FRAME_COLORS[1]);
    game.frame(1.0 / 24.0);
    assert_eq!(game.camera.surface().pixel(64, 64), FRAME_COLORS[2]);
}

#[test]
fn test_loop_moves_player_while_key_held() {
    let game = new_game();
    let mut keys = KeyRouter::new();
    game.controls.attach(&mut keys).unwrap();

    let frames = Rc::new(FrameQueue::new());
    let (game, game_loop) = game.start(0.2, frames.clone());

    frames.fire(0.0);
    keys.dispatch(KeyEventKind::Press, UP);
    for i in 1..=10 {
        frames.fire(i as f64 * 50.0);
    }
    keys.dispatch(KeyEventKind::Release, UP);
    frames.fire(550.0);

    // Ten half-tenth-second steps at 40 units/s along +x
    let pos = game.borrow().player().unwrap().position;
    assert!((pos.x - 52.0).abs() < 1e-3, "x = {}", pos.x);
    assert!((pos.y - 32.0).abs() < 1e-3, "y = {}", pos.y);
    assert_eq!(game_loop.borrow().skipped_frames(), 0);
}

#[test]
fn test_stalled_frame_does_not_move_player() {
    let game = new_game();
    let mut keys = KeyRouter::new();
    game.controls.attach(&mut keys).unwrap();

    let frames = Rc::new(FrameQueue::new());
    let (game, game_loop) = game.start(0.2, frames.clone());

    frames.fire(0.0);
    keys.dispatch(KeyEventKind::Press, UP);
    frames.fire(5000.0);

    assert_eq!(game.borrow().player().unwrap().position, Vec2::new(32.0, 32.0));
    assert_eq!(game_loop.borrow().skipped_frames(), 1);
    assert_eq!(game_loop.borrow().last_time(), 5000.0);
}

#[test]
fn test_turning_and_shooting_are_independent() {
    let game = new_game();
    let mut keys = KeyRouter::new();
    game.controls.attach(&mut keys).unwrap();

    keys.dispatch(KeyEventKind::Press, LEFT);
    keys.dispatch(KeyEventKind::Press, SPACE);
    keys.dispatch(KeyEventKind::Release, LEFT);

    let state = game.controls.snapshot();
    assert!(!state.left);
    assert!(state.shoot);
}

#[test]
fn test_missing_sprite_still_runs_simulation() {
    let config = config();
    let mut game = AppContext::new(
        &config,
        PixelSurface::new(128, 128),
        RasterImage::load("no/such/sprite.png"),
    );
    game.controls.on_key_event(true, UP);

    assert_eq!(game.frame(0.1), 0);
    assert!(game.player().unwrap().position.x > 32.0);
    assert!(game.camera.surface().pixels().pixels().all(|p| p.0[3] == 0));
}
