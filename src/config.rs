use std::str::FromStr;

use glam::Vec2;

use crate::controller::frame_loop::MAX_FRAME_DELTA;
use crate::error::ConfigError;

/// Sprite sheet the player is drawn from
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pub path: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Id of the `<canvas>` element to draw into (web)
    pub canvas_id: String,
    /// Size used when the canvas has to be created, and for the native window
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// World units to pixels
    pub scale: f32,
    pub spawn: Vec2,
    pub sprite: SpriteSheet,
    /// Seconds; longer frame gaps skip the simulation step
    pub max_frame_delta: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_id: "g".to_string(),
            canvas_width: 800,
            canvas_height: 600,
            scale: 3.0,
            spawn: Vec2::new(32.0, 32.0),
            sprite: SpriteSheet {
                path: "assets/player.png".to_string(),
                frame_width: 16,
                frame_height: 16,
                frame_count: 4,
            },
            max_frame_delta: MAX_FRAME_DELTA,
        }
    }
}

impl GameConfig {
    /// Defaults overridden by `SPRITE_LOOP_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(scale) = parse_var::<f32>(&lookup, "SPRITE_LOOP_SCALE")? {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(ConfigError {
                    var: "SPRITE_LOOP_SCALE",
                    value: scale.to_string(),
                });
            }
            self.scale = scale;
        }
        if let Some(path) = lookup("SPRITE_LOOP_SPRITE") {
            self.sprite.path = path;
        }
        if let Some(width) = parse_size(&lookup, "SPRITE_LOOP_WIDTH")? {
            self.canvas_width = width;
        }
        if let Some(height) = parse_size(&lookup, "SPRITE_LOOP_HEIGHT")? {
            self.canvas_height = height;
        }
        Ok(self)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError { var, value: raw }),
    }
}

fn parse_size(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<u32>, ConfigError> {
    match parse_var::<u32>(lookup, var)? {
        Some(0) => Err(ConfigError { var, value: "0".to_string() }),
        size => Ok(size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_match_stock_game() {
        let config = GameConfig::default();
        assert_eq!(config.scale, 3.0);
        assert_eq!(config.spawn, Vec2::new(32.0, 32.0));
        assert_eq!(config.sprite.frame_count, 4);
        assert_eq!(config.max_frame_delta, 0.2);
    }

    #[test]
    fn test_overrides_apply() {
        let config = GameConfig::default()
            .with_overrides(lookup(&[
                ("SPRITE_LOOP_SCALE", "2.5"),
                ("SPRITE_LOOP_SPRITE", "art/ship.png"),
                ("SPRITE_LOOP_WIDTH", " 640 "),
            ]))
            .unwrap();
        assert_eq!(config.scale, 2.5);
        assert_eq!(config.sprite.path, "art/ship.png");
        assert_eq!(config.canvas_width, 640);
        assert_eq!(config.canvas_height, 600);
    }

    #[test]
    fn test_bad_number_names_variable() {
        let err = GameConfig::default()
            .with_overrides(lookup(&[("SPRITE_LOOP_HEIGHT", "tall")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError {
                var: "SPRITE_LOOP_HEIGHT",
                value: "tall".to_string(),
            }
        );
        assert_eq!(err.to_string(), "invalid value \"tall\" for SPRITE_LOOP_HEIGHT");
    }

    #[test]
    fn test_non_positive_scale_rejected() {
        assert!(GameConfig::default()
            .with_overrides(lookup(&[("SPRITE_LOOP_SCALE", "0")]))
            .is_err());
        assert!(GameConfig::default()
            .with_overrides(lookup(&[("SPRITE_LOOP_SCALE", "-2")]))
            .is_err());
    }

    #[test]
    fn test_zero_canvas_size_rejected() {
        assert!(GameConfig::default()
            .with_overrides(lookup(&[("SPRITE_LOOP_WIDTH", "0")]))
            .is_err());
    }
}
