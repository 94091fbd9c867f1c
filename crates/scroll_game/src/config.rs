//! Startup constants for a session.
//!
//! Every field has a default, so a config file only needs to mention what it
//! changes. Values are validated once before the simulation is built.

use serde::Deserialize;
use std::path::Path;

use scroll_core::error::{read_json, ConfigError};

/// How horizontal motion is split between the character and the camera.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationPolicy {
    /// Walk to the middle of the viewport, then scroll.
    #[default]
    MidViewport,
    /// Walk freely until within `edge_margin` of the viewport edge, then scroll.
    EdgeMargin,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub world_width: f32,
    /// Ground sits this far above the bottom of the viewport.
    pub ground_offset: f32,
    pub gravity: f32,
    pub run_speed: f32,
    /// Vertical velocity set on jump (negative is up).
    pub jump_impulse: f32,
    pub boost_multiplier: f32,
    pub character_width: f32,
    pub character_height: f32,
    /// Defaults to the viewport centre.
    pub start_x: Option<f32>,
    pub start_y: Option<f32>,
    pub impatience_threshold: u32,
    pub tick_rate: u32,
    pub arbitration: ArbitrationPolicy,
    pub edge_margin: f32,
    pub jump_blocked_by_down: bool,
    pub reset_cursor_on_transition: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
            viewport_height: 768.0,
            world_width: 10_000.0,
            ground_offset: 110.0,
            gravity: 20.0,
            run_speed: 20.0,
            jump_impulse: -100.0,
            boost_multiplier: 2.0,
            character_width: 87.0,
            character_height: 87.0,
            start_x: None,
            start_y: None,
            impatience_threshold: 30,
            tick_rate: 60,
            arbitration: ArbitrationPolicy::MidViewport,
            edge_margin: 200.0,
            jump_blocked_by_down: false,
            reset_cursor_on_transition: false,
        }
    }
}

impl GameConfig {
    pub fn ground(&self) -> f32 {
        self.viewport_height - self.ground_offset
    }

    pub fn start_position(&self) -> (f32, f32) {
        (
            self.start_x.unwrap_or(self.viewport_width / 2.0),
            self.start_y.unwrap_or(self.viewport_height / 2.0),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("world_width", self.world_width),
            ("character_width", self.character_width),
            ("character_height", self.character_height),
            ("boost_multiplier", self.boost_multiplier),
        ];
        for (name, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(ConfigError::invalid(
                    "Config",
                    format!("{name} must be a finite value > 0 (got {value})"),
                ));
            }
        }
        if self.world_width < self.viewport_width {
            return Err(ConfigError::invalid(
                "Config",
                "world_width must be >= viewport_width",
            ));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::invalid("Config", "tick_rate must be > 0"));
        }
        if self.character_width > self.viewport_width
            || self.character_height > self.ground()
        {
            return Err(ConfigError::invalid(
                "Config",
                "character does not fit between the viewport edges and the ground",
            ));
        }
        if self.edge_margin < 0.0 || self.edge_margin >= self.viewport_width / 2.0 {
            return Err(ConfigError::invalid(
                "Config",
                "edge_margin must be in [0, viewport_width / 2)",
            ));
        }
        Ok(())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, ConfigError> {
    let config: GameConfig = read_json(path)?;
    config.validate()?;
    Ok(config)
}
