use crate::config::GameConfig;

/// Physical constants shared by everything in the session. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct World {
    /// Added to vertical velocity per tick while airborne.
    pub gravity: f32,
    /// Y coordinate of the ground surface (y grows downward).
    pub ground: f32,
}

impl World {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            gravity: config.gravity,
            ground: config.ground(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_is_measured_from_viewport_bottom() {
        let config = GameConfig {
            viewport_height: 600.0,
            ground_offset: 100.0,
            gravity: 9.0,
            ..GameConfig::default()
        };
        let world = World::from_config(&config);
        assert_eq!(world.ground, 500.0);
        assert_eq!(world.gravity, 9.0);
    }
}
