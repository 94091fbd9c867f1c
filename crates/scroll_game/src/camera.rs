//! Horizontal camera over a world wider than the viewport.
//!
//! Only one of {character, background} moves per tick. While the camera has
//! room to scroll, the character walks to a threshold and then the world
//! scrolls under it; once the camera hits either end of the world, the
//! character walks the rest of the way to the edge.

use scroll_core::pose::Direction;

use crate::character::Character;
use crate::config::{ArbitrationPolicy, GameConfig};

/// Which side absorbed this tick's horizontal motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mover {
    Character,
    Camera,
}

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Always within `[0, world_width - viewport_width]`.
    pub scroll_offset: f32,
    pub world_width: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub edge_margin: f32,
    pub policy: ArbitrationPolicy,
}

impl Camera {
    pub fn new(world_width: f32, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            scroll_offset: 0.0,
            world_width,
            viewport_width,
            viewport_height,
            edge_margin: 200.0,
            policy: ArbitrationPolicy::MidViewport,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        let mut camera = Self::new(
            config.world_width,
            config.viewport_width,
            config.viewport_height,
        );
        camera.edge_margin = config.edge_margin;
        camera.policy = config.arbitration;
        camera
    }

    pub fn max_offset(&self) -> f32 {
        (self.world_width - self.viewport_width).max(0.0)
    }

    pub fn at_min(&self) -> bool {
        self.scroll_offset <= 0.0
    }

    pub fn at_max(&self) -> bool {
        self.scroll_offset >= self.max_offset()
    }

    pub fn scroll(&mut self, distance: f32) {
        self.scroll_offset = (self.scroll_offset + distance).clamp(0.0, self.max_offset());
    }

    pub fn arbitrate(&self, character: &Character) -> Mover {
        let direction = character.direction;
        if (direction == Direction::West && self.at_min())
            || (direction == Direction::East && self.at_max())
        {
            return Mover::Character;
        }

        let right_edge = character.position.x + character.width;
        let walks = match self.policy {
            ArbitrationPolicy::MidViewport => {
                let mid = self.viewport_width / 2.0;
                (direction == Direction::East && right_edge < mid)
                    || (direction == Direction::West && right_edge > mid)
            }
            ArbitrationPolicy::EdgeMargin => {
                let pinned_right = direction == Direction::East
                    && right_edge >= self.viewport_width - self.edge_margin;
                let pinned_left =
                    direction == Direction::West && character.position.x <= self.edge_margin;
                !(pinned_right || pinned_left)
            }
        };

        if walks {
            Mover::Character
        } else {
            Mover::Camera
        }
    }

    /// Hand this tick's horizontal motion to either the character or the camera.
    pub fn apply_horizontal(&mut self, character: &mut Character) -> Mover {
        let mover = self.arbitrate(character);
        let step = character.horizontal_step();
        match mover {
            Mover::Character => character.position.x += step,
            Mover::Camera => self.scroll(step),
        }
        mover
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const EPS: f32 = 0.0001;

    fn runner(x: f32, direction: Direction) -> Character {
        let mut c = Character::new(Vec2::new(x, 571.0), 87.0, 87.0);
        c.direction = direction;
        c.velocity.x = if direction == Direction::West { -20.0 } else { 20.0 };
        c
    }

    #[test]
    fn below_mid_threshold_moves_character() {
        let mut camera = Camera::new(10_000.0, 1024.0, 768.0);
        let mut c = runner(300.0, Direction::East);
        let mover = camera.apply_horizontal(&mut c);
        assert_eq!(mover, Mover::Character);
        assert!((c.position.x - 320.0).abs() < EPS);
        assert_eq!(camera.scroll_offset, 0.0);
    }

    #[test]
    fn past_mid_threshold_scrolls_camera() {
        let mut camera = Camera::new(10_000.0, 1024.0, 768.0);
        let mut c = runner(512.0, Direction::East);
        let mover = camera.apply_horizontal(&mut c);
        assert_eq!(mover, Mover::Camera);
        assert!((c.position.x - 512.0).abs() < EPS);
        assert!((camera.scroll_offset - 20.0).abs() < EPS);
    }

    #[test]
    fn at_min_extent_west_moves_character() {
        let mut camera = Camera::new(10_000.0, 1024.0, 768.0);
        let mut c = runner(300.0, Direction::West);
        assert_eq!(camera.apply_horizontal(&mut c), Mover::Character);
        assert!((c.position.x - 280.0).abs() < EPS);
    }

    #[test]
    fn at_max_extent_east_moves_character() {
        let mut camera = Camera::new(10_000.0, 1024.0, 768.0);
        camera.scroll_offset = camera.max_offset();
        let mut c = runner(700.0, Direction::East);
        assert_eq!(camera.apply_horizontal(&mut c), Mover::Character);
        assert!((c.position.x - 720.0).abs() < EPS);
    }

    #[test]
    fn west_past_mid_returns_character_toward_centre() {
        let mut camera = Camera::new(10_000.0, 1024.0, 768.0);
        camera.scroll_offset = 500.0;
        let mut c = runner(700.0, Direction::West);
        assert_eq!(camera.apply_horizontal(&mut c), Mover::Character);

        let mut c = runner(300.0, Direction::West);
        assert_eq!(camera.apply_horizontal(&mut c), Mover::Camera);
        assert!((camera.scroll_offset - 480.0).abs() < EPS);
    }

    #[test]
    fn scroll_is_clamped_at_both_ends() {
        let mut camera = Camera::new(2_000.0, 1024.0, 768.0);
        camera.scroll(-50.0);
        assert_eq!(camera.scroll_offset, 0.0);
        camera.scroll(5_000.0);
        assert_eq!(camera.scroll_offset, 976.0);
        assert!(camera.at_max());
    }

    #[test]
    fn edge_margin_policy_scrolls_only_near_edges() {
        let mut camera = Camera::new(10_000.0, 1024.0, 768.0);
        camera.policy = ArbitrationPolicy::EdgeMargin;
        camera.scroll_offset = 100.0;

        let c = runner(600.0, Direction::East);
        assert_eq!(camera.arbitrate(&c), Mover::Character);

        let c = runner(1024.0 - 200.0 - 87.0, Direction::East);
        assert_eq!(camera.arbitrate(&c), Mover::Camera);

        let c = runner(150.0, Direction::West);
        assert_eq!(camera.arbitrate(&c), Mover::Camera);

        let c = runner(250.0, Direction::West);
        assert_eq!(camera.arbitrate(&c), Mover::Character);
    }

    #[test]
    fn from_config_copies_policy() {
        let config = GameConfig {
            arbitration: ArbitrationPolicy::EdgeMargin,
            edge_margin: 120.0,
            ..GameConfig::default()
        };
        let camera = Camera::from_config(&config);
        assert_eq!(camera.policy, ArbitrationPolicy::EdgeMargin);
        assert_eq!(camera.edge_margin, 120.0);
        assert_eq!(camera.max_offset(), 10_000.0 - 1024.0);
    }
}
