use glam::Vec2;

use scroll_core::animation::AnimationCursor;
use scroll_core::input::InputSnapshot;
use scroll_core::pose::{CharacterState, Direction};

use crate::config::GameConfig;
use crate::world::World;

/// Rounding slack when comparing the sprite's bottom edge to the ground line.
pub const GROUND_CONTACT_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy)]
pub struct MovementConfig {
    pub run_speed: f32,
    pub jump_impulse: f32,
    pub boost_multiplier: f32,
    pub jump_blocked_by_down: bool,
    /// Standing ticks tolerated before the character turns impatient.
    pub impatience_threshold: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            run_speed: 20.0,
            jump_impulse: -100.0,
            boost_multiplier: 2.0,
            jump_blocked_by_down: false,
            impatience_threshold: 30,
        }
    }
}

impl MovementConfig {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            run_speed: config.run_speed,
            jump_impulse: config.jump_impulse,
            boost_multiplier: config.boost_multiplier,
            jump_blocked_by_down: config.jump_blocked_by_down,
            impatience_threshold: config.impatience_threshold,
        }
    }
}

/// Kinematic and pose state of the player character, in screen space.
/// `position` is the top-left corner of the sprite; y grows downward.
#[derive(Debug, Clone, Copy)]
pub struct Character {
    pub position: Vec2,
    pub velocity: Vec2,
    pub direction: Direction,
    pub state: CharacterState,
    pub speed_multiplier: f32,
    pub width: f32,
    pub height: f32,
    /// Consecutive ticks spent standing.
    pub idle_frames: u32,
    pub animation: AnimationCursor,
    pub config: MovementConfig,
}

impl Character {
    pub fn new(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            direction: Direction::East,
            state: CharacterState::Standing,
            speed_multiplier: 1.0,
            width,
            height,
            idle_frames: 0,
            animation: AnimationCursor::new(false),
            config: MovementConfig::default(),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        let (x, y) = config.start_position();
        let mut character = Self::new(
            Vec2::new(x, y),
            config.character_width,
            config.character_height,
        );
        character.config = MovementConfig::from_config(config);
        character.animation = AnimationCursor::new(config.reset_cursor_on_transition);
        character
    }

    pub fn is_airborne(&self) -> bool {
        self.state == CharacterState::InAir
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }

    /// Bottom edge at or below `ground`, within [`GROUND_CONTACT_EPSILON`].
    pub fn touches_ground(&self, ground: f32) -> bool {
        self.bottom() >= ground - GROUND_CONTACT_EPSILON
    }

    /// Horizontal distance this tick's motion covers, whoever ends up moving.
    pub fn horizontal_step(&self) -> f32 {
        self.velocity.x * self.speed_multiplier
    }

    /// Map this tick's buttons onto velocity, facing and boost. Only the
    /// current snapshot matters; opposing horizontal buttons cancel out and
    /// keep the previous facing.
    pub fn apply_intent(&mut self, input: &InputSnapshot) {
        let jump_allowed = !(self.config.jump_blocked_by_down && input.down);
        if !self.is_airborne() && (input.up || input.jump) && jump_allowed {
            self.velocity.y = self.config.jump_impulse;
        }

        if input.down && !input.up {
            self.direction = Direction::South;
        }

        if input.left && !input.right {
            self.direction = Direction::West;
            self.velocity.x = -self.config.run_speed;
        }
        if input.right && !input.left {
            self.direction = Direction::East;
            self.velocity.x = self.config.run_speed;
        }
        if !input.left && !input.right {
            self.velocity.x = 0.0;
        }

        self.speed_multiplier = if input.modifier {
            self.config.boost_multiplier
        } else {
            1.0
        };
    }

    pub fn clamp_to_viewport(&mut self, viewport_width: f32) {
        let max_x = (viewport_width - self.width).max(0.0);
        self.position.x = self.position.x.clamp(0.0, max_x);
    }

    /// Gravity is added to the displacement every tick, grounded or not.
    pub fn integrate_vertical(&mut self, world: &World) {
        self.position.y += self.velocity.y + world.gravity;
    }

    pub fn classify_from_velocity(&mut self) {
        self.state = if self.velocity.x == 0.0 {
            CharacterState::Standing
        } else {
            CharacterState::Running
        };
    }

    /// Snap to the ground on contact; otherwise mark airborne and accelerate
    /// the fall.
    pub fn resolve_ground(&mut self, world: &World) {
        if self.touches_ground(world.ground) {
            self.position.y = world.ground - self.height;
            self.velocity.y = 0.0;
        } else {
            self.state = CharacterState::InAir;
            self.velocity.y += world.gravity;
        }
    }

    pub fn update_impatience(&mut self) {
        if self.state == CharacterState::Standing {
            self.idle_frames = self.idle_frames.saturating_add(1);
        } else {
            self.idle_frames = 0;
        }
        if self.idle_frames > self.config.impatience_threshold {
            self.state = CharacterState::Impatient;
        }
    }
}
