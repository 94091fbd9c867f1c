//! The per-tick simulation step.
//!
//! One tick is strictly: intent → horizontal arbitration → viewport clamp →
//! vertical integration → state classification → ground collision →
//! impatience → animation → draw plan. Nothing inside a tick yields or
//! fails; everything fallible was checked when the pieces were built.

use std::path::Path;

use scroll_core::animation::AnimationTable;
use scroll_core::error::ConfigError;
use scroll_core::input::InputSnapshot;

use crate::camera::{Camera, Mover};
use crate::character::Character;
use crate::config::GameConfig;
use crate::scene::{load_scene_from_path, DrawPlan, Scene};
use crate::world::World;

/// Outcome of the physics half of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMotion {
    pub mover: Mover,
    pub frame: u32,
}

/// Everything the outer loop needs after a tick.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub tick: u64,
    pub motion: TickMotion,
    pub draw_plan: DrawPlan,
    /// The loop should stop once this tick has been presented.
    pub quit_requested: bool,
    pub fullscreen_toggled: bool,
    pub fullscreen: bool,
}

/// Read-only copy of the mutable state, safe to hand to another thread.
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub character: Character,
    pub camera: Camera,
}

/// Advance character and camera by one tick, up to and including the
/// animation cursor. Rendering is left to the caller.
pub fn advance(
    input: &InputSnapshot,
    world: &World,
    table: &AnimationTable,
    character: &mut Character,
    camera: &mut Camera,
) -> TickMotion {
    let previous_state = character.state;

    character.apply_intent(input);
    let mover = camera.apply_horizontal(character);
    character.clamp_to_viewport(camera.viewport_width);
    character.integrate_vertical(world);
    character.classify_from_velocity();
    character.resolve_ground(world);
    character.update_impatience();

    if character.state != previous_state {
        log::debug!(
            "Character {} -> {} facing {} at ({:.1}, {:.1})",
            previous_state,
            character.state,
            character.direction,
            character.position.x,
            character.position.y
        );
    }

    let frame = character
        .animation
        .advance(table, character.state, character.direction);

    TickMotion { mover, frame }
}

pub struct Simulation {
    pub world: World,
    pub character: Character,
    pub camera: Camera,
    pub scene: Scene,
    pub animations: AnimationTable,
    pub fullscreen: bool,
    tick: u64,
}

impl Simulation {
    pub fn new(config: &GameConfig, scene: Scene, animations: AnimationTable) -> Self {
        Self {
            world: World::from_config(config),
            character: Character::from_config(config),
            camera: Camera::from_config(config),
            scene,
            animations,
            fullscreen: false,
            tick: 0,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn step(&mut self, input: &InputSnapshot) -> TickOutput {
        self.tick += 1;

        let motion = advance(
            input,
            &self.world,
            &self.animations,
            &mut self.character,
            &mut self.camera,
        );
        let draw_plan = self
            .scene
            .build_draw_plan(&self.camera, &self.character, motion.frame);

        if input.toggle_fullscreen {
            self.fullscreen = !self.fullscreen;
            log::info!("Fullscreen {}", if self.fullscreen { "on" } else { "off" });
        }
        if input.quit {
            log::info!("Quit requested at tick {}", self.tick);
        }

        log::trace!(
            "tick {} state={} pos=({:.1}, {:.1}) vel=({:.1}, {:.1}) scroll={:.1} frame={}",
            self.tick,
            self.character.state,
            self.character.position.x,
            self.character.position.y,
            self.character.velocity.x,
            self.character.velocity.y,
            self.camera.scroll_offset,
            motion.frame
        );

        TickOutput {
            tick: self.tick,
            motion,
            draw_plan,
            quit_requested: input.quit,
            fullscreen_toggled: input.toggle_fullscreen,
            fullscreen: self.fullscreen,
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            tick: self.tick,
            character: self.character,
            camera: self.camera,
        }
    }

    /// Load and validate `scene_path`, then swap it in between ticks. On
    /// error the current scene is left untouched.
    pub fn reload_scene(&mut self, scene_path: &Path) -> Result<(), ConfigError> {
        self.scene = load_scene_from_path(scene_path)?;
        Ok(())
    }
}
