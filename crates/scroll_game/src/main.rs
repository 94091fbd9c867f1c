//! Side-scroller runner.
//!
//! Builds a [`Simulation`] from optional config, scene, animation and replay
//! files and drives it one tick at a time:
//!
//!   1. Sample an `InputSnapshot` (from the replay, or idle when there is none)
//!   2. `Simulation::step` -- physics, camera arbitration, animation, draw plan
//!   3. Hand the draw plan to the presenter (here: log it)
//!   4. Poll the scene file and reload between ticks if it changed
//!   5. Sleep until the next tick is due (`TickClock`) unless `--unpaced`
//!
//! Quit requests stop the loop after the tick that carried them.

mod camera;
mod character;
mod config;
mod replay;
mod scene;
mod step;
mod world;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use config::{load_config_from_path, GameConfig};
use replay::load_replay_from_path;
use scene::{load_scene_from_path, ImageHandle, Scene, SceneWatcher};
use scroll_core::animation::{load_animation_table, AnimationTable};
use scroll_core::input::InputSnapshot;
use scroll_core::time::TickClock;
use step::{Simulation, TickOutput};

/// Run the side-scroller simulation headlessly.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game constants (JSON). Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Parallax scene (JSON). Built-in scene when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Animation table (JSON). Built-in sprite map when omitted.
    #[arg(long)]
    animations: Option<PathBuf>,
    /// Scripted input (JSON). Idle input when omitted.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,
    /// Run as fast as possible instead of at the configured tick rate.
    #[arg(long)]
    unpaced: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    log::info!("Side-scroller starting...");

    let config = match &args.config {
        Some(path) => load_config_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let animations = match &args.animations {
        Some(path) => load_animation_table(path)
            .with_context(|| format!("loading animation table {}", path.display()))?,
        None => AnimationTable::builtin(),
    };
    let scene = match &args.scene {
        Some(path) => load_scene_from_path(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => Scene::builtin(config.viewport_width, config.viewport_height),
    };
    let replay = match &args.replay {
        Some(path) => Some(
            load_replay_from_path(path)
                .with_context(|| format!("loading replay {}", path.display()))?
                .expanded_inputs(),
        ),
        None => None,
    };

    log::info!(
        "Viewport {}x{}, world width {}, ground at {}, gravity {}, {} Hz, {:?} arbitration",
        config.viewport_width,
        config.viewport_height,
        config.world_width,
        config.ground(),
        config.gravity,
        config.tick_rate,
        config.arbitration
    );
    log::info!(
        "Scene '{}' with {} layers, character at depth {}",
        scene.scene_id,
        scene.layers.len(),
        scene.character_depth
    );
    for layer in &scene.layers {
        log::debug!(
            "  layer '{}' image {} ({}x{}), divisor {}, lifted {}",
            layer.id,
            layer.image,
            layer.width,
            layer.height,
            layer.speed_divisor,
            layer.y_offset
        );
    }
    if let Some(sheet) = &scene.character_sheet {
        log::debug!("  character sheet {sheet}");
    }

    let mut scene_watcher = args.scene.clone().map(SceneWatcher::new);
    let mut sim = Simulation::new(&config, scene, animations);
    let mut clock = TickClock::new(config.tick_rate);

    let tick_limit = args
        .ticks
        .or_else(|| replay.as_ref().map(|inputs| inputs.len() as u64));
    if tick_limit.is_none() {
        log::warn!("No replay or --ticks given; running idle until interrupted.");
    }

    let mut last_output: Option<TickOutput> = None;
    loop {
        if tick_limit.is_some_and(|limit| sim.tick_count() >= limit) {
            break;
        }

        let input = replay
            .as_ref()
            .and_then(|inputs| inputs.get(sim.tick_count() as usize))
            .copied()
            .unwrap_or_else(InputSnapshot::idle);

        let output = sim.step(&input);
        present(&output);
        let quit = output.quit_requested;
        last_output = Some(output);
        if quit {
            break;
        }

        if let Some(watcher) = scene_watcher.as_mut() {
            if watcher.should_reload() {
                match sim.reload_scene(watcher.path()) {
                    Ok(()) => log::info!("Scene reloaded: {}", sim.scene.scene_id),
                    Err(err) => log::error!(
                        "Scene reload failed, keeping '{}': {err}",
                        sim.scene.scene_id
                    ),
                }
            }
        }

        if args.unpaced {
            clock.mark_tick(std::time::Instant::now());
        } else {
            clock.wait_for_next_tick();
        }
    }

    let snapshot = sim.snapshot();
    log::info!(
        "Stopped after {} ticks ({:.1} fps): position ({:.1}, {:.1}), {} facing {}, scroll {:.1}",
        snapshot.tick,
        clock.smoothed_fps,
        snapshot.character.position.x,
        snapshot.character.position.y,
        snapshot.character.state,
        snapshot.character.direction,
        snapshot.camera.scroll_offset
    );
    if let Some(output) = last_output {
        log::info!(
            "Last frame {} with {} blits, fullscreen {}",
            output.motion.frame,
            output.draw_plan.len(),
            output.fullscreen
        );
    }
    Ok(())
}

/// Stand-in for a rendering backend: the draw plan is complete, nothing is blitted.
fn present(output: &TickOutput) {
    if output.fullscreen_toggled {
        log::info!(
            "Presenter switching to {} mode",
            if output.fullscreen { "fullscreen" } else { "windowed" }
        );
    }
    if output.draw_plan.is_empty() {
        log::warn!("Tick {} produced an empty draw plan", output.tick);
        return;
    }
    if output.draw_plan.character_command().is_none() {
        log::warn!("Tick {} draw plan has no character blit", output.tick);
    }
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    log::trace!("tick {}: {:?} moved", output.tick, output.motion.mover);
    for cmd in &output.draw_plan.commands {
        let source = match cmd.image {
            ImageHandle::Layer(index) => format!("layer {index}"),
            ImageHandle::CharacterFrame(frame) => format!("frame {frame}"),
        };
        log::trace!(
            "  blit {source} src ({:.0}, {:.0}, {:.0}x{:.0}) -> dst ({:.0}, {:.0}, {:.0}x{:.0})",
            cmd.src.x,
            cmd.src.y,
            cmd.src.w,
            cmd.src.h,
            cmd.dst.x,
            cmd.dst.y,
            cmd.dst.w,
            cmd.dst.h
        );
    }
}
