//! Parallax background description and per-tick draw-plan construction.
//!
//! Layers are listed back to front. Each one scrolls at
//! `scroll_offset / speed_divisor` and wraps horizontally, so a strip of any
//! width tiles seamlessly across the viewport. Image decoding and blitting are
//! left to whoever consumes the [`DrawPlan`].

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use scroll_core::error::{read_json, ConfigError};

use crate::camera::Camera;
use crate::character::Character;

const SUPPORTED_VERSION: &str = "0.1";

/// Slowest accepted divisor; smaller values blow `scroll_offset / divisor` up
/// past what `f32` can wrap.
pub const MIN_SPEED_DIVISOR: f32 = 1e-3;

#[derive(Debug, Deserialize, Clone)]
pub struct SceneFile {
    pub version: String,
    pub scene_id: String,
    /// Divisor base for layers without an explicit `speed_divisor`: layer `i`
    /// of `n` gets `base^(n-1-i)`.
    #[serde(default)]
    pub geometric_base: Option<f32>,
    /// Layer index the character is drawn in front of. Defaults to the last layer.
    #[serde(default)]
    pub character_depth: Option<usize>,
    #[serde(default)]
    pub character_sheet: Option<String>,
    pub layers: Vec<SceneLayer>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SceneLayer {
    pub id: String,
    pub image: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub speed_divisor: Option<f32>,
    /// Lift above the bottom edge of the viewport (negative sinks it).
    #[serde(default)]
    pub y_offset: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxLayer {
    pub id: String,
    pub image: String,
    pub width: f32,
    pub height: f32,
    pub speed_divisor: f32,
    pub y_offset: f32,
}

/// Validated, ready-to-render scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub scene_id: String,
    pub layers: Vec<ParallaxLayer>,
    pub character_depth: usize,
    pub character_sheet: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Opaque reference into the asset collaborator's images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageHandle {
    Layer(usize),
    CharacterFrame(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub image: ImageHandle,
    pub src: Rect,
    pub dst: Rect,
}

/// Ordered blits for one tick, first to last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawPlan {
    pub commands: Vec<DrawCommand>,
}

impl DrawPlan {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn character_command(&self) -> Option<&DrawCommand> {
        self.commands
            .iter()
            .find(|cmd| matches!(cmd.image, ImageHandle::CharacterFrame(_)))
    }
}

impl Scene {
    pub fn from_file(file: SceneFile) -> Self {
        let count = file.layers.len();
        let base = file.geometric_base;
        let layers = file
            .layers
            .into_iter()
            .enumerate()
            .map(|(i, layer)| {
                let speed_divisor =
                    resolved_divisor(layer.speed_divisor, base, count, i).unwrap_or(1.0);
                ParallaxLayer {
                    id: layer.id,
                    image: layer.image,
                    width: layer.width,
                    height: layer.height,
                    speed_divisor,
                    y_offset: layer.y_offset,
                }
            })
            .collect();

        Self {
            scene_id: file.scene_id,
            layers,
            character_depth: file.character_depth.unwrap_or(count.saturating_sub(1)),
            character_sheet: file.character_sheet,
        }
    }

    /// Black-and-white hills: sky, mountains, trees, a lone tree, ground, and a
    /// foreground tree that passes in front of the character.
    pub fn builtin(viewport_width: f32, viewport_height: f32) -> Self {
        let layer = |id: &str, image: &str, w: f32, h: f32, divisor: f32, y_offset: f32| {
            ParallaxLayer {
                id: id.to_string(),
                image: format!("images/bw_{image}.png"),
                width: w,
                height: h,
                speed_divisor: divisor,
                y_offset,
            }
        };
        Self {
            scene_id: "bw_hills".to_string(),
            layers: vec![
                layer("sky", "sky", viewport_width, viewport_height, 10_000.0, 0.0),
                layer("mountains", "mountains", 2048.0, 420.0, 1_000.0, 0.0),
                layer("trees", "trees", 2048.0, 300.0, 100.0, 100.0),
                layer("tree", "tree", 1600.0, 520.0, 10.0, 0.0),
                layer("ground", "ground", 2048.0, 110.0, 1.0, 0.0),
                layer("foreground_tree", "tree", 3200.0, 700.0, 0.5, -100.0),
            ],
            character_depth: 3,
            character_sheet: Some("sprites/bw_sonic.png".to_string()),
        }
    }

    /// Emit the blits for every layer plus the character's current frame.
    pub fn build_draw_plan(&self, camera: &Camera, character: &Character, frame: u32) -> DrawPlan {
        let mut plan = DrawPlan {
            commands: Vec::with_capacity(self.layers.len() * 2 + 1),
        };
        let character_blit = DrawCommand {
            image: ImageHandle::CharacterFrame(frame),
            src: Rect::new(0.0, 0.0, character.width, character.height),
            dst: Rect::new(
                character.position.x,
                character.position.y,
                character.width,
                character.height,
            ),
        };

        for (index, layer) in self.layers.iter().enumerate() {
            if index == self.character_depth {
                plan.commands.push(character_blit);
            }
            push_layer_slices(&mut plan, index, layer, camera);
        }
        if self.character_depth >= self.layers.len() {
            plan.commands.push(character_blit);
        }

        log::trace!(
            "Draw plan for scene '{}': {} blits at scroll {:.1}",
            self.scene_id,
            plan.len(),
            camera.scroll_offset
        );
        plan
    }
}

/// Two slices give horizontal wraparound: `[visible, w)` at the left edge,
/// then `[0, ..)` filling the rest of the viewport.
fn push_layer_slices(plan: &mut DrawPlan, index: usize, layer: &ParallaxLayer, camera: &Camera) {
    let w = layer.width;
    let h = layer.height;
    let dest_y = camera.viewport_height - h - layer.y_offset;
    let offset = camera.scroll_offset / layer.speed_divisor;
    let visible = offset.rem_euclid(w);

    let first_w = (w - visible).min(camera.viewport_width);
    plan.commands.push(DrawCommand {
        image: ImageHandle::Layer(index),
        src: Rect::new(visible, 0.0, first_w, h),
        dst: Rect::new(0.0, dest_y, first_w, h),
    });

    let second_w = (camera.viewport_width - first_w).min(w);
    if second_w > 0.0 {
        plan.commands.push(DrawCommand {
            image: ImageHandle::Layer(index),
            src: Rect::new(0.0, 0.0, second_w, h),
            dst: Rect::new(first_w, dest_y, second_w, h),
        });
    }
}

pub struct SceneWatcher {
    scene_path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl SceneWatcher {
    pub fn new(scene_path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&scene_path);
        Self {
            scene_path,
            last_seen_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.scene_path
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.scene_path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub fn load_scene_from_path(scene_path: &Path) -> Result<Scene, ConfigError> {
    let file: SceneFile = read_json(scene_path)?;
    validate_scene(&file)?;
    Ok(Scene::from_file(file))
}

fn validate_scene(scene: &SceneFile) -> Result<(), ConfigError> {
    if scene.version != SUPPORTED_VERSION {
        return Err(ConfigError::invalid(
            "Scene",
            format!("unsupported version '{}'", scene.version),
        ));
    }
    if scene.layers.is_empty() {
        return Err(ConfigError::invalid("Scene", "layers array is empty"));
    }
    if let Some(base) = scene.geometric_base {
        if base <= 0.0 || !base.is_finite() {
            return Err(ConfigError::invalid("Scene", "geometric_base must be > 0"));
        }
    }

    let mut layer_ids = HashSet::new();
    for (index, layer) in scene.layers.iter().enumerate() {
        if !layer_ids.insert(layer.id.as_str()) {
            return Err(ConfigError::invalid(
                "Scene",
                format!("duplicate layer id '{}'", layer.id),
            ));
        }
        if layer.width <= 0.0 || layer.height <= 0.0 {
            return Err(ConfigError::invalid(
                "Scene",
                format!("layer '{}' must have positive width and height", layer.id),
            ));
        }
        match resolved_divisor(
            layer.speed_divisor,
            scene.geometric_base,
            scene.layers.len(),
            index,
        ) {
            Some(divisor) if divisor < MIN_SPEED_DIVISOR || !divisor.is_finite() => {
                return Err(ConfigError::invalid(
                    "Scene",
                    format!(
                        "layer '{}' speed_divisor {} must be finite and >= {}",
                        layer.id, divisor, MIN_SPEED_DIVISOR
                    ),
                ));
            }
            None if scene.geometric_base.is_none() => {
                return Err(ConfigError::invalid(
                    "Scene",
                    format!(
                        "layer {} ('{}') has no speed_divisor and the scene has no geometric_base",
                        index, layer.id
                    ),
                ));
            }
            _ => {}
        }
    }

    if let Some(depth) = scene.character_depth {
        if depth >= scene.layers.len() {
            log::warn!(
                "Scene '{}' character_depth {} is past the last layer; the character is drawn on top.",
                scene.scene_id,
                depth
            );
        }
    }

    Ok(())
}

/// Explicit divisor, else `base^(n-1-i)`.
fn resolved_divisor(
    explicit: Option<f32>,
    base: Option<f32>,
    count: usize,
    index: usize,
) -> Option<f32> {
    explicit.or_else(|| base.map(|b| b.powi((count - 1 - index) as i32)))
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}
