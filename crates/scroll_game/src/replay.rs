use serde::Deserialize;
use std::path::Path;

use scroll_core::error::{read_json, ConfigError};
use scroll_core::input::{InputSnapshot, InputState, Key};

/// Scripted key presses, one entry per run of identical ticks.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Keys held for the whole run.
    #[serde(default)]
    pub keys: Vec<Key>,
    /// Keys pressed and released again before the first tick of the run samples them.
    #[serde(default)]
    pub taps: Vec<Key>,
    /// Window-close style quit on the first tick of the run.
    #[serde(default)]
    pub quit: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// Feed the script through [`InputState`] and sample one snapshot per tick,
    /// so edge-triggered keys behave exactly as they would live.
    pub fn expanded_inputs(&self) -> Vec<InputSnapshot> {
        let mut input = InputState::new();
        let mut out = Vec::new();
        for frame in &self.frames {
            for tick in 0..frame.repeat.max(1) {
                for key in ALL_KEYS {
                    if frame.keys.contains(&key) {
                        input.key_down(key);
                    } else {
                        input.key_up(key);
                    }
                }
                if tick == 0 {
                    for &key in &frame.taps {
                        if !input.is_held(key) {
                            input.key_down(key);
                            input.key_up(key);
                        }
                    }
                    if frame.quit {
                        input.request_quit();
                    }
                }
                out.push(input.snapshot());
                input.end_frame();
            }
        }
        out
    }
}

const ALL_KEYS: [Key; 9] = [
    Key::Left,
    Key::Right,
    Key::Up,
    Key::Down,
    Key::D,
    Key::A,
    Key::F,
    Key::Q,
    Key::Escape,
];

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, ConfigError> {
    let replay: ReplaySequence = read_json(path)?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), ConfigError> {
    if replay.frames.is_empty() {
        return Err(ConfigError::invalid("Replay", "frames list is empty"));
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::scene::Scene;
    use crate::step::Simulation;
    use scroll_core::animation::AnimationTable;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "scroll_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn new_sim() -> Simulation {
        let config = GameConfig::default();
        Simulation::new(
            &config,
            Scene::builtin(config.viewport_width, config.viewport_height),
            AnimationTable::builtin(),
        )
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "keys": ["right"], "repeat": 3 },
                { "keys": ["right", "d"] },
                { "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 6);
        assert!(expanded[0].right);
        assert!(expanded[3].jump);
        assert!(!expanded[3].up);
        assert!(expanded[4].is_idle());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_empty_frames() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.to_string().contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn held_fullscreen_key_toggles_once() {
        let replay = ReplaySequence {
            frames: vec![ReplayFrame {
                keys: vec![Key::F],
                taps: Vec::new(),
                quit: false,
                repeat: 5,
            }],
        };
        let toggles = replay
            .expanded_inputs()
            .iter()
            .filter(|s| s.toggle_fullscreen)
            .count();
        assert_eq!(toggles, 1);
    }

    #[test]
    fn tap_counts_for_exactly_one_tick() {
        let replay = ReplaySequence {
            frames: vec![ReplayFrame {
                keys: Vec::new(),
                taps: vec![Key::Left],
                quit: false,
                repeat: 3,
            }],
        };
        let inputs = replay.expanded_inputs();
        assert!(inputs[0].left);
        assert!(!inputs[1].left);
        assert!(!inputs[2].left);
    }

    #[test]
    fn quit_frame_produces_quit_snapshot() {
        let replay = ReplaySequence {
            frames: vec![
                ReplayFrame {
                    keys: vec![Key::Right],
                    taps: Vec::new(),
                    quit: false,
                    repeat: 2,
                },
                ReplayFrame {
                    keys: Vec::new(),
                    taps: Vec::new(),
                    quit: true,
                    repeat: 1,
                },
            ],
        };
        let inputs = replay.expanded_inputs();
        assert!(!inputs[1].quit);
        assert!(inputs[2].quit);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "keys": ["right"], "repeat": 60 },
                { "keys": ["right", "d"], "repeat": 1 },
                { "keys": ["right", "a"], "repeat": 120 },
                { "keys": ["left"], "repeat": 45 },
                { "repeat": 40 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let inputs = replay.expanded_inputs();

        let mut run_a = new_sim();
        let mut run_b = new_sim();
        let mut frames_a = Vec::new();
        let mut frames_b = Vec::new();
        for input in &inputs {
            frames_a.push(run_a.step(input).motion.frame);
        }
        for input in &inputs {
            frames_b.push(run_b.step(input).motion.frame);
        }

        assert_eq!(frames_a, frames_b);
        assert!((run_a.character.position.x - run_b.character.position.x).abs() < 0.0001);
        assert!((run_a.character.position.y - run_b.character.position.y).abs() < 0.0001);
        assert!((run_a.camera.scroll_offset - run_b.camera.scroll_offset).abs() < 0.0001);
        assert_eq!(run_a.character.state, run_b.character.state);
        assert!(run_a.camera.scroll_offset > 0.0);

        let _ = fs::remove_file(path);
    }
}
