//! Sprite animation lookup keyed on the character's pose.
//!
//! An [`AnimationTable`] maps every `(CharacterState, Direction)` pair to a
//! non-empty sequence of frame indices into the character's sprite sheet.
//! Completeness is checked once at construction so that the per-tick lookup
//! can never miss.
//!
//! Animation speed is tied to the simulation: the [`AnimationCursor`] moves
//! one step per tick, with no notion of elapsed wall-clock time.
//!
//! Frame indices address a sheet of `n` frames followed by their mirrored
//! copies (`n..2n`). Mapping an index to pixels is the asset loader's job.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{read_json, ConfigError};
use crate::pose::{CharacterState, Direction};

const SUPPORTED_VERSION: &str = "0.1";

const STATE_COUNT: usize = CharacterState::ALL.len();
const DIRECTION_COUNT: usize = Direction::ALL.len();

/// Immutable, complete `(state, direction) -> frames` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationTable {
    sequences: [[Vec<u32>; DIRECTION_COUNT]; STATE_COUNT],
}

impl AnimationTable {
    /// Build a table, failing if any pair is missing or has no frames.
    pub fn from_entries(
        mut entries: HashMap<(CharacterState, Direction), Vec<u32>>,
    ) -> Result<Self, ConfigError> {
        for state in CharacterState::ALL {
            for direction in Direction::ALL {
                match entries.get(&(state, direction)) {
                    None => return Err(ConfigError::MissingAnimation { state, direction }),
                    Some(frames) if frames.is_empty() => {
                        return Err(ConfigError::EmptySequence { state, direction })
                    }
                    Some(_) => {}
                }
            }
        }

        let sequences = std::array::from_fn(|s| {
            std::array::from_fn(|d| {
                entries
                    .remove(&(CharacterState::ALL[s], Direction::ALL[d]))
                    .unwrap_or_default()
            })
        });
        Ok(Self { sequences })
    }

    /// The sprite map the game ships with.
    pub fn builtin() -> Self {
        let sequences = std::array::from_fn(|s| {
            std::array::from_fn(|d| builtin_sequence(CharacterState::ALL[s], Direction::ALL[d]))
        });
        Self { sequences }
    }

    pub fn sequence(&self, state: CharacterState, direction: Direction) -> &[u32] {
        &self.sequences[state.index()][direction.index()]
    }
}

impl Default for AnimationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_sequence(state: CharacterState, direction: Direction) -> Vec<u32> {
    use CharacterState::*;
    use Direction::*;

    match (state, direction) {
        (Standing, West) => vec![24],
        (Standing, _) => vec![0],
        (Running, East) => (12..20).collect(),
        (Running, West) => (36..44).collect(),
        (Running, _) => vec![0],
        (Impatient, _) => (2..6).collect(),
        (InAir, North | NorthEast | East | SouthEast) => vec![12],
        (InAir, _) => vec![36],
    }
}

/// Per-character position within the current frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationCursor {
    pub index: usize,
    reset_on_transition: bool,
    last_pose: Option<(CharacterState, Direction)>,
}

impl AnimationCursor {
    /// With `reset_on_transition == false` the index keeps counting across pose
    /// changes and is only wrapped by the new sequence length, which can land
    /// mid-sequence. With `true`, a pose change restarts at the first frame.
    pub fn new(reset_on_transition: bool) -> Self {
        Self {
            index: 0,
            reset_on_transition,
            last_pose: None,
        }
    }

    /// Advance one tick for the given pose and return the frame to draw.
    pub fn advance(
        &mut self,
        table: &AnimationTable,
        state: CharacterState,
        direction: Direction,
    ) -> u32 {
        let frames = table.sequence(state, direction);
        let pose = (state, direction);
        let transitioned = self.last_pose.is_some_and(|last| last != pose);

        if self.reset_on_transition && transitioned {
            self.index = 0;
        } else {
            self.index = (self.index + 1) % frames.len();
        }
        if transitioned {
            log::trace!(
                "Animation pose changed to ({}, {}), cursor at {}",
                state,
                direction,
                self.index
            );
        }
        self.last_pose = Some(pose);

        frames[self.index]
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct AnimationTableJson {
    version: String,
    table_id: String,
    entries: Vec<AnimationEntryJson>,
}

/// A `direction` of `None` fills every direction of `state` that has no
/// explicit entry.
#[derive(Debug, Deserialize)]
struct AnimationEntryJson {
    state: CharacterState,
    #[serde(default)]
    direction: Option<Direction>,
    frames: Vec<u32>,
}

/// Load an animation table from disk.
pub fn load_animation_table(path: &Path) -> Result<AnimationTable, ConfigError> {
    let json: AnimationTableJson = read_json(path)?;
    validate_animation_json(&json)?;

    let mut explicit = HashMap::new();
    let mut fills = HashMap::new();
    for entry in json.entries {
        match entry.direction {
            Some(direction) => {
                explicit.insert((entry.state, direction), entry.frames);
            }
            None => {
                fills.insert(entry.state, entry.frames);
            }
        }
    }

    let mut entries = explicit;
    for (state, frames) in fills {
        for direction in Direction::ALL {
            entries
                .entry((state, direction))
                .or_insert_with(|| frames.clone());
        }
    }

    let table = AnimationTable::from_entries(entries)?;
    log::info!("Loaded animation table '{}'", json.table_id);
    Ok(table)
}

fn validate_animation_json(json: &AnimationTableJson) -> Result<(), ConfigError> {
    if json.version != SUPPORTED_VERSION {
        return Err(ConfigError::invalid(
            "Animation",
            format!("unsupported version '{}'", json.version),
        ));
    }
    if json.table_id.is_empty() {
        return Err(ConfigError::invalid("Animation", "table_id is empty"));
    }

    let mut seen = std::collections::HashSet::new();
    for entry in &json.entries {
        if !seen.insert((entry.state, entry.direction)) {
            let direction = entry.direction.map_or("*", Direction::label);
            return Err(ConfigError::invalid(
                "Animation",
                format!("duplicate entry ({}, {})", entry.state, direction),
            ));
        }
        if entry.frames.is_empty() {
            if let Some(direction) = entry.direction {
                return Err(ConfigError::EmptySequence {
                    state: entry.state,
                    direction,
                });
            }
            return Err(ConfigError::invalid(
                "Animation",
                format!("fill entry for '{}' has no frames", entry.state),
            ));
        }
    }
    Ok(())
}
