//! Tunable numbers for a session, loadable from JSON.
//!
//! Every field has a default, so a config file only needs to name the values
//! it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "CANNON_CREW_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Fireables ──
    /// Vertical speed of anything shot from a cannon, units per second.
    pub fire_speed: f32,
    /// Spin of airborne fireables, degrees per second.
    pub fire_spin: f32,

    // ── Interactables ──
    pub cannon_cooldown: f32,
    pub barrel_cooldown: f32,

    // ── Pirates ──
    pub crew_size: usize,
    pub pirate_speed: f32,
    pub pirate_reach: f32,
    pub crouch_speed_factor: f32,
    pub holding_speed_factor: f32,
    pub drunk_speed_factor: f32,
    /// Seconds of scurvy grace a pirate starts with.
    pub scurvy_max: f32,
    pub drunk_min: f32,
    pub drunk_max: f32,
    /// Length of the player's death sequence before the lose signal.
    pub death_sequence: f32,

    // ── Brain ──
    /// Hard ceiling on a task's age before it is replaced.
    pub task_age_ceiling: f32,
    pub boredom_min: f32,
    pub boredom_max: f32,

    // ── Enemy ──
    pub enemy_fire_min_interval: f32,
    pub enemy_fire_max_interval: f32,
    pub max_volley: u32,

    // ── Health ──
    pub boat_health: f32,
    pub enemy_health: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fire_speed: 400.0,
            fire_spin: 360.0,
            cannon_cooldown: 12.0,
            barrel_cooldown: 3.0,
            crew_size: 4,
            pirate_speed: 300.0,
            pirate_reach: 80.0,
            crouch_speed_factor: 0.6,
            holding_speed_factor: 0.6,
            drunk_speed_factor: 1.8,
            scurvy_max: 120.0,
            drunk_min: 8.0,
            drunk_max: 15.0,
            death_sequence: 2.5,
            task_age_ceiling: 20.0,
            boredom_min: 2.0,
            boredom_max: 5.0,
            enemy_fire_min_interval: 0.5,
            enemy_fire_max_interval: 4.0,
            max_volley: 3,
            boat_health: 100.0,
            enemy_health: 100.0,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: GameConfig =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw, path)
    }

    /// Load from `CANNON_CREW_CONFIG` when set, defaults otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fire_speed", self.fire_speed)?;
        positive("pirate_speed", self.pirate_speed)?;
        positive("pirate_reach", self.pirate_reach)?;
        positive("scurvy_max", self.scurvy_max)?;
        positive("death_sequence", self.death_sequence)?;
        positive("task_age_ceiling", self.task_age_ceiling)?;
        positive("boat_health", self.boat_health)?;
        positive("enemy_health", self.enemy_health)?;
        positive("enemy_fire_min_interval", self.enemy_fire_min_interval)?;
        ordered("drunk_min", self.drunk_min, self.drunk_max)?;
        ordered("boredom_min", self.boredom_min, self.boredom_max)?;
        ordered(
            "enemy_fire_min_interval",
            self.enemy_fire_min_interval,
            self.enemy_fire_max_interval,
        )?;
        if self.max_volley == 0 {
            return Err(ConfigError::Invalid {
                field: "max_volley",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a positive number, got {value}"),
        })
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min >= 0.0 && min <= max {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("range {min}..{max} is empty or negative"),
        })
    }
}
