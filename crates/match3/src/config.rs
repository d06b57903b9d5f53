//! Game configuration loaded from TOML.
//!
//! Native builds read `config.toml` from the platform config directory
//! (e.g. ~/.config/match3/config.toml). Every field is optional.

use serde::{Deserialize, Serialize};

use crate::components::{
    DEFAULT_HEIGHT, DEFAULT_LEADERBOARD_SIZE, DEFAULT_WIDTH, INITIAL_MOVES,
    MAX_CASCADE_ITERATIONS, MAX_GENERATION_ATTEMPTS, MAX_PLACEMENT_ATTEMPTS,
};
use crate::error::Result;
use crate::systems::cascade::CascadeResolver;
use crate::systems::generator::BoardGenerator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Move budget of a fresh game, also assumed for saves without a move count.
    pub initial_moves: i32,
    pub max_cascade_iterations: usize,
    pub generation_attempts: usize,
    pub placement_attempts: usize,
    pub leaderboard_size: usize,
    /// Fixed RNG seed; random per session when unset.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            initial_moves: INITIAL_MOVES,
            max_cascade_iterations: MAX_CASCADE_ITERATIONS,
            generation_attempts: MAX_GENERATION_ATTEMPTS,
            placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from the config file, or fall back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml_str(&contents).unwrap_or_else(|e| {
                log::warn!("ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "match3", "match3")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn generator(&self) -> BoardGenerator {
        BoardGenerator {
            width: self.width,
            height: self.height,
            max_attempts: self.generation_attempts,
            max_placement_attempts: self.placement_attempts,
        }
    }

    pub fn resolver(&self) -> CascadeResolver {
        CascadeResolver {
            width: self.width,
            height: self.height,
            max_iterations: self.max_cascade_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(GameConfig::from_toml_str("").unwrap(), GameConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = GameConfig::from_toml_str("initial_moves = 30\nseed = 7\n").unwrap();
        assert_eq!(config.initial_moves, 30);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.width, 8);
        assert_eq!(config.max_cascade_iterations, 20);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let err = GameConfig::from_toml_str("initial_moves = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn builds_systems_from_config() {
        let config = GameConfig::default();
        assert_eq!(config.generator().max_attempts, 100);
        assert_eq!(config.resolver().max_iterations, 20);
    }
}
