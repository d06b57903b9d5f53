use serde::{Deserialize, Serialize};

/// The six interchangeable tile symbols.
/// Serialized lowercase so saves stay compatible with the browser build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TileType {
    Poring = 0,
    Drops = 1,
    Poporing = 2,
    Marin = 3,
    Xporing = 4,
    Pouring = 5,
}

impl TileType {
    pub const ALL: [TileType; 6] = [
        TileType::Poring,
        TileType::Drops,
        TileType::Poporing,
        TileType::Marin,
        TileType::Xporing,
        TileType::Pouring,
    ];

    pub fn from_index(index: usize) -> Option<TileType> {
        Self::ALL.get(index).copied()
    }
}

/// A cell coordinate. `x` is the column, `y` the row (row 0 is the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// True when the two positions share an edge.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Default grid dimensions matching the browser game.
pub const DEFAULT_WIDTH: usize = 8;
pub const DEFAULT_HEIGHT: usize = 8;

pub const INITIAL_MOVES: i32 = 20;
pub const POINTS_PER_TILE: u32 = 10;

/// Cascade loop bound. Hitting it is logged, never fatal.
pub const MAX_CASCADE_ITERATIONS: usize = 20;

/// Whole-board attempts before generation gives up.
pub const MAX_GENERATION_ATTEMPTS: usize = 100;
/// Per-cell re-rolls while avoiding a 3-streak during raster fill.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10;

/// Cumulative combo counts that each award one bonus move, once per cascade.
pub const COMBO_BONUS_THRESHOLDS: [u32; 2] = [3, 5];
/// Combo popups start at this count.
pub const COMBO_POPUP_MIN: u32 = 2;

pub const MIN_MATCH_LEN: usize = 3;

pub const MAX_NAME_LEN: usize = 50;
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Minimum pointer travel (pixels) before a drag counts as a swipe.
pub const SWIPE_THRESHOLD: f32 = 20.0;

pub const SAVE_KEY: &str = "roMatch3Save";
pub const LEADERBOARD_KEY: &str = "roMatch3Leaderboard";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_orthogonal_only() {
        let p = Position::new(3, 3);
        assert!(p.is_adjacent(Position::new(4, 3)));
        assert!(p.is_adjacent(Position::new(3, 2)));
        assert!(!p.is_adjacent(Position::new(4, 4)));
        assert!(!p.is_adjacent(Position::new(5, 3)));
        assert!(!p.is_adjacent(p));
    }

    #[test]
    fn tile_types_serialize_lowercase() {
        let json = serde_json::to_string(&TileType::Xporing).unwrap();
        assert_eq!(json, "\"xporing\"");
        let back: TileType = serde_json::from_str("\"marin\"").unwrap();
        assert_eq!(back, TileType::Marin);
    }

    #[test]
    fn from_index_covers_all_types() {
        for (i, t) in TileType::ALL.iter().enumerate() {
            assert_eq!(TileType::from_index(i), Some(*t));
        }
        assert_eq!(TileType::from_index(6), None);
    }
}
