use thiserror::Error;

use crate::components::Position;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not create a playable board after {attempts} attempts")]
    GenerationFailed { attempts: usize },

    #[error("grid is {found:?}, expected {expected:?}")]
    InvalidDimensions {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("an animation is still playing")]
    Busy,

    #[error("the game is over")]
    GameOver,

    #[error("no game in progress")]
    NotPlaying,

    #[error("the game is not over yet")]
    GameInProgress,

    #[error("no moves remaining")]
    NoMovesRemaining,

    #[error("position {0} is off the board")]
    OutOfBounds(Position),

    #[error("positions {0} and {1} are not adjacent")]
    NotAdjacent(Position, Position),

    #[error("storage: {0}")]
    Storage(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    #[error("name must not be blank")]
    BlankName,

    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),

    /// Error payload from the leaderboard service, kept verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("malformed leaderboard data: {0}")]
    Malformed(String),
}
