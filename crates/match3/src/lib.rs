pub mod components;
pub mod config;
pub mod error;
pub mod grid;
pub mod input;
pub mod leaderboard;
pub mod rng;
pub mod state;
pub mod storage;
pub mod systems;

#[cfg(target_arch = "wasm32")]
pub mod bridge;

pub use error::{Error, LeaderboardError, Result};
pub use state::{GamePhase, GameSession, TurnOutcome};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("match3-sim initialized");
}
