use std::cell::RefCell;
use wasm_bindgen::prelude::*;

use crate::components::Position;
use crate::config::GameConfig;
use crate::error::Result;
use crate::input::SwipeTracker;
use crate::leaderboard::{ranked, BrowserLeaderboard, Leaderboard, ScoreEntry};
use crate::state::{GameSession, TurnOutcome};
use crate::storage::LocalStorageStore;

thread_local! {
    static GAME: RefCell<Option<GameSession<LocalStorageStore>>> = RefCell::new(None);
    static LEADERBOARD: RefCell<Option<BrowserLeaderboard>> = RefCell::new(None);
    static SWIPE: RefCell<Option<SwipeTracker>> = RefCell::new(None);
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn with_game<R>(f: impl FnOnce(&mut GameSession<LocalStorageStore>) -> R) -> std::result::Result<R, JsValue> {
    GAME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let session = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Game not initialized. Call init_game() first."))?;
        Ok(f(session))
    })
}

/// Effects of a transition as a JSON array for the host to play in order.
fn effects_json(result: Result<TurnOutcome>) -> std::result::Result<String, JsValue> {
    let outcome = result.map_err(js_error)?;
    serde_json::to_string(&outcome.effects).map_err(js_error)
}

#[wasm_bindgen]
pub fn init_game(seed: f64) {
    let config = GameConfig {
        seed: Some(seed as u64),
        ..GameConfig::default()
    };
    let leaderboard = BrowserLeaderboard::open(config.leaderboard_size).unwrap_or_else(|e| {
        log::warn!("starting with an empty leaderboard: {}", e);
        BrowserLeaderboard::empty(config.leaderboard_size)
    });
    let session = GameSession::new(config, LocalStorageStore);
    GAME.with(|cell| {
        *cell.borrow_mut() = Some(session);
    });
    LEADERBOARD.with(|cell| {
        *cell.borrow_mut() = Some(leaderboard);
    });
    log::info!("match3-sim: session initialized with seed {}", seed as u64);
}

#[wasm_bindgen]
pub fn has_saved_game() -> std::result::Result<bool, JsValue> {
    with_game(|g| g.has_saved_game())
}

#[wasm_bindgen]
pub fn new_game() -> std::result::Result<String, JsValue> {
    with_game(|g| g.new_game()).and_then(effects_json)
}

#[wasm_bindgen]
pub fn load_game() -> std::result::Result<String, JsValue> {
    with_game(|g| g.load_game()).and_then(effects_json)
}

#[wasm_bindgen]
pub fn propose_swap(x1: u32, y1: u32, x2: u32, y2: u32) -> std::result::Result<String, JsValue> {
    let a = Position::new(x1 as usize, y1 as usize);
    let b = Position::new(x2 as usize, y2 as usize);
    with_game(|g| g.propose_swap(a, b)).and_then(effects_json)
}

#[wasm_bindgen]
pub fn reject_gesture(x: u32, y: u32) -> std::result::Result<String, JsValue> {
    with_game(|g| g.reject_gesture(Position::new(x as usize, y as usize))).and_then(effects_json)
}

/// Call once every effect from the last transition has played.
/// Returns the resulting phase as a u8.
#[wasm_bindgen]
pub fn finish_animations() -> std::result::Result<u8, JsValue> {
    with_game(|g| g.finish_animations() as u8)
}

#[wasm_bindgen]
pub fn leave_game() -> std::result::Result<(), JsValue> {
    with_game(|g| g.leave_game())?.map_err(js_error)
}

#[wasm_bindgen]
pub fn skip_submission() -> std::result::Result<(), JsValue> {
    with_game(|g| g.skip_submission())?.map_err(js_error)
}

/// Returns the hint as [x1, y1, x2, y2], or an empty array.
#[wasm_bindgen]
pub fn get_hint() -> std::result::Result<Vec<u32>, JsValue> {
    with_game(|g| {
        g.hint()
            .map(|mv| vec![mv.a.x as u32, mv.a.y as u32, mv.b.x as u32, mv.b.y as u32])
            .unwrap_or_default()
    })
}

/// Returns the board as JSON rows of tile names (null for empty cells).
#[wasm_bindgen]
pub fn get_board() -> std::result::Result<String, JsValue> {
    with_game(|g| serde_json::to_string(g.grid()))?.map_err(js_error)
}

#[wasm_bindgen]
pub fn get_game_phase() -> std::result::Result<u8, JsValue> {
    with_game(|g| g.phase() as u8)
}

#[wasm_bindgen]
pub fn is_busy() -> std::result::Result<bool, JsValue> {
    with_game(|g| g.is_busy())
}

#[wasm_bindgen]
pub fn get_score() -> std::result::Result<u32, JsValue> {
    with_game(|g| g.score())
}

#[wasm_bindgen]
pub fn get_moves_remaining() -> std::result::Result<i32, JsValue> {
    with_game(|g| g.moves_remaining())
}

#[wasm_bindgen]
pub fn get_combo_count() -> std::result::Result<u32, JsValue> {
    with_game(|g| g.combo_count())
}

#[wasm_bindgen]
pub fn get_board_width() -> std::result::Result<u32, JsValue> {
    with_game(|g| g.grid().width() as u32)
}

#[wasm_bindgen]
pub fn get_board_height() -> std::result::Result<u32, JsValue> {
    with_game(|g| g.grid().height() as u32)
}

/// Top scores as JSON rows `{rank, name, score}`.
fn ranked_json(entries: &[ScoreEntry]) -> std::result::Result<String, JsValue> {
    serde_json::to_string(&ranked(entries)).map_err(js_error)
}

/// Submit the final score. Returns the refreshed table as ranked JSON; errors carry the
/// leaderboard's message verbatim. The session returns to the menu either way.
#[wasm_bindgen]
pub fn submit_score(name: &str) -> std::result::Result<String, JsValue> {
    LEADERBOARD.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let leaderboard = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Game not initialized. Call init_game() first."))?;
        let top = with_game(|g| g.submit_score(name, leaderboard))?.map_err(js_error)?;
        ranked_json(&top)
    })
}

#[wasm_bindgen]
pub fn get_leaderboard() -> std::result::Result<String, JsValue> {
    let limit = with_game(|g| g.config().leaderboard_size)?;
    LEADERBOARD.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let leaderboard = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Game not initialized. Call init_game() first."))?;
        let top = leaderboard.top_scores(limit).map_err(js_error)?;
        ranked_json(&top)
    })
}

/// Where the board is drawn: tile edge in pixels and the board's top-left corner.
#[wasm_bindgen]
pub fn set_board_layout(tile_size: f32, origin_x: f32, origin_y: f32) -> std::result::Result<(), JsValue> {
    let (width, height) = with_game(|g| (g.grid().width(), g.grid().height()))?;
    SWIPE.with(|cell| {
        *cell.borrow_mut() = Some(SwipeTracker::new(width, height, tile_size, (origin_x, origin_y)));
    });
    Ok(())
}

fn with_swipe<R>(f: impl FnOnce(&mut SwipeTracker) -> R) -> std::result::Result<R, JsValue> {
    SWIPE.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let tracker = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Board layout not set. Call set_board_layout() first."))?;
        Ok(f(tracker))
    })
}

/// Start a drag. Returns false when ignored (off the board, or the game is not taking input).
#[wasm_bindgen]
pub fn pointer_down(x: f32, y: f32) -> std::result::Result<bool, JsValue> {
    if !with_game(|g| g.accepts_input())? {
        return Ok(false);
    }
    with_swipe(|t| t.pointer_down(x, y))
}

/// Finish a drag. Returns the effects JSON of the resulting swap or wiggle (`[]` for none).
#[wasm_bindgen]
pub fn pointer_up(x: f32, y: f32) -> std::result::Result<String, JsValue> {
    let gesture = with_swipe(|t| t.pointer_up(x, y))?;
    match with_game(|g| g.apply_gesture(gesture))?.map_err(js_error)? {
        Some(outcome) => effects_json(Ok(outcome)),
        None => Ok("[]".to_string()),
    }
}
