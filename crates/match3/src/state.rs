use crate::components::Position;
use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::input::Gesture;
use crate::leaderboard::{Leaderboard, ScoreEntry};
use crate::rng::SessionRng;
use crate::storage::{load_saved_game, SaveStore, SavedGame};
use crate::systems::cascade::CascadeOutcome;
use crate::systems::effects::{Effect, EffectQueue};
use crate::systems::matcher::find_matches;
use crate::systems::moves::{MoveFinder, SwapMove};

/// Turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GamePhase {
    /// No game loaded (start screen, leaderboard).
    Menu = 0,
    Idle = 1,
    SwapPending = 2,
    Resolving = 3,
    Reshuffling = 4,
    GameOver = 5,
}

/// What a transition did, and the effects the host must play before
/// calling [`GameSession::finish_animations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// False for a swap that made no match and was reverted.
    pub accepted: bool,
    pub effects: Vec<Effect>,
    pub score_delta: u32,
    pub moves_delta: i32,
    pub combo: u32,
    pub reshuffled: bool,
    pub hit_iteration_limit: bool,
}

/// One player's game: board, counters, and the animation lock.
///
/// Every entry point that starts a turn, reshuffle or game transition takes the
/// lock. It is released by [`finish_animations`](Self::finish_animations) once the
/// host has played the returned effects, or immediately when a transition fails.
pub struct GameSession<S: SaveStore> {
    config: GameConfig,
    store: S,
    rng: SessionRng,
    grid: Grid,
    score: u32,
    moves_remaining: i32,
    combo_count: u32,
    phase: GamePhase,
    busy: bool,
    /// Board or counters changed since the last save.
    dirty: bool,
}

impl<S: SaveStore> GameSession<S> {
    pub fn new(config: GameConfig, store: S) -> Self {
        let rng = match config.seed {
            Some(seed) => SessionRng::new(seed),
            None => entropy_rng(),
        };
        Self::with_rng(config, store, rng)
    }

    pub fn with_rng(config: GameConfig, store: S, rng: SessionRng) -> Self {
        let grid = Grid::new(config.width, config.height);
        let moves_remaining = config.initial_moves;
        GameSession {
            config,
            store,
            rng,
            grid,
            score: 0,
            moves_remaining,
            combo_count: 0,
            phase: GamePhase::Menu,
            busy: false,
            dirty: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_remaining(&self) -> i32 {
        self.moves_remaining
    }

    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Whether a playable save exists. Invalid or finished saves are deleted.
    pub fn has_saved_game(&mut self) -> bool {
        load_saved_game(
            &mut self.store,
            self.config.width,
            self.config.height,
            self.config.initial_moves,
        )
        .is_some()
    }

    /// Start fresh, discarding any save.
    pub fn new_game(&mut self) -> Result<TurnOutcome> {
        self.ensure_unlocked()?;
        self.locked(GamePhase::Resolving, GamePhase::Menu, |session| {
            session.start_fresh()?;
            session.clear_save();
            session.settle_initial_board()
        })
    }

    /// Continue the saved game, or start a new one when no valid save exists.
    pub fn load_game(&mut self) -> Result<TurnOutcome> {
        self.ensure_unlocked()?;
        let saved = load_saved_game(
            &mut self.store,
            self.config.width,
            self.config.height,
            self.config.initial_moves,
        );
        self.locked(GamePhase::Resolving, GamePhase::Menu, |session| {
            match saved {
                Some(saved) => {
                    log::info!("continuing saved game: score {}, {} moves", saved.score, saved.moves());
                    session.moves_remaining = saved.moves();
                    session.score = saved.score;
                    session.grid = saved.grid;
                    session.combo_count = 0;
                }
                None => session.start_fresh()?,
            }
            session.settle_initial_board()
        })
    }

    /// Try to swap two adjacent cells.
    ///
    /// A swap that makes no match is reverted without consuming a move. Otherwise one
    /// move is spent, the combo resets, and the cascade resolves (reshuffling on deadlock).
    /// If the reshuffle fails the whole turn is rolled back to the pre-swap board.
    pub fn propose_swap(&mut self, a: Position, b: Position) -> Result<TurnOutcome> {
        self.ensure_playable()?;
        if self.moves_remaining <= 0 {
            return Err(Error::NoMovesRemaining);
        }
        for pos in [a, b] {
            if !self.grid.in_bounds(pos) {
                return Err(Error::OutOfBounds(pos));
            }
        }
        if !a.is_adjacent(b) {
            return Err(Error::NotAdjacent(a, b));
        }

        self.locked(GamePhase::SwapPending, GamePhase::Idle, |session| {
            let mut effects = EffectQueue::new();
            let snapshot = session.snapshot();
            effects.push(Effect::Swap { a, b });
            session.grid.swap(a, b);

            if find_matches(&session.grid).is_empty() {
                session.grid.swap(a, b);
                effects.push(Effect::SwapBack { a, b });
                return Ok(session.finish_transition(TurnOutcome::default(), effects));
            }

            session.moves_remaining -= 1;
            session.combo_count = 0;
            effects.push(Effect::MovesChanged {
                moves: session.moves_remaining,
            });

            session.phase = GamePhase::Resolving;
            let mut outcome = match session.resolve(true, &mut effects) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!("rolling back turn {} <-> {}: {}", a, b, e);
                    session.restore(snapshot);
                    return Err(e);
                }
            };
            outcome.accepted = true;
            Ok(session.finish_transition(outcome, effects))
        })
    }

    /// Swipe that cannot become a swap (off the board): play the reject wiggle.
    pub fn reject_gesture(&mut self, at: Position) -> Result<TurnOutcome> {
        self.ensure_playable()?;
        self.locked(GamePhase::Idle, GamePhase::Idle, |session| {
            let mut effects = EffectQueue::new();
            effects.push(Effect::Wiggle { at });
            Ok(session.finish_transition(TurnOutcome::default(), effects))
        })
    }

    /// Whether a new drag may start: idle, unlocked, moves left.
    pub fn accepts_input(&self) -> bool {
        !self.busy && self.phase == GamePhase::Idle && self.moves_remaining > 0
    }

    /// Route a finished swipe. `Gesture::None` starts nothing and returns `None`.
    pub fn apply_gesture(&mut self, gesture: Gesture) -> Result<Option<TurnOutcome>> {
        match gesture {
            Gesture::None => Ok(None),
            Gesture::Swap(a, b) => self.propose_swap(a, b).map(Some),
            Gesture::Reject(at) => self.reject_gesture(at).map(Some),
        }
    }

    /// Host callback: every effect from the last transition has been played.
    /// Releases the lock, then persists or ends the game.
    pub fn finish_animations(&mut self) -> GamePhase {
        if self.busy {
            self.settle();
        }
        self.phase
    }

    /// One legal swap, if the board is idle.
    pub fn hint(&self) -> Option<SwapMove> {
        if self.busy || self.phase != GamePhase::Idle {
            return None;
        }
        MoveFinder::find_legal_move(&self.grid)
    }

    /// Back to the menu. Progress is saved when the game can still be continued.
    pub fn leave_game(&mut self) -> Result<()> {
        self.ensure_unlocked()?;
        if self.phase == GamePhase::Idle && self.moves_remaining > 0 {
            self.save();
        }
        self.phase = GamePhase::Menu;
        Ok(())
    }

    /// Submit the final score and return the refreshed top scores.
    /// The session returns to the menu and the save is cleared even if submission fails.
    pub fn submit_score(
        &mut self,
        name: &str,
        leaderboard: &mut dyn Leaderboard,
    ) -> Result<Vec<ScoreEntry>> {
        self.ensure_game_over()?;
        let limit = self.config.leaderboard_size;
        let score = self.score;
        self.locked(GamePhase::GameOver, GamePhase::Menu, |session| {
            let result = ScoreEntry::new(name, score).and_then(|entry| {
                log::info!("submitting score {} for {}", entry.score, entry.name);
                leaderboard.submit(&entry)?;
                leaderboard.top_scores(limit)
            });
            session.clear_save();
            session.phase = GamePhase::Menu;
            session.busy = false;
            result.map_err(|e| {
                log::warn!("score submission failed: {}", e);
                Error::from(e)
            })
        })
    }

    /// Leave the game-over screen without recording the score.
    pub fn skip_submission(&mut self) -> Result<()> {
        self.ensure_game_over()?;
        self.clear_save();
        self.phase = GamePhase::Menu;
        Ok(())
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.busy {
            return Err(Error::Busy);
        }
        Ok(())
    }

    fn ensure_playable(&self) -> Result<()> {
        self.ensure_unlocked()?;
        match self.phase {
            GamePhase::Idle => Ok(()),
            GamePhase::GameOver => Err(Error::GameOver),
            GamePhase::Menu => Err(Error::NotPlaying),
            GamePhase::SwapPending | GamePhase::Resolving | GamePhase::Reshuffling => Err(Error::Busy),
        }
    }

    fn ensure_game_over(&self) -> Result<()> {
        self.ensure_unlocked()?;
        if self.phase != GamePhase::GameOver {
            return Err(Error::GameInProgress);
        }
        Ok(())
    }

    /// Run `f` holding the lock. Any error releases the lock and falls back to `on_error`.
    fn locked<T>(
        &mut self,
        phase: GamePhase,
        on_error: GamePhase,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.busy = true;
        self.phase = phase;
        let result = f(self);
        if result.is_err() {
            self.busy = false;
            self.phase = on_error;
        }
        result
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            score: self.score,
            moves_remaining: self.moves_remaining,
            combo_count: self.combo_count,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.grid = snapshot.grid;
        self.score = snapshot.score;
        self.moves_remaining = snapshot.moves_remaining;
        self.combo_count = snapshot.combo_count;
    }

    fn start_fresh(&mut self) -> Result<()> {
        self.grid = self.config.generator().generate(&mut self.rng)?;
        self.score = 0;
        self.moves_remaining = self.config.initial_moves;
        self.combo_count = 0;
        log::info!("new game (seed {})", self.rng.seed());
        Ok(())
    }

    /// Resolve whatever the starting board holds: matches from a restored save,
    /// holes, or a deadlock.
    fn settle_initial_board(&mut self) -> Result<TurnOutcome> {
        let mut effects = EffectQueue::new();
        let mut outcome = self.resolve(false, &mut effects)?;
        if !effects.is_empty() {
            log::warn!("starting board needed {} resolution effects", effects.len());
        }
        outcome.accepted = true;
        Ok(self.finish_transition(outcome, effects))
    }

    /// Cascade, apply counters, reshuffle if deadlocked.
    fn resolve(&mut self, first_swap_of_turn: bool, effects: &mut EffectQueue) -> Result<TurnOutcome> {
        let cascade: CascadeOutcome = self.config.resolver().resolve(
            &mut self.grid,
            first_swap_of_turn,
            &mut self.rng,
        )?;

        effects.push_cascade(&cascade, self.score, self.moves_remaining);
        self.score += cascade.score_delta;
        self.moves_remaining += cascade.moves_delta;
        self.combo_count = cascade.max_combo;

        let mut outcome = TurnOutcome {
            score_delta: cascade.score_delta,
            moves_delta: cascade.moves_delta,
            combo: cascade.max_combo,
            hit_iteration_limit: cascade.hit_iteration_limit,
            ..TurnOutcome::default()
        };

        if cascade.requires_reshuffle {
            self.phase = GamePhase::Reshuffling;
            self.grid = self.config.generator().generate(&mut self.rng)?;
            log::info!("reshuffled deadlocked board");
            effects.push(Effect::Reshuffle);
            outcome.reshuffled = true;
        }
        Ok(outcome)
    }

    /// Attach effects; with nothing to play, settle straight away.
    fn finish_transition(&mut self, mut outcome: TurnOutcome, mut effects: EffectQueue) -> TurnOutcome {
        // Rejected swaps and wiggles leave the board as it was.
        self.dirty |= outcome.accepted;
        if self.moves_remaining <= 0 {
            effects.push(Effect::GameOver { score: self.score });
        }
        if effects.is_empty() {
            self.settle();
        }
        outcome.effects = effects.into_vec();
        outcome
    }

    fn settle(&mut self) {
        self.busy = false;
        if matches!(self.phase, GamePhase::Menu | GamePhase::GameOver) {
            return;
        }
        if self.moves_remaining <= 0 {
            log::info!("game over with score {}", self.score);
            self.phase = GamePhase::GameOver;
            self.clear_save();
        } else {
            self.phase = GamePhase::Idle;
            if self.dirty {
                self.save();
            }
        }
    }

    /// Best-effort; never while animating.
    fn save(&mut self) {
        if self.busy {
            return;
        }
        let saved = SavedGame::new(self.grid.clone(), self.score, self.moves_remaining);
        let result = serde_json::to_string(&saved)
            .map_err(Error::from)
            .and_then(|json| self.store.save(&json));
        match result {
            Ok(()) => self.dirty = false,
            Err(e) => log::error!("failed to save game: {}", e),
        }
    }

    fn clear_save(&mut self) {
        if let Err(e) = self.store.clear() {
            log::error!("failed to clear save: {}", e);
        }
    }
}

/// Grid and counters from before a turn, restored if the turn fails.
struct Snapshot {
    grid: Grid,
    score: u32,
    moves_remaining: i32,
    combo_count: u32,
}

#[cfg(not(target_arch = "wasm32"))]
fn entropy_rng() -> SessionRng {
    SessionRng::from_random()
}

#[cfg(target_arch = "wasm32")]
fn entropy_rng() -> SessionRng {
    SessionRng::new((js_sys::Math::random() * u64::MAX as f64) as u64)
}
