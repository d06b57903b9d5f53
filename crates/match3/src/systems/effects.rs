use serde::Serialize;

use crate::components::{Position, COMBO_POPUP_MIN};
use crate::systems::board::{TileDrop, TileRefill};
use crate::systems::cascade::CascadeOutcome;

/// A declarative request for the host renderer. Each one is a suspension point:
/// the host plays it to completion before starting the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    Swap { a: Position, b: Position },
    /// Rejected swap: animate the pair back to where they started.
    SwapBack { a: Position, b: Position },
    Wiggle { at: Position },
    Disappear { positions: Vec<Position> },
    Drop { drops: Vec<TileDrop> },
    Appear { tiles: Vec<TileRefill> },
    Combo { count: u32 },
    ScoreChanged { score: u32 },
    MovesChanged { moves: i32 },
    /// Whole board replaced; the host redraws from the grid.
    Reshuffle,
    /// Moves ran out; the host should ask for a name to submit.
    GameOver { score: u32 },
}

/// Ordered effect list for one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectQueue {
    effects: Vec<Effect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Expand a cascade into per-step effects. `score` and `moves` are the
    /// counters before the cascade was applied, so the host sees running totals.
    pub fn push_cascade(&mut self, outcome: &CascadeOutcome, mut score: u32, mut moves: i32) {
        for step in &outcome.steps {
            if !step.cleared.is_empty() {
                score += step.score_gained;
                self.push(Effect::ScoreChanged { score });
                if step.moves_gained > 0 {
                    moves += step.moves_gained;
                    self.push(Effect::MovesChanged { moves });
                }
                if step.combo >= COMBO_POPUP_MIN {
                    self.push(Effect::Combo { count: step.combo });
                }
                self.push(Effect::Disappear {
                    positions: step.cleared.clone(),
                });
            }
            if !step.drops.is_empty() {
                self.push(Effect::Drop {
                    drops: step.drops.clone(),
                });
            }
            if !step.refills.is_empty() {
                self.push(Effect::Appear {
                    tiles: step.refills.clone(),
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn into_vec(self) -> Vec<Effect> {
        self.effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::TileType;
    use crate::systems::cascade::CascadeStep;

    fn step(cleared: usize, combo: u32, moves_gained: i32) -> CascadeStep {
        CascadeStep {
            cleared: (0..cleared).map(|x| Position::new(x, 0)).collect(),
            combo,
            score_gained: cleared as u32 * 10,
            moves_gained,
            drops: vec![TileDrop { x: 0, from_y: 0, to_y: 1, distance: 1 }],
            refills: vec![TileRefill {
                pos: Position::new(0, 0),
                tile: TileType::Marin,
            }],
            ..CascadeStep::default()
        }
    }

    #[test]
    fn cascade_expands_in_play_order() {
        let outcome = CascadeOutcome {
            steps: vec![step(3, 1, 0), step(4, 3, 1)],
            ..CascadeOutcome::default()
        };
        let mut queue = EffectQueue::new();
        queue.push_cascade(&outcome, 100, 5);
        let effects = queue.into_vec();

        assert_eq!(effects[0], Effect::ScoreChanged { score: 130 });
        assert!(matches!(effects[1], Effect::Disappear { .. }));
        assert!(matches!(effects[2], Effect::Drop { .. }));
        assert!(matches!(effects[3], Effect::Appear { .. }));
        assert_eq!(effects[4], Effect::ScoreChanged { score: 170 });
        assert_eq!(effects[5], Effect::MovesChanged { moves: 6 });
        assert_eq!(effects[6], Effect::Combo { count: 3 });
        assert_eq!(effects.len(), 10);
    }

    #[test]
    fn effects_serialize_with_kind_tag() {
        let json = serde_json::to_string(&Effect::Wiggle {
            at: Position::new(1, 2),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"wiggle","at":{"x":1,"y":2}}"#);
    }
}
