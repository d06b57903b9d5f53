use crate::components::{Position, COMBO_BONUS_THRESHOLDS, POINTS_PER_TILE};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::rng::SessionRng;
use crate::systems::board::{apply_drops, clear_positions, plan_drops, refill, TileDrop, TileRefill};
use crate::systems::matcher::{find_matches, unique_positions, Match};
use crate::systems::moves::MoveFinder;

/// Resolution phases. `Clearing` carries the matches found by the preceding scan.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CascadePhase {
    Scanning,
    Clearing(Vec<Match>),
    Dropping,
    Refilling,
    Stable,
}

/// Everything that happened in one clear → drop → refill round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeStep {
    pub matches: Vec<Match>,
    pub cleared: Vec<Position>,
    pub combo: u32,
    pub score_gained: u32,
    pub moves_gained: i32,
    pub drops: Vec<TileDrop>,
    pub refills: Vec<TileRefill>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub steps: Vec<CascadeStep>,
    pub score_delta: u32,
    pub moves_delta: i32,
    pub max_combo: u32,
    /// The settled board has no legal swap; the caller must reshuffle.
    pub requires_reshuffle: bool,
    /// Resolution stopped at the iteration bound with matches still on the board.
    pub hit_iteration_limit: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CascadeResolver {
    pub width: usize,
    pub height: usize,
    pub max_iterations: usize,
}

impl CascadeResolver {
    /// Clear, drop and refill until no match remains or the iteration bound is hit.
    ///
    /// `first_swap_of_turn` enables the initial-clear bonus (+1 move for a 4-cell
    /// first clear, +2 for 5 or more). Combo bonuses apply regardless.
    /// Never reshuffles; see [`CascadeOutcome::requires_reshuffle`].
    pub fn resolve(
        &self,
        grid: &mut Grid,
        first_swap_of_turn: bool,
        rng: &mut SessionRng,
    ) -> Result<CascadeOutcome> {
        if !grid.has_dimensions(self.width, self.height) {
            return Err(Error::InvalidDimensions {
                expected: (self.width, self.height),
                found: (grid.width(), grid.height()),
            });
        }

        let mut outcome = CascadeOutcome::default();
        let mut combo: u32 = 0;
        let mut iterations = 0;
        let mut step = CascadeStep::default();
        let mut phase = CascadePhase::Scanning;

        loop {
            phase = match phase {
                CascadePhase::Scanning => {
                    let matches = find_matches(grid);
                    if matches.is_empty() {
                        // Holes left by a partial save still have to settle.
                        if grid.is_full() {
                            CascadePhase::Stable
                        } else {
                            CascadePhase::Dropping
                        }
                    } else if iterations >= self.max_iterations {
                        log::warn!(
                            "cascade stopped at {} iterations with {} matches left",
                            iterations,
                            matches.len()
                        );
                        outcome.hit_iteration_limit = true;
                        CascadePhase::Stable
                    } else {
                        CascadePhase::Clearing(matches)
                    }
                }
                CascadePhase::Clearing(matches) => {
                    iterations += 1;
                    let cleared = unique_positions(&matches);
                    let previous_combo = combo;
                    combo += matches.len() as u32;

                    let mut moves_gained = 0;
                    if first_swap_of_turn && iterations == 1 {
                        moves_gained += match cleared.len() {
                            4 => 1,
                            n if n >= 5 => 2,
                            _ => 0,
                        };
                    }
                    for threshold in COMBO_BONUS_THRESHOLDS {
                        if previous_combo < threshold && combo >= threshold {
                            moves_gained += 1;
                        }
                    }

                    let score_gained = cleared.len() as u32 * POINTS_PER_TILE;
                    log::debug!(
                        "cascade step {}: {} groups, {} cells, combo {}, +{} points, +{} moves",
                        iterations,
                        matches.len(),
                        cleared.len(),
                        combo,
                        score_gained,
                        moves_gained
                    );

                    clear_positions(grid, &cleared);
                    outcome.score_delta += score_gained;
                    outcome.moves_delta += moves_gained;
                    step = CascadeStep {
                        matches,
                        cleared,
                        combo,
                        score_gained,
                        moves_gained,
                        ..CascadeStep::default()
                    };
                    CascadePhase::Dropping
                }
                CascadePhase::Dropping => {
                    step.drops = plan_drops(grid);
                    apply_drops(grid, &step.drops);
                    CascadePhase::Refilling
                }
                CascadePhase::Refilling => {
                    step.refills = refill(grid, rng);
                    outcome.steps.push(std::mem::take(&mut step));
                    CascadePhase::Scanning
                }
                CascadePhase::Stable => break,
            };
        }

        outcome.max_combo = combo;
        outcome.requires_reshuffle = !MoveFinder::has_any_legal_move(grid);
        if outcome.requires_reshuffle {
            log::info!("board settled with no legal moves");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::grid_from_str;

    fn resolver_for(grid: &Grid) -> CascadeResolver {
        CascadeResolver {
            width: grid.width(),
            height: grid.height(),
            max_iterations: 20,
        }
    }

    /// Refills are random, so most assertions stick to the first step.
    fn first_step(grid: &mut Grid, first_swap: bool, seed: u64) -> (CascadeOutcome, CascadeStep) {
        let mut rng = SessionRng::new(seed);
        let outcome = resolver_for(grid).resolve(grid, first_swap, &mut rng).unwrap();
        let step = outcome.steps[0].clone();
        (outcome, step)
    }

    #[test]
    fn single_group_of_three_scores_thirty() {
        let mut grid = grid_from_str(&[
            "aaab", //
            "bcdc", //
            "cdbd", //
        ]);
        let (_, step) = first_step(&mut grid, true, 1);
        assert_eq!(step.cleared.len(), 3);
        assert_eq!(step.score_gained, 30);
        assert_eq!(step.combo, 1);
        assert_eq!(step.moves_gained, 0);
    }

    #[test]
    fn two_disjoint_groups_score_seventy_and_combo_two() {
        let mut grid = grid_from_str(&[
            "aaabcd", //
            "cdbcdb", //
            "bbbbcd", //
            "dcdcbc", //
        ]);
        let (_, step) = first_step(&mut grid, false, 2);
        assert_eq!(step.matches.len(), 2);
        assert_eq!(step.cleared.len(), 7);
        assert_eq!(step.score_gained, 70);
        assert_eq!(step.combo, 2);
    }

    #[test]
    fn four_cell_first_clear_awards_one_move() {
        let mut grid = grid_from_str(&[
            "aaaab", //
            "bcdcd", //
            "cdbdc", //
        ]);
        let (_, step) = first_step(&mut grid, true, 3);
        assert_eq!(step.cleared.len(), 4);
        assert_eq!(step.moves_gained, 1);
    }

    #[test]
    fn five_cell_first_clear_awards_two_moves() {
        let mut grid = grid_from_str(&[
            "aaaaab", //
            "bcdcdc", //
            "cdbdcd", //
        ]);
        let (outcome, step) = first_step(&mut grid, true, 4);
        assert_eq!(step.cleared.len(), 5);
        assert_eq!(step.moves_gained, 2);
        assert!(outcome.moves_delta >= 2);
    }

    #[test]
    fn initial_clear_bonus_needs_first_swap() {
        let mut grid = grid_from_str(&[
            "aaaaab", //
            "bcdcdc", //
            "cdbdcd", //
        ]);
        let (_, step) = first_step(&mut grid, false, 4);
        assert_eq!(step.moves_gained, 0);
    }

    #[test]
    fn three_groups_in_one_pass_award_combo_move() {
        let mut grid = grid_from_str(&[
            "aaabcd", //
            "cdbcdb", //
            "bbbcdc", //
            "dcdbcb", //
            "cccdbd", //
        ]);
        let (_, step) = first_step(&mut grid, false, 5);
        assert_eq!(step.matches.len(), 3);
        assert_eq!(step.combo, 3);
        assert_eq!(step.moves_gained, 1);
    }

    #[test]
    fn combo_thresholds_fire_once_each() {
        let mut grid = grid_from_str(&[
            "aaabcd", //
            "cdbcdb", //
            "bbbcdc", //
            "dcdbcb", //
            "cccdbd", //
            "bdbcfc", //
            "dddbcb", //
            "cbceee", //
        ]);
        let (outcome, step) = first_step(&mut grid, false, 6);
        assert_eq!(step.matches.len(), 5);
        // Crossing 3 and 5 in the same pass awards both.
        assert_eq!(step.moves_gained, 2);
        assert_eq!(outcome.moves_delta, outcome.steps.iter().map(|s| s.moves_gained).sum::<i32>());
        let total_bonus_moves: i32 = outcome.steps.iter().skip(1).map(|s| s.moves_gained).sum();
        assert_eq!(total_bonus_moves, 0, "thresholds already crossed cannot fire again");
    }

    #[test]
    fn resolution_terminates_without_matches() {
        for seed in 0..30 {
            let mut grid = grid_from_str(&[
                "aaabcdef", //
                "bbbcdefa", //
                "cccdefab", //
                "dddefabc", //
                "eeefabcd", //
                "fffabcde", //
                "aaabcdef", //
                "bbbcdefa", //
            ]);
            let mut rng = SessionRng::new(seed);
            let outcome = resolver_for(&grid).resolve(&mut grid, false, &mut rng).unwrap();
            assert!(grid.is_full());
            if !outcome.hit_iteration_limit {
                assert!(find_matches(&grid).is_empty());
            }
            assert_eq!(
                outcome.score_delta,
                outcome.steps.iter().map(|s| s.score_gained).sum::<u32>()
            );
            assert_eq!(outcome.max_combo, outcome.steps.last().unwrap().combo);
        }
    }

    #[test]
    fn iteration_bound_is_reported() {
        let mut grid = grid_from_str(&[
            "aaab", //
            "bcdc", //
            "cdbd", //
        ]);
        let resolver = CascadeResolver {
            width: 4,
            height: 3,
            max_iterations: 0,
        };
        let outcome = resolver.resolve(&mut grid, true, &mut SessionRng::new(1)).unwrap();
        assert!(outcome.hit_iteration_limit);
        assert!(outcome.steps.is_empty());
        assert!(!find_matches(&grid).is_empty());
    }

    #[test]
    fn stable_board_is_untouched() {
        let mut grid = grid_from_str(&[
            "aabc", //
            "cdab", //
            "bcdc", //
        ]);
        let before = grid.clone();
        let outcome = resolver_for(&grid).resolve(&mut grid, true, &mut SessionRng::new(1)).unwrap();
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.score_delta, 0);
        assert_eq!(grid, before);
        assert!(!outcome.requires_reshuffle);
    }

    #[test]
    fn deadlocked_result_requests_reshuffle() {
        let mut grid = grid_from_str(&[
            "abcabc", //
            "cabcab", //
            "bcabca", //
            "abcabc", //
        ]);
        let outcome = resolver_for(&grid).resolve(&mut grid, false, &mut SessionRng::new(1)).unwrap();
        assert!(outcome.steps.is_empty());
        assert!(outcome.requires_reshuffle);
    }

    #[test]
    fn holes_settle_even_without_matches() {
        let mut grid = grid_from_str(&[
            "a.ab", //
            "baba", //
            "abab", //
        ]);
        let outcome = resolver_for(&grid).resolve(&mut grid, false, &mut SessionRng::new(8)).unwrap();
        assert!(grid.is_full());
        assert_eq!(outcome.steps[0].refills.len(), 1);
        assert_eq!(outcome.steps[0].score_gained, 0);
    }

    #[test]
    fn wrong_dimensions_are_rejected() {
        let mut grid = grid_from_str(&["abc", "bca"]);
        let resolver = CascadeResolver {
            width: 8,
            height: 8,
            max_iterations: 20,
        };
        let err = resolver.resolve(&mut grid, false, &mut SessionRng::new(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { expected: (8, 8), found: (3, 2) }));
    }

    #[test]
    fn combo_threshold_crossed_by_a_later_step() {
        // Two groups clear first; the drop then lines up three `e` along the bottom row.
        let mut grid = grid_from_str(&[
            "abae", //
            "fdfc", //
            "feec", //
            "bbbc", //
        ]);
        let outcome = resolver_for(&grid).resolve(&mut grid, false, &mut SessionRng::new(3)).unwrap();

        assert_eq!(outcome.steps[0].combo, 2);
        assert_eq!(outcome.steps[0].moves_gained, 0);

        let second = &outcome.steps[1];
        for x in 1..4 {
            assert!(second.cleared.contains(&Position::new(x, 3)));
        }
        assert!(second.combo >= 3);
        assert!(second.moves_gained >= 1);
        assert!(outcome.moves_delta >= 1);
    }
}
