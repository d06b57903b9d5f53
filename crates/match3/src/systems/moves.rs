use crate::components::Position;
use crate::grid::Grid;
use crate::systems::matcher::has_run_through;

/// A legal swap: exchanging `a` and `b` creates at least one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapMove {
    pub a: Position,
    pub b: Position,
}

/// Searches for swaps that would produce a match. Used for deadlock detection,
/// generator validation and player hints.
pub struct MoveFinder;

impl MoveFinder {
    /// True if at least one adjacent swap creates a match.
    pub fn has_any_legal_move(grid: &Grid) -> bool {
        Self::find_legal_move(grid).is_some()
    }

    /// First legal swap in raster order, trying the right neighbour before the one below.
    pub fn find_legal_move(grid: &Grid) -> Option<SwapMove> {
        // Swap and restore on a scratch copy; the caller's grid is never touched.
        let mut sim = grid.clone();

        for a in grid.positions() {
            let neighbours = [Position::new(a.x + 1, a.y), Position::new(a.x, a.y + 1)];
            for b in neighbours {
                if !sim.in_bounds(b) || sim.get(a).is_none() || sim.get(b).is_none() {
                    continue;
                }
                if sim.get(a) == sim.get(b) {
                    continue;
                }

                sim.swap(a, b);
                let creates = has_run_through(&sim, a) || has_run_through(&sim, b);
                sim.swap(a, b);

                if creates {
                    return Some(SwapMove { a, b });
                }
            }
        }

        None
    }
}
