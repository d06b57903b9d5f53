use crate::components::{Position, TileType};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::rng::SessionRng;
use crate::systems::matcher::find_matches;
use crate::systems::moves::MoveFinder;

/// Produces boards with no match present and at least one legal move.
#[derive(Debug, Clone, Copy)]
pub struct BoardGenerator {
    pub width: usize,
    pub height: usize,
    pub max_attempts: usize,
    pub max_placement_attempts: usize,
}

impl BoardGenerator {
    /// Fill whole boards until one passes both checks.
    /// Running out of attempts is an error; an invalid board is never returned.
    pub fn generate(&self, rng: &mut SessionRng) -> Result<Grid> {
        for attempt in 1..=self.max_attempts {
            let grid = self.fill(rng);
            if !find_matches(&grid).is_empty() {
                continue;
            }
            if !MoveFinder::has_any_legal_move(&grid) {
                continue;
            }
            log::debug!("generated board on attempt {}", attempt);
            return Ok(grid);
        }

        log::error!(
            "board generation failed after {} attempts ({}x{})",
            self.max_attempts,
            self.width,
            self.height
        );
        Err(Error::GenerationFailed {
            attempts: self.max_attempts,
        })
    }

    /// Raster fill. Re-rolls a cell while it would extend two equal tiles to its
    /// left or above into a run of three; after the re-roll budget the last roll stands.
    fn fill(&self, rng: &mut SessionRng) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        for pos in (0..self.height).flat_map(|y| (0..self.width).map(move |x| Position::new(x, y))) {
            let mut tile = rng.random_tile();
            let mut rolls = 1;
            while rolls < self.max_placement_attempts && Self::extends_streak(&grid, pos, tile) {
                tile = rng.random_tile();
                rolls += 1;
            }
            grid.set(pos, Some(tile));
        }
        grid
    }

    fn extends_streak(grid: &Grid, pos: Position, tile: TileType) -> bool {
        let left = pos.x >= 2
            && grid.get(Position::new(pos.x - 1, pos.y)) == Some(tile)
            && grid.get(Position::new(pos.x - 2, pos.y)) == Some(tile);
        let above = pos.y >= 2
            && grid.get(Position::new(pos.x, pos.y - 1)) == Some(tile)
            && grid.get(Position::new(pos.x, pos.y - 2)) == Some(tile);
        left || above
    }
}
