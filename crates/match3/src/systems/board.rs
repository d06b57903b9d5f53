use serde::Serialize;

use crate::components::{Position, TileType};
use crate::grid::Grid;
use crate::rng::SessionRng;

/// One surviving tile sliding down its column after a clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileDrop {
    pub x: usize,
    pub from_y: usize,
    pub to_y: usize,
    pub distance: usize,
}

/// A fresh tile introduced into a cell left empty by the drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileRefill {
    pub pos: Position,
    pub tile: TileType,
}

/// Empty every listed cell.
pub fn clear_positions(grid: &mut Grid, positions: &[Position]) {
    for &pos in positions {
        grid.set(pos, None);
    }
}

/// Compute the gravity drops without touching the grid.
///
/// Per column, bottom-up: every tile moves down by the number of empty cells below it.
/// Relative order within a column is preserved.
pub fn plan_drops(grid: &Grid) -> Vec<TileDrop> {
    let mut drops = Vec::new();
    for x in 0..grid.width() {
        let mut empty_below = 0;
        for y in (0..grid.height()).rev() {
            if grid.get(Position::new(x, y)).is_none() {
                empty_below += 1;
            } else if empty_below > 0 {
                drops.push(TileDrop {
                    x,
                    from_y: y,
                    to_y: y + empty_below,
                    distance: empty_below,
                });
            }
        }
    }
    drops
}

/// Apply a drop plan from [`plan_drops`]. Drops are ordered bottom-up per column,
/// so no tile lands on a cell that still has to move.
pub fn apply_drops(grid: &mut Grid, drops: &[TileDrop]) {
    for drop in drops {
        grid.copy_within_column(drop.x, drop.from_y, drop.to_y);
        grid.set(Position::new(drop.x, drop.from_y), None);
    }
}

/// Fill every empty cell with a random tile, each column bottom-up.
/// After [`apply_drops`] the empties are always at the top of their column.
pub fn refill(grid: &mut Grid, rng: &mut SessionRng) -> Vec<TileRefill> {
    let mut refills = Vec::new();
    for x in 0..grid.width() {
        for y in (0..grid.height()).rev() {
            let pos = Position::new(x, y);
            if grid.get(pos).is_none() {
                let tile = rng.random_tile();
                grid.set(pos, Some(tile));
                refills.push(TileRefill { pos, tile });
            }
        }
    }
    refills
}
