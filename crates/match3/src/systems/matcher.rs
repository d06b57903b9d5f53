use std::collections::BTreeSet;

use crate::components::{Position, TileType, MIN_MATCH_LEN};
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A run of at least three collinear same-typed tiles, in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub tile: TileType,
    pub axis: Axis,
    pub positions: Vec<Position>,
}

impl Match {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Scan every row left-to-right, then every column top-to-bottom.
/// Each maximal run of three or more becomes one match; scanning resumes after the run.
pub fn find_matches(grid: &Grid) -> Vec<Match> {
    let mut matches = Vec::new();

    for y in 0..grid.height() {
        scan_line(
            grid,
            (0..grid.width()).map(|x| Position::new(x, y)),
            Axis::Horizontal,
            &mut matches,
        );
    }
    for x in 0..grid.width() {
        scan_line(
            grid,
            (0..grid.height()).map(|y| Position::new(x, y)),
            Axis::Vertical,
            &mut matches,
        );
    }

    matches
}

fn scan_line(
    grid: &Grid,
    line: impl Iterator<Item = Position>,
    axis: Axis,
    out: &mut Vec<Match>,
) {
    let mut run: Vec<Position> = Vec::new();
    let mut run_tile: Option<TileType> = None;

    for pos in line {
        let cell = grid.get(pos);
        if cell.is_some() && cell == run_tile {
            run.push(pos);
            continue;
        }
        flush_run(run_tile, axis, &mut run, out);
        run_tile = cell;
        if cell.is_some() {
            run.push(pos);
        }
    }
    flush_run(run_tile, axis, &mut run, out);
}

fn flush_run(tile: Option<TileType>, axis: Axis, run: &mut Vec<Position>, out: &mut Vec<Match>) {
    if let Some(tile) = tile {
        if run.len() >= MIN_MATCH_LEN {
            out.push(Match {
                tile,
                axis,
                positions: std::mem::take(run),
            });
        }
    }
    run.clear();
}

/// Union of all matched positions, deduplicated (a cell can sit in a row and a column match).
pub fn unique_positions(matches: &[Match]) -> Vec<Position> {
    matches
        .iter()
        .flat_map(|m| m.positions.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// True when `pos` sits inside a horizontal or vertical run of three or more of its own type.
/// Only looks two cells out in each direction, which is enough for any run through `pos`.
pub fn has_run_through(grid: &Grid, pos: Position) -> bool {
    let Some(tile) = grid.get(pos) else {
        return false;
    };
    let same = |dx: isize, dy: isize| -> usize {
        let mut count = 0;
        for step in 1..MIN_MATCH_LEN as isize {
            let (Some(x), Some(y)) = (
                pos.x.checked_add_signed(dx * step),
                pos.y.checked_add_signed(dy * step),
            ) else {
                break;
            };
            if grid.get(Position::new(x, y)) != Some(tile) {
                break;
            }
            count += 1;
        }
        count
    };

    1 + same(-1, 0) + same(1, 0) >= MIN_MATCH_LEN || 1 + same(0, -1) + same(0, 1) >= MIN_MATCH_LEN
}
