//! Search for a wall-free column the relocated snake can emerge into.

use std::collections::BTreeSet;

use portal_snake_core::{Cell, GridBounds, RandomSource, WallSet};

/// Maximum number of random anchors tried before falling back to the center.
pub const SAFE_AREA_ATTEMPTS: usize = 500;

/// Reserved region for the relocated body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafeArea {
    /// Cell hosting the exit portal; the body emerges upward from it.
    pub anchor: Cell,
    /// Cells the next layout must keep free.
    pub reserved: BTreeSet<Cell>,
    /// Indicates whether the random search failed and the center was used.
    pub fallback: bool,
}

/// Finds an anchor whose upward run of `length` cells, padded by a one-cell
/// ring, holds no wall.
///
/// When every attempt fails the anchor falls back to the interior center and
/// reserves the padded run clipped to the interior. Runs taller than the
/// interior cannot be fully reserved in that case.
pub fn search<R>(rng: &mut R, bounds: GridBounds, walls: &WallSet, length: usize) -> SafeArea
where
    R: RandomSource + ?Sized,
{
    let length = length.max(1);
    for _ in 0..SAFE_AREA_ATTEMPTS {
        let anchor = Cell::new(
            rng.range_inclusive(bounds.min_x() + 1, bounds.max_x() - 1),
            rng.range_inclusive(bounds.min_y() + 1, bounds.max_y() - 1),
        );
        let reserved = padded_run(anchor, length);
        let clear = run(anchor, length).all(|cell| bounds.interior_contains(cell))
            && reserved
                .iter()
                .all(|cell| bounds.contains(*cell) && !walls.contains(*cell));
        if clear {
            return SafeArea {
                anchor,
                reserved,
                fallback: false,
            };
        }
    }

    let anchor = bounds.center();
    let reserved = padded_run(anchor, length)
        .into_iter()
        .filter(|cell| bounds.interior_contains(*cell))
        .collect();
    SafeArea {
        anchor,
        reserved,
        fallback: true,
    }
}

fn run(anchor: Cell, length: usize) -> impl Iterator<Item = Cell> {
    (0..length).map(move |step| anchor.offset(0, -(step as i32)))
}

fn padded_run(anchor: Cell, length: usize) -> BTreeSet<Cell> {
    let mut reserved = BTreeSet::new();
    for cell in run(anchor, length) {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let _ = reserved.insert(cell.offset(dx, dy));
            }
        }
    }
    reserved
}
