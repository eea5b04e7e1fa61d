#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural barrier generation for Portal Snake maps.
//!
//! Every map keeps a fixed rectangular border. Inside it the generator draws a
//! handful of gapped lines (horizontal, vertical or diagonal) and a few single
//! pillars, then measures how much of the interior is still reachable from its
//! center. Layouts that leave at least 70% of the interior connected are
//! accepted immediately; otherwise the best of a bounded number of attempts is
//! committed. Generation never fails: degenerate grids yield the border alone.

mod occupancy;

use std::collections::VecDeque;

use portal_snake_core::{Cell, GridBounds, RandomSource, WallSet};
use tracing::debug;

use self::occupancy::Occupancy;

/// Maximum number of candidate layouts sampled per generation call.
pub const GENERATION_ATTEMPTS: usize = 20;

/// Reachable share of the interior, in percent, that accepts a layout outright.
pub const REACHABILITY_TARGET_PERCENT: usize = 70;

const MIN_LINES: i32 = 2;
const MAX_LINES: i32 = 4;
const MIN_PILLARS: i32 = 2;
const MAX_PILLARS: i32 = 5;
const PILLAR_PLACEMENT_ATTEMPTS: usize = 32;

/// Perpendicular distance straight lines keep from existing walls.
const STRAIGHT_LINE_CLEARANCE: i32 = 2;
const GAP_WIDTH: i32 = 2;
const EXTRA_GAPS: i32 = 2;

/// Generates a wall layout for a `grid_width × grid_height` grid.
///
/// The border is inset by one cell (see [`GridBounds::for_grid`]) and no
/// interior wall is placed on a `forbidden` cell.
pub fn generate<R, I>(rng: &mut R, grid_width: u32, grid_height: u32, forbidden: I) -> WallSet
where
    R: RandomSource + ?Sized,
    I: IntoIterator<Item = Cell>,
{
    MazeGenerator::new(GridBounds::for_grid(grid_width, grid_height)).generate(rng, forbidden)
}

/// Outcome of a single generation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    /// Committed wall layout, border included.
    pub walls: WallSet,
    /// Interior cells reachable from the center in the committed layout.
    pub reachable: usize,
    /// Total number of interior cells.
    pub interior_cells: usize,
    /// Reachable cell counts of every sampled attempt, in order.
    pub samples: Vec<usize>,
    /// Indicates whether an attempt met the reachability target.
    pub accepted: bool,
}

/// Randomized barrier generator bound to a fixed border rectangle.
#[derive(Clone, Copy, Debug)]
pub struct MazeGenerator {
    bounds: GridBounds,
}

impl MazeGenerator {
    /// Creates a generator for the provided border bounds.
    #[must_use]
    pub const fn new(bounds: GridBounds) -> Self {
        Self { bounds }
    }

    /// Border bounds the generator draws inside.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Generates a wall layout keeping every `forbidden` interior cell free.
    pub fn generate<R, I>(&self, rng: &mut R, forbidden: I) -> WallSet
    where
        R: RandomSource + ?Sized,
        I: IntoIterator<Item = Cell>,
    {
        self.generate_detailed(rng, forbidden).walls
    }

    /// Generates a wall layout and reports how it was selected.
    pub fn generate_detailed<R, I>(&self, rng: &mut R, forbidden: I) -> Generation
    where
        R: RandomSource + ?Sized,
        I: IntoIterator<Item = Cell>,
    {
        let border = WallSet::border(self.bounds);
        let interior_cells = self.bounds.interior_cell_count();

        if self.bounds.is_degenerate() || interior_cells == 0 {
            return Generation {
                walls: border,
                reachable: 0,
                interior_cells,
                samples: Vec::new(),
                accepted: false,
            };
        }

        let mut base = Occupancy::new(self.bounds);
        for cell in border.iter() {
            base.set_wall(cell);
        }
        for cell in forbidden {
            if self.bounds.interior_contains(cell) {
                base.forbid(cell);
            }
        }

        let mut samples = Vec::with_capacity(GENERATION_ATTEMPTS);
        let mut best: Option<(usize, Occupancy)> = None;

        for _ in 0..GENERATION_ATTEMPTS {
            let mut candidate = base.clone();
            self.draw_lines(rng, &mut candidate);
            self.scatter_pillars(rng, &mut candidate);

            let reachable = reachable_from_center(self.bounds, |cell| candidate.is_blocked(cell));
            samples.push(reachable);

            if meets_target(reachable, interior_cells) {
                return Generation {
                    walls: candidate.walls(),
                    reachable,
                    interior_cells,
                    samples,
                    accepted: true,
                };
            }

            if best.as_ref().map_or(true, |(count, _)| reachable > *count) {
                best = Some((reachable, candidate));
            }
        }

        match best {
            Some((reachable, candidate)) if reachable > 0 => {
                debug!(
                    reachable,
                    interior_cells, "no layout met the reachability target, keeping best attempt"
                );
                Generation {
                    walls: candidate.walls(),
                    reachable,
                    interior_cells,
                    samples,
                    accepted: false,
                }
            }
            _ => {
                debug!(interior_cells, "no attempt reached any cell, keeping border only");
                Generation {
                    walls: border,
                    reachable: 0,
                    interior_cells,
                    samples,
                    accepted: false,
                }
            }
        }
    }

    fn draw_lines<R>(&self, rng: &mut R, occupancy: &mut Occupancy)
    where
        R: RandomSource + ?Sized,
    {
        let count = rng.range_inclusive(MIN_LINES, MAX_LINES);
        for _ in 0..count {
            match LineKind::sample(rng) {
                LineKind::Horizontal => self.draw_straight(rng, occupancy, Axis::Horizontal),
                LineKind::Vertical => self.draw_straight(rng, occupancy, Axis::Vertical),
                LineKind::Diagonal => self.draw_diagonal(rng, occupancy),
            }
        }
    }

    fn draw_straight<R>(&self, rng: &mut R, occupancy: &mut Occupancy, axis: Axis)
    where
        R: RandomSource + ?Sized,
    {
        let b = self.bounds;
        let (span_start, span_end, across_start, across_end) = match axis {
            Axis::Horizontal => (b.min_x() + 1, b.max_x() - 1, b.min_y() + 1, b.max_y() - 1),
            Axis::Vertical => (b.min_y() + 1, b.max_y() - 1, b.min_x() + 1, b.max_x() - 1),
        };

        // Lines closer than the clearance to the border could never place a cell.
        let low = across_start + STRAIGHT_LINE_CLEARANCE;
        let high = across_end - STRAIGHT_LINE_CLEARANCE;
        if low > high {
            return;
        }
        let across = rng.range_inclusive(low, high);

        let length = span_end - span_start + 1;
        let gaps = gap_mask(rng, length, (length / 10).max(2));

        for (offset, open) in gaps.iter().enumerate() {
            if *open {
                continue;
            }
            let along = span_start + offset as i32;
            let cell = match axis {
                Axis::Horizontal => Cell::new(along, across),
                Axis::Vertical => Cell::new(across, along),
            };
            if occupancy.is_blocked(cell) || !has_clearance(occupancy, cell, axis) {
                continue;
            }
            occupancy.set_wall(cell);
        }
    }

    fn draw_diagonal<R>(&self, rng: &mut R, occupancy: &mut Occupancy)
    where
        R: RandomSource + ?Sized,
    {
        let b = self.bounds;
        let width = b.interior_width() as i32;
        let height = b.interior_height() as i32;
        let length = width.min(height);
        if length <= 0 {
            return;
        }

        let falling_left = rng.unit() < 0.5;
        let (x_low, x_high) = if falling_left {
            (b.min_x() + length, b.max_x() - 1)
        } else {
            (b.min_x() + 1, b.max_x() - length)
        };
        let start_x = rng.range_inclusive(x_low, x_high);
        let start_y = rng.range_inclusive(b.min_y() + 1, b.max_y() - length);
        let step_x = if falling_left { -1 } else { 1 };

        let gaps = gap_mask(rng, length, (length / 8).max(1));
        for (offset, open) in gaps.iter().enumerate() {
            if *open {
                continue;
            }
            let offset = offset as i32;
            let cell = Cell::new(start_x + step_x * offset, start_y + offset);
            if occupancy.is_blocked(cell) {
                continue;
            }
            occupancy.set_wall(cell);
        }
    }

    fn scatter_pillars<R>(&self, rng: &mut R, occupancy: &mut Occupancy)
    where
        R: RandomSource + ?Sized,
    {
        let b = self.bounds;
        let count = rng.range_inclusive(MIN_PILLARS, MAX_PILLARS);
        for _ in 0..count {
            for _ in 0..PILLAR_PLACEMENT_ATTEMPTS {
                let cell = Cell::new(
                    rng.range_inclusive(b.min_x() + 1, b.max_x() - 1),
                    rng.range_inclusive(b.min_y() + 1, b.max_y() - 1),
                );
                if occupancy.is_blocked(cell) || completes_square(occupancy, cell) {
                    continue;
                }
                occupancy.set_wall(cell);
                break;
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind {
    Horizontal,
    Vertical,
    Diagonal,
}

impl LineKind {
    fn sample<R>(rng: &mut R) -> Self
    where
        R: RandomSource + ?Sized,
    {
        match rng.range_inclusive(0, 2) {
            0 => Self::Horizontal,
            1 => Self::Vertical,
            _ => Self::Diagonal,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Marks randomly placed openings along a line of `length` cells.
///
/// Openings never touch, so every requested gap stays a separate run. When
/// the line is too short to hold them all, as many as fit are opened.
fn gap_mask<R>(rng: &mut R, length: i32, min_gaps: i32) -> Vec<bool>
where
    R: RandomSource + ?Sized,
{
    let length_usize = usize::try_from(length).unwrap_or(0);
    let mut open = vec![false; length_usize];
    if length_usize == 0 {
        return open;
    }

    let requested = rng.range_inclusive(min_gaps, min_gaps + EXTRA_GAPS);
    let fitting = (length + 1) / (GAP_WIDTH + 1);
    let gaps = requested.min(fitting).max(1);
    let width = GAP_WIDTH.min(length);

    // Closed cells beyond the single separator between neighbouring gaps are
    // spread over the slots before, between and after the gaps.
    let spare = (length - gaps * width - (gaps - 1)).max(0);
    let mut padding = vec![0; gaps as usize + 1];
    for _ in 0..spare {
        padding[rng.range_inclusive(0, gaps) as usize] += 1;
    }

    let mut cursor = 0;
    for (index, pad) in padding.iter().take(gaps as usize).enumerate() {
        cursor += pad + i32::from(index > 0);
        for offset in cursor..cursor + width {
            open[offset as usize] = true;
        }
        cursor += width;
    }
    open
}

fn has_clearance(occupancy: &Occupancy, cell: Cell, axis: Axis) -> bool {
    (1..=STRAIGHT_LINE_CLEARANCE).all(|distance| {
        let (first, second) = match axis {
            Axis::Horizontal => (cell.offset(0, -distance), cell.offset(0, distance)),
            Axis::Vertical => (cell.offset(-distance, 0), cell.offset(distance, 0)),
        };
        !occupancy.is_wall(first) && !occupancy.is_wall(second)
    })
}

/// Reports whether walling `cell` would complete a 2×2 block of walls.
fn completes_square(occupancy: &Occupancy, cell: Cell) -> bool {
    [(-1, -1), (0, -1), (-1, 0), (0, 0)].iter().any(|(dx, dy)| {
        let corner = cell.offset(*dx, *dy);
        [(0, 0), (1, 0), (0, 1), (1, 1)]
            .iter()
            .map(|(ox, oy)| corner.offset(*ox, *oy))
            .filter(|member| *member != cell)
            .all(|member| occupancy.is_wall(member))
    })
}

fn meets_target(reachable: usize, interior_cells: usize) -> bool {
    reachable * 100 >= interior_cells * REACHABILITY_TARGET_PERCENT
}

/// Counts the interior cells reachable from the interior's center.
///
/// The search moves in four directions and never enters a cell for which
/// `is_blocked` returns `true`. When the center itself is blocked the search
/// starts from the nearest open interior cell (Manhattan distance, ties broken
/// in row-major order). Returns zero when every interior cell is blocked.
pub fn reachable_from_center<F>(bounds: GridBounds, mut is_blocked: F) -> usize
where
    F: FnMut(Cell) -> bool,
{
    let center = bounds.center();
    let Some(seed) = bounds
        .interior_cells()
        .filter(|cell| !is_blocked(*cell))
        .min_by_key(|cell| (cell.manhattan_distance(center), *cell))
    else {
        return 0;
    };

    let width = bounds.interior_width() as usize;
    let mut visited = vec![false; bounds.interior_cell_count()];
    let index = |cell: Cell| -> usize {
        let column = (cell.x() - bounds.min_x() - 1) as usize;
        let row = (cell.y() - bounds.min_y() - 1) as usize;
        row * width + column
    };

    let mut queue = VecDeque::new();
    visited[index(seed)] = true;
    queue.push_back(seed);
    let mut reached = 0;

    while let Some(cell) = queue.pop_front() {
        reached += 1;
        for neighbor in neighbors(cell) {
            if !bounds.interior_contains(neighbor) || is_blocked(neighbor) {
                continue;
            }
            let slot = index(neighbor);
            if visited[slot] {
                continue;
            }
            visited[slot] = true;
            queue.push_back(neighbor);
        }
    }

    reached
}

fn neighbors(cell: Cell) -> [Cell; 4] {
    [
        cell.offset(0, -1),
        cell.offset(1, 0),
        cell.offset(0, 1),
        cell.offset(-1, 0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid_with_walls(bounds: GridBounds, walls: &[Cell]) -> Occupancy {
        let mut occupancy = Occupancy::new(bounds);
        for cell in WallSet::border(bounds).iter().chain(walls.iter().copied()) {
            occupancy.set_wall(cell);
        }
        occupancy
    }

    fn open_runs(mask: &[bool]) -> usize {
        mask.iter()
            .enumerate()
            .filter(|(index, open)| **open && (*index == 0 || !mask[index - 1]))
            .count()
    }

    #[test]
    fn gap_mask_opens_at_least_minimum() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..64 {
            let mask = gap_mask(&mut rng, 30, 3);
            assert_eq!(mask.len(), 30);
            let runs = open_runs(&mask);
            assert!(
                (3..=3 + EXTRA_GAPS as usize).contains(&runs),
                "expected between 3 and {} separate gaps, found {runs} in {mask:?}",
                3 + EXTRA_GAPS
            );
        }
    }

    #[test]
    fn gap_mask_never_merges_gaps() {
        for seed in 0..1000 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mask = gap_mask(&mut rng, 26, 2);
            assert!(
                open_runs(&mask) >= 2,
                "seed {seed} produced fewer than 2 separate gaps: {mask:?}"
            );
        }
    }

    #[test]
    fn gap_mask_fits_as_many_gaps_as_short_lines_allow() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(gap_mask(&mut rng, 1, 2), vec![true]);
        assert_eq!(open_runs(&gap_mask(&mut rng, 4, 2)), 1);
        assert_eq!(gap_mask(&mut rng, 5, 2), vec![true, true, false, true, true]);
    }

    #[test]
    fn clearance_rejects_walls_two_cells_away() {
        let bounds = GridBounds::new(0, 0, 12, 12);
        let occupancy = grid_with_walls(bounds, &[Cell::new(5, 3)]);

        assert!(!has_clearance(&occupancy, Cell::new(5, 5), Axis::Horizontal));
        assert!(has_clearance(&occupancy, Cell::new(5, 6), Axis::Horizontal));
        assert!(has_clearance(&occupancy, Cell::new(5, 5), Axis::Vertical));
    }

    #[test]
    fn completes_square_detects_two_by_two_blocks() {
        let bounds = GridBounds::new(0, 0, 12, 12);
        let occupancy = grid_with_walls(bounds, &[Cell::new(5, 5), Cell::new(6, 5), Cell::new(5, 6)]);

        assert!(completes_square(&occupancy, Cell::new(6, 6)));
        assert!(!completes_square(&occupancy, Cell::new(8, 8)));
    }

    #[test]
    fn reachability_counts_open_interior() {
        let bounds = GridBounds::new(0, 0, 5, 5);
        assert_eq!(reachable_from_center(bounds, |_| false), 16);

        let wall_column: Vec<Cell> = (1..=4).map(|y| Cell::new(3, y)).collect();
        let reached = reachable_from_center(bounds, |cell| wall_column.contains(&cell));
        assert_eq!(reached, 8, "wall column splits the interior in two halves");
    }

    #[test]
    fn reachability_seeds_from_nearest_open_cell() {
        let bounds = GridBounds::new(0, 0, 6, 6);
        let center = bounds.center();
        let reached = reachable_from_center(bounds, |cell| cell == center);
        assert_eq!(reached, bounds.interior_cell_count() - 1);

        assert_eq!(reachable_from_center(bounds, |_| true), 0);
    }

    #[test]
    fn degenerate_bounds_yield_border_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let bounds = GridBounds::new(1, 1, 2, 6);
        let generation = MazeGenerator::new(bounds).generate_detailed(&mut rng, []);

        assert_eq!(generation.walls, WallSet::border(bounds));
        assert!(generation.samples.is_empty());
    }
}
