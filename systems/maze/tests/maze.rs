use std::collections::BTreeSet;

use portal_snake_core::{Cell, GridBounds, WallSet};
use portal_snake_system_maze::{
    generate, reachable_from_center, MazeGenerator, GENERATION_ATTEMPTS,
    REACHABILITY_TARGET_PERCENT,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const GRID_SIZES: [(u32, u32); 5] = [(10, 10), (20, 14), (30, 30), (5, 40), (64, 36)];

#[test]
fn small_grid_keeps_forbidden_center_free() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let walls = generate(&mut rng, 10, 10, [Cell::new(4, 4)]);

    assert!(!walls.contains(Cell::new(4, 4)), "forbidden cell must stay free");
    for x in 1..=8 {
        assert!(walls.contains(Cell::new(x, 1)), "top border missing at x={x}");
        assert!(walls.contains(Cell::new(x, 8)), "bottom border missing at x={x}");
    }
    for y in 1..=8 {
        assert!(walls.contains(Cell::new(1, y)), "left border missing at y={y}");
        assert!(walls.contains(Cell::new(8, y)), "right border missing at y={y}");
    }
}

#[test]
fn border_is_always_complete() {
    for seed in 0..24 {
        for (width, height) in GRID_SIZES {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let walls = generate(&mut rng, width, height, []);
            let border = WallSet::border(GridBounds::for_grid(width, height));

            assert!(
                border.iter().all(|cell| walls.contains(cell)),
                "seed {seed} on {width}x{height} lost part of the border"
            );
        }
    }
}

#[test]
fn forbidden_cells_never_hold_walls() {
    let bounds = GridBounds::for_grid(30, 20);
    let forbidden: BTreeSet<Cell> = (5..25)
        .map(|x| Cell::new(x, 9))
        .chain((3..17).map(|y| Cell::new(14, y)))
        .collect();

    for seed in 0..32 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let walls = MazeGenerator::new(bounds).generate(&mut rng, forbidden.iter().copied());
        let clash: Vec<Cell> = forbidden
            .iter()
            .copied()
            .filter(|cell| walls.contains(*cell))
            .collect();
        assert!(clash.is_empty(), "seed {seed} walled forbidden cells {clash:?}");
    }
}

#[test]
fn forbidden_cells_outside_bounds_are_ignored() {
    let mut first = ChaCha8Rng::seed_from_u64(99);
    let mut second = ChaCha8Rng::seed_from_u64(99);

    let plain = generate(&mut first, 24, 24, []);
    let with_outside = generate(
        &mut second,
        24,
        24,
        [Cell::new(-3, 4), Cell::new(0, 0), Cell::new(100, 5)],
    );

    assert_eq!(plain, with_outside);
}

#[test]
fn generation_is_deterministic_for_same_seed() {
    let forbidden = [Cell::new(10, 10), Cell::new(10, 11), Cell::new(10, 12)];
    for (width, height) in GRID_SIZES {
        let mut first = ChaCha8Rng::seed_from_u64(0xdead_beef);
        let mut second = ChaCha8Rng::seed_from_u64(0xdead_beef);

        assert_eq!(
            generate(&mut first, width, height, forbidden),
            generate(&mut second, width, height, forbidden),
            "{width}x{height} diverged for identical seeds"
        );
    }
}

#[test]
fn layouts_add_interior_obstacles() {
    let bounds = GridBounds::for_grid(40, 30);
    let border_len = WallSet::border(bounds).len();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let walls = MazeGenerator::new(bounds).generate(&mut rng, []);

    assert!(
        walls.len() > border_len,
        "expected interior walls beyond the border"
    );
    assert!(walls.iter().all(|cell| bounds.contains(cell)));
}

#[test]
fn reachability_meets_target_or_matches_best_attempt() {
    for seed in 0..40 {
        let bounds = GridBounds::for_grid(26, 18);
        let forbidden = [Cell::new(5, 5), Cell::new(6, 5)];
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let generation = MazeGenerator::new(bounds).generate_detailed(&mut rng, forbidden);

        let measured = reachable_from_center(bounds, |cell| {
            generation.walls.contains(cell) || forbidden.contains(&cell)
        });
        assert_eq!(measured, generation.reachable, "seed {seed} misreported reach");

        if generation.accepted {
            assert!(
                measured * 100 >= generation.interior_cells * REACHABILITY_TARGET_PERCENT,
                "seed {seed} accepted an under-connected layout"
            );
            assert_eq!(generation.samples.last(), Some(&measured));
        } else {
            assert_eq!(generation.samples.len(), GENERATION_ATTEMPTS);
            let best = generation.samples.iter().copied().max().unwrap_or(0);
            assert_eq!(measured, best, "seed {seed} did not keep the best attempt");
        }
    }
}

#[test]
fn fully_forbidden_interior_produces_border_only() {
    let bounds = GridBounds::for_grid(8, 8);
    let forbidden: Vec<Cell> = bounds.interior_cells().collect();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let generation = MazeGenerator::new(bounds).generate_detailed(&mut rng, forbidden);

    assert_eq!(generation.walls, WallSet::border(bounds));
    assert_eq!(generation.reachable, 0);
    assert!(!generation.accepted);
}

#[test]
fn tiny_grids_are_border_only() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    assert_eq!(generate(&mut rng, 3, 3, []), WallSet::border(GridBounds::for_grid(3, 3)));
    assert_eq!(generate(&mut rng, 1, 1, []), WallSet::new());
}
