#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Portal Snake engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Portal Snake.";

/// Number of cells separating the grid edge from the border wall.
pub const BORDER_INSET: i32 = 1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the playing field and starts a fresh game on it.
    ConfigureGrid {
        /// Number of cell columns in the grid.
        width: u32,
        /// Number of cell rows in the grid.
        height: u32,
    },
    /// Advances the simulation by one movement tick.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the snake turn toward the provided direction on its next step.
    Steer {
        /// Desired heading. Reversals onto the body are ignored.
        direction: Direction,
    },
    /// Replaces the entire wall layout.
    ReplaceWalls {
        /// New wall layout, expected to contain the border perimeter.
        walls: WallSet,
    },
    /// Moves the snake to a new body and heading in a single step.
    RelocateSnake {
        /// Body cells ordered head first.
        body: Vec<Cell>,
        /// Heading assigned after relocation.
        direction: Direction,
    },
    /// Grows the snake by duplicating its tail segment.
    GrowSnake,
    /// Places a fruit on the provided cell.
    SpawnFruit {
        /// Cell that should hold the fruit.
        cell: Cell,
    },
    /// Removes every fruit from the board.
    ClearFruit,
    /// Opens a portal with the provided role on the given cell.
    OpenPortal {
        /// Cell hosting the portal.
        cell: Cell,
        /// Role of the portal within a teleport sequence.
        role: PortalRole,
    },
    /// Closes any open portal with the provided role.
    ClosePortal {
        /// Role of the portal that should be removed.
        role: PortalRole,
    },
    /// Freezes or resumes snake movement.
    SetMotion {
        /// Movement state applied on subsequent ticks.
        motion: Motion,
    },
    /// Selects which collision checks apply to snake steps.
    SetCollisionPolicy {
        /// Policy applied on subsequent ticks.
        policy: CollisionPolicy,
    },
    /// Abandons the current game and starts a fresh one on the same grid.
    ResetGame,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new grid was configured.
    GridConfigured {
        /// Bounds of the border wall for the configured grid.
        bounds: GridBounds,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the snake moved its head into a new cell.
    SnakeAdvanced {
        /// Cell occupied by the head after the step.
        head: Cell,
    },
    /// Reports that the snake ate a fruit.
    FruitEaten {
        /// Cell that held the fruit.
        cell: Cell,
        /// Score after the fruit was credited.
        score: u32,
    },
    /// Reports that the snake's head entered an active portal entrance.
    ///
    /// The world closes the entrance before emitting this event.
    PortalEntered {
        /// Cell that hosted the entrance.
        cell: Cell,
        /// Body length at the moment the head entered the portal.
        body_length: usize,
    },
    /// Reports that the snake collided and the game ended.
    SnakeCollided {
        /// Cell where the head collided.
        cell: Cell,
        /// Obstacle responsible for the collision.
        reason: CollisionReason,
    },
    /// Confirms that the wall layout was replaced.
    WallsReplaced {
        /// Number of wall cells in the new layout.
        wall_count: usize,
    },
    /// Confirms that the snake was relocated.
    SnakeRelocated {
        /// Head cell after relocation.
        head: Cell,
        /// Body length after relocation.
        length: usize,
    },
    /// Confirms that the snake grew by one segment.
    SnakeGrew {
        /// Body length after growing.
        length: usize,
    },
    /// Confirms that a fruit was placed.
    FruitSpawned {
        /// Cell holding the fruit.
        cell: Cell,
    },
    /// Confirms that a portal was opened.
    PortalOpened {
        /// Cell hosting the portal.
        cell: Cell,
        /// Role of the portal.
        role: PortalRole,
    },
    /// Confirms that a portal was closed.
    PortalClosed {
        /// Role of the portal that was removed.
        role: PortalRole,
    },
    /// Reports that an item placement request was rejected.
    ItemRejected {
        /// Cell provided in the placement request.
        cell: Cell,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that the snake's movement state changed.
    MotionChanged {
        /// Movement state that became active.
        motion: Motion,
    },
    /// Announces that the active collision policy changed.
    CollisionPolicyChanged {
        /// Policy that became active.
        policy: CollisionPolicy,
    },
    /// Announces that a fresh game started.
    GameReset,
}

/// Cardinal movement directions available to the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Column and row delta applied by a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Location of a single grid cell expressed as signed column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    y: i32,
    x: i32,
}

impl Cell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row index of the cell. Rows grow downward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell offset by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Returns the neighbouring cell in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Inclusive rectangle whose perimeter forms the border wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl GridBounds {
    /// Creates bounds from explicit corner coordinates.
    #[must_use]
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds of the border wall for a grid of the provided size.
    ///
    /// The border is inset by [`BORDER_INSET`] cells, so a 10×10 grid places
    /// its border between (1, 1) and (8, 8).
    #[must_use]
    pub fn for_grid(width: u32, height: u32) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        Self::new(
            BORDER_INSET,
            BORDER_INSET,
            width - 1 - BORDER_INSET,
            height - 1 - BORDER_INSET,
        )
    }

    /// Smallest column on the border.
    #[must_use]
    pub const fn min_x(&self) -> i32 {
        self.min_x
    }

    /// Smallest row on the border.
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Largest column on the border.
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.max_x
    }

    /// Largest row on the border.
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Reports whether the bounds violate `min < max` on either axis.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Reports whether the cell lies on or inside the border.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min_x && cell.x <= self.max_x && cell.y >= self.min_y && cell.y <= self.max_y
    }

    /// Reports whether the cell lies on the border perimeter.
    #[must_use]
    pub const fn on_border(&self, cell: Cell) -> bool {
        self.contains(cell)
            && (cell.x == self.min_x
                || cell.x == self.max_x
                || cell.y == self.min_y
                || cell.y == self.max_y)
    }

    /// Reports whether the cell lies strictly inside the border.
    #[must_use]
    pub const fn interior_contains(&self, cell: Cell) -> bool {
        cell.x > self.min_x && cell.x < self.max_x && cell.y > self.min_y && cell.y < self.max_y
    }

    /// Number of columns strictly inside the border.
    #[must_use]
    pub fn interior_width(&self) -> u32 {
        u32::try_from(self.max_x - self.min_x - 1).unwrap_or(0)
    }

    /// Number of rows strictly inside the border.
    #[must_use]
    pub fn interior_height(&self) -> u32 {
        u32::try_from(self.max_y - self.min_y - 1).unwrap_or(0)
    }

    /// Number of cells strictly inside the border.
    #[must_use]
    pub fn interior_cell_count(&self) -> usize {
        self.interior_width() as usize * self.interior_height() as usize
    }

    /// Geometric center of the interior, rounded toward the top-left.
    #[must_use]
    pub const fn center(&self) -> Cell {
        Cell::new(
            self.min_x + (self.max_x - self.min_x) / 2,
            self.min_y + (self.max_y - self.min_y) / 2,
        )
    }

    /// Iterates the interior cells in row-major order.
    pub fn interior_cells(&self) -> impl Iterator<Item = Cell> {
        let (min_x, max_x) = (self.min_x + 1, self.max_x - 1);
        ((self.min_y + 1)..self.max_y)
            .flat_map(move |y| (min_x..=max_x).map(move |x| Cell::new(x, y)))
    }
}

/// Unordered collection of non-traversable cells with deterministic iteration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSet {
    cells: BTreeSet<Cell>,
}

impl WallSet {
    /// Creates an empty wall set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the border perimeter of the provided bounds.
    ///
    /// Degenerate bounds produce an empty set.
    #[must_use]
    pub fn border(bounds: GridBounds) -> Self {
        let mut walls = Self::new();
        if bounds.min_x > bounds.max_x || bounds.min_y > bounds.max_y {
            return walls;
        }

        for x in bounds.min_x..=bounds.max_x {
            walls.insert(Cell::new(x, bounds.min_y));
            walls.insert(Cell::new(x, bounds.max_y));
        }
        for y in bounds.min_y..=bounds.max_y {
            walls.insert(Cell::new(bounds.min_x, y));
            walls.insert(Cell::new(bounds.max_x, y));
        }
        walls
    }

    /// Adds a wall cell.
    pub fn insert(&mut self, cell: Cell) {
        let _ = self.cells.insert(cell);
    }

    /// Reports whether the cell holds a wall.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Iterates wall cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Number of wall cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the set holds no walls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<Cell> for WallSet {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Role a portal plays within a teleport sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortalRole {
    /// Armed portal that triggers the teleport when the head enters it.
    Entrance,
    /// Destination marker the relocated snake emerges from.
    Exit,
}

/// Collectible or interactive object resting on a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Item {
    /// Fruit that grows the snake and credits score when eaten.
    Fruit {
        /// Cell holding the fruit.
        cell: Cell,
    },
    /// Portal marker taking part in a teleport sequence.
    Portal {
        /// Cell hosting the portal.
        cell: Cell,
        /// Role of the portal.
        role: PortalRole,
    },
}

impl Item {
    /// Cell the item occupies.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        match self {
            Self::Fruit { cell } | Self::Portal { cell, .. } => *cell,
        }
    }
}

/// Obstacle responsible for ending the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionReason {
    /// The head entered a wall cell.
    Wall,
    /// The head entered a cell occupied by its own body.
    SelfIntersection,
}

/// Movement state of the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Motion {
    /// The snake advances one cell per tick.
    Running,
    /// The snake holds its position while time still advances.
    Frozen,
}

/// Selects which collision checks apply when the snake steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionPolicy {
    /// Wall and self collisions end the game.
    Enforced,
    /// Every collision check reports no collision.
    Suppressed,
    /// Walls are enforced; body segments queued in the exit column at or below
    /// the exit row are ignored by the self-collision check.
    ShieldedColumn {
        /// Exit portal whose column shields queued segments.
        exit: Cell,
    },
}

impl CollisionPolicy {
    /// Reports whether the policy checks the head against walls.
    #[must_use]
    pub const fn checks_walls(&self) -> bool {
        !matches!(self, Self::Suppressed)
    }

    /// Reports whether the provided body segment counts for self-collision.
    #[must_use]
    pub const fn checks_segment(&self, segment: Cell) -> bool {
        match self {
            Self::Enforced => true,
            Self::Suppressed => false,
            Self::ShieldedColumn { exit } => !(segment.x == exit.x && segment.y >= exit.y),
        }
    }
}

/// Reasons an item placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementError {
    /// The game has ended, so the board is frozen.
    GameOver,
    /// The requested cell lies outside the interior.
    OutOfBounds,
    /// The requested cell holds a wall, a body segment, or another item.
    Occupied,
}

/// Uniform random source consumed by the generation and placement code.
///
/// Every `rand::Rng` implements this trait, so callers usually pass a seeded
/// `ChaCha8Rng` directly.
pub trait RandomSource {
    /// Draws an integer in the inclusive range `low..=high`.
    ///
    /// Returns `low` when the range is empty.
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32;

    /// Draws a real number in the half-open range `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}
