#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Portal Snake.

mod snake;

pub use snake::Snake;

use portal_snake_core::{
    Cell, CollisionPolicy, CollisionReason, Command, Direction, Event, GridBounds, Item, Motion,
    PlacementError, PortalRole, WallSet, WELCOME_BANNER,
};

const DEFAULT_GRID_WIDTH: u32 = 30;
const DEFAULT_GRID_HEIGHT: u32 = 30;

const INITIAL_SNAKE_LENGTH: usize = 3;
const INITIAL_DIRECTION: Direction = Direction::North;

/// Score credited for every fruit eaten.
pub const FRUIT_SCORE: u32 = 10;

/// Represents the authoritative Portal Snake world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    width: u32,
    height: u32,
    bounds: GridBounds,
    walls: WallSet,
    snake: Snake,
    items: Vec<Item>,
    score: u32,
    game_over: Option<CollisionReason>,
    motion: Motion,
    collision_policy: CollisionPolicy,
    tick_index: u64,
}

impl World {
    /// Creates a new Portal Snake world ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        let bounds = GridBounds::for_grid(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT);
        let mut world = Self {
            banner: WELCOME_BANNER,
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            bounds,
            walls: WallSet::border(bounds),
            snake: spawn_snake(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT),
            items: Vec::new(),
            score: 0,
            game_over: None,
            motion: Motion::Running,
            collision_policy: CollisionPolicy::Enforced,
            tick_index: 0,
        };
        world.reset_game();
        world
    }

    fn reset_game(&mut self) {
        self.walls = WallSet::border(self.bounds);
        self.snake = spawn_snake(self.width, self.height);
        self.items.clear();
        self.score = 0;
        self.game_over = None;
        self.motion = Motion::Running;
        self.collision_policy = CollisionPolicy::Enforced;
        self.tick_index = 0;
    }

    fn step_snake(&mut self, out_events: &mut Vec<Event>) {
        let head = self.snake.advance();
        let policy = self.collision_policy;

        let hit_wall = !self.bounds.contains(head)
            || (policy.checks_walls() && self.walls.contains(head));
        if hit_wall {
            self.end_game(head, CollisionReason::Wall, out_events);
            return;
        }

        let hit_body = self.snake.body()[1..]
            .iter()
            .any(|segment| *segment == head && policy.checks_segment(*segment));
        if hit_body {
            self.end_game(head, CollisionReason::SelfIntersection, out_events);
            return;
        }

        out_events.push(Event::SnakeAdvanced { head });

        let Some(index) = self.items.iter().position(|item| item.cell() == head) else {
            return;
        };

        let item = self.items[index];
        match item {
            Item::Fruit { cell } => {
                let _ = self.items.remove(index);
                self.snake.grow_by_one();
                self.score = self.score.saturating_add(FRUIT_SCORE);
                out_events.push(Event::FruitEaten {
                    cell,
                    score: self.score,
                });
            }
            Item::Portal {
                cell,
                role: PortalRole::Entrance,
            } => {
                let _ = self.items.remove(index);
                out_events.push(Event::PortalClosed {
                    role: PortalRole::Entrance,
                });
                out_events.push(Event::PortalEntered {
                    cell,
                    body_length: self.snake.len(),
                });
            }
            Item::Portal {
                role: PortalRole::Exit,
                ..
            } => {}
        }
    }

    fn end_game(&mut self, cell: Cell, reason: CollisionReason, out_events: &mut Vec<Event>) {
        self.game_over = Some(reason);
        out_events.push(Event::SnakeCollided { cell, reason });
    }

    fn validate_item(&self, cell: Cell, role: Option<PortalRole>) -> Result<(), PlacementError> {
        if self.game_over.is_some() {
            return Err(PlacementError::GameOver);
        }
        if !self.bounds.interior_contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.walls.contains(cell) {
            return Err(PlacementError::Occupied);
        }
        // The exit is opened under the relocated tail.
        if role != Some(PortalRole::Exit) && self.snake.occupies(cell) {
            return Err(PlacementError::Occupied);
        }
        let blocked_by_item = self.items.iter().any(|item| match item {
            Item::Fruit { cell: other } => *other == cell,
            Item::Portal {
                cell: other,
                role: other_role,
            } => *other == cell && Some(*other_role) != role,
        });
        if blocked_by_item {
            return Err(PlacementError::Occupied);
        }
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { width, height } => {
            world.width = width;
            world.height = height;
            world.bounds = GridBounds::for_grid(width, height);
            world.reset_game();
            out_events.push(Event::GridConfigured {
                bounds: world.bounds,
            });
            out_events.push(Event::GameReset);
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            if world.game_over.is_none() && world.motion == Motion::Running {
                world.step_snake(out_events);
            }
        }
        Command::Steer { direction } => {
            if world.game_over.is_none() {
                world.snake.change_direction(direction);
            }
        }
        Command::ReplaceWalls { walls } => {
            let mut merged = walls;
            for cell in WallSet::border(world.bounds).iter() {
                merged.insert(cell);
            }
            out_events.push(Event::WallsReplaced {
                wall_count: merged.len(),
            });
            world.walls = merged;
        }
        Command::RelocateSnake { body, direction } => {
            if body.is_empty() {
                return;
            }
            world.snake.set_body(body);
            world.snake.set_direction(direction);
            out_events.push(Event::SnakeRelocated {
                head: world.snake.head(),
                length: world.snake.len(),
            });
        }
        Command::GrowSnake => {
            if world.game_over.is_some() {
                return;
            }
            world.snake.grow_by_one();
            out_events.push(Event::SnakeGrew {
                length: world.snake.len(),
            });
        }
        Command::SpawnFruit { cell } => match world.validate_item(cell, None) {
            Ok(()) => {
                world.items.push(Item::Fruit { cell });
                out_events.push(Event::FruitSpawned { cell });
            }
            Err(reason) => out_events.push(Event::ItemRejected { cell, reason }),
        },
        Command::ClearFruit => {
            world
                .items
                .retain(|item| !matches!(item, Item::Fruit { .. }));
        }
        Command::OpenPortal { cell, role } => match world.validate_item(cell, Some(role)) {
            Ok(()) => {
                world.items.retain(
                    |item| !matches!(item, Item::Portal { role: existing, .. } if *existing == role),
                );
                world.items.push(Item::Portal { cell, role });
                out_events.push(Event::PortalOpened { cell, role });
            }
            Err(reason) => out_events.push(Event::ItemRejected { cell, reason }),
        },
        Command::ClosePortal { role } => {
            let before = world.items.len();
            world.items.retain(
                |item| !matches!(item, Item::Portal { role: existing, .. } if *existing == role),
            );
            if world.items.len() != before {
                out_events.push(Event::PortalClosed { role });
            }
        }
        Command::SetMotion { motion } => {
            if world.motion != motion {
                world.motion = motion;
                out_events.push(Event::MotionChanged { motion });
            }
        }
        Command::SetCollisionPolicy { policy } => {
            if world.collision_policy != policy {
                world.collision_policy = policy;
                out_events.push(Event::CollisionPolicyChanged { policy });
            }
        }
        Command::ResetGame => {
            world.reset_game();
            out_events.push(Event::GameReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Snake, World};
    use portal_snake_core::{
        Cell, CollisionPolicy, CollisionReason, GridBounds, Item, Motion, PortalRole, WallSet,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Dimensions of the configured grid as `(width, height)`.
    #[must_use]
    pub fn grid_size(world: &World) -> (u32, u32) {
        (world.width, world.height)
    }

    /// Bounds of the border wall.
    #[must_use]
    pub fn bounds(world: &World) -> GridBounds {
        world.bounds
    }

    /// Provides read-only access to the wall layout.
    #[must_use]
    pub fn walls(world: &World) -> &WallSet {
        &world.walls
    }

    /// Reports whether the cell holds a wall.
    #[must_use]
    pub fn is_wall(world: &World, cell: Cell) -> bool {
        world.walls.contains(cell)
    }

    /// Iterates every wall cell in row-major order.
    pub fn wall_cells(world: &World) -> impl Iterator<Item = Cell> + '_ {
        world.walls.iter()
    }

    /// Provides read-only access to the snake.
    #[must_use]
    pub fn snake(world: &World) -> &Snake {
        &world.snake
    }

    /// Body cells ordered head first.
    #[must_use]
    pub fn body(world: &World) -> &[Cell] {
        world.snake.body()
    }

    /// Items currently resting on the board.
    #[must_use]
    pub fn items(world: &World) -> &[Item] {
        &world.items
    }

    /// Cells holding fruit.
    pub fn fruit_cells(world: &World) -> impl Iterator<Item = Cell> + '_ {
        world.items.iter().filter_map(|item| match item {
            Item::Fruit { cell } => Some(*cell),
            Item::Portal { .. } => None,
        })
    }

    /// Cell hosting the portal with the provided role, if it is open.
    #[must_use]
    pub fn portal(world: &World, role: PortalRole) -> Option<Cell> {
        world.items.iter().find_map(|item| match item {
            Item::Portal {
                cell,
                role: existing,
            } if *existing == role => Some(*cell),
            _ => None,
        })
    }

    /// Reports whether an interior cell holds no wall, body segment, or item.
    #[must_use]
    pub fn is_free(world: &World, cell: Cell) -> bool {
        world.bounds.interior_contains(cell)
            && !world.walls.contains(cell)
            && !world.snake.occupies(cell)
            && world.items.iter().all(|item| item.cell() != cell)
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Reason the game ended, if it has.
    #[must_use]
    pub fn game_over(world: &World) -> Option<CollisionReason> {
        world.game_over
    }

    /// Movement state of the snake.
    #[must_use]
    pub fn motion(world: &World) -> Motion {
        world.motion
    }

    /// Collision policy applied to snake steps.
    #[must_use]
    pub fn collision_policy(world: &World) -> CollisionPolicy {
        world.collision_policy
    }

    /// Number of ticks processed since the current game started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

fn spawn_snake(width: u32, height: u32) -> Snake {
    let center_x = i32::try_from(width / 2).unwrap_or(i32::MAX);
    let center_y = i32::try_from(height / 2).unwrap_or(i32::MAX);
    Snake::new(
        Cell::new(center_x, center_y),
        INITIAL_DIRECTION,
        INITIAL_SNAKE_LENGTH,
    )
}
