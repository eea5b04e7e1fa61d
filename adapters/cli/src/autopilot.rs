//! Breadth-first steering used when no player drives the snake.

use std::collections::VecDeque;

use portal_snake_core::{Cell, Direction, GridBounds, PortalRole};
use portal_snake_world::{query, World};

/// Picks the next heading for the snake.
///
/// The open entrance is preferred over fruit. Distances come from a reverse
/// breadth-first search seeded at the target; the tail counts as free because
/// it moves away on the next step. When no target is reachable the first
/// neighbor that does not end the game is chosen.
pub(crate) fn steer(world: &World) -> Option<Direction> {
    let snake = query::snake(world);
    let head = snake.head();
    let body = snake.body();
    let tail = body.last().copied();
    let bounds = query::bounds(world);
    let is_blocked = |cell: Cell| {
        !bounds.interior_contains(cell)
            || query::is_wall(world, cell)
            || (snake.occupies(cell) && Some(cell) != tail)
    };

    let target = query::portal(world, PortalRole::Entrance)
        .or_else(|| query::fruit_cells(world).next());
    let distances = target.map(|target| DistanceField::from_target(bounds, target, is_blocked));

    let candidates = Direction::ALL
        .into_iter()
        .filter(|direction| *direction != snake.direction().opposite())
        .map(|direction| (direction, head.step(direction)))
        .filter(|(_, cell)| !is_blocked(*cell));

    let mut fallback = None;
    let mut best: Option<(u32, Direction)> = None;
    for (direction, cell) in candidates {
        if fallback.is_none() {
            fallback = Some(direction);
        }
        if let Some(distance) = distances.as_ref().and_then(|field| field.distance(cell)) {
            if best.map_or(true, |(current, _)| distance < current) {
                best = Some((distance, direction));
            }
        }
    }

    best.map(|(_, direction)| direction).or(fallback)
}

/// Dense distance grid covering the bounds rectangle.
struct DistanceField {
    bounds: GridBounds,
    width: usize,
    distances: Vec<u32>,
}

impl DistanceField {
    fn from_target<F>(bounds: GridBounds, target: Cell, mut is_blocked: F) -> Self
    where
        F: FnMut(Cell) -> bool,
    {
        let width = usize::try_from(bounds.max_x() - bounds.min_x() + 1).unwrap_or(0);
        let height = usize::try_from(bounds.max_y() - bounds.min_y() + 1).unwrap_or(0);
        let mut field = Self {
            bounds,
            width,
            distances: vec![u32::MAX; width.checked_mul(height).unwrap_or(0)],
        };

        let Some(start) = field.index(target) else {
            return field;
        };
        field.distances[start] = 0;
        let mut queue = VecDeque::from([target]);

        while let Some(cell) = queue.pop_front() {
            let Some(current) = field.index(cell) else {
                continue;
            };
            let next_distance = field.distances[current].saturating_add(1);
            for direction in Direction::ALL {
                let neighbor = cell.step(direction);
                if is_blocked(neighbor) {
                    continue;
                }
                let Some(index) = field.index(neighbor) else {
                    continue;
                };
                if field.distances[index] <= next_distance {
                    continue;
                }
                field.distances[index] = next_distance;
                queue.push_back(neighbor);
            }
        }

        field
    }

    fn distance(&self, cell: Cell) -> Option<u32> {
        self.index(cell)
            .map(|index| self.distances[index])
            .filter(|distance| *distance != u32::MAX)
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if !self.bounds.contains(cell) {
            return None;
        }
        let column = usize::try_from(cell.x() - self.bounds.min_x()).ok()?;
        let row = usize::try_from(cell.y() - self.bounds.min_y()).ok()?;
        row.checked_mul(self.width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_snake_core::Command;
    use portal_snake_world::apply;

    fn world_with_fruit(fruit: Cell) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                width: 12,
                height: 12,
            },
            &mut events,
        );
        apply(&mut world, Command::SpawnFruit { cell: fruit }, &mut events);
        world
    }

    #[test]
    fn steers_towards_fruit() {
        let world = world_with_fruit(Cell::new(9, 6));
        assert_eq!(query::snake(&world).head(), Cell::new(6, 6));
        assert_eq!(steer(&world), Some(Direction::East));
    }

    #[test]
    fn prefers_entrance_over_fruit() {
        let mut world = world_with_fruit(Cell::new(9, 6));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::OpenPortal {
                cell: Cell::new(3, 6),
                role: PortalRole::Entrance,
            },
            &mut events,
        );
        assert_eq!(steer(&world), Some(Direction::West));
    }

    #[test]
    fn never_reverses_into_body() {
        let world = world_with_fruit(Cell::new(6, 9));
        let direction = steer(&world).expect("a safe move exists");
        assert_ne!(direction, Direction::South);
    }
}
