#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fruit spawning system keeping one fruit on the board while the snake runs.

use std::time::Duration;

use portal_snake_core::{Cell, Command, Event, Motion, RandomSource};
use portal_snake_world::{query, World};
use tracing::debug;

/// Maximum number of random cells tried when placing a fruit.
pub const FRUIT_PLACEMENT_ATTEMPTS: usize = 300;

/// Configuration parameters required to construct the fruit system.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    spawn_delay: Duration,
}

impl Config {
    /// Creates a new configuration using the delay between losing a fruit and
    /// placing the next one.
    #[must_use]
    pub const fn new(spawn_delay: Duration) -> Self {
        Self { spawn_delay }
    }
}

/// Pure system that emits fruit spawn commands.
#[derive(Debug, Default)]
pub struct FruitSpawning {
    spawn_delay: Duration,
    accumulator: Duration,
}

impl FruitSpawning {
    /// Creates a new fruit system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_delay: config.spawn_delay,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events and the world snapshot to emit fruit commands.
    pub fn handle<R>(&mut self, events: &[Event], world: &World, rng: &mut R, out: &mut Vec<Command>)
    where
        R: RandomSource + ?Sized,
    {
        if query::game_over(world).is_some()
            || query::motion(world) == Motion::Frozen
            || query::fruit_cells(world).next().is_some()
        {
            self.accumulator = Duration::ZERO;
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::GameReset => self.accumulator = Duration::ZERO,
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        if self.accumulator < self.spawn_delay {
            return;
        }

        if let Some(cell) = select_cell(world, rng) {
            self.accumulator = Duration::ZERO;
            out.push(Command::SpawnFruit { cell });
        } else {
            debug!("no free cell for fruit, retrying next tick");
        }
    }
}

fn select_cell<R>(world: &World, rng: &mut R) -> Option<Cell>
where
    R: RandomSource + ?Sized,
{
    let bounds = query::bounds(world);
    (0..FRUIT_PLACEMENT_ATTEMPTS)
        .map(|_| {
            Cell::new(
                rng.range_inclusive(bounds.min_x() + 1, bounds.max_x() - 1),
                rng.range_inclusive(bounds.min_y() + 1, bounds.max_y() - 1),
            )
        })
        .find(|cell| query::is_free(world, *cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_snake_world::apply;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn waits_for_spawn_delay() {
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
        let mut fruit = FruitSpawning::new(Config::new(Duration::from_millis(300)));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut commands = Vec::new();
        let tick = [Event::TimeAdvanced {
            dt: Duration::from_millis(100),
        }];

        fruit.handle(&tick, &world, &mut rng, &mut commands);
        fruit.handle(&tick, &world, &mut rng, &mut commands);
        assert!(commands.is_empty(), "fruit spawned before the delay");

        fruit.handle(&tick, &world, &mut rng, &mut commands);
        assert_eq!(commands.len(), 1);
        assert_eq!(fruit.accumulator, Duration::ZERO);
    }
}
