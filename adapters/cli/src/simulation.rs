use std::time::Duration;

use anyhow::{bail, Result};
use portal_snake_core::{Command, Event, PortalRole};
use portal_snake_rendering::{
    visible_segments, FrameControl, FrameInput, GridPresentation, Scene,
};
use portal_snake_system_fruit::FruitSpawning;
use portal_snake_system_maze::reachable_from_center;
use portal_snake_system_portal::PortalTransition;
use portal_snake_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{autopilot, map_transfer::MapSnapshot, settings::Settings};

/// World plus the systems reacting to it, driven one tick at a time.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    portal: PortalTransition,
    fruit: FruitSpawning,
    rng: ChaCha8Rng,
    grid: GridPresentation,
    restart: bool,
}

impl Simulation {
    pub(crate) fn new(settings: &Settings) -> Result<Self> {
        let grid = GridPresentation::new(settings.width, settings.height)?;
        let mut simulation = Self {
            world: World::new(),
            portal: PortalTransition::new(settings.portal.config()),
            fruit: FruitSpawning::new(settings.fruit.config()),
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            grid,
            restart: settings.restart,
        };
        simulation.execute(Command::ConfigureGrid {
            width: settings.width,
            height: settings.height,
        });
        Ok(simulation)
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Replaces the current walls with an imported layout.
    pub(crate) fn import(&mut self, snapshot: &MapSnapshot) -> Result<()> {
        let (width, height) = query::grid_size(&self.world);
        if (snapshot.width, snapshot.height) != (width, height) {
            bail!(
                "imported map is {}x{} but the grid is {width}x{height}",
                snapshot.width,
                snapshot.height
            );
        }

        let snake = query::snake(&self.world);
        let walls = snapshot
            .to_walls()
            .iter()
            .filter(|cell| !snake.occupies(*cell))
            .collect();
        self.execute(Command::ReplaceWalls { walls });

        let reachable = reachable_from_center(query::bounds(&self.world), |cell| {
            query::is_wall(&self.world, cell)
        });
        debug!(walls = snapshot.walls.len(), reachable, "imported map");
        Ok(())
    }

    pub(crate) fn export(&self) -> MapSnapshot {
        let (width, height) = query::grid_size(&self.world);
        MapSnapshot::capture(width, height, query::walls(&self.world))
    }

    /// Advances the simulation by one frame.
    pub(crate) fn step(&mut self, dt: Duration, input: FrameInput) -> FrameControl {
        if input.reset {
            self.execute(Command::ResetGame);
        }

        if query::game_over(&self.world).is_some() {
            if !self.restart {
                return FrameControl::Exit;
            }
            self.execute(Command::ResetGame);
        }

        if let Some(direction) = input.steer.or_else(|| autopilot::steer(&self.world)) {
            self.execute(Command::Steer { direction });
        }
        self.execute(Command::Tick { dt });

        if let Some(reason) = query::game_over(&self.world) {
            info!(?reason, score = query::score(&self.world), "game over");
            if !self.restart {
                return FrameControl::Exit;
            }
        }
        FrameControl::Continue
    }

    /// Builds the scene describing the current world.
    pub(crate) fn scene(&self) -> Scene {
        let exit = query::portal(&self.world, PortalRole::Exit);
        let mut scene = Scene::new(self.grid);
        scene.walls = query::wall_cells(&self.world).collect();
        scene.snake = visible_segments(query::body(&self.world), exit);
        scene.heading = query::snake(&self.world).direction();
        scene.fruit = query::fruit_cells(&self.world).collect();
        scene.portals = [PortalRole::Entrance, PortalRole::Exit]
            .into_iter()
            .filter_map(|role| query::portal(&self.world, role).map(|cell| (cell, role)))
            .collect();
        scene.score = query::score(&self.world);
        scene.game_over = query::game_over(&self.world).is_some();
        scene
    }

    /// Applies a command and lets every system react until the world settles.
    fn execute(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.dispatch(events);
    }

    fn dispatch(&mut self, mut events: Vec<Event>) {
        while !events.is_empty() {
            let mut generated = Vec::new();
            let mut commands = Vec::new();

            self.portal
                .handle(&events, &self.world, &mut self.rng, &mut commands);
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut generated);
            }

            self.fruit
                .handle(&events, &self.world, &mut self.rng, &mut commands);
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut generated);
            }

            events = generated;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_snake_core::GridBounds;

    fn settings(seed: u64) -> Settings {
        Settings {
            seed,
            width: 20,
            height: 16,
            ..Settings::default()
        }
    }

    #[test]
    fn new_simulation_starts_on_border_only_map() {
        let simulation = Simulation::new(&settings(1)).expect("valid settings");
        let bounds = GridBounds::for_grid(20, 16);

        assert_eq!(query::grid_size(simulation.world()), (20, 16));
        assert_eq!(query::walls(simulation.world()).len(), 2 * 18 + 2 * 12);
        assert!(simulation.export().walls.is_empty());
        assert_eq!(query::bounds(simulation.world()), bounds);
    }

    #[test]
    fn first_tick_spawns_fruit() {
        let mut simulation = Simulation::new(&settings(2)).expect("valid settings");

        let control = simulation.step(Duration::from_millis(100), FrameInput::default());

        assert_eq!(control, FrameControl::Continue);
        assert_eq!(query::fruit_cells(simulation.world()).count(), 1);
        assert_eq!(simulation.scene().fruit.len(), 1);
    }

    #[test]
    fn replay_is_deterministic() {
        let run = |seed| {
            let mut simulation = Simulation::new(&settings(seed)).expect("valid settings");
            for _ in 0..200 {
                if simulation.step(Duration::from_millis(100), FrameInput::default())
                    == FrameControl::Exit
                {
                    break;
                }
            }
            (
                query::body(simulation.world()).to_vec(),
                query::score(simulation.world()),
                query::tick_index(simulation.world()),
                simulation.export(),
            )
        };

        assert_eq!(run(7), run(7), "identical seeds diverged");
    }

    #[test]
    fn import_rejects_mismatched_grid() {
        let mut simulation = Simulation::new(&settings(3)).expect("valid settings");
        let snapshot = MapSnapshot {
            width: 10,
            height: 10,
            walls: Vec::new(),
        };

        let error = simulation.import(&snapshot).expect_err("size mismatch");
        assert!(error.to_string().contains("10x10"));
    }

    #[test]
    fn import_skips_walls_under_the_snake() {
        let mut simulation = Simulation::new(&settings(3)).expect("valid settings");
        let head = query::snake(simulation.world()).head();
        let free = head.offset(3, 0);
        let snapshot = MapSnapshot {
            width: 20,
            height: 16,
            walls: vec![head, free],
        };

        simulation.import(&snapshot).expect("matching grid");

        assert!(!query::is_wall(simulation.world(), head));
        assert!(query::is_wall(simulation.world(), free));
        assert_eq!(simulation.export().walls, vec![free]);
    }

    #[test]
    fn reset_input_starts_a_new_game() {
        let mut simulation = Simulation::new(&settings(4)).expect("valid settings");
        for _ in 0..3 {
            let _ = simulation.step(Duration::from_millis(100), FrameInput::default());
        }

        let _ = simulation.step(
            Duration::from_millis(100),
            FrameInput {
                steer: None,
                reset: true,
            },
        );

        assert_eq!(query::tick_index(simulation.world()), 1);
        assert_eq!(query::score(simulation.world()), 0);
        assert_eq!(query::body(simulation.world()).len(), 3);
    }
}
