use std::time::Duration;

use portal_snake_core::{Cell, Command, Direction, Event, Motion};
use portal_snake_system_fruit::{Config, FruitSpawning};
use portal_snake_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const TICK: [Event; 1] = [Event::TimeAdvanced {
    dt: Duration::from_millis(100),
}];

fn configured(width: u32, height: u32) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid { width, height },
        &mut events,
    );
    world
}

#[test]
fn spawns_fruit_on_free_interior_cell() {
    for seed in 0..32 {
        let mut world = configured(16, 12);
        let mut fruit = FruitSpawning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut commands = Vec::new();

        fruit.handle(&TICK, &world, &mut rng, &mut commands);

        let [Command::SpawnFruit { cell }] = commands.as_slice() else {
            panic!("seed {seed} emitted {commands:?}");
        };
        assert!(query::is_free(&world, *cell), "seed {seed} picked {cell:?}");

        let mut events = Vec::new();
        world::apply(&mut world, commands[0].clone(), &mut events);
        assert_eq!(events, vec![Event::FruitSpawned { cell: *cell }]);
    }
}

#[test]
fn existing_fruit_blocks_spawning() {
    let mut world = configured(16, 12);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnFruit {
            cell: Cell::new(3, 3),
        },
        &mut events,
    );
    let mut fruit = FruitSpawning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut commands = Vec::new();

    fruit.handle(&TICK, &world, &mut rng, &mut commands);

    assert!(commands.is_empty(), "a fruit is already on the board");
}

#[test]
fn frozen_snake_receives_no_fruit() {
    let mut world = configured(16, 12);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetMotion {
            motion: Motion::Frozen,
        },
        &mut events,
    );
    let mut fruit = FruitSpawning::new(Config::new(Duration::ZERO));
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut commands = Vec::new();

    fruit.handle(&TICK, &world, &mut rng, &mut commands);

    assert!(commands.is_empty(), "fruit spawned during a freeze");
}

#[test]
fn crowded_board_spawns_nothing() {
    let mut world = configured(5, 5);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::RelocateSnake {
            body: vec![Cell::new(2, 2)],
            direction: Direction::North,
        },
        &mut events,
    );
    let mut fruit = FruitSpawning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut commands = Vec::new();

    fruit.handle(&TICK, &world, &mut rng, &mut commands);

    assert!(commands.is_empty(), "the only interior cell holds the snake");
}

#[test]
fn eaten_fruit_is_replaced_on_next_tick() {
    let mut world = configured(16, 16);
    let mut events = Vec::new();
    let head = query::snake(&world).head();
    world::apply(
        &mut world,
        Command::SpawnFruit {
            cell: head.step(Direction::North),
        },
        &mut events,
    );
    let mut fruit = FruitSpawning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    events.clear();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        &mut events,
    );
    assert_eq!(query::score(&world), 10);

    let mut commands = Vec::new();
    fruit.handle(&events, &world, &mut rng, &mut commands);
    assert!(
        matches!(commands.as_slice(), [Command::SpawnFruit { .. }]),
        "expected a replacement fruit, got {commands:?}"
    );
}
