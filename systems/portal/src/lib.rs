#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Portal transition system.
//!
//! Once the score crosses the configured threshold an entrance opens on a free
//! interior cell. When the head enters it the system reserves a wall-free
//! column, regenerates the maze around that reservation, relocates the snake
//! onto the exit and freezes it for a short countdown. Afterwards the snake
//! moves with collisions suppressed for a few grace ticks while it regrows to
//! its pre-teleport length, one tail segment per regrow interval. The sequence
//! ends when the body has left the exit column, at which point the exit closes
//! and the next threshold is raised.

mod safe_area;

use std::time::Duration;

use portal_snake_core::{
    Cell, CollisionPolicy, Command, Direction, Event, Motion, PortalRole, RandomSource,
};
use portal_snake_system_maze::MazeGenerator;
use portal_snake_world::{query, World};
use tracing::{debug, info};

pub use safe_area::{search as search_safe_area, SafeArea, SAFE_AREA_ATTEMPTS};

/// Maximum number of random cells tried when opening an entrance.
pub const ENTRANCE_PLACEMENT_ATTEMPTS: usize = 200;

/// Segments the relocated body keeps outside the exit: the head above the
/// anchor and the tail queued on it.
const RELOCATED_LENGTH: usize = 2;

/// Configuration parameters required to construct the portal system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    first_threshold: u32,
    threshold_step: u32,
    countdown: Duration,
    grace_ticks: u32,
    regrow_interval: Duration,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `threshold_step` is clamped to at least one so that each completed
    /// transition strictly raises the next threshold.
    #[must_use]
    pub const fn new(
        first_threshold: u32,
        threshold_step: u32,
        countdown: Duration,
        grace_ticks: u32,
        regrow_interval: Duration,
    ) -> Self {
        Self {
            first_threshold,
            threshold_step: if threshold_step == 0 { 1 } else { threshold_step },
            countdown,
            grace_ticks,
            regrow_interval,
        }
    }

    /// Score that arms the first entrance of a game.
    #[must_use]
    pub const fn first_threshold(&self) -> u32 {
        self.first_threshold
    }

    /// Amount added to the threshold after each completed transition.
    #[must_use]
    pub const fn threshold_step(&self) -> u32 {
        self.threshold_step
    }

    /// Time the relocated snake stays frozen before moving again.
    #[must_use]
    pub const fn countdown(&self) -> Duration {
        self.countdown
    }

    /// Ticks after the countdown during which every collision is suppressed.
    #[must_use]
    pub const fn grace_ticks(&self) -> u32 {
        self.grace_ticks
    }

    /// Accumulated time between two regrown segments.
    #[must_use]
    pub const fn regrow_interval(&self) -> Duration {
        self.regrow_interval
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            50,
            50,
            Duration::from_secs(3),
            3,
            Duration::from_millis(100),
        )
    }
}

/// Phase of the portal transition together with its per-phase data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortalPhase {
    /// No portal is open.
    Idle,
    /// An entrance waits for the head.
    EntranceArmed {
        /// Cell hosting the entrance.
        entrance: Cell,
    },
    /// The relocated snake is frozen on the exit.
    Countdown {
        /// Cell hosting the exit.
        exit: Cell,
        /// Body length captured when the head entered the portal.
        target_length: usize,
        /// Segments still to be regrown once the countdown ends.
        regrow_needed: usize,
        /// Time left before the snake moves again.
        remaining: Duration,
    },
    /// The snake moves again and regrows while emerging from the exit.
    Regrowing {
        /// Cell hosting the exit.
        exit: Cell,
        /// Body length captured when the head entered the portal.
        target_length: usize,
        /// Segments to regrow in total.
        regrow_needed: usize,
        /// Segments regrown so far.
        regrow_placed: usize,
        /// Time accumulated toward the next segment.
        accumulator: Duration,
        /// Ticks left during which collisions stay suppressed.
        grace_ticks: u32,
    },
}

impl PortalPhase {
    /// Body length the snake regrows to, while a transition is under way.
    #[must_use]
    pub const fn target_length(&self) -> Option<usize> {
        match self {
            Self::Idle | Self::EntranceArmed { .. } => None,
            Self::Countdown { target_length, .. } | Self::Regrowing { target_length, .. } => {
                Some(*target_length)
            }
        }
    }

    /// Exit cell of the transition under way, if any.
    #[must_use]
    pub const fn exit(&self) -> Option<Cell> {
        match self {
            Self::Idle | Self::EntranceArmed { .. } => None,
            Self::Countdown { exit, .. } | Self::Regrowing { exit, .. } => Some(*exit),
        }
    }
}

/// Pure system driving entrance placement and teleport sequences.
#[derive(Debug)]
pub struct PortalTransition {
    config: Config,
    phase: PortalPhase,
    next_threshold: u32,
}

impl PortalTransition {
    /// Creates a new portal system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: PortalPhase::Idle,
            next_threshold: config.first_threshold(),
        }
    }

    /// Current phase of the transition.
    #[must_use]
    pub fn phase(&self) -> &PortalPhase {
        &self.phase
    }

    /// Score required to arm the next entrance.
    #[must_use]
    pub fn next_threshold(&self) -> u32 {
        self.next_threshold
    }

    /// Movement state the world should run with in the current phase.
    #[must_use]
    pub fn motion(&self) -> Motion {
        match self.phase {
            PortalPhase::Countdown { .. } => Motion::Frozen,
            PortalPhase::Idle
            | PortalPhase::EntranceArmed { .. }
            | PortalPhase::Regrowing { .. } => Motion::Running,
        }
    }

    /// Collision policy the world should apply in the current phase.
    #[must_use]
    pub fn collision_policy(&self) -> CollisionPolicy {
        match self.phase {
            PortalPhase::Idle | PortalPhase::EntranceArmed { .. } => CollisionPolicy::Enforced,
            PortalPhase::Countdown { .. } => CollisionPolicy::Suppressed,
            PortalPhase::Regrowing {
                grace_ticks, exit, ..
            } => {
                if grace_ticks > 0 {
                    CollisionPolicy::Suppressed
                } else {
                    CollisionPolicy::ShieldedColumn { exit }
                }
            }
        }
    }

    /// Consumes world events and the world snapshot to emit portal commands.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        world: &World,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: RandomSource + ?Sized,
    {
        for event in events {
            match event {
                Event::GameReset => self.reset(),
                Event::TimeAdvanced { dt } => self.advance(*dt, world, out),
                Event::PortalEntered { cell, body_length } => {
                    self.trigger(*cell, *body_length, world, rng, out);
                }
                Event::ItemRejected { cell, reason } => {
                    if self.phase == (PortalPhase::EntranceArmed { entrance: *cell }) {
                        debug!(?cell, ?reason, "entrance placement rejected");
                        self.phase = PortalPhase::Idle;
                    }
                }
                _ => {}
            }
        }

        if query::game_over(world).is_some() {
            return;
        }

        if self.phase == PortalPhase::Idle {
            self.try_arm(world, rng, out);
        }

        self.sync_world(world, out);
    }

    /// Opens an entrance on the provided cell, bypassing the score threshold.
    pub fn arm_at(&mut self, entrance: Cell, out: &mut Vec<Command>) {
        out.push(Command::OpenPortal {
            cell: entrance,
            role: PortalRole::Entrance,
        });
        self.phase = PortalPhase::EntranceArmed { entrance };
        info!(?entrance, "portal entrance armed");
    }

    fn reset(&mut self) {
        self.phase = PortalPhase::Idle;
        self.next_threshold = self.config.first_threshold();
    }

    fn try_arm<R>(&mut self, world: &World, rng: &mut R, out: &mut Vec<Command>)
    where
        R: RandomSource + ?Sized,
    {
        if query::score(world) < self.next_threshold
            || query::portal(world, PortalRole::Entrance).is_some()
            || query::portal(world, PortalRole::Exit).is_some()
        {
            return;
        }

        let bounds = query::bounds(world);
        for _ in 0..ENTRANCE_PLACEMENT_ATTEMPTS {
            let cell = Cell::new(
                rng.range_inclusive(bounds.min_x() + 1, bounds.max_x() - 1),
                rng.range_inclusive(bounds.min_y() + 1, bounds.max_y() - 1),
            );
            if query::is_free(world, cell) {
                self.arm_at(cell, out);
                return;
            }
        }
        debug!("no free cell for a portal entrance, retrying next tick");
    }

    fn trigger<R>(
        &mut self,
        cell: Cell,
        body_length: usize,
        world: &World,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: RandomSource + ?Sized,
    {
        if self.phase != (PortalPhase::EntranceArmed { entrance: cell }) {
            return;
        }

        let target_length = body_length.max(1);
        // The head keeps climbing through the grace ticks while walls and the
        // board edge are not checked against the regenerated maze.
        let reserved_length =
            target_length.max(RELOCATED_LENGTH) + self.config.grace_ticks() as usize;
        let bounds = query::bounds(world);
        let area = safe_area::search(rng, bounds, query::walls(world), reserved_length);
        if area.fallback {
            debug!(
                target_length,
                reserved_length,
                anchor = ?area.anchor,
                "no clear exit column found, using the center"
            );
        }

        let walls = MazeGenerator::new(bounds).generate(rng, area.reserved.iter().copied());
        out.push(Command::ReplaceWalls { walls });
        out.push(Command::ClearFruit);

        let exit = area.anchor;
        let mut body = vec![exit.step(Direction::North), exit];
        body.truncate(target_length.min(RELOCATED_LENGTH));
        let regrow_needed = target_length - body.len();
        out.push(Command::RelocateSnake {
            body,
            direction: Direction::North,
        });
        out.push(Command::OpenPortal {
            cell: exit,
            role: PortalRole::Exit,
        });

        info!(?exit, target_length, "snake entered the portal");
        self.phase = PortalPhase::Countdown {
            exit,
            target_length,
            regrow_needed,
            remaining: self.config.countdown(),
        };
    }

    fn advance(&mut self, dt: Duration, world: &World, out: &mut Vec<Command>) {
        let grace = self.config.grace_ticks();
        let interval = self.config.regrow_interval();
        let next = match &mut self.phase {
            PortalPhase::Idle | PortalPhase::EntranceArmed { .. } => None,
            PortalPhase::Countdown {
                exit,
                target_length,
                regrow_needed,
                remaining,
            } => {
                *remaining = remaining.saturating_sub(dt);
                remaining.is_zero().then_some(PortalPhase::Regrowing {
                    exit: *exit,
                    target_length: *target_length,
                    regrow_needed: *regrow_needed,
                    regrow_placed: 0,
                    accumulator: Duration::ZERO,
                    grace_ticks: grace,
                })
            }
            PortalPhase::Regrowing {
                exit,
                regrow_needed,
                regrow_placed,
                accumulator,
                grace_ticks,
                ..
            } => {
                *grace_ticks = grace_ticks.saturating_sub(1);

                if *regrow_placed < *regrow_needed {
                    *accumulator = accumulator.saturating_add(dt);
                    while *regrow_placed < *regrow_needed && *accumulator >= interval {
                        *accumulator = accumulator.saturating_sub(interval);
                        *regrow_placed += 1;
                        out.push(Command::GrowSnake);
                    }
                }

                let regrown = *regrow_placed >= *regrow_needed;
                (regrown && *grace_ticks == 0 && has_emerged(world, *exit))
                    .then_some(PortalPhase::Idle)
            }
        };

        if let Some(next) = next {
            if next == PortalPhase::Idle {
                out.push(Command::ClosePortal {
                    role: PortalRole::Exit,
                });
                self.next_threshold = self
                    .next_threshold
                    .saturating_add(self.config.threshold_step());
                info!(
                    next_threshold = self.next_threshold,
                    "snake emerged from the portal"
                );
            }
            self.phase = next;
        }
    }

    fn sync_world(&self, world: &World, out: &mut Vec<Command>) {
        let motion = self.motion();
        if query::motion(world) != motion {
            out.push(Command::SetMotion { motion });
        }
        let policy = self.collision_policy();
        if query::collision_policy(world) != policy {
            out.push(Command::SetCollisionPolicy { policy });
        }
    }
}

/// Reports whether every body segment lies above the exit row.
fn has_emerged(world: &World, exit: Cell) -> bool {
    query::body(world)
        .iter()
        .all(|segment| segment.y() < exit.y())
}

impl Default for PortalTransition {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
