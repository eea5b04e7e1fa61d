#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Portal Snake headlessly.

mod ascii;
mod autopilot;
mod map_transfer;
mod settings;
mod simulation;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use portal_snake_rendering::{Palette, Presentation, RenderingBackend};
use portal_snake_world::query;
use tracing_subscriber::EnvFilter;

use crate::{
    ascii::AsciiBackend, map_transfer::MapSnapshot, settings::Settings, simulation::Simulation,
};

/// Runs an autopiloted game and prints the board as text.
#[derive(Parser, Debug)]
#[command(name = "portal-snake", version)]
struct Args {
    /// TOML settings file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// seed for maze generation and item placement
    #[arg(long)]
    seed: Option<u64>,

    /// grid width in cells, border included
    #[arg(long)]
    width: Option<u32>,

    /// grid height in cells, border included
    #[arg(long)]
    height: Option<u32>,

    /// number of ticks to simulate
    #[arg(long)]
    ticks: Option<u32>,

    /// simulated milliseconds per tick
    #[arg(long)]
    tick_ms: Option<u64>,

    /// print every Nth frame
    #[arg(long)]
    frame_every: Option<u32>,

    /// start a new game instead of stopping on game over
    #[arg(long)]
    restart: bool,

    /// start from a map string produced by --export-map
    #[arg(long)]
    import_map: Option<String>,

    /// print the final map string after the run
    #[arg(long)]
    export_map: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(ticks) = self.ticks {
            settings.ticks = ticks;
        }
        if let Some(tick_ms) = self.tick_ms {
            settings.tick_ms = tick_ms;
        }
        if let Some(frame_every) = self.frame_every {
            settings.frame_every = frame_every;
        }
        settings.restart |= self.restart;
    }
}

/// Entry point for the Portal Snake command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    args.apply(&mut settings);
    settings.validate()?;

    let mut simulation = Simulation::new(&settings)?;
    if let Some(encoded) = &args.import_map {
        let snapshot = MapSnapshot::decode(encoded).context("failed to decode imported map")?;
        simulation.import(&snapshot)?;
    }

    let presentation = Presentation::new(
        query::welcome_banner(simulation.world()),
        Palette::default(),
        simulation.scene(),
    );
    let backend = AsciiBackend::new(
        io::stdout().lock(),
        settings.ticks,
        settings.frame_every,
        settings.tick(),
    );
    backend.run(presentation, |dt, input, scene| {
        let control = simulation.step(dt, input);
        *scene = simulation.scene();
        control
    })?;

    if args.export_map {
        println!("{}", simulation.export().encode()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let args = Args::parse_from([
            "portal-snake",
            "--seed",
            "9",
            "--width",
            "24",
            "--restart",
        ]);
        let mut settings = Settings::default();

        args.apply(&mut settings);

        assert_eq!(settings.seed, 9);
        assert_eq!(settings.width, 24);
        assert_eq!(settings.height, 30);
        assert!(settings.restart);
    }

    #[test]
    fn args_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
