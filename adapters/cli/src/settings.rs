use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context, Result};
use portal_snake_system_fruit as fruit;
use portal_snake_system_portal as portal;
use serde::Deserialize;

/// Smallest grid that still leaves an interior after the border inset.
const MIN_GRID_SIDE: u32 = 5;

/// Host settings read from an optional TOML file and overridden by flags.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) seed: u64,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) ticks: u32,
    pub(crate) tick_ms: u64,
    pub(crate) frame_every: u32,
    pub(crate) restart: bool,
    pub(crate) portal: PortalSettings,
    pub(crate) fruit: FruitSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 1,
            width: 30,
            height: 30,
            ticks: 600,
            tick_ms: 100,
            frame_every: 10,
            restart: false,
            portal: PortalSettings::default(),
            fruit: FruitSettings::default(),
        }
    }
}

impl Settings {
    /// Reads settings from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to parse settings in {}", path.display()))
    }

    /// Parses settings from TOML text, filling omitted keys with defaults.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let settings = toml::from_str(contents)?;
        Ok(settings)
    }

    /// Rejects settings the simulation cannot run with.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.width >= MIN_GRID_SIDE && self.height >= MIN_GRID_SIDE,
            "grid {}x{} is smaller than {MIN_GRID_SIDE}x{MIN_GRID_SIDE}",
            self.width,
            self.height
        );
        ensure!(self.tick_ms > 0, "tick duration must be positive");
        ensure!(self.frame_every > 0, "frame cadence must be positive");
        Ok(())
    }

    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Portal transition tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PortalSettings {
    pub(crate) first_threshold: u32,
    pub(crate) threshold_step: u32,
    pub(crate) countdown_ms: u64,
    pub(crate) grace_ticks: u32,
    pub(crate) regrow_interval_ms: u64,
}

impl Default for PortalSettings {
    fn default() -> Self {
        let config = portal::Config::default();
        Self {
            first_threshold: config.first_threshold(),
            threshold_step: config.threshold_step(),
            countdown_ms: duration_ms(config.countdown()),
            grace_ticks: config.grace_ticks(),
            regrow_interval_ms: duration_ms(config.regrow_interval()),
        }
    }
}

impl PortalSettings {
    pub(crate) fn config(&self) -> portal::Config {
        portal::Config::new(
            self.first_threshold,
            self.threshold_step,
            Duration::from_millis(self.countdown_ms),
            self.grace_ticks,
            Duration::from_millis(self.regrow_interval_ms),
        )
    }
}

/// Fruit spawning tuning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FruitSettings {
    pub(crate) spawn_delay_ms: u64,
}

impl FruitSettings {
    pub(crate) fn config(&self) -> fruit::Config {
        fruit::Config::new(Duration::from_millis(self.spawn_delay_ms))
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = Settings::from_toml("").expect("empty settings parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.portal.countdown_ms, 3_000);
        assert_eq!(settings.portal.regrow_interval_ms, 100);
    }

    #[test]
    fn nested_tables_override_defaults() {
        let settings = Settings::from_toml(
            r#"
seed = 42
width = 24

[portal]
first_threshold = 20
grace_ticks = 5

[fruit]
spawn_delay_ms = 250
"#,
        )
        .expect("settings parse");

        assert_eq!(settings.seed, 42);
        assert_eq!(settings.width, 24);
        assert_eq!(settings.height, 30);
        assert_eq!(settings.portal.first_threshold, 20);
        assert_eq!(settings.portal.threshold_step, 50);
        assert_eq!(settings.portal.config().grace_ticks(), 5);
        assert_eq!(settings.fruit.spawn_delay_ms, 250);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml("speed = 3").is_err());
    }

    #[test]
    fn validation_rejects_tiny_grid() {
        let settings = Settings {
            width: 4,
            ..Settings::default()
        };
        let error = settings.validate().expect_err("grid too small");
        assert!(error.to_string().contains("smaller than 5x5"));
        assert!(Settings::default().validate().is_ok());
    }
}
