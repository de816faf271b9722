//! # Configuration
//!
//! Startup configuration, loaded once from TOML.
//!
//! ```toml
//! [ecs]
//! id_bits = 16
//! recycling = "after-flush"
//! pending_reserve = 256
//!
//! [clock]
//! tick_rate = 60
//! max_steps_per_frame = 5
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Highest accepted `tick_rate`: one tick per nanosecond.
pub const MAX_TICK_RATE: u32 = 1_000_000_000;

/// When a destroyed entity id becomes available to `create_entity` again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdRecycling {
    /// The id is reusable as soon as `destroy_entity` returns.
    ///
    /// The component removals queued by the destroy are only applied at the
    /// end-of-tick flush, so an id reissued in the same tick still reports the
    /// old entity's components until then. `has_component` cannot tell the two
    /// entities apart during that window.
    #[default]
    Immediate,
    /// The id is held back until the end-of-tick flush has applied the
    /// removals queued by the destroy.
    AfterFlush,
}

/// Entity manager configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsConfig {
    /// Width of the entity id space in bits (1..=32).
    ///
    /// 16 bits caps the population at 65,536 live and recycled ids.
    pub id_bits: u8,
    /// Id recycling policy.
    pub recycling: IdRecycling,
    /// Initial capacity reserved for each store's staged mutation queues.
    pub pending_reserve: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            id_bits: 16,
            recycling: IdRecycling::Immediate,
            pending_reserve: 64,
        }
    }
}

impl EcsConfig {
    /// Checks that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `id_bits` is outside `1..=32`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=32).contains(&self.id_bits) {
            return Err(ConfigError::Invalid(format!(
                "ecs.id_bits must be within 1..=32, got {}",
                self.id_bits
            )));
        }
        Ok(())
    }

    /// Number of entity ids the configured width allows.
    ///
    /// With 32 bits the space stops one short of `u32::MAX`, which is the
    /// reserved null id.
    #[must_use]
    pub fn id_limit(&self) -> u32 {
        match self.id_bits {
            0 => 1,
            bits if bits >= 32 => u32::MAX,
            bits => 1u32 << bits,
        }
    }
}

/// Fixed-timestep clock configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Maximum ticks run for a single frame before the backlog is dropped.
    pub max_steps_per_frame: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_steps_per_frame: 5,
        }
    }
}

impl ClockConfig {
    /// Checks that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either field is zero or
    /// `tick_rate` exceeds [`MAX_TICK_RATE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("clock.tick_rate must be positive".into()));
        }
        if self.tick_rate > MAX_TICK_RATE {
            return Err(ConfigError::Invalid(format!(
                "clock.tick_rate must be at most {MAX_TICK_RATE}, got {}",
                self.tick_rate
            )));
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "clock.max_steps_per_frame must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Entity manager settings.
    pub ecs: EcsConfig,
    /// Frame clock settings.
    pub clock: ClockConfig,
}

impl SimulationConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`SimulationConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validates both sections.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ecs.validate()?;
        self.clock.validate()
    }
}
