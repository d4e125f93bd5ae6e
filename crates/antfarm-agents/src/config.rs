//! Per-species tunables.
//!
//! These values are loaded from the `ant` and `doodlebug` sections of
//! `antfarm-config.yaml`. Fields missing from a section fall back to the
//! generic defaults below; a missing section falls back to the species
//! defaults returned by [`SpeciesConfig::ant`] and
//! [`SpeciesConfig::doodlebug`].

use antfarm_types::Species;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Tunables for one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Whether this species breeds when its breeding meter fills.
    #[serde(default = "default_true")]
    pub breeding_enabled: bool,

    /// Movement pulses between breeding attempts (breeding meter max).
    #[serde(default = "default_breed_cooldown")]
    pub breed_cooldown: u32,

    /// Movement pulses between moves (1 = move every pulse).
    #[serde(default = "default_move_cooldown")]
    pub move_cooldown: u32,

    /// Pulses without eating before starving (0 = never starves).
    #[serde(default)]
    pub starve_ticks: u32,
}

impl SpeciesConfig {
    /// Ant defaults: breed every 3 pulses, never starve.
    pub const fn ant() -> Self {
        Self {
            breeding_enabled: true,
            breed_cooldown: 3,
            move_cooldown: 1,
            starve_ticks: 0,
        }
    }

    /// Doodlebug defaults: breed every 8 pulses, starve after 3 hungry pulses.
    pub const fn doodlebug() -> Self {
        Self {
            breeding_enabled: true,
            breed_cooldown: 8,
            move_cooldown: 1,
            starve_ticks: 3,
        }
    }

    /// Check that cooldowns are usable.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidArgument`] if a cooldown is zero.
    pub fn validate(&self, species: Species) -> Result<(), AgentError> {
        if self.breed_cooldown == 0 {
            return Err(AgentError::InvalidArgument {
                reason: format!("{species}.breed_cooldown must be at least 1"),
            });
        }
        if self.move_cooldown == 0 {
            return Err(AgentError::InvalidArgument {
                reason: format!("{species}.move_cooldown must be at least 1"),
            });
        }
        Ok(())
    }
}

/// Tunables for every species, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemConfig {
    /// Ant tunables.
    #[serde(default = "SpeciesConfig::ant")]
    pub ant: SpeciesConfig,

    /// Doodlebug tunables.
    #[serde(default = "SpeciesConfig::doodlebug")]
    pub doodlebug: SpeciesConfig,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            ant: SpeciesConfig::ant(),
            doodlebug: SpeciesConfig::doodlebug(),
        }
    }
}

impl EcosystemConfig {
    /// Tunables for `species`.
    pub const fn species(&self, species: Species) -> &SpeciesConfig {
        match species {
            Species::Ant => &self.ant,
            Species::Doodlebug => &self.doodlebug,
        }
    }

    /// Validate every species section.
    ///
    /// # Errors
    ///
    /// Returns the first [`AgentError::InvalidArgument`] found.
    pub fn validate(&self) -> Result<(), AgentError> {
        for species in Species::ALL {
            self.species(species).validate(species)?;
        }
        Ok(())
    }
}

const fn default_true() -> bool {
    true
}

const fn default_breed_cooldown() -> u32 {
    3
}

const fn default_move_cooldown() -> u32 {
    1
}
