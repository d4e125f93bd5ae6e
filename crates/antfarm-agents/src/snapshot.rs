//! Serializable snapshots of an ecosystem.
//!
//! A [`Snapshot`] lists every live bug with its species, coordinate, and
//! generation. Restoring rebuilds a fresh grid and entity set with the
//! same species at the same coordinates; meter histories (hunger, breeding
//! progress, time alive) start over.

use antfarm_types::{GridPos, Species};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EcosystemConfig;
use crate::ecosystem::Ecosystem;
use crate::error::AgentError;

/// One bug in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugRecord {
    /// Species tag.
    pub species: Species,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Generation number.
    #[serde(default)]
    pub generation: u32,
}

/// A point-in-time listing of the grid's population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Grid columns.
    pub width: u32,
    /// Grid rows.
    pub height: u32,
    /// Movement pulses taken when the snapshot was made.
    #[serde(default)]
    pub frame: u64,
    /// Wall-clock time the snapshot was made.
    pub saved_at: DateTime<Utc>,
    /// Live bugs in row-major cell order.
    pub bugs: Vec<BugRecord>,
}

impl Snapshot {
    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Snapshot`] if encoding fails.
    pub fn to_json(&self) -> Result<String, AgentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Snapshot`] if the text is not a valid snapshot.
    pub fn from_json(text: &str) -> Result<Self, AgentError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Ecosystem {
    /// Capture every live, assigned bug.
    pub fn snapshot(&self) -> Snapshot {
        let bugs = self
            .grid
            .occupied()
            .into_iter()
            .filter_map(|(pos, id)| {
                self.bugs.get(&id).map(|bug| BugRecord {
                    species: bug.species(),
                    x: pos.x,
                    y: pos.y,
                    generation: bug.generation_number(),
                })
            })
            .collect();
        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            frame: self.frame(),
            saved_at: Utc::now(),
            bugs,
        }
    }

    /// Rebuild an ecosystem from `snapshot`.
    ///
    /// # Errors
    ///
    /// Fails on invalid dimensions, a record outside the grid, or two
    /// records on the same cell.
    pub fn restore(
        snapshot: &Snapshot,
        config: EcosystemConfig,
        seed: u64,
    ) -> Result<Self, AgentError> {
        let mut eco = Self::new(snapshot.width, snapshot.height, config, seed)?;
        for record in &snapshot.bugs {
            eco.spawn(
                record.species,
                GridPos::new(record.x, record.y),
                record.generation,
                None,
            )?;
        }
        eco.set_frame(snapshot.frame);
        info!(
            bugs = snapshot.bugs.len(),
            width = snapshot.width,
            height = snapshot.height,
            saved_at = %snapshot.saved_at,
            "ecosystem restored from snapshot"
        );
        Ok(eco)
    }
}
