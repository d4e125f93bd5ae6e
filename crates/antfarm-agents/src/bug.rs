//! Bug entities: identity, cell back-reference, and meters.
//!
//! A [`Bug`] never owns its cell. It records the coordinate it occupies,
//! and the [`Ecosystem`](crate::ecosystem::Ecosystem) keeps that record in
//! step with the cell's occupant slot. Only the ecosystem can change it.

use std::collections::BTreeMap;

use antfarm_types::{EntityId, GridPos, Species};

use crate::config::SpeciesConfig;
use crate::error::AgentError;
use crate::meter::ValueMeter;
use crate::species;

/// One actor on the grid.
#[derive(Debug)]
pub struct Bug {
    id: EntityId,
    species: Species,
    /// Assigned cell, kept consistent with the grid by the ecosystem.
    cell: Option<GridPos>,
    move_cooldown: u32,
    eatable: bool,
    /// Facing angle in degrees, clockwise from top.
    facing: u16,
    selected: bool,
    tags: BTreeMap<String, String>,
    /// Breeding cooldown; fills once per movement pulse and auto-resets.
    pub breeding: ValueMeter,
    /// Pulses since the last meal; `None` for species that never starve.
    pub hunger: Option<ValueMeter>,
    /// Generation number (seed population is 0).
    pub generation: ValueMeter,
    /// Movement pulses survived.
    pub time_alive: ValueMeter,
}

impl Bug {
    /// Create an unassigned bug.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidArgument`] if the species config has a
    /// zero breeding cooldown.
    pub fn new(
        id: EntityId,
        species: Species,
        config: &SpeciesConfig,
        generation: u32,
    ) -> Result<Self, AgentError> {
        config.validate(species)?;

        let breeding =
            ValueMeter::new(0, i64::from(config.breed_cooldown))?.with_auto_reset(true);
        let hunger = if config.starve_ticks > 0 {
            Some(ValueMeter::new(0, i64::from(config.starve_ticks))?)
        } else {
            None
        };
        let mut generation_meter = ValueMeter::new(0, i64::MAX)?;
        generation_meter.set_value(i64::from(generation));

        Ok(Self {
            id,
            species,
            cell: None,
            move_cooldown: config.move_cooldown,
            eatable: species::traits(species).eatable,
            facing: 0,
            selected: false,
            tags: BTreeMap::new(),
            breeding,
            hunger,
            generation: generation_meter,
            time_alive: ValueMeter::new(0, i64::MAX)?,
        })
    }

    /// Stable identifier.
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Species tag.
    pub const fn species(&self) -> Species {
        self.species
    }

    /// The coordinate this bug occupies, if assigned.
    pub const fn assigned_cell(&self) -> Option<GridPos> {
        self.cell
    }

    pub(crate) const fn set_assigned_cell(&mut self, cell: Option<GridPos>) {
        self.cell = cell;
    }

    /// Whether predators may eat this bug.
    pub const fn is_eatable(&self) -> bool {
        self.eatable
    }

    /// Movement pulses between moves.
    pub const fn move_cooldown(&self) -> u32 {
        self.move_cooldown
    }

    /// True on pulses where this bug gets to act, given its time alive.
    pub fn is_due_to_move(&self) -> bool {
        let cooldown = i64::from(self.move_cooldown.max(1));
        self.time_alive.value().checked_rem(cooldown) == Some(0)
    }

    /// Facing angle in degrees.
    pub const fn facing(&self) -> u16 {
        self.facing
    }

    pub(crate) const fn set_facing(&mut self, degrees: u16) {
        self.facing = degrees;
    }

    /// Generation number.
    pub fn generation_number(&self) -> u32 {
        u32::try_from(self.generation.value()).unwrap_or(u32::MAX)
    }

    /// Hunger as a fraction of the starvation limit, for species that starve.
    pub fn hunger_ratio(&self) -> Option<f64> {
        self.hunger.as_ref().map(ValueMeter::ratio)
    }

    /// UI selection flag. Not part of the simulation rules.
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Set the UI selection flag.
    pub const fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Free-form UI attachment data.
    pub const fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Attach or replace a UI tag, returning the previous value.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.tags.insert(key.into(), value.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ant_has_no_hunger() {
        let ant = Bug::new(EntityId(1), Species::Ant, &SpeciesConfig::ant(), 0).unwrap();
        assert!(ant.hunger.is_none());
        assert!(ant.is_eatable());
        assert_eq!(ant.assigned_cell(), None);
        assert!(ant.breeding.auto_reset());
    }

    #[test]
    fn doodlebug_hunger_matches_starve_ticks() {
        let bug = Bug::new(EntityId(2), Species::Doodlebug, &SpeciesConfig::doodlebug(), 4).unwrap();
        assert_eq!(bug.hunger.as_ref().map(ValueMeter::max), Some(3));
        assert_eq!(bug.generation_number(), 4);
        assert!(!bug.is_eatable());
    }

    #[test]
    fn move_cooldown_gates_turns() {
        let mut config = SpeciesConfig::ant();
        config.move_cooldown = 2;
        let mut ant = Bug::new(EntityId(3), Species::Ant, &config, 0).unwrap();
        ant.time_alive.set_value(1);
        assert!(!ant.is_due_to_move());
        ant.time_alive.set_value(2);
        assert!(ant.is_due_to_move());
    }

    #[test]
    fn tags_and_selection() {
        let mut ant = Bug::new(EntityId(4), Species::Ant, &SpeciesConfig::ant(), 0).unwrap();
        ant.set_selected(true);
        assert!(ant.is_selected());
        assert_eq!(ant.set_tag("label", "scout"), None);
        assert_eq!(ant.tags().get("label").map(String::as_str), Some("scout"));
    }
}
