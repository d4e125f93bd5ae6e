//! Per-species turn logic for ants and doodlebugs.
//!
//! Each turn runs against the owning [`Ecosystem`] and only changes
//! occupancy through [`Ecosystem::assign_cell`], [`Ecosystem::spawn`], and
//! [`Ecosystem::kill`], so the bug/cell link invariant is kept by the same
//! code paths as every other caller.

use antfarm_types::{EntityId, GridPos};
use antfarm_world::direction_relative_to;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::bug::Bug;
use crate::ecosystem::{Activity, DeathCause, Ecosystem};
use crate::error::AgentError;

impl Ecosystem {
    /// Ant turn: wander to a random empty neighbour, then advance the
    /// breeding meter and breed when it fills.
    pub(crate) fn act_ant(&mut self, id: EntityId) -> Result<Activity, AgentError> {
        let pos = self.position_of(id)?;
        let mut activity = Activity::default();

        if let Some(target) = self.grid.random_available_neighbour(pos, &mut self.rng) {
            self.relocate(id, pos, target)?;
            activity.moved = true;
        }
        activity.born = self.tick_breeding(id)?;
        Ok(activity)
    }

    /// Doodlebug turn.
    ///
    /// 1. Advance the breeding meter (breeding when it fills).
    /// 2. Scan the neighbours once, in a freshly shuffled order. The first
    ///    neighbour holding eatable prey is eaten: the prey is removed, the
    ///    doodlebug moves into its cell, hunger empties, and the turn ends.
    /// 3. Otherwise move to the first empty neighbour seen, if any, and
    ///    advance hunger. A full hunger meter starves the doodlebug.
    pub(crate) fn act_doodlebug(&mut self, id: EntityId) -> Result<Activity, AgentError> {
        let mut activity = Activity {
            born: self.tick_breeding(id)?,
            ..Activity::default()
        };
        let pos = self.position_of(id)?;

        let mut neighbours = pos.neighbours();
        neighbours.shuffle(&mut self.rng);

        let mut prey = None;
        let mut first_empty = None;
        for n in neighbours {
            let Some(cell) = self.grid.cell(n) else {
                continue;
            };
            match cell.occupant() {
                Some(other) if self.bugs.get(&other).is_some_and(Bug::is_eatable) => {
                    prey = Some((n, other));
                    break;
                }
                Some(_) => {}
                None => {
                    if first_empty.is_none() && cell.is_available() {
                        first_empty = Some(n);
                    }
                }
            }
        }

        if let Some((target, victim)) = prey {
            self.kill(victim, DeathCause::Eaten { by: id })?;
            self.relocate(id, pos, target)?;
            if let Some(hunger) = self.live_bug_mut(id)?.hunger.as_mut() {
                hunger.empty();
            }
            activity.moved = true;
            activity.ate = Some(victim);
            return Ok(activity);
        }

        if let Some(target) = first_empty {
            self.relocate(id, pos, target)?;
            activity.moved = true;
        }

        let starving = match self.live_bug_mut(id)?.hunger.as_mut() {
            Some(hunger) => hunger.increment_by(1)?.reached_max,
            None => false,
        };
        if starving {
            self.kill(id, DeathCause::Starved)?;
            activity.starved = true;
        }
        Ok(activity)
    }

    /// Current cell of a live, assigned bug.
    fn position_of(&self, id: EntityId) -> Result<GridPos, AgentError> {
        self.bugs
            .get(&id)
            .ok_or(AgentError::EntityNotFound(id))?
            .assigned_cell()
            .ok_or(AgentError::NoCellFound {
                entity: id,
                pos: None,
            })
    }

    /// Move `id` from `from` to `to`, turning it to face the way it went.
    fn relocate(&mut self, id: EntityId, from: GridPos, to: GridPos) -> Result<(), AgentError> {
        let direction = direction_relative_to(from, to)?;
        self.assign_cell(id, to)?;
        self.live_bug_mut(id)?
            .set_facing(direction.facing_degrees());
        Ok(())
    }

    /// Advance the breeding meter by one pulse; when it fills and the
    /// species may breed, place an offspring next to the parent.
    ///
    /// The meter auto-resets, so the cooldown restarts whether or not a
    /// free cell was found.
    fn tick_breeding(&mut self, id: EntityId) -> Result<Option<EntityId>, AgentError> {
        let bug = self.live_bug_mut(id)?;
        let species = bug.species();
        let edges = bug.breeding.increment_by(1)?;
        if !edges.reached_max || !self.config.species(species).breeding_enabled {
            return Ok(None);
        }
        self.breed(id)
    }

    fn breed(&mut self, parent: EntityId) -> Result<Option<EntityId>, AgentError> {
        let pos = self.position_of(parent)?;
        let bug = self.bugs.get(&parent).ok_or(AgentError::EntityNotFound(parent))?;
        let species = bug.species();
        let generation = bug.generation_number().saturating_add(1);

        let Some(target) = self.grid.random_available_neighbour(pos, &mut self.rng) else {
            debug!(%parent, %species, "no room to breed");
            return Ok(None);
        };
        let child = self.spawn(species, target, generation, Some(parent))?;
        Ok(Some(child))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use antfarm_types::Species;

    use super::*;
    use crate::config::EcosystemConfig;

    fn eco(w: u32, h: u32, seed: u64) -> Ecosystem {
        Ecosystem::new(w, h, EcosystemConfig::default(), seed).unwrap()
    }

    #[test]
    fn ant_always_moves_to_an_in_bounds_neighbour() {
        for seed in 0..32 {
            let mut e = eco(3, 3, seed);
            let start = GridPos::new(1, 1);
            let id = e.spawn(Species::Ant, start, 0, None).unwrap();
            let report = e.step().unwrap();
            assert_eq!(report.moved, 1);
            let now = e.bug(id).unwrap().assigned_cell().unwrap();
            assert_ne!(now, start);
            assert!(start.neighbours().contains(&now));
            assert!(e.grid().is_in_bounds(now));
        }
    }

    #[test]
    fn boxed_in_ant_stays_put() {
        let mut e = eco(1, 1, 3);
        let id = e.spawn(Species::Ant, GridPos::new(0, 0), 0, None).unwrap();
        let activity = e.act(id).unwrap();
        assert!(!activity.moved);
        assert_eq!(e.bug(id).unwrap().assigned_cell(), Some(GridPos::new(0, 0)));
    }

    #[test]
    fn facing_follows_movement() {
        let mut e = eco(3, 1, 9);
        let id = e.spawn(Species::Ant, GridPos::new(0, 0), 0, None).unwrap();
        e.act(id).unwrap();
        assert_eq!(e.bug(id).unwrap().assigned_cell(), Some(GridPos::new(1, 0)));
        assert_eq!(e.bug(id).unwrap().facing(), 90);
    }

    #[test]
    fn ant_breeds_when_meter_fills() {
        let mut e = eco(5, 5, 1);
        let id = e.spawn(Species::Ant, GridPos::new(2, 2), 0, None).unwrap();
        for _ in 0..2 {
            assert_eq!(e.act(id).unwrap().born, None);
        }
        let child = e.act(id).unwrap().born.unwrap();
        let parent_pos = e.bug(id).unwrap().assigned_cell().unwrap();
        let child_pos = e.bug(child).unwrap().assigned_cell().unwrap();
        assert!(parent_pos.neighbours().contains(&child_pos));
        assert_eq!(e.bug(child).unwrap().generation_number(), 1);
        assert_eq!(e.bug(id).unwrap().breeding.value(), 0);
        assert_eq!(e.census().births, 1);
    }

    #[test]
    fn breeding_disabled_still_rewinds_meter() {
        let mut config = EcosystemConfig::default();
        config.ant.breeding_enabled = false;
        let mut e = Ecosystem::new(5, 5, config, 1).unwrap();
        let id = e.spawn(Species::Ant, GridPos::new(2, 2), 0, None).unwrap();
        for _ in 0..3 {
            assert_eq!(e.act(id).unwrap().born, None);
        }
        assert_eq!(e.bug(id).unwrap().breeding.value(), 0);
        assert_eq!(e.len(), 1);
    }

    #[test]
    fn doodlebug_eats_adjacent_ant() {
        for seed in 0..16 {
            let mut e = eco(3, 3, seed);
            let hunter = e.spawn(Species::Doodlebug, GridPos::new(1, 1), 0, None).unwrap();
            let ant = e.spawn(Species::Ant, GridPos::new(1, 2), 0, None).unwrap();
            e.live_bug_mut(hunter).unwrap().hunger.as_mut().unwrap().set_value(2);

            let report = e.step().unwrap();
            assert_eq!(report.meals, 1);
            assert_eq!(e.bug(hunter).unwrap().assigned_cell(), Some(GridPos::new(1, 2)));
            assert!(e.bug(ant).is_none());
            assert!(e.grid().cell(GridPos::new(1, 1)).unwrap().is_empty());
            let hunger = e.bug(hunter).unwrap().hunger.as_ref().unwrap();
            assert_eq!(hunger.value(), hunger.min());
            assert_eq!(e.bug(hunter).unwrap().facing(), 180);
        }
    }

    #[test]
    fn doodlebug_starves_without_food() {
        let mut e = eco(4, 4, 5);
        let id = e.spawn(Species::Doodlebug, GridPos::new(0, 0), 0, None).unwrap();
        assert!(!e.act(id).unwrap().starved);
        assert!(!e.act(id).unwrap().starved);
        let last = e.act(id).unwrap();
        assert!(last.starved);
        assert!(e.bug(id).is_none());
        assert!(e.grid().occupied().is_empty());
        assert_eq!(e.census().starvations, 1);
    }

    #[test]
    fn doodlebug_does_not_eat_doodlebugs() {
        let mut e = eco(1, 2, 5);
        let a = e.spawn(Species::Doodlebug, GridPos::new(0, 0), 0, None).unwrap();
        let b = e.spawn(Species::Doodlebug, GridPos::new(0, 1), 0, None).unwrap();
        let activity = e.act(a).unwrap();
        assert_eq!(activity.ate, None);
        assert!(!activity.moved);
        assert!(e.bug(b).is_some());
        assert_eq!(e.bug(a).unwrap().hunger.as_ref().unwrap().value(), 1);
    }

    #[test]
    fn newborns_wait_for_next_pulse() {
        let mut config = EcosystemConfig::default();
        config.ant.breed_cooldown = 1;
        let mut e = Ecosystem::new(6, 6, config, 11).unwrap();
        e.spawn(Species::Ant, GridPos::new(3, 3), 0, None).unwrap();
        let report = e.step().unwrap();
        assert_eq!(report.acted, 1);
        assert_eq!(report.births, 1);
        assert_eq!(e.len(), 2);
        let report = e.step().unwrap();
        assert_eq!(report.acted, 2);
    }
}
