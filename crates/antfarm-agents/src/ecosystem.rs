//! The simulation context: grid, entity registry, and seeded randomness.
//!
//! [`Ecosystem`] replaces any notion of global game state. It owns the
//! [`CellGrid`] and every live [`Bug`], and it is the only place where the
//! two-sided link between a bug and its cell is changed. Every mutation
//! validates first and then updates both sides in one step, so a failed
//! call leaves the grid untouched.
//!
//! Multiple ecosystems can coexist (tests build many of them); each one
//! carries its own RNG seeded from configuration.

use std::collections::BTreeMap;

use antfarm_types::{Boundary, EntityId, GridPos, Species};
use antfarm_world::{CellGrid, WorldError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::bug::Bug;
use crate::config::EcosystemConfig;
use crate::error::AgentError;
use crate::signal::EventSignal;

/// Why a bug left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Eaten by a predator.
    Eaten {
        /// The predator.
        by: EntityId,
    },
    /// Hunger meter reached its maximum.
    Starved,
    /// Removed by an external caller.
    Removed,
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Eaten { by } => write!(f, "eaten_by_{by}"),
            Self::Starved => write!(f, "starved"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// Payload of [`Ecosystem::on_birth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthEvent {
    /// The new bug.
    pub id: EntityId,
    /// Its species.
    pub species: Species,
    /// Where it was placed.
    pub pos: GridPos,
    /// The breeding parent; `None` for seeded or restored bugs.
    pub parent: Option<EntityId>,
}

/// Payload of [`Ecosystem::on_death`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathEvent {
    /// The departed bug.
    pub id: EntityId,
    /// Its species.
    pub species: Species,
    /// The cell it vacated, if it held one.
    pub pos: Option<GridPos>,
    /// Why it left.
    pub cause: DeathCause,
}

/// Running totals since the ecosystem was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tallies {
    pub(crate) births: u64,
    pub(crate) meals: u64,
    pub(crate) starvations: u64,
}

/// Population summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    /// Movement pulses taken.
    pub frame: u64,
    /// Live ants.
    pub ants: usize,
    /// Live doodlebugs.
    pub doodlebugs: usize,
    /// Bugs born by breeding.
    pub births: u64,
    /// Ants eaten.
    pub meals: u64,
    /// Doodlebugs starved.
    pub starvations: u64,
}

/// Everything a renderer needs to draw one bug.
#[derive(Debug, Clone, PartialEq)]
pub struct BugView {
    /// Entity id.
    pub id: EntityId,
    /// Species, for sprite choice.
    pub species: Species,
    /// Cell the bug stands on.
    pub pos: GridPos,
    /// Facing angle in degrees.
    pub facing: u16,
    /// Hunger fraction for species that starve.
    pub hunger_ratio: Option<f64>,
    /// Movement pulses since spawn.
    pub time_alive: i64,
    /// Generation number.
    pub generation: u32,
    /// UI selection flag.
    pub selected: bool,
}

/// What one bug did during one movement pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    /// The bug changed cells.
    pub moved: bool,
    /// The bug ate this prey.
    pub ate: Option<EntityId>,
    /// The bug produced this offspring.
    pub born: Option<EntityId>,
    /// The bug starved and was removed.
    pub starved: bool,
}

/// Aggregate of one movement pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Bugs that were live at the start of the pulse and got a turn.
    pub acted: usize,
    /// Bugs that changed cells.
    pub moved: usize,
    /// Offspring placed.
    pub births: usize,
    /// Prey eaten.
    pub meals: usize,
    /// Predators starved.
    pub starvations: usize,
}

impl StepReport {
    fn record(&mut self, activity: &Activity) {
        self.acted = self.acted.saturating_add(1);
        if activity.moved {
            self.moved = self.moved.saturating_add(1);
        }
        if activity.born.is_some() {
            self.births = self.births.saturating_add(1);
        }
        if activity.ate.is_some() {
            self.meals = self.meals.saturating_add(1);
        }
        if activity.starved {
            self.starvations = self.starvations.saturating_add(1);
        }
    }
}

/// The simulation context owning the grid and all bugs.
#[derive(Debug)]
pub struct Ecosystem {
    pub(crate) grid: CellGrid,
    pub(crate) bugs: BTreeMap<EntityId, Bug>,
    next_id: EntityId,
    pub(crate) rng: StdRng,
    pub(crate) config: EcosystemConfig,
    pub(crate) tallies: Tallies,
    frame: u64,
    /// Fired after a bug is placed on the grid.
    pub on_birth: EventSignal<BirthEvent>,
    /// Fired after a bug leaves the simulation.
    pub on_death: EventSignal<DeathEvent>,
}

impl Ecosystem {
    /// Create an empty ecosystem on a `width x height` grid.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::World`] for invalid dimensions or
    /// [`AgentError::InvalidArgument`] for an invalid species config.
    pub fn new(
        width: u32,
        height: u32,
        config: EcosystemConfig,
        seed: u64,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let grid = CellGrid::new(width, height)?;
        Ok(Self {
            grid,
            bugs: BTreeMap::new(),
            next_id: EntityId(1),
            rng: StdRng::seed_from_u64(seed),
            config,
            tallies: Tallies::default(),
            frame: 0,
            on_birth: EventSignal::new(),
            on_death: EventSignal::new(),
        })
    }

    /// Read-only view of the grid.
    pub const fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Species tunables in effect.
    pub const fn config(&self) -> &EcosystemConfig {
        &self.config
    }

    /// Movement pulses taken so far.
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    pub(crate) const fn set_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    /// Look up a live bug.
    pub fn bug(&self, id: EntityId) -> Option<&Bug> {
        self.bugs.get(&id)
    }

    /// Mutable access to a live bug, for UI flags and meter subscriptions.
    ///
    /// The bug's cell link cannot be changed through this handle; use
    /// [`Self::assign_cell`] and [`Self::remove_from_cell`].
    pub fn bug_mut(&mut self, id: EntityId) -> Option<&mut Bug> {
        self.bugs.get_mut(&id)
    }

    pub(crate) fn live_bug_mut(&mut self, id: EntityId) -> Result<&mut Bug, AgentError> {
        self.bugs.get_mut(&id).ok_or(AgentError::EntityNotFound(id))
    }

    /// Iterate over every registered bug in id order, placed or not.
    pub fn bugs(&self) -> impl Iterator<Item = &Bug> {
        self.bugs.values()
    }

    /// Bugs that hold a cell. A bug without a cell takes no turns and is
    /// out of the simulation until it is assigned again.
    fn placed(&self) -> impl Iterator<Item = &Bug> {
        self.bugs.values().filter(|b| b.assigned_cell().is_some())
    }

    /// Number of bugs on the grid.
    pub fn len(&self) -> usize {
        self.placed().count()
    }

    /// True if no bug holds a cell.
    pub fn is_empty(&self) -> bool {
        self.placed().next().is_none()
    }

    /// Number of bugs of `species` on the grid.
    pub fn count(&self, species: Species) -> usize {
        self.placed().filter(|b| b.species() == species).count()
    }

    /// Population summary.
    pub fn census(&self) -> Census {
        Census {
            frame: self.frame,
            ants: self.count(Species::Ant),
            doodlebugs: self.count(Species::Doodlebug),
            births: self.tallies.births,
            meals: self.tallies.meals,
            starvations: self.tallies.starvations,
        }
    }

    /// Render data for every bug that holds a cell, in row-major cell order.
    pub fn views(&self) -> Vec<BugView> {
        self.grid
            .occupied()
            .into_iter()
            .filter_map(|(pos, id)| {
                self.bugs.get(&id).map(|bug| BugView {
                    id,
                    species: bug.species(),
                    pos,
                    facing: bug.facing(),
                    hunger_ratio: bug.hunger_ratio(),
                    time_alive: bug.time_alive.value(),
                    generation: bug.generation_number(),
                    selected: bug.is_selected(),
                })
            })
            .collect()
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Create an unassigned bug and register it.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::IdExhausted`] if ids ran out.
    pub fn create(&mut self, species: Species, generation: u32) -> Result<EntityId, AgentError> {
        let id = self.next_id;
        self.next_id = id.next().ok_or(AgentError::IdExhausted)?;
        let bug = Bug::new(id, species, self.config.species(species), generation)?;
        self.bugs.insert(id, bug);
        Ok(id)
    }

    /// Create a bug and place it at `pos` in one step.
    ///
    /// On failure nothing is registered and the grid is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoCellFound`] if `pos` is not a live in-bounds
    /// cell, or [`WorldError::CellOccupied`] (wrapped) if it is taken.
    pub fn spawn(
        &mut self,
        species: Species,
        pos: GridPos,
        generation: u32,
        parent: Option<EntityId>,
    ) -> Result<EntityId, AgentError> {
        let id = self.create(species, generation)?;
        if let Err(err) = self.assign_cell(id, pos) {
            self.bugs.remove(&id);
            return Err(err);
        }
        if parent.is_some() {
            self.tallies.births = self.tallies.births.saturating_add(1);
        }
        debug!(%id, %species, %pos, parent = ?parent, "bug spawned");
        self.on_birth.fire(&BirthEvent {
            id,
            species,
            pos,
            parent,
        });
        Ok(id)
    }

    /// Scatter an initial population over random empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NotEnoughSpace`] before placing anything if the
    /// grid cannot hold everyone.
    pub fn populate(&mut self, ants: usize, doodlebugs: usize) -> Result<(), AgentError> {
        let mut empty: Vec<GridPos> = self
            .grid
            .cells()
            .filter(|c| c.is_available())
            .map(antfarm_world::Cell::position)
            .collect();
        let requested = ants.saturating_add(doodlebugs);
        if requested > empty.len() {
            return Err(AgentError::NotEnoughSpace {
                requested,
                available: empty.len(),
            });
        }
        empty.shuffle(&mut self.rng);

        let species = std::iter::repeat_n(Species::Doodlebug, doodlebugs)
            .chain(std::iter::repeat_n(Species::Ant, ants));
        for (species, pos) in species.zip(empty) {
            self.spawn(species, pos, 0, None)?;
        }
        info!(ants, doodlebugs, "population seeded");
        Ok(())
    }

    /// Link bug `id` to the cell at `pos`, vacating its previous cell first.
    ///
    /// Assigning a bug to the cell it already holds is a no-op.
    ///
    /// # Errors
    ///
    /// - [`AgentError::EntityNotFound`] if `id` is not live.
    /// - [`AgentError::NoCellFound`] if `pos` is not a live in-bounds cell.
    /// - [`WorldError::CellOccupied`] (wrapped) if another bug holds `pos`.
    ///
    /// Validation happens before any mutation, so on error both the bug and
    /// every cell keep their previous links.
    pub fn assign_cell(&mut self, id: EntityId, pos: GridPos) -> Result<(), AgentError> {
        let current = self
            .bugs
            .get(&id)
            .ok_or(AgentError::EntityNotFound(id))?
            .assigned_cell();

        let target = self
            .grid
            .cell(pos)
            .filter(|c| c.boundary() == Boundary::Normal)
            .ok_or(AgentError::NoCellFound {
                entity: id,
                pos: Some(pos),
            })?;
        if let Some(occupant) = target.occupant() {
            if occupant == id {
                return Ok(());
            }
            return Err(WorldError::CellOccupied { pos, occupant }.into());
        }
        if let Some(old) = current
            && self.grid.cell(old).and_then(antfarm_world::Cell::occupant) != Some(id)
        {
            return Err(WorldError::NoOccupant { pos: old }.into());
        }

        if let Some(old) = current {
            self.grid.cell_mut(old)?.remove_occupant()?;
        }
        self.grid.cell_mut(pos)?.set_occupant(id)?;
        self.live_bug_mut(id)?.set_assigned_cell(Some(pos));
        Ok(())
    }

    /// Unlink bug `id` from its cell, clearing both sides together.
    ///
    /// Returns the vacated coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EntityNotFound`] if `id` is not live, or
    /// [`AgentError::NoCellFound`] if it holds no cell.
    pub fn remove_from_cell(&mut self, id: EntityId) -> Result<GridPos, AgentError> {
        let pos = self
            .bugs
            .get(&id)
            .ok_or(AgentError::EntityNotFound(id))?
            .assigned_cell()
            .ok_or(AgentError::NoCellFound {
                entity: id,
                pos: None,
            })?;
        self.grid.cell_mut(pos)?.remove_occupant()?;
        self.live_bug_mut(id)?.set_assigned_cell(None);
        Ok(pos)
    }

    /// Remove bug `id` from the simulation, vacating its cell if it holds one.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EntityNotFound`] if `id` is not live.
    pub fn kill(&mut self, id: EntityId, cause: DeathCause) -> Result<Bug, AgentError> {
        let held = self
            .bugs
            .get(&id)
            .ok_or(AgentError::EntityNotFound(id))?
            .assigned_cell();
        let pos = match held {
            Some(_) => Some(self.remove_from_cell(id)?),
            None => None,
        };
        let bug = self
            .bugs
            .remove(&id)
            .ok_or(AgentError::EntityNotFound(id))?;

        match cause {
            DeathCause::Eaten { .. } => {
                self.tallies.meals = self.tallies.meals.saturating_add(1);
            }
            DeathCause::Starved => {
                self.tallies.starvations = self.tallies.starvations.saturating_add(1);
            }
            DeathCause::Removed => {}
        }
        debug!(%id, species = %bug.species(), %cause, "bug removed");
        self.on_death.fire(&DeathEvent {
            id,
            species: bug.species(),
            pos,
            cause,
        });
        Ok(bug)
    }

    // -------------------------------------------------------------------
    // Movement pulse
    // -------------------------------------------------------------------

    /// Run one movement pulse: every bug that holds a cell at the start of
    /// the pulse gets exactly one turn, in row-major order of its cell.
    ///
    /// Bugs born during the pulse wait for the next one; bugs eaten before
    /// their turn are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the first precondition violation raised by a bug's turn.
    /// The grid invariants still hold when that happens.
    pub fn step(&mut self) -> Result<StepReport, AgentError> {
        self.frame = self.frame.saturating_add(1);
        let roster = self.grid.occupied();
        let mut report = StepReport::default();
        for (_, id) in roster {
            if !self.bugs.contains_key(&id) {
                continue;
            }
            let activity = self.act(id)?;
            report.record(&activity);
        }
        Ok(report)
    }

    /// Give bug `id` one turn.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EntityNotFound`] if `id` is not live.
    pub fn act(&mut self, id: EntityId) -> Result<Activity, AgentError> {
        let bug = self.live_bug_mut(id)?;
        bug.time_alive.increment_by(1)?;
        if bug.assigned_cell().is_none() || !bug.is_due_to_move() {
            return Ok(Activity::default());
        }
        match bug.species() {
            Species::Ant => self.act_ant(id),
            Species::Doodlebug => self.act_doodlebug(id),
        }
    }
}
