//! Population watcher wired to the ecosystem's birth and death signals.
//!
//! Keeps live counts per species from the event stream alone and logs when
//! a species dies out. The totals are shared so `main` can report them
//! after the loop thread returns.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use antfarm_agents::{DeathCause, Ecosystem, SubscriptionId};
use antfarm_types::Species;
use tracing::{info, warn};

/// Running totals collected from signals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchTotals {
    /// Live bugs per species.
    pub live: BTreeMap<Species, u64>,
    /// Bugs born by breeding, per species.
    pub bred: BTreeMap<Species, u64>,
    /// Deaths keyed by cause (`eaten`, `starved`, `removed`).
    pub deaths: BTreeMap<&'static str, u64>,
}

/// Shared handle to the watcher's totals.
#[derive(Debug, Clone, Default)]
pub struct PopulationWatcher {
    totals: Arc<Mutex<WatchTotals>>,
}

impl PopulationWatcher {
    /// A watcher with empty totals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `eco`'s birth and death signals.
    pub fn attach(&self, eco: &mut Ecosystem) -> (SubscriptionId, SubscriptionId) {
        let births = Arc::clone(&self.totals);
        let birth_sub = eco.on_birth.connect(move |event| {
            let mut totals = births.lock().unwrap_or_else(PoisonError::into_inner);
            bump(&mut totals.live, event.species);
            if event.parent.is_some() {
                bump(&mut totals.bred, event.species);
            }
        });

        let deaths = Arc::clone(&self.totals);
        let death_sub = eco.on_death.connect(move |event| {
            let mut totals = deaths.lock().unwrap_or_else(PoisonError::into_inner);
            let cause = match event.cause {
                DeathCause::Eaten { .. } => "eaten",
                DeathCause::Starved => "starved",
                DeathCause::Removed => "removed",
            };
            let entry = totals.deaths.entry(cause).or_insert(0);
            *entry = entry.saturating_add(1);

            let live = totals.live.entry(event.species).or_insert(0);
            if *live == 0 {
                warn!(species = %event.species, "death reported for a species with no live bugs");
                return;
            }
            *live = live.saturating_sub(1);
            if *live == 0 {
                info!(species = %event.species, last = %event.id, cause, "species died out");
            }
        });

        (birth_sub, death_sub)
    }

    /// Reset live counts from `eco`, for ecosystems populated before
    /// [`attach`](Self::attach).
    pub fn sync(&self, eco: &Ecosystem) {
        let mut totals = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
        for species in Species::ALL {
            totals
                .live
                .insert(species, u64::try_from(eco.count(species)).unwrap_or(u64::MAX));
        }
    }

    /// Copy of the current totals.
    pub fn totals(&self) -> WatchTotals {
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn bump<K: Ord>(map: &mut BTreeMap<K, u64>, key: K) {
    let entry = map.entry(key).or_insert(0);
    *entry = entry.saturating_add(1);
}
