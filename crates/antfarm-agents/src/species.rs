//! Per-species behaviour table.
//!
//! Species differences are a closed set, so they are resolved by matching
//! on [`Species`] here rather than through trait objects.

use antfarm_types::Species;

/// Fixed traits of a species that do not come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesTraits {
    /// Whether predators may eat members of this species.
    pub eatable: bool,
    /// Whether this species hunts eatable neighbours.
    pub predator: bool,
}

/// Look up the fixed traits of `species`.
pub const fn traits(species: Species) -> SpeciesTraits {
    match species {
        Species::Ant => SpeciesTraits {
            eatable: true,
            predator: false,
        },
        Species::Doodlebug => SpeciesTraits {
            eatable: false,
            predator: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ants_are_prey_doodlebugs_hunt() {
        assert!(traits(Species::Ant).eatable);
        assert!(!traits(Species::Ant).predator);
        assert!(traits(Species::Doodlebug).predator);
        assert!(!traits(Species::Doodlebug).eatable);
    }
}
