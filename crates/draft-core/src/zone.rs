//! Zones (pens) on a player's park board and their fixed rule descriptors.
//!
//! Every board has the same seven zones. What a zone accepts and how it
//! scores is looked up in [`ZONE_RULES`]; nothing else in the crate branches
//! on a specific zone.

use crate::validate::PlacementError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named slot on a park board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Same species only, filled left to right
    ForestOfSameness,
    /// Different species only, filled left to right
    MeadowOfDifferences,
    /// Any species, 5 points per pair
    PrairieOfLove,
    /// Exactly three pieces score 7
    WoodyTrio,
    /// One piece, 7 if you hold the most of that species in the session
    KingOfJungle,
    /// One piece, 7 if it is the only one of its species in your park
    SolitaryIsland,
    /// Overflow, 1 point each
    River,
}

/// What a zone accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementRule {
    SameSpeciesOnly,
    DifferentSpeciesOnly,
    SingleSlot,
    SingleUnique,
    Unrestricted,
}

/// How a zone's final contents are scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringFormula {
    /// Monospecies, looked up in [`crate::score::SAME_SPECIES_POINTS`]
    SameSpeciesTable,
    /// All distinct, looked up in [`crate::score::DIFFERENT_SPECIES_POINTS`]
    DifferentSpeciesTable,
    /// 5 points per pair of the same species
    Pairwise,
    /// 7 points for exactly three pieces
    ExactTrio,
    /// 7 points for holding the session-wide majority of the piece's species
    Majority,
    /// 7 points if the piece's species appears nowhere else on the board
    Uniqueness,
    /// 1 point per piece
    Unbounded,
}

/// Immutable rule descriptor for a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRules {
    pub capacity: usize,
    pub placement: PlacementRule,
    pub scoring: ScoringFormula,
}

const fn rules(capacity: usize, placement: PlacementRule, scoring: ScoringFormula) -> ZoneRules {
    ZoneRules {
        capacity,
        placement,
        scoring,
    }
}

/// Rule table, indexed in [`Zone::ALL`] order
pub const ZONE_RULES: [ZoneRules; 7] = [
    rules(6, PlacementRule::SameSpeciesOnly, ScoringFormula::SameSpeciesTable),
    rules(6, PlacementRule::DifferentSpeciesOnly, ScoringFormula::DifferentSpeciesTable),
    rules(12, PlacementRule::Unrestricted, ScoringFormula::Pairwise),
    rules(3, PlacementRule::Unrestricted, ScoringFormula::ExactTrio),
    rules(1, PlacementRule::SingleSlot, ScoringFormula::Majority),
    rules(1, PlacementRule::SingleUnique, ScoringFormula::Uniqueness),
    rules(20, PlacementRule::Unrestricted, ScoringFormula::Unbounded),
];

impl Zone {
    /// All zones in board order
    pub const ALL: [Zone; 7] = [
        Zone::ForestOfSameness,
        Zone::MeadowOfDifferences,
        Zone::PrairieOfLove,
        Zone::WoodyTrio,
        Zone::KingOfJungle,
        Zone::SolitaryIsland,
        Zone::River,
    ];

    /// Position in [`Zone::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rule descriptor for this zone
    pub const fn rules(self) -> ZoneRules {
        ZONE_RULES[self.index()]
    }

    pub const fn capacity(self) -> usize {
        self.rules().capacity
    }

    /// Wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::ForestOfSameness => "forest_of_sameness",
            Zone::MeadowOfDifferences => "meadow_of_differences",
            Zone::PrairieOfLove => "prairie_of_love",
            Zone::WoodyTrio => "woody_trio",
            Zone::KingOfJungle => "king_of_jungle",
            Zone::SolitaryIsland => "solitary_island",
            Zone::River => "river",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::ALL
            .into_iter()
            .find(|zone| zone.as_str() == s)
            .ok_or_else(|| PlacementError::UnknownZone(s.to_string()))
    }
}
