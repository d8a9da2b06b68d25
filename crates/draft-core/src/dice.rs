//! The placement die: the per-turn constraint on which zones are eligible.

use crate::validate::PlacementError;
use crate::zone::Zone;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A face of the placement die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceFace {
    /// Woodland zones
    Forest,
    /// Grassland zones
    Grassland,
    /// Rocky zones
    Mountain,
    /// The island
    Nest,
    /// River only
    River,
    /// No restriction
    FreeChoice,
}

const FOREST: &[Zone] = &[Zone::ForestOfSameness, Zone::River];
const GRASSLAND: &[Zone] = &[Zone::MeadowOfDifferences, Zone::PrairieOfLove, Zone::River];
const MOUNTAIN: &[Zone] = &[Zone::WoodyTrio, Zone::KingOfJungle, Zone::River];
const NEST: &[Zone] = &[Zone::SolitaryIsland, Zone::River];
const RIVER: &[Zone] = &[Zone::River];

impl DiceFace {
    /// All six faces
    pub const ALL: [DiceFace; 6] = [
        DiceFace::Forest,
        DiceFace::Grassland,
        DiceFace::Mountain,
        DiceFace::Nest,
        DiceFace::River,
        DiceFace::FreeChoice,
    ];

    /// Roll the die
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, DiceFace::FreeChoice)
    }

    /// Zones a piece may be placed in under this face
    pub fn eligible_zones(&self) -> &'static [Zone] {
        match self {
            DiceFace::Forest => FOREST,
            DiceFace::Grassland => GRASSLAND,
            DiceFace::Mountain => MOUNTAIN,
            DiceFace::Nest => NEST,
            DiceFace::River => RIVER,
            DiceFace::FreeChoice => &Zone::ALL,
        }
    }

    pub fn allows(&self, zone: Zone) -> bool {
        self.is_unrestricted() || self.eligible_zones().contains(&zone)
    }

    /// Wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            DiceFace::Forest => "forest",
            DiceFace::Grassland => "grassland",
            DiceFace::Mountain => "mountain",
            DiceFace::Nest => "nest",
            DiceFace::River => "river",
            DiceFace::FreeChoice => "free_choice",
        }
    }
}

impl fmt::Display for DiceFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiceFace {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceFace::ALL
            .into_iter()
            .find(|face| face.as_str() == s)
            .ok_or_else(|| PlacementError::UnknownConstraint(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_river_is_always_eligible() {
        for face in DiceFace::ALL {
            assert!(face.allows(Zone::River), "{face} should allow the river");
        }
    }

    #[test]
    fn test_free_choice_allows_everything() {
        for zone in Zone::ALL {
            assert!(DiceFace::FreeChoice.allows(zone));
        }
    }

    #[test]
    fn test_mountain_faces() {
        let face = DiceFace::Mountain;
        assert!(face.allows(Zone::WoodyTrio));
        assert!(face.allows(Zone::KingOfJungle));
        assert!(!face.allows(Zone::ForestOfSameness));
        assert!(!face.allows(Zone::SolitaryIsland));
    }

    #[test]
    fn test_roll_is_deterministic_for_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let rolls_a: Vec<_> = (0..20).map(|_| DiceFace::roll(&mut a)).collect();
        let rolls_b: Vec<_> = (0..20).map(|_| DiceFace::roll(&mut b)).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn test_parse_face() {
        assert_eq!("free_choice".parse::<DiceFace>().unwrap(), DiceFace::FreeChoice);
        assert_eq!(
            "lava".parse::<DiceFace>().unwrap_err(),
            PlacementError::UnknownConstraint("lava".into())
        );
    }
}
