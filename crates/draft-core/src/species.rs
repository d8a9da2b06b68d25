//! Dinosaur species.
//!
//! The species set is closed: every piece drawn from the bag is one of these
//! six, and the wire identifiers below are the only accepted spellings.

use crate::validate::PlacementError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A dinosaur species
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    #[serde(rename = "trex")]
    TRex,
    Stegosaurus,
    Triceratops,
    Brachiosaurus,
    Pterodactyl,
    Velociraptor,
}

impl Species {
    /// All species, in bag order
    pub const ALL: [Species; 6] = [
        Species::TRex,
        Species::Stegosaurus,
        Species::Triceratops,
        Species::Brachiosaurus,
        Species::Pterodactyl,
        Species::Velociraptor,
    ];

    /// The species that earns +1 for every zone it appears in
    pub const BONUS: Species = Species::TRex;

    /// Wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::TRex => "trex",
            Species::Stegosaurus => "stegosaurus",
            Species::Triceratops => "triceratops",
            Species::Brachiosaurus => "brachiosaurus",
            Species::Pterodactyl => "pterodactyl",
            Species::Velociraptor => "velociraptor",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .into_iter()
            .find(|species| species.as_str() == s)
            .ok_or_else(|| PlacementError::UnknownSpecies(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_wire_ids() {
        for species in Species::ALL {
            assert_eq!(species.as_str().parse::<Species>().unwrap(), species);
        }
    }

    #[test]
    fn test_unknown_species_is_rejected() {
        let err = "diplodocus".parse::<Species>().unwrap_err();
        assert_eq!(err, PlacementError::UnknownSpecies("diplodocus".into()));
    }

    #[test]
    fn test_serde_uses_wire_ids() {
        let json = serde_json::to_string(&Species::TRex).unwrap();
        assert_eq!(json, "\"trex\"");
        let parsed: Species = serde_json::from_str("\"pterodactyl\"").unwrap();
        assert_eq!(parsed, Species::Pterodactyl);
    }
}
