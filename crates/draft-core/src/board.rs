//! A player's park board: the ordered contents of each of the seven zones.

use crate::dice::DiceFace;
use crate::species::Species;
use crate::validate::{validate, PlacementError};
use crate::zone::Zone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Player identifier within a session (0-4 for a 5-player game)
pub type PlayerId = u8;

/// Every board in a session, keyed by owner
pub type SessionBoards = BTreeMap<PlayerId, BoardContents>;

/// Raw snapshot as it arrives from storage or the wire
pub type RawBoard = BTreeMap<String, Vec<String>>;

/// Contents of every zone on one board.
///
/// All seven zones are always present. Insertion order within a zone is kept
/// for left-to-right fill rules; scoring ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Zone, Vec<Species>>",
    into = "BTreeMap<Zone, Vec<Species>>"
)]
pub struct BoardContents {
    zones: [Vec<Species>; 7],
}

impl BoardContents {
    /// An empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from `(zone, pieces)` pairs; unlisted zones are empty
    pub fn from_zones<I>(zones: I) -> Self
    where
        I: IntoIterator<Item = (Zone, Vec<Species>)>,
    {
        let mut board = Self::new();
        for (zone, pieces) in zones {
            board.zones[zone.index()] = pieces;
        }
        board
    }

    /// Parse a raw snapshot, failing on the first unknown zone or species id
    pub fn from_raw(raw: &RawBoard) -> Result<Self, PlacementError> {
        let mut board = Self::new();
        for (zone, pieces) in raw {
            let zone: Zone = zone.parse()?;
            board.zones[zone.index()] = pieces
                .iter()
                .map(|s| s.parse::<Species>())
                .collect::<Result<_, _>>()?;
        }
        Ok(board)
    }

    /// Contents of a single zone
    pub fn zone(&self, zone: Zone) -> &[Species] {
        &self.zones[zone.index()]
    }

    /// Iterate `(zone, contents)` in board order
    pub fn iter(&self) -> impl Iterator<Item = (Zone, &[Species])> {
        Zone::ALL.into_iter().map(move |z| (z, self.zone(z)))
    }

    /// Occurrences of a species across every zone
    pub fn count_of(&self, species: Species) -> usize {
        self.zones
            .iter()
            .flatten()
            .filter(|&&s| s == species)
            .count()
    }

    /// Zones holding at least one of a species
    pub fn zones_containing(&self, species: Species) -> impl Iterator<Item = Zone> + '_ {
        self.iter()
            .filter(move |(_, pieces)| pieces.contains(&species))
            .map(|(zone, _)| zone)
    }

    /// Total pieces on the board
    pub fn len(&self) -> usize {
        self.zones.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append without checking any rule. Only call after a legal verdict.
    pub fn place_unchecked(&mut self, zone: Zone, species: Species) {
        self.zones[zone.index()].push(species);
    }

    /// Validate against this board (uniqueness included) and append on success
    pub fn place(
        &mut self,
        zone: Zone,
        species: Species,
        constraint: Option<DiceFace>,
    ) -> Result<(), PlacementError> {
        validate(zone, species, self.zone(zone), Some(self), constraint)?;
        self.place_unchecked(zone, species);
        debug!(%zone, %species, "placed");
        Ok(())
    }

    /// Raw form, for storage
    pub fn to_raw(&self) -> RawBoard {
        self.iter()
            .map(|(zone, pieces)| {
                (
                    zone.as_str().to_string(),
                    pieces.iter().map(|s| s.as_str().to_string()).collect(),
                )
            })
            .collect()
    }
}

impl From<BTreeMap<Zone, Vec<Species>>> for BoardContents {
    fn from(map: BTreeMap<Zone, Vec<Species>>) -> Self {
        Self::from_zones(map)
    }
}

impl From<BoardContents> for BTreeMap<Zone, Vec<Species>> {
    fn from(board: BoardContents) -> Self {
        Zone::ALL.into_iter().zip(board.zones).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = BoardContents::new();
        assert!(board.is_empty());
        for zone in Zone::ALL {
            assert!(board.zone(zone).is_empty());
        }
    }

    #[test]
    fn test_count_of_spans_zones() {
        let board = BoardContents::from_zones([
            (Zone::ForestOfSameness, vec![Species::TRex, Species::TRex]),
            (Zone::River, vec![Species::TRex, Species::Stegosaurus]),
        ]);
        assert_eq!(board.count_of(Species::TRex), 3);
        assert_eq!(board.count_of(Species::Stegosaurus), 1);
        assert_eq!(board.count_of(Species::Pterodactyl), 0);
        assert_eq!(
            board.zones_containing(Species::TRex).collect::<Vec<_>>(),
            vec![Zone::ForestOfSameness, Zone::River]
        );
    }

    #[test]
    fn test_place_checks_rules() {
        let mut board = BoardContents::new();
        board
            .place(Zone::ForestOfSameness, Species::Triceratops, None)
            .unwrap();
        let err = board
            .place(Zone::ForestOfSameness, Species::TRex, None)
            .unwrap_err();
        assert_eq!(err, PlacementError::SpeciesMismatch);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_place_always_checks_uniqueness() {
        let mut board = BoardContents::new();
        board.place(Zone::River, Species::Velociraptor, None).unwrap();
        let err = board
            .place(Zone::SolitaryIsland, Species::Velociraptor, None)
            .unwrap_err();
        assert_eq!(err, PlacementError::NotUnique);
    }

    #[test]
    fn test_from_raw_rejects_unknown_ids() {
        let mut raw = RawBoard::new();
        raw.insert("river".into(), vec!["trex".into(), "dodo".into()]);
        assert_eq!(
            BoardContents::from_raw(&raw).unwrap_err(),
            PlacementError::UnknownSpecies("dodo".into())
        );

        let mut raw = RawBoard::new();
        raw.insert("swamp".into(), vec![]);
        assert_eq!(
            BoardContents::from_raw(&raw).unwrap_err(),
            PlacementError::UnknownZone("swamp".into())
        );
    }

    #[test]
    fn test_raw_round_trip() {
        let board = BoardContents::from_zones([
            (Zone::WoodyTrio, vec![Species::Brachiosaurus]),
            (Zone::KingOfJungle, vec![Species::TRex]),
        ]);
        assert_eq!(BoardContents::from_raw(&board.to_raw()).unwrap(), board);
    }

    #[test]
    fn test_json_is_keyed_by_zone() {
        let board = BoardContents::from_zones([(Zone::River, vec![Species::TRex])]);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["river"], serde_json::json!(["trex"]));
        assert_eq!(json["woody_trio"], serde_json::json!([]));

        let back: BoardContents = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_json_missing_zones_default_to_empty() {
        let board: BoardContents =
            serde_json::from_str(r#"{"prairie_of_love": ["trex", "trex"]}"#).unwrap();
        assert_eq!(board.len(), 2);
        assert!(board.zone(Zone::River).is_empty());
    }
}
